// Copyright 2026 the Text Frame Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Building text frames from Parley layouts.

use core::ops::Range;

use parley::layout::{Decoration as LayoutDecoration, GlyphRun, PositionedLayoutItem};
use parley::style::StyleProperty;
use parley::{Alignment, AlignmentOptions, FontContext, Layout, LayoutContext};
use skrifa::instance::{LocationRef, NormalizedCoord, Size};
use skrifa::outline::{DrawSettings, OutlinePen};
use skrifa::{FontRef, GlyphId, MetadataProvider as _};

use crate::frame::{Decoration, FrameGlyph, FrameLine, FrameRun, Shadow, TextFrame};
use crate::kurbo::{Affine, BezPath, Size as FrameSize};
use crate::math::FloatExt as _;
use crate::peniko::Color;
use crate::DrawError;

/// The brush carried by Parley styles when laying out text for a frame.
#[derive(Clone, Debug, PartialEq)]
pub struct TextBrush {
    /// Glyph color. Decorations use the color of their own brush.
    pub color: Color,
    /// Fill behind the run's line box.
    pub background: Option<Color>,
    /// Shadow of the run's glyphs and decorations.
    pub shadow: Option<Shadow>,
}

impl Default for TextBrush {
    fn default() -> Self {
        Self::solid(Color::BLACK)
    }
}

impl TextBrush {
    /// A brush that only sets the glyph color.
    pub fn solid(color: Color) -> Self {
        Self {
            color,
            background: None,
            shadow: None,
        }
    }

    /// Sets the background color.
    pub fn with_background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    /// Sets the shadow.
    pub fn with_shadow(mut self, shadow: Shadow) -> Self {
        self.shadow = Some(shadow);
        self
    }
}

/// Options for building a frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameOptions {
    /// The container the text is laid out in. Lines are broken at its width; `None` lays
    /// out every paragraph on a single line.
    pub size: Option<FrameSize>,
    /// The display scale the frame will be drawn at, if known. Baselines are rounded to
    /// whole display pixels.
    pub display_scale: Option<f64>,
    /// How far text may be shrunk to fit the container width without breaking, in
    /// `0.0..=1.0`. `1.0` disables shrinking.
    pub min_text_scale_factor: f64,
}

impl Default for FrameOptions {
    fn default() -> Self {
        Self {
            size: None,
            display_scale: None,
            min_text_scale_factor: 1.0,
        }
    }
}

impl FrameOptions {
    /// Default options for a container of `size`.
    pub fn with_size(size: impl Into<FrameSize>) -> Self {
        Self {
            size: Some(size.into()),
            ..Self::default()
        }
    }
}

/// Collects skrifa outlines into a y-down [`BezPath`].
struct FlippedPen(BezPath);

impl OutlinePen for FlippedPen {
    fn move_to(&mut self, x: f32, y: f32) {
        self.0.move_to((x, -y));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.0.line_to((x, -y));
    }

    fn quad_to(&mut self, cx0: f32, cy0: f32, x: f32, y: f32) {
        self.0.quad_to((cx0, -cy0), (x, -y));
    }

    fn curve_to(&mut self, cx0: f32, cy0: f32, cx1: f32, cy1: f32, x: f32, y: f32) {
        self.0.curve_to((cx0, -cy0), (cx1, -cy1), (x, -y));
    }

    fn close(&mut self) {
        self.0.close_path();
    }
}

/// Resolves a Parley decoration against the run's font metrics.
///
/// Parley offsets are distances above the baseline, so the top edge sits at
/// `baseline - offset`.
fn decoration(
    decoration: Option<&LayoutDecoration<TextBrush>>,
    default_offset: f32,
    default_size: f32,
) -> Option<Decoration> {
    let decoration = decoration?;
    let offset = decoration.offset.unwrap_or(default_offset);
    let size = decoration.size.unwrap_or(default_size);
    Some(Decoration::new(
        -f64::from(offset),
        f64::from(size),
        decoration.brush.color,
    ))
}

fn glyph_run(glyph_run: &GlyphRun<'_, TextBrush>) -> Result<FrameRun, DrawError> {
    let run = glyph_run.run();
    let style = glyph_run.style();
    let metrics = run.metrics();
    let x0 = f64::from(glyph_run.offset());
    let mut frame_run = FrameRun::new(x0, x0 + f64::from(glyph_run.advance()), style.brush.color);
    frame_run.underline = decoration(
        style.underline.as_ref(),
        metrics.underline_offset,
        metrics.underline_size,
    );
    frame_run.strikethrough = decoration(
        style.strikethrough.as_ref(),
        metrics.strikethrough_offset,
        metrics.strikethrough_size,
    );
    frame_run.background = style.brush.background;
    frame_run.shadow = style.brush.shadow;

    let font = run.font();
    let font_ref = FontRef::from_index(font.data.as_ref(), font.index).map_err(DrawError::font)?;
    let outlines = font_ref.outline_glyphs();
    let coords: Vec<NormalizedCoord> = run
        .normalized_coords()
        .iter()
        .map(|c| NormalizedCoord::from_bits(*c))
        .collect();
    let size = Size::new(run.font_size());
    let baseline = glyph_run.baseline();

    for glyph in glyph_run.positioned_glyphs() {
        let Some(outline) = outlines.get(GlyphId::new(glyph.id)) else {
            log::warn!("font has no outline for glyph {}, skipping it", glyph.id);
            continue;
        };
        let mut pen = FlippedPen(BezPath::new());
        let settings = DrawSettings::unhinted(size, LocationRef::new(&coords));
        if let Err(err) = outline.draw(settings, &mut pen) {
            log::warn!("failed to draw glyph {}: {err}, skipping it", glyph.id);
            continue;
        }
        let placement = Affine::translate((f64::from(glyph.x), f64::from(glyph.y - baseline)));
        frame_run.glyphs.push(FrameGlyph::new(placement * pen.0));
    }
    Ok(frame_run)
}

impl TextFrame {
    /// Builds a frame from a Parley layout whose lines have already been broken.
    ///
    /// Glyph outlines are extracted unhinted at the run's font size and variation
    /// coordinates. With a display scale, baselines are rounded so that they fall on whole
    /// display pixels once `scale_factor` is applied.
    pub fn from_layout(
        layout: &Layout<TextBrush>,
        options: &FrameOptions,
        scale_factor: f64,
    ) -> Result<Self, DrawError> {
        let rounding = options
            .display_scale
            .map(|display_scale| display_scale * scale_factor);
        let mut lines = Vec::new();
        for line in layout.lines() {
            let metrics = line.metrics();
            let baseline = f64::from(metrics.baseline);
            let baseline = rounding.map_or(baseline, |scale| baseline.round_to_scale(scale));
            let mut frame_line = FrameLine::new(
                baseline,
                f64::from(metrics.ascent),
                f64::from(metrics.descent),
            );
            for item in line.items() {
                let PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                frame_line.runs.push(glyph_run(&run)?);
            }
            lines.push(frame_line);
        }
        Ok(Self::new(lines)
            .with_scale_factor(scale_factor)
            .with_display_scale(options.display_scale))
    }
}

/// Owns the Parley contexts needed to turn text into frames.
#[derive(Default)]
pub struct FrameLayouter {
    /// Fonts available to layouts.
    pub font_cx: FontContext,
    layout_cx: LayoutContext<TextBrush>,
}

impl core::fmt::Debug for FrameLayouter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FrameLayouter").finish_non_exhaustive()
    }
}

impl FrameLayouter {
    /// Creates a layouter with an empty font collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the fonts in `data` and returns their family names.
    pub fn register_fonts(&mut self, data: Vec<u8>) -> Vec<String> {
        let families = self
            .font_cx
            .collection
            .register_fonts(parley::fontique::Blob::from(data), None);
        let mut names = Vec::new();
        for (id, _) in families {
            if let Some(name) = self.font_cx.collection.family_name(id) {
                names.push(name.to_owned());
            }
        }
        names
    }

    /// Lays out `text` and builds a frame from it.
    ///
    /// `defaults` apply to the whole text, `ranges` to byte ranges of it. When the text does
    /// not fit the container width on one line and [`FrameOptions::min_text_scale_factor`]
    /// allows it, the text is shrunk instead of (or before) being broken.
    pub fn build(
        &mut self,
        text: &str,
        defaults: &[StyleProperty<'_, TextBrush>],
        ranges: &[(Range<usize>, StyleProperty<'_, TextBrush>)],
        options: &FrameOptions,
    ) -> Result<TextFrame, DrawError> {
        let mut builder = self
            .layout_cx
            .ranged_builder(&mut self.font_cx, text, 1.0, true);
        for property in defaults {
            builder.push_default(property.clone());
        }
        for (range, property) in ranges {
            builder.push(property.clone(), range.clone());
        }
        let mut layout: Layout<TextBrush> = builder.build(text);

        let width = options
            .size
            .map(|size| size.width)
            .filter(|w| *w > 0.0 && w.is_finite());
        layout.break_all_lines(None);
        let (scale_factor, max_advance) = match width {
            Some(width) => {
                let natural = f64::from(layout.width());
                let min = options.min_text_scale_factor.clamp(0.0, 1.0);
                let fit = width / natural;
                if natural <= width || min >= 1.0 {
                    (1.0, Some(width))
                } else if fit >= min {
                    // Shrunk, every line fits unbroken.
                    (fit, None)
                } else {
                    (min, Some(width / min))
                }
            }
            None => (1.0, None),
        };
        if let Some(max_advance) = max_advance {
            #[expect(
                clippy::cast_possible_truncation,
                reason = "Parley works in f32 layout units"
            )]
            let max_advance = max_advance as f32;
            layout.break_all_lines(Some(max_advance));
            layout.align(
                Some(max_advance),
                Alignment::Start,
                AlignmentOptions::default(),
            );
        }
        log::debug!(
            "laid out {} bytes of text in {} lines, scale factor {scale_factor}",
            text.len(),
            layout.len()
        );
        TextFrame::from_layout(&layout, options, scale_factor)
    }
}
