// Copyright 2026 the Text Frame Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The immutable text frame model.

use crate::kurbo::{Affine, BezPath, Rect, Vec2};
use crate::peniko::Color;

/// A shadow cast by the glyphs and decorations of a run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shadow {
    /// Offset of the shadow in layout units. Positive `y` moves the shadow down.
    pub offset: Vec2,
    /// Blur radius in layout units.
    pub blur: f64,
    /// Shadow color.
    pub color: Color,
}

impl Shadow {
    /// Creates a new shadow.
    pub fn new(offset: impl Into<Vec2>, blur: f64, color: Color) -> Self {
        Self {
            offset: offset.into(),
            blur,
            color,
        }
    }
}

/// An underline or strikethrough line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Decoration {
    /// Distance from the baseline to the top edge of the line, y-down.
    ///
    /// Underlines usually have a positive offset, strikethroughs a negative one.
    pub offset: f64,
    /// Thickness of the line.
    pub thickness: f64,
    /// Line color.
    pub color: Color,
}

impl Decoration {
    /// Creates a new decoration.
    pub fn new(offset: f64, thickness: f64, color: Color) -> Self {
        Self {
            offset,
            thickness,
            color,
        }
    }

    /// The rectangle covered by the decoration for a run spanning `x0..x1` on `baseline`.
    pub fn rect(&self, x0: f64, x1: f64, baseline: f64) -> Rect {
        let top = baseline + self.offset;
        Rect::new(x0, top, x1, top + self.thickness)
    }
}

/// A glyph outline.
///
/// `x` coordinates are absolute layout coordinates, `y` coordinates are relative to the
/// baseline of the containing line (y-down), so moving a baseline moves its glyphs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameGlyph {
    /// Outline of the glyph.
    pub path: BezPath,
}

impl FrameGlyph {
    /// Creates a glyph from an outline.
    pub fn new(path: BezPath) -> Self {
        Self { path }
    }
}

/// A sequence of glyphs sharing one style.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameRun {
    /// Left edge of the run.
    pub x0: f64,
    /// Right edge of the run.
    pub x1: f64,
    /// Glyph outlines.
    pub glyphs: Vec<FrameGlyph>,
    /// Glyph fill color.
    pub color: Color,
    /// Underline, if any.
    pub underline: Option<Decoration>,
    /// Strikethrough, if any.
    pub strikethrough: Option<Decoration>,
    /// Background fill behind the run's line box, if any.
    pub background: Option<Color>,
    /// Shadow of glyphs and decorations, if any.
    pub shadow: Option<Shadow>,
}

impl FrameRun {
    /// Creates an empty run spanning `x0..x1`.
    pub fn new(x0: f64, x1: f64, color: Color) -> Self {
        Self {
            x0,
            x1,
            glyphs: Vec::new(),
            color,
            underline: None,
            strikethrough: None,
            background: None,
            shadow: None,
        }
    }

    /// Adds a glyph outline.
    pub fn with_glyph(mut self, path: BezPath) -> Self {
        self.glyphs.push(FrameGlyph::new(path));
        self
    }

    /// Sets the underline.
    pub fn with_underline(mut self, underline: Decoration) -> Self {
        self.underline = Some(underline);
        self
    }

    /// Sets the strikethrough.
    pub fn with_strikethrough(mut self, strikethrough: Decoration) -> Self {
        self.strikethrough = Some(strikethrough);
        self
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

    /// Iterates over the decorations of the run, underline first.
    pub fn decorations(&self) -> impl Iterator<Item = &Decoration> {
        self.underline.iter().chain(self.strikethrough.iter())
    }
}

/// A line of runs sharing a baseline.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameLine {
    /// Baseline position (y-down, layout units).
    pub baseline: f64,
    /// Distance from the baseline to the top of the line box.
    pub ascent: f64,
    /// Distance from the baseline to the bottom of the line box.
    pub descent: f64,
    /// Runs in visual order.
    pub runs: Vec<FrameRun>,
}

impl FrameLine {
    /// Creates an empty line.
    pub fn new(baseline: f64, ascent: f64, descent: f64) -> Self {
        Self {
            baseline,
            ascent,
            descent,
            runs: Vec::new(),
        }
    }

    /// Adds a run.
    pub fn with_run(mut self, run: FrameRun) -> Self {
        self.runs.push(run);
        self
    }

    /// The line box of `run` when the line sits on `baseline`.
    pub fn run_box(&self, run: &FrameRun, baseline: f64) -> Rect {
        Rect::new(run.x0, baseline - self.ascent, run.x1, baseline + self.descent)
    }
}

/// A fully laid-out, immutable piece of text.
///
/// Geometry is stored in layout space; [`Self::scale_factor`] is applied about the frame
/// origin when drawing.
#[derive(Clone, Debug, PartialEq)]
pub struct TextFrame {
    lines: Vec<FrameLine>,
    scale_factor: f64,
    display_scale: Option<f64>,
    layout_bounds: Rect,
}

impl TextFrame {
    /// Creates a frame from lines, unscaled and without a display scale.
    pub fn new(lines: Vec<FrameLine>) -> Self {
        let mut frame = Self {
            lines,
            scale_factor: 1.0,
            display_scale: None,
            layout_bounds: Rect::ZERO,
        };
        frame.layout_bounds = frame.compute_bounds();
        frame
    }

    /// Sets the text scale factor. Non-positive or non-finite factors are treated as `1.0`.
    pub fn with_scale_factor(mut self, scale_factor: f64) -> Self {
        self.scale_factor = if scale_factor > 0.0 && scale_factor.is_finite() {
            scale_factor
        } else {
            1.0
        };
        self.layout_bounds = self.compute_bounds();
        self
    }

    /// Records the display scale the frame was laid out for.
    pub fn with_display_scale(mut self, display_scale: Option<f64>) -> Self {
        self.display_scale = display_scale.filter(|s| *s > 0.0 && s.is_finite());
        self
    }

    /// The lines of the frame.
    pub fn lines(&self) -> &[FrameLine] {
        &self.lines
    }

    /// The factor the frame's contents are scaled by when drawn.
    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    /// The display scale the frame was laid out for, if known.
    pub fn display_scale(&self) -> Option<f64> {
        self.display_scale
    }

    /// Bounding rectangle of every line box, decoration and background, after scaling.
    ///
    /// Shadows are not included.
    pub fn layout_bounds(&self) -> Rect {
        self.layout_bounds
    }

    /// Whether the frame contains no runs.
    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(|line| line.runs.is_empty())
    }

    fn compute_bounds(&self) -> Rect {
        let mut bounds: Option<Rect> = None;
        let mut add = |rect: Rect| {
            bounds = Some(bounds.map_or(rect, |b| b.union(rect)));
        };
        for line in &self.lines {
            for run in &line.runs {
                add(line.run_box(run, line.baseline));
                for decoration in run.decorations() {
                    add(decoration.rect(run.x0, run.x1, line.baseline));
                }
            }
        }
        bounds.map_or(Rect::ZERO, |b| {
            Affine::scale(self.scale_factor).transform_rect_bbox(b)
        })
    }
}
