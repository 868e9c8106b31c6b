// Copyright 2026 the Text Frame Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frames built from Parley layouts with the bundled test font.

use std::borrow::Cow;

use parley::style::{FontFamily, FontStack, StyleProperty};
use text_frame::kurbo::{Affine, Shape as _, Size};
use text_frame::peniko::Color;
use text_frame::renderers::raster::{Bitmap, ImageFormat, RasterSurface};
use text_frame::{
    DrawParams, FrameLayouter, FrameOptions, Shadow, Surface as _, TextBrush, TextFrame,
};

use crate::util::{check_snapshot, column, is_partial, layouter, samples, DEFAULT_FONT_NAME};

const ORIGIN: (f64, f64) = (1.5, -0.25);

fn build_sized(
    layouter: &mut FrameLayouter,
    text: &str,
    font_size: f32,
    brush: TextBrush,
    options: &FrameOptions,
) -> TextFrame {
    let styles = [
        StyleProperty::FontStack(FontStack::Single(FontFamily::Named(Cow::Borrowed(
            DEFAULT_FONT_NAME,
        )))),
        StyleProperty::FontSize(font_size),
        StyleProperty::Brush(brush.clone()),
        StyleProperty::Underline(true),
        StyleProperty::UnderlineBrush(Some(brush)),
    ];
    layouter.build(text, &styles, &[], options).unwrap()
}

fn build(
    layouter: &mut FrameLayouter,
    text: &str,
    brush: TextBrush,
    options: &FrameOptions,
) -> TextFrame {
    build_sized(layouter, text, 16.0, brush, options)
}

/// An underlined "L" on a red background, followed by a space so that the run extends past
/// the glyph.
fn underlined_l(layouter: &mut FrameLayouter, options: &FrameOptions) -> TextFrame {
    let brush = TextBrush::solid(Color::BLACK).with_background(samples::RED);
    build_sized(layouter, "L ", 18.25, brush, options)
}

/// Draws at 2x into a surface translated by `(-1, 1)`, like a caller that moved the context
/// before handing it over.
fn draw_translated(frame: &TextFrame, pixel_align_baselines: bool) -> Bitmap {
    let bounds = frame.layout_bounds();
    let size = Size::new((bounds.x1 + 2.0).ceil(), (bounds.y1 + 2.0).ceil());
    let mut surface = RasterSurface::new(size, 2.0, ImageFormat::RGB8).unwrap();
    surface.concat_transform(Affine::translate((-1.0, 1.0)));
    let params = DrawParams::at(ORIGIN).with_pixel_alignment(pixel_align_baselines);
    frame.draw(&mut surface, &params).unwrap();
    surface.finish()
}

/// A device column that crosses the background and the underline of the first run but none
/// of its glyphs, for a frame drawn by [`draw_translated`].
#[expect(
    clippy::cast_possible_truncation,
    reason = "device columns are small and non-negative"
)]
fn glyph_free_column(frame: &TextFrame) -> u32 {
    let run = &frame.lines()[0].runs[0];
    let glyphs_x1 = run
        .glyphs
        .iter()
        .map(|glyph| glyph.path.bounding_box().x1)
        .fold(run.x0, f64::max);
    let to_device = |x: f64| 2.0 * (ORIGIN.0 + frame.scale_factor() * x - 1.0);
    let first = to_device(glyphs_x1).ceil();
    assert!(
        first + 1.0 <= to_device(run.x1).floor(),
        "the run extends at least one pixel past its glyphs"
    );
    first as u32
}

/// The red and green channels of `x`: red shows the underline against the red background,
/// green shows the background against white.
fn edges(bitmap: &Bitmap, x: u32) -> Vec<u8> {
    let mut values = column(bitmap, x, 0);
    values.extend(column(bitmap, x, 1));
    values
}

#[test]
fn layout_apple_has_glyphs_and_underline() {
    let mut layouter = layouter();
    let frame = build(
        &mut layouter,
        "Apple",
        TextBrush::solid(Color::BLACK),
        &FrameOptions::default(),
    );

    let run = &frame.lines()[0].runs[0];
    assert_eq!(run.glyphs.len(), 5);
    let underline = run.underline.expect("underline requested");
    assert!(underline.offset > 0.0, "underline sits below the baseline");
    assert!(frame.layout_bounds().width() > 0.0, "bounds cover the text");
}

#[test]
fn layout_shrinks_to_fit() {
    let mut layouter = layouter();
    let natural = build(
        &mut layouter,
        "Apple Apple",
        TextBrush::default(),
        &FrameOptions::default(),
    );
    let width = natural.layout_bounds().width() * 0.75;
    let options = FrameOptions {
        min_text_scale_factor: 0.5,
        ..FrameOptions::with_size((width, 100.0))
    };
    let shrunk = build(&mut layouter, "Apple Apple", TextBrush::default(), &options);

    assert_eq!(shrunk.lines().len(), 1, "shrinking avoids a line break");
    assert!(
        (0.5..1.0).contains(&shrunk.scale_factor()),
        "scale factor {}",
        shrunk.scale_factor()
    );
    assert!(shrunk.layout_bounds().width() <= width + 0.01, "fits the container");
}

#[test]
fn layout_breaks_when_shrinking_is_not_enough() {
    let mut layouter = layouter();
    let natural = build(
        &mut layouter,
        "Apple Apple",
        TextBrush::default(),
        &FrameOptions::default(),
    );
    let width = natural.layout_bounds().width() * 0.6;
    let options = FrameOptions {
        min_text_scale_factor: 0.9,
        ..FrameOptions::with_size((width, 100.0))
    };
    let frame = build(&mut layouter, "Apple Apple", TextBrush::default(), &options);

    assert_eq!(frame.scale_factor(), 0.9);
    assert_eq!(frame.lines().len(), 2);
}

#[test]
fn layout_baselines_snap_to_display_pixels() {
    let mut layouter = layouter();
    let options = FrameOptions {
        display_scale: Some(3.0),
        ..FrameOptions::with_size((40.0, 200.0))
    };
    let frame = build(
        &mut layouter,
        "Apple Apple Apple",
        TextBrush::default(),
        &options,
    );

    assert_eq!(frame.display_scale(), Some(3.0));
    for line in frame.lines() {
        let pixels = line.baseline * 3.0;
        assert!((pixels - pixels.round()).abs() < 1e-6, "baseline {}", line.baseline);
    }
}

#[test]
fn layout_brush_carries_background_and_shadow() {
    let mut layouter = layouter();
    let shadow = Shadow::new((1.0, 1.0), 2.0, Color::BLACK);
    let brush = TextBrush::solid(Color::BLACK)
        .with_background(samples::RED)
        .with_shadow(shadow);
    let frame = build(&mut layouter, "Apple", brush, &FrameOptions::default());

    let run = &frame.lines()[0].runs[0];
    assert_eq!(run.background, Some(samples::RED));
    assert_eq!(run.shadow, Some(shadow));
}

#[test]
fn layout_underline_is_pixel_aligned() {
    let mut layouter = layouter();
    let frame = underlined_l(&mut layouter, &FrameOptions::default());
    let bitmap = draw_translated(&frame, true);
    let values = edges(&bitmap, glyph_free_column(&frame));

    assert!(
        values.iter().all(|v| !is_partial(*v)),
        "every row is fully covered or untouched: {values:?}"
    );
    assert!(values.contains(&0), "underline is visible");
    check_snapshot(crate::test_name!(), &bitmap);
}

#[test]
fn layout_underline_unaligned_has_partial_rows() {
    let mut layouter = layouter();
    let frame = underlined_l(&mut layouter, &FrameOptions::default());
    let bitmap = draw_translated(&frame, false);
    let values = edges(&bitmap, glyph_free_column(&frame));

    assert!(
        values.iter().any(|v| is_partial(*v)),
        "fractional edges leave partially covered rows: {values:?}"
    );
}

/// Shrinks the underlined "L" to half its width through the minimum text scale factor.
fn shrunk_underlined_l(layouter: &mut FrameLayouter) -> TextFrame {
    let natural = underlined_l(layouter, &FrameOptions::default());
    let options = FrameOptions {
        min_text_scale_factor: 0.1,
        ..FrameOptions::with_size((natural.layout_bounds().width() / 2.0, 1000.0))
    };
    underlined_l(layouter, &options)
}

#[test]
fn layout_underline_is_pixel_aligned_when_shrunk() {
    let mut layouter = layouter();
    let frame = shrunk_underlined_l(&mut layouter);
    assert!(
        frame.scale_factor() < 1.0 && frame.scale_factor() >= 0.1,
        "frame is shrunk, scale factor {}",
        frame.scale_factor()
    );
    assert_eq!(frame.lines().len(), 1, "shrinking avoids a line break");

    let bitmap = draw_translated(&frame, true);
    let values = edges(&bitmap, glyph_free_column(&frame));

    assert!(
        values.iter().all(|v| !is_partial(*v)),
        "every row is fully covered or untouched: {values:?}"
    );
    assert!(values.contains(&0), "underline is visible");
    check_snapshot(crate::test_name!(), &bitmap);
}

#[test]
fn layout_underline_unaligned_when_shrunk_has_partial_rows() {
    let mut layouter = layouter();
    let frame = shrunk_underlined_l(&mut layouter);
    let bitmap = draw_translated(&frame, false);
    let values = edges(&bitmap, glyph_free_column(&frame));

    assert!(
        values.iter().any(|v| is_partial(*v)),
        "fractional edges leave partially covered rows: {values:?}"
    );
}
