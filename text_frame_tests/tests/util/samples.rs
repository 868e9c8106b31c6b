// Copyright 2026 the Text Frame Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sample frames with synthetic glyph outlines, so that rendering tests don't depend on the
//! fonts installed on the machine.

use text_frame::kurbo::{BezPath, Circle, Rect, Shape};
use text_frame::peniko::Color;
use text_frame::{Decoration, FrameLine, FrameRun, Shadow, TextFrame};

pub(crate) const RED: Color = Color::from_rgb8(255, 0, 0);

/// A rectangle outline, in baseline-relative glyph coordinates.
fn bar(x0: f64, y0: f64, x1: f64, y1: f64) -> BezPath {
    Rect::new(x0, y0, x1, y1).to_path(0.1)
}

/// A "G": a ring with a bar, nine units tall, sitting on the baseline.
pub(crate) fn glyph_g(x: f64) -> BezPath {
    let center = (x + 4.5, -4.5);
    let mut path = Circle::new(center, 4.5).to_path(0.01);
    let mut hole = Circle::new(center, 2.8).to_path(0.01);
    hole.reverse_subpaths();
    path.extend(hole);
    path.extend(bar(x + 4.5, -5.0, x + 9.0, -3.8));
    path
}

/// An "L", ten units tall.
pub(crate) fn glyph_l(x: f64) -> BezPath {
    let mut path = bar(x, -10.0, x + 1.6, 0.0);
    path.extend(bar(x, -1.6, x + 6.0, 0.0));
    path
}

/// A block standing in for a lowercase letter.
pub(crate) fn glyph_x(x: f64) -> BezPath {
    bar(x + 0.5, -6.0, x + 4.5, 0.0)
}

/// A single shadowed "G".
pub(crate) fn shadowed_g() -> TextFrame {
    TextFrame::new(vec![FrameLine::new(12.0, 10.0, 3.0).with_run(
        FrameRun::new(0.0, 10.0, Color::BLACK)
            .with_glyph(glyph_g(0.5))
            .with_shadow(Shadow::new((2.0, 1.5), 1.0, Color::BLACK.with_alpha(0.6))),
    )])
}

/// An underlined "L" on a red background, with its baseline between pixel rows.
pub(crate) fn underlined_l() -> TextFrame {
    TextFrame::new(vec![FrameLine::new(10.3, 8.0, 2.2).with_run(
        FrameRun::new(1.0, 11.0, Color::BLACK)
            .with_glyph(glyph_l(2.0))
            .with_underline(Decoration::new(1.1, 0.7, Color::BLACK))
            .with_background(RED),
    )])
}

/// "Apple" with an underline, a strikethrough and a shadow.
pub(crate) fn apple() -> TextFrame {
    let mut run = FrameRun::new(1.0, 23.0, Color::BLACK)
        .with_underline(Decoration::new(1.2, 0.8, Color::BLACK))
        .with_strikethrough(Decoration::new(-3.4, 0.8, RED))
        .with_shadow(Shadow::new((1.0, 1.0), 0.5, Color::BLACK.with_alpha(0.5)));
    run = run.with_glyph(glyph_l(1.0));
    for i in 0..4 {
        run = run.with_glyph(glyph_x(7.5 + 4.0 * f64::from(i)));
    }
    TextFrame::new(vec![FrameLine::new(14.6, 11.0, 3.0).with_run(run)])
}
