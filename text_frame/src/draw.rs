// Copyright 2026 the Text Frame Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drawing text frames into surfaces.

use crate::frame::{FrameLine, FrameRun, Shadow, TextFrame};
use crate::kurbo::{Affine, Point, Rect, Vec2};
use crate::math::{apply_linear, is_axis_aligned, length_scale, FloatExt as _};
use crate::surface::{Surface, SurfaceKind, SurfaceShadow};
use crate::DrawError;

/// Per-call drawing parameters. Nothing here is retained after the call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawParams {
    /// Offset of the frame origin in the surface's current user space.
    pub origin: Point,
    /// The `d` coefficient of the surface's base transform.
    ///
    /// `None` or `Some(0.0)` reads it from [`Surface::base_transform`]. An explicit value
    /// must match the surface, otherwise shadows are misplaced.
    pub context_base_ctm_d: Option<f64>,
    /// Snap baselines and the horizontal edges of decorations and backgrounds to device
    /// pixels. Only has an effect on raster surfaces with axis-aligned transforms.
    pub pixel_align_baselines: bool,
}

impl Default for DrawParams {
    fn default() -> Self {
        Self {
            origin: Point::ZERO,
            context_base_ctm_d: None,
            pixel_align_baselines: true,
        }
    }
}

impl DrawParams {
    /// Default parameters with the frame origin at `origin`.
    pub fn at(origin: impl Into<Point>) -> Self {
        Self {
            origin: origin.into(),
            ..Self::default()
        }
    }

    /// Uses an explicit base CTM `d` value instead of asking the surface.
    pub fn with_base_ctm_d(mut self, d: f64) -> Self {
        self.context_base_ctm_d = Some(d);
        self
    }

    /// Enables or disables pixel alignment.
    pub fn with_pixel_alignment(mut self, pixel_align_baselines: bool) -> Self {
        self.pixel_align_baselines = pixel_align_baselines;
        self
    }
}

/// Determines the base CTM `d` value for drawing into `surface`.
///
/// An explicit non-zero value wins; otherwise the surface's base transform is queried.
pub fn resolve_base_ctm_d(surface: &dyn Surface, explicit: Option<f64>) -> Result<f64, DrawError> {
    let d = match explicit.filter(|d| *d != 0.0) {
        Some(d) => d,
        None => {
            let base = surface
                .base_transform()
                .ok_or(DrawError::UnknownBaseTransform)?;
            base.as_coeffs()[3]
        }
    };
    if d == 0.0 || !d.is_finite() {
        return Err(DrawError::InvalidBaseCtm(d));
    }
    Ok(d)
}

/// Snaps vertical positions to device pixel rows.
///
/// Built from a transform that maps user space into a pixel grid without rotation or skew,
/// so that a user space `y` maps to device row `d * y + f`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PixelGrid {
    d: f64,
    f: f64,
}

impl PixelGrid {
    /// Returns `None` if `transform` rotates, skews or collapses the y axis.
    pub fn new(transform: &Affine) -> Option<Self> {
        let [_, _, _, d, _, f] = transform.as_coeffs();
        if !is_axis_aligned(transform) || d.is_nearly_zero() || !d.is_finite() {
            return None;
        }
        Some(Self { d, f })
    }

    fn to_device(self, y: f64) -> f64 {
        self.d * y + self.f
    }

    fn to_user(self, row: f64) -> f64 {
        (row - self.f) / self.d
    }

    /// Moves `y` to the nearest device pixel boundary.
    pub fn snap_y(self, y: f64) -> f64 {
        self.to_user(self.to_device(y).round())
    }

    /// Snaps both ends of the span `y0..y1`, keeping it at least one device pixel high.
    ///
    /// The result is ordered top to bottom in user space.
    pub fn snap_span(self, y0: f64, y1: f64) -> (f64, f64) {
        let a = self.to_device(y0).round();
        let b = self.to_device(y1).round();
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let hi = if hi - lo < 1.0 { lo + 1.0 } else { hi };
        let (u0, u1) = (self.to_user(lo), self.to_user(hi));
        if u0 <= u1 {
            (u0, u1)
        } else {
            (u1, u0)
        }
    }

    /// Snaps the horizontal edges of `rect`.
    pub fn snap_rect(self, rect: Rect) -> Rect {
        let (y0, y1) = self.snap_span(rect.y0, rect.y1);
        Rect::new(rect.x0, y0, rect.x1, y1)
    }
}

/// Converts a layout-space shadow into the surface's default user space.
///
/// `local` maps layout space into device space and the base transform is assumed to be an
/// axis-aligned scale of `|base_ctm_d|` horizontally and `base_ctm_d` vertically.
pub(crate) fn shadow_in_default_space(
    shadow: &Shadow,
    local: &Affine,
    base_ctm_d: f64,
) -> SurfaceShadow {
    let device = apply_linear(local, shadow.offset);
    let base_scale = base_ctm_d.abs();
    SurfaceShadow {
        offset: Vec2::new(device.x / base_scale, device.y / base_ctm_d),
        blur: shadow.blur * length_scale(local) / base_scale,
        color: shadow.color,
    }
}

/// Draws `frame` into `surface`.
///
/// The frame's layout coordinates are mapped through
/// `current transform * translate(origin) * scale(frame scale factor)`. The surface's
/// transform is restored before returning. Errors are reported before anything is painted.
pub fn draw_frame(
    frame: &TextFrame,
    surface: &mut dyn Surface,
    params: &DrawParams,
) -> Result<(), DrawError> {
    let base_ctm_d = resolve_base_ctm_d(surface, params.context_base_ctm_d)?;
    let saved = surface.transform();
    let det = saved.determinant();
    if det == 0.0 || !det.is_finite() {
        return Err(DrawError::NonInvertibleTransform);
    }

    let local = saved
        * Affine::translate(params.origin.to_vec2())
        * Affine::scale(frame.scale_factor());
    let grid = if params.pixel_align_baselines {
        match surface.kind() {
            SurfaceKind::Raster => {
                let grid = PixelGrid::new(&local);
                if grid.is_none() {
                    log::debug!(
                        "transform {local:?} is not axis-aligned, skipping pixel alignment"
                    );
                }
                grid
            }
            SurfaceKind::Vector => None,
        }
    } else {
        None
    };
    log::trace!(
        "drawing frame of {} lines at {:?}, base CTM d {base_ctm_d}, aligned: {}",
        frame.lines().len(),
        params.origin,
        grid.is_some()
    );

    let mut painter = Painter {
        surface,
        local,
        grid,
        base_ctm_d,
    };
    for line in frame.lines() {
        for run in &line.runs {
            painter.paint_run(line, run);
        }
    }
    painter.surface.set_transform(saved);
    Ok(())
}

struct Painter<'a> {
    surface: &'a mut dyn Surface,
    local: Affine,
    grid: Option<PixelGrid>,
    base_ctm_d: f64,
}

impl Painter<'_> {
    fn align(&self, rect: Rect) -> Rect {
        self.grid.map_or(rect, |grid| grid.snap_rect(rect))
    }

    fn paint_run(&mut self, line: &FrameLine, run: &FrameRun) {
        let baseline = self
            .grid
            .map_or(line.baseline, |grid| grid.snap_y(line.baseline));

        self.surface.set_transform(self.local);
        if let Some(background) = run.background {
            let rect = self.align(line.run_box(run, baseline));
            self.surface.fill_rect(&rect, background);
        }

        if let Some(shadow) = &run.shadow {
            self.surface
                .begin_shadow(shadow_in_default_space(shadow, &self.local, self.base_ctm_d));
        }

        self.surface
            .set_transform(self.local * Affine::translate((0.0, baseline)));
        for glyph in &run.glyphs {
            self.surface.fill_path(&glyph.path, run.color);
        }

        self.surface.set_transform(self.local);
        for decoration in run.decorations() {
            let rect = self.align(decoration.rect(run.x0, run.x1, baseline));
            self.surface.fill_rect(&rect, decoration.color);
        }

        if run.shadow.is_some() {
            self.surface.end_shadow();
        }
    }
}

impl TextFrame {
    /// Draws the frame into `surface`. See [`draw_frame`].
    pub fn draw(&self, surface: &mut dyn Surface, params: &DrawParams) -> Result<(), DrawError> {
        draw_frame(self, surface, params)
    }

    /// Draws the frame at `origin`, inferring the base CTM and aligning to pixels.
    pub fn draw_at(
        &self,
        surface: &mut dyn Surface,
        origin: impl Into<Point>,
    ) -> Result<(), DrawError> {
        draw_frame(self, surface, &DrawParams::at(origin))
    }
}
