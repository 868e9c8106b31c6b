// Copyright 2026 the Text Frame Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The destination surface abstraction.

use crate::kurbo::{Affine, BezPath, Rect, Shape as _, Vec2};
use crate::peniko::Color;

/// What a surface's device space is made of.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SurfaceKind {
    /// A pixel grid; device units are pixels.
    Raster,
    /// A resolution independent page; device units are points.
    Vector,
}

/// Shadow parameters in a surface's default user space.
///
/// The default user space is the space the surface's base transform maps into device
/// space, so shadow offsets ignore any transform concatenated after the surface was created.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceShadow {
    /// Offset in default user space units.
    pub offset: Vec2,
    /// Blur radius in default user space units.
    pub blur: f64,
    /// Shadow color.
    pub color: Color,
}

/// A 2D drawing destination with a known transform.
///
/// Device space is y-up with its origin at the bottom left. Paths are given in the current
/// user space, which [`Surface::transform`] maps into device space.
pub trait Surface {
    /// What the device space of the surface is made of.
    fn kind(&self) -> SurfaceKind;

    /// The current transform from user space to device space.
    fn transform(&self) -> Affine;

    /// Replaces the current transform.
    fn set_transform(&mut self, transform: Affine);

    /// Concatenates `transform` onto the current transform, so that it applies first.
    fn concat_transform(&mut self, transform: Affine) {
        let current = self.transform();
        self.set_transform(current * transform);
    }

    /// The transform from the surface's default user space to device space, if known.
    fn base_transform(&self) -> Option<Affine>;

    /// Fills `path`, given in user space, with a solid color.
    fn fill_path(&mut self, path: &BezPath, color: Color);

    /// Fills `rect`, given in user space, with a solid color.
    fn fill_rect(&mut self, rect: &Rect, color: Color) {
        self.fill_path(&rect.to_path(0.1), color);
    }

    /// Starts casting `shadow` from everything filled until the matching
    /// [`Surface::end_shadow`].
    fn begin_shadow(&mut self, shadow: SurfaceShadow);

    /// Ends the current shadow scope.
    fn end_shadow(&mut self);
}
