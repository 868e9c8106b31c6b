// Copyright 2026 the Text Frame Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Text Frame draws fully laid-out text into raster and vector surfaces.
//!
//! A [`TextFrame`] is an immutable snapshot of positioned glyph outlines, decorations,
//! background fills and shadows. [`draw_frame`] paints it into anything implementing
//! [`Surface`], composing the frame's layout coordinates with an origin offset and the
//! surface's current transform. Horizontal edges can be snapped to device pixels so that
//! underlines and backgrounds stay crisp at fractional origins.
//!
//! ## Coordinate spaces
//!
//! - *Layout space* is y-down, in layout units, with the frame origin at the top left.
//! - *Device space* is y-up with the origin at the bottom left, in pixels for raster
//!   surfaces and in points for vector pages.
//! - A surface's *base transform* maps its default user space into device space. Its `d`
//!   coefficient is the "base CTM d" value that [`DrawParams::context_base_ctm_d`] refers to.
//!
//! ## Surfaces
//!
//! - [`RasterSurface`](renderers::raster::RasterSurface) renders bitmaps;
//!   [`create_image`](renderers::raster::create_image) prepares one the way a bitmap graphics
//!   context is set up.
//! - [`PdfPage`](renderers::pdf::PdfPage) records a vector page that can be written as PDF
//!   or replayed into another surface.
//!
//! ## Features
//!
//! - `vello_cpu` (enabled by default): [`RasterSurface`](renderers::raster::RasterSurface),
//!   a bitmap surface rendered by Vello CPU.
//! - `parley` (enabled by default): builds frames from Parley layouts, extracting glyph
//!   outlines with Skrifa.
//! - `png` (enabled by default): PNG encoding for rendered bitmaps.

// LINEBENDER LINT SET - lib.rs - v3
// See https://linebender.org/wiki/canonical-lints/
// These lints shouldn't apply to examples or tests.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
// These lints shouldn't apply to examples.
#![warn(clippy::print_stdout, clippy::print_stderr)]
// Targeting e.g. 32-bit means structs containing usize can give false positives for 64-bit.
#![cfg_attr(target_pointer_width = "64", warn(clippy::trivially_copy_pass_by_ref))]
// END LINEBENDER LINT SET
#![cfg_attr(docsrs, feature(doc_cfg))]

pub use vello_common::{kurbo, peniko};

#[cfg(feature = "vello_cpu")]
mod blur;
mod draw;
mod error;
mod frame;
#[cfg(feature = "parley")]
mod layout;
mod math;
mod surface;

pub mod renderers;

pub use draw::{draw_frame, resolve_base_ctm_d, DrawParams, PixelGrid};
pub use error::DrawError;
pub use frame::{Decoration, FrameGlyph, FrameLine, FrameRun, Shadow, TextFrame};
#[cfg(feature = "parley")]
pub use layout::{FrameLayouter, FrameOptions, TextBrush};
pub use surface::{Surface, SurfaceKind, SurfaceShadow};
