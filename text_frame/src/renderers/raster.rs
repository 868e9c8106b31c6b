// Copyright 2026 the Text Frame Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A bitmap [`Surface`] rendered with Vello CPU.

#![allow(
    clippy::cast_possible_truncation,
    reason = "pixel sizes are checked against u16::MAX before casting"
)]

use core::fmt;
use std::sync::Arc;

use vello_cpu::{Image, ImageSource, Pixmap, RenderContext};

use crate::blur::blur_premul_rgba8;
use crate::kurbo::{Affine, BezPath, Rect, Shape as _, Size};
use crate::math::{apply_linear, length_scale};
use crate::peniko::color::PremulRgba8;
use crate::peniko::{Color, ImageQuality, ImageSampler};
use crate::surface::{Surface, SurfaceKind, SurfaceShadow};
use crate::DrawError;

/// The color model of a bitmap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorSpace {
    /// Red, green and blue channels.
    Rgb,
    /// A single luminance channel.
    Grayscale,
}

/// The channel layout of a [`Bitmap`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageFormat {
    /// The color channels.
    pub color_space: ColorSpace,
    /// Whether a straight (non-premultiplied) alpha channel follows the color channels.
    ///
    /// Formats without alpha are composited over white.
    pub alpha: bool,
}

impl ImageFormat {
    /// 8-bit RGBA.
    pub const RGBA8: Self = Self {
        color_space: ColorSpace::Rgb,
        alpha: true,
    };
    /// 8-bit RGB on white.
    pub const RGB8: Self = Self {
        color_space: ColorSpace::Rgb,
        alpha: false,
    };
    /// 8-bit luminance and alpha.
    pub const GRAY_ALPHA8: Self = Self {
        color_space: ColorSpace::Grayscale,
        alpha: true,
    };
    /// 8-bit luminance on white.
    pub const GRAY8: Self = Self {
        color_space: ColorSpace::Grayscale,
        alpha: false,
    };

    /// Number of bytes per pixel.
    pub fn channels(self) -> usize {
        let color = match self.color_space {
            ColorSpace::Rgb => 3,
            ColorSpace::Grayscale => 1,
        };
        color + usize::from(self.alpha)
    }

    fn convert(self, premul: [u8; 4], out: &mut Vec<u8>) {
        let [r, g, b, a] = premul;
        let rgb = if self.alpha {
            [r, g, b].map(|c| unpremultiply(c, a))
        } else {
            [r, g, b].map(|c| c.saturating_add(255 - a))
        };
        match self.color_space {
            ColorSpace::Rgb => out.extend_from_slice(&rgb),
            ColorSpace::Grayscale => out.push(luma(rgb)),
        }
        if self.alpha {
            out.push(a);
        }
    }
}

fn unpremultiply(c: u8, a: u8) -> u8 {
    if a == 0 {
        return 0;
    }
    let a = u32::from(a);
    ((u32::from(c) * 255 + a / 2) / a).min(255) as u8
}

/// Rec. 709 luma.
fn luma([r, g, b]: [u8; 3]) -> u8 {
    let y = u32::from(r) * 2126 + u32::from(g) * 7152 + u32::from(b) * 722;
    ((y + 5000) / 10000) as u8
}

/// Rendered pixels, stored top row first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    format: ImageFormat,
    data: Vec<u8>,
}

impl Bitmap {
    fn from_pixmap(pixmap: &Pixmap, format: ImageFormat) -> Self {
        let (width, height) = (u32::from(pixmap.width()), u32::from(pixmap.height()));
        let src = pixmap.data_as_u8_slice();
        let mut data = Vec::with_capacity(src.len() / 4 * format.channels());
        for px in src.chunks_exact(4) {
            format.convert([px[0], px[1], px[2], px[3]], &mut data);
        }
        Self {
            width,
            height,
            format,
            data,
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The channel layout of [`Self::data`].
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// Raw pixel data, rows top to bottom without padding.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// The channels of the pixel in column `x` and row `y`, counted from the top left.
    pub fn pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let channels = self.format.channels();
        let start = (y as usize * self.width as usize + x as usize) * channels;
        self.data.get(start..start + channels)
    }

    /// Encodes the bitmap as a PNG file.
    #[cfg(feature = "png")]
    pub fn to_png(&self) -> Result<Vec<u8>, DrawError> {
        let color = match (self.format.color_space, self.format.alpha) {
            (ColorSpace::Rgb, true) => png::ColorType::Rgba,
            (ColorSpace::Rgb, false) => png::ColorType::Rgb,
            (ColorSpace::Grayscale, true) => png::ColorType::GrayscaleAlpha,
            (ColorSpace::Grayscale, false) => png::ColorType::Grayscale,
        };
        let mut out = Vec::new();
        let mut encoder = png::Encoder::new(&mut out, self.width, self.height);
        encoder.set_color(color);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().map_err(DrawError::png)?;
        writer.write_image_data(&self.data).map_err(DrawError::png)?;
        writer.finish().map_err(DrawError::png)?;
        Ok(out)
    }
}

/// Rounds a size in pixels up to whole pixels and checks it against the backend's limits.
fn pixel_size(width: f64, height: f64) -> Result<(u16, u16), DrawError> {
    let (width, height) = (width.ceil(), height.ceil());
    let limit = f64::from(u16::MAX);
    // `as` saturates, and maps NaN to zero.
    let (w, h) = (width as u32, height as u32);
    if !(width >= 1.0 && height >= 1.0) {
        return Err(DrawError::EmptySurface {
            width: w,
            height: h,
        });
    }
    if width > limit || height > limit {
        return Err(DrawError::SurfaceTooLarge {
            width: w,
            height: h,
        });
    }
    Ok((w as u16, h as u16))
}

#[derive(Debug)]
struct PendingFill {
    path: BezPath,
    transform: Affine,
    color: Color,
}

#[derive(Debug)]
struct ShadowScope {
    shadow: SurfaceShadow,
    fills: Vec<PendingFill>,
}

/// A bitmap surface.
///
/// Device space is y-up in pixels. Shadow scopes are buffered: when the scope ends, the
/// silhouette of everything filled inside it is rendered offscreen, blurred and composited,
/// followed by the fills themselves.
pub struct RasterSurface {
    ctx: RenderContext,
    width: u16,
    height: u16,
    format: ImageFormat,
    base: Affine,
    transform: Affine,
    shadow: Option<ShadowScope>,
}

impl fmt::Debug for RasterSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RasterSurface")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format)
            .field("base", &self.base)
            .field("transform", &self.transform)
            .finish_non_exhaustive()
    }
}

impl RasterSurface {
    /// Creates a surface for `size` points at `scale` pixels per point, with a y-down user
    /// space whose origin is the top left corner.
    ///
    /// The base transform is `[scale, 0, 0, -scale, 0, height in pixels]`.
    pub fn new(size: Size, scale: f64, format: ImageFormat) -> Result<Self, DrawError> {
        if !(scale > 0.0 && scale.is_finite()) {
            return Err(DrawError::InvalidScale(scale));
        }
        let (width, height) = pixel_size(size.width * scale, size.height * scale)?;
        let base = Affine::new([scale, 0.0, 0.0, -scale, 0.0, f64::from(height)]);
        Ok(Self::with_base(width, height, format, base))
    }

    /// Creates a surface whose default user space is device space: y-up, in pixels.
    pub fn with_pixel_size(
        width: u32,
        height: u32,
        format: ImageFormat,
    ) -> Result<Self, DrawError> {
        let (width, height) = pixel_size(f64::from(width), f64::from(height))?;
        Ok(Self::with_base(width, height, format, Affine::IDENTITY))
    }

    fn with_base(width: u16, height: u16, format: ImageFormat, base: Affine) -> Self {
        log::debug!("creating {width}x{height} raster surface, base transform {base:?}");
        Self {
            ctx: RenderContext::new(width, height),
            width,
            height,
            format,
            base,
            transform: base,
            shadow: None,
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width.into()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height.into()
    }

    /// The pixel format [`Self::finish`] produces.
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// Maps y-up device space onto the pixmap's top-down rows.
    fn device_to_pixmap(&self) -> Affine {
        Affine::new([1.0, 0.0, 0.0, -1.0, 0.0, f64::from(self.height)])
    }

    fn paint(&mut self, path: &BezPath, transform: Affine, color: Color) {
        self.ctx.set_transform(self.device_to_pixmap() * transform);
        self.ctx.set_paint(color);
        self.ctx.fill_path(path);
    }

    fn render_shadow(&mut self, scope: &ShadowScope) {
        let SurfaceShadow {
            offset,
            blur,
            color,
        } = scope.shadow;
        let offset = apply_linear(&self.base, offset);
        let sigma = if blur.is_finite() {
            blur * length_scale(&self.base) / 2.0
        } else {
            log::warn!("shadow blur {blur} is not finite, drawing the shadow unblurred");
            0.0
        };
        log::trace!(
            "compositing shadow of {} fills, device offset {offset:?}, sigma {sigma}",
            scope.fills.len()
        );

        let to_pixmap = self.device_to_pixmap() * Affine::translate(offset);
        let mut layer = RenderContext::new(self.width, self.height);
        for fill in &scope.fills {
            layer.set_transform(to_pixmap * fill.transform);
            layer.set_paint(color.multiply_alpha(fill.color.components[3]));
            layer.fill_path(&fill.path);
        }
        layer.flush();
        let mut silhouette = Pixmap::new(self.width, self.height);
        layer.render_to_pixmap(&mut silhouette);

        let blurred = blur_premul_rgba8(
            silhouette.data_as_u8_slice(),
            self.width.into(),
            self.height.into(),
            sigma,
        );
        let pixels = blurred
            .chunks_exact(4)
            .map(|px| PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]]))
            .collect();
        let shadow = Pixmap::from_parts_with_opacity(pixels, self.width, self.height, true);

        self.ctx.set_transform(Affine::IDENTITY);
        self.ctx.set_paint(Image {
            image: ImageSource::Pixmap(Arc::new(shadow)),
            sampler: ImageSampler {
                quality: ImageQuality::Low,
                ..ImageSampler::default()
            },
        });
        self.ctx.fill_rect(&Rect::new(
            0.0,
            0.0,
            f64::from(self.width),
            f64::from(self.height),
        ));
    }

    /// Renders everything drawn so far into a bitmap.
    ///
    /// An unterminated shadow scope is closed first.
    pub fn finish(mut self) -> Bitmap {
        if self.shadow.is_some() {
            log::warn!("shadow scope left open, closing it");
            self.end_shadow();
        }
        self.ctx.flush();
        let mut pixmap = Pixmap::new(self.width, self.height);
        self.ctx.render_to_pixmap(&mut pixmap);
        Bitmap::from_pixmap(&pixmap, self.format)
    }
}

impl Surface for RasterSurface {
    fn kind(&self) -> SurfaceKind {
        SurfaceKind::Raster
    }

    fn transform(&self) -> Affine {
        self.transform
    }

    fn set_transform(&mut self, transform: Affine) {
        self.transform = transform;
    }

    fn base_transform(&self) -> Option<Affine> {
        Some(self.base)
    }

    fn fill_path(&mut self, path: &BezPath, color: Color) {
        if let Some(scope) = &mut self.shadow {
            scope.fills.push(PendingFill {
                path: path.clone(),
                transform: self.transform,
                color,
            });
            return;
        }
        self.paint(path, self.transform, color);
    }

    fn fill_rect(&mut self, rect: &Rect, color: Color) {
        if self.shadow.is_some() {
            self.fill_path(&rect.to_path(0.1), color);
            return;
        }
        self.ctx.set_transform(self.device_to_pixmap() * self.transform);
        self.ctx.set_paint(color);
        self.ctx.fill_rect(rect);
    }

    fn begin_shadow(&mut self, shadow: SurfaceShadow) {
        if self.shadow.is_some() {
            log::debug!("nested shadow scope, closing the outer one first");
            self.end_shadow();
        }
        self.shadow = Some(ShadowScope {
            shadow,
            fills: Vec::new(),
        });
    }

    fn end_shadow(&mut self) {
        let Some(scope) = self.shadow.take() else {
            return;
        };
        if !scope.fills.is_empty() {
            self.render_shadow(&scope);
        }
        for fill in scope.fills {
            self.paint(&fill.path, fill.transform, fill.color);
        }
    }
}

/// Renders an image of `size` points at `scale` pixels per point.
///
/// The surface has an identity base transform. A positive `scale` concatenates
/// `[scale, 0, 0, -scale, 0, height]`, giving `draw` a y-down user space with its origin at
/// the top left. A negative `scale` concatenates a plain scale by `|scale|`, keeping the
/// user space y-up, which is what vector pages replayed with their own flip expect.
///
/// The image is cleared to `background` before `draw` runs.
pub fn create_image(
    size: Size,
    scale: f64,
    background: Color,
    format: ImageFormat,
    draw: impl FnOnce(&mut RasterSurface) -> Result<(), DrawError>,
) -> Result<Bitmap, DrawError> {
    if scale == 0.0 || !scale.is_finite() {
        return Err(DrawError::InvalidScale(scale));
    }
    let s = scale.abs();
    let (width, height) = pixel_size(size.width * s, size.height * s)?;
    let mut surface = RasterSurface::with_base(width, height, format, Affine::IDENTITY);
    surface.fill_rect(
        &Rect::new(0.0, 0.0, f64::from(width), f64::from(height)),
        background,
    );
    let user = if scale > 0.0 {
        Affine::new([s, 0.0, 0.0, -s, 0.0, f64::from(height)])
    } else {
        Affine::scale(s)
    };
    surface.concat_transform(user);
    draw(&mut surface)?;
    Ok(surface.finish())
}
