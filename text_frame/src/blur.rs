// Copyright 2026 the Text Frame Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Separable Gaussian blur for premultiplied RGBA8 buffers, used for shadows.

#![allow(
    clippy::cast_possible_truncation,
    reason = "pixel indices and channel values are bounded by the pixmap size"
)]

/// Kernel weights in Q16 fixed point, summing to exactly `1 << 16`.
#[derive(Debug)]
struct Kernel {
    weights: Vec<u32>,
}

impl Kernel {
    /// Builds a kernel covering three standard deviations on each side, but no more than
    /// `max_radius` taps.
    fn gaussian(sigma: f64, max_radius: usize) -> Self {
        let radius = (sigma * 3.0).ceil().clamp(0.0, max_radius as f64) as i32;
        if radius == 0 {
            return Self {
                weights: vec![1 << 16],
            };
        }
        let denom = 2.0 * sigma * sigma;
        let raw: Vec<f64> = (-radius..=radius)
            .map(|i| (-f64::from(i * i) / denom).exp())
            .collect();
        let sum: f64 = raw.iter().sum();

        let mut weights: Vec<u32> = raw
            .iter()
            .map(|w| ((w / sum) * 65536.0).round().clamp(0.0, 65536.0) as u32)
            .collect();
        // Put the rounding error on the center tap so flat regions stay flat.
        let total: i64 = weights.iter().map(|w| i64::from(*w)).sum();
        let mid = weights.len() / 2;
        weights[mid] = (i64::from(weights[mid]) + 65536 - total).clamp(0, 65536) as u32;
        Self { weights }
    }

    fn radius(&self) -> i32 {
        (self.weights.len() / 2) as i32
    }
}

/// Blurs a premultiplied RGBA8 buffer of `width * height` pixels with standard deviation
/// `sigma` (in pixels). Edges are clamped, so the kernel never reaches further than the
/// larger image dimension. A non-finite or non-positive `sigma` leaves the image unchanged.
pub(crate) fn blur_premul_rgba8(src: &[u8], width: usize, height: usize, sigma: f64) -> Vec<u8> {
    debug_assert_eq!(src.len(), width * height * 4, "buffer size mismatch");
    if !sigma.is_finite() || sigma <= 0.0 || width == 0 || height == 0 {
        return src.to_vec();
    }
    let kernel = Kernel::gaussian(sigma, width.max(height));
    let mut tmp = vec![0_u8; src.len()];
    let mut out = vec![0_u8; src.len()];
    pass(src, &mut tmp, width, height, &kernel, Axis::Horizontal);
    pass(&tmp, &mut out, width, height, &kernel, Axis::Vertical);
    out
}

#[derive(Clone, Copy, Debug)]
enum Axis {
    Horizontal,
    Vertical,
}

fn pass(src: &[u8], dst: &mut [u8], width: usize, height: usize, kernel: &Kernel, axis: Axis) {
    let radius = kernel.radius();
    let (w, h) = (width as i32, height as i32);
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0_u64; 4];
            for (k, weight) in kernel.weights.iter().enumerate() {
                let delta = k as i32 - radius;
                let (sx, sy) = match axis {
                    Axis::Horizontal => ((x + delta).clamp(0, w - 1), y),
                    Axis::Vertical => (x, (y + delta).clamp(0, h - 1)),
                };
                let idx = (sy * w + sx) as usize * 4;
                for (channel, value) in acc.iter_mut().enumerate() {
                    *value += u64::from(*weight) * u64::from(src[idx + channel]);
                }
            }
            let out_idx = (y * w + x) as usize * 4;
            for (channel, value) in acc.iter().enumerate() {
                dst[out_idx + channel] = ((value + 32768) >> 16).min(255) as u8;
            }
        }
    }
}
