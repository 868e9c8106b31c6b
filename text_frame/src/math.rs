// Copyright 2026 the Text Frame Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mathematical helper functions.

use crate::kurbo::{Affine, Vec2};

// From <https://github.com/linebender/tiny-skia/blob/68b198a7210a6bbf752b43d6bc4db62445730313/path/src/scalar.rs#L12>
const SCALAR_NEARLY_ZERO: f64 = 1.0 / (1 << 12) as f64;

/// A number of useful methods for f64 numbers.
pub(crate) trait FloatExt: Sized {
    /// Whether the number is approximately 0.
    fn is_nearly_zero(&self) -> bool {
        self.is_nearly_zero_within_tolerance(SCALAR_NEARLY_ZERO)
    }

    /// Whether the number is approximately 0, with a given tolerance.
    fn is_nearly_zero_within_tolerance(&self, tolerance: f64) -> bool;

    /// Round to the nearest multiple of `1 / scale`.
    #[cfg(feature = "parley")]
    fn round_to_scale(self, scale: f64) -> Self;
}

impl FloatExt for f64 {
    #[inline(always)]
    fn is_nearly_zero_within_tolerance(&self, tolerance: f64) -> bool {
        debug_assert!(tolerance >= 0.0, "tolerance must be positive");

        self.abs() <= tolerance
    }

    #[cfg(feature = "parley")]
    #[inline]
    fn round_to_scale(self, scale: f64) -> Self {
        if scale > 0.0 && scale.is_finite() {
            (self * scale).round() / scale
        } else {
            self
        }
    }
}

/// Whether the transform only scales and translates, i.e. maps horizontal lines to
/// horizontal lines.
pub(crate) fn is_axis_aligned(transform: &Affine) -> bool {
    let [_, b, c, _, _, _] = transform.as_coeffs();
    b.is_nearly_zero() && c.is_nearly_zero()
}

/// Applies only the linear part of `transform` to `v`.
pub(crate) fn apply_linear(transform: &Affine, v: Vec2) -> Vec2 {
    let [a, b, c, d, _, _] = transform.as_coeffs();
    Vec2::new(a * v.x + c * v.y, b * v.x + d * v.y)
}

/// The uniform scale a transform applies to areas, as a length factor.
pub(crate) fn length_scale(transform: &Affine) -> f64 {
    transform.determinant().abs().sqrt()
}
