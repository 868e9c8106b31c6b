// Copyright 2026 the Text Frame Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

/// Errors reported while preparing a surface or drawing a frame into it.
///
/// All of these are caller errors: they are detected before anything is painted, so a
/// failed draw leaves the surface untouched.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DrawError {
    /// No base CTM value was given and the surface cannot report its base transform.
    #[error("surface has no known base transform and no explicit base CTM d was given")]
    UnknownBaseTransform,

    /// The resolved base CTM `d` value is zero or not finite.
    #[error("invalid base CTM d value: {0}")]
    InvalidBaseCtm(f64),

    /// The surface's current transform cannot be inverted.
    #[error("surface transform is not invertible")]
    NonInvertibleTransform,

    /// A raster scale factor of zero or a non-finite scale was requested.
    #[error("invalid raster scale: {0}")]
    InvalidScale(f64),

    /// The surface would have no pixels.
    #[error("surface of {width}x{height} pixels is empty")]
    EmptySurface {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
    },

    /// The surface exceeds the raster backend's limits.
    #[error("surface of {width}x{height} pixels exceeds the supported size")]
    SurfaceTooLarge {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
    },

    /// Encoding a bitmap as PNG failed.
    #[error("png encoding error: {0}")]
    Png(String),

    /// A font could not be read while building a frame.
    #[error("font error: {0}")]
    Font(String),
}

impl DrawError {
    #[cfg(feature = "png")]
    pub(crate) fn png(msg: impl ToString) -> Self {
        Self::Png(msg.to_string())
    }

    #[cfg(feature = "parley")]
    pub(crate) fn font(msg: impl ToString) -> Self {
        Self::Font(msg.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            DrawError::InvalidBaseCtm(0.0)
                .to_string()
                .contains("invalid base CTM d value"),
            "base ctm message"
        );
        assert!(
            DrawError::Png("boom".into()).to_string().contains("png encoding error: boom"),
            "png message"
        );
        assert!(
            DrawError::Font("missing".into()).to_string().contains("font error:"),
            "font message"
        );
        assert_eq!(
            DrawError::EmptySurface {
                width: 0,
                height: 3
            }
            .to_string(),
            "surface of 0x3 pixels is empty"
        );
    }
}
