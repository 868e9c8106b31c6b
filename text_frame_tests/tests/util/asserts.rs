// Copyright 2026 the Text Frame Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use text_frame::renderers::raster::Bitmap;

/// Channel `channel` of every pixel in column `x`, top to bottom.
pub(crate) fn column(bitmap: &Bitmap, x: u32, channel: usize) -> Vec<u8> {
    (0..bitmap.height())
        .map(|y| bitmap.pixel(x, y).unwrap()[channel])
        .collect()
}

/// Whether `value` is neither fully on nor fully off.
pub(crate) fn is_partial(value: u8) -> bool {
    value != 0 && value != 255
}

/// Asserts that two bitmaps have the same size and format, and that no channel differs by
/// more than `tolerance` in more than `max_outliers` bytes.
pub(crate) fn assert_bitmaps_close(
    actual: &Bitmap,
    expected: &Bitmap,
    tolerance: u8,
    max_outliers: usize,
) {
    assert_eq!(
        (actual.width(), actual.height(), actual.format()),
        (expected.width(), expected.height(), expected.format()),
        "bitmap geometry"
    );
    let outliers = actual
        .data()
        .iter()
        .zip(expected.data())
        .filter(|(a, e)| a.abs_diff(**e) > tolerance)
        .count();
    assert!(
        outliers <= max_outliers,
        "{outliers} bytes differ by more than {tolerance}, allowed {max_outliers}"
    );
}
