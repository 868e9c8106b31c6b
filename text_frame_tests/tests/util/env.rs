// Copyright 2026 the Text Frame Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! PNG snapshot handling.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use text_frame::renderers::raster::Bitmap;
use text_frame::FrameLayouter;

/// Set to `accept` to overwrite snapshots with the current renderings.
const MODE_VAR: &str = "TEXT_FRAME_TEST";

fn tests_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).to_path_buf()
}

fn font_dir() -> PathBuf {
    tests_root().join("assets").join("fonts")
}

/// The family every layout test uses, bundled in `assets/fonts`.
pub(crate) const DEFAULT_FONT_NAME: &str = "DejaVu Sans";

/// A layouter with the bundled test font registered.
///
/// Panics if the font file is missing or does not provide [`DEFAULT_FONT_NAME`].
pub(crate) fn layouter() -> FrameLayouter {
    let path = font_dir().join("DejaVuSans.ttf");
    let data = std::fs::read(&path)
        .unwrap_or_else(|err| panic!("cannot read test font {}: {err}", path.display()));
    let mut layouter = FrameLayouter::new();
    let families = layouter.register_fonts(data);
    assert!(
        families.iter().any(|family| family == DEFAULT_FONT_NAME),
        "{DEFAULT_FONT_NAME} font not found, got {families:?}"
    );
    layouter
}

fn accept_mode() -> bool {
    std::env::var(MODE_VAR).is_ok_and(|mode| mode == "accept")
}

#[cfg(not(target_os = "android"))]
fn optimize(png: Vec<u8>) -> Vec<u8> {
    oxipng::optimize_from_memory(&png, &oxipng::Options::default()).unwrap_or(png)
}

#[cfg(target_os = "android")]
fn optimize(png: Vec<u8>) -> Vec<u8> {
    png
}

/// Decodes a PNG into `(width, height, color type, pixels)`.
fn decode(bytes: &[u8]) -> (u32, u32, png::ColorType, Vec<u8>) {
    let decoder = png::Decoder::new(Cursor::new(bytes));
    let mut reader = decoder.read_info().unwrap();
    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf).unwrap();
    buf.truncate(info.buffer_size());
    (info.width, info.height, info.color_type, buf)
}

/// Compares `bitmap` against `snapshots/{name}.png`.
///
/// When the snapshot is missing or differs, the rendering is written to `current/{name}.png`
/// and the test fails, unless `TEXT_FRAME_TEST=accept` is set, in which case the snapshot is
/// written instead.
pub(crate) fn check_snapshot(name: &str, bitmap: &Bitmap) {
    let file = format!("{name}.png");
    let snapshot_path = tests_root().join("snapshots").join(&file);
    let encoded = optimize(bitmap.to_png().unwrap());

    let write = |path: &Path| {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, &encoded).unwrap();
    };

    let problem = match std::fs::read(&snapshot_path) {
        Ok(reference) if decode(&reference) == decode(&encoded) => return,
        Ok(_) => "differs from",
        Err(_) => "has no reference at",
    };
    if accept_mode() {
        write(&snapshot_path);
        return;
    }
    let current_path = tests_root().join("current").join(&file);
    write(&current_path);
    panic!(
        "rendering of `{name}` {problem} {}; see {} or rerun with {MODE_VAR}=accept",
        snapshot_path.display(),
        current_path.display()
    );
}
