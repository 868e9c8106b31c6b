// Copyright 2026 the Text Frame Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! This crate contains the integration test suite for `text_frame`.
//!
//! - The `util` module contains the sample frames, snapshot handling and bitmap assertions
//!   shared by the tests.
//! - We do not use the default Rust test harness, but instead use this `mod.rs` file as the
//!   entry point to run all other tests, so that the utilities are compiled once.
//! - Put the "topic" of a test at the start of its name (`baseline_aligned_at_2x` rather than
//!   `aligned_baseline_at_2x`), which keeps the snapshots sorted by topic.
//! - Snapshots live in `snapshots/`. Run with `TEXT_FRAME_TEST=accept` to update them.

#![allow(missing_docs, reason = "we don't need docs for testing")]
#![allow(clippy::cast_possible_truncation, reason = "not critical for testing")]

mod layout;
#[macro_use]
mod util;
