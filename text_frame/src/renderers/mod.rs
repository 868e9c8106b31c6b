// Copyright 2026 the Text Frame Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Surface implementations.

pub mod pdf;
#[cfg(feature = "vello_cpu")]
pub mod raster;
