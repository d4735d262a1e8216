// Copyright 2024 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-tile containers of tessellated geometry.

mod line;

pub use line::{LineBucket, LineLayoutVertex};
