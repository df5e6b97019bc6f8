// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2.

// Organization grid rendering
pub mod table;
// Selected row details and trend sparklines
pub mod detail;
// Plain text output for the dump command
pub mod text;

pub use detail::DetailRenderer;
pub use table::{TableContext, TableRenderer};
pub use text::PlainRenderer;
