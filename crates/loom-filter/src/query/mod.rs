// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! REST `filter` query parameter.
//!
//! The grammar is SCIM-like: `name eq 'x'`, `name pr`, parenthesized operands
//! joined with `and`/`or`, `!(...)` for negation and `true` for no filter.

pub mod parser;
pub mod render;

pub use parser::parse_query_filter;
pub use render::{ast_to_query_filter_string, quote, MATCH_ALL};
