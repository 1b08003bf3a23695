// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! LDAP-style filter codec.
//!
//! Supports the subset the filter editor produces: equality with optional
//! leading/trailing `*`, `!=` (written as a negated equality), `>=`, `<=`,
//! and the `&`, `|`, `!` connectives.

pub mod analysis;
pub mod parser;
pub mod serializer;

pub use analysis::{advanced_reason, is_advanced_filter, negate, AdvancedReason};
pub use parser::{parse, MAX_PARSE_DEPTH};
pub use serializer::{escape_value, serialize};

use loom_filter_core::{FilterConfig, FilterError, Group};

/// How the editor should present a stored filter.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorState {
	/// The filter fits the rule/group editor.
	Structured(Group),
	/// The filter is edited as raw text.
	Advanced {
		raw: String,
		reason: AdvancedCause,
	},
}

/// Why [`load_for_editor`] chose the advanced editor.
#[derive(Debug, Clone, PartialEq)]
pub enum AdvancedCause {
	Unparseable(FilterError),
	TooComplex(AdvancedReason),
}

impl EditorState {
	pub fn is_advanced(&self) -> bool {
		matches!(self, EditorState::Advanced { .. })
	}
}

/// Loads a stored LDAP filter for editing.
///
/// Parse failures and filters too complex for the structured editor are both
/// reported as [`EditorState::Advanced`]; neither is an error for the caller.
/// A blank filter starts an empty structured tree.
pub fn load_for_editor(raw: &str, config: &FilterConfig) -> EditorState {
	if raw.trim().is_empty() {
		return EditorState::Structured(Group::or(Vec::new()));
	}

	let tree = match parse(raw) {
		Ok(tree) => tree,
		Err(e) => {
			tracing::debug!(error = %e, "filter is not parseable, using advanced editor");
			return EditorState::Advanced {
				raw: raw.to_string(),
				reason: AdvancedCause::Unparseable(e),
			};
		}
	};

	match advanced_reason(&tree, config.max_depth) {
		Some(reason) => {
			tracing::debug!(?reason, "filter is too complex, using advanced editor");
			EditorState::Advanced {
				raw: raw.to_string(),
				reason: AdvancedCause::TooComplex(reason),
			}
		}
		None => EditorState::Structured(tree),
	}
}
