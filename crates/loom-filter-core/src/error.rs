// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use thiserror::Error;

/// Result type alias for filter operations.
pub type Result<T> = std::result::Result<T, FilterError>;

/// Errors produced while parsing, serializing or converting filters.
///
/// None of these abort an edit session: editor entry points translate them
/// into the advanced (raw text) editing mode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
	#[error("Invalid filter at offset {offset}: {reason}")]
	InvalidFilter { offset: usize, reason: String },

	#[error("Unbalanced parentheses at offset {offset}")]
	UnbalancedParens { offset: usize },

	#[error("Unknown operator: {0}")]
	UnknownOperator(String),

	#[error("Filter nesting exceeds {limit} levels")]
	NestingTooDeep { limit: usize },

	#[error("Filter is empty")]
	EmptyFilter,

	#[error("Operator {operator} cannot be expressed in {grammar}")]
	UnsupportedOperator {
		operator: String,
		grammar: &'static str,
	},

	#[error("Invalid filter AST: {0}")]
	InvalidAst(String),

	#[error("Field path is missing a before/after qualifier: {0}")]
	MissingTemporalQualifier(String),

	#[error("Configuration error: {0}")]
	Config(String),
}

impl FilterError {
	/// Whether the error means the input could not be read at all, as opposed
	/// to being readable but outside what a grammar can express.
	pub fn is_parse_failure(&self) -> bool {
		matches!(
			self,
			FilterError::InvalidFilter { .. }
				| FilterError::UnbalancedParens { .. }
				| FilterError::UnknownOperator(_)
				| FilterError::NestingTooDeep { .. }
				| FilterError::EmptyFilter
		)
	}
}

impl From<toml::de::Error> for FilterError {
	fn from(e: toml::de::Error) -> Self {
		FilterError::Config(e.to_string())
	}
}
