// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Filter editor configuration.
//!
//! Follows the layered pattern used for server configuration: a partial
//! [`FilterConfigLayer`] is deserialized from TOML, merged over other layers,
//! then finalized into a fully resolved [`FilterConfig`].

use serde::Deserialize;

use crate::error::Result;

/// Default maximum group nesting the structured editor accepts.
pub const DEFAULT_MAX_DEPTH: usize = 4;

/// Governance codec settings (runtime, fully resolved).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GovernanceConfig {
	/// Resource prefix for rule field paths, e.g. `user`.
	pub resource_type: Option<String>,
	/// Whether rule fields carry a before/after qualifier.
	pub show_temporal_value_field: bool,
}

impl Default for GovernanceConfig {
	fn default() -> Self {
		Self {
			resource_type: None,
			show_temporal_value_field: true,
		}
	}
}

/// Filter configuration (runtime, fully resolved).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterConfig {
	pub max_depth: usize,
	pub governance: GovernanceConfig,
}

impl Default for FilterConfig {
	fn default() -> Self {
		Self {
			max_depth: DEFAULT_MAX_DEPTH,
			governance: GovernanceConfig::default(),
		}
	}
}

impl FilterConfig {
	/// Parses a TOML fragment and finalizes it over the defaults.
	pub fn from_toml_str(input: &str) -> Result<Self> {
		Ok(FilterConfigLayer::from_toml_str(input)?.finalize())
	}
}

/// Governance configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GovernanceConfigLayer {
	#[serde(default)]
	pub resource_type: Option<String>,
	#[serde(default)]
	pub show_temporal_value_field: Option<bool>,
}

impl GovernanceConfigLayer {
	pub fn merge(&mut self, other: GovernanceConfigLayer) {
		if other.resource_type.is_some() {
			self.resource_type = other.resource_type;
		}
		if other.show_temporal_value_field.is_some() {
			self.show_temporal_value_field = other.show_temporal_value_field;
		}
	}

	pub fn finalize(self) -> GovernanceConfig {
		let defaults = GovernanceConfig::default();
		GovernanceConfig {
			resource_type: self
				.resource_type
				.filter(|r| !r.trim().is_empty())
				.or(defaults.resource_type),
			show_temporal_value_field: self
				.show_temporal_value_field
				.unwrap_or(defaults.show_temporal_value_field),
		}
	}
}

/// Filter configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterConfigLayer {
	#[serde(default)]
	pub max_depth: Option<usize>,
	#[serde(default)]
	pub governance: Option<GovernanceConfigLayer>,
}

impl FilterConfigLayer {
	pub fn from_toml_str(input: &str) -> Result<Self> {
		Ok(toml::from_str(input)?)
	}

	/// Overlays `other` on top of `self`; values set in `other` win.
	pub fn merge(&mut self, other: FilterConfigLayer) {
		if other.max_depth.is_some() {
			self.max_depth = other.max_depth;
		}
		if let Some(theirs) = other.governance {
			self.governance.get_or_insert_with(Default::default).merge(theirs);
		}
	}

	pub fn finalize(self) -> FilterConfig {
		FilterConfig {
			max_depth: self
				.max_depth
				.filter(|depth| *depth > 0)
				.unwrap_or(DEFAULT_MAX_DEPTH),
			governance: self.governance.unwrap_or_default().finalize(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::FilterError;

	#[test]
	fn test_defaults() {
		let config = FilterConfigLayer::default().finalize();
		assert_eq!(config, FilterConfig::default());
		assert_eq!(config.max_depth, 4);
		assert!(config.governance.show_temporal_value_field);
		assert!(config.governance.resource_type.is_none());
	}

	#[test]
	fn test_from_toml() {
		let config = FilterConfig::from_toml_str(
			r#"
max_depth = 6

[governance]
resource_type = "user"
show_temporal_value_field = false
"#,
		)
		.unwrap();
		assert_eq!(config.max_depth, 6);
		assert_eq!(config.governance.resource_type.as_deref(), Some("user"));
		assert!(!config.governance.show_temporal_value_field);
	}

	#[test]
	fn test_merge_precedence() {
		let mut base = FilterConfigLayer::from_toml_str(
			"max_depth = 3\n[governance]\nresource_type = \"role\"\n",
		)
		.unwrap();
		let overlay =
			FilterConfigLayer::from_toml_str("[governance]\nshow_temporal_value_field = false\n")
				.unwrap();
		base.merge(overlay);
		let config = base.finalize();
		assert_eq!(config.max_depth, 3);
		assert_eq!(config.governance.resource_type.as_deref(), Some("role"));
		assert!(!config.governance.show_temporal_value_field);
	}

	#[test]
	fn test_zero_depth_falls_back_to_default() {
		let config = FilterConfig::from_toml_str("max_depth = 0").unwrap();
		assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
	}

	#[test]
	fn test_invalid_toml() {
		let err = FilterConfig::from_toml_str("max_depth = \"deep\"").unwrap_err();
		assert!(matches!(err, FilterError::Config(_)));
	}
}
