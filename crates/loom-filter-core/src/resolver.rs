// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Boundary to the service that turns a UI selection into a stored value.
//!
//! Resolution itself (looking up managed objects and building their
//! reference paths) lives outside this crate. The core only shapes the call
//! and stores whatever the resolver returns.

use serde::{Deserialize, Serialize};

use crate::mutate::{change_rule, RulePatch};
use crate::tree::{Group, RuleValue};

/// Declared type of a filterable field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
	Reference,
	Number,
	String,
	Boolean,
	#[serde(other)]
	Other,
}

/// Field metadata as supplied by the schema service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
	#[serde(rename = "type")]
	pub field_type: FieldType,
	/// e.g. `/openidm/managed/application`
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub object_path: Option<String>,
}

impl FieldDescriptor {
	pub fn new(field_type: FieldType) -> Self {
		Self {
			field_type,
			object_path: None,
		}
	}

	pub fn reference(object_path: impl Into<String>) -> Self {
		Self {
			field_type: FieldType::Reference,
			object_path: Some(object_path.into()),
		}
	}

	pub fn is_reference(&self) -> bool {
		self.field_type == FieldType::Reference
	}

	/// Last segment of the object path (`application` for
	/// `/openidm/managed/application`).
	pub fn resource_type(&self) -> Option<&str> {
		self.object_path
			.as_deref()
			.and_then(|path| path.trim_end_matches('/').rsplit('/').next())
			.filter(|segment| !segment.is_empty())
	}
}

/// Turns a raw selection into the value stored on a rule.
///
/// For reference fields implementations return a fully qualified object path
/// such as `managed/user/<id>`; for every other type they return the raw
/// selection unchanged.
pub trait ValueResolver {
	fn resolve_value(&self, field: &FieldDescriptor, raw: &RuleValue) -> RuleValue;
}

impl<F> ValueResolver for F
where
	F: Fn(&FieldDescriptor, &RuleValue) -> RuleValue,
{
	fn resolve_value(&self, field: &FieldDescriptor, raw: &RuleValue) -> RuleValue {
		self(field, raw)
	}
}

/// Resolves `raw` and stores the result as the value of rule `index` in the
/// group at `path`.
pub fn apply_selection<R>(
	tree: &Group,
	path: &[usize],
	index: usize,
	field: &FieldDescriptor,
	raw: &RuleValue,
	resolver: &R,
) -> Group
where
	R: ValueResolver + ?Sized,
{
	let value = resolver.resolve_value(field, raw);
	change_rule(tree, path, index, RulePatch::value(Some(value)))
}
