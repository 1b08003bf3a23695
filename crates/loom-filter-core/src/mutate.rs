// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Structural edits issued by the filter editor.
//!
//! Every operation takes the current tree by reference and returns a new one.
//! Edits arrive from UI events and may carry stale paths, so an edit that
//! cannot be applied returns the tree unchanged instead of failing.

use crate::operator::{GroupOperator, RuleOperator, TemporalQualifier};
use crate::tree::{
	default_group, default_rule, next_unique_index, reindex_node, Group, Node, Rule, RuleValue,
};

/// Fields to overwrite on a rule. `None` leaves the field as is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RulePatch {
	pub operator: Option<RuleOperator>,
	pub field: Option<String>,
	/// `Some(None)` clears the value.
	pub value: Option<Option<RuleValue>>,
	pub temporal_value: Option<TemporalQualifier>,
}

impl RulePatch {
	pub fn operator(operator: RuleOperator) -> Self {
		Self {
			operator: Some(operator),
			..Default::default()
		}
	}

	pub fn field(field: impl Into<String>) -> Self {
		Self {
			field: Some(field.into()),
			..Default::default()
		}
	}

	pub fn value(value: Option<RuleValue>) -> Self {
		Self {
			value: Some(value),
			..Default::default()
		}
	}

	pub fn temporal(temporal_value: TemporalQualifier) -> Self {
		Self {
			temporal_value: Some(temporal_value),
			..Default::default()
		}
	}

	fn apply(self, rule: &mut Rule) {
		if let Some(operator) = self.operator {
			rule.operator = operator;
		}
		if let Some(field) = self.field {
			rule.field = field;
		}
		if let Some(value) = self.value {
			rule.value = value;
		}
		if let Some(temporal_value) = self.temporal_value {
			rule.temporal_value = temporal_value;
		}
	}
}

/// Group addressed by `path` (child indices from the root).
pub fn node_at<'a>(tree: &'a Group, path: &[usize]) -> Option<&'a Group> {
	let mut current = tree;
	for &idx in path {
		current = current.children.get(idx)?.as_group()?;
	}
	Some(current)
}

fn group_at_mut<'a>(tree: &'a mut Group, path: &[usize]) -> Option<&'a mut Group> {
	let mut current = tree;
	for &idx in path {
		current = match current.children.get_mut(idx)? {
			Node::Group(group) => group,
			Node::Rule(_) => return None,
		};
	}
	Some(current)
}

/// Clones `tree`, applies `edit` to the group at `path`, and returns the copy
/// if the edit reported success.
fn edit_group<F>(tree: &Group, path: &[usize], op: &'static str, edit: F) -> Group
where
	F: FnOnce(&mut Group) -> bool,
{
	let mut updated = tree.clone();
	let applied = match group_at_mut(&mut updated, path) {
		Some(group) => edit(group),
		None => false,
	};

	if applied {
		updated
	} else {
		tracing::trace!(op, ?path, "filter edit ignored");
		tree.clone()
	}
}

/// Appends a rule to the group at `path`.
///
/// `rule` defaults to [`default_rule`]. With `as_group` the rule is wrapped
/// in a new default OR group. New nodes are numbered from
/// [`next_unique_index`] so they never collide with existing indices.
pub fn add_rule(tree: &Group, path: &[usize], rule: Option<Rule>, as_group: bool) -> Group {
	let start = next_unique_index(tree);
	let rule = rule.unwrap_or_else(|| default_rule(0));
	let mut node = if as_group {
		Node::Group(default_group(Some(vec![Node::Rule(rule)]), 0))
	} else {
		Node::Rule(rule)
	};
	reindex_node(&mut node, start);

	edit_group(tree, path, "add_rule", |group| {
		if group.operator == GroupOperator::Not && !group.children.is_empty() {
			return false;
		}
		group.children.push(node);
		true
	})
}

/// Removes child `index` from the group at `path`.
///
/// Removing the last child leaves an empty group. A NOT group keeps its child.
pub fn remove_rule(tree: &Group, path: &[usize], index: usize) -> Group {
	edit_group(tree, path, "remove_rule", |group| {
		if group.operator == GroupOperator::Not || index >= group.children.len() {
			return false;
		}
		group.children.remove(index);
		true
	})
}

/// Sets the boolean operator of the group at `path`.
///
/// Switching to NOT is only allowed for a group with exactly one child.
pub fn change_operator(tree: &Group, path: &[usize], operator: GroupOperator) -> Group {
	edit_group(tree, path, "change_operator", |group| {
		if operator == GroupOperator::Not && group.children.len() != 1 {
			return false;
		}
		group.operator = operator;
		true
	})
}

/// Shallow-merges `patch` into rule `index` of the group at `path`.
pub fn change_rule(tree: &Group, path: &[usize], index: usize, patch: RulePatch) -> Group {
	edit_group(tree, path, "change_rule", |group| match group.children.get_mut(index) {
		Some(Node::Rule(rule)) => {
			patch.apply(rule);
			true
		}
		_ => false,
	})
}
