// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use loom_filter_core::{next_unique_index, Group, GroupOperator, Node, Rule};

/// Why a filter cannot be shown in the structured editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvancedReason {
	/// NOT applied to a group, which cannot be flattened into one rule.
	NegatedGroup,
	/// A rule uses an operator the structured editor has no control for.
	UnsupportedOperator(String),
	/// Groups nest deeper than the configured maximum.
	TooDeep { depth: usize, max_depth: usize },
}

/// Returns why `tree` needs the advanced editor, or `None` when the
/// structured editor can represent it.
pub fn advanced_reason(tree: &Group, max_depth: usize) -> Option<AdvancedReason> {
	for group in tree.groups() {
		if group.operator == GroupOperator::Not
			&& group.children.iter().any(|child| !child.is_rule())
		{
			return Some(AdvancedReason::NegatedGroup);
		}
	}

	if let Some(rule) = tree.rules().into_iter().find(|r| !r.operator.is_equality()) {
		return Some(AdvancedReason::UnsupportedOperator(rule.operator.to_string()));
	}

	let depth = tree.depth();
	if depth > max_depth {
		return Some(AdvancedReason::TooDeep { depth, max_depth });
	}

	None
}

/// Whether `tree` must be edited as raw text.
pub fn is_advanced_filter(tree: &Group, max_depth: usize) -> bool {
	advanced_reason(tree, max_depth).is_some()
}

/// Normalizes negations so the structured editor can show them.
///
/// - NOT of an equality rule becomes the flipped rule; at the root it is
///   wrapped in an OR group.
/// - NOT of an AND/OR group whose children are all equality rules becomes the
///   dual group with every rule flipped.
/// - Any other NOT is left alone.
///
/// AND/OR groups are normalized recursively. A rewritten root NOT becomes an
/// OR root holding the rewritten node, which is numbered after the rest of
/// the tree.
pub fn negate(tree: &Group) -> Group {
	match normalize_group(tree) {
		Node::Rule(rule) => Group::or(vec![Node::Rule(rule)]).with_index(tree.unique_index),
		Node::Group(group)
			if tree.operator == GroupOperator::Not && group.operator != tree.operator =>
		{
			let inner = group.with_index(next_unique_index(tree));
			Group::or(vec![Node::Group(inner)]).with_index(tree.unique_index)
		}
		Node::Group(group) => group,
	}
}

fn normalize_group(group: &Group) -> Node {
	match group.operator {
		GroupOperator::Not => push_down(group).unwrap_or_else(|| Node::Group(group.clone())),
		GroupOperator::And | GroupOperator::Or => Node::Group(Group {
			children: group.children.iter().map(normalize_node).collect(),
			..group.clone()
		}),
	}
}

fn normalize_node(node: &Node) -> Node {
	match node {
		Node::Rule(rule) => Node::Rule(rule.clone()),
		Node::Group(group) => normalize_group(group),
	}
}

fn push_down(not: &Group) -> Option<Node> {
	let [child] = not.children.as_slice() else {
		return None;
	};

	match child {
		Node::Rule(rule) => flip(rule).map(Node::Rule),
		Node::Group(inner) if inner.operator != GroupOperator::Not => {
			let children = inner
				.children
				.iter()
				.map(|c| c.as_rule().and_then(flip).map(Node::Rule))
				.collect::<Option<Vec<_>>>()?;
			Some(Node::Group(Group {
				operator: inner.operator.dual(),
				unique_index: not.unique_index,
				children,
			}))
		}
		Node::Group(_) => None,
	}
}

fn flip(rule: &Rule) -> Option<Rule> {
	if rule.operator.is_equality() {
		rule.negated()
	} else {
		None
	}
}
