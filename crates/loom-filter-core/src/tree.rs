// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Filter tree model shared by every codec.
//!
//! A tree is an AND/OR [`Group`] whose children are [`Rule`]s or nested
//! groups. Every node carries a `unique_index` used by the editor for diffing
//! and focus management. Indices are never cached: [`next_unique_index`]
//! scans the tree each time it is called.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::operator::{GroupOperator, RuleOperator, TemporalQualifier};

/// Scalar value held by a rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleValue {
	Bool(bool),
	Number(serde_json::Number),
	Text(String),
}

impl RuleValue {
	pub fn text(value: impl Into<String>) -> Self {
		RuleValue::Text(value.into())
	}

	pub fn as_text(&self) -> Option<&str> {
		match self {
			RuleValue::Text(s) => Some(s),
			_ => None,
		}
	}

	pub fn is_blank(&self) -> bool {
		matches!(self, RuleValue::Text(s) if s.trim().is_empty())
	}

	pub fn to_json(&self) -> serde_json::Value {
		match self {
			RuleValue::Bool(b) => serde_json::Value::Bool(*b),
			RuleValue::Number(n) => serde_json::Value::Number(n.clone()),
			RuleValue::Text(s) => serde_json::Value::String(s.clone()),
		}
	}

	/// Converts a JSON scalar. Arrays, objects and null have no rule form.
	pub fn from_json(value: &serde_json::Value) -> Option<Self> {
		match value {
			serde_json::Value::Bool(b) => Some(RuleValue::Bool(*b)),
			serde_json::Value::Number(n) => Some(RuleValue::Number(n.clone())),
			serde_json::Value::String(s) => Some(RuleValue::Text(s.clone())),
			_ => None,
		}
	}
}

impl fmt::Display for RuleValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			RuleValue::Bool(b) => write!(f, "{}", b),
			RuleValue::Number(n) => write!(f, "{}", n),
			RuleValue::Text(s) => f.write_str(s),
		}
	}
}

impl From<&str> for RuleValue {
	fn from(s: &str) -> Self {
		RuleValue::Text(s.to_string())
	}
}

impl From<String> for RuleValue {
	fn from(s: String) -> Self {
		RuleValue::Text(s)
	}
}

impl From<i64> for RuleValue {
	fn from(n: i64) -> Self {
		RuleValue::Number(n.into())
	}
}

impl From<bool> for RuleValue {
	fn from(b: bool) -> Self {
		RuleValue::Bool(b)
	}
}

/// A single filter condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
	pub operator: RuleOperator,
	#[serde(default)]
	pub field: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub value: Option<RuleValue>,
	#[serde(default)]
	pub unique_index: u32,
	#[serde(default)]
	pub temporal_value: TemporalQualifier,
}

impl Rule {
	pub fn new(field: impl Into<String>, operator: RuleOperator, value: Option<RuleValue>) -> Self {
		Self {
			operator,
			field: field.into(),
			value,
			unique_index: 0,
			temporal_value: TemporalQualifier::default(),
		}
	}

	/// Equality rule with a text value.
	pub fn equals(field: impl Into<String>, value: impl Into<RuleValue>) -> Self {
		Self::new(field, RuleOperator::Equals, Some(value.into()))
	}

	pub fn with_index(mut self, unique_index: u32) -> Self {
		self.unique_index = unique_index;
		self
	}

	pub fn with_temporal(mut self, temporal_value: TemporalQualifier) -> Self {
		self.temporal_value = temporal_value;
		self
	}

	/// Same rule with its operator flipped between positive and negated form.
	pub fn negated(&self) -> Option<Rule> {
		let operator = self
			.operator
			.positive()
			.or_else(|| self.operator.negative())?;
		Some(Rule {
			operator,
			..self.clone()
		})
	}
}

impl Default for Rule {
	fn default() -> Self {
		Self::new("", RuleOperator::Contains, Some(RuleValue::text("")))
	}
}

/// A boolean composite of rules and groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
	pub operator: GroupOperator,
	#[serde(default)]
	pub unique_index: u32,
	#[serde(rename = "subfilters", default)]
	pub children: Vec<Node>,
}

impl Group {
	pub fn new(operator: GroupOperator, children: Vec<Node>) -> Self {
		Self {
			operator,
			unique_index: 0,
			children,
		}
	}

	pub fn and(children: Vec<Node>) -> Self {
		Self::new(GroupOperator::And, children)
	}

	pub fn or(children: Vec<Node>) -> Self {
		Self::new(GroupOperator::Or, children)
	}

	pub fn not(child: Node) -> Self {
		Self::new(GroupOperator::Not, vec![child])
	}

	pub fn with_index(mut self, unique_index: u32) -> Self {
		self.unique_index = unique_index;
		self
	}

	pub fn is_empty(&self) -> bool {
		self.children.is_empty()
	}

	/// Group nesting depth; a group without nested groups has depth 1.
	pub fn depth(&self) -> usize {
		1 + self
			.children
			.iter()
			.filter_map(Node::as_group)
			.map(Group::depth)
			.max()
			.unwrap_or(0)
	}

	/// Largest `unique_index` in this group or any descendant.
	pub fn max_unique_index(&self) -> u32 {
		self.children
			.iter()
			.map(Node::max_unique_index)
			.fold(self.unique_index, u32::max)
	}

	/// Visits every rule depth-first in child order.
	pub fn rules(&self) -> Vec<&Rule> {
		let mut out = Vec::new();
		collect_rules(self, &mut out);
		out
	}

	/// Visits every group (including `self`) depth-first in child order.
	pub fn groups(&self) -> Vec<&Group> {
		let mut out = Vec::new();
		collect_groups(self, &mut out);
		out
	}

	/// Applies `f` to every rule in place.
	pub fn for_each_rule_mut<F>(&mut self, f: &mut F)
	where
		F: FnMut(&mut Rule),
	{
		for child in &mut self.children {
			match child {
				Node::Rule(rule) => f(rule),
				Node::Group(group) => group.for_each_rule_mut(f),
			}
		}
	}

	/// Copy of the tree with every `unique_index` cleared, for structural
	/// comparison independent of numbering.
	pub fn without_indices(&self) -> Group {
		let mut copy = self.clone();
		clear_indices(&mut copy);
		copy
	}
}

fn collect_rules<'a>(group: &'a Group, out: &mut Vec<&'a Rule>) {
	for child in &group.children {
		match child {
			Node::Rule(rule) => out.push(rule),
			Node::Group(nested) => collect_rules(nested, out),
		}
	}
}

fn collect_groups<'a>(group: &'a Group, out: &mut Vec<&'a Group>) {
	out.push(group);
	for child in &group.children {
		if let Node::Group(nested) = child {
			collect_groups(nested, out);
		}
	}
}

fn clear_indices(group: &mut Group) {
	group.unique_index = 0;
	for child in &mut group.children {
		match child {
			Node::Rule(rule) => rule.unique_index = 0,
			Node::Group(nested) => clear_indices(nested),
		}
	}
}

/// A tree node: either a leaf rule or a nested group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
	Group(Group),
	Rule(Rule),
}

impl Node {
	pub fn unique_index(&self) -> u32 {
		match self {
			Node::Rule(rule) => rule.unique_index,
			Node::Group(group) => group.unique_index,
		}
	}

	pub fn max_unique_index(&self) -> u32 {
		match self {
			Node::Rule(rule) => rule.unique_index,
			Node::Group(group) => group.max_unique_index(),
		}
	}

	pub fn as_rule(&self) -> Option<&Rule> {
		match self {
			Node::Rule(rule) => Some(rule),
			Node::Group(_) => None,
		}
	}

	pub fn as_group(&self) -> Option<&Group> {
		match self {
			Node::Group(group) => Some(group),
			Node::Rule(_) => None,
		}
	}

	pub fn is_rule(&self) -> bool {
		matches!(self, Node::Rule(_))
	}
}

impl From<Rule> for Node {
	fn from(rule: Rule) -> Self {
		Node::Rule(rule)
	}
}

impl From<Group> for Node {
	fn from(group: Group) -> Self {
		Node::Group(group)
	}
}

/// Default rule used when the editor adds a condition.
pub fn default_rule(unique_index: u32) -> Rule {
	Rule::default().with_index(unique_index)
}

/// Default OR group. Without explicit children it holds one default rule,
/// indexed right after the group itself.
pub fn default_group(children: Option<Vec<Node>>, unique_index: u32) -> Group {
	let children =
		children.unwrap_or_else(|| vec![Node::Rule(default_rule(unique_index.saturating_add(1)))]);
	Group::or(children).with_index(unique_index)
}

/// One greater than the largest index anywhere in `tree`.
pub fn next_unique_index(tree: &Group) -> u32 {
	tree.max_unique_index().saturating_add(1)
}

/// Renumbers the tree depth-first in pre-order starting at `start`.
///
/// Returns the next free index.
pub fn reindex(tree: &mut Group, start: u32) -> u32 {
	tree.unique_index = start;
	let mut next = start + 1;
	for child in &mut tree.children {
		next = match child {
			Node::Rule(rule) => {
				rule.unique_index = next;
				next + 1
			}
			Node::Group(group) => reindex(group, next),
		};
	}
	next
}

/// Renumbers a detached node so that it starts at `start`.
pub fn reindex_node(node: &mut Node, start: u32) -> u32 {
	match node {
		Node::Rule(rule) => {
			rule.unique_index = start;
			start + 1
		}
		Node::Group(group) => reindex(group, start),
	}
}
