// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use loom_filter_core::{
	reindex, FilterError, GovernanceConfig, Group, GroupOperator, Node, Result, Rule, RuleOperator,
	RuleValue, TemporalQualifier,
};

use super::ast::{CompareOperator, FilterAst, Target};

/// Converts an editor tree into a governance AST.
///
/// Rule fields are used verbatim as target names. Groups that end up with no
/// children are dropped; `None` means the tree constrains nothing.
pub fn to_governance_ast(tree: &Group) -> Option<FilterAst> {
	group_to_ast(tree)
}

fn node_to_ast(node: &Node) -> Option<FilterAst> {
	match node {
		Node::Rule(rule) => Some(rule_to_ast(rule)),
		Node::Group(group) => group_to_ast(group),
	}
}

fn group_to_ast(group: &Group) -> Option<FilterAst> {
	let mut children: Vec<FilterAst> = group.children.iter().filter_map(node_to_ast).collect();
	match group.operator {
		GroupOperator::And if !children.is_empty() => Some(FilterAst::And(children)),
		GroupOperator::Or if !children.is_empty() => Some(FilterAst::Or(children)),
		GroupOperator::Not if children.len() == 1 => Some(FilterAst::not(children.remove(0))),
		_ => None,
	}
}

fn rule_to_ast(rule: &Rule) -> FilterAst {
	let (negated, operator) = match rule.operator.positive() {
		Some(positive) => (true, positive),
		None => (false, rule.operator),
	};
	let target_value = rule
		.value
		.as_ref()
		.filter(|_| operator.takes_value())
		.map(RuleValue::to_json)
		.unwrap_or(serde_json::Value::Null);
	let leaf = FilterAst::compare(compare_operator(operator), rule.field.clone(), target_value);

	if negated {
		FilterAst::not(leaf)
	} else {
		leaf
	}
}

fn compare_operator(operator: RuleOperator) -> CompareOperator {
	match operator {
		RuleOperator::Equals | RuleOperator::NotEquals => CompareOperator::Equals,
		RuleOperator::Contains | RuleOperator::NotContains => CompareOperator::Contains,
		RuleOperator::StartsWith => CompareOperator::StartsWith,
		RuleOperator::EndsWith => CompareOperator::EndsWith,
		RuleOperator::GreaterThan => CompareOperator::Gt,
		RuleOperator::GreaterOrEqual => CompareOperator::Gte,
		RuleOperator::LessThan => CompareOperator::Lt,
		RuleOperator::LessOrEqual => CompareOperator::Lte,
		RuleOperator::Exists | RuleOperator::NotExists => CompareOperator::Exists,
		RuleOperator::HasChanged | RuleOperator::HasNotChanged => CompareOperator::HasChanged,
	}
}

fn rule_operator(operator: CompareOperator) -> Option<RuleOperator> {
	let op = match operator {
		CompareOperator::Equals => RuleOperator::Equals,
		CompareOperator::Contains => RuleOperator::Contains,
		CompareOperator::StartsWith => RuleOperator::StartsWith,
		CompareOperator::EndsWith => RuleOperator::EndsWith,
		CompareOperator::Gt => RuleOperator::GreaterThan,
		CompareOperator::Gte => RuleOperator::GreaterOrEqual,
		CompareOperator::Lt => RuleOperator::LessThan,
		CompareOperator::Lte => RuleOperator::LessOrEqual,
		CompareOperator::Exists => RuleOperator::Exists,
		CompareOperator::HasChanged => RuleOperator::HasChanged,
		CompareOperator::In => return None,
	};
	Some(op)
}

/// Converts a governance AST back into an editor tree.
///
/// NOT of a leaf with a negated rule form becomes a single negated rule, IN
/// becomes an OR of equality rules and ALL an empty AND group. The root is
/// always an AND/OR group and nodes are numbered depth-first from 0.
pub fn from_governance_ast(ast: &FilterAst) -> Group {
	let mut root = match ast_to_node(ast) {
		Node::Group(group) if group.operator != GroupOperator::Not => group,
		other => Group::or(vec![other]),
	};
	reindex(&mut root, 0);
	root
}

fn ast_to_node(ast: &FilterAst) -> Node {
	match ast {
		FilterAst::And(children) => {
			Node::Group(Group::and(children.iter().map(ast_to_node).collect()))
		}
		FilterAst::Or(children) => {
			Node::Group(Group::or(children.iter().map(ast_to_node).collect()))
		}
		FilterAst::All => Node::Group(Group::and(Vec::new())),
		FilterAst::Not(inner) => {
			match ast_to_node(inner) {
				Node::Rule(rule) => match rule.operator.negative() {
					Some(operator) => Node::Rule(Rule { operator, ..rule }),
					None => Node::Group(Group::not(Node::Rule(rule))),
				},
				other => Node::Group(Group::not(other)),
			}
		}
		FilterAst::Compare { operator, target } => compare_to_node(*operator, target),
	}
}

fn compare_to_node(operator: CompareOperator, target: &Target) -> Node {
	let Some(rule_op) = rule_operator(operator) else {
		let values = match &target.target_value {
			serde_json::Value::Array(values) => values.clone(),
			serde_json::Value::Null => Vec::new(),
			other => vec![other.clone()],
		};
		let rules = values.iter().map(|v| {
			let value = RuleValue::from_json(v);
			Node::Rule(Rule::new(&target.target_name, RuleOperator::Equals, value))
		});
		return Node::Group(Group::or(rules.collect()));
	};

	let value = if rule_op.takes_value() {
		RuleValue::from_json(&target.target_value)
	} else {
		None
	};
	Node::Rule(Rule::new(&target.target_name, rule_op, value))
}

/// Builds the resource-scoped field path stored in governance targets.
///
/// `user`, `after`, `sn` gives `user.after.sn`; without temporal values it is
/// `user.sn`.
pub fn field_path_for(
	resource_type: &str,
	temporal: TemporalQualifier,
	field: &str,
	show_temporal: bool,
) -> String {
	if show_temporal {
		format!("{}.{}.{}", resource_type, temporal, field)
	} else {
		format!("{}.{}", resource_type, field)
	}
}

/// Governance conversion bound to a resource type.
///
/// Without a resource type, field names pass through unchanged in both
/// directions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GovernanceCodec {
	pub resource_type: Option<String>,
	pub show_temporal_value_field: bool,
}

impl GovernanceCodec {
	pub fn new(resource_type: impl Into<String>, show_temporal_value_field: bool) -> Self {
		Self {
			resource_type: Some(resource_type.into()),
			show_temporal_value_field,
		}
	}

	pub fn from_config(config: &GovernanceConfig) -> Self {
		Self {
			resource_type: config.resource_type.clone(),
			show_temporal_value_field: config.show_temporal_value_field,
		}
	}

	/// Converts `tree`, expanding every rule field into its full path.
	pub fn encode(&self, tree: &Group) -> Option<FilterAst> {
		let Some(resource_type) = self.resource_type.as_deref() else {
			return to_governance_ast(tree);
		};

		let mut scoped = tree.clone();
		scoped.for_each_rule_mut(&mut |rule: &mut Rule| {
			rule.field = field_path_for(
				resource_type,
				rule.temporal_value,
				&rule.field,
				self.show_temporal_value_field,
			);
		});
		to_governance_ast(&scoped)
	}

	/// Converts `ast`, splitting full paths back into field and qualifier.
	///
	/// A path without a before/after segment is rejected only when temporal
	/// values are shown.
	pub fn decode(&self, ast: &FilterAst) -> Result<Group> {
		let mut tree = from_governance_ast(ast);
		let Some(resource_type) = self.resource_type.as_deref() else {
			return Ok(tree);
		};

		let mut failure = None;
		tree.for_each_rule_mut(&mut |rule: &mut Rule| {
			if failure.is_some() {
				return;
			}
			match self.split_path(resource_type, &rule.field) {
				Ok((temporal, field)) => {
					rule.temporal_value = temporal;
					rule.field = field;
				}
				Err(e) => failure = Some(e),
			}
		});

		match failure {
			Some(e) => Err(e),
			None => Ok(tree),
		}
	}

	fn split_path(&self, resource_type: &str, path: &str) -> Result<(TemporalQualifier, String)> {
		let rest = path
			.strip_prefix(resource_type)
			.and_then(|rest| rest.strip_prefix('.'))
			.unwrap_or(path);

		if !self.show_temporal_value_field {
			return Ok((TemporalQualifier::default(), rest.to_string()));
		}

		match rest.split_once('.') {
			Some((segment, field)) => match TemporalQualifier::from_segment(segment) {
				Some(temporal) => Ok((temporal, field.to_string())),
				None => Err(FilterError::MissingTemporalQualifier(path.to_string())),
			},
			None => Err(FilterError::MissingTemporalQualifier(path.to_string())),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_empty_tree_is_none() {
		assert_eq!(to_governance_ast(&Group::or(Vec::new())), None);
		let nested_empty = Group::and(vec![Group::or(Vec::new()).into()]);
		assert_eq!(to_governance_ast(&nested_empty), None);
	}

	#[test]
	fn test_rules_become_leaves() {
		let tree = Group::or(vec![
			Rule::equals("cn", "alice").into(),
			Rule::new("age", RuleOperator::GreaterThan, Some(RuleValue::from(30))).into(),
		]);
		assert_eq!(
			serde_json::to_value(to_governance_ast(&tree).unwrap()).unwrap(),
			json!({"operator": "OR", "operand": [
				{"operator": "EQUALS", "operand": {"targetName": "cn", "targetValue": "alice"}},
				{"operator": "GT", "operand": {"targetName": "age", "targetValue": 30}}
			]})
		);
	}

	#[test]
	fn test_negated_rules_wrap_in_not() {
		let tree = Group::and(vec![
			Rule::new("mail", RuleOperator::NotExists, Some(RuleValue::text("ignored"))).into(),
		]);
		assert_eq!(
			to_governance_ast(&tree).unwrap(),
			FilterAst::And(vec![FilterAst::not(FilterAst::exists("mail"))])
		);
	}

	#[test]
	fn test_not_group() {
		let tree = Group::or(vec![Group::not(
			Group::and(vec![Rule::equals("a", "1").into(), Rule::equals("b", "2").into()]).into(),
		)
		.into()]);
		let ast = to_governance_ast(&tree).unwrap();
		assert_eq!(
			ast,
			FilterAst::Or(vec![FilterAst::not(FilterAst::And(vec![
				FilterAst::equals("a", "1"),
				FilterAst::equals("b", "2"),
			]))])
		);
	}

	#[test]
	fn test_from_ast_collapses_negated_leaves() {
		let ast = FilterAst::And(vec![
			FilterAst::not(FilterAst::equals("cn", "x")),
			FilterAst::not(FilterAst::compare(CompareOperator::Gt, "age", json!(3))),
		]);
		let tree = from_governance_ast(&ast);
		assert_eq!(tree.operator, GroupOperator::And);
		assert_eq!(tree.children[0].as_rule().unwrap().operator, RuleOperator::NotEquals);
		let not = tree.children[1].as_group().unwrap();
		assert_eq!(not.operator, GroupOperator::Not);
		assert_eq!(not.children[0].as_rule().unwrap().operator, RuleOperator::GreaterThan);
		assert_eq!(tree.unique_index, 0);
		assert_eq!(not.children[0].unique_index(), 3);
	}

	#[test]
	fn test_from_ast_expands_in() {
		let ast = FilterAst::compare(CompareOperator::In, "dept", json!(["eng", "ops"]));
		let tree = from_governance_ast(&ast);
		assert_eq!(tree.operator, GroupOperator::Or);
		let values: Vec<_> = tree
			.rules()
			.iter()
			.map(|r| r.value.clone().unwrap().to_string())
			.collect();
		assert_eq!(values, vec!["eng", "ops"]);
	}

	#[test]
	fn test_round_trip_through_ast() {
		let mut tree = Group::and(vec![
			Rule::equals("cn", "alice").into(),
			Group::or(vec![
				Rule::new("sn", RuleOperator::NotContains, Some("x".into())).into(),
				Rule::new("mail", RuleOperator::Exists, None).into(),
			])
			.into(),
		]);
		reindex(&mut tree, 0);
		let ast = to_governance_ast(&tree).unwrap();
		assert_eq!(from_governance_ast(&ast), tree);
	}

	#[test]
	fn test_field_path_for() {
		assert_eq!(
			field_path_for("user", TemporalQualifier::After, "sn", true),
			"user.after.sn"
		);
		assert_eq!(
			field_path_for("user", TemporalQualifier::Before, "sn", true),
			"user.before.sn"
		);
		assert_eq!(field_path_for("user", TemporalQualifier::Before, "sn", false), "user.sn");
	}

	#[test]
	fn test_codec_encode_decode() {
		let codec = GovernanceCodec::new("user", true);
		let mut tree = Group::or(vec![
			Rule::equals("sn", "smith").into(),
			Rule::equals("cn", "al")
				.with_temporal(TemporalQualifier::Before)
				.into(),
		]);
		reindex(&mut tree, 0);

		let ast = codec.encode(&tree).unwrap();
		assert_eq!(
			ast,
			FilterAst::Or(vec![
				FilterAst::equals("user.after.sn", "smith"),
				FilterAst::equals("user.before.cn", "al"),
			])
		);
		assert_eq!(codec.decode(&ast).unwrap(), tree);
	}

	#[test]
	fn test_codec_missing_qualifier() {
		let codec = GovernanceCodec::new("user", true);
		let ast = FilterAst::equals("user.sn", "smith");
		assert!(matches!(
			codec.decode(&ast),
			Err(FilterError::MissingTemporalQualifier(path)) if path == "user.sn"
		));

		let lenient = GovernanceCodec::new("user", false);
		let tree = lenient.decode(&ast).unwrap();
		assert_eq!(tree.rules()[0].field, "sn");
		assert_eq!(lenient.encode(&tree).unwrap(), FilterAst::Or(vec![ast]));
	}

	#[test]
	fn test_codec_without_resource_passes_through() {
		let codec = GovernanceCodec::from_config(&GovernanceConfig::default());
		let ast = FilterAst::equals("user.sn", "smith");
		let tree = codec.decode(&ast).unwrap();
		assert_eq!(tree.rules()[0].field, "user.sn");
	}
}
