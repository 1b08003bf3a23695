// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use loom_filter_core::{FilterError, Group, GroupOperator, Node, Result, Rule, RuleOperator};

const GRAMMAR: &str = "LDAP";

/// Serializes a tree into an LDAP-style filter.
///
/// The root OR group with a single child that is not itself an AND/OR group
/// is written as the bare child, which is the form [`super::parse`] reads
/// back into the same tree. Empty groups become the absolute-true filter
/// `(&)`.
///
/// LDAP values are text: numbers and booleans are written in their display
/// form and [`super::parse`] reads them back as text values.
pub fn serialize(tree: &Group) -> Result<String> {
	let mut out = String::new();
	match tree.children.as_slice() {
		[only] if tree.operator == GroupOperator::Or && !is_connective(only) => {
			write_node(only, &mut out)?
		}
		_ => write_group(tree, &mut out)?,
	}
	Ok(out)
}

fn is_connective(node: &Node) -> bool {
	matches!(node, Node::Group(group) if group.operator != GroupOperator::Not)
}

fn write_node(node: &Node, out: &mut String) -> Result<()> {
	match node {
		Node::Rule(rule) => write_rule(rule, out),
		Node::Group(group) => write_group(group, out),
	}
}

fn write_group(group: &Group, out: &mut String) -> Result<()> {
	if group.children.is_empty() {
		out.push_str("(&)");
		return Ok(());
	}

	out.push('(');
	out.push(match group.operator {
		GroupOperator::And => '&',
		GroupOperator::Or => '|',
		GroupOperator::Not => '!',
	});
	for child in &group.children {
		write_node(child, out)?;
	}
	out.push(')');
	Ok(())
}

fn write_rule(rule: &Rule, out: &mut String) -> Result<()> {
	let value = rule
		.value
		.as_ref()
		.map(|v| v.to_string())
		.unwrap_or_default();
	let literal = escape_value(&value, false);
	let field = rule.field.as_str();

	let (negated, item) = match rule.operator {
		RuleOperator::Equals => (false, format!("{}={}", field, escape_value(&value, true))),
		RuleOperator::NotEquals => (true, format!("{}={}", field, escape_value(&value, true))),
		RuleOperator::Contains => (false, format!("{}=*{}*", field, literal)),
		RuleOperator::NotContains => (true, format!("{}=*{}*", field, literal)),
		RuleOperator::StartsWith => (false, format!("{}={}*", field, literal)),
		RuleOperator::EndsWith => (false, format!("{}=*{}", field, literal)),
		RuleOperator::GreaterOrEqual => (false, format!("{}>={}", field, literal)),
		RuleOperator::LessOrEqual => (false, format!("{}<={}", field, literal)),
		RuleOperator::GreaterThan => (true, format!("{}<={}", field, literal)),
		RuleOperator::LessThan => (true, format!("{}>={}", field, literal)),
		RuleOperator::Exists => (false, format!("{}=*", field)),
		RuleOperator::NotExists => (true, format!("{}=*", field)),
		RuleOperator::HasChanged | RuleOperator::HasNotChanged => {
			return Err(FilterError::UnsupportedOperator {
				operator: rule.operator.to_string(),
				grammar: GRAMMAR,
			});
		}
	};

	if negated {
		out.push_str("(!(");
		out.push_str(&item);
		out.push_str("))");
	} else {
		out.push('(');
		out.push_str(&item);
		out.push(')');
	}
	Ok(())
}

/// Escapes characters that would break the filter syntax.
///
/// Values hold a literal asterisk as `\2a`, which is kept; every other
/// backslash is escaped as `\5c`. With `keep_wildcards` a `*` stays a
/// wildcard; otherwise it is escaped as a literal asterisk.
pub fn escape_value(value: &str, keep_wildcards: bool) -> String {
	let mut out = String::with_capacity(value.len());
	for (i, c) in value.char_indices() {
		match c {
			'(' => out.push_str("\\28"),
			')' => out.push_str("\\29"),
			'*' if !keep_wildcards => out.push_str("\\2a"),
			'\0' => out.push_str("\\00"),
			'\\' => {
				let literal_asterisk = value.get(i + 1..i + 3) == Some("2a");
				if literal_asterisk {
					out.push('\\');
				} else {
					out.push_str("\\5c");
				}
			}
			other => out.push(other),
		}
	}
	out
}
