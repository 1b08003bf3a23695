// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use crate::governance::{CompareOperator, FilterAst, Target};

/// Matches every resource; rendered for absent or empty filters.
pub const MATCH_ALL: &str = "true";

/// Renders a governance AST as a REST `filter` query parameter.
///
/// Operands that render to nothing are dropped and a composite with nothing
/// left disappears with them; if the whole filter disappears the result is
/// [`MATCH_ALL`].
pub fn ast_to_query_filter_string(ast: Option<&FilterAst>) -> String {
	let rendered = ast.map(render).unwrap_or_default();
	if rendered.is_empty() {
		MATCH_ALL.to_string()
	} else {
		rendered
	}
}

fn render(ast: &FilterAst) -> String {
	match ast {
		FilterAst::And(children) => join(children, " and "),
		FilterAst::Or(children) => join(children, " or "),
		FilterAst::Not(inner) => {
			let inner = render(inner);
			if inner.is_empty() {
				inner
			} else {
				format!("!({})", inner)
			}
		}
		FilterAst::All => MATCH_ALL.to_string(),
		FilterAst::Compare { operator, target } => render_compare(*operator, target),
	}
}

fn join(children: &[FilterAst], connective: &str) -> String {
	children
		.iter()
		.map(render)
		.filter(|s| !s.is_empty())
		.map(|s| format!("({})", s))
		.collect::<Vec<_>>()
		.join(connective)
}

fn render_compare(operator: CompareOperator, target: &Target) -> String {
	let name = target.target_name.as_str();
	let op = match operator {
		CompareOperator::Equals => "eq",
		CompareOperator::Contains => "co",
		CompareOperator::StartsWith => "sw",
		CompareOperator::EndsWith => "ew",
		CompareOperator::Gt => "gt",
		CompareOperator::Gte => "ge",
		CompareOperator::Lt => "lt",
		CompareOperator::Lte => "le",
		CompareOperator::Exists => return format!("{} pr", name),
		CompareOperator::In => return render_in(name, &target.target_value),
		CompareOperator::HasChanged => {
			tracing::warn!(
				target_name = name,
				"HAS_CHANGED has no query filter form, dropping it"
			);
			return String::new();
		}
	};
	format!("{} {} {}", name, op, literal(&target.target_value))
}

fn render_in(name: &str, values: &serde_json::Value) -> String {
	let values = match values {
		serde_json::Value::Array(values) => values.as_slice(),
		serde_json::Value::Null => &[],
		single => std::slice::from_ref(single),
	};
	values
		.iter()
		.map(|v| format!("{} eq {}", name, literal(v)))
		.collect::<Vec<_>>()
		.join(" or ")
}

fn literal(value: &serde_json::Value) -> String {
	match value {
		serde_json::Value::String(s) => quote(s),
		serde_json::Value::Number(n) => n.to_string(),
		serde_json::Value::Bool(b) => b.to_string(),
		serde_json::Value::Null => "null".to_string(),
		other => quote(&other.to_string()),
	}
}

/// Single-quotes `s`, escaping `\` and `'` with a backslash.
pub fn quote(s: &str) -> String {
	let mut out = String::with_capacity(s.len() + 2);
	out.push('\'');
	for c in s.chars() {
		if c == '\'' || c == '\\' {
			out.push('\\');
		}
		out.push(c);
	}
	out.push('\'');
	out
}
