// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Governance search filter AST.
//!
//! On the wire every node is `{"operator": ..., "operand": ...}` where the
//! operand is a `{targetName, targetValue}` leaf for comparisons and an array
//! of nodes for AND/OR/NOT/ALL. In memory the shape is a tagged enum so the
//! leaf/composite distinction is carried by the type.

use std::fmt;
use std::str::FromStr;

use loom_filter_core::FilterError;
use serde::{Deserialize, Serialize};

/// Leaf comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOperator {
	Equals,
	Contains,
	StartsWith,
	EndsWith,
	Gt,
	Gte,
	Lt,
	Lte,
	Exists,
	HasChanged,
	In,
}

impl CompareOperator {
	pub fn as_str(&self) -> &'static str {
		match self {
			CompareOperator::Equals => "EQUALS",
			CompareOperator::Contains => "CONTAINS",
			CompareOperator::StartsWith => "STARTS_WITH",
			CompareOperator::EndsWith => "ENDS_WITH",
			CompareOperator::Gt => "GT",
			CompareOperator::Gte => "GTE",
			CompareOperator::Lt => "LT",
			CompareOperator::Lte => "LTE",
			CompareOperator::Exists => "EXISTS",
			CompareOperator::HasChanged => "HAS_CHANGED",
			CompareOperator::In => "IN",
		}
	}
}

impl fmt::Display for CompareOperator {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for CompareOperator {
	type Err = FilterError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let op = match s.trim().to_ascii_uppercase().as_str() {
			"EQUALS" => CompareOperator::Equals,
			"CONTAINS" => CompareOperator::Contains,
			"STARTS_WITH" => CompareOperator::StartsWith,
			"ENDS_WITH" => CompareOperator::EndsWith,
			"GT" => CompareOperator::Gt,
			"GTE" => CompareOperator::Gte,
			"LT" => CompareOperator::Lt,
			"LTE" => CompareOperator::Lte,
			"EXISTS" => CompareOperator::Exists,
			"HAS_CHANGED" => CompareOperator::HasChanged,
			"IN" => CompareOperator::In,
			_ => return Err(FilterError::UnknownOperator(s.to_string())),
		};
		Ok(op)
	}
}

/// Leaf operand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
	pub target_name: String,
	#[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
	pub target_value: serde_json::Value,
}

impl Target {
	pub fn new(target_name: impl Into<String>, target_value: serde_json::Value) -> Self {
		Self {
			target_name: target_name.into(),
			target_value,
		}
	}
}

/// A governance filter node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawNode", into = "RawNode")]
pub enum FilterAst {
	And(Vec<FilterAst>),
	Or(Vec<FilterAst>),
	Not(Box<FilterAst>),
	/// Matches everything.
	All,
	Compare {
		operator: CompareOperator,
		target: Target,
	},
}

impl FilterAst {
	pub fn compare(
		operator: CompareOperator,
		target_name: impl Into<String>,
		target_value: serde_json::Value,
	) -> Self {
		FilterAst::Compare {
			operator,
			target: Target::new(target_name, target_value),
		}
	}

	pub fn equals(
		target_name: impl Into<String>,
		target_value: impl Into<serde_json::Value>,
	) -> Self {
		Self::compare(CompareOperator::Equals, target_name, target_value.into())
	}

	pub fn contains(
		target_name: impl Into<String>,
		target_value: impl Into<serde_json::Value>,
	) -> Self {
		Self::compare(CompareOperator::Contains, target_name, target_value.into())
	}

	pub fn exists(target_name: impl Into<String>) -> Self {
		Self::compare(CompareOperator::Exists, target_name, serde_json::Value::Null)
	}

	pub fn not(inner: FilterAst) -> Self {
		FilterAst::Not(Box::new(inner))
	}

	pub fn operator_name(&self) -> &'static str {
		match self {
			FilterAst::And(_) => "AND",
			FilterAst::Or(_) => "OR",
			FilterAst::Not(_) => "NOT",
			FilterAst::All => "ALL",
			FilterAst::Compare { operator, .. } => operator.as_str(),
		}
	}

	/// AND/OR without children; such nodes constrain nothing.
	pub fn is_empty_group(&self) -> bool {
		matches!(self, FilterAst::And(c) | FilterAst::Or(c) if c.is_empty())
	}
}

/// Wire form used for (de)serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawNode {
	operator: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	operand: Option<RawOperand>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawOperand {
	Children(Vec<FilterAst>),
	Leaf(Target),
}

impl TryFrom<RawNode> for FilterAst {
	type Error = FilterError;

	fn try_from(raw: RawNode) -> Result<Self, Self::Error> {
		let operator = raw.operator.trim().to_ascii_uppercase();

		match operator.as_str() {
			"AND" | "OR" | "ALL" => {
				let children = match raw.operand {
					Some(RawOperand::Children(children)) => children,
					None => Vec::new(),
					Some(RawOperand::Leaf(_)) => {
						return Err(FilterError::InvalidAst(format!(
							"{} requires an array operand",
							operator
						)));
					}
				};
				Ok(match operator.as_str() {
					"AND" => FilterAst::And(children),
					"OR" => FilterAst::Or(children),
					_ => FilterAst::All,
				})
			}
			"NOT" => match raw.operand {
				None => Ok(FilterAst::And(Vec::new())),
				Some(RawOperand::Children(mut children)) => match children.len() {
					0 => Ok(FilterAst::And(Vec::new())),
					1 => Ok(FilterAst::not(children.remove(0))),
					n => Err(FilterError::InvalidAst(format!(
						"NOT requires exactly one operand, got {}",
						n
					))),
				},
				Some(RawOperand::Leaf(_)) => Err(FilterError::InvalidAst(
					"NOT requires an array operand".to_string(),
				)),
			},
			_ => {
				// "NOT EQUALS" and friends are negated leaves.
				let (negated, name) = match operator.strip_prefix("NOT ") {
					Some(rest) => (true, rest.trim()),
					None => (false, operator.as_str()),
				};
				let compare: CompareOperator = name.parse()?;
				let node = match raw.operand {
					Some(RawOperand::Leaf(target)) => FilterAst::Compare {
						operator: compare,
						target,
					},
					None => return Ok(FilterAst::And(Vec::new())),
					Some(RawOperand::Children(_)) => {
						return Err(FilterError::InvalidAst(format!(
							"{} requires a leaf operand",
							operator
						)));
					}
				};
				Ok(if negated { FilterAst::not(node) } else { node })
			}
		}
	}
}

impl From<FilterAst> for RawNode {
	fn from(ast: FilterAst) -> Self {
		let operator = ast.operator_name().to_string();
		let operand = match ast {
			FilterAst::And(children) | FilterAst::Or(children) => {
				Some(RawOperand::Children(children))
			}
			FilterAst::Not(inner) => Some(RawOperand::Children(vec![*inner])),
			FilterAst::All => Some(RawOperand::Children(Vec::new())),
			FilterAst::Compare { target, .. } => Some(RawOperand::Leaf(target)),
		};
		RawNode { operator, operand }
	}
}
