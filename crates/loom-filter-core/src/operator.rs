// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::FilterError;

/// Boolean connective of a group node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupOperator {
	And,
	Or,
	Not,
}

impl GroupOperator {
	pub fn as_str(&self) -> &'static str {
		match self {
			GroupOperator::And => "and",
			GroupOperator::Or => "or",
			GroupOperator::Not => "not",
		}
	}

	/// De Morgan dual. NOT has no dual and maps to itself.
	pub fn dual(&self) -> GroupOperator {
		match self {
			GroupOperator::And => GroupOperator::Or,
			GroupOperator::Or => GroupOperator::And,
			GroupOperator::Not => GroupOperator::Not,
		}
	}
}

impl fmt::Display for GroupOperator {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for GroupOperator {
	type Err = FilterError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"and" | "&" => Ok(GroupOperator::And),
			"or" | "|" => Ok(GroupOperator::Or),
			"not" | "!" => Ok(GroupOperator::Not),
			other => Err(FilterError::UnknownOperator(other.to_string())),
		}
	}
}

/// Comparison operator of a rule.
///
/// Negated operators are distinct variants so that the negation is decided
/// once, when the operator is constructed. [`RuleOperator::positive`] recovers
/// the operator being negated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleOperator {
	Equals,
	NotEquals,
	Contains,
	NotContains,
	StartsWith,
	EndsWith,
	GreaterThan,
	GreaterOrEqual,
	LessThan,
	LessOrEqual,
	Exists,
	NotExists,
	HasChanged,
	HasNotChanged,
}

impl RuleOperator {
	pub const ALL: [RuleOperator; 14] = [
		RuleOperator::Equals,
		RuleOperator::NotEquals,
		RuleOperator::Contains,
		RuleOperator::NotContains,
		RuleOperator::StartsWith,
		RuleOperator::EndsWith,
		RuleOperator::GreaterThan,
		RuleOperator::GreaterOrEqual,
		RuleOperator::LessThan,
		RuleOperator::LessOrEqual,
		RuleOperator::Exists,
		RuleOperator::NotExists,
		RuleOperator::HasChanged,
		RuleOperator::HasNotChanged,
	];

	/// Canonical (governance) spelling.
	pub fn as_str(&self) -> &'static str {
		match self {
			RuleOperator::Equals => "EQUALS",
			RuleOperator::NotEquals => "NOT EQUALS",
			RuleOperator::Contains => "CONTAINS",
			RuleOperator::NotContains => "NOT CONTAINS",
			RuleOperator::StartsWith => "STARTS_WITH",
			RuleOperator::EndsWith => "ENDS_WITH",
			RuleOperator::GreaterThan => "GT",
			RuleOperator::GreaterOrEqual => "GTE",
			RuleOperator::LessThan => "LT",
			RuleOperator::LessOrEqual => "LTE",
			RuleOperator::Exists => "EXISTS",
			RuleOperator::NotExists => "NOT EXISTS",
			RuleOperator::HasChanged => "HAS_CHANGED",
			RuleOperator::HasNotChanged => "NOT HAS_CHANGED",
		}
	}

	/// For a negated operator, the operator it negates.
	pub fn positive(&self) -> Option<RuleOperator> {
		match self {
			RuleOperator::NotEquals => Some(RuleOperator::Equals),
			RuleOperator::NotContains => Some(RuleOperator::Contains),
			RuleOperator::NotExists => Some(RuleOperator::Exists),
			RuleOperator::HasNotChanged => Some(RuleOperator::HasChanged),
			_ => None,
		}
	}

	/// The negated form of a positive operator, when one exists.
	pub fn negative(&self) -> Option<RuleOperator> {
		match self {
			RuleOperator::Equals => Some(RuleOperator::NotEquals),
			RuleOperator::Contains => Some(RuleOperator::NotContains),
			RuleOperator::Exists => Some(RuleOperator::NotExists),
			RuleOperator::HasChanged => Some(RuleOperator::HasNotChanged),
			_ => None,
		}
	}

	pub fn is_negated(&self) -> bool {
		self.positive().is_some()
	}

	pub fn is_equality(&self) -> bool {
		matches!(self, RuleOperator::Equals | RuleOperator::NotEquals)
	}

	/// Whether rules with this operator carry a value.
	pub fn takes_value(&self) -> bool {
		!matches!(
			self,
			RuleOperator::Exists
				| RuleOperator::NotExists
				| RuleOperator::HasChanged
				| RuleOperator::HasNotChanged
		)
	}

	fn from_positive_token(token: &str) -> Option<RuleOperator> {
		let op = match token {
			"EQUALS" | "=" | "EQ" => RuleOperator::Equals,
			"CONTAINS" | "CO" => RuleOperator::Contains,
			"STARTS_WITH" | "SW" => RuleOperator::StartsWith,
			"ENDS_WITH" | "EW" => RuleOperator::EndsWith,
			"GT" | ">" => RuleOperator::GreaterThan,
			"GTE" | "GE" | ">=" => RuleOperator::GreaterOrEqual,
			"LT" | "<" => RuleOperator::LessThan,
			"LTE" | "LE" | "<=" => RuleOperator::LessOrEqual,
			"EXISTS" | "PR" => RuleOperator::Exists,
			"HAS_CHANGED" => RuleOperator::HasChanged,
			_ => return None,
		};
		Some(op)
	}
}

impl fmt::Display for RuleOperator {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for RuleOperator {
	type Err = FilterError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let normalized = s.trim().to_ascii_uppercase().replace(['-', ' '], "_");
		let normalized = normalized.as_str();

		match normalized {
			"!=" | "NE" => return Ok(RuleOperator::NotEquals),
			"HAS_NOT_CHANGED" => return Ok(RuleOperator::HasNotChanged),
			_ => {}
		}

		if let Some(op) = RuleOperator::from_positive_token(normalized) {
			return Ok(op);
		}

		normalized
			.strip_prefix("NOT_")
			.and_then(RuleOperator::from_positive_token)
			.and_then(|op| op.negative())
			.ok_or_else(|| FilterError::UnknownOperator(s.to_string()))
	}
}

impl Serialize for RuleOperator {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(self.as_str())
	}
}

impl<'de> Deserialize<'de> for RuleOperator {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let s = String::deserialize(deserializer)?;
		s.parse().map_err(serde::de::Error::custom)
	}
}

impl Serialize for GroupOperator {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(self.as_str())
	}
}

impl<'de> Deserialize<'de> for GroupOperator {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let s = String::deserialize(deserializer)?;
		s.parse().map_err(serde::de::Error::custom)
	}
}

/// Point-in-time snapshot a governance rule looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemporalQualifier {
	Before,
	#[default]
	After,
}

impl TemporalQualifier {
	pub fn as_str(&self) -> &'static str {
		match self {
			TemporalQualifier::Before => "before",
			TemporalQualifier::After => "after",
		}
	}

	pub fn from_segment(segment: &str) -> Option<TemporalQualifier> {
		match segment {
			"before" => Some(TemporalQualifier::Before),
			"after" => Some(TemporalQualifier::After),
			_ => None,
		}
	}
}

impl fmt::Display for TemporalQualifier {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn test_parse_governance_spellings() {
		assert_eq!("EQUALS".parse::<RuleOperator>().unwrap(), RuleOperator::Equals);
		assert_eq!(
			"NOT EQUALS".parse::<RuleOperator>().unwrap(),
			RuleOperator::NotEquals
		);
		assert_eq!(
			"starts_with".parse::<RuleOperator>().unwrap(),
			RuleOperator::StartsWith
		);
		assert_eq!(
			"NOT HAS_CHANGED".parse::<RuleOperator>().unwrap(),
			RuleOperator::HasNotChanged
		);
	}

	#[test]
	fn test_parse_symbols_and_mnemonics() {
		assert_eq!("=".parse::<RuleOperator>().unwrap(), RuleOperator::Equals);
		assert_eq!("!=".parse::<RuleOperator>().unwrap(), RuleOperator::NotEquals);
		assert_eq!(">=".parse::<RuleOperator>().unwrap(), RuleOperator::GreaterOrEqual);
		assert_eq!("co".parse::<RuleOperator>().unwrap(), RuleOperator::Contains);
		assert_eq!("pr".parse::<RuleOperator>().unwrap(), RuleOperator::Exists);
	}

	#[test]
	fn test_parse_unknown() {
		assert!(matches!(
			"~=".parse::<RuleOperator>(),
			Err(FilterError::UnknownOperator(_))
		));
		// Only operators with a negated form accept the NOT prefix.
		assert!("NOT GT".parse::<RuleOperator>().is_err());
	}

	#[test]
	fn test_negation_pairs() {
		for op in RuleOperator::ALL {
			if let Some(positive) = op.positive() {
				assert_eq!(positive.negative(), Some(op));
			}
			if let Some(negative) = op.negative() {
				assert_eq!(negative.positive(), Some(op));
			}
		}
		assert_eq!(RuleOperator::StartsWith.negative(), None);
	}

	#[test]
	fn test_group_operator_parse() {
		assert_eq!("AND".parse::<GroupOperator>().unwrap(), GroupOperator::And);
		assert_eq!("|".parse::<GroupOperator>().unwrap(), GroupOperator::Or);
		assert_eq!("not".parse::<GroupOperator>().unwrap(), GroupOperator::Not);
		assert!("xor".parse::<GroupOperator>().is_err());
		assert_eq!(GroupOperator::And.dual(), GroupOperator::Or);
	}

	#[test]
	fn test_serde_uses_canonical_spelling() {
		let json = serde_json::to_string(&RuleOperator::NotContains).unwrap();
		assert_eq!(json, "\"NOT CONTAINS\"");
		let op: RuleOperator = serde_json::from_str("\"!=\"").unwrap();
		assert_eq!(op, RuleOperator::NotEquals);
		let q: TemporalQualifier = serde_json::from_str("\"before\"").unwrap();
		assert_eq!(q, TemporalQualifier::Before);
	}

	proptest! {
		#[test]
		fn canonical_spelling_round_trips(idx in 0usize..14) {
			let op = RuleOperator::ALL[idx];
			prop_assert_eq!(op.as_str().parse::<RuleOperator>().unwrap(), op);
			prop_assert_eq!(op.as_str().to_lowercase().parse::<RuleOperator>().unwrap(), op);
		}
	}
}
