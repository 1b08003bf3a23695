// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use loom_filter_core::{
	reindex, FilterError, Group, GroupOperator, Node, Result, Rule, RuleOperator, RuleValue,
};

/// Hard limit on parenthesis nesting, independent of the editor's depth limit.
pub const MAX_PARSE_DEPTH: usize = 64;

/// Parses an LDAP-style filter into a tree rooted at an AND/OR group.
pub fn parse(input: &str) -> Result<Group> {
	let trimmed = input.trim();
	if trimmed.is_empty() {
		return Err(FilterError::EmptyFilter);
	}

	let mut cursor = Cursor::new(trimmed);
	let node = cursor.parse_filter()?;
	if !cursor.at_end() {
		return Err(match cursor.peek() {
			Some(b')') => FilterError::UnbalancedParens { offset: cursor.pos },
			_ => cursor.invalid("unexpected trailing characters"),
		});
	}

	let mut root = match node {
		Node::Group(group) if group.operator != GroupOperator::Not => group,
		other => Group::or(vec![other]),
	};
	reindex(&mut root, 0);
	Ok(root)
}

/// Byte cursor with an explicit parenthesis depth counter.
struct Cursor<'a> {
	input: &'a str,
	pos: usize,
	depth: usize,
}

impl<'a> Cursor<'a> {
	fn new(input: &'a str) -> Self {
		Self {
			input,
			pos: 0,
			depth: 0,
		}
	}

	fn at_end(&self) -> bool {
		self.pos >= self.input.len()
	}

	fn peek(&self) -> Option<u8> {
		self.input.as_bytes().get(self.pos).copied()
	}

	fn invalid(&self, reason: &str) -> FilterError {
		FilterError::InvalidFilter {
			offset: self.pos,
			reason: reason.to_string(),
		}
	}

	fn open(&mut self) -> Result<()> {
		match self.peek() {
			Some(b'(') => {
				self.depth += 1;
				if self.depth > MAX_PARSE_DEPTH {
					return Err(FilterError::NestingTooDeep {
						limit: MAX_PARSE_DEPTH,
					});
				}
				self.pos += 1;
				Ok(())
			}
			None => Err(FilterError::UnbalancedParens { offset: self.pos }),
			Some(_) => Err(self.invalid("expected '('")),
		}
	}

	fn close(&mut self) -> Result<()> {
		match self.peek() {
			Some(b')') => {
				self.depth -= 1;
				self.pos += 1;
				Ok(())
			}
			None => Err(FilterError::UnbalancedParens { offset: self.pos }),
			Some(_) => Err(self.invalid("expected ')'")),
		}
	}

	/// filter = "(" ( "&" filterlist / "|" filterlist / "!" filter / item ) ")"
	fn parse_filter(&mut self) -> Result<Node> {
		self.open()?;
		let node = match self.peek() {
			Some(b'&') => {
				self.pos += 1;
				Node::Group(Group::and(self.parse_filter_list()?))
			}
			Some(b'|') => {
				self.pos += 1;
				Node::Group(Group::or(self.parse_filter_list()?))
			}
			Some(b'!') => {
				self.pos += 1;
				if self.peek() != Some(b'(') {
					return Err(self.invalid("'!' must be followed by exactly one filter"));
				}
				negate_node(self.parse_filter()?)
			}
			Some(_) => Node::Rule(self.parse_item()?),
			None => return Err(FilterError::UnbalancedParens { offset: self.pos }),
		};
		self.close()?;
		Ok(node)
	}

	fn parse_filter_list(&mut self) -> Result<Vec<Node>> {
		let mut children = Vec::new();
		while self.peek() == Some(b'(') {
			children.push(self.parse_filter()?);
		}
		Ok(children)
	}

	/// item = attr ( "=" / "!=" / ">=" / "<=" ) value
	fn parse_item(&mut self) -> Result<Rule> {
		let start = self.pos;
		while self.peek().is_some_and(is_attr_byte) {
			self.pos += 1;
		}
		if self.pos == start {
			return Err(self.invalid("expected attribute name"));
		}
		let attr = &self.input[start..self.pos];
		let operator = self.parse_operator()?;
		let value = self.parse_value()?;
		Ok(Rule::new(attr, operator, Some(RuleValue::Text(value))))
	}

	fn parse_operator(&mut self) -> Result<RuleOperator> {
		let rest = &self.input[self.pos..];
		let (operator, len) = if rest.starts_with('=') {
			(RuleOperator::Equals, 1)
		} else if rest.starts_with("!=") {
			(RuleOperator::NotEquals, 2)
		} else if rest.starts_with(">=") {
			(RuleOperator::GreaterOrEqual, 2)
		} else if rest.starts_with("<=") {
			(RuleOperator::LessOrEqual, 2)
		} else {
			let token: String = rest
				.chars()
				.take_while(|c| !c.is_ascii_alphanumeric() && *c != ')')
				.take(2)
				.collect();
			return Err(FilterError::UnknownOperator(token));
		};
		self.pos += len;
		Ok(operator)
	}

	/// Reads up to the closing parenthesis, decoding `\XX` hex escapes and
	/// `\<char>`. An escaped asterisk is kept as `\2a` so it stays distinct
	/// from the `*` wildcard.
	fn parse_value(&mut self) -> Result<String> {
		let start = self.pos;
		let mut bytes = Vec::new();
		loop {
			match self.peek() {
				Some(b')') => break,
				Some(b'(') => return Err(self.invalid("unescaped '(' in value")),
				Some(b'\\') => {
					self.pos += 1;
					self.parse_escape(&mut bytes)?;
				}
				Some(_) => {
					// Copy a whole character so positions stay on char boundaries.
					let len = self.input[self.pos..].chars().next().map_or(1, char::len_utf8);
					bytes.extend_from_slice(&self.input.as_bytes()[self.pos..self.pos + len]);
					self.pos += len;
				}
				None => return Err(FilterError::UnbalancedParens { offset: self.pos }),
			}
		}
		String::from_utf8(bytes).map_err(|_| FilterError::InvalidFilter {
			offset: start,
			reason: "escaped value is not valid UTF-8".to_string(),
		})
	}

	/// Decodes the escape following a consumed backslash into `out`.
	fn parse_escape(&mut self, out: &mut Vec<u8>) -> Result<()> {
		let rest = &self.input.as_bytes()[self.pos..];
		if let Some(byte) = hex_escape(rest) {
			self.pos += 2;
			match byte {
				b'*' => out.extend_from_slice(LITERAL_ASTERISK),
				other => out.push(other),
			}
			return Ok(());
		}

		match self.input[self.pos..].chars().next() {
			Some('*') => {
				self.pos += 1;
				out.extend_from_slice(LITERAL_ASTERISK);
				Ok(())
			}
			Some(c) => {
				self.pos += c.len_utf8();
				let mut buf = [0u8; 4];
				out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
				Ok(())
			}
			None => Err(self.invalid("dangling escape")),
		}
	}
}

/// How a literal `*` is held in equality values.
const LITERAL_ASTERISK: &[u8] = b"\\2a";

fn hex_escape(rest: &[u8]) -> Option<u8> {
	match rest {
		[hi, lo, ..] if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit() => {
			let digits = [*hi, *lo];
			let digits = std::str::from_utf8(&digits).ok()?;
			u8::from_str_radix(digits, 16).ok()
		}
		_ => None,
	}
}

fn is_attr_byte(c: u8) -> bool {
	c.is_ascii_alphanumeric() || c == b'_' || c == b'.'
}

/// NOT of an equality rule collapses into a single not-equals rule. Any other
/// negation, including NOT of a non-equality rule, stays a NOT group.
fn negate_node(child: Node) -> Node {
	match child {
		Node::Rule(rule) if rule.operator == RuleOperator::Equals => Node::Rule(Rule {
			operator: RuleOperator::NotEquals,
			..rule
		}),
		other => Node::Group(Group::not(other)),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn rule(node: &Node) -> &Rule {
		node.as_rule().expect("expected rule")
	}

	#[test]
	fn test_single_item_is_wrapped_in_or() {
		let tree = parse("(cn=alice)").unwrap();
		assert_eq!(tree.operator, GroupOperator::Or);
		assert_eq!(tree.children.len(), 1);
		let r = rule(&tree.children[0]);
		assert_eq!(r.field, "cn");
		assert_eq!(r.operator, RuleOperator::Equals);
		assert_eq!(r.value, Some(RuleValue::text("alice")));
	}

	#[test]
	fn test_and_group() {
		let tree = parse("(&(objectCategory=Person)(sAMAccountName=*))").unwrap();
		assert_eq!(tree.operator, GroupOperator::And);
		assert_eq!(rule(&tree.children[0]).value, Some(RuleValue::text("Person")));
		assert_eq!(rule(&tree.children[1]).value, Some(RuleValue::text("*")));
		assert_eq!(rule(&tree.children[1]).operator, RuleOperator::Equals);
	}

	#[test]
	fn test_not_equality_collapses() {
		let tree = parse("(!(uid=bob))").unwrap();
		assert_eq!(tree.operator, GroupOperator::Or);
		let r = rule(&tree.children[0]);
		assert_eq!(r.operator, RuleOperator::NotEquals);
		assert_eq!(r.field, "uid");
	}

	#[test]
	fn test_inline_not_equals() {
		let tree = parse("(uid!=bob)").unwrap();
		assert_eq!(rule(&tree.children[0]).operator, RuleOperator::NotEquals);
	}

	#[test]
	fn test_not_of_group_stays_group() {
		let tree = parse("(!(|(a=1)(b=2)))").unwrap();
		let not = tree.children[0].as_group().unwrap();
		assert_eq!(not.operator, GroupOperator::Not);
		assert_eq!(not.children[0].as_group().unwrap().operator, GroupOperator::Or);
	}

	#[test]
	fn test_not_of_range_stays_group() {
		let tree = parse("(!(age>=30))").unwrap();
		let not = tree.children[0].as_group().unwrap();
		assert_eq!(not.operator, GroupOperator::Not);
		assert_eq!(rule(&not.children[0]).operator, RuleOperator::GreaterOrEqual);
	}

	#[test]
	fn test_indices_are_preorder_and_stable() {
		let input = "(&(a=1)(|(b=2)(c=3))(d=4))";
		let first = parse(input).unwrap();
		let second = parse(input).unwrap();
		assert_eq!(first, second);
		assert_eq!(first.unique_index, 0);
		assert_eq!(first.children[0].unique_index(), 1);
		assert_eq!(first.children[1].unique_index(), 2);
		let nested = first.children[1].as_group().unwrap();
		assert_eq!(nested.children[0].unique_index(), 3);
		assert_eq!(nested.children[1].unique_index(), 4);
		assert_eq!(first.children[2].unique_index(), 5);
	}

	#[test]
	fn test_escapes_are_decoded() {
		let value = |input: &str| parse(input).unwrap().rules()[0].value.clone();
		assert_eq!(value(r"(cn=Smith \28Jr\29)"), Some(RuleValue::text("Smith (Jr)")));
		assert_eq!(value(r"(cn=a\)b)"), Some(RuleValue::text("a)b")));
		assert_eq!(value(r"(path=C:\5ctemp)"), Some(RuleValue::text(r"C:\temp")));
		assert_eq!(value(r"(cn=caf\c3\a9)"), Some(RuleValue::text("café")));
		assert_eq!(value(r"(cn=nul\00)"), Some(RuleValue::text("nul\0")));
	}

	#[test]
	fn test_escaped_asterisk_is_not_a_wildcard() {
		let value = |input: &str| parse(input).unwrap().rules()[0].value.clone();
		assert_eq!(value(r"(cn=a\2ab*)"), Some(RuleValue::text(r"a\2ab*")));
		assert_eq!(value(r"(cn=a\2Ab)"), Some(RuleValue::text(r"a\2ab")));
		assert_eq!(value(r"(cn=a\*b)"), Some(RuleValue::text(r"a\2ab")));
	}

	#[test]
	fn test_invalid_utf8_escape() {
		assert!(matches!(parse(r"(cn=\ff)"), Err(FilterError::InvalidFilter { .. })));
	}

	#[test]
	fn test_empty_groups() {
		let tree = parse("(&)").unwrap();
		assert_eq!(tree.operator, GroupOperator::And);
		assert!(tree.is_empty());
	}

	#[test]
	fn test_unbalanced() {
		for input in ["(&(a=1)", "(a=1))", "(a=1"] {
			assert!(
				matches!(parse(input), Err(FilterError::UnbalancedParens { .. })),
				"expected unbalanced parens for {input}"
			);
		}
		assert!(matches!(parse("((("), Err(_)));
	}

	#[test]
	fn test_unknown_operator() {
		assert!(matches!(
			parse("(cn~=alice)"),
			Err(FilterError::UnknownOperator(op)) if op == "~="
		));
	}

	#[test]
	fn test_malformed() {
		assert!(matches!(parse(""), Err(FilterError::EmptyFilter)));
		assert!(matches!(parse("cn=alice"), Err(FilterError::InvalidFilter { .. })));
		assert!(matches!(parse("(=alice)"), Err(FilterError::InvalidFilter { .. })));
		assert!(matches!(parse("(!(a=1)(b=2))"), Err(_)));
		assert!(matches!(parse("(!a=1)"), Err(FilterError::InvalidFilter { .. })));
		assert!(matches!(parse("(cn=a(b)"), Err(FilterError::InvalidFilter { .. })));
		assert!(matches!(parse("(cn=a\\"), Err(FilterError::InvalidFilter { .. })));
	}

	#[test]
	fn test_deep_nesting_is_rejected_without_overflow() {
		let input = format!("{}(a=1){}", "(&".repeat(500), ")".repeat(500));
		assert!(matches!(
			parse(&input),
			Err(FilterError::NestingTooDeep { limit: MAX_PARSE_DEPTH })
		));
	}

	#[test]
	fn test_whitespace_around_filter() {
		assert!(parse("  (cn=alice)\n").is_ok());
	}
}
