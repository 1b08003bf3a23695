// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use loom_filter_core::FilterError;
use winnow::ascii::{space0, space1, Caseless};
use winnow::combinator::alt;
use winnow::error::ContextError;
use winnow::prelude::*;
use winnow::token::{any, one_of, take_while};

use crate::governance::{CompareOperator, FilterAst};
use crate::ldap::MAX_PARSE_DEPTH;

/// Parses a REST `filter` query parameter into a governance AST.
///
/// Accepts what [`super::ast_to_query_filter_string`] produces: `or` binds
/// looser than `and`, `!(...)` negates a parenthesized expression and `true`
/// matches everything. Consecutive `and`/`or` operands are collected into a
/// single composite.
pub fn parse_query_filter(input: &str) -> Result<FilterAst, FilterError> {
	let trimmed = input.trim();
	if trimmed.is_empty() {
		return Err(FilterError::EmptyFilter);
	}
	check_nesting(trimmed)?;

	let leading = input.len() - input.trim_start().len();
	parse_or_expr.parse(trimmed).map_err(|e| FilterError::InvalidFilter {
		offset: leading + e.offset(),
		reason: e.inner().to_string(),
	})
}

/// Rejects inputs nested deeper than the recursive parser will follow.
fn check_nesting(input: &str) -> Result<(), FilterError> {
	let mut depth = 0usize;
	let mut quoted = false;
	let mut escaped = false;
	for c in input.chars() {
		if quoted {
			match c {
				_ if escaped => escaped = false,
				'\\' => escaped = true,
				'\'' => quoted = false,
				_ => {}
			}
			continue;
		}
		match c {
			'\'' => quoted = true,
			'(' => {
				depth += 1;
				if depth > MAX_PARSE_DEPTH {
					return Err(FilterError::NestingTooDeep {
						limit: MAX_PARSE_DEPTH,
					});
				}
			}
			')' => depth = depth.saturating_sub(1),
			_ => {}
		}
	}
	Ok(())
}

fn parse_or_expr(input: &mut &str) -> Result<FilterAst, ContextError> {
	let mut operands = vec![parse_and_expr(input)?];
	while keyword(input, "or") {
		operands.push(parse_and_expr(input)?);
	}
	Ok(collapse(operands, FilterAst::Or))
}

fn parse_and_expr(input: &mut &str) -> Result<FilterAst, ContextError> {
	let mut operands = vec![parse_unary(input)?];
	while keyword(input, "and") {
		operands.push(parse_unary(input)?);
	}
	Ok(collapse(operands, FilterAst::And))
}

/// Consumes ` <word> ` if it comes next; leaves the input untouched otherwise.
fn keyword(input: &mut &str, word: &'static str) -> bool {
	let checkpoint = *input;
	let result: Result<(&str, &str, &str), ContextError> =
		(space1, Caseless(word), space1).parse_next(input);
	if result.is_err() {
		*input = checkpoint;
		return false;
	}
	true
}

fn collapse(mut operands: Vec<FilterAst>, make: fn(Vec<FilterAst>) -> FilterAst) -> FilterAst {
	match operands.pop() {
		Some(only) if operands.is_empty() => only,
		Some(last) => {
			operands.push(last);
			make(operands)
		}
		None => make(operands),
	}
}

fn parse_unary(input: &mut &str) -> Result<FilterAst, ContextError> {
	if input.starts_with('!') {
		symbol(input, '!')?;
		skip_space(input)?;
		let inner = parse_parenthesized(input)?;
		return Ok(FilterAst::not(inner));
	}

	if input.starts_with('(') {
		return parse_parenthesized(input);
	}

	let checkpoint = *input;
	let all: Result<&str, ContextError> = Caseless("true").parse_next(input);
	if all.is_ok() && !input.starts_with(is_attr_char) {
		return Ok(FilterAst::All);
	}
	*input = checkpoint;

	parse_comparison(input)
}

fn parse_parenthesized(input: &mut &str) -> Result<FilterAst, ContextError> {
	symbol(input, '(')?;
	skip_space(input)?;
	let inner = parse_or_expr(input)?;
	skip_space(input)?;
	symbol(input, ')')?;
	Ok(inner)
}

fn parse_comparison(input: &mut &str) -> Result<FilterAst, ContextError> {
	let name = parse_attr_path(input)?;
	let _: &str = space1.parse_next(input)?;

	let checkpoint = *input;
	let pr: Result<&str, ContextError> = Caseless("pr").parse_next(input);
	if pr.is_ok() && !input.starts_with(is_attr_char) {
		return Ok(FilterAst::exists(name));
	}
	*input = checkpoint;

	let operator = parse_compare_op(input)?;
	let _: &str = space1.parse_next(input)?;
	let value = parse_value(input)?;
	Ok(FilterAst::compare(operator, name, value))
}

fn is_attr_char(c: char) -> bool {
	c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | ':')
}

fn parse_attr_path(input: &mut &str) -> Result<String, ContextError> {
	(one_of(|c: char| c.is_ascii_alphabetic()), take_while(0.., is_attr_char))
		.take()
		.map(|path: &str| path.to_string())
		.parse_next(input)
}

fn parse_compare_op(input: &mut &str) -> Result<CompareOperator, ContextError> {
	alt((
		Caseless("eq").map(|_| CompareOperator::Equals),
		Caseless("co").map(|_| CompareOperator::Contains),
		Caseless("sw").map(|_| CompareOperator::StartsWith),
		Caseless("ew").map(|_| CompareOperator::EndsWith),
		Caseless("gt").map(|_| CompareOperator::Gt),
		Caseless("ge").map(|_| CompareOperator::Gte),
		Caseless("lt").map(|_| CompareOperator::Lt),
		Caseless("le").map(|_| CompareOperator::Lte),
	))
	.parse_next(input)
}

fn parse_value(input: &mut &str) -> Result<serde_json::Value, ContextError> {
	if input.starts_with('\'') {
		return parse_quoted(input).map(serde_json::Value::String);
	}

	let checkpoint = *input;
	let token: &str =
		take_while(1.., |c: char| !c.is_whitespace() && c != ')').parse_next(input)?;
	let value = match token {
		"true" => Some(serde_json::Value::Bool(true)),
		"false" => Some(serde_json::Value::Bool(false)),
		"null" => Some(serde_json::Value::Null),
		_ => parse_number(token),
	};
	match value {
		Some(value) => Ok(value),
		None => {
			*input = checkpoint;
			Err(ContextError::new())
		}
	}
}

fn parse_number(token: &str) -> Option<serde_json::Value> {
	if let Ok(n) = token.parse::<i64>() {
		return Some(n.into());
	}
	let n = token.parse::<f64>().ok()?;
	serde_json::Number::from_f64(n).map(serde_json::Value::Number)
}

fn parse_quoted(input: &mut &str) -> Result<String, ContextError> {
	symbol(input, '\'')?;
	let mut out = String::new();
	loop {
		match next_char(input)? {
			'\\' => out.push(next_char(input)?),
			'\'' => return Ok(out),
			c => out.push(c),
		}
	}
}

fn symbol(input: &mut &str, mut c: char) -> Result<char, ContextError> {
	c.parse_next(input)
}

fn next_char(input: &mut &str) -> Result<char, ContextError> {
	any.parse_next(input)
}

fn skip_space(input: &mut &str) -> Result<(), ContextError> {
	space0.void().parse_next(input)
}
