// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Canned governance filters used by request and decision searches.

use super::ast::FilterAst;

pub const PRIORITY_FIELD: &str = "request.common.priority";
pub const PHASE_NAME_FIELD: &str = "decision.phases.name";
pub const PHASE_DISPLAY_NAME_FIELD: &str = "decision.phases.displayName";
pub const DECISION_STATUS_FIELD: &str = "decision.status";
pub const IN_PROGRESS: &str = "in-progress";

pub const REQUEST_ID_FIELD: &str = "request.id";
pub const REQUESTER_FIELD: &str = "request.requester.id";
pub const REQUESTED_FOR_FIELD: &str = "request.requestedFor.id";
pub const REQUEST_TYPE_FIELD: &str = "request.type";

/// Priority checkboxes of a request search. `none` selects requests without
/// a priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrioritySelection {
	pub high: bool,
	pub medium: bool,
	pub low: bool,
	pub none: bool,
}

impl PrioritySelection {
	pub fn is_empty(&self) -> bool {
		!(self.high || self.medium || self.low || self.none)
	}
}

pub fn build_priority_filter(selection: PrioritySelection) -> Option<FilterAst> {
	if selection.is_empty() {
		return None;
	}

	let mut operands: Vec<FilterAst> = [
		(selection.high, "high"),
		(selection.medium, "medium"),
		(selection.low, "low"),
	]
	.into_iter()
	.filter(|(selected, _)| *selected)
	.map(|(_, level)| FilterAst::equals(PRIORITY_FIELD, level))
	.collect();

	if selection.none {
		operands.push(FilterAst::not(FilterAst::exists(PRIORITY_FIELD)));
	}

	Some(FilterAst::Or(operands))
}

/// Matches in-progress decisions whose current phase name or display name
/// contains `query`.
pub fn build_active_phase_filter(query: Option<&str>) -> Option<FilterAst> {
	let query = query.map(str::trim).filter(|q| !q.is_empty())?;

	Some(FilterAst::And(vec![
		FilterAst::Or(vec![
			FilterAst::contains(PHASE_NAME_FIELD, query),
			FilterAst::contains(PHASE_DISPLAY_NAME_FIELD, query),
		]),
		FilterAst::equals(DECISION_STATUS_FIELD, IN_PROGRESS),
	]))
}

/// Structured request search. Blank strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestSearch {
	pub request_id: Option<String>,
	pub requester: Option<String>,
	pub requested_for: Option<String>,
	pub request_type: Option<String>,
	pub priority: PrioritySelection,
}

pub fn build_request_filter(search: &RequestSearch) -> Option<FilterAst> {
	let fields = [
		(REQUEST_ID_FIELD, &search.request_id),
		(REQUESTER_FIELD, &search.requester),
		(REQUESTED_FOR_FIELD, &search.requested_for),
		(REQUEST_TYPE_FIELD, &search.request_type),
	];

	let mut operands: Vec<FilterAst> = fields
		.into_iter()
		.filter_map(|(field, value)| {
			let value = value.as_deref().map(str::trim).filter(|v| !v.is_empty())?;
			Some(FilterAst::equals(field, value))
		})
		.collect();
	operands.extend(build_priority_filter(search.priority));

	match operands.len() {
		0 => None,
		1 => operands.pop(),
		_ => Some(FilterAst::And(operands)),
	}
}
