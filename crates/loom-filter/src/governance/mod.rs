// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Governance search filters: the JSON AST, conversion to and from editor
//! trees, and the canned filters the request views use.

pub mod ast;
pub mod builders;
pub mod codec;

pub use ast::{CompareOperator, FilterAst, Target};
pub use builders::{
	build_active_phase_filter, build_priority_filter, build_request_filter, PrioritySelection,
	RequestSearch,
};
pub use codec::{field_path_for, from_governance_ast, to_governance_ast, GovernanceCodec};
