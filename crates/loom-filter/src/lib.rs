// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Filter grammars for Loom access filters.
//!
//! Every grammar converts to and from the [`loom_filter_core::Group`] tree
//! or, for governance searches, the [`FilterAst`] the search API accepts.
//!
//! - [`ldap`]: LDAP-style strings such as `(&(cn=alice)(!(uid=bob)))`
//! - [`governance`]: the `{"operator", "operand"}` JSON AST
//! - [`query`]: REST `filter` query parameters such as `(a eq '1') and (b pr)`
//!
//! # Example
//!
//! ```
//! use loom_filter::{governance, ldap, query};
//!
//! let tree = ldap::parse("(&(cn=alice)(!(uid=bob)))").unwrap();
//! let ast = governance::to_governance_ast(&tree);
//! assert_eq!(
//! 	query::ast_to_query_filter_string(ast.as_ref()),
//! 	"(cn eq 'alice') and (!(uid eq 'bob'))"
//! );
//! ```

pub mod governance;
pub mod ldap;
pub mod query;

pub use governance::{
	build_active_phase_filter, build_priority_filter, build_request_filter, from_governance_ast,
	to_governance_ast, CompareOperator, FilterAst, GovernanceCodec, PrioritySelection,
	RequestSearch, Target,
};
pub use ldap::{is_advanced_filter, load_for_editor, negate, AdvancedCause, EditorState};
pub use query::{ast_to_query_filter_string, parse_query_filter};
