// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for Loom access filters.
//!
//! This crate provides the filter tree edited in the UI and shared by every
//! filter grammar. It is used by `loom-filter`, which implements the LDAP,
//! governance AST and REST query-filter codecs on top of it.
//!
//! # Overview
//!
//! - [`Group`] / [`Rule`] / [`Node`]: the tagged filter tree
//! - [`mutate`]: immutable structural edits (add, remove, change operator,
//!   change rule) that never fail on stale paths
//! - [`ValueResolver`]: boundary to the service resolving UI selections
//! - [`FilterConfig`]: layered configuration
//!
//! # Example
//!
//! ```
//! use loom_filter_core::{add_rule, next_unique_index, Group, Rule};
//!
//! let tree = Group::or(vec![Rule::equals("cn", "alice").with_index(1).into()]);
//! let tree = add_rule(&tree, &[], Some(Rule::equals("sn", "smith")), false);
//! assert_eq!(tree.children.len(), 2);
//! assert_eq!(next_unique_index(&tree), 3);
//! ```

pub mod config;
pub mod error;
pub mod mutate;
pub mod operator;
pub mod resolver;
pub mod tree;

pub use config::{FilterConfig, FilterConfigLayer, GovernanceConfig, GovernanceConfigLayer};
pub use error::{FilterError, Result};
pub use mutate::{add_rule, change_operator, change_rule, node_at, remove_rule, RulePatch};
pub use operator::{GroupOperator, RuleOperator, TemporalQualifier};
pub use resolver::{apply_selection, FieldDescriptor, FieldType, ValueResolver};
pub use tree::{
	default_group, default_rule, next_unique_index, reindex, reindex_node, Group, Node, Rule,
	RuleValue,
};
