// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Filter editor session tests.
//!
//! **Purpose**: Drives the tree through the same sequence of edits the UI
//! performs and checks the JSON it hands back, the selection resolver seam
//! and configuration layering.

use loom_filter_core::{
	add_rule, apply_selection, change_operator, change_rule, default_group, next_unique_index,
	node_at, remove_rule, FieldDescriptor, FieldType, FilterConfigLayer, Group, GroupOperator,
	RuleOperator, RulePatch, RuleValue, TemporalQualifier,
};
use serde_json::json;

fn start() -> Group {
	serde_json::from_value(json!({
		"operator": "or",
		"uniqueIndex": 0,
		"subfilters": [
			{"operator": "=", "field": "cn", "value": "alice", "uniqueIndex": 1}
		]
	}))
	.unwrap()
}

#[test]
fn test_build_nested_filter() {
	let tree = start();
	let tree = add_rule(&tree, &[], None, true);
	assert_eq!(next_unique_index(&tree), 4);

	let tree = change_operator(&tree, &[1], GroupOperator::And);
	let tree = change_rule(
		&tree,
		&[1],
		0,
		RulePatch {
			operator: Some(RuleOperator::NotEquals),
			field: Some("sn".to_string()),
			value: Some(Some(RuleValue::text("smith"))),
			temporal_value: Some(TemporalQualifier::Before),
		},
	);

	assert_eq!(
		serde_json::to_value(&tree).unwrap(),
		json!({
			"operator": "or",
			"uniqueIndex": 0,
			"subfilters": [
				{
					"operator": "EQUALS",
					"field": "cn",
					"value": "alice",
					"uniqueIndex": 1,
					"temporalValue": "after"
				},
				{"operator": "and", "uniqueIndex": 2, "subfilters": [
					{
						"operator": "NOT EQUALS",
						"field": "sn",
						"value": "smith",
						"uniqueIndex": 3,
						"temporalValue": "before"
					}
				]}
			]
		})
	);
}

#[test]
fn test_stale_paths_are_ignored() {
	let tree = start();
	assert_eq!(add_rule(&tree, &[5], None, false), tree);
	assert_eq!(remove_rule(&tree, &[], 9), tree);
	assert_eq!(change_operator(&tree, &[0], GroupOperator::And), tree);
	assert_eq!(change_rule(&tree, &[], 3, RulePatch::field("x")), tree);
	assert!(node_at(&tree, &[0]).is_none());
}

#[test]
fn test_not_group_holds_one_child() {
	let tree = add_rule(&start(), &[], None, true);
	let tree = change_operator(&tree, &[1], GroupOperator::Not);
	assert_eq!(node_at(&tree, &[1]).unwrap().operator, GroupOperator::Not);

	assert_eq!(add_rule(&tree, &[1], None, false), tree);
	assert_eq!(remove_rule(&tree, &[1], 0), tree);
}

#[test]
fn test_removed_indices_are_not_reused() {
	let tree = add_rule(&start(), &[], None, false);
	assert_eq!(next_unique_index(&tree), 3);
	let tree = remove_rule(&tree, &[], 0);
	let tree = add_rule(&tree, &[], None, false);
	let indices: Vec<u32> = tree.rules().iter().map(|r| r.unique_index).collect();
	assert_eq!(indices, vec![2, 3]);
}

#[test]
fn test_default_group_shape() {
	let group = default_group(None, 7);
	assert_eq!(group.operator, GroupOperator::Or);
	assert_eq!(group.unique_index, 7);
	let rule = group.children[0].as_rule().unwrap();
	assert_eq!(rule.unique_index, 8);
	assert_eq!(rule.operator, RuleOperator::Contains);
	assert_eq!(rule.value, Some(RuleValue::text("")));
}

#[test]
fn test_selection_through_closure_resolver() {
	let resolve = |field: &FieldDescriptor, raw: &RuleValue| match field.resource_type() {
		Some(resource) if field.is_reference() => {
			RuleValue::Text(format!("managed/{}/{}", resource, raw))
		}
		_ => raw.clone(),
	};

	let tree = start();
	let reference = FieldDescriptor::reference("managed/role");
	let updated = apply_selection(&tree, &[], 0, &reference, &RuleValue::text("r1"), &resolve);
	assert_eq!(
		updated.rules()[0].value,
		Some(RuleValue::text("managed/role/r1"))
	);

	let number = FieldDescriptor::new(FieldType::Number);
	let updated = apply_selection(&tree, &[], 0, &number, &RuleValue::from(42), &resolve);
	assert_eq!(updated.rules()[0].value, Some(RuleValue::from(42)));
}

#[test]
fn test_config_layers_merge() {
	let mut base = FilterConfigLayer::from_toml_str(
		r#"
		max_depth = 6

		[governance]
		resource_type = "user"
		"#,
	)
	.unwrap();
	let overlay = FilterConfigLayer::from_toml_str(
		r#"
		[governance]
		show_temporal_value_field = false
		"#,
	)
	.unwrap();
	base.merge(overlay);

	let config = base.finalize();
	assert_eq!(config.max_depth, 6);
	assert_eq!(config.governance.resource_type.as_deref(), Some("user"));
	assert!(!config.governance.show_temporal_value_field);
}
