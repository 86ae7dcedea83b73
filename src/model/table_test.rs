// ABOUTME: Tests for the fallback and permission tables.
// ABOUTME: Covers JSON shapes, null weights, and validation against a model.

use tokio_test::{assert_err, assert_ok};

use super::*;
use crate::error::SchemaError;

fn model() -> PermissionModel {
    PermissionModel::from_json(r#"{ "docs": { "read": [], "edit": ["isOwner", "isAdmin"] } }"#)
        .unwrap()
}

fn key(k: &str) -> PermissionKey {
    PermissionKey::parse(k).unwrap()
}

#[test]
fn test_conditions_lookup() {
    let conditions: Conditions = [("isOwner", true), ("isAdmin", false)].into_iter().collect();

    assert!(conditions.get("isOwner"));
    assert!(!conditions.get("isAdmin"));
    assert!(!conditions.get("missing"));
    assert!(conditions.contains("isAdmin"));
    assert!(conditions.any_granted());
    assert_eq!(conditions.names().collect::<Vec<_>>(), vec!["isAdmin", "isOwner"]);
}

#[test]
fn test_permission_entry_shapes() {
    let table = PermissionTable::from_json(
        r#"{
            "docs": {
                "read": { "default": true },
                "edit": { "default": false, "conditions": { "isOwner": true, "isAdmin": null } }
            }
        }"#,
    )
    .unwrap();

    let read = table.entry(&key("docs.read")).unwrap();
    assert_eq!(read, &PermissionEntry::granted());

    let edit = table.entry(&key("docs.edit")).unwrap();
    assert!(!edit.default);
    let overrides: Vec<_> = edit.overrides().collect();
    assert_eq!(overrides, vec![("isOwner", true)]);
}

#[test]
fn test_permission_entry_without_conditions() {
    let entry: PermissionEntry = serde_json::from_str(r#"{ "default": false }"#).unwrap();
    assert_eq!(entry, PermissionEntry::denied());
    assert_eq!(entry.overrides().count(), 0);
}

#[test]
fn test_permission_table_to_json() {
    let table = PermissionTable::new()
        .with_entry("docs.read", PermissionEntry::granted())
        .unwrap();

    let json = table.to_json().unwrap();
    assert_eq!(json, r#"{"docs":{"read":{"default":true}}}"#);
    assert_eq!(PermissionTable::from_json(&json).unwrap(), table);
}

#[test]
fn test_with_entry_rejects_bad_key() {
    assert_err!(PermissionTable::new().with_entry("docs", PermissionEntry::granted()));
}

#[test]
fn test_deny_all_is_total() {
    let model = model();
    let table = PermissionTable::deny_all(&model);

    assert_ok!(table.validate(&model));
    assert_eq!(table.entry(&key("docs.edit")), Some(&PermissionEntry::denied()));
}

#[test]
fn test_permission_table_missing_action() {
    let model = model();
    let table = PermissionTable::new()
        .with_entry("docs.read", PermissionEntry::granted())
        .unwrap();

    let err = table.validate(&model).unwrap_err();
    assert!(matches!(err, SchemaError::MissingAction(k) if k == "docs.edit"));
}

#[test]
fn test_permission_table_tolerates_stale_data() {
    let model = model();
    let mut table = PermissionTable::deny_all(&model);
    table.set(&key("docs.legacy"), PermissionEntry::granted());
    table.set(
        &key("docs.edit"),
        PermissionEntry::conditional(false, [("legacyFlag", true)]),
    );

    assert_ok!(table.validate(&model));
}

#[test]
fn test_fallback_from_json() {
    let model = model();
    let fallback = FallbackTable::from_json(
        r#"{
            "docs": {
                "read": { "default": false },
                "edit": { "default": false, "conditions": { "isOwner": false, "isAdmin": false } }
            }
        }"#,
    )
    .unwrap();

    assert_ok!(fallback.validate(&model));
    assert_eq!(fallback, model.fallback_table());
}

#[test]
fn test_fallback_missing_action() {
    let model = model();
    let mut fallback = FallbackTable::new();
    fallback.insert(&key("docs.read"), FallbackEntry::default());

    let err = fallback.validate(&model).unwrap_err();
    assert!(matches!(err, SchemaError::MissingAction(k) if k == "docs.edit"));
}

#[test]
fn test_fallback_missing_condition() {
    let model = model();
    let mut fallback = model.fallback_table();
    fallback.insert(
        &key("docs.edit"),
        FallbackEntry {
            default: false,
            conditions: [("isOwner", false)].into_iter().collect(),
        },
    );

    let err = fallback.validate(&model).unwrap_err();
    assert!(matches!(
        err,
        SchemaError::MissingCondition { condition, .. } if condition == "isAdmin"
    ));
}

#[test]
fn test_fallback_unknown_condition() {
    let model = model();
    let mut fallback = model.fallback_table();
    fallback.insert(
        &key("docs.edit"),
        FallbackEntry {
            default: false,
            conditions: [("isOwner", false), ("isAdmin", false), ("extra", false)]
                .into_iter()
                .collect(),
        },
    );

    let err = fallback.validate(&model).unwrap_err();
    assert!(matches!(
        err,
        SchemaError::UnknownCondition { condition, .. } if condition == "extra"
    ));
}

#[test]
fn test_fallback_unknown_action() {
    let model = model();
    let mut fallback = model.fallback_table();
    fallback.insert(&key("reports.view"), FallbackEntry::default());

    let err = fallback.validate(&model).unwrap_err();
    assert!(matches!(err, SchemaError::UnknownAction(k) if k == "reports.view"));
}

#[test]
fn test_fallback_must_not_grant() {
    let model = model();

    let mut granting_default = model.fallback_table();
    granting_default.insert(
        &key("docs.read"),
        FallbackEntry {
            default: true,
            conditions: Conditions::new(),
        },
    );
    assert!(matches!(
        granting_default.validate(&model),
        Err(SchemaError::NotConservative(k)) if k == "docs.read"
    ));

    let mut granting_weight = model.fallback_table();
    granting_weight.insert(
        &key("docs.edit"),
        FallbackEntry {
            default: false,
            conditions: [("isOwner", true), ("isAdmin", false)].into_iter().collect(),
        },
    );
    assert!(matches!(
        granting_weight.validate(&model),
        Err(SchemaError::NotConservative(k)) if k == "docs.edit"
    ));
}
