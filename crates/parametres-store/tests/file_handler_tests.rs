// Integration tests for the JSON flat-file settings handler
// Row-level assertions read the storage file back as a JSON array

use parametres_core::{Handler, ParametresError};
use parametres_store::FileHandler;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn store_path(dir: &TempDir) -> PathBuf {
    dir.path().join("parametres.json")
}

fn read_store(path: &Path) -> Vec<Value> {
    let raw = fs::read_to_string(path).unwrap();
    serde_json::from_str(&raw).unwrap()
}

fn find_row<'a>(rows: &'a [Value], file: &str, key: &str, context: Option<&str>) -> Option<&'a Value> {
    rows.iter().find(|row| {
        row["file"] == file
            && row["key"] == key
            && match context {
                Some(ctx) => row["context"] == ctx,
                None => row["context"].is_null(),
            }
    })
}

#[test]
fn test_set_appends_a_typed_row() {
    let dir = TempDir::new().unwrap();
    let path = store_path(&dir);
    let mut handler = FileHandler::new(&path).unwrap();

    handler.set("test", "site_name", json!("Foo"), None).unwrap();

    let rows = read_store(&path);
    let row = find_row(&rows, "test", "site_name", None).unwrap();
    assert_eq!(row["value"], "Foo");
    assert_eq!(row["type"], "string");
    assert!(row["id"].is_string());
    assert!(row["created_at"].is_string());
}

#[test]
fn test_boolean_and_null_rows() {
    let dir = TempDir::new().unwrap();
    let path = store_path(&dir);
    let mut handler = FileHandler::new(&path).unwrap();

    handler.set("test", "enabled", json!(true), None).unwrap();
    handler.set("test", "missing", json!(null), None).unwrap();

    let rows = read_store(&path);
    let enabled = find_row(&rows, "test", "enabled", None).unwrap();
    assert_eq!(enabled["value"], "1");
    assert_eq!(enabled["type"], "boolean");

    let missing = find_row(&rows, "test", "missing", None).unwrap();
    assert!(missing["value"].is_null());
    assert_eq!(missing["type"], "NULL");

    assert_eq!(handler.get("test", "enabled", None).unwrap(), Some(json!(true)));
    assert_eq!(handler.get("test", "missing", None).unwrap(), Some(json!(null)));
}

#[test]
fn test_composite_row_round_trips() {
    let dir = TempDir::new().unwrap();
    let path = store_path(&dir);
    let mut handler = FileHandler::new(&path).unwrap();

    let value = json!({"foo": "bar"});
    handler.set("test", "payload", value.clone(), None).unwrap();

    let rows = read_store(&path);
    let row = find_row(&rows, "test", "payload", None).unwrap();
    assert_eq!(row["type"], "object");
    assert!(parametres_core::looks_serialized(row["value"].as_str().unwrap()));

    assert_eq!(handler.get("test", "payload", None).unwrap(), Some(value));
}

#[test]
fn test_update_in_place_leaves_other_rows_intact() {
    // Given: three unrelated rows
    let dir = TempDir::new().unwrap();
    let path = store_path(&dir);
    let mut handler = FileHandler::new(&path).unwrap();
    handler.set("test", "site_name", json!("foo"), None).unwrap();
    handler.set("test", "site_lang", json!("fr"), None).unwrap();
    handler.set("fake", "site_name", json!("foo"), None).unwrap();

    // When: one of them is overwritten
    handler.set("test", "site_name", json!("Bar"), None).unwrap();

    // Then: it changed in place and the neighbors kept their values
    let rows = read_store(&path);
    assert_eq!(rows.len(), 3);
    assert_eq!(find_row(&rows, "test", "site_name", None).unwrap()["value"], "Bar");
    assert_eq!(find_row(&rows, "test", "site_lang", None).unwrap()["value"], "fr");
    assert_eq!(find_row(&rows, "fake", "site_name", None).unwrap()["value"], "foo");
}

#[test]
fn test_update_keeps_the_row_id() {
    let dir = TempDir::new().unwrap();
    let path = store_path(&dir);
    let mut handler = FileHandler::new(&path).unwrap();

    handler.set("test", "site_name", json!("foo"), None).unwrap();
    let before = read_store(&path)[0]["id"].clone();

    handler.set("test", "site_name", json!("Bar"), None).unwrap();
    let rows = read_store(&path);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], before);
}

#[test]
fn test_contexts_store_as_distinct_rows() {
    let dir = TempDir::new().unwrap();
    let path = store_path(&dir);
    let mut handler = FileHandler::new(&path).unwrap();

    handler.set("test", "site_name", json!("Humpty"), None).unwrap();
    handler
        .set("test", "site_name", json!("Jack"), Some("context:male"))
        .unwrap();
    handler
        .set("test", "site_name", json!("Jill"), Some("context:female"))
        .unwrap();
    handler
        .set("test", "site_name", json!("Jane"), Some("context:female"))
        .unwrap();

    let rows = read_store(&path);
    assert_eq!(rows.len(), 3);
    assert_eq!(find_row(&rows, "test", "site_name", None).unwrap()["value"], "Humpty");
    assert_eq!(
        find_row(&rows, "test", "site_name", Some("context:male")).unwrap()["value"],
        "Jack"
    );
    assert_eq!(
        find_row(&rows, "test", "site_name", Some("context:female")).unwrap()["value"],
        "Jane"
    );
}

#[test]
fn test_forget_deletes_exactly_one_context() {
    let dir = TempDir::new().unwrap();
    let path = store_path(&dir);
    let mut handler = FileHandler::new(&path).unwrap();

    handler.set("test", "site_name", json!("Humpty"), None).unwrap();
    handler
        .set("test", "site_name", json!("Jack"), Some("context:male"))
        .unwrap();
    handler
        .set("test", "site_name", json!("Jane"), Some("context:female"))
        .unwrap();

    handler.forget("test", "site_name", Some("context:female")).unwrap();

    let rows = read_store(&path);
    assert!(find_row(&rows, "test", "site_name", Some("context:female")).is_none());
    assert!(find_row(&rows, "test", "site_name", Some("context:male")).is_some());
    assert!(find_row(&rows, "test", "site_name", None).is_some());
}

#[test]
fn test_forget_absent_row_is_a_no_op() {
    let dir = TempDir::new().unwrap();
    let path = store_path(&dir);
    let mut handler = FileHandler::new(&path).unwrap();
    handler.set("test", "site_lang", json!("fr"), None).unwrap();

    handler.forget("test", "site_name", None).unwrap();

    let rows = read_store(&path);
    assert_eq!(rows.len(), 1);
    assert!(find_row(&rows, "test", "site_lang", None).is_some());
}

#[test]
fn test_flush_resets_the_store_file() {
    let dir = TempDir::new().unwrap();
    let path = store_path(&dir);
    let mut handler = FileHandler::new(&path).unwrap();

    handler.set("test", "site_name", json!("Foo"), None).unwrap();
    handler.set("test", "site_name", json!("Bar"), Some("ctx")).unwrap();

    handler.flush().unwrap();

    assert_eq!(read_store(&path).len(), 0);
    assert!(!handler.has("test", "site_name", None).unwrap());
    assert!(!handler.has("test", "site_name", Some("ctx")).unwrap());
}

#[test]
fn test_hydration_is_bounded_to_one_read_per_context() {
    // Given: a handler that has hydrated the general scope once
    let dir = TempDir::new().unwrap();
    let path = store_path(&dir);
    let mut handler = FileHandler::new(&path).unwrap();
    handler.set("test", "site_name", json!("Foo"), None).unwrap();
    assert_eq!(handler.get("test", "site_name", None).unwrap(), Some(json!("Foo")));

    // When: the backing file vanishes out-of-band
    fs::remove_file(&path).unwrap();

    // Then: reads still serve from the overlay - no re-read happens
    assert!(handler.has("test", "site_name", None).unwrap());
    assert_eq!(handler.get("test", "site_name", None).unwrap(), Some(json!("Foo")));
}

#[test]
fn test_context_hydration_folds_in_general_rows() {
    // Given: general and context rows persisted by an earlier handler
    let dir = TempDir::new().unwrap();
    let path = store_path(&dir);
    {
        let mut writer = FileHandler::new(&path).unwrap();
        writer.set("test", "site_name", json!("General"), None).unwrap();
        writer
            .set("test", "site_name", json!("Scoped"), Some("tenant:acme"))
            .unwrap();
    }

    // When: a fresh handler first touches the context scope, then the file
    // vanishes before the general scope is ever asked for
    let mut reader = FileHandler::new(&path).unwrap();
    assert_eq!(
        reader.get("test", "site_name", Some("tenant:acme")).unwrap(),
        Some(json!("Scoped"))
    );
    fs::remove_file(&path).unwrap();

    // Then: the general row was already loaded in the same hydration pass
    assert_eq!(
        reader.get("test", "site_name", None).unwrap(),
        Some(json!("General"))
    );
}

#[test]
fn test_missing_parent_directory_fails_at_construction() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nope").join("parametres.json");
    assert!(matches!(
        FileHandler::new(path),
        Err(ParametresError::StorageDirectoryNotFound { .. })
    ));
}

#[test]
fn test_empty_path_fails_at_construction() {
    assert_eq!(
        FileHandler::new(PathBuf::new()).err(),
        Some(ParametresError::StorageFileNotConfigured)
    );
}
