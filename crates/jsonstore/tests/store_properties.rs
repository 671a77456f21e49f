use std::sync::Arc;

use jsonstore::{resolve_read, resolve_write, KeyPath, LookupMode, MemoryBackend, Store, StoreConfig, StoreError};
use serde_json::{json, Map, Value};
use tempfile::tempdir;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    drop(
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init(),
    );
}

fn object(value: Value) -> Map<String, Value> { value.as_object().cloned().unwrap() }

#[tokio::test]
async fn set_then_get_returns_value() {
    init_tracing();
    let temp_dir = tempdir().unwrap();
    let store = Store::at(temp_dir.path()).await.unwrap();

    for (key, value) in [
        ("string", json!("John")),
        ("number", json!(42)),
        ("bool", json!(true)),
        ("array", json!([1, "two", null])),
        ("object", json!({"a": {"b": 1}})),
    ] {
        store.set(key, value.clone()).await.unwrap();
        assert_eq!(store.get(key).unwrap(), value);
    }
}

#[tokio::test]
async fn truthy_mode_reports_falsy_values_missing() {
    init_tracing();
    let backend = Arc::new(MemoryBackend::new());
    let config = StoreConfig::new("/app").with_lookup(LookupMode::Truthy);
    let store = Store::open_with_backend(config, backend).await.unwrap();

    for value in [json!(0), json!(""), json!(false), json!(null)] {
        store.set("k", value).await.unwrap();
        assert!(matches!(store.get("k"), Err(StoreError::KeyNotFound { .. })));
    }
}

#[tokio::test]
async fn set_all_keeps_unrelated_keys() {
    init_tracing();
    let temp_dir = tempdir().unwrap();
    let store = Store::at(temp_dir.path()).await.unwrap();

    store.set("name", json!("John")).await.unwrap();
    store.set_all(json!({"a": 1, "b": 2})).await.unwrap();

    assert_eq!(store.get_all(), json!({"name": "John", "a": 1, "b": 2}));
}

#[tokio::test]
async fn delete_absent_key_resolves() {
    init_tracing();
    let temp_dir = tempdir().unwrap();
    let store = Store::at(temp_dir.path()).await.unwrap();

    store.delete("ghost").await.unwrap();
    assert!(store.get("ghost").unwrap_err().is_not_found());
}

#[test]
fn resolver_reads_and_writes_nested_values() {
    let doc = object(json!({"a": {"b": {"c": 42}}}));
    assert_eq!(
        resolve_read(&KeyPath::from("a.b.c"), &doc, LookupMode::Presence).unwrap(),
        &json!(42)
    );

    let doc = object(json!({"a": {"b": {}}}));
    assert!(
        resolve_read(&KeyPath::from("a.x.c"), &doc, LookupMode::Presence)
            .unwrap_err()
            .is_not_found()
    );

    let mut doc = Map::new();
    resolve_write(&KeyPath::from(["a", "b", "c"]), &mut doc, json!(5)).unwrap();
    assert_eq!(Value::Object(doc), json!({"a": {"b": {"c": 5}}}));
}

#[tokio::test]
async fn clear_empties_memory_and_disk() {
    init_tracing();
    let temp_dir = tempdir().unwrap();
    let store = Store::at(temp_dir.path()).await.unwrap();

    store.set_all(json!({"a": 1, "b": {"c": 2}})).await.unwrap();
    store.clear().await.unwrap();
    assert_eq!(store.get_all(), json!({}));

    let reopened = Store::at(temp_dir.path()).await.unwrap();
    assert_eq!(reopened.get_all(), json!({}));
}

#[tokio::test]
async fn reopening_reproduces_document() {
    init_tracing();
    let temp_dir = tempdir().unwrap();
    let config = StoreConfig::new(temp_dir.path())
        .with_file_name("prefs.json")
        .with_pretty(false);

    let store = Store::open(config.clone()).await.unwrap();
    store.set("window", json!({"w": 800, "h": 600})).await.unwrap();
    store.set_all(json!({"recent": ["a.txt", "b.txt"], "zoom": 1.25})).await.unwrap();
    store.set_path("window.maximized", json!(false)).await.unwrap();
    let expected = store.get_all();
    drop(store);

    let reopened = Store::open(config).await.unwrap();
    assert_eq!(reopened.get_all(), expected);
    assert_eq!(reopened.get_path("window.maximized").unwrap(), json!(false));
}
