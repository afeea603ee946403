use std::fs;

use scout_core::settings::{ConfigStore, Configuration, DEFAULT_API_BASE_URL};

fn store_in(dir: &tempfile::TempDir) -> ConfigStore {
    ConfigStore::in_dir(dir.path())
}

#[test]
fn get_returns_default_when_nothing_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);

    let cfg = store.get();
    assert!(!cfg.use_remote);
    assert_eq!(cfg.api_base_url, DEFAULT_API_BASE_URL);
    assert_eq!(cfg, Configuration::default());
}

#[test]
fn set_then_get_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);

    let cfg = Configuration::remote("https://scanner.internal/api");
    store.set(&cfg).unwrap();
    assert_eq!(store.get(), cfg);
}

#[test]
fn set_overwrites_whole_record() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);

    store.set(&Configuration::remote("http://first")).unwrap();
    store
        .set(&Configuration {
            use_remote: false,
            api_base_url: "http://second".into(),
        })
        .unwrap();

    let loaded = store.get();
    assert!(!loaded.use_remote);
    assert_eq!(loaded.api_base_url, "http://second");
}

#[test]
fn corrupt_record_falls_back_to_default() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    fs::write(store.path(), "{ not json").unwrap();

    assert_eq!(store.get(), Configuration::default());
}

#[test]
fn record_with_wrong_shape_falls_back_to_default() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    fs::write(store.path(), r#"{"useMock": "yes"}"#).unwrap();

    assert_eq!(store.get(), Configuration::default());
}

#[test]
fn set_does_not_validate_url() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);

    let cfg = Configuration::remote("not a url at all");
    store.set(&cfg).unwrap();
    assert_eq!(store.get().api_base_url, "not a url at all");
}

#[test]
fn set_creates_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let store = ConfigStore::in_dir(dir.path().join("nested").join("deeper"));

    store.set(&Configuration::default()).unwrap();
    assert!(store.path().exists());
}

#[test]
fn persisted_file_uses_browser_compatible_keys() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    store.set(&Configuration::remote("http://x")).unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
    assert_eq!(raw["useMock"], false);
    assert_eq!(raw["apiUrl"], "http://x");
}
