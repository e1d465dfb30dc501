use fx_core::{Platform, Timestamp, Variation};
use fx_store::{Config, ExperimentStore};
use tempfile::tempdir;

const BODY: &str = r#"{"variations": {"exp_a": "treatment_1", "exp_b": null}, "ttl": 60}"#;

#[test]
fn test_open_writes_default_config() {
    let dir = tempdir().unwrap();
    ExperimentStore::init(dir.path()).unwrap();

    let cfg = Config::load_from(&Config::config_path(dir.path())).unwrap();
    assert_eq!(cfg.client.platform, Platform::WordPressAndroid);
    assert!(cfg.db_path(dir.path()).exists());

    let defaults = Config::default();
    assert_eq!(cfg.storage.db_path, defaults.storage.db_path);
    assert_eq!(cfg.source.payload_path, defaults.source.payload_path);
}

#[test]
fn test_export_clear_and_refetch_restores_snapshot() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    let store = ExperimentStore::open(root).unwrap();
    let cfg = Config::load_from(&Config::config_path(root)).unwrap();
    std::fs::write(
        cfg.payload_path(root),
        r#"{"variations": {"exp_a": "treatment_1", "exp_b": null, "exp_empty": ""}, "ttl": 31536000}"#,
    )
    .unwrap();
    let original = store.fetch_assignments(Timestamp(1000)).unwrap();

    let exported = store.export_cached_assignments().unwrap().unwrap();
    let export_path = root.join("export.json");
    std::fs::write(&export_path, exported).unwrap();
    store.clear_cached_assignments().unwrap();
    assert!(store.export_cached_assignments().unwrap().is_none());
    drop(store);

    let reimport = ExperimentStore::open_with_payload(root, export_path).unwrap();
    let restored = reimport.fetch_assignments(Timestamp(999_999)).unwrap();
    assert_eq!(restored, original);
    assert_eq!(reimport.get_cached_assignments().unwrap(), Some(original));
    assert_eq!(restored.variation_for_experiment("exp_empty"), Variation::Treatment(String::new()));
}

#[test]
fn test_open_reports_unusable_state_dir() {
    let dir = tempdir().unwrap();
    // a regular file where the .fx directory should go
    std::fs::write(dir.path().join(".fx"), "").unwrap();
    let err = ExperimentStore::open(dir.path()).err().unwrap();
    assert!(format!("{:#}", err).contains("create"));
}

#[test]
fn test_fetch_survives_reopen() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    let store = ExperimentStore::open(root).unwrap();
    let cfg = Config::load_from(&Config::config_path(root)).unwrap();
    std::fs::write(cfg.payload_path(root), BODY).unwrap();

    store.fetch_assignments(Timestamp(1000)).unwrap();
    drop(store);

    let reopened = ExperimentStore::open(root).unwrap();
    let cached = reopened.get_cached_assignments().unwrap().unwrap();
    assert_eq!(cached.fetched_at(), Timestamp(1000));
    assert_eq!(cached.expires_at(), Timestamp(61_000));
    assert_eq!(cached.variation_for_experiment("exp_a"), Variation::Treatment("treatment_1".into()));
    assert_eq!(cached.variation_for_experiment("exp_b"), Variation::Control);
}

#[test]
fn test_explicit_payload_path_and_config_request() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    let mut cfg = Config::default();
    cfg.client.platform = Platform::WooCommerceAndroid;
    cfg.client.experiment_names = vec!["exp_a".into()];
    cfg.save_to(&Config::config_path(root)).unwrap();

    let payload = root.join("elsewhere.json");
    std::fs::write(&payload, BODY).unwrap();

    let store = ExperimentStore::open_with_payload(root, payload).unwrap();
    assert_eq!(store.request().platform, Platform::WooCommerceAndroid);
    assert_eq!(store.request().experiment_names, vec!["exp_a".to_string()]);
    assert_eq!(store.variation_for("exp_a", Timestamp(2000)).unwrap(), Variation::Treatment("treatment_1".into()));
}

#[test]
fn test_missing_payload_leaves_cache_empty() {
    let dir = tempdir().unwrap();
    let store = ExperimentStore::open(dir.path()).unwrap();
    assert!(store.fetch_assignments(Timestamp(1000)).is_err());
    assert!(store.get_cached_assignments().unwrap().is_none());
}
