//! JsonFileStore on a real filesystem
//!
//! Tests:
//! - Writes survive reopening
//! - Corrupt and outdated files are recovered
//! - Export / import round trip and import rejection
//! - History cap applies on disk
//! - A failed write leaves the store unchanged

use std::fs;

use tempfile::TempDir;
use wh_core::presets;
use wh_sim::{MonteCarlo, SimConfig, SimulationResults, TrialRetention};
use wh_store::{
    ChartType, HISTORY_LIMIT, JsonFileStore, STORE_VERSION, StoreError, StrategyStore, UserPreferences,
};

// ═══════════════════════════════════════════════════════════════════════════════
// HELPERS
// ═══════════════════════════════════════════════════════════════════════════════

fn store_in(dir: &TempDir) -> JsonFileStore {
    JsonFileStore::open(dir.path().join("data").join("wheelhouse.json")).unwrap()
}

fn quick_results(seed: u64) -> SimulationResults {
    let strategy = presets::preset("double-street-125").unwrap();
    let config = SimConfig::quick().with_trials(4).with_seed(seed).with_retention(TrialRetention::Summary);
    MonteCarlo::new(config).run(&strategy).unwrap()
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_missing_file_starts_empty() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    assert!(store.list().unwrap().is_empty());
    assert!(store.list_results().unwrap().is_empty());
    assert!(!store.path().exists());
    assert_eq!(store.list_all().unwrap().len(), presets::preloaded().len());
}

#[test]
fn test_writes_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let saved = {
        let store = store_in(&dir);
        let saved = store.put(presets::blank()).unwrap();
        store.append_result(quick_results(1)).unwrap();
        store
            .set_preferences(UserPreferences {
                chart_type: ChartType::Bar,
                ..Default::default()
            })
            .unwrap();
        saved
    };

    let reopened = store_in(&dir);
    assert_eq!(reopened.get(&saved.id).unwrap(), Some(saved));
    assert_eq!(reopened.list_results().unwrap().len(), 1);
    assert_eq!(reopened.list_results().unwrap()[0].seed, 1);
    assert_eq!(reopened.preferences().chart_type, ChartType::Bar);
}

#[test]
fn test_document_shape() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    store.put(presets::blank()).unwrap();

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
    assert_eq!(json["version"], STORE_VERSION);
    assert!(json["strategies"].is_array());
    assert!(json["simulationHistory"].is_array());
    assert_eq!(json["userPreferences"]["defaultSimulationCount"], 1000);
}

#[test]
fn test_corrupt_file_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{ not json").unwrap();

    let store = JsonFileStore::open(&path).unwrap();
    assert!(store.list().unwrap().is_empty());

    store.put(presets::blank()).unwrap();
    let reopened = JsonFileStore::open(&path).unwrap();
    assert_eq!(reopened.list().unwrap().len(), 1);
}

#[test]
fn test_old_version_is_restamped() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("old.json");
    fs::write(&path, r#"{"strategies":[],"simulationHistory":[],"version":"0.1.0"}"#).unwrap();

    JsonFileStore::open(&path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["version"], STORE_VERSION);
}

#[test]
fn test_delete_rules() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    let copy = store.duplicate("mod-tie-fighter").unwrap();
    assert_eq!(copy.name, "MOD Tie Fighter (Copy)");

    store.delete(&copy.id).unwrap();
    assert!(matches!(store.delete(&copy.id), Err(StoreError::NotFound(_))));
    assert!(matches!(store.delete("mod-tie-fighter"), Err(StoreError::PresetProtected(_))));
    assert!(store.get("mod-tie-fighter").unwrap().is_some());
}

#[test]
fn test_history_cap_on_disk() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    let sample = quick_results(0);
    for seed in 0..(HISTORY_LIMIT as u64 + 5) {
        let mut results = sample.clone();
        results.seed = seed;
        store.append_result(results).unwrap();
    }

    let reopened = store_in(&dir);
    let history = reopened.list_results().unwrap();
    assert_eq!(history.len(), HISTORY_LIMIT);
    assert_eq!(history.first().map(|r| r.seed), Some(5));

    reopened.clear_results().unwrap();
    assert!(store_in(&dir).list_results().unwrap().is_empty());
}

#[test]
fn test_export_import() {
    let source_dir = TempDir::new().unwrap();
    let source = store_in(&source_dir);
    let saved = source.put(presets::blank()).unwrap();
    source.append_result(quick_results(9)).unwrap();
    let backup = source.export_json().unwrap();

    let target_dir = TempDir::new().unwrap();
    let target = store_in(&target_dir);
    target.import_json(&backup).unwrap();
    assert_eq!(target.list().unwrap(), vec![saved]);
    assert_eq!(target.list_results().unwrap().len(), 1);

    // Rejected payloads leave the store untouched
    assert!(matches!(target.import_json(r#"{"strategies":{}}"#), Err(StoreError::InvalidData(_))));
    assert!(target.import_json(r#"{"strategies":[{"id":1}],"simulationHistory":[]}"#).is_err());
    assert_eq!(target.list().unwrap().len(), 1);
}

#[test]
fn test_failed_write_leaves_memory_unchanged() {
    let dir = TempDir::new().unwrap();
    // A regular file where the store's directory should be
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "not a directory").unwrap();
    let store = JsonFileStore::open(blocker.join("wheelhouse.json")).unwrap();

    assert!(matches!(store.put(presets::blank()), Err(StoreError::Io(_))));
    assert!(store.list().unwrap().is_empty());

    assert!(store.append_result(quick_results(2)).is_err());
    assert!(store.list_results().unwrap().is_empty());

    let prefs = UserPreferences {
        default_simulation_count: 42,
        ..Default::default()
    };
    assert!(store.set_preferences(prefs).is_err());
    assert_eq!(store.preferences(), UserPreferences::default());
}
