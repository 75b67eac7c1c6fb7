//! Store interface and the in-memory implementation

use parking_lot::RwLock;

use wh_core::{Strategy, presets};
use wh_sim::SimulationResults;

use crate::data::SavedData;
use crate::error::StoreResult;
use crate::preferences::UserPreferences;

/// Key-value persistence for strategies and simulation history.
///
/// `get` sees user strategies first and falls back to the built-in catalog;
/// `list` returns user strategies only.
pub trait StrategyStore {
    fn list(&self) -> StoreResult<Vec<Strategy>>;
    fn get(&self, id: &str) -> StoreResult<Option<Strategy>>;
    /// Insert or replace by id; returns the stamped copy.
    fn put(&self, strategy: Strategy) -> StoreResult<Strategy>;
    fn delete(&self, id: &str) -> StoreResult<()>;
    fn append_result(&self, results: SimulationResults) -> StoreResult<()>;
    /// Oldest first
    fn list_results(&self) -> StoreResult<Vec<SimulationResults>>;
    fn clear_results(&self) -> StoreResult<()>;
    fn duplicate(&self, id: &str) -> StoreResult<Strategy>;

    /// Built-in strategies followed by user strategies
    fn list_all(&self) -> StoreResult<Vec<Strategy>> {
        let mut all = presets::preloaded();
        all.extend(self.list()?);
        Ok(all)
    }
}

/// Store that lives and dies with the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<SavedData>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn preferences(&self) -> UserPreferences {
        self.data.read().user_preferences.clone()
    }

    pub fn set_preferences(&self, preferences: UserPreferences) {
        self.data.write().user_preferences = preferences;
    }
}

impl StrategyStore for MemoryStore {
    fn list(&self) -> StoreResult<Vec<Strategy>> {
        Ok(self.data.read().strategies.clone())
    }

    fn get(&self, id: &str) -> StoreResult<Option<Strategy>> {
        Ok(self.data.read().find(id))
    }

    fn put(&self, strategy: Strategy) -> StoreResult<Strategy> {
        Ok(self.data.write().upsert(strategy))
    }

    fn delete(&self, id: &str) -> StoreResult<()> {
        self.data.write().remove(id).map(drop)
    }

    fn append_result(&self, results: SimulationResults) -> StoreResult<()> {
        self.data.write().push_result(results);
        Ok(())
    }

    fn list_results(&self) -> StoreResult<Vec<SimulationResults>> {
        Ok(self.data.read().simulation_history.clone())
    }

    fn clear_results(&self) -> StoreResult<()> {
        self.data.write().simulation_history.clear();
        Ok(())
    }

    fn duplicate(&self, id: &str) -> StoreResult<Strategy> {
        self.data.write().duplicate(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::HISTORY_LIMIT;
    use crate::error::StoreError;
    use crate::preferences::Theme;
    use wh_sim::{MonteCarlo, SimConfig, TrialRetention};

    fn results(seed: u64) -> SimulationResults {
        let strategy = presets::preset("martingale-red").unwrap();
        let config = SimConfig::quick().with_trials(5).with_seed(seed).with_retention(TrialRetention::Summary);
        MonteCarlo::new(config).run(&strategy).unwrap()
    }

    #[test]
    fn test_put_get_delete() {
        let store = MemoryStore::new();
        let saved = store.put(presets::blank()).unwrap();

        assert_eq!(store.get(&saved.id).unwrap(), Some(saved.clone()));
        assert_eq!(store.list().unwrap().len(), 1);
        assert_eq!(store.list_all().unwrap().len(), presets::preloaded().len() + 1);

        store.delete(&saved.id).unwrap();
        assert_eq!(store.get(&saved.id).unwrap(), None);
        assert!(matches!(store.delete("bullet-ladder"), Err(StoreError::PresetProtected(_))));
    }

    #[test]
    fn test_history_capped() {
        let store = MemoryStore::new();
        for seed in 0..(HISTORY_LIMIT as u64 + 3) {
            store.append_result(results(seed)).unwrap();
        }
        let history = store.list_results().unwrap();
        assert_eq!(history.len(), HISTORY_LIMIT);
        assert_eq!(history[0].seed, 3);
        assert_eq!(history[HISTORY_LIMIT - 1].seed, HISTORY_LIMIT as u64 + 2);

        store.clear_results().unwrap();
        assert!(store.list_results().unwrap().is_empty());
    }

    #[test]
    fn test_preferences() {
        let store = MemoryStore::new();
        let mut prefs = store.preferences();
        prefs.theme = Theme::Light;
        store.set_preferences(prefs.clone());
        assert_eq!(store.preferences(), prefs);
    }
}
