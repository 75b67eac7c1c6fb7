//! Persisted document: user strategies, run history and preferences

use serde::{Deserialize, Serialize};

use wh_core::{Strategy, now_millis, presets};
use wh_sim::SimulationResults;

use crate::error::{StoreError, StoreResult};
use crate::preferences::UserPreferences;

/// Format version written into every saved document
pub const STORE_VERSION: &str = "1.0.0";

/// Most recent results kept in history
pub const HISTORY_LIMIT: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedData {
    pub strategies: Vec<Strategy>,
    #[serde(default)]
    pub simulation_history: Vec<SimulationResults>,
    #[serde(default)]
    pub user_preferences: UserPreferences,
    #[serde(default)]
    pub version: String,
}

impl Default for SavedData {
    fn default() -> Self {
        Self {
            strategies: Vec::new(),
            simulation_history: Vec::new(),
            user_preferences: UserPreferences::default(),
            version: STORE_VERSION.to_string(),
        }
    }
}

impl SavedData {
    /// Parse a saved or exported document.
    ///
    /// A document without a `strategies` array is rejected before the rest is
    /// decoded.
    pub fn from_json(json: &str) -> StoreResult<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        if !value.get("strategies").is_some_and(serde_json::Value::is_array) {
            return Err(StoreError::InvalidData("missing strategies array".into()));
        }
        Ok(serde_json::from_value(value)?)
    }

    pub fn to_json(&self) -> StoreResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Re-stamp an older document. Returns true if anything changed.
    pub fn migrate(&mut self) -> bool {
        if self.version == STORE_VERSION {
            return false;
        }
        log::info!("Migrating store data from version '{}' to {}", self.version, STORE_VERSION);
        self.version = STORE_VERSION.to_string();
        true
    }

    /// User strategy first, then the built-in catalog.
    pub fn find(&self, id: &str) -> Option<Strategy> {
        self.strategies
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .or_else(|| presets::preset(id))
    }

    /// Insert or replace by id, stamping timestamps.
    pub fn upsert(&mut self, mut strategy: Strategy) -> Strategy {
        let now = now_millis();
        strategy.modified_at = now;
        match self.strategies.iter_mut().find(|s| s.id == strategy.id) {
            Some(existing) => {
                if strategy.created_at == 0 {
                    strategy.created_at = existing.created_at;
                }
                *existing = strategy.clone();
            }
            None => {
                strategy.created_at = now;
                self.strategies.push(strategy.clone());
            }
        }
        strategy
    }

    pub fn remove(&mut self, id: &str) -> StoreResult<Strategy> {
        match self.strategies.iter().position(|s| s.id == id) {
            Some(index) => Ok(self.strategies.remove(index)),
            None if presets::preset(id).is_some() => Err(StoreError::PresetProtected(id.to_string())),
            None => Err(StoreError::NotFound(id.to_string())),
        }
    }

    /// Append to history, dropping the oldest entries beyond [`HISTORY_LIMIT`].
    pub fn push_result(&mut self, results: SimulationResults) {
        self.simulation_history.push(results);
        let excess = self.simulation_history.len().saturating_sub(HISTORY_LIMIT);
        self.simulation_history.drain(..excess);
    }

    /// Copy of `id` under a fresh id, saved as a user strategy.
    pub fn duplicate(&mut self, id: &str) -> StoreResult<Strategy> {
        let original = self.find(id).ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let mut copy = original.clone();
        copy.id = format!("{}-copy-{}", original.id, uuid::Uuid::new_v4().simple());
        copy.name = format!("{} (Copy)", original.name);
        copy.is_preloaded = false;
        copy.created_at = 0;
        Ok(self.upsert(copy))
    }
}
