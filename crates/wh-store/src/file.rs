//! JSON file store
//!
//! The whole document is read once on open, kept in memory, and rewritten
//! after every mutation.

use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;

use wh_core::Strategy;
use wh_sim::SimulationResults;

use crate::data::SavedData;
use crate::error::StoreResult;
use crate::preferences::UserPreferences;
use crate::store::StrategyStore;

pub struct JsonFileStore {
    path: PathBuf,
    data: RwLock<SavedData>,
}

impl JsonFileStore {
    /// Open `path`, creating nothing until the first write.
    ///
    /// A missing file starts empty. An unreadable or corrupt file also starts
    /// empty and is overwritten on the next write.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let mut data = Self::load(&path);
        let migrated = data.migrate();

        let store = Self {
            path,
            data: RwLock::new(data),
        };
        if migrated {
            store.save()?;
        }
        Ok(store)
    }

    fn load(path: &Path) -> SavedData {
        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return SavedData::default(),
            Err(e) => {
                log::warn!("Cannot read store {}: {}; starting empty", path.display(), e);
                return SavedData::default();
            }
        };
        match SavedData::from_json(&json) {
            Ok(data) => data,
            Err(e) => {
                log::warn!("Corrupt store {}: {}; starting empty", path.display(), e);
                SavedData::default()
            }
        }
    }

    fn save(&self) -> StoreResult<()> {
        self.write_file(&self.data.read())
    }

    fn write_file(&self, data: &SavedData) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, data.to_json()?)?;
        Ok(())
    }

    /// Apply `f` to a copy of the document, write it, then swap it in.
    ///
    /// The in-memory document is untouched unless the write succeeds.
    fn mutate<T>(&self, f: impl FnOnce(&mut SavedData) -> StoreResult<T>) -> StoreResult<T> {
        let mut data = self.data.write();
        let mut draft = data.clone();
        let out = f(&mut draft)?;
        self.write_file(&draft)?;
        *data = draft;
        Ok(out)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn preferences(&self) -> UserPreferences {
        self.data.read().user_preferences.clone()
    }

    pub fn set_preferences(&self, preferences: UserPreferences) -> StoreResult<()> {
        self.mutate(|data| {
            data.user_preferences = preferences;
            Ok(())
        })
    }

    /// Whole document as pretty JSON, for backup
    pub fn export_json(&self) -> StoreResult<String> {
        self.data.read().to_json()
    }

    /// Replace the whole document with an exported one.
    ///
    /// Nothing changes if the payload fails to parse.
    pub fn import_json(&self, json: &str) -> StoreResult<()> {
        let mut imported = SavedData::from_json(json)?;
        imported.migrate();
        let count = imported.strategies.len();
        self.mutate(|data| {
            *data = imported;
            Ok(())
        })?;
        log::info!("Imported {} strategies into {}", count, self.path.display());
        Ok(())
    }
}

impl StrategyStore for JsonFileStore {
    fn list(&self) -> StoreResult<Vec<Strategy>> {
        Ok(self.data.read().strategies.clone())
    }

    fn get(&self, id: &str) -> StoreResult<Option<Strategy>> {
        Ok(self.data.read().find(id))
    }

    fn put(&self, strategy: Strategy) -> StoreResult<Strategy> {
        let saved = self.mutate(|data| Ok(data.upsert(strategy)))?;
        log::info!("Saved strategy '{}' ({})", saved.name, saved.id);
        Ok(saved)
    }

    fn delete(&self, id: &str) -> StoreResult<()> {
        let removed = self.mutate(|data| data.remove(id))?;
        log::info!("Deleted strategy '{}' ({})", removed.name, removed.id);
        Ok(())
    }

    fn append_result(&self, results: SimulationResults) -> StoreResult<()> {
        self.mutate(|data| {
            data.push_result(results);
            Ok(())
        })
    }

    fn list_results(&self) -> StoreResult<Vec<SimulationResults>> {
        Ok(self.data.read().simulation_history.clone())
    }

    fn clear_results(&self) -> StoreResult<()> {
        self.mutate(|data| {
            data.simulation_history.clear();
            Ok(())
        })?;
        log::info!("Cleared simulation history in {}", self.path.display());
        Ok(())
    }

    fn duplicate(&self, id: &str) -> StoreResult<Strategy> {
        self.mutate(|data| data.duplicate(id))
    }
}
