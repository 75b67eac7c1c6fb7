//! wh-store: Persistence for Wheelhouse
//!
//! Strategies, simulation history and user preferences behind the
//! [`StrategyStore`] trait:
//! - [`MemoryStore`]: process-local, for tests and embedding
//! - [`JsonFileStore`]: one pretty-printed JSON document on disk

mod data;
mod error;
mod file;
mod preferences;
mod store;

pub use data::{HISTORY_LIMIT, STORE_VERSION, SavedData};
pub use error::{StoreError, StoreResult};
pub use file::JsonFileStore;
pub use preferences::{ChartType, Theme, UserPreferences};
pub use store::{MemoryStore, StrategyStore};
