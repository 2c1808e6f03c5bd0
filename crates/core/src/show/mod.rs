//! Tracked shows, watch records, categories and settings persistence.

mod sqlite_store;
mod store;
mod types;

pub use sqlite_store::SqliteShowStore;
pub use store::{CategoryStore, CreateShowRequest, SettingsStore, ShowError, ShowStore};
pub use types::{EpisodeRecord, ShowStatus, TrackedShow, MAX_EPISODE_NUMBER};
