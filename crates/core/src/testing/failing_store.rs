//! Show store wrapper that injects failures.

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use crate::show::{
    CreateShowRequest, EpisodeRecord, ShowError, ShowStatus, ShowStore, TrackedShow,
};

#[derive(Debug, Default)]
struct Failures {
    /// Show ids whose flag and timestamp writes fail.
    write_ids: HashSet<String>,
    pending_check: bool,
    lookups: bool,
}

/// Delegates to an inner store, failing selected operations.
///
/// # Example
///
/// ```rust,ignore
/// let store = FailingShowStore::new(Arc::new(SqliteShowStore::in_memory()?));
/// store.fail_writes_for(&show_a.id);
/// // checks of show_a now fail when persisting; other shows are unaffected
/// ```
pub struct FailingShowStore {
    inner: Arc<dyn ShowStore>,
    failures: RwLock<Failures>,
}

impl std::fmt::Debug for FailingShowStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FailingShowStore").finish_non_exhaustive()
    }
}

impl FailingShowStore {
    pub fn new(inner: Arc<dyn ShowStore>) -> Self {
        Self {
            inner,
            failures: RwLock::new(Failures::default()),
        }
    }

    /// Fail flag and last-checked writes for `id`.
    pub fn fail_writes_for(&self, id: &str) {
        if let Ok(mut failures) = self.failures.write() {
            failures.write_ids.insert(id.to_string());
        }
    }

    pub fn fail_pending_check(&self, fail: bool) {
        if let Ok(mut failures) = self.failures.write() {
            failures.pending_check = fail;
        }
    }

    /// Fail `get` and `get_by_url`.
    pub fn fail_lookups(&self, fail: bool) {
        if let Ok(mut failures) = self.failures.write() {
            failures.lookups = fail;
        }
    }

    fn check(&self, failing: impl Fn(&Failures) -> bool, what: &str) -> Result<(), ShowError> {
        let fail = self.failures.read().map(|f| failing(&f)).unwrap_or(false);
        if fail {
            Err(ShowError::Database(format!("injected failure: {}", what)))
        } else {
            Ok(())
        }
    }
}

impl ShowStore for FailingShowStore {
    fn create(&self, request: CreateShowRequest) -> Result<TrackedShow, ShowError> {
        self.inner.create(request)
    }

    fn get(&self, id: &str) -> Result<Option<TrackedShow>, ShowError> {
        self.check(|f| f.lookups, "get")?;
        self.inner.get(id)
    }

    fn get_by_url(&self, source_url: &str) -> Result<Option<TrackedShow>, ShowError> {
        self.check(|f| f.lookups, "get_by_url")?;
        self.inner.get_by_url(source_url)
    }

    fn list(&self) -> Result<Vec<TrackedShow>, ShowError> {
        self.inner.list()
    }

    fn find_pending_check(&self) -> Result<Vec<TrackedShow>, ShowError> {
        self.check(|f| f.pending_check, "find_pending_check")?;
        self.inner.find_pending_check()
    }

    fn set_has_new_episode(&self, id: &str, has_new_episode: bool) -> Result<(), ShowError> {
        self.check(|f| f.write_ids.contains(id), "set_has_new_episode")?;
        self.inner.set_has_new_episode(id, has_new_episode)
    }

    fn set_last_checked(&self, id: &str, checked_at: DateTime<Utc>) -> Result<(), ShowError> {
        self.check(|f| f.write_ids.contains(id), "set_last_checked")?;
        self.inner.set_last_checked(id, checked_at)
    }

    fn set_current_episode(&self, id: &str, episode: u32) -> Result<TrackedShow, ShowError> {
        self.inner.set_current_episode(id, episode)
    }

    fn set_status(&self, id: &str, status: ShowStatus) -> Result<TrackedShow, ShowError> {
        self.inner.set_status(id, status)
    }

    fn delete(&self, id: &str) -> Result<(), ShowError> {
        self.inner.delete(id)
    }

    fn record_episode_watched(
        &self,
        id: &str,
        episode: u32,
        rating: Option<u8>,
        notes: Option<String>,
    ) -> Result<EpisodeRecord, ShowError> {
        self.inner.record_episode_watched(id, episode, rating, notes)
    }

    fn episode_records(&self, id: &str) -> Result<Vec<EpisodeRecord>, ShowError> {
        self.inner.episode_records(id)
    }
}
