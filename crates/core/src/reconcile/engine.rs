//! Update reconciliation engine.
//!
//! For each show the engine first probes the next episode's URL directly.
//! When the probe finds nothing it scans the show page and accepts the
//! scanned number only if the [`AcceptancePolicy`] trusts it. Accepted
//! results raise the show's new-episode flag; the engine never advances
//! the user's progress itself.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::show::{ShowError, ShowStore, TrackedShow};
use crate::source::{ProbeResult, SourceAdapter};

use super::config::CheckerConfig;
use super::policy::AcceptancePolicy;
use super::types::{BatchOutcome, BatchReport, ReconcileError, UpdateResult};

/// Holds the engine's batch flag; clears it on drop.
struct BatchGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> BatchGuard<'a> {
    fn try_acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for BatchGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Detects new episodes for tracked shows.
pub struct ReconcileEngine {
    config: CheckerConfig,
    policy: AcceptancePolicy,
    store: Arc<dyn ShowStore>,
    source: Arc<dyn SourceAdapter>,
    checking: AtomicBool,
}

impl ReconcileEngine {
    pub fn new(
        config: CheckerConfig,
        store: Arc<dyn ShowStore>,
        source: Arc<dyn SourceAdapter>,
    ) -> Self {
        Self {
            policy: AcceptancePolicy::from_config(&config),
            config,
            store,
            source,
            checking: AtomicBool::new(false),
        }
    }

    /// Whether a batch is in flight on this engine.
    pub fn is_checking(&self) -> bool {
        self.checking.load(Ordering::Acquire)
    }

    /// Check every show that has no pending new-episode flag.
    pub async fn reconcile_all(&self) -> Result<BatchOutcome, ReconcileError> {
        let Some(_guard) = BatchGuard::try_acquire(&self.checking) else {
            info!("Update check already running, skipping");
            return Ok(BatchOutcome::AlreadyRunning);
        };

        let shows = self.store.find_pending_check()?;
        self.run_batch(&shows).await.map(BatchOutcome::Completed)
    }

    /// Check the given shows in order.
    pub async fn reconcile(&self, shows: &[TrackedShow]) -> Result<BatchOutcome, ReconcileError> {
        let Some(_guard) = BatchGuard::try_acquire(&self.checking) else {
            info!("Update check already running, skipping");
            return Ok(BatchOutcome::AlreadyRunning);
        };

        self.run_batch(shows).await.map(BatchOutcome::Completed)
    }

    /// Check a single show. Returns at most one update.
    ///
    /// Only an unknown id or a failed lookup is an error; problems during
    /// the check itself are logged and yield no update.
    pub async fn reconcile_one(&self, id: &str) -> Result<Vec<UpdateResult>, ReconcileError> {
        let show = self
            .store
            .get(id)?
            .ok_or_else(|| ReconcileError::NotFound(id.to_string()))?;

        if show.is_complete() {
            debug!("Skipping completed show {}", show.title);
            return Ok(Vec::new());
        }

        match self.check_show(&show).await {
            Ok(update) => Ok(update.into_iter().collect()),
            Err(e) => {
                warn!("Update check failed for {}: {}", show.title, e);
                Ok(Vec::new())
            }
        }
    }

    async fn run_batch(&self, shows: &[TrackedShow]) -> Result<BatchReport, ReconcileError> {
        self.source.open_session().await?;

        info!(
            "Checking {} shows for new episodes via {}",
            shows.len(),
            self.source.name()
        );
        let delay = self.config.inter_show_delay();
        let mut report = BatchReport::default();

        for show in shows {
            if show.is_complete() {
                debug!("Skipping completed show {}", show.title);
                report.skipped += 1;
                continue;
            }

            if report.checked + report.failed > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            match self.check_show(show).await {
                Ok(update) => {
                    report.checked += 1;
                    report.updates.extend(update);
                }
                Err(e) => {
                    warn!("Update check failed for {}: {}", show.title, e);
                    report.failed += 1;
                }
            }
        }

        info!(
            "Update check finished: {} checked, {} skipped, {} failed, {} new",
            report.checked,
            report.skipped,
            report.failed,
            report.updates.len()
        );
        Ok(report)
    }

    /// Detect, then persist the flag and the check timestamp.
    async fn check_show(&self, show: &TrackedShow) -> Result<Option<UpdateResult>, ShowError> {
        let update = self.detect(show).await;

        if let Some(update) = &update {
            self.store.set_has_new_episode(&show.id, true)?;
            info!(
                "New episode for {}: {} (was {})",
                show.title, update.new_episode, show.current_episode
            );
        }

        self.store.set_last_checked(&show.id, Utc::now())?;
        Ok(update)
    }

    async fn detect(&self, show: &TrackedShow) -> Option<UpdateResult> {
        let next = show.current_episode + 1;

        match self
            .source
            .probe_episode(&show.source_url, next, show.total_episodes)
            .await
        {
            Ok(ProbeResult { found: true, url }) => {
                return Some(UpdateResult {
                    show: show.clone(),
                    new_episode: next,
                    episode_url: url,
                });
            }
            Ok(_) => debug!("Episode {} of {} not found by probe", next, show.title),
            Err(e) => warn!("Probe failed for {}: {}", show.title, e),
        }

        let scan = match self.source.scan_latest_episode(&show.source_url).await {
            Ok(scan) => scan,
            Err(e) => {
                warn!("Scan failed for {}: {}", show.title, e);
                return None;
            }
        };

        let latest = scan.latest_episode;
        if let Err(rejection) =
            self.policy
                .evaluate(show.current_episode, show.total_episodes, latest)
        {
            debug!(
                "Ignoring scanned episode {} for {}: {}",
                latest, show.title, rejection
            );
            return None;
        }

        Some(UpdateResult {
            show: show.clone(),
            new_episode: latest,
            episode_url: self
                .source
                .episode_url(&show.source_url, latest, show.total_episodes),
        })
    }
}
