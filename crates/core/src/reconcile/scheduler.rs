//! Periodic update checks.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::notify::NotificationService;
use crate::settings::SettingsService;

use super::engine::ReconcileEngine;
use super::types::{BatchOutcome, ReconcileError};

/// Runs [`ReconcileEngine::reconcile_all`] every `check_interval` minutes
/// and announces what it finds.
///
/// The interval and the `auto_refresh` switch are read from
/// [`SettingsService`]. Saving settings restarts the wait with the new
/// interval.
pub struct UpdateScheduler {
    engine: Arc<ReconcileEngine>,
    notifications: Arc<NotificationService>,
    settings: Arc<SettingsService>,

    running: Arc<AtomicBool>,
    shutdown_tx: broadcast::Sender<()>,
}

impl UpdateScheduler {
    pub fn new(
        engine: Arc<ReconcileEngine>,
        notifications: Arc<NotificationService>,
        settings: Arc<SettingsService>,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            engine,
            notifications,
            settings,
            running: Arc::new(AtomicBool::new(false)),
            shutdown_tx,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Start the background loop.
    pub fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Update scheduler already running");
            return;
        }

        let running = Arc::clone(&self.running);
        let engine = Arc::clone(&self.engine);
        let notifications = Arc::clone(&self.notifications);
        let settings = Arc::clone(&self.settings);
        let mut changes = settings.subscribe();
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            info!("Update scheduler started");
            loop {
                let interval = settings.check_interval();
                debug!("Next update check in {:?}", interval);
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        info!("Update scheduler received shutdown signal");
                        break;
                    }
                    changed = changes.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        debug!("Settings changed, restarting check timer");
                    }
                    _ = tokio::time::sleep(interval) => {
                        if !running.load(Ordering::Relaxed) {
                            break;
                        }
                        scheduled_check(&engine, &notifications, &settings).await;
                    }
                }
            }
            info!("Update scheduler stopped");
        });
    }

    /// Stop the background loop after the current batch.
    pub fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        info!("Stopping update scheduler");
        let _ = self.shutdown_tx.send(());
    }
}

/// One timer tick. Skipped while `auto_refresh` is off.
async fn scheduled_check(
    engine: &ReconcileEngine,
    notifications: &NotificationService,
    settings: &SettingsService,
) -> Option<BatchOutcome> {
    if !settings.auto_refresh() {
        debug!("Auto refresh off, skipping periodic check");
        return None;
    }
    match run_check(engine, notifications).await {
        Ok(outcome) => Some(outcome),
        Err(e) => {
            error!("Periodic update check failed: {}", e);
            None
        }
    }
}

/// Check all pending shows and notify about the updates found.
pub async fn run_check(
    engine: &ReconcileEngine,
    notifications: &NotificationService,
) -> Result<BatchOutcome, ReconcileError> {
    let outcome = engine.reconcile_all().await?;
    notifications.notify_updates(outcome.updates()).await;
    Ok(outcome)
}
