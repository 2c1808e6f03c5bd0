//! New-episode notifications.
//!
//! A batch's updates are folded into one [`NotificationPayload`] and handed
//! to a [`Notifier`]. Whether anything is sent is decided by
//! [`NotificationService`], which reads the `notifications` preference
//! from [`SettingsService`](crate::settings::SettingsService).

mod service;

pub use service::NotificationService;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::reconcile::UpdateResult;

/// Notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Default for the notification preference.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
        }
    }
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Notification delivery failed: {0}")]
    Delivery(String),
}

/// Summary of a batch's updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotificationPayload {
    /// Exactly one show has a new episode.
    Single { title: String, episode: u32 },
    /// Several shows have new episodes.
    Count { count: usize },
    /// Sent on request to check that delivery works.
    Test,
}

impl NotificationPayload {
    pub fn headline(&self) -> &'static str {
        match self {
            NotificationPayload::Single { .. } => "Yeni Bölüm!",
            NotificationPayload::Count { .. } => "Yeni Bölümler!",
            NotificationPayload::Test => "Test Bildirimi",
        }
    }

    pub fn body(&self) -> String {
        match self {
            NotificationPayload::Single { title, episode } => {
                format!("{} - {}. Bölüm", title, episode)
            }
            NotificationPayload::Count { count } => {
                format!("{} anime için yeni bölüm bulundu", count)
            }
            NotificationPayload::Test => "Bu bir test bildirimidir!".to_string(),
        }
    }
}

/// Fold updates into a payload. `None` when there is nothing to announce.
pub fn summarize(updates: &[UpdateResult]) -> Option<NotificationPayload> {
    match updates {
        [] => None,
        [update] => Some(NotificationPayload::Single {
            title: update.show.title.clone(),
            episode: update.new_episode,
        }),
        many => Some(NotificationPayload::Count { count: many.len() }),
    }
}

/// Delivers notification payloads.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, payload: &NotificationPayload) -> Result<(), NotifyError>;
}

/// Notifier that writes to the log.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, payload: &NotificationPayload) -> Result<(), NotifyError> {
        info!(headline = payload.headline(), "{}", payload.body());
        Ok(())
    }
}
