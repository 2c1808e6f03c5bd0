use std::sync::Arc;

use tracing::{debug, info, warn};

use super::{summarize, NotificationPayload, Notifier, NotifyError};
use crate::reconcile::UpdateResult;
use crate::settings::{SettingsService, SettingsUpdate};
use crate::show::ShowError;

/// Sends batch summaries when the user wants them.
pub struct NotificationService {
    settings: Arc<SettingsService>,
    notifier: Arc<dyn Notifier>,
}

impl NotificationService {
    pub fn new(settings: Arc<SettingsService>, notifier: Arc<dyn Notifier>) -> Self {
        Self { settings, notifier }
    }

    /// Current preference: the stored setting if present, else the config default.
    pub fn enabled(&self) -> bool {
        self.settings.notifications_enabled()
    }

    pub fn set_enabled(&self, enabled: bool) -> Result<(), ShowError> {
        self.settings
            .update(&SettingsUpdate::notifications(enabled))
            .map(|_| ())
    }

    /// Deliver [`NotificationPayload::Test`], whatever the preference says.
    pub async fn send_test(&self) -> Result<NotificationPayload, NotifyError> {
        let payload = NotificationPayload::Test;
        self.notifier.notify(&payload).await?;
        info!("Test notification delivered");
        Ok(payload)
    }

    /// Announce `updates`. Returns the payload that was delivered, if any.
    pub async fn notify_updates(&self, updates: &[UpdateResult]) -> Option<NotificationPayload> {
        let payload = summarize(updates)?;
        if !self.enabled() {
            debug!("Notifications disabled, not announcing {} updates", updates.len());
            return None;
        }

        match self.notifier.notify(&payload).await {
            Ok(()) => Some(payload),
            Err(e) => {
                warn!("Failed to deliver notification: {}", e);
                None
            }
        }
    }
}
