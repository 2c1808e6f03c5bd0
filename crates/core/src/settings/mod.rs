//! User preferences.
//!
//! The process config supplies defaults. Values saved through
//! [`SettingsService::update`] are persisted in the settings table and win
//! over the config from then on, including after a restart.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::notify::NotificationConfig;
use crate::reconcile::CheckerConfig;
use crate::show::{SettingsStore, ShowError};

/// Minutes between periodic checks.
pub const CHECK_INTERVAL_SETTING: &str = "check_interval";
/// Whether new-episode notifications are sent.
pub const NOTIFICATIONS_SETTING: &str = "notifications";
/// Whether periodic checks run at all.
pub const AUTO_REFRESH_SETTING: &str = "auto_refresh";

pub const MIN_CHECK_INTERVAL: u64 = 1;
pub const MAX_CHECK_INTERVAL: u64 = 1440;

/// Effective preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSettings {
    /// Minutes between periodic checks, 1..=1440.
    pub check_interval: u64,
    pub notifications: bool,
    pub auto_refresh: bool,
}

impl UserSettings {
    pub fn from_config(checker: &CheckerConfig, notifications: &NotificationConfig) -> Self {
        Self {
            check_interval: clamp_interval(checker.interval_minutes as i64),
            notifications: notifications.enabled,
            auto_refresh: checker.enabled,
        }
    }

    pub fn check_interval_duration(&self) -> Duration {
        Duration::from_secs(self.check_interval * 60)
    }
}

/// Partial update. Absent fields keep their current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsUpdate {
    /// Out-of-range values are clamped into 1..=1440.
    pub check_interval: Option<i64>,
    pub notifications: Option<bool>,
    pub auto_refresh: Option<bool>,
}

impl SettingsUpdate {
    pub fn notifications(enabled: bool) -> Self {
        Self {
            notifications: Some(enabled),
            ..Default::default()
        }
    }
}

fn clamp_interval(minutes: i64) -> u64 {
    minutes.clamp(MIN_CHECK_INTERVAL as i64, MAX_CHECK_INTERVAL as i64) as u64
}

/// Reads and writes [`UserSettings`] and tells subscribers when they change.
pub struct SettingsService {
    defaults: UserSettings,
    store: Arc<dyn SettingsStore>,
    changes: watch::Sender<UserSettings>,
}

impl SettingsService {
    pub fn new(defaults: UserSettings, store: Arc<dyn SettingsStore>) -> Self {
        let defaults = UserSettings {
            check_interval: clamp_interval(defaults.check_interval as i64),
            ..defaults
        };
        let (changes, _) = watch::channel(defaults);
        let service = Self {
            defaults,
            store,
            changes,
        };
        service.changes.send_replace(service.current());
        service
    }

    pub fn defaults(&self) -> UserSettings {
        self.defaults
    }

    /// Stored values layered over the defaults.
    pub fn current(&self) -> UserSettings {
        UserSettings {
            check_interval: self
                .read::<i64>(CHECK_INTERVAL_SETTING)
                .map(clamp_interval)
                .unwrap_or(self.defaults.check_interval),
            notifications: self
                .read(NOTIFICATIONS_SETTING)
                .unwrap_or(self.defaults.notifications),
            auto_refresh: self
                .read(AUTO_REFRESH_SETTING)
                .unwrap_or(self.defaults.auto_refresh),
        }
    }

    pub fn check_interval(&self) -> Duration {
        self.current().check_interval_duration()
    }

    pub fn notifications_enabled(&self) -> bool {
        self.current().notifications
    }

    pub fn auto_refresh(&self) -> bool {
        self.current().auto_refresh
    }

    /// Persist the fields present in `update` and return the new effective settings.
    pub fn update(&self, update: &SettingsUpdate) -> Result<UserSettings, ShowError> {
        if let Some(minutes) = update.check_interval {
            self.store
                .set_setting(CHECK_INTERVAL_SETTING, &clamp_interval(minutes).to_string())?;
        }
        if let Some(enabled) = update.notifications {
            self.store
                .set_setting(NOTIFICATIONS_SETTING, &enabled.to_string())?;
        }
        if let Some(enabled) = update.auto_refresh {
            self.store
                .set_setting(AUTO_REFRESH_SETTING, &enabled.to_string())?;
        }

        let current = self.current();
        info!(
            check_interval = current.check_interval,
            notifications = current.notifications,
            auto_refresh = current.auto_refresh,
            "Settings updated"
        );
        self.changes.send_replace(current);
        Ok(current)
    }

    /// Receiver that is marked changed after every [`update`](Self::update).
    pub fn subscribe(&self) -> watch::Receiver<UserSettings> {
        self.changes.subscribe()
    }

    fn read<T: FromStr>(&self, key: &str) -> Option<T> {
        match self.store.get_setting(key) {
            Ok(Some(raw)) => match raw.trim().parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!("Ignoring malformed {} setting: {}", key, raw);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!("Failed to read {} setting: {}", key, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::show::SqliteShowStore;

    fn service(defaults: UserSettings) -> (Arc<SqliteShowStore>, SettingsService) {
        let store = Arc::new(SqliteShowStore::in_memory().unwrap());
        let service = SettingsService::new(defaults, store.clone());
        (store, service)
    }

    fn defaults() -> UserSettings {
        UserSettings::from_config(&CheckerConfig::default(), &NotificationConfig::default())
    }

    #[test]
    fn test_defaults_from_config() {
        let settings = defaults();
        assert_eq!(settings.check_interval, 30);
        assert!(settings.notifications);
        assert!(settings.auto_refresh);
        assert_eq!(settings.check_interval_duration(), Duration::from_secs(1800));

        let settings = UserSettings::from_config(
            &CheckerConfig {
                enabled: false,
                interval_minutes: 5000,
                ..CheckerConfig::default()
            },
            &NotificationConfig { enabled: false },
        );
        assert_eq!(settings.check_interval, MAX_CHECK_INTERVAL);
        assert!(!settings.notifications);
        assert!(!settings.auto_refresh);
    }

    #[test]
    fn test_current_without_overrides() {
        let (_store, service) = service(defaults());
        assert_eq!(service.current(), defaults());
    }

    #[test]
    fn test_update_persists_fields() {
        let (store, service) = service(defaults());

        let updated = service
            .update(&SettingsUpdate {
                check_interval: Some(15),
                notifications: Some(false),
                auto_refresh: None,
            })
            .unwrap();

        assert_eq!(updated.check_interval, 15);
        assert!(!updated.notifications);
        assert!(updated.auto_refresh);
        assert_eq!(
            store.get_setting(CHECK_INTERVAL_SETTING).unwrap().as_deref(),
            Some("15")
        );
        assert_eq!(store.get_setting(AUTO_REFRESH_SETTING).unwrap(), None);

        // A fresh service over the same store sees the saved values.
        let reloaded = SettingsService::new(defaults(), store.clone());
        assert_eq!(reloaded.current(), updated);
    }

    #[test]
    fn test_update_clamps_interval() {
        let (_store, service) = service(defaults());

        let updated = service
            .update(&SettingsUpdate {
                check_interval: Some(0),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(updated.check_interval, MIN_CHECK_INTERVAL);

        let updated = service
            .update(&SettingsUpdate {
                check_interval: Some(-20),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(updated.check_interval, MIN_CHECK_INTERVAL);

        let updated = service
            .update(&SettingsUpdate {
                check_interval: Some(10_000),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(updated.check_interval, MAX_CHECK_INTERVAL);
    }

    #[test]
    fn test_malformed_values_use_defaults() {
        let (store, service) = service(defaults());
        store.set_setting(CHECK_INTERVAL_SETTING, "soon").unwrap();
        store.set_setting(NOTIFICATIONS_SETTING, "maybe").unwrap();
        store.set_setting(AUTO_REFRESH_SETTING, "").unwrap();

        assert_eq!(service.current(), defaults());
    }

    #[test]
    fn test_stored_interval_is_clamped() {
        let (store, service) = service(defaults());
        store.set_setting(CHECK_INTERVAL_SETTING, "99999").unwrap();
        assert_eq!(service.current().check_interval, MAX_CHECK_INTERVAL);
    }

    #[tokio::test]
    async fn test_subscribers_see_updates() {
        let (_store, service) = service(defaults());
        let mut rx = service.subscribe();
        assert!(!rx.has_changed().unwrap());

        service.update(&SettingsUpdate::notifications(false)).unwrap();

        rx.changed().await.unwrap();
        assert!(!rx.borrow_and_update().notifications);
    }
}
