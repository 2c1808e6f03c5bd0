use std::sync::Arc;

use kanshi_core::{
    CategoryStore, Config, NotificationService, ReconcileEngine, SanitizedConfig, SettingsService,
    ShowStore, SourceAdapter,
};

/// Shared application state
pub struct AppState {
    config: Config,
    shows: Arc<dyn ShowStore>,
    categories: Arc<dyn CategoryStore>,
    source: Arc<dyn SourceAdapter>,
    engine: Arc<ReconcileEngine>,
    notifications: Arc<NotificationService>,
    settings: Arc<SettingsService>,
}

impl AppState {
    pub fn new(
        config: Config,
        shows: Arc<dyn ShowStore>,
        categories: Arc<dyn CategoryStore>,
        source: Arc<dyn SourceAdapter>,
        engine: Arc<ReconcileEngine>,
        notifications: Arc<NotificationService>,
        settings: Arc<SettingsService>,
    ) -> Self {
        Self {
            config,
            shows,
            categories,
            source,
            engine,
            notifications,
            settings,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn shows(&self) -> &dyn ShowStore {
        self.shows.as_ref()
    }

    pub fn categories(&self) -> &dyn CategoryStore {
        self.categories.as_ref()
    }

    pub fn source(&self) -> &dyn SourceAdapter {
        self.source.as_ref()
    }

    pub fn engine(&self) -> &ReconcileEngine {
        self.engine.as_ref()
    }

    pub fn notifications(&self) -> &NotificationService {
        self.notifications.as_ref()
    }

    pub fn settings(&self) -> &SettingsService {
        self.settings.as_ref()
    }
}
