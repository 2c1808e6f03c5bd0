pub mod config;
pub mod notify;
pub mod reconcile;
pub mod settings;
pub mod show;
pub mod source;
pub mod testing;
pub mod title;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, DatabaseConfig,
    SanitizedConfig, ServerConfig,
};
pub use notify::{
    summarize, LogNotifier, NotificationConfig, NotificationPayload, NotificationService,
    Notifier, NotifyError,
};
pub use reconcile::{
    run_check, AcceptancePolicy, BatchOutcome, BatchReport, CheckerConfig, ReconcileEngine,
    ReconcileError, UpdateResult, UpdateScheduler,
};
pub use settings::{
    SettingsService, SettingsUpdate, UserSettings, AUTO_REFRESH_SETTING, CHECK_INTERVAL_SETTING,
    MAX_CHECK_INTERVAL, MIN_CHECK_INTERVAL, NOTIFICATIONS_SETTING,
};
pub use show::{
    CategoryStore, CreateShowRequest, EpisodeRecord, SettingsStore, ShowError, ShowStatus,
    ShowStore, SqliteShowStore, TrackedShow,
};
pub use source::{
    HttpPageFetcher, PageFetcher, SearchHit, ShowDetails, SourceAdapter, SourceConfig,
    SourceError, TurkAnimeSource,
};
pub use title::{TitleNormalizer, TitleStrategy};
