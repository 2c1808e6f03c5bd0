use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kanshi_core::{
    load_config, validate_config, CategoryStore, LogNotifier, NotificationService,
    ReconcileEngine, SettingsService, ShowStore, SourceAdapter, SqliteShowStore, TurkAnimeSource,
    UpdateScheduler, UserSettings,
};

use kanshi_server::api::create_router;
use kanshi_server::state::AppState;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("KANSHI_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Database path: {:?}", config.database.path);
    info!("Source: {}", config.source.base_url);

    // Create SQLite store (shows, episodes, categories, settings)
    let store = Arc::new(
        SqliteShowStore::new(&config.database.path).context("Failed to create show store")?,
    );
    let shows: Arc<dyn ShowStore> = store.clone();
    let categories: Arc<dyn CategoryStore> = store.clone();
    info!("Show store initialized");

    // Create source adapter
    let source: Arc<dyn SourceAdapter> =
        Arc::new(TurkAnimeSource::from_config(config.source.clone()));
    info!("Using source: {}", source.name());

    let engine = Arc::new(ReconcileEngine::new(
        config.checker.clone(),
        Arc::clone(&shows),
        Arc::clone(&source),
    ));

    // Saved settings win over the config defaults
    let settings = Arc::new(SettingsService::new(
        UserSettings::from_config(&config.checker, &config.notifications),
        store.clone(),
    ));
    let current = settings.current();
    info!(
        "Checking every {} minutes (auto refresh {}, notifications {})",
        current.check_interval,
        if current.auto_refresh { "on" } else { "off" },
        if current.notifications { "on" } else { "off" },
    );

    let notifications = Arc::new(NotificationService::new(
        Arc::clone(&settings),
        Arc::new(LogNotifier),
    ));

    // Seed the category list on first start
    spawn_category_seed(Arc::clone(&categories), Arc::clone(&source));

    // Start periodic update checks
    let scheduler = UpdateScheduler::new(
        Arc::clone(&engine),
        Arc::clone(&notifications),
        Arc::clone(&settings),
    );
    scheduler.start();

    // Create app state
    let state = Arc::new(AppState::new(
        config.clone(),
        shows,
        categories,
        Arc::clone(&source),
        engine,
        notifications,
        settings,
    ));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");
    scheduler.stop();
    source.close_session().await;
    info!("Source session closed");

    Ok(())
}

/// Fetch categories in the background when none are stored yet.
fn spawn_category_seed(categories: Arc<dyn CategoryStore>, source: Arc<dyn SourceAdapter>) {
    match categories.categories() {
        Ok(existing) if !existing.is_empty() => {
            info!("Loaded {} stored categories", existing.len());
        }
        Ok(_) => {
            tokio::spawn(async move {
                let fetched = source.fetch_categories().await;
                match categories.replace_categories(&fetched) {
                    Ok(()) => info!("Stored {} categories", fetched.len()),
                    Err(e) => warn!("Failed to store categories: {}", e),
                }
            });
        }
        Err(e) => warn!("Failed to read stored categories: {}", e),
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
