use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::{categories, checks, handlers, search, settings, shows};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Shows
        .route("/shows", get(shows::list_shows).post(shows::create_show))
        .route("/shows/{id}", get(shows::get_show).delete(shows::delete_show))
        .route("/shows/{id}/episode", put(shows::update_episode))
        .route("/shows/{id}/status", put(shows::update_status))
        .route("/shows/{id}/new-episode", delete(shows::clear_new_episode))
        .route("/shows/{id}/episodes", get(shows::list_episodes))
        .route(
            "/shows/{id}/episodes/{episode}/watched",
            post(shows::mark_watched),
        )
        // Update checks
        .route("/shows/{id}/check", post(checks::check_show))
        .route("/checks", post(checks::check_all))
        // Source
        .route("/search", get(search::search))
        .route("/categories", get(categories::list_categories))
        .route("/categories/refresh", post(categories::refresh_categories))
        // Settings
        .route(
            "/settings",
            get(settings::get_settings).put(settings::update_settings),
        )
        .route(
            "/settings/notifications",
            get(settings::get_notifications).put(settings::set_notifications),
        )
        .route("/notifications/test", post(settings::send_test_notification))
        .with_state(state);

    Router::new().nest("/api/v1", api_routes).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    )
}
