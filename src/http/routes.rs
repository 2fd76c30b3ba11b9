use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Catalog and state
        .route("/catalog", get(handlers::get_catalog))
        .route("/state", get(handlers::get_state))
        // Session editing
        .route("/session/reset", post(handlers::reset_session))
        .route("/session/:field", put(handlers::set_field))
        .route("/instructions", put(handlers::set_instructions))
        .route("/credential", put(handlers::set_credential))
        // Presets
        .route(
            "/presets",
            get(handlers::list_presets).post(handlers::save_preset),
        )
        .route("/presets/import", post(handlers::import_preset))
        .route(
            "/presets/:preset_id",
            put(handlers::overwrite_preset).delete(handlers::remove_preset),
        )
        .route("/presets/:preset_id/apply", post(handlers::apply_preset))
        .route("/presets/:preset_id/export", get(handlers::export_preset))
        // Realtime hand-off
        .route("/connection", get(handlers::get_connection))
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
