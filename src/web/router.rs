//! Router configuration for the web API.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::{
    check_expired, create_key, create_upload, delete_file, finalize_upload, list_files,
    list_keys, login, logout, me, rename_file, revoke_keys,
};
use super::middleware::{create_cors_layer, with_security_headers};
use super::state::AppState;

/// Room for multipart boundaries and form fields on top of the payload.
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Largest accepted request body for the configured upload limit.
pub fn body_limit(max_upload_bytes: u64) -> usize {
    usize::try_from(max_upload_bytes)
        .unwrap_or(usize::MAX)
        .saturating_add(FORM_OVERHEAD_BYTES)
}

/// Create the main API router.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let auth_routes = Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me));

    let api_routes = Router::new()
        .route("/upload", post(create_upload))
        .route("/upload/*id", put(finalize_upload))
        .route("/files", get(list_files).delete(delete_file))
        .route("/files/rename", post(rename_file))
        .route("/keys", get(list_keys).post(create_key).delete(revoke_keys))
        .route("/check-expired", get(check_expired))
        .nest("/auth", auth_routes);

    let cors_origins = app_state.config.web.cors_origins.clone();
    let limit = body_limit(app_state.config.upload.max_bytes);

    let router = Router::new()
        .merge(create_health_router())
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(limit));

    with_security_headers(router)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(&cors_origins)),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}
