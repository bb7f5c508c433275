//! Scheduled maintenance endpoint.

use axum::{extract::State, http::HeaderMap, Json};
use std::sync::Arc;

use crate::upload::now_ms;
use crate::web::dto::SweepResponse;
use crate::web::error::ApiError;
use crate::web::middleware::cron_authorized;
use crate::web::state::AppState;

/// GET /api/check-expired - Delete expired uploads and sessions.
///
/// Requires `Authorization: Bearer <cron secret>`.
pub async fn check_expired(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<SweepResponse>, ApiError> {
    if !cron_authorized(&headers, &state.config.auth.cron_secret) {
        tracing::warn!("Rejected expiry sweep request");
        return Err(ApiError::unauthorized("Unauthorized"));
    }

    let report = state.uploads().sweep(now_ms()).await?;
    Ok(Json(report.into()))
}
