//! API key handlers.
//!
//! An API key is a session created on demand; it authenticates with
//! `Authorization: Bearer <token>`.

use axum::{extract::State, Json};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

use super::auth::clear_session_cookie;
use crate::auth::{create_session, logout_all};
use crate::db::SessionRepository;
use crate::web::dto::{
    CreateKeyRequest, CreatedKey, KeyItem, KeysResponse, RevokedKeys, ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::middleware::AuthUser;
use crate::web::state::AppState;

/// GET /api/keys - The caller's sessions, soonest expiry first.
pub async fn list_keys(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<KeysResponse>, ApiError> {
    let sessions = SessionRepository::new(state.db.pool())
        .list_by_user(auth.user.id)
        .await?;

    let keys = sessions
        .iter()
        .map(|session| KeyItem::new(session, &auth.session.id))
        .collect();

    Ok(Json(KeysResponse { keys }))
}

/// POST /api/keys - Create an API key.
pub async fn create_key(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<CreateKeyRequest>,
) -> Result<Json<CreatedKey>, ApiError> {
    let session = create_session(state.db.pool(), auth.user.id, req.days).await?;
    tracing::info!(user_id = auth.user.id, days = req.days, "API key created");

    Ok(Json(CreatedKey {
        token: session.id,
        expires_at: session.expires_at,
    }))
}

/// DELETE /api/keys - Revoke every session of the caller.
pub async fn revoke_keys(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    jar: CookieJar,
) -> Result<(CookieJar, Json<RevokedKeys>), ApiError> {
    let revoked = logout_all(state.db.pool(), auth.user.id).await?;

    Ok((
        clear_session_cookie(jar),
        Json(RevokedKeys {
            success: true,
            revoked,
        }),
    ))
}
