//! Session authentication for the web API.
//!
//! A request is authenticated by a session token sent either as
//! `Authorization: Bearer <token>` (API keys, scripts) or in the
//! `auth_session` cookie (browsers).

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;
use subtle::ConstantTimeEq;

use crate::auth::{authenticate, AuthSession};
use crate::db::{Session, User};
use crate::web::error::ApiError;
use crate::web::state::AppState;

/// Name of the browser session cookie.
pub const SESSION_COOKIE: &str = "auth_session";

/// Extract the token from an `Authorization: Bearer` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Candidate session tokens in the order they are tried.
fn session_tokens(headers: &HeaderMap) -> Vec<String> {
    let mut tokens = Vec::with_capacity(2);
    if let Some(token) = bearer_token(headers) {
        tokens.push(token.to_string());
    }
    if let Some(cookie) = CookieJar::from_headers(headers).get(SESSION_COOKIE) {
        if !cookie.value().is_empty() {
            tokens.push(cookie.value().to_string());
        }
    }
    tokens
}

/// Extractor for authenticated users.
///
/// Rejects the request with 401 when no live session matches.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The authenticated user.
    pub user: User,
    /// The session the request was made with.
    pub session: Session,
}

impl From<AuthSession> for AuthUser {
    fn from(auth: AuthSession) -> Self {
        Self {
            user: auth.user,
            session: auth.session,
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    Arc<AppState>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = Arc::<AppState>::from_ref(state);

        let tokens = session_tokens(&parts.headers);
        if tokens.is_empty() {
            return Err(ApiError::unauthorized("Missing authorization"));
        }

        for token in &tokens {
            if let Some(auth) = authenticate(state.db.pool(), token).await? {
                return Ok(auth.into());
            }
        }

        tracing::debug!("Rejected request with unknown or expired session");
        Err(ApiError::unauthorized("Invalid or expired session"))
    }
}

/// Check a `Bearer` header against the cron secret.
///
/// An empty secret never matches.
pub fn cron_authorized(headers: &HeaderMap, secret: &str) -> bool {
    if secret.is_empty() {
        return false;
    }
    match bearer_token(headers) {
        Some(token) => token.as_bytes().ct_eq(secret.as_bytes()).into(),
        None => false,
    }
}
