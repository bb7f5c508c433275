//! Authentication handlers.

use axum::{extract::State, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::sync::Arc;

use crate::auth;
use crate::web::dto::{LoginRequest, LoginResponse, SuccessResponse, UserInfo, ValidatedJson};
use crate::web::error::ApiError;
use crate::web::middleware::{AuthUser, SESSION_COOKIE};
use crate::web::state::AppState;

/// Build the browser session cookie.
pub(crate) fn session_cookie(token: String, days: i64, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(time::Duration::days(days))
        .build()
}

/// Expire the browser session cookie.
///
/// Sent even when the request authenticated with a bearer token only.
pub(crate) fn clear_session_cookie(jar: CookieJar) -> CookieJar {
    jar.add(
        Cookie::build((SESSION_COOKIE, ""))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .max_age(time::Duration::ZERO)
            .build(),
    )
}

/// POST /api/auth/login - Open a session.
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), ApiError> {
    let days = state.session_days();
    let opened = auth::login(state.db.pool(), &req.username, &req.password, days).await?;

    let cookie = session_cookie(
        opened.session.id.clone(),
        days,
        state.config.web.cookie_secure,
    );

    Ok((
        jar.add(cookie),
        Json(LoginResponse {
            token: opened.session.id,
            expires_at: opened.session.expires_at,
            user: UserInfo::from(&opened.user),
        }),
    ))
}

/// POST /api/auth/logout - End the current session.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    auth_user: AuthUser,
    jar: CookieJar,
) -> Result<(CookieJar, Json<SuccessResponse>), ApiError> {
    auth::logout(state.db.pool(), &auth_user.session.id).await?;
    tracing::info!(user_id = auth_user.user.id, "User logged out");
    Ok((clear_session_cookie(jar), Json(SuccessResponse::ok())))
}

/// GET /api/auth/me - The authenticated user.
pub async fn me(auth_user: AuthUser) -> Json<UserInfo> {
    Json(UserInfo::from(&auth_user.user))
}
