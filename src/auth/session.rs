//! Session tokens, login and logout for hoard.
//!
//! Sessions are stored in the database. A browser login and an API key
//! are the same thing: a random token with an expiry.

use chrono::Utc;
use rand::distr::Alphanumeric;
use rand::Rng;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use super::password::verify_password;
use crate::db::{Session, SessionRepository, User, UserRepository};
use crate::{HoardError, Result};

/// Length of a session token.
pub const SESSION_TOKEN_LENGTH: usize = 40;

/// Seconds per day.
const DAY_SECS: i64 = 24 * 60 * 60;

/// Generate a random alphanumeric session token.
pub fn generate_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(SESSION_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Current time in unix seconds.
pub fn now_secs() -> i64 {
    Utc::now().timestamp()
}

/// A validated session together with its user.
#[derive(Debug, Clone)]
pub struct AuthSession {
    /// The session row.
    pub session: Session,
    /// The owning user.
    pub user: User,
}

/// Create a session for `user_id` lasting `days`.
pub async fn create_session(pool: &SqlitePool, user_id: i64, days: i64) -> Result<Session> {
    let token = generate_token();
    let expires_at = now_secs() + days * DAY_SECS;
    let session = SessionRepository::new(pool)
        .create(&token, user_id, expires_at)
        .await?;
    debug!(user_id, expires_at, "Session created");
    Ok(session)
}

/// Check credentials and open a session.
///
/// Unknown users and wrong passwords produce the same error.
pub async fn login(
    pool: &SqlitePool,
    username: &str,
    password: &str,
    days: i64,
) -> Result<AuthSession> {
    let user = UserRepository::new(pool).get_by_username(username).await?;

    let user = match user {
        Some(user) if verify_password(password, &user.password) => user,
        _ => {
            warn!(username = %username, "Login failed");
            return Err(HoardError::Auth("invalid username or password".to_string()));
        }
    };

    let session = create_session(pool, user.id, days).await?;
    info!(user_id = user.id, username = %user.username, "User logged in");
    Ok(AuthSession { session, user })
}

/// Resolve a token to a live session and its user.
pub async fn authenticate(pool: &SqlitePool, token: &str) -> Result<Option<AuthSession>> {
    let Some(session) = SessionRepository::new(pool)
        .get_valid(token, now_secs())
        .await?
    else {
        return Ok(None);
    };

    let Some(user) = UserRepository::new(pool).get_by_id(session.user_id).await? else {
        return Ok(None);
    };

    Ok(Some(AuthSession { session, user }))
}

/// End a single session.
pub async fn logout(pool: &SqlitePool, token: &str) -> Result<bool> {
    let removed = SessionRepository::new(pool).delete(token).await?;
    if removed {
        debug!("Session ended");
    }
    Ok(removed)
}

/// End every session of a user.
pub async fn logout_all(pool: &SqlitePool, user_id: i64) -> Result<u64> {
    let count = SessionRepository::new(pool).delete_by_user(user_id).await?;
    info!(user_id, count, "All sessions revoked");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::hash_password;
    use crate::db::NewUser;
    use crate::Database;

    async fn setup() -> (Database, User) {
        let db = Database::open_in_memory().await.unwrap();
        let hash = hash_password("password123").unwrap();
        let user = UserRepository::new(db.pool())
            .create(&NewUser::new("alice", hash))
            .await
            .unwrap();
        (db, user)
    }

    #[test]
    fn test_generate_token() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), SESSION_TOKEN_LENGTH);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_login_success() {
        let (db, user) = setup().await;

        let auth = login(db.pool(), "ALICE", "password123", 30).await.unwrap();
        assert_eq!(auth.user.id, user.id);
        assert!(auth.session.expires_at > now_secs() + 29 * DAY_SECS);
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let (db, _) = setup().await;

        let result = login(db.pool(), "alice", "wrong-password", 30).await;
        assert!(matches!(result, Err(HoardError::Auth(_))));
    }

    #[tokio::test]
    async fn test_login_unknown_user() {
        let (db, _) = setup().await;

        let result = login(db.pool(), "bob", "password123", 30).await;
        assert!(matches!(result, Err(HoardError::Auth(_))));
    }

    #[tokio::test]
    async fn test_authenticate_and_logout() {
        let (db, user) = setup().await;
        let session = create_session(db.pool(), user.id, 1).await.unwrap();

        let auth = authenticate(db.pool(), &session.id).await.unwrap().unwrap();
        assert_eq!(auth.user.username, "alice");

        assert!(logout(db.pool(), &session.id).await.unwrap());
        assert!(authenticate(db.pool(), &session.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_authenticate_expired() {
        let (db, user) = setup().await;
        SessionRepository::new(db.pool())
            .create("stale", user.id, now_secs() - 1)
            .await
            .unwrap();

        assert!(authenticate(db.pool(), "stale").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_logout_all() {
        let (db, user) = setup().await;
        create_session(db.pool(), user.id, 1).await.unwrap();
        create_session(db.pool(), user.id, 2).await.unwrap();

        assert_eq!(logout_all(db.pool(), user.id).await.unwrap(), 2);
    }
}
