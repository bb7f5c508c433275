//! Session storage for hoard.
//!
//! A session row is both a browser login and an API key: the row id is
//! the bearer token.

use sqlx::SqlitePool;

use crate::Result;

/// A login session or API key.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Session {
    /// Session token.
    pub id: String,
    /// Owning user.
    pub user_id: i64,
    /// Expiry in unix seconds.
    pub expires_at: i64,
}

impl Session {
    /// Whether the session has expired at `now` (unix seconds).
    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at <= now
    }
}

/// Repository for session operations.
pub struct SessionRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> SessionRepository<'a> {
    /// Create a new SessionRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Store a session with the given token.
    pub async fn create(&self, id: &str, user_id: i64, expires_at: i64) -> Result<Session> {
        sqlx::query("INSERT INTO sessions (id, user_id, expires_at) VALUES (?, ?, ?)")
            .bind(id)
            .bind(user_id)
            .bind(expires_at)
            .execute(self.pool)
            .await?;

        Ok(Session {
            id: id.to_string(),
            user_id,
            expires_at,
        })
    }

    /// Look up a session that has not yet expired.
    pub async fn get_valid(&self, id: &str, now: i64) -> Result<Option<Session>> {
        let session = sqlx::query_as::<_, Session>(
            "SELECT id, user_id, expires_at FROM sessions WHERE id = ? AND expires_at > ?",
        )
        .bind(id)
        .bind(now)
        .fetch_optional(self.pool)
        .await?;

        Ok(session)
    }

    /// List a user's sessions, soonest expiry first.
    pub async fn list_by_user(&self, user_id: i64) -> Result<Vec<Session>> {
        let sessions = sqlx::query_as::<_, Session>(
            "SELECT id, user_id, expires_at FROM sessions
             WHERE user_id = ? ORDER BY expires_at ASC",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(sessions)
    }

    /// Delete a single session. Returns true if a row was removed.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every session belonging to a user.
    pub async fn delete_by_user(&self, user_id: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE user_id = ?")
            .bind(user_id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Delete sessions expired at `now` (unix seconds).
    pub async fn delete_expired(&self, now: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(now)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
