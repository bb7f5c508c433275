//! User repository for hoard.

use sqlx::SqlitePool;

use super::user::{NewUser, User};
use crate::{HoardError, Result};

/// Repository for user CRUD operations.
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Create a new UserRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new user in the database.
    ///
    /// Returns the created user with the assigned ID.
    pub async fn create(&self, new_user: &NewUser) -> Result<User> {
        if self.username_exists(&new_user.username).await? {
            return Err(HoardError::Conflict(format!(
                "username '{}' is taken",
                new_user.username
            )));
        }

        let result = sqlx::query("INSERT INTO users (username, password, admin) VALUES (?, ?, ?)")
            .bind(&new_user.username)
            .bind(&new_user.password)
            .bind(new_user.admin)
            .execute(self.pool)
            .await?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| HoardError::NotFound("user".to_string()))
    }

    /// Get a user by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password, admin, created_at FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Get a user by username (case-insensitive).
    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password, admin, created_at
             FROM users WHERE username = ? COLLATE NOCASE",
        )
        .bind(username)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Check if a username is already taken (case-insensitive).
    pub async fn username_exists(&self, username: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username = ? COLLATE NOCASE)",
        )
        .bind(username)
        .fetch_one(self.pool)
        .await?;

        Ok(exists)
    }

    /// Count all users.
    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
