//! First-run admin account.

use sqlx::SqlitePool;
use tracing::{info, warn};

use super::password::hash_password;
use crate::db::{NewUser, User, UserRepository};
use crate::{HoardError, Result};

/// Environment variable holding the bootstrap admin name.
pub const ADMIN_USERNAME_ENV: &str = "HOARD_ADMIN_USERNAME";

/// Environment variable holding the bootstrap admin password.
pub const ADMIN_PASSWORD_ENV: &str = "HOARD_ADMIN_PASSWORD";

/// Create an admin account if no users exist yet.
///
/// Returns the created user, or `None` when users already exist.
pub async fn ensure_admin(pool: &SqlitePool, username: &str, password: &str) -> Result<Option<User>> {
    let repo = UserRepository::new(pool);
    if repo.count().await? > 0 {
        return Ok(None);
    }

    let hash = hash_password(password).map_err(|e| HoardError::Validation(e.to_string()))?;
    let user = repo
        .create(&NewUser::new(username, hash).with_admin(true))
        .await?;

    info!(user_id = user.id, username = %user.username, "Created admin account");
    Ok(Some(user))
}

/// Create the first admin from `HOARD_ADMIN_USERNAME` / `HOARD_ADMIN_PASSWORD`.
pub async fn ensure_admin_from_env(pool: &SqlitePool) -> Result<Option<User>> {
    let username = std::env::var(ADMIN_USERNAME_ENV).ok().filter(|v| !v.is_empty());
    let password = std::env::var(ADMIN_PASSWORD_ENV).ok().filter(|v| !v.is_empty());

    match (username, password) {
        (Some(username), Some(password)) => ensure_admin(pool, &username, &password).await,
        _ => {
            if UserRepository::new(pool).count().await? == 0 {
                warn!(
                    "No users exist. Set {} and {} to create an admin account.",
                    ADMIN_USERNAME_ENV, ADMIN_PASSWORD_ENV
                );
            }
            Ok(None)
        }
    }
}
