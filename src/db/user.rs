//! User model for hoard.

/// A registered user.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    /// Unique user ID.
    pub id: i64,
    /// Login name (unique, case-insensitive).
    pub username: String,
    /// Argon2 password hash.
    pub password: String,
    /// Admins may set expirations beyond the default cap.
    pub admin: bool,
    /// Creation timestamp (SQLite datetime).
    pub created_at: String,
}

/// Data for creating a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Login name.
    pub username: String,
    /// Argon2 password hash (already hashed).
    pub password: String,
    /// Admin flag.
    pub admin: bool,
}

impl NewUser {
    /// Create a regular user from a username and a password hash.
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password_hash.into(),
            admin: false,
        }
    }

    /// Grant admin privileges.
    pub fn with_admin(mut self, admin: bool) -> Self {
        self.admin = admin;
        self
    }
}
