//! Authentication module for hoard.
//!
//! This module provides password hashing, database-backed sessions
//! and the first-run admin bootstrap.

mod bootstrap;
mod password;
mod session;

pub use bootstrap::{ensure_admin, ensure_admin_from_env, ADMIN_PASSWORD_ENV, ADMIN_USERNAME_ENV};
pub use password::{hash_password, verify_password, PasswordError, MIN_PASSWORD_CHARS};
pub use session::{
    authenticate, create_session, generate_token, login, logout, logout_all, now_secs,
    AuthSession, SESSION_TOKEN_LENGTH,
};
