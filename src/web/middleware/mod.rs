//! Middleware for the web API.

pub mod auth;
pub mod cors;
pub mod security;

pub use auth::{bearer_token, cron_authorized, AuthUser, SESSION_COOKIE};
pub use cors::create_cors_layer;
pub use security::{with_security_headers, SECURITY_HEADERS};
