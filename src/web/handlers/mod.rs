//! API handlers.

pub mod auth;
pub mod cron;
pub mod files;
pub mod keys;
pub mod upload;

pub use auth::{login, logout, me};
pub use cron::check_expired;
pub use files::{delete_file, list_files, rename_file};
pub use keys::{create_key, list_keys, revoke_keys};
pub use upload::{create_upload, finalize_upload};
