//! hoard - self-hosted file sharing.
//!
//! Uploads are stored in an S3-compatible bucket, image and video
//! metadata is stripped before storage, and expired uploads are swept
//! on a schedule.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod exif;
pub mod logging;
pub mod storage;
pub mod upload;
pub mod web;

pub use auth::{
    authenticate, ensure_admin, ensure_admin_from_env, hash_password, login, logout, logout_all,
    verify_password, AuthSession, PasswordError,
};
pub use config::Config;
pub use db::{Database, NewUser, Session, SessionRepository, User, UserRepository};
pub use error::{HoardError, Result};
pub use exif::{ExifError, MetadataStripper};
pub use storage::{build_store, MemoryStore, ObjectStore, S3Store, SharedStore, StorageError};
pub use upload::{Upload, UploadRepository, UploadService};
pub use web::{AppState, WebServer};
