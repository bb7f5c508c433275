//! Uploads for hoard.
//!
//! This module provides:
//! - Upload rows and their repository
//! - Storage key derivation
//! - File list paging and ordering
//! - The upload service (create, finalize, rename, delete, sweep)

pub mod key;
mod listing;
mod model;
mod repository;
mod service;

pub use listing::{
    clamp_page, last_page, like_pattern, FileOrder, ListQuery, SortColumn, SortDirection,
    PAGE_SIZE,
};
pub use model::{NewUpload, Upload};
pub use repository::UploadRepository;
pub use service::{
    now_ms, CreateUpload, FilePage, RenameUpload, ReserveUpload, SweepReport, UploadFile,
    UploadService, MAX_EXPIRE_INPUT_MS, MAX_LABEL_CHARS, MAX_RENAME_LABEL_CHARS,
};
