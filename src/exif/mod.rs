//! Metadata stripping for image and video uploads.
//!
//! Payloads are written to a temporary file, rewritten in place by an
//! external tool and read back. Only one tool invocation runs at a time
//! process-wide; see [`MetadataStripper`].

mod stripper;
mod tool;

pub use stripper::{ExifJob, MetadataStripper};
pub use tool::{ExifTool, MetadataTool, EXIFTOOL_ARGS};

use std::time::Duration;

use thiserror::Error;

/// Content types routed through the stripper.
pub const EXIF_CONTENT_TYPES: &[&str] = &[
    "image/jpeg",
    "image/tiff",
    "image/heic",
    "image/heif",
    "image/webp",
    "image/png",
    "video/quicktime",
    "video/mp4",
    "video/x-msvideo",
    "video/x-matroska",
];

/// Whether a payload of `content_type` carries metadata worth stripping.
pub fn needs_stripping(content_type: &str) -> bool {
    EXIF_CONTENT_TYPES
        .iter()
        .any(|t| t.eq_ignore_ascii_case(content_type.trim()))
}

/// Metadata stripping errors.
#[derive(Error, Debug)]
pub enum ExifError {
    /// Writing or reading the temporary file failed.
    #[error("temp file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The tool could not be spawned or exited unsuccessfully.
    #[error("metadata tool failed: {0}")]
    Tool(String),

    /// Waiting for the tool slot took too long.
    #[error("metadata tool busy for more than {0:?}")]
    Busy(Duration),

    /// The tool did not finish in time and was killed.
    #[error("metadata tool timed out after {0:?}")]
    Timeout(Duration),
}
