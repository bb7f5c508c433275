//! Single-slot metadata stripper.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use super::tool::{ExifTool, MetadataTool};
use super::ExifError;
use crate::config::ExifConfig;

/// One payload to strip.
#[derive(Debug, Clone)]
pub struct ExifJob {
    /// Upload id; only used to name the temporary file.
    pub id: String,
    /// Original bytes.
    pub payload: Bytes,
    /// File extension without the dot, so the tool can detect the format.
    pub extension: String,
}

impl ExifJob {
    pub fn new(id: impl Into<String>, payload: Bytes, extension: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            payload,
            extension: extension.into(),
        }
    }
}

/// Strips metadata with at most one tool invocation in flight.
///
/// Waiters queue in arrival order. A waiter gives up after the lock
/// timeout with [`ExifError::Busy`]. Every temporary file is removed when
/// the call returns or its future is dropped.
pub struct MetadataStripper {
    tool: Option<Arc<dyn MetadataTool>>,
    temp_dir: PathBuf,
    slot: Semaphore,
    lock_timeout: Duration,
    tool_timeout: Duration,
}

impl MetadataStripper {
    /// Create a stripper around `tool`.
    pub fn new(
        tool: Arc<dyn MetadataTool>,
        temp_dir: impl Into<PathBuf>,
        lock_timeout: Duration,
        tool_timeout: Duration,
    ) -> Self {
        Self {
            tool: Some(tool),
            temp_dir: temp_dir.into(),
            slot: Semaphore::new(1),
            lock_timeout,
            tool_timeout,
        }
    }

    /// A stripper that returns payloads unchanged.
    pub fn disabled() -> Self {
        Self {
            tool: None,
            temp_dir: std::env::temp_dir(),
            slot: Semaphore::new(1),
            lock_timeout: Duration::ZERO,
            tool_timeout: Duration::ZERO,
        }
    }

    /// Build from configuration using the real exiftool binary.
    pub fn from_config(config: &ExifConfig) -> Self {
        if !config.enabled {
            warn!("Metadata stripping is disabled; uploads are stored as received");
            return Self::disabled();
        }
        Self::new(
            Arc::new(ExifTool::new(&config.tool_path)),
            &config.temp_dir,
            Duration::from_millis(config.lock_timeout_ms),
            Duration::from_secs(config.tool_timeout_secs),
        )
    }

    /// Whether payloads are actually stripped.
    pub fn is_enabled(&self) -> bool {
        self.tool.is_some()
    }

    /// Directory holding the temporary job files.
    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    /// Strip metadata from `job.payload` and return the rewritten bytes.
    pub async fn strip(&self, job: ExifJob) -> Result<Bytes, ExifError> {
        let Some(tool) = &self.tool else {
            return Ok(job.payload);
        };

        let _permit = tokio::time::timeout(self.lock_timeout, self.slot.acquire())
            .await
            .map_err(|_| {
                warn!(upload_id = %job.id, "Metadata tool busy, giving up");
                ExifError::Busy(self.lock_timeout)
            })?
            .map_err(|_| ExifError::Busy(self.lock_timeout))?;

        debug!(upload_id = %job.id, size = job.payload.len(), "Stripping metadata");

        tokio::fs::create_dir_all(&self.temp_dir).await?;
        let temp = temp_file(&self.temp_dir, &job.id, &job.extension)?;

        tokio::fs::write(temp.path(), &job.payload).await?;

        tokio::time::timeout(self.tool_timeout, tool.strip(temp.path()))
            .await
            .map_err(|_| {
                warn!(upload_id = %job.id, "Metadata tool timed out");
                ExifError::Timeout(self.tool_timeout)
            })??;

        let stripped = tokio::fs::read(temp.path()).await?;
        debug!(
            upload_id = %job.id,
            before = job.payload.len(),
            after = stripped.len(),
            "Metadata stripped"
        );

        Ok(Bytes::from(stripped))
    }
}

/// Longest encoded id kept in a temp file name.
const TEMP_PREFIX_MAX: usize = 64;

/// Longest encoded extension kept in a temp file name.
const TEMP_SUFFIX_MAX: usize = 16;

/// Create `<dir>/<escaped id>.<random>.<escaped ext>`.
///
/// Both parts are percent-encoded, so neither can contain a separator and
/// the file always lands directly inside `dir`. They are also capped so
/// long non-ASCII names stay under the file name limit. The file is
/// deleted when the returned handle drops.
fn temp_file(dir: &Path, id: &str, extension: &str) -> std::io::Result<tempfile::NamedTempFile> {
    let prefix = format!("{}.", capped(&urlencoding::encode(id), TEMP_PREFIX_MAX));
    let suffix = format!(".{}", capped(&urlencoding::encode(extension), TEMP_SUFFIX_MAX));
    tempfile::Builder::new()
        .prefix(&prefix)
        .suffix(&suffix)
        .rand_bytes(8)
        .tempfile_in(dir)
}

/// First `max` bytes of an encoded (ASCII) string.
fn capped(encoded: &str, max: usize) -> &str {
    encoded.get(..max).unwrap_or(encoded)
}

impl std::fmt::Debug for MetadataStripper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataStripper")
            .field("enabled", &self.is_enabled())
            .field("temp_dir", &self.temp_dir)
            .field("lock_timeout", &self.lock_timeout)
            .field("tool_timeout", &self.tool_timeout)
            .finish()
    }
}
