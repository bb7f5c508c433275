//! The external metadata tool.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use super::ExifError;

/// Arguments passed to exiftool before the file path.
///
/// Clears all writable tags, the orientation tag and the ICC profile, and
/// rewrites the file in place.
pub const EXIFTOOL_ARGS: &[&str] = &[
    "-all=",
    "-Orientation=",
    "-icc_profile:all=",
    "-overwrite_original",
    "-q",
];

/// Something that strips metadata from a file in place.
#[async_trait]
pub trait MetadataTool: Send + Sync {
    /// Rewrite the file at `path` without its metadata.
    async fn strip(&self, path: &Path) -> Result<(), ExifError>;
}

/// Runs the `exiftool` binary, one process per call.
#[derive(Debug, Clone)]
pub struct ExifTool {
    program: String,
}

impl ExifTool {
    /// Use the binary at `program` (a path or a name looked up in `PATH`).
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for ExifTool {
    fn default() -> Self {
        Self::new("exiftool")
    }
}

#[async_trait]
impl MetadataTool for ExifTool {
    async fn strip(&self, path: &Path) -> Result<(), ExifError> {
        // Dropping this future kills the child.
        let output = Command::new(&self.program)
            .args(EXIFTOOL_ARGS)
            .arg(path)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| ExifError::Tool(format!("failed to spawn {}: {e}", self.program)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExifError::Tool(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_strip_orientation_and_icc() {
        assert!(EXIFTOOL_ARGS.contains(&"-all="));
        assert!(EXIFTOOL_ARGS.contains(&"-Orientation="));
        assert!(EXIFTOOL_ARGS.contains(&"-icc_profile:all="));
        assert!(EXIFTOOL_ARGS.contains(&"-overwrite_original"));
    }

    #[tokio::test]
    async fn test_missing_binary_is_tool_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("x.jpg");
        std::fs::write(&file, b"data").unwrap();

        let tool = ExifTool::new("/nonexistent/hoard-exiftool");
        let result = tool.strip(&file).await;
        assert!(matches!(result, Err(ExifError::Tool(_))));
    }
}
