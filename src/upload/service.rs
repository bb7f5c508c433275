//! Upload service.
//!
//! This module provides the upload flows:
//! - Direct upload and reservation with size/expiry checks
//! - Finalization of a reservation
//! - Rename/anonymize, deletion and listing
//! - The expiry sweep

use bytes::Bytes;
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::key::{self, DEFAULT_CONTENT_TYPE};
use super::listing::{clamp_page, last_page, FileOrder, ListQuery};
use super::model::{NewUpload, Upload};
use super::repository::UploadRepository;
use crate::config::UploadConfig;
use crate::db::{Database, SessionRepository, User};
use crate::exif::{needs_stripping, ExifJob, MetadataStripper};
use crate::storage::ObjectStore;
use crate::{HoardError, Result};

/// Maximum label length on upload.
pub const MAX_LABEL_CHARS: usize = 50;

/// Maximum label length on rename.
pub const MAX_RENAME_LABEL_CHARS: usize = 100;

/// Upper bound accepted for a requested lifetime, before the per-user cap.
pub const MAX_EXPIRE_INPUT_MS: i64 = 3_154_000_000_000;

/// Current time in unix milliseconds.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// A received file.
#[derive(Debug, Clone)]
pub struct UploadFile {
    /// Client-side file name, if any.
    pub file_name: Option<String>,
    /// Declared content type.
    pub content_type: String,
    pub data: Bytes,
}

/// Request data for a direct upload.
#[derive(Debug, Clone)]
pub struct CreateUpload {
    pub label: String,
    /// Lifetime in milliseconds.
    pub expire_ms: i64,
    /// Omit the file name from the id.
    pub anonymize: bool,
    pub file: UploadFile,
    pub created_ip: String,
}

/// Request data for reserving an upload to be finalized later.
#[derive(Debug, Clone)]
pub struct ReserveUpload {
    pub label: String,
    pub expire_ms: i64,
    /// Declared payload size.
    pub bytes: i64,
    pub file_name: Option<String>,
    pub anonymize: bool,
    pub created_ip: String,
}

/// Request data for a rename.
#[derive(Debug, Clone)]
pub struct RenameUpload {
    pub id: String,
    pub label: String,
    pub anonymize: bool,
}

/// One page of a user's uploads.
#[derive(Debug, Clone, Serialize)]
pub struct FilePage {
    pub files: Vec<Upload>,
    pub page: i64,
    pub last_page: i64,
    pub total: i64,
    pub order: FileOrder,
}

/// Outcome of an expiry sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// Uploads removed from storage and the table.
    pub deleted: u64,
    /// Uploads left in place because a step failed.
    pub failed: u64,
    /// Expired sessions removed.
    pub sessions_deleted: u64,
}

/// Service tying the upload table, the object store and the stripper together.
pub struct UploadService<'a> {
    db: &'a Database,
    store: &'a dyn ObjectStore,
    stripper: &'a MetadataStripper,
    limits: &'a UploadConfig,
}

impl<'a> UploadService<'a> {
    /// Create a new UploadService.
    pub fn new(
        db: &'a Database,
        store: &'a dyn ObjectStore,
        stripper: &'a MetadataStripper,
        limits: &'a UploadConfig,
    ) -> Self {
        Self {
            db,
            store,
            stripper,
            limits,
        }
    }

    fn repo(&self) -> UploadRepository<'_> {
        UploadRepository::new(self.db.pool())
    }

    /// Upload a file in one step.
    ///
    /// # Validation
    /// - Label: 1 to 50 characters
    /// - Expiry: at most the configured cap unless the user is an admin
    /// - Size: at most the configured maximum
    pub async fn create(&self, user: &User, request: CreateUpload) -> Result<Upload> {
        validate_label(&request.label, MAX_LABEL_CHARS)?;
        self.validate_expire(user, request.expire_ms)?;
        self.validate_size(request.file.data.len() as u64)?;

        let content_type = content_type_of(&request.file);
        let id = key::upload_id(
            &key::new_nanoid(),
            request.file.file_name.as_deref(),
            request.anonymize,
        );
        let extension = key::extension_for(&content_type);

        let data = self
            .strip_if_needed(&id, &content_type, &extension, request.file.data)
            .await?;
        let storage_key = key::storage_key(&id, &content_type);
        let size = data.len() as i64;

        self.store
            .put(&storage_key, data, key::served_content_type(&content_type))
            .await?;

        let now = now_ms();
        let new_upload = NewUpload {
            id: storage_key.clone(),
            label: request.label,
            created_by_user: user.id,
            created_ip: request.created_ip,
            created_at: now,
            bytes: Some(size),
            expire_at: now.saturating_add(request.expire_ms),
        };

        let upload = match self.repo().insert(&new_upload).await {
            Ok(upload) => upload,
            Err(e) => {
                if let Err(del) = self.store.delete(&storage_key).await {
                    error!(key = %storage_key, error = %del, "Failed to remove orphaned object");
                }
                return Err(e);
            }
        };

        info!(
            upload_id = %upload.id,
            user_id = user.id,
            bytes = size,
            "Upload stored"
        );
        Ok(upload)
    }

    /// Reserve an upload row to be finalized later.
    pub async fn reserve(&self, user: &User, request: ReserveUpload) -> Result<Upload> {
        validate_label(&request.label, MAX_LABEL_CHARS)?;
        self.validate_expire(user, request.expire_ms)?;
        if request.bytes < 0 {
            return Err(HoardError::Validation("bytes must not be negative".to_string()));
        }
        self.validate_size(request.bytes as u64)?;

        let id = key::upload_id(
            &key::new_nanoid(),
            request.file_name.as_deref(),
            request.anonymize,
        );

        let now = now_ms();
        let upload = self
            .repo()
            .insert(&NewUpload {
                id,
                label: request.label,
                created_by_user: user.id,
                created_ip: request.created_ip,
                created_at: now,
                bytes: None,
                expire_at: now.saturating_add(request.expire_ms),
            })
            .await?;

        info!(upload_id = %upload.id, user_id = user.id, "Upload reserved");
        Ok(upload)
    }

    /// Store the payload of a reserved upload.
    ///
    /// The row is claimed before the object is written, so of two
    /// concurrent finalizations exactly one writes; the other gets a
    /// conflict. A failed write gives the reservation back.
    ///
    /// `id` may arrive percent-decoded from a URL path; the stored,
    /// encoded form is tried as well.
    pub async fn finalize(&self, user: &User, id: &str, file: Option<UploadFile>) -> Result<Upload> {
        let repo = self.repo();
        let upload = match repo.get_by_id(id).await? {
            Some(upload) => Some(upload),
            None => {
                let encoded = key::encode_id(id);
                if encoded == id {
                    None
                } else {
                    repo.get_by_id(&encoded).await?
                }
            }
        }
        .ok_or_else(|| HoardError::NotFound("upload".to_string()))?;
        let id = upload.id.as_str();

        if upload.created_by_user != user.id {
            return Err(HoardError::Permission("not the owner of this upload".to_string()));
        }
        if upload.is_finalized() {
            return Err(HoardError::Conflict("upload already finalized".to_string()));
        }

        let file = file.ok_or_else(|| HoardError::Validation("no file".to_string()))?;
        self.validate_size(file.data.len() as u64)?;

        let content_type = content_type_of(&file);
        let extension = key::extension_for(&content_type);
        let data = self
            .strip_if_needed(id, &content_type, &extension, file.data)
            .await?;
        let storage_key = key::storage_key(id, &content_type);
        let size = data.len() as i64;

        if !repo.claim(id, &storage_key, size).await? {
            return Err(HoardError::Conflict("upload already finalized".to_string()));
        }

        if let Err(e) = self
            .store
            .put(&storage_key, data, key::served_content_type(&content_type))
            .await
        {
            if let Err(revert) = repo.release_claim(&storage_key, id).await {
                error!(upload_id = %id, error = %revert, "Failed to release upload claim");
            }
            return Err(e.into());
        }

        info!(upload_id = %storage_key, user_id = user.id, bytes = size, "Upload finalized");
        Ok(Upload {
            id: storage_key,
            bytes: Some(size),
            ..upload
        })
    }

    /// Change an upload's label and, with it, its key.
    pub async fn rename(&self, user: &User, request: RenameUpload) -> Result<Upload> {
        let label = request.label.trim();
        validate_label(label, MAX_RENAME_LABEL_CHARS)?;

        let repo = self.repo();
        let upload = repo
            .get_by_id(&request.id)
            .await?
            .ok_or_else(|| HoardError::NotFound("upload".to_string()))?;

        if upload.created_by_user != user.id {
            return Err(HoardError::Permission("not the owner of this upload".to_string()));
        }
        if !upload.is_finalized() {
            return Err(HoardError::Conflict("upload is not finalized".to_string()));
        }

        let new_key = key::renamed_key(&upload.id, label, request.anonymize);

        if new_key == upload.id {
            repo.rename(&upload.id, &upload.id, label).await?;
            debug!(upload_id = %upload.id, "Upload relabeled");
            return Ok(Upload {
                label: label.to_string(),
                ..upload
            });
        }

        if repo.exists(&new_key).await? {
            return Err(HoardError::Conflict(format!("key '{new_key}' is taken")));
        }

        self.store.copy(&upload.id, &new_key).await?;

        if let Err(e) = repo.rename(&upload.id, &new_key, label).await {
            if let Err(del) = self.store.delete(&new_key).await {
                error!(key = %new_key, error = %del, "Failed to remove copied object");
            }
            return Err(e);
        }

        if let Err(e) = self.store.delete(&upload.id).await {
            warn!(key = %upload.id, error = %e, "Failed to delete old object after rename");
        }

        info!(from = %upload.id, to = %new_key, user_id = user.id, "Upload renamed");
        Ok(Upload {
            id: new_key,
            label: label.to_string(),
            ..upload
        })
    }

    /// Delete an upload and its object.
    pub async fn delete(&self, user: &User, id: &str) -> Result<()> {
        let repo = self.repo();
        let upload = repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| HoardError::NotFound("upload".to_string()))?;

        if upload.created_by_user != user.id {
            return Err(HoardError::Permission("not the owner of this upload".to_string()));
        }

        if upload.is_finalized() {
            self.store.delete(&upload.id).await?;
        }
        repo.delete(&upload.id).await?;

        info!(upload_id = %upload.id, user_id = user.id, "Upload deleted");
        Ok(())
    }

    /// One page of the user's uploads.
    pub async fn list(&self, user: &User, query: &ListQuery) -> Result<FilePage> {
        let repo = self.repo();
        let total = repo.count_by_owner(user.id, query).await?;
        let page = clamp_page(query.page, total);
        let files = repo.list_by_owner(user.id, query, page).await?;

        Ok(FilePage {
            files,
            page,
            last_page: last_page(total),
            total,
            order: query.order,
        })
    }

    /// Remove expired uploads and sessions as of `now` (unix ms).
    ///
    /// An upload whose object cannot be deleted keeps its row so the next
    /// sweep retries it.
    pub async fn sweep(&self, now: i64) -> Result<SweepReport> {
        let repo = self.repo();
        let expired = repo.list_expired(now).await?;
        let mut report = SweepReport::default();

        for upload in expired {
            if let Err(e) = self.store.delete(&upload.id).await {
                warn!(upload_id = %upload.id, error = %e, "Failed to delete expired object");
                report.failed += 1;
                continue;
            }

            match repo.delete(&upload.id).await {
                Ok(_) => report.deleted += 1,
                Err(e) => {
                    error!(upload_id = %upload.id, error = %e, "Failed to delete expired upload row");
                    report.failed += 1;
                }
            }
        }

        report.sessions_deleted = SessionRepository::new(self.db.pool())
            .delete_expired(now.div_euclid(1000))
            .await?;

        info!(
            deleted = report.deleted,
            failed = report.failed,
            sessions_deleted = report.sessions_deleted,
            "Expiry sweep finished"
        );
        Ok(report)
    }

    async fn strip_if_needed(
        &self,
        id: &str,
        content_type: &str,
        extension: &str,
        data: Bytes,
    ) -> Result<Bytes> {
        if !needs_stripping(content_type) {
            return Ok(data);
        }

        self.stripper
            .strip(ExifJob::new(id, data, extension))
            .await
            .map_err(|e| {
                error!(upload_id = %id, error = %e, "Failed to strip metadata");
                HoardError::Exif(e)
            })
    }

    fn validate_expire(&self, user: &User, expire_ms: i64) -> Result<()> {
        if !(0..=MAX_EXPIRE_INPUT_MS).contains(&expire_ms) {
            return Err(HoardError::Validation(format!(
                "expire must be between 0 and {MAX_EXPIRE_INPUT_MS}"
            )));
        }
        if expire_ms > self.limits.max_expire_ms && !user.admin {
            return Err(HoardError::Validation(format!(
                "expire must be at most {} ms",
                self.limits.max_expire_ms
            )));
        }
        Ok(())
    }

    fn validate_size(&self, size: u64) -> Result<()> {
        if size > self.limits.max_bytes {
            return Err(HoardError::Validation("file too large".to_string()));
        }
        Ok(())
    }
}

fn validate_label(label: &str, max_chars: usize) -> Result<()> {
    let len = label.chars().count();
    if len == 0 || len > max_chars {
        return Err(HoardError::Validation(format!(
            "label must be 1 to {max_chars} characters"
        )));
    }
    Ok(())
}

/// Declared content type, else a guess from the file name.
fn content_type_of(file: &UploadFile) -> String {
    let essence = key::mime_essence(&file.content_type);
    if !essence.is_empty() {
        return essence;
    }
    file.file_name
        .as_deref()
        .and_then(|name| mime_guess::from_path(name).first_raw())
        .unwrap_or(DEFAULT_CONTENT_TYPE)
        .to_string()
}
