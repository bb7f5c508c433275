//! Upload repository.

use sqlx::SqlitePool;

use super::listing::{like_pattern, ListQuery, PAGE_SIZE};
use super::model::{NewUpload, Upload};
use crate::Result;

const COLUMNS: &str = "id, label, created_by_user, created_ip, created_at, bytes, expire_at";

/// Repository for upload rows.
pub struct UploadRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UploadRepository<'a> {
    /// Create a new UploadRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new upload.
    pub async fn insert(&self, upload: &NewUpload) -> Result<Upload> {
        sqlx::query(
            "INSERT INTO uploads (id, label, created_by_user, created_ip, created_at, bytes, expire_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&upload.id)
        .bind(&upload.label)
        .bind(upload.created_by_user)
        .bind(&upload.created_ip)
        .bind(upload.created_at)
        .bind(upload.bytes)
        .bind(upload.expire_at)
        .execute(self.pool)
        .await?;

        Ok(Upload {
            id: upload.id.clone(),
            label: upload.label.clone(),
            created_by_user: upload.created_by_user,
            created_ip: upload.created_ip.clone(),
            created_at: upload.created_at,
            bytes: upload.bytes,
            expire_at: upload.expire_at,
        })
    }

    /// Get an upload by id.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<Upload>> {
        let upload = sqlx::query_as::<_, Upload>(&format!(
            "SELECT {COLUMNS} FROM uploads WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(upload)
    }

    /// Whether an upload with this id exists.
    pub async fn exists(&self, id: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM uploads WHERE id = ?)")
            .bind(id)
            .fetch_one(self.pool)
            .await?;
        Ok(exists)
    }

    /// Atomically mark a reserved upload as finalized and move it to `new_id`.
    ///
    /// Returns false when the row is gone or already finalized.
    pub async fn claim(&self, id: &str, new_id: &str, bytes: i64) -> Result<bool> {
        let result =
            sqlx::query("UPDATE uploads SET bytes = ?, id = ? WHERE id = ? AND bytes IS NULL")
                .bind(bytes)
                .bind(new_id)
                .bind(id)
                .execute(self.pool)
                .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Undo [`claim`](Self::claim): clear `bytes` and restore the old id.
    pub async fn release_claim(&self, new_id: &str, old_id: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE uploads SET bytes = NULL, id = ? WHERE id = ?")
            .bind(old_id)
            .bind(new_id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Change the label and id of an upload.
    pub async fn rename(&self, id: &str, new_id: &str, label: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE uploads SET label = ?, id = ? WHERE id = ?")
            .bind(label)
            .bind(new_id)
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Delete an upload row.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM uploads WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Uploads whose expiry is at or before `now_ms`.
    pub async fn list_expired(&self, now_ms: i64) -> Result<Vec<Upload>> {
        let uploads = sqlx::query_as::<_, Upload>(&format!(
            "SELECT {COLUMNS} FROM uploads WHERE expire_at <= ? ORDER BY expire_at ASC"
        ))
        .bind(now_ms)
        .fetch_all(self.pool)
        .await?;

        Ok(uploads)
    }

    /// Count a user's uploads matching the query's search.
    pub async fn count_by_owner(&self, user_id: i64, query: &ListQuery) -> Result<i64> {
        let count: i64 = match query.search_term() {
            Some(search) => {
                let pattern = like_pattern(&search);
                sqlx::query_scalar(
                    "SELECT COUNT(*) FROM uploads WHERE created_by_user = ?
                     AND (LOWER(label) LIKE ? ESCAPE '\\' OR LOWER(id) LIKE ? ESCAPE '\\')",
                )
                .bind(user_id)
                .bind(&pattern)
                .bind(&pattern)
                .fetch_one(self.pool)
                .await?
            }
            None => {
                sqlx::query_scalar("SELECT COUNT(*) FROM uploads WHERE created_by_user = ?")
                    .bind(user_id)
                    .fetch_one(self.pool)
                    .await?
            }
        };

        Ok(count)
    }

    /// One page of a user's uploads. `page` must already be clamped.
    pub async fn list_by_owner(
        &self,
        user_id: i64,
        query: &ListQuery,
        page: i64,
    ) -> Result<Vec<Upload>> {
        let offset = (page.max(1) - 1) * PAGE_SIZE;
        let order = query.order.to_sql();

        let uploads = match query.search_term() {
            Some(search) => {
                let pattern = like_pattern(&search);
                sqlx::query_as::<_, Upload>(&format!(
                    "SELECT {COLUMNS} FROM uploads WHERE created_by_user = ?
                     AND (LOWER(label) LIKE ? ESCAPE '\\' OR LOWER(id) LIKE ? ESCAPE '\\')
                     ORDER BY {order} LIMIT ? OFFSET ?"
                ))
                .bind(user_id)
                .bind(&pattern)
                .bind(&pattern)
                .bind(PAGE_SIZE)
                .bind(offset)
                .fetch_all(self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Upload>(&format!(
                    "SELECT {COLUMNS} FROM uploads WHERE created_by_user = ?
                     ORDER BY {order} LIMIT ? OFFSET ?"
                ))
                .bind(user_id)
                .bind(PAGE_SIZE)
                .bind(offset)
                .fetch_all(self.pool)
                .await?
            }
        };

        Ok(uploads)
    }
}
