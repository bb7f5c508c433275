//! Upload records.

use serde::Serialize;

/// An upload row. The id doubles as the object storage key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Upload {
    /// Storage key.
    pub id: String,
    /// Display label.
    pub label: String,
    /// Owning user.
    pub created_by_user: i64,
    /// Client address at creation.
    pub created_ip: String,
    /// Creation time (unix ms).
    pub created_at: i64,
    /// Payload size; `None` while the upload is reserved but not finalized.
    pub bytes: Option<i64>,
    /// Expiry time (unix ms).
    pub expire_at: i64,
}

impl Upload {
    /// Whether the payload has been stored.
    pub fn is_finalized(&self) -> bool {
        self.bytes.is_some()
    }
}

/// Data for inserting an upload.
#[derive(Debug, Clone)]
pub struct NewUpload {
    pub id: String,
    pub label: String,
    pub created_by_user: i64,
    pub created_ip: String,
    pub created_at: i64,
    pub bytes: Option<i64>,
    pub expire_at: i64,
}
