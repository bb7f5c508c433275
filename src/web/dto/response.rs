//! Response DTOs for the web API.

use serde::Serialize;

use crate::db::{Session, User};
use crate::upload::SweepReport;

/// Body of a successful upload, reservation or finalization.
#[derive(Debug, Serialize)]
pub struct UploadIdResponse {
    /// Storage key of the upload.
    pub id: String,
}

/// Body of a successful rename.
#[derive(Debug, Serialize)]
pub struct RenameResponse {
    pub id: String,
    pub label: String,
}

/// Generic success flag.
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// Public view of a user.
#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: i64,
    pub username: String,
    pub admin: bool,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            admin: user.admin,
        }
    }
}

/// Login response. The token is also set as the session cookie.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    /// Expiry in unix seconds.
    pub expires_at: i64,
    pub user: UserInfo,
}

/// One session in the key list. Tokens are never listed.
#[derive(Debug, Serialize)]
pub struct KeyItem {
    pub expires_at: i64,
    /// Whether this is the session making the request.
    pub current: bool,
}

impl KeyItem {
    pub fn new(session: &Session, current_id: &str) -> Self {
        Self {
            expires_at: session.expires_at,
            current: session.id == current_id,
        }
    }
}

/// `GET /api/keys` response.
#[derive(Debug, Serialize)]
pub struct KeysResponse {
    pub keys: Vec<KeyItem>,
}

/// A freshly created API key. The token is only shown once.
#[derive(Debug, Serialize)]
pub struct CreatedKey {
    pub token: String,
    pub expires_at: i64,
}

/// `DELETE /api/keys` response.
#[derive(Debug, Serialize)]
pub struct RevokedKeys {
    pub success: bool,
    pub revoked: u64,
}

/// Expiry sweep result.
#[derive(Debug, Serialize)]
pub struct SweepResponse {
    pub success: bool,
    pub deleted: u64,
    pub failed: u64,
    pub sessions_deleted: u64,
}

impl From<SweepReport> for SweepResponse {
    fn from(report: SweepReport) -> Self {
        Self {
            success: true,
            deleted: report.deleted,
            failed: report.failed,
            sessions_deleted: report.sessions_deleted,
        }
    }
}
