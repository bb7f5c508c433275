//! Request DTOs for the web API.

use serde::Deserialize;
use validator::Validate;

use super::validation::{no_control_chars, not_empty_trimmed};
use crate::upload::{FileOrder, ListQuery, RenameUpload};

/// Login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 64, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, max = 128, message = "Password is required"))]
    pub password: String,
}

/// Reserve an upload to be finalized with `PUT /api/upload/{id}`.
#[derive(Debug, Deserialize, Validate)]
pub struct ReserveRequest {
    #[validate(
        length(min = 1, max = 50, message = "Label must be 1 to 50 characters"),
        custom(function = "no_control_chars")
    )]
    pub label: String,
    /// Lifetime in milliseconds.
    #[validate(range(min = 0, max = 3_154_000_000_000i64, message = "Expiry out of range"))]
    pub expire: i64,
    /// Declared payload size.
    #[validate(range(min = 0, message = "Size must not be negative"))]
    pub bytes: i64,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub anonymize: bool,
}

/// Rename an upload.
#[derive(Debug, Deserialize, Validate)]
pub struct RenameRequest {
    #[validate(length(min = 1, message = "Id is required"))]
    pub id: String,
    #[validate(
        length(max = 100, message = "Label must be at most 100 characters"),
        custom(function = "not_empty_trimmed"),
        custom(function = "no_control_chars")
    )]
    pub label: String,
    #[serde(default)]
    pub anonymize: bool,
}

impl From<RenameRequest> for RenameUpload {
    fn from(req: RenameRequest) -> Self {
        Self {
            id: req.id,
            label: req.label,
            anonymize: req.anonymize,
        }
    }
}

/// Create an API key.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateKeyRequest {
    #[validate(range(min = 1, max = 700, message = "Days must be between 1 and 700"))]
    pub days: i64,
}

/// Query parameters of `GET /api/files`.
#[derive(Debug, Default, Deserialize)]
pub struct FilesQuery {
    /// Page number; anything unparsable means the first page.
    #[serde(default)]
    pub page: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
    /// `{field}{as|ds}`, e.g. `sizeds`.
    #[serde(default)]
    pub order: Option<String>,
}

impl FilesQuery {
    /// Convert into a repository query.
    pub fn into_list_query(self) -> ListQuery {
        let page = self
            .page
            .as_deref()
            .and_then(|p| p.trim().parse::<i64>().ok())
            .unwrap_or(1);

        ListQuery {
            page,
            search: self.search,
            order: self
                .order
                .as_deref()
                .map(FileOrder::parse)
                .unwrap_or_default(),
        }
    }
}

/// Query parameters of `DELETE /api/files`.
#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    pub id: String,
}
