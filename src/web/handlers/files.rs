//! File list handlers.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use std::sync::Arc;

use crate::upload::FilePage;
use crate::web::dto::{
    DeleteQuery, FilesQuery, RenameRequest, RenameResponse, SuccessResponse, ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::middleware::AuthUser;
use crate::web::state::AppState;

/// GET /api/files - One page of the caller's uploads.
pub async fn list_files(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Query(query): Query<FilesQuery>,
) -> Result<Json<FilePage>, ApiError> {
    let page = state
        .uploads()
        .list(&auth.user, &query.into_list_query())
        .await?;
    Ok(Json(page))
}

/// DELETE /api/files?id=... - Delete an upload.
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    query: Result<Query<DeleteQuery>, QueryRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let Query(query) = query.map_err(|_| ApiError::bad_request("Missing id"))?;
    state.uploads().delete(&auth.user, &query.id).await?;
    Ok(Json(SuccessResponse::ok()))
}

/// POST /api/files/rename - Relabel an upload and move its object.
pub async fn rename_file(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<RenameRequest>,
) -> Result<Json<RenameResponse>, ApiError> {
    let upload = state.uploads().rename(&auth.user, req.into()).await?;
    Ok(Json(RenameResponse {
        id: upload.id,
        label: upload.label,
    }))
}
