//! Upload handlers.

use axum::{
    extract::{ConnectInfo, FromRequest, Multipart, Path, Request, State},
    http::{header::CONTENT_TYPE, HeaderMap},
    Json,
};
use bytes::Bytes;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::upload::{CreateUpload, ReserveUpload, UploadFile};
use crate::web::dto::{ReserveRequest, UploadIdResponse, ValidatedJson};
use crate::web::error::ApiError;
use crate::web::middleware::AuthUser;
use crate::web::state::AppState;

/// Fields of an upload form.
#[derive(Debug, Default)]
struct UploadForm {
    label: Option<String>,
    expire: Option<String>,
    anonymize: bool,
    file: Option<UploadFile>,
}

/// Interpret a checkbox-style form value.
fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "on" | "1" | "yes"
    )
}

/// Parse an expiry in milliseconds. Fractions are truncated.
fn parse_expire(value: &str) -> Option<i64> {
    let value = value.trim();
    if let Ok(ms) = value.parse::<i64>() {
        return Some(ms);
    }
    value
        .parse::<f64>()
        .ok()
        .filter(|ms| ms.is_finite())
        .map(|ms| ms.trunc() as i64)
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.trim_start().to_ascii_lowercase().starts_with("application/json"))
        .unwrap_or(false)
}

/// Best-effort client address: proxy headers first, then the socket peer.
fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    let real_ip = headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    forwarded
        .or(real_ip)
        .map(str::to_string)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}

async fn read_form(mut multipart: Multipart) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::warn!("Failed to read multipart field: {}", e);
        ApiError::bad_request("Invalid form data")
    })? {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "file" => {
                let file_name = field
                    .file_name()
                    .map(str::to_string)
                    .filter(|n| !n.is_empty());
                let content_type = field.content_type().unwrap_or("").to_string();
                let data: Bytes = field.bytes().await.map_err(|e| {
                    tracing::warn!("Failed to read file content: {}", e);
                    ApiError::bad_request("Failed to read file")
                })?;
                form.file = Some(UploadFile {
                    file_name,
                    content_type,
                    data,
                });
            }
            "label" | "expire" | "anonymize" => {
                let text = field
                    .text()
                    .await
                    .map_err(|_| ApiError::bad_request(format!("Invalid {name}")))?;
                match name.as_str() {
                    "label" => form.label = Some(text),
                    "expire" => form.expire = Some(text),
                    _ => form.anonymize = parse_flag(&text),
                }
            }
            _ => {}
        }
    }

    Ok(form)
}

/// POST /api/upload - Upload a file, or reserve one with a JSON body.
pub async fn create_upload(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    request: Request,
) -> Result<Json<UploadIdResponse>, ApiError> {
    let created_ip = client_ip(request.headers(), connect_info.map(|ConnectInfo(addr)| addr));

    if is_json(request.headers()) {
        let ValidatedJson(body) = ValidatedJson::<ReserveRequest>::from_request(request, &state).await?;
        let upload = state
            .uploads()
            .reserve(
                &auth.user,
                ReserveUpload {
                    label: body.label,
                    expire_ms: body.expire,
                    bytes: body.bytes,
                    file_name: body.filename,
                    anonymize: body.anonymize,
                    created_ip,
                },
            )
            .await?;
        return Ok(Json(UploadIdResponse { id: upload.id }));
    }

    let multipart = Multipart::from_request(request, &state).await.map_err(|e| {
        tracing::debug!("Rejected upload body: {}", e);
        ApiError::bad_request("Invalid form data")
    })?;
    let form = read_form(multipart).await?;

    let expire_ms = form
        .expire
        .as_deref()
        .and_then(parse_expire)
        .ok_or_else(|| ApiError::bad_request("Invalid expire"))?;
    let file = form
        .file
        .ok_or_else(|| ApiError::bad_request("No file provided"))?;

    let upload = state
        .uploads()
        .create(
            &auth.user,
            CreateUpload {
                label: form.label.unwrap_or_default(),
                expire_ms,
                anonymize: form.anonymize,
                file,
                created_ip,
            },
        )
        .await?;

    Ok(Json(UploadIdResponse { id: upload.id }))
}

/// PUT /api/upload/{id} - Finalize a reserved upload.
pub async fn finalize_upload(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<String>,
    multipart: Result<Multipart, axum::extract::multipart::MultipartRejection>,
) -> Result<Json<UploadIdResponse>, ApiError> {
    let multipart = multipart.map_err(|_| ApiError::bad_request("Invalid form data"))?;
    let form = read_form(multipart).await?;

    let upload = state
        .uploads()
        .finalize(&auth.user, &id, form.file)
        .await?;

    Ok(Json(UploadIdResponse { id: upload.id }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_parse_flag() {
        for value in ["true", "on", "1", "YES", " True "] {
            assert!(parse_flag(value), "{value}");
        }
        for value in ["false", "off", "0", ""] {
            assert!(!parse_flag(value), "{value}");
        }
    }

    #[test]
    fn test_parse_expire() {
        assert_eq!(parse_expire("86400000"), Some(86_400_000));
        assert_eq!(parse_expire("1.5e3"), Some(1500));
        assert_eq!(parse_expire("12.9"), Some(12));
        assert_eq!(parse_expire("soon"), None);
        assert_eq!(parse_expire("NaN"), None);
    }

    #[test]
    fn test_client_ip() {
        let peer: SocketAddr = "10.0.0.9:5000".parse().unwrap();

        let mut headers = HeaderMap::new();
        assert_eq!(client_ip(&headers, None), "unknown");
        assert_eq!(client_ip(&headers, Some(peer)), "10.0.0.9");

        headers.insert("x-real-ip", HeaderValue::from_static("192.0.2.7"));
        assert_eq!(client_ip(&headers, Some(peer)), "192.0.2.7");

        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.5, 10.0.0.1"),
        );
        assert_eq!(client_ip(&headers, Some(peer)), "203.0.113.5");
    }

    #[test]
    fn test_is_json() {
        let mut headers = HeaderMap::new();
        assert!(!is_json(&headers));
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/json; charset=utf-8"),
        );
        assert!(is_json(&headers));
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("multipart/form-data; boundary=x"),
        );
        assert!(!is_json(&headers));
    }
}
