//! Web API File List Tests
//!
//! Integration tests for listing, deleting and renaming uploads.

mod common;

use axum::http::{header::AUTHORIZATION, StatusCode};
use serde_json::{json, Value};

use common::*;
use hoard::storage::StoreOp;
use hoard::upload::{now_ms, UploadRepository};

const NANOID: &str = "V1StGXR8_Z5jdHi6B-myT";

fn file_ids(body: &Value) -> Vec<String> {
    body["files"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["id"].as_str().unwrap().to_string())
        .collect()
}

// ============================================================================
// Listing
// ============================================================================

#[tokio::test]
async fn test_list_only_own_files() {
    let app = create_test_app().await;
    let (alice, alice_token) = create_user_with_token(&app.db, "alice", false).await;
    let (bob, _) = create_user_with_token(&app.db, "bob", false).await;
    let later = now_ms() + DAY_MS;

    seed_upload(&app, &alice, "aaa.txt", "alice file", later).await;
    seed_upload(&app, &bob, "bbb.txt", "bob file", later).await;

    let response = app
        .server
        .get("/api/files")
        .add_header(AUTHORIZATION, bearer(&alice_token))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(file_ids(&body), vec!["aaa.txt"]);
    assert_eq!(body["total"], 1);
    assert_eq!(body["page"], 1);
    assert_eq!(body["last_page"], 1);
    assert_eq!(body["order"]["column"], "createdAt");
    assert_eq!(body["order"]["direction"], "desc");
}

#[tokio::test]
async fn test_list_paging_clamps() {
    let app = create_test_app().await;
    let (alice, token) = create_user_with_token(&app.db, "alice", false).await;
    let later = now_ms() + DAY_MS;

    for i in 0..30 {
        seed_upload(&app, &alice, &format!("file{i:02}.txt"), &format!("file {i}"), later).await;
    }

    let response = app
        .server
        .get("/api/files?page=2")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    let body: Value = response.json();
    assert_eq!(body["files"].as_array().unwrap().len(), 5);
    assert_eq!(body["last_page"], 2);
    assert_eq!(body["total"], 30);

    let response = app
        .server
        .get("/api/files?page=99")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    assert_eq!(response.json::<Value>()["page"], 2);

    let response = app
        .server
        .get("/api/files?page=-4")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    let body: Value = response.json();
    assert_eq!(body["page"], 1);
    assert_eq!(body["files"].as_array().unwrap().len(), 25);
}

#[tokio::test]
async fn test_list_search_and_order() {
    let app = create_test_app().await;
    let (alice, token) = create_user_with_token(&app.db, "alice", false).await;
    let later = now_ms() + DAY_MS;

    seed_upload(&app, &alice, "a1.txt", "Beach", later).await;
    seed_upload(&app, &alice, "a2.txt", "beach party", later).await;
    seed_upload(&app, &alice, "a3.txt", "mountain", later).await;
    seed_upload(&app, &alice, "a4.txt", "100%_done", later).await;

    let response = app
        .server
        .get("/api/files?search=BEACH&order=fileas")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    let body: Value = response.json();
    assert_eq!(file_ids(&body), vec!["a1.txt", "a2.txt"]);
    assert_eq!(body["order"]["column"], "label");
    assert_eq!(body["order"]["direction"], "asc");

    // Wildcards in the search are literal.
    let response = app
        .server
        .get("/api/files?search=%25_")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    assert_eq!(file_ids(&response.json::<Value>()), vec!["a4.txt"]);

    // Ids are searchable too.
    let response = app
        .server
        .get("/api/files?search=a3")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    assert_eq!(file_ids(&response.json::<Value>()), vec!["a3.txt"]);
}

#[tokio::test]
async fn test_list_requires_auth() {
    let app = create_test_app().await;

    app.server
        .get("/api/files")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Deletion
// ============================================================================

#[tokio::test]
async fn test_delete_file() {
    let app = create_test_app().await;
    let (alice, token) = create_user_with_token(&app.db, "alice", false).await;
    seed_upload(&app, &alice, "gone.txt", "gone", now_ms() + DAY_MS).await;

    app.server
        .delete("/api/files?id=gone.txt")
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .assert_status_ok();

    assert!(!app.store.contains("gone.txt").await);
    assert!(UploadRepository::new(app.db.pool())
        .get_by_id("gone.txt")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_delete_errors() {
    let app = create_test_app().await;
    let (alice, _) = create_user_with_token(&app.db, "alice", false).await;
    let (_, bob_token) = create_user_with_token(&app.db, "bob", false).await;
    seed_upload(&app, &alice, "mine.txt", "mine", now_ms() + DAY_MS).await;

    app.server
        .delete("/api/files?id=mine.txt")
        .add_header(AUTHORIZATION, bearer(&bob_token))
        .await
        .assert_status(StatusCode::FORBIDDEN);

    app.server
        .delete("/api/files?id=nope.txt")
        .add_header(AUTHORIZATION, bearer(&bob_token))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    app.server
        .delete("/api/files")
        .add_header(AUTHORIZATION, bearer(&bob_token))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    assert!(app.store.contains("mine.txt").await);
}

// ============================================================================
// Rename
// ============================================================================

#[tokio::test]
async fn test_rename_moves_object() {
    let app = create_test_app().await;
    let (alice, token) = create_user_with_token(&app.db, "alice", false).await;
    let old_key = format!("{NANOID}/old.png");
    seed_upload(&app, &alice, &old_key, "old", now_ms() + DAY_MS).await;

    let response = app
        .server
        .post("/api/files/rename")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "id": old_key, "label": "  Summer Trip  " }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    let new_key = format!("{NANOID}/summer-trip.png");
    assert_eq!(body["id"], new_key);
    assert_eq!(body["label"], "Summer Trip");

    assert!(!app.store.contains(&old_key).await);
    assert_eq!(&app.store.object(&new_key).await.unwrap().data[..], b"data");

    let repo = UploadRepository::new(app.db.pool());
    assert!(repo.get_by_id(&old_key).await.unwrap().is_none());
    assert_eq!(repo.get_by_id(&new_key).await.unwrap().unwrap().label, "Summer Trip");
}

#[tokio::test]
async fn test_rename_anonymize() {
    let app = create_test_app().await;
    let (alice, token) = create_user_with_token(&app.db, "alice", false).await;
    let old_key = format!("{NANOID}/holiday.jpg");
    seed_upload(&app, &alice, &old_key, "holiday", now_ms() + DAY_MS).await;

    let response = app
        .server
        .post("/api/files/rename")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "id": old_key, "label": "holiday", "anonymize": true }))
        .await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["id"], format!("{NANOID}.jpg"));
    assert_eq!(app.store.keys().await, vec![format!("{NANOID}.jpg")]);
}

#[tokio::test]
async fn test_rename_same_key_updates_label_only() {
    let app = create_test_app().await;
    let (alice, token) = create_user_with_token(&app.db, "alice", false).await;
    let key = format!("{NANOID}/notes.txt");
    seed_upload(&app, &alice, &key, "old label", now_ms() + DAY_MS).await;

    let response = app
        .server
        .post("/api/files/rename")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "id": key, "label": "notes" }))
        .await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["id"], key);
    assert_eq!(app.store.keys().await, vec![key.clone()]);

    let row = UploadRepository::new(app.db.pool())
        .get_by_id(&key)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.label, "notes");
}

#[tokio::test]
async fn test_rename_failed_copy_leaves_row() {
    let app = create_test_app().await;
    let (alice, token) = create_user_with_token(&app.db, "alice", false).await;
    let old_key = format!("{NANOID}/before.txt");
    seed_upload(&app, &alice, &old_key, "before", now_ms() + DAY_MS).await;
    app.store.fail_on(StoreOp::Copy).await;

    let response = app
        .server
        .post("/api/files/rename")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "id": old_key, "label": "after" }))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let row = UploadRepository::new(app.db.pool())
        .get_by_id(&old_key)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.label, "before");
    assert_eq!(app.store.keys().await, vec![old_key]);
}

#[tokio::test]
async fn test_rename_conflicts_and_permissions() {
    let app = create_test_app().await;
    let (alice, token) = create_user_with_token(&app.db, "alice", false).await;
    let (_, bob_token) = create_user_with_token(&app.db, "bob", false).await;
    let key = format!("{NANOID}/a.txt");
    seed_upload(&app, &alice, &key, "a", now_ms() + DAY_MS).await;
    seed_upload(&app, &alice, &format!("{NANOID}/b.txt"), "b", now_ms() + DAY_MS).await;

    // Target key already exists
    app.server
        .post("/api/files/rename")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "id": key, "label": "b" }))
        .await
        .assert_status(StatusCode::CONFLICT);

    app.server
        .post("/api/files/rename")
        .add_header(AUTHORIZATION, bearer(&bob_token))
        .json(&json!({ "id": key, "label": "mine now" }))
        .await
        .assert_status(StatusCode::FORBIDDEN);

    app.server
        .post("/api/files/rename")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "id": "missing.txt", "label": "x" }))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let too_long = "x".repeat(101);
    for label in ["   ", too_long.as_str()] {
        app.server
            .post("/api/files/rename")
            .add_header(AUTHORIZATION, bearer(&token))
            .json(&json!({ "id": key, "label": label }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    assert!(app.store.contains(&key).await);
}
