//! Test helpers for web API tests.
//!
//! Builds the router over an in-memory database, an in-memory object
//! store and a fake metadata tool.

#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum_test::TestServer;
use tempfile::TempDir;

use hoard::auth::create_session;
use hoard::exif::{ExifError, MetadataStripper, MetadataTool};
use hoard::storage::MemoryStore;
use hoard::upload::{now_ms, NewUpload, UploadRepository};
use hoard::web::{create_router, AppState};
use hoard::{hash_password, Config, Database, NewUser, User, UserRepository};

/// Shared secret for the sweep endpoint in tests.
pub const CRON_SECRET: &str = "test-cron-secret";

/// Upload limit in tests.
pub const MAX_BYTES: u64 = 64 * 1024;

/// Bytes the fake tool writes in place of the original payload.
pub const STRIPPED: &[u8] = b"stripped";

/// Metadata tool that replaces the file contents and counts calls.
#[derive(Default)]
pub struct FakeTool {
    pub calls: AtomicUsize,
}

#[async_trait]
impl MetadataTool for FakeTool {
    async fn strip(&self, path: &Path) -> Result<(), ExifError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::fs::write(path, STRIPPED).await?;
        Ok(())
    }
}

/// Metadata tool that always fails.
pub struct BrokenTool;

#[async_trait]
impl MetadataTool for BrokenTool {
    async fn strip(&self, _path: &Path) -> Result<(), ExifError> {
        Err(ExifError::Tool("exit status: 1".to_string()))
    }
}

/// A running test application.
pub struct TestApp {
    pub server: TestServer,
    pub db: Database,
    pub store: Arc<MemoryStore>,
    pub tool: Arc<FakeTool>,
    pub temp_dir: TempDir,
}

/// Configuration used by every test app.
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.auth.cron_secret = CRON_SECRET.to_string();
    config.upload.max_bytes = MAX_BYTES;
    config
}

/// Create a test app with a working metadata tool.
pub async fn create_test_app() -> TestApp {
    create_test_app_with(test_config(), None).await
}

/// Create a test app whose metadata tool always fails.
pub async fn create_test_app_with_broken_tool() -> TestApp {
    create_test_app_with(test_config(), Some(Arc::new(BrokenTool))).await
}

/// Create a test app from a configuration, optionally overriding the tool.
pub async fn create_test_app_with(
    config: Config,
    tool_override: Option<Arc<dyn MetadataTool>>,
) -> TestApp {
    let db = Database::open_in_memory()
        .await
        .expect("Failed to create test database");
    let store = Arc::new(MemoryStore::new());
    let tool = Arc::new(FakeTool::default());
    let temp_dir = TempDir::new().expect("Failed to create temp dir");

    let stripper_tool: Arc<dyn MetadataTool> = match tool_override {
        Some(tool) => tool,
        None => tool.clone(),
    };
    let stripper = MetadataStripper::new(
        stripper_tool,
        temp_dir.path(),
        Duration::from_secs(5),
        Duration::from_secs(5),
    );

    let state = AppState::new(db.clone(), store.clone(), Arc::new(stripper), config);
    let server = TestServer::new(create_router(Arc::new(state))).expect("Failed to create test server");

    TestApp {
        server,
        db,
        store,
        tool,
        temp_dir,
    }
}

/// Create a user directly in the database.
pub async fn create_user(db: &Database, username: &str, password: &str, admin: bool) -> User {
    let hash = hash_password(password).expect("Failed to hash password");
    UserRepository::new(db.pool())
        .create(&NewUser::new(username, hash).with_admin(admin))
        .await
        .expect("Failed to create user")
}

/// Create a user and a one-day session for it.
pub async fn create_user_with_token(db: &Database, username: &str, admin: bool) -> (User, String) {
    let user = create_user(db, username, "password123", admin).await;
    let session = create_session(db.pool(), user.id, 1)
        .await
        .expect("Failed to create session");
    (user, session.id)
}

/// Bearer header value for a token.
pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

/// Insert a finalized upload row (and its object) directly.
pub async fn seed_upload(app: &TestApp, user: &User, id: &str, label: &str, expire_at: i64) {
    use hoard::storage::ObjectStore;

    UploadRepository::new(app.db.pool())
        .insert(&NewUpload {
            id: id.to_string(),
            label: label.to_string(),
            created_by_user: user.id,
            created_ip: "127.0.0.1".to_string(),
            created_at: now_ms(),
            bytes: Some(4),
            expire_at,
        })
        .await
        .expect("Failed to insert upload");

    app.store
        .put(id, bytes::Bytes::from_static(b"data"), "application/octet-stream")
        .await
        .expect("Failed to put object");
}

/// One day in milliseconds.
pub const DAY_MS: i64 = 24 * 60 * 60 * 1000;
