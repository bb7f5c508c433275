//! Database schema and migrations for hoard.
//!
//! Migrations are applied in order; the `schema_version` table records
//! how many have run.

/// Database migrations.
pub const MIGRATIONS: &[&str] = &[
    // v1: users and sessions
    r#"
CREATE TABLE users (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    username    TEXT NOT NULL,
    password    TEXT NOT NULL,           -- Argon2 hash
    admin       INTEGER NOT NULL DEFAULT 0,
    created_at  TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE UNIQUE INDEX idx_users_username_nocase ON users(username COLLATE NOCASE);

CREATE TABLE sessions (
    id          TEXT PRIMARY KEY,
    user_id     INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    expires_at  INTEGER NOT NULL         -- unix seconds
);

CREATE INDEX idx_sessions_user_id ON sessions(user_id);
CREATE INDEX idx_sessions_expires_at ON sessions(expires_at);
"#,
    // v2: uploads
    r#"
CREATE TABLE uploads (
    id              TEXT PRIMARY KEY,    -- storage key
    label           TEXT NOT NULL,
    created_by_user INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    created_ip      TEXT NOT NULL,
    created_at      INTEGER NOT NULL,    -- unix ms
    bytes           INTEGER,             -- NULL until finalized
    expire_at       INTEGER NOT NULL     -- unix ms
);

CREATE INDEX idx_uploads_created_by_user ON uploads(created_by_user);
CREATE INDEX idx_uploads_expire_at ON uploads(expire_at);
"#,
];
