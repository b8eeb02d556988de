// src/common/migrations.rs
//! Database schema management

use sqlx::SqlitePool;
use tracing::info;

/// Create the schema idempotently at startup.
///
/// One table. `provider_id` is the external identity id (the Google `sub`
/// for Google accounts, the username itself for password accounts) and is
/// never updated after insert. Uniqueness of both `provider_id` and
/// `username` is enforced here so concurrent sign-ups cannot produce
/// duplicate rows.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            provider TEXT NOT NULL DEFAULT 'google',
            provider_id TEXT NOT NULL UNIQUE,
            username TEXT NOT NULL UNIQUE,
            password_hash TEXT,
            onboarding TEXT,
            created_at TEXT DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_username ON users(username)")
        .execute(pool)
        .await?;

    info!("Database migration completed");

    Ok(())
}
