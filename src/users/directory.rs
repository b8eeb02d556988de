//! Single-table user store keyed by external identity id
//!
//! Uniqueness of the external id and the display handle is enforced by the
//! storage engine, not by check-then-insert, so two concurrent sign-ups
//! with the same external id always end with exactly one row.

use sqlx::SqlitePool;
use tracing::{debug, info};

use super::models::User;

/// Errors surfaced by the user directory.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    /// Unique constraint hit on the external id or the display handle.
    #[error("user already exists")]
    Conflict,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Clone)]
pub struct UserDirectory {
    db: SqlitePool,
}

impl UserDirectory {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Inserts a new account. Sign-up semantics: an already-known external
    /// id or display handle is a distinct [`DirectoryError::Conflict`].
    pub async fn create(
        &self,
        provider: &str,
        provider_id: &str,
        username: &str,
        password_hash: Option<&str>,
    ) -> Result<i64, DirectoryError> {
        let result = sqlx::query(
            "INSERT INTO users (provider, provider_id, username, password_hash) VALUES (?, ?, ?, ?)",
        )
        .bind(provider)
        .bind(provider_id)
        .bind(username)
        .bind(password_hash)
        .execute(&self.db)
        .await
        .map_err(map_insert_error)?;

        Ok(result.last_insert_rowid())
    }

    /// Sign-in semantics: returns the existing row when the external id is
    /// known, inserts otherwise. Runs in a single transaction; losing an
    /// insert race to a concurrent sign-in resolves by re-reading the
    /// winner's row.
    pub async fn upsert_on_signin(
        &self,
        provider: &str,
        provider_id: &str,
        username: &str,
    ) -> Result<(i64, bool), DirectoryError> {
        let mut tx = self.db.begin().await.map_err(DirectoryError::Database)?;

        let existing: Option<(i64,)> = sqlx::query_as("SELECT id FROM users WHERE provider_id = ?")
            .bind(provider_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(DirectoryError::Database)?;

        if let Some((id,)) = existing {
            tx.commit().await.map_err(DirectoryError::Database)?;
            debug!(user_id = id, "sign-in matched existing user");
            return Ok((id, true));
        }

        let inserted = sqlx::query("INSERT INTO users (provider, provider_id, username) VALUES (?, ?, ?)")
            .bind(provider)
            .bind(provider_id)
            .bind(username)
            .execute(&mut *tx)
            .await;

        match inserted {
            Ok(result) => {
                let id = result.last_insert_rowid();
                tx.commit().await.map_err(DirectoryError::Database)?;
                info!(user_id = id, "created user on first sign-in");
                Ok((id, false))
            }
            Err(e) if is_unique_violation(&e) => {
                // Lost the race. If the winner holds our external id this is
                // a normal sign-in; if only the display handle collided the
                // account belongs to someone else.
                tx.rollback().await.map_err(DirectoryError::Database)?;
                let winner: Option<(i64,)> =
                    sqlx::query_as("SELECT id FROM users WHERE provider_id = ?")
                        .bind(provider_id)
                        .fetch_optional(&self.db)
                        .await
                        .map_err(DirectoryError::Database)?;
                match winner {
                    Some((id,)) => Ok((id, true)),
                    None => Err(DirectoryError::Conflict),
                }
            }
            Err(e) => Err(DirectoryError::Database(e)),
        }
    }

    pub async fn find_by_provider_id(
        &self,
        provider_id: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE provider_id = ?")
            .bind(provider_id)
            .fetch_optional(&self.db)
            .await
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.db)
            .await
    }

    /// Writes the serialized onboarding payload to the row matching the
    /// external id. Returns `false` when no row matches, so the caller can
    /// surface the miss instead of silently losing the write.
    pub async fn save_onboarding(
        &self,
        provider_id: &str,
        payload: &serde_json::Value,
    ) -> Result<bool, sqlx::Error> {
        let json = payload.to_string();
        let result = sqlx::query("UPDATE users SET onboarding = ? WHERE provider_id = ?")
            .bind(&json)
            .bind(provider_id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

fn map_insert_error(e: sqlx::Error) -> DirectoryError {
    if is_unique_violation(&e) {
        DirectoryError::Conflict
    } else {
        DirectoryError::Database(e)
    }
}
