//! Tests for the user directory
//!
//! These run against an in-memory sqlite pool with the real migrations, so
//! the uniqueness guarantees come from the same schema the server uses.

#[cfg(test)]
mod tests {
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::SqlitePool;

    use super::super::directory::{DirectoryError, UserDirectory};
    use crate::common::migrations::run_migrations;

    async fn test_directory() -> (SqlitePool, UserDirectory) {
        // a single connection keeps every query on the same in-memory DB
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory pool");
        run_migrations(&pool).await.expect("migrations");
        let directory = UserDirectory::new(pool.clone());
        (pool, directory)
    }

    async fn user_count(pool: &SqlitePool) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await
            .expect("count")
    }

    #[tokio::test]
    async fn signup_creates_exactly_one_row() {
        let (pool, directory) = test_directory().await;

        let id = directory
            .create("google", "g-1", "alice@example.com", None)
            .await
            .expect("create");

        assert!(id > 0);
        assert_eq!(user_count(&pool).await, 1);
    }

    #[tokio::test]
    async fn duplicate_signup_conflicts_and_adds_no_row() {
        let (pool, directory) = test_directory().await;

        directory
            .create("google", "g-1", "alice@example.com", None)
            .await
            .expect("first create");
        let second = directory
            .create("google", "g-1", "alice@example.com", None)
            .await;

        assert!(matches!(second, Err(DirectoryError::Conflict)));
        assert_eq!(user_count(&pool).await, 1);
    }

    #[tokio::test]
    async fn duplicate_username_conflicts() {
        let (_pool, directory) = test_directory().await;

        directory
            .create("google", "g-1", "alice@example.com", None)
            .await
            .expect("first create");
        let second = directory
            .create("google", "g-2", "alice@example.com", None)
            .await;

        assert!(matches!(second, Err(DirectoryError::Conflict)));
    }

    #[tokio::test]
    async fn signin_upsert_returns_same_id_across_calls() {
        let (pool, directory) = test_directory().await;

        let (first_id, existed_first) = directory
            .upsert_on_signin("google", "g-1", "alice@example.com")
            .await
            .expect("first sign-in");
        let (second_id, existed_second) = directory
            .upsert_on_signin("google", "g-1", "alice@example.com")
            .await
            .expect("second sign-in");

        assert!(!existed_first);
        assert!(existed_second);
        assert_eq!(first_id, second_id);
        assert_eq!(user_count(&pool).await, 1);
    }

    #[tokio::test]
    async fn concurrent_signup_yields_exactly_one_success() {
        let (pool, directory) = test_directory().await;

        let (first, second) = tokio::join!(
            directory.create("google", "g-1", "alice@example.com", None),
            directory.create("google", "g-1", "alice@example.com", None),
        );

        let outcomes = [first, second];
        let successes = outcomes.iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1);
        assert!(outcomes
            .iter()
            .any(|r| matches!(r, Err(DirectoryError::Conflict))));
        assert_eq!(user_count(&pool).await, 1);
    }

    #[tokio::test]
    async fn save_onboarding_for_unknown_user_reports_no_match() {
        let (_pool, directory) = test_directory().await;

        let updated = directory
            .save_onboarding("g-unknown", &serde_json::json!([]))
            .await
            .expect("update");

        assert!(!updated);
    }

    #[tokio::test]
    async fn save_onboarding_persists_payload() {
        let (_pool, directory) = test_directory().await;

        directory
            .create("google", "g-1", "alice@example.com", None)
            .await
            .expect("create");

        let payload = serde_json::json!([{"question": "interests", "answer": "math"}]);
        let updated = directory
            .save_onboarding("g-1", &payload)
            .await
            .expect("update");
        assert!(updated);

        let user = directory
            .find_by_provider_id("g-1")
            .await
            .expect("lookup")
            .expect("user exists");
        assert_eq!(user.onboarding, Some(payload.to_string()));
    }

    #[tokio::test]
    async fn find_by_username_returns_password_hash() {
        let (_pool, directory) = test_directory().await;

        directory
            .create("password", "bob", "bob", Some("deadbeef"))
            .await
            .expect("create");

        let user = directory
            .find_by_username("bob")
            .await
            .expect("lookup")
            .expect("user exists");
        assert_eq!(user.provider_id, "bob");
        assert_eq!(user.password_hash.as_deref(), Some("deadbeef"));
    }
}
