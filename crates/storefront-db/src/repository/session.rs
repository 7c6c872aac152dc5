//! # Session Repository
//!
//! Persists the bearer token between CLI invocations, together with the
//! last known profile so `whoami` and pricing work without a round trip.
//!
//! The table holds at most one row (`id = 1`). Saving overwrites it.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use storefront_core::User;

/// A session read back from disk.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredSession {
    pub token: String,
    pub user: Option<User>,
    pub saved_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    token: String,
    user_json: Option<String>,
    saved_at: String,
}

/// Repository for the signed-in session.
#[derive(Debug, Clone)]
pub struct SessionRepository {
    pool: SqlitePool,
}

impl SessionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SessionRepository { pool }
    }

    /// Stores the token (and optionally the profile), replacing any prior session.
    pub async fn save(&self, token: &str, user: Option<&User>) -> DbResult<()> {
        let user_json = user.map(serde_json::to_string).transpose()?;
        let saved_at = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO session (id, token, user_json, saved_at)
            VALUES (1, ?, ?, ?)
            ON CONFLICT (id) DO UPDATE SET
                token = excluded.token,
                user_json = excluded.user_json,
                saved_at = excluded.saved_at
            "#,
        )
        .bind(token)
        .bind(user_json)
        .bind(saved_at)
        .execute(&self.pool)
        .await?;

        debug!(has_user = user.is_some(), "Session saved");
        Ok(())
    }

    /// Updates only the cached profile. No-op when nobody is signed in.
    pub async fn update_user(&self, user: &User) -> DbResult<()> {
        let user_json = serde_json::to_string(user)?;

        sqlx::query("UPDATE session SET user_json = ? WHERE id = 1")
            .bind(user_json)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Returns the stored session, if any.
    pub async fn load(&self) -> DbResult<Option<StoredSession>> {
        let row: Option<SessionRow> =
            sqlx::query_as("SELECT token, user_json, saved_at FROM session WHERE id = 1")
                .fetch_optional(&self.pool)
                .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let user = row
            .user_json
            .as_deref()
            .map(serde_json::from_str::<User>)
            .transpose()?;

        let saved_at = DateTime::parse_from_rfc3339(&row.saved_at)
            .map_err(|e| DbError::Corrupt(format!("session.saved_at: {}", e)))?
            .with_timezone(&Utc);

        Ok(Some(StoredSession {
            token: row.token,
            user,
            saved_at,
        }))
    }

    /// Returns just the token.
    pub async fn token(&self) -> DbResult<Option<String>> {
        let token = sqlx::query_scalar("SELECT token FROM session WHERE id = 1")
            .fetch_optional(&self.pool)
            .await?;
        Ok(token)
    }

    /// Removes the session. Clearing when signed out is not an error.
    pub async fn clear(&self) -> DbResult<()> {
        sqlx::query("DELETE FROM session").execute(&self.pool).await?;
        debug!("Session cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig};
    use storefront_core::{Points, Role, User};

    fn user() -> User {
        User {
            id: "u-1".to_string(),
            name: "Asha".to_string(),
            email: "asha@example.in".to_string(),
            phone: None,
            card_holder: true,
            e_points: Points::new(500),
            role: Role::User,
        }
    }

    #[tokio::test]
    async fn test_load_without_session_is_none() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.session().load().await.unwrap().is_none());
        assert!(db.session().token().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_overwrites_previous_session() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.session();

        repo.save("first", None).await.unwrap();
        repo.save("second", Some(&user())).await.unwrap();

        let stored = repo.load().await.unwrap().unwrap();
        assert_eq!(stored.token, "second");
        assert_eq!(stored.user, Some(user()));
    }

    #[tokio::test]
    async fn test_update_user_keeps_token() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.session();
        repo.save("tok", Some(&user())).await.unwrap();

        let mut updated = user();
        updated.e_points = Points::new(130);
        repo.update_user(&updated).await.unwrap();

        let stored = repo.load().await.unwrap().unwrap();
        assert_eq!(stored.token, "tok");
        assert_eq!(stored.user.unwrap().e_points, Points::new(130));
    }

    #[tokio::test]
    async fn test_clear() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.session();
        repo.save("tok", None).await.unwrap();

        repo.clear().await.unwrap();
        repo.clear().await.unwrap();

        assert!(repo.load().await.unwrap().is_none());
    }
}
