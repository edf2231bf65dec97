use anyhow::Context;
use chrono::{DateTime, Utc};
use sqlx::any::{AnyKind, AnyPoolOptions};
use sqlx::AnyPool;

use crate::models::Paste;

const SQLITE_SCHEMA: &str = "CREATE TABLE IF NOT EXISTS pastes (
    id TEXT PRIMARY KEY NOT NULL CHECK (length(id) = 6),
    content TEXT NOT NULL,
    created_at TIMESTAMP NOT NULL,
    expires_at TIMESTAMP NOT NULL
)";

#[cfg(feature = "postgres")]
const POSTGRES_SCHEMA: &str = "CREATE TABLE IF NOT EXISTS pastes (
    id TEXT PRIMARY KEY CHECK (length(id) = 6),
    content TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL,
    expires_at TIMESTAMPTZ NOT NULL
)";

#[derive(Clone)]
pub struct Database {
    pool: AnyPool,
}

impl Database {
    /// Connect to a database by URL.
    pub async fn connect(url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let pool = AnyPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .context("failed to connect to database")?;
        Ok(Self { pool })
    }

    /// A private in-memory SQLite database. Kept on a single connection so
    /// every query sees the same data.
    #[cfg(test)]
    pub async fn in_memory() -> Self {
        let pool = AnyPoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        Self { pool }
    }

    /// A named shared-cache in-memory SQLite database reachable from
    /// several pooled connections at once.
    #[cfg(test)]
    pub async fn in_memory_shared(max_connections: u32) -> Self {
        use std::sync::atomic::{AtomicUsize, Ordering};

        static NEXT: AtomicUsize = AtomicUsize::new(0);
        let name = format!(
            "pastelet-test-{}-{}",
            std::process::id(),
            NEXT.fetch_add(1, Ordering::Relaxed)
        );

        let pool = AnyPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect(&format!("sqlite:file:{name}?mode=memory&cache=shared"))
            .await
            .unwrap();
        Self { pool }
    }

    /// Run a raw statement, for tests that tamper with the schema.
    #[cfg(test)]
    pub async fn execute(&self, sql: &str) {
        sqlx::query(sql).execute(&self.pool).await.unwrap();
    }

    /// Create the `pastes` table if it does not exist yet.
    pub async fn migrate(&self) -> crate::AppResult<()> {
        let mut conn = self.pool.acquire().await?;
        sqlx::query(schema(self.pool.any_kind()))
            .execute(&mut conn)
            .await?;
        Ok(())
    }

    /// Get a paste by id.
    pub async fn get_paste(&self, id: &str) -> crate::AppResult<Paste> {
        let mut conn = self.pool.acquire().await?;
        let paste = sqlx::query_as::<_, Paste>(
            "SELECT id, content, created_at, expires_at FROM pastes WHERE id = $1",
        )
        .bind(id)
        .fetch_one(&mut conn)
        .await?;
        Ok(paste)
    }

    /// Get the id and expiry of every stored paste.
    pub async fn get_all_expirations(&self) -> crate::AppResult<Vec<(String, DateTime<Utc>)>> {
        let mut conn = self.pool.acquire().await?;
        Ok(
            sqlx::query_as::<_, (String, DateTime<Utc>)>("SELECT id, expires_at FROM pastes")
                .fetch_all(&mut conn)
                .await?,
        )
    }

    /// Insert a paste.
    pub async fn insert_paste(&self, paste: &Paste) -> crate::AppResult<()> {
        let mut conn = self.pool.acquire().await?;
        sqlx::query(
            "INSERT INTO pastes (id, content, created_at, expires_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(&paste.id)
        .bind(&paste.content)
        .bind(paste.created_at)
        .bind(paste.expires_at)
        .execute(&mut conn)
        .await?;
        Ok(())
    }

    /// Delete a paste by id. Deleting a missing paste is not an error.
    pub async fn delete_paste(&self, id: &str) -> crate::AppResult<()> {
        let mut conn = self.pool.acquire().await?;
        sqlx::query("DELETE FROM pastes WHERE id = $1")
            .bind(id)
            .execute(&mut conn)
            .await?;
        Ok(())
    }
}

fn schema(kind: AnyKind) -> &'static str {
    match kind {
        #[cfg(feature = "postgres")]
        AnyKind::Postgres => POSTGRES_SCHEMA,
        #[allow(unreachable_patterns)]
        _ => SQLITE_SCHEMA,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::AppError;

    async fn database() -> Database {
        let database = Database::in_memory().await;
        database.migrate().await.unwrap();
        database
    }

    fn sample(id: &str) -> Paste {
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 8, 30, 15).unwrap();
        Paste::new(id.into(), "some text".into(), now)
    }

    #[tokio::test]
    async fn migrate_is_idempotent() {
        let database = database().await;
        database.migrate().await.unwrap();
    }

    #[tokio::test]
    async fn insert_then_get() {
        let database = database().await;
        let paste = sample("abc123");
        database.insert_paste(&paste).await.unwrap();

        let stored = database.get_paste("abc123").await.unwrap();
        assert_eq!(stored.id, paste.id);
        assert_eq!(stored.content, paste.content);
        assert_eq!(stored.created_at, paste.created_at);
        assert_eq!(stored.expires_at, paste.expires_at);
        assert_eq!(stored.expires_at - stored.created_at, Duration::hours(24));
    }

    #[tokio::test]
    async fn missing_paste_is_not_found() {
        let database = database().await;
        let err = database.get_paste("zzzzzz").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }

    #[tokio::test]
    async fn duplicate_id_is_database_error() {
        let database = database().await;
        database.insert_paste(&sample("dup000")).await.unwrap();
        let err = database.insert_paste(&sample("dup000")).await.unwrap_err();
        assert!(matches!(err, AppError::Database { .. }));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let database = database().await;
        database.insert_paste(&sample("gone00")).await.unwrap();
        database.delete_paste("gone00").await.unwrap();
        database.delete_paste("gone00").await.unwrap();
        assert!(matches!(
            database.get_paste("gone00").await,
            Err(AppError::NotFound)
        ));
    }

    #[tokio::test]
    async fn id_length_is_enforced() {
        let database = database().await;
        let err = database.insert_paste(&sample("toolong")).await.unwrap_err();
        assert!(matches!(err, AppError::Database { .. }));
        let err = database.insert_paste(&sample("short")).await.unwrap_err();
        assert!(matches!(err, AppError::Database { .. }));
    }

    #[tokio::test]
    async fn shared_memory_database_is_visible_to_all_connections() {
        let database = Database::in_memory_shared(4).await;
        database.migrate().await.unwrap();
        database.insert_paste(&sample("share1")).await.unwrap();

        let (a, b, c) = tokio::join!(
            database.get_paste("share1"),
            database.get_paste("share1"),
            database.get_paste("share1"),
        );
        assert_eq!(a.unwrap().content, "some text");
        assert_eq!(b.unwrap().content, "some text");
        assert_eq!(c.unwrap().content, "some text");
    }

    #[tokio::test]
    async fn lists_expirations() {
        let database = database().await;
        let a = sample("aaaaaa");
        let b = sample("bbbbbb");
        database.insert_paste(&a).await.unwrap();
        database.insert_paste(&b).await.unwrap();

        let mut expirations = database.get_all_expirations().await.unwrap();
        expirations.sort();
        assert_eq!(
            expirations,
            vec![("aaaaaa".into(), a.expires_at), ("bbbbbb".into(), b.expires_at)]
        );
    }
}
