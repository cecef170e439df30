//! SQLite-backed key-value persistence.
//!
//! All scopes share one `kv` table keyed by `(scope, key)`. Each write is a
//! single upsert, so a value is never observed half-written, but concurrent
//! read-modify-write cycles from two processes still lose updates.
use crate::backend::{KeyValueStore, Scope};
use async_trait::async_trait;
use curalink_common::{CuralinkError, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use tracing::{debug, info};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS kv (
    scope      TEXT    NOT NULL,
    key        TEXT    NOT NULL,
    value      TEXT    NOT NULL,
    updated_at INTEGER NOT NULL,
    PRIMARY KEY (scope, key)
)
"#;

fn storage_err(e: sqlx::Error) -> CuralinkError {
    CuralinkError::Storage(e.to_string())
}

/// Open (creating if needed) the database at `url` and ensure the schema.
///
/// The pool holds a single connection: the client is a single logical user,
/// and `sqlite::memory:` databases only exist per connection.
pub async fn open_pool(url: &str) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(url)
        .map_err(storage_err)?
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .map_err(storage_err)?;

    sqlx::query(SCHEMA)
        .execute(&pool)
        .await
        .map_err(storage_err)?;

    info!(url = %redact_url(url), "store.sqlite.opened");
    Ok(pool)
}

fn redact_url(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}

#[derive(Clone, Debug)]
pub struct SqliteStore {
    pool: SqlitePool,
    scope: Scope,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool, scope: Scope) -> Self {
        Self { pool, scope }
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT value FROM kv WHERE scope = ?1 AND key = ?2")
            .bind(self.scope.as_str())
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?;

        let value = match row {
            Some(r) => Some(r.try_get::<String, _>("value").map_err(storage_err)?),
            None => None,
        };
        debug!(scope = %self.scope, key, hit = value.is_some(), "store.sqlite.get");
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let res = sqlx::query(
            r#"
            INSERT INTO kv (scope, key, value, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT (scope, key)
            DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(self.scope.as_str())
        .bind(key)
        .bind(value)
        .bind(chrono::Utc::now().timestamp_millis())
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        debug!(
            scope = %self.scope,
            key,
            rows = res.rows_affected(),
            bytes = value.len(),
            "store.sqlite.set"
        );
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM kv WHERE scope = ?1 AND key = ?2")
            .bind(self.scope.as_str())
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let res = sqlx::query("DELETE FROM kv WHERE scope = ?1")
            .bind(self.scope.as_str())
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;
        info!(scope = %self.scope, rows = res.rows_affected(), "store.sqlite.clear");
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}
