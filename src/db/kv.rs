//! Key/value persistence on top of the `kv` table.

use crate::db::log::ttlog_quiet;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use chrono::Utc;
use rusqlite::{OptionalExtension, params};

/// Durable string store.
///
/// Reads after writes within one process observe the written value.
/// `set_many` commits all entries or none.
pub trait KvStore {
    fn get(&self, key: &str) -> AppResult<Option<String>>;

    fn set_many(&self, entries: &[(String, String)]) -> AppResult<()>;

    fn remove(&self, key: &str) -> AppResult<()>;

    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        self.set_many(&[(key.to_string(), value.to_string())])
    }

    /// Append a line to the internal audit log, if the store keeps one.
    fn audit(&self, _operation: &str, _target: &str, _message: &str) {}
}

/// SQLite-backed [`KvStore`].
pub struct SqliteKv {
    pool: DbPool,
}

impl SqliteKv {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Keys starting with `prefix`, sorted.
    pub fn keys_with_prefix(&self, prefix: &str) -> AppResult<Vec<String>> {
        let mut stmt = self
            .pool
            .conn
            .prepare_cached("SELECT key FROM kv WHERE substr(key, 1, ?2) = ?1 ORDER BY key")?;
        let rows = stmt.query_map(params![prefix, prefix.chars().count() as i64], |row| {
            row.get::<_, String>(0)
        })?;

        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }
}

impl KvStore for SqliteKv {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        let mut stmt = self
            .pool
            .conn
            .prepare_cached("SELECT value FROM kv WHERE key = ?1")?;
        let value = stmt
            .query_row([key], |row| row.get::<_, String>(0))
            .optional()?;
        Ok(value)
    }

    fn set_many(&self, entries: &[(String, String)]) -> AppResult<()> {
        let now = Utc::now().to_rfc3339();
        let tx = self.pool.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            )?;
            for (key, value) in entries {
                stmt.execute(params![key, value, now])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn remove(&self, key: &str) -> AppResult<()> {
        self.pool
            .conn
            .execute("DELETE FROM kv WHERE key = ?1", [key])?;
        Ok(())
    }

    fn audit(&self, operation: &str, target: &str, message: &str) {
        ttlog_quiet(&self.pool.conn, operation, target, message);
    }
}
