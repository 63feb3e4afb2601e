//! SQLite Persistent Storage for Resumable Deposits
//!
//! Keeps resume points across restarts so a deposit that failed after
//! registration can be retried later without registering it again.
//! Uses connection pooling via r2d2.

use async_trait::async_trait;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension};
use std::path::Path;

use super::traits::{ResumeStore, StorageError, StorageResult};
use crate::types::deposit::{DepositId, DepositIntent};
use crate::types::flow::{FlowStep, ResumePoint};

/// SQLite-backed resume store with connection pooling
pub struct SqliteResumeStore {
    pool: Pool<SqliteConnectionManager>,
}

impl SqliteResumeStore {
    /// Open (or create) the store at `db_path` and run migrations
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self, StorageError> {
        if let Some(parent) = db_path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| StorageError::Connection(e.to_string()))?;
            }
        }

        let manager = SqliteConnectionManager::file(db_path);
        let pool = Pool::builder()
            .max_size(4)
            .build(manager)
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let store = Self { pool };
        store.run_migrations()?;

        Ok(store)
    }

    /// Create an in-memory store (for testing)
    pub fn in_memory() -> Result<Self, StorageError> {
        let manager = SqliteConnectionManager::memory();
        // Each in-memory connection is its own database
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let store = Self { pool };
        store.run_migrations()?;

        Ok(store)
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, StorageError> {
        self.pool
            .get()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }

    fn run_migrations(&self) -> Result<(), StorageError> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS resume_points (
                deposit_id TEXT PRIMARY KEY,
                step TEXT NOT NULL,
                intent TEXT NOT NULL,
                message TEXT NOT NULL,
                recorded_at INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_resume_points_recorded_at
                ON resume_points(recorded_at);
            "#,
        )
        .map_err(|e| StorageError::Database(e.to_string()))?;

        Ok(())
    }

    /// Raw column values of one row, decoded after the query returns
    fn row_to_columns(row: &rusqlite::Row) -> rusqlite::Result<RawRow> {
        Ok(RawRow {
            deposit_id: row.get("deposit_id")?,
            step: row.get("step")?,
            intent: row.get("intent")?,
            message: row.get("message")?,
            recorded_at: row.get("recorded_at")?,
        })
    }

    fn save_sync(&self, point: &ResumePoint) -> Result<(), StorageError> {
        let intent = serde_json::to_string(&point.intent)
            .map_err(|e| StorageError::InvalidData(e.to_string()))?;

        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO resume_points (deposit_id, step, intent, message, recorded_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(deposit_id) DO UPDATE SET
                step = excluded.step,
                intent = excluded.intent,
                message = excluded.message,
                recorded_at = excluded.recorded_at
            "#,
            params![
                point.deposit_id.as_str(),
                point.step.to_string(),
                intent,
                point.message,
                point.recorded_at as i64,
            ],
        )
        .map_err(|e| StorageError::Database(e.to_string()))?;

        Ok(())
    }

    fn get_sync(&self, deposit_id: &DepositId) -> Result<Option<ResumePoint>, StorageError> {
        let conn = self.conn()?;

        let raw = conn
            .query_row(
                "SELECT * FROM resume_points WHERE deposit_id = ?1",
                params![deposit_id.as_str()],
                Self::row_to_columns,
            )
            .optional()
            .map_err(|e| StorageError::Database(e.to_string()))?;

        raw.map(RawRow::into_point).transpose()
    }

    fn remove_sync(&self, deposit_id: &DepositId) -> Result<bool, StorageError> {
        let conn = self.conn()?;

        let rows_affected = conn
            .execute(
                "DELETE FROM resume_points WHERE deposit_id = ?1",
                params![deposit_id.as_str()],
            )
            .map_err(|e| StorageError::Database(e.to_string()))?;

        Ok(rows_affected > 0)
    }

    fn list_sync(&self) -> Result<Vec<ResumePoint>, StorageError> {
        let conn = self.conn()?;

        let mut stmt = conn
            .prepare("SELECT * FROM resume_points ORDER BY recorded_at ASC, deposit_id ASC")
            .map_err(|e| StorageError::Database(e.to_string()))?;

        let rows = stmt
            .query_map([], Self::row_to_columns)
            .map_err(|e| StorageError::Database(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StorageError::Database(e.to_string()))?;

        rows.into_iter().map(RawRow::into_point).collect()
    }
}

struct RawRow {
    deposit_id: String,
    step: String,
    intent: String,
    message: String,
    recorded_at: i64,
}

impl RawRow {
    fn into_point(self) -> Result<ResumePoint, StorageError> {
        let step: FlowStep = self.step.parse().map_err(StorageError::InvalidData)?;
        let intent: DepositIntent = serde_json::from_str(&self.intent)
            .map_err(|e| StorageError::InvalidData(format!("intent: {}", e)))?;

        Ok(ResumePoint {
            deposit_id: DepositId::new(self.deposit_id),
            step,
            intent,
            message: self.message,
            recorded_at: self.recorded_at as u64,
        })
    }
}

#[async_trait]
impl ResumeStore for SqliteResumeStore {
    async fn save(&self, point: &ResumePoint) -> StorageResult<()> {
        self.save_sync(point)
    }

    async fn get(&self, deposit_id: &DepositId) -> StorageResult<Option<ResumePoint>> {
        self.get_sync(deposit_id)
    }

    async fn remove(&self, deposit_id: &DepositId) -> StorageResult<bool> {
        self.remove_sync(deposit_id)
    }

    async fn list(&self) -> StorageResult<Vec<ResumePoint>> {
        self.list_sync()
    }
}
