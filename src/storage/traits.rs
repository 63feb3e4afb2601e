//! Storage Trait Definitions
//!
//! Abstract storage for resumable deposits. A record exists only for a
//! deposit whose registration succeeded and whose flow failed at a step
//! that can be retried with the same deposit ID.

use async_trait::async_trait;
use thiserror::Error;

use crate::types::deposit::DepositId;
use crate::types::flow::ResumePoint;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Connection error: {0}")]
    Connection(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Resumable deposit storage interface
///
/// Implementations:
/// - `SqliteResumeStore` - Survives process restarts
/// - `MemoryResumeStore` - In-memory storage for testing
#[async_trait]
pub trait ResumeStore: Send + Sync {
    /// Insert or replace the resume point for `point.deposit_id`
    async fn save(&self, point: &ResumePoint) -> StorageResult<()>;

    /// Get the resume point for a deposit
    async fn get(&self, deposit_id: &DepositId) -> StorageResult<Option<ResumePoint>>;

    /// Forget a deposit; returns whether a record existed
    async fn remove(&self, deposit_id: &DepositId) -> StorageResult<bool>;

    /// All resume points, oldest first
    async fn list(&self) -> StorageResult<Vec<ResumePoint>>;
}
