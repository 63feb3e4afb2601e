//! Storage Layer Module
//!
//! Persistence for deposits that can be resumed after a failure.
//!
//! This module contains:
//! - Storage trait definitions for abstraction
//! - SQLite implementation for the CLI
//! - In-memory implementation for testing

pub mod memory;
pub mod sqlite;
pub mod traits;

// Re-exports for convenience
pub use memory::MemoryResumeStore;
pub use sqlite::SqliteResumeStore;
pub use traits::{ResumeStore, StorageError, StorageResult};
