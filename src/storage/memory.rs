//! In-Memory Storage Implementation
//!
//! Data is lost when the process exits.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::traits::{ResumeStore, StorageResult};
use crate::types::deposit::DepositId;
use crate::types::flow::ResumePoint;

/// In-memory resume store
///
/// Cloning shares the underlying map.
#[derive(Clone, Default)]
pub struct MemoryResumeStore {
    points: Arc<RwLock<HashMap<DepositId, ResumePoint>>>,
}

impl MemoryResumeStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored resume points
    pub async fn len(&self) -> usize {
        self.points.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.points.read().await.is_empty()
    }
}

#[async_trait]
impl ResumeStore for MemoryResumeStore {
    async fn save(&self, point: &ResumePoint) -> StorageResult<()> {
        let mut points = self.points.write().await;
        points.insert(point.deposit_id.clone(), point.clone());
        Ok(())
    }

    async fn get(&self, deposit_id: &DepositId) -> StorageResult<Option<ResumePoint>> {
        let points = self.points.read().await;
        Ok(points.get(deposit_id).cloned())
    }

    async fn remove(&self, deposit_id: &DepositId) -> StorageResult<bool> {
        let mut points = self.points.write().await;
        Ok(points.remove(deposit_id).is_some())
    }

    async fn list(&self) -> StorageResult<Vec<ResumePoint>> {
        let points = self.points.read().await;
        let mut all: Vec<ResumePoint> = points.values().cloned().collect();
        all.sort_by(|a, b| {
            a.recorded_at
                .cmp(&b.recorded_at)
                .then_with(|| a.deposit_id.as_str().cmp(b.deposit_id.as_str()))
        });
        Ok(all)
    }
}
