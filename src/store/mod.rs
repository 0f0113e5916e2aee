//! In-memory result store shared by the aggregator and the HTTP surface.
//!
//! The store is the only owner of the CheckResult collection. Every
//! operation takes the lock once, so a `drain` never splits an `append`.

pub mod aggregator;

pub use aggregator::spawn_aggregator;

use crate::check::CheckResult;
use crate::error::QueryError;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct ResultStore {
    results: Arc<RwLock<Vec<CheckResult>>>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn append(&self, result: CheckResult) {
        let mut results = self.results.write().await;
        debug!(
            "Storing result '{}' ({}) retval={}",
            result.config_label, result.command, result.retval
        );
        results.push(result);
    }

    /// Append a batch under a single lock acquisition.
    pub async fn extend(&self, batch: Vec<CheckResult>) {
        if batch.is_empty() {
            return;
        }
        self.results.write().await.extend(batch);
    }

    /// Snapshot of every stored result, in insertion order.
    pub async fn list(&self) -> Vec<CheckResult> {
        self.results.read().await.clone()
    }

    /// Take every stored result, leaving the store empty.
    pub async fn drain(&self) -> Vec<CheckResult> {
        std::mem::take(&mut *self.results.write().await)
    }

    /// Stored results whose label is exactly `label`, in insertion order.
    pub async fn query(&self, label: &str) -> Result<Vec<CheckResult>, QueryError> {
        if label.is_empty() {
            return Err(QueryError::MissingService);
        }
        Ok(self
            .results
            .read()
            .await
            .iter()
            .filter(|r| r.config_label == label)
            .cloned()
            .collect())
    }

    pub async fn len(&self) -> usize {
        self.results.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.results.read().await.is_empty()
    }
}
