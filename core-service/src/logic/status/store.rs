//! Result Store
//!
//! Holds the latest published [`ResultBatch`]. Publishing swaps the whole
//! batch behind an `Arc`; readers get a snapshot of one batch, never a mix of
//! two. Cloning the store clones the handle, not the data.

use std::sync::Arc;

use parking_lot::RwLock;

use super::types::ResultBatch;

#[derive(Debug, Clone, Default)]
pub struct ResultStore {
    latest: Arc<RwLock<Arc<ResultBatch>>>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored batch in full
    pub fn publish(&self, batch: ResultBatch) -> Arc<ResultBatch> {
        let batch = Arc::new(batch);
        *self.latest.write() = Arc::clone(&batch);
        batch
    }

    /// Current batch (empty until the first publish)
    pub fn read(&self) -> Arc<ResultBatch> {
        Arc::clone(&self.latest.read())
    }
}
