//! History shared between concurrent scanners
//!
//! One global lock: writes are one record per scan cycle, and readers that
//! walk every pair (triangles, market making) must see a consistent view.

use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;

use market_core::EngineConfig;

use crate::{HistoryStats, HistoryStore};

#[derive(Debug, Clone)]
pub struct SharedHistory {
    inner: Arc<Mutex<HistoryStore>>,
}

impl SharedHistory {
    pub fn new(store: HistoryStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(HistoryStore::from_config(config))
    }

    /// Hold the lock for a whole record-then-read sequence
    pub fn lock(&self) -> MutexGuard<'_, HistoryStore> {
        self.inner.lock()
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut HistoryStore) -> R) -> R {
        f(&mut self.inner.lock())
    }

    pub fn stats(&self) -> HistoryStats {
        self.inner.lock().stats()
    }
}

impl Default for SharedHistory {
    fn default() -> Self {
        Self::new(HistoryStore::default())
    }
}
