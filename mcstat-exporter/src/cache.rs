//! Last known server status.
//!
//! A single slot shared by the refresher and the scrape handlers. Records
//! are swapped in whole behind an `Arc`, so the lock is only held for the
//! pointer swap and never across network I/O.

use mcstat_query::StatusRecord;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct StatusCache {
    current: RwLock<Option<Arc<StatusRecord>>>,
}

impl StatusCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest written record, or `None` if nothing was ever acquired.
    pub async fn read(&self) -> Option<Arc<StatusRecord>> {
        self.current.read().await.clone()
    }

    /// Replace the current record. Returns the shared handle to it.
    pub async fn write(&self, record: StatusRecord) -> Arc<StatusRecord> {
        let record = Arc::new(record);
        *self.current.write().await = Some(Arc::clone(&record));
        record
    }
}
