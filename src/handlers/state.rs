use crate::services::{RecordStore, VoteLedger};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RecordStore>,
    pub ledger: Arc<VoteLedger>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(storage_dir: impl AsRef<Path>) -> Self {
        let storage_dir = storage_dir.as_ref();
        Self {
            store: Arc::new(RecordStore::new(storage_dir)),
            ledger: Arc::new(VoteLedger::new(storage_dir)),
            started_at: Instant::now(),
        }
    }
}
