use crate::{error::StorageError, models::VoteTally};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

pub const VOTES_FILE: &str = "votes.json";

/// Upvote counts, persisted as one JSON object that is rewritten whole on
/// every vote. Mutations are serialized through `writer` so two concurrent
/// votes cannot overwrite each other's increment.
pub struct VoteLedger {
    path: PathBuf,
    writer: Mutex<()>,
}

impl VoteLedger {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            path: root.as_ref().join(VOTES_FILE),
            writer: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing or unparseable ledger files load as an empty tally.
    pub async fn load(&self) -> Result<VoteTally, StorageError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(VoteTally::new()),
            Err(e) => return Err(StorageError::io(&self.path, e)),
        };

        match serde_json::from_slice(&bytes) {
            Ok(tally) => Ok(tally),
            Err(e) => {
                tracing::warn!("Ignoring unreadable votes file {}: {}", self.path.display(), e);
                Ok(VoteTally::new())
            }
        }
    }

    pub async fn save(&self, tally: &VoteTally) -> Result<(), StorageError> {
        let _guard = self.writer.lock().await;
        self.persist(tally).await
    }

    /// Increments `feature_id` and returns its new count.
    pub async fn vote(&self, feature_id: &str) -> Result<u64, StorageError> {
        let _guard = self.writer.lock().await;

        let mut tally = self.load().await?;
        let count = tally.entry(feature_id.to_string()).or_insert(0);
        *count += 1;
        let upvotes = *count;

        self.persist(&tally).await?;

        tracing::info!("Feature {} upvoted. Total votes: {}", feature_id, upvotes);
        Ok(upvotes)
    }

    pub async fn get_all(&self) -> Result<VoteTally, StorageError> {
        self.load().await
    }

    // Write-then-rename so readers never see a truncated ledger.
    async fn persist(&self, tally: &VoteTally) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec(tally)?;
        let tmp = self.path.with_extension("json.tmp");

        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|e| StorageError::io(&tmp, e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| StorageError::io(&self.path, e))?;

        Ok(())
    }
}
