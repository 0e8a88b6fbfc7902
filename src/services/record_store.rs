use crate::{error::StorageError, models::PaymentRecord};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Append-only payment logs, one `payments_<key>.txt` file per key.
///
/// Appends to the same key are serialized twice: by an in-process mutex
/// taken from a per-key registry, and by an exclusive advisory lock on the
/// file handle for writers outside this process. Appends to different keys
/// never contend.
pub struct RecordStore {
    root: PathBuf,
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl RecordStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            locks: DashMap::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn log_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("payments_{}.txt", key))
    }

    fn key_lock(&self, key: &str) -> Arc<Mutex<()>> {
        self.locks.entry(key.to_string()).or_default().clone()
    }

    // Drops the registry entry once no append holds or waits on it, so the
    // registry only ever holds keys with an append in flight.
    fn release_key_lock(&self, key: &str) {
        self.locks.remove_if(key, |_, lock| Arc::strong_count(lock) == 1);
    }

    /// Appends one record as a newline-terminated JSON line.
    pub async fn append(&self, record: &PaymentRecord) -> Result<(), StorageError> {
        let path = self.log_path(&record.lnurlp_id);
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');

        let lock = self.key_lock(&record.lnurlp_id);

        let result = tokio::task::spawn_blocking(move || {
            let _guard = lock.lock();
            append_line(&path, &line)
        })
        .await
        .map_err(StorageError::from)
        .and_then(|r| r);

        self.release_key_lock(&record.lnurlp_id);

        match &result {
            Ok(()) => tracing::info!(
                "Saved payment for LNURLP {}: amount {} (sat), comment: '{}'",
                record.lnurlp_id,
                record.amount,
                record.comment
            ),
            Err(e) => tracing::error!("Error saving payment for LNURLP {}: {}", record.lnurlp_id, e),
        }

        result
    }

    /// Returns every record for `key` in append order, or an empty list if
    /// nothing was ever appended. A malformed line fails the whole read.
    pub async fn read_all(&self, key: &str) -> Result<Vec<PaymentRecord>, StorageError> {
        let path = self.log_path(key);
        tokio::task::spawn_blocking(move || read_records(&path)).await?
    }
}

fn append_line(path: &Path, line: &[u8]) -> Result<(), StorageError> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| StorageError::io(path, e))?;

    file.lock().map_err(|e| StorageError::io(path, e))?;

    // Unlock even when the write fails; the write error wins.
    let written = file.write_all(line).and_then(|_| file.flush());
    let unlocked = file.unlock();

    written.map_err(|e| StorageError::io(path, e))?;
    unlocked.map_err(|e| StorageError::io(path, e))?;
    Ok(())
}

fn read_records(path: &Path) -> Result<Vec<PaymentRecord>, StorageError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::info!("No payment file found at {}", path.display());
            return Ok(Vec::new());
        }
        Err(e) => return Err(StorageError::io(path, e)),
    };

    let mut records = Vec::new();
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|e| StorageError::io(path, e))?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line).map_err(|source| StorageError::Corrupt {
            path: path.to_path_buf(),
            line: index + 1,
            source,
        })?;
        records.push(record);
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn store() -> (tempfile::TempDir, Arc<RecordStore>) {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(RecordStore::new(dir.path()));
        (dir, store)
    }

    #[tokio::test]
    async fn test_unknown_key_reads_empty() {
        let (_dir, store) = store();
        let records = store.read_all("nobody").await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_append_preserves_order() {
        let (_dir, store) = store();
        for i in 0..5 {
            store
                .append(&PaymentRecord::new("abc", i, format!("c{}", i)))
                .await
                .unwrap();
        }

        let records = store.read_all("abc").await.unwrap();
        assert_eq!(records.len(), 5);
        for (i, record) in records.iter().enumerate() {
            assert_eq!(record.amount, i as u64);
            assert_eq!(record.comment, format!("c{}", i));
            assert_eq!(record.lnurlp_id, "abc");
        }
    }

    #[tokio::test]
    async fn test_keys_use_separate_logs() {
        let (dir, store) = store();
        store.append(&PaymentRecord::new("a", 1, "")).await.unwrap();
        store.append(&PaymentRecord::new("b", 2, "")).await.unwrap();

        assert!(dir.path().join("payments_a.txt").exists());
        assert!(dir.path().join("payments_b.txt").exists());
        assert_eq!(store.read_all("a").await.unwrap().len(), 1);
        assert_eq!(store.read_all("b").await.unwrap()[0].amount, 2);
    }

    #[tokio::test]
    async fn test_blank_lines_are_skipped() {
        let (_dir, store) = store();
        let path = store.log_path("abc");
        std::fs::write(
            &path,
            "{\"lnurlp_id\":\"abc\",\"amount\":1,\"comment\":\"\"}\n\n   \n{\"lnurlp_id\":\"abc\",\"amount\":2,\"comment\":\"x\"}\n",
        )
        .unwrap();

        let records = store.read_all("abc").await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].comment, "x");
    }

    #[tokio::test]
    async fn test_malformed_line_fails_read() {
        let (_dir, store) = store();
        let path = store.log_path("abc");
        std::fs::write(
            &path,
            "{\"lnurlp_id\":\"abc\",\"amount\":1,\"comment\":\"\"}\nnot json\n",
        )
        .unwrap();

        match store.read_all("abc").await {
            Err(StorageError::Corrupt { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected corrupt log error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_append_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("missing"));
        let result = store.append(&PaymentRecord::new("abc", 1, "")).await;
        assert!(matches!(result, Err(StorageError::Io { .. })));
        assert!(store.locks.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_appends_lose_nothing() {
        let (_dir, store) = store();
        let writers = 64;

        let handles: Vec<_> = (0..writers)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    let comment = format!("writer-{}-{}", i, "x".repeat(512));
                    store
                        .append(&PaymentRecord::new("shared", i, comment))
                        .await
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let records = store.read_all("shared").await.unwrap();
        assert_eq!(records.len(), writers as usize);

        assert!(store.locks.is_empty());

        let amounts: HashSet<u64> = records.iter().map(|r| r.amount).collect();
        assert_eq!(amounts.len(), writers as usize);
        for record in &records {
            assert!(record.comment.starts_with(&format!("writer-{}-", record.amount)));
        }
    }
}
