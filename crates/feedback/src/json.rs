//! Durable feedback store persisted as a single JSON document keyed by item id.
//!
//! Every append rewrites the document through a temp file + fsync + rename, so
//! readers of the file never observe a torn write. Writers take an exclusive
//! advisory lock on a sidecar `.lock` file and re-read the document under it,
//! so several stores (or processes) sharing one path never drop each other's
//! signals.

use fd_lock::RwLock;
use parking_lot::Mutex;
use retail_core::{Key, RecoError, RecoResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::record::{FeedbackRecord, FeedbackSignal};
use crate::store::FeedbackStore;

type Records<K> = BTreeMap<K, FeedbackRecord>;

pub struct JsonFeedbackStore<K: Key> {
    path: PathBuf,
    lock_path: PathBuf,
    /// Last document state this store read or wrote. The mutex also
    /// serializes writers within the process.
    records: Mutex<Records<K>>,
}

impl<K> JsonFeedbackStore<K>
where
    K: Key + Serialize + DeserializeOwned,
{
    /// Open the store at `path`. A missing file is an empty store; a file that
    /// cannot be read or parsed is a storage error.
    pub fn open(path: impl AsRef<Path>) -> RecoResult<Self> {
        let path = path.as_ref().to_path_buf();
        let records = read_document(&path)?;
        info!(path = %path.display(), items = records.len(), "Feedback store opened");

        Ok(Self {
            lock_path: path.with_extension("json.lock"),
            path,
            records: Mutex::new(records),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, records: &Records<K>) -> RecoResult<()> {
        let json = serde_json::to_vec_pretty(records)?;
        let tmp = self.path.with_extension("json.tmp");

        let write = || -> std::io::Result<()> {
            let mut file = File::create(&tmp)?;
            file.write_all(&json)?;
            file.sync_all()?;
            fs::rename(&tmp, &self.path)?;
            sync_parent_dir(&self.path)
        };

        write().map_err(|e| {
            let _ = fs::remove_file(&tmp);
            RecoError::Storage(format!("failed to write {}: {e}", self.path.display()))
        })
    }

    /// Re-read the document, append one signal and write it back, all under
    /// the exclusive file lock. Returns the committed document.
    fn append_locked(&self, item: &K, approve: bool) -> RecoResult<Records<K>> {
        let lock_file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&self.lock_path)
            .map_err(|e| {
                RecoError::Storage(format!("failed to open {}: {e}", self.lock_path.display()))
            })?;
        let mut lock = RwLock::new(lock_file);
        let _guard = lock.write().map_err(|e| {
            RecoError::Storage(format!("failed to lock {}: {e}", self.lock_path.display()))
        })?;

        let mut records = read_document(&self.path)?;
        records
            .entry(item.clone())
            .or_default()
            .push(FeedbackSignal::now(approve));
        self.persist(&records)?;
        Ok(records)
    }
}

fn read_document<K>(path: &Path) -> RecoResult<Records<K>>
where
    K: Key + DeserializeOwned,
{
    if !path.exists() {
        return Ok(BTreeMap::new());
    }
    let bytes = fs::read(path)
        .map_err(|e| RecoError::Storage(format!("failed to read {}: {e}", path.display())))?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(BTreeMap::new());
    }
    serde_json::from_slice(&bytes).map_err(|e| {
        RecoError::Storage(format!("corrupt feedback document {}: {e}", path.display()))
    })
}

// The rename is only durable once the directory entry is flushed.
#[cfg(unix)]
fn sync_parent_dir(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => File::open(dir)?.sync_all(),
        _ => File::open(".")?.sync_all(),
    }
}

#[cfg(not(unix))]
fn sync_parent_dir(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

impl<K> FeedbackStore<K> for JsonFeedbackStore<K>
where
    K: Key + Serialize + DeserializeOwned + Send + Sync,
{
    fn record_feedback(&self, item: &K, approve: bool) -> RecoResult<()> {
        let mut records = self.records.lock();
        match self.append_locked(item, approve) {
            Ok(committed) => *records = committed,
            Err(e) => {
                // Memory keeps the last committed document.
                metrics::counter!("feedback.write.failure").increment(1);
                warn!(item = ?item, error = %e, "Feedback write failed");
                return Err(e);
            }
        }

        metrics::counter!("feedback.recorded").increment(1);
        debug!(item = ?item, approve, "Feedback persisted");
        Ok(())
    }

    /// Reads the document as currently on disk, picking up appends made by
    /// other stores on the same path.
    fn feedback_record(&self, item: &K) -> RecoResult<Option<FeedbackRecord>> {
        let mut records = self.records.lock();
        *records = read_document(&self.path)?;
        Ok(records.get(item).cloned())
    }
}
