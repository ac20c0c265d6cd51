// Copyright 2026 Duraq Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! In-process backend: a double-ended queue behind a single mutex.
//!
//! One lock per instance guards every primitive operation for its full
//! duration, and also guards the whole snapshot save (serialize + compress
//! + encrypt + write). Saves therefore see a consistent snapshot at the
//! cost of delaying concurrent pushes and pops for O(n) of the queue size.

use std::{
    collections::VecDeque,
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard, PoisonError},
};

use snafu::{ResultExt, ensure};
use tracing::debug;

use crate::{
    Result,
    backend::Backend,
    codec,
    crypto::EncryptionContext,
    error::{CapacityExceededSnafu, SnapshotIoSnafu},
};

pub struct MemoryBackend {
    items:     Mutex<VecDeque<String>>,
    max_items: Option<usize>,
}

impl MemoryBackend {
    pub(crate) fn new(max_items: Option<usize>) -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
            max_items,
        }
    }

    pub(crate) fn with_items(items: VecDeque<String>, max_items: Option<usize>) -> Self {
        Self {
            items: Mutex::new(items),
            max_items,
        }
    }

    // The guarded state is a deque of owned strings; a panic mid-operation
    // cannot leave it in a broken shape, so a poisoned lock is recovered.
    fn lock(&self) -> MutexGuard<'_, VecDeque<String>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Write a snapshot of the current contents to `path`.
    ///
    /// The queue lock is held for the entire encode + write sequence. The
    /// blob is staged in a sibling file named `<file_name>.tmp` and renamed
    /// over the target, so a crash mid-write leaves the previous snapshot
    /// intact. Appending the suffix (rather than swapping the extension)
    /// keeps staging files distinct for snapshot paths that share a stem,
    /// like `a.db` and `a.log`.
    pub(crate) fn persist(&self, path: &Path, crypto: Option<&EncryptionContext>) -> Result<()> {
        let items = self.lock();
        let blob = codec::encode(&items, crypto)?;

        let tmp = staging_path(path);
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&tmp)
            .context(SnapshotIoSnafu { path })?;
        file.write_all(&blob).context(SnapshotIoSnafu { path })?;
        file.sync_all().context(SnapshotIoSnafu { path })?;
        fs::rename(&tmp, path).context(SnapshotIoSnafu { path })?;

        debug!(count = items.len(), path = ?path, "snapshot written");
        Ok(())
    }

    /// Read a snapshot file back into an ordered item list.
    pub(crate) fn load(path: &Path, crypto: Option<&EncryptionContext>) -> Result<VecDeque<String>> {
        let blob = fs::read(path).context(SnapshotIoSnafu { path })?;
        codec::decode(&blob, crypto)
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}

impl Backend for MemoryBackend {
    fn push(&self, item: String) -> Result<()> {
        let mut items = self.lock();
        if let Some(limit) = self.max_items {
            ensure!(items.len() < limit, CapacityExceededSnafu { limit });
        }
        items.push_back(item);
        Ok(())
    }

    fn pop(&self) -> Result<Option<String>> { Ok(self.lock().pop_front()) }

    fn len(&self) -> Result<usize> { Ok(self.lock().len()) }

    fn snapshot(&self) -> Result<Vec<String>> { Ok(self.lock().iter().cloned().collect()) }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;
    use test_case::test_case;

    use super::*;
    use crate::QueueError;

    #[test]
    fn test_fifo_order() {
        let backend = MemoryBackend::new(None);
        for i in 0..10 {
            backend.push(format!("item-{i}")).unwrap();
        }
        for i in 0..10 {
            assert_eq!(backend.pop().unwrap().unwrap(), format!("item-{i}"));
        }
    }

    #[test]
    fn test_pop_empty_returns_none() {
        let backend = MemoryBackend::new(None);
        assert_eq!(backend.pop().unwrap(), None);
        assert_eq!(backend.len().unwrap(), 0);
    }

    #[test_case(1 ; "limit of one")]
    #[test_case(5 ; "limit of five")]
    fn test_capacity_enforced(limit: usize) {
        let backend = MemoryBackend::new(Some(limit));
        for i in 0..limit {
            backend.push(format!("item-{i}")).unwrap();
        }

        let err = backend.push("overflow".to_string()).unwrap_err();
        assert!(matches!(err, QueueError::CapacityExceeded { limit: l, .. } if l == limit));

        // Popping frees a slot.
        backend.pop().unwrap().unwrap();
        backend.push("replacement".to_string()).unwrap();
    }

    #[test]
    fn test_pop_batch_stops_at_empty() {
        let backend = MemoryBackend::new(None);
        backend
            .push_batch(vec!["a".to_string(), "b".to_string()])
            .unwrap();

        let items = backend.pop_batch(5).unwrap();
        assert_eq!(items, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(backend.pop_batch(3).unwrap(), Vec::<String>::new());
    }

    #[test]
    fn test_snapshot_keeps_order_and_contents() {
        let backend = MemoryBackend::new(None);
        backend
            .push_batch(vec!["x".to_string(), "y".to_string(), "z".to_string()])
            .unwrap();

        assert_eq!(
            backend.snapshot().unwrap(),
            vec!["x".to_string(), "y".to_string(), "z".to_string()]
        );
        // Snapshot does not consume.
        assert_eq!(backend.len().unwrap(), 3);
    }

    #[test]
    fn test_persist_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("queue.db");

        let backend = MemoryBackend::new(None);
        backend
            .push_batch(vec!["a".to_string(), "b".to_string()])
            .unwrap();
        backend.persist(&path, None).unwrap();

        let items = MemoryBackend::load(&path, None).unwrap();
        assert_eq!(items, VecDeque::from(["a".to_string(), "b".to_string()]));
    }

    #[test]
    fn test_persist_overwrites_previous_snapshot() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("queue.db");

        let backend = MemoryBackend::new(None);
        backend.push("stale".to_string()).unwrap();
        backend.persist(&path, None).unwrap();

        backend.pop().unwrap();
        backend.push("fresh".to_string()).unwrap();
        backend.persist(&path, None).unwrap();

        let items = MemoryBackend::load(&path, None).unwrap();
        assert_eq!(items, VecDeque::from(["fresh".to_string()]));
    }

    #[test]
    fn test_staging_path_keeps_full_file_name() {
        assert_eq!(
            staging_path(Path::new("/data/a.db")),
            PathBuf::from("/data/a.db.tmp")
        );
        assert_eq!(
            staging_path(Path::new("/data/a.log")),
            PathBuf::from("/data/a.log.tmp")
        );
        assert_eq!(staging_path(Path::new("queue")), PathBuf::from("queue.tmp"));
    }

    #[test]
    fn test_concurrent_persist_to_same_stem_paths() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("a.db");
        let log_path = temp_dir.path().join("a.log");

        let db_backend = MemoryBackend::new(None);
        db_backend.push("db-item".to_string()).unwrap();
        let log_backend = MemoryBackend::new(None);
        log_backend.push("log-item".to_string()).unwrap();

        // Same stem, different extensions: the staging files must not
        // collide, or one writer renames the other's staged bytes away.
        std::thread::scope(|scope| {
            scope.spawn(|| {
                for _ in 0..500 {
                    db_backend.persist(&db_path, None).unwrap();
                }
            });
            scope.spawn(|| {
                for _ in 0..500 {
                    log_backend.persist(&log_path, None).unwrap();
                }
            });
        });

        assert_eq!(
            MemoryBackend::load(&db_path, None).unwrap(),
            VecDeque::from(["db-item".to_string()])
        );
        assert_eq!(
            MemoryBackend::load(&log_path, None).unwrap(),
            VecDeque::from(["log-item".to_string()])
        );
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nope.db");

        let err = MemoryBackend::load(&path, None).unwrap_err();
        assert!(matches!(err, QueueError::SnapshotIo { .. }));
    }
}
