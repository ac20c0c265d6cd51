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

//! Main queue struct and lifecycle management.
//!
//! The [`Queue`] is the central entry point for the library. It manages:
//! - Backend selection at construction (in-process or delegate)
//! - Loading an existing snapshot before accepting calls
//! - The background auto-persist worker
//! - Orderly shutdown with a final flush
//!
//! ## Usage
//!
//! ```ignore
//! let mut queue = QueueBuilder::new()
//!     .save_path("/var/lib/app/queue.db")
//!     .passphrase("secret")
//!     .build()?;
//!
//! queue.push("job-1")?;
//! while let Some(item) = queue.pop()? {
//!     println!("{item}");
//! }
//!
//! // Clean shutdown with a final snapshot. Drop performs the same steps
//! // best-effort, but callers should stop explicitly to observe errors.
//! queue.stop()?;
//! ```

use std::{
    fmt,
    sync::Arc,
    thread::{self, JoinHandle},
    time::Duration,
};

use crossbeam::channel::{Receiver, Sender, bounded, unbounded};
use tracing::{debug, error, info, warn};

use crate::{
    QueueConfig, Result,
    backend::BackendKind,
    builder::QueueBuilder,
    crypto::EncryptionContext,
    delegate::{self, DelegateBackend},
    error::InternalSnafu,
    memory::MemoryBackend,
    persister::PersistWorker,
};

/// How long `stop` waits for the auto-persist worker to acknowledge the
/// stop signal before proceeding with shutdown anyway.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// State shared between the queue handle and the persist worker.
pub(crate) struct Shared {
    pub(crate) config:  QueueConfig,
    pub(crate) crypto:  Option<EncryptionContext>,
    pub(crate) backend: BackendKind,
}

impl Shared {
    /// Write a snapshot when persisting in-process; otherwise a no-op.
    pub(crate) fn write_snapshot(&self) -> Result<()> {
        let (Some(path), Some(memory)) = (self.config.save_path.as_deref(), self.backend.memory())
        else {
            return Ok(());
        };
        memory.persist(path, self.crypto.as_ref())
    }
}

/// A durable, concurrency-safe FIFO queue of text items.
///
/// Thread-safe: all operations take `&self` and may be called from any
/// thread. `pop` on an empty queue returns `None` immediately; the queue is
/// never a blocking work queue.
pub struct Queue {
    shared:  Arc<Shared>,
    stop_tx: Option<Sender<()>>,
    done_rx: Option<Receiver<()>>,
    worker:  Option<JoinHandle<()>>,
    stopped: bool,
}

// Manual impl: inner state holds key material and non-`Debug` backends.
impl fmt::Debug for Queue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Queue")
            .field("stopped", &self.stopped)
            .finish_non_exhaustive()
    }
}

impl Queue {
    /// Create a queue from a resolved configuration.
    ///
    /// Resolves key material, selects the backend, performs the startup
    /// load when an in-process snapshot exists (load failures propagate to
    /// the caller), and starts the auto-persist worker when persisting
    /// in-process.
    pub(crate) fn new(config: QueueConfig) -> Result<Self> {
        let crypto = EncryptionContext::resolve(&config.key)?;

        let backend = if config.use_native_backend {
            match delegate::provider() {
                Some(provider) => {
                    let queue_id = config
                        .save_path
                        .as_deref()
                        .map(|p| p.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    BackendKind::Delegate(DelegateBackend::open(provider, queue_id))
                }
                None => {
                    debug!("delegate backend requested but no provider registered, falling back");
                    Self::open_memory(&config, crypto.as_ref())?
                }
            }
        } else {
            Self::open_memory(&config, crypto.as_ref())?
        };

        let shared = Arc::new(Shared {
            config,
            crypto,
            backend,
        });

        let (stop_tx, done_rx, worker) =
            if shared.config.save_path.is_some() && !shared.backend.is_delegate() {
                let (stop_tx, stop_rx) = unbounded();
                let (done_tx, done_rx) = bounded(1);

                let persist_worker = PersistWorker::new(
                    stop_rx,
                    done_tx,
                    shared.clone(),
                    shared.config.auto_persist_interval,
                );
                let handle = thread::Builder::new()
                    .name("duraq-persist".into())
                    .spawn(move || persist_worker.run())
                    .map_err(|e| {
                        InternalSnafu {
                            message: format!("failed to spawn persist worker: {e}"),
                        }
                        .build()
                    })?;

                (Some(stop_tx), Some(done_rx), Some(handle))
            } else {
                (None, None, None)
            };

        info!(
            backend = if shared.backend.is_delegate() { "delegate" } else { "memory" },
            persisting = shared.config.save_path.is_some(),
            "queue initialized"
        );

        Ok(Self {
            shared,
            stop_tx,
            done_rx,
            worker,
            stopped: false,
        })
    }

    fn open_memory(config: &QueueConfig, crypto: Option<&EncryptionContext>) -> Result<BackendKind> {
        let backend = match config.save_path.as_deref() {
            Some(path) if path.exists() => {
                let items = MemoryBackend::load(path, crypto)?;
                info!(count = items.len(), path = ?path, "loaded persisted queue");
                MemoryBackend::with_items(items, config.max_mem_items)
            }
            _ => MemoryBackend::new(config.max_mem_items),
        };
        Ok(BackendKind::Memory(backend))
    }

    /// Start building a queue.
    #[must_use]
    pub fn builder() -> QueueBuilder { QueueBuilder::new() }

    /// Append an item at the tail.
    pub fn push(&self, item: impl Into<String>) -> Result<()> {
        self.shared.backend.as_backend().push(item.into())
    }

    /// Remove and return the head, or `None` when empty. Never blocks.
    pub fn pop(&self) -> Result<Option<String>> { self.shared.backend.as_backend().pop() }

    /// Current item count.
    pub fn length(&self) -> Result<usize> { self.shared.backend.as_backend().len() }

    /// Whether the queue currently holds no items.
    pub fn is_empty(&self) -> Result<bool> { Ok(self.length()? == 0) }

    /// FIFO-order copy of the current contents.
    ///
    /// # Errors
    ///
    /// Returns `Unsupported` in delegate mode.
    pub fn items(&self) -> Result<Vec<String>> { self.shared.backend.as_backend().snapshot() }

    /// Append a batch of items in order.
    pub fn push_batch<I>(&self, items: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.shared
            .backend
            .as_backend()
            .push_batch(items.into_iter().map(Into::into).collect())
    }

    /// Pop up to `n` items, stopping early once the queue is empty.
    pub fn pop_batch(&self, n: usize) -> Result<Vec<String>> {
        self.shared.backend.as_backend().pop_batch(n)
    }

    /// Whether the delegate backend is active.
    #[must_use]
    pub fn uses_delegate(&self) -> bool { self.shared.backend.is_delegate() }

    /// Write a snapshot of the current contents now.
    ///
    /// In delegate mode the provider persists on its own and this is a
    /// logged no-op, as is a queue without a configured `save_path`.
    pub fn save(&self) -> Result<()> {
        if self.shared.backend.is_delegate() {
            info!("delegate backend handles persistence on its own, save skipped");
            return Ok(());
        }
        if self.shared.config.save_path.is_none() {
            warn!("save skipped: no save_path configured");
            return Ok(());
        }
        self.shared.write_snapshot()
    }

    /// Stop the queue: signal the auto-persist worker, wait for it up to a
    /// bounded timeout, then write one final snapshot.
    ///
    /// Idempotent; the second and later calls return `Ok` without
    /// re-flushing.
    pub fn stop(&mut self) -> Result<()> {
        if self.stopped {
            return Ok(());
        }
        self.stopped = true;

        // Dropping the sender disconnects the stop channel, which the
        // worker observes on its next wakeup.
        drop(self.stop_tx.take());

        if let Some(done_rx) = self.done_rx.take() {
            if done_rx.recv_timeout(SHUTDOWN_TIMEOUT).is_ok() {
                // The worker has left its loop once it acknowledges, so
                // this join is bounded.
                if let Some(handle) = self.worker.take() {
                    let _ = handle.join();
                }
            } else {
                warn!("auto-persist worker did not stop within {SHUTDOWN_TIMEOUT:?}, proceeding");
            }
        }

        self.shared.write_snapshot()?;
        info!("queue stopped");
        Ok(())
    }
}

impl Drop for Queue {
    /// Teardown mirrors [`stop`](Queue::stop) and additionally releases the
    /// delegate lock resource. Failures are logged, never propagated across
    /// the drop boundary.
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            error!(error = ?e, "final snapshot failed during teardown");
        }
        if let BackendKind::Delegate(backend) = &self.shared.backend {
            backend.cleanup();
        }
    }
}
