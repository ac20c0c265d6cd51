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

use std::{path::PathBuf, time::Duration};

use crate::{KeyInput, Queue, QueueConfig, Result};

/// Fluent construction of a [`Queue`].
pub struct QueueBuilder {
    config: QueueConfig,
}

impl QueueBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: QueueConfig::default(),
        }
    }

    /// Enable persistence to the given snapshot file. If the file exists it
    /// is loaded at construction.
    #[must_use]
    pub fn save_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config.save_path = Some(path.into());
        self
    }

    /// Cap the number of in-memory items; pushes beyond the cap fail with
    /// `CapacityExceeded`.
    #[must_use]
    pub fn max_mem_items(mut self, limit: usize) -> Self {
        self.config.max_mem_items = Some(limit);
        self
    }

    /// Remove the in-memory item cap.
    #[must_use]
    pub fn unbounded(mut self) -> Self {
        self.config.max_mem_items = None;
        self
    }

    /// Encrypt snapshots with a key derived from `passphrase`.
    #[must_use]
    pub fn passphrase(mut self, passphrase: impl Into<String>) -> Self {
        self.config.key = KeyInput::Passphrase(passphrase.into());
        self
    }

    /// Encrypt snapshots with a raw 32-byte key.
    #[must_use]
    pub fn raw_key(mut self, key: impl Into<Vec<u8>>) -> Self {
        self.config.key = KeyInput::RawKey(key.into());
        self
    }

    /// Interval between automatic snapshot saves.
    #[must_use]
    pub fn auto_persist_interval(mut self, interval: Duration) -> Self {
        self.config.auto_persist_interval = interval;
        self
    }

    /// Request the delegate backend. Silently ignored when no provider is
    /// registered.
    #[must_use]
    pub fn use_native_backend(mut self, use_native: bool) -> Self {
        self.config.use_native_backend = use_native;
        self
    }

    /// Build the queue, performing the startup load when a snapshot exists.
    pub fn build(self) -> Result<Queue> { Queue::new(self.config) }
}

impl Default for QueueBuilder {
    fn default() -> Self { Self::new() }
}
