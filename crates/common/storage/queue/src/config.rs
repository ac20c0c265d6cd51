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

use std::{fmt, path::PathBuf, time::Duration};

/// Default soft cap on in-memory items.
pub const DEFAULT_MAX_MEM_ITEMS: usize = 100_000;

/// Default interval between automatic snapshot saves.
pub const DEFAULT_AUTO_PERSIST_INTERVAL: Duration = Duration::from_secs(10);

/// Construction-time queue configuration.
///
/// Backend selection and persistence settings are fixed for the lifetime of
/// a queue instance; there is no runtime switching.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Snapshot file path. `None` disables persistence entirely.
    pub save_path: Option<PathBuf>,
    /// Maximum number of in-memory items. `None` removes the limit.
    pub max_mem_items: Option<usize>,
    /// Key material for snapshot encryption.
    pub key: KeyInput,
    /// Sleep interval of the auto-persist worker.
    pub auto_persist_interval: Duration,
    /// Request the delegate backend. Silently ignored when no provider is
    /// registered.
    pub use_native_backend: bool,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            save_path: None,
            max_mem_items: Some(DEFAULT_MAX_MEM_ITEMS),
            key: KeyInput::None,
            auto_persist_interval: DEFAULT_AUTO_PERSIST_INTERVAL,
            use_native_backend: false,
        }
    }
}

/// Key material accepted at construction time.
///
/// A passphrase is expanded with PBKDF2-HMAC-SHA256 into a 32-byte cipher
/// key; a raw key is used as-is and must already be 32 bytes.
#[derive(Clone, Default)]
pub enum KeyInput {
    /// No encryption; snapshots are compressed plaintext.
    #[default]
    None,
    /// Derive the cipher key from a passphrase.
    Passphrase(String),
    /// Use a 32-byte symmetric key directly.
    RawKey(Vec<u8>),
}

// Key material must never end up in logs.
impl fmt::Debug for KeyInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Passphrase(_) => f.write_str("Passphrase(..)"),
            Self::RawKey(_) => f.write_str("RawKey(..)"),
        }
    }
}
