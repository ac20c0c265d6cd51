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

//! Delegate (external) backend shim.
//!
//! The external provider is an opaque collaborator reached through a narrow
//! push/pop/length contract with C-style status codes. It is best-effort:
//! availability is a one-time registry check, and a queue that asks for the
//! delegate while none is registered silently falls back to the in-process
//! backend.

use std::sync::{Arc, OnceLock};

use snafu::{ResultExt, ensure};
use tracing::debug;

use crate::{
    Result,
    backend::Backend,
    error::{BackendWriteFailedSnafu, InvalidItemSnafu, UnsupportedSnafu},
};

/// Pop buffer capacity handed to the provider, matching the native
/// contract.
pub const POP_BUFFER_CAPACITY: usize = 4096;

/// Narrow contract implemented by an external high-performance queue
/// provider.
///
/// Status-code conventions follow the native library: `0` is success; on
/// push any other value is a failure, on pop it means "no item available".
pub trait DelegateProvider: Send + Sync {
    /// Called once when a queue identity is opened in delegate mode.
    fn initialize_lock(&self);

    /// Append `item` to the queue identified by `queue_id`.
    fn push(&self, queue_id: &str, item: &str) -> i32;

    /// Pop the head into `buf` as a NUL-terminated byte string.
    fn pop(&self, queue_id: &str, buf: &mut [u8]) -> i32;

    /// Current item count for `queue_id`.
    fn len(&self, queue_id: &str) -> usize;

    /// Best-effort resource release at shutdown.
    fn cleanup_lock(&self);
}

static PROVIDER: OnceLock<Arc<dyn DelegateProvider>> = OnceLock::new();

/// Register the process-wide delegate provider.
///
/// Returns `false` when a provider was already registered; the first
/// registration wins for the lifetime of the process.
pub fn register_provider(provider: Arc<dyn DelegateProvider>) -> bool {
    PROVIDER.set(provider).is_ok()
}

pub(crate) fn provider() -> Option<Arc<dyn DelegateProvider>> { PROVIDER.get().cloned() }

/// Adapter exposing a [`DelegateProvider`] through the [`Backend`] trait.
pub(crate) struct DelegateBackend {
    provider: Arc<dyn DelegateProvider>,
    queue_id: String,
}

impl DelegateBackend {
    pub(crate) fn open(provider: Arc<dyn DelegateProvider>, queue_id: String) -> Self {
        provider.initialize_lock();
        debug!(queue_id = %queue_id, "delegate backend opened");
        Self { provider, queue_id }
    }

    pub(crate) fn cleanup(&self) { self.provider.cleanup_lock(); }
}

impl Backend for DelegateBackend {
    fn push(&self, item: String) -> Result<()> {
        let status = self.provider.push(&self.queue_id, &item);
        ensure!(status == 0, BackendWriteFailedSnafu { status });
        Ok(())
    }

    fn pop(&self) -> Result<Option<String>> {
        let mut buf = [0u8; POP_BUFFER_CAPACITY];
        let status = self.provider.pop(&self.queue_id, &mut buf);
        if status != 0 {
            // Non-zero on pop means "no item", not an error.
            return Ok(None);
        }

        let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
        let item = std::str::from_utf8(&buf[..end]).context(InvalidItemSnafu)?;
        Ok(Some(item.to_string()))
    }

    fn len(&self) -> Result<usize> { Ok(self.provider.len(&self.queue_id)) }

    fn snapshot(&self) -> Result<Vec<String>> {
        UnsupportedSnafu {
            operation: "iteration",
        }
        .fail()
    }
}
