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

use crate::{Result, delegate::DelegateBackend, memory::MemoryBackend};

/// Storage provider behind the queue's public operations.
///
/// Implementations are thread-safe; none of the operations block waiting
/// for an item to become available.
pub trait Backend: Send + Sync {
    /// Append an item at the tail.
    fn push(&self, item: String) -> Result<()>;

    /// Remove and return the head, or `None` when the queue is empty.
    fn pop(&self) -> Result<Option<String>>;

    /// Current item count.
    fn len(&self) -> Result<usize>;

    /// FIFO-order copy of the current contents.
    ///
    /// The delegate backend does not support enumeration and returns
    /// `Unsupported`.
    fn snapshot(&self) -> Result<Vec<String>>;

    /// Append a batch of items in order.
    fn push_batch(&self, items: Vec<String>) -> Result<()> {
        for item in items {
            self.push(item)?;
        }
        Ok(())
    }

    /// Pop up to `n` items, stopping early once the queue reports empty.
    fn pop_batch(&self, n: usize) -> Result<Vec<String>> {
        let mut items = Vec::new();
        for _ in 0..n {
            match self.pop()? {
                Some(item) => items.push(item),
                None => break,
            }
        }
        Ok(items)
    }
}

/// The two statically known backend implementations.
///
/// Selection happens once at construction and never changes afterwards.
pub(crate) enum BackendKind {
    Memory(MemoryBackend),
    Delegate(DelegateBackend),
}

impl BackendKind {
    pub(crate) fn as_backend(&self) -> &dyn Backend {
        match self {
            Self::Memory(backend) => backend,
            Self::Delegate(backend) => backend,
        }
    }

    /// The in-process backend, when active. Only it participates in
    /// snapshot persistence.
    pub(crate) const fn memory(&self) -> Option<&MemoryBackend> {
        match self {
            Self::Memory(backend) => Some(backend),
            Self::Delegate(_) => None,
        }
    }

    pub(crate) const fn is_delegate(&self) -> bool { matches!(self, Self::Delegate(_)) }
}
