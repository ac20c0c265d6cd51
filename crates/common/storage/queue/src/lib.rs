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

//! Durable, concurrency-safe FIFO queue with encrypted, compressed
//! snapshots.
//!
//! Storage is either an in-process deque behind a single mutex or an
//! optional external delegate provider; a persisting in-process queue
//! periodically serializes its full contents, compresses them with zstd,
//! optionally encrypts them, and writes the blob to a single snapshot file.

pub mod backend;
pub mod builder;
pub mod codec;
pub mod config;
pub mod crypto;
pub mod delegate;
pub mod error;
pub mod memory;
mod persister;
pub mod queue;

pub use backend::Backend;
pub use builder::QueueBuilder;
pub use config::{KeyInput, QueueConfig};
pub use crypto::EncryptionContext;
pub use delegate::{DelegateProvider, register_provider};
pub use error::{QueueError, Result};
pub use queue::Queue;
