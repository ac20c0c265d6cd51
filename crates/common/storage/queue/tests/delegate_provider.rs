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

//! Runs in its own test binary: provider registration is process-wide, so
//! these tests must not share a process with the fallback test.

use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex, OnceLock},
};

use duraq::{DelegateProvider, QueueBuilder, QueueError, register_provider};

/// Delegate provider backed by per-queue in-memory deques.
#[derive(Default)]
struct RecordingProvider {
    queues: Mutex<HashMap<String, VecDeque<String>>>,
}

impl DelegateProvider for RecordingProvider {
    fn initialize_lock(&self) {}

    fn push(&self, queue_id: &str, item: &str) -> i32 {
        self.queues
            .lock()
            .unwrap()
            .entry(queue_id.to_string())
            .or_default()
            .push_back(item.to_string());
        0
    }

    fn pop(&self, queue_id: &str, buf: &mut [u8]) -> i32 {
        let mut queues = self.queues.lock().unwrap();
        let Some(item) = queues.get_mut(queue_id).and_then(VecDeque::pop_front) else {
            return 1;
        };
        buf[..item.len()].copy_from_slice(item.as_bytes());
        buf[item.len()] = 0;
        0
    }

    fn len(&self, queue_id: &str) -> usize {
        self.queues
            .lock()
            .unwrap()
            .get(queue_id)
            .map_or(0, VecDeque::len)
    }

    fn cleanup_lock(&self) {}
}

fn shared_provider() -> Arc<RecordingProvider> {
    static PROVIDER: OnceLock<Arc<RecordingProvider>> = OnceLock::new();
    let provider = PROVIDER
        .get_or_init(|| {
            let provider = Arc::new(RecordingProvider::default());
            assert!(register_provider(provider.clone()));
            provider
        })
        .clone();
    provider
}

#[test]
fn test_operations_route_through_provider() {
    let provider = shared_provider();

    let queue = QueueBuilder::new()
        .save_path("routing-test")
        .use_native_backend(true)
        .build()
        .unwrap();
    assert!(queue.uses_delegate());

    queue.push("first").unwrap();
    queue.push("second").unwrap();

    // The items live in the provider, not in process memory.
    assert_eq!(provider.len("routing-test"), 2);
    assert_eq!(queue.length().unwrap(), 2);

    assert_eq!(queue.pop().unwrap(), Some("first".to_string()));
    assert_eq!(queue.pop().unwrap(), Some("second".to_string()));
    assert_eq!(queue.pop().unwrap(), None);
}

#[test]
fn test_iteration_unsupported_in_delegate_mode() {
    let _ = shared_provider();

    let queue = QueueBuilder::new()
        .save_path("iteration-test")
        .use_native_backend(true)
        .build()
        .unwrap();

    let err = queue.items().unwrap_err();
    assert!(matches!(err, QueueError::Unsupported { .. }));
}

#[test]
fn test_save_is_noop_in_delegate_mode() {
    let _ = shared_provider();

    let queue = QueueBuilder::new()
        .save_path("noop-save-test")
        .use_native_backend(true)
        .build()
        .unwrap();

    queue.push("kept by the provider").unwrap();
    queue.save().unwrap();
    assert!(!std::path::Path::new("noop-save-test").exists());
}

#[test]
fn test_second_registration_rejected() {
    let _ = shared_provider();
    assert!(!register_provider(Arc::new(RecordingProvider::default())));
}
