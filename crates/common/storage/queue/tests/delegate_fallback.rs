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

//! Runs in its own test binary so no other test can register a delegate
//! provider before the fallback path is exercised.

use duraq::QueueBuilder;

#[test]
fn test_native_request_without_provider_falls_back_to_memory() {
    let queue = QueueBuilder::new()
        .use_native_backend(true)
        .build()
        .unwrap();

    assert!(!queue.uses_delegate());

    queue.push("still works").unwrap();
    assert_eq!(queue.pop().unwrap(), Some("still works".to_string()));
    assert_eq!(queue.length().unwrap(), 0);
}
