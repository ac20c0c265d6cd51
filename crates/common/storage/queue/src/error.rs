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

use std::{io, path::PathBuf, str::Utf8Error};

use snafu::{Location, Snafu};

/// Queue operation errors.
///
/// `DecryptionFailed` and `CorruptOrWrongKey` are deliberately distinct so
/// callers can tell a key mismatch from a damaged snapshot, and both are
/// distinct from plain filesystem failures (`SnapshotIo`).
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum QueueError {
    /// A payload crossing the delegate boundary was not valid text.
    #[snafu(display("backend returned a non-text item"))]
    InvalidItem {
        source: Utf8Error,
        #[snafu(implicit)]
        loc:    Location,
    },

    /// The delegate backend reported a non-zero status on push.
    #[snafu(display("delegate backend rejected push (status {status})"))]
    BackendWriteFailed {
        status: i32,
        #[snafu(implicit)]
        loc:    Location,
    },

    /// Snapshot decryption failed: integrity check or key mismatch.
    #[snafu(display("failed to decrypt snapshot: likely wrong encryption key"))]
    DecryptionFailed {
        #[snafu(implicit)]
        loc: Location,
    },

    /// Decompression or deserialization failed after the decrypt step.
    #[snafu(display("failed to decode snapshot: data corrupted or key wrong ({reason})"))]
    CorruptOrWrongKey {
        reason: String,
        #[snafu(implicit)]
        loc:    Location,
    },

    /// The operation is not available on the active backend.
    #[snafu(display("{operation} is not supported by the delegate backend"))]
    Unsupported {
        operation: &'static str,
        #[snafu(implicit)]
        loc:       Location,
    },

    /// Filesystem failure while reading or writing a snapshot.
    #[snafu(display("snapshot I/O failed at {}", path.display()))]
    SnapshotIo {
        path:   PathBuf,
        source: io::Error,
        #[snafu(implicit)]
        loc:    Location,
    },

    /// Raw key material of the wrong size.
    #[snafu(display("encryption key must be {expected} bytes, got {len}"))]
    InvalidKeyLength {
        len:      usize,
        expected: usize,
        #[snafu(implicit)]
        loc:      Location,
    },

    /// Push rejected because the configured in-memory limit was reached.
    #[snafu(display("queue is full: max_mem_items = {limit}"))]
    CapacityExceeded {
        limit: usize,
        #[snafu(implicit)]
        loc:   Location,
    },

    /// Faults that are not expected during normal operation.
    #[snafu(display("internal error: {message}"))]
    Internal {
        message: String,
        #[snafu(implicit)]
        loc:     Location,
    },
}

/// Result type for queue operations.
pub type Result<T> = std::result::Result<T, QueueError>;
