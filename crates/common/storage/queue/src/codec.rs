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

//! Snapshot codec: serialize -> compress -> optionally encrypt, and the
//! exact inverse.
//!
//! The on-disk blob carries no framing of its own beyond what the cipher
//! token and the zstd stream embed; the loader must be configured with the
//! same encryption presence/key used to write it.

use std::collections::VecDeque;

use bincode::config;

use crate::{
    Result,
    crypto::EncryptionContext,
    error::{CorruptOrWrongKeySnafu, InternalSnafu},
};

/// Encode the ordered queue contents into a snapshot blob.
pub fn encode(items: &VecDeque<String>, crypto: Option<&EncryptionContext>) -> Result<Vec<u8>> {
    let serialized = bincode::encode_to_vec(items, config::standard()).map_err(|e| {
        InternalSnafu {
            message: format!("snapshot serialization failed: {e}"),
        }
        .build()
    })?;

    let compressed =
        zstd::encode_all(serialized.as_slice(), zstd::DEFAULT_COMPRESSION_LEVEL).map_err(|e| {
            InternalSnafu {
                message: format!("snapshot compression failed: {e}"),
            }
            .build()
        })?;

    match crypto {
        Some(ctx) => ctx.encrypt(&compressed),
        None => Ok(compressed),
    }
}

/// Decode a snapshot blob back into the ordered queue contents.
///
/// # Errors
///
/// A failure at the decrypt step is `DecryptionFailed` (likely wrong key);
/// a failure at decompression or deserialization is `CorruptOrWrongKey`.
pub fn decode(blob: &[u8], crypto: Option<&EncryptionContext>) -> Result<VecDeque<String>> {
    let compressed = match crypto {
        Some(ctx) => ctx.decrypt(blob)?,
        None => blob.to_vec(),
    };

    let serialized = zstd::decode_all(compressed.as_slice()).map_err(|e| {
        CorruptOrWrongKeySnafu {
            reason: format!("decompression failed: {e}"),
        }
        .build()
    })?;

    let (items, _): (VecDeque<String>, usize) =
        bincode::decode_from_slice(&serialized, config::standard()).map_err(|e| {
            CorruptOrWrongKeySnafu {
                reason: format!("deserialization failed: {e}"),
            }
            .build()
        })?;

    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::QueueError;

    fn items(values: &[&str]) -> VecDeque<String> {
        values.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_roundtrip_plain() {
        let original = items(&["a", "b", "c"]);
        let blob = encode(&original, None).unwrap();
        assert_eq!(decode(&blob, None).unwrap(), original);
    }

    #[test]
    fn test_roundtrip_empty() {
        let original = VecDeque::new();
        let blob = encode(&original, None).unwrap();
        assert_eq!(decode(&blob, None).unwrap(), original);
    }

    #[test]
    fn test_roundtrip_encrypted() {
        let ctx = EncryptionContext::from_passphrase("secret");
        let original = items(&["first", "second", "third"]);

        let blob = encode(&original, Some(&ctx)).unwrap();
        assert_eq!(decode(&blob, Some(&ctx)).unwrap(), original);
    }

    #[test]
    fn test_wrong_key_never_returns_data() {
        let writer = EncryptionContext::from_passphrase("secret");
        let blob = encode(&items(&["x"]), Some(&writer)).unwrap();

        let reader = EncryptionContext::from_passphrase("wrong");
        let err = decode(&blob, Some(&reader)).unwrap_err();
        assert!(matches!(err, QueueError::DecryptionFailed { .. }));
    }

    #[test]
    fn test_encrypted_blob_without_key_is_corrupt() {
        let ctx = EncryptionContext::from_passphrase("secret");
        let blob = encode(&items(&["x"]), Some(&ctx)).unwrap();

        // Without a context the token bytes hit the decompressor directly.
        let err = decode(&blob, None).unwrap_err();
        assert!(matches!(err, QueueError::CorruptOrWrongKey { .. }));
    }

    #[test]
    fn test_plain_blob_with_key_fails_decryption() {
        let blob = encode(&items(&["x"]), None).unwrap();

        let ctx = EncryptionContext::from_passphrase("secret");
        let err = decode(&blob, Some(&ctx)).unwrap_err();
        assert!(matches!(err, QueueError::DecryptionFailed { .. }));
    }

    #[test]
    fn test_truncated_blob_is_corrupt() {
        let blob = encode(&items(&["aaaa", "bbbb"]), None).unwrap();
        let err = decode(&blob[..blob.len() / 2], None).unwrap_err();
        assert!(matches!(err, QueueError::CorruptOrWrongKey { .. }));
    }

    #[test]
    fn test_order_preserved() {
        let original: VecDeque<String> = (0..500).map(|i| format!("item-{i:04}")).collect();
        let blob = encode(&original, None).unwrap();
        let decoded = decode(&blob, None).unwrap();
        assert_eq!(decoded, original);
    }
}
