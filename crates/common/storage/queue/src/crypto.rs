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

//! Authenticated snapshot encryption.
//!
//! Tokens are XChaCha20-Poly1305 with a versioned header:
//!
//! ```text
//! [version: 1B][timestamp: 8B BE][nonce: 24B][ciphertext || tag: 16B]
//! ```
//!
//! The header is authenticated as associated data, so a tampered version or
//! timestamp fails the integrity check the same way a flipped ciphertext
//! byte does.

use std::time::{SystemTime, UNIX_EPOCH};

use chacha20poly1305::{
    Key, XChaCha20Poly1305, XNonce,
    aead::{Aead, AeadCore, KeyInit, OsRng, Payload},
};
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use snafu::ensure;

use crate::{
    Result,
    config::KeyInput,
    error::{DecryptionFailedSnafu, InternalSnafu, InvalidKeyLengthSnafu},
};

/// Cipher key size in bytes.
pub const KEY_LEN: usize = 32;

const PBKDF2_SALT: &[u8] = b"duraq-snapshot-salt";
const PBKDF2_ITERATIONS: u32 = 100_000;

const TOKEN_VERSION: u8 = 0x01;
const HEADER_LEN: usize = 9;
const NONCE_LEN: usize = 24;
const TAG_LEN: usize = 16;
const MIN_TOKEN_LEN: usize = HEADER_LEN + NONCE_LEN + TAG_LEN;

/// Resolved symmetric key bound to a queue instance.
///
/// Exactly one context (or none) is bound per queue and used for the
/// startup load and every subsequent save.
pub struct EncryptionContext {
    cipher: XChaCha20Poly1305,
}

// Manual impl: the cipher holds key material and is not `Debug`.
impl core::fmt::Debug for EncryptionContext {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EncryptionContext").finish_non_exhaustive()
    }
}

impl EncryptionContext {
    /// Resolve key material into an optional context.
    ///
    /// `KeyInput::None` means pass-through: snapshots stay unencrypted.
    pub(crate) fn resolve(key: &KeyInput) -> Result<Option<Self>> {
        match key {
            KeyInput::None => Ok(None),
            KeyInput::Passphrase(passphrase) => Ok(Some(Self::from_passphrase(passphrase))),
            KeyInput::RawKey(raw) => Self::from_raw_key(raw).map(Some),
        }
    }

    /// Derive a context from a passphrase.
    ///
    /// PBKDF2-HMAC-SHA256 with a fixed application salt and 100k iterations,
    /// expanded to a 32-byte cipher key.
    #[must_use]
    pub fn from_passphrase(passphrase: &str) -> Self {
        let mut key = [0u8; KEY_LEN];
        pbkdf2_hmac::<Sha256>(
            passphrase.as_bytes(),
            PBKDF2_SALT,
            PBKDF2_ITERATIONS,
            &mut key,
        );
        Self {
            cipher: XChaCha20Poly1305::new(Key::from_slice(&key)),
        }
    }

    /// Build a context from a raw 32-byte key.
    ///
    /// # Errors
    ///
    /// Returns `InvalidKeyLength` for any other key size.
    pub fn from_raw_key(key: &[u8]) -> Result<Self> {
        ensure!(
            key.len() == KEY_LEN,
            InvalidKeyLengthSnafu {
                len:      key.len(),
                expected: KEY_LEN,
            }
        );
        Ok(Self {
            cipher: XChaCha20Poly1305::new(Key::from_slice(key)),
        })
    }

    /// Encrypt `plaintext` into a self-contained token.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let mut header = [0u8; HEADER_LEN];
        header[0] = TOKEN_VERSION;
        header[1..].copy_from_slice(&unix_timestamp().to_be_bytes());

        let nonce = XChaCha20Poly1305::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, Payload {
                msg: plaintext,
                aad: &header,
            })
            .map_err(|_| {
                InternalSnafu {
                    message: "AEAD encryption failed".to_string(),
                }
                .build()
            })?;

        let mut token = Vec::with_capacity(HEADER_LEN + NONCE_LEN + ciphertext.len());
        token.extend_from_slice(&header);
        token.extend_from_slice(&nonce);
        token.extend_from_slice(&ciphertext);
        Ok(token)
    }

    /// Decrypt a token produced by [`encrypt`](Self::encrypt).
    ///
    /// # Errors
    ///
    /// Returns `DecryptionFailed` on short input, an unknown token version,
    /// or an integrity/key mismatch.
    pub fn decrypt(&self, token: &[u8]) -> Result<Vec<u8>> {
        ensure!(token.len() >= MIN_TOKEN_LEN, DecryptionFailedSnafu);
        ensure!(token[0] == TOKEN_VERSION, DecryptionFailedSnafu);

        let (header, rest) = token.split_at(HEADER_LEN);
        let (nonce, ciphertext) = rest.split_at(NONCE_LEN);

        self.cipher
            .decrypt(XNonce::from_slice(nonce), Payload {
                msg: ciphertext,
                aad: header,
            })
            .map_err(|_| DecryptionFailedSnafu.build())
    }
}

fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_secs())
}
