// Copyright 2025 Lablup Inc. and Jeongkyu Shin
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use russh::keys::ssh_key::{HashAlg, PublicKey};
use serde::{Deserialize, Serialize};

/// A host key explicitly trusted for one worker node.
///
/// Immutable once constructed; re-trusting a node replaces the record
/// wholesale. The algorithm string is the SSH host key type identifier the
/// node presented (`ssh-rsa`, `ecdsa-sha2-nistp256`, `ssh-ed25519`, ...);
/// unrecognized identifiers round-trip losslessly and simply map to an empty
/// signature preference family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostKey {
    algorithm: String,
    key: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    comment: Option<String>,
}

impl HostKey {
    pub fn new(algorithm: impl Into<String>, key: impl Into<Vec<u8>>) -> Self {
        Self {
            algorithm: algorithm.into(),
            key: key.into(),
            comment: None,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// SSH algorithm identifier of the key.
    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    /// Raw key material as presented during key exchange.
    pub fn key_bytes(&self) -> &[u8] {
        &self.key
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// OpenSSH-style SHA-256 fingerprint, when the raw material parses as an
    /// SSH public key blob.
    pub fn fingerprint(&self) -> Option<String> {
        PublicKey::from_bytes(&self.key)
            .ok()
            .map(|key| key.fingerprint(HashAlg::Sha256).to_string())
    }
}
