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

//! Error types for host key storage and retrieval

use std::io;
use thiserror::Error;

/// Errors raised by the host key store and its durable backing.
///
/// These propagate to whatever flow drives the store directly (a failed
/// key-trust operation reports failure to its caller). The signature
/// resolver never propagates them; it degrades to an empty preference list.
#[derive(Debug, Error)]
pub enum KeyStoreError {
    /// The durable backing location for a node could not be resolved or read.
    #[error("storage location for node '{node}' is unavailable: {reason}")]
    StorageUnavailable { node: String, reason: String },

    /// A stored record exists but could not be deserialized. Never treated
    /// as "no trusted key"; a corrupt record must surface to the caller.
    #[error("stored host key for node '{node}' is unreadable")]
    CorruptRecord {
        node: String,
        #[source]
        source: serde_json::Error,
    },

    /// Writing the record through to durable storage failed. The cache is
    /// left unmodified when this is returned.
    #[error("failed to persist host key for node '{node}'")]
    StorageWriteFailed {
        node: String,
        #[source]
        source: io::Error,
    },
}

impl KeyStoreError {
    /// Name of the node the failed operation was addressing.
    pub fn node(&self) -> &str {
        match self {
            KeyStoreError::StorageUnavailable { node, .. }
            | KeyStoreError::CorruptRecord { node, .. }
            | KeyStoreError::StorageWriteFailed { node, .. } => node,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = KeyStoreError::StorageUnavailable {
            node: "worker-1".to_string(),
            reason: "NODEKEYS_NODES_DIR is not set".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "storage location for node 'worker-1' is unavailable: NODEKEYS_NODES_DIR is not set"
        );

        let err = KeyStoreError::StorageWriteFailed {
            node: "worker-2".to_string(),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "read-only"),
        };
        assert_eq!(
            err.to_string(),
            "failed to persist host key for node 'worker-2'"
        );
    }

    #[test]
    fn test_error_node_accessor() {
        let err = KeyStoreError::StorageUnavailable {
            node: "worker-3".to_string(),
            reason: "gone".to_string(),
        };
        assert_eq!(err.node(), "worker-3");
    }

    #[test]
    fn test_corrupt_record_carries_source() {
        let source = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err = KeyStoreError::CorruptRecord {
            node: "worker-4".to_string(),
            source,
        };
        assert!(std::error::Error::source(&err).is_some());
    }
}
