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

use super::record::HostKey;
use super::storage::RecordStorage;
use crate::cache::{CacheStats, WeakValueCache};
use crate::error::KeyStoreError;
use crate::node::NodeId;
use std::io;
use std::sync::Arc;
use tracing::{debug, trace};

/// Authoritative mapping from node identity to the trusted host key.
///
/// Durable storage is the source of truth; the in-memory cache holds weak
/// handles and exists only to keep re-reads cheap under concurrent
/// connection load. Absence is never cached: a key trusted by one thread
/// must be visible to the next lookup on any thread, so "no record" always
/// falls through to storage.
///
/// Two threads missing on the same node may both read storage and both
/// insert; the entries are equivalent reads of the same record, so last
/// write wins and the race costs only the redundant read.
pub struct HostKeyStore {
    storage: Box<dyn RecordStorage>,
    cache: WeakValueCache<NodeId, HostKey>,
}

impl HostKeyStore {
    /// Construct a store over the given durable backing. Intended to be
    /// built once at process start and shared via `Arc`.
    pub fn new(storage: impl RecordStorage + 'static) -> Self {
        Self {
            storage: Box::new(storage),
            cache: WeakValueCache::new(),
        }
    }

    /// Currently trusted host key for `node`, or `None` if no key has been
    /// trusted.
    ///
    /// A missing or reclaimed cache entry falls through to durable storage;
    /// a record found there is re-cached. Storage failures propagate and are
    /// never folded into "no trusted key".
    pub fn get(&self, node: &NodeId) -> Result<Option<Arc<HostKey>>, KeyStoreError> {
        if let Some(key) = self.cache.get(node) {
            trace!(node = %node, "host key cache hit");
            return Ok(Some(key));
        }

        let Some(bytes) = self.storage.read_record(node)? else {
            debug!(node = %node, "no trusted host key on record");
            return Ok(None);
        };

        let record: HostKey =
            serde_json::from_slice(&bytes).map_err(|source| KeyStoreError::CorruptRecord {
                node: node.name().to_string(),
                source,
            })?;
        let record = Arc::new(record);
        self.cache.insert(node.clone(), &record);
        debug!(
            node = %node,
            algorithm = record.algorithm(),
            "loaded trusted host key from storage"
        );
        Ok(Some(record))
    }

    /// Trust `key` for `node`, superseding any previous record.
    ///
    /// The record is persisted first and only then published to the cache,
    /// so a reader observing the new entry would also observe the durable
    /// write. On failure the cache is left unmodified. The returned handle
    /// keeps the cache entry alive while the caller holds it.
    pub fn put(&self, node: &NodeId, key: HostKey) -> Result<Arc<HostKey>, KeyStoreError> {
        let bytes = serde_json::to_vec_pretty(&key).map_err(|source| {
            KeyStoreError::StorageWriteFailed {
                node: node.name().to_string(),
                source: io::Error::other(source),
            }
        })?;
        self.storage.write_record(node, &bytes)?;

        let record = Arc::new(key);
        self.cache.insert(node.clone(), &record);
        debug!(
            node = %node,
            algorithm = record.algorithm(),
            "trusted host key persisted"
        );
        Ok(record)
    }

    /// Drop the cache entry for `node`; durable storage is untouched. Used
    /// when a node is decommissioned or a re-read must be forced.
    pub fn invalidate(&self, node: &NodeId) -> bool {
        let removed = self.cache.remove(node);
        if removed {
            debug!(node = %node, "invalidated cached host key");
        }
        removed
    }

    /// Cache entry count, counting dangling entries not yet swept.
    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }

    /// Drop cache entries whose key has been reclaimed; returns the number
    /// removed. Housekeeping only; every read path detects and removes its
    /// own stale entry.
    pub fn sweep_reclaimed(&self) -> usize {
        self.cache.sweep()
    }

    /// Snapshot of the cache counters.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}
