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

use super::algorithm::SignatureAlgorithm;
use super::client::{apply_preferred_signatures, client_supported_signatures};
use crate::cache::{CacheStats, WeakValueCache};
use crate::hostkey::HostKeyStore;
use crate::node::NodeId;
use russh::client::Config;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Derives the signature algorithms to offer first when connecting to a
/// node, keyed off the host key already trusted for it.
///
/// Unlike the store, the resolver caches every outcome including the empty
/// one: a stale empty preference only costs the client its negotiation bias
/// until the entry decays or is cleared, while a stale negative in the store
/// would mask a freshly trusted key. Do not unify the two policies.
pub struct SignatureResolver {
    store: Arc<HostKeyStore>,
    cache: WeakValueCache<NodeId, Vec<SignatureAlgorithm>>,
    supported: Vec<SignatureAlgorithm>,
}

impl SignatureResolver {
    /// Resolver over `store`, intersecting preferences with the algorithms
    /// the bundled SSH client negotiates by default.
    pub fn new(store: Arc<HostKeyStore>) -> Self {
        Self::with_supported(store, client_supported_signatures().to_vec())
    }

    /// Resolver restricted to an explicit client-supported set. Useful for
    /// tests and for embedders whose client negotiates a different set (for
    /// example one including certificate algorithms).
    pub fn with_supported(store: Arc<HostKeyStore>, supported: Vec<SignatureAlgorithm>) -> Self {
        Self {
            store,
            cache: WeakValueCache::new(),
            supported,
        }
    }

    /// Ordered signature algorithms to try first for `node`.
    ///
    /// Never fails: a storage error, a missing trusted key and an
    /// unrecognized key algorithm all degrade to an empty list, and the
    /// outcome is cached either way. The returned list is an immutable
    /// snapshot; holding it keeps the cache entry alive.
    pub fn preferred_signatures(&self, node: &NodeId) -> Arc<Vec<SignatureAlgorithm>> {
        if let Some(cached) = self.cache.get(node) {
            trace!(node = %node, "signature preference cache hit");
            return cached;
        }

        let preferred = match self.store.get(node) {
            Ok(Some(key)) => {
                let family = SignatureAlgorithm::family_for(key.algorithm());
                if family.is_empty() {
                    debug!(
                        node = %node,
                        algorithm = key.algorithm(),
                        "trusted host key algorithm is not recognized, no signature preference"
                    );
                }
                family
                    .iter()
                    .copied()
                    .filter(|sig| self.supported.contains(sig))
                    .collect()
            }
            Ok(None) => {
                debug!(node = %node, "no trusted host key, no signature preference");
                Vec::new()
            }
            Err(err) => {
                warn!(node = %node, error = %err, "failed to look up trusted host key");
                Vec::new()
            }
        };

        let preferred = Arc::new(preferred);
        self.cache.insert(node.clone(), &preferred);
        debug!(
            node = %node,
            count = preferred.len(),
            "cached signature preference"
        );
        preferred
    }

    /// Client configuration for connecting to `node`, with the negotiation
    /// order biased toward the trusted host key's algorithm family. With no
    /// preference on record the default configuration is returned unchanged.
    pub fn setup_client(&self, node: &NodeId) -> Config {
        let mut config = Config::default();
        let preferred = self.preferred_signatures(node);
        if !preferred.is_empty() {
            apply_preferred_signatures(&mut config, &preferred);
        }
        config
    }

    /// Drop the cached preference list for `node`; used alongside
    /// [`HostKeyStore::invalidate`] when a node is decommissioned or its key
    /// is re-trusted.
    pub fn clear(&self, node: &NodeId) -> bool {
        let removed = self.cache.remove(node);
        if removed {
            debug!(node = %node, "cleared cached signature preference");
        }
        removed
    }

    /// Drop every cached preference list; returns the number removed.
    pub fn clear_all(&self) -> usize {
        let removed = self.cache.clear();
        debug!(removed, "cleared all cached signature preferences");
        removed
    }

    /// Cache entry count, counting dangling entries not yet swept.
    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }

    /// Drop cache entries whose list has been reclaimed; returns the number
    /// removed.
    pub fn sweep_reclaimed(&self) -> usize {
        self.cache.sweep()
    }

    /// Snapshot of the cache counters.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hostkey::{FsRecordStorage, HostKey};
    use tempfile::TempDir;

    fn resolver_in(dir: &TempDir, supported: &[SignatureAlgorithm]) -> SignatureResolver {
        let store = Arc::new(HostKeyStore::new(FsRecordStorage::new(dir.path())));
        SignatureResolver::with_supported(store, supported.to_vec())
    }

    #[test]
    fn test_no_trusted_key_yields_empty_list() {
        let dir = TempDir::new().unwrap();
        let resolver = resolver_in(&dir, SignatureAlgorithm::ALL);

        let preferred = resolver.preferred_signatures(&NodeId::from("worker-1"));
        assert!(preferred.is_empty());
        // The empty outcome is cached, unlike in the store.
        assert_eq!(resolver.cache_size(), 1);
    }

    #[test]
    fn test_unknown_key_algorithm_yields_empty_list() {
        let dir = TempDir::new().unwrap();
        let resolver = resolver_in(&dir, SignatureAlgorithm::ALL);
        let node = NodeId::from("worker-1");

        let _held = resolver
            .store
            .put(&node, HostKey::new("ssh-dss", vec![1]))
            .unwrap();
        let preferred = resolver.preferred_signatures(&node);
        assert!(preferred.is_empty());
    }

    #[test]
    fn test_intersection_preserves_family_order() {
        let dir = TempDir::new().unwrap();
        let resolver = resolver_in(
            &dir,
            &[
                SignatureAlgorithm::Ed25519,
                SignatureAlgorithm::SkEd25519,
                SignatureAlgorithm::NistP256,
            ],
        );
        let node = NodeId::from("worker-1");

        let _held = resolver
            .store
            .put(&node, HostKey::new("ssh-ed25519", vec![1]))
            .unwrap();
        let preferred = resolver.preferred_signatures(&node);
        assert_eq!(
            *preferred,
            vec![SignatureAlgorithm::Ed25519, SignatureAlgorithm::SkEd25519]
        );
    }

    #[test]
    fn test_clear_and_clear_all() {
        let dir = TempDir::new().unwrap();
        let resolver = resolver_in(&dir, SignatureAlgorithm::ALL);

        let a = resolver.preferred_signatures(&NodeId::from("worker-a"));
        let b = resolver.preferred_signatures(&NodeId::from("worker-b"));
        assert_eq!(resolver.cache_size(), 2);

        assert!(resolver.clear(&NodeId::from("worker-a")));
        assert!(!resolver.clear(&NodeId::from("worker-a")));
        assert_eq!(resolver.clear_all(), 1);
        assert_eq!(resolver.cache_size(), 0);
        drop((a, b));
    }

    #[test]
    fn test_setup_client_with_no_preference_is_default() {
        let dir = TempDir::new().unwrap();
        let resolver = resolver_in(&dir, SignatureAlgorithm::ALL);

        let config = resolver.setup_client(&NodeId::from("worker-1"));
        assert_eq!(
            config.preferred.key.to_vec(),
            Config::default().preferred.key.to_vec()
        );
    }
}
