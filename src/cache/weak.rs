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

use super::stats::CacheStats;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};
use tracing::trace;

/// Thread-safe map from key to weakly held value.
///
/// A value stays cached only while some caller still holds an `Arc` returned
/// from [`get`](Self::get) or passed to [`insert`](Self::insert); once the
/// last strong reference drops, the entry decays into a dangling `Weak` and
/// every subsequent lookup treats it exactly as a miss. Eviction is therefore
/// best-effort and driven by how long callers keep values alive, bounded in
/// practice by one entry per live node.
///
/// All operations take `&self` and are safe to call concurrently from many
/// threads. A lookup that finds a dangling entry removes it on its own, so
/// [`sweep`](Self::sweep) is housekeeping, never required for correctness.
pub struct WeakValueCache<K, V> {
    entries: RwLock<HashMap<K, Weak<V>>>,
    stats: RwLock<CacheStats>,
}

impl<K, V> WeakValueCache<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            stats: RwLock::new(CacheStats::default()),
        }
    }

    // A poisoned guard is recovered rather than propagated: no writer panics
    // while the map is mid-mutation, so the data behind it stays consistent.
    fn entries_read(&self) -> RwLockReadGuard<'_, HashMap<K, Weak<V>>> {
        self.entries.read().unwrap_or_else(|e| e.into_inner())
    }

    fn entries_write(&self) -> RwLockWriteGuard<'_, HashMap<K, Weak<V>>> {
        self.entries.write().unwrap_or_else(|e| e.into_inner())
    }

    fn stats_write(&self) -> RwLockWriteGuard<'_, CacheStats> {
        self.stats.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Look up a live value for `key`.
    ///
    /// A dangling entry is removed and reported as a miss, never as an error.
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        let stale = {
            let entries = self.entries_read();
            match entries.get(key) {
                Some(weak) => match weak.upgrade() {
                    Some(value) => {
                        self.stats_write().hits += 1;
                        return Some(value);
                    }
                    None => Some(weak.clone()),
                },
                None => None,
            }
        };

        if let Some(stale) = stale {
            // Remove only if the entry is still the same dangling reference;
            // a concurrent insert may have replaced it already.
            let removed = {
                let mut entries = self.entries_write();
                match entries.get(key) {
                    Some(current) if Weak::ptr_eq(current, &stale) => {
                        entries.remove(key);
                        true
                    }
                    _ => false,
                }
            };
            if removed {
                self.stats_write().reclaimed_evictions += 1;
            }
        }

        self.stats_write().misses += 1;
        None
    }

    /// Insert or replace the entry for `key`, holding `value` weakly.
    pub fn insert(&self, key: K, value: &Arc<V>) {
        self.entries_write().insert(key, Arc::downgrade(value));
    }

    /// Remove the entry for `key`, live or dangling. Returns whether an
    /// entry was present.
    pub fn remove(&self, key: &K) -> bool {
        let removed = self.entries_write().remove(key).is_some();
        if removed {
            self.stats_write().invalidations += 1;
        }
        removed
    }

    /// Number of entries, counting dangling ones not yet swept.
    pub fn len(&self) -> usize {
        self.entries_read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries_read().is_empty()
    }

    /// Drop entries whose value has been reclaimed; returns the number
    /// removed. Safe to call concurrently and redundantly.
    pub fn sweep(&self) -> usize {
        let removed = {
            let mut entries = self.entries_write();
            let before = entries.len();
            entries.retain(|_, weak| weak.strong_count() > 0);
            before - entries.len()
        };
        if removed > 0 {
            trace!(removed, "swept reclaimed cache entries");
            self.stats_write().reclaimed_evictions += removed as u64;
        }
        removed
    }

    /// Remove every entry; returns the number removed.
    pub fn clear(&self) -> usize {
        let removed = {
            let mut entries = self.entries_write();
            let count = entries.len();
            entries.clear();
            count
        };
        if removed > 0 {
            self.stats_write().invalidations += removed as u64;
        }
        removed
    }

    /// Snapshot of the cache counters.
    pub fn stats(&self) -> CacheStats {
        let mut stats = {
            self.stats
                .read()
                .unwrap_or_else(|e| e.into_inner())
                .clone()
        };
        stats.current_entries = self.len();
        stats
    }
}

impl<K, V> Default for WeakValueCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
