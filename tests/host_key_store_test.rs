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

//! End-to-end tests for the host key store over filesystem-backed storage

use nodekeys::{FsRecordStorage, HostKey, HostKeyStore, NodeId};
use std::sync::Arc;
use tempfile::TempDir;

#[test]
fn test_record_survives_process_restart() {
    let dir = TempDir::new().unwrap();
    let node = NodeId::from("worker-1");
    let key = HostKey::new("ssh-ed25519", vec![10, 20, 30]).with_comment("first boot");

    {
        let store = HostKeyStore::new(FsRecordStorage::new(dir.path()));
        store.put(&node, key.clone()).unwrap();
    }

    // A fresh store over the same root sees the durable record.
    let store = HostKeyStore::new(FsRecordStorage::new(dir.path()));
    let loaded = store.get(&node).unwrap().unwrap();
    assert_eq!(*loaded, key);
}

#[test]
fn test_records_are_isolated_per_node() {
    let dir = TempDir::new().unwrap();
    let store = HostKeyStore::new(FsRecordStorage::new(dir.path()));

    let _a = store
        .put(&NodeId::from("worker-a"), HostKey::new("ssh-rsa", vec![1]))
        .unwrap();
    let _b = store
        .put(
            &NodeId::from("worker-b"),
            HostKey::new("ssh-ed25519", vec![2]),
        )
        .unwrap();

    let a = store.get(&NodeId::from("worker-a")).unwrap().unwrap();
    let b = store.get(&NodeId::from("worker-b")).unwrap().unwrap();
    assert_eq!(a.algorithm(), "ssh-rsa");
    assert_eq!(b.algorithm(), "ssh-ed25519");
    assert!(store.get(&NodeId::from("worker-c")).unwrap().is_none());
}

#[test]
fn test_invalidate_forces_reload_without_data_loss() {
    let dir = TempDir::new().unwrap();
    let store = HostKeyStore::new(FsRecordStorage::new(dir.path()));
    let node = NodeId::from("worker-1");

    let held = store
        .put(&node, HostKey::new("ecdsa-sha2-nistp521", vec![5; 16]))
        .unwrap();
    assert!(store.invalidate(&node));

    let reloaded = store.get(&node).unwrap().unwrap();
    assert_eq!(*reloaded, *held);
}

#[test]
fn test_concurrent_get_put_converges_on_last_write() {
    use std::thread;

    let dir = TempDir::new().unwrap();
    let store = Arc::new(HostKeyStore::new(FsRecordStorage::new(dir.path())));
    let node = NodeId::from("worker-1");

    let mut handles = Vec::new();
    for t in 0..8u8 {
        let store = Arc::clone(&store);
        let node = node.clone();
        handles.push(thread::spawn(move || {
            let mut held = Vec::new();
            for i in 0..50u8 {
                if t % 2 == 0 {
                    let key = HostKey::new("ssh-ed25519", vec![t, i]);
                    held.push(store.put(&node, key).unwrap());
                } else {
                    let _ = store.get(&node).unwrap();
                    store.sweep_reclaimed();
                }
            }
            held
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    // A put that completes after the contention is visible to every
    // subsequent get, from the cache and from a forced reload alike.
    let last = HostKey::new("ssh-ed25519", vec![255]);
    let _held = store.put(&node, last.clone()).unwrap();
    assert_eq!(*store.get(&node).unwrap().unwrap(), last);
    store.invalidate(&node);
    assert_eq!(*store.get(&node).unwrap().unwrap(), last);
}

#[test]
fn test_trust_flow_updates_resolver_inputs() {
    // Re-trusting a node with a different key type changes what get returns
    // wholesale; no merging of records.
    let dir = TempDir::new().unwrap();
    let store = HostKeyStore::new(FsRecordStorage::new(dir.path()));
    let node = NodeId::from("worker-1");

    let _rsa = store
        .put(
            &node,
            HostKey::new("ssh-rsa", vec![1; 32]).with_comment("initial trust"),
        )
        .unwrap();
    let _ed = store
        .put(&node, HostKey::new("ssh-ed25519", vec![2; 32]))
        .unwrap();

    let current = store.get(&node).unwrap().unwrap();
    assert_eq!(current.algorithm(), "ssh-ed25519");
    assert_eq!(current.comment(), None);
}
