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

use crate::error::KeyStoreError;
use crate::node::NodeId;
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing::debug;

/// Environment variable naming the per-node storage root when no explicit
/// root is injected.
pub const NODES_DIR_ENV: &str = "NODEKEYS_NODES_DIR";

/// Per-node record file inside the node's directory.
const RECORD_FILE_NAME: &str = "ssh-host-key.json";

/// Durable backing for trusted host key records.
///
/// One record per node; a write replaces the previous record wholesale. All
/// calls are blocking and run in the calling thread.
pub trait RecordStorage: Send + Sync {
    /// Read the raw record for `node`, or `None` when none has been written.
    fn read_record(&self, node: &NodeId) -> Result<Option<Vec<u8>>, KeyStoreError>;

    /// Write the raw record for `node`, replacing any previous one.
    fn write_record(&self, node: &NodeId, bytes: &[u8]) -> Result<(), KeyStoreError>;
}

/// Filesystem-backed record storage, one directory per node under a fixed
/// root: `<root>/<node-name>/ssh-host-key.json`.
pub struct FsRecordStorage {
    root: Option<PathBuf>,
}

impl FsRecordStorage {
    /// Storage rooted at an explicitly injected directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    /// Storage whose root is resolved from [`NODES_DIR_ENV`] on every access,
    /// so a root configured after construction is picked up and a root that
    /// goes away fails the operation rather than the constructor.
    pub fn from_env() -> Self {
        Self { root: None }
    }

    fn resolve_root(&self, node: &NodeId) -> Result<PathBuf, KeyStoreError> {
        match &self.root {
            Some(root) => Ok(root.clone()),
            None => std::env::var_os(NODES_DIR_ENV).map(PathBuf::from).ok_or_else(|| {
                KeyStoreError::StorageUnavailable {
                    node: node.name().to_string(),
                    reason: format!("{NODES_DIR_ENV} is not set"),
                }
            }),
        }
    }

    fn record_path(&self, node: &NodeId) -> Result<PathBuf, KeyStoreError> {
        let name = node.name();
        // The node name becomes a directory component; anything that could
        // escape the root is rejected rather than resolved.
        if name.is_empty()
            || name == "."
            || name == ".."
            || name.contains('/')
            || name.contains('\\')
        {
            return Err(KeyStoreError::StorageUnavailable {
                node: name.to_string(),
                reason: "node name is not a safe directory name".to_string(),
            });
        }
        Ok(self.resolve_root(node)?.join(name).join(RECORD_FILE_NAME))
    }
}

impl RecordStorage for FsRecordStorage {
    fn read_record(&self, node: &NodeId) -> Result<Option<Vec<u8>>, KeyStoreError> {
        let path = self.record_path(node)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(KeyStoreError::StorageUnavailable {
                node: node.name().to_string(),
                reason: format!("cannot read {}: {e}", path.display()),
            }),
        }
    }

    fn write_record(&self, node: &NodeId, bytes: &[u8]) -> Result<(), KeyStoreError> {
        let path = self.record_path(node)?;
        let write_failed = |source: io::Error| KeyStoreError::StorageWriteFailed {
            node: node.name().to_string(),
            source,
        };

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(write_failed)?;
        }

        // Write to a sibling temp file and rename so the record is replaced
        // atomically; readers see either the old record or the new one.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, bytes).map_err(write_failed)?;
        fs::rename(&tmp, &path).map_err(write_failed)?;

        debug!(node = %node, path = %path.display(), "wrote host key record");
        Ok(())
    }
}
