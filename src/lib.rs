pub mod cache;
pub mod error;
pub mod hostkey;
pub mod node;
pub mod signature;

pub use error::KeyStoreError;
pub use hostkey::{FsRecordStorage, HostKey, HostKeyStore, RecordStorage};
pub use node::NodeId;
pub use signature::{SignatureAlgorithm, SignatureResolver};
