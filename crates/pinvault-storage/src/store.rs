//! Content-addressed storage abstraction.

use async_trait::async_trait;

use crate::error::StorageResult;

/// Opaque content-addressed storage: bytes in, CID out, and back.
///
/// Pinning, replication and gateway failover are the backend's business.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Short backend name for logs and status output.
    fn backend_name(&self) -> &'static str;

    /// Whether CIDs from this store are real IPFS content identifiers.
    fn is_real_ipfs(&self) -> bool;

    /// Store `bytes` and return the content identifier.
    async fn put(&self, name: &str, bytes: &[u8]) -> StorageResult<String>;

    /// Fetch the bytes for `cid`.
    async fn get(&self, cid: &str) -> StorageResult<Vec<u8>>;

    /// Unpin / delete `cid`.
    async fn remove(&self, cid: &str) -> StorageResult<()>;

    /// Lightweight reachability/credential probe.
    async fn ping(&self) -> StorageResult<()>;
}
