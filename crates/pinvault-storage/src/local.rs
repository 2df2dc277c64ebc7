//! Simulated IPFS backed by a local directory.
//!
//! Used when no pinning credentials are configured. CIDs are `Qm` followed by
//! the first 44 hex characters of the content's SHA-256, so identical bytes
//! always map to the same blob. They are not real IPFS identifiers and will
//! not resolve on any public gateway.

use std::path::PathBuf;

use async_trait::async_trait;
use pinvault_crypto::sha256_hex;
use tracing::{debug, warn};

use crate::error::{StorageError, StorageResult};
use crate::store::ContentStore;

const SIMULATED_PREFIX: &str = "Qm";
const SIMULATED_HEX_LEN: usize = 44;

/// Simulated CID for `bytes`.
pub fn simulated_cid(bytes: &[u8]) -> String {
    let hash = sha256_hex(bytes);
    format!("{SIMULATED_PREFIX}{}", &hash[..SIMULATED_HEX_LEN])
}

#[derive(Debug, Clone)]
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        warn!(
            dir = %dir.display(),
            "no pinning credentials configured, using simulated IPFS (content is local only)"
        );
        Self { dir }
    }

    fn blob_path(&self, cid: &str) -> StorageResult<PathBuf> {
        if cid.is_empty() || !cid.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(StorageError::NotFound(cid.to_string()));
        }
        Ok(self.dir.join(cid))
    }
}

#[async_trait]
impl ContentStore for LocalStore {
    fn backend_name(&self) -> &'static str {
        "local"
    }

    fn is_real_ipfs(&self) -> bool {
        false
    }

    async fn put(&self, name: &str, bytes: &[u8]) -> StorageResult<String> {
        let cid = simulated_cid(bytes);
        let path = self.blob_path(&cid)?;

        tokio::fs::create_dir_all(&self.dir).await?;

        // Write to a temp file then rename so readers never see a partial blob
        let tmp = self.dir.join(format!(".{cid}.tmp"));
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;

        debug!(name, %cid, bytes = bytes.len(), "stored blob locally");
        Ok(cid)
    }

    async fn get(&self, cid: &str) -> StorageResult<Vec<u8>> {
        let path = self.blob_path(cid)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(cid.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn remove(&self, cid: &str) -> StorageResult<()> {
        let path = self.blob_path(cid)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(cid, "blob already absent");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn ping(&self) -> StorageResult<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let meta = tokio::fs::metadata(&self.dir).await?;
        if !meta.is_dir() {
            return Err(StorageError::Config(format!(
                "{} is not a directory",
                self.dir.display()
            )));
        }
        Ok(())
    }
}
