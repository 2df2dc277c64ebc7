//! Upload, fetch and delete workflows tying the content store, the cipher
//! and the library together.

use std::sync::Arc;

use chrono::Utc;
use pinvault_core::types::OCTET_STREAM;
use pinvault_core::FileMetadata;
use pinvault_crypto::{sha256_hex, verify_integrity, FileCipher};
use pinvault_storage::ContentStore;
use secrecy::SecretString;
use tracing::{debug, info, warn};

use crate::error::{LibraryError, LibraryResult};
use crate::folder;
use crate::library::{FolderRemoval, Library};
use crate::record::UploadRecord;

/// Suffix given to encrypted envelopes in the content store
pub const ENCRYPTED_SUFFIX: &str = ".encrypted";

/// A downloaded file, decrypted if it was stored encrypted
#[derive(Debug, Clone)]
pub struct FetchedFile {
    pub bytes: Vec<u8>,
    pub metadata: FileMetadata,
}

pub struct UploadService {
    store: Arc<dyn ContentStore>,
    cipher: FileCipher,
}

impl UploadService {
    pub fn new(store: Arc<dyn ContentStore>, cipher: FileCipher) -> Self {
        Self { store, cipher }
    }

    /// Store `bytes` as-is and record them in `folder`.
    pub async fn upload(
        &self,
        library: &mut Library,
        name: &str,
        bytes: Vec<u8>,
        folder: &str,
    ) -> LibraryResult<UploadRecord> {
        let folder = existing_folder(library, folder)?;
        let metadata = FileMetadata::for_file(name, bytes.len() as u64);

        let record = self
            .pin(library.owner(), &metadata.name, &metadata.mime_type, &bytes, folder)
            .await?;
        library.add(record.clone())?;
        Ok(record)
    }

    /// Encrypt `bytes` under `password`, store the envelope as
    /// `<name>.encrypted` and record the original name, type and size.
    pub async fn upload_encrypted(
        &self,
        library: &mut Library,
        name: &str,
        bytes: Vec<u8>,
        password: SecretString,
        folder: &str,
    ) -> LibraryResult<UploadRecord> {
        let folder = existing_folder(library, folder)?;
        let metadata = FileMetadata::for_file(name, bytes.len() as u64);

        let cipher = self.cipher.clone();
        let encrypted =
            tokio::task::spawn_blocking(move || cipher.encrypt(&bytes, &password, metadata))
                .await
                .map_err(|e| LibraryError::Task(e.to_string()))??;

        let stored_name = format!("{}{ENCRYPTED_SUFFIX}", encrypted.metadata.name);
        let mut record = self
            .pin(library.owner(), &stored_name, OCTET_STREAM, &encrypted.envelope, folder)
            .await?;

        let original = encrypted.metadata;
        record.name = original.name.clone();
        record.encrypted = true;
        record.original_name = Some(original.name);
        record.original_type = Some(original.mime_type);
        record.original_size = Some(original.size);

        library.add(record.clone())?;
        Ok(record)
    }

    async fn pin(
        &self,
        owner: &str,
        name: &str,
        mime_type: &str,
        bytes: &[u8],
        folder: String,
    ) -> LibraryResult<UploadRecord> {
        let sha256 = sha256_hex(bytes);
        let cid = self.store.put(name, bytes).await?;
        info!(
            name,
            %cid,
            bytes = bytes.len(),
            backend = self.store.backend_name(),
            "uploaded"
        );

        Ok(UploadRecord {
            cid,
            name: name.to_string(),
            size: bytes.len() as u64,
            mime_type: mime_type.to_string(),
            sha256,
            uploaded_at: Utc::now(),
            owner: owner.to_string(),
            folder,
            encrypted: false,
            original_name: None,
            original_type: None,
            original_size: None,
            is_real_ipfs: self.store.is_real_ipfs(),
        })
    }

    /// Download a recorded upload, check its hash and decrypt it if needed.
    pub async fn fetch(
        &self,
        record: &UploadRecord,
        password: Option<SecretString>,
    ) -> LibraryResult<FetchedFile> {
        let bytes = self.store.get(&record.cid).await?;
        if !verify_integrity(&bytes, &record.sha256) {
            return Err(LibraryError::IntegrityMismatch {
                cid: record.cid.clone(),
            });
        }

        let metadata = record.restored_metadata();
        if !record.encrypted {
            return Ok(FetchedFile { bytes, metadata });
        }

        let password =
            password.ok_or_else(|| LibraryError::PasswordRequired(record.cid.clone()))?;
        let cipher = self.cipher.clone();
        let plaintext = tokio::task::spawn_blocking(move || cipher.decrypt(&bytes, &password))
            .await
            .map_err(|e| LibraryError::Task(e.to_string()))??;

        Ok(FetchedFile {
            bytes: plaintext,
            metadata,
        })
    }

    /// Unpin and forget a record. An unpin failure is logged and the record
    /// is removed locally anyway.
    pub async fn delete(&self, library: &mut Library, cid: &str) -> LibraryResult<UploadRecord> {
        let record = library
            .get(cid)
            .cloned()
            .ok_or_else(|| LibraryError::NotFound(cid.to_string()))?;

        self.unpin(&record).await;
        library.remove(cid);
        Ok(record)
    }

    /// Delete a folder subtree and unpin every record it held.
    pub async fn delete_folder(
        &self,
        library: &mut Library,
        path: &str,
    ) -> LibraryResult<FolderRemoval> {
        let removal = library.delete_folder(path)?;
        for record in &removal.records {
            self.unpin(record).await;
        }
        Ok(removal)
    }

    async fn unpin(&self, record: &UploadRecord) {
        // only the backend that produced a CID can release it
        if record.is_real_ipfs != self.store.is_real_ipfs() {
            debug!(
                cid = %record.cid,
                backend = self.store.backend_name(),
                "record belongs to another backend, removing locally only"
            );
            return;
        }
        if let Err(e) = self.store.remove(&record.cid).await {
            warn!(cid = %record.cid, "unpin failed, removing record anyway: {e}");
        }
    }
}

fn existing_folder(library: &Library, folder: &str) -> LibraryResult<String> {
    let folder = folder::normalize(folder);
    if !library.folder_exists(&folder) {
        return Err(LibraryError::FolderNotFound(folder));
    }
    Ok(folder)
}
