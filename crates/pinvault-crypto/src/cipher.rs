//! Encrypt / decrypt operations over whole files

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use pinvault_core::FileMetadata;
use rand::{rngs::OsRng, RngCore};
use secrecy::SecretString;

use crate::envelope;
use crate::error::{CryptoError, CryptoResult};
use crate::kdf::{derive_key, KdfParams};
use crate::{IV_SIZE, SALT_SIZE};

/// An encrypted envelope plus the metadata needed to restore the file.
///
/// The envelope carries no name or type; callers must persist `metadata`
/// themselves (the upload library does).
#[derive(Debug, Clone)]
pub struct EncryptedFile {
    pub envelope: Vec<u8>,
    pub metadata: FileMetadata,
}

/// Password-based file cipher.
///
/// Stateless apart from its KDF parameters; construct one and pass it to
/// whatever needs to encrypt or decrypt.
#[derive(Debug, Clone, Default)]
pub struct FileCipher {
    params: KdfParams,
}

impl FileCipher {
    pub fn new(params: KdfParams) -> Self {
        Self { params }
    }

    /// Encrypt `plaintext` under `password`.
    ///
    /// A fresh random salt and IV are drawn on every call, so encrypting the
    /// same bytes twice never yields the same envelope.
    pub fn encrypt(
        &self,
        plaintext: &[u8],
        password: &SecretString,
        metadata: FileMetadata,
    ) -> CryptoResult<EncryptedFile> {
        let mut salt = [0u8; SALT_SIZE];
        let mut iv = [0u8; IV_SIZE];
        OsRng
            .try_fill_bytes(&mut salt)
            .and_then(|_| OsRng.try_fill_bytes(&mut iv))
            .map_err(|e| CryptoError::EncryptionFailed(format!("secure random source: {e}")))?;

        let key = derive_key(password, &salt, &self.params);
        let cipher = Aes256Gcm::new(key.as_bytes().into());

        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&iv), plaintext)
            .map_err(|e| CryptoError::EncryptionFailed(format!("AES-GCM seal: {e}")))?;

        let envelope = envelope::encode(&salt, &iv, &ciphertext);
        tracing::debug!(
            plaintext_len = plaintext.len(),
            envelope_len = envelope.len(),
            "encrypted file"
        );

        Ok(EncryptedFile { envelope, metadata })
    }

    /// Decrypt an envelope with `password`.
    ///
    /// Every failure (short envelope, wrong password, tampered bytes) comes
    /// back as `DecryptionFailed`. No plaintext is returned unless the GCM
    /// tag verifies.
    pub fn decrypt(&self, envelope: &[u8], password: &SecretString) -> CryptoResult<Vec<u8>> {
        let parts = envelope::decode(envelope).map_err(|e| {
            tracing::debug!(error = %e, "envelope rejected");
            CryptoError::DecryptionFailed
        })?;

        let key = derive_key(password, &parts.salt, &self.params);
        let cipher = Aes256Gcm::new(key.as_bytes().into());

        cipher
            .decrypt(Nonce::from_slice(&parts.iv), parts.ciphertext)
            .map_err(|_| CryptoError::DecryptionFailed)
    }
}
