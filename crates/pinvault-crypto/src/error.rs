use thiserror::Error;

use crate::HEADER_SIZE;

pub type CryptoResult<T> = Result<T, CryptoError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Raised by the codec only. `FileCipher::decrypt` folds it into
    /// `DecryptionFailed` so callers cannot tell the causes apart.
    #[error("malformed envelope: {len} bytes (minimum {HEADER_SIZE})")]
    MalformedEnvelope { len: usize },

    /// Wrong password, tampered ciphertext, or truncated/malformed envelope.
    #[error("incorrect password or corrupted file")]
    DecryptionFailed,

    #[error("encryption failed: {0}")]
    EncryptionFailed(String),
}
