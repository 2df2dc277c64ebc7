//! pinvault-crypto: password-based file encryption for pinvault
//!
//! Envelope format (binary, no version byte, no length prefixes):
//! ```text
//! [16 bytes: salt][12 bytes: IV][N bytes: AES-256-GCM ciphertext][16 bytes: tag]
//! ```
//!
//! Key = PBKDF2-HMAC-SHA256(password, salt, 100_000 iterations, 32 bytes).
//! The salt travels inside the envelope, so the same password reconstructs
//! the key on any client without the key ever leaving memory.

pub mod cipher;
pub mod envelope;
pub mod error;
pub mod integrity;
pub mod kdf;

pub use cipher::{EncryptedFile, FileCipher};
pub use envelope::{decode, encode, EnvelopeParts};
pub use error::{CryptoError, CryptoResult};
pub use integrity::{sha256_hex, verify_integrity};
pub use kdf::{derive_key, DerivedKey, KdfParams};

/// Size of a derived AES-256 key in bytes
pub const KEY_SIZE: usize = 32;

/// Size of the per-envelope KDF salt
pub const SALT_SIZE: usize = 16;

/// Size of an AES-GCM IV (96-bit)
pub const IV_SIZE: usize = 12;

/// Size of a GCM authentication tag
pub const TAG_SIZE: usize = 16;

/// Fixed envelope header: salt + IV
pub const HEADER_SIZE: usize = SALT_SIZE + IV_SIZE;
