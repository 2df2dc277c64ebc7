//! Envelope codec
//!
//! ```text
//! offset 0   16 bytes  salt
//! offset 16  12 bytes  IV
//! offset 28  N bytes   ciphertext || 16-byte GCM tag
//! ```
//!
//! The offsets are a wire contract shared with every envelope already
//! pinned; they cannot move without a new envelope version. Decoding only
//! splits bytes; authentication happens in `FileCipher::decrypt`.

use crate::error::{CryptoError, CryptoResult};
use crate::{HEADER_SIZE, IV_SIZE, SALT_SIZE};

/// A decoded envelope, borrowing the ciphertext from the input buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvelopeParts<'a> {
    pub salt: [u8; SALT_SIZE],
    pub iv: [u8; IV_SIZE],
    pub ciphertext: &'a [u8],
}

/// Concatenate salt, IV and ciphertext into one envelope.
pub fn encode(salt: &[u8; SALT_SIZE], iv: &[u8; IV_SIZE], ciphertext: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_SIZE + ciphertext.len());
    out.extend_from_slice(salt);
    out.extend_from_slice(iv);
    out.extend_from_slice(ciphertext);
    out
}

/// Split an envelope into its segments.
///
/// Fails with `MalformedEnvelope` when the input is shorter than the
/// 28-byte header.
pub fn decode(envelope: &[u8]) -> CryptoResult<EnvelopeParts<'_>> {
    if envelope.len() < HEADER_SIZE {
        return Err(CryptoError::MalformedEnvelope {
            len: envelope.len(),
        });
    }

    let (salt_bytes, rest) = envelope.split_at(SALT_SIZE);
    let (iv_bytes, ciphertext) = rest.split_at(IV_SIZE);

    let mut salt = [0u8; SALT_SIZE];
    salt.copy_from_slice(salt_bytes);
    let mut iv = [0u8; IV_SIZE];
    iv.copy_from_slice(iv_bytes);

    Ok(EnvelopeParts {
        salt,
        iv,
        ciphertext,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_layout_offsets() {
        let salt = [0x11u8; SALT_SIZE];
        let iv = [0x22u8; IV_SIZE];
        let envelope = encode(&salt, &iv, b"cipher");

        assert_eq!(&envelope[..16], &salt);
        assert_eq!(&envelope[16..28], &iv);
        assert_eq!(&envelope[28..], b"cipher");
    }

    #[test]
    fn test_decode_header_only() {
        let envelope = [0u8; HEADER_SIZE];
        let parts = decode(&envelope).unwrap();
        assert!(parts.ciphertext.is_empty());
    }

    #[test]
    fn test_decode_one_byte_short() {
        let envelope = [0u8; HEADER_SIZE - 1];
        assert_eq!(
            decode(&envelope),
            Err(CryptoError::MalformedEnvelope { len: 27 })
        );
    }

    #[test]
    fn test_decode_empty() {
        assert_eq!(decode(&[]), Err(CryptoError::MalformedEnvelope { len: 0 }));
    }

    proptest! {
        #[test]
        fn short_inputs_are_malformed(
            data in proptest::collection::vec(any::<u8>(), 0..HEADER_SIZE),
        ) {
            let is_malformed = matches!(decode(&data), Err(CryptoError::MalformedEnvelope { .. }));
            prop_assert!(is_malformed);
        }
    }
}
