//! # Hashing Utilities
//!
//! SHA-256 in the three shapes the constructor needs:
//!
//! - **`sha256`**: transaction content hashes are SHA-256 over the
//!   unsigned canonical encoding.
//! - **`double_sha256`**: base-58 address checksums are the first four
//!   bytes of SHA-256 applied twice.
//! - **`url_safe_digest`**: the transport form of a transaction hash,
//!   URL-safe base64 without padding.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use sha2::{Digest, Sha256};

/// Length of a base-58 address checksum.
pub const CHECKSUM_LENGTH: usize = 4;

/// Compute the SHA-256 hash of the input data.
///
/// # Example
///
/// ```
/// use constructor_protocol::crypto::sha256;
///
/// let hash = sha256(b"payment");
/// assert_eq!(hash.len(), 32);
/// ```
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Compute `SHA-256(SHA-256(data))`.
pub fn double_sha256(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

/// First [`CHECKSUM_LENGTH`] bytes of the double SHA-256 of `data`.
pub fn checksum(data: &[u8]) -> [u8; CHECKSUM_LENGTH] {
    let digest = double_sha256(data);
    let mut out = [0u8; CHECKSUM_LENGTH];
    out.copy_from_slice(&digest[..CHECKSUM_LENGTH]);
    out
}

/// SHA-256 of `data`, rendered as URL-safe base64 with padding stripped.
///
/// Any client holding the same bytes computes the same string, which is
/// what makes it usable as a transaction identifier across the wire.
pub fn url_safe_digest(data: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(sha256(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_known_vector() {
        // NIST FIPS 180-2 "abc" vector.
        assert_eq!(
            hex::encode(sha256(b"abc")),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn double_sha256_differs_from_single() {
        let data = b"helium";
        assert_ne!(sha256(data), double_sha256(data));
        assert_eq!(double_sha256(data), sha256(&sha256(data)));
    }

    #[test]
    fn checksum_is_prefix_of_double_hash() {
        let data = b"address payload";
        assert_eq!(checksum(data)[..], double_sha256(data)[..CHECKSUM_LENGTH]);
    }

    #[test]
    fn url_safe_digest_has_no_padding_or_unsafe_chars() {
        let inputs: [&[u8]; 4] = [b"", b"a", b"payment v2", &[0xffu8; 97]];
        for input in inputs {
            let digest = url_safe_digest(input);
            // 32 bytes -> 43 unpadded base64 chars.
            assert_eq!(digest.len(), 43);
            assert!(!digest.contains('='));
            assert!(!digest.contains('+'));
            assert!(!digest.contains('/'));
        }
    }

    #[test]
    fn url_safe_digest_is_deterministic() {
        assert_eq!(url_safe_digest(b"same"), url_safe_digest(b"same"));
        assert_ne!(url_safe_digest(b"same"), url_safe_digest(b"other"));
    }
}
