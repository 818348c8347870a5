//! # Cryptographic Primitives
//!
//! The constructor never holds private keys and never verifies signatures;
//! verification is the chain's job. What remains is hashing: address
//! checksums and transaction content hashes. Everything here is a thin
//! wrapper around `sha2`.

pub mod hash;

pub use hash::{checksum, double_sha256, sha256, url_safe_digest};
