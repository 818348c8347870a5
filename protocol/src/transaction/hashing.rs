//! Transaction content hashes.
//!
//! The hash identifies what a transaction does, not a particular signed copy
//! of it: it is computed over the unsigned canonical encoding, so it is the
//! same before and after combine.

use super::types::PaymentV2;
use crate::crypto::hash::url_safe_digest;
use crate::error::Result;

/// URL-safe base64 (unpadded) SHA-256 of the unsigned encoding.
pub fn compute_hash(txn: &str) -> Result<String> {
    let txn = PaymentV2::from_txn_string(txn)?;
    Ok(hash_payment(&txn))
}

/// Hash of an already-decoded transaction. Any signature is ignored.
pub fn hash_payment(txn: &PaymentV2) -> String {
    url_safe_digest(&txn.unsigned_bytes())
}
