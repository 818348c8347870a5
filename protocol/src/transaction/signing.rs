//! Attaching client signatures to unsigned transactions.
//!
//! Signing happens off-box. The client signs the hex payload returned by the
//! builder and sends back the raw signature; [`combine`] slots it into the
//! transaction. The signature is not verified here. That is the chain's job.

use tracing::debug;

use super::envelope::TxnType;
use super::types::PaymentV2;
use crate::error::{ConstructorError, Result};

/// Attaches a hex-encoded signature to an unsigned transaction string and
/// returns the signed transaction string.
///
/// Any signature already present is replaced. Types other than `paymentV2`
/// fail with [`ConstructorError::UnrecognizedTransactionType`].
pub fn combine(unsigned_txn: &str, signature_hex: &str) -> Result<String> {
    let txn_type = TxnType::sniff(unsigned_txn)?;
    if txn_type != TxnType::PaymentV2 {
        return Err(ConstructorError::UnrecognizedTransactionType(
            txn_type.to_string(),
        ));
    }

    let signature = decode_signature(signature_hex)?;
    let mut txn = PaymentV2::from_txn_string(unsigned_txn)?;
    let replaced = txn.signature.replace(signature).is_some();

    debug!(payer = %txn.payer, nonce = txn.nonce, replaced, "combined signature");
    Ok(txn.to_txn_string())
}

fn decode_signature(signature_hex: &str) -> Result<Vec<u8>> {
    if signature_hex.is_empty() {
        return Err(ConstructorError::MalformedRequest(
            "signature hex_bytes is empty".into(),
        ));
    }
    hex::decode(signature_hex).map_err(|e| {
        ConstructorError::MalformedRequest(format!("signature is not hex: {}", e))
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const UNSIGNED: &str = "qgFbCiEBLJnIwTufEieDu4PCwL8IQ61NossYIMd+naSI+GOxMA8SLwohERScOaI8yP5Z6mT3diJhv96zh9jplpgcOpbQvaAkmnHwEGQYsODAgYOGjJgwGLiRAiCfCg==";
    const SIGNED: &str = "qgGdAQohASyZyME7nxIng7uDwsC/CEOtTaLLGCDHfp2kiPhjsTAPEi8KIREUnDmiPMj+Wepk93YiYb/es4fY6ZaYHDqW0L2gJJpx8BBkGLDgwIGDhoyYMBi4kQIgnwoqQAABAgMEBQYHCAkKCwwNDg8QERITFBUWFxgZGhscHR4fICEiIyQlJicoKSorLC0uLzAxMjM0NTY3ODk6Ozw9Pj8=";

    fn counting_signature() -> String {
        hex::encode((0u8..64).collect::<Vec<u8>>())
    }

    #[test]
    fn combine_matches_recorded_value() {
        assert_eq!(combine(UNSIGNED, &counting_signature()).unwrap(), SIGNED);
    }

    #[test]
    fn combine_replaces_prior_signature() {
        let first = combine(UNSIGNED, &"ff".repeat(64)).unwrap();
        assert_eq!(combine(&first, &counting_signature()).unwrap(), SIGNED);
    }

    #[test]
    fn combine_keeps_everything_but_the_signature() {
        let signed = PaymentV2::from_txn_string(SIGNED).unwrap();
        let unsigned = PaymentV2::from_txn_string(UNSIGNED).unwrap();
        assert_eq!(signed.unsigned_bytes(), unsigned.unsigned_bytes());
        assert!(signed.is_signed());
        assert!(!unsigned.is_signed());
    }

    #[test]
    fn combine_rejects_bad_signatures() {
        for bad in ["", "xyz", "abc"] {
            let err = combine(UNSIGNED, bad).unwrap_err();
            assert!(matches!(err, ConstructorError::MalformedRequest(_)), "{:?}", bad);
        }
    }

    #[test]
    fn combine_rejects_garbage_transactions() {
        let err = combine("not a txn", &counting_signature()).unwrap_err();
        assert!(matches!(err, ConstructorError::MalformedTransaction(_)));
    }
}
