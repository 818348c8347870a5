//! The `blockchain_txn` envelope and its self-describing string form.
//!
//! Every chain transaction travels wrapped in a `blockchain_txn` message: a
//! oneof whose populated field number names the transaction type. The
//! string form handed to and returned by clients is the standard base64 of
//! that envelope.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::fmt;

use super::types::PaymentV2;
use crate::error::{ConstructorError, Result};
use crate::wire::{FieldValue, Reader, Writer};

/// Envelope field carrying a `blockchain_txn_payment_v1`.
pub const PAYMENT_FIELD: u32 = 8;
/// Envelope field carrying a `blockchain_txn_payment_v2`.
pub const PAYMENT_V2_FIELD: u32 = 21;

/// Names of the other envelope members, by field number.
const KNOWN_TYPES: &[(u32, &str)] = &[
    (1, "addGateway"),
    (2, "assertLocation"),
    (3, "coinbase"),
    (4, "createHtlc"),
    (5, "genGateway"),
    (6, "consensusGroup"),
    (7, "oui"),
    (9, "pocRequest"),
    (10, "pocReceipts"),
    (11, "redeemHtlc"),
    (12, "routing"),
    (13, "securityCoinbase"),
    (14, "securityExchange"),
    (15, "tokenBurn"),
    (16, "dcCoinbase"),
    (17, "tokenBurnExchangeRate"),
    (18, "bundle"),
    (19, "vars"),
    (20, "rewards"),
];

/// The transaction type declared by an envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxnType {
    Payment,
    PaymentV2,
    Other(u32),
}

impl TxnType {
    pub fn from_field(field: u32) -> Self {
        match field {
            PAYMENT_FIELD => Self::Payment,
            PAYMENT_V2_FIELD => Self::PaymentV2,
            other => Self::Other(other),
        }
    }

    pub fn field(self) -> u32 {
        match self {
            Self::Payment => PAYMENT_FIELD,
            Self::PaymentV2 => PAYMENT_V2_FIELD,
            Self::Other(field) => field,
        }
    }

    /// Decodes a transaction string just far enough to learn its type.
    pub fn sniff(txn: &str) -> Result<Self> {
        let envelope = decode_txn_string(txn)?;
        let (field, _) = envelope_body(&envelope)?;
        Ok(Self::from_field(field))
    }
}

impl fmt::Display for TxnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Payment => write!(f, "payment"),
            Self::PaymentV2 => write!(f, "paymentV2"),
            Self::Other(field) => match KNOWN_TYPES.iter().find(|(n, _)| n == field) {
                Some((_, name)) => write!(f, "{}", name),
                None => write!(f, "unknown (envelope field {})", field),
            },
        }
    }
}

/// Base64-decodes a transaction string into envelope bytes.
pub fn decode_txn_string(txn: &str) -> Result<Vec<u8>> {
    if txn.is_empty() {
        return Err(ConstructorError::MalformedTransaction(
            "transaction string is empty".into(),
        ));
    }
    STANDARD
        .decode(txn.trim())
        .map_err(|e| ConstructorError::MalformedTransaction(format!("not base64: {}", e)))
}

/// Returns the populated oneof member of an envelope. As with any protobuf
/// oneof, the last member on the wire wins.
fn envelope_body(envelope: &[u8]) -> Result<(u32, &[u8])> {
    let mut body = None;
    let mut r = Reader::new(envelope);
    while let Some((field, value)) = r.next_field()? {
        match value {
            FieldValue::Bytes(bytes) => body = Some((field, bytes)),
            _ => {
                return Err(ConstructorError::MalformedTransaction(format!(
                    "envelope field {} is not a message",
                    field
                )))
            }
        }
    }
    body.ok_or_else(|| {
        ConstructorError::MalformedTransaction("transaction envelope is empty".into())
    })
}

impl PaymentV2 {
    /// Encodes the full transaction inside a `blockchain_txn` envelope.
    pub fn envelope_bytes(&self) -> Vec<u8> {
        let mut w = Writer::new();
        w.message(PAYMENT_V2_FIELD, &self.to_bytes());
        w.into_bytes()
    }

    /// The self-describing string form: base64 of the envelope.
    pub fn to_txn_string(&self) -> String {
        STANDARD.encode(self.envelope_bytes())
    }

    /// Parses a transaction string, rejecting any type other than
    /// `paymentV2` with [`ConstructorError::UnrecognizedTransactionType`].
    pub fn from_txn_string(txn: &str) -> Result<Self> {
        let envelope = decode_txn_string(txn)?;
        let (field, body) = envelope_body(&envelope)?;
        match TxnType::from_field(field) {
            TxnType::PaymentV2 => PaymentV2::decode(body),
            other => Err(ConstructorError::UnrecognizedTransactionType(
                other.to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::Address;
    use crate::transaction::types::{Memo, Payment};

    const UNSIGNED: &str = "qgFbCiEBLJnIwTufEieDu4PCwL8IQ61NossYIMd+naSI+GOxMA8SLwohERScOaI8yP5Z6mT3diJhv96zh9jplpgcOpbQvaAkmnHwEGQYsODAgYOGjJgwGLiRAiCfCg==";

    fn sample() -> PaymentV2 {
        PaymentV2 {
            payer: Address::from_b58("13HPSdf8Ng8E2uKpLm8Ba3sQ6wdNimTcaKXYmMkHyTUUeUELPwJ")
                .unwrap(),
            payments: vec![Payment {
                payee: Address::from_b58("1aCjThQENE7h1r8qQ52H2P1hCN53uBR6sVrr4MKJPh4Bg8dVqbY")
                    .unwrap(),
                amount: 100,
                memo: Some(Memo::default_token()),
            }],
            fee: 35_000,
            nonce: 1311,
            signature: None,
        }
    }

    #[test]
    fn txn_string_matches_recorded_value() {
        assert_eq!(sample().to_txn_string(), UNSIGNED);
        assert_eq!(PaymentV2::from_txn_string(UNSIGNED).unwrap(), sample());
    }

    #[test]
    fn sniff_reports_payment_v2() {
        assert_eq!(TxnType::sniff(UNSIGNED).unwrap(), TxnType::PaymentV2);
        assert_eq!(TxnType::PaymentV2.to_string(), "paymentV2");
    }

    #[test]
    fn other_types_are_rejected_by_name() {
        let mut w = Writer::new();
        w.message(PAYMENT_FIELD, &sample().to_bytes());
        let v1 = STANDARD.encode(w.into_bytes());

        assert_eq!(TxnType::sniff(&v1).unwrap(), TxnType::Payment);
        assert_eq!(
            PaymentV2::from_txn_string(&v1).unwrap_err(),
            ConstructorError::UnrecognizedTransactionType("payment".into())
        );

        let mut w = Writer::new();
        w.message(15, &[]);
        let burn = STANDARD.encode(w.into_bytes());
        assert_eq!(
            PaymentV2::from_txn_string(&burn).unwrap_err(),
            ConstructorError::UnrecognizedTransactionType("tokenBurn".into())
        );
    }

    #[test]
    fn unknown_field_numbers_are_reported() {
        assert_eq!(
            TxnType::Other(99).to_string(),
            "unknown (envelope field 99)"
        );
    }

    #[test]
    fn garbage_is_malformed() {
        for bad in ["", "!!!", "AA=="] {
            let err = PaymentV2::from_txn_string(bad).unwrap_err();
            assert!(
                matches!(err, ConstructorError::MalformedTransaction(_)),
                "{:?} -> {:?}",
                bad,
                err
            );
        }
    }
}
