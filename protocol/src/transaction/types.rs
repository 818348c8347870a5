//! Core value types for payment transactions.
//!
//! A [`PaymentV2`] moves funds from one payer to an ordered list of payees.
//! Payment order is significant: it is preserved through encoding, signing,
//! and hashing.
//!
//! Wire schema (field numbers are part of the signed format):
//!
//! ```text
//! payment                    { bytes payee = 1; uint64 amount = 2; uint64 memo = 3; }
//! blockchain_txn_payment_v2  { bytes payer = 1; repeated payment payments = 2;
//!                              uint64 fee = 3; uint64 nonce = 4; bytes signature = 5; }
//! ```

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::address::Address;
use crate::config::{DEFAULT_MEMO_B64, MEMO_LENGTH};
use crate::error::{ConstructorError, Result};
use crate::wire::{Reader, Writer};

// ---------------------------------------------------------------------------
// Memo
// ---------------------------------------------------------------------------

const MEMO_DECODE_CONFIG: GeneralPurposeConfig =
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent);

/// Standard alphabet, padding optional.
const MEMO_STANDARD: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, MEMO_DECODE_CONFIG);

/// URL-safe alphabet, padding optional.
const MEMO_URL_SAFE: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, MEMO_DECODE_CONFIG);

/// An 8-byte payment annotation.
///
/// Carried in JSON as standard base64 and on the wire as a little-endian
/// `uint64`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Memo([u8; MEMO_LENGTH]);

impl Memo {
    /// Decodes a base64 memo. Padding is optional and the URL-safe alphabet
    /// is accepted as well. Anything that does not decode to exactly eight
    /// bytes is rejected.
    pub fn from_base64(b64: &str) -> Result<Self> {
        let invalid = |reason: String| ConstructorError::InvalidMemo {
            memo: b64.to_string(),
            reason,
        };

        let bytes = MEMO_STANDARD
            .decode(b64)
            .or_else(|e| MEMO_URL_SAFE.decode(b64).map_err(|_| e))
            .map_err(|e| invalid(format!("not base64: {}", e)))?;
        let arr: [u8; MEMO_LENGTH] = bytes.as_slice().try_into().map_err(|_| {
            invalid(format!(
                "decoded to {} bytes, expected {}",
                bytes.len(),
                MEMO_LENGTH
            ))
        })?;
        Ok(Self(arr))
    }

    /// The memo applied to payments that arrive without one: base64
    /// `MDAwMDAwMDA=`, i.e. the ASCII bytes `"00000000"`.
    pub fn default_token() -> Self {
        debug_assert_eq!(STANDARD.encode(b"00000000"), DEFAULT_MEMO_B64);
        Self(*b"00000000")
    }

    pub fn from_u64(value: u64) -> Self {
        Self(value.to_le_bytes())
    }

    /// Wire value: the eight bytes read as a little-endian integer.
    pub fn as_u64(&self) -> u64 {
        u64::from_le_bytes(self.0)
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.0)
    }

    pub fn as_bytes(&self) -> &[u8; MEMO_LENGTH] {
        &self.0
    }
}

impl fmt::Debug for Memo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Memo({})", self.to_base64())
    }
}

impl Serialize for Memo {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base64())
    }
}

impl<'de> Deserialize<'de> for Memo {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Memo::from_base64(&s).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Payment
// ---------------------------------------------------------------------------

/// One line item of a payment transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub payee: Address,
    /// Amount in bones, the smallest unit.
    pub amount: u64,
    /// Encoded as zero when `None`. Decoding always yields `Some`, since an
    /// absent wire memo is the proto3 default of zero.
    pub memo: Option<Memo>,
}

impl Payment {
    fn encode(&self) -> Vec<u8> {
        let mut w = Writer::new();
        w.bytes(1, &self.payee.to_bin());
        w.uint64(2, self.amount);
        w.uint64(3, self.memo.map(|m| m.as_u64()).unwrap_or(0));
        w.into_bytes()
    }

    fn decode(bytes: &[u8]) -> Result<Self> {
        let mut payee = None;
        let mut amount = 0;
        let mut memo = 0;

        let mut r = Reader::new(bytes);
        while let Some((field, value)) = r.next_field()? {
            match field {
                1 => payee = Some(value.as_bytes("payment.payee")?),
                2 => amount = value.as_u64("payment.amount")?,
                3 => memo = value.as_u64("payment.memo")?,
                _ => {}
            }
        }

        let payee = payee.ok_or_else(|| {
            ConstructorError::MalformedTransaction("payment is missing its payee".into())
        })?;

        Ok(Self {
            payee: Address::from_bin(payee)?,
            amount,
            memo: Some(Memo::from_u64(memo)),
        })
    }
}

// ---------------------------------------------------------------------------
// PaymentV2
// ---------------------------------------------------------------------------

/// A multi-payee payment transaction.
///
/// `nonce` and `fee` are computed by the constructor, never taken from the
/// client. `signature` is attached only by the combine step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentV2 {
    pub payer: Address,
    pub payments: Vec<Payment>,
    pub fee: u64,
    pub nonce: u64,
    pub signature: Option<Vec<u8>>,
}

impl PaymentV2 {
    /// The canonical encoding with no signature: the bytes a client signs
    /// and the bytes the transaction hash is computed over.
    pub fn unsigned_bytes(&self) -> Vec<u8> {
        self.encode(false)
    }

    /// The full encoding, including the signature when one is attached.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.encode(true)
    }

    fn encode(&self, with_signature: bool) -> Vec<u8> {
        let mut w = Writer::new();
        w.bytes(1, &self.payer.to_bin());
        for payment in &self.payments {
            w.message(2, &payment.encode());
        }
        w.uint64(3, self.fee);
        w.uint64(4, self.nonce);
        if with_signature {
            if let Some(signature) = &self.signature {
                w.bytes(5, signature);
            }
        }
        w.into_bytes()
    }

    /// Decodes a `blockchain_txn_payment_v2` message.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut payer = None;
        let mut payments = Vec::new();
        let mut fee = 0;
        let mut nonce = 0;
        let mut signature = None;

        let mut r = Reader::new(bytes);
        while let Some((field, value)) = r.next_field()? {
            match field {
                1 => payer = Some(value.as_bytes("payment_v2.payer")?),
                2 => payments.push(Payment::decode(value.as_bytes("payment_v2.payments")?)?),
                3 => fee = value.as_u64("payment_v2.fee")?,
                4 => nonce = value.as_u64("payment_v2.nonce")?,
                5 => signature = Some(value.as_bytes("payment_v2.signature")?.to_vec()),
                _ => {}
            }
        }

        let payer = payer.ok_or_else(|| {
            ConstructorError::MalformedTransaction("payment_v2 is missing its payer".into())
        })?;

        Ok(Self {
            payer: Address::from_bin(payer)?,
            payments,
            fee,
            nonce,
            signature: signature.filter(|s| !s.is_empty()),
        })
    }

    /// Returns `true` if a signature is attached.
    pub fn is_signed(&self) -> bool {
        self.signature.is_some()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const PAYER: &str = "13HPSdf8Ng8E2uKpLm8Ba3sQ6wdNimTcaKXYmMkHyTUUeUELPwJ";
    const PAYEE: &str = "1aCjThQENE7h1r8qQ52H2P1hCN53uBR6sVrr4MKJPh4Bg8dVqbY";

    fn sample(fee: u64) -> PaymentV2 {
        PaymentV2 {
            payer: Address::from_b58(PAYER).unwrap(),
            payments: vec![Payment {
                payee: Address::from_b58(PAYEE).unwrap(),
                amount: 100,
                memo: Some(Memo::default_token()),
            }],
            fee,
            nonce: 1311,
            signature: None,
        }
    }

    #[test]
    fn default_memo_wire_value() {
        let memo = Memo::default_token();
        assert_eq!(memo.to_base64(), DEFAULT_MEMO_B64);
        assert_eq!(memo.as_u64(), 0x3030_3030_3030_3030);
    }

    #[test]
    fn memo_rejects_wrong_lengths() {
        for bad in ["", "AAAA", "AQIDBAUGBwgJ", "not base64!"] {
            let err = Memo::from_base64(bad).unwrap_err();
            assert!(
                matches!(err, ConstructorError::InvalidMemo { .. }),
                "{:?} should be an invalid memo",
                bad
            );
        }
    }

    #[test]
    fn memo_accepts_unpadded_and_url_safe_input() {
        assert_eq!(Memo::from_base64("MDAwMDAwMDA").unwrap(), Memo::default_token());
        assert_eq!(
            Memo::from_base64("__________8").unwrap().as_u64(),
            u64::MAX
        );
        assert_eq!(
            Memo::from_base64("//////////8=").unwrap(),
            Memo::from_base64("__________8=").unwrap()
        );
    }

    #[test]
    fn zero_memo_decodes_as_present() {
        let mut txn = sample(0);
        txn.payments[0].memo = Some(Memo::from_u64(0));

        let decoded = PaymentV2::decode(&txn.unsigned_bytes()).unwrap();
        assert_eq!(decoded.payments[0].memo, Some(Memo::from_u64(0)));
        assert_eq!(
            decoded.payments[0].memo.unwrap().to_base64(),
            "AAAAAAAAAAA="
        );
    }

    #[test]
    fn memo_is_little_endian_on_the_wire() {
        let memo = Memo::from_base64("AQIDBAUGBwg=").unwrap();
        assert_eq!(memo.as_bytes(), &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(memo.as_u64(), 578_437_695_752_307_201);
        assert_eq!(Memo::from_u64(memo.as_u64()), memo);
    }

    #[test]
    fn unsigned_encoding_matches_recorded_bytes() {
        assert_eq!(
            hex::encode(sample(35_000).unsigned_bytes()),
            "0a21012c99c8c13b9f122783bb83c2c0bf0843ad4da2cb1820c77e9da488f863b1300f\
             122f0a2111149c39a23cc8fe59ea64f7762261bfdeb387d8e996981c3a96d0bda0249a71f0\
             106418b0e0c08183868c983018b89102209f0a"
        );
    }

    #[test]
    fn zero_fee_is_omitted() {
        let encoded = hex::encode(sample(0).unsigned_bytes());
        assert!(encoded.ends_with("8183868c9830209f0a"));
        assert!(!encoded.contains("18b89102"));
    }

    #[test]
    fn signature_only_in_full_encoding() {
        let mut txn = sample(35_000);
        txn.signature = Some(vec![0xab; 64]);
        assert_eq!(txn.unsigned_bytes(), sample(35_000).unsigned_bytes());
        assert_eq!(txn.to_bytes().len(), txn.unsigned_bytes().len() + 2 + 64);
    }

    #[test]
    fn decode_preserves_order_and_fields() {
        let mut txn = sample(35_000);
        txn.payments.push(Payment {
            payee: Address::from_b58(PAYER).unwrap(),
            amount: 7,
            memo: Some(Memo::from_base64("AQIDBAUGBwg=").unwrap()),
        });
        txn.signature = Some(vec![1; 64]);

        let decoded = PaymentV2::decode(&txn.to_bytes()).unwrap();
        assert_eq!(decoded, txn);
        assert_eq!(decoded.payments[1].amount, 7);
    }

    #[test]
    fn decode_requires_payer() {
        let err = PaymentV2::decode(&[0x20, 0x01]).unwrap_err();
        assert!(matches!(err, ConstructorError::MalformedTransaction(_)));
    }

    #[test]
    fn memo_serde_uses_base64() {
        let json = serde_json::to_string(&Memo::default_token()).unwrap();
        assert_eq!(json, "\"MDAwMDAwMDA=\"");
        assert!(serde_json::from_str::<Memo>("\"AAAA\"").is_err());
    }
}
