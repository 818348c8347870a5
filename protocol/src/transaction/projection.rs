//! JSON projection of transactions for display.

use serde::{Deserialize, Serialize};

use super::types::{Payment, PaymentV2};
use crate::address::Address;
use crate::config::PAYMENT_V2_STRING_TYPE;
use crate::error::Result;

/// One payment as shown to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentJson {
    pub amount: u64,
    pub payee: Address,
    /// Base64 memo.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
}

impl From<&Payment> for PaymentJson {
    fn from(p: &Payment) -> Self {
        Self {
            amount: p.amount,
            payee: p.payee,
            memo: p.memo.map(|m| m.to_base64()),
        }
    }
}

/// A `paymentV2` transaction as plain values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentV2Json {
    #[serde(rename = "type")]
    pub txn_type: String,
    pub payer: Address,
    pub nonce: u64,
    pub fee: u64,
    pub payments: Vec<PaymentJson>,
    /// Lowercase hex.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl From<&PaymentV2> for PaymentV2Json {
    fn from(txn: &PaymentV2) -> Self {
        Self {
            txn_type: PAYMENT_V2_STRING_TYPE.to_string(),
            payer: txn.payer,
            nonce: txn.nonce,
            fee: txn.fee,
            payments: txn.payments.iter().map(PaymentJson::from).collect(),
            signature: txn.signature.as_deref().map(hex::encode),
        }
    }
}

/// Result of parsing a transaction string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedTransaction {
    pub payload: PaymentV2Json,
    /// Reported only when the caller says the transaction is signed. A
    /// payment has a single payer, so the payer is the signer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signer: Option<Address>,
}

/// Projects a transaction string to JSON-ready values.
pub fn project(txn: &str, signed: bool) -> Result<ParsedTransaction> {
    let txn = PaymentV2::from_txn_string(txn)?;
    Ok(ParsedTransaction {
        payload: PaymentV2Json::from(&txn),
        signer: signed.then_some(txn.payer),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConstructorError;
    use crate::transaction::builder::PaymentV2Builder;
    use crate::transaction::signing::combine;
    use serde_json::json;

    const PAYER: &str = "13HPSdf8Ng8E2uKpLm8Ba3sQ6wdNimTcaKXYmMkHyTUUeUELPwJ";
    const PAYEE: &str = "1aCjThQENE7h1r8qQ52H2P1hCN53uBR6sVrr4MKJPh4Bg8dVqbY";

    fn unsigned() -> String {
        PaymentV2Builder::new(PAYER)
            .payment(PAYEE, 100, Some("AQIDBAUGBwg="))
            .payment(PAYER, 250, None)
            .nonce_seed(1310)
            .build()
            .unwrap()
            .unsigned_txn()
    }

    #[test]
    fn projects_unsigned_payment() {
        let parsed = project(&unsigned(), false).unwrap();
        assert_eq!(
            serde_json::to_value(&parsed).unwrap(),
            json!({
                "payload": {
                    "type": "paymentV2",
                    "payer": PAYER,
                    "nonce": 1311,
                    "fee": 0,
                    "payments": [
                        {"amount": 100, "payee": PAYEE, "memo": "AQIDBAUGBwg="},
                        {"amount": 250, "payee": PAYER, "memo": "MDAwMDAwMDA="},
                    ],
                }
            })
        );
    }

    #[test]
    fn signed_projection_names_signer() {
        let signed = combine(&unsigned(), &"0a".repeat(64)).unwrap();
        let parsed = project(&signed, true).unwrap();
        assert_eq!(parsed.signer.unwrap().to_b58(), PAYER);
        assert_eq!(parsed.payload.signature, Some("0a".repeat(64)));
    }

    #[test]
    fn signer_follows_caller_flag() {
        let signed = combine(&unsigned(), &"0a".repeat(64)).unwrap();
        assert!(project(&signed, false).unwrap().signer.is_none());
        assert!(project(&unsigned(), true).unwrap().signer.is_some());
    }

    #[test]
    fn rejects_malformed_input() {
        let err = project("@@@", false).unwrap_err();
        assert!(matches!(err, ConstructorError::MalformedTransaction(_)));
    }
}
