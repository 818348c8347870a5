//! Payment construction via the builder pattern.
//!
//! The [`PaymentV2Builder`] takes client input as it arrives over the wire
//! (base-58 addresses, base64 memos, the account's current nonce), validates
//! all of it up front, and produces an unsigned [`PaymentV2`] with the nonce
//! and fee filled in. Nothing is returned unless every payment is valid.
//!
//! The builder does not sign. Clients sign the hex payload themselves and
//! hand the signature back to [`super::signing::combine`].

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::types::{Memo, Payment, PaymentV2};
use crate::address::Address;
use crate::chain_vars::ChainVars;
use crate::config::SIGNATURE_LENGTH;
use crate::error::{ConstructorError, Result};

// ---------------------------------------------------------------------------
// Fee
// ---------------------------------------------------------------------------

/// Computes the fee owed by `txn` under the given chain variables.
///
/// The fee is sized against the transaction as it will be submitted: a
/// 64-byte signature is assumed and the fee field itself is left out, so the
/// result does not depend on the fee it determines.
pub fn calculate_fee(txn: &PaymentV2, vars: &ChainVars) -> u64 {
    let mut probe = txn.clone();
    probe.fee = 0;
    probe.signature = Some(vec![0u8; SIGNATURE_LENGTH]);
    vars.fee_for_payload(probe.envelope_bytes().len())
}

// ---------------------------------------------------------------------------
// Inputs and outputs
// ---------------------------------------------------------------------------

/// One payment as submitted by a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRequest {
    /// Base-58 payee address.
    pub payee: String,
    pub amount: u64,
    /// Base64 memo. The default token is used when absent or empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
}

/// An unsigned payment fresh from the builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltPayment {
    pub txn: PaymentV2,
}

impl BuiltPayment {
    /// Hex of the canonical unsigned encoding. This is what the client signs.
    pub fn payload_hex(&self) -> String {
        hex::encode(self.txn.unsigned_bytes())
    }

    /// The self-describing transaction string, to be passed back to combine.
    pub fn unsigned_txn(&self) -> String {
        self.txn.to_txn_string()
    }
}

// ---------------------------------------------------------------------------
// PaymentV2Builder
// ---------------------------------------------------------------------------

/// Fluent builder for unsigned [`PaymentV2`] transactions.
///
/// # Usage
///
/// ```
/// use constructor_protocol::chain_vars::ChainVars;
/// use constructor_protocol::transaction::PaymentV2Builder;
///
/// let built = PaymentV2Builder::new("13HPSdf8Ng8E2uKpLm8Ba3sQ6wdNimTcaKXYmMkHyTUUeUELPwJ")
///     .payment("1aCjThQENE7h1r8qQ52H2P1hCN53uBR6sVrr4MKJPh4Bg8dVqbY", 100, None)
///     .nonce_seed(1310)
///     .chain_vars(ChainVars { txn_fee_multiplier: 5000, dc_payload_size: 24 })
///     .build()
///     .unwrap();
///
/// assert_eq!(built.txn.nonce, 1311);
/// assert_eq!(built.txn.fee, 35_000);
/// ```
#[derive(Debug, Clone)]
pub struct PaymentV2Builder {
    payer: String,
    payments: Vec<PaymentRequest>,
    nonce_seed: u64,
    chain_vars: ChainVars,
}

impl PaymentV2Builder {
    /// Starts a payment from `payer` (base-58). Defaults: no payments,
    /// nonce seed 0, default chain variables.
    pub fn new(payer: &str) -> Self {
        Self {
            payer: payer.to_string(),
            payments: Vec::new(),
            nonce_seed: 0,
            chain_vars: ChainVars::default(),
        }
    }

    /// Appends a payment. Order is preserved.
    pub fn payment(mut self, payee: &str, amount: u64, memo: Option<&str>) -> Self {
        self.payments.push(PaymentRequest {
            payee: payee.to_string(),
            amount,
            memo: memo.map(str::to_string),
        });
        self
    }

    /// Appends a batch of payments as received from a client.
    pub fn payments(mut self, payments: impl IntoIterator<Item = PaymentRequest>) -> Self {
        self.payments.extend(payments);
        self
    }

    /// The payer's latest committed nonce. The transaction uses the next one.
    pub fn nonce_seed(mut self, nonce_seed: u64) -> Self {
        self.nonce_seed = nonce_seed;
        self
    }

    pub fn chain_vars(mut self, chain_vars: ChainVars) -> Self {
        self.chain_vars = chain_vars;
        self
    }

    /// Validates every input and produces the unsigned transaction.
    ///
    /// Fails on the first invalid address or memo.
    pub fn build(self) -> Result<BuiltPayment> {
        let payer = Address::from_b58(&self.payer)?;

        let payments = self
            .payments
            .iter()
            .map(|p| -> Result<Payment> {
                let memo = match p.memo.as_deref() {
                    Some(b64) if !b64.is_empty() => Memo::from_base64(b64)?,
                    _ => Memo::default_token(),
                };
                Ok(Payment {
                    payee: Address::from_b58(&p.payee)?,
                    amount: p.amount,
                    memo: Some(memo),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let nonce = self.nonce_seed.checked_add(1).ok_or_else(|| {
            ConstructorError::MalformedRequest(format!(
                "nonce {} has no successor",
                self.nonce_seed
            ))
        })?;

        let mut txn = PaymentV2 {
            payer,
            payments,
            fee: 0,
            nonce,
            signature: None,
        };
        txn.fee = calculate_fee(&txn, &self.chain_vars);

        debug!(
            payer = %txn.payer,
            payments = txn.payments.len(),
            nonce = txn.nonce,
            fee = txn.fee,
            "built unsigned payment_v2"
        );

        Ok(BuiltPayment { txn })
    }
}

/// Builds an unsigned payment in one call.
pub fn build_payment_v2(
    payer: &str,
    payments: Vec<PaymentRequest>,
    nonce_seed: u64,
    chain_vars: ChainVars,
) -> Result<BuiltPayment> {
    PaymentV2Builder::new(payer)
        .payments(payments)
        .nonce_seed(nonce_seed)
        .chain_vars(chain_vars)
        .build()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
