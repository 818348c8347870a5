//! # Transaction Module
//!
//! Construction, signature attachment, display, and hashing of `paymentV2`
//! transactions.
//!
//! ## Architecture
//!
//! ```text
//! types.rs       Memo, Payment, PaymentV2 and their canonical encoding
//! envelope.rs    blockchain_txn wrapper, string form, type sniffing
//! builder.rs     PaymentV2Builder and the fee calculation
//! signing.rs     combine: attach an externally produced signature
//! projection.rs  JSON view for /parse-tx
//! hashing.rs     content hash over the unsigned encoding
//! ```
//!
//! ## Lifecycle
//!
//! 1. **Build**: [`PaymentV2Builder`] validates input and fixes nonce and fee.
//! 2. **Sign**: the client signs [`BuiltPayment::payload_hex`] off-box.
//! 3. **Combine**: [`combine`] attaches the signature.
//! 4. **Submit**: the signed transaction string goes to the chain API.
//!
//! [`project`] and [`compute_hash`] accept the transaction at any stage.

pub mod builder;
pub mod envelope;
pub mod hashing;
pub mod projection;
pub mod signing;
pub mod types;

pub use builder::{build_payment_v2, calculate_fee, BuiltPayment, PaymentRequest, PaymentV2Builder};
pub use envelope::TxnType;
pub use hashing::{compute_hash, hash_payment};
pub use projection::{project, ParsedTransaction, PaymentJson, PaymentV2Json};
pub use signing::combine;
pub use types::{Memo, Payment, PaymentV2};
