// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Helium Constructor: Protocol Library
//!
//! Everything needed to turn a client's payment request into a transaction
//! the chain will accept, without ever touching a private key:
//!
//! - **address**: base-58 address codec and key-to-address derivation.
//! - **wire**: the protobuf subset used by the transaction messages.
//! - **transaction**: build, combine, project, and hash `paymentV2`.
//! - **chain_vars**: the fee parameters pulled from chain variables.
//! - **crypto**: SHA-256 helpers for checksums and content hashes.
//! - **config**: networks and protocol constants.
//! - **error**: the request-scoped error taxonomy.
//!
//! Every operation here is a pure function of its input plus the configured
//! [`Network`]. Network I/O lives in the node crate.
//!
//! ```
//! use constructor_protocol::{compute_hash, combine, ChainVars, PaymentV2Builder};
//!
//! let built = PaymentV2Builder::new("13HPSdf8Ng8E2uKpLm8Ba3sQ6wdNimTcaKXYmMkHyTUUeUELPwJ")
//!     .payment("1aCjThQENE7h1r8qQ52H2P1hCN53uBR6sVrr4MKJPh4Bg8dVqbY", 100, None)
//!     .nonce_seed(1310)
//!     .chain_vars(ChainVars::default())
//!     .build()
//!     .unwrap();
//!
//! let unsigned = built.unsigned_txn();
//! let signed = combine(&unsigned, &"00".repeat(64)).unwrap();
//! assert_eq!(compute_hash(&unsigned).unwrap(), compute_hash(&signed).unwrap());
//! ```

pub mod address;
pub mod chain_vars;
pub mod config;
pub mod crypto;
pub mod error;
pub mod transaction;
pub mod wire;

pub use address::{derive_address, Address, KeyType};
pub use chain_vars::ChainVars;
pub use config::Network;
pub use error::{ConstructorError, Result};
pub use transaction::{
    build_payment_v2, combine, compute_hash, project, BuiltPayment, ParsedTransaction,
    PaymentRequest, PaymentV2, PaymentV2Builder, TxnType,
};
