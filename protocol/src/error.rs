//! Error taxonomy for constructor operations.
//!
//! Every fallible operation in this crate returns a [`ConstructorError`].
//! All variants are request-scoped: the HTTP layer converts them into a
//! JSON error body and the process keeps serving.

use thiserror::Error;

/// Errors raised while building, combining, parsing, or hashing
/// transactions, or while talking to the upstream chain API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstructorError {
    /// An address string or binary address could not be decoded.
    #[error("invalid address {address}: {reason}")]
    InvalidAddress { address: String, reason: String },

    /// A memo did not decode to exactly eight bytes.
    #[error("invalid memo {memo}: {reason}")]
    InvalidMemo { memo: String, reason: String },

    /// The transaction type is known on chain but not supported here,
    /// or not known at all.
    #[error("unrecognized transaction type: {0}")]
    UnrecognizedTransactionType(String),

    /// Address derivation was requested for a curve other than edwards25519.
    #[error("curve type {0} not supported")]
    UnsupportedCurve(String),

    /// The upstream chain API could not be reached or returned garbage.
    #[error("upstream query failed: {0}")]
    UpstreamQueryFailed(String),

    /// The request body is missing fields or carries values of the wrong shape.
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    /// A transaction string is not valid base64 or not a decodable
    /// transaction envelope.
    #[error("malformed transaction: {0}")]
    MalformedTransaction(String),
}

impl ConstructorError {
    /// Stable machine-readable name of the variant, used for metrics
    /// labels and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidAddress { .. } => "invalid_address",
            Self::InvalidMemo { .. } => "invalid_memo",
            Self::UnrecognizedTransactionType(_) => "unrecognized_transaction_type",
            Self::UnsupportedCurve(_) => "unsupported_curve",
            Self::UpstreamQueryFailed(_) => "upstream_query_failed",
            Self::MalformedRequest(_) => "malformed_request",
            Self::MalformedTransaction(_) => "malformed_transaction",
        }
    }

    /// Returns `true` if the failure originated upstream rather than in
    /// the caller's input.
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::UpstreamQueryFailed(_))
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ConstructorError>;
