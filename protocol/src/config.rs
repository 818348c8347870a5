//! # Constructor Configuration & Constants
//!
//! Network selection and the handful of protocol constants the constructor
//! depends on. The [`Network`] value is chosen once at process start and
//! passed explicitly to everything that cares about it: address derivation
//! and the upstream chain API target.

use std::fmt;

// ---------------------------------------------------------------------------
// Network
// ---------------------------------------------------------------------------

/// Upstream API root for the production network.
pub const MAINNET_API_URL: &str = "https://api.helium.io/v1";

/// Upstream API root for the test network.
pub const TESTNET_API_URL: &str = "https://testnet-api.helium.wtf/v1";

/// The network this process serves. Immutable for the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Network {
    /// Production network. Net-type nibble `0x0`.
    #[default]
    Mainnet,
    /// Test network. Net-type nibble `0x1`.
    Testnet,
}

impl Network {
    /// Interprets the value of the `NETWORK` environment variable.
    ///
    /// Exactly `"testnet"` selects the test network. Everything else,
    /// including an empty string, selects mainnet.
    pub fn from_env_value(value: &str) -> Self {
        if value == "testnet" {
            Self::Testnet
        } else {
            Self::Mainnet
        }
    }

    /// The net-type nibble stored in the high half of an address header byte.
    pub fn net_type(self) -> u8 {
        match self {
            Self::Mainnet => 0x0,
            Self::Testnet => 0x1,
        }
    }

    /// Maps a net-type nibble back to a network.
    pub fn from_net_type(net_type: u8) -> Option<Self> {
        match net_type {
            0x0 => Some(Self::Mainnet),
            0x1 => Some(Self::Testnet),
            _ => None,
        }
    }

    /// Base URL of the chain API for this network.
    pub fn api_base_url(self) -> &'static str {
        match self {
            Self::Mainnet => MAINNET_API_URL,
            Self::Testnet => TESTNET_API_URL,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mainnet => write!(f, "mainnet"),
            Self::Testnet => write!(f, "testnet"),
        }
    }
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Listen port when `PORT` is not set.
pub const DEFAULT_PORT: u16 = 3000;

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

/// Transaction type name accepted by `/create-tx`.
pub const PAYMENT_V2_TYPE: &str = "payment_v2";

/// Name reported by string-type sniffing for a payment v2 envelope.
pub const PAYMENT_V2_STRING_TYPE: &str = "paymentV2";

/// Memo applied when a payment does not carry one. Decodes to the ASCII
/// bytes `"00000000"`, not to eight zero bytes. Existing clients hash and
/// sign payloads containing this exact value.
pub const DEFAULT_MEMO_B64: &str = "MDAwMDAwMDA=";

/// Length of a decoded memo.
pub const MEMO_LENGTH: usize = 8;

/// Ed25519 signature length. The fee estimate reserves this many bytes.
pub const SIGNATURE_LENGTH: usize = 64;

/// Bytes per data-credit unit when the chain variables do not say otherwise.
pub const DEFAULT_DC_PAYLOAD_SIZE: u64 = 24;

/// Fee multiplier when the chain variables do not say otherwise.
pub const DEFAULT_TXN_FEE_MULTIPLIER: u64 = 0;

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

/// The only curve `/derive` accepts.
pub const SUPPORTED_CURVE: &str = "edwards25519";

/// Raw public key length for both supported key types.
pub const PUBLIC_KEY_LENGTH: usize = 32;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_exact_testnet_selects_testnet() {
        assert_eq!(Network::from_env_value("testnet"), Network::Testnet);
        assert_eq!(Network::from_env_value("mainnet"), Network::Mainnet);
        assert_eq!(Network::from_env_value("TESTNET"), Network::Mainnet);
        assert_eq!(Network::from_env_value(""), Network::Mainnet);
    }

    #[test]
    fn net_type_roundtrips() {
        for network in [Network::Mainnet, Network::Testnet] {
            assert_eq!(Network::from_net_type(network.net_type()), Some(network));
        }
        assert_eq!(Network::from_net_type(0x7), None);
    }

    #[test]
    fn api_urls_differ_per_network() {
        assert_ne!(Network::Mainnet.api_base_url(), Network::Testnet.api_base_url());
        assert_eq!(Network::default().to_string(), "mainnet");
    }

    #[test]
    fn default_memo_is_ascii_zeros() {
        use base64::Engine;
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(DEFAULT_MEMO_B64)
            .unwrap();
        assert_eq!(decoded, b"00000000");
        assert_eq!(decoded.len(), MEMO_LENGTH);
    }
}
