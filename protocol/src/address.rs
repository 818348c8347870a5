//! # Addresses
//!
//! A chain address is a public key tagged with its network and key type:
//!
//! ```text
//! binary (33 bytes)  = header || public_key
//! header             = (net_type << 4) | key_type
//! base-58 text form  = base58(version=0x00 || binary || checksum)
//! checksum           = double_sha256(version || binary)[..4]
//! ```
//!
//! Decoding accepts addresses from either network; the server's network
//! only matters when a new address is derived from a bare public key.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::config::{Network, PUBLIC_KEY_LENGTH, SUPPORTED_CURVE};
use crate::crypto::hash::{checksum, CHECKSUM_LENGTH};
use crate::error::{ConstructorError, Result};

/// Version byte prefixed to the binary form before base-58 encoding.
const ADDRESS_VERSION: u8 = 0x00;

/// Length of the binary form: header byte plus public key.
pub const ADDRESS_BIN_LENGTH: usize = 1 + PUBLIC_KEY_LENGTH;

/// Length of the decoded base-58 payload: version, binary form, checksum.
const ADDRESS_B58_PAYLOAD_LENGTH: usize = 1 + ADDRESS_BIN_LENGTH + CHECKSUM_LENGTH;

// ---------------------------------------------------------------------------
// KeyType
// ---------------------------------------------------------------------------

/// Key type nibble stored in the low half of the address header byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyType {
    /// Compact NIST P-256 key.
    EccCompact,
    /// Ed25519 key. The only kind `/derive` produces.
    Ed25519,
}

impl KeyType {
    pub fn tag(self) -> u8 {
        match self {
            Self::EccCompact => 0x0,
            Self::Ed25519 => 0x1,
        }
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0x0 => Some(Self::EccCompact),
            0x1 => Some(Self::Ed25519),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// A decoded chain address.
///
/// # Examples
///
/// ```
/// use constructor_protocol::address::Address;
///
/// let b58 = "13HPSdf8Ng8E2uKpLm8Ba3sQ6wdNimTcaKXYmMkHyTUUeUELPwJ";
/// let addr = Address::from_b58(b58).unwrap();
/// assert_eq!(addr.to_b58(), b58);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address {
    network: Network,
    key_type: KeyType,
    public_key: [u8; PUBLIC_KEY_LENGTH],
}

impl Address {
    pub fn new(network: Network, key_type: KeyType, public_key: [u8; PUBLIC_KEY_LENGTH]) -> Self {
        Self {
            network,
            key_type,
            public_key,
        }
    }

    /// Parses the binary form (header byte followed by the public key).
    pub fn from_bin(bin: &[u8]) -> Result<Self> {
        let invalid = |reason: String| ConstructorError::InvalidAddress {
            address: hex::encode(bin),
            reason,
        };

        if bin.len() != ADDRESS_BIN_LENGTH {
            return Err(invalid(format!(
                "binary address is {} bytes, expected {}",
                bin.len(),
                ADDRESS_BIN_LENGTH
            )));
        }

        let header = bin[0];
        let network = Network::from_net_type(header >> 4)
            .ok_or_else(|| invalid(format!("unknown net type 0x{:x}", header >> 4)))?;
        let key_type = KeyType::from_tag(header & 0x0f)
            .ok_or_else(|| invalid(format!("unknown key type 0x{:x}", header & 0x0f)))?;

        let mut public_key = [0u8; PUBLIC_KEY_LENGTH];
        public_key.copy_from_slice(&bin[1..]);

        Ok(Self::new(network, key_type, public_key))
    }

    /// Returns the binary form: `(net_type << 4 | key_type) || public_key`.
    pub fn to_bin(&self) -> [u8; ADDRESS_BIN_LENGTH] {
        let mut bin = [0u8; ADDRESS_BIN_LENGTH];
        bin[0] = (self.network.net_type() << 4) | self.key_type.tag();
        bin[1..].copy_from_slice(&self.public_key);
        bin
    }

    /// Parses the base-58 text form, validating version and checksum.
    pub fn from_b58(b58: &str) -> Result<Self> {
        let invalid = |reason: String| ConstructorError::InvalidAddress {
            address: b58.to_string(),
            reason,
        };

        let payload = bs58::decode(b58)
            .into_vec()
            .map_err(|e| invalid(format!("not base58: {}", e)))?;

        if payload.len() != ADDRESS_B58_PAYLOAD_LENGTH {
            return Err(invalid(format!(
                "decoded to {} bytes, expected {}",
                payload.len(),
                ADDRESS_B58_PAYLOAD_LENGTH
            )));
        }

        let (body, check) = payload.split_at(payload.len() - CHECKSUM_LENGTH);
        if checksum(body) != check {
            return Err(invalid("checksum mismatch".into()));
        }
        if body[0] != ADDRESS_VERSION {
            return Err(invalid(format!("unsupported version 0x{:02x}", body[0])));
        }

        Self::from_bin(&body[1..]).map_err(|e| match e {
            ConstructorError::InvalidAddress { reason, .. } => invalid(reason),
            other => other,
        })
    }

    /// Renders the base-58 text form.
    pub fn to_b58(&self) -> String {
        let mut payload = Vec::with_capacity(ADDRESS_B58_PAYLOAD_LENGTH);
        payload.push(ADDRESS_VERSION);
        payload.extend_from_slice(&self.to_bin());
        let check = checksum(&payload);
        payload.extend_from_slice(&check);
        bs58::encode(payload).into_string()
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn key_type(&self) -> KeyType {
        self.key_type
    }

    pub fn public_key(&self) -> &[u8; PUBLIC_KEY_LENGTH] {
        &self.public_key
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_b58())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_b58())
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_b58())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Address::from_b58(&s).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Derivation
// ---------------------------------------------------------------------------

/// Derives the address of a raw public key on the given network.
///
/// Only `"edwards25519"` keys are accepted. The network comes from process
/// configuration, never from the request.
pub fn derive_address(network: Network, curve_type: &str, public_key_hex: &str) -> Result<Address> {
    if curve_type != SUPPORTED_CURVE {
        return Err(ConstructorError::UnsupportedCurve(curve_type.to_string()));
    }

    let bytes = hex::decode(public_key_hex).map_err(|e| {
        ConstructorError::MalformedRequest(format!("public_key is not hex: {}", e))
    })?;
    let public_key: [u8; PUBLIC_KEY_LENGTH] = bytes.as_slice().try_into().map_err(|_| {
        ConstructorError::MalformedRequest(format!(
            "public_key is {} bytes, expected {}",
            bytes.len(),
            PUBLIC_KEY_LENGTH
        ))
    })?;

    Ok(Address::new(network, KeyType::Ed25519, public_key))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const PAYER: &str = "13HPSdf8Ng8E2uKpLm8Ba3sQ6wdNimTcaKXYmMkHyTUUeUELPwJ";
    const PAYEE: &str = "1aCjThQENE7h1r8qQ52H2P1hCN53uBR6sVrr4MKJPh4Bg8dVqbY";
    const PUBKEY_HEX: &str = "9a1d0f6bd9c8ee8c8a6a3e3a5bf9a0e3e1b1c2d3e4f5061728394a5b6c7d8e9f";

    #[test]
    fn decodes_known_mainnet_address() {
        let addr = Address::from_b58(PAYER).unwrap();
        assert_eq!(addr.network(), Network::Mainnet);
        assert_eq!(addr.key_type(), KeyType::Ed25519);
        assert_eq!(
            hex::encode(addr.to_bin()),
            "012c99c8c13b9f122783bb83c2c0bf0843ad4da2cb1820c77e9da488f863b1300f"
        );
        assert_eq!(addr.to_b58(), PAYER);
    }

    #[test]
    fn decodes_address_from_other_network() {
        let addr = Address::from_b58(PAYEE).unwrap();
        assert_eq!(addr.network(), Network::Testnet);
        assert_eq!(addr.to_bin()[0], 0x11);
        assert_eq!(addr.to_b58(), PAYEE);
    }

    #[test]
    fn rejects_bad_checksum() {
        // Swap the last character for a different valid base58 digit.
        let mut tampered = PAYER.to_string();
        let last = tampered.pop().unwrap();
        tampered.push(if last == 'J' { 'K' } else { 'J' });
        let err = Address::from_b58(&tampered).unwrap_err();
        assert!(matches!(err, ConstructorError::InvalidAddress { .. }));
    }

    #[test]
    fn rejects_non_base58_and_wrong_length() {
        assert!(matches!(
            Address::from_b58("0OIl").unwrap_err(),
            ConstructorError::InvalidAddress { .. }
        ));
        assert!(matches!(
            Address::from_b58("1111").unwrap_err(),
            ConstructorError::InvalidAddress { .. }
        ));
    }

    #[test]
    fn from_bin_rejects_unknown_key_type() {
        let mut bin = Address::from_b58(PAYER).unwrap().to_bin();
        bin[0] = 0x07;
        let err = Address::from_bin(&bin).unwrap_err();
        assert!(err.to_string().contains("key type"));
    }

    #[test]
    fn derive_matches_recorded_addresses() {
        let main = derive_address(Network::Mainnet, "edwards25519", PUBKEY_HEX).unwrap();
        assert_eq!(
            main.to_b58(),
            "147coN1movJNfRFN4ET8ifRhVHM9n3kw3WbCroyZK1XWiSw7229"
        );

        let test = derive_address(Network::Testnet, "edwards25519", PUBKEY_HEX).unwrap();
        assert_eq!(
            test.to_b58(),
            "1bDXd5CHSj7zpYYeZWP7yo2697CeBKEwdjivmCyuDVdicMdw2xc"
        );
    }

    #[test]
    fn derive_rejects_other_curves() {
        let err = derive_address(Network::Mainnet, "secp256k1", PUBKEY_HEX).unwrap_err();
        assert_eq!(err, ConstructorError::UnsupportedCurve("secp256k1".into()));
    }

    #[test]
    fn derive_rejects_bad_key_material() {
        let err = derive_address(Network::Mainnet, "edwards25519", "zz").unwrap_err();
        assert!(matches!(err, ConstructorError::MalformedRequest(_)));

        let err = derive_address(Network::Mainnet, "edwards25519", "abcd").unwrap_err();
        assert!(matches!(err, ConstructorError::MalformedRequest(_)));
    }

    #[test]
    fn serde_uses_base58_text() {
        let addr = Address::from_b58(PAYER).unwrap();
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{}\"", PAYER));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
        assert!(serde_json::from_str::<Address>("\"nope\"").is_err());
    }
}
