//! Chain variables that feed the transaction fee.
//!
//! The full variable map is opaque to the constructor. Only two entries
//! matter: `txn_fee_multiplier` and `dc_payload_size`. The map reaches us
//! either straight from the chain API (snake_case) or relayed through
//! `/chain-vars` (camelCase), so both spellings are accepted.

use serde_json::Value;

use crate::config::{DEFAULT_DC_PAYLOAD_SIZE, DEFAULT_TXN_FEE_MULTIPLIER};
use crate::error::{ConstructorError, Result};

const TXN_FEE_MULTIPLIER_KEYS: [&str; 2] = ["txn_fee_multiplier", "txnFeeMultiplier"];
const DC_PAYLOAD_SIZE_KEYS: [&str; 2] = ["dc_payload_size", "dcPayloadSize"];

/// The fee-relevant subset of the chain variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainVars {
    pub txn_fee_multiplier: u64,
    pub dc_payload_size: u64,
}

impl Default for ChainVars {
    fn default() -> Self {
        Self {
            txn_fee_multiplier: DEFAULT_TXN_FEE_MULTIPLIER,
            dc_payload_size: DEFAULT_DC_PAYLOAD_SIZE,
        }
    }
}

impl ChainVars {
    /// Extracts the fee parameters from a chain variable map.
    ///
    /// `null` yields the defaults. Any other non-object value, a present
    /// but non-integer entry, or a zero payload size is rejected.
    pub fn from_json(vars: &Value) -> Result<Self> {
        let map = match vars {
            Value::Null => return Ok(Self::default()),
            Value::Object(map) => map,
            other => {
                return Err(ConstructorError::MalformedRequest(format!(
                    "chain_vars must be an object, got {}",
                    json_type_name(other)
                )))
            }
        };

        let lookup = |keys: &[&str], default: u64| -> Result<u64> {
            match keys.iter().find_map(|k| map.get(*k)) {
                None | Some(Value::Null) => Ok(default),
                Some(v) => v.as_u64().ok_or_else(|| {
                    ConstructorError::MalformedRequest(format!(
                        "chain variable {} must be a non-negative integer, got {}",
                        keys[0], v
                    ))
                }),
            }
        };

        let vars = Self {
            txn_fee_multiplier: lookup(&TXN_FEE_MULTIPLIER_KEYS[..], DEFAULT_TXN_FEE_MULTIPLIER)?,
            dc_payload_size: lookup(&DC_PAYLOAD_SIZE_KEYS[..], DEFAULT_DC_PAYLOAD_SIZE)?,
        };

        if vars.dc_payload_size == 0 {
            return Err(ConstructorError::MalformedRequest(
                "chain variable dc_payload_size must be positive".into(),
            ));
        }

        Ok(vars)
    }

    /// Fee for a serialized payload of `payload_len` bytes:
    /// `ceil(payload_len / dc_payload_size) * txn_fee_multiplier`.
    pub fn fee_for_payload(&self, payload_len: usize) -> u64 {
        let units = (payload_len as u64).div_ceil(self.dc_payload_size.max(1));
        units.saturating_mul(self.txn_fee_multiplier)
    }
}

fn json_type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_snake_case_keys() {
        let vars = ChainVars::from_json(&json!({
            "txn_fee_multiplier": 5000,
            "dc_payload_size": 24,
            "block_time": 60000,
        }))
        .unwrap();
        assert_eq!(vars.txn_fee_multiplier, 5000);
        assert_eq!(vars.dc_payload_size, 24);
    }

    #[test]
    fn reads_camel_case_keys() {
        let vars = ChainVars::from_json(&json!({
            "txnFeeMultiplier": 7,
            "dcPayloadSize": 32,
        }))
        .unwrap();
        assert_eq!(vars.txn_fee_multiplier, 7);
        assert_eq!(vars.dc_payload_size, 32);
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        assert_eq!(ChainVars::from_json(&json!({})).unwrap(), ChainVars::default());
        assert_eq!(ChainVars::from_json(&Value::Null).unwrap(), ChainVars::default());
    }

    #[test]
    fn rejects_non_object_and_bad_values() {
        assert!(ChainVars::from_json(&json!([1, 2])).is_err());
        assert!(ChainVars::from_json(&json!({"txn_fee_multiplier": "lots"})).is_err());
        assert!(ChainVars::from_json(&json!({"txn_fee_multiplier": -1})).is_err());
        assert!(ChainVars::from_json(&json!({"dc_payload_size": 0})).is_err());
    }

    #[test]
    fn fee_rounds_up_to_whole_units() {
        let vars = ChainVars {
            txn_fee_multiplier: 5000,
            dc_payload_size: 24,
        };
        assert_eq!(vars.fee_for_payload(0), 0);
        assert_eq!(vars.fee_for_payload(1), 5000);
        assert_eq!(vars.fee_for_payload(24), 5000);
        assert_eq!(vars.fee_for_payload(25), 10_000);
        assert_eq!(vars.fee_for_payload(157), 35_000);
    }

    #[test]
    fn zero_multiplier_means_free() {
        assert_eq!(ChainVars::default().fee_for_payload(1_000), 0);
    }
}
