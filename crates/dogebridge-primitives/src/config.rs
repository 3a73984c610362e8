//! Deployment configuration of the bridge.
//!
//! Everything here is fixed when the bridge is constructed; there are no runtime setters.

use crate::{AccountId, BASIS_POINTS, CONFIRMATION_DEPTH, ChainParams, DogeNetwork};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Length of a plain serialized block header.
const HEADER_LEN: usize = 80;

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file could not be read.
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file is not valid JSON for [`BridgeConfig`].
    #[error("Invalid config: {0}")]
    Json(#[from] serde_json::Error),

    /// Operator fee is not a proper fraction.
    #[error("Operator fee must be below {BASIS_POINTS} basis points, got {0}")]
    FeeTooHigh(u64),

    /// Confirmation threshold of zero would make every header final immediately.
    #[error("Minimum confirmations must be positive")]
    ZeroConfirmations,

    /// Genesis header is not hex or is shorter than a plain header.
    #[error("Invalid genesis header: {0}")]
    InvalidGenesis(String),
}

/// Trusted checkpoint the header relay starts from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisCheckpoint {
    /// Hex-encoded serialized header.
    pub header: String,
    /// Height of the header on its chain.
    pub height: u32,
}

impl GenesisCheckpoint {
    /// Decodes the checkpoint header bytes.
    pub fn header_bytes(&self) -> Result<Vec<u8>, ConfigError> {
        let bytes = hex::decode(self.header.trim())
            .map_err(|err| ConfigError::InvalidGenesis(err.to_string()))?;
        if bytes.len() < HEADER_LEN {
            return Err(ConfigError::InvalidGenesis(format!(
                "expected at least {HEADER_LEN} bytes, got {}",
                bytes.len()
            )));
        }
        Ok(bytes)
    }
}

fn default_operator_fee_bps() -> u64 {
    100
}

fn default_min_confirmations() -> u32 {
    CONFIRMATION_DEPTH
}

fn default_collateral_ratio_bps() -> u64 {
    15_000
}

/// Bridge deployment configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeConfig {
    /// Dogecoin network the relay follows.
    pub network: DogeNetwork,
    /// Account allowed to publish the DOGE/ETH price.
    pub price_oracle: AccountId,
    /// Recipient of minted tokens when a lock carries no recipient.
    pub default_recipient: AccountId,
    /// Operator fee charged on unlocks, in basis points.
    #[serde(default = "default_operator_fee_bps")]
    pub operator_fee_bps: u64,
    /// Confirmations a header needs before proofs against it are final.
    #[serde(default = "default_min_confirmations")]
    pub min_confirmations: u32,
    /// Account allowed to report scrypt verdicts.
    pub scrypt_checker: AccountId,
    /// Required operator collateral relative to backed value, in basis points.
    #[serde(default = "default_collateral_ratio_bps")]
    pub collateral_ratio_bps: u64,
    /// Relay starting point.
    pub genesis: GenesisCheckpoint,
}

impl BridgeConfig {
    /// Loads and validates the configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the configuration is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.operator_fee_bps >= BASIS_POINTS {
            return Err(ConfigError::FeeTooHigh(self.operator_fee_bps));
        }
        if self.min_confirmations == 0 {
            return Err(ConfigError::ZeroConfirmations);
        }
        self.genesis.header_bytes()?;
        Ok(())
    }

    /// Returns the consensus parameters of the configured network.
    pub fn chain_params(&self) -> ChainParams {
        ChainParams::new(self.network)
    }
}
