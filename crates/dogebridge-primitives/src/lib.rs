//! Primitives shared by the Dogecoin bridge crates.

mod chain_params;
pub mod config;
mod error_kind;

pub use chain_params::{ChainParams, DogeNetwork, MEDIAN_TIME_SPAN};
pub use config::{BridgeConfig, ConfigError, GenesisCheckpoint};
pub use error_kind::ErrorKind;

/// Ethereum account address.
///
/// Used for token holders, operator controllers and the privileged identities (price
/// oracle, scrypt checker) named in the deployment config.
pub type AccountId = alloy_primitives::Address;

/// Dogecoin amount in the smallest unit (1 DOGE = 100_000_000).
pub type Amount = u64;

/// Number of smallest units in one DOGE.
pub const COIN: Amount = 100_000_000;

/// 6 blocks is the standard confirmation period before a deposit or a redemption is final.
pub const CONFIRMATION_DEPTH: u32 = 6u32;

/// Denominator of every basis-point rate in the bridge.
pub const BASIS_POINTS: u64 = 10_000;
