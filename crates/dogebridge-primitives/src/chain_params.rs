use serde::{Deserialize, Serialize};

/// Number of previous headers whose timestamps form the median-time-past.
pub const MEDIAN_TIME_SPAN: usize = 11;

/// Dogecoin network the bridge is deployed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DogeNetwork {
    /// Dogecoin main network.
    Mainnet,
    /// Local regression test network.
    Regtest,
}

impl std::fmt::Display for DogeNetwork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mainnet => write!(f, "mainnet"),
            Self::Regtest => write!(f, "regtest"),
        }
    }
}

/// Consensus constants of a Dogecoin network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainParams {
    /// Network these parameters belong to.
    pub network: DogeNetwork,
    /// Easiest allowed target, in compact form.
    pub pow_limit_bits: u32,
    /// Height of the first block whose successor is retargeted with Digishield.
    pub digishield_height: u32,
    /// Retarget interval in blocks before Digishield.
    pub legacy_interval: u32,
    /// Target timespan in seconds before Digishield.
    pub legacy_target_timespan: i64,
    /// Target timespan in seconds under Digishield (one block).
    pub digishield_target_timespan: i64,
    /// Chain id carried in the upper 16 bits of the block version.
    pub auxpow_chain_id: u32,
    /// Height from which merged-mined (AuxPoW) blocks are allowed.
    pub auxpow_start_height: u32,
    /// Whether blocks must carry `auxpow_chain_id` in their version.
    pub strict_chain_id: bool,
    /// Whether difficulty stays fixed at the parent's bits.
    pub no_retargeting: bool,
}

impl ChainParams {
    /// Constructs a new instance of [`ChainParams`].
    // https://github.com/dogecoin/dogecoin/blob/v1.14.6/src/chainparams.cpp
    pub fn new(network: DogeNetwork) -> Self {
        match network {
            DogeNetwork::Mainnet => Self {
                network,
                pow_limit_bits: 0x1e0fffff,
                digishield_height: 145_000,
                legacy_interval: 240,
                legacy_target_timespan: 4 * 60 * 60,
                digishield_target_timespan: 60,
                auxpow_chain_id: 0x0062,
                auxpow_start_height: 371_337,
                strict_chain_id: true,
                no_retargeting: false,
            },
            DogeNetwork::Regtest => Self {
                network,
                pow_limit_bits: 0x207fffff,
                digishield_height: 145_000,
                legacy_interval: 240,
                legacy_target_timespan: 4 * 60 * 60,
                digishield_target_timespan: 60,
                auxpow_chain_id: 0x0062,
                auxpow_start_height: 0,
                strict_chain_id: true,
                no_retargeting: true,
            },
        }
    }

    /// Returns whether the successor of a block at `parent_height` is retargeted with Digishield.
    pub fn is_digishield(&self, parent_height: u32) -> bool {
        parent_height >= self.digishield_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_serde_is_lowercase() {
        assert_eq!(
            serde_json::to_string(&DogeNetwork::Regtest).unwrap(),
            "\"regtest\""
        );
        assert_eq!(
            serde_json::from_str::<DogeNetwork>("\"mainnet\"").unwrap(),
            DogeNetwork::Mainnet
        );
    }

    #[test]
    fn regtest_does_not_retarget() {
        let mainnet = ChainParams::new(DogeNetwork::Mainnet);
        let regtest = ChainParams::new(DogeNetwork::Regtest);
        assert!(!mainnet.no_retargeting);
        assert!(regtest.no_retargeting);
        assert!(mainnet.is_digishield(145_000));
        assert!(!mainnet.is_digishield(144_999));
    }
}
