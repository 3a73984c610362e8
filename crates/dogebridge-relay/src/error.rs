use bitcoin::BlockHash;
use dogebridge_codec::{AuxPowError, PowHash};
use dogebridge_primitives::{AccountId, ConfigError, ErrorKind};

/// Header relay error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Header or transaction bytes could not be decoded.
    #[error(transparent)]
    Codec(#[from] dogebridge_codec::Error),

    /// Relay configuration is unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Header was submitted before, whatever its current status.
    #[error("Header {0} already submitted")]
    DuplicateHeader(BlockHash),

    /// Parent header is unknown or not accepted.
    #[error("Parent {0} of the submitted header is not an accepted header")]
    UnknownParent(BlockHash),

    /// Bits do not follow the retarget rule for this height.
    #[error("Bad difficulty transition at height {height}: {{ got: {got:#010x}, expected: {expected:#010x} }}")]
    BadDifficultyTransition { height: u32, got: u32, expected: u32 },

    /// Bits encode a target easier than the network allows.
    #[error("Target of bits {got:#010x} exceeds the pow limit {pow_limit:#010x}")]
    TargetAbovePowLimit { got: u32, pow_limit: u32 },

    /// Timestamp is not after the median time of the previous blocks.
    #[error("Time {time} is the median time of the last 11 blocks ({median}) or before")]
    TimeTooOld { time: u32, median: u32 },

    /// Proof-of-work hash does not meet the header's target.
    #[error("Proof-of-work hash {pow_hash} of {block_hash} does not meet its target")]
    InsufficientWork { block_hash: BlockHash, pow_hash: PowHash },

    /// Merged-mined header below the AuxPoW activation height.
    #[error("AuxPoW is not allowed at height {0}")]
    AuxPowNotAllowed(u32),

    /// Header carries a chain id other than the network's.
    #[error("Wrong chain id {got:#x}, expected {expected:#x}")]
    WrongChainId { got: u32, expected: u32 },

    /// Merged-mining payload is inconsistent.
    #[error(transparent)]
    AuxPow(#[from] AuxPowError),

    /// Header is not known to the relay.
    #[error("Unknown header {0}")]
    UnknownHeader(BlockHash),

    /// Caller is not the configured scrypt checker.
    #[error("{0} is not the scrypt checker")]
    Unauthorized(AccountId),

    /// A verdict of `Verified` was reported for a header that is not pending.
    #[error("Header {0} is not awaiting proof-of-work verification")]
    NotPending(BlockHash),

    /// Header was rejected before.
    #[error("Header {0} is already rejected")]
    AlreadyRejected(BlockHash),

    /// Header reached the confirmation threshold and can no longer be unwound.
    #[error("Header {0} is final")]
    AlreadyFinal(BlockHash),

    /// Header lacks the confirmations required for inclusion proofs.
    #[error("Header {block_hash} has {confirmations} confirmations, {required} required")]
    InsufficientConfirmations {
        block_hash: BlockHash,
        confirmations: u32,
        required: u32,
    },
}

impl Error {
    /// Returns the coarse category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Codec(_) | Self::Config(_) => ErrorKind::MalformedInput,
            Self::UnknownParent(_)
            | Self::BadDifficultyTransition { .. }
            | Self::TargetAbovePowLimit { .. }
            | Self::TimeTooOld { .. }
            | Self::InsufficientWork { .. }
            | Self::AuxPowNotAllowed(_)
            | Self::WrongChainId { .. }
            | Self::AuxPow(_) => ErrorKind::ConsensusViolation,
            Self::UnknownHeader(_) => ErrorKind::UnknownEntity,
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::DuplicateHeader(_)
            | Self::NotPending(_)
            | Self::AlreadyRejected(_)
            | Self::AlreadyFinal(_)
            | Self::InsufficientConfirmations { .. } => ErrorKind::InvalidState,
        }
    }
}
