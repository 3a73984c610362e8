use bitcoin::BlockHash;
use dogebridge_codec::{ChainWork, DogeHeader, PowHash};
use std::fmt;

/// Lifecycle of a submitted header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeaderStatus {
    /// Linkage and difficulty checked, waiting for the scrypt verdict.
    PendingPoW,
    /// Proof-of-work verified, the header counts towards chain work.
    Accepted,
    /// Proof-of-work disputed after acceptance, or built on a disputed header.
    Rejected,
}

impl fmt::Display for HeaderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PendingPoW => write!(f, "pending-pow"),
            Self::Accepted => write!(f, "accepted"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

/// Header stored by the relay.
///
/// The parent is referenced by hash through `header.prev_blockhash`, all entries are owned
/// by the relay.
#[derive(Debug, Clone)]
pub struct ChainEntry {
    /// The header itself.
    pub header: DogeHeader,
    /// Block hash.
    pub hash: BlockHash,
    /// Height on its branch.
    pub height: u32,
    /// Work of this header and all its ancestors back to the genesis checkpoint.
    pub chain_work: ChainWork,
    /// Current status.
    pub status: HeaderStatus,
    /// Proof-of-work hash claimed at submission.
    pub claimed_pow_hash: PowHash,
    /// Position in the order headers were accepted, used to break chain work ties.
    pub accepted_order: Option<u64>,
    /// Set once the header reached the confirmation threshold on the best chain.
    pub finalized: bool,
}

impl ChainEntry {
    /// Hash of the parent header.
    pub fn parent_hash(&self) -> BlockHash {
        self.header.prev_blockhash()
    }

    /// Returns whether the entry is accepted.
    pub fn is_accepted(&self) -> bool {
        self.status == HeaderStatus::Accepted
    }
}

impl fmt::Display for ChainEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{},{}", self.height, self.hash)
    }
}
