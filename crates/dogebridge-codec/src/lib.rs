//! Stateless Dogecoin codec.
//!
//! Parses raw block headers (including merged-mined AuxPoW headers) and transactions,
//! computes block and proof-of-work hashes, converts compact difficulty bits to 256-bit
//! targets and verifies Merkle inclusion proofs.
//!
//! Hashes are handled as 32-byte arrays in internal (little-endian) byte order unless a
//! function says otherwise; [`flip_bytes`] converts to the big-endian display order.

mod auxpow;
mod bytes;
mod hash;
mod header;
mod merkle;
mod target;
mod transaction;

pub use self::auxpow::{AuxPow, AuxPowError, MAX_CHAIN_BRANCH_LEN, MERGED_MINING_HEADER, expected_index};
pub use self::bytes::{bytes_to_bytes32, bytes_to_u32, flip32, flip_bytes};
pub use self::hash::{PowHash, concat_hash, double_sha256, scrypt_hash};
pub use self::header::{AUXPOW_VERSION_FLAG, DogeHeader, HEADER_LEN, is_auxpow_version, parse_header};
pub use self::merkle::{compute_branch_root, compute_merkle_root, merkle_proof, verify_merkle_proof};
pub use self::target::{ChainWork, Target, target_from_bits, work_from_bits};
pub use self::transaction::{op_return_payload, p2pkh_hash, parse_transaction};

/// 32-byte hash in internal byte order.
pub type Hash256 = [u8; 32];

/// Codec errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Header bytes are too short, truncated inside the AuxPoW payload or carry trailing data.
    #[error("Malformed header: {0}")]
    MalformedHeader(String),

    /// Transaction bytes do not decode to exactly one transaction.
    #[error("Malformed transaction: {0}")]
    MalformedTransaction(String),

    /// A Merkle root was requested for zero leaves.
    #[error("Cannot compute the Merkle root of an empty leaf set")]
    EmptyMerkleTree,

    /// A Merkle proof was requested for a leaf that does not exist.
    #[error("Leaf index {index} out of range for {len} leaves")]
    LeafIndexOutOfRange { index: usize, len: usize },
}
