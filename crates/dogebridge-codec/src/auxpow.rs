//! Merged-mining (AuxPoW) payload.
//!
//! A merged-mined block proves its work through a block of a parent chain. The payload
//! carries the parent coinbase transaction, the branch linking that coinbase to the parent
//! header's Merkle root, the branch linking this block's hash to the merged-mining root
//! committed in the coinbase script, and the parent header itself.

use crate::compute_branch_root;
use bitcoin::block::Header;
use bitcoin::consensus::encode::Error as EncodeError;
use bitcoin::consensus::{Decodable, Encodable};
use bitcoin::hashes::Hash;
use bitcoin::io::{Read, Write};
use bitcoin::{BlockHash, Transaction, TxMerkleNode};

/// Marker preceding the merged-mining root in the parent coinbase script.
pub const MERGED_MINING_HEADER: [u8; 4] = [0xfa, 0xbe, 0x6d, 0x6d];

/// Longest chain Merkle branch accepted.
pub const MAX_CHAIN_BRANCH_LEN: usize = 30;

/// Without the marker, the root must start within this many bytes of the script start.
const MAX_ROOT_OFFSET_WITHOUT_HEADER: usize = 20;

/// AuxPoW structural check failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuxPowError {
    /// The coinbase is not the first transaction of the parent block.
    #[error("AuxPoW coinbase index is {0}, expected 0")]
    CoinbaseNotFirst(i32),

    /// The parent block claims the chain id of the merged-mined chain.
    #[error("AuxPoW parent block has our chain id {0:#x}")]
    ParentHasOwnChainId(u32),

    /// The parent header itself announces an AuxPoW payload.
    #[error("AuxPoW parent block has the AuxPoW version flag")]
    ParentIsAuxPow,

    /// The chain Merkle branch exceeds [`MAX_CHAIN_BRANCH_LEN`].
    #[error("AuxPoW chain merkle branch too long: {0}")]
    ChainBranchTooLong(usize),

    /// The coinbase branch does not lead to the parent header's Merkle root.
    #[error("AuxPoW coinbase merkle branch does not match the parent merkle root")]
    CoinbaseBranchMismatch,

    /// The parent coinbase has no inputs.
    #[error("AuxPoW coinbase has no inputs")]
    EmptyCoinbase,

    /// The chain Merkle root is not committed in the coinbase script.
    #[error("AuxPoW chain merkle root missing from the parent coinbase")]
    MissingChainRoot,

    /// The merged-mining marker occurs more than once.
    #[error("Multiple merged-mining headers in the parent coinbase")]
    MultipleMergedMiningHeaders,

    /// The merged-mining marker is not immediately followed by the chain root.
    #[error("Merged-mining header is not just before the chain merkle root")]
    MergedMiningHeaderNotBeforeRoot,

    /// Without the marker, the chain root starts too far into the script.
    #[error("Chain merkle root must start in the first {MAX_ROOT_OFFSET_WITHOUT_HEADER} bytes of the coinbase script, found at {0}")]
    ChainRootTooLate(usize),

    /// The tree size and nonce after the chain root are missing.
    #[error("AuxPoW missing chain merkle tree size and nonce")]
    MissingTreeSizeAndNonce,

    /// The committed tree size does not match the branch length.
    #[error("AuxPoW merkle tree size {got} does not match branch length (expected {expected})")]
    WrongTreeSize { got: u32, expected: u32 },

    /// The chain index is not the slot derived from the nonce and chain id.
    #[error("AuxPoW wrong chain index {got}, expected {expected}")]
    WrongChainIndex { got: i32, expected: u32 },
}

/// Parsed merged-mining payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuxPow {
    /// Coinbase transaction of the parent block.
    pub coinbase_tx: Transaction,
    /// Hash of the parent block as serialized; not used by validation.
    pub parent_hash: BlockHash,
    /// Branch from the coinbase to the parent Merkle root.
    pub coinbase_branch: Vec<TxMerkleNode>,
    /// Position of the coinbase in the parent block.
    pub coinbase_index: i32,
    /// Branch from this block's hash to the merged-mining root.
    pub chain_branch: Vec<TxMerkleNode>,
    /// Slot of this chain in the merged-mining tree.
    pub chain_index: i32,
    /// Header of the parent block whose scrypt hash carries the work.
    pub parent_header: Header,
}

impl Decodable for AuxPow {
    fn consensus_decode_from_finite_reader<R: Read + ?Sized>(reader: &mut R) -> Result<Self, EncodeError> {
        Ok(Self {
            coinbase_tx: Decodable::consensus_decode_from_finite_reader(reader)?,
            parent_hash: Decodable::consensus_decode_from_finite_reader(reader)?,
            coinbase_branch: Decodable::consensus_decode_from_finite_reader(reader)?,
            coinbase_index: Decodable::consensus_decode_from_finite_reader(reader)?,
            chain_branch: Decodable::consensus_decode_from_finite_reader(reader)?,
            chain_index: Decodable::consensus_decode_from_finite_reader(reader)?,
            parent_header: Decodable::consensus_decode_from_finite_reader(reader)?,
        })
    }
}

impl Encodable for AuxPow {
    fn consensus_encode<W: Write + ?Sized>(&self, writer: &mut W) -> Result<usize, bitcoin::io::Error> {
        let mut len = 0;
        len += self.coinbase_tx.consensus_encode(writer)?;
        len += self.parent_hash.consensus_encode(writer)?;
        len += self.coinbase_branch.consensus_encode(writer)?;
        len += self.coinbase_index.consensus_encode(writer)?;
        len += self.chain_branch.consensus_encode(writer)?;
        len += self.chain_index.consensus_encode(writer)?;
        len += self.parent_header.consensus_encode(writer)?;
        Ok(len)
    }
}

impl AuxPow {
    /// Checks the payload commits to `block_hash` for the chain `chain_id`.
    ///
    /// The proof-of-work of the parent header is not checked here.
    pub fn check(&self, block_hash: BlockHash, chain_id: u32, strict_chain_id: bool) -> Result<(), AuxPowError> {
        if self.coinbase_index != 0 {
            return Err(AuxPowError::CoinbaseNotFirst(self.coinbase_index));
        }

        let parent_chain_id = (self.parent_header.version.to_consensus() as u32) >> 16;
        if strict_chain_id && parent_chain_id == chain_id {
            return Err(AuxPowError::ParentHasOwnChainId(chain_id));
        }

        if crate::is_auxpow_version(self.parent_header.version.to_consensus()) {
            return Err(AuxPowError::ParentIsAuxPow);
        }

        let branch_len = self.chain_branch.len();
        if branch_len > MAX_CHAIN_BRANCH_LEN {
            return Err(AuxPowError::ChainBranchTooLong(branch_len));
        }

        // A negative index never matches the derived slot, any value works for the fold.
        let chain_root = compute_branch_root(
            &block_hash.to_byte_array(),
            &branch_bytes(&self.chain_branch),
            self.chain_index as u32,
        );
        let mut root_in_script = chain_root;
        root_in_script.reverse();

        let coinbase_txid = self.coinbase_tx.compute_txid().to_byte_array();
        let merkle_root = compute_branch_root(&coinbase_txid, &branch_bytes(&self.coinbase_branch), 0);
        if merkle_root != self.parent_header.merkle_root.to_byte_array() {
            return Err(AuxPowError::CoinbaseBranchMismatch);
        }

        let script = self
            .coinbase_tx
            .input
            .first()
            .ok_or(AuxPowError::EmptyCoinbase)?
            .script_sig
            .as_bytes();

        let root_pos = find(script, &root_in_script).ok_or(AuxPowError::MissingChainRoot)?;

        match find(script, &MERGED_MINING_HEADER) {
            Some(header_pos) => {
                if find(&script[header_pos + 1..], &MERGED_MINING_HEADER).is_some() {
                    return Err(AuxPowError::MultipleMergedMiningHeaders);
                }
                if header_pos + MERGED_MINING_HEADER.len() != root_pos {
                    return Err(AuxPowError::MergedMiningHeaderNotBeforeRoot);
                }
            }
            None => {
                if root_pos > MAX_ROOT_OFFSET_WITHOUT_HEADER {
                    return Err(AuxPowError::ChainRootTooLate(root_pos));
                }
            }
        }

        let trailer = &script[root_pos + root_in_script.len()..];
        if trailer.len() < 8 {
            return Err(AuxPowError::MissingTreeSizeAndNonce);
        }
        let tree_size = u32::from_le_bytes(trailer[..4].try_into().expect("Slice has 4 bytes; qed"));
        let nonce = u32::from_le_bytes(trailer[4..8].try_into().expect("Slice has 4 bytes; qed"));

        let expected_size = 1u32 << branch_len;
        if tree_size != expected_size {
            return Err(AuxPowError::WrongTreeSize {
                got: tree_size,
                expected: expected_size,
            });
        }

        let expected = expected_index(nonce, chain_id, branch_len as u32);
        if self.chain_index < 0 || self.chain_index as u32 != expected {
            return Err(AuxPowError::WrongChainIndex {
                got: self.chain_index,
                expected,
            });
        }

        Ok(())
    }
}

/// Slot a chain must occupy in a merged-mining tree of height `height`.
///
/// Derived from the coinbase nonce and the chain id with a linear congruential step so that
/// a miner cannot place the same chain in several slots.
pub fn expected_index(nonce: u32, chain_id: u32, height: u32) -> u32 {
    let mut rand = nonce;
    rand = rand.wrapping_mul(1103515245).wrapping_add(12345);
    rand = rand.wrapping_add(chain_id);
    rand = rand.wrapping_mul(1103515245).wrapping_add(12345);
    rand % (1u32 << height)
}

fn branch_bytes(branch: &[TxMerkleNode]) -> Vec<crate::Hash256> {
    branch.iter().map(|node| node.to_byte_array()).collect()
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
