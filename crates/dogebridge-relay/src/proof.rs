use bitcoin::hashes::Hash;
use bitcoin::{BlockHash, Transaction, Txid};
use dogebridge_codec::{Hash256, parse_transaction};

/// Merkle proof that a raw transaction is included in a relayed block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpvProof {
    /// Block whose Merkle root the proof leads to.
    pub block_hash: BlockHash,
    /// Serialized transaction.
    pub tx: Vec<u8>,
    /// Sibling hashes from the transaction up to the root, in internal byte order.
    pub siblings: Vec<Hash256>,
    /// Position of the transaction in the block.
    pub tx_index: u32,
}

impl SpvProof {
    /// Decodes the proven transaction.
    pub fn transaction(&self) -> Result<Transaction, dogebridge_codec::Error> {
        parse_transaction(&self.tx)
    }

    /// Txid of the proven transaction, the Merkle leaf.
    pub fn txid(&self) -> Result<Txid, dogebridge_codec::Error> {
        Ok(self.transaction()?.compute_txid())
    }

    /// Leaf hash in internal byte order.
    pub(crate) fn leaf(&self) -> Result<Hash256, dogebridge_codec::Error> {
        Ok(self.txid()?.to_byte_array())
    }
}
