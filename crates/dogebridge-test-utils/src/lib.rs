//! Fixtures shared by the bridge test suites: a regtest configuration, synthetic header
//! chains, mined scrypt and AuxPoW headers, and blocks of transactions with Merkle proofs.

use bitcoin::absolute::LockTime;
use bitcoin::block::{Header, Version};
use bitcoin::consensus::{deserialize, serialize};
use bitcoin::hashes::Hash;
use bitcoin::script::PushBytesBuf;
use bitcoin::{
    Amount, BlockHash, OutPoint, PubkeyHash, ScriptBuf, Sequence, Transaction, TxIn,
    TxMerkleNode, TxOut, Txid, Witness, transaction,
};
use dogebridge_codec::{
    AUXPOW_VERSION_FLAG, AuxPow, DogeHeader, Hash256, MERGED_MINING_HEADER, PowHash, Target,
    compute_merkle_root, merkle_proof, scrypt_hash,
};
use dogebridge_primitives::{AccountId, BridgeConfig, DogeNetwork, GenesisCheckpoint};

/// Dogecoin regtest genesis header.
pub const REGTEST_GENESIS: &str = "010000000000000000000000000000000000000000000000000000000000000000000000696ad20e2dd4365c7459b4a4a5af743d5e92c6da3229e6532cd605f6533f2a5bdae5494dffff7f2002000000";

/// Price oracle of [`regtest_config`].
pub const PRICE_ORACLE: AccountId = AccountId::repeat_byte(0x0a);

/// Scrypt checker of [`regtest_config`].
pub const SCRYPT_CHECKER: AccountId = AccountId::repeat_byte(0x0c);

/// Default lock recipient of [`regtest_config`].
pub const DEFAULT_RECIPIENT: AccountId = AccountId::repeat_byte(0x0d);

/// Version of synthetic headers: chain id 0x62, block version 4.
pub const HEADER_VERSION: i32 = 0x0062_0004;

/// Seconds between synthetic headers.
pub const BLOCK_SPACING: u32 = 60;

/// Claimed hash meeting every target, for tests that do not exercise scrypt.
pub const TRIVIAL_POW: PowHash = PowHash([0u8; 32]);

/// Regtest configuration starting from the regtest genesis at height 0.
pub fn regtest_config() -> BridgeConfig {
    BridgeConfig {
        network: DogeNetwork::Regtest,
        price_oracle: PRICE_ORACLE,
        default_recipient: DEFAULT_RECIPIENT,
        operator_fee_bps: 100,
        min_confirmations: 6,
        scrypt_checker: SCRYPT_CHECKER,
        collateral_ratio_bps: 15_000,
        genesis: GenesisCheckpoint {
            header: REGTEST_GENESIS.to_string(),
            height: 0,
        },
    }
}

/// Decoded regtest genesis header.
pub fn regtest_genesis() -> Header {
    let bytes = hex::decode(REGTEST_GENESIS).expect("Genesis hex is valid; qed");
    deserialize(&bytes).expect("Genesis header is valid; qed")
}

/// Serialized header.
pub fn raw(header: &Header) -> Vec<u8> {
    serialize(header)
}

/// Header extending `parent` with the same bits. `salt` lands in the nonce so that siblings
/// built with different salts have different hashes.
pub fn next_header(parent: &Header, merkle_root: TxMerkleNode, salt: u32) -> Header {
    Header {
        version: Version::from_consensus(HEADER_VERSION),
        prev_blockhash: parent.block_hash(),
        merkle_root,
        time: parent.time + BLOCK_SPACING,
        bits: parent.bits,
        nonce: salt,
    }
}

/// `count` headers with empty bodies on top of `parent`.
pub fn header_chain(parent: &Header, count: usize, salt: u32) -> Vec<Header> {
    let mut headers = Vec::with_capacity(count);
    let mut parent = *parent;
    for _ in 0..count {
        let header = next_header(&parent, TxMerkleNode::all_zeros(), salt);
        headers.push(header);
        parent = header;
    }
    headers
}

/// Searches the nonce until the scrypt hash of `header` meets its own bits.
pub fn mine(mut header: Header) -> (Header, PowHash) {
    let target = Target::from_bits(header.bits.to_consensus());
    loop {
        let pow_hash = scrypt_hash(&serialize(&header));
        if target.is_met_by(&pow_hash) {
            return (header, pow_hash);
        }
        header.nonce = header.nonce.wrapping_add(1);
    }
}

/// Coinbase whose script commits to `block_hash` as a single-chain merged-mining root.
pub fn merged_mining_coinbase(block_hash: BlockHash) -> Transaction {
    let mut root = block_hash.to_byte_array();
    root.reverse();

    let mut script = vec![0x03, 0x01, 0x02, 0x03];
    script.extend_from_slice(&MERGED_MINING_HEADER);
    script.extend_from_slice(&root);
    script.extend_from_slice(&1u32.to_le_bytes());
    script.extend_from_slice(&0u32.to_le_bytes());

    Transaction {
        version: transaction::Version::ONE,
        lock_time: LockTime::ZERO,
        input: vec![TxIn {
            previous_output: OutPoint::null(),
            script_sig: ScriptBuf::from_bytes(script),
            sequence: Sequence::MAX,
            witness: Witness::new(),
        }],
        output: vec![TxOut {
            value: Amount::from_sat(50 * 100_000_000),
            script_pubkey: ScriptBuf::new(),
        }],
    }
}

/// Turns `header` into a merged-mined header whose work is carried by a mined parent
/// block of another chain.
pub fn mine_auxpow(header: Header) -> (DogeHeader, PowHash) {
    merge_mined(header, true)
}

/// Same as [`mine_auxpow`] without searching a parent nonce, for checks that fail before
/// proof-of-work matters.
pub fn unmined_auxpow(header: Header) -> DogeHeader {
    merge_mined(header, false).0
}

fn merge_mined(mut header: Header, mine_parent: bool) -> (DogeHeader, PowHash) {
    header.version =
        Version::from_consensus(header.version.to_consensus() | AUXPOW_VERSION_FLAG);

    let coinbase_tx = merged_mining_coinbase(header.block_hash());
    let parent_header = Header {
        version: Version::from_consensus(2),
        prev_blockhash: BlockHash::all_zeros(),
        merkle_root: TxMerkleNode::from_byte_array(coinbase_tx.compute_txid().to_byte_array()),
        time: header.time,
        bits: header.bits,
        nonce: 0,
    };
    let (parent_header, pow_hash) = if mine_parent {
        mine(parent_header)
    } else {
        let pow_hash = scrypt_hash(&serialize(&parent_header));
        (parent_header, pow_hash)
    };

    let auxpow = AuxPow {
        coinbase_tx,
        parent_hash: parent_header.block_hash(),
        coinbase_branch: Vec::new(),
        coinbase_index: 0,
        chain_branch: Vec::new(),
        chain_index: 0,
        parent_header,
    };

    (
        DogeHeader {
            header,
            auxpow: Some(auxpow),
        },
        pow_hash,
    )
}

/// An outpoint of some earlier transaction, distinct per `n`.
pub fn prior_outpoint(n: u8) -> OutPoint {
    OutPoint {
        txid: Txid::from_byte_array([n; 32]),
        vout: u32::from(n),
    }
}

/// Output paying `value` to a P2PKH script.
pub fn p2pkh_output(pubkey_hash: PubkeyHash, value: u64) -> TxOut {
    TxOut {
        value: Amount::from_sat(value),
        script_pubkey: ScriptBuf::new_p2pkh(&pubkey_hash),
    }
}

/// Null-data output carrying `data`.
pub fn op_return_output(data: &[u8]) -> TxOut {
    let payload = PushBytesBuf::try_from(data.to_vec()).expect("Payload fits a push; qed");
    TxOut {
        value: Amount::ZERO,
        script_pubkey: ScriptBuf::new_op_return(payload),
    }
}

/// Transaction spending `inputs`; at least one input keeps the encoding unambiguous.
pub fn transaction(inputs: &[OutPoint], outputs: Vec<TxOut>) -> Transaction {
    Transaction {
        version: transaction::Version::ONE,
        lock_time: LockTime::ZERO,
        input: inputs
            .iter()
            .map(|previous_output| TxIn {
                previous_output: *previous_output,
                script_sig: ScriptBuf::new(),
                sequence: Sequence::MAX,
                witness: Witness::new(),
            })
            .collect(),
        output: outputs,
    }
}

/// A block header together with the transactions it commits to.
#[derive(Debug, Clone)]
pub struct TestBlock {
    pub header: Header,
    pub txs: Vec<Transaction>,
}

impl TestBlock {
    /// Builds a block on top of `parent` committing to `txs`.
    pub fn new(parent: &Header, txs: Vec<Transaction>) -> Self {
        let leaves = Self::leaves(&txs);
        let merkle_root = compute_merkle_root(&leaves).expect("Test blocks are never empty; qed");
        Self {
            header: next_header(parent, TxMerkleNode::from_byte_array(merkle_root), 0),
            txs,
        }
    }

    fn leaves(txs: &[Transaction]) -> Vec<Hash256> {
        txs.iter()
            .map(|tx| tx.compute_txid().to_byte_array())
            .collect()
    }

    /// Block hash.
    pub fn hash(&self) -> BlockHash {
        self.header.block_hash()
    }

    /// Serialized transaction at `index`.
    pub fn raw_tx(&self, index: usize) -> Vec<u8> {
        serialize(&self.txs[index])
    }

    /// Merkle siblings of the transaction at `index`.
    pub fn siblings(&self, index: usize) -> Vec<Hash256> {
        merkle_proof(&Self::leaves(&self.txs), index).expect("Index within the block; qed")
    }
}
