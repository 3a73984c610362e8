use anyhow::{Context, anyhow};
use bitcoin::hashes::Hash;
use bitcoin::{OutPoint, TxMerkleNode, Txid};
use dogebridge_codec::{
    DogeHeader, Hash256, Target, compute_merkle_root, flip_bytes, merkle_proof, parse_header,
    scrypt_hash,
};
use dogebridge_primitives::Amount;
use dogebridge_token::{Utxo, UtxoStatus, operator_fee, select_utxos};
use serde::Serialize;

/// Utilities
#[derive(Debug, clap::Subcommand)]
pub enum Tools {
    /// Decode a serialized header, merged-mined or not.
    DecodeHeader {
        #[arg(index = 1)]
        header: String,
    },

    /// Decode compact bits into the target and the work they represent.
    Target {
        /// Bits in hex (`0x1e0ffff0`) or decimal.
        #[arg(index = 1)]
        bits: String,
    },

    /// Reverse the byte order of a hex string, e.g. to turn a displayed hash into its
    /// internal order.
    FlipBytes {
        #[arg(index = 1)]
        input: String,
    },

    /// Compute the Merkle root of a block from its txids.
    MerkleRoot {
        /// Txids in block order, as displayed by explorers.
        #[arg(required = true)]
        txids: Vec<String>,
    },

    /// Build the Merkle proof of the transaction at `index`, siblings in internal byte order.
    MerkleProof {
        #[arg(long)]
        index: usize,

        /// Txids in block order, as displayed by explorers.
        #[arg(required = true)]
        txids: Vec<String>,
    },

    /// Plan an unlock against a sequence of operator UTXO values.
    SelectUtxos {
        /// Amount to unlock.
        #[arg(long)]
        amount: Amount,

        /// Operator fee in basis points.
        #[arg(long, default_value_t = 100)]
        fee_bps: u64,

        /// Index of the first unselected UTXO.
        #[arg(long, default_value_t = 0)]
        cursor: usize,

        /// UTXO values in selection order.
        #[arg(required = true)]
        values: Vec<Amount>,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DecodedHeader {
    hash: String,
    version: i32,
    chain_id: u32,
    auxpow: bool,
    prev_blockhash: String,
    merkle_root: String,
    time: u32,
    bits: String,
    nonce: u32,
    target: String,
    work: String,
    pow_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent_hash: Option<String>,
}

impl From<&DogeHeader> for DecodedHeader {
    fn from(header: &DogeHeader) -> Self {
        let target = Target::from_bits(header.bits());
        Self {
            hash: header.block_hash().to_string(),
            version: header.version(),
            chain_id: header.chain_id(),
            auxpow: header.is_auxpow(),
            prev_blockhash: header.prev_blockhash().to_string(),
            merkle_root: header.header.merkle_root.to_string(),
            time: header.time(),
            bits: format!("{:#010x}", header.bits()),
            nonce: header.header.nonce,
            work: target.work().to_string(),
            target: target.to_string(),
            pow_hash: scrypt_hash(&header.pow_header_bytes()).to_string(),
            parent_hash: header
                .auxpow
                .as_ref()
                .map(|auxpow| auxpow.parent_hash.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DecodedTarget {
    bits: String,
    target: String,
    work: String,
    canonical_bits: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UnlockPlan {
    selected_utxos: Vec<usize>,
    selected_total: Amount,
    operator_fee: Amount,
    doge_tx_fee: Amount,
    next_cursor: usize,
}

fn decode_hex(input: &str) -> anyhow::Result<Vec<u8>> {
    let input = input.trim();
    let input = input.strip_prefix("0x").unwrap_or(input);
    hex::decode(input).with_context(|| format!("Invalid hex: {input}"))
}

fn parse_bits(bits: &str) -> anyhow::Result<u32> {
    let parsed = match bits.strip_prefix("0x") {
        Some(hex_bits) => u32::from_str_radix(hex_bits, 16),
        None => bits.parse(),
    };
    parsed.with_context(|| format!("Invalid bits: {bits}"))
}

/// Merkle leaves in internal byte order from displayed txids.
fn parse_leaves(txids: &[String]) -> anyhow::Result<Vec<Hash256>> {
    txids
        .iter()
        .map(|txid| {
            txid.parse::<Txid>()
                .map(|txid| txid.to_byte_array())
                .with_context(|| format!("Invalid txid: {txid}"))
        })
        .collect()
}

fn decode_target(bits: u32) -> DecodedTarget {
    let target = Target::from_bits(bits);
    DecodedTarget {
        bits: format!("{bits:#010x}"),
        work: target.work().to_string(),
        canonical_bits: format!("{:#010x}", target.to_compact()),
        target: target.to_string(),
    }
}

fn plan_unlock(amount: Amount, fee_bps: u64, cursor: usize, values: &[Amount]) -> anyhow::Result<UnlockPlan> {
    let utxos = values
        .iter()
        .map(|&value| Utxo {
            value,
            outpoint: OutPoint::null(),
            height: 0,
            status: UtxoStatus::Available,
        })
        .collect::<Vec<_>>();

    let selection = select_utxos(&utxos, cursor, amount)
        .ok_or_else(|| anyhow!("UTXOs from index {cursor} do not cover {amount}"))?;

    Ok(UnlockPlan {
        next_cursor: cursor + selection.indices.len(),
        selected_total: selection.total,
        operator_fee: operator_fee(amount, fee_bps),
        doge_tx_fee: selection.total - amount,
        selected_utxos: selection.indices,
    })
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

impl Tools {
    pub fn run(self) -> anyhow::Result<()> {
        match self {
            Self::DecodeHeader { header } => {
                let header = parse_header(&decode_hex(&header)?)?;
                print_json(&DecodedHeader::from(&header))?;
            }
            Self::Target { bits } => {
                print_json(&decode_target(parse_bits(&bits)?))?;
            }
            Self::FlipBytes { input } => {
                println!("{}", hex::encode(flip_bytes(&decode_hex(&input)?)));
            }
            Self::MerkleRoot { txids } => {
                let root = compute_merkle_root(&parse_leaves(&txids)?)?;
                println!("{}", TxMerkleNode::from_byte_array(root));
            }
            Self::MerkleProof { index, txids } => {
                let siblings = merkle_proof(&parse_leaves(&txids)?, index)?;
                let siblings = siblings.iter().map(hex::encode).collect::<Vec<_>>();
                print_json(&siblings)?;
            }
            Self::SelectUtxos {
                amount,
                fee_bps,
                cursor,
                values,
            } => {
                print_json(&plan_unlock(amount, fee_bps, cursor, &values)?)?;
            }
        }
        Ok(())
    }
}
