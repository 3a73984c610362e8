use bitcoin::{OutPoint, PubkeyHash};
use dogebridge_primitives::{AccountId, Amount};
use std::fmt;

/// Lifecycle of an operator UTXO.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UtxoStatus {
    /// Counted in the available balance and eligible for selection.
    Available,
    /// Selected by a pending unlock, counted in the pending balance.
    Reserved,
    /// Spent by a proven redemption transaction.
    Spent,
}

/// Dogecoin output backing the tokens of an operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utxo {
    pub value: Amount,
    pub outpoint: OutPoint,
    /// Height of the block that confirmed the output.
    pub height: u32,
    pub status: UtxoStatus,
}

/// Custodian of the DOGE backing the tokens, identified by the hash of its public key.
#[derive(Debug, Clone)]
pub struct Operator {
    pub pubkey_hash: PubkeyHash,
    /// Ethereum account controlling the operator and receiving its fees.
    pub controller: AccountId,
    /// Sum of the UTXOs not reserved by any unlock.
    pub available_balance: Amount,
    /// Sum of the UTXOs reserved by pending unlocks.
    pub pending_balance: Amount,
    /// Index of the first UTXO not yet selected. Every UTXO before it is reserved or spent.
    pub next_unspent_utxo_index: usize,
    pub utxos: Vec<Utxo>,
    /// ETH collateral in wei.
    pub eth_collateral: u128,
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pubkey_hash)
    }
}

impl Operator {
    pub fn new(pubkey_hash: PubkeyHash, controller: AccountId) -> Self {
        Self {
            pubkey_hash,
            controller,
            available_balance: 0,
            pending_balance: 0,
            next_unspent_utxo_index: 0,
            utxos: Vec::new(),
            eth_collateral: 0,
        }
    }

    /// DOGE held by the operator on behalf of the bridge, reserved or not.
    pub fn doge_balance(&self) -> Amount {
        self.available_balance + self.pending_balance
    }

    /// UTXOs eligible for selection, in selection order.
    pub fn unspent_utxos(&self) -> &[Utxo] {
        &self.utxos[self.next_unspent_utxo_index..]
    }

    /// Appends a UTXO to the selection sequence and returns its index.
    pub(crate) fn add_utxo(&mut self, value: Amount, outpoint: OutPoint, height: u32) -> Result<usize, crate::Error> {
        self.doge_balance()
            .checked_add(value)
            .ok_or(crate::Error::AmountOverflow)?;

        self.available_balance += value;
        self.utxos.push(Utxo {
            value,
            outpoint,
            height,
            status: UtxoStatus::Available,
        });

        let index = self.utxos.len() - 1;
        tracing::debug!(operator = %self, index, value, %outpoint, "UTXO added");

        Ok(index)
    }

    /// Reserves the `count` UTXOs following the cursor and advances it past them.
    pub(crate) fn reserve(&mut self, count: usize) -> Amount {
        let start = self.next_unspent_utxo_index;
        let mut reserved = 0;
        for utxo in &mut self.utxos[start..start + count] {
            debug_assert_eq!(utxo.status, UtxoStatus::Available);
            utxo.status = UtxoStatus::Reserved;
            reserved += utxo.value;
        }
        self.available_balance -= reserved;
        self.pending_balance += reserved;
        self.next_unspent_utxo_index += count;
        reserved
    }

    /// Marks reserved UTXOs as spent, dropping them from the pending balance.
    pub(crate) fn settle(&mut self, indices: &[usize]) {
        for &index in indices {
            let utxo = &mut self.utxos[index];
            debug_assert_eq!(utxo.status, UtxoStatus::Reserved);
            utxo.status = UtxoStatus::Spent;
            self.pending_balance -= utxo.value;
        }
    }
}
