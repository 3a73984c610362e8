//! Unlock requests and the UTXO selection they rely on.
//!
//! Selection is sequential and greedy: starting at the operator's cursor, UTXOs are taken
//! in storage order until their sum covers the requested amount. Off-chain signers rebuild
//! the redemption transaction from this exact order.

use crate::operator::Utxo;
use bitcoin::{BlockHash, OutPoint, PubkeyHash};
use dogebridge_primitives::{AccountId, Amount, BASIS_POINTS};

/// UTXOs picked to cover an unlock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UtxoSelection {
    /// Indices into the operator's UTXO sequence.
    pub indices: Vec<usize>,
    /// Sum of the selected values, at least the requested amount.
    pub total: Amount,
}

/// Selects UTXOs from `utxos[start..]` until their values cover `amount`.
///
/// Every UTXO touched is taken whole. Returns `None` if the UTXOs after `start` do not
/// cover `amount`.
pub fn select_utxos(utxos: &[Utxo], start: usize, amount: Amount) -> Option<UtxoSelection> {
    let mut selection = UtxoSelection {
        indices: Vec::new(),
        total: 0,
    };

    for (index, utxo) in utxos.iter().enumerate().skip(start) {
        if selection.total >= amount {
            break;
        }
        selection.indices.push(index);
        selection.total += utxo.value;
    }

    (selection.total >= amount).then_some(selection)
}

/// Fee kept by the operator for an unlock of `amount`.
pub fn operator_fee(amount: Amount, fee_bps: u64) -> Amount {
    (u128::from(amount) * u128::from(fee_bps) / u128::from(BASIS_POINTS)) as Amount
}

/// Status of an unlock request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockStatus {
    /// Waiting for the redemption transaction to be proven.
    Pending,
    /// Redemption transaction proven in the given block.
    Completed(BlockHash),
}

/// Withdrawal of DOGE against burned tokens, as recorded in the unlock log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnlockRequest {
    /// Position in the unlock log.
    pub index: u64,
    pub requester: AccountId,
    /// P2PKH destination of the redeemed DOGE.
    pub destination: PubkeyHash,
    pub amount: Amount,
    pub operator: PubkeyHash,
    /// Indices of the reserved UTXOs in the operator's sequence.
    pub selected_utxos: Vec<usize>,
    /// Outpoints the redemption transaction must spend, in selection order.
    pub outpoints: Vec<OutPoint>,
    pub operator_fee: Amount,
    /// Selected value in excess of the requested amount.
    pub doge_tx_fee: Amount,
    pub status: UnlockStatus,
}

impl UnlockRequest {
    /// Value the redemption transaction must pay to the destination.
    pub fn redeemed_value(&self) -> Amount {
        self.amount - self.operator_fee
    }

    pub fn is_pending(&self) -> bool {
        self.status == UnlockStatus::Pending
    }
}
