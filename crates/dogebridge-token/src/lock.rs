use bitcoin::{OutPoint, PubkeyHash, Transaction};
use dogebridge_codec::{op_return_payload, p2pkh_hash};
use dogebridge_primitives::{AccountId, Amount};

/// Output of a lock transaction paying the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockedOutput {
    pub outpoint: OutPoint,
    pub value: Amount,
}

/// DOGE locked with an operator by a single transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deposit {
    /// Account credited with the minted tokens.
    pub recipient: AccountId,
    pub outputs: Vec<LockedOutput>,
}

impl Deposit {
    /// Sum of the locked outputs.
    pub fn total(&self) -> Option<Amount> {
        self.outputs
            .iter()
            .try_fold(0u64, |total, output| total.checked_add(output.value))
    }
}

/// Extracts the deposit `tx` makes to `operator`, `None` if it pays nothing to it.
///
/// The recipient is the first null-data output carrying exactly 20 bytes, `default_recipient`
/// when there is none.
pub fn parse_deposit(tx: &Transaction, operator: &PubkeyHash, default_recipient: AccountId) -> Option<Deposit> {
    let txid = tx.compute_txid();

    let outputs = tx
        .output
        .iter()
        .enumerate()
        .filter(|(_, output)| p2pkh_hash(&output.script_pubkey).as_ref() == Some(operator))
        .map(|(vout, output)| LockedOutput {
            outpoint: OutPoint {
                txid,
                vout: vout as u32,
            },
            value: output.value.to_sat(),
        })
        .collect::<Vec<_>>();

    if outputs.is_empty() {
        return None;
    }

    let recipient = tx
        .output
        .iter()
        .filter_map(|output| op_return_payload(&output.script_pubkey))
        .find_map(|payload| <[u8; 20]>::try_from(payload).ok())
        .map(AccountId::from)
        .unwrap_or(default_recipient);

    Some(Deposit { recipient, outputs })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitcoin::hashes::Hash;
    use dogebridge_test_utils::{op_return_output, p2pkh_output, prior_outpoint, transaction};

    const OPERATOR: [u8; 20] = [0x4d; 20];
    const DEFAULT: AccountId = AccountId::repeat_byte(0xdd);

    fn operator() -> PubkeyHash {
        PubkeyHash::from_byte_array(OPERATOR)
    }

    #[test]
    fn collects_operator_outputs_and_recipient() {
        let stranger = PubkeyHash::from_byte_array([9; 20]);
        let tx = transaction(
            &[prior_outpoint(1)],
            vec![
                p2pkh_output(operator(), 300),
                p2pkh_output(stranger, 1_000),
                op_return_output(&[0x11; 20]),
                p2pkh_output(operator(), 200),
            ],
        );

        let deposit = parse_deposit(&tx, &operator(), DEFAULT).unwrap();
        assert_eq!(deposit.recipient, AccountId::repeat_byte(0x11));
        assert_eq!(deposit.total(), Some(500));
        assert_eq!(
            deposit.outputs.iter().map(|o| o.outpoint.vout).collect::<Vec<_>>(),
            vec![0, 3]
        );
        assert_eq!(deposit.outputs[0].outpoint.txid, tx.compute_txid());
    }

    #[test]
    fn falls_back_to_default_recipient() {
        let tx = transaction(
            &[prior_outpoint(1)],
            vec![p2pkh_output(operator(), 300), op_return_output(b"not an account")],
        );
        assert_eq!(parse_deposit(&tx, &operator(), DEFAULT).unwrap().recipient, DEFAULT);

        let tx = transaction(&[prior_outpoint(1)], vec![op_return_output(&[0x11; 20])]);
        assert_eq!(parse_deposit(&tx, &operator(), DEFAULT), None);
    }
}
