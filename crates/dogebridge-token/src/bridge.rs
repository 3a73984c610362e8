use crate::lock::parse_deposit;
use crate::operator::Operator;
use crate::token::TokenLedger;
use crate::unlock::{UnlockRequest, UnlockStatus, operator_fee, select_utxos};
use crate::Error;
use bitcoin::{BlockHash, OutPoint, PubkeyHash, Transaction, Txid};
use dogebridge_codec::{PowHash, p2pkh_hash};
use dogebridge_primitives::{AccountId, Amount, BASIS_POINTS, BridgeConfig, COIN};
use dogebridge_relay::{HeaderRelay, PowVerdict, ScryptVerifier, SpvProof};
use std::collections::{BTreeMap, HashSet};

/// Outcome of a transaction proof submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProofStatus {
    /// Proof verified and its effects applied.
    Accepted,
    /// Merkle proof does not lead to the block, nothing applied.
    Rejected,
}

/// State of the bridge: relayed headers, operators, the unlock log and token balances.
///
/// Each operation either applies all of its changes or fails without touching the state.
pub struct DogeBridge {
    relay: HeaderRelay,
    operator_fee_bps: u64,
    collateral_ratio_bps: u64,
    price_oracle: AccountId,
    default_recipient: AccountId,
    operators: BTreeMap<PubkeyHash, Operator>,
    unlocks: Vec<UnlockRequest>,
    tokens: TokenLedger,
    processed_txs: HashSet<Txid>,
    /// Wei per DOGE.
    doge_eth_price: Option<u128>,
}

impl DogeBridge {
    /// Creates a bridge from a deployment configuration.
    pub fn new(config: &BridgeConfig) -> Result<Self, Error> {
        config.validate()?;

        Ok(Self {
            relay: HeaderRelay::new(config)?,
            operator_fee_bps: config.operator_fee_bps,
            collateral_ratio_bps: config.collateral_ratio_bps,
            price_oracle: config.price_oracle,
            default_recipient: config.default_recipient,
            operators: BTreeMap::new(),
            unlocks: Vec::new(),
            tokens: TokenLedger::default(),
            processed_txs: HashSet::new(),
            doge_eth_price: None,
        })
    }

    /// Header relay backing the proofs.
    pub fn relay(&self) -> &HeaderRelay {
        &self.relay
    }

    /// Token balances and supply counters.
    pub fn tokens(&self) -> &TokenLedger {
        &self.tokens
    }

    /// See [`HeaderRelay::submit_header`].
    pub fn submit_header(&mut self, raw_header: &[u8], claimed_pow_hash: PowHash) -> Result<BlockHash, Error> {
        Ok(self.relay.submit_header(raw_header, claimed_pow_hash)?)
    }

    /// See [`HeaderRelay::resolve_pow`].
    pub fn resolve_pow(&mut self, caller: AccountId, block_hash: BlockHash, verdict: PowVerdict) -> Result<(), Error> {
        Ok(self.relay.resolve_pow(caller, block_hash, verdict)?)
    }

    /// See [`HeaderRelay::run_scrypt_checks`].
    pub fn run_scrypt_checks(&mut self, caller: AccountId, verifier: &impl ScryptVerifier) -> Result<usize, Error> {
        Ok(self.relay.run_scrypt_checks(caller, verifier)?)
    }

    pub fn best_height(&self) -> u32 {
        self.relay.best_height()
    }

    pub fn confirmations(&self, block_hash: &BlockHash) -> u32 {
        self.relay.confirmations(block_hash)
    }

    /// Checks a transaction proof against the relayed chain without applying it.
    pub fn verify_transaction(&self, proof: &SpvProof) -> Result<ProofStatus, Error> {
        Ok(match self.verified_height(proof)? {
            Some(_) => ProofStatus::Accepted,
            None => ProofStatus::Rejected,
        })
    }

    /// Registers an operator controlled by `controller`.
    pub fn add_operator(&mut self, pubkey_hash: PubkeyHash, controller: AccountId) -> Result<(), Error> {
        if self.operators.contains_key(&pubkey_hash) {
            return Err(Error::DuplicateOperator(pubkey_hash));
        }

        tracing::info!(%pubkey_hash, %controller, "Operator added");

        self.operators
            .insert(pubkey_hash, Operator::new(pubkey_hash, controller));

        Ok(())
    }

    pub fn operator(&self, pubkey_hash: &PubkeyHash) -> Option<&Operator> {
        self.operators.get(pubkey_hash)
    }

    /// Appends a UTXO to an operator's sequence on behalf of its controller.
    ///
    /// No token is minted; outpoint uniqueness is up to the controller.
    pub fn add_utxo(
        &mut self,
        caller: AccountId,
        operator: PubkeyHash,
        value: Amount,
        outpoint: OutPoint,
        height: u32,
    ) -> Result<usize, Error> {
        let operator = self.controlled_operator_mut(caller, &operator)?;
        operator.add_utxo(value, outpoint, height)
    }

    /// Processes a lock: a final transaction paying `operator`.
    ///
    /// Every output paying the operator becomes one of its UTXOs and their total is minted
    /// to the recipient named in the transaction. Transactions spending an operator UTXO are
    /// redemptions and are refused.
    pub fn process_lock(&mut self, operator: PubkeyHash, proof: &SpvProof) -> Result<ProofStatus, Error> {
        if !self.operators.contains_key(&operator) {
            return Err(Error::UnknownOperator(operator));
        }

        let tx = proof.transaction()?;
        let txid = tx.compute_txid();
        self.ensure_unprocessed(txid)?;

        // Redemptions pay change back to the operator, they are completed, never locked.
        if let Some(outpoint) = self.spent_operator_outpoint(&tx) {
            return Err(Error::SpendsOperatorUtxo { txid, outpoint });
        }

        let Some(height) = self.verified_height(proof)? else {
            return Ok(ProofStatus::Rejected);
        };

        let deposit = parse_deposit(&tx, &operator, self.default_recipient)
            .ok_or(Error::NoOperatorOutput { txid, operator })?;
        let total = deposit.total().ok_or(Error::AmountOverflow)?;

        let operator = self
            .operators
            .get_mut(&operator)
            .expect("Operator checked above; qed");
        if operator.doge_balance().checked_add(total).is_none()
            || self.tokens.total_locked().checked_add(total).is_none()
        {
            return Err(Error::AmountOverflow);
        }

        for output in &deposit.outputs {
            operator.add_utxo(output.value, output.outpoint, height)?;
        }
        self.tokens.mint(deposit.recipient, total)?;
        self.processed_txs.insert(txid);

        tracing::info!(
            %txid,
            %operator,
            recipient = %deposit.recipient,
            "Lock of {total} processed, {} UTXOs added",
            deposit.outputs.len()
        );

        Ok(ProofStatus::Accepted)
    }

    /// Requests `amount` DOGE from `operator` to be paid to `destination`, returning the
    /// index of the new unlock request.
    ///
    /// The requester pays `amount` in tokens: the operator fee goes to the operator's
    /// controller and the rest is burned. UTXOs covering `amount` are reserved from the
    /// operator's cursor on. Identical requests are never merged.
    pub fn do_unlock(
        &mut self,
        requester: AccountId,
        destination: PubkeyHash,
        amount: Amount,
        operator: PubkeyHash,
    ) -> Result<u64, Error> {
        if amount == 0 {
            return Err(Error::ZeroAmount);
        }

        let operator = self
            .operators
            .get_mut(&operator)
            .ok_or(Error::UnknownOperator(operator))?;

        let insufficient = Error::InsufficientAvailableBalance {
            requested: amount,
            available: operator.available_balance,
        };
        if amount > operator.available_balance {
            return Err(insufficient);
        }

        self.tokens.ensure_balance(requester, amount)?;

        let selection = select_utxos(&operator.utxos, operator.next_unspent_utxo_index, amount)
            .ok_or(insufficient)?;

        let fee = operator_fee(amount, self.operator_fee_bps);
        self.tokens.transfer(requester, operator.controller, fee)?;
        self.tokens.burn(requester, amount - fee)?;

        operator.reserve(selection.indices.len());

        let index = self.unlocks.len() as u64;
        let request = UnlockRequest {
            index,
            requester,
            destination,
            amount,
            operator: operator.pubkey_hash,
            outpoints: selection
                .indices
                .iter()
                .map(|&i| operator.utxos[i].outpoint)
                .collect(),
            selected_utxos: selection.indices,
            operator_fee: fee,
            doge_tx_fee: selection.total - amount,
            status: UnlockStatus::Pending,
        };

        tracing::info!(
            %requester,
            %destination,
            %operator,
            "Unlock #{index} of {amount} created, fee {fee}, selected UTXOs {:?}",
            request.selected_utxos
        );

        self.unlocks.push(request);

        Ok(index)
    }

    /// Unlock request at `unlock_idx`, with everything needed to build its redemption.
    pub fn unlock_request(&self, unlock_idx: u64) -> Result<&UnlockRequest, Error> {
        self.unlocks
            .get(unlock_idx as usize)
            .ok_or(Error::UnknownUnlock(unlock_idx))
    }

    /// Number of unlock requests ever created.
    pub fn unlock_count(&self) -> u64 {
        self.unlocks.len() as u64
    }

    /// Completes an unlock with the proof of its redemption transaction.
    ///
    /// The transaction must spend every reserved outpoint and pay the destination at least
    /// the requested amount minus the operator fee. The reserved UTXOs are dropped and
    /// outputs paying the operator back become new available UTXOs.
    pub fn report_unlock_completion(&mut self, unlock_idx: u64, proof: &SpvProof) -> Result<ProofStatus, Error> {
        let request = self.unlock_request(unlock_idx)?;
        if !request.is_pending() {
            return Err(Error::AlreadyCompleted(unlock_idx));
        }

        let tx = proof.transaction()?;
        let txid = tx.compute_txid();
        self.ensure_unprocessed(txid)?;

        let Some(height) = self.verified_height(proof)? else {
            return Ok(ProofStatus::Rejected);
        };

        if let Some(outpoint) = request
            .outpoints
            .iter()
            .find(|outpoint| !tx.input.iter().any(|input| input.previous_output == **outpoint))
        {
            return Err(Error::MissingUnlockInput {
                unlock_idx,
                outpoint: *outpoint,
            });
        }

        let paid = paid_to(&tx, &request.destination)
            .try_fold(0u64, |total, (_, value)| total.checked_add(value))
            .ok_or(Error::AmountOverflow)?;
        if paid < request.redeemed_value() {
            return Err(Error::InsufficientRedemption {
                unlock_idx,
                paid,
                required: request.redeemed_value(),
            });
        }

        let operator_id = request.operator;
        let selected = request.selected_utxos.clone();
        let change = paid_to(&tx, &operator_id)
            .map(|(vout, value)| (OutPoint { txid, vout }, value))
            .collect::<Vec<_>>();

        let operator = self
            .operators
            .get_mut(&operator_id)
            .expect("Unlock requests reference registered operators; qed");

        let settled = selected.iter().map(|&index| operator.utxos[index].value).sum::<Amount>();
        change
            .iter()
            .try_fold(operator.doge_balance() - settled, |total, (_, value)| {
                total.checked_add(*value)
            })
            .ok_or(Error::AmountOverflow)?;

        operator.settle(&selected);
        for (outpoint, value) in change {
            operator.add_utxo(value, outpoint, height)?;
        }

        let request = &mut self.unlocks[unlock_idx as usize];
        request.status = UnlockStatus::Completed(proof.block_hash);
        self.processed_txs.insert(txid);

        tracing::info!(%txid, "Unlock #{unlock_idx} completed in block {}", proof.block_hash);

        Ok(ProofStatus::Accepted)
    }

    /// Publishes the DOGE/ETH price in wei per DOGE. Only the price oracle may call this.
    pub fn set_doge_eth_price(&mut self, caller: AccountId, wei_per_doge: u128) -> Result<(), Error> {
        if caller != self.price_oracle {
            return Err(Error::Unauthorized(caller));
        }
        tracing::debug!("DOGE/ETH price set to {wei_per_doge} wei");
        self.doge_eth_price = Some(wei_per_doge);
        Ok(())
    }

    pub fn doge_eth_price(&self) -> Option<u128> {
        self.doge_eth_price
    }

    /// Collateral in wei the operator must keep for the DOGE it holds.
    pub fn required_collateral(&self, operator: &PubkeyHash) -> Result<u128, Error> {
        let operator = self
            .operators
            .get(operator)
            .ok_or(Error::UnknownOperator(*operator))?;
        self.collateral_for(operator.doge_balance())
    }

    /// Adds `wei` to the collateral of an operator on behalf of its controller.
    pub fn deposit_collateral(&mut self, caller: AccountId, operator: PubkeyHash, wei: u128) -> Result<(), Error> {
        let operator = self.controlled_operator_mut(caller, &operator)?;
        operator.eth_collateral = operator
            .eth_collateral
            .checked_add(wei)
            .ok_or(Error::AmountOverflow)?;
        Ok(())
    }

    /// Withdraws `wei` of collateral as long as the remainder covers the requirement.
    pub fn withdraw_collateral(&mut self, caller: AccountId, operator: PubkeyHash, wei: u128) -> Result<(), Error> {
        let operator_id = operator;
        let operator = self
            .operators
            .get(&operator_id)
            .ok_or(Error::UnknownOperator(operator_id))?;
        if operator.controller != caller {
            return Err(Error::Unauthorized(caller));
        }

        let required = self.collateral_for(operator.doge_balance())?;
        let remaining = operator.eth_collateral.checked_sub(wei).ok_or(
            Error::InsufficientCollateral {
                remaining: 0,
                required,
            },
        )?;
        if remaining < required {
            return Err(Error::InsufficientCollateral {
                remaining,
                required,
            });
        }

        self.controlled_operator_mut(caller, &operator_id)?.eth_collateral = remaining;

        Ok(())
    }

    /// Moves tokens between accounts.
    pub fn transfer(&mut self, from: AccountId, to: AccountId, amount: Amount) -> Result<(), Error> {
        self.tokens.transfer(from, to, amount)
    }

    pub fn balance_of(&self, account: &AccountId) -> Amount {
        self.tokens.balance_of(account)
    }

    pub fn total_supply(&self) -> Amount {
        self.tokens.total_supply()
    }

    fn controlled_operator_mut(&mut self, caller: AccountId, operator: &PubkeyHash) -> Result<&mut Operator, Error> {
        let operator = self
            .operators
            .get_mut(operator)
            .ok_or(Error::UnknownOperator(*operator))?;
        if operator.controller != caller {
            return Err(Error::Unauthorized(caller));
        }
        Ok(operator)
    }

    /// First input of `tx` spending an output held by any operator.
    fn spent_operator_outpoint(&self, tx: &Transaction) -> Option<OutPoint> {
        tx.input
            .iter()
            .map(|input| input.previous_output)
            .find(|outpoint| {
                self.operators
                    .values()
                    .any(|operator| operator.utxos.iter().any(|utxo| utxo.outpoint == *outpoint))
            })
    }

    fn ensure_unprocessed(&self, txid: Txid) -> Result<(), Error> {
        if self.processed_txs.contains(&txid) {
            return Err(Error::TransactionAlreadyProcessed(txid));
        }
        Ok(())
    }

    /// Height of the proof's block if the proof holds, `None` on a Merkle mismatch.
    fn verified_height(&self, proof: &SpvProof) -> Result<Option<u32>, Error> {
        if !self.relay.verify_inclusion(proof)? {
            tracing::debug!(block_hash = ?proof.block_hash, "Rejected transaction proof");
            return Ok(None);
        }
        let entry = self
            .relay
            .entry(&proof.block_hash)
            .expect("Inclusion verified against a stored header; qed");
        Ok(Some(entry.height))
    }

    fn collateral_for(&self, doge: Amount) -> Result<u128, Error> {
        if doge == 0 {
            return Ok(0);
        }
        let price = self.doge_eth_price.ok_or(Error::MissingPrice)?;
        Ok(u128::from(doge)
            .saturating_mul(price)
            .saturating_mul(u128::from(self.collateral_ratio_bps))
            / u128::from(COIN)
            / u128::from(BASIS_POINTS))
    }
}

/// Outputs of `tx` paying `pubkey_hash`, as `(vout, value)`.
fn paid_to<'a>(tx: &'a Transaction, pubkey_hash: &'a PubkeyHash) -> impl Iterator<Item = (u32, Amount)> + 'a {
    tx.output
        .iter()
        .enumerate()
        .filter(move |(_, output)| p2pkh_hash(&output.script_pubkey).as_ref() == Some(pubkey_hash))
        .map(|(vout, output)| (vout as u32, output.value.to_sat()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitcoin::hashes::Hash;
    use dogebridge_primitives::ErrorKind;
    use dogebridge_test_utils::{PRICE_ORACLE, prior_outpoint, regtest_config};
    use hex_literal::hex;

    const REQUESTER: AccountId = AccountId::repeat_byte(0x01);
    const CONTROLLER: AccountId = AccountId::repeat_byte(0x03);

    fn operator_id() -> PubkeyHash {
        PubkeyHash::from_byte_array(hex!("4d905b4b815d483cdfabcd292c6f86509d0fad82"))
    }

    fn destination() -> PubkeyHash {
        PubkeyHash::from_byte_array([0x88; 20])
    }

    /// Bridge with one operator holding `utxos` and `REQUESTER` holding `tokens`.
    fn bridge_with(utxos: &[Amount], tokens: Amount) -> DogeBridge {
        let mut bridge = DogeBridge::new(&regtest_config()).unwrap();
        bridge.add_operator(operator_id(), CONTROLLER).unwrap();
        for (n, value) in utxos.iter().enumerate() {
            bridge
                .add_utxo(CONTROLLER, operator_id(), *value, prior_outpoint(n as u8 + 1), 1)
                .unwrap();
        }
        bridge.tokens.mint(REQUESTER, tokens).unwrap();
        bridge
    }

    #[test]
    fn do_unlock_with_multiple_utxos() {
        let mut bridge = bridge_with(
            &[400_000_000, 200_000_000, 600_000_000, 800_000_000, 900_000_000],
            2_900_000_000,
        );
        assert_eq!(bridge.operator(&operator_id()).unwrap().available_balance, 2_900_000_000);

        let first = bridge
            .do_unlock(REQUESTER, destination(), 1_000_000_000, operator_id())
            .unwrap();
        assert_eq!(first, 0);
        let request = bridge.unlock_request(0).unwrap();
        assert_eq!(request.selected_utxos, vec![0, 1, 2]);
        assert_eq!(request.operator_fee, 10_000_000);
        assert_eq!(request.doge_tx_fee, 200_000_000);
        assert_eq!(request.status, UnlockStatus::Pending);
        assert_eq!(
            request.outpoints,
            vec![prior_outpoint(1), prior_outpoint(2), prior_outpoint(3)]
        );

        let operator = bridge.operator(&operator_id()).unwrap();
        assert_eq!(operator.available_balance, 1_700_000_000);
        assert_eq!(operator.pending_balance, 1_200_000_000);
        assert_eq!(operator.next_unspent_utxo_index, 3);
        assert_eq!(bridge.balance_of(&REQUESTER), 1_900_000_000);
        assert_eq!(bridge.balance_of(&CONTROLLER), 10_000_000);

        let second = bridge
            .do_unlock(REQUESTER, destination(), 1_500_000_000, operator_id())
            .unwrap();
        assert_eq!(second, 1);
        let request = bridge.unlock_request(1).unwrap();
        assert_eq!(request.selected_utxos, vec![3, 4]);
        assert_eq!(request.operator_fee, 15_000_000);
        assert_eq!(request.doge_tx_fee, 200_000_000);

        let operator = bridge.operator(&operator_id()).unwrap();
        assert_eq!(operator.available_balance, 0);
        assert_eq!(operator.pending_balance, 2_900_000_000);
        assert_eq!(operator.next_unspent_utxo_index, 5);
        assert_eq!(bridge.balance_of(&REQUESTER), 400_000_000);
        assert_eq!(bridge.balance_of(&CONTROLLER), 25_000_000);
        assert_eq!(bridge.unlock_count(), 2);
        assert_eq!(bridge.total_supply(), 425_000_000);
        assert_eq!(bridge.tokens().total_burned(), 2_475_000_000);
    }

    #[test]
    fn failed_unlock_leaves_state_untouched() {
        let mut bridge = bridge_with(&[400_000_000, 200_000_000], 500_000_000);

        let err = bridge
            .do_unlock(REQUESTER, destination(), 600_000_001, operator_id())
            .unwrap_err();
        assert!(matches!(
            err,
            Error::InsufficientAvailableBalance {
                requested: 600_000_001,
                available: 600_000_000
            }
        ));
        assert_eq!(err.kind(), ErrorKind::InsufficientFunds);

        let err = bridge
            .do_unlock(REQUESTER, destination(), 600_000_000, operator_id())
            .unwrap_err();
        assert!(matches!(err, Error::InsufficientTokenBalance { .. }));

        let unknown = PubkeyHash::from_byte_array([1; 20]);
        let err = bridge
            .do_unlock(REQUESTER, destination(), 1, unknown)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownEntity);

        assert!(matches!(
            bridge.do_unlock(REQUESTER, destination(), 0, operator_id()),
            Err(Error::ZeroAmount)
        ));

        let operator = bridge.operator(&operator_id()).unwrap();
        assert_eq!(operator.available_balance, 600_000_000);
        assert_eq!(operator.next_unspent_utxo_index, 0);
        assert_eq!(bridge.balance_of(&REQUESTER), 500_000_000);
        assert_eq!(bridge.unlock_count(), 0);
        assert!(matches!(bridge.unlock_request(0), Err(Error::UnknownUnlock(0))));
    }

    #[test]
    fn repeated_unlock_is_not_deduplicated() {
        let mut bridge = bridge_with(&[300, 300, 300], 1_000);

        let first = bridge.do_unlock(REQUESTER, destination(), 300, operator_id()).unwrap();
        let second = bridge.do_unlock(REQUESTER, destination(), 300, operator_id()).unwrap();
        assert_ne!(first, second);
        assert_eq!(bridge.unlock_request(first).unwrap().selected_utxos, vec![0]);
        assert_eq!(bridge.unlock_request(second).unwrap().selected_utxos, vec![1]);
        assert_eq!(bridge.operator(&operator_id()).unwrap().pending_balance, 600);
        assert_eq!(bridge.balance_of(&REQUESTER), 400);
    }

    #[test]
    fn only_controller_manages_operator() {
        let mut bridge = bridge_with(&[], 0);
        let stranger = AccountId::repeat_byte(0x77);

        assert!(matches!(
            bridge.add_operator(operator_id(), stranger),
            Err(Error::DuplicateOperator(_))
        ));
        assert!(matches!(
            bridge.add_utxo(stranger, operator_id(), 1, OutPoint::null(), 1),
            Err(Error::Unauthorized(_))
        ));
        assert!(matches!(
            bridge.deposit_collateral(stranger, operator_id(), 1),
            Err(Error::Unauthorized(_))
        ));
        assert!(matches!(
            bridge.withdraw_collateral(stranger, operator_id(), 0),
            Err(Error::Unauthorized(_))
        ));
    }

    #[test]
    fn collateral_covers_held_doge() {
        let mut bridge = bridge_with(&[10 * COIN], 0);

        assert_eq!(
            bridge.required_collateral(&operator_id()).unwrap_err().kind(),
            ErrorKind::InvalidState
        );

        assert!(matches!(
            bridge.set_doge_eth_price(CONTROLLER, 1),
            Err(Error::Unauthorized(_))
        ));
        bridge.set_doge_eth_price(PRICE_ORACLE, 1_000).unwrap();

        // 10 DOGE at 1000 wei per DOGE with a 150% ratio.
        assert_eq!(bridge.required_collateral(&operator_id()).unwrap(), 15_000);

        bridge.deposit_collateral(CONTROLLER, operator_id(), 20_000).unwrap();
        assert!(matches!(
            bridge.withdraw_collateral(CONTROLLER, operator_id(), 5_001),
            Err(Error::InsufficientCollateral {
                remaining: 14_999,
                required: 15_000
            })
        ));
        assert!(matches!(
            bridge.withdraw_collateral(CONTROLLER, operator_id(), 20_001),
            Err(Error::InsufficientCollateral { .. })
        ));
        bridge.withdraw_collateral(CONTROLLER, operator_id(), 5_000).unwrap();
        assert_eq!(bridge.operator(&operator_id()).unwrap().eth_collateral, 15_000);
    }

    #[test]
    fn operator_without_doge_needs_no_collateral() {
        let mut bridge = bridge_with(&[], 0);
        bridge.deposit_collateral(CONTROLLER, operator_id(), 7).unwrap();
        assert_eq!(bridge.required_collateral(&operator_id()).unwrap(), 0);
        bridge.withdraw_collateral(CONTROLLER, operator_id(), 7).unwrap();
    }
}
