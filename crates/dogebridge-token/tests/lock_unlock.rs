//! End-to-end tests for locks and unlocks proven against relayed regtest headers.

use bitcoin::block::Header;
use bitcoin::hashes::Hash;
use bitcoin::{OutPoint, PubkeyHash, Transaction};
use dogebridge_primitives::{AccountId, Amount, ErrorKind};
use dogebridge_relay::{PowVerdict, SpvProof};
use dogebridge_test_utils::{
    DEFAULT_RECIPIENT, SCRYPT_CHECKER, TRIVIAL_POW, TestBlock, header_chain, op_return_output,
    p2pkh_output, prior_outpoint, raw, regtest_config, regtest_genesis, transaction,
};
use dogebridge_token::{DogeBridge, Error, ProofStatus, UnlockStatus, UtxoStatus};
use proptest::prelude::*;

const REQUESTER: AccountId = AccountId::repeat_byte(0x01);
const CONTROLLER: AccountId = AccountId::repeat_byte(0x03);

const SCENARIO_UTXOS: [Amount; 5] = [400_000_000, 200_000_000, 600_000_000, 800_000_000, 900_000_000];

fn operator() -> PubkeyHash {
    PubkeyHash::from_byte_array([0x4d; 20])
}

fn destination() -> PubkeyHash {
    PubkeyHash::from_byte_array([0x88; 20])
}

/// Bridge with one registered operator and a chain tip to build blocks on.
struct Harness {
    bridge: DogeBridge,
    tip: Header,
}

impl Harness {
    fn new() -> Self {
        let mut bridge = DogeBridge::new(&regtest_config()).unwrap();
        bridge.add_operator(operator(), CONTROLLER).unwrap();
        Self {
            bridge,
            tip: regtest_genesis(),
        }
    }

    fn accept(&mut self, header: &Header) {
        let hash = self.bridge.submit_header(&raw(header), TRIVIAL_POW).unwrap();
        self.bridge
            .resolve_pow(SCRYPT_CHECKER, hash, PowVerdict::Verified)
            .unwrap();
        self.tip = *header;
    }

    /// Accepts a block carrying `txs` on the tip without burying it.
    fn include(&mut self, txs: Vec<Transaction>) -> TestBlock {
        let block = TestBlock::new(&self.tip, txs);
        self.accept(&block.header);
        block
    }

    /// Accepts a block carrying `txs` and enough headers on top to make it final.
    fn confirm(&mut self, txs: Vec<Transaction>) -> TestBlock {
        let block = self.include(txs);
        self.bury();
        block
    }

    fn bury(&mut self) {
        let min_confirmations = self.bridge.relay().min_confirmations() as usize;
        for header in header_chain(&self.tip, min_confirmations, 0) {
            self.accept(&header);
        }
    }

    /// Locks `values` with the operator in a single final transaction.
    fn lock(&mut self, values: &[Amount], recipient: AccountId) -> TestBlock {
        let mut outputs = values
            .iter()
            .map(|value| p2pkh_output(operator(), *value))
            .collect::<Vec<_>>();
        outputs.push(op_return_output(recipient.as_slice()));

        let block = self.confirm(vec![transaction(&[prior_outpoint(1)], outputs)]);
        assert_eq!(
            self.bridge.process_lock(operator(), &proof(&block, 0)).unwrap(),
            ProofStatus::Accepted
        );
        block
    }

    /// Transaction spending `inputs`, paying `to_destination` and returning `change`.
    fn redemption(inputs: &[OutPoint], to_destination: Amount, change: Amount) -> Transaction {
        transaction(
            inputs,
            vec![
                p2pkh_output(destination(), to_destination),
                p2pkh_output(operator(), change),
            ],
        )
    }
}

fn proof(block: &TestBlock, index: usize) -> SpvProof {
    SpvProof {
        block_hash: block.hash(),
        tx: block.raw_tx(index),
        siblings: block.siblings(index),
        tx_index: index as u32,
    }
}

fn assert_ledgers_balanced(bridge: &DogeBridge) {
    let tokens = bridge.tokens();
    assert_eq!(
        tokens.total_supply(),
        tokens.total_locked() - tokens.total_burned()
    );
    assert_eq!(
        tokens.total_supply(),
        bridge.balance_of(&REQUESTER) + bridge.balance_of(&CONTROLLER) + bridge.balance_of(&DEFAULT_RECIPIENT)
    );

    let operator = bridge.operator(&operator()).unwrap();
    let unspent = operator
        .utxos
        .iter()
        .filter(|utxo| utxo.status != UtxoStatus::Spent)
        .map(|utxo| utxo.value)
        .sum::<Amount>();
    assert_eq!(operator.doge_balance(), unspent);
}

#[test]
fn lock_then_unlock_with_multiple_utxos() {
    let mut harness = Harness::new();
    let lock_block = harness.lock(&SCENARIO_UTXOS, REQUESTER);
    let lock_txid = lock_block.txs[0].compute_txid();

    let bridge = &mut harness.bridge;
    assert_eq!(bridge.balance_of(&REQUESTER), 2_900_000_000);
    let operator_state = bridge.operator(&operator()).unwrap();
    assert_eq!(operator_state.available_balance, 2_900_000_000);
    assert_eq!(operator_state.utxos.len(), 5);
    assert_eq!(operator_state.utxos[3].outpoint, OutPoint { txid: lock_txid, vout: 3 });
    assert_eq!(operator_state.utxos[3].height, 1);

    let first = bridge
        .do_unlock(REQUESTER, destination(), 1_000_000_000, operator())
        .unwrap();
    let request = bridge.unlock_request(first).unwrap();
    assert_eq!(request.selected_utxos, vec![0, 1, 2]);
    assert_eq!(request.operator_fee, 10_000_000);
    assert_eq!(request.doge_tx_fee, 200_000_000);

    let operator_state = bridge.operator(&operator()).unwrap();
    assert_eq!(operator_state.available_balance, 1_700_000_000);
    assert_eq!(operator_state.pending_balance, 1_200_000_000);

    let second = bridge
        .do_unlock(REQUESTER, destination(), 1_500_000_000, operator())
        .unwrap();
    let request = bridge.unlock_request(second).unwrap();
    assert_eq!(request.selected_utxos, vec![3, 4]);
    assert_eq!(request.operator_fee, 15_000_000);
    assert_eq!(request.doge_tx_fee, 200_000_000);

    let operator_state = bridge.operator(&operator()).unwrap();
    assert_eq!(operator_state.next_unspent_utxo_index, 5);
    assert_eq!(operator_state.available_balance, 0);
    assert_eq!(operator_state.pending_balance, 2_900_000_000);

    assert!(matches!(
        bridge.do_unlock(REQUESTER, destination(), 1, operator()),
        Err(Error::InsufficientAvailableBalance { available: 0, .. })
    ));

    assert_eq!(bridge.balance_of(&REQUESTER), 400_000_000);
    assert_eq!(bridge.balance_of(&CONTROLLER), 25_000_000);
    assert_ledgers_balanced(bridge);
}

#[test]
fn completion_settles_reserved_utxos_and_recovers_change() {
    let mut harness = Harness::new();
    harness.lock(&SCENARIO_UTXOS, REQUESTER);

    let unlock_idx = harness
        .bridge
        .do_unlock(REQUESTER, destination(), 1_000_000_000, operator())
        .unwrap();
    let request = harness.bridge.unlock_request(unlock_idx).unwrap().clone();

    let redemption = Harness::redemption(&request.outpoints, request.redeemed_value(), 100_000_000);
    let block = harness.confirm(vec![redemption]);

    let status = harness
        .bridge
        .report_unlock_completion(unlock_idx, &proof(&block, 0))
        .unwrap();
    assert_eq!(status, ProofStatus::Accepted);

    let bridge = &harness.bridge;
    assert_eq!(
        bridge.unlock_request(unlock_idx).unwrap().status,
        UnlockStatus::Completed(block.hash())
    );

    let operator_state = bridge.operator(&operator()).unwrap();
    assert_eq!(operator_state.pending_balance, 0);
    assert_eq!(operator_state.available_balance, 1_700_000_000 + 100_000_000);
    for index in request.selected_utxos {
        assert_eq!(operator_state.utxos[index].status, UtxoStatus::Spent);
    }
    let change = operator_state.utxos.last().unwrap();
    assert_eq!(change.value, 100_000_000);
    assert_eq!(change.height, bridge.relay().entry(&block.hash()).unwrap().height);
    assert_eq!(change.status, UtxoStatus::Available);
    assert_ledgers_balanced(bridge);

    assert!(matches!(
        harness.bridge.report_unlock_completion(unlock_idx, &proof(&block, 0)),
        Err(Error::AlreadyCompleted(_))
    ));
}

#[test]
fn completion_requires_honoring_the_request() {
    let mut harness = Harness::new();
    harness.lock(&SCENARIO_UTXOS, REQUESTER);

    let unlock_idx = harness
        .bridge
        .do_unlock(REQUESTER, destination(), 1_000_000_000, operator())
        .unwrap();
    let request = harness.bridge.unlock_request(unlock_idx).unwrap().clone();

    let partial = Harness::redemption(&request.outpoints[..2], request.redeemed_value(), 0);
    let underpaying = Harness::redemption(&request.outpoints, request.redeemed_value() - 1, 0);
    let honest = Harness::redemption(&request.outpoints, request.redeemed_value(), 0);
    let block = harness.confirm(vec![partial, underpaying, honest]);

    let err = harness
        .bridge
        .report_unlock_completion(unlock_idx, &proof(&block, 0))
        .unwrap_err();
    assert!(matches!(
        err,
        Error::MissingUnlockInput { outpoint, .. } if outpoint == request.outpoints[2]
    ));

    assert!(matches!(
        harness
            .bridge
            .report_unlock_completion(unlock_idx, &proof(&block, 1)),
        Err(Error::InsufficientRedemption { paid, required, .. })
            if paid + 1 == required
    ));

    // A proof pointing at another position does not lead to the Merkle root.
    let misplaced = SpvProof {
        tx_index: 0,
        ..proof(&block, 2)
    };
    assert_eq!(
        harness
            .bridge
            .report_unlock_completion(unlock_idx, &misplaced)
            .unwrap(),
        ProofStatus::Rejected
    );
    assert!(harness.bridge.unlock_request(unlock_idx).unwrap().is_pending());
    assert_eq!(
        harness.bridge.operator(&operator()).unwrap().pending_balance,
        1_200_000_000
    );

    assert_eq!(
        harness
            .bridge
            .report_unlock_completion(unlock_idx, &proof(&block, 2))
            .unwrap(),
        ProofStatus::Accepted
    );

    assert!(matches!(
        harness.bridge.report_unlock_completion(7, &proof(&block, 2)),
        Err(Error::UnknownUnlock(7))
    ));
}

#[test]
fn redemption_cannot_be_processed_as_a_lock() {
    let mut harness = Harness::new();
    harness.lock(&SCENARIO_UTXOS, REQUESTER);

    let unlock_idx = harness
        .bridge
        .do_unlock(REQUESTER, destination(), 1_000_000_000, operator())
        .unwrap();
    let request = harness.bridge.unlock_request(unlock_idx).unwrap().clone();

    let redemption = Harness::redemption(&request.outpoints, request.redeemed_value(), 100_000_000);
    let redemption_txid = redemption.compute_txid();
    let block = harness.confirm(vec![redemption]);

    let err = harness
        .bridge
        .process_lock(operator(), &proof(&block, 0))
        .unwrap_err();
    assert!(matches!(
        err,
        Error::SpendsOperatorUtxo { txid, outpoint }
            if txid == redemption_txid && outpoint == request.outpoints[0]
    ));
    assert_eq!(err.kind(), ErrorKind::InvalidState);
    assert_eq!(harness.bridge.balance_of(&DEFAULT_RECIPIENT), 0);

    assert_eq!(
        harness
            .bridge
            .report_unlock_completion(unlock_idx, &proof(&block, 0))
            .unwrap(),
        ProofStatus::Accepted
    );
    let operator_state = harness.bridge.operator(&operator()).unwrap();
    assert_eq!(operator_state.pending_balance, 0);
    assert_eq!(operator_state.available_balance, 1_800_000_000);
    assert_ledgers_balanced(&harness.bridge);
}

#[test]
fn overflowing_change_leaves_the_unlock_pending() {
    let mut harness = Harness::new();
    harness.lock(&SCENARIO_UTXOS, REQUESTER);

    let unlock_idx = harness
        .bridge
        .do_unlock(REQUESTER, destination(), 1_000_000_000, operator())
        .unwrap();
    let request = harness.bridge.unlock_request(unlock_idx).unwrap().clone();

    let overflowing =
        Harness::redemption(&request.outpoints, request.redeemed_value(), u64::MAX - 1_000_000_000);
    let honest = Harness::redemption(&request.outpoints, request.redeemed_value(), 0);
    let block = harness.confirm(vec![overflowing, honest]);

    assert!(matches!(
        harness
            .bridge
            .report_unlock_completion(unlock_idx, &proof(&block, 0)),
        Err(Error::AmountOverflow)
    ));

    let operator_state = harness.bridge.operator(&operator()).unwrap();
    assert_eq!(operator_state.pending_balance, 1_200_000_000);
    assert_eq!(operator_state.utxos.len(), 5);
    for &index in &request.selected_utxos {
        assert_eq!(operator_state.utxos[index].status, UtxoStatus::Reserved);
    }
    assert!(harness.bridge.unlock_request(unlock_idx).unwrap().is_pending());

    assert_eq!(
        harness
            .bridge
            .report_unlock_completion(unlock_idx, &proof(&block, 1))
            .unwrap(),
        ProofStatus::Accepted
    );
    assert_eq!(harness.bridge.operator(&operator()).unwrap().pending_balance, 0);
    assert_ledgers_balanced(&harness.bridge);
}

#[test]
fn lock_proofs_are_checked_before_minting() {
    let mut harness = Harness::new();

    let lock = transaction(&[prior_outpoint(1)], vec![p2pkh_output(operator(), 500)]);
    let stranger_pays = transaction(
        &[prior_outpoint(2)],
        vec![p2pkh_output(PubkeyHash::from_byte_array([9; 20]), 500)],
    );
    let block = harness.include(vec![lock, stranger_pays]);

    let err = harness
        .bridge
        .process_lock(operator(), &proof(&block, 0))
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Relay(dogebridge_relay::Error::InsufficientConfirmations { .. })
    ));
    assert_eq!(err.kind(), ErrorKind::InvalidState);

    harness.bury();

    let unknown = PubkeyHash::from_byte_array([1; 20]);
    assert!(matches!(
        harness.bridge.process_lock(unknown, &proof(&block, 0)),
        Err(Error::UnknownOperator(_))
    ));

    let misplaced = SpvProof {
        tx_index: 1,
        ..proof(&block, 0)
    };
    assert_eq!(
        harness.bridge.process_lock(operator(), &misplaced).unwrap(),
        ProofStatus::Rejected
    );
    assert_eq!(
        harness.bridge.verify_transaction(&misplaced).unwrap(),
        ProofStatus::Rejected
    );
    assert_eq!(
        harness.bridge.verify_transaction(&proof(&block, 1)).unwrap(),
        ProofStatus::Accepted
    );

    assert!(matches!(
        harness.bridge.process_lock(operator(), &proof(&block, 1)),
        Err(Error::NoOperatorOutput { .. })
    ));
    assert_eq!(harness.bridge.total_supply(), 0);

    // Without a recipient in the transaction the default recipient is credited.
    assert_eq!(
        harness
            .bridge
            .process_lock(operator(), &proof(&block, 0))
            .unwrap(),
        ProofStatus::Accepted
    );
    assert_eq!(harness.bridge.balance_of(&DEFAULT_RECIPIENT), 500);

    assert!(matches!(
        harness.bridge.process_lock(operator(), &proof(&block, 0)),
        Err(Error::TransactionAlreadyProcessed(_))
    ));
    assert_eq!(harness.bridge.total_supply(), 500);
}

#[test]
fn settlements_survive_a_reorg() {
    let mut harness = Harness::new();
    harness.lock(&[1_000], REQUESTER);
    let settled_height = harness.bridge.best_height();

    // A heavier branch from the genesis replaces the chain that carried the lock.
    let fork = header_chain(&regtest_genesis(), settled_height as usize + 1, 99);
    for header in &fork {
        harness.accept(header);
    }
    assert_eq!(harness.bridge.relay().best_tip().hash, fork.last().unwrap().block_hash());

    assert_eq!(harness.bridge.balance_of(&REQUESTER), 1_000);
    assert_eq!(
        harness.bridge.operator(&operator()).unwrap().available_balance,
        1_000
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn ledgers_stay_balanced(
        amounts in proptest::collection::vec(1..800_000_000u64, 1..12),
        transfers in proptest::collection::vec(0..100_000_000u64, 0..4),
    ) {
        let mut harness = Harness::new();
        harness.lock(&SCENARIO_UTXOS, REQUESTER);

        for amount in transfers {
            let _ = harness.bridge.transfer(REQUESTER, CONTROLLER, amount);
        }

        let mut created = 0;
        for amount in amounts {
            let before = harness.bridge.unlock_count();
            match harness.bridge.do_unlock(REQUESTER, destination(), amount, operator()) {
                Ok(index) => {
                    prop_assert_eq!(index, before);
                    created += 1;
                }
                Err(err) => prop_assert_eq!(harness.bridge.unlock_count(), before, "{}", err),
            }
            assert_ledgers_balanced(&harness.bridge);
        }

        let burned = (0..created)
            .map(|i| harness.bridge.unlock_request(i).unwrap().redeemed_value())
            .sum::<Amount>();
        prop_assert_eq!(harness.bridge.tokens().total_burned(), burned);
    }
}
