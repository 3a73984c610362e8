use crate::difficulty::{calculate_next_work_required, retarget_lookback};
use crate::{ChainEntry, Error, HeaderStatus, PowVerdict, ScryptRequest, ScryptVerifier, SpvProof};
use bitcoin::BlockHash;
use bitcoin::hashes::Hash;
use dogebridge_codec::{DogeHeader, PowHash, Target, parse_header, verify_merkle_proof};
use dogebridge_primitives::{AccountId, BridgeConfig, ChainParams, MEDIAN_TIME_SPAN};
use std::collections::{HashMap, VecDeque};

/// Store of relayed Dogecoin headers.
///
/// Headers form a tree rooted at the configured genesis checkpoint. Each header waits in
/// [`HeaderStatus::PendingPoW`] until the scrypt checker reports on it, accepted headers
/// accumulate chain work and the accepted header with the most work is the best tip.
/// Chain work ties go to the header accepted first.
///
/// A pending header whose claimed hash is found invalid is forgotten, so that the same
/// header may be submitted again with its actual scrypt hash.
pub struct HeaderRelay {
    params: ChainParams,
    min_confirmations: u32,
    scrypt_checker: AccountId,
    entries: HashMap<BlockHash, ChainEntry>,
    children: HashMap<BlockHash, Vec<BlockHash>>,
    genesis_height: u32,
    /// Best chain hashes indexed by `height - genesis_height`.
    best_chain: Vec<BlockHash>,
    scrypt_requests: VecDeque<ScryptRequest>,
    next_accepted_order: u64,
}

impl HeaderRelay {
    /// Constructs a relay starting from the genesis checkpoint of `config`.
    pub fn new(config: &BridgeConfig) -> Result<Self, Error> {
        let params = config.chain_params();
        let header = parse_header(&config.genesis.header_bytes()?)?;
        let hash = header.block_hash();
        let genesis = ChainEntry {
            chain_work: Target::from_bits(header.bits()).work(),
            header,
            hash,
            height: config.genesis.height,
            status: HeaderStatus::Accepted,
            claimed_pow_hash: PowHash::default(),
            accepted_order: Some(0),
            finalized: true,
        };

        tracing::info!("Header relay starting from {genesis} on {}", params.network);

        Ok(Self {
            params,
            min_confirmations: config.min_confirmations,
            scrypt_checker: config.scrypt_checker,
            genesis_height: genesis.height,
            best_chain: vec![hash],
            entries: HashMap::from([(hash, genesis)]),
            children: HashMap::new(),
            scrypt_requests: VecDeque::new(),
            next_accepted_order: 1,
        })
    }

    /// Consensus parameters of the relayed network.
    pub fn params(&self) -> &ChainParams {
        &self.params
    }

    /// Confirmations a header needs before proofs against it are accepted.
    pub fn min_confirmations(&self) -> u32 {
        self.min_confirmations
    }

    /// Returns the stored entry of `block_hash`.
    pub fn entry(&self, block_hash: &BlockHash) -> Option<&ChainEntry> {
        self.entries.get(block_hash)
    }

    /// Returns the status of `block_hash`, `None` if it was never submitted.
    pub fn status(&self, block_hash: &BlockHash) -> Option<HeaderStatus> {
        self.entries.get(block_hash).map(|entry| entry.status)
    }

    /// Entry with the most accumulated work.
    pub fn best_tip(&self) -> &ChainEntry {
        let best_hash = self
            .best_chain
            .last()
            .expect("Best chain always contains the genesis checkpoint; qed");
        &self.entries[best_hash]
    }

    /// Height of the best tip.
    pub fn best_height(&self) -> u32 {
        self.genesis_height + self.best_chain.len() as u32 - 1
    }

    /// Hash of the best chain header at `height`.
    pub fn best_hash_at(&self, height: u32) -> Option<BlockHash> {
        let index = height.checked_sub(self.genesis_height)? as usize;
        self.best_chain.get(index).copied()
    }

    /// Returns whether `block_hash` is on the best chain.
    pub fn is_on_best_chain(&self, block_hash: &BlockHash) -> bool {
        self.entries
            .get(block_hash)
            .is_some_and(|entry| self.best_hash_at(entry.height) == Some(*block_hash))
    }

    /// Best tip height minus the header height for best chain headers, 0 otherwise.
    pub fn confirmations(&self, block_hash: &BlockHash) -> u32 {
        match self.entries.get(block_hash) {
            Some(entry) if self.is_on_best_chain(block_hash) => self.best_height() - entry.height,
            _ => 0,
        }
    }

    /// Returns whether the header reached the confirmation threshold on the best chain at
    /// some point. Final headers are never unwound.
    pub fn is_final(&self, block_hash: &BlockHash) -> bool {
        self.entries
            .get(block_hash)
            .is_some_and(|entry| entry.finalized)
    }

    /// Headers waiting for a scrypt verdict.
    pub fn pending_pow(&self) -> Vec<BlockHash> {
        let mut pending = self
            .entries
            .values()
            .filter(|entry| entry.status == HeaderStatus::PendingPoW)
            .map(|entry| entry.hash)
            .collect::<Vec<_>>();
        pending.sort_unstable();
        pending
    }

    /// Drains the scrypt requests queued since the last call.
    pub fn take_scrypt_requests(&mut self) -> Vec<ScryptRequest> {
        self.scrypt_requests.drain(..).collect()
    }

    /// Submits a serialized header together with the scrypt hash claimed for it.
    ///
    /// The header must extend an accepted header, follow the difficulty and time rules and
    /// its claimed hash must meet its target. On success it is queued for scrypt
    /// verification and stays [`HeaderStatus::PendingPoW`] until [`Self::resolve_pow`].
    pub fn submit_header(&mut self, raw_header: &[u8], claimed_pow_hash: PowHash) -> Result<BlockHash, Error> {
        let header = parse_header(raw_header)?;
        let block_hash = header.block_hash();

        if self.entries.contains_key(&block_hash) {
            return Err(Error::DuplicateHeader(block_hash));
        }

        let parent_hash = header.prev_blockhash();
        let parent = self
            .entries
            .get(&parent_hash)
            .filter(|parent| parent.is_accepted())
            .ok_or(Error::UnknownParent(parent_hash))?;

        let height = parent.height + 1;

        self.check_merged_mining(&header, block_hash, height)?;
        self.check_difficulty(&header, parent)?;
        self.check_median_time_past(&header, parent)?;

        let target = Target::from_bits(header.bits());
        if !target.is_met_by(&claimed_pow_hash) {
            return Err(Error::InsufficientWork {
                block_hash,
                pow_hash: claimed_pow_hash,
            });
        }

        let chain_work = &parent.chain_work + &target.work();

        let entry = ChainEntry {
            header,
            hash: block_hash,
            height,
            chain_work,
            status: HeaderStatus::PendingPoW,
            claimed_pow_hash,
            accepted_order: None,
            finalized: false,
        };

        tracing::debug!("Header {entry} submitted, awaiting proof-of-work verification");

        self.scrypt_requests.push_back(ScryptRequest {
            block_hash,
            pow_header: entry.header.pow_header_bytes(),
            claimed_hash: claimed_pow_hash,
        });
        self.children.entry(parent_hash).or_default().push(block_hash);
        self.entries.insert(block_hash, entry);

        Ok(block_hash)
    }

    /// Applies the scrypt checker's verdict on `block_hash`.
    ///
    /// `Verified` accepts a pending header. `Invalid` drops a pending header, or rejects an
    /// accepted header that is not final together with every header built on it.
    pub fn resolve_pow(&mut self, caller: AccountId, block_hash: BlockHash, verdict: PowVerdict) -> Result<(), Error> {
        if caller != self.scrypt_checker {
            return Err(Error::Unauthorized(caller));
        }

        let entry = self
            .entries
            .get(&block_hash)
            .ok_or(Error::UnknownHeader(block_hash))?;

        match verdict {
            PowVerdict::Verified => {
                if entry.status != HeaderStatus::PendingPoW {
                    return Err(Error::NotPending(block_hash));
                }
                if !Target::from_bits(entry.header.bits()).is_met_by(&entry.claimed_pow_hash) {
                    return Err(Error::InsufficientWork {
                        block_hash,
                        pow_hash: entry.claimed_pow_hash,
                    });
                }
                self.accept(block_hash);
            }
            PowVerdict::Invalid => match entry.status {
                HeaderStatus::Rejected => return Err(Error::AlreadyRejected(block_hash)),
                HeaderStatus::PendingPoW => self.drop_pending(block_hash),
                HeaderStatus::Accepted => {
                    if entry.finalized {
                        return Err(Error::AlreadyFinal(block_hash));
                    }
                    self.reject_with_descendants(block_hash);
                }
            },
        }

        Ok(())
    }

    /// Settles every queued scrypt request with `verifier`, reporting as `caller`.
    ///
    /// Returns the number of verdicts applied.
    pub fn run_scrypt_checks(&mut self, caller: AccountId, verifier: &impl ScryptVerifier) -> Result<usize, Error> {
        if caller != self.scrypt_checker {
            return Err(Error::Unauthorized(caller));
        }

        let mut resolved = 0;
        for request in self.take_scrypt_requests() {
            if self.status(&request.block_hash) != Some(HeaderStatus::PendingPoW) {
                continue;
            }
            let verdict = verifier.verify(&request);
            match self.resolve_pow(caller, request.block_hash, verdict) {
                Ok(()) => resolved += 1,
                Err(err) => {
                    tracing::warn!(block_hash = ?request.block_hash, ?verdict, "Failed to apply scrypt verdict: {err}");
                }
            }
        }

        Ok(resolved)
    }

    /// Checks that `proof.tx` is included in the block `proof.block_hash`.
    ///
    /// The block must be on the best chain with at least the minimum confirmations. A proof
    /// that does not lead to the block's Merkle root yields `Ok(false)`.
    pub fn verify_inclusion(&self, proof: &SpvProof) -> Result<bool, Error> {
        let leaf = proof.leaf()?;

        let entry = self
            .entries
            .get(&proof.block_hash)
            .ok_or(Error::UnknownHeader(proof.block_hash))?;

        let confirmations = self.confirmations(&proof.block_hash);
        if confirmations < self.min_confirmations {
            return Err(Error::InsufficientConfirmations {
                block_hash: proof.block_hash,
                confirmations,
                required: self.min_confirmations,
            });
        }

        let merkle_root = entry.header.header.merkle_root.to_byte_array();
        let included = verify_merkle_proof(&leaf, &proof.siblings, proof.tx_index, &merkle_root);

        if !included {
            tracing::debug!(
                block_hash = ?proof.block_hash,
                tx_index = proof.tx_index,
                "Merkle proof does not match the block"
            );
        }

        Ok(included)
    }

    fn check_merged_mining(&self, header: &DogeHeader, block_hash: BlockHash, height: u32) -> Result<(), Error> {
        if !header.is_legacy()
            && self.params.strict_chain_id
            && header.chain_id() != self.params.auxpow_chain_id
        {
            return Err(Error::WrongChainId {
                got: header.chain_id(),
                expected: self.params.auxpow_chain_id,
            });
        }

        if let Some(auxpow) = &header.auxpow {
            if height < self.params.auxpow_start_height {
                return Err(Error::AuxPowNotAllowed(height));
            }
            auxpow.check(block_hash, header.chain_id(), self.params.strict_chain_id)?;
        }

        Ok(())
    }

    fn check_difficulty(&self, header: &DogeHeader, parent: &ChainEntry) -> Result<(), Error> {
        let bits = header.bits();
        let pow_limit = self.params.pow_limit_bits;

        if Target::from_bits(bits) > Target::from_bits(pow_limit) {
            return Err(Error::TargetAbovePowLimit {
                got: bits,
                pow_limit,
            });
        }

        let expected = match retarget_lookback(&self.params, parent.height) {
            None => parent.header.bits(),
            Some(lookback) => match self.ancestor(parent, lookback) {
                Some(first) => calculate_next_work_required(
                    &self.params,
                    parent.height,
                    parent.header.bits(),
                    i64::from(parent.header.time()) - i64::from(first.header.time()),
                ),
                None => {
                    tracing::trace!(
                        "Retarget window of #{} reaches behind the checkpoint, only the pow limit applies",
                        parent.height + 1
                    );
                    return Ok(());
                }
            },
        };

        if bits != expected {
            return Err(Error::BadDifficultyTransition {
                height: parent.height + 1,
                got: bits,
                expected,
            });
        }

        Ok(())
    }

    fn check_median_time_past(&self, header: &DogeHeader, parent: &ChainEntry) -> Result<(), Error> {
        let mut timestamps = Vec::with_capacity(MEDIAN_TIME_SPAN);
        let mut cursor = Some(parent);

        while let Some(entry) = cursor {
            if timestamps.len() == MEDIAN_TIME_SPAN {
                break;
            }
            timestamps.push(entry.header.time());
            cursor = self.entries.get(&entry.parent_hash());
        }

        timestamps.sort_unstable();

        let median = timestamps[timestamps.len() / 2];

        if header.time() <= median {
            return Err(Error::TimeTooOld {
                time: header.time(),
                median,
            });
        }

        Ok(())
    }

    /// Walks `depth` parents back from `entry`, `None` past the genesis checkpoint.
    fn ancestor<'a>(&'a self, entry: &'a ChainEntry, depth: u32) -> Option<&'a ChainEntry> {
        let mut cursor = entry;
        for _ in 0..depth {
            cursor = self.entries.get(&cursor.parent_hash())?;
        }
        Some(cursor)
    }

    fn accept(&mut self, block_hash: BlockHash) {
        let order = self.next_accepted_order;
        self.next_accepted_order += 1;

        let entry = self
            .entries
            .get_mut(&block_hash)
            .expect("Entry exists as checked by the caller; qed");
        entry.status = HeaderStatus::Accepted;
        entry.accepted_order = Some(order);

        tracing::debug!("Header {entry} accepted, chain work {}", entry.chain_work);

        let chain_work = entry.chain_work.clone();
        if chain_work > self.best_tip().chain_work {
            self.set_best_tip(block_hash);
        }
    }

    /// Forgets a pending header. Pending headers have no descendants.
    fn drop_pending(&mut self, block_hash: BlockHash) {
        let entry = self
            .entries
            .remove(&block_hash)
            .expect("Entry exists as checked by the caller; qed");

        if let Some(siblings) = self.children.get_mut(&entry.parent_hash()) {
            siblings.retain(|child| *child != block_hash);
        }
        self.scrypt_requests
            .retain(|request| request.block_hash != block_hash);

        tracing::info!(
            claimed_pow_hash = %entry.claimed_pow_hash,
            "Header {entry} dropped, claimed proof-of-work is invalid"
        );
    }

    fn reject_with_descendants(&mut self, block_hash: BlockHash) {
        let mut queue = VecDeque::from([block_hash]);
        let mut best_chain_hit = false;

        while let Some(hash) = queue.pop_front() {
            let Some(entry) = self.entries.get_mut(&hash) else {
                continue;
            };
            if entry.status == HeaderStatus::Rejected {
                continue;
            }
            entry.status = HeaderStatus::Rejected;

            let height = entry.height;
            tracing::info!("Header #{height},{hash} rejected");

            best_chain_hit |= self.best_hash_at(height) == Some(hash);

            if let Some(children) = self.children.get(&hash) {
                queue.extend(children.iter().copied());
            }
        }

        if best_chain_hit {
            let new_tip = self
                .entries
                .values()
                .filter(|entry| entry.is_accepted())
                .max_by(|a, b| {
                    a.chain_work
                        .cmp(&b.chain_work)
                        .then_with(|| b.accepted_order.cmp(&a.accepted_order))
                })
                .map(|entry| entry.hash)
                .expect("Genesis checkpoint is final and stays accepted; qed");
            self.set_best_tip(new_tip);
        }
    }

    /// Rewires the best chain index to end at `new_tip`.
    fn set_best_tip(&mut self, new_tip: BlockHash) {
        let old_tip = *self
            .best_chain
            .last()
            .expect("Best chain always contains the genesis checkpoint; qed");

        let mut path = Vec::new();
        let mut cursor = new_tip;

        let fork_index = loop {
            let entry = &self.entries[&cursor];
            let index = (entry.height - self.genesis_height) as usize;
            if self.best_chain.get(index) == Some(&cursor) {
                break index;
            }
            path.push(cursor);
            cursor = entry.parent_hash();
        };

        let disconnected = self.best_chain.len() - fork_index - 1;
        self.best_chain.truncate(fork_index + 1);
        self.best_chain.extend(path.into_iter().rev());

        let tip = self.best_tip();
        if disconnected > 0 {
            tracing::info!(
                "Best chain reorganised from {old_tip} to {tip}, {disconnected} headers disconnected"
            );
        } else {
            tracing::info!("New best tip {tip}");
        }

        self.update_finality();
    }

    /// Marks best chain headers with enough confirmations as final.
    fn update_finality(&mut self) {
        let Some(final_height) = self.best_height().checked_sub(self.min_confirmations) else {
            return;
        };
        let Some(mut index) = final_height
            .checked_sub(self.genesis_height)
            .map(|index| index as usize)
        else {
            return;
        };

        loop {
            let entry = self
                .entries
                .get_mut(&self.best_chain[index])
                .expect("Best chain headers are stored; qed");
            if entry.finalized {
                break;
            }
            entry.finalized = true;
            tracing::debug!("Header {entry} is final");
            if index == 0 {
                break;
            }
            index -= 1;
        }
    }
}
