use crate::competition::Proposer;
use crate::config::LedgerConfig;
use crate::constants::MAX_CANDIDATES;
use crate::error::Result;
use crate::{Block, Ledger, Transaction};
use std::sync::Arc;

/// A participant that mines its own candidates against a shared ledger.
#[derive(Clone, Debug)]
pub struct Miner {
    id: usize,
    ledger: Arc<Ledger>,
    max_candidates: usize,
    max_attempts: Option<u64>,
}

impl Miner {
    pub fn new(id: usize, ledger: Arc<Ledger>) -> Self {
        Self {
            id,
            ledger,
            max_candidates: MAX_CANDIDATES,
            max_attempts: None,
        }
    }

    pub fn from_config(id: usize, ledger: Arc<Ledger>, config: &LedgerConfig) -> Self {
        Self::new(id, ledger)
            .with_max_candidates(config.max_candidates)
            .with_max_attempts(config.max_attempts)
    }

    pub fn with_max_candidates(mut self, max_candidates: usize) -> Self {
        self.max_candidates = max_candidates.max(1);
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: Option<u64>) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn ledger(&self) -> &Arc<Ledger> {
        &self.ledger
    }

    /// The oldest `min(max_candidates, pool size)` pending transactions.
    pub fn select_candidates(&self) -> Vec<Transaction> {
        self.ledger.pool_head(self.max_candidates)
    }

    pub fn build_block(&self, transactions: Vec<Transaction>) -> Block {
        self.ledger.propose_candidate(transactions)
    }

    pub fn mine(&self, block: &Block) -> u64 {
        self.ledger.mine(block)
    }
}

impl Proposer for Miner {
    fn id(&self) -> usize {
        self.id
    }

    fn select_candidates(&self) -> Vec<Transaction> {
        Miner::select_candidates(self)
    }

    fn build_block(&self, transactions: Vec<Transaction>) -> Block {
        Miner::build_block(self, transactions)
    }

    fn find_nonce(&self, block: &Block) -> Result<u64> {
        match self.max_attempts {
            Some(cap) => self.ledger.try_mine(block, cap),
            None => Ok(self.mine(block)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::CounterClock;

    fn shared_ledger(difficulty: usize) -> Arc<Ledger> {
        Arc::new(
            Ledger::with_clock(
                &LedgerConfig::with_difficulty(difficulty),
                Arc::new(CounterClock::new(1)),
            )
            .unwrap(),
        )
    }

    #[test]
    fn selects_at_most_five_in_pool_order() {
        let ledger = shared_ledger(1);
        let txs: Vec<_> = (0..7).map(|i| ledger.submit("a", "b", i as f64)).collect();
        let miner = Miner::new(0, ledger.clone());
        assert_eq!(miner.select_candidates(), txs[..5].to_vec());
    }

    #[test]
    fn selects_whole_pool_when_small() {
        let ledger = shared_ledger(1);
        let txs: Vec<_> = (0..3).map(|i| ledger.submit("a", "b", i as f64)).collect();
        assert_eq!(Miner::new(0, ledger).select_candidates(), txs);
    }

    #[test]
    fn selects_nothing_from_empty_pool() {
        let miner = Miner::new(0, shared_ledger(1));
        assert!(miner.select_candidates().is_empty());
    }

    #[test]
    fn max_candidates_is_configurable() {
        let ledger = shared_ledger(1);
        for i in 0..4 {
            ledger.submit("a", "b", i as f64);
        }
        let config = LedgerConfig {
            max_candidates: 2,
            ..LedgerConfig::default()
        };
        let miner = Miner::from_config(0, ledger, &config);
        assert_eq!(miner.select_candidates().len(), 2);
    }

    #[test]
    fn selection_is_read_only() {
        let ledger = shared_ledger(1);
        ledger.submit("a", "b", 1.0);
        let miner = Miner::new(0, ledger.clone());
        let _ = miner.select_candidates();
        assert_eq!(ledger.pool_len(), 1);
    }

    #[test]
    fn builds_and_mines_through_ledger() {
        let ledger = shared_ledger(2);
        ledger.submit("a", "b", 1.0);
        let miner = Miner::new(3, ledger.clone());
        let block = miner.build_block(miner.select_candidates());
        let nonce = miner.mine(&block);
        assert!(ledger.verify(&block, nonce));
        assert_eq!(Proposer::find_nonce(&miner, &block).unwrap(), nonce);
        assert_eq!(Proposer::id(&miner), 3);
    }

    #[test]
    fn capped_search_can_fail() {
        let ledger = shared_ledger(6);
        ledger.submit("a", "b", 1.0);
        let miner = Miner::new(0, ledger).with_max_attempts(Some(1));
        let block = miner.build_block(miner.select_candidates());
        let outcome = miner.find_nonce(&block);
        // One attempt at difficulty 6 succeeds with probability 16^-6.
        assert!(outcome.is_err() || miner.ledger().verify(&block, 0));
    }
}
