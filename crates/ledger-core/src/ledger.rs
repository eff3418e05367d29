use crate::clock::{Clock, SystemClock};
use crate::config::LedgerConfig;
use crate::error::{LedgerError, Result};
use crate::{mine, pow::meets_difficulty, Block, Transaction};
use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

#[derive(Debug, Default)]
struct LedgerState {
    chain: Vec<Block>,
    pool: Vec<Transaction>,
}

/// Append-only chain of committed blocks plus the pool of pending transfers.
///
/// A `Ledger` is meant to be shared (usually behind an `Arc`) by every miner
/// of a simulation. `commit` is the only operation that mutates it; reads
/// return owned snapshots.
#[derive(Debug)]
pub struct Ledger {
    difficulty: usize,
    clock: Arc<dyn Clock>,
    state: RwLock<LedgerState>,
}

impl Ledger {
    pub fn new(config: &LedgerConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: &LedgerConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            difficulty: config.difficulty,
            clock,
            state: RwLock::new(LedgerState::default()),
        })
    }

    fn read(&self) -> RwLockReadGuard<'_, LedgerState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, LedgerState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn difficulty(&self) -> usize {
        self.difficulty
    }

    /// Queue a transfer. Duplicates are not detected.
    pub fn submit(&self, sender: impl Into<String>, recipient: impl Into<String>, value: f64) -> Transaction {
        let tx = Transaction::new(sender, recipient, value, self.clock.now());
        debug!(id = %tx.id(), "transaction submitted");
        self.write().pool.push(tx.clone());
        tx
    }

    /// Unmined block on top of the current tip.
    pub fn propose_candidate(&self, transactions: Vec<Transaction>) -> Block {
        let state = self.read();
        Block::candidate(transactions, state.chain.last())
    }

    pub fn mine(&self, block: &Block) -> u64 {
        mine::mine_sequential(block, self.difficulty)
    }

    pub fn try_mine(&self, block: &Block, max_attempts: u64) -> Result<u64> {
        mine::mine_bounded(block, self.difficulty, max_attempts)
    }

    pub fn mine_parallel(&self, block: &Block) -> u64 {
        mine::mine_parallel(block, self.difficulty)
    }

    pub fn verify(&self, block: &Block, nonce: u64) -> bool {
        meets_difficulty(&block.hash_with(nonce), self.difficulty)
    }

    /// Admit a mined block.
    ///
    /// Returns `false` without touching the ledger when `nonce` does not
    /// satisfy the difficulty. Otherwise drops the block's transactions from
    /// the pool, seals the block, and appends it, all under one write lock.
    pub fn commit(&self, mut block: Block, nonce: u64) -> bool {
        if !self.verify(&block, nonce) {
            warn!(nonce, difficulty = self.difficulty, "rejected block with invalid nonce");
            return false;
        }

        let mut state = self.write();
        let included: HashSet<&str> = block.transactions.iter().map(Transaction::id).collect();
        let pool: Vec<Transaction> = state
            .pool
            .iter()
            .filter(|tx| !included.contains(tx.id()))
            .cloned()
            .collect();

        let tip = state.chain.last().and_then(|b| b.current_hash.as_deref()).unwrap_or_default();
        if block.previous_hash != tip {
            warn!(
                previous_hash = %block.previous_hash,
                tip = %tip,
                "committing block built on a stale tip"
            );
        }

        block.seal(nonce, self.clock.now());
        info!(
            height = state.chain.len(),
            nonce,
            hash = block.current_hash.as_deref().unwrap_or_default(),
            txs = block.transactions.len(),
            "block committed"
        );
        state.chain.push(block);
        state.pool = pool;
        true
    }

    pub fn chain(&self) -> Vec<Block> {
        self.read().chain.clone()
    }

    pub fn pool(&self) -> Vec<Transaction> {
        self.read().pool.clone()
    }

    /// First `limit` pool entries in submission order.
    pub fn pool_head(&self, limit: usize) -> Vec<Transaction> {
        self.read().pool.iter().take(limit).cloned().collect()
    }

    pub fn height(&self) -> usize {
        self.read().chain.len()
    }

    pub fn pool_len(&self) -> usize {
        self.read().pool.len()
    }

    pub fn tip_hash(&self) -> Option<String> {
        self.read().chain.last().and_then(|b| b.current_hash.clone())
    }

    pub fn block(&self, index: usize) -> Option<Block> {
        self.read().chain.get(index).cloned()
    }

    /// The block before `index`, if any.
    pub fn predecessor(&self, index: usize) -> Option<Block> {
        index.checked_sub(1).and_then(|i| self.block(i))
    }

    pub fn verify_chain(&self) -> Result<()> {
        verify_blocks(&self.read().chain, self.difficulty)
    }
}

/// Re-walk `blocks`, recomputing every hash from content and checking links.
pub fn verify_blocks(blocks: &[Block], difficulty: usize) -> Result<()> {
    for (index, block) in blocks.iter().enumerate() {
        let (Some(nonce), Some(stored)) = (block.nonce, block.current_hash.as_ref()) else {
            return Err(LedgerError::Uncommitted { index });
        };
        let computed = block.hash_with(nonce);
        if &computed != stored {
            return Err(LedgerError::HashMismatch {
                index,
                stored: stored.clone(),
                computed,
            });
        }
        if !meets_difficulty(stored, difficulty) {
            return Err(LedgerError::InsufficientWork { index, difficulty });
        }
        let expected_previous = match index {
            0 => "",
            i => blocks[i - 1].current_hash.as_deref().unwrap_or_default(),
        };
        if block.previous_hash != expected_previous {
            return Err(LedgerError::BrokenLink { index });
        }
    }
    Ok(())
}
