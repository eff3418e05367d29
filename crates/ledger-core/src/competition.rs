//! Concurrent mining rounds.
//!
//! Every proposer of a round mines on its own thread against the same
//! ledger. Verified proposals race for a single round-scoped winner slot;
//! the slot's lock covers the flag check, the flag set, and the whole
//! `Ledger::commit` call, so at most one block is committed per round.
//! Searches are never cancelled: losers finish mining and then find the slot
//! taken.

use crate::config::LedgerConfig;
use crate::error::Result;
use crate::{Block, Ledger, Transaction};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Barrier, Mutex, PoisonError};
use std::thread;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// What the coordinator needs from a round participant.
pub trait Proposer: Sync {
    fn id(&self) -> usize;
    fn select_candidates(&self) -> Vec<Transaction>;
    fn build_block(&self, transactions: Vec<Transaction>) -> Block;
    fn find_nonce(&self, block: &Block) -> Result<u64>;
}

impl<P: Proposer + ?Sized> Proposer for Box<P> {
    fn id(&self) -> usize {
        (**self).id()
    }

    fn select_candidates(&self) -> Vec<Transaction> {
        (**self).select_candidates()
    }

    fn build_block(&self, transactions: Vec<Transaction>) -> Block {
        (**self).build_block(transactions)
    }

    fn find_nonce(&self, block: &Block) -> Result<u64> {
        (**self).find_nonce(block)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum RoundPhase {
    Idle,
    Racing,
    Resolved,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WorkerOutcome {
    /// Claimed the round and committed its block.
    Winner { hash: String },
    /// Produced a valid proof after the round was already claimed.
    Loser,
    /// Proposed a nonce that failed verification.
    Cheater,
    /// Gave up after its attempt cap.
    Exhausted,
    /// The worker thread panicked.
    Aborted,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WorkerReport {
    pub miner: usize,
    pub nonce: Option<u64>,
    pub outcome: WorkerOutcome,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RoundReport {
    pub round: u64,
    pub winner: Option<usize>,
    pub block_hash: Option<String>,
    pub outcomes: Vec<WorkerReport>,
}

impl RoundReport {
    pub fn winners(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|r| matches!(r.outcome, WorkerOutcome::Winner { .. }))
            .count()
    }

    pub fn outcome_of(&self, miner: usize) -> Option<&WorkerOutcome> {
        self.outcomes.iter().find(|r| r.miner == miner).map(|r| &r.outcome)
    }
}

/// Single-winner slot for one round. A fresh slot is created per round.
#[derive(Debug, Default)]
struct WinnerSlot {
    claimed: Mutex<bool>,
}

impl WinnerSlot {
    fn claim_and_commit(&self, miner: usize, ledger: &Ledger, block: Block, nonce: u64) -> WorkerOutcome {
        let mut claimed = self.claimed.lock().unwrap_or_else(PoisonError::into_inner);
        if *claimed {
            return WorkerOutcome::Loser;
        }
        *claimed = true;
        let hash = block.hash_with(nonce);
        if ledger.commit(block, nonce) {
            WorkerOutcome::Winner { hash }
        } else {
            error!(miner, nonce, "verified block rejected at commit");
            WorkerOutcome::Cheater
        }
    }
}

/// Runs mining rounds and keeps the round counter.
#[derive(Debug)]
pub struct Competition {
    start_delay: Option<Duration>,
    rounds: AtomicU64,
    phase: Mutex<RoundPhase>,
}

impl Default for Competition {
    fn default() -> Self {
        Self::new(&LedgerConfig::default())
    }
}

impl Competition {
    pub fn new(config: &LedgerConfig) -> Self {
        Self {
            start_delay: config.start_delay(),
            rounds: AtomicU64::new(0),
            phase: Mutex::new(RoundPhase::Idle),
        }
    }

    pub fn phase(&self) -> RoundPhase {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn rounds_run(&self) -> u64 {
        self.rounds.load(Ordering::SeqCst)
    }

    fn enter(&self, round: u64, phase: RoundPhase) {
        debug!(round, ?phase, "round phase");
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner) = phase;
    }

    /// Race every proposer once and commit at most one block.
    pub fn run_round<P: Proposer>(&self, proposers: &[P], ledger: &Ledger) -> RoundReport {
        let round = self.rounds.fetch_add(1, Ordering::SeqCst) + 1;
        self.enter(round, RoundPhase::Idle);

        let slot = WinnerSlot::default();
        let start = Barrier::new(proposers.len());
        self.enter(round, RoundPhase::Racing);

        let outcomes: Vec<WorkerReport> = thread::scope(|s| {
            let handles: Vec<_> = proposers
                .iter()
                .map(|p| {
                    let (slot, start) = (&slot, &start);
                    (p.id(), s.spawn(move || self.race(p, ledger, start, slot)))
                })
                .collect();
            handles
                .into_iter()
                .map(|(miner, handle)| {
                    handle.join().unwrap_or_else(|_| {
                        error!(miner, "mining worker panicked");
                        WorkerReport {
                            miner,
                            nonce: None,
                            outcome: WorkerOutcome::Aborted,
                        }
                    })
                })
                .collect()
        });

        self.enter(round, RoundPhase::Resolved);

        let (winner, block_hash) = outcomes
            .iter()
            .find_map(|r| match &r.outcome {
                WorkerOutcome::Winner { hash } => Some((Some(r.miner), Some(hash.clone()))),
                _ => None,
            })
            .unwrap_or((None, None));

        match winner {
            Some(miner) => info!(round, miner, height = ledger.height(), "round won"),
            None => warn!(round, "round ended without a committed block"),
        }

        RoundReport {
            round,
            winner,
            block_hash,
            outcomes,
        }
    }

    pub fn run_rounds<P: Proposer>(&self, proposers: &[P], ledger: &Ledger, rounds: usize) -> Vec<RoundReport> {
        (0..rounds).map(|_| self.run_round(proposers, ledger)).collect()
    }

    fn race<P: Proposer>(&self, proposer: &P, ledger: &Ledger, start: &Barrier, slot: &WinnerSlot) -> WorkerReport {
        let miner = proposer.id();
        start.wait();
        if let Some(delay) = self.start_delay {
            thread::sleep(delay);
        }

        let transactions = proposer.select_candidates();
        let block = proposer.build_block(transactions);
        debug!(miner, txs = block.transactions.len(), "mining candidate");

        let nonce = match proposer.find_nonce(&block) {
            Ok(nonce) => nonce,
            Err(err) => {
                warn!(miner, %err, "nonce search gave up");
                return WorkerReport {
                    miner,
                    nonce: None,
                    outcome: WorkerOutcome::Exhausted,
                };
            }
        };

        let outcome = if ledger.verify(&block, nonce) {
            slot.claim_and_commit(miner, ledger, block, nonce)
        } else {
            warn!(miner, nonce, "proposal failed verification");
            WorkerOutcome::Cheater
        };
        debug!(miner, nonce, ?outcome, "worker finished");

        WorkerReport {
            miner,
            nonce: Some(nonce),
            outcome,
        }
    }
}
