//! Proof-of-work ledger with competing miners.
//!
//! Transfers are queued in a shared [`Ledger`] pool. Each round of a
//! [`Competition`] lets several [`Miner`]s race to find a nonce for their own
//! candidate [`Block`]; the first verified proposal is committed and the rest
//! are discarded.

pub mod block;
pub mod clock;
pub mod competition;
pub mod config;
pub mod constants;
pub mod error;
pub mod ledger;
pub mod mine;
pub mod miner;
pub mod transaction;

pub use block::Block;
pub use clock::{Clock, CounterClock, SystemClock};
pub use competition::{Competition, Proposer, RoundPhase, RoundReport, WorkerOutcome, WorkerReport};
pub use config::LedgerConfig;
pub use error::{LedgerError, Result};
pub use ledger::{verify_blocks, Ledger};
pub use miner::Miner;
pub use transaction::Transaction;

use sha2::{Digest, Sha256};

/// SHA-256 of `bytes` as lowercase hex.
pub fn sha256_hex(bytes: impl AsRef<[u8]>) -> String {
    hex::encode(Sha256::digest(bytes.as_ref()))
}

pub mod pow {
    /// True when the first `difficulty` hex digits of `hash` are all `'0'`.
    pub fn meets_difficulty(hash: &str, difficulty: usize) -> bool {
        hash.len() >= difficulty && hash.bytes().take(difficulty).all(|b| b == b'0')
    }

    pub fn leading_zero_digits(hash: &str) -> usize {
        hash.bytes().take_while(|b| *b == b'0').count()
    }
}
