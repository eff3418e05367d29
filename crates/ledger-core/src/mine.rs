//! Nonce search over a candidate block.
//!
//! All searches hash `mining_string ∥ nonce` and accept the first hash whose
//! leading `difficulty` hex digits are zero. The mining string is built once
//! per search and only the nonce varies per attempt.

use crate::error::{LedgerError, Result};
use crate::{pow::meets_difficulty, sha256_hex, Block};
use rayon::prelude::*;
use tracing::debug;

/// Sequential search starting at nonce 0. Returns the smallest valid nonce.
pub fn mine_sequential(block: &Block, difficulty: usize) -> u64 {
    let base = block.mining_string();
    let mut nonce = 0u64;
    loop {
        if meets_difficulty(&sha256_hex(format!("{base}{nonce}")), difficulty) {
            debug!(nonce, difficulty, "nonce found");
            return nonce;
        }
        nonce = nonce.wrapping_add(1);
    }
}

/// Sequential search over nonces `0..max_attempts`.
pub fn mine_bounded(block: &Block, difficulty: usize, max_attempts: u64) -> Result<u64> {
    let base = block.mining_string();
    (0..max_attempts)
        .find(|nonce| meets_difficulty(&sha256_hex(format!("{base}{nonce}")), difficulty))
        .ok_or(LedgerError::AttemptsExhausted {
            attempts: max_attempts,
        })
}

/// Parallel search over the whole nonce space. Rayon splits the range
/// across threads, so the nonce returned is valid but not necessarily the
/// smallest.
pub fn mine_parallel(block: &Block, difficulty: usize) -> u64 {
    let base = block.mining_string();
    let found = (0u64..u64::MAX)
        .into_par_iter()
        .find_any(|nonce| meets_difficulty(&sha256_hex(format!("{base}{nonce}")), difficulty));
    // `find_any` over the full u64 range only comes back empty if every
    // nonce fails, which only happens for difficulties above the hash length.
    match found {
        Some(nonce) => {
            debug!(nonce, difficulty, "nonce found (parallel)");
            nonce
        }
        None => mine_sequential(block, difficulty),
    }
}
