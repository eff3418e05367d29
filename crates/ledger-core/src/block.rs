use crate::{sha256_hex, Transaction};
use serde::{Deserialize, Serialize};

/// An ordered bundle of transactions linked to its predecessor by hash.
///
/// A block starts as a candidate with no nonce, timestamp, or hash. Those are
/// filled in once, when the ledger commits it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub previous_hash: String,
    pub transactions: Vec<Transaction>,
    pub nonce: Option<u64>,
    pub timestamp: Option<u64>,
    pub current_hash: Option<String>,
}

impl Block {
    /// Candidate on top of `predecessor`, or a genesis candidate when there is none.
    pub fn candidate(transactions: Vec<Transaction>, predecessor: Option<&Block>) -> Self {
        let previous_hash = predecessor
            .and_then(|p| p.current_hash.clone())
            .unwrap_or_default();
        Self {
            previous_hash,
            transactions,
            nonce: None,
            timestamp: None,
            current_hash: None,
        }
    }

    /// `previous_hash` followed by every transaction id in order.
    pub fn mining_string(&self) -> String {
        let mut s = String::with_capacity(self.previous_hash.len() + 64 * self.transactions.len());
        s.push_str(&self.previous_hash);
        for tx in &self.transactions {
            s.push_str(tx.id());
        }
        s
    }

    pub fn hash_with(&self, nonce: u64) -> String {
        sha256_hex(format!("{}{nonce}", self.mining_string()))
    }

    pub fn is_committed(&self) -> bool {
        self.current_hash.is_some()
    }

    pub fn contains(&self, tx_id: &str) -> bool {
        self.transactions.iter().any(|tx| tx.id() == tx_id)
    }

    pub(crate) fn seal(&mut self, nonce: u64, timestamp: u64) {
        self.current_hash = Some(self.hash_with(nonce));
        self.nonce = Some(nonce);
        self.timestamp = Some(timestamp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn txs() -> Vec<Transaction> {
        vec![
            Transaction::new("Alice", "Bob", 10.0, 1_600_000_000),
            Transaction::new("Bob", "Charlie", 5.0, 1_600_000_100),
        ]
    }

    #[test]
    fn genesis_candidate_has_empty_previous_hash() {
        let block = Block::candidate(txs(), None);
        assert_eq!(block.previous_hash, "");
        assert_eq!(block.nonce, None);
        assert_eq!(block.timestamp, None);
        assert_eq!(block.current_hash, None);
        assert!(!block.is_committed());
    }

    #[test]
    fn candidate_links_to_predecessor_hash() {
        let mut genesis = Block::candidate(txs(), None);
        genesis.seal(3, 42);
        let next = Block::candidate(vec![], Some(&genesis));
        assert_eq!(Some(next.previous_hash), genesis.current_hash);
    }

    #[test]
    fn mining_string_concatenates_previous_hash_and_ids() {
        let txs = txs();
        let mut block = Block::candidate(txs.clone(), None);
        block.previous_hash = "abc".into();
        let expected = format!("abc{}{}", txs[0].id(), txs[1].id());
        assert_eq!(block.mining_string(), expected);
    }

    #[test]
    fn mining_string_ignores_commit_fields() {
        let mut block = Block::candidate(txs(), None);
        let before = block.mining_string();
        block.seal(99, 1234);
        assert_eq!(block.mining_string(), before);
    }

    #[test]
    fn hash_with_appends_nonce() {
        let block = Block::candidate(txs(), None);
        assert_eq!(block.hash_with(7), sha256_hex(format!("{}7", block.mining_string())));
        assert_ne!(block.hash_with(7), block.hash_with(8));
    }

    #[test]
    fn seal_sets_commit_fields() {
        let mut block = Block::candidate(txs(), None);
        block.seal(5, 77);
        assert_eq!(block.nonce, Some(5));
        assert_eq!(block.timestamp, Some(77));
        assert_eq!(block.current_hash, Some(block.hash_with(5)));
        assert!(block.is_committed());
    }

    #[test]
    fn contains_matches_by_id() {
        let txs = txs();
        let block = Block::candidate(vec![txs[0].clone()], None);
        assert!(block.contains(txs[0].id()));
        assert!(!block.contains(txs[1].id()));
    }
}
