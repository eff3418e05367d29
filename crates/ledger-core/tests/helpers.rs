use ledger_core::{CounterClock, Ledger, LedgerConfig, Miner, Transaction};
use std::sync::Arc;

pub fn deterministic_ledger(difficulty: usize) -> Arc<Ledger> {
    Arc::new(
        Ledger::with_clock(
            &LedgerConfig::with_difficulty(difficulty),
            Arc::new(CounterClock::new(1_600_000_000)),
        )
        .expect("valid config"),
    )
}

pub fn submit_named(ledger: &Ledger, names: &[&str]) -> Vec<Transaction> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| ledger.submit(*name, "exchange", (i + 1) as f64 * 10.0))
        .collect()
}

pub fn miners(ledger: &Arc<Ledger>, n: usize) -> Vec<Miner> {
    (0..n).map(|id| Miner::new(id, ledger.clone())).collect()
}
