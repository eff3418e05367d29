use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use ledger_core::{verify_blocks, Competition, Ledger, LedgerConfig, Miner, Transaction};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::Serialize;
use std::{fs, path::PathBuf, sync::Arc};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

const NAMES: &[&str] = &["alice", "bob", "carol", "dave", "erin", "frank", "grace", "heidi"];

#[derive(Parser, Debug)]
#[command(name = "ledger-cli")]
#[command(about = "Proof-of-work ledger simulation with competing miners")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Submit random transfers and race miners for a number of rounds
    Race {
        /// Number of competing miners
        #[arg(long, default_value_t = 3)]
        miners: usize,
        /// Rounds to run
        #[arg(long, default_value_t = 1)]
        rounds: usize,
        /// Transfers to submit before racing
        #[arg(long, default_value_t = 6)]
        transfers: usize,
        /// Seed for the generated transfers
        #[arg(long, default_value_t = 42)]
        seed: u64,
        #[command(flatten)]
        settings: Settings,
    },
    /// Mine a short chain, alter a historical block, and show the chain check catching it
    Tamper {
        /// Blocks to mine before tampering
        #[arg(long, default_value_t = 4)]
        blocks: usize,
        #[command(flatten)]
        settings: Settings,
    },
}

#[derive(Args, Debug)]
struct Settings {
    /// JSON config file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,
    /// Leading zero hex digits required of a block hash
    #[arg(long)]
    difficulty: Option<usize>,
    /// Transactions per block
    #[arg(long)]
    max_candidates: Option<usize>,
    /// Cap on nonce attempts per miner
    #[arg(long)]
    max_attempts: Option<u64>,
    /// Delay before miners start, in milliseconds
    #[arg(long)]
    start_delay_ms: Option<u64>,
}

impl Settings {
    fn load(&self) -> Result<LedgerConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let raw = fs::read_to_string(path)
                    .with_context(|| format!("reading config {}", path.display()))?;
                LedgerConfig::from_json(&raw)?
            }
            None => LedgerConfig::default(),
        };
        if let Some(difficulty) = self.difficulty {
            config.difficulty = difficulty;
        }
        if let Some(max_candidates) = self.max_candidates {
            config.max_candidates = max_candidates;
        }
        if self.max_attempts.is_some() {
            config.max_attempts = self.max_attempts;
        }
        if let Some(delay) = self.start_delay_ms {
            config.start_delay_ms = delay;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Pretty JSON on stdout. Rendering failures are logged, not fatal.
fn print_json<T: Serialize>(label: &str, value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{label}:\n{json}"),
        Err(err) => error!(%err, label, "failed to render"),
    }
}

fn submit_random(ledger: &Ledger, count: usize, seed: u64) -> Vec<Transaction> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let from = NAMES[rng.gen_range(0..NAMES.len())];
            let to = NAMES[rng.gen_range(0..NAMES.len())];
            let value = (rng.gen_range(1.0..500.0_f64) * 100.0).round() / 100.0;
            ledger.submit(from, to, value)
        })
        .collect()
}

fn race(miners: usize, rounds: usize, transfers: usize, seed: u64, config: LedgerConfig) -> Result<()> {
    if miners == 0 {
        bail!("at least one miner is required");
    }
    let ledger = Arc::new(Ledger::new(&config)?);
    submit_random(&ledger, transfers, seed);
    info!(transfers, miners, rounds, difficulty = config.difficulty, "starting race");

    let miners: Vec<Miner> = (0..miners)
        .map(|id| Miner::from_config(id, ledger.clone(), &config))
        .collect();
    let competition = Competition::new(&config);

    for report in competition.run_rounds(&miners, &ledger, rounds) {
        match report.winner {
            Some(miner) => println!("round {}: miner {miner} won", report.round),
            None => println!("round {}: no block committed", report.round),
        }
        print_json("outcomes", &report.outcomes);
    }

    print_json("chain", &ledger.chain());
    print_json("pool", &ledger.pool());
    match ledger.verify_chain() {
        Ok(()) => println!("chain is intact ({} blocks)", ledger.height()),
        Err(err) => println!("chain check failed: {err}"),
    }
    Ok(())
}

fn tamper(blocks: usize, config: LedgerConfig) -> Result<()> {
    if blocks < 2 {
        bail!("need at least two blocks to tamper with a historical one");
    }
    let ledger = Arc::new(Ledger::new(&config)?);
    let miner = Miner::from_config(0, ledger.clone(), &config);
    for i in 0..blocks {
        ledger.submit(NAMES[i % NAMES.len()], "ok", (i + 1) as f64);
        let block = miner.build_block(miner.select_candidates());
        let nonce = miner.mine(&block);
        if !ledger.commit(block, nonce) {
            bail!("block {i} was rejected");
        }
    }
    println!("mined {} blocks; chain check: {:?}", ledger.height(), ledger.verify_chain());

    let mut chain = ledger.chain();
    let target = blocks / 2;
    let Some(original) = chain[target].transactions.first().cloned() else {
        bail!("block {target} has no transactions to alter");
    };
    chain[target].transactions[0] = Transaction::new(
        original.sender(),
        "mallory",
        original.value() * 1000.0,
        original.timestamp(),
    );
    print_json("tampered block", &chain[target]);

    match verify_blocks(&chain, ledger.difficulty()) {
        Ok(()) => println!("tampering went undetected"),
        Err(err) => println!("blockchain has been compromised: {err}"),
    }
    Ok(())
}

fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .pretty()
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Race {
            miners,
            rounds,
            transfers,
            seed,
            settings,
        } => race(miners, rounds, transfers, seed, settings.load()?),
        Command::Tamper { blocks, settings } => tamper(blocks, settings.load()?),
    }
}
