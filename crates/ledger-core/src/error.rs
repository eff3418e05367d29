use thiserror::Error;

pub type Result<T> = std::result::Result<T, LedgerError>;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("nonce {nonce} does not satisfy difficulty {difficulty}")]
    InvalidNonce { nonce: u64, difficulty: usize },

    #[error("no valid nonce found within {attempts} attempts")]
    AttemptsExhausted { attempts: u64 },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("block {index} has not been committed")]
    Uncommitted { index: usize },

    #[error("block {index}: stored hash {stored} does not match recomputed {computed}")]
    HashMismatch {
        index: usize,
        stored: String,
        computed: String,
    },

    #[error("block {index}: hash does not meet difficulty {difficulty}")]
    InsufficientWork { index: usize, difficulty: usize },

    #[error("block {index}: previous hash does not match its predecessor")]
    BrokenLink { index: usize },

    #[error("config parse error: {0}")]
    Config(#[from] serde_json::Error),
}
