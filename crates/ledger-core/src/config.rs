use crate::constants::{DEFAULT_DIFFICULTY, DEFAULT_START_DELAY_MS, HASH_HEX_SIZE, MAX_CANDIDATES};
use crate::error::{LedgerError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunables shared by the ledger, its miners, and the round coordinator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Leading zero hex digits required of a block hash.
    pub difficulty: usize,
    /// Transactions a miner takes from the head of the pool per block.
    pub max_candidates: usize,
    /// Cap on nonce attempts per worker. `None` searches until found.
    pub max_attempts: Option<u64>,
    /// Delay applied after all workers reach the start barrier.
    pub start_delay_ms: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            difficulty: DEFAULT_DIFFICULTY,
            max_candidates: MAX_CANDIDATES,
            max_attempts: None,
            start_delay_ms: DEFAULT_START_DELAY_MS,
        }
    }
}

impl LedgerConfig {
    pub fn with_difficulty(difficulty: usize) -> Self {
        Self {
            difficulty,
            ..Self::default()
        }
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.difficulty > HASH_HEX_SIZE {
            return Err(LedgerError::InvalidConfig(format!(
                "difficulty {} exceeds hash length {HASH_HEX_SIZE}",
                self.difficulty
            )));
        }
        if self.max_candidates == 0 {
            return Err(LedgerError::InvalidConfig(
                "max_candidates must be at least 1".into(),
            ));
        }
        if self.max_attempts == Some(0) {
            return Err(LedgerError::InvalidConfig(
                "max_attempts must be at least 1 when set".into(),
            ));
        }
        Ok(())
    }

    pub fn start_delay(&self) -> Option<Duration> {
        (self.start_delay_ms > 0).then(|| Duration::from_millis(self.start_delay_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = LedgerConfig::default();
        assert_eq!(config.difficulty, 2);
        assert_eq!(config.max_candidates, 5);
        assert_eq!(config.max_attempts, None);
        assert_eq!(config.start_delay(), None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config = LedgerConfig::from_json(r#"{"difficulty":3,"start_delay_ms":20}"#).unwrap();
        assert_eq!(config.difficulty, 3);
        assert_eq!(config.max_candidates, 5);
        assert_eq!(config.start_delay(), Some(Duration::from_millis(20)));
    }

    #[test]
    fn rejects_difficulty_beyond_hash_length() {
        let err = LedgerConfig::with_difficulty(65).validate().unwrap_err();
        assert!(matches!(err, LedgerError::InvalidConfig(_)));
        assert!(LedgerConfig::with_difficulty(64).validate().is_ok());
    }

    #[test]
    fn rejects_zero_candidates_and_zero_attempts() {
        let config = LedgerConfig {
            max_candidates: 0,
            ..LedgerConfig::default()
        };
        assert!(config.validate().is_err());

        let config = LedgerConfig {
            max_attempts: Some(0),
            ..LedgerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let err = LedgerConfig::from_json("{difficulty:").unwrap_err();
        assert!(matches!(err, LedgerError::Config(_)));
    }
}
