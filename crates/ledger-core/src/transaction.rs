use crate::sha256_hex;
use serde::{Deserialize, Serialize};

/// A pending or committed transfer. Fields are fixed at construction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    id: String,
    sender: String,
    recipient: String,
    value: f64,
    timestamp: u64,
}

impl Transaction {
    /// Builds a transfer whose id is `sha256(sender ∥ recipient ∥ value ∥ now)`.
    pub fn new(sender: impl Into<String>, recipient: impl Into<String>, value: f64, now: u64) -> Self {
        let sender = sender.into();
        let recipient = recipient.into();
        let id = sha256_hex(format!("{sender}{recipient}{value}{now}"));
        Self {
            id,
            sender,
            recipient,
            value,
            timestamp: now,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }
}
