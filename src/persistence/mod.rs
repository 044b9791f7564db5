//! Balance persistence
//!
//! Features:
//! - Key-value seam (`KeyValueStore`): LocalStorage on web, memory elsewhere
//! - Versioned JSON record for the balance
//! - Reads the legacy bare-integer format
//! - Corruption falls back to the default balance

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::DEFAULT_BALANCE;

/// Storage key for the roulette balance
pub const BALANCE_KEY: &str = "rouletteBalance";

/// Current record version
const RECORD_VERSION: u32 = 1;

/// Storage failures
#[derive(Debug, Error)]
pub enum PersistError {
    /// Backend refused the write (quota, private mode, ...)
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
    /// Stored value could not be parsed
    #[error("Corrupt record under `{key}`: {reason}")]
    Corrupt { key: String, reason: String },
    #[error("Serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// String key-value backend
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistError>;
}

/// In-memory store for native runs and tests
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    items: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistError> {
        self.items.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// Stored balance record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct BalanceRecord {
    version: u32,
    balance: u64,
}

/// Reads and writes the balance through a key-value store
pub struct BalanceStore {
    backend: Box<dyn KeyValueStore>,
}

impl BalanceStore {
    pub fn new(backend: Box<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// Store backed by memory, starting empty
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStore::new()))
    }

    /// Parse whatever is stored; `Ok(None)` when nothing is
    pub fn try_load(&self) -> Result<Option<u64>, PersistError> {
        let Some(raw) = self.backend.get(BALANCE_KEY) else {
            return Ok(None);
        };
        let raw = raw.trim();

        // Legacy format: the bare integer
        if let Ok(balance) = raw.parse::<u64>() {
            return Ok(Some(balance));
        }

        let record: BalanceRecord =
            serde_json::from_str(raw).map_err(|e| PersistError::Corrupt {
                key: BALANCE_KEY.to_owned(),
                reason: e.to_string(),
            })?;
        if record.version > RECORD_VERSION {
            return Err(PersistError::Corrupt {
                key: BALANCE_KEY.to_owned(),
                reason: format!("unknown version {}", record.version),
            });
        }
        Ok(Some(record.balance))
    }

    /// Stored balance, or the default when missing or unreadable
    pub fn load(&self) -> u64 {
        match self.try_load() {
            Ok(Some(balance)) => {
                log::info!("Loaded balance {}", balance);
                balance
            }
            Ok(None) => {
                log::info!("No stored balance, starting with {}", DEFAULT_BALANCE);
                DEFAULT_BALANCE
            }
            Err(e) => {
                log::warn!("{}; starting with {}", e, DEFAULT_BALANCE);
                DEFAULT_BALANCE
            }
        }
    }

    pub fn save(&mut self, balance: u64) -> Result<(), PersistError> {
        let json = serde_json::to_string(&BalanceRecord {
            version: RECORD_VERSION,
            balance,
        })?;
        self.backend.set(BALANCE_KEY, &json)
    }
}

impl std::fmt::Debug for BalanceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BalanceStore").finish_non_exhaustive()
    }
}
