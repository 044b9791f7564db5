//! Errors for rejected player actions
//!
//! None of these are fatal: the requested action is refused and the prior
//! state is left exactly as it was.

use thiserror::Error;

/// Reasons a bet/spin request is refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BetError {
    /// Stake is not positive or exceeds the balance
    #[error("Invalid stake {stake}: balance is {balance}")]
    InvalidStake {
        /// Stake as entered
        stake: i64,
        /// Balance at the time of the request
        balance: u64,
    },
    /// Bet names something that is not on the wheel
    #[error("Invalid selection: {0}")]
    InvalidSelection(String),
    /// A spin is already running
    #[error("A spin is already in progress")]
    DuplicateActivation,
}

impl BetError {
    /// Whether the player should be told about this rejection
    pub fn is_user_facing(&self) -> bool {
        !matches!(self, BetError::DuplicateActivation)
    }
}

/// Result type for bet operations.
pub type BetResult<T> = Result<T, BetError>;
