//! Outbound notifications for display sinks
//!
//! The simulation never touches the page. Every change a player should see
//! is queued here and drained by the front end after each frame.

use serde::{Deserialize, Serialize};

use super::wheel::SpinResult;

/// Which modal overlay to show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverlayKind {
    /// Lives exhausted
    GameOver,
    /// Level target reached; the player chooses to continue
    LevelComplete,
    /// Final level cleared
    Victory,
}

/// Tone of a free-form status message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageTone {
    Info,
    Win,
    Loss,
    Warning,
}

/// Something the display should reflect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    ScoreChanged(u64),
    LivesChanged(u32),
    LevelChanged(u32),
    BalanceChanged(u64),
    /// Actor entered or left its grace window
    InvulnerabilityChanged(bool),
    /// Non-blocking "level cleared" banner
    Banner { visible: bool },
    /// Blocking overlay with the run's final score
    Overlay { kind: OverlayKind, final_score: u64 },
    /// Overlay dismissed by a reset/continue
    OverlayHidden,
    SpinResolved(SpinResult),
    Message { text: String, tone: MessageTone },
}
