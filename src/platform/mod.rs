//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Input events (keyboard, touch gestures)
//! - Storage (LocalStorage on web)

pub mod input;
#[cfg(target_arch = "wasm32")]
pub mod storage;

pub use input::{Gesture, InputState, Key, TouchTracker, classify_swipe};
