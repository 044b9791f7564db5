//! Arcade Sim - frame-driven 2D arcade games
//!
//! Core modules:
//! - `sim`: Simulation (motion, collisions, spin resolution, frame scheduling)
//! - `renderer`: Abstract 2D draw surface and a recording implementation
//! - `platform`: Keyboard/touch input translation
//! - `persistence`: Balance storage behind a key-value seam
//! - `tuning`: Data-driven per-game constants
//! - `error`: Error kinds for rejected player actions

pub mod error;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod sim;
pub mod tuning;

pub use error::{BetError, BetResult};
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Nominal frame period in milliseconds (one simulation step per frame)
    pub const FRAME_MS: f64 = 1000.0 / 60.0;

    /// Invulnerability window after a hit
    pub const INVULNERABILITY_MS: f64 = 2000.0;
    /// How long the "level cleared" banner stays up
    pub const BANNER_MS: f64 = 1500.0;

    /// Lives at the start of a run
    pub const STARTING_LIVES: u32 = 3;

    /// Balance used when nothing is stored yet
    pub const DEFAULT_BALANCE: u64 = 1000;

    /// Roulette payout multipliers (applied to the stake)
    pub const NUMBER_PAYOUT: u64 = 35;
    pub const COLOR_PAYOUT: u64 = 2;
    pub const PARITY_PAYOUT: u64 = 2;

    /// Minimum touch travel (px) for a vertical swipe to count as a jump
    pub const SWIPE_JUMP_THRESHOLD: f32 = 20.0;
}

/// Wrap an angle into [0, 2π)
#[inline]
pub fn wrap_angle(angle: f64) -> f64 {
    use std::f64::consts::TAU;
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Convert polar (r, theta) to cartesian (x, y) around `center`
#[inline]
pub fn polar_to_cartesian(center: Vec2, r: f32, theta: f32) -> Vec2 {
    center + Vec2::new(r * theta.cos(), r * theta.sin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::TAU;

    #[test]
    fn test_wrap_angle() {
        assert_eq!(wrap_angle(0.0), 0.0);
        assert!((wrap_angle(TAU + 1.0) - 1.0).abs() < 1e-12);
        assert!((wrap_angle(-1.0) - (TAU - 1.0)).abs() < 1e-12);
        let tiny = wrap_angle(-1e-18);
        assert!((0.0..TAU).contains(&tiny));
    }

    #[test]
    fn test_polar_to_cartesian() {
        let p = polar_to_cartesian(Vec2::new(10.0, 10.0), 5.0, 0.0);
        assert!((p - Vec2::new(15.0, 10.0)).length() < 1e-5);
    }
}
