//! Data-driven game balance
//!
//! Every constant that differs between game variants lives here so a variant
//! can be re-tuned from JSON without touching the simulation code.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tuning load/validation failures
#[derive(Debug, Error)]
pub enum TuningError {
    /// JSON could not be parsed into tuning values
    #[error("Malformed tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),
    /// A value is out of its allowed range
    #[error("Invalid tuning value `{field}`: {reason}")]
    OutOfRange {
        /// Dotted path of the offending field
        field: &'static str,
        /// What the constraint is
        reason: &'static str,
    },
}

/// Falling-obstacle dodger constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DodgerTuning {
    pub field_width: f32,
    pub field_height: f32,
    pub player_size: f32,
    /// Horizontal speed (px/frame)
    pub player_speed: f32,
    /// Distance of the player's top edge from the bottom of the field
    pub player_offset: f32,
    /// Fall speed per level (px/frame)
    pub obstacle_speed: f32,
    pub obstacle_min_radius: f32,
    pub obstacle_max_radius: f32,
    /// Spawn interval at level 1 (ms)
    pub spawn_interval_ms: f64,
    /// Spawn interval never drops below this (ms)
    pub min_spawn_interval_ms: f64,
    /// Interval reduction per level (ms)
    pub spawn_interval_step_ms: f64,
    /// Points needed per level to clear it
    pub score_per_level: u64,
}

impl Default for DodgerTuning {
    fn default() -> Self {
        Self {
            field_width: 400.0,
            field_height: 600.0,
            player_size: 25.0,
            player_speed: 5.0,
            player_offset: 50.0,
            obstacle_speed: 2.0,
            obstacle_min_radius: 5.0,
            obstacle_max_radius: 15.0,
            spawn_interval_ms: 1000.0,
            min_spawn_interval_ms: 200.0,
            spawn_interval_step_ms: 50.0,
            score_per_level: 20,
        }
    }
}

impl DodgerTuning {
    /// Check the field, player and obstacle sizes leave something to play
    pub fn validate(&self) -> Result<(), TuningError> {
        if !(self.field_width > 0.0 && self.field_height > 0.0) {
            return Err(TuningError::OutOfRange {
                field: "dodger.field_width",
                reason: "field size must be positive",
            });
        }
        if !(self.player_size > 0.0) {
            return Err(TuningError::OutOfRange {
                field: "dodger.player_size",
                reason: "must be positive",
            });
        }
        if !(self.obstacle_speed > 0.0) {
            return Err(TuningError::OutOfRange {
                field: "dodger.obstacle_speed",
                reason: "must be positive",
            });
        }
        if !(self.obstacle_min_radius > 0.0 && self.obstacle_max_radius > self.obstacle_min_radius)
        {
            return Err(TuningError::OutOfRange {
                field: "dodger.obstacle_max_radius",
                reason: "radius range must be positive and non-empty",
            });
        }
        if self.score_per_level == 0 {
            return Err(TuningError::OutOfRange {
                field: "dodger.score_per_level",
                reason: "must be at least 1",
            });
        }
        Ok(())
    }
}

/// Platformer constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformerTuning {
    pub field_width: f32,
    pub field_height: f32,
    pub actor_width: f32,
    pub actor_height: f32,
    /// Downward acceleration (px/frame²)
    pub gravity: f32,
    /// Horizontal speed (px/frame)
    pub move_speed: f32,
    /// Initial upward speed of a jump (px/frame)
    pub jump_speed: f32,
    /// Points per collectible
    pub collectible_points: u64,
}

impl Default for PlatformerTuning {
    fn default() -> Self {
        Self {
            field_width: 800.0,
            field_height: 450.0,
            actor_width: 24.0,
            actor_height: 32.0,
            gravity: 0.5,
            move_speed: 4.0,
            jump_speed: 10.0,
            collectible_points: 10,
        }
    }
}

impl PlatformerTuning {
    pub fn validate(&self) -> Result<(), TuningError> {
        if !(self.field_width > 0.0 && self.field_height > 0.0) {
            return Err(TuningError::OutOfRange {
                field: "platformer.field_width",
                reason: "field size must be positive",
            });
        }
        if !(self.actor_width > 0.0 && self.actor_height > 0.0) {
            return Err(TuningError::OutOfRange {
                field: "platformer.actor_width",
                reason: "actor size must be positive",
            });
        }
        if !(self.gravity >= 0.0) {
            return Err(TuningError::OutOfRange {
                field: "platformer.gravity",
                reason: "must not be negative",
            });
        }
        if !(self.move_speed >= 0.0 && self.jump_speed >= 0.0) {
            return Err(TuningError::OutOfRange {
                field: "platformer.move_speed",
                reason: "speeds must not be negative",
            });
        }
        Ok(())
    }
}

/// Roulette wheel constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WheelTuning {
    /// Multiplicative velocity decay per frame, in (0, 1)
    pub damping: f64,
    /// Spin settles once velocity drops below this (rad/frame)
    pub stop_threshold: f64,
    /// Launch velocity range (rad/frame), half-open
    pub min_velocity: f64,
    pub max_velocity: f64,
    /// Canvas size (square)
    pub size: f32,
}

impl Default for WheelTuning {
    fn default() -> Self {
        Self {
            damping: 0.985,
            stop_threshold: 0.001,
            min_velocity: 0.05,
            max_velocity: 0.15,
            size: 400.0,
        }
    }
}

impl WheelTuning {
    /// Check the decay parameters guarantee a finite spin
    pub fn validate(&self) -> Result<(), TuningError> {
        if !(self.damping > 0.0 && self.damping < 1.0) {
            return Err(TuningError::OutOfRange {
                field: "wheel.damping",
                reason: "must be strictly between 0 and 1",
            });
        }
        if !(self.stop_threshold > 0.0) {
            return Err(TuningError::OutOfRange {
                field: "wheel.stop_threshold",
                reason: "must be positive",
            });
        }
        if !(self.min_velocity > self.stop_threshold) {
            return Err(TuningError::OutOfRange {
                field: "wheel.min_velocity",
                reason: "must exceed stop_threshold",
            });
        }
        if !(self.max_velocity > self.min_velocity) {
            return Err(TuningError::OutOfRange {
                field: "wheel.max_velocity",
                reason: "must exceed min_velocity",
            });
        }
        Ok(())
    }
}

/// All per-game tuning
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub dodger: DodgerTuning,
    pub platformer: PlatformerTuning,
    pub wheel: WheelTuning,
}

impl Tuning {
    /// Parse and validate tuning from JSON; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Validate every section
    pub fn validate(&self) -> Result<(), TuningError> {
        self.wheel.validate()?;
        self.dodger.validate()?;
        self.platformer.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let tuning = Tuning::from_json(r#"{ "wheel": { "damping": 0.99 } }"#).unwrap();
        assert_eq!(tuning.wheel.damping, 0.99);
        assert_eq!(tuning.wheel.stop_threshold, 0.001);
        assert_eq!(tuning.dodger, DodgerTuning::default());
    }

    #[test]
    fn test_rejects_non_decaying_damping() {
        let err = Tuning::from_json(r#"{ "wheel": { "damping": 1.0 } }"#).unwrap_err();
        assert!(matches!(
            err,
            TuningError::OutOfRange {
                field: "wheel.damping",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_launch_below_threshold() {
        let err =
            Tuning::from_json(r#"{ "wheel": { "min_velocity": 0.0005 } }"#).unwrap_err();
        assert!(matches!(err, TuningError::OutOfRange { .. }));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            Tuning::from_json("{ not json"),
            Err(TuningError::Parse(_))
        ));
    }

    #[test]
    fn test_rejects_empty_dodger_field() {
        let err = Tuning::from_json(r#"{ "dodger": { "field_width": 0 } }"#).unwrap_err();
        assert!(matches!(
            err,
            TuningError::OutOfRange {
                field: "dodger.field_width",
                ..
            }
        ));
        let equal_radii = DodgerTuning {
            obstacle_min_radius: 8.0,
            obstacle_max_radius: 8.0,
            ..DodgerTuning::default()
        };
        assert!(equal_radii.validate().is_err());
        let still = DodgerTuning {
            obstacle_speed: 0.0,
            ..DodgerTuning::default()
        };
        assert!(still.validate().is_err());
    }

    #[test]
    fn test_rejects_degenerate_platformer() {
        let err = Tuning::from_json(r#"{ "platformer": { "actor_height": -1 } }"#).unwrap_err();
        assert!(matches!(
            err,
            TuningError::OutOfRange {
                field: "platformer.actor_width",
                ..
            }
        ));
        assert!(Tuning::from_json(r#"{ "platformer": { "gravity": -0.5 } }"#).is_err());
    }
}
