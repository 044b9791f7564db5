//! Wheel geometry and the decaying spin
//!
//! The wheel is drawn with sector 0 starting at the fixed pointer and sectors
//! advancing with increasing rotation. The pointer therefore sits over the
//! sector containing angle `-rotation`, which is what `sector_at` computes.
//!
//! Rotation is accumulated unbounded while spinning and only wrapped when
//! the outcome is looked up, so the rendered angle never jumps.

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::consts::{COLOR_PAYOUT, NUMBER_PAYOUT, PARITY_PAYOUT};
use crate::error::{BetError, BetResult};
use crate::tuning::WheelTuning;
use crate::wrap_angle;

/// Single-zero wheel in physical order, clockwise from the zero
pub const EUROPEAN_LAYOUT: [u8; 37] = [
    0, 32, 15, 19, 4, 21, 2, 25, 17, 34, 6, 27, 13, 36, 11, 30, 8, 23, 10, 5, 24, 16, 33, 1, 20,
    14, 31, 9, 22, 18, 29, 7, 28, 12, 35, 3, 26,
];

/// Sector colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Red,
    Black,
    /// House pocket: no colour, no parity
    Green,
}

/// Even/odd
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Parity {
    Even,
    Odd,
}

/// One pocket on the wheel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sector {
    pub label: u8,
    pub category: Category,
}

impl Sector {
    /// Parity of the label; the neutral pocket has none
    pub fn parity(&self) -> Option<Parity> {
        match self.category {
            Category::Green => None,
            _ if self.label % 2 == 0 => Some(Parity::Even),
            _ => Some(Parity::Odd),
        }
    }
}

/// Fixed ring of sectors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wheel {
    sectors: Vec<Sector>,
}

impl Wheel {
    /// Build from an explicit sector list (must be non-empty)
    pub fn new(sectors: Vec<Sector>) -> Option<Self> {
        if sectors.is_empty() {
            return None;
        }
        Some(Self { sectors })
    }

    /// Standard 37-pocket wheel; colours alternate red/black after the zero
    pub fn european() -> Self {
        let sectors = EUROPEAN_LAYOUT
            .iter()
            .enumerate()
            .map(|(i, &label)| {
                let category = match (label, i % 2) {
                    (0, _) => Category::Green,
                    (_, 1) => Category::Red,
                    _ => Category::Black,
                };
                Sector { label, category }
            })
            .collect();
        Self { sectors }
    }

    pub fn len(&self) -> usize {
        self.sectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sectors.is_empty()
    }

    pub fn sectors(&self) -> &[Sector] {
        &self.sectors
    }

    pub fn sector(&self, index: usize) -> Option<&Sector> {
        self.sectors.get(index)
    }

    /// Angular width of one sector
    pub fn sector_width(&self) -> f64 {
        TAU / self.sectors.len() as f64
    }

    pub fn contains_label(&self, label: u8) -> bool {
        self.sectors.iter().any(|s| s.label == label)
    }

    /// Angle under the pointer for a given wheel rotation, in [0, 2π)
    pub fn effective_angle(rotation: f64) -> f64 {
        wrap_angle(TAU - wrap_angle(rotation))
    }

    /// Index of the sector under the pointer. Total over finite rotations.
    pub fn sector_at(&self, rotation: f64) -> usize {
        let effective = Self::effective_angle(rotation);
        let index = (effective / self.sector_width()).floor() as usize;
        // Float rounding right below 2π can land on len()
        index.min(self.sectors.len() - 1)
    }
}

/// A wager, fixed when the spin starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Bet {
    Number(u8),
    Color(Category),
    Parity(Parity),
}

impl Bet {
    /// Build a bet from form values (`number`, `red`, `black`, `even`, `odd`)
    pub fn from_form(kind: &str, number: i64) -> BetResult<Self> {
        match kind.trim().to_ascii_lowercase().as_str() {
            "number" => u8::try_from(number)
                .map(Bet::Number)
                .map_err(|_| BetError::InvalidSelection(format!("number {number}"))),
            "red" => Ok(Bet::Color(Category::Red)),
            "black" => Ok(Bet::Color(Category::Black)),
            "even" => Ok(Bet::Parity(Parity::Even)),
            "odd" => Ok(Bet::Parity(Parity::Odd)),
            other => Err(BetError::InvalidSelection(format!("bet type `{other}`"))),
        }
    }

    /// Check the bet can win on this wheel at all
    pub fn validate(&self, wheel: &Wheel) -> BetResult<()> {
        match *self {
            Bet::Number(n) if !wheel.contains_label(n) => {
                Err(BetError::InvalidSelection(format!("number {n}")))
            }
            Bet::Color(Category::Green) => Err(BetError::InvalidSelection(
                "green is not a colour bet".into(),
            )),
            _ => Ok(()),
        }
    }

    /// Total returned to the player for this bet landing on `sector`
    pub fn payout(&self, stake: u64, sector: &Sector) -> u64 {
        let won = match *self {
            Bet::Number(n) => n == sector.label,
            Bet::Color(c) => c == sector.category,
            Bet::Parity(p) => sector.parity() == Some(p),
        };
        if !won {
            return 0;
        }
        let multiplier = match self {
            Bet::Number(_) => NUMBER_PAYOUT,
            Bet::Color(_) => COLOR_PAYOUT,
            Bet::Parity(_) => PARITY_PAYOUT,
        };
        stake.saturating_mul(multiplier)
    }
}

/// Outcome of one settled spin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpinResult {
    pub winning_index: usize,
    pub winning_label: u8,
    pub winning_category: Category,
    /// Amount credited (0 when the bet lost; the stake was taken up front)
    pub payout: u64,
}

/// Rotation and angular velocity of the wheel
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpinState {
    /// Accumulated rotation (radians, unbounded)
    pub rotation: f64,
    /// Angular velocity (radians/frame, >= 0)
    pub velocity: f64,
    pub spinning: bool,
}

impl SpinState {
    /// Start spinning at `velocity`
    pub fn launch(&mut self, velocity: f64) {
        self.velocity = velocity;
        self.spinning = true;
    }

    /// Decay and advance one frame. Returns true on the frame the spin settles.
    pub fn step(&mut self, tuning: &WheelTuning) -> bool {
        if !self.spinning {
            return false;
        }
        self.velocity *= tuning.damping;
        self.rotation += self.velocity;
        if self.velocity < tuning.stop_threshold {
            self.velocity = 0.0;
            self.spinning = false;
            return true;
        }
        false
    }
}

/// Frames a spin launched at `v0` takes to settle: ceil(ln(t/v0) / ln(d))
///
/// `step` settles once velocity is strictly below the threshold. When
/// ln(t/v0) / ln(d) is an exact integer n, the velocity after n frames equals
/// the threshold and the spin settles on frame n + 1; this returns n. Random
/// launch velocities hit that boundary with probability zero, and float
/// rounding decides it anyway, so callers should treat the result as exact
/// only away from integer ratios.
pub fn ticks_to_rest(v0: f64, damping: f64, threshold: f64) -> u64 {
    if v0 < threshold {
        // Even a stationary wheel takes one frame to notice
        return 1;
    }
    ((threshold / v0).ln() / damping.ln()).ceil().max(1.0) as u64
}
