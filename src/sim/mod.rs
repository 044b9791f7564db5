//! Simulation module
//!
//! All gameplay logic lives here, independent of the page:
//! - One fixed step per animation frame
//! - Seeded RNG only (spawns, spin launches)
//! - Wall-clock time only for timers and spawn intervals
//! - Drawing goes through the `Surface` trait, display updates through `GameEvent`

pub mod collision;
pub mod dodger;
pub mod events;
pub mod geometry;
pub mod hit;
pub mod level;
pub mod motion;
pub mod platformer;
pub mod roulette;
pub mod scheduler;
pub mod wheel;

pub use collision::{Contact, rect_circle_collision, rects_overlap, resolve_rect_rect};
pub use dodger::{Dodger, Obstacle};
pub use events::{GameEvent, MessageTone, OverlayKind};
pub use geometry::{Bounds, Circle, Rect};
pub use hit::{HitOutcome, end_invulnerability, on_hit};
pub use level::{Collectible, Enemy, Level, LevelError, builtin_levels, levels_from_json};
pub use motion::{Actor, clamp_to_bounds, integrate};
pub use platformer::Platformer;
pub use roulette::{POINTER_ANGLE, Roulette};
pub use scheduler::{FrameContext, FrameOutcome, FrameScheduler, Game, Terminal, TimerEvent};
pub use wheel::{Bet, Category, Parity, Sector, SpinResult, SpinState, Wheel};
