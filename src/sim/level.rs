//! Platformer level data
//!
//! A level is plain data: static platforms, enemies that patrol between two
//! x limits, and collectibles consumed on first touch. Levels serialize with
//! serde so campaigns can be loaded from JSON; `builtin_levels` is the
//! default three-level campaign, authored for an 800x450 field and shifted
//! vertically to sit on the floor of any field height. Fields narrower than
//! 800 clip the right-hand side of the layout.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::collision::rects_overlap;
use super::geometry::Rect;

/// Level loading failures
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("Level JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Campaign has no levels")]
    Empty,
    #[error("Level {index} has no collectibles and could never be cleared")]
    NoCollectibles { index: usize },
    #[error("Enemy {enemy} in level {index} has an empty patrol range")]
    BadPatrol { index: usize, enemy: usize },
}

/// A patrolling enemy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub rect: Rect,
    /// Horizontal speed, sign is the current direction (px/frame)
    pub speed: f32,
    /// Left limit of the patrol
    pub patrol_min: f32,
    /// Right limit of the patrol (for the enemy's right edge)
    pub patrol_max: f32,
}

impl Enemy {
    pub fn new(x: f32, y: f32, width: f32, height: f32, speed: f32, patrol: (f32, f32)) -> Self {
        Self {
            rect: Rect::new(x, y, width, height),
            speed,
            patrol_min: patrol.0,
            patrol_max: patrol.1,
        }
    }

    /// Move one frame, turning around at either limit
    pub fn advance(&mut self) {
        self.rect.pos.x += self.speed;
        if self.rect.left() <= self.patrol_min {
            self.rect.pos.x = self.patrol_min;
            self.speed = self.speed.abs();
        } else if self.rect.right() >= self.patrol_max {
            self.rect.pos.x = self.patrol_max - self.rect.size.x;
            self.speed = -self.speed.abs();
        }
    }
}

/// A pickup worth points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collectible {
    pub rect: Rect,
    #[serde(default)]
    pub consumed: bool,
}

impl Collectible {
    pub fn new(x: f32, y: f32, size: f32) -> Self {
        Self {
            rect: Rect::new(x, y, size, size),
            consumed: false,
        }
    }

    /// Consume on overlap; true only on the first touch
    pub fn try_consume(&mut self, actor: &Rect) -> bool {
        if self.consumed || !rects_overlap(actor, &self.rect) {
            return false;
        }
        self.consumed = true;
        true
    }
}

/// One platformer stage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Level {
    #[serde(default)]
    pub name: String,
    pub platforms: Vec<Rect>,
    #[serde(default)]
    pub enemies: Vec<Enemy>,
    pub collectibles: Vec<Collectible>,
}

impl Level {
    /// Move every shape vertically by `dy`
    pub fn shift_y(&mut self, dy: f32) {
        for platform in &mut self.platforms {
            platform.pos.y += dy;
        }
        for enemy in &mut self.enemies {
            enemy.rect.pos.y += dy;
        }
        for collectible in &mut self.collectibles {
            collectible.rect.pos.y += dy;
        }
    }

    /// Every collectible has been picked up
    pub fn is_cleared(&self) -> bool {
        self.collectibles.iter().all(|c| c.consumed)
    }

    pub fn remaining(&self) -> usize {
        self.collectibles.iter().filter(|c| !c.consumed).count()
    }
}

const COIN: f32 = 16.0;
const ENEMY: f32 = 24.0;
/// Field height the built-in layout is authored against
const LAYOUT_HEIGHT: f32 = 450.0;
const FLOOR_ENEMY_Y: f32 = LAYOUT_HEIGHT - ENEMY;

/// Default three-level campaign for a field `field_height` tall
pub fn builtin_levels(field_height: f32) -> Vec<Level> {
    let mut levels = authored_levels();
    let dy = field_height - LAYOUT_HEIGHT;
    if dy != 0.0 {
        for level in &mut levels {
            level.shift_y(dy);
        }
    }
    levels
}

fn authored_levels() -> Vec<Level> {
    vec![
        Level {
            name: "Warm-up".to_owned(),
            platforms: vec![
                Rect::new(150.0, 350.0, 150.0, 16.0),
                Rect::new(380.0, 280.0, 150.0, 16.0),
                Rect::new(600.0, 210.0, 140.0, 16.0),
            ],
            enemies: vec![Enemy::new(450.0, FLOOR_ENEMY_Y, ENEMY, ENEMY, 1.5, (320.0, 760.0))],
            collectibles: vec![
                Collectible::new(215.0, 320.0, COIN),
                Collectible::new(445.0, 250.0, COIN),
                Collectible::new(660.0, 180.0, COIN),
            ],
        },
        Level {
            name: "Stairs".to_owned(),
            platforms: vec![
                Rect::new(100.0, 370.0, 120.0, 16.0),
                Rect::new(260.0, 300.0, 120.0, 16.0),
                Rect::new(420.0, 230.0, 120.0, 16.0),
                Rect::new(580.0, 160.0, 120.0, 16.0),
            ],
            enemies: vec![
                Enemy::new(300.0, FLOOR_ENEMY_Y, ENEMY, ENEMY, 2.0, (240.0, 780.0)),
                Enemy::new(430.0, 230.0 - ENEMY, ENEMY, ENEMY, 1.0, (420.0, 540.0)),
            ],
            collectibles: vec![
                Collectible::new(150.0, 340.0, COIN),
                Collectible::new(310.0, 270.0, COIN),
                Collectible::new(630.0, 130.0, COIN),
                Collectible::new(740.0, 420.0, COIN),
            ],
        },
        Level {
            name: "Gauntlet".to_owned(),
            platforms: vec![
                Rect::new(60.0, 330.0, 100.0, 16.0),
                Rect::new(220.0, 260.0, 100.0, 16.0),
                Rect::new(380.0, 330.0, 100.0, 16.0),
                Rect::new(540.0, 260.0, 100.0, 16.0),
                Rect::new(680.0, 190.0, 100.0, 16.0),
            ],
            enemies: vec![
                Enemy::new(200.0, FLOOR_ENEMY_Y, ENEMY, ENEMY, 2.5, (180.0, 500.0)),
                Enemy::new(600.0, FLOOR_ENEMY_Y, ENEMY, ENEMY, 2.5, (500.0, 800.0)),
                Enemy::new(545.0, 260.0 - ENEMY, ENEMY, ENEMY, 0.8, (540.0, 640.0)),
            ],
            collectibles: vec![
                Collectible::new(100.0, 300.0, COIN),
                Collectible::new(262.0, 230.0, COIN),
                Collectible::new(422.0, 300.0, COIN),
                Collectible::new(582.0, 230.0, COIN),
                Collectible::new(722.0, 160.0, COIN),
            ],
        },
    ]
}

/// Parse and check a campaign
pub fn levels_from_json(json: &str) -> Result<Vec<Level>, LevelError> {
    let levels: Vec<Level> = serde_json::from_str(json)?;
    validate_levels(&levels)?;
    Ok(levels)
}

pub fn validate_levels(levels: &[Level]) -> Result<(), LevelError> {
    if levels.is_empty() {
        return Err(LevelError::Empty);
    }
    for (index, level) in levels.iter().enumerate() {
        if level.collectibles.is_empty() {
            return Err(LevelError::NoCollectibles { index });
        }
        for (enemy, e) in level.enemies.iter().enumerate() {
            if e.patrol_max - e.patrol_min < e.rect.size.x {
                return Err(LevelError::BadPatrol { index, enemy });
            }
        }
    }
    Ok(())
}
