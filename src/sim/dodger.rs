//! Falling-obstacle dodger
//!
//! The player slides along the bottom of the field while circles fall from
//! the top. Every circle that falls out of the field scores a point; touching
//! one costs a life (with a grace window). Reaching `score_per_level * level`
//! points halts on a level-complete overlay until `next_level` is called.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::rect_circle_collision;
use super::events::{GameEvent, OverlayKind};
use super::geometry::{Bounds, Circle};
use super::hit::{HitOutcome, end_invulnerability, on_hit};
use super::motion::{Actor, clamp_to_bounds, integrate};
use super::scheduler::{FrameContext, Game, Terminal, TimerEvent};
use crate::consts::STARTING_LIVES;
use crate::platform::InputState;
use crate::renderer::{Color, Surface};
use crate::tuning::DodgerTuning;

/// A falling circle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub circle: Circle,
    /// px/frame
    pub vel: Vec2,
}

impl Obstacle {
    pub fn advance(&mut self) {
        self.circle.center += self.vel;
    }
}

/// Dodger game state
pub struct Dodger<R: Rng = Pcg32> {
    tuning: DodgerTuning,
    bounds: Bounds,
    player: Actor,
    obstacles: Vec<Obstacle>,
    score: u64,
    lives: u32,
    level: u32,
    spawn_interval_ms: f64,
    last_spawn_ms: Option<f64>,
    input: InputState,
    rng: R,
}

impl Dodger<Pcg32> {
    pub fn seeded(tuning: DodgerTuning, seed: u64) -> Self {
        Self::new(tuning, Pcg32::seed_from_u64(seed))
    }
}

impl<R: Rng> Dodger<R> {
    /// Tuning that would leave nothing to spawn or dodge is replaced by the defaults
    pub fn new(tuning: DodgerTuning, rng: R) -> Self {
        let tuning = match tuning.validate() {
            Ok(()) => tuning,
            Err(e) => {
                log::warn!("{}; using default dodger tuning", e);
                DodgerTuning::default()
            }
        };
        let bounds = Bounds::new(tuning.field_width, tuning.field_height);
        let player = Self::spawn_player(&tuning);
        let spawn_interval_ms = tuning.spawn_interval_ms;
        Self {
            tuning,
            bounds,
            player,
            obstacles: Vec::new(),
            score: 0,
            lives: STARTING_LIVES,
            level: 1,
            spawn_interval_ms,
            last_spawn_ms: None,
            input: InputState::default(),
            rng,
        }
    }

    fn spawn_player(tuning: &DodgerTuning) -> Actor {
        Actor::new(
            (tuning.field_width - tuning.player_size) / 2.0,
            tuning.field_height - tuning.player_offset,
            tuning.player_size,
            tuning.player_size,
        )
    }

    pub fn tuning(&self) -> &DodgerTuning {
        &self.tuning
    }

    pub fn player(&self) -> &Actor {
        &self.player
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn spawn_interval_ms(&self) -> f64 {
        self.spawn_interval_ms
    }

    /// Add an obstacle directly (bypasses the spawn timer)
    pub fn push_obstacle(&mut self, obstacle: Obstacle) {
        self.obstacles.push(obstacle);
    }

    /// Points needed to clear the current level
    pub fn level_target(&self) -> u64 {
        self.tuning.score_per_level * self.level as u64
    }

    /// Continue after a level-complete overlay: harder, with a fresh field
    pub fn next_level(&mut self) {
        self.level += 1;
        self.restart_field();
        self.spawn_interval_ms = (self.tuning.spawn_interval_ms
            - self.level as f64 * self.tuning.spawn_interval_step_ms)
            .max(self.tuning.min_spawn_interval_ms);
        log::info!(
            "Dodger level {} (spawn every {}ms)",
            self.level,
            self.spawn_interval_ms
        );
    }

    fn restart_field(&mut self) {
        self.score = 0;
        self.lives = STARTING_LIVES;
        self.obstacles.clear();
        self.player = Self::spawn_player(&self.tuning);
        self.last_spawn_ms = None;
    }

    fn maybe_spawn(&mut self, now_ms: f64) {
        let due = match self.last_spawn_ms {
            None => true,
            Some(last) => now_ms - last > self.spawn_interval_ms,
        };
        if !due {
            return;
        }
        let radius = self
            .rng
            .random_range(self.tuning.obstacle_min_radius..self.tuning.obstacle_max_radius);
        let x = self.rng.random_range(0.0..self.bounds.width);
        self.obstacles.push(Obstacle {
            circle: Circle::new(x, 0.0, radius),
            vel: Vec2::new(0.0, self.tuning.obstacle_speed * self.level as f32),
        });
        self.last_spawn_ms = Some(now_ms);
    }
}

impl<R: Rng> Game for Dodger<R> {
    fn read_input(&mut self, input: &InputState) {
        self.input = *input;
    }

    fn integrate(&mut self, ctx: &mut FrameContext<'_>) {
        self.player.vel.x = self.input.horizontal() * self.tuning.player_speed;
        integrate(&mut self.player, 0.0);
        for obstacle in &mut self.obstacles {
            obstacle.advance();
        }
        self.maybe_spawn(ctx.now_ms);
    }

    fn resolve(&mut self, ctx: &mut FrameContext<'_>) {
        clamp_to_bounds(&mut self.player, self.bounds);

        let player_rect = self.player.rect();
        for obstacle in &self.obstacles {
            if rect_circle_collision(&player_rect, &obstacle.circle) {
                if let HitOutcome::Damaged { lives_left } =
                    on_hit(&mut self.player, &mut self.lives, ctx)
                {
                    log::debug!("Dodger hit, {} lives left", lives_left);
                }
            }
        }

        // Scoring is on passage: each obstacle leaving the field counts once
        let height = self.bounds.height;
        let before = self.obstacles.len();
        self.obstacles.retain(|o| o.circle.top() <= height);
        let passed = (before - self.obstacles.len()) as u64;
        if passed > 0 {
            self.score += passed;
            ctx.emit(GameEvent::ScoreChanged(self.score));
        }
    }

    fn terminal(&self) -> Option<Terminal> {
        if self.lives == 0 {
            return Some(Terminal {
                kind: OverlayKind::GameOver,
                final_score: self.score,
            });
        }
        if self.score >= self.level_target() {
            return Some(Terminal {
                kind: OverlayKind::LevelComplete,
                final_score: self.score,
            });
        }
        None
    }

    fn render(&self, surface: &mut dyn Surface) {
        let body = if self.player.invulnerable {
            Color::BLACK.with_alpha(128)
        } else {
            Color::BLACK
        };
        let p = self.player.rect();
        surface.fill_rect(p.left(), p.top(), p.size.x, p.size.y, body);
        // Ears
        surface.fill_rect(p.left(), p.top() - 8.0, 8.0, 8.0, body);
        surface.fill_rect(p.right() - 8.0, p.top() - 8.0, 8.0, 8.0, body);

        for obstacle in &self.obstacles {
            surface.fill_circle(obstacle.circle.center, obstacle.circle.radius, Color::RED);
        }
    }

    fn on_timer(&mut self, event: TimerEvent, ctx: &mut FrameContext<'_>) {
        if event == TimerEvent::InvulnerabilityExpired {
            end_invulnerability(&mut self.player, ctx);
        }
    }

    fn hud(&self) -> Vec<GameEvent> {
        vec![
            GameEvent::ScoreChanged(self.score),
            GameEvent::LivesChanged(self.lives),
            GameEvent::LevelChanged(self.level),
            GameEvent::InvulnerabilityChanged(self.player.invulnerable),
        ]
    }

    fn reset(&mut self) {
        self.level = 1;
        self.spawn_interval_ms = self.tuning.spawn_interval_ms;
        self.restart_field();
    }
}
