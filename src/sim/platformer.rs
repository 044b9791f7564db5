//! Side-view platformer
//!
//! Run and jump across a fixed campaign. Picking up every collectible in a
//! level moves straight on to the next one behind a short, non-blocking
//! "level cleared" banner; clearing the last level wins. Touching an enemy
//! costs a life with the usual grace window.

use glam::Vec2;

use super::collision::{rects_overlap, resolve_rect_rect};
use super::events::{GameEvent, OverlayKind};
use super::geometry::Bounds;
use super::hit::{HitOutcome, end_invulnerability, on_hit};
use super::level::{Level, LevelError, builtin_levels, validate_levels};
use super::motion::{Actor, clamp_to_bounds, integrate};
use super::scheduler::{FrameContext, Game, Terminal, TimerEvent};
use crate::consts::{BANNER_MS, STARTING_LIVES};
use crate::platform::InputState;
use crate::renderer::{Color, Surface, TextAlign};
use crate::tuning::PlatformerTuning;

/// Platformer game state
pub struct Platformer {
    tuning: PlatformerTuning,
    bounds: Bounds,
    campaign: Vec<Level>,
    level_index: usize,
    /// Working copy of `campaign[level_index]`
    level: Level,
    player: Actor,
    score: u64,
    lives: u32,
    won: bool,
    banner_visible: bool,
}

impl Platformer {
    /// Built-in campaign, laid out on the tuned field height
    pub fn new(tuning: PlatformerTuning) -> Self {
        let tuning = Self::checked(tuning);
        let levels = builtin_levels(tuning.field_height);
        Self::from_campaign(tuning, levels)
    }

    /// Custom campaign, checked first
    pub fn with_levels(tuning: PlatformerTuning, levels: Vec<Level>) -> Result<Self, LevelError> {
        validate_levels(&levels)?;
        Ok(Self::from_campaign(Self::checked(tuning), levels))
    }

    /// Unusable tuning is replaced by the defaults
    fn checked(tuning: PlatformerTuning) -> PlatformerTuning {
        match tuning.validate() {
            Ok(()) => tuning,
            Err(e) => {
                log::warn!("{}; using default platformer tuning", e);
                PlatformerTuning::default()
            }
        }
    }

    fn from_campaign(tuning: PlatformerTuning, campaign: Vec<Level>) -> Self {
        let bounds = Bounds::new(tuning.field_width, tuning.field_height);
        let player = Self::spawn_player(&tuning);
        let level = campaign.first().cloned().unwrap_or_default();
        Self {
            tuning,
            bounds,
            campaign,
            level_index: 0,
            level,
            player,
            score: 0,
            lives: STARTING_LIVES,
            won: false,
            banner_visible: false,
        }
    }

    fn spawn_player(tuning: &PlatformerTuning) -> Actor {
        Actor::new(
            40.0,
            tuning.field_height - tuning.actor_height,
            tuning.actor_width,
            tuning.actor_height,
        )
    }

    pub fn tuning(&self) -> &PlatformerTuning {
        &self.tuning
    }

    pub fn player(&self) -> &Actor {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Actor {
        &mut self.player
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    /// 1-based level number
    pub fn level_number(&self) -> u32 {
        self.level_index as u32 + 1
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn banner_visible(&self) -> bool {
        self.banner_visible
    }

    pub fn is_won(&self) -> bool {
        self.won
    }

    fn load_level(&mut self, index: usize) {
        if let Some(level) = self.campaign.get(index) {
            self.level_index = index;
            self.level = level.clone();
        }
        self.player = Self::spawn_player(&self.tuning);
    }

    fn level_cleared(&mut self, ctx: &mut FrameContext<'_>) {
        if self.level_index + 1 >= self.campaign.len() {
            self.won = true;
            log::info!("Platformer campaign won with {} points", self.score);
            return;
        }

        // Grace window and its timer survive the level change
        let invulnerable = self.player.invulnerable;
        self.load_level(self.level_index + 1);
        self.player.invulnerable = invulnerable;

        self.banner_visible = true;
        ctx.emit(GameEvent::LevelChanged(self.level_number()));
        ctx.emit(GameEvent::Banner { visible: true });
        ctx.schedule(BANNER_MS, TimerEvent::HideBanner);
        log::info!(
            "Platformer level {} ({})",
            self.level_number(),
            self.level.name
        );
    }
}

impl Game for Platformer {
    fn read_input(&mut self, input: &InputState) {
        self.player.vel.x = input.horizontal() * self.tuning.move_speed;
        if input.jump && !self.player.airborne {
            self.player.vel.y = -self.tuning.jump_speed;
            self.player.airborne = true;
        }
    }

    fn integrate(&mut self, _ctx: &mut FrameContext<'_>) {
        integrate(&mut self.player, self.tuning.gravity);
        for enemy in &mut self.level.enemies {
            enemy.advance();
        }
    }

    fn resolve(&mut self, ctx: &mut FrameContext<'_>) {
        clamp_to_bounds(&mut self.player, self.bounds);
        for platform in &self.level.platforms {
            resolve_rect_rect(&mut self.player, platform);
        }

        let player_rect = self.player.rect();
        for enemy in &self.level.enemies {
            if rects_overlap(&player_rect, &enemy.rect) {
                if let HitOutcome::Damaged { lives_left } =
                    on_hit(&mut self.player, &mut self.lives, ctx)
                {
                    log::debug!("Enemy contact, {} lives left", lives_left);
                }
            }
        }
        if self.lives == 0 {
            return;
        }

        let mut picked = 0;
        for collectible in &mut self.level.collectibles {
            if collectible.try_consume(&player_rect) {
                picked += 1;
            }
        }
        if picked > 0 {
            self.score += picked * self.tuning.collectible_points;
            ctx.emit(GameEvent::ScoreChanged(self.score));
            if self.level.is_cleared() {
                self.level_cleared(ctx);
            }
        }
    }

    fn terminal(&self) -> Option<Terminal> {
        if self.lives == 0 {
            return Some(Terminal {
                kind: OverlayKind::GameOver,
                final_score: self.score,
            });
        }
        if self.won {
            return Some(Terminal {
                kind: OverlayKind::Victory,
                final_score: self.score,
            });
        }
        None
    }

    fn render(&self, surface: &mut dyn Surface) {
        surface.fill_rect(0.0, 0.0, self.bounds.width, self.bounds.height, Color::SKY);

        for p in &self.level.platforms {
            surface.fill_rect(p.left(), p.top(), p.size.x, p.size.y, Color::SLATE);
        }
        for c in self.level.collectibles.iter().filter(|c| !c.consumed) {
            surface.fill_circle(c.rect.center(), c.rect.size.x / 2.0, Color::GOLD);
        }
        for e in &self.level.enemies {
            let r = &e.rect;
            surface.fill_rect(r.left(), r.top(), r.size.x, r.size.y, Color::RED);
        }

        let body = if self.player.invulnerable {
            Color::PURPLE.with_alpha(128)
        } else {
            Color::PURPLE
        };
        let p = self.player.rect();
        surface.fill_rect(p.left(), p.top(), p.size.x, p.size.y, body);

        if self.banner_visible {
            surface.draw_text(
                "Level cleared!",
                Vec2::new(self.bounds.width / 2.0, self.bounds.height / 3.0),
                0.0,
                32.0,
                TextAlign::Center,
                Color::WHITE,
            );
        }
    }

    fn on_timer(&mut self, event: TimerEvent, ctx: &mut FrameContext<'_>) {
        match event {
            TimerEvent::InvulnerabilityExpired => end_invulnerability(&mut self.player, ctx),
            TimerEvent::HideBanner => {
                if self.banner_visible {
                    self.banner_visible = false;
                    ctx.emit(GameEvent::Banner { visible: false });
                }
            }
        }
    }

    fn hud(&self) -> Vec<GameEvent> {
        vec![
            GameEvent::ScoreChanged(self.score),
            GameEvent::LivesChanged(self.lives),
            GameEvent::LevelChanged(self.level_number()),
            GameEvent::InvulnerabilityChanged(self.player.invulnerable),
            GameEvent::Banner {
                visible: self.banner_visible,
            },
        ]
    }

    fn reset(&mut self) {
        self.score = 0;
        self.lives = STARTING_LIVES;
        self.won = false;
        self.banner_visible = false;
        self.load_level(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{CommandBuffer, DrawCommand};
    use crate::sim::geometry::Rect;
    use crate::sim::level::{Collectible, Enemy};
    use crate::sim::scheduler::{FrameOutcome, FrameScheduler};

    fn idle() -> InputState {
        InputState::default()
    }

    fn jump() -> InputState {
        InputState {
            jump: true,
            ..Default::default()
        }
    }

    /// Level whose only coin sits on the spawn point
    fn coin_at_spawn() -> Level {
        Level {
            name: "spawn coin".to_owned(),
            platforms: Vec::new(),
            enemies: Vec::new(),
            collectibles: vec![Collectible::new(45.0, 425.0, 16.0)],
        }
    }

    #[test]
    fn test_jump_only_when_supported() {
        let mut sched = FrameScheduler::new(Platformer::new(PlatformerTuning::default()));
        let mut surface = CommandBuffer::new();
        assert!(!sched.game().player().airborne);

        sched.frame(0.0, &jump(), &mut surface);
        let player = sched.game().player();
        assert!(player.airborne);
        assert_eq!(player.vel.y, -9.5);
        assert_eq!(player.pos.y, 418.0 - 9.5);

        // Holding jump mid-air does not jump again
        sched.frame(16.0, &jump(), &mut surface);
        assert_eq!(sched.game().player().vel.y, -9.0);

        // Eventually back on the floor
        let mut now = 32.0;
        while sched.game().player().airborne {
            sched.frame(now, &idle(), &mut surface);
            now += 16.0;
            assert!(now < 5000.0);
        }
        assert_eq!(sched.game().player().pos.y, 418.0);
    }

    #[test]
    fn test_lands_on_platform() {
        let level = Level {
            name: String::new(),
            platforms: vec![Rect::new(0.0, 300.0, 200.0, 16.0)],
            enemies: Vec::new(),
            collectibles: vec![Collectible::new(700.0, 100.0, 16.0)],
        };
        let game = Platformer::with_levels(PlatformerTuning::default(), vec![level]).unwrap();
        let mut sched = FrameScheduler::new(game);
        let mut surface = CommandBuffer::new();
        sched.game_mut().player_mut().pos.y = 200.0;
        sched.game_mut().player_mut().airborne = true;

        for i in 0..120 {
            sched.frame(i as f64 * 16.0, &idle(), &mut surface);
        }
        let player = sched.game().player();
        assert_eq!(player.pos.y, 300.0 - 32.0);
        assert!(!player.airborne);
        assert_eq!(player.vel.y, 0.0);
    }

    #[test]
    fn test_clearing_levels_shows_banner_then_wins() {
        let game = Platformer::with_levels(
            PlatformerTuning::default(),
            vec![coin_at_spawn(), coin_at_spawn()],
        )
        .unwrap();
        let mut sched = FrameScheduler::new(game);
        let mut surface = CommandBuffer::new();

        assert_eq!(sched.frame(0.0, &idle(), &mut surface), FrameOutcome::Continue);
        assert_eq!(sched.game().score(), 10);
        assert_eq!(sched.game().level_number(), 2);
        assert!(sched.game().banner_visible());
        let events = sched.drain_events();
        assert!(events.contains(&GameEvent::LevelChanged(2)));
        assert!(events.contains(&GameEvent::Banner { visible: true }));

        // The banner does not stop play; the last coin wins the campaign
        let outcome = sched.frame(16.0, &idle(), &mut surface);
        assert_eq!(
            outcome,
            FrameOutcome::Halted(Terminal {
                kind: OverlayKind::Victory,
                final_score: 20,
            })
        );
        assert!(sched.game().is_won());
    }

    #[test]
    fn test_banner_hidden_by_timer() {
        let levels = vec![coin_at_spawn(), builtin_levels(450.0).remove(0)];
        let game = Platformer::with_levels(PlatformerTuning::default(), levels).unwrap();
        let mut sched = FrameScheduler::new(game);
        let mut surface = CommandBuffer::new();

        sched.frame(0.0, &idle(), &mut surface);
        assert!(sched.game().banner_visible());
        assert!(surface.commands().iter().any(|c| matches!(c, DrawCommand::Text { .. })));
        sched.drain_events();

        sched.frame(BANNER_MS - 1.0, &idle(), &mut surface);
        assert!(sched.game().banner_visible());
        sched.frame(BANNER_MS, &idle(), &mut surface);
        assert!(!sched.game().banner_visible());
        assert!(
            sched
                .drain_events()
                .contains(&GameEvent::Banner { visible: false })
        );
    }

    #[test]
    fn test_enemy_contact_and_game_over() {
        let level = Level {
            name: String::new(),
            platforms: Vec::new(),
            enemies: vec![Enemy::new(40.0, 426.0, 24.0, 24.0, 0.0, (0.0, 800.0))],
            collectibles: vec![Collectible::new(700.0, 100.0, 16.0)],
        };
        let game = Platformer::with_levels(PlatformerTuning::default(), vec![level]).unwrap();
        let mut sched = FrameScheduler::new(game);
        let mut surface = CommandBuffer::new();

        sched.frame(0.0, &idle(), &mut surface);
        assert_eq!(sched.game().lives(), 2);
        assert!(sched.game().player().invulnerable);
        sched.frame(1000.0, &idle(), &mut surface);
        assert_eq!(sched.game().lives(), 2);

        let mut now = 1000.0;
        let outcome = loop {
            now += 500.0;
            let outcome = sched.frame(now, &idle(), &mut surface);
            if outcome != FrameOutcome::Continue {
                break outcome;
            }
            assert!(now < 60_000.0);
        };
        assert!(matches!(
            outcome,
            FrameOutcome::Halted(Terminal {
                kind: OverlayKind::GameOver,
                final_score: 0,
            })
        ));

        // Halted: further frames change nothing
        sched.frame(now + 10_000.0, &idle(), &mut surface);
        assert_eq!(sched.game().lives(), 0);

        sched.reset();
        assert_eq!(sched.game().lives(), STARTING_LIVES);
        assert_eq!(sched.game().level_number(), 1);
        assert!(!sched.game().player().invulnerable);
        assert!(!sched.is_halted());
    }

    #[test]
    fn test_with_levels_rejects_empty_campaign() {
        assert!(Platformer::with_levels(PlatformerTuning::default(), Vec::new()).is_err());
    }

    #[test]
    fn test_taller_field_keeps_floor_enemies_on_the_floor() {
        let tuning = PlatformerTuning {
            field_height: 600.0,
            ..PlatformerTuning::default()
        };
        let game = Platformer::new(tuning);
        let floor_enemies = game
            .level()
            .enemies
            .iter()
            .filter(|e| e.rect.bottom() == 600.0)
            .count();
        assert_eq!(floor_enemies, 1);
        assert_eq!(game.player().bottom(), 600.0);
    }

    #[test]
    fn test_unusable_tuning_replaced_by_defaults() {
        let tuning = PlatformerTuning {
            actor_width: 0.0,
            ..PlatformerTuning::default()
        };
        let game = Platformer::new(tuning);
        assert_eq!(game.tuning(), &PlatformerTuning::default());
        assert_eq!(game.player().size.x, 24.0);
    }
}
