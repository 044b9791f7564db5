//! Cooperative frame scheduler
//!
//! One `frame` call is one tick: due timers, input, integrate, resolve,
//! terminal check, render. The caller only asks for another animation frame
//! when `frame` returns `Continue`, so ticks can never overlap. Once a game
//! reports a terminal condition the scheduler halts and ignores frames until
//! `reset` or `resume_with` is called.
//!
//! Delayed effects (invulnerability expiry, banners) go through a wall-clock
//! timer queue. Each timer carries the epoch it was armed in; a reset bumps
//! the epoch, so timers from a torn-down run fire as no-ops.

use super::events::{GameEvent, OverlayKind};
use crate::platform::InputState;
use crate::renderer::Surface;

/// Delayed effects a game can arm
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// End of a post-hit grace window
    InvulnerabilityExpired,
    /// Hide the "level cleared" banner
    HideBanner,
}

/// A queued timer
#[derive(Debug, Clone, PartialEq)]
pub struct PendingTimer {
    pub due_ms: f64,
    pub epoch: u64,
    pub event: TimerEvent,
}

/// Single-shot timers ordered by due time
#[derive(Debug, Default)]
pub struct TimerQueue {
    pending: Vec<PendingTimer>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, timer: PendingTimer) {
        // Keep sorted; equal due times fire in arming order
        let idx = self.pending.partition_point(|t| t.due_ms <= timer.due_ms);
        self.pending.insert(idx, timer);
    }

    /// Remove and return every timer due at or before `now_ms`
    pub fn drain_due(&mut self, now_ms: f64) -> Vec<PendingTimer> {
        let split = self.pending.partition_point(|t| t.due_ms <= now_ms);
        self.pending.drain(..split).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Per-frame handle given to game code
pub struct FrameContext<'a> {
    /// Wall-clock time of this frame (ms)
    pub now_ms: f64,
    epoch: u64,
    timers: &'a mut TimerQueue,
    events: &'a mut Vec<GameEvent>,
}

impl<'a> FrameContext<'a> {
    pub fn new(
        now_ms: f64,
        epoch: u64,
        timers: &'a mut TimerQueue,
        events: &'a mut Vec<GameEvent>,
    ) -> Self {
        Self {
            now_ms,
            epoch,
            timers,
            events,
        }
    }

    /// Arm a single-shot timer `delay_ms` from now
    pub fn schedule(&mut self, delay_ms: f64, event: TimerEvent) {
        self.timers.push(PendingTimer {
            due_ms: self.now_ms + delay_ms,
            epoch: self.epoch,
            event,
        });
    }

    /// Queue a display notification
    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }
}

/// Why a game stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Terminal {
    pub kind: OverlayKind,
    pub final_score: u64,
}

/// What the caller should do after a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Request the next frame
    Continue,
    /// Stop requesting frames until reset
    Halted(Terminal),
}

/// A game the scheduler can drive
pub trait Game {
    /// Stage 1: latch the current input state (never blocks)
    fn read_input(&mut self, input: &InputState);
    /// Stage 2: advance positions, velocities and spins by one frame
    fn integrate(&mut self, ctx: &mut FrameContext<'_>);
    /// Stage 3: collisions, pickups, outcomes
    fn resolve(&mut self, ctx: &mut FrameContext<'_>);
    /// Stage 4: `Some` halts the loop
    fn terminal(&self) -> Option<Terminal>;
    /// Stage 5: draw the current state
    fn render(&self, surface: &mut dyn Surface);
    /// A timer armed by this run came due
    fn on_timer(&mut self, event: TimerEvent, ctx: &mut FrameContext<'_>);
    /// Current values for every display sink
    fn hud(&self) -> Vec<GameEvent>;
    /// Back to the initial state
    fn reset(&mut self);
}

/// Drives a `Game` one frame at a time
pub struct FrameScheduler<G: Game> {
    game: G,
    timers: TimerQueue,
    events: Vec<GameEvent>,
    epoch: u64,
    halted: Option<Terminal>,
    frames: u64,
}

impl<G: Game> FrameScheduler<G> {
    pub fn new(game: G) -> Self {
        Self {
            game,
            timers: TimerQueue::new(),
            events: Vec::new(),
            epoch: 0,
            halted: None,
            frames: 0,
        }
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    /// Mutable access for actions outside the frame loop (button presses).
    /// Timers armed from here use the current epoch.
    pub fn game_mut(&mut self) -> &mut G {
        &mut self.game
    }

    pub fn is_halted(&self) -> bool {
        self.halted.is_some()
    }

    pub fn halted(&self) -> Option<Terminal> {
        self.halted
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Frames actually simulated (halted frames don't count)
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Run one tick
    pub fn frame(
        &mut self,
        now_ms: f64,
        input: &InputState,
        surface: &mut dyn Surface,
    ) -> FrameOutcome {
        if let Some(terminal) = self.halted {
            return FrameOutcome::Halted(terminal);
        }
        self.frames += 1;

        let due = self.timers.drain_due(now_ms);
        let mut ctx = FrameContext::new(now_ms, self.epoch, &mut self.timers, &mut self.events);

        for timer in due {
            if timer.epoch != ctx.epoch {
                log::trace!(
                    "Dropping stale {:?} from epoch {} (current {})",
                    timer.event,
                    timer.epoch,
                    ctx.epoch
                );
                continue;
            }
            self.game.on_timer(timer.event, &mut ctx);
        }

        self.game.read_input(input);
        self.game.integrate(&mut ctx);
        self.game.resolve(&mut ctx);

        let terminal = self.game.terminal();
        if let Some(t) = terminal {
            log::info!("Halting: {:?} with final score {}", t.kind, t.final_score);
            ctx.emit(GameEvent::Overlay {
                kind: t.kind,
                final_score: t.final_score,
            });
        }

        surface.clear();
        self.game.render(surface);

        match terminal {
            Some(t) => {
                self.halted = Some(t);
                FrameOutcome::Halted(t)
            }
            None => FrameOutcome::Continue,
        }
    }

    /// Run an external action, invalidate old timers and restart the loop
    pub fn resume_with(&mut self, action: impl FnOnce(&mut G)) {
        self.epoch += 1;
        action(&mut self.game);
        if self.halted.take().is_some() {
            self.events.push(GameEvent::OverlayHidden);
        }
        self.events.extend(self.game.hud());
        log::debug!("Scheduler resumed at epoch {}", self.epoch);
    }

    /// Restart the game from scratch
    pub fn reset(&mut self) {
        self.resume_with(G::reset);
    }

    /// Take the notifications produced since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{CommandBuffer, Color, DrawCommand};

    /// Counts down and halts at zero; records stage order
    #[derive(Default)]
    struct Countdown {
        remaining: u32,
        stages: Vec<&'static str>,
        timer_hits: u32,
    }

    impl Game for Countdown {
        fn read_input(&mut self, _input: &InputState) {
            self.stages.push("input");
        }
        fn integrate(&mut self, ctx: &mut FrameContext<'_>) {
            self.stages.push("integrate");
            if self.remaining == 3 {
                ctx.schedule(100.0, TimerEvent::HideBanner);
            }
        }
        fn resolve(&mut self, _ctx: &mut FrameContext<'_>) {
            self.stages.push("resolve");
            self.remaining = self.remaining.saturating_sub(1);
        }
        fn terminal(&self) -> Option<Terminal> {
            (self.remaining == 0).then_some(Terminal {
                kind: OverlayKind::GameOver,
                final_score: 7,
            })
        }
        fn render(&self, surface: &mut dyn Surface) {
            surface.fill_rect(0.0, 0.0, 1.0, 1.0, Color::WHITE);
        }
        fn on_timer(&mut self, _event: TimerEvent, _ctx: &mut FrameContext<'_>) {
            self.stages.push("timer");
            self.timer_hits += 1;
        }
        fn hud(&self) -> Vec<GameEvent> {
            Vec::new()
        }
        fn reset(&mut self) {
            self.remaining = 3;
        }
    }

    fn countdown() -> FrameScheduler<Countdown> {
        FrameScheduler::new(Countdown {
            remaining: 3,
            ..Default::default()
        })
    }

    #[test]
    fn test_stage_order() {
        let mut sched = countdown();
        let mut surface = CommandBuffer::new();
        sched.frame(0.0, &InputState::default(), &mut surface);
        assert_eq!(sched.game().stages, ["input", "integrate", "resolve"]);
        assert_eq!(surface.commands()[0], DrawCommand::Clear);
        assert_eq!(surface.commands().len(), 2);
    }

    #[test]
    fn test_halts_and_stops_mutating() {
        let mut sched = countdown();
        let mut surface = CommandBuffer::new();
        let input = InputState::default();

        assert_eq!(sched.frame(0.0, &input, &mut surface), FrameOutcome::Continue);
        assert_eq!(sched.frame(16.0, &input, &mut surface), FrameOutcome::Continue);
        let outcome = sched.frame(32.0, &input, &mut surface);
        assert!(matches!(outcome, FrameOutcome::Halted(t) if t.final_score == 7));
        assert!(
            sched
                .drain_events()
                .contains(&GameEvent::Overlay {
                    kind: OverlayKind::GameOver,
                    final_score: 7
                })
        );

        let stages_before = sched.game().stages.len();
        surface.take();
        assert!(matches!(
            sched.frame(500.0, &input, &mut surface),
            FrameOutcome::Halted(_)
        ));
        assert_eq!(sched.game().stages.len(), stages_before);
        assert!(surface.commands().is_empty());
        assert_eq!(sched.frames(), 3);
        // Timer came due while halted but was never delivered
        assert_eq!(sched.game().timer_hits, 0);
    }

    #[test]
    fn test_reset_restarts_and_drops_stale_timers() {
        let mut sched = countdown();
        let mut surface = CommandBuffer::new();
        let input = InputState::default();

        // Arms a timer due at 100ms
        sched.frame(0.0, &input, &mut surface);
        assert_eq!(sched.pending_timers(), 1);

        sched.reset();
        assert!(!sched.is_halted());
        assert_eq!(sched.epoch(), 1);

        // Timer from epoch 0 is due but must not reach the game.
        // The reset game arms a fresh one (remaining == 3 again).
        sched.frame(150.0, &input, &mut surface);
        assert_eq!(sched.game().timer_hits, 0);
        assert_eq!(sched.pending_timers(), 1);

        sched.frame(300.0, &input, &mut surface);
        assert_eq!(sched.game().timer_hits, 1);
    }

    #[test]
    fn test_resume_hides_overlay() {
        let mut sched = countdown();
        let mut surface = CommandBuffer::new();
        let input = InputState::default();
        for t in 0..3 {
            sched.frame(t as f64 * 16.0, &input, &mut surface);
        }
        assert!(sched.is_halted());
        sched.drain_events();
        sched.resume_with(|g| g.remaining = 1);
        assert_eq!(sched.drain_events(), vec![GameEvent::OverlayHidden]);
        assert_eq!(
            sched.frame(100.0, &input, &mut surface),
            FrameOutcome::Halted(Terminal {
                kind: OverlayKind::GameOver,
                final_score: 7
            })
        );
    }

    #[test]
    fn test_timer_queue_order() {
        let mut q = TimerQueue::new();
        for (due, event) in [
            (30.0, TimerEvent::HideBanner),
            (10.0, TimerEvent::InvulnerabilityExpired),
            (30.0, TimerEvent::InvulnerabilityExpired),
        ] {
            q.push(PendingTimer {
                due_ms: due,
                epoch: 0,
                event,
            });
        }
        assert!(q.drain_due(5.0).is_empty());
        let due: Vec<_> = q.drain_due(30.0).into_iter().map(|t| t.event).collect();
        assert_eq!(
            due,
            [
                TimerEvent::InvulnerabilityExpired,
                TimerEvent::HideBanner,
                TimerEvent::InvulnerabilityExpired
            ]
        );
        assert!(q.is_empty());
    }
}
