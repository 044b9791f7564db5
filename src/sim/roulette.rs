//! Roulette table: stake handling around the decaying spin
//!
//! The stake is collected the moment a spin starts. When the wheel settles
//! the bet is settled against the sector under the pointer and any payout is
//! credited. The balance is written to storage after every settled spin and
//! on reset.

use std::f32::consts::FRAC_PI_2;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::events::{GameEvent, MessageTone};
use super::scheduler::{FrameContext, Game, Terminal, TimerEvent};
use super::wheel::{Bet, Category, SpinResult, SpinState, Wheel, ticks_to_rest};
use crate::consts::DEFAULT_BALANCE;
use crate::error::{BetError, BetResult};
use crate::persistence::BalanceStore;
use crate::platform::InputState;
use crate::polar_to_cartesian;
use crate::renderer::{Color, Surface, TextAlign};
use crate::tuning::WheelTuning;

/// Canvas angle of the fixed pointer (top of the wheel)
pub const POINTER_ANGLE: f32 = -FRAC_PI_2;

/// A bet waiting for the wheel to stop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PlacedBet {
    bet: Bet,
    stake: u64,
}

/// Wheel, balance and the bet in flight
pub struct Roulette<R: Rng = Pcg32> {
    wheel: Wheel,
    spin: SpinState,
    tuning: WheelTuning,
    balance: u64,
    placed: Option<PlacedBet>,
    last_result: Option<SpinResult>,
    /// Set by integrate on the frame the wheel stops
    settled: bool,
    store: BalanceStore,
    rng: R,
}

impl Roulette<Pcg32> {
    /// European wheel with a seeded RNG
    pub fn seeded(tuning: WheelTuning, store: BalanceStore, seed: u64) -> Self {
        Self::new(Wheel::european(), tuning, store, Pcg32::seed_from_u64(seed))
    }
}

impl<R: Rng> Roulette<R> {
    /// Tuning that could let a spin run forever is replaced by the defaults
    pub fn new(wheel: Wheel, tuning: WheelTuning, store: BalanceStore, rng: R) -> Self {
        let tuning = match tuning.validate() {
            Ok(()) => tuning,
            Err(e) => {
                log::warn!("{}; using default wheel tuning", e);
                WheelTuning::default()
            }
        };
        let balance = store.load();
        Self {
            wheel,
            spin: SpinState::default(),
            tuning,
            balance,
            placed: None,
            last_result: None,
            settled: false,
            store,
            rng,
        }
    }

    pub fn tuning(&self) -> &WheelTuning {
        &self.tuning
    }

    pub fn balance(&self) -> u64 {
        self.balance
    }

    pub fn wheel(&self) -> &Wheel {
        &self.wheel
    }

    pub fn spin_state(&self) -> &SpinState {
        &self.spin
    }

    pub fn is_spinning(&self) -> bool {
        self.spin.spinning
    }

    pub fn last_result(&self) -> Option<SpinResult> {
        self.last_result
    }

    /// Place a bet and start the wheel
    ///
    /// Either the stake is deducted and the wheel launched, or nothing
    /// changes. Returns the launch velocity.
    pub fn activate(&mut self, stake: i64, bet: Bet) -> BetResult<f64> {
        if self.spin.spinning {
            return Err(BetError::DuplicateActivation);
        }
        bet.validate(&self.wheel)?;
        let stake_units = u64::try_from(stake)
            .ok()
            .filter(|&s| s > 0 && s <= self.balance)
            .ok_or(BetError::InvalidStake {
                stake,
                balance: self.balance,
            })?;

        let velocity = self
            .rng
            .random_range(self.tuning.min_velocity..self.tuning.max_velocity);

        self.balance -= stake_units;
        self.placed = Some(PlacedBet {
            bet,
            stake: stake_units,
        });
        self.spin.launch(velocity);
        log::info!(
            "Spin started: {:?} for {}, v0={:.4}, settles in {} frames",
            bet,
            stake_units,
            velocity,
            ticks_to_rest(velocity, self.tuning.damping, self.tuning.stop_threshold)
        );
        Ok(velocity)
    }

    /// Settle the placed bet against the sector under the pointer
    fn settle(&mut self) -> Option<SpinResult> {
        let placed = self.placed.take()?;
        let winning_index = self.wheel.sector_at(self.spin.rotation);
        let sector = *self.wheel.sector(winning_index)?;
        let payout = placed.bet.payout(placed.stake, &sector);
        self.balance = self.balance.saturating_add(payout);

        let result = SpinResult {
            winning_index,
            winning_label: sector.label,
            winning_category: sector.category,
            payout,
        };
        self.last_result = Some(result);
        self.persist();
        log::info!(
            "Spin settled on {} ({:?}) at index {}, payout {}, balance {}",
            sector.label,
            sector.category,
            winning_index,
            payout,
            self.balance
        );
        Some(result)
    }

    /// Balance back to the default; cancels any spin in flight
    pub fn reset_balance(&mut self) -> u64 {
        self.balance = DEFAULT_BALANCE;
        self.placed = None;
        self.spin.velocity = 0.0;
        self.spin.spinning = false;
        self.settled = false;
        self.last_result = None;
        self.persist();
        self.balance
    }

    fn persist(&mut self) {
        if let Err(e) = self.store.save(self.balance) {
            log::warn!("Failed to save balance: {}", e);
        }
    }
}

/// Fill colour for a sector
pub fn category_color(category: Category) -> Color {
    match category {
        Category::Red => Color::RED,
        Category::Black => Color::BLACK,
        Category::Green => Color::GREEN,
    }
}

impl<R: Rng> Game for Roulette<R> {
    fn read_input(&mut self, _input: &InputState) {}

    fn integrate(&mut self, _ctx: &mut FrameContext<'_>) {
        self.settled = self.spin.step(&self.tuning);
    }

    fn resolve(&mut self, ctx: &mut FrameContext<'_>) {
        if !std::mem::take(&mut self.settled) {
            return;
        }
        let Some(result) = self.settle() else {
            return;
        };
        let (text, tone) = if result.payout > 0 {
            (
                format!("You win! The winning number is {}.", result.winning_label),
                MessageTone::Win,
            )
        } else {
            (
                format!(
                    "Sorry, you lost. The winning number is {}.",
                    result.winning_label
                ),
                MessageTone::Loss,
            )
        };
        ctx.emit(GameEvent::SpinResolved(result));
        ctx.emit(GameEvent::BalanceChanged(self.balance));
        ctx.emit(GameEvent::Message { text, tone });
    }

    fn terminal(&self) -> Option<Terminal> {
        None
    }

    fn render(&self, surface: &mut dyn Surface) {
        let size = self.tuning.size;
        let center = Vec2::splat(size / 2.0);
        let radius = size / 2.0;
        let arc = self.wheel.sector_width() as f32;
        // Only the wrapped angle matters for drawing
        let rotation = crate::wrap_angle(self.spin.rotation) as f32;

        for (i, sector) in self.wheel.sectors().iter().enumerate() {
            let start = POINTER_ANGLE + i as f32 * arc + rotation;
            surface.fill_sector(center, radius, start, start + arc, category_color(sector.category));

            let mid = start + arc / 2.0;
            surface.draw_text(
                &sector.label.to_string(),
                polar_to_cartesian(center, radius - 15.0, mid),
                mid,
                14.0,
                TextAlign::Right,
                Color::WHITE,
            );
        }

        // Pointer wedge opening upward from just inside the rim
        surface.fill_sector(
            Vec2::new(center.x, 10.0),
            10.0,
            POINTER_ANGLE - 0.5,
            POINTER_ANGLE + 0.5,
            Color::WHITE,
        );
    }

    fn on_timer(&mut self, _event: TimerEvent, _ctx: &mut FrameContext<'_>) {}

    fn hud(&self) -> Vec<GameEvent> {
        vec![GameEvent::BalanceChanged(self.balance)]
    }

    fn reset(&mut self) {
        self.reset_balance();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{BALANCE_KEY, KeyValueStore, MemoryStore};
    use crate::renderer::{CommandBuffer, DrawCommand};
    use crate::sim::scheduler::{FrameOutcome, FrameScheduler};
    use crate::sim::wheel::Parity;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Memory store whose contents stay visible to the test
    #[derive(Clone, Default)]
    struct SharedStore(Rc<RefCell<MemoryStore>>);

    impl KeyValueStore for SharedStore {
        fn get(&self, key: &str) -> Option<String> {
            self.0.borrow().get(key)
        }
        fn set(
            &mut self,
            key: &str,
            value: &str,
        ) -> Result<(), crate::persistence::PersistError> {
            self.0.borrow_mut().set(key, value)
        }
    }

    fn table(seed: u64) -> Roulette {
        Roulette::seeded(WheelTuning::default(), BalanceStore::in_memory(), seed)
    }

    /// Tick until the wheel settles, returning the emitted events
    fn run_to_rest(sched: &mut FrameScheduler<Roulette>) -> Vec<GameEvent> {
        let mut surface = CommandBuffer::new();
        let input = InputState::default();
        let mut now = 0.0;
        while sched.game().is_spinning() {
            now += 16.0;
            assert_eq!(sched.frame(now, &input, &mut surface), FrameOutcome::Continue);
            assert!(now < 1.0e6, "spin never settled");
        }
        sched.drain_events()
    }

    #[test]
    fn test_rejected_stake_leaves_balance() {
        let mut t = table(1);
        assert_eq!(t.balance(), 1000);
        for stake in [0, -5, 1001] {
            let err = t.activate(stake, Bet::Color(Category::Red)).unwrap_err();
            assert!(matches!(err, BetError::InvalidStake { .. }));
            assert_eq!(t.balance(), 1000);
            assert!(!t.is_spinning());
        }
    }

    #[test]
    fn test_invalid_selection_checked_before_stake() {
        let mut t = table(1);
        let err = t.activate(5000, Bet::Number(40)).unwrap_err();
        assert!(matches!(err, BetError::InvalidSelection(_)));
        assert_eq!(t.balance(), 1000);
    }

    #[test]
    fn test_duplicate_activation_ignored() {
        let mut t = table(1);
        t.activate(100, Bet::Parity(Parity::Even)).unwrap();
        assert_eq!(t.balance(), 900);
        assert_eq!(
            t.activate(100, Bet::Parity(Parity::Even)),
            Err(BetError::DuplicateActivation)
        );
        assert_eq!(t.balance(), 900);
    }

    #[test]
    fn test_launch_velocity_in_range() {
        let mut t = table(42);
        let v = t.activate(10, Bet::Number(7)).unwrap();
        let tuning = WheelTuning::default();
        assert!(v >= tuning.min_velocity && v < tuning.max_velocity);
    }

    #[test]
    fn test_full_spin_settles_once_and_pays() {
        let mut sched = FrameScheduler::new(table(7));
        sched.game_mut().activate(10, Bet::Number(0)).unwrap();
        let events = run_to_rest(&mut sched);

        let results: Vec<SpinResult> = events
            .iter()
            .filter_map(|e| match e {
                GameEvent::SpinResolved(r) => Some(*r),
                _ => None,
            })
            .collect();
        assert_eq!(results.len(), 1);
        let result = results[0];

        let game = sched.game();
        let expected_index = game.wheel().sector_at(game.spin_state().rotation);
        assert_eq!(result.winning_index, expected_index);
        if result.winning_index == 0 {
            assert_eq!(result.payout, 350);
            assert_eq!(game.balance(), 1340);
        } else {
            assert_eq!(result.payout, 0);
            assert_eq!(game.balance(), 990);
        }
        assert!(events.contains(&GameEvent::BalanceChanged(game.balance())));

        // Further frames do nothing
        let mut surface = CommandBuffer::new();
        sched.frame(1.0e7, &InputState::default(), &mut surface);
        assert!(sched.drain_events().is_empty());
    }

    #[test]
    fn test_zero_bet_pays_on_zero() {
        // Force the pointer over sector 0
        let mut t = table(3);
        t.activate(10, Bet::Number(0)).unwrap();
        t.spin.rotation = -0.5 * t.wheel.sector_width();
        t.spin.spinning = false;
        let result = t.settle().unwrap();
        assert_eq!(result.winning_index, 0);
        assert_eq!(result.winning_label, 0);
        assert_eq!(result.winning_category, Category::Green);
        assert_eq!(result.payout, 350);
        assert_eq!(t.balance(), 1340);
        // Nothing left to settle
        assert!(t.settle().is_none());
    }

    #[test]
    fn test_same_seed_same_outcome() {
        let mut a = FrameScheduler::new(table(99));
        let mut b = FrameScheduler::new(table(99));
        a.game_mut().activate(50, Bet::Color(Category::Black)).unwrap();
        b.game_mut().activate(50, Bet::Color(Category::Black)).unwrap();
        run_to_rest(&mut a);
        run_to_rest(&mut b);
        assert_eq!(a.game().last_result(), b.game().last_result());
        assert_eq!(a.game().balance(), b.game().balance());
    }

    #[test]
    fn test_balance_persisted_after_spin_and_reset() {
        let shared = SharedStore::default();
        let store = BalanceStore::new(Box::new(shared.clone()));
        let mut sched = FrameScheduler::new(Roulette::seeded(WheelTuning::default(), store, 5));
        sched.game_mut().activate(100, Bet::Parity(Parity::Odd)).unwrap();
        run_to_rest(&mut sched);

        let saved = BalanceStore::new(Box::new(shared.clone())).try_load().unwrap();
        assert_eq!(saved, Some(sched.game().balance()));

        shared.0.borrow_mut().set(BALANCE_KEY, "0").unwrap();
        sched.reset();
        assert_eq!(sched.game().balance(), DEFAULT_BALANCE);
        let saved = BalanceStore::new(Box::new(shared)).try_load().unwrap();
        assert_eq!(saved, Some(DEFAULT_BALANCE));
    }

    #[test]
    fn test_reset_cancels_spin_without_refund() {
        let mut t = table(1);
        t.activate(300, Bet::Color(Category::Red)).unwrap();
        assert_eq!(t.reset_balance(), DEFAULT_BALANCE);
        assert!(!t.is_spinning());
        assert!(t.settle().is_none());
    }

    #[test]
    fn test_render_draws_every_sector_and_pointer() {
        let t = table(1);
        let mut surface = CommandBuffer::new();
        t.render(&mut surface);
        let sectors = surface
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::Sector { .. }))
            .count();
        let labels = surface
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::Text { .. }))
            .count();
        assert_eq!(sectors, 38);
        assert_eq!(labels, 37);

        // Sector 0 starts at the pointer when the wheel is at rest
        match &surface.commands()[0] {
            DrawCommand::Sector { start, color, .. } => {
                assert!((start - POINTER_ANGLE).abs() < 1e-6);
                assert_eq!(*color, Color::GREEN);
            }
            other => panic!("unexpected first command {:?}", other),
        }
    }

    #[test]
    fn test_runaway_tuning_replaced_by_defaults() {
        let tuning = WheelTuning {
            damping: 1.0,
            ..WheelTuning::default()
        };
        let t = Roulette::seeded(tuning, BalanceStore::in_memory(), 1);
        assert_eq!(t.tuning(), &WheelTuning::default());
    }
}
