//! Damage with a grace window
//!
//! A hit costs one life and starts a fixed invulnerability window. Hits that
//! land inside the window are still detected (callers may score or remove on
//! them) but cost nothing and never arm a second timer.

use super::events::GameEvent;
use super::motion::Actor;
use super::scheduler::{FrameContext, TimerEvent};
use crate::consts::INVULNERABILITY_MS;

/// What a contact did to the actor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// A life was lost and the grace window started
    Damaged { lives_left: u32 },
    /// Contact during the grace window
    Ignored,
}

/// Apply a hit to the actor
pub fn on_hit(actor: &mut Actor, lives: &mut u32, ctx: &mut FrameContext<'_>) -> HitOutcome {
    if actor.invulnerable {
        return HitOutcome::Ignored;
    }

    *lives = lives.saturating_sub(1);
    actor.invulnerable = true;
    ctx.schedule(INVULNERABILITY_MS, TimerEvent::InvulnerabilityExpired);
    ctx.emit(GameEvent::LivesChanged(*lives));
    ctx.emit(GameEvent::InvulnerabilityChanged(true));
    log::debug!("Hit at {:.0}ms, {} lives left", ctx.now_ms, lives);

    HitOutcome::Damaged { lives_left: *lives }
}

/// Close the grace window (timer callback)
pub fn end_invulnerability(actor: &mut Actor, ctx: &mut FrameContext<'_>) {
    if actor.invulnerable {
        actor.invulnerable = false;
        ctx.emit(GameEvent::InvulnerabilityChanged(false));
    }
}
