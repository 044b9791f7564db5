//! Per-frame motion integration
//!
//! One call advances exactly one frame. There is no variable-timestep
//! compensation: a dropped animation frame simply means the world moved one
//! step instead of two.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::{Bounds, Rect};

/// The player-controlled body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    /// Velocity in px/frame
    pub vel: Vec2,
    /// Not supported by the floor or a platform
    pub airborne: bool,
    /// Inside a post-hit grace window
    pub invulnerable: bool,
}

impl Actor {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(width, height),
            vel: Vec2::ZERO,
            airborne: false,
            invulnerable: false,
        }
    }

    /// Current bounding rectangle
    #[inline]
    pub fn rect(&self) -> Rect {
        Rect {
            pos: self.pos,
            size: self.size,
        }
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    /// Put the actor down on a surface whose top edge is at `surface_y`
    pub fn land_on(&mut self, surface_y: f32) {
        self.pos.y = surface_y - self.size.y;
        self.vel.y = 0.0;
        self.airborne = false;
    }
}

/// Apply gravity, then move by velocity
pub fn integrate(actor: &mut Actor, gravity: f32) {
    actor.vel.y += gravity;
    actor.pos += actor.vel;
    if gravity > 0.0 {
        // Falling until the floor or a platform says otherwise
        actor.airborne = true;
    }
}

/// Keep the actor inside the field; touching the floor lands it
pub fn clamp_to_bounds(actor: &mut Actor, bounds: Bounds) {
    let max_x = (bounds.width - actor.size.x).max(0.0);
    actor.pos.x = actor.pos.x.clamp(0.0, max_x);

    let floor = (bounds.height - actor.size.y).max(0.0);
    if actor.pos.y >= floor {
        actor.land_on(bounds.height);
    } else if actor.pos.y < 0.0 {
        actor.pos.y = 0.0;
        actor.vel.y = actor.vel.y.max(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integrate_applies_gravity_before_moving() {
        let mut actor = Actor::new(0.0, 100.0, 10.0, 10.0);
        integrate(&mut actor, 0.5);
        assert_eq!(actor.vel.y, 0.5);
        assert_eq!(actor.pos.y, 100.5);
        assert!(actor.airborne);

        integrate(&mut actor, 0.5);
        assert_eq!(actor.vel.y, 1.0);
        assert_eq!(actor.pos.y, 101.5);
    }

    #[test]
    fn test_integrate_without_gravity_keeps_ground_state() {
        let mut actor = Actor::new(0.0, 0.0, 10.0, 10.0);
        actor.vel.x = 5.0;
        integrate(&mut actor, 0.0);
        assert_eq!(actor.pos.x, 5.0);
        assert!(!actor.airborne);
    }

    #[test]
    fn test_clamp_horizontal() {
        let bounds = Bounds::new(100.0, 100.0);
        let mut actor = Actor::new(-4.0, 0.0, 10.0, 10.0);
        clamp_to_bounds(&mut actor, bounds);
        assert_eq!(actor.pos.x, 0.0);

        actor.pos.x = 95.0;
        clamp_to_bounds(&mut actor, bounds);
        assert_eq!(actor.pos.x, 90.0);
    }

    #[test]
    fn test_clamp_floor_lands() {
        let bounds = Bounds::new(100.0, 100.0);
        let mut actor = Actor::new(0.0, 93.0, 10.0, 10.0);
        actor.vel.y = 3.0;
        actor.airborne = true;
        clamp_to_bounds(&mut actor, bounds);
        assert_eq!(actor.pos.y, 90.0);
        assert_eq!(actor.vel.y, 0.0);
        assert!(!actor.airborne);
    }

    #[test]
    fn test_clamp_ceiling_stops_rise() {
        let bounds = Bounds::new(100.0, 100.0);
        let mut actor = Actor::new(0.0, -3.0, 10.0, 10.0);
        actor.vel.y = -6.0;
        actor.airborne = true;
        clamp_to_bounds(&mut actor, bounds);
        assert_eq!(actor.pos.y, 0.0);
        assert_eq!(actor.vel.y, 0.0);
        assert!(actor.airborne);
    }
}
