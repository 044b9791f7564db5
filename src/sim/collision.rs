//! Collision detection and response for rectangles and circles
//!
//! Two shape pairs matter: the actor against rectangles (platforms, enemies,
//! collectibles) and the actor against circles (falling obstacles).

use super::geometry::{Circle, Rect};
use super::motion::Actor;

/// Result of resolving the actor against a rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Contact {
    /// The shapes overlapped this frame
    pub overlap: bool,
    /// The actor was snapped onto the rectangle's top edge
    pub landed: bool,
}

impl Contact {
    pub fn miss() -> Self {
        Self::default()
    }
}

/// Separating-axis overlap test for two rectangles
///
/// Edges that merely touch do not overlap.
#[inline]
pub fn rects_overlap(a: &Rect, b: &Rect) -> bool {
    a.left() < b.right() && a.right() > b.left() && a.top() < b.bottom() && a.bottom() > b.top()
}

/// Resolve the actor against a solid platform
///
/// A falling actor whose bottom edge has entered the platform's vertical band
/// is put down on top of it. Anything else is reported as a plain overlap.
pub fn resolve_rect_rect(actor: &mut Actor, platform: &Rect) -> Contact {
    if !rects_overlap(&actor.rect(), platform) {
        return Contact::miss();
    }

    let bottom = actor.bottom();
    let falling = actor.vel.y >= 0.0;
    let in_top_band = bottom >= platform.top() && bottom <= platform.bottom();

    if falling && in_top_band {
        actor.land_on(platform.top());
        return Contact {
            overlap: true,
            landed: true,
        };
    }

    Contact {
        overlap: true,
        landed: false,
    }
}

/// Rectangle vs circle test (inclusive: touching counts)
///
/// Works on center distances per axis so it only needs the first quadrant:
/// 1. too far on either axis: miss
/// 2. circle center within the rectangle's span on either axis: hit
/// 3. otherwise only the corner is left, compare squared distance to it
pub fn rect_circle_collision(rect: &Rect, circle: &Circle) -> bool {
    let half = rect.half_extents();
    let center = rect.center();
    let dist_x = (circle.center.x - center.x).abs();
    let dist_y = (circle.center.y - center.y).abs();

    if dist_x > half.x + circle.radius || dist_y > half.y + circle.radius {
        return false;
    }

    if dist_x <= half.x || dist_y <= half.y {
        return true;
    }

    let dx = dist_x - half.x;
    let dy = dist_y - half.y;
    dx * dx + dy * dy <= circle.radius * circle.radius
}
