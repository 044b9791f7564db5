//! 2D drawing surface
//!
//! Games draw through the `Surface` trait only: filled rectangles, circles,
//! circular sectors and rotated text. The browser front end implements it on
//! a canvas 2D context; `CommandBuffer` records calls for native runs and
//! tests.

pub mod commands;

pub use commands::{CommandBuffer, DrawCommand};

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// RGBA colour, 8 bits per channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const RED: Color = Color::rgb(220, 38, 38);
    pub const GREEN: Color = Color::rgb(22, 163, 74);
    pub const GOLD: Color = Color::rgb(234, 179, 8);
    pub const SKY: Color = Color::rgb(125, 211, 252);
    pub const SLATE: Color = Color::rgb(71, 85, 105);
    pub const PURPLE: Color = Color::rgb(147, 51, 234);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Same colour with a new alpha
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// CSS `rgba(...)` string for canvas fill styles
    pub fn to_css(self) -> String {
        format!(
            "rgba({}, {}, {}, {:.3})",
            self.r,
            self.g,
            self.b,
            self.a as f32 / 255.0
        )
    }
}

/// Horizontal anchor for text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// Minimal drawing API the games need
pub trait Surface {
    /// Wipe the whole surface
    fn clear(&mut self);

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Color);

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color);

    /// Pie slice from `start` to `end` (radians, canvas orientation)
    fn fill_sector(&mut self, center: Vec2, radius: f32, start: f32, end: f32, color: Color);

    /// Text at `pos`, rotated by `rotation` radians around `pos`
    fn draw_text(
        &mut self,
        text: &str,
        pos: Vec2,
        rotation: f32,
        size_px: f32,
        align: TextAlign,
        color: Color,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css_colour() {
        assert_eq!(Color::rgb(1, 2, 3).to_css(), "rgba(1, 2, 3, 1.000)");
        assert_eq!(Color::BLACK.with_alpha(0).to_css(), "rgba(0, 0, 0, 0.000)");
    }
}
