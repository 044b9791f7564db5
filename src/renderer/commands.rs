//! Recording surface

use glam::Vec2;

use super::{Color, Surface, TextAlign};

/// One recorded draw call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear,
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Color,
    },
    Circle {
        center: Vec2,
        radius: f32,
        color: Color,
    },
    Sector {
        center: Vec2,
        radius: f32,
        start: f32,
        end: f32,
        color: Color,
    },
    Text {
        text: String,
        pos: Vec2,
        rotation: f32,
        size_px: f32,
        align: TextAlign,
        color: Color,
    },
}

/// Surface that stores every call in order
#[derive(Debug, Default)]
pub struct CommandBuffer {
    commands: Vec<DrawCommand>,
}

impl CommandBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Hand over the recorded frame and start empty
    pub fn take(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }
}

impl Surface for CommandBuffer {
    fn clear(&mut self) {
        self.commands.push(DrawCommand::Clear);
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Color) {
        self.commands.push(DrawCommand::Rect {
            x,
            y,
            width,
            height,
            color,
        });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            color,
        });
    }

    fn fill_sector(&mut self, center: Vec2, radius: f32, start: f32, end: f32, color: Color) {
        self.commands.push(DrawCommand::Sector {
            center,
            radius,
            start,
            end,
            color,
        });
    }

    fn draw_text(
        &mut self,
        text: &str,
        pos: Vec2,
        rotation: f32,
        size_px: f32,
        align: TextAlign,
        color: Color,
    ) {
        self.commands.push(DrawCommand::Text {
            text: text.to_owned(),
            pos,
            rotation,
            size_px,
            align,
            color,
        });
    }
}
