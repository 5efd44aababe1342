//=========================================================================
// Render Interface
//=========================================================================
//
// Draw backend contract used by `Level::draw`, plus the `DrawList`
// recorder the engine hands to the active level every frame.
//
// Flow:
//   Level::draw(&mut DrawList) → PlatformBackend::present(&DrawList)
//
// The draw-call pipeline itself lives in the backend; the core only
// records what each entity asked for, in submission order.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use crate::core::assets::TextureId;

//=== DrawCommand =========================================================

/// RGBA color, 8 bits per channel.
pub type Color = [u8; 4];

/// One recorded draw request. Positions and sizes are in world units.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Textured quad centered on `position`.
    Sprite {
        texture: TextureId,
        position: [f32; 2],
        size: [f32; 2],
        rotation: f32,
    },

    /// Solid axis-aligned rectangle centered on `position`.
    Rect {
        position: [f32; 2],
        size: [f32; 2],
        color: Color,
    },

    /// Solid circle.
    Circle {
        center: [f32; 2],
        radius: f32,
        color: Color,
    },
}

//=== Renderer ============================================================

/// Draw backend invoked by entities during `Level::draw`.
pub trait Renderer {
    /// Records or executes one draw command.
    fn submit(&mut self, command: DrawCommand);

    fn draw_sprite(&mut self, texture: TextureId, position: [f32; 2], size: [f32; 2], rotation: f32) {
        self.submit(DrawCommand::Sprite {
            texture,
            position,
            size,
            rotation,
        });
    }

    fn fill_rect(&mut self, position: [f32; 2], size: [f32; 2], color: Color) {
        self.submit(DrawCommand::Rect { position, size, color });
    }

    fn fill_circle(&mut self, center: [f32; 2], radius: f32, color: Color) {
        self.submit(DrawCommand::Circle { center, radius, color });
    }
}

//=== DrawList ============================================================

/// Per-frame recording of draw commands.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawList {
    commands: Vec<DrawCommand>,
    clear_color: Color,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empties the list for a new frame, keeping the clear color.
    pub fn reset(&mut self) {
        self.commands.clear();
    }

    pub fn set_clear_color(&mut self, color: Color) {
        self.clear_color = color;
    }

    pub fn clear_color(&self) -> Color {
        self.clear_color
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl Renderer for DrawList {
    fn submit(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
