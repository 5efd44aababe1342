//=========================================================================
// Entities & Pawns
//=========================================================================
//
// Gameplay-facing traits.
//
// An `Entity` is anything a Level owns and drives through the per-frame
// lifecycle. A `Pawn` is an entity that also receives input; it exposes
// itself through `Entity::as_pawn_mut` so the input router can reach it
// by id without knowing its concrete type.
//
// Lifecycle (per entity):
// ```text
//   init(physics)          once, when its level is first initialized
//   update(ctx)            every frame while its level is active
//   draw(renderer)         every frame while its level is active
//   is_alive() == false    → clear(physics) + removal at refresh
//   clear(physics)         before the level is dropped
// ```
//
//=========================================================================

//=== Internal Dependencies ===============================================

use super::command_queue::LevelCommandQueue;
use crate::core::assets::AssetManager;
use crate::core::input::event::{ControllerButton, KeyCode};
use crate::core::input::state_tracker::{ControllerState, KeyboardState};
use crate::core::physics::PhysicsWorld;
use crate::core::render::Renderer;

//=== EntityId ============================================================

/// Engine-wide unique entity identifier.
///
/// Allocated monotonically by the level registry; never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

//=== FrameContext ========================================================

/// Everything an entity may touch during `update()`.
pub struct FrameContext<'a> {
    /// Seconds since the previous frame (measured, not the physics step).
    pub delta_time: f32,

    /// Index of the current frame, starting at 0.
    pub frame: u64,

    /// Already stepped for this frame.
    pub physics: &'a mut PhysicsWorld,

    pub assets: &'a AssetManager,

    /// Level commands, applied by the engine at the end of the frame.
    pub commands: &'a mut LevelCommandQueue,
}

//=== Entity ==============================================================

/// Object owned by a Level.
///
/// Only `update()` is required; everything else has an empty default.
pub trait Entity {
    /// Creates physics bodies and other per-entity resources.
    fn init(&mut self, _physics: &mut PhysicsWorld) {}

    fn update(&mut self, ctx: &mut FrameContext<'_>);

    fn draw(&self, _renderer: &mut dyn Renderer) {}

    /// Entities reporting `false` are cleared and removed at refresh.
    fn is_alive(&self) -> bool {
        true
    }

    /// Releases physics bodies and other per-entity resources.
    fn clear(&mut self, _physics: &mut PhysicsWorld) {}

    /// Input-receiving view of this entity, if it is a pawn.
    fn as_pawn_mut(&mut self) -> Option<&mut dyn Pawn> {
        None
    }

    /// Short label used in logs.
    fn label(&self) -> &str {
        "entity"
    }
}

//=== Pawn ================================================================

/// Input hooks of a player-controlled entity.
///
/// Edge hooks fire immediately while events are drained; the poll hooks
/// fire once per frame afterwards. Pawns typically record intent here and
/// apply it to physics in `Entity::update`.
pub trait Pawn {
    //--- Edge Events ------------------------------------------------------

    fn on_key_down(&mut self, _key: KeyCode) {}

    fn on_key_up(&mut self, _key: KeyCode) {}

    fn on_button_down(&mut self, _button: ControllerButton, _controller: &ControllerState) {}

    fn on_button_up(&mut self, _button: ControllerButton, _controller: &ControllerState) {}

    /// Named action edge, fired after the raw key/button hook when the
    /// input is bound in the action map.
    fn on_action(&mut self, _action: &str, _pressed: bool) {}

    //--- Continuous Poll --------------------------------------------------

    /// Held keyboard state (keyboard pawn only).
    fn check_key_state(&mut self, _keyboard: &KeyboardState) {}

    /// Axis and held-button state of the pawn's bound controller.
    fn on_axis_motion(&mut self, _controller: &ControllerState) {}
}
