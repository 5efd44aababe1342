//=========================================================================
// Input System
//
// Routing of keyboard and controller input to gameplay pawns.
//
// Responsibilities:
// - Represent platform input portably (`event`)
// - Track held keys, buttons and axes per device (`state_tracker`)
// - Bind keys and buttons to named actions (`action_map`)
// - Associate pawns with controllers in registration order (`binding`)
// - Dispatch each frame's events and run the continuous poll (`router`)
//
// Notes:
// The engine owns one `InputRouter` and one `EntityInputBinding`; pawns
// only ever see read-only state through their hooks.
//
//=========================================================================

//=== Submodules ==========================================================

pub mod action_map;
pub mod binding;
pub mod event;
pub mod router;
pub mod state_tracker;

//=== Public API ==========================================================

pub use action_map::ActionMap;
pub use binding::{DeviceBinding, EntityInputBinding};
pub use event::{ControllerAxis, ControllerButton, InputEvent, KeyCode};
pub use router::InputRouter;
pub use state_tracker::{ControllerState, KeyboardState};
