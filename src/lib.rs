//=========================================================================
// Keystone Engine — Library Root
//
// Public API surface of the Keystone 2D runtime.
//
// Responsibilities:
// - Expose the engine facade (`Engine`, `EngineBuilder`)
// - Expose the core subsystems gameplay code implements against
//   (entities, pawns, levels, physics, input, rendering)
// - Keep backend wiring (winit/gilrs) behind `platform`
//
// Typical usage:
// ```no_run
// use keystone_engine::EngineBuilder;
//
// fn main() -> Result<(), keystone_engine::EngineError> {
//     let mut engine = EngineBuilder::new().with_title("Game").build()?;
//     engine.run()
// }
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------
//
// `core` holds every subsystem the engine owns. Gameplay code implements
// `Entity`/`Pawn` from `core::level` and configures input through
// `core::input::ActionMap`.
//
pub mod config;
pub mod core;
pub mod engine;
pub mod error;
pub mod platform;
pub mod prelude;

//--- Public Exports ------------------------------------------------------

pub use config::EngineConfig;
pub use engine::{Engine, EngineBuilder, DEFAULT_LEVEL};
pub use error::EngineError;
