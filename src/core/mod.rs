//=========================================================================
// Core Systems
//
// Everything the engine owns and ticks on the frame thread.
//
// Responsibilities:
// - Platform contract and per-frame event collection (`platform_bridge`)
// - Controller slot bookkeeping (`device`)
// - Input routing to pawns (`input`)
// - Levels, entities and deferred level commands (`level`)
// - Fixed-step rigid-body simulation (`physics`)
// - Draw recording (`render`) and texture registry (`assets`)
//
// Notes:
// No subsystem reaches another through global state; the engine passes
// what each call needs explicitly.
//
//=========================================================================

pub mod assets;
pub mod device;
pub mod input;
pub mod level;
pub mod physics;
pub mod platform_bridge;
pub mod render;
