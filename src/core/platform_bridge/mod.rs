//=========================================================================
// Platform Bridge
//=========================================================================
//
// Bridges the platform layer (winit/gilrs, headless) with core systems.
//
// This module defines the contract between platform implementations and
// core logic, enabling platform backends to be swapped without changing
// core code.
//
// Components:
// - `interface`: Event types, errors and the backend trait (the contract)
// - `event_collector`: Core-side bounded draining of the event channel
//
//=========================================================================

//=== Module Declarations =================================================

pub mod event_collector;
pub mod interface;

//=== Public API ==========================================================

pub use event_collector::{EventCollector, TickControl};
pub use interface::{PlatformBackend, PlatformError, PlatformEvent};
