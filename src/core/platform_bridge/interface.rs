//=========================================================================
// Platform Bridge Interface
//=========================================================================
//
// Platform-to-core interface types (events, errors, backend contract).
//
// Defines the contract between a platform backend (winit + gilrs, or the
// headless script runner) and the engine core. The backend pushes
// `PlatformEvent`s into a crossbeam sender handed to it at construction;
// the core drains the matching receiver once per frame.
//
//=========================================================================

//=== External Dependencies ===============================================

use thiserror::Error;

//=== Internal Dependencies ===============================================

use crate::core::device::PlatformHandle;
use crate::core::input::event::InputEvent;
use crate::core::render::DrawList;

//=== PlatformEvent =======================================================

/// Events sent from the platform backend to the core.
///
/// One variant per event kind; the input router matches on it
/// exhaustively, so adding a variant forces a handler.
#[derive(Debug, Clone, PartialEq)]
pub enum PlatformEvent {
    /// Window close or OS shutdown requested.
    ///
    /// The frame in which it is received still completes.
    Quit,

    /// A game controller was plugged in.
    DeviceConnected { handle: PlatformHandle },

    /// A game controller was removed.
    DeviceDisconnected { handle: PlatformHandle },

    /// Keyboard or controller input.
    Input(InputEvent),
}

impl From<InputEvent> for PlatformEvent {
    fn from(event: InputEvent) -> Self {
        PlatformEvent::Input(event)
    }
}

//=== PlatformError =======================================================

/// Platform initialization errors.
///
/// All of these are fatal: without an event loop and a window the engine
/// cannot enter its frame loop.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// Event loop creation failed (OS-level issue).
    #[error("event loop creation failed: {0}")]
    EventLoopCreation(String),

    /// Window or rendering context creation failed.
    #[error("window creation failed: {0}")]
    WindowCreation(String),
}

//=== PlatformBackend =====================================================

/// Window, presentation and OS event source.
///
/// Implementations own whatever OS resources they need and release them
/// on drop. The engine drops its backend before tearing down levels.
pub trait PlatformBackend {
    /// Polls the OS without blocking and forwards everything that arrived
    /// since the last call to the core's event channel, in arrival order.
    fn pump_events(&mut self);

    /// Presents the frame recorded by the active level.
    fn present(&mut self, frame: &DrawList);

    /// Current drawable size in physical pixels.
    fn window_size(&self) -> (u32, u32);
}

//=========================================================================
// Unit Tests
//=========================================================================
