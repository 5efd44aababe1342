//=========================================================================
// Engine Errors
//=========================================================================
//
// Error taxonomy for the engine facade.
//
// Precondition violations on the input path (missing pawn, idle device)
// never reach this type; they are tolerated and logged where they occur.
// What remains is either a level-registry failure surfaced to the caller
// or a fatal initialization failure that prevents the frame loop.
//
//=========================================================================

//=== External Dependencies ===============================================

use thiserror::Error;

//=== Internal Dependencies ===============================================

use crate::config::ConfigError;
use crate::core::level::LevelError;
use crate::core::platform_bridge::PlatformError;

//=== EngineError =========================================================

/// Errors returned by [`crate::Engine`] and [`crate::EngineBuilder`].
#[derive(Debug, Error)]
pub enum EngineError {
    /// Platform layer could not be created (window, context, event loop).
    ///
    /// Fatal: the engine never enters the frame loop.
    #[error("platform initialization failed: {0}")]
    Platform(#[from] PlatformError),

    /// Level registry rejected the operation.
    #[error(transparent)]
    Level(#[from] LevelError),

    /// Configuration could not be loaded or parsed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// `run()` was called after `shutdown()`.
    #[error("engine has already been shut down")]
    ShutDown,
}

//=========================================================================
// Unit Tests
//=========================================================================
