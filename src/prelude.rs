//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types and traits.
//
// Usage:
//   use keystone_engine::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Engine core
pub use crate::config::EngineConfig;
pub use crate::engine::{Engine, EngineBuilder, DEFAULT_LEVEL};
pub use crate::error::EngineError;

// Levels and gameplay objects
pub use crate::core::level::{Entity, EntityId, FrameContext, LevelCommand, Pawn};

// Input system
pub use crate::core::input::{ActionMap, ControllerAxis, ControllerButton, ControllerState, KeyCode, KeyboardState};

// Physics
pub use crate::core::physics::{BodyDesc, BodyHandle, BodyKind, Contact, ContactListener, PhysicsWorld, Shape};

// Rendering and assets
pub use crate::core::assets::{AssetManager, TextureId};
pub use crate::core::render::{Color, DrawCommand, Renderer};
