//=========================================================================
// Level System
//=========================================================================
//
// Named scenes owning their entities, and the registry that keeps them.
//
// Architecture:
//   LevelRegistry
//     ├─ levels: HashMap<String, Level>
//     └─ active: Option<String>
//
//   Level
//     ├─ entities: Vec<(EntityId, Box<dyn Entity>)>   (insertion order)
//     └─ state: Uninitialized → Initialized → Cleared
//
// Flow (active level, per frame):
//   init (first time) → update → refresh → draw
//
//=========================================================================

//=== Module Declarations =================================================

pub mod command_queue;
pub mod entity;
pub mod registry;

//=== Public API ==========================================================

pub use command_queue::{LevelCommand, LevelCommandQueue};
pub use entity::{Entity, EntityId, FrameContext, Pawn};
pub use registry::LevelRegistry;

//=== External Dependencies ===============================================

use log::{debug, trace, warn};
use thiserror::Error;

//=== Internal Dependencies ===============================================

use crate::core::physics::PhysicsWorld;
use crate::core::render::Renderer;

//=== LevelError ==========================================================

/// Level registry errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LevelError {
    /// No level is registered under this name.
    #[error("level '{0}' not found")]
    NotFound(String),

    /// A level with this name already exists; it was left untouched.
    #[error("level '{0}' already exists")]
    AlreadyExists(String),
}

//=== LevelState ==========================================================

/// Lifecycle state of a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelState {
    /// Created; entities not yet initialized.
    Uninitialized,
    /// `init()` has run; entities are live.
    Initialized,
    /// `clear()` has run; the level holds no entities.
    Cleared,
}

//=== Level ===============================================================

/// A named scene owning an ordered collection of entities.
pub struct Level {
    name: String,
    entities: Vec<(EntityId, Box<dyn Entity>)>,
    state: LevelState,
}

impl Level {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            entities: Vec::new(),
            state: LevelState::Uninitialized,
        }
    }

    //--- Accessors --------------------------------------------------------

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> LevelState {
        self.state
    }

    pub fn is_initialized(&self) -> bool {
        self.state == LevelState::Initialized
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.iter().any(|(eid, _)| *eid == id)
    }

    /// Entity ids in insertion order.
    pub fn entity_ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.iter().map(|(id, _)| *id)
    }

    pub fn entity(&self, id: EntityId) -> Option<&dyn Entity> {
        self.entities
            .iter()
            .find(|(eid, _)| *eid == id)
            .map(|(_, e)| &**e)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut (dyn Entity + 'static)> {
        self.entities
            .iter_mut()
            .find(|(eid, _)| *eid == id)
            .map(|(_, e)| &mut **e)
    }

    /// Input view of the entity `id`, if it exists here and is a pawn.
    pub fn pawn_mut(&mut self, id: EntityId) -> Option<&mut dyn Pawn> {
        self.entities
            .iter_mut()
            .find(|(eid, _)| *eid == id)
            .and_then(|(_, e)| e.as_pawn_mut())
    }

    //--- Entity Management ------------------------------------------------

    /// Adds an entity; initializes it at once if the level already is.
    pub(crate) fn add(&mut self, id: EntityId, mut entity: Box<dyn Entity>, physics: &mut PhysicsWorld) {
        if self.state == LevelState::Initialized {
            entity.init(physics);
        }
        trace!(target: "level", "Level '{}' gained {} {:?}", self.name, entity.label(), id);
        self.entities.push((id, entity));
    }

    //--- Lifecycle --------------------------------------------------------

    /// Initializes every entity. Runs once; later calls are no-ops.
    ///
    /// Returns `true` if initialization happened.
    pub fn init(&mut self, physics: &mut PhysicsWorld) -> bool {
        match self.state {
            LevelState::Uninitialized => {
                for (_, entity) in &mut self.entities {
                    entity.init(physics);
                }
                self.state = LevelState::Initialized;
                debug!(target: "level", "Level '{}' initialized ({} entities)", self.name, self.entities.len());
                true
            }
            LevelState::Initialized => false,
            LevelState::Cleared => {
                warn!(target: "level", "Level '{}' was cleared and cannot be re-initialized", self.name);
                false
            }
        }
    }

    /// Updates every entity in insertion order.
    pub fn update(&mut self, ctx: &mut FrameContext<'_>) {
        for (_, entity) in &mut self.entities {
            entity.update(ctx);
        }
    }

    /// Clears and removes entities that are no longer alive.
    ///
    /// Returns the removed ids so their input bindings can be dropped.
    pub fn refresh(&mut self, physics: &mut PhysicsWorld) -> Vec<EntityId> {
        let mut removed = Vec::new();
        self.entities.retain_mut(|(id, entity)| {
            if entity.is_alive() {
                return true;
            }
            entity.clear(physics);
            removed.push(*id);
            false
        });

        if !removed.is_empty() {
            debug!(target: "level", "Level '{}' refreshed, removed {:?}", self.name, removed);
        }
        removed
    }

    /// Records every entity's draw commands.
    pub fn draw(&self, renderer: &mut dyn Renderer) {
        for (_, entity) in &self.entities {
            entity.draw(renderer);
        }
    }

    /// Clears every entity (physics released first), then drops them.
    ///
    /// Returns the cleared ids.
    pub fn clear(&mut self, physics: &mut PhysicsWorld) -> Vec<EntityId> {
        let mut cleared = Vec::with_capacity(self.entities.len());
        for (id, entity) in &mut self.entities {
            entity.clear(physics);
            cleared.push(*id);
        }
        self.entities.clear();
        self.state = LevelState::Cleared;
        debug!(target: "level", "Level '{}' cleared ({} entities)", self.name, cleared.len());
        cleared
    }
}

impl std::fmt::Debug for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Level")
            .field("name", &self.name)
            .field("entities", &self.entities.len())
            .field("state", &self.state)
            .finish()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
