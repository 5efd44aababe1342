//=========================================================================
// Level Registry
//=========================================================================
//
// Owns every Level by name and tracks the single active one.
//
// Invariant: `active`, if set, names a level present in `levels`.
//
// Levels are created explicitly and rejected on duplicate names; deleting
// a level clears its entities (releasing their physics bodies) before
// the Level value is dropped.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;

use log::{debug, info, warn};

//=== Internal Dependencies ===============================================

use super::{Entity, EntityId, Level, LevelError};
use crate::core::physics::PhysicsWorld;

//=== LevelRegistry =======================================================

/// Name → Level map with one active level.
#[derive(Debug, Default)]
pub struct LevelRegistry {
    levels: HashMap<String, Level>,
    active: Option<String>,
    next_entity: u64,
}

impl LevelRegistry {
    //--- Construction -----------------------------------------------------

    pub fn new() -> Self {
        Self::default()
    }

    //--- Registration -----------------------------------------------------

    /// Creates an empty level.
    ///
    /// # Errors
    ///
    /// [`LevelError::AlreadyExists`] if the name is taken; the existing
    /// level is left untouched.
    pub fn create_level(&mut self, name: &str) -> Result<&mut Level, LevelError> {
        if self.levels.contains_key(name) {
            warn!(target: "level", "Level '{}' already exists, creation rejected", name);
            return Err(LevelError::AlreadyExists(name.to_string()));
        }

        debug!(target: "level", "Level '{}' created", name);
        Ok(self
            .levels
            .entry(name.to_string())
            .or_insert_with(|| Level::new(name)))
    }

    /// Makes `name` the active level.
    ///
    /// # Errors
    ///
    /// [`LevelError::NotFound`] if no such level exists; the active level
    /// is unchanged.
    pub fn activate(&mut self, name: &str) -> Result<(), LevelError> {
        if !self.levels.contains_key(name) {
            warn!(target: "level", "Cannot activate unknown level '{}'", name);
            return Err(LevelError::NotFound(name.to_string()));
        }

        if self.active.as_deref() != Some(name) {
            info!(target: "level", "Active level: '{}'", name);
            self.active = Some(name.to_string());
        }
        Ok(())
    }

    /// Clears and removes a level, returning the ids of its entities.
    ///
    /// Deleting the active level leaves no level active.
    pub fn delete_level(&mut self, name: &str, physics: &mut PhysicsWorld) -> Result<Vec<EntityId>, LevelError> {
        let mut level = self
            .levels
            .remove(name)
            .ok_or_else(|| LevelError::NotFound(name.to_string()))?;

        let cleared = level.clear(physics);
        drop(level);

        if self.active.as_deref() == Some(name) {
            info!(target: "level", "Active level '{}' deleted, no level active", name);
            self.active = None;
        } else {
            debug!(target: "level", "Level '{}' deleted", name);
        }
        Ok(cleared)
    }

    /// Adds an entity to the named level under a fresh id.
    pub fn spawn(
        &mut self,
        level: &str,
        entity: Box<dyn Entity>,
        physics: &mut PhysicsWorld,
    ) -> Result<EntityId, LevelError> {
        let target = self
            .levels
            .get_mut(level)
            .ok_or_else(|| LevelError::NotFound(level.to_string()))?;

        let id = EntityId(self.next_entity);
        self.next_entity += 1;
        target.add(id, entity, physics);
        Ok(id)
    }

    /// Clears and drops every level (teardown). Returns all cleared ids.
    pub fn clear_all(&mut self, physics: &mut PhysicsWorld) -> Vec<EntityId> {
        let mut cleared = Vec::new();
        for (_, mut level) in self.levels.drain() {
            cleared.extend(level.clear(physics));
        }
        self.active = None;
        cleared
    }

    //--- Queries ----------------------------------------------------------

    pub fn level(&self, name: &str) -> Option<&Level> {
        self.levels.get(name)
    }

    pub fn level_mut(&mut self, name: &str) -> Option<&mut Level> {
        self.levels.get_mut(name)
    }

    pub fn active(&self) -> Option<&Level> {
        self.active.as_deref().and_then(|name| self.levels.get(name))
    }

    pub fn active_mut(&mut self) -> Option<&mut Level> {
        match self.active.as_deref() {
            Some(name) => self.levels.get_mut(name),
            None => None,
        }
    }

    pub fn active_name(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.levels.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Level names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.levels.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::level::{FrameContext, LevelState};
    use crate::core::physics::{BodyDesc, BodyHandle};
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Entity owning one body; records whether its body was still alive
    /// in the physics world when clear() ran.
    struct Crate {
        body: Option<BodyHandle>,
        saw_body_on_clear: Rc<RefCell<Vec<bool>>>,
    }

    impl Crate {
        fn boxed(log: &Rc<RefCell<Vec<bool>>>) -> Box<Self> {
            Box::new(Self {
                body: None,
                saw_body_on_clear: log.clone(),
            })
        }
    }

    impl Entity for Crate {
        fn init(&mut self, physics: &mut PhysicsWorld) {
            self.body = Some(physics.create_body(&BodyDesc::dynamic(0.0, 1.0)));
        }

        fn update(&mut self, _ctx: &mut FrameContext<'_>) {}

        fn clear(&mut self, physics: &mut PhysicsWorld) {
            if let Some(body) = self.body.take() {
                self.saw_body_on_clear.borrow_mut().push(physics.contains(body));
                physics.remove_body(body);
            }
        }
    }

    //=====================================================================
    // Creation Tests
    //=====================================================================

    #[test]
    fn duplicate_creation_is_rejected_and_original_kept() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut physics = PhysicsWorld::new([0.0, -10.0]);
        let mut levels = LevelRegistry::new();

        levels.create_level("L1").unwrap();
        let id = levels.spawn("L1", Crate::boxed(&log), &mut physics).unwrap();

        let err = levels.create_level("L1").unwrap_err();

        assert_eq!(err, LevelError::AlreadyExists("L1".into()));
        assert_eq!(levels.len(), 1, "Registry keeps exactly one L1");
        assert!(levels.level("L1").unwrap().contains(id), "Original L1 untouched");
    }

    #[test]
    fn new_level_is_uninitialized() {
        let mut levels = LevelRegistry::new();
        let level = levels.create_level("L1").unwrap();
        assert_eq!(level.name(), "L1");
        assert_eq!(level.state(), LevelState::Uninitialized);
    }

    //=====================================================================
    // Activation Tests
    //=====================================================================

    #[test]
    fn activate_unknown_level_is_not_found() {
        let mut levels = LevelRegistry::new();
        levels.create_level("defaultLevel").unwrap();
        levels.activate("defaultLevel").unwrap();

        let err = levels.activate("L9").unwrap_err();

        assert_eq!(err, LevelError::NotFound("L9".into()));
        assert_eq!(levels.active_name(), Some("defaultLevel"), "Active level unchanged");
    }

    #[test]
    fn activate_switches_active_level() {
        let mut levels = LevelRegistry::new();
        levels.create_level("A").unwrap();
        levels.create_level("B").unwrap();

        levels.activate("A").unwrap();
        levels.activate("B").unwrap();

        assert_eq!(levels.active().map(Level::name), Some("B"));
        assert_eq!(levels.active_mut().map(|l| l.name().to_string()), Some("B".to_string()));
    }

    //=====================================================================
    // Deletion Tests
    //=====================================================================

    #[test]
    fn delete_clears_entities_before_release() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut physics = PhysicsWorld::new([0.0, -10.0]);
        let mut levels = LevelRegistry::new();
        levels.create_level("L1").unwrap();
        let a = levels.spawn("L1", Crate::boxed(&log), &mut physics).unwrap();
        let b = levels.spawn("L1", Crate::boxed(&log), &mut physics).unwrap();
        levels.level_mut("L1").unwrap().init(&mut physics);
        assert_eq!(physics.body_count(), 2);

        let cleared = levels.delete_level("L1", &mut physics).unwrap();

        assert_eq!(cleared, vec![a, b]);
        assert_eq!(*log.borrow(), vec![true, true], "Bodies still alive when clear() ran");
        assert_eq!(physics.body_count(), 0);
        assert!(!levels.contains("L1"));
    }

    #[test]
    fn deleting_active_level_unsets_active() {
        let mut physics = PhysicsWorld::new([0.0, -10.0]);
        let mut levels = LevelRegistry::new();
        levels.create_level("L1").unwrap();
        levels.activate("L1").unwrap();

        levels.delete_level("L1", &mut physics).unwrap();

        assert!(levels.active().is_none());
        assert_eq!(levels.active_name(), None);
    }

    #[test]
    fn delete_unknown_level_is_not_found() {
        let mut physics = PhysicsWorld::new([0.0, -10.0]);
        let mut levels = LevelRegistry::new();
        assert_eq!(
            levels.delete_level("ghost", &mut physics),
            Err(LevelError::NotFound("ghost".into()))
        );
    }

    //=====================================================================
    // Spawn & Teardown Tests
    //=====================================================================

    #[test]
    fn entity_ids_are_unique_across_levels() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut physics = PhysicsWorld::new([0.0, -10.0]);
        let mut levels = LevelRegistry::new();
        levels.create_level("A").unwrap();
        levels.create_level("B").unwrap();

        let a = levels.spawn("A", Crate::boxed(&log), &mut physics).unwrap();
        let b = levels.spawn("B", Crate::boxed(&log), &mut physics).unwrap();

        assert_ne!(a, b);
        assert!(b > a);
    }

    #[test]
    fn spawn_into_unknown_level_is_not_found() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut physics = PhysicsWorld::new([0.0, -10.0]);
        let mut levels = LevelRegistry::new();

        let err = levels.spawn("nowhere", Crate::boxed(&log), &mut physics).unwrap_err();
        assert_eq!(err, LevelError::NotFound("nowhere".into()));
    }

    #[test]
    fn clear_all_tears_down_every_level() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut physics = PhysicsWorld::new([0.0, -10.0]);
        let mut levels = LevelRegistry::new();
        for name in ["A", "B"] {
            levels.create_level(name).unwrap();
            levels.spawn(name, Crate::boxed(&log), &mut physics).unwrap();
            levels.level_mut(name).unwrap().init(&mut physics);
        }
        levels.activate("A").unwrap();

        let cleared = levels.clear_all(&mut physics);

        assert_eq!(cleared.len(), 2);
        assert!(levels.is_empty());
        assert!(levels.active().is_none());
        assert_eq!(physics.body_count(), 0);
    }

    #[test]
    fn names_are_sorted() {
        let mut levels = LevelRegistry::new();
        levels.create_level("zeta").unwrap();
        levels.create_level("alpha").unwrap();
        assert_eq!(levels.names(), vec!["alpha", "zeta"]);
    }
}
