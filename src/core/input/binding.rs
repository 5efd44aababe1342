//=========================================================================
// Entity Input Binding
//=========================================================================
//
// Ordered association table between pawns and controllers.
//
// Each entry is a registered pawn and, optionally, the controller bound to
// it. Entries keep registration order, which decides who claims a newly
// connected controller:
//
// ```text
//   register(P1), register(P2)      [P1: -, P2: -]
//   connect(A)                      [P1: A, P2: -]
//   connect(B)                      [P1: A, P2: B]
//   connect(C)                      C stays idle
//   disconnect(A)                   [P1: -, P2: B]
//   connect(D)                      [P1: D, P2: B]
//   unregister(P2), register(P3)    P3 claims idle B
// ```
//
// Only ids and handles are stored; pawns themselves live in their Level.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::{debug, trace};

//=== Internal Dependencies ===============================================

use crate::core::device::{DeviceRegistry, LogicalIndex, PlatformHandle};
use crate::core::level::EntityId;

//=== DeviceBinding =======================================================

/// Controller bound to a pawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceBinding {
    pub handle: PlatformHandle,
    pub logical_index: LogicalIndex,
}

//=== EntityInputBinding ==================================================

/// Pawn → controller table, in registration order.
#[derive(Debug, Default)]
pub struct EntityInputBinding {
    entries: Vec<(EntityId, Option<DeviceBinding>)>,
}

impl EntityInputBinding {
    pub fn new() -> Self {
        Self::default()
    }

    //--- Pawn Registration ------------------------------------------------

    /// Appends a pawn with no bound device. Re-registering is a no-op.
    pub fn register_pawn(&mut self, pawn: EntityId) {
        if self.contains(pawn) {
            trace!(target: "input", "Pawn {:?} already registered", pawn);
            return;
        }
        self.entries.push((pawn, None));
        debug!(target: "input", "Pawn {:?} registered ({} total)", pawn, self.entries.len());
    }

    /// Binds `pawn` to the lowest-index connected controller nobody holds.
    ///
    /// Returns `None` if the pawn is unknown, already bound, or no
    /// controller is idle.
    pub fn claim_idle_device(&mut self, pawn: EntityId, devices: &DeviceRegistry) -> Option<DeviceBinding> {
        if self.binding_of(pawn).is_some() {
            return None;
        }
        let idle = devices
            .slots()
            .iter()
            .filter_map(|slot| slot.handle.map(|handle| (slot.logical_index, handle)))
            .find(|(_, handle)| self.pawn_for_handle(*handle).is_none())?;

        let (_, slot) = self.entries.iter_mut().find(|(id, _)| *id == pawn)?;
        let binding = DeviceBinding { handle: idle.1, logical_index: idle.0 };
        *slot = Some(binding);
        debug!(
            target: "input",
            "Pawn {:?} claimed idle controller {:?} ({})",
            pawn,
            binding.handle,
            binding.logical_index
        );
        Some(binding)
    }

    /// Removes a pawn, returning the controller it held (now idle).
    pub fn unregister_pawn(&mut self, pawn: EntityId) -> Option<DeviceBinding> {
        let position = self.entries.iter().position(|(id, _)| *id == pawn)?;
        let (_, binding) = self.entries.remove(position);
        debug!(target: "input", "Pawn {:?} unregistered", pawn);
        binding
    }

    //--- Device Events ----------------------------------------------------

    /// Binds a newly connected controller to the first pawn without one.
    ///
    /// Returns the claiming pawn, or `None` if every pawn already has a
    /// controller (the device stays idle) or the handle is already bound.
    pub fn on_device_connected(
        &mut self,
        logical_index: LogicalIndex,
        handle: PlatformHandle,
    ) -> Option<EntityId> {
        if let Some(owner) = self.pawn_for_handle(handle) {
            trace!(target: "input", "Controller {:?} already bound to {:?}", handle, owner);
            return None;
        }

        let (pawn, slot) = self.entries.iter_mut().find(|(_, slot)| slot.is_none())?;
        *slot = Some(DeviceBinding { handle, logical_index });
        debug!(
            target: "input",
            "Controller {:?} ({}) bound to pawn {:?}",
            handle,
            logical_index,
            pawn
        );
        Some(*pawn)
    }

    /// Clears the pawn bound to `handle`. Idle handles are a no-op.
    pub fn on_device_disconnected(&mut self, handle: PlatformHandle) -> Option<EntityId> {
        let (pawn, slot) = self
            .entries
            .iter_mut()
            .find(|(_, slot)| slot.map(|b| b.handle) == Some(handle))?;
        *slot = None;
        debug!(target: "input", "Controller {:?} unbound from pawn {:?}", handle, pawn);
        Some(*pawn)
    }

    //--- Queries ----------------------------------------------------------

    /// Pawn receiving keyboard input: the earliest registered one.
    pub fn keyboard_pawn(&self) -> Option<EntityId> {
        self.entries.first().map(|(id, _)| *id)
    }

    /// Pawns with a bound controller, in registration order.
    pub fn controller_pawns(&self) -> impl Iterator<Item = (EntityId, DeviceBinding)> + '_ {
        self.entries
            .iter()
            .filter_map(|(id, slot)| slot.map(|binding| (*id, binding)))
    }

    pub fn pawn_for_handle(&self, handle: PlatformHandle) -> Option<EntityId> {
        self.entries
            .iter()
            .find(|(_, slot)| slot.map(|b| b.handle) == Some(handle))
            .map(|(id, _)| *id)
    }

    pub fn binding_of(&self, pawn: EntityId) -> Option<DeviceBinding> {
        self.entries
            .iter()
            .find(|(id, _)| *id == pawn)
            .and_then(|(_, slot)| *slot)
    }

    pub fn has_bound_device(&self, pawn: EntityId) -> bool {
        self.binding_of(pawn).is_some()
    }

    pub fn contains(&self, pawn: EntityId) -> bool {
        self.entries.iter().any(|(id, _)| *id == pawn)
    }

    /// Registered pawns, in registration order.
    pub fn pawns(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entries.iter().map(|(id, _)| *id)
    }

    pub fn pawn_count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every entry (teardown).
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const P1: EntityId = EntityId(1);
    const P2: EntityId = EntityId(2);
    const A: PlatformHandle = PlatformHandle(0xA);
    const B: PlatformHandle = PlatformHandle(0xB);
    const C: PlatformHandle = PlatformHandle(0xC);
    const D: PlatformHandle = PlatformHandle(0xD);

    fn two_pawns() -> EntityInputBinding {
        let mut bindings = EntityInputBinding::new();
        bindings.register_pawn(P1);
        bindings.register_pawn(P2);
        bindings
    }

    //=====================================================================
    // Registration Tests
    //=====================================================================

    #[test]
    fn register_keeps_order_and_ignores_duplicates() {
        let mut bindings = two_pawns();
        bindings.register_pawn(P1);

        assert_eq!(bindings.pawns().collect::<Vec<_>>(), vec![P1, P2]);
        assert_eq!(bindings.keyboard_pawn(), Some(P1));
    }

    #[test]
    fn unregister_returns_held_controller() {
        let mut bindings = two_pawns();
        bindings.on_device_connected(LogicalIndex(0), A);

        let released = bindings.unregister_pawn(P1);

        assert_eq!(released.map(|b| b.handle), Some(A));
        assert_eq!(bindings.keyboard_pawn(), Some(P2));
        assert_eq!(bindings.pawn_for_handle(A), None);
    }

    //=====================================================================
    // Binding Tests
    //=====================================================================

    #[test]
    fn connect_binds_first_pawn_without_device() {
        let mut bindings = two_pawns();

        assert_eq!(bindings.on_device_connected(LogicalIndex(0), A), Some(P1));
        assert_eq!(bindings.on_device_connected(LogicalIndex(1), B), Some(P2));
        assert_eq!(
            bindings.binding_of(P2),
            Some(DeviceBinding { handle: B, logical_index: LogicalIndex(1) })
        );
    }

    #[test]
    fn surplus_controller_stays_idle() {
        let mut bindings = two_pawns();
        bindings.on_device_connected(LogicalIndex(0), A);
        bindings.on_device_connected(LogicalIndex(1), B);

        assert_eq!(bindings.on_device_connected(LogicalIndex(2), C), None);
        assert_eq!(bindings.pawn_for_handle(C), None);
    }

    #[test]
    fn same_handle_is_never_bound_twice() {
        let mut bindings = two_pawns();
        bindings.on_device_connected(LogicalIndex(0), A);

        assert_eq!(bindings.on_device_connected(LogicalIndex(0), A), None);
        assert!(!bindings.has_bound_device(P2));
    }

    #[test]
    fn disconnect_then_connect_rebinds_cleared_pawn() {
        let mut bindings = two_pawns();
        bindings.on_device_connected(LogicalIndex(0), A);
        bindings.on_device_connected(LogicalIndex(1), B);
        bindings.on_device_connected(LogicalIndex(2), C);

        assert_eq!(bindings.on_device_disconnected(A), Some(P1));
        assert!(!bindings.has_bound_device(P1));

        assert_eq!(bindings.on_device_connected(LogicalIndex(0), D), Some(P1));
        assert_eq!(bindings.pawn_for_handle(D), Some(P1));
        assert_eq!(bindings.pawn_for_handle(B), Some(P2));
    }

    #[test]
    fn disconnect_of_idle_device_is_noop() {
        let mut bindings = two_pawns();
        bindings.on_device_connected(LogicalIndex(0), A);
        bindings.on_device_connected(LogicalIndex(1), B);

        assert_eq!(bindings.on_device_disconnected(C), None);
        assert_eq!(bindings.controller_pawns().count(), 2);
    }

    #[test]
    fn one_device_per_pawn_and_one_pawn_per_device() {
        let mut bindings = two_pawns();
        let handles = [A, B, C, D];
        for (i, h) in handles.iter().enumerate() {
            bindings.on_device_connected(LogicalIndex(i), *h);
        }
        bindings.on_device_disconnected(B);
        bindings.on_device_connected(LogicalIndex(1), D);

        let bound: Vec<_> = bindings.controller_pawns().collect();
        let mut pawns: Vec<_> = bound.iter().map(|(p, _)| *p).collect();
        let mut devices: Vec<_> = bound.iter().map(|(_, b)| b.handle).collect();
        pawns.dedup();
        devices.sort();
        devices.dedup();

        assert_eq!(pawns.len(), bound.len());
        assert_eq!(devices.len(), bound.len());
    }

    #[test]
    fn late_pawn_claims_lowest_idle_controller() {
        let mut devices = DeviceRegistry::new();
        let mut bindings = EntityInputBinding::new();
        bindings.register_pawn(P1);
        for h in [A, B, C] {
            let index = devices.on_connect(h);
            bindings.on_device_connected(index, h);
        }

        bindings.register_pawn(P2);
        let claimed = bindings.claim_idle_device(P2, &devices);

        assert_eq!(claimed, Some(DeviceBinding { handle: B, logical_index: LogicalIndex(1) }));
        assert_eq!(bindings.pawn_for_handle(C), None);
        assert_eq!(bindings.claim_idle_device(P2, &devices), None, "Already bound");
    }

    #[test]
    fn claim_skips_disconnected_slots() {
        let mut devices = DeviceRegistry::new();
        devices.on_connect(A);
        devices.on_disconnect(A);

        let mut bindings = EntityInputBinding::new();
        bindings.register_pawn(P1);

        assert_eq!(bindings.claim_idle_device(P1, &devices), None);
    }

    #[test]
    fn connect_without_pawns_is_idle() {
        let mut bindings = EntityInputBinding::new();
        assert_eq!(bindings.on_device_connected(LogicalIndex(0), A), None);
        assert_eq!(bindings.keyboard_pawn(), None);
    }
}
