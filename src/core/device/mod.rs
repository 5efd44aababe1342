//=========================================================================
// Device Registry
//=========================================================================
//
// Tracks connected game controllers by platform handle and assigns each
// one a stable logical index.
//
// Slot lifecycle:
// ```text
//   connect(h)     → first cleared slot (lowest index) or append
//   disconnect(h)  → slot.handle = None (slot + index retained)
//   connect(h')    → reuses the cleared slot
// ```
//
// Logical indices never exceed the slot count, and a slot is only reused
// once its previous occupant has disconnected. The keyboard is implicit
// and always present; it never occupies a controller slot.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::{debug, info, trace};

//=== PlatformHandle ======================================================

/// Opaque per-connection controller identifier issued by the platform.
///
/// A controller unplugged and plugged back in may receive a new handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlatformHandle(pub u64);

//=== LogicalIndex ========================================================

/// Stable, dense slot index of a controller (player number).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LogicalIndex(pub usize);

impl std::fmt::Display for LogicalIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

//=== DeviceKind ==========================================================

/// Input device category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceKind {
    Keyboard,
    Controller,
}

//=== DeviceSlot ==========================================================

/// One controller slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceSlot {
    pub logical_index: LogicalIndex,

    /// `None` once the controller has disconnected.
    pub handle: Option<PlatformHandle>,

    pub kind: DeviceKind,
}

impl DeviceSlot {
    /// Returns `true` while a controller occupies the slot.
    pub fn is_connected(&self) -> bool {
        self.handle.is_some()
    }
}

//=== DeviceRegistry ======================================================

/// Controller slot table.
///
/// # Examples
///
/// ```
/// use keystone_engine::core::device::{DeviceRegistry, LogicalIndex, PlatformHandle};
///
/// let mut devices = DeviceRegistry::new();
/// assert_eq!(devices.on_connect(PlatformHandle(10)), LogicalIndex(0));
/// assert_eq!(devices.on_connect(PlatformHandle(11)), LogicalIndex(1));
///
/// devices.on_disconnect(PlatformHandle(10));
/// assert_eq!(devices.on_connect(PlatformHandle(12)), LogicalIndex(0));
/// ```
#[derive(Debug)]
pub struct DeviceRegistry {
    slots: Vec<DeviceSlot>,
    keyboard: DeviceSlot,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            keyboard: DeviceSlot {
                logical_index: LogicalIndex(0),
                handle: None,
                kind: DeviceKind::Keyboard,
            },
        }
    }

    //--- Connection Events ------------------------------------------------

    /// Assigns a logical index to a newly connected controller.
    ///
    /// Reuses the lowest cleared slot, otherwise appends. A handle that is
    /// already connected keeps its existing index.
    pub fn on_connect(&mut self, handle: PlatformHandle) -> LogicalIndex {
        if let Some(index) = self.index_of(handle) {
            debug!(target: "devices", "Controller {:?} already connected at {}", handle, index);
            return index;
        }

        if let Some(slot) = self.slots.iter_mut().find(|s| s.handle.is_none()) {
            slot.handle = Some(handle);
            info!(
                target: "devices",
                "Controller {:?} connected, reusing slot {}",
                handle,
                slot.logical_index
            );
            return slot.logical_index;
        }

        let index = LogicalIndex(self.slots.len());
        self.slots.push(DeviceSlot {
            logical_index: index,
            handle: Some(handle),
            kind: DeviceKind::Controller,
        });
        info!(target: "devices", "Controller {:?} connected as {}", handle, index);
        index
    }

    /// Clears the slot occupied by `handle`, keeping the slot and its index.
    ///
    /// Returns the freed index, or `None` for an unknown handle.
    pub fn on_disconnect(&mut self, handle: PlatformHandle) -> Option<LogicalIndex> {
        match self.slots.iter_mut().find(|s| s.handle == Some(handle)) {
            Some(slot) => {
                slot.handle = None;
                info!(
                    target: "devices",
                    "Controller {:?} disconnected, slot {} cleared",
                    handle,
                    slot.logical_index
                );
                Some(slot.logical_index)
            }
            None => {
                trace!(target: "devices", "Disconnect for unknown controller {:?} ignored", handle);
                None
            }
        }
    }

    //--- Queries ----------------------------------------------------------

    pub fn index_of(&self, handle: PlatformHandle) -> Option<LogicalIndex> {
        self.slots
            .iter()
            .find(|s| s.handle == Some(handle))
            .map(|s| s.logical_index)
    }

    pub fn handle_of(&self, index: LogicalIndex) -> Option<PlatformHandle> {
        self.slots.get(index.0).and_then(|s| s.handle)
    }

    /// Number of slots ever allocated (connected or cleared).
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn connected_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_connected()).count()
    }

    pub fn slots(&self) -> &[DeviceSlot] {
        &self.slots
    }

    /// The implicit, always-present keyboard device.
    pub fn keyboard(&self) -> &DeviceSlot {
        &self.keyboard
    }

    /// Disconnects every controller (teardown).
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            slot.handle = None;
        }
    }
}

impl Default for DeviceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const H1: PlatformHandle = PlatformHandle(101);
    const H2: PlatformHandle = PlatformHandle(102);
    const H3: PlatformHandle = PlatformHandle(103);
    const H4: PlatformHandle = PlatformHandle(104);

    //=====================================================================
    // Connect Tests
    //=====================================================================

    #[test]
    fn first_connect_gets_index_zero() {
        let mut devices = DeviceRegistry::new();
        assert_eq!(devices.on_connect(H1), LogicalIndex(0));
        assert_eq!(devices.slot_count(), 1);
        assert_eq!(devices.connected_count(), 1);
    }

    #[test]
    fn connects_append_in_order() {
        let mut devices = DeviceRegistry::new();
        assert_eq!(devices.on_connect(H1), LogicalIndex(0));
        assert_eq!(devices.on_connect(H2), LogicalIndex(1));
        assert_eq!(devices.on_connect(H3), LogicalIndex(2));
    }

    #[test]
    fn duplicate_connect_returns_existing_index() {
        let mut devices = DeviceRegistry::new();
        devices.on_connect(H1);
        devices.on_connect(H2);

        assert_eq!(devices.on_connect(H1), LogicalIndex(0));
        assert_eq!(devices.slot_count(), 2, "No slot allocated for a known handle");
    }

    #[test]
    fn index_never_exceeds_slot_count() {
        let mut devices = DeviceRegistry::new();
        let handles = [H1, H2, H3, H4];

        for (round, h) in handles.iter().enumerate() {
            let index = devices.on_connect(*h);
            assert!(index.0 <= round, "Index {} above slot count {}", index.0, round);
            if round % 2 == 1 {
                devices.on_disconnect(handles[round - 1]);
            }
        }
    }

    //=====================================================================
    // Disconnect / Reuse Tests
    //=====================================================================

    #[test]
    fn disconnect_clears_handle_but_keeps_slot() {
        let mut devices = DeviceRegistry::new();
        devices.on_connect(H1);

        assert_eq!(devices.on_disconnect(H1), Some(LogicalIndex(0)));
        assert_eq!(devices.slot_count(), 1);
        assert_eq!(devices.connected_count(), 0);
        assert_eq!(devices.handle_of(LogicalIndex(0)), None);
        assert!(!devices.slots()[0].is_connected());
    }

    #[test]
    fn disconnect_unknown_handle_is_noop() {
        let mut devices = DeviceRegistry::new();
        devices.on_connect(H1);

        assert_eq!(devices.on_disconnect(H4), None);
        assert_eq!(devices.connected_count(), 1);
    }

    #[test]
    fn reconnect_reuses_cleared_slot() {
        let mut devices = DeviceRegistry::new();
        devices.on_connect(H1);
        devices.on_disconnect(H1);

        assert_eq!(devices.on_connect(H2), LogicalIndex(0));
        assert_eq!(devices.slot_count(), 1);
    }

    #[test]
    fn reuse_picks_lowest_cleared_slot() {
        let mut devices = DeviceRegistry::new();
        devices.on_connect(H1);
        devices.on_connect(H2);
        devices.on_connect(H3);

        devices.on_disconnect(H3);
        devices.on_disconnect(H2);

        assert_eq!(devices.on_connect(H4), LogicalIndex(1));
        assert_eq!(devices.handle_of(LogicalIndex(1)), Some(H4));
        assert_eq!(devices.handle_of(LogicalIndex(2)), None);
    }

    #[test]
    fn append_when_no_slot_is_cleared() {
        let mut devices = DeviceRegistry::new();
        devices.on_connect(H1);
        devices.on_connect(H2);
        devices.on_disconnect(H1);
        devices.on_connect(H3);

        assert_eq!(devices.on_connect(H4), LogicalIndex(2));
    }

    //=====================================================================
    // Query Tests
    //=====================================================================

    #[test]
    fn index_and_handle_lookups_agree() {
        let mut devices = DeviceRegistry::new();
        devices.on_connect(H1);
        devices.on_connect(H2);

        assert_eq!(devices.index_of(H2), Some(LogicalIndex(1)));
        assert_eq!(devices.handle_of(LogicalIndex(1)), Some(H2));
        assert_eq!(devices.index_of(H3), None);
        assert_eq!(devices.handle_of(LogicalIndex(7)), None);
    }

    #[test]
    fn keyboard_is_implicit_and_slotless() {
        let devices = DeviceRegistry::new();
        assert_eq!(devices.keyboard().kind, DeviceKind::Keyboard);
        assert_eq!(devices.slot_count(), 0);
    }

    #[test]
    fn clear_disconnects_everything() {
        let mut devices = DeviceRegistry::new();
        devices.on_connect(H1);
        devices.on_connect(H2);

        devices.clear();

        assert_eq!(devices.connected_count(), 0);
        assert_eq!(devices.slot_count(), 2);
    }
}
