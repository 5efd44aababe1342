//=========================================================================
// State Tracker
//=========================================================================
//
// Held-state tracking for the keyboard and each logical controller, with
// per-frame edge deltas.
//
// Architecture:
//   InputEvent → press()/release()/set_axis() → HashSet (held) → query
//
// Frame lifecycle: begin_frame() → edge events → continuous poll → query
//
// Pawns receive these states during the continuous poll
// (`Pawn::check_key_state`, `Pawn::on_axis_motion`).
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::{HashMap, HashSet};

//=== Internal Dependencies ===============================================

use super::event::{ControllerAxis, ControllerButton, KeyCode};
use crate::core::device::{LogicalIndex, PlatformHandle};

//=== HeldActions =========================================================

/// Counts held inputs per action name (several keys may share an action).
#[derive(Debug, Default, Clone)]
struct HeldActions {
    counts: HashMap<String, u32>,
}

impl HeldActions {
    fn hold(&mut self, action: &str) {
        *self.counts.entry(action.to_string()).or_insert(0) += 1;
    }

    fn release(&mut self, action: &str) {
        if let Some(count) = self.counts.get_mut(action) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                self.counts.remove(action);
            }
        }
    }

    fn is_held(&self, action: &str) -> bool {
        self.counts.contains_key(action)
    }

    fn clear(&mut self) {
        self.counts.clear();
    }
}

//=== KeyboardState =======================================================

/// Keys held on the (single, implicit) keyboard.
#[derive(Debug, Default, Clone)]
pub struct KeyboardState {
    //--- Persistent State (survives frame boundary) ----------------------
    keys_down: HashSet<KeyCode>,
    actions: HeldActions,

    //--- Frame Deltas (reset each frame via begin_frame()) ---------------
    keys_pressed_this_frame: HashSet<KeyCode>,
    keys_released_this_frame: HashSet<KeyCode>,
}

impl KeyboardState {
    pub fn new() -> Self {
        Self::default()
    }

    //--- Frame Processing -------------------------------------------------

    /// Clears frame-specific deltas (pressed/released flags).
    pub(crate) fn begin_frame(&mut self) {
        self.keys_pressed_this_frame.clear();
        self.keys_released_this_frame.clear();
    }

    /// Marks `key` held. Returns `true` on an UP → DOWN transition.
    pub(crate) fn press(&mut self, key: KeyCode, action: Option<&str>) -> bool {
        // Only mark as pressed if it wasn't already down
        if !self.keys_down.insert(key) {
            return false;
        }
        self.keys_pressed_this_frame.insert(key);
        if let Some(action) = action {
            self.actions.hold(action);
        }
        true
    }

    /// Marks `key` released. Returns `true` on a DOWN → UP transition.
    pub(crate) fn release(&mut self, key: KeyCode, action: Option<&str>) -> bool {
        // Only mark as released if it was actually down
        if !self.keys_down.remove(&key) {
            return false;
        }
        self.keys_released_this_frame.insert(key);
        if let Some(action) = action {
            self.actions.release(action);
        }
        true
    }

    /// Releases every key (focus loss, teardown).
    pub(crate) fn reset(&mut self) {
        self.keys_down.clear();
        self.actions.clear();
        self.begin_frame();
    }

    //=====================================================================
    // Query API
    //=====================================================================

    /// Returns `true` while key is held.
    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    /// Returns `true` if key transitioned UP → DOWN this frame.
    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed_this_frame.contains(&key)
    }

    /// Returns `true` if key transitioned DOWN → UP this frame.
    pub fn is_key_released(&self, key: KeyCode) -> bool {
        self.keys_released_this_frame.contains(&key)
    }

    /// Returns `true` while any key bound to `action` is held.
    pub fn is_action_down(&self, action: &str) -> bool {
        self.actions.is_held(action)
    }

    /// Iterates over currently held keys (unordered).
    pub fn keys_down(&self) -> impl Iterator<Item = KeyCode> + '_ {
        self.keys_down.iter().copied()
    }

    pub fn any_key_down(&self) -> bool {
        !self.keys_down.is_empty()
    }
}

//=== ControllerState =====================================================

/// Buttons and axes of one logical controller.
///
/// Allocated by `InputRouter::map_controller` when a controller takes a
/// slot, and reset when the slot is reused by another controller.
#[derive(Debug, Clone)]
pub struct ControllerState {
    index: LogicalIndex,
    handle: Option<PlatformHandle>,
    dead_zone: f32,

    //--- Persistent State -------------------------------------------------
    buttons_down: HashSet<ControllerButton>,
    axes: [f32; 6],
    actions: HeldActions,

    //--- Frame Deltas -----------------------------------------------------
    buttons_pressed_this_frame: HashSet<ControllerButton>,
    buttons_released_this_frame: HashSet<ControllerButton>,
}

impl ControllerState {
    pub fn new(index: LogicalIndex, handle: Option<PlatformHandle>, dead_zone: f32) -> Self {
        Self {
            index,
            handle,
            dead_zone: dead_zone.abs(),
            buttons_down: HashSet::new(),
            axes: [0.0; 6],
            actions: HeldActions::default(),
            buttons_pressed_this_frame: HashSet::new(),
            buttons_released_this_frame: HashSet::new(),
        }
    }

    //--- Frame Processing -------------------------------------------------

    pub(crate) fn begin_frame(&mut self) {
        self.buttons_pressed_this_frame.clear();
        self.buttons_released_this_frame.clear();
    }

    /// Rebinds the state to a new occupant, dropping all held input.
    pub(crate) fn reset(&mut self, handle: Option<PlatformHandle>) {
        self.handle = handle;
        self.buttons_down.clear();
        self.axes = [0.0; 6];
        self.actions.clear();
        self.begin_frame();
    }

    pub(crate) fn press(&mut self, button: ControllerButton, action: Option<&str>) -> bool {
        if !self.buttons_down.insert(button) {
            return false;
        }
        self.buttons_pressed_this_frame.insert(button);
        if let Some(action) = action {
            self.actions.hold(action);
        }
        true
    }

    pub(crate) fn release(&mut self, button: ControllerButton, action: Option<&str>) -> bool {
        if !self.buttons_down.remove(&button) {
            return false;
        }
        self.buttons_released_this_frame.insert(button);
        if let Some(action) = action {
            self.actions.release(action);
        }
        true
    }

    pub(crate) fn set_axis(&mut self, axis: ControllerAxis, value: f32) {
        self.axes[axis.index()] = value.clamp(-1.0, 1.0);
    }

    //=====================================================================
    // Query API
    //=====================================================================

    pub fn index(&self) -> LogicalIndex {
        self.index
    }

    /// Platform handle of the current occupant (`None` after disconnect).
    pub fn handle(&self) -> Option<PlatformHandle> {
        self.handle
    }

    pub fn is_button_down(&self, button: ControllerButton) -> bool {
        self.buttons_down.contains(&button)
    }

    pub fn is_button_pressed(&self, button: ControllerButton) -> bool {
        self.buttons_pressed_this_frame.contains(&button)
    }

    pub fn is_button_released(&self, button: ControllerButton) -> bool {
        self.buttons_released_this_frame.contains(&button)
    }

    pub fn is_action_down(&self, action: &str) -> bool {
        self.actions.is_held(action)
    }

    /// Axis value with the dead zone applied.
    pub fn axis(&self, axis: ControllerAxis) -> f32 {
        let value = self.axes[axis.index()];
        if value.abs() < self.dead_zone {
            0.0
        } else {
            value
        }
    }

    /// Axis value as last reported, without the dead zone.
    pub fn raw_axis(&self, axis: ControllerAxis) -> f32 {
        self.axes[axis.index()]
    }

    pub fn left_stick(&self) -> (f32, f32) {
        (self.axis(ControllerAxis::LeftStickX), self.axis(ControllerAxis::LeftStickY))
    }

    pub fn right_stick(&self) -> (f32, f32) {
        (self.axis(ControllerAxis::RightStickX), self.axis(ControllerAxis::RightStickY))
    }

    pub fn dead_zone(&self) -> f32 {
        self.dead_zone
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
