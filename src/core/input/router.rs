//=========================================================================
// Input Router
//=========================================================================
//
// Per-frame dispatch of platform events to devices, bindings and pawns.
//
// Frame flow:
// ```text
//   begin_frame()                       clear edge deltas
//   for event in arrival order:
//     Quit                  → TickControl::Exit (frame still completes)
//     DeviceConnected       → DeviceRegistry → map_controller → binding
//                             (already connected: state kept)
//     DeviceDisconnected    → DeviceRegistry → binding cleared
//     KeyDown / KeyUp       → KeyboardState → keyboard pawn (edge)
//     ButtonDown / ButtonUp → ControllerState → bound pawn (edge)
//     ControllerAxis        → ControllerState (no edge)
//   continuous poll (≥ 1 pawn registered):
//     keyboard pawn         → check_key_state(&KeyboardState)
//     each bound pawn       → on_axis_motion(&ControllerState)
// ```
//
// Events whose target does not exist (no pawn, pawn outside the active
// level, idle controller) are dropped silently.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::{debug, info, trace};

//=== Internal Dependencies ===============================================

use super::action_map::ActionMap;
use super::binding::EntityInputBinding;
use super::event::{ControllerAxis, ControllerButton, InputEvent, KeyCode};
use super::state_tracker::{ControllerState, KeyboardState};
use crate::core::device::{DeviceRegistry, LogicalIndex, PlatformHandle};
use crate::core::level::{EntityId, Level, Pawn};
use crate::core::platform_bridge::{PlatformEvent, TickControl};

//=== Edge ================================================================

/// Direction of a discrete input edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
    Down,
    Up,
}

impl Edge {
    fn is_down(self) -> bool {
        self == Edge::Down
    }
}

//=== InputRouter =========================================================

/// Owns keyboard/controller state and the action map; routes events.
#[derive(Debug)]
pub struct InputRouter {
    keyboard: KeyboardState,
    controllers: Vec<Option<ControllerState>>,
    actions: ActionMap,
    dead_zone: f32,
}

impl InputRouter {
    //--- Construction -----------------------------------------------------

    pub fn new(dead_zone: f32) -> Self {
        Self {
            keyboard: KeyboardState::new(),
            controllers: Vec::new(),
            actions: ActionMap::new(),
            dead_zone,
        }
    }

    //--- Frame Processing -------------------------------------------------

    /// Routes one frame of events, then runs the continuous poll.
    ///
    /// Returns [`TickControl::Exit`] if a `Quit` was among the events.
    pub fn process_frame(
        &mut self,
        events: &[PlatformEvent],
        devices: &mut DeviceRegistry,
        bindings: &mut EntityInputBinding,
        mut level: Option<&mut Level>,
    ) -> TickControl {
        self.begin_frame();

        let mut control = TickControl::Continue;
        for event in events {
            let outcome = self.dispatch(event, devices, bindings, level.as_deref_mut());
            control = control.and(outcome);
        }

        if !bindings.is_empty() {
            self.poll_continuous(bindings, level);
        }

        control
    }

    fn begin_frame(&mut self) {
        self.keyboard.begin_frame();
        for state in self.controllers.iter_mut().flatten() {
            state.begin_frame();
        }
    }

    //--- Dispatch Table ---------------------------------------------------

    fn dispatch(
        &mut self,
        event: &PlatformEvent,
        devices: &mut DeviceRegistry,
        bindings: &mut EntityInputBinding,
        level: Option<&mut Level>,
    ) -> TickControl {
        match event {
            PlatformEvent::Quit => {
                info!(target: "input", "Quit requested");
                return TickControl::Exit;
            }
            PlatformEvent::DeviceConnected { handle } => {
                self.on_device_connected(*handle, devices, bindings);
            }
            PlatformEvent::DeviceDisconnected { handle } => {
                self.on_device_disconnected(*handle, devices, bindings);
            }
            PlatformEvent::Input(input) => match input {
                InputEvent::KeyDown { key } => self.on_key(*key, Edge::Down, bindings, level),
                InputEvent::KeyUp { key } => self.on_key(*key, Edge::Up, bindings, level),
                InputEvent::ControllerButtonDown { handle, button } => {
                    self.on_button(*handle, *button, Edge::Down, devices, bindings, level)
                }
                InputEvent::ControllerButtonUp { handle, button } => {
                    self.on_button(*handle, *button, Edge::Up, devices, bindings, level)
                }
                InputEvent::ControllerAxis { handle, axis, value } => {
                    self.on_axis(*handle, *axis, *value, devices)
                }
                InputEvent::Unidentified => {
                    trace!(target: "input", "Unidentified input dropped");
                }
            },
        }
        TickControl::Continue
    }

    //--- Device Handlers --------------------------------------------------

    fn on_device_connected(
        &mut self,
        handle: PlatformHandle,
        devices: &mut DeviceRegistry,
        bindings: &mut EntityInputBinding,
    ) {
        let index = match devices.index_of(handle) {
            Some(index) => {
                debug!(target: "input", "Controller {:?} reported again at {}, state kept", handle, index);
                index
            }
            None => {
                let index = devices.on_connect(handle);
                self.map_controller(index, handle);
                index
            }
        };
        if bindings.on_device_connected(index, handle).is_none() {
            debug!(target: "input", "Controller {:?} ({}) idle, no pawn without a device", handle, index);
        }
    }

    fn on_device_disconnected(
        &mut self,
        handle: PlatformHandle,
        devices: &mut DeviceRegistry,
        bindings: &mut EntityInputBinding,
    ) {
        if let Some(index) = devices.on_disconnect(handle) {
            if let Some(Some(state)) = self.controllers.get_mut(index.0) {
                state.reset(None);
            }
        }
        bindings.on_device_disconnected(handle);
    }

    /// Allocates the controller state for `index`, or resets it when the
    /// slot is reused by a new controller.
    pub fn map_controller(&mut self, index: LogicalIndex, handle: PlatformHandle) {
        if self.controllers.len() <= index.0 {
            self.controllers.resize_with(index.0 + 1, || None);
        }

        let dead_zone = self.dead_zone;
        let slot = &mut self.controllers[index.0];
        match slot {
            Some(state) => {
                state.reset(Some(handle));
                debug!(target: "input", "Controller mapping {} reset for {:?}", index, handle);
            }
            None => {
                *slot = Some(ControllerState::new(index, Some(handle), dead_zone));
                debug!(target: "input", "Controller mapping {} created for {:?}", index, handle);
            }
        }
    }

    //--- Input Handlers ---------------------------------------------------

    fn on_key(&mut self, key: KeyCode, edge: Edge, bindings: &EntityInputBinding, level: Option<&mut Level>) {
        let action = self.actions.key_action(key);
        match edge {
            Edge::Down => self.keyboard.press(key, action),
            Edge::Up => self.keyboard.release(key, action),
        };

        let Some(pawn) = Self::target(bindings.keyboard_pawn(), level) else {
            trace!(target: "input", "Key {:?} {:?} dropped, no keyboard pawn", key, edge);
            return;
        };

        match edge {
            Edge::Down => pawn.on_key_down(key),
            Edge::Up => pawn.on_key_up(key),
        }
        if let Some(action) = action {
            pawn.on_action(action, edge.is_down());
        }
    }

    fn on_button(
        &mut self,
        handle: PlatformHandle,
        button: ControllerButton,
        edge: Edge,
        devices: &DeviceRegistry,
        bindings: &EntityInputBinding,
        level: Option<&mut Level>,
    ) {
        let Some(index) = devices.index_of(handle) else {
            trace!(target: "input", "Button {:?} from unknown controller {:?} dropped", button, handle);
            return;
        };
        let Some(Some(state)) = self.controllers.get_mut(index.0) else {
            return;
        };

        let action = self.actions.button_action(button);
        match edge {
            Edge::Down => state.press(button, action),
            Edge::Up => state.release(button, action),
        };

        let Some(pawn) = Self::target(bindings.pawn_for_handle(handle), level) else {
            trace!(target: "input", "Button {:?} {:?} dropped, controller {} idle", button, edge, index);
            return;
        };

        match edge {
            Edge::Down => pawn.on_button_down(button, state),
            Edge::Up => pawn.on_button_up(button, state),
        }
        if let Some(action) = action {
            pawn.on_action(action, edge.is_down());
        }
    }

    fn on_axis(&mut self, handle: PlatformHandle, axis: ControllerAxis, value: f32, devices: &DeviceRegistry) {
        match devices.index_of(handle) {
            Some(index) => {
                if let Some(Some(state)) = self.controllers.get_mut(index.0) {
                    state.set_axis(axis, value);
                }
            }
            None => trace!(target: "input", "Axis {:?} from unknown controller {:?} dropped", axis, handle),
        }
    }

    //--- Continuous Poll --------------------------------------------------

    fn poll_continuous(&self, bindings: &EntityInputBinding, mut level: Option<&mut Level>) {
        if let Some(pawn) = Self::target(bindings.keyboard_pawn(), level.as_deref_mut()) {
            pawn.check_key_state(&self.keyboard);
        }

        for (id, binding) in bindings.controller_pawns() {
            let Some(Some(state)) = self.controllers.get(binding.logical_index.0) else {
                continue;
            };
            if let Some(pawn) = Self::target(Some(id), level.as_deref_mut()) {
                pawn.on_axis_motion(state);
            }
        }
    }

    /// Resolves a pawn id inside the active level.
    fn target(id: Option<EntityId>, level: Option<&mut Level>) -> Option<&mut dyn Pawn> {
        level?.pawn_mut(id?)
    }

    //--- Accessors --------------------------------------------------------

    pub fn keyboard(&self) -> &KeyboardState {
        &self.keyboard
    }

    pub fn controller(&self, index: LogicalIndex) -> Option<&ControllerState> {
        self.controllers.get(index.0).and_then(Option::as_ref)
    }

    pub fn actions(&self) -> &ActionMap {
        &self.actions
    }

    pub fn actions_mut(&mut self) -> &mut ActionMap {
        &mut self.actions
    }

    /// Drops all held input and controller mappings (teardown).
    pub fn release(&mut self) {
        self.keyboard.reset();
        self.controllers.clear();
        debug!(target: "input", "Input router released");
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
