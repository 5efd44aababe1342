//=========================================================================
// Gamepad Source
//=========================================================================
//
// Polls gilrs and translates its events into PlatformEvents.
//
// Controllers already plugged in when the source is created are reported
// as `DeviceConnected` on the first poll, so the core sees them through
// the same path as hot-plugged ones.
//
// A missing gamepad backend is not fatal: the engine keeps running with
// keyboard input only.
//
//=========================================================================

//=== External Dependencies ===============================================

use gilrs::{Axis, Button, EventType, Gilrs};
use log::{debug, info, warn};

//=== Internal Dependencies ===============================================

use crate::core::device::PlatformHandle;
use crate::core::input::event::{ControllerAxis, ControllerButton, InputEvent};
use crate::core::platform_bridge::PlatformEvent;

//=== GamepadSource =======================================================

pub(crate) struct GamepadSource {
    gilrs: Option<Gilrs>,
    pending: Vec<PlatformEvent>,
}

impl GamepadSource {
    //--- Construction -----------------------------------------------------

    pub(crate) fn new() -> Self {
        let gilrs = match Gilrs::new() {
            Ok(gilrs) => Some(gilrs),
            Err(gilrs::Error::NotImplemented(dummy)) => {
                warn!(target: "platform::gamepad", "Gamepads not supported on this platform");
                Some(dummy)
            }
            Err(e) => {
                warn!(target: "platform::gamepad", "Gamepad backend unavailable: {}", e);
                None
            }
        };

        let pending: Vec<PlatformEvent> = gilrs
            .iter()
            .flat_map(|g| g.gamepads())
            .map(|(id, gamepad)| {
                info!(target: "platform::gamepad", "Controller present at startup: {}", gamepad.name());
                PlatformEvent::DeviceConnected { handle: handle_of(id) }
            })
            .collect();

        Self { gilrs, pending }
    }

    /// Source that never reports anything.
    #[cfg(test)]
    pub(crate) fn disabled() -> Self {
        Self {
            gilrs: None,
            pending: Vec::new(),
        }
    }

    //--- Polling ----------------------------------------------------------

    /// Everything gilrs reported since the last call, in order.
    pub(crate) fn poll(&mut self) -> Vec<PlatformEvent> {
        let mut events = std::mem::take(&mut self.pending);

        let Some(gilrs) = self.gilrs.as_mut() else {
            return events;
        };

        while let Some(gilrs::Event { id, event, .. }) = gilrs.next_event() {
            if let Some(translated) = translate(handle_of(id), &event) {
                events.push(translated);
            }
        }
        events
    }
}

//=========================================================================
// gilrs Conversions
//=========================================================================

fn handle_of(id: gilrs::GamepadId) -> PlatformHandle {
    PlatformHandle(usize::from(id) as u64)
}

fn translate(handle: PlatformHandle, event: &EventType) -> Option<PlatformEvent> {
    let input = match *event {
        EventType::Connected => {
            debug!(target: "platform::gamepad", "Controller {:?} connected", handle);
            return Some(PlatformEvent::DeviceConnected { handle });
        }
        EventType::Disconnected => {
            debug!(target: "platform::gamepad", "Controller {:?} disconnected", handle);
            return Some(PlatformEvent::DeviceDisconnected { handle });
        }
        EventType::ButtonPressed(button, _) => InputEvent::ControllerButtonDown {
            handle,
            button: map_button(button),
        },
        EventType::ButtonReleased(button, _) => InputEvent::ControllerButtonUp {
            handle,
            button: map_button(button),
        },
        // Analog triggers report through ButtonChanged.
        EventType::ButtonChanged(button, value, _) => {
            let axis = trigger_axis(button)?;
            InputEvent::ControllerAxis { handle, axis, value }
        }
        EventType::AxisChanged(axis, value, _) => {
            let axis = map_axis(axis)?;
            InputEvent::ControllerAxis { handle, axis, value }
        }
        _ => return None,
    };
    Some(PlatformEvent::Input(input))
}

/// gilrs calls the bumpers "triggers" and the triggers "triggers 2".
fn map_button(button: Button) -> ControllerButton {
    match button {
        Button::South => ControllerButton::South,
        Button::East => ControllerButton::East,
        Button::West => ControllerButton::West,
        Button::North => ControllerButton::North,
        Button::LeftTrigger => ControllerButton::LeftBumper,
        Button::RightTrigger => ControllerButton::RightBumper,
        Button::LeftTrigger2 => ControllerButton::LeftTrigger,
        Button::RightTrigger2 => ControllerButton::RightTrigger,
        Button::Select => ControllerButton::Select,
        Button::Start => ControllerButton::Start,
        Button::Mode => ControllerButton::Guide,
        Button::LeftThumb => ControllerButton::LeftStick,
        Button::RightThumb => ControllerButton::RightStick,
        Button::DPadUp => ControllerButton::DPadUp,
        Button::DPadDown => ControllerButton::DPadDown,
        Button::DPadLeft => ControllerButton::DPadLeft,
        Button::DPadRight => ControllerButton::DPadRight,
        _ => ControllerButton::Unknown,
    }
}

fn map_axis(axis: Axis) -> Option<ControllerAxis> {
    match axis {
        Axis::LeftStickX => Some(ControllerAxis::LeftStickX),
        Axis::LeftStickY => Some(ControllerAxis::LeftStickY),
        Axis::RightStickX => Some(ControllerAxis::RightStickX),
        Axis::RightStickY => Some(ControllerAxis::RightStickY),
        Axis::LeftZ => Some(ControllerAxis::LeftTrigger),
        Axis::RightZ => Some(ControllerAxis::RightTrigger),
        _ => None,
    }
}

fn trigger_axis(button: Button) -> Option<ControllerAxis> {
    match button {
        Button::LeftTrigger2 => Some(ControllerAxis::LeftTrigger),
        Button::RightTrigger2 => Some(ControllerAxis::RightTrigger),
        _ => None,
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
