//=========================================================================
// Input Event Types
//
// Defines the internal representation of low-level input events.
//
// This module abstracts away platform-specific input (winit keyboards,
// gilrs gamepads) into a unified, engine-friendly format used by the
// input router.
//
// Responsibilities:
// - Represent keyboard keys and controller buttons/axes portably
// - Provide equality and hashing semantics for deduplication
// - Enable event coalescing (e.g., multiple axis updates → last value)
//
// Event Flow:
// ```text
// Platform Layer (winit / gilrs)
//         ↓
//    InputEvent (this module)
//         ↓
//    InputRouter (edge delivery + state tracking)
//         ↓
//    Pawn hooks (gameplay)
// ```
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::hash::{Hash, Hasher};

//=== Internal Dependencies ===============================================

use crate::core::device::PlatformHandle;

//=== KeyCode =============================================================

/// Physical keyboard key identifier.
///
/// Represents the physical key location, not the character produced.
/// For example, `KeyA` is always the same physical key regardless of
/// keyboard layout (QWERTY vs AZERTY).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    //--- Numeric Keys -----------------------------------------------------

    /// Number row: 0-9
    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,

    //--- Alphabetic Keys --------------------------------------------------

    /// Letter keys: A-Z (physical location, not character)
    KeyA, KeyB, KeyC, KeyD, KeyE, KeyF, KeyG, KeyH, KeyI,
    KeyJ, KeyK, KeyL, KeyM, KeyN, KeyO, KeyP, KeyQ, KeyR,
    KeyS, KeyT, KeyU, KeyV, KeyW, KeyX, KeyY, KeyZ,

    //--- Arrow Keys -------------------------------------------------------

    ArrowDown,
    ArrowLeft,
    ArrowRight,
    ArrowUp,

    //--- Modifier Keys ----------------------------------------------------

    ShiftLeft,
    ShiftRight,
    ControlLeft,
    ControlRight,
    AltLeft,
    AltRight,

    //--- Special Keys -----------------------------------------------------

    Space,
    Enter,
    Escape,
    Tab,
    Backspace,
    Delete,

    /// Fallback for keys not explicitly mapped by the platform layer.
    Unidentified,
}

//=== ControllerButton ====================================================

/// Game controller button, named by position (Xbox-style layout).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControllerButton {
    /// Bottom face button (A / Cross).
    South,
    /// Right face button (B / Circle).
    East,
    /// Left face button (X / Square).
    West,
    /// Top face button (Y / Triangle).
    North,
    LeftBumper,
    RightBumper,
    LeftTrigger,
    RightTrigger,
    Select,
    Start,
    Guide,
    LeftStick,
    RightStick,
    DPadUp,
    DPadDown,
    DPadLeft,
    DPadRight,
    /// Any button the platform reports but the engine does not name.
    Unknown,
}

//=== ControllerAxis ======================================================

/// Analog controller axis.
///
/// Stick axes range over `[-1.0, 1.0]` (positive Y is up), triggers over
/// `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControllerAxis {
    LeftStickX,
    LeftStickY,
    RightStickX,
    RightStickY,
    LeftTrigger,
    RightTrigger,
}

impl ControllerAxis {
    /// All axes, in storage order.
    pub const ALL: [ControllerAxis; 6] = [
        ControllerAxis::LeftStickX,
        ControllerAxis::LeftStickY,
        ControllerAxis::RightStickX,
        ControllerAxis::RightStickY,
        ControllerAxis::LeftTrigger,
        ControllerAxis::RightTrigger,
    ];

    /// Dense index used by per-controller axis storage.
    pub(crate) fn index(self) -> usize {
        match self {
            ControllerAxis::LeftStickX => 0,
            ControllerAxis::LeftStickY => 1,
            ControllerAxis::RightStickX => 2,
            ControllerAxis::RightStickY => 3,
            ControllerAxis::LeftTrigger => 4,
            ControllerAxis::RightTrigger => 5,
        }
    }
}

//=== InputEvent ==========================================================

/// Low-level input event from the platform layer.
///
/// # Equality & Hashing Semantics
///
/// Events are compared by type + payload. Special case: `ControllerAxis`
/// events are equal when they name the same controller and axis,
/// regardless of value, allowing coalescing (last value wins).
///
/// ```text
/// KeyDown{A}                 == KeyDown{A}                  ✓
/// KeyDown{A}                 == KeyUp{A}                    ✗
/// ButtonDown{h1, South}      == ButtonDown{h2, South}       ✗ (different pad)
/// Axis{h1, LeftX, 0.2}       == Axis{h1, LeftX, -0.9}       ✓
/// ```
///
/// # Event Types
///
/// - **KeyDown/KeyUp**: Discrete keyboard edges
/// - **ControllerButtonDown/Up**: Discrete controller edges
/// - **ControllerAxis**: Continuous analog updates
/// - **Unidentified**: Unknown events (ignored by the router)
#[derive(Debug, Clone)]
pub enum InputEvent {
    /// Key pressed down.
    KeyDown { key: KeyCode },

    /// Key released.
    KeyUp { key: KeyCode },

    /// Controller button pressed.
    ControllerButtonDown {
        handle: PlatformHandle,
        button: ControllerButton,
    },

    /// Controller button released.
    ControllerButtonUp {
        handle: PlatformHandle,
        button: ControllerButton,
    },

    /// Controller axis moved to a new value.
    ControllerAxis {
        handle: PlatformHandle,
        axis: ControllerAxis,
        value: f32,
    },

    /// Unrecognized or unsupported event.
    Unidentified,
}

impl InputEvent {
    /// Returns `true` for continuous (coalescable) events.
    pub fn is_continuous(&self) -> bool {
        matches!(self, InputEvent::ControllerAxis { .. })
    }

    /// Returns the controller this event originates from, if any.
    pub fn controller(&self) -> Option<PlatformHandle> {
        match self {
            InputEvent::ControllerButtonDown { handle, .. }
            | InputEvent::ControllerButtonUp { handle, .. }
            | InputEvent::ControllerAxis { handle, .. } => Some(*handle),
            _ => None,
        }
    }
}

//--- Trait Implementations -----------------------------------------------

/// Equality implementation for InputEvent.
///
/// Rules:
/// - Same discriminant
/// - Same key / (controller, button) / (controller, axis) payload
/// - Axis value ignored for coalescing
impl PartialEq for InputEvent {
    fn eq(&self, other: &Self) -> bool {
        use InputEvent::*;
        match (self, other) {
            (KeyDown { key: a }, KeyDown { key: b }) => a == b,
            (KeyUp { key: a }, KeyUp { key: b }) => a == b,
            (
                ControllerButtonDown { handle: ha, button: a },
                ControllerButtonDown { handle: hb, button: b },
            ) => ha == hb && a == b,
            (
                ControllerButtonUp { handle: ha, button: a },
                ControllerButtonUp { handle: hb, button: b },
            ) => ha == hb && a == b,
            (
                ControllerAxis { handle: ha, axis: a, .. },
                ControllerAxis { handle: hb, axis: b, .. },
            ) => ha == hb && a == b,
            (Unidentified, Unidentified) => true,
            _ => false,
        }
    }
}

impl Eq for InputEvent {}

/// Hash implementation for InputEvent.
///
/// Consistent with equality: axis values are NOT hashed.
impl Hash for InputEvent {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);

        match self {
            Self::KeyDown { key } | Self::KeyUp { key } => key.hash(state),
            Self::ControllerButtonDown { handle, button }
            | Self::ControllerButtonUp { handle, button } => {
                handle.hash(state);
                button.hash(state);
            }
            Self::ControllerAxis { handle, axis, .. } => {
                handle.hash(state);
                axis.hash(state);
            }
            Self::Unidentified => {}
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
