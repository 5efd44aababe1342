//=========================================================================
// Action Map
//=========================================================================
//
// Maps physical keys and controller buttons to named gameplay actions.
//
// Architecture:
//   KeyCode          → HashMap → "action"
//   ControllerButton → HashMap → "action"
//
// One map is shared by the keyboard and every controller. Several inputs
// may resolve to the same action; each input resolves to at most one.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;

//=== Internal Dependencies ===============================================

use super::event::{ControllerButton, KeyCode};

//=== ActionMap ===========================================================

/// Key/button → action name bindings.
///
/// # Examples
///
/// ```
/// use keystone_engine::core::input::{ActionMap, ControllerButton, KeyCode};
///
/// let mut actions = ActionMap::new();
/// actions.bind_key(KeyCode::Space, "jump");
/// actions.bind_button(ControllerButton::South, "jump");
///
/// assert_eq!(actions.key_action(KeyCode::Space), Some("jump"));
/// assert_eq!(actions.button_action(ControllerButton::South), Some("jump"));
/// assert_eq!(actions.key_action(KeyCode::KeyQ), None);
/// ```
#[derive(Debug, Default, Clone)]
pub struct ActionMap {
    key_bindings: HashMap<KeyCode, String>,
    button_bindings: HashMap<ControllerButton, String>,
}

impl ActionMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    //--- Binding API ------------------------------------------------------

    /// Binds a key to an action, replacing any previous binding of the key.
    pub fn bind_key(&mut self, key: KeyCode, action: impl Into<String>) {
        self.key_bindings.insert(key, action.into());
    }

    /// Binds a controller button to an action.
    pub fn bind_button(&mut self, button: ControllerButton, action: impl Into<String>) {
        self.button_bindings.insert(button, action.into());
    }

    pub fn unbind_key(&mut self, key: KeyCode) {
        self.key_bindings.remove(&key);
    }

    pub fn unbind_button(&mut self, button: ControllerButton) {
        self.button_bindings.remove(&button);
    }

    /// Removes every key and button bound to `action`.
    pub fn unbind_action(&mut self, action: &str) {
        self.key_bindings.retain(|_, a| a != action);
        self.button_bindings.retain(|_, a| a != action);
    }

    pub fn clear(&mut self) {
        self.key_bindings.clear();
        self.button_bindings.clear();
    }

    //--- Query API --------------------------------------------------------

    pub fn key_action(&self, key: KeyCode) -> Option<&str> {
        self.key_bindings.get(&key).map(String::as_str)
    }

    pub fn button_action(&self, button: ControllerButton) -> Option<&str> {
        self.button_bindings.get(&button).map(String::as_str)
    }

    /// Keys bound to `action` (unordered).
    pub fn keys_for<'a>(&'a self, action: &'a str) -> impl Iterator<Item = KeyCode> + 'a {
        self.key_bindings
            .iter()
            .filter(move |(_, a)| a.as_str() == action)
            .map(|(k, _)| *k)
    }

    /// Buttons bound to `action` (unordered).
    pub fn buttons_for<'a>(&'a self, action: &'a str) -> impl Iterator<Item = ControllerButton> + 'a {
        self.button_bindings
            .iter()
            .filter(move |(_, a)| a.as_str() == action)
            .map(|(b, _)| *b)
    }

    pub fn len(&self) -> usize {
        self.key_bindings.len() + self.button_bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
