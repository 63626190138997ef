//! Keyboard state
//!
//! Platform code feeds raw key events in; game code reads named keys during
//! the simulation step. Events only register while the input is listening.

use std::collections::HashMap;

/// Raw key code as reported by the platform (DOM `keyCode` values)
pub type KeyCode = u32;

/// Common key codes
pub mod keys {
    use super::KeyCode;

    pub const SPACE: KeyCode = 32;
    pub const LEFT: KeyCode = 37;
    pub const UP: KeyCode = 38;
    pub const RIGHT: KeyCode = 39;
    pub const DOWN: KeyCode = 40;
}

#[derive(Debug, Default, Clone)]
pub struct Input {
    /// Code -> logical names bound to it
    bindings: HashMap<KeyCode, Vec<String>>,
    pressed: HashMap<String, bool>,
    listening: bool,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind logical key names to codes. A code may drive several names.
    pub fn add_keys(&mut self, mappings: &[(&str, KeyCode)]) {
        for &(name, code) in mappings {
            self.pressed.entry(name.to_owned()).or_insert(false);
            let names = self.bindings.entry(code).or_default();
            if !names.iter().any(|n| n == name) {
                names.push(name.to_owned());
            }
        }
    }

    /// Apply a key event. Returns true if the code is bound and we are listening.
    pub fn handle_key(&mut self, code: KeyCode, down: bool) -> bool {
        if !self.listening {
            return false;
        }
        let Some(names) = self.bindings.get(&code) else {
            return false;
        };
        for name in names {
            self.pressed.insert(name.clone(), down);
        }
        true
    }

    pub fn is_down(&self, name: &str) -> bool {
        self.pressed.get(name).copied().unwrap_or(false)
    }

    pub fn listen(&mut self) {
        self.listening = true;
    }

    /// Stop taking events and release every key
    pub fn stop_listening(&mut self) {
        self.listening = false;
        self.pressed.values_mut().for_each(|down| *down = false);
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }
}
