//! Control-key bindings and per-event action classification.
//!
//! Four logical actions are bound to key combos of the form `[modifier+]key`:
//! start-broadcast, stop-broadcast, stop-program, and next-window. The engine
//! resolves every canonicalized key press against these bindings exactly once,
//! obtaining a [`KeyAction`] that is then dispatched through a single `match`.
//!
//! Classification priority (highest first): stop-program, arrow, modifier,
//! start-broadcast, next-window, stop-broadcast, ordinary. The stop-broadcast
//! comparison matches on the bare key and only when the configured combo
//! carries no modifier, so the stop key stays observable while a modifier is
//! held and while broadcast is paused.

use std::fmt;

use thiserror::Error;

use crate::keymap::{self, CanonicalKey};

/// Error raised for malformed binding strings. Fatal at startup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BindingError {
    /// The binding string was empty.
    #[error("empty key binding")]
    Empty,

    /// The binding string did not have the `[modifier+]key` shape.
    #[error("malformed key binding {0:?}: expected [modifier+]key")]
    Malformed(String),

    /// The modifier part was not one of the fixed modifier keys.
    #[error("unknown modifier {modifier:?} in binding {binding:?}")]
    UnknownModifier { modifier: String, binding: String },
}

/// The action a key press resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Terminate the program. The sole termination path.
    StopProgram,
    /// Resume broadcasting to the target windows.
    StartBroadcast,
    /// Pause broadcasting on release.
    StopBroadcast,
    /// Activate the next window in the list, with wraparound.
    NextWindow,
    /// One of the fixed modifier keys.
    Modifier,
    /// An arrow key; reserved for local navigation, never forwarded.
    Arrow,
    /// Any other key; forwarded while broadcasting.
    Ordinary,
}

/// A parsed key combo: an optional single modifier plus a canonical key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCombo {
    /// The modifier prefix, if any. At most one.
    pub modifier: Option<CanonicalKey>,
    /// The canonical key name.
    pub key: CanonicalKey,
}

impl KeyCombo {
    /// Parses a `[modifier+]key` binding string.
    ///
    /// # Errors
    ///
    /// Returns [`BindingError`] when the string is empty, has a malformed
    /// shape, or names a modifier outside the fixed modifier set.
    pub fn parse(binding: &str) -> Result<Self, BindingError> {
        let binding = binding.trim();
        if binding.is_empty() {
            return Err(BindingError::Empty);
        }
        match binding.split_once('+') {
            None => Ok(Self {
                modifier: None,
                key: CanonicalKey::from(binding),
            }),
            Some((modifier, key)) => {
                if modifier.is_empty() || key.is_empty() || key.contains('+') {
                    return Err(BindingError::Malformed(binding.to_string()));
                }
                let modifier_key = CanonicalKey::from(modifier);
                if !keymap::is_modifier(&modifier_key) {
                    return Err(BindingError::UnknownModifier {
                        modifier: modifier.to_string(),
                        binding: binding.to_string(),
                    });
                }
                Ok(Self {
                    modifier: Some(modifier_key),
                    key: CanonicalKey::from(key),
                })
            }
        }
    }

    /// Returns `true` when the combo matches the held modifier and key.
    fn matches(&self, modifier: Option<&CanonicalKey>, key: &CanonicalKey) -> bool {
        self.modifier.as_ref() == modifier && self.key == *key
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.modifier {
            Some(modifier) => write!(f, "{modifier}+{}", self.key),
            None => write!(f, "{}", self.key),
        }
    }
}

/// The four control bindings, immutable after load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBindings {
    /// Combo that resumes broadcasting.
    pub start_broadcast: KeyCombo,
    /// Combo that pauses broadcasting.
    pub stop_broadcast: KeyCombo,
    /// Combo that terminates the program.
    pub stop_program: KeyCombo,
    /// Combo that activates the next window in the list.
    pub next_window: KeyCombo,
}

impl KeyBindings {
    /// Parses the four binding strings as loaded from configuration.
    ///
    /// # Errors
    ///
    /// Returns the first [`BindingError`] encountered; the caller treats this
    /// as fatal before the engine starts.
    pub fn from_strings(
        start_broadcast: &str,
        stop_broadcast: &str,
        stop_program: &str,
        next_window: &str,
    ) -> Result<Self, BindingError> {
        Ok(Self {
            start_broadcast: KeyCombo::parse(start_broadcast)?,
            stop_broadcast: KeyCombo::parse(stop_broadcast)?,
            stop_program: KeyCombo::parse(stop_program)?,
            next_window: KeyCombo::parse(next_window)?,
        })
    }

    /// Returns `true` when `key` alone matches the stop-broadcast binding.
    ///
    /// The stop gate ignores the held modifier so the key stays observable
    /// mid-combo; it therefore only ever fires for unmodified stop bindings.
    pub fn is_stop_broadcast_key(&self, key: &CanonicalKey) -> bool {
        self.stop_broadcast.modifier.is_none() && self.stop_broadcast.key == *key
    }

    /// Resolves the action for `key` pressed while `modifier` is held.
    pub fn classify(&self, modifier: Option<&CanonicalKey>, key: &CanonicalKey) -> KeyAction {
        if self.stop_program.matches(modifier, key) {
            KeyAction::StopProgram
        } else if keymap::is_arrow(key) {
            KeyAction::Arrow
        } else if keymap::is_modifier(key) {
            KeyAction::Modifier
        } else if self.start_broadcast.matches(modifier, key) {
            KeyAction::StartBroadcast
        } else if self.next_window.matches(modifier, key) {
            KeyAction::NextWindow
        } else if self.is_stop_broadcast_key(key) {
            KeyAction::StopBroadcast
        } else {
            KeyAction::Ordinary
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
