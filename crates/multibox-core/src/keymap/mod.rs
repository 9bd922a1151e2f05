//! Key name translation tables for canonicalizing captured input.
//!
//! The canonical representation is the X11 keysym-style name accepted by the
//! injection mechanism (`"a"`, `"space"`, `"Control_L"`, `"asciitilde"`, …).
//! Raw key identities reported by the capture layer are translated to
//! canonical names at the engine boundary; everything downstream (the pressed
//! set, modifier tracking, binding comparison, injection commands) works on
//! canonical names only.
//!
//! Keys absent from the table and without a printable character yield no
//! canonical name, and the corresponding event is dropped. Left and right
//! variants of a modifier fold to a single canonical token, and the backquote
//! key folds to `asciitilde` together with its shifted tilde variant.

use std::fmt;

/// Identity of a captured key before canonicalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawKey {
    /// A key with a printable character representation.
    Char(char),
    /// A named non-printable key.
    Named(NamedKey),
}

/// Non-printable keys the capture layer can report.
///
/// Deliberately wider than the translation table: variants without a mapping
/// (navigation block, function keys, …) canonicalize to `None` and are
/// ignored by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedKey {
    Space,
    ControlLeft,
    ControlRight,
    AltLeft,
    AltRight,
    ShiftLeft,
    ShiftRight,
    SuperLeft,
    SuperRight,
    Escape,
    Tab,
    Enter,
    Up,
    Down,
    Left,
    Right,
    Backspace,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,
    Insert,
    CapsLock,
    /// Function key F1–F24.
    Function(u8),
}

/// Canonical key name: the normalized, injection-ready form of a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalKey(String);

impl CanonicalKey {
    /// Wraps a canonical name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the canonical name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CanonicalKey {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

/// The fixed modifier set, in canonical form.
pub const MODIFIER_KEYS: [&str; 4] = ["Control_L", "Alt_L", "Shift_L", "super"];

/// The arrow keys, in canonical form. Reserved for local navigation and
/// never broadcast.
pub const ARROW_KEYS: [&str; 4] = ["Up", "Down", "Left", "Right"];

/// Returns `true` if `key` is one of the fixed modifier keys.
pub fn is_modifier(key: &CanonicalKey) -> bool {
    MODIFIER_KEYS.contains(&key.as_str())
}

/// Returns `true` if `key` is an arrow key.
pub fn is_arrow(key: &CanonicalKey) -> bool {
    ARROW_KEYS.contains(&key.as_str())
}

/// Translates a raw key identity to its canonical name.
///
/// Returns `None` for named keys with no table entry; those events carry no
/// information the engine can forward and are dropped by the caller.
pub fn canonical_name(raw: &RawKey) -> Option<CanonicalKey> {
    match raw {
        // The backquote key and its shifted tilde variant are the same
        // physical key; both normalize to the asciitilde keysym.
        RawKey::Char('`') | RawKey::Char('~') => Some(CanonicalKey::from("asciitilde")),
        RawKey::Char(c) => Some(CanonicalKey::new(c.to_string())),
        RawKey::Named(named) => named_key_name(*named).map(CanonicalKey::from),
    }
}

/// Table entry for a named key, or `None` when the key has no canonical form.
fn named_key_name(named: NamedKey) -> Option<&'static str> {
    match named {
        NamedKey::Space => Some("space"),
        NamedKey::ControlLeft | NamedKey::ControlRight => Some("Control_L"),
        NamedKey::AltLeft | NamedKey::AltRight => Some("Alt_L"),
        NamedKey::ShiftLeft | NamedKey::ShiftRight => Some("Shift_L"),
        NamedKey::SuperLeft | NamedKey::SuperRight => Some("super"),
        NamedKey::Escape => Some("Escape"),
        NamedKey::Tab => Some("Tab"),
        NamedKey::Enter => Some("KP_Enter"),
        NamedKey::Up => Some("Up"),
        NamedKey::Down => Some("Down"),
        NamedKey::Left => Some("Left"),
        NamedKey::Right => Some("Right"),
        NamedKey::Backspace
        | NamedKey::Delete
        | NamedKey::Home
        | NamedKey::End
        | NamedKey::PageUp
        | NamedKey::PageDown
        | NamedKey::Insert
        | NamedKey::CapsLock
        | NamedKey::Function(_) => None,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
