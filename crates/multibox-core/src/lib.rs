//! # multibox-core
//!
//! Shared library for multibox containing the key canonicalization tables,
//! control-key bindings, and the window-list domain types.
//!
//! This crate is used by the broadcast engine and its tests. It has zero
//! dependencies on OS APIs, subprocesses, or input hooks: everything here is
//! pure data and decision logic.
//!
//! - **`keymap`** – Translation from raw captured key identities to the
//!   canonical keysym-style names the injection mechanism accepts, plus
//!   modifier/arrow classification.
//!
//! - **`domain`** – Control bindings (`[modifier+]key` combos, resolved to a
//!   [`KeyAction`] once per event) and the ordered window list with its
//!   master-first invariant.

pub mod domain;
pub mod keymap;

pub use domain::bindings::{BindingError, KeyAction, KeyBindings, KeyCombo};
pub use domain::window::{WindowId, WindowList};
pub use keymap::{CanonicalKey, NamedKey, RawKey};
