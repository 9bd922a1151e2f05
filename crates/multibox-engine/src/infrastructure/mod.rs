//! Infrastructure layer for the broadcast engine.
//!
//! Contains OS-facing adapters: the global input capture hook, the `xdotool`
//! subprocess adapter for window queries and input injection, file-system
//! configuration storage, and the terminal echo guard.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `multibox_core`, but the application layer only ever sees it through the
//! traits it defines (`InputSource` aside, which the binary wires directly).

pub mod input_capture;
pub mod storage;
pub mod terminal;
pub mod xdo;
