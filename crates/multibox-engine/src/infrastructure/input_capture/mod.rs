//! Input capture infrastructure.
//!
//! The production backend installs a global keyboard/mouse listener (via
//! `rdev`) on a dedicated thread. Raw events are placed into a channel and
//! consumed by the single async worker loop, which is the serialization
//! boundary for all engine state: keyboard and mouse events are ordered
//! within their source and mutually excluded against each other simply by
//! sharing the queue.
//!
//! # Testability
//!
//! The [`InputSource`] trait allows unit tests to inject synthetic events
//! without any OS hooks.

use std::sync::mpsc;

use multibox_core::RawKey;

pub mod mock;
pub mod rdev;

/// A raw input event produced by the capture infrastructure.
#[derive(Debug, Clone)]
pub enum RawInputEvent {
    /// A key was pressed down (includes OS key-repeat).
    KeyPress {
        /// Raw identity of the key, canonicalized by the engine.
        key: RawKey,
    },
    /// A key was released.
    KeyRelease {
        /// Raw identity of the key.
        key: RawKey,
    },
    /// A mouse button was released. The engine broadcasts a left click for
    /// any button; moves and scrolls never produce events.
    ClickRelease {
        /// Which physical button was released.
        button: MouseButton,
    },
    /// Cooperative shutdown request, injected into the same channel so it is
    /// processed in order with the events before it.
    Shutdown,
}

/// Mouse button identifier used in [`RawInputEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other(u8),
}

/// Error type for input capture operations.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// The OS-level hook could not be installed.
    #[error("failed to install input hook: {0}")]
    HookInstallFailed(String),
    /// `start` was called twice on the same source.
    #[error("capture service has already been started")]
    AlreadyStarted,
}

/// Trait abstracting input event production.
///
/// The production implementation is [`rdev::RdevInputSource`]; tests use
/// [`mock::MockInputSource`].
pub trait InputSource: Send + Sync {
    /// Starts the input source and returns a receiver for captured events.
    fn start(&self) -> Result<mpsc::Receiver<RawInputEvent>, CaptureError>;

    /// Stops event delivery. Covers both the keyboard and mouse hooks.
    fn stop(&self);
}
