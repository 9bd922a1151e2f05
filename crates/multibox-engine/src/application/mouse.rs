//! MouseBroadcaster: fans click releases out to the target windows.
//!
//! Clicks are the only mouse events that broadcast; moves and scrolls are
//! deliberately inert (replicating pointer motion across differently-sized
//! windows is meaningless). The broadcaster holds its own copy of the
//! broadcast flag, kept in lockstep by the key engine, which owns it.

use std::sync::Arc;

use multibox_core::WindowId;
use tracing::{debug, warn};

use crate::application::broadcast_input::InputInjector;

/// Button index sent to the targets for every broadcast click.
const LEFT_BUTTON: u8 = 1;

/// The click fan-out half of the broadcast engine.
pub struct MouseBroadcaster {
    targets: Vec<WindowId>,
    broadcast: bool,
    injector: Arc<dyn InputInjector>,
}

impl MouseBroadcaster {
    /// Creates the broadcaster. Broadcasting starts enabled, matching the
    /// key engine.
    pub fn new(targets: Vec<WindowId>, injector: Arc<dyn InputInjector>) -> Self {
        Self {
            targets,
            broadcast: true,
            injector,
        }
    }

    /// Returns whether click broadcast is currently active.
    pub fn is_broadcasting(&self) -> bool {
        self.broadcast
    }

    /// Toggles click broadcast; called by the key engine alongside its own
    /// flag.
    pub fn set_broadcast(&mut self, broadcast: bool) {
        self.broadcast = broadcast;
    }

    /// Handles a click release: injects a left click into every target while
    /// broadcast is active, otherwise does nothing.
    pub async fn on_click_release(&self) {
        if !self.broadcast {
            return;
        }
        for window in &self.targets {
            debug!(window, "sending click");
            if let Err(error) = self.injector.click(*window, LEFT_BUTTON).await {
                warn!(window, %error, "click injection failed; dropping");
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
