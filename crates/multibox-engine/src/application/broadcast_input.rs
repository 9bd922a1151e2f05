//! BroadcastEngine: turns captured input events into per-window synthetic input.
//!
//! This use case is the heart of multibox. It consumes canonicalized key
//! events from the capture service, tracks the held modifier, the pressed-key
//! set, and the broadcast flag, and fans key-down/key-up injections out to
//! every slave window. Control combos (start/stop broadcast, next-window,
//! stop-program) are resolved once per event via [`KeyBindings::classify`]
//! and never reach the target windows as ordinary input, except that their
//! release key-up follows the normal path.
//!
//! All engine state is owned by a single instance driven from one worker
//! loop; keyboard and mouse events are serialized through the same channel,
//! so no further locking is needed.
//!
//! Injection failures are logged and the affected action dropped — the
//! operator sees no interruption of capture from a single failed injection.
//! The only way out is the stop-program combo (or the shutdown poison event),
//! reported to the worker loop as [`ControlFlow::Break`]; the caller then
//! resumes terminal echo and stops the capture hooks.

use std::collections::HashSet;
use std::ops::ControlFlow;
use std::sync::Arc;

use async_trait::async_trait;
use multibox_core::{
    keymap::{self, CanonicalKey, RawKey},
    KeyAction, KeyBindings, WindowId, WindowList,
};
use tracing::{debug, info, warn};

use crate::application::mouse::MouseBroadcaster;
use crate::application::resolve_windows::WindowResolver;
use crate::infrastructure::input_capture::RawInputEvent;

/// Trait for injecting synthetic input into a target window.
///
/// The production implementation shells out to `xdotool`; test
/// implementations record calls.
#[async_trait]
pub trait InputInjector: Send + Sync {
    /// Injects a key-down for the (possibly modifier-prefixed) `key`.
    async fn key_down(&self, window: WindowId, key: &str) -> Result<(), String>;

    /// Injects a key-up for the (possibly modifier-prefixed) `key`.
    async fn key_up(&self, window: WindowId, key: &str) -> Result<(), String>;

    /// Injects a click of `button` (1 = left).
    async fn click(&self, window: WindowId, button: u8) -> Result<(), String>;
}

/// The input broadcast engine.
///
/// Owns the mouse broadcaster and propagates broadcast toggles to it, so a
/// single toggle keeps keyboard and click fan-out in lockstep.
pub struct BroadcastEngine {
    bindings: KeyBindings,
    /// Untranslated ids, master first; used for focus tracking and activation.
    window_list: WindowList,
    /// Translated master ids; receive forced key-ups from `clear_modifiers`.
    master_ids: Vec<WindowId>,
    /// Translated slave ids; the injection targets.
    slave_ids: Vec<WindowId>,
    /// The held modifier, if any. A new modifier replaces the previous one.
    modifier: Option<CanonicalKey>,
    /// Keys whose key-down has been injected and whose key-up has not.
    pressed: HashSet<CanonicalKey>,
    broadcast: bool,
    mouse: MouseBroadcaster,
    injector: Arc<dyn InputInjector>,
    resolver: WindowResolver,
}

impl BroadcastEngine {
    /// Creates the engine and clears any stuck modifiers on the managed
    /// windows. Broadcasting starts enabled.
    pub async fn new(
        bindings: KeyBindings,
        window_list: WindowList,
        master_ids: Vec<WindowId>,
        slave_ids: Vec<WindowId>,
        injector: Arc<dyn InputInjector>,
        resolver: WindowResolver,
    ) -> Self {
        let mouse = MouseBroadcaster::new(slave_ids.clone(), Arc::clone(&injector));
        let mut engine = Self {
            bindings,
            window_list,
            master_ids,
            slave_ids,
            modifier: None,
            pressed: HashSet::new(),
            broadcast: true,
            mouse,
            injector,
            resolver,
        };
        engine.clear_modifiers().await;
        engine
    }

    /// Returns whether key broadcast is currently active.
    pub fn is_broadcasting(&self) -> bool {
        self.broadcast
    }

    /// Returns the mouse broadcaster.
    pub fn mouse(&self) -> &MouseBroadcaster {
        &self.mouse
    }

    /// Handles one captured event, returning [`ControlFlow::Break`] when the
    /// worker loop must shut down.
    pub async fn handle_event(&mut self, event: RawInputEvent) -> ControlFlow<()> {
        match event {
            RawInputEvent::KeyPress { key } => self.on_key_press(key).await,
            RawInputEvent::KeyRelease { key } => {
                self.on_key_release(key).await;
                ControlFlow::Continue(())
            }
            RawInputEvent::ClickRelease { .. } => {
                self.mouse.on_click_release().await;
                ControlFlow::Continue(())
            }
            RawInputEvent::Shutdown => {
                info!("stop event received; shutting down");
                ControlFlow::Break(())
            }
        }
    }

    async fn on_key_press(&mut self, raw: RawKey) -> ControlFlow<()> {
        let Some(key) = keymap::canonical_name(&raw) else {
            return ControlFlow::Continue(());
        };
        if self.tracked_focus().await.is_none() {
            return ControlFlow::Continue(());
        }
        let action = self.bindings.classify(self.modifier.as_ref(), &key);
        match action {
            KeyAction::StopProgram => {
                info!("stop-program key detected; stopping");
                return ControlFlow::Break(());
            }
            KeyAction::Arrow => {
                debug!(key = %key, "ignoring arrow key press");
                return ControlFlow::Continue(());
            }
            KeyAction::Modifier => {
                debug!(key = %key, "tracking modifier");
                self.modifier = Some(key.clone());
            }
            _ => {}
        }
        // OS key-repeat delivers additional presses while a key is held;
        // only the first one is forwarded.
        if self.pressed.insert(key.clone()) {
            debug!(key = %key, held = self.pressed.len(), "key pressed");
            self.dispatch_key_down(&key, action).await;
        }
        ControlFlow::Continue(())
    }

    async fn on_key_release(&mut self, raw: RawKey) {
        let Some(key) = keymap::canonical_name(&raw) else {
            return;
        };
        if self.tracked_focus().await.is_none() {
            return;
        }
        if keymap::is_modifier(&key) {
            debug!(key = %key, "releasing modifier");
            self.modifier = None;
        }
        if self.pressed.remove(&key) {
            debug!(key = %key, held = self.pressed.len(), "key released");
            self.dispatch_key_up(&key).await;
        }
    }

    async fn dispatch_key_down(&mut self, key: &CanonicalKey, action: KeyAction) {
        match action {
            KeyAction::StartBroadcast => {
                self.clear_modifiers().await;
                self.broadcast = true;
                self.mouse.set_broadcast(true);
                debug!("broadcast started");
                return;
            }
            KeyAction::NextWindow => {
                self.clear_modifiers().await;
                self.next_window().await;
                return;
            }
            _ => {}
        }
        let stop_key = self.bindings.is_stop_broadcast_key(key);
        if self.broadcast || stop_key {
            let combo = self.prefixed(key);
            for window in &self.slave_ids {
                debug!(key = %combo, window, "sending keydown");
                if let Err(error) = self.injector.key_down(*window, &combo).await {
                    warn!(window, %error, "keydown injection failed; dropping");
                }
            }
        }
        if stop_key {
            // The control key must never appear held to the targets.
            let combo = self.prefixed(key);
            for window in &self.slave_ids {
                if let Err(error) = self.injector.key_up(*window, &combo).await {
                    warn!(window, %error, "keyup injection failed; dropping");
                }
            }
        }
    }

    async fn dispatch_key_up(&mut self, key: &CanonicalKey) {
        let stop_key = self.bindings.is_stop_broadcast_key(key);
        // The gate reads the pre-toggle broadcast state; the stop key is
        // observable even while paused so broadcast can be toggled again.
        if self.broadcast || stop_key {
            let combo = self.prefixed(key);
            for window in &self.slave_ids {
                debug!(key = %combo, window, "sending keyup");
                if let Err(error) = self.injector.key_up(*window, &combo).await {
                    warn!(window, %error, "keyup injection failed; dropping");
                }
            }
        }
        if stop_key {
            self.clear_modifiers().await;
            if self.broadcast {
                self.broadcast = false;
                self.mouse.set_broadcast(false);
                debug!("broadcast stopped");
            }
        }
    }

    /// Force-issues a key-up for every fixed modifier and every arrow key to
    /// both the master and slave window sets, and resets the tracked
    /// modifier. Runs unconditionally: focus changes can leave the windows
    /// believing a key is still held, and this is the corrective action.
    pub async fn clear_modifiers(&mut self) {
        debug!("clearing modifiers on all managed windows");
        self.modifier = None;
        for key in keymap::MODIFIER_KEYS.into_iter().chain(keymap::ARROW_KEYS) {
            for window in self.master_ids.iter().chain(self.slave_ids.iter()) {
                if let Err(error) = self.injector.key_up(*window, key).await {
                    warn!(window, key, %error, "forced keyup failed");
                }
            }
        }
    }

    async fn next_window(&mut self) {
        if self.window_list.is_empty() {
            warn!("window list is empty; ignoring next-window");
            return;
        }
        let current = self.tracked_focus().await;
        let Some(next) = self.window_list.next_index(current) else {
            return;
        };
        if let Some(window) = self.window_list.get(next) {
            debug!(index = next, window, "activating next window");
            if let Err(error) = self.resolver.activate(window).await {
                warn!(window, %error, "window activation failed");
            }
        }
    }

    async fn tracked_focus(&self) -> Option<usize> {
        match self.resolver.current_focus(&self.window_list).await {
            Ok(index) => index,
            Err(error) => {
                warn!(%error, "focus query failed; treating focus as untracked");
                None
            }
        }
    }

    fn prefixed(&self, key: &CanonicalKey) -> String {
        match &self.modifier {
            Some(modifier) => format!("{modifier}+{key}"),
            None => key.to_string(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
