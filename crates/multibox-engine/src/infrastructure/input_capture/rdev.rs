//! Global input capture backed by the `rdev` listener.
//!
//! `rdev::listen` installs the platform keyboard/mouse hooks and blocks the
//! calling thread, so the listener runs on a dedicated thread that forwards
//! translated events into an `mpsc` channel. Key identities are mapped from
//! physical `rdev::Key` positions (letters, digits, and punctuation map to
//! their US-layout characters; other printable keys fall back to the
//! OS-reported character, when present). Using the physical position keeps
//! press and release symmetric — release events do not always carry the
//! translated character.
//!
//! The hook cannot be uninstalled once `listen` has been entered; `stop()`
//! flips a flag so the callback discards further events, and the detached
//! thread exits with the process.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    mpsc, Arc,
};
use std::thread;

use multibox_core::{NamedKey, RawKey};
use rdev::{Button, Event, EventType, Key};
use tracing::error;

use super::{CaptureError, InputSource, MouseButton, RawInputEvent};

/// Production input source: one global hook covering keyboard and mouse.
pub struct RdevInputSource {
    running: Arc<AtomicBool>,
    started: AtomicBool,
}

impl RdevInputSource {
    /// Creates the source. The hook is not installed until `start`.
    pub fn new() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(false)),
            started: AtomicBool::new(false),
        }
    }
}

impl Default for RdevInputSource {
    fn default() -> Self {
        Self::new()
    }
}

impl InputSource for RdevInputSource {
    fn start(&self) -> Result<mpsc::Receiver<RawInputEvent>, CaptureError> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(CaptureError::AlreadyStarted);
        }
        self.running.store(true, Ordering::SeqCst);

        let (tx, rx) = mpsc::channel();
        let running = Arc::clone(&self.running);
        thread::Builder::new()
            .name("input-capture".to_string())
            .spawn(move || {
                let result = rdev::listen(move |event| {
                    if !running.load(Ordering::Relaxed) {
                        return;
                    }
                    if let Some(raw) = translate_event(event) {
                        if tx.send(raw).is_err() {
                            // Consumer is gone; stop forwarding.
                            running.store(false, Ordering::Relaxed);
                        }
                    }
                });
                if let Err(listen_error) = result {
                    error!(?listen_error, "global input listener failed");
                }
            })
            .map_err(|e| CaptureError::HookInstallFailed(e.to_string()))?;

        Ok(rx)
    }

    fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

/// Translates one hook event into a [`RawInputEvent`], or `None` for event
/// kinds the engine never consumes (presses of mouse buttons, pointer moves,
/// wheel) and keys without any usable identity.
fn translate_event(event: Event) -> Option<RawInputEvent> {
    match event.event_type {
        EventType::KeyPress(key) => {
            translate_key(key, event.name.as_deref()).map(|key| RawInputEvent::KeyPress { key })
        }
        EventType::KeyRelease(key) => {
            translate_key(key, event.name.as_deref()).map(|key| RawInputEvent::KeyRelease { key })
        }
        EventType::ButtonRelease(button) => Some(RawInputEvent::ClickRelease {
            button: translate_button(button),
        }),
        EventType::ButtonPress(_) | EventType::MouseMove { .. } | EventType::Wheel { .. } => None,
    }
}

fn translate_button(button: Button) -> MouseButton {
    match button {
        Button::Left => MouseButton::Left,
        Button::Right => MouseButton::Right,
        Button::Middle => MouseButton::Middle,
        Button::Unknown(code) => MouseButton::Other(code),
    }
}

/// Maps an `rdev::Key` to its raw identity.
fn translate_key(key: Key, name: Option<&str>) -> Option<RawKey> {
    let raw = match key {
        // Modifiers. rdev reports left Alt as `Alt` and right Alt as `AltGr`.
        Key::ControlLeft => RawKey::Named(NamedKey::ControlLeft),
        Key::ControlRight => RawKey::Named(NamedKey::ControlRight),
        Key::Alt => RawKey::Named(NamedKey::AltLeft),
        Key::AltGr => RawKey::Named(NamedKey::AltRight),
        Key::ShiftLeft => RawKey::Named(NamedKey::ShiftLeft),
        Key::ShiftRight => RawKey::Named(NamedKey::ShiftRight),
        Key::MetaLeft => RawKey::Named(NamedKey::SuperLeft),
        Key::MetaRight => RawKey::Named(NamedKey::SuperRight),

        Key::Space => RawKey::Named(NamedKey::Space),
        Key::Escape => RawKey::Named(NamedKey::Escape),
        Key::Tab => RawKey::Named(NamedKey::Tab),
        Key::Return | Key::KpReturn => RawKey::Named(NamedKey::Enter),

        Key::UpArrow => RawKey::Named(NamedKey::Up),
        Key::DownArrow => RawKey::Named(NamedKey::Down),
        Key::LeftArrow => RawKey::Named(NamedKey::Left),
        Key::RightArrow => RawKey::Named(NamedKey::Right),

        Key::Backspace => RawKey::Named(NamedKey::Backspace),
        Key::Delete => RawKey::Named(NamedKey::Delete),
        Key::Home => RawKey::Named(NamedKey::Home),
        Key::End => RawKey::Named(NamedKey::End),
        Key::PageUp => RawKey::Named(NamedKey::PageUp),
        Key::PageDown => RawKey::Named(NamedKey::PageDown),
        Key::Insert => RawKey::Named(NamedKey::Insert),
        Key::CapsLock => RawKey::Named(NamedKey::CapsLock),

        Key::F1 => RawKey::Named(NamedKey::Function(1)),
        Key::F2 => RawKey::Named(NamedKey::Function(2)),
        Key::F3 => RawKey::Named(NamedKey::Function(3)),
        Key::F4 => RawKey::Named(NamedKey::Function(4)),
        Key::F5 => RawKey::Named(NamedKey::Function(5)),
        Key::F6 => RawKey::Named(NamedKey::Function(6)),
        Key::F7 => RawKey::Named(NamedKey::Function(7)),
        Key::F8 => RawKey::Named(NamedKey::Function(8)),
        Key::F9 => RawKey::Named(NamedKey::Function(9)),
        Key::F10 => RawKey::Named(NamedKey::Function(10)),
        Key::F11 => RawKey::Named(NamedKey::Function(11)),
        Key::F12 => RawKey::Named(NamedKey::Function(12)),

        // Printable keys by physical position (US layout).
        Key::BackQuote => RawKey::Char('`'),
        Key::KeyA => RawKey::Char('a'),
        Key::KeyB => RawKey::Char('b'),
        Key::KeyC => RawKey::Char('c'),
        Key::KeyD => RawKey::Char('d'),
        Key::KeyE => RawKey::Char('e'),
        Key::KeyF => RawKey::Char('f'),
        Key::KeyG => RawKey::Char('g'),
        Key::KeyH => RawKey::Char('h'),
        Key::KeyI => RawKey::Char('i'),
        Key::KeyJ => RawKey::Char('j'),
        Key::KeyK => RawKey::Char('k'),
        Key::KeyL => RawKey::Char('l'),
        Key::KeyM => RawKey::Char('m'),
        Key::KeyN => RawKey::Char('n'),
        Key::KeyO => RawKey::Char('o'),
        Key::KeyP => RawKey::Char('p'),
        Key::KeyQ => RawKey::Char('q'),
        Key::KeyR => RawKey::Char('r'),
        Key::KeyS => RawKey::Char('s'),
        Key::KeyT => RawKey::Char('t'),
        Key::KeyU => RawKey::Char('u'),
        Key::KeyV => RawKey::Char('v'),
        Key::KeyW => RawKey::Char('w'),
        Key::KeyX => RawKey::Char('x'),
        Key::KeyY => RawKey::Char('y'),
        Key::KeyZ => RawKey::Char('z'),
        Key::Num0 | Key::Kp0 => RawKey::Char('0'),
        Key::Num1 | Key::Kp1 => RawKey::Char('1'),
        Key::Num2 | Key::Kp2 => RawKey::Char('2'),
        Key::Num3 | Key::Kp3 => RawKey::Char('3'),
        Key::Num4 | Key::Kp4 => RawKey::Char('4'),
        Key::Num5 | Key::Kp5 => RawKey::Char('5'),
        Key::Num6 | Key::Kp6 => RawKey::Char('6'),
        Key::Num7 | Key::Kp7 => RawKey::Char('7'),
        Key::Num8 | Key::Kp8 => RawKey::Char('8'),
        Key::Num9 | Key::Kp9 => RawKey::Char('9'),
        Key::Minus | Key::KpMinus => RawKey::Char('-'),
        Key::Equal => RawKey::Char('='),
        Key::KpPlus => RawKey::Char('+'),
        Key::KpMultiply => RawKey::Char('*'),
        Key::Slash | Key::KpDivide => RawKey::Char('/'),
        Key::LeftBracket => RawKey::Char('['),
        Key::RightBracket => RawKey::Char(']'),
        Key::SemiColon => RawKey::Char(';'),
        Key::Quote => RawKey::Char('\''),
        Key::BackSlash => RawKey::Char('\\'),
        Key::Comma => RawKey::Char(','),
        Key::Dot => RawKey::Char('.'),

        // Anything else: use the OS-reported character when it is printable.
        _ => {
            let c = name.and_then(|n| n.chars().next()).filter(|c| !c.is_control())?;
            RawKey::Char(c)
        }
    };
    Some(raw)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::SystemTime;

    fn event(event_type: EventType, name: Option<&str>) -> Event {
        Event {
            time: SystemTime::now(),
            name: name.map(str::to_string),
            event_type,
        }
    }

    #[test]
    fn test_letter_keys_map_by_physical_position() {
        let raw = translate_event(event(EventType::KeyPress(Key::KeyA), None));
        assert!(matches!(
            raw,
            Some(RawInputEvent::KeyPress {
                key: RawKey::Char('a')
            })
        ));
    }

    #[test]
    fn test_release_maps_without_an_os_name() {
        // Release events often carry no translated character; the physical
        // table must still resolve them.
        let raw = translate_event(event(EventType::KeyRelease(Key::KeyG), None));
        assert!(matches!(
            raw,
            Some(RawInputEvent::KeyRelease {
                key: RawKey::Char('g')
            })
        ));
    }

    #[test]
    fn test_modifier_keys_map_to_named_variants() {
        let alt = translate_key(Key::Alt, None);
        let altgr = translate_key(Key::AltGr, None);
        assert_eq!(alt, Some(RawKey::Named(NamedKey::AltLeft)));
        assert_eq!(altgr, Some(RawKey::Named(NamedKey::AltRight)));
    }

    #[test]
    fn test_backquote_maps_to_its_character() {
        assert_eq!(translate_key(Key::BackQuote, None), Some(RawKey::Char('`')));
    }

    #[test]
    fn test_function_keys_carry_their_index() {
        assert_eq!(
            translate_key(Key::F5, None),
            Some(RawKey::Named(NamedKey::Function(5)))
        );
    }

    #[test]
    fn test_unknown_key_falls_back_to_reported_character() {
        assert_eq!(
            translate_key(Key::Unknown(0xfe), Some("é")),
            Some(RawKey::Char('é'))
        );
        assert_eq!(translate_key(Key::Unknown(0xfe), None), None);
        assert_eq!(translate_key(Key::Unknown(0xfe), Some("\u{1b}")), None);
    }

    #[test]
    fn test_button_release_becomes_click_event() {
        let raw = translate_event(event(EventType::ButtonRelease(Button::Left), None));
        assert!(matches!(
            raw,
            Some(RawInputEvent::ClickRelease {
                button: MouseButton::Left
            })
        ));
    }

    #[test]
    fn test_moves_wheel_and_button_presses_are_dropped() {
        assert!(translate_event(event(
            EventType::MouseMove { x: 1.0, y: 2.0 },
            None
        ))
        .is_none());
        assert!(translate_event(event(
            EventType::Wheel {
                delta_x: 0,
                delta_y: 1
            },
            None
        ))
        .is_none());
        assert!(translate_event(event(
            EventType::ButtonPress(Button::Left),
            None
        ))
        .is_none());
    }
}
