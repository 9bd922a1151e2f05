//! Integration tests for the input broadcast pipeline.
//!
//! These tests exercise the application layer end-to-end:
//! `BroadcastEngine` + `WindowResolver` + mock infrastructure, driven the
//! same way the binary's worker loop drives them.

#![allow(unused_must_use)] // events are mostly driven for their side effects

use std::ops::ControlFlow;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use multibox_core::{keymap::NamedKey, KeyBindings, RawKey, WindowId, WindowList};
use multibox_engine::application::broadcast_input::{BroadcastEngine, InputInjector};
use multibox_engine::application::resolve_windows::{WindowQuery, WindowResolver};
use multibox_engine::infrastructure::input_capture::{
    mock::MockInputSource, InputSource, MouseButton, RawInputEvent,
};

// ── Test doubles ──────────────────────────────────────────────────────────────

#[derive(Default)]
struct RecordingInjector {
    key_downs: Mutex<Vec<(WindowId, String)>>,
    key_ups: Mutex<Vec<(WindowId, String)>>,
    clicks: Mutex<Vec<(WindowId, u8)>>,
}

impl RecordingInjector {
    fn reset(&self) {
        self.key_downs.lock().unwrap().clear();
        self.key_ups.lock().unwrap().clear();
        self.clicks.lock().unwrap().clear();
    }
}

#[async_trait]
impl InputInjector for RecordingInjector {
    async fn key_down(&self, window: WindowId, key: &str) -> Result<(), String> {
        self.key_downs.lock().unwrap().push((window, key.to_string()));
        Ok(())
    }

    async fn key_up(&self, window: WindowId, key: &str) -> Result<(), String> {
        self.key_ups.lock().unwrap().push((window, key.to_string()));
        Ok(())
    }

    async fn click(&self, window: WindowId, button: u8) -> Result<(), String> {
        self.clicks.lock().unwrap().push((window, button));
        Ok(())
    }
}

struct StubWindowQuery {
    focused: Mutex<WindowId>,
    activations: Mutex<Vec<WindowId>>,
}

impl StubWindowQuery {
    fn new(focused: WindowId) -> Self {
        Self {
            focused: Mutex::new(focused),
            activations: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl WindowQuery for StubWindowQuery {
    async fn search(&self, _pattern: &str) -> Result<Vec<WindowId>, String> {
        Ok(Vec::new())
    }

    async fn focused_window(&self) -> Result<WindowId, String> {
        Ok(*self.focused.lock().unwrap())
    }

    async fn activate(&self, window: WindowId) -> Result<(), String> {
        self.activations.lock().unwrap().push(window);
        Ok(())
    }

    async fn translate_id(&self, _template: &str, window: WindowId) -> Result<WindowId, String> {
        Ok(window)
    }
}

/// Engine over master window 10 with slave targets [101, 102], the standard
/// g / f / Escape / r bindings, and the master focused. Construction-time
/// clear_modifiers noise is discarded.
async fn make_engine(
    slaves: Vec<WindowId>,
) -> (BroadcastEngine, Arc<RecordingInjector>, Arc<StubWindowQuery>) {
    let injector = Arc::new(RecordingInjector::default());
    let query = Arc::new(StubWindowQuery::new(10));
    let resolver = WindowResolver::new(Arc::clone(&query) as Arc<dyn WindowQuery>);
    let bindings = KeyBindings::from_strings("g", "f", "Escape", "r").unwrap();
    let window_list = if slaves.is_empty() {
        WindowList::default()
    } else {
        WindowList::from_parts(vec![10], vec![11, 12])
    };
    let engine = BroadcastEngine::new(
        bindings,
        window_list,
        vec![1010],
        slaves,
        Arc::clone(&injector) as Arc<dyn InputInjector>,
        resolver,
    )
    .await;
    injector.reset();
    (engine, injector, query)
}

fn press(c: char) -> RawInputEvent {
    RawInputEvent::KeyPress {
        key: RawKey::Char(c),
    }
}

fn release(c: char) -> RawInputEvent {
    RawInputEvent::KeyRelease {
        key: RawKey::Char(c),
    }
}

// ── The full operator scenario ────────────────────────────────────────────────

#[tokio::test]
async fn test_full_broadcast_session_scenario() {
    let (mut engine, injector, _) = make_engine(vec![101, 102]).await;

    // Press g: broadcasting is (re)enabled and the combo itself is never
    // forwarded to the slaves.
    engine.handle_event(press('g')).await;
    assert!(engine.is_broadcasting());
    assert!(injector.key_downs.lock().unwrap().is_empty());
    injector.reset();

    // Press a / release a: forwarded to both slaves.
    engine.handle_event(press('a')).await;
    engine.handle_event(release('a')).await;
    assert_eq!(
        *injector.key_downs.lock().unwrap(),
        vec![(101, "a".to_string()), (102, "a".to_string())]
    );
    assert_eq!(
        *injector.key_ups.lock().unwrap(),
        vec![(101, "a".to_string()), (102, "a".to_string())]
    );
    injector.reset();

    // Press f / release f: broadcast pauses; the release keyup goes out and
    // the modifiers are force-cleared afterwards.
    engine.handle_event(press('f')).await;
    engine.handle_event(release('f')).await;
    assert!(!engine.is_broadcasting());
    assert!(!engine.mouse().is_broadcasting());
    let ups = injector.key_ups.lock().unwrap().clone();
    assert!(ups.contains(&(101, "f".to_string())));
    assert!(ups.contains(&(102, "f".to_string())));
    // clear_modifiers: 8 forced keyups per managed window (1 master id +
    // 2 slave ids) on top of the stop-key keyups.
    assert_eq!(ups.len(), 2 + 2 + 8 * 3);
    injector.reset();

    // While paused, ordinary keys inject nothing.
    engine.handle_event(press('b')).await;
    engine.handle_event(release('b')).await;
    assert!(injector.key_downs.lock().unwrap().is_empty());
    assert!(injector.key_ups.lock().unwrap().is_empty());

    // Press Escape: the engine signals shutdown.
    let flow = engine
        .handle_event(RawInputEvent::KeyPress {
            key: RawKey::Named(NamedKey::Escape),
        })
        .await;
    assert_eq!(flow, ControlFlow::Break(()));
}

// ── Event-queue driven session ────────────────────────────────────────────────

#[tokio::test]
async fn test_worker_loop_drains_the_capture_channel_in_order() {
    let (mut engine, injector, _) = make_engine(vec![101, 102]).await;

    // Queue a whole session through the mock capture source, exactly like
    // the binary's bridge does, then drain it with the worker loop.
    let source = MockInputSource::new();
    let rx = source.start().expect("start");
    source.inject_event(press('a'));
    source.inject_event(release('a'));
    source.inject_event(RawInputEvent::ClickRelease {
        button: MouseButton::Left,
    });
    source.inject_event(RawInputEvent::Shutdown);
    source.stop();

    let mut stopped = false;
    for event in rx {
        if engine.handle_event(event).await.is_break() {
            stopped = true;
            break;
        }
    }

    assert!(stopped, "the shutdown poison event must break the loop");
    assert_eq!(injector.key_downs.lock().unwrap().len(), 2);
    assert_eq!(injector.key_ups.lock().unwrap().len(), 2);
    assert_eq!(
        *injector.clicks.lock().unwrap(),
        vec![(101, 1), (102, 1)]
    );
}

// ── next-window cycling ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_next_window_cycles_through_the_full_list() {
    let (mut engine, _, query) = make_engine(vec![101, 102]).await;

    // Window list is [10, 11, 12]; focus follows the activations.
    for _ in 0..4 {
        engine.handle_event(press('r')).await;
        engine.handle_event(release('r')).await;
        let last = *query.activations.lock().unwrap().last().unwrap();
        *query.focused.lock().unwrap() = last;
    }

    assert_eq!(*query.activations.lock().unwrap(), vec![11, 12, 10, 11]);
}

// ── Empty slave list ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_empty_window_list_issues_no_activation_or_clicks() {
    let (mut engine, injector, query) = make_engine(Vec::new()).await;

    // With nothing tracked, the focus gate suppresses key handling entirely,
    // so next-window never activates anything.
    engine.handle_event(press('r')).await;
    engine.handle_event(release('r')).await;
    assert!(query.activations.lock().unwrap().is_empty());

    // Clicks have no targets to reach.
    engine
        .handle_event(RawInputEvent::ClickRelease {
            button: MouseButton::Left,
        })
        .await;
    assert!(injector.clicks.lock().unwrap().is_empty());
}

// ── Idempotent press across a whole session ───────────────────────────────────

#[tokio::test]
async fn test_no_duplicate_keydown_until_matching_keyup() {
    let (mut engine, injector, _) = make_engine(vec![101]).await;

    engine.handle_event(press('a')).await;
    engine.handle_event(press('a')).await; // OS key-repeat
    engine.handle_event(press('a')).await;
    assert_eq!(injector.key_downs.lock().unwrap().len(), 1);

    engine.handle_event(release('a')).await;
    engine.handle_event(press('a')).await; // a fresh press forwards again
    assert_eq!(injector.key_downs.lock().unwrap().len(), 2);
}
