//! Mock input source for unit testing.
//!
//! Allows tests to inject synthetic [`RawInputEvent`]s without a running
//! global hook.

use std::sync::{
    mpsc::{self, Sender},
    Mutex,
};

use super::{CaptureError, InputSource, RawInputEvent};

/// A mock implementation of [`InputSource`] that lets tests inject events.
#[derive(Default)]
pub struct MockInputSource {
    sender: Mutex<Option<Sender<RawInputEvent>>>,
}

impl MockInputSource {
    /// Creates a new mock input source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Injects a synthetic event, as if captured from hardware.
    ///
    /// Panics if `start()` has not been called or `stop()` has been called.
    pub fn inject_event(&self, event: RawInputEvent) {
        let guard = self.sender.lock().expect("lock poisoned");
        let sender = guard
            .as_ref()
            .expect("MockInputSource::inject_event called before start()");
        sender
            .send(event)
            .expect("receiver dropped; keep the receiver alive while injecting");
    }
}

impl InputSource for MockInputSource {
    fn start(&self) -> Result<mpsc::Receiver<RawInputEvent>, CaptureError> {
        let mut guard = self.sender.lock().expect("lock poisoned");
        if guard.is_some() {
            return Err(CaptureError::AlreadyStarted);
        }
        let (tx, rx) = mpsc::channel();
        *guard = Some(tx);
        Ok(rx)
    }

    fn stop(&self) {
        // Dropping the sender closes the channel.
        *self.sender.lock().expect("lock poisoned") = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use multibox_core::RawKey;

    #[test]
    fn test_injected_events_arrive_in_order() {
        // Arrange
        let source = MockInputSource::new();
        let rx = source.start().expect("start should succeed");

        // Act
        source.inject_event(RawInputEvent::KeyPress {
            key: RawKey::Char('a'),
        });
        source.inject_event(RawInputEvent::KeyRelease {
            key: RawKey::Char('a'),
        });

        // Assert
        assert!(matches!(
            rx.recv().unwrap(),
            RawInputEvent::KeyPress {
                key: RawKey::Char('a')
            }
        ));
        assert!(matches!(
            rx.recv().unwrap(),
            RawInputEvent::KeyRelease {
                key: RawKey::Char('a')
            }
        ));
    }

    #[test]
    fn test_double_start_is_rejected() {
        let source = MockInputSource::new();
        let _rx = source.start().expect("first start should succeed");

        assert!(matches!(
            source.start(),
            Err(CaptureError::AlreadyStarted)
        ));
    }

    #[test]
    fn test_stop_closes_the_channel() {
        // Arrange
        let source = MockInputSource::new();
        let rx = source.start().expect("start should succeed");

        // Act
        source.stop();

        // Assert – the receiver sees a disconnected channel.
        assert!(rx.recv().is_err());
    }
}
