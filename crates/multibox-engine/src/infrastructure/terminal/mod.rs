//! Terminal echo guard.
//!
//! While the global hook is active, every keystroke the operator types also
//! reaches the controlling terminal; suspending echo keeps the console clean.
//! The guard restores the saved terminal attributes on `resume()` and again
//! on `Drop`, so every exit path — normal stop, interrupt, panic unwind —
//! leaves the terminal usable.

use std::mem;

use tracing::{debug, warn};

/// Scoped terminal-echo suspension over the stdout terminal.
pub struct EchoGuard {
    /// File descriptor and the attributes to restore, or `None` when echo is
    /// not suspended (not a tty, or already resumed).
    saved: Option<(libc::c_int, libc::termios)>,
}

impl EchoGuard {
    /// Suspends terminal echo. On a non-tty (pipes, CI) this is a no-op
    /// guard.
    pub fn suspend() -> Self {
        let fd = libc::STDOUT_FILENO;
        // SAFETY: tcgetattr writes into the termios out-parameter and is
        // passed a valid descriptor; a zeroed termios is a valid out-slot.
        let mut attrs: libc::termios = unsafe { mem::zeroed() };
        if unsafe { libc::tcgetattr(fd, &mut attrs) } != 0 {
            warn!("stdout is not a terminal; echo control disabled");
            return Self { saved: None };
        }

        let saved = attrs;
        attrs.c_lflag &= !libc::ECHO;
        // SAFETY: attrs was initialized by tcgetattr above.
        if unsafe { libc::tcsetattr(fd, libc::TCSANOW, &attrs) } != 0 {
            warn!("failed to suspend terminal echo");
            return Self { saved: None };
        }
        debug!("terminal echo suspended");
        Self {
            saved: Some((fd, saved)),
        }
    }

    /// Restores the saved terminal attributes and flushes pending input.
    /// Idempotent; failures are logged and never block shutdown.
    pub fn resume(&mut self) {
        if let Some((fd, saved)) = self.saved.take() {
            // SAFETY: saved holds the attributes captured in suspend() for
            // the same descriptor.
            if unsafe { libc::tcsetattr(fd, libc::TCSANOW, &saved) } != 0 {
                warn!("failed to restore terminal echo");
                return;
            }
            unsafe { libc::tcflush(fd, libc::TCIOFLUSH) };
            debug!("terminal echo restored");
        }
    }
}

impl Drop for EchoGuard {
    fn drop(&mut self) {
        self.resume();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resume_is_idempotent() {
        // Works whether or not the test harness has a tty on stdout.
        let mut guard = EchoGuard::suspend();
        guard.resume();
        guard.resume();
        assert!(guard.saved.is_none());
    }

    #[test]
    fn test_drop_after_resume_is_safe() {
        let mut guard = EchoGuard::suspend();
        guard.resume();
        drop(guard);
    }

    #[test]
    fn test_drop_alone_restores() {
        // Dropping without an explicit resume must not panic and must leave
        // no suspension behind for subsequent guards.
        {
            let _guard = EchoGuard::suspend();
        }
        let mut second = EchoGuard::suspend();
        second.resume();
    }
}
