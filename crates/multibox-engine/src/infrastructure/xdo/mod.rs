//! `xdotool` subprocess adapter for window queries and input injection.
//!
//! Implements the application-layer [`WindowQuery`] and [`InputInjector`]
//! traits by spawning short-lived helper processes:
//!
//! - `xdotool search --name <pattern>` — newline-separated ids, one per match
//! - `xdotool getwindowfocus` — the focused window id
//! - `xdotool windowactivate <id>` — give a window input focus
//! - `xdotool keydown|keyup --window <id> <key>` — synthetic key events
//! - `xdotool click --window <id> <button>` — synthetic clicks
//! - `sh -c "<id-query template>"` — the user-configured pipeline that
//!   translates a container id into the leaf id the injection calls accept
//!
//! Every invocation runs under a bounded timeout so a hung helper cannot
//! stall the event worker. Errors are returned as strings; the application
//! layer wraps them into its typed errors and decides whether to degrade or
//! drop.

use std::time::Duration;

use async_trait::async_trait;
use multibox_core::WindowId;
use tokio::process::Command;
use tracing::debug;

use crate::application::broadcast_input::InputInjector;
use crate::application::resolve_windows::WindowQuery;

/// Upper bound on any single helper invocation.
const COMMAND_TIMEOUT: Duration = Duration::from_secs(2);

/// The `xdotool`-backed window query and injection adapter.
pub struct XdoTool {
    timeout: Duration,
}

impl XdoTool {
    /// Creates the adapter with the default per-invocation timeout.
    pub fn new() -> Self {
        Self {
            timeout: COMMAND_TIMEOUT,
        }
    }

    /// Creates the adapter with a custom per-invocation timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Runs `program` with `args`, returning (success, stdout, stderr).
    async fn run(&self, program: &str, args: &[&str]) -> Result<(bool, String, String), String> {
        debug!(program, ?args, "running helper");
        // kill_on_drop: a timed-out helper must not linger past its future.
        let output = tokio::time::timeout(
            self.timeout,
            Command::new(program).args(args).kill_on_drop(true).output(),
        )
        .await
        .map_err(|_| format!("{program} timed out after {:?}", self.timeout))?
        .map_err(|e| format!("failed to spawn {program}: {e}"))?;
        Ok((
            output.status.success(),
            String::from_utf8_lossy(&output.stdout).into_owned(),
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ))
    }

    /// Runs `program` with `args`, treating a non-zero exit as an error.
    async fn run_checked(&self, program: &str, args: &[&str]) -> Result<String, String> {
        let (success, stdout, stderr) = self.run(program, args).await?;
        if !success {
            return Err(format!("{program} failed: {stderr}"));
        }
        Ok(stdout)
    }
}

impl Default for XdoTool {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses one decimal window id from helper output.
fn parse_id(output: &str) -> Result<WindowId, String> {
    let line = output
        .lines()
        .next()
        .map(str::trim)
        .unwrap_or_default();
    line.parse::<WindowId>()
        .map_err(|_| format!("expected a window id, got {line:?}"))
}

/// Parses newline-separated window ids, skipping blank lines.
fn parse_id_lines(output: &str) -> Result<Vec<WindowId>, String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            line.parse::<WindowId>()
                .map_err(|_| format!("expected a window id, got {line:?}"))
        })
        .collect()
}

#[async_trait]
impl WindowQuery for XdoTool {
    async fn search(&self, pattern: &str) -> Result<Vec<WindowId>, String> {
        // xdotool search exits non-zero when nothing matches; an empty match
        // is a valid result, so only a non-empty failure is an error.
        let (success, stdout, stderr) = self
            .run("xdotool", &["search", "--name", pattern])
            .await?;
        if !success && !stdout.trim().is_empty() {
            return Err(format!("xdotool search failed: {stderr}"));
        }
        parse_id_lines(&stdout)
    }

    async fn focused_window(&self) -> Result<WindowId, String> {
        let stdout = self.run_checked("xdotool", &["getwindowfocus"]).await?;
        parse_id(&stdout)
    }

    async fn activate(&self, window: WindowId) -> Result<(), String> {
        self.run_checked("xdotool", &["windowactivate", &window.to_string()])
            .await?;
        Ok(())
    }

    async fn translate_id(&self, template: &str, window: WindowId) -> Result<WindowId, String> {
        // The template is a user-configured shell pipeline with an `{id}`
        // placeholder, e.g.
        // `xwininfo -int -children -id {id}|grep 1920x1080|cut -d' ' -f6`.
        let command = template.replace("{id}", &window.to_string());
        let stdout = self.run_checked("sh", &["-c", &command]).await?;
        parse_id(&stdout)
    }
}

#[async_trait]
impl InputInjector for XdoTool {
    async fn key_down(&self, window: WindowId, key: &str) -> Result<(), String> {
        self.run_checked(
            "xdotool",
            &["keydown", "--window", &window.to_string(), key],
        )
        .await?;
        Ok(())
    }

    async fn key_up(&self, window: WindowId, key: &str) -> Result<(), String> {
        self.run_checked("xdotool", &["keyup", "--window", &window.to_string(), key])
            .await?;
        Ok(())
    }

    async fn click(&self, window: WindowId, button: u8) -> Result<(), String> {
        self.run_checked(
            "xdotool",
            &[
                "click",
                "--window",
                &window.to_string(),
                &button.to_string(),
            ],
        )
        .await?;
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
