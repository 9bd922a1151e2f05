//! TOML-based configuration persistence.
//!
//! Reads and writes [`AppConfig`] at `$XDG_CONFIG_HOME/multibox/config.toml`
//! (falling back to `~/.config/multibox/config.toml`). Example:
//!
//! ```toml
//! [keys]
//! start_broadcast = "g"
//! stop_broadcast = "f"
//! stop_program = "Escape"
//! next_window = "super+1"
//!
//! [windows]
//! master_pattern = "master_"
//! slave_pattern = "Wow_"
//! ```
//!
//! Every field carries a serde default, so a partial file (or no file at
//! all) yields a working configuration. On first run the defaults are
//! written to disk so the operator has a file to edit.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Error type for configuration file operations. Fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    /// Control-key bindings.
    #[serde(default)]
    pub keys: KeysConfig,
    /// Window discovery patterns and the id-query template.
    #[serde(default)]
    pub windows: WindowsConfig,
    /// General behaviour settings.
    #[serde(default)]
    pub general: GeneralConfig,
}

/// The four control-key bindings, as `[modifier+]key` strings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KeysConfig {
    /// Combo that resumes broadcasting.
    #[serde(default = "default_start_broadcast")]
    pub start_broadcast: String,
    /// Combo that pauses broadcasting.
    #[serde(default = "default_stop_broadcast")]
    pub stop_broadcast: String,
    /// Combo that terminates the program.
    #[serde(default = "default_stop_program")]
    pub stop_program: String,
    /// Combo that activates the next window in the list.
    #[serde(default = "default_next_window")]
    pub next_window: String,
}

/// Window discovery settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WindowsConfig {
    /// Name pattern matching the master window.
    #[serde(default = "default_master_pattern")]
    pub master_pattern: String,
    /// Name pattern matching the slave windows.
    #[serde(default = "default_slave_pattern")]
    pub slave_pattern: String,
    /// Shell pipeline with an `{id}` placeholder that translates a search
    /// match into the injectable leaf window id.
    #[serde(default = "default_id_query")]
    pub id_query: String,
}

/// General behaviour settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneralConfig {
    /// `tracing` log level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_start_broadcast() -> String {
    "g".to_string()
}
fn default_stop_broadcast() -> String {
    "f".to_string()
}
fn default_stop_program() -> String {
    "Escape".to_string()
}
fn default_next_window() -> String {
    "super+1".to_string()
}
fn default_master_pattern() -> String {
    "master_".to_string()
}
fn default_slave_pattern() -> String {
    "Wow_".to_string()
}
fn default_id_query() -> String {
    "xwininfo -int -children -id {id}|grep 1920x1080|cut -d' ' -f6".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for KeysConfig {
    fn default() -> Self {
        Self {
            start_broadcast: default_start_broadcast(),
            stop_broadcast: default_stop_broadcast(),
            stop_program: default_stop_program(),
            next_window: default_next_window(),
        }
    }
}

impl Default for WindowsConfig {
    fn default() -> Self {
        Self {
            master_pattern: default_master_pattern(),
            slave_pattern: default_slave_pattern(),
            id_query: default_id_query(),
        }
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// Emits a debug-level dump of the loaded configuration.
    pub fn dump(&self) {
        debug!("configuration:");
        debug!("- keys");
        debug!("  - start_broadcast: {}", self.keys.start_broadcast);
        debug!("  - stop_broadcast: {}", self.keys.stop_broadcast);
        debug!("  - stop_program: {}", self.keys.stop_program);
        debug!("  - next_window: {}", self.keys.next_window);
        debug!("- windows");
        debug!("  - master_pattern: {}", self.windows.master_pattern);
        debug!("  - slave_pattern: {}", self.windows.slave_pattern);
        debug!("  - id_query: {}", self.windows.id_query);
        debug!("- general");
        debug!("  - log_level: {}", self.general.log_level);
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when neither
/// `XDG_CONFIG_HOME` nor `HOME` is available.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok_or(ConfigError::NoPlatformConfigDir)?;
    Ok(base.join("multibox"))
}

/// Resolves the full path to the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot
/// be determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Loads the configuration from `path`. When the file does not exist yet,
/// the defaults are written there and returned.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not
/// found", and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_or_init(path: &Path) -> Result<AppConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let config: AppConfig = toml::from_str(&content)?;
            Ok(config)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!(path = %path.display(), "no config file found; writing defaults");
            let config = AppConfig::default();
            save_config(path, &config)?;
            Ok(config)
        }
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Persists `config` to `path`, creating the parent directory if needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config(path: &Path, config: &AppConfig) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
