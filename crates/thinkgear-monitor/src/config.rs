//! TOML-based configuration for the monitor.
//!
//! Reads `MonitorConfig` from the platform-appropriate config file:
//! - Windows:  `%APPDATA%\ThinkGearMonitor\config.toml`
//! - Linux:    `~/.config/thinkgear-monitor/config.toml`
//! - macOS:    `~/Library/Application Support/ThinkGearMonitor/config.toml`
//!
//! Example:
//!
//! ```toml
//! [source]
//! kind = "file"
//! path = "/dev/ttyUSB0"
//!
//! [history]
//! capacity = 100
//!
//! [report]
//! interval_ms = 1000
//! json = false
//! ```
//!
//! Every field has a default (`#[serde(default = "...")]`), so the monitor runs
//! on first start without a file and keeps working when an older file lacks a
//! newer field.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use thinkgear_core::domain::DEFAULT_HISTORY_CAPACITY;

/// Failure to locate, read, or parse the monitor's config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Neither `APPDATA`, `XDG_CONFIG_HOME`, nor `HOME` points anywhere.
    #[error("no config directory for this platform; pass --config")]
    NoPlatformConfigDir,

    #[error("cannot access monitor config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid monitor config: {0}")]
    Parse(#[from] toml::de::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level monitor configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MonitorConfig {
    #[serde(default)]
    pub monitor: MonitorSettings,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

/// General process settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonitorSettings {
    /// `tracing` level used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Depth of the bounded queue between the decoder and the consumer.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

/// Where the byte stream comes from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// A capture file or a serial device node such as `/dev/ttyUSB0`.
    File,
    /// A raw TCP byte stream (e.g. a serial-to-network bridge).
    Tcp,
}

/// Byte source settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceConfig {
    #[serde(default = "default_source_kind")]
    pub kind: SourceKind,
    /// Used when `kind = "file"`.
    #[serde(default = "default_source_path")]
    pub path: PathBuf,
    /// Used when `kind = "tcp"`, as `host:port`.
    #[serde(default = "default_source_address")]
    pub address: String,
    /// Bytes requested per read.
    #[serde(default = "default_read_chunk")]
    pub read_chunk: usize,
}

/// Reading history settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryConfig {
    /// Samples kept per series.
    #[serde(default = "default_history_capacity")]
    pub capacity: usize,
}

/// Periodic report settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportConfig {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// Print every decoded reading to stdout as one JSON line.
    #[serde(default)]
    pub json: bool,
}

impl ReportConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(1))
    }
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}
fn default_channel_capacity() -> usize {
    256
}
fn default_source_kind() -> SourceKind {
    SourceKind::File
}
fn default_source_path() -> PathBuf {
    PathBuf::from("/dev/ttyUSB0")
}
fn default_source_address() -> String {
    "127.0.0.1:2000".to_string()
}
fn default_read_chunk() -> usize {
    64
}
fn default_history_capacity() -> usize {
    DEFAULT_HISTORY_CAPACITY
}
fn default_interval_ms() -> u64 {
    1000
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: default_source_kind(),
            path: default_source_path(),
            address: default_source_address(),
            read_chunk: default_read_chunk(),
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: default_history_capacity(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            json: false,
        }
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Resolves the default config file path for this platform.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the base directory cannot
/// be determined from the environment.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    platform_config_dir()
        .map(|dir| dir.join("config.toml"))
        .ok_or(ConfigError::NoPlatformConfigDir)
}

/// Loads `MonitorConfig` from `path`, returning defaults if the file does not
/// exist.
///
/// # Errors
///
/// A missing file is not an error.  Any other read failure is
/// [`ConfigError::Io`]; bad TOML or an unknown source kind is
/// [`ConfigError::Parse`].
pub fn load_config(path: &Path) -> Result<MonitorConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(MonitorConfig::default()),
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn platform_config_dir() -> Option<PathBuf> {
    let env_dir = |var: &str| std::env::var_os(var).map(PathBuf::from);

    if cfg!(target_os = "windows") {
        env_dir("APPDATA").map(|appdata| appdata.join("ThinkGearMonitor"))
    } else if cfg!(target_os = "macos") {
        env_dir("HOME").map(|home| home.join("Library/Application Support/ThinkGearMonitor"))
    } else if cfg!(unix) {
        env_dir("XDG_CONFIG_HOME")
            .or_else(|| env_dir("HOME").map(|home| home.join(".config")))
            .map(|base| base.join("thinkgear-monitor"))
    } else {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
