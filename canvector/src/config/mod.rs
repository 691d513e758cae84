//! Runtime configuration loading.
//!
//! Configuration is optional: without a file every value takes its default.
//! The expected YAML structure is:
//! ```yaml
//! database: candb/db.csv
//! tick_ms: 100
//! transport:
//!   interface: virtual      # or "vector"
//!   channel: 0
//!   bitrate: 500000
//!   app_name: "CANoe"
//! ```
//!
//! Every key is optional.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::{debug, info};

use crate::scheduler::DEFAULT_TICK;
use crate::store::DEFAULT_DB_PATH;
use crate::transport::{
    Interface, TransportConfig, DEFAULT_APP_NAME, DEFAULT_BITRATE, DEFAULT_CHANNEL,
};

// ── Private YAML deserialization types ────────────────────────────────────────

/// Top-level wrapper that maps directly onto the YAML file layout.
///
/// This is kept private – callers work with [`AppConfig`] instead.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct AppConfigFile {
    database: Option<PathBuf>,
    tick_ms: Option<u64>,
    #[serde(default)]
    transport: TransportEntry,
}

/// `transport:` section as it appears in the YAML file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TransportEntry {
    interface: Option<Interface>,
    channel: Option<u32>,
    bitrate: Option<u32>,
    app_name: Option<String>,
}

// ── Public data structures ────────────────────────────────────────────────────

/// Resolved runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Message database CSV file.
    pub database: PathBuf,
    /// Scheduler tick period.
    pub tick: Duration,
    pub transport: TransportConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from(DEFAULT_DB_PATH),
            tick: DEFAULT_TICK,
            transport: TransportConfig::default(),
        }
    }
}

impl AppConfig {
    /// Parse `path`.  Missing keys fall back to their defaults; an empty file
    /// yields [`AppConfig::default`].
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, the YAML is structurally
    /// invalid or carries unknown keys, or `tick_ms` is zero.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        info!("Loading configuration from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot open configuration file: {}", path.display()))?;

        Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse YAML file: {}", path.display()))
    }

    /// Parse configuration from YAML text.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let file: AppConfigFile = if content.trim().is_empty() {
            AppConfigFile::default()
        } else {
            serde_yaml::from_str(content)?
        };

        let tick_ms = file.tick_ms.unwrap_or(DEFAULT_TICK.as_millis() as u64);
        if tick_ms == 0 {
            bail!("tick_ms must be greater than zero");
        }

        let t = file.transport;
        let config = Self {
            database: file.database.unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH)),
            tick: Duration::from_millis(tick_ms),
            transport: TransportConfig {
                interface: t.interface.unwrap_or_default(),
                channel: t.channel.unwrap_or(DEFAULT_CHANNEL),
                bitrate: t.bitrate.unwrap_or(DEFAULT_BITRATE),
                app_name: t.app_name.unwrap_or_else(|| DEFAULT_APP_NAME.to_string()),
            },
        };

        debug!(
            "  database: {} | tick: {}ms | interface: {} | channel: {} | bitrate: {}",
            config.database.display(),
            tick_ms,
            config.transport.interface,
            config.transport.channel,
            config.transport.bitrate,
        );

        Ok(config)
    }

    /// Replace the database path (command-line override).
    pub fn with_database(mut self, database: Option<PathBuf>) -> Self {
        if let Some(path) = database {
            self.database = path;
        }
        self
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
