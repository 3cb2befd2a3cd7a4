//! TOML configuration for the `platin` tool.
//!
//! Read from the platform-appropriate config file:
//! - Linux:    `$XDG_CONFIG_HOME/platin/config.toml` or `~/.config/platin/config.toml`
//! - Windows:  `%APPDATA%\Platin\config.toml`
//! - macOS:    `~/Library/Application Support/Platin/config.toml`
//!
//! Example:
//!
//! ```toml
//! [hub]
//! address = "192.168.1.50"
//! read_timeout_ms = 1500
//!
//! [cli]
//! quiet = false
//! log_level = "info"
//! ```
//!
//! Every field is optional.  A missing file behaves like an empty one.

use std::path::{Path, PathBuf};
use std::time::Duration;

use platin_core::protocol::messages::{DEFAULT_CONTROL_PORT, DEFAULT_MEDIA_PORT};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::domain::config::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_READ_TIMEOUT};
use crate::domain::HubConfig;

/// Error type for configuration file operations.
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
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level configuration file.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub hub: HubSection,
    #[serde(default)]
    pub cli: CliSection,
}

/// `[hub]`: where the hub is and how long to wait for it.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct HubSection {
    /// Hostname or IP of the hub.  May be overridden on the command line.
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default = "default_control_port")]
    pub control_port: u16,
    #[serde(default = "default_media_port")]
    pub media_port: u16,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
}

/// `[cli]`: output settings for the command-line tool.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CliSection {
    /// Print bare values only.
    #[serde(default)]
    pub quiet: bool,
    /// `tracing` filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_control_port() -> u16 {
    DEFAULT_CONTROL_PORT
}
fn default_media_port() -> u16 {
    DEFAULT_MEDIA_PORT
}
fn default_connect_timeout_ms() -> u64 {
    DEFAULT_CONNECT_TIMEOUT.as_millis() as u64
}
fn default_read_timeout_ms() -> u64 {
    DEFAULT_READ_TIMEOUT.as_millis() as u64
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for HubSection {
    fn default() -> Self {
        Self {
            address: None,
            control_port: default_control_port(),
            media_port: default_media_port(),
            connect_timeout_ms: default_connect_timeout_ms(),
            read_timeout_ms: default_read_timeout_ms(),
        }
    }
}

impl Default for CliSection {
    fn default() -> Self {
        Self {
            quiet: false,
            log_level: default_log_level(),
        }
    }
}

impl HubSection {
    /// Builds a [`HubConfig`] for `host` from this section's ports and
    /// timeouts.
    pub fn to_hub_config(&self, host: impl Into<String>) -> HubConfig {
        HubConfig {
            host: host.into(),
            control_port: self.control_port,
            media_port: self.media_port,
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            read_timeout: Duration::from_millis(self.read_timeout_ms),
        }
    }
}

// ── Config loading ────────────────────────────────────────────────────────────

/// Resolves the full path of the default config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot be
/// determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(platform_config_dir()
        .ok_or(ConfigError::NoPlatformConfigDir)?
        .join("config.toml"))
}

/// Loads the default config file, returning defaults if it does not exist.
///
/// # Errors
///
/// Returns [`ConfigError`] if the file exists but cannot be read or parsed.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(&config_file_path()?)
}

/// Loads `path`, returning defaults if it does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let cfg: AppConfig = toml::from_str(&content)?;
            debug!("loaded config from {}", path.display());
            Ok(cfg)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("no config at {}; using defaults", path.display());
            Ok(AppConfig::default())
        }
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("Platin"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("Platin")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        // XDG_CONFIG_HOME or ~/.config
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("platin"))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_default_uses_protocol_ports() {
        // Arrange / Act
        let cfg = AppConfig::default();

        // Assert
        assert_eq!(cfg.hub.control_port, 50006);
        assert_eq!(cfg.hub.media_port, 7777);
        assert!(cfg.hub.address.is_none());
    }

    #[test]
    fn test_cli_section_default_is_verbose_with_warn_level() {
        let cli = CliSection::default();
        assert!(!cli.quiet);
        assert_eq!(cli.log_level, "warn");
    }

    #[test]
    fn test_empty_toml_yields_defaults() {
        let cfg: AppConfig = toml::from_str("").unwrap();
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn test_partial_hub_section_keeps_other_defaults() {
        // Arrange
        let text = r#"
            [hub]
            address = "10.0.0.7"
            read_timeout_ms = 2500
        "#;

        // Act
        let cfg: AppConfig = toml::from_str(text).unwrap();

        // Assert
        assert_eq!(cfg.hub.address.as_deref(), Some("10.0.0.7"));
        assert_eq!(cfg.hub.read_timeout_ms, 2500);
        assert_eq!(cfg.hub.connect_timeout_ms, 5000);
        assert_eq!(cfg.cli, CliSection::default());
    }

    #[test]
    fn test_to_hub_config_converts_milliseconds() {
        let section = HubSection {
            connect_timeout_ms: 750,
            read_timeout_ms: 250,
            media_port: 9000,
            ..HubSection::default()
        };

        let hub = section.to_hub_config("hub.local");

        assert_eq!(hub.host, "hub.local");
        assert_eq!(hub.control_port, 50006);
        assert_eq!(hub.media_port, 9000);
        assert_eq!(hub.connect_timeout, Duration::from_millis(750));
        assert_eq!(hub.read_timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_load_config_from_missing_file_returns_defaults() {
        let path = std::env::temp_dir().join("platin-test-does-not-exist/config.toml");

        let cfg = load_config_from(&path).unwrap();

        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn test_load_config_from_reads_file() {
        // Arrange
        let path = std::env::temp_dir().join(format!("platin-config-{}.toml", std::process::id()));
        std::fs::write(&path, "[cli]\nquiet = true\n").unwrap();

        // Act
        let cfg = load_config_from(&path);
        std::fs::remove_file(&path).ok();

        // Assert
        assert!(cfg.unwrap().cli.quiet);
    }

    #[test]
    fn test_load_config_from_malformed_file_is_parse_error() {
        let path = std::env::temp_dir().join(format!("platin-bad-{}.toml", std::process::id()));
        std::fs::write(&path, "[hub\naddress = ").unwrap();

        let result = load_config_from(&path);
        std::fs::remove_file(&path).ok();

        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_wrong_field_type_is_parse_error() {
        let result: Result<AppConfig, _> = toml::from_str("[hub]\ncontrol_port = \"x\"\n");
        assert!(result.is_err());
    }
}
