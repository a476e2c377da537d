//! CLI configuration.
//!
//! Configuration can be loaded from:
//! - Environment variables (PULSOR_*)
//! - TOML configuration file
//! - An explicit `--config` path

use anyhow::{Context, Result};
use pulsor_core::recorder::DEFAULT_PREFIX;
use pulsor_core::LogLevels;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Diagnostics configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Fragment loader configuration.
    #[serde(default)]
    pub fragments: FragmentsConfig,

    /// Metrics configuration.
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Diagnostics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Prefix added to every registry message.
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Level switches; levels left out keep their defaults.
    #[serde(flatten)]
    pub levels: LogLevels,
}

/// Fragment loader configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FragmentsConfig {
    /// Directory holding `<name>.html` fragments.
    #[serde(default = "default_fragment_root")]
    pub root: String,

    /// Directory holding `template.<name>.html` files. Defaults to `root`.
    #[serde(default)]
    pub template_root: Option<String>,

    /// Register `fetch:fragment`.
    #[serde(default = "default_true")]
    pub fetch_fragment: bool,

    /// Register `fetch:template`.
    #[serde(default = "default_true")]
    pub fetch_template: bool,
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Enable metrics export.
    #[serde(default = "default_metrics_enabled")]
    pub enabled: bool,

    /// Metrics port.
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

// Default value functions
fn default_prefix() -> String {
    std::env::var("PULSOR_LOG_PREFIX").unwrap_or_else(|_| DEFAULT_PREFIX.to_string())
}

fn default_fragment_root() -> String {
    std::env::var("PULSOR_FRAGMENT_ROOT").unwrap_or_else(|_| "fragments".to_string())
}

fn default_true() -> bool {
    true
}

fn default_metrics_enabled() -> bool {
    std::env::var("PULSOR_METRICS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(false)
}

fn default_metrics_port() -> u16 {
    std::env::var("PULSOR_METRICS_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(9090)
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            levels: LogLevels::default(),
        }
    }
}

impl Default for FragmentsConfig {
    fn default() -> Self {
        Self {
            root: default_fragment_root(),
            template_root: None,
            fetch_fragment: true,
            fetch_template: true,
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_metrics_enabled(),
            port: default_metrics_port(),
        }
    }
}

impl Config {
    /// Load configuration from file or defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load() -> Result<Self> {
        let config_paths = [
            "pulsor.toml",
            "/etc/pulsor/pulsor.toml",
            "~/.config/pulsor/pulsor.toml",
        ];

        for path in &config_paths {
            let expanded = shellexpand::tilde(path);
            if Path::new(expanded.as_ref()).exists() {
                return Self::from_file(expanded.as_ref());
            }
        }

        // Fall back to defaults with environment overrides
        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }
}

impl FragmentsConfig {
    /// Fragment directory with `~` expanded.
    #[must_use]
    pub fn fragment_dir(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.root).as_ref())
    }

    /// Template directory with `~` expanded.
    #[must_use]
    pub fn template_dir(&self) -> PathBuf {
        let root = self.template_root.as_deref().unwrap_or(&self.root);
        PathBuf::from(shellexpand::tilde(root).as_ref())
    }
}
