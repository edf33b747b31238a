//! Configuration parsing and management for xcob.
//!
//! This crate provides:
//! - Configuration types and TOML parsing for `xcob.toml`
//! - Discovery of the config file in the working directory
//! - Precedence handling (CLI > config file > defaults)
//!
//! The resolved configuration is the pair of exclusion lists consumed by the
//! aggregator.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use xcob_domain::ExportOptions;

/// Default config file name discovered in the working directory.
pub const CONFIG_FILE_NAME: &str = "xcob.toml";

// ============================================================================
// Errors
// ============================================================================

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

// ============================================================================
// Configuration Types
// ============================================================================

/// Exclusion lists from the config file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExcludeConfig {
    /// Substrings of target names to drop from the report.
    #[serde(default)]
    pub targets: Vec<String>,
    /// Substrings of file paths to drop from the report.
    #[serde(default)]
    pub packages: Vec<String>,
}

/// Full configuration for xcob.
///
/// ```toml
/// [exclude]
/// targets = ["UnitTests"]
/// packages = ["Carthage", "Pods"]
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Exclusion configuration.
    #[serde(default)]
    pub exclude: ExcludeConfig,
}

/// CLI-provided values that override the config file.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    /// `--exclude-target` values.
    pub targets_to_exclude: Vec<String>,
    /// `--exclude-package` values.
    pub packages_to_exclude: Vec<String>,
}

// ============================================================================
// Loading and Resolution
// ============================================================================

/// Find `xcob.toml` in `dir`, if present.
pub fn discover_config(dir: &Path) -> Option<PathBuf> {
    let candidate = dir.join(CONFIG_FILE_NAME);
    candidate.is_file().then_some(candidate)
}

/// Load and parse a config file.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let text = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&text)?)
}

/// Resolve the effective exclusion options.
///
/// CLI values take precedence over the config file; a non-empty CLI list
/// replaces the corresponding config list entirely. Both default to empty.
pub fn resolve_options(config: &Config, cli: &CliOverrides) -> ExportOptions {
    let targets_to_exclude = if cli.targets_to_exclude.is_empty() {
        config.exclude.targets.clone()
    } else {
        cli.targets_to_exclude.clone()
    };
    let packages_to_exclude = if cli.packages_to_exclude.is_empty() {
        config.exclude.packages.clone()
    } else {
        cli.packages_to_exclude.clone()
    };

    ExportOptions {
        targets_to_exclude,
        packages_to_exclude,
    }
}

// ============================================================================
// Tests
// ============================================================================
