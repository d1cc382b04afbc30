//! Configuration file handling and build options.
//!
//! [`Config`] is the persisted TOML configuration; CLI flags are layered on
//! top of it and the result is turned into [`BomBuilderOptions`], which is
//! what the builder consumes.
//!
//! # Configuration Location
//!
//! The configuration file is stored at:
//! - Linux: `~/.config/npm-sbom/config.toml`
//! - macOS: `~/Library/Application Support/npm-sbom/config.toml`
//! - Windows: `%APPDATA%\npm-sbom\config.toml`
//!
//! # Example Configuration
//!
//! ```toml
//! ignore_npm_errors = false
//! package_lock_only = false
//! omit = ["dev"]
//! meta_component_type = "application"
//! reproducible = false
//! flatten_components = false
//! short_purls = false
//! output_format = "json"
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::model::ComponentType;

/// Dependency types that can be left out of the BOM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OmittableDependencyType {
    Dev,
    Optional,
    Peer,
}

impl OmittableDependencyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OmittableDependencyType::Dev => "dev",
            OmittableDependencyType::Optional => "optional",
            OmittableDependencyType::Peer => "peer",
        }
    }
}

impl std::str::FromStr for OmittableDependencyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" => Ok(OmittableDependencyType::Dev),
            "optional" => Ok(OmittableDependencyType::Optional),
            "peer" => Ok(OmittableDependencyType::Peer),
            _ => Err(format!(
                "Unknown dependency type: {}. Use 'dev', 'optional', or 'peer'",
                s
            )),
        }
    }
}

/// Options that steer a single BOM build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BomBuilderOptions {
    /// Continue with partial output when npm-ls exits with errors.
    pub ignore_npm_errors: bool,
    /// Pass `--package-lock-only` to npm-ls.
    pub package_lock_only: bool,
    /// Component type of the root component.
    pub meta_component_type: ComponentType,
    pub omit_dependency_types: BTreeSet<OmittableDependencyType>,
    /// Leave out everything that changes between runs (timestamp, serial number).
    pub reproducible: bool,
    pub flatten_components: bool,
    /// Strip qualifiers and subpath from generated purls.
    pub short_purls: bool,
}

impl BomBuilderOptions {
    pub fn omits(&self, dependency_type: OmittableDependencyType) -> bool {
        self.omit_dependency_types.contains(&dependency_type)
    }
}

/// Application configuration.
///
/// Loaded from a TOML file, or created with default values when there is
/// none.
///
/// # Example
///
/// ```no_run
/// use npm_sbom::Config;
///
/// let config = Config::load().unwrap();
///
/// println!("Output format: {}", config.output_format);
/// println!("Flatten: {}", config.flatten_components);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Whether to continue with partial output when npm-ls fails.
    ///
    /// Default: false
    pub ignore_npm_errors: bool,

    /// Whether to read the dependency tree from the lock file only.
    ///
    /// Default: false
    pub package_lock_only: bool,

    /// Dependency types to leave out.
    ///
    /// Default: none
    pub omit: Vec<OmittableDependencyType>,

    /// Component type of the root component.
    ///
    /// Default: "application"
    pub meta_component_type: ComponentType,

    /// Whether to produce byte-identical output for identical input.
    ///
    /// Default: false
    pub reproducible: bool,

    /// Whether to list all components at the top level instead of nesting
    /// them by install path.
    ///
    /// Default: false
    pub flatten_components: bool,

    /// Whether to drop qualifiers and subpath from purls.
    ///
    /// Default: false
    pub short_purls: bool,

    /// npm executable to run. Falls back to `npm_execpath`, then `npm`.
    pub npm_command: Option<String>,

    /// Default output format when no `--output-format` flag is provided.
    ///
    /// Valid values: "json", "table"
    /// Default: "json"
    pub output_format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ignore_npm_errors: false,
            package_lock_only: false,
            omit: Vec::new(),
            meta_component_type: ComponentType::Application,
            reproducible: false,
            flatten_components: false,
            short_purls: false,
            npm_command: None,
            output_format: "json".to_string(),
        }
    }
}

impl Config {
    /// Loads configuration from the config file.
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Loads configuration from an explicit path, with defaults when the
    /// file is missing.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Saves the configuration to the config file.
    ///
    /// Creates the parent directory if it doesn't exist.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Returns the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("npm-sbom")
            .join("config.toml")
    }

    /// Generates a string containing the default configuration.
    pub fn generate_default_config() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }

    /// Build options as configured, before any CLI overrides.
    pub fn to_options(&self) -> BomBuilderOptions {
        BomBuilderOptions {
            ignore_npm_errors: self.ignore_npm_errors,
            package_lock_only: self.package_lock_only,
            meta_component_type: self.meta_component_type,
            omit_dependency_types: self.omit.iter().copied().collect(),
            reproducible: self.reproducible,
            flatten_components: self.flatten_components,
            short_purls: self.short_purls,
        }
    }
}
