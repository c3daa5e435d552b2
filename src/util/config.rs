//! Configuration file support for extbuild.
//!
//! Two configuration file locations are read:
//! - Global: `~/.extbuild/config.toml` - User-wide defaults
//! - Project: `Extbuild.toml` - Project-specific settings and extensions
//!
//! Project config takes precedence over global config, and command-line
//! options take precedence over both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};

use crate::util::fs::read_to_string;

/// Name of the project configuration file.
pub const PROJECT_CONFIG_FILE: &str = "Extbuild.toml";

/// extbuild configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Python interpreter the extensions are built for
    pub python: Option<PathBuf>,

    /// Directory holding the temp and lib build directories
    pub build_root: Option<PathBuf>,

    /// Build options
    pub build: BuildSettings,

    /// Extensions to build, in order
    #[serde(rename = "extension")]
    pub extensions: Vec<ExtensionSpec>,
}

/// Raw build options, before validation.
///
/// Values are kept as written so that unusable ones can be normalized to
/// their defaults instead of failing the parse. A value of the wrong TOML
/// type is dropped with a warning; the rest of the file still applies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BuildSettings {
    #[serde(deserialize_with = "lenient_text")]
    pub build_type: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub use_mpi: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub timemory_exceptions: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub build_examples: Option<String>,
    #[serde(deserialize_with = "lenient_integer")]
    pub cxx_standard: Option<i64>,
    #[serde(deserialize_with = "lenient_text")]
    pub mpicc: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub mpicxx: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub cmake_prefix_path: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub cmake_include_path: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub cmake_library_path: Option<String>,
    #[serde(deserialize_with = "lenient_count")]
    pub jobs: Option<usize>,
}

/// Scalars as their written text: `true`, `17` and `"on"` all survive.
fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<toml::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| match value {
        toml::Value::String(s) => Some(s),
        toml::Value::Boolean(b) => Some(b.to_string()),
        toml::Value::Integer(i) => Some(i.to_string()),
        toml::Value::Float(f) => Some(f.to_string()),
        other => {
            tracing::warn!("ignoring build setting `{}`, expected a string", other);
            None
        }
    }))
}

/// Integers, also when quoted.
fn lenient_integer<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    let value = Option::<toml::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| match value {
        toml::Value::Integer(i) => Some(i),
        toml::Value::String(ref s) if s.trim().parse::<i64>().is_ok() => s.trim().parse().ok(),
        other => {
            tracing::warn!("ignoring build setting `{}`, expected an integer", other);
            None
        }
    }))
}

/// Non-negative integers, also when quoted.
fn lenient_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<usize>, D::Error> {
    let value = lenient_integer(deserializer)?;
    Ok(value.and_then(|n| match usize::try_from(n) {
        Ok(n) => Some(n),
        Err(_) => {
            tracing::warn!("ignoring build setting `{}`, expected a count", n);
            None
        }
    }))
}

impl BuildSettings {
    /// Merge another settings layer into this one (other takes precedence).
    pub fn merge(&mut self, other: BuildSettings) {
        fn take<T>(slot: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *slot = value;
            }
        }

        take(&mut self.build_type, other.build_type);
        take(&mut self.use_mpi, other.use_mpi);
        take(&mut self.timemory_exceptions, other.timemory_exceptions);
        take(&mut self.build_examples, other.build_examples);
        take(&mut self.cxx_standard, other.cxx_standard);
        take(&mut self.mpicc, other.mpicc);
        take(&mut self.mpicxx, other.mpicxx);
        take(&mut self.cmake_prefix_path, other.cmake_prefix_path);
        take(&mut self.cmake_include_path, other.cmake_include_path);
        take(&mut self.cmake_library_path, other.cmake_library_path);
        take(&mut self.jobs, other.jobs);
    }
}

/// An `[[extension]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ExtensionSpec {
    /// Module name, possibly dotted
    pub name: String,

    /// CMake source directory, relative to the project directory
    #[serde(default = "default_source_dir")]
    pub source_dir: PathBuf,
}

fn default_source_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = read_to_string(path)?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if the file is missing or broken.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.python.is_some() {
            self.python = other.python;
        }
        if other.build_root.is_some() {
            self.build_root = other.build_root;
        }
        if !other.extensions.is_empty() {
            self.extensions = other.extensions;
        }
        self.build.merge(other.build);
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (`Extbuild.toml`)
/// 2. Global config (`~/.extbuild/config.toml`)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global) = global_path {
        config.merge(Config::load_or_default(global));
    }

    config.merge(Config::load_or_default(project_path));

    config
}

/// Get the global extbuild config directory (~/.extbuild).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".extbuild"))
}

/// Get the global config path (~/.extbuild/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (`Extbuild.toml`).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(PROJECT_CONFIG_FILE)
}
