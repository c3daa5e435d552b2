//! Global context for extbuild operations.
//!
//! Provides centralized access to the project directory and its merged
//! configuration.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::core::layout::DEFAULT_BUILD_ROOT;
use crate::core::platform::Interpreter;
use crate::core::target::ExtensionTarget;
use crate::util::config::{global_config_path, load_config, project_config_path, Config};
use crate::util::fs::{absolutize, normalize_path};

/// Project directory plus merged configuration.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Project directory (the current directory)
    project_root: PathBuf,

    /// Merged global and project configuration
    config: Config,
}

impl GlobalContext {
    /// Context for the current directory, with global and project config loaded.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        let config = load_config(global_config_path().as_deref(), &project_config_path(&cwd));
        Ok(Self::with_config(cwd, config))
    }

    /// Context for an explicit project directory and configuration.
    pub fn with_config(project_root: impl Into<PathBuf>, config: Config) -> Self {
        GlobalContext {
            project_root: project_root.into(),
            config,
        }
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Mutable access, for layering command-line overrides.
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Interpreter command to build for.
    pub fn python(&self) -> PathBuf {
        self.config
            .python
            .clone()
            .unwrap_or_else(|| PathBuf::from(Interpreter::default_command()))
    }

    /// Absolute build root.
    pub fn build_root(&self) -> PathBuf {
        let root = self
            .config
            .build_root
            .as_deref()
            .unwrap_or(Path::new(DEFAULT_BUILD_ROOT));
        absolutize(&self.project_root, root)
    }

    /// Extensions to build, in configuration order.
    ///
    /// Without any `[[extension]]` entry the project itself is the single
    /// target, named after its directory. Configured names must be valid
    /// module names and unique, since each one names its own build directory.
    pub fn targets(&self) -> Result<Vec<ExtensionTarget>> {
        if self.config.extensions.is_empty() {
            let root = normalize_path(&self.project_root);
            let name = root
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("extension")
                .to_string();
            return Ok(vec![ExtensionTarget::new(name, root)]);
        }

        let mut seen = HashSet::new();
        let mut targets = Vec::with_capacity(self.config.extensions.len());
        for ext in &self.config.extensions {
            ExtensionTarget::validate_name(&ext.name)?;
            if !seen.insert(ext.name.as_str()) {
                bail!("extension `{}` is configured more than once", ext.name);
            }
            targets.push(ExtensionTarget::new(
                ext.name.clone(),
                normalize_path(&absolutize(&self.project_root, &ext.source_dir)),
            ));
        }
        Ok(targets)
    }
}
