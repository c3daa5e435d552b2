//! Native extension targets.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use serde::Serialize;

/// One native extension: a module name and the CMake project that builds it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtensionTarget {
    /// Module name, possibly dotted (`pkg.sub.ext`).
    pub name: String,

    /// Absolute path of the directory holding `CMakeLists.txt`.
    pub source_dir: PathBuf,
}

impl ExtensionTarget {
    pub fn new(name: impl Into<String>, source_dir: impl Into<PathBuf>) -> Self {
        ExtensionTarget {
            name: name.into(),
            source_dir: source_dir.into(),
        }
    }

    /// Directory the built module lands in under `lib_dir`.
    ///
    /// `pkg.sub.ext` installs into `<lib_dir>/pkg/sub`; a top-level module
    /// installs into `lib_dir` itself. This is the CMake install prefix.
    pub fn output_dir(&self, lib_dir: &Path) -> PathBuf {
        let mut dir = lib_dir.to_path_buf();
        let mut parts: Vec<&str> = self.name.split('.').collect();
        parts.pop();
        for part in parts {
            dir.push(part);
        }
        dir
    }

    /// Check that `name` is a dotted module name.
    ///
    /// Each part is non-empty and made of ASCII letters, digits and `_`, so
    /// a name can never reach outside the directory it is joined onto.
    pub fn validate_name(name: &str) -> Result<()> {
        let valid_part = |part: &str| {
            !part.is_empty() && part.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        };
        if !name.split('.').all(valid_part) {
            bail!(
                "invalid extension name `{}`\n\
                 \n\
                 help: Use a dotted module name such as `pkg.ext`",
                name
            );
        }
        Ok(())
    }

    /// Whether the source directory contains a CMake project.
    pub fn has_cmake_project(&self) -> bool {
        self.source_dir.join("CMakeLists.txt").exists()
    }
}

impl fmt::Display for ExtensionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
