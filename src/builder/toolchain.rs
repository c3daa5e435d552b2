//! CMake discovery and version gating.
//!
//! CMake is looked up on the search path first. When that fails, the
//! target interpreter is asked for the `cmake` Python distribution's
//! binary directory, which is then appended to the search path so that
//! every later phase can run it.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;
use semver::Version;

use crate::core::errors::{BuildError, ToolchainUse};
use crate::core::platform::resolve_program;
use crate::util::process::{Executor, ProcessBuilder, SearchPath};

/// Oldest CMake that can drive the extension build.
pub const MIN_CMAKE_VERSION: Version = Version::new(3, 1, 3);

const FALLBACK_SCRIPT: &str = "import cmake; print(cmake.CMAKE_BIN_DIR)";

static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"version\s*([\d.]+)").expect("valid version regex"));

/// A dotted numeric toolchain version.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ToolchainVersion(Version);

impl ToolchainVersion {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        ToolchainVersion(Version::new(major, minor, patch))
    }

    /// The minimum supported CMake version.
    pub fn minimum() -> Self {
        ToolchainVersion(MIN_CMAKE_VERSION)
    }

    /// Parse a dotted version, allowing missing or extra components.
    ///
    /// `3` is `3.0.0`, `3.18` is `3.18.0`, `3.27.0.1` is `3.27.0`.
    pub fn parse(s: &str) -> Option<Self> {
        let mut parts = s.trim_end_matches('.').split('.');
        let major: u64 = parts.next()?.parse().ok()?;
        let minor: u64 = match parts.next() {
            Some(p) => p.parse().ok()?,
            None => 0,
        };
        let patch: u64 = match parts.next() {
            Some(p) => p.parse().ok()?,
            None => 0,
        };
        Some(Self::new(major, minor, patch))
    }

    /// Extract the version from `cmake --version` output.
    pub fn from_version_output(output: &str) -> Option<Self> {
        let caps = VERSION_RE.captures(output)?;
        Self::parse(caps.get(1)?.as_str())
    }

    pub fn as_semver(&self) -> &Version {
        &self.0
    }
}

impl fmt::Display for ToolchainVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A resolved CMake installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    cmake: PathBuf,
    version: ToolchainVersion,
}

impl Toolchain {
    pub fn new(cmake: impl Into<PathBuf>, version: ToolchainVersion) -> Self {
        Toolchain {
            cmake: cmake.into(),
            version,
        }
    }

    pub fn cmake(&self) -> &Path {
        &self.cmake
    }

    pub fn version(&self) -> &ToolchainVersion {
        &self.version
    }

    /// The CTest executable shipped with this CMake.
    ///
    /// Prefers the binary next to `cmake`, then the search path.
    pub fn ctest(&self, search_path: &SearchPath) -> PathBuf {
        let name = exe_name("ctest");
        let sibling = self.cmake.with_file_name(&name);
        if sibling.is_file() {
            return sibling;
        }
        search_path.find(&name).unwrap_or_else(|| PathBuf::from(name))
    }
}

fn exe_name(base: &str) -> String {
    format!("{}{}", base, std::env::consts::EXE_SUFFIX)
}

/// Finds a CMake that satisfies [`MIN_CMAKE_VERSION`].
#[derive(Debug, Clone)]
pub struct ToolchainLocator {
    python: PathBuf,
    minimum: ToolchainVersion,
    purpose: ToolchainUse,
}

impl ToolchainLocator {
    /// Locator that falls back to the `cmake` package of `python`.
    pub fn new(python: impl Into<PathBuf>) -> Self {
        ToolchainLocator {
            python: python.into(),
            minimum: ToolchainVersion::minimum(),
            purpose: ToolchainUse::Build,
        }
    }

    /// Name `purpose` in the error when no CMake is found.
    pub fn purpose(mut self, purpose: ToolchainUse) -> Self {
        self.purpose = purpose;
        self
    }

    /// Resolve CMake and check its version.
    ///
    /// `targets` only names the extensions in the error when nothing is
    /// found. The search path is extended at most once per directory.
    pub fn locate(
        &self,
        exec: &mut dyn Executor,
        search_path: &mut SearchPath,
        targets: &[String],
    ) -> Result<Toolchain> {
        let toolchain = match self.query_search_path(exec, search_path) {
            Some(toolchain) => toolchain,
            None => self
                .query_python_package(exec, search_path)
                .ok_or_else(|| BuildError::ToolchainMissing {
                    purpose: self.purpose,
                    targets: targets.to_vec(),
                })?,
        };

        if toolchain.version < self.minimum {
            return Err(BuildError::ToolchainVersionTooOld {
                found: toolchain.version.to_string(),
                required: self.minimum.to_string(),
            }
            .into());
        }

        tracing::info!("Using CMake version {}...", toolchain.version);
        Ok(toolchain)
    }

    fn query_search_path(
        &self,
        exec: &mut dyn Executor,
        search_path: &SearchPath,
    ) -> Option<Toolchain> {
        let Some(cmake) = search_path.find(exe_name("cmake")) else {
            tracing::debug!("cmake not found on the search path");
            return None;
        };
        query_version(exec, search_path, cmake)
    }

    fn query_python_package(
        &self,
        exec: &mut dyn Executor,
        search_path: &mut SearchPath,
    ) -> Option<Toolchain> {
        let python = resolve_program(search_path, &self.python);
        let cmd = ProcessBuilder::new(&python)
            .args(["-c", FALLBACK_SCRIPT])
            .env("PATH", search_path.to_os_string());

        let output = match exec.output(&cmd) {
            Ok(output) if output.success() => output,
            Ok(output) => {
                tracing::debug!("cmake Python package unavailable: {}", output.stderr.trim());
                return None;
            }
            Err(e) => {
                tracing::debug!("failed to query cmake Python package: {:#}", e);
                return None;
            }
        };

        let bin_dir = output.stdout.trim();
        if bin_dir.is_empty() {
            return None;
        }
        let bin_dir = PathBuf::from(bin_dir);

        search_path.append_if_absent(bin_dir.clone());
        query_version(exec, search_path, bin_dir.join(exe_name("cmake")))
    }
}

fn query_version(
    exec: &mut dyn Executor,
    search_path: &SearchPath,
    cmake: PathBuf,
) -> Option<Toolchain> {
    let cmd = ProcessBuilder::new(&cmake)
        .arg("--version")
        .env("PATH", search_path.to_os_string());

    let output = match exec.output(&cmd) {
        Ok(output) if output.success() => output,
        Ok(output) => {
            tracing::debug!("`{}` exited with {:?}", cmd.display_command(), output.code);
            return None;
        }
        Err(e) => {
            tracing::debug!("{:#}", e);
            return None;
        }
    };

    match ToolchainVersion::from_version_output(&output.stdout) {
        Some(version) => Some(Toolchain::new(cmake, version)),
        None => {
            tracing::warn!(
                "could not read a version from `{}` output: {}",
                cmd.display_command(),
                output.stdout.trim()
            );
            None
        }
    }
}
