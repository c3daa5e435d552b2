//! Build context - toolchain, interpreter, options and layout for one run.

use std::path::Path;

use crate::builder::toolchain::Toolchain;
use crate::core::layout::BuildLayout;
use crate::core::options::BuildConfiguration;
use crate::core::platform::{Interpreter, Platform};
use crate::util::process::SearchPath;

/// Everything the phases of a run share.
///
/// Constructed once after the toolchain has been located; never modified
/// while targets are being built.
#[derive(Debug, Clone)]
pub struct BuildContext {
    /// Validated build options
    pub config: BuildConfiguration,

    /// Target platform for argument assembly
    pub platform: Platform,

    /// Interpreter the extensions are built for
    pub interpreter: Interpreter,

    /// Resolved CMake
    pub toolchain: Toolchain,

    /// Build and output directories
    pub layout: BuildLayout,

    /// Search path handed to every child process
    pub search_path: SearchPath,

    /// Value re-asserted as `CXXFLAGS` in every phase
    pub cxxflags: String,
}

impl BuildContext {
    /// Create a context, taking `CXXFLAGS` from the caller's environment.
    pub fn new(
        config: BuildConfiguration,
        interpreter: Interpreter,
        toolchain: Toolchain,
        layout: BuildLayout,
        search_path: SearchPath,
    ) -> Self {
        BuildContext {
            config,
            platform: Platform::for_interpreter(&interpreter),
            interpreter,
            toolchain,
            layout,
            search_path,
            cxxflags: std::env::var("CXXFLAGS").unwrap_or_default(),
        }
    }

    /// Override the target platform.
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Override the `CXXFLAGS` value passed to the phases.
    pub fn with_cxxflags(mut self, cxxflags: impl Into<String>) -> Self {
        self.cxxflags = cxxflags.into();
        self
    }

    pub fn python(&self) -> &Path {
        &self.interpreter.executable
    }
}
