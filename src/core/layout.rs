//! Build directory naming.
//!
//! The build step writes each target's CMake tree into a directory whose
//! name is derived from the interpreter it was built for. The test step
//! finds that tree again by recomputing the same name, so both sides must
//! go through [`build_dir_name`].

use std::path::{Path, PathBuf};

use crate::core::platform::Interpreter;
use crate::core::target::ExtensionTarget;

/// Tag of the per-interpreter temporary build directory.
pub const TEMP_TAG: &str = "temp";

/// Tag of the per-interpreter library output directory.
pub const LIB_TAG: &str = "lib";

/// Default build root, relative to the project directory.
pub const DEFAULT_BUILD_ROOT: &str = "build";

/// `{tag}.{platform}-{major}.{minor}`, e.g. `temp.linux-x86_64-3.8`.
pub fn build_dir_name(tag: &str, platform_tag: &str, major: u32, minor: u32) -> String {
    format!("{}.{}-{}.{}", tag, platform_tag, major, minor)
}

/// Directory layout of one run under the build root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildLayout {
    root: PathBuf,
    temp_dir: PathBuf,
    lib_dir: PathBuf,
}

impl BuildLayout {
    /// Layout for `interpreter` under the absolute build root `root`.
    pub fn new(root: impl Into<PathBuf>, interpreter: &Interpreter) -> Self {
        let root = root.into();
        let name = |tag: &str| {
            build_dir_name(
                tag,
                &interpreter.platform_tag,
                interpreter.major,
                interpreter.minor,
            )
        };

        BuildLayout {
            temp_dir: root.join(name(TEMP_TAG)),
            lib_dir: root.join(name(LIB_TAG)),
            root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The temporary build directory (`build/temp.<plat>-<ver>`).
    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    /// The library output directory (`build/lib.<plat>-<ver>`).
    pub fn lib_dir(&self) -> &Path {
        &self.lib_dir
    }

    /// Build directory of `target` when `target_count` targets are built.
    ///
    /// A single target uses the temp directory itself. Several targets each
    /// get a subdirectory named after the target.
    pub fn target_build_dir(&self, target: &ExtensionTarget, target_count: usize) -> PathBuf {
        if target_count <= 1 {
            self.temp_dir.clone()
        } else {
            self.temp_dir.join(&target.name)
        }
    }
}
