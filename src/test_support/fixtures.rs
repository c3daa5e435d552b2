//! Test fixtures for common test scenarios.

use std::path::PathBuf;

use crate::builder::context::BuildContext;
use crate::builder::toolchain::{Toolchain, ToolchainVersion};
use crate::core::layout::BuildLayout;
use crate::core::options::BuildConfiguration;
use crate::core::platform::{Interpreter, Platform, System};
use crate::util::process::SearchPath;

/// A 64-bit CPython 3.8 on Linux.
pub fn linux_interpreter() -> Interpreter {
    Interpreter {
        executable: PathBuf::from("/usr/bin/python3"),
        major: 3,
        minor: 8,
        platform_tag: "linux-x86_64".to_string(),
        is_64bit: true,
    }
}

/// CMake 3.22.1 at `/usr/bin/cmake`.
pub fn test_toolchain() -> Toolchain {
    Toolchain::new("/usr/bin/cmake", ToolchainVersion::new(3, 22, 1))
}

/// A Linux build context with default options under `build_root`.
pub fn test_context(build_root: impl Into<PathBuf>) -> BuildContext {
    let interpreter = linux_interpreter();
    let layout = BuildLayout::new(build_root, &interpreter);

    BuildContext::new(
        BuildConfiguration::default(),
        interpreter,
        test_toolchain(),
        layout,
        SearchPath::new([PathBuf::from("/usr/bin")]),
    )
    .with_platform(Platform::new(System::Linux, true))
    .with_cxxflags("")
}
