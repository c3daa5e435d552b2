//! CMake argument assembly.
//!
//! Everything here is a pure function of the validated configuration and
//! the target platform, so the generated command lines can be checked
//! without running CMake.

use std::path::Path;

use crate::core::options::{effective_cxx_standard, valid_override, BuildConfiguration};
use crate::core::platform::Platform;

/// Format a `-D<key>=<value>` cache definition.
pub fn define(key: &str, value: impl std::fmt::Display) -> String {
    format!("-D{}={}", key, value)
}

/// Arguments for the configure step, in a stable order.
///
/// `python` is the interpreter the extension is built for and
/// `install_prefix` the absolute directory the module is installed into.
pub fn configure_args(
    config: &BuildConfiguration,
    platform: &Platform,
    python: &Path,
    install_prefix: &Path,
) -> Vec<String> {
    let mut args = vec![
        define("PYTHON_EXECUTABLE", python.display()),
        define("SETUP_PY", "ON"),
        define("CMAKE_INSTALL_PREFIX", install_prefix.display()),
        define("CMAKE_BUILD_TYPE", config.build_type),
        define("USE_MPI", config.use_mpi),
    ];

    if !platform.is_windows() {
        args.push(define("BUILD_EXAMPLES", config.build_examples));
    }

    if let Some(standard) = effective_cxx_standard(config.cxx_standard, platform) {
        args.push(define("CMAKE_CXX_STANDARD", standard));
    }

    let overrides = [
        ("MPI_C_COMPILER", &config.mpicc),
        ("MPI_CXX_COMPILER", &config.mpicxx),
        ("CMAKE_PREFIX_PATH", &config.cmake_prefix_path),
        ("CMAKE_LIBRARY_PATH", &config.cmake_library_path),
        ("CMAKE_INCLUDE_PATH", &config.cmake_include_path),
    ];
    for (key, value) in overrides {
        if let Some(value) = valid_override(value) {
            args.push(define(key, value));
        }
    }

    args.push(define("TIMEMORY_EXCEPTIONS", config.timemory_exceptions));

    // Visual Studio generators pick the architecture at configure time
    if platform.is_windows() && platform.is_64bit {
        args.extend(["-A".to_string(), "x64".to_string()]);
    }

    args
}

/// Arguments after `cmake --build <dir>` for the build step.
pub fn build_args(config: &BuildConfiguration, platform: &Platform) -> Vec<String> {
    let mut args = vec!["--config".to_string(), config.build_type.to_string()];

    if platform.is_windows() {
        args.extend(["--target", "ALL_BUILD", "--", "/m"].map(String::from));
    } else {
        args.extend(["--".to_string(), format!("-j{}", config.jobs)]);
    }

    args
}

/// Arguments after `cmake --build <dir>` for the install step.
pub fn install_args(config: &BuildConfiguration, platform: &Platform) -> Vec<String> {
    let mut args = vec!["--config".to_string(), config.build_type.to_string()];

    if platform.is_windows() {
        args.extend(["--target", "INSTALL", "--", "/m"].map(String::from));
    } else {
        args.extend(["--target", "install"].map(String::from));
    }

    args
}
