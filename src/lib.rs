//! extbuild - Drive CMake to build native Python extensions
//!
//! This crate provides the core library functionality for extbuild,
//! including toolchain discovery, CMake argument assembly, phase
//! execution, and locating the test harness afterward.

pub mod builder;
pub mod core;
pub mod ops;
pub mod util;

/// Test utilities and mocks for extbuild unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides a scripted process executor and fixtures.
#[cfg(test)]
pub mod test_support;

pub use crate::core::{
    errors::BuildError, layout::BuildLayout, options::BuildConfiguration, platform::Platform,
    target::ExtensionTarget,
};
pub use util::context::GlobalContext;
