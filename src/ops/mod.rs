//! High-level operations.
//!
//! This module contains the implementation of extbuild commands.

pub mod build_ext;

pub use build_ext::{build_ext, BuildOptions, BuildResult};
pub use run_tests::run_tests;
