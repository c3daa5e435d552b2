//! CMake build driver.
//!
//! This module locates CMake, assembles its arguments and runs the
//! configure, build and install phases.

pub mod cmake;
pub mod context;
pub mod executor;
pub mod plan;
pub mod toolchain;

pub use context::BuildContext;
pub use executor::{BuildDriver, PhaseState};
pub use plan::{Invocation, Phase};
pub use toolchain::{Toolchain, ToolchainLocator, ToolchainVersion};
