//! Core data structures for extbuild.
//!
//! This module contains the foundational types used throughout extbuild:
//! - Validated build options
//! - Platform and interpreter description
//! - Extension targets and the build directory layout
//! - Error kinds and exit codes

pub mod errors;
pub mod layout;
pub mod options;
pub mod platform;
pub mod target;

pub use errors::{BuildError, PhaseKind, ToolchainUse};
pub use layout::{build_dir_name, BuildLayout};
pub use options::{BuildConfiguration, BuildType, Switch};
pub use platform::{Interpreter, Platform, System};
pub use target::ExtensionTarget;
