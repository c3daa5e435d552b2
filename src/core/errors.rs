//! Build and test failures that map to process exit codes.

use thiserror::Error;

/// Exit status for a missing or outdated toolchain (`EX_UNAVAILABLE`).
pub const TOOLCHAIN_EXIT_CODE: i32 = 69;

/// Exit status for any other error.
pub const GENERIC_EXIT_CODE: i32 = 1;

/// A build phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseKind {
    Configure,
    Build,
    Install,
}

impl PhaseKind {
    /// Phases in execution order.
    pub const ORDER: [PhaseKind; 3] = [PhaseKind::Configure, PhaseKind::Build, PhaseKind::Install];

    pub fn as_str(&self) -> &'static str {
        match self {
            PhaseKind::Configure => "configure",
            PhaseKind::Build => "build",
            PhaseKind::Install => "install",
        }
    }
}

impl std::fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the toolchain is needed for, as named in the missing-toolchain error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolchainUse {
    #[default]
    Build,
    Test,
}

impl std::fmt::Display for ToolchainUse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToolchainUse::Build => f.write_str("build"),
            ToolchainUse::Test => f.write_str("test"),
        }
    }
}

/// Failure of a build or test run.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("CMake must be installed to {purpose} the following extensions: {}", .targets.join(", "))]
    ToolchainMissing {
        purpose: ToolchainUse,
        targets: Vec<String>,
    },

    #[error("CMake >= {required} is required, found {found}")]
    ToolchainVersionTooOld { found: String, required: String },

    #[error("{phase} phase of `{target}` failed with exit code {code}\n  command: {command}")]
    PhaseFailed {
        target: String,
        phase: PhaseKind,
        command: String,
        code: i32,
    },

    #[error("tests failed with exit code {code}\n  command: {command}")]
    TestsFailed { command: String, code: i32 },
}

impl BuildError {
    /// Process exit code for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            BuildError::ToolchainMissing { .. } | BuildError::ToolchainVersionTooOld { .. } => {
                TOOLCHAIN_EXIT_CODE
            }
            BuildError::PhaseFailed { code, .. } | BuildError::TestsFailed { code, .. } => *code,
        }
    }
}

/// Exit code for an error returned from a command.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<BuildError>()
        .map_or(GENERIC_EXIT_CODE, BuildError::exit_code)
}
