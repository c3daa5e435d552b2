//! Phase execution for one target.

use anyhow::Result;

use crate::builder::plan::Invocation;
use crate::core::errors::{BuildError, PhaseKind};
use crate::util::fs::ensure_dir;
use crate::util::process::Executor;

/// Progress of one target through its phases.
///
/// `Installed` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseState {
    Pending,
    Configured,
    Built,
    Installed,
    Failed { phase: PhaseKind, code: i32 },
}

impl PhaseState {
    /// The phase that runs next, if any.
    pub fn next_phase(&self) -> Option<PhaseKind> {
        match self {
            PhaseState::Pending => Some(PhaseKind::Configure),
            PhaseState::Configured => Some(PhaseKind::Build),
            PhaseState::Built => Some(PhaseKind::Install),
            PhaseState::Installed | PhaseState::Failed { .. } => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.next_phase().is_none()
    }

    fn completed(phase: PhaseKind) -> Self {
        match phase {
            PhaseKind::Configure => PhaseState::Configured,
            PhaseKind::Build => PhaseState::Built,
            PhaseKind::Install => PhaseState::Installed,
        }
    }
}

/// Runs configure, build and install for one target, stopping at the
/// first nonzero exit.
pub struct BuildDriver<'a> {
    exec: &'a mut dyn Executor,
    invocation: Invocation,
    state: PhaseState,
}

impl<'a> BuildDriver<'a> {
    pub fn new(exec: &'a mut dyn Executor, invocation: Invocation) -> Self {
        BuildDriver {
            exec,
            invocation,
            state: PhaseState::Pending,
        }
    }

    pub fn state(&self) -> PhaseState {
        self.state
    }

    pub fn invocation(&self) -> &Invocation {
        &self.invocation
    }

    /// Run the next phase and return the new state.
    ///
    /// A terminal state is returned unchanged. Errors are only returned when
    /// a process could not be started at all.
    pub fn step(&mut self) -> Result<PhaseState> {
        let Some(kind) = self.state.next_phase() else {
            return Ok(self.state);
        };

        if kind == PhaseKind::Configure {
            ensure_dir(&self.invocation.build_dir)?;
        }

        let Some(cmd) = self.invocation.phase(kind) else {
            return Ok(self.state);
        };

        tracing::info!("{} `{}`: {}", kind, self.invocation.target, cmd.display_command());
        let output = self.exec.status(cmd)?;

        self.state = if output.success() {
            PhaseState::completed(kind)
        } else {
            PhaseState::Failed {
                phase: kind,
                code: output.failure_code(),
            }
        };

        Ok(self.state)
    }

    /// Run every remaining phase.
    ///
    /// A failed phase becomes [`BuildError::PhaseFailed`] carrying the full
    /// command line and exit code.
    pub fn run(mut self) -> Result<PhaseState> {
        while !self.state.is_terminal() {
            self.step()?;
        }

        match self.state {
            PhaseState::Failed { phase, code } => {
                let command = self
                    .invocation
                    .phase(phase)
                    .map(|cmd| cmd.display_command())
                    .unwrap_or_default();
                Err(BuildError::PhaseFailed {
                    target: self.invocation.target.name.clone(),
                    phase,
                    command,
                    code,
                }
                .into())
            }
            state => Ok(state),
        }
    }
}
