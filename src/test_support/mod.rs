//! Test utilities and mocks for extbuild unit tests.
//!
//! This module provides a scripted [`Executor`] so that toolchain lookup,
//! phase execution and the test runner can be exercised without spawning
//! real processes.
//!
//! # Example
//!
//! ```rust,ignore
//! use extbuild::test_support::{MockExecutor, MockProcessOutput};
//!
//! #[test]
//! fn test_example() {
//!     let mut exec = MockExecutor::new();
//!     exec.expect_contains("cmake --version", MockProcessOutput::success("cmake version 3.22.1"));
//!
//!     // Hand `&mut exec` to the code under test, then inspect exec.calls()
//! }
//! ```

pub mod fixtures;

use anyhow::{bail, Result};

use crate::util::process::{Executor, ProcessBuilder, ProcessOutput};

// Re-export fixtures for convenience
pub use fixtures::*;

/// Mock process output for testing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockProcessOutput {
    /// Exit status, `None` for a process killed by a signal.
    pub status: Option<i32>,
    /// Standard output.
    pub stdout: String,
    /// Standard error.
    pub stderr: String,
}

impl MockProcessOutput {
    /// Create a successful output with the given stdout.
    pub fn success(stdout: impl Into<String>) -> Self {
        MockProcessOutput {
            status: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Create a failure output with the given stderr and status code.
    pub fn failure(status: i32, stderr: impl Into<String>) -> Self {
        MockProcessOutput {
            status: Some(status),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Create an output for a process terminated without an exit code.
    pub fn killed() -> Self {
        MockProcessOutput {
            status: None,
            stdout: String::new(),
            stderr: String::new(),
        }
    }

    fn to_output(&self) -> ProcessOutput {
        ProcessOutput {
            code: self.status,
            stdout: self.stdout.clone(),
            stderr: self.stderr.clone(),
        }
    }
}

impl Default for MockProcessOutput {
    fn default() -> Self {
        MockProcessOutput::success("")
    }
}

/// Pattern for matching commands in MockExecutor.
#[derive(Debug, Clone)]
pub enum CommandPattern {
    /// Exact match on full command string.
    Exact(String),
    /// Match if command contains substring.
    Contains(String),
}

impl CommandPattern {
    /// Check if this pattern matches the given command.
    pub fn matches(&self, cmd: &str) -> bool {
        match self {
            CommandPattern::Exact(s) => cmd == s,
            CommandPattern::Contains(s) => cmd.contains(s.as_str()),
        }
    }
}

/// Expectation for a command execution.
#[derive(Debug, Clone)]
pub struct CommandExpectation {
    /// Pattern to match against commands.
    pub pattern: CommandPattern,
    /// Output to return when matched.
    pub output: MockProcessOutput,
    /// Number of times this expectation can be used (None = unlimited).
    pub times: Option<usize>,
    /// Number of times this expectation has been used.
    pub used: usize,
}

impl CommandExpectation {
    /// Create a new expectation.
    pub fn new(pattern: CommandPattern, output: MockProcessOutput) -> Self {
        CommandExpectation {
            pattern,
            output,
            times: None,
            used: 0,
        }
    }

    /// Set the number of times this expectation can be used.
    pub fn times(mut self, n: usize) -> Self {
        self.times = Some(n);
        self
    }

    /// Check if this expectation can still be used.
    pub fn available(&self) -> bool {
        match self.times {
            Some(n) => self.used < n,
            None => true,
        }
    }
}

/// Mock process executor for testing command execution.
///
/// Records every command it is asked to run, in order, and answers with
/// the first matching expectation.
#[derive(Debug, Default)]
pub struct MockExecutor {
    expectations: Vec<CommandExpectation>,
    calls: Vec<String>,
    commands: Vec<ProcessBuilder>,
    default_output: Option<MockProcessOutput>,
}

impl MockExecutor {
    /// Create a new mock executor.
    pub fn new() -> Self {
        MockExecutor::default()
    }

    /// Add an expectation for an exact command match.
    pub fn expect(&mut self, cmd: &str, output: MockProcessOutput) -> &mut Self {
        self.expectations.push(CommandExpectation::new(
            CommandPattern::Exact(cmd.to_string()),
            output,
        ));
        self
    }

    /// Add an expectation for a command containing a substring.
    pub fn expect_contains(&mut self, substring: &str, output: MockProcessOutput) -> &mut Self {
        self.expectations.push(CommandExpectation::new(
            CommandPattern::Contains(substring.to_string()),
            output,
        ));
        self
    }

    /// Add a custom expectation.
    pub fn expect_pattern(&mut self, expectation: CommandExpectation) -> &mut Self {
        self.expectations.push(expectation);
        self
    }

    /// Set a default output for commands that don't match any expectation.
    pub fn set_default(&mut self, output: MockProcessOutput) -> &mut Self {
        self.default_output = Some(output);
        self
    }

    fn run(&mut self, cmd: &ProcessBuilder) -> Result<ProcessOutput> {
        let full_cmd = cmd.display_command();

        self.calls.push(full_cmd.clone());
        self.commands.push(cmd.clone());

        for exp in &mut self.expectations {
            if exp.pattern.matches(&full_cmd) && exp.available() {
                exp.used += 1;
                return Ok(exp.output.to_output());
            }
        }

        if let Some(ref default) = self.default_output {
            return Ok(default.to_output());
        }

        bail!("unexpected command: {}", full_cmd)
    }

    /// Get all commands that were called.
    pub fn calls(&self) -> &[String] {
        &self.calls
    }

    /// Get the full builders of all commands that were called.
    pub fn commands(&self) -> &[ProcessBuilder] {
        &self.commands
    }

    /// Number of recorded calls whose command line contains `substring`.
    pub fn count_calls(&self, substring: &str) -> usize {
        self.calls.iter().filter(|c| c.contains(substring)).count()
    }

    /// Verify that all expectations with a specific count were satisfied.
    pub fn verify(&self) -> Result<()> {
        for (i, exp) in self.expectations.iter().enumerate() {
            if let Some(expected) = exp.times {
                if exp.used != expected {
                    bail!(
                        "expectation {} was used {} times, expected {}",
                        i,
                        exp.used,
                        expected
                    );
                }
            }
        }
        Ok(())
    }
}

impl Executor for MockExecutor {
    fn status(&mut self, cmd: &ProcessBuilder) -> Result<ProcessOutput> {
        let mut output = self.run(cmd)?;
        output.stdout.clear();
        output.stderr.clear();
        Ok(output)
    }

    fn output(&mut self, cmd: &ProcessBuilder) -> Result<ProcessOutput> {
        self.run(cmd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_executor_exact_match() {
        let mut exec = MockExecutor::new();
        exec.expect("cmake --version", MockProcessOutput::success("cmake version 3.22.1"));

        let out = exec.output(&ProcessBuilder::new("cmake").arg("--version")).unwrap();
        assert_eq!(out.stdout, "cmake version 3.22.1");
        assert_eq!(exec.calls(), &["cmake --version".to_string()]);
    }

    #[test]
    fn test_mock_executor_unexpected_command() {
        let mut exec = MockExecutor::new();

        assert!(exec.status(&ProcessBuilder::new("ctest")).is_err());
    }

    #[test]
    fn test_mock_executor_times() {
        let mut exec = MockExecutor::new();
        exec.expect_pattern(
            CommandExpectation::new(
                CommandPattern::Contains("--build".to_string()),
                MockProcessOutput::failure(1, ""),
            )
            .times(1),
        );
        exec.set_default(MockProcessOutput::success(""));

        let cmd = ProcessBuilder::new("cmake").args(["--build", "."]);
        assert_eq!(exec.status(&cmd).unwrap().code, Some(1));
        assert_eq!(exec.status(&cmd).unwrap().code, Some(0));
        exec.verify().unwrap();
        assert_eq!(exec.count_calls("--build"), 2);
    }
}
