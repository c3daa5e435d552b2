//! Host platform and target interpreter description.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::util::process::{Executor, ProcessBuilder, SearchPath};

/// Operating system family, as the build logic distinguishes it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum System {
    Windows,
    Linux,
    Darwin,
    Other(String),
}

impl System {
    /// The system this binary is running on.
    pub fn host() -> Self {
        match std::env::consts::OS {
            "windows" => System::Windows,
            "linux" => System::Linux,
            "macos" => System::Darwin,
            other => System::Other(other.to_string()),
        }
    }
}

impl fmt::Display for System {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            System::Windows => write!(f, "Windows"),
            System::Linux => write!(f, "Linux"),
            System::Darwin => write!(f, "Darwin"),
            System::Other(name) => write!(f, "{}", name),
        }
    }
}

/// Target platform for argument assembly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Platform {
    pub system: System,
    /// Whether the interpreter being built for is 64-bit.
    pub is_64bit: bool,
}

impl Platform {
    pub fn new(system: System, is_64bit: bool) -> Self {
        Platform { system, is_64bit }
    }

    /// Host system, with the pointer width of the given interpreter.
    pub fn for_interpreter(interpreter: &Interpreter) -> Self {
        Platform::new(System::host(), interpreter.is_64bit)
    }

    pub fn is_windows(&self) -> bool {
        self.system == System::Windows
    }
}

const PROBE_SCRIPT: &str = "import sys, sysconfig; \
    print(sys.executable); \
    print(sys.version_info[0]); \
    print(sys.version_info[1]); \
    print(sysconfig.get_platform()); \
    print(int(sys.maxsize > 2**32))";

/// The Python interpreter an extension is built for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpreter {
    /// Absolute path of the interpreter executable.
    pub executable: PathBuf,
    pub major: u32,
    pub minor: u32,
    /// Platform tag, e.g. `linux-x86_64`, `macosx-10.9-x86_64`, `win-amd64`.
    pub platform_tag: String,
    pub is_64bit: bool,
}

impl Interpreter {
    /// Default interpreter command for this host.
    pub fn default_command() -> &'static str {
        if cfg!(windows) {
            "python"
        } else {
            "python3"
        }
    }

    /// Query an interpreter for its executable, version and platform tag.
    pub fn probe(
        exec: &mut dyn Executor,
        search_path: &SearchPath,
        python: &Path,
    ) -> Result<Self> {
        let program = resolve_program(search_path, python);
        let cmd = ProcessBuilder::new(&program)
            .args(["-c", PROBE_SCRIPT])
            .env("PATH", search_path.to_os_string());

        let output = exec
            .output(&cmd)
            .with_context(|| format!("failed to run Python interpreter `{}`", python.display()))?;

        if !output.success() {
            bail!(
                "Python interpreter `{}` exited with code {:?}\n{}",
                program.display(),
                output.code,
                output.stderr
            );
        }

        Self::parse_probe(&output.stdout).with_context(|| {
            format!(
                "unexpected output from Python interpreter `{}`",
                program.display()
            )
        })
    }

    fn parse_probe(stdout: &str) -> Result<Self> {
        let lines: Vec<&str> = stdout.lines().map(str::trim).collect();
        let [executable, major, minor, platform_tag, is_64bit] = lines.as_slice() else {
            bail!("expected 5 lines, got {}", lines.len());
        };

        Ok(Interpreter {
            executable: PathBuf::from(executable),
            major: major.parse().context("invalid major version")?,
            minor: minor.parse().context("invalid minor version")?,
            platform_tag: platform_tag.to_string(),
            is_64bit: *is_64bit == "1",
        })
    }
}

/// Resolve a bare program name against the search path.
pub(crate) fn resolve_program(search_path: &SearchPath, program: &Path) -> PathBuf {
    if program.components().count() > 1 {
        return program.to_path_buf();
    }
    search_path
        .find(program)
        .unwrap_or_else(|| program.to_path_buf())
}
