//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use extbuild::util::config::{BuildSettings, Config};

/// extbuild - Drive CMake to build native Python extensions
#[derive(Parser)]
#[command(name = "extbuild")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Configure, build and install the native extensions with CMake
    #[command(name = "build-ext")]
    BuildExt(BuildExtArgs),

    /// Run the CTest suite of a previous build-ext
    Test(TestArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Options shared by every command that touches the build tree.
#[derive(Args)]
pub struct ProjectArgs {
    /// Python interpreter the extensions are built for
    #[arg(long, env = "EXTBUILD_PYTHON")]
    pub python: Option<PathBuf>,

    /// Directory holding the temp and lib build directories [default: build]
    #[arg(long)]
    pub build_root: Option<PathBuf>,
}

impl ProjectArgs {
    /// Layer these options over the loaded configuration.
    pub fn apply(&self, config: &mut Config) {
        if let Some(ref python) = self.python {
            config.python = Some(python.clone());
        }
        if let Some(ref build_root) = self.build_root {
            config.build_root = Some(build_root.clone());
        }
    }
}

#[derive(Args)]
pub struct BuildExtArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// CMake build type (Release, Debug, RelWithDebInfo, MinSizeRel) [default: Release]
    #[arg(long, env = "EXTBUILD_BUILD_TYPE")]
    pub build_type: Option<String>,

    /// Build with MPI support (on/off) [default: on]
    #[arg(long)]
    pub use_mpi: Option<String>,

    /// Throw exceptions instead of aborting (on/off) [default: off]
    #[arg(long)]
    pub timemory_exceptions: Option<String>,

    /// Build the examples, ignored on Windows (on/off) [default: on]
    #[arg(long)]
    pub build_examples: Option<String>,

    /// C++ standard; raised to 14 off Windows, only 11, 14 and 17 are passed [default: 11]
    #[arg(long, allow_negative_numbers = true)]
    pub cxx_standard: Option<i64>,

    /// MPI C compiler wrapper
    #[arg(long)]
    pub mpicc: Option<String>,

    /// MPI C++ compiler wrapper
    #[arg(long)]
    pub mpicxx: Option<String>,

    /// Value for CMAKE_PREFIX_PATH
    #[arg(long)]
    pub cmake_prefix_path: Option<String>,

    /// Value for CMAKE_INCLUDE_PATH
    #[arg(long)]
    pub cmake_include_path: Option<String>,

    /// Value for CMAKE_LIBRARY_PATH
    #[arg(long)]
    pub cmake_library_path: Option<String>,

    /// Number of parallel build jobs, ignored on Windows [default: 4]
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Print the planned CMake invocations as JSON instead of running them
    #[arg(long)]
    pub plan: bool,
}

impl BuildExtArgs {
    /// Build options given on the command line.
    pub fn settings(&self) -> BuildSettings {
        BuildSettings {
            build_type: self.build_type.clone(),
            use_mpi: self.use_mpi.clone(),
            timemory_exceptions: self.timemory_exceptions.clone(),
            build_examples: self.build_examples.clone(),
            cxx_standard: self.cxx_standard,
            mpicc: self.mpicc.clone(),
            mpicxx: self.mpicxx.clone(),
            cmake_prefix_path: self.cmake_prefix_path.clone(),
            cmake_include_path: self.cmake_include_path.clone(),
            cmake_library_path: self.cmake_library_path.clone(),
            jobs: self.jobs,
        }
    }
}

#[derive(Args)]
pub struct TestArgs {
    #[command(flatten)]
    pub project: ProjectArgs,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
