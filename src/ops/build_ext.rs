//! Implementation of `extbuild build-ext`.

use anyhow::Result;

use crate::builder::{BuildContext, BuildDriver, Invocation, ToolchainLocator};
use crate::core::layout::BuildLayout;
use crate::core::options::BuildConfiguration;
use crate::core::platform::Interpreter;
use crate::core::target::ExtensionTarget;
use crate::util::context::GlobalContext;
use crate::util::process::{Executor, SearchPath};

/// Options for the build-ext command.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Only plan the invocations, run no phase
    pub plan_only: bool,
}

/// Outcome of a build-ext run.
#[derive(Debug, Clone)]
pub struct BuildResult {
    /// Planned invocations, one per target, in build order
    pub invocations: Vec<Invocation>,

    /// Targets that went through all three phases
    pub installed: Vec<ExtensionTarget>,
}

/// Configure, build and install every configured extension.
///
/// CMake is located and version-checked before any target starts. Targets
/// then build one after another; the first failing phase ends the run and
/// leaves already installed targets in place.
pub fn build_ext(
    gctx: &GlobalContext,
    exec: &mut dyn Executor,
    mut search_path: SearchPath,
    opts: &BuildOptions,
) -> Result<BuildResult> {
    let targets = gctx.targets()?;
    let names: Vec<String> = targets.iter().map(|t| t.name.clone()).collect();
    let python = gctx.python();

    let toolchain = ToolchainLocator::new(&python).locate(exec, &mut search_path, &names)?;
    let interpreter = Interpreter::probe(exec, &search_path, &python)?;
    tracing::debug!(
        "Building for Python {}.{} ({}) at {}",
        interpreter.major,
        interpreter.minor,
        interpreter.platform_tag,
        interpreter.executable.display()
    );

    let layout = BuildLayout::new(gctx.build_root(), &interpreter);
    let config = BuildConfiguration::from_settings(&gctx.config().build);
    let ctx = BuildContext::new(config, interpreter, toolchain, layout, search_path);

    let invocations: Vec<Invocation> = targets
        .iter()
        .map(|target| Invocation::plan(&ctx, target, targets.len()))
        .collect();

    let mut installed = Vec::new();
    if !opts.plan_only {
        for invocation in &invocations {
            if !invocation.target.has_cmake_project() {
                tracing::warn!(
                    "no CMakeLists.txt in {}",
                    invocation.target.source_dir.display()
                );
            }

            BuildDriver::new(exec, invocation.clone()).run()?;
            installed.push(invocation.target.clone());
        }
    }

    Ok(BuildResult {
        invocations,
        installed,
    })
}
