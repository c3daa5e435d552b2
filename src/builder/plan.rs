//! Invocation planning.
//!
//! An [`Invocation`] lists the configure, build and install commands for
//! one target, fully resolved, before anything runs. It is what the driver
//! executes and what `build-ext --plan` prints.

use std::path::PathBuf;

use serde::Serialize;

use crate::builder::cmake;
use crate::builder::context::BuildContext;
use crate::core::errors::PhaseKind;
use crate::core::target::ExtensionTarget;
use crate::util::process::ProcessBuilder;

/// One external process of an invocation.
#[derive(Debug, Clone, Serialize)]
pub struct Phase {
    pub kind: PhaseKind,
    /// Program, arguments, working directory and environment overrides
    pub command: ProcessBuilder,
}

/// The three phases of one target, in execution order.
#[derive(Debug, Clone, Serialize)]
pub struct Invocation {
    pub target: ExtensionTarget,
    /// Absolute build directory; the working directory of every phase
    pub build_dir: PathBuf,
    /// Absolute install prefix
    pub install_prefix: PathBuf,
    pub phases: Vec<Phase>,
}

impl Invocation {
    /// Plan `target`, one of `target_count` targets of this run.
    pub fn plan(ctx: &BuildContext, target: &ExtensionTarget, target_count: usize) -> Self {
        let build_dir = ctx.layout.target_build_dir(target, target_count);
        let install_prefix = target.output_dir(ctx.layout.lib_dir());

        let base = ProcessBuilder::new(ctx.toolchain.cmake())
            .cwd(&build_dir)
            .env("CXXFLAGS", &ctx.cxxflags)
            .env("PATH", ctx.search_path.to_os_string());

        let configure = base
            .clone()
            .args(cmake::configure_args(
                &ctx.config,
                &ctx.platform,
                ctx.python(),
                &install_prefix,
            ))
            .arg(&target.source_dir);

        let build = base
            .clone()
            .arg("--build")
            .arg(&build_dir)
            .args(cmake::build_args(&ctx.config, &ctx.platform));

        let install = base
            .arg("--build")
            .arg(&build_dir)
            .args(cmake::install_args(&ctx.config, &ctx.platform));

        Invocation {
            target: target.clone(),
            build_dir,
            install_prefix,
            phases: vec![
                Phase {
                    kind: PhaseKind::Configure,
                    command: configure,
                },
                Phase {
                    kind: PhaseKind::Build,
                    command: build,
                },
                Phase {
                    kind: PhaseKind::Install,
                    command: install,
                },
            ],
        }
    }

    /// The command of a given phase.
    pub fn phase(&self, kind: PhaseKind) -> Option<&ProcessBuilder> {
        self.phases
            .iter()
            .find(|p| p.kind == kind)
            .map(|p| &p.command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::platform::{Platform, System};
    use crate::test_support::test_context;

    #[test]
    fn test_plan_phase_order_and_cwd() {
        let ctx = test_context("/project/build");
        let target = ExtensionTarget::new("timemory", "/project");
        let inv = Invocation::plan(&ctx, &target, 1);

        let kinds: Vec<PhaseKind> = inv.phases.iter().map(|p| p.kind).collect();
        assert_eq!(kinds, PhaseKind::ORDER.to_vec());

        for phase in &inv.phases {
            assert_eq!(phase.command.get_cwd(), Some(inv.build_dir.as_path()));
        }
        assert_eq!(inv.build_dir, ctx.layout.temp_dir());
    }

    #[test]
    fn test_plan_commands() {
        let ctx = test_context("/project/build");
        let target = ExtensionTarget::new("timemory", "/project");
        let inv = Invocation::plan(&ctx, &target, 1);

        let configure = inv.phase(PhaseKind::Configure).unwrap();
        assert_eq!(configure.get_args().last().map(String::as_str), Some("/project"));
        assert!(configure
            .get_args()
            .contains(&"-DCMAKE_INSTALL_PREFIX=/project/build/lib.linux-x86_64-3.8".to_string()));

        let build = inv.phase(PhaseKind::Build).unwrap();
        assert_eq!(
            build.display_command(),
            "/usr/bin/cmake --build /project/build/temp.linux-x86_64-3.8 --config Release -- -j4"
        );

        let install = inv.phase(PhaseKind::Install).unwrap();
        assert_eq!(
            install.display_command(),
            "/usr/bin/cmake --build /project/build/temp.linux-x86_64-3.8 --config Release --target install"
        );
    }

    #[test]
    fn test_plan_reasserts_cxxflags() {
        let ctx = test_context("/project/build").with_cxxflags("");
        let target = ExtensionTarget::new("timemory", "/project");
        let inv = Invocation::plan(&ctx, &target, 1);

        for phase in &inv.phases {
            assert_eq!(phase.command.get_env().get("CXXFLAGS").map(String::as_str), Some(""));
            assert!(phase.command.get_env().contains_key("PATH"));
        }
    }

    #[test]
    fn test_plan_windows_targets() {
        let ctx = test_context("/project/build").with_platform(Platform::new(System::Windows, true));
        let target = ExtensionTarget::new("timemory", "/project");
        let inv = Invocation::plan(&ctx, &target, 1);

        let build = inv.phase(PhaseKind::Build).unwrap().get_args();
        assert!(build.windows(2).any(|w| w == ["--target", "ALL_BUILD"]));
        let install = inv.phase(PhaseKind::Install).unwrap().get_args();
        assert!(install.windows(2).any(|w| w == ["--target", "INSTALL"]));
        let configure = inv.phase(PhaseKind::Configure).unwrap().get_args();
        assert!(configure.windows(2).any(|w| w == ["-A", "x64"]));
    }

    #[test]
    fn test_plan_serializes() {
        let ctx = test_context("/project/build");
        let target = ExtensionTarget::new("timemory", "/project");
        let inv = Invocation::plan(&ctx, &target, 1);

        let json = serde_json::to_value(&inv).unwrap();
        assert_eq!(json["phases"][0]["kind"], "configure");
        assert_eq!(json["target"]["name"], "timemory");
    }
}
