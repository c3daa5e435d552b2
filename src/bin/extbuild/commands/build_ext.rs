//! `extbuild build-ext` command

use anyhow::Result;

use crate::cli::BuildExtArgs;
use extbuild::ops::{build_ext, BuildOptions};
use extbuild::util::{GlobalContext, SearchPath, SystemExecutor};

pub fn execute(args: BuildExtArgs) -> Result<()> {
    let mut gctx = GlobalContext::new()?;

    // CLI overrides config
    args.project.apply(gctx.config_mut());
    gctx.config_mut().build.merge(args.settings());

    let opts = BuildOptions {
        plan_only: args.plan,
    };

    let result = build_ext(&gctx, &mut SystemExecutor, SearchPath::from_env(), &opts)?;

    if args.plan {
        println!("{}", serde_json::to_string_pretty(&result.invocations)?);
        return Ok(());
    }

    for invocation in result.invocations.iter().take(result.installed.len()) {
        eprintln!(
            "    Finished `{}` -> {}",
            invocation.target.name,
            invocation.install_prefix.display()
        );
    }

    Ok(())
}
