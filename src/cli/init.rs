use crate::cli::CliContext;
use crate::core::config;
use crate::core::paths::PathSource;
use anyhow::Result;
use clap::Args;
use tracing::info;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing config file
    #[arg(long)]
    pub force: bool,
}

pub fn run(ctx: &CliContext, args: InitArgs) -> Result<()> {
    let paths = &ctx.paths;
    if paths.config.exists() && !args.force {
        println!(
            "config already exists at {} (use --force to overwrite)",
            paths.config.display()
        );
        return Ok(());
    }

    let mut cfg = ctx.config.clone();
    // Pin an explicitly chosen store so later runs find it without flags.
    if matches!(paths.store_source, PathSource::Flag | PathSource::Env) {
        cfg.store.path = Some(paths.store.clone());
    }
    config::save(&paths.config, &cfg)?;
    info!(config = %paths.config.display(), "config written");

    println!("config written to {}", paths.config.display());
    println!("store: {}", paths.store.display());
    Ok(())
}
