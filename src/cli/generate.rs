use crate::cli::CliContext;
use anyhow::{bail, Result};
use clap::Args;
use std::io::Write;
use tracing::debug;
use zeroize::Zeroizing;

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Number of passwords to print
    #[arg(long, short = 'n', default_value_t = 1)]
    pub count: usize,
}

pub fn run(ctx: &CliContext, args: GenerateArgs) -> Result<()> {
    if args.count == 0 {
        bail!("--count must be at least 1");
    }
    let generator = ctx.generator()?;
    debug!(count = args.count, max_length = generator.max_length(), "generating passwords");

    let mut stdout = std::io::stdout().lock();
    for _ in 0..args.count {
        let password = Zeroizing::new(generator.generate()?);
        writeln!(stdout, "{}", password.as_str())?;
    }
    stdout.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::paths::{PathSource, VaultPaths};
    use crate::models::vault_config::VaultConfig;
    use std::path::PathBuf;

    fn ctx_with(config: VaultConfig) -> CliContext {
        CliContext {
            paths: VaultPaths::resolve(
                Some(PathBuf::from("data.json")),
                (PathBuf::from("passvault.toml"), PathSource::Default),
                None,
            ),
            non_interactive: true,
            config,
            config_load_warning: None,
        }
    }

    #[test]
    fn test_generate_default_policy() {
        let ctx = ctx_with(VaultConfig::default());
        assert!(run(&ctx, GenerateArgs { count: 3 }).is_ok());
    }

    #[test]
    fn test_generate_zero_count_rejected() {
        let ctx = ctx_with(VaultConfig::default());
        assert!(run(&ctx, GenerateArgs { count: 0 }).is_err());
    }

    #[test]
    fn test_generate_bad_policy_reports_config() {
        let mut config = VaultConfig::default();
        config.generator.max_length = 4;
        let ctx = ctx_with(config);
        let err = run(&ctx, GenerateArgs { count: 1 }).unwrap_err();
        assert!(format!("{:#}", err).contains("passvault.toml"));
    }
}
