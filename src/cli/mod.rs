//! CLI routing and command dispatch.

use crate::constants;
use crate::core::config;
use crate::core::generator::PasswordGenerator;
use crate::core::paths::VaultPaths;
use crate::core::store::CredentialStore;
use crate::models::vault_config::VaultConfig;
use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

pub mod credential;
pub mod doctor;
pub mod generate;
pub mod init;

/// Shared context passed to all command handlers.
pub struct CliContext {
    pub paths: VaultPaths,
    pub non_interactive: bool,
    pub config: VaultConfig,
    pub config_load_warning: Option<String>,
}

impl CliContext {
    pub fn store(&self) -> CredentialStore {
        CredentialStore::new(&self.paths.store)
    }

    pub fn generator(&self) -> Result<PasswordGenerator> {
        PasswordGenerator::new(&self.config.generator).with_context(|| {
            format!("generator policy in {}", self.paths.config.display())
        })
    }
}

#[derive(Parser, Debug)]
#[command(name = "passvault", version, about = "Local password vault and generator")]
pub struct Cli {
    /// Store file (JSON); falls back to PASSVAULT_FILE, the config, then ./data.json
    #[arg(long, global = true, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Config file (TOML); falls back to PASSVAULT_CONFIG, then ./passvault.toml
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Run in non-interactive mode (no prompts, suitable for automation)
    #[arg(long, global = true, env = "PASSVAULT_NON_INTERACTIVE")]
    pub non_interactive: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let config_path = VaultPaths::resolve_config(self.config);

        // Doctor reports a broken config instead of failing on it.
        let mut config_load_warning: Option<String> = None;
        let config = match config::load(&config_path.0) {
            Ok(cfg) => cfg,
            Err(e) if matches!(self.command, Commands::Doctor(_)) => {
                warn!(error = %e, "config not loaded");
                config_load_warning = Some(format!("{:#}", e));
                VaultConfig::default()
            }
            Err(e) => return Err(e),
        };

        let paths = VaultPaths::resolve(self.file, config_path, config.store.path.clone());
        debug!(
            store = %paths.store.display(),
            store_source = %paths.store_source,
            config = %paths.config.display(),
            config_source = %paths.config_source,
            "resolved paths"
        );

        let ctx = CliContext {
            paths,
            non_interactive: self.non_interactive,
            config,
            config_load_warning,
        };

        match self.command {
            Commands::Init(args) => init::run(&ctx, args),
            Commands::Add(args) => credential::run_add(&ctx, args),
            Commands::Get(args) => credential::run_get(&ctx, args),
            Commands::List(args) => credential::run_list(&ctx, args),
            Commands::Search(args) => credential::run_search(&ctx, args),
            Commands::Generate(args) => generate::run(&ctx, args),
            Commands::Doctor(args) => doctor::run(&ctx, args),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a default config file
    Init(init::InitArgs),
    /// Save a login for a site (overwrites an existing one)
    Add(credential::AddArgs),
    /// Show the login stored for a site
    Get(credential::GetArgs),
    /// List stored sites and usernames
    List(credential::ListArgs),
    /// Search site names
    Search(credential::SearchArgs),
    /// Generate random passwords
    Generate(generate::GenerateArgs),
    /// Diagnose store and config (safe, read-only)
    Doctor(doctor::DoctorArgs),
}

/// Install the stderr log subscriber. `PASSVAULT_LOG` overrides `-v`.
pub fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_env(constants::ENV_LOG)
        .unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_add_with_global_file() {
        let cli = Cli::try_parse_from([
            "passvault",
            "--file",
            "/tmp/v.json",
            "add",
            "github.com",
            "--username",
            "octo",
            "--generate",
        ])
        .unwrap();
        assert_eq!(cli.file, Some(PathBuf::from("/tmp/v.json")));
        match cli.command {
            Commands::Add(args) => {
                assert_eq!(args.site, "github.com");
                assert_eq!(args.username.as_deref(), Some("octo"));
                assert!(args.generate);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_generate_conflicts_with_stdin() {
        let res = Cli::try_parse_from([
            "passvault",
            "add",
            "site",
            "--generate",
            "--password-stdin",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn test_verbose_counts() {
        let cli = Cli::try_parse_from(["passvault", "-vv", "generate"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }
}
