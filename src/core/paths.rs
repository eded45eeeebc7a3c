//! Store and config path resolution.

use crate::constants;
use std::env;
use std::fmt;
use std::path::PathBuf;

/// Where a resolved path came from, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathSource {
    Flag,
    Env,
    Config,
    Default,
}

impl fmt::Display for PathSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PathSource::Flag => "command line",
            PathSource::Env => "environment",
            PathSource::Config => "config file",
            PathSource::Default => "default",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone)]
pub struct VaultPaths {
    pub store: PathBuf,
    pub store_source: PathSource,
    pub config: PathBuf,
    pub config_source: PathSource,
}

impl VaultPaths {
    /// Resolve the config file from CLI arg, env var, or default.
    pub fn resolve_config(config_arg: Option<PathBuf>) -> (PathBuf, PathSource) {
        pick(config_arg, constants::ENV_CONFIG_FILE, None, constants::DEFAULT_CONFIG_FILE)
    }

    /// Resolve the store file from CLI arg, env var, config, or default.
    pub fn resolve(
        store_arg: Option<PathBuf>,
        config: (PathBuf, PathSource),
        configured_store: Option<PathBuf>,
    ) -> Self {
        let (store, store_source) = pick(
            store_arg,
            constants::ENV_STORE_FILE,
            configured_store,
            constants::DEFAULT_STORE_FILE,
        );
        Self {
            store,
            store_source,
            config: config.0,
            config_source: config.1,
        }
    }
}

fn pick(
    arg: Option<PathBuf>,
    env_var: &str,
    configured: Option<PathBuf>,
    default: &str,
) -> (PathBuf, PathSource) {
    if let Some(path) = arg {
        return (path, PathSource::Flag);
    }
    if let Some(path) = env::var_os(env_var).filter(|v| !v.is_empty()) {
        return (PathBuf::from(path), PathSource::Env);
    }
    if let Some(path) = configured {
        return (path, PathSource::Config);
    }
    (PathBuf::from(default), PathSource::Default)
}

impl fmt::Display for VaultPaths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "vault@{}", self.store.display())
    }
}
