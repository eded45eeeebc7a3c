use crate::constants;
use crate::models::vault_config::VaultConfig;
use crate::util::fs as vault_fs;
use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::Path;

/// Load the config file; a missing file yields the defaults.
pub fn load(path: &Path) -> Result<VaultConfig> {
    if !path.exists() {
        return Ok(VaultConfig::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("read config {}", path.display()))?;
    let config: VaultConfig = toml::from_str(&content)
        .with_context(|| format!("parse config {}", path.display()))?;
    Ok(config)
}

pub fn save(path: &Path, config: &VaultConfig) -> Result<()> {
    let content = toml::to_string_pretty(config).context("serialize config")?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    vault_fs::ensure_dir(dir, constants::STORE_DIR_MODE)
        .with_context(|| format!("create dir {}", dir.display()))?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir).context("create temp config")?;
    tmp.write_all(content.as_bytes())
        .context("write config")?;
    tmp.flush().ok();
    vault_fs::set_permissions(tmp.path(), constants::CONFIG_FILE_MODE)
        .context("set permissions on temp config")?;

    tmp.persist(path)
        .map_err(|err| anyhow::anyhow!("persist config {}: {}", path.display(), err))?;
    Ok(())
}
