use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use spacectl_core::{ClientConfig, DEFAULT_BASE_URL};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ProfileConfig {
    pub endpoint: Option<String>,
    pub token: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl ProfileConfig {
    /// Applies `key = value`. Valid keys: endpoint, token, timeout_secs.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "endpoint" => self.endpoint = Some(value.to_string()),
            "token" => self.token = Some(value.to_string()),
            "timeout_secs" => {
                let secs = value
                    .parse()
                    .with_context(|| format!("timeout_secs must be a whole number, got {value}"))?;
                self.timeout_secs = Some(secs);
            }
            other => anyhow::bail!(
                "Unknown config key: {other}. Valid keys: endpoint, token, timeout_secs"
            ),
        }
        Ok(())
    }
}

pub type ConfigFile = HashMap<String, ProfileConfig>;

fn config_dir() -> Result<PathBuf> {
    let dir = dirs::home_dir()
        .context("Cannot determine home directory")?
        .join(".spacectl");
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

pub fn load_all(path: &Path) -> Result<ConfigFile> {
    if !path.exists() {
        return Ok(ConfigFile::new());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    let cfg: ConfigFile = toml::from_str(&content)
        .with_context(|| format!("Invalid config: {}", path.display()))?;
    Ok(cfg)
}

pub fn load_profile(path: &Path, profile: &str) -> Result<ProfileConfig> {
    let mut all = load_all(path)?;
    Ok(all.remove(profile).unwrap_or_default())
}

pub fn save_profile(path: &Path, profile: &str, config: &ProfileConfig) -> Result<()> {
    let mut all = load_all(path)?;
    all.insert(profile.to_string(), config.clone());
    let content = toml::to_string_pretty(&all)?;
    fs::write(path, content)?;
    Ok(())
}

/// Builds the transport config.
///
/// Endpoint: `--endpoint`/`SPACECTL_ENDPOINT`, then the profile, then the
/// public API. Token: `--token`/`HF_TOKEN`, then the profile.
pub fn resolve_client_config(
    cli_endpoint: &Option<String>,
    cli_token: &Option<String>,
    profile: &ProfileConfig,
) -> ClientConfig {
    let endpoint = cli_endpoint
        .clone()
        .or_else(|| profile.endpoint.clone())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    let mut config = ClientConfig::new().with_base_url(endpoint);
    if let Some(token) = cli_token.clone().or_else(|| profile.token.clone()) {
        config = config.with_token(token);
    }
    if let Some(secs) = profile.timeout_secs {
        config = config.with_request_timeout(Duration::from_secs(secs));
    }
    config
}
