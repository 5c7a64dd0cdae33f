//! Desired config and state files.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use spacectl_core::{DesiredConfig, ObservedState};

pub fn load_desired(path: &Path) -> Result<DesiredConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read space config: {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Invalid space config: {}", path.display()))
}

/// Tracked state, or `None` when nothing is tracked at `path`.
pub fn load_state(path: &Path) -> Result<Option<ObservedState>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read state: {}", path.display()))?;
    let state = serde_json::from_str(&content)
        .with_context(|| format!("Corrupt state file: {}", path.display()))?;
    Ok(Some(state))
}

pub fn require_state(path: &Path) -> Result<ObservedState> {
    load_state(path)?.with_context(|| {
        format!(
            "No space tracked in {}. Run: spacectl apply or spacectl import <id>",
            path.display()
        )
    })
}

pub fn save_state(path: &Path, state: &ObservedState) -> Result<()> {
    let content = serde_json::to_string_pretty(state)?;
    fs::write(path, content).with_context(|| format!("Failed to write state: {}", path.display()))
}

pub fn remove_state(path: &Path) -> Result<bool> {
    if path.exists() {
        fs::remove_file(path)?;
        Ok(true)
    } else {
        Ok(false)
    }
}
