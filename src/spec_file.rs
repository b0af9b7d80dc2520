use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use serde_yaml_bw as serde_yaml;

/// Reads a local spec file into a JSON value. JSON is tried first; anything
/// else is parsed as YAML.
pub fn file_to_dict(path: &Path) -> Result<Value> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read spec file {}", path.display()))?;
    parse_spec(&raw).with_context(|| format!("failed to parse spec file {}", path.display()))
}

pub fn load<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let value = file_to_dict(path)?;
    serde_json::from_value(value)
        .with_context(|| format!("spec file {} has an unexpected shape", path.display()))
}

fn parse_spec(raw: &str) -> Result<Value> {
    let trimmed = raw.trim();
    anyhow::ensure!(!trimmed.is_empty(), "spec file is empty");
    if let Ok(value) = serde_json::from_str(trimmed) {
        return Ok(value);
    }
    serde_yaml::from_str(trimmed).context("spec file is neither JSON nor YAML")
}
