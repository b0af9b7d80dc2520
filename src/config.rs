use std::fmt;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

/// Environment variable carrying the JSON run configuration.
pub const CONFIG_ENV: &str = "CUSTOM_SCRIPT_CONFIG";

const DEFAULT_PRISM_USER: &str = "admin";

#[derive(Debug, Deserialize)]
pub struct ScriptConfig {
    /// Prism Central connection details; required by every command.
    #[serde(default)]
    pub tdaas_pc: Option<PcSection>,
}

#[derive(Debug, Deserialize)]
pub struct PcSection {
    /// `[[external_ip, internal_ip], ...]`; only the first pair is used.
    #[serde(default)]
    pub ips: Vec<Vec<String>>,
    pub prism_password: SecretString,
    #[serde(default)]
    pub prism_user: Option<String>,
}

/// Resolved connection settings for one Prism Central instance.
#[derive(Debug)]
pub struct PcInfo {
    pub external_ip: String,
    pub internal_ip: Option<String>,
    pub user: String,
    pub password: SecretString,
}

#[derive(Debug)]
pub enum ConfigError {
    Missing,
    InvalidJson(serde_json::Error),
    MissingPc,
    NoAddresses,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing => write!(f, "environment variable {CONFIG_ENV} is not set"),
            ConfigError::InvalidJson(err) => write!(f, "{CONFIG_ENV} is not valid JSON: {err}"),
            ConfigError::MissingPc => write!(f, "{CONFIG_ENV} is missing the `tdaas_pc` section"),
            ConfigError::NoAddresses => {
                write!(f, "`tdaas_pc.ips` must contain at least one [external, internal] pair")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidJson(err) => Some(err),
            _ => None,
        }
    }
}

pub fn load() -> Result<PcInfo, ConfigError> {
    let raw = std::env::var(CONFIG_ENV).map_err(|_| ConfigError::Missing)?;
    load_from(&raw)
}

pub fn load_from(raw: &str) -> Result<PcInfo, ConfigError> {
    let config: ScriptConfig = serde_json::from_str(raw).map_err(ConfigError::InvalidJson)?;
    tracing::info!(config = ?config, "loaded script config");
    config.into_pc_info()
}

impl ScriptConfig {
    pub fn into_pc_info(self) -> Result<PcInfo, ConfigError> {
        let pc = self.tdaas_pc.ok_or(ConfigError::MissingPc)?;
        let mut pairs = pc.ips.into_iter();
        let mut first = pairs.next().ok_or(ConfigError::NoAddresses)?.into_iter();
        let external_ip = first
            .next()
            .filter(|ip| !ip.trim().is_empty())
            .ok_or(ConfigError::NoAddresses)?;
        let internal_ip = first.next().filter(|ip| !ip.trim().is_empty());
        Ok(PcInfo {
            external_ip,
            internal_ip,
            user: pc
                .prism_user
                .unwrap_or_else(|| DEFAULT_PRISM_USER.to_string()),
            password: pc.prism_password,
        })
    }
}

impl PcInfo {
    /// Address to reach Prism Central on, honouring `--use-internal-ip`.
    pub fn address(&self, use_internal: bool) -> Result<&str, ConfigError> {
        if use_internal {
            self.internal_ip.as_deref().ok_or(ConfigError::NoAddresses)
        } else {
            Ok(&self.external_ip)
        }
    }

    pub fn password(&self) -> &str {
        self.password.expose_secret()
    }
}
