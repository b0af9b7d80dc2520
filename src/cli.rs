use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use crate::config;
use crate::prism::{PrismClient, PrismEndpoint};

pub const DEFAULT_PUBLISH_SPEC: &str = "specs/calm_bp_publish.spec";
pub const DEFAULT_AUTHCONFIG_SPEC: &str = "specs/pc_autodc.spec";

#[derive(Parser, Debug)]
#[command(name = "prism-setup")]
#[command(version)]
#[command(about = "Prism Central setup automation (Calm marketplace, authconfig)")]
pub struct Cli {
    #[command(flatten)]
    pub connection: ConnectionArgs,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Publish existing blueprints as Calm marketplace items
    PublishBlueprints(PublishArgs),
    /// Register a directory service as an authconfig source
    Authconfig(AuthconfigArgs),
}

/// How to reach Prism Central. Credentials always come from CUSTOM_SCRIPT_CONFIG.
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// Address Prism Central through the internal IP instead of the external one
    #[arg(long = "use-internal-ip", global = true)]
    pub use_internal_ip: bool,
    /// Override the Prism Central origin (e.g. https://pc.example:9440)
    #[arg(long = "endpoint", global = true)]
    pub endpoint: Option<String>,
    /// Verify the Prism Central TLS certificate
    #[arg(long = "verify-tls", global = true)]
    pub verify_tls: bool,
}

#[derive(Args, Debug, Clone)]
pub struct PublishArgs {
    /// Blueprint publish spec (JSON or YAML)
    #[arg(long = "spec", default_value = DEFAULT_PUBLISH_SPEC)]
    pub spec: PathBuf,
    /// Print the marketplace payloads instead of creating them
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Args, Debug, Clone)]
pub struct AuthconfigArgs {
    /// Directory spec (JSON or YAML), submitted unchanged
    #[arg(long = "spec", default_value = DEFAULT_AUTHCONFIG_SPEC)]
    pub spec: PathBuf,
    /// Print the directory payload instead of submitting it
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

impl ConnectionArgs {
    /// Reads CUSTOM_SCRIPT_CONFIG and builds a client for the selected address.
    pub fn connect(&self) -> Result<PrismClient> {
        let pc = config::load()?;
        let endpoint = match &self.endpoint {
            Some(origin) => PrismEndpoint::from_origin(origin.as_str(), self.verify_tls),
            None => {
                let host = pc
                    .address(self.use_internal_ip)
                    .context("no internal IP configured for --use-internal-ip")?;
                PrismEndpoint::for_host(host, self.verify_tls)
            }
        };
        tracing::info!(origin = %endpoint.origin, user = %pc.user, "connecting to Prism Central");
        PrismClient::from_pc_info(endpoint, &pc)
    }
}
