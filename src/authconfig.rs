use anyhow::{Result, bail};
use serde_json::Value;

use crate::cli::{AuthconfigArgs, ConnectionArgs};
use crate::prism::PrismClient;
use crate::spec_file;

pub const DIRECTORIES: &str = "authconfig/directories";

/// Registers the directory described by `directory` as-is.
pub fn register(client: &PrismClient, directory: &Value, dry_run: bool) -> Result<()> {
    if dry_run {
        println!("{}", serde_json::to_string_pretty(directory)?);
        tracing::info!("dry run; authconfig not submitted");
        return Ok(());
    }
    let resp = client.v1_create(DIRECTORIES, directory)?;
    if !resp.is_accepted() {
        bail!(
            "Authconfig failed with:\nError Code: {}\nError Message: {}",
            resp.code,
            resp.message
        );
    }
    tracing::info!("Authconfig configured successfully.");
    Ok(())
}

pub fn run(connection: &ConnectionArgs, args: &AuthconfigArgs) -> Result<()> {
    let client = connection.connect()?;
    let directory = spec_file::file_to_dict(&args.spec)?;
    tracing::info!(path = %args.spec.display(), "loaded directory spec");
    // directory specs carry the service account password
    tracing::debug!(spec = %directory, "directory payload");
    register(&client, &directory, args.dry_run)
}
