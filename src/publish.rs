use anyhow::{Context, Result, bail};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::cli::{ConnectionArgs, PublishArgs};
use crate::marketplace::{self, ItemMetadata};
use crate::prism::{ListQuery, PrismClient};
use crate::spec_file;
use crate::util::json::{entities, str_at};

pub const MARKETPLACE_ITEMS: &str = "calm_marketplace_items";

/// Contents of `specs/calm_bp_publish.spec`.
#[derive(Debug, Clone, Deserialize)]
pub struct PublishSpec {
    pub entities: Vec<BlueprintEntry>,
    pub mp_name: String,
    pub icon_name: String,
    /// Copied into the marketplace item unchanged; may be a string or a number.
    pub bp_version: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlueprintEntry {
    /// Name of the existing blueprint to publish.
    pub bp_name: String,
    /// Per-entry overrides of the top-level marketplace settings.
    #[serde(default)]
    pub mp_name: Option<String>,
    #[serde(default)]
    pub icon_name: Option<String>,
    #[serde(default)]
    pub bp_version: Option<Value>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PublishOptions {
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedItem {
    pub bp_name: String,
    pub mp_name: String,
    pub app_group_uuid: Uuid,
}

#[derive(Debug, Default)]
pub struct PublishReport {
    pub items: Vec<PublishedItem>,
}

/// Lookups shared by every entry of one run.
struct Catalog {
    author: String,
    icons: Value,
}

pub fn publish(
    client: &PrismClient,
    spec: &PublishSpec,
    options: PublishOptions,
) -> Result<PublishReport> {
    publish_with_group_ids(client, spec, options, Uuid::new_v4)
}

/// Like [`publish`], drawing each entry's `app_group_uuid` from `next_group_uuid`.
pub fn publish_with_group_ids(
    client: &PrismClient,
    spec: &PublishSpec,
    options: PublishOptions,
    mut next_group_uuid: impl FnMut() -> Uuid,
) -> Result<PublishReport> {
    let catalog = load_catalog(client)?;
    let mut report = PublishReport::default();

    for entry in &spec.entities {
        let app_group_uuid = next_group_uuid();
        let item = publish_entry(client, spec, entry, &catalog, app_group_uuid, options)?;
        report.items.push(item);
    }
    Ok(report)
}

fn load_catalog(client: &PrismClient) -> Result<Catalog> {
    let user = client
        .v3_get("users/me", &[])?
        .into_accepted_body("users/me lookup")?;
    let author = str_at(&user, &["status", "name"])
        .context("failed to resolve the current user's name")?
        .to_string();
    tracing::debug!(%author, "resolved marketplace author");

    let icons = client
        .v3_list("app_icons", &ListQuery::default())?
        .into_accepted_body("app_icons lookup")?;
    tracing::debug!(icons = entities(&icons).len(), "loaded icon catalog");
    Ok(Catalog { author, icons })
}

fn publish_entry(
    client: &PrismClient,
    spec: &PublishSpec,
    entry: &BlueprintEntry,
    catalog: &Catalog,
    app_group_uuid: Uuid,
    options: PublishOptions,
) -> Result<PublishedItem> {
    let bp_name = entry.bp_name.as_str();
    let mp_name = entry.mp_name.as_deref().unwrap_or(&spec.mp_name);
    let icon_name = entry.icon_name.as_deref().unwrap_or(&spec.icon_name);
    let version = entry.bp_version.as_ref().unwrap_or(&spec.bp_version);

    let bp_uuid = resolve_blueprint_uuid(client, bp_name)?;
    let exported = client
        .v3_get(
            &format!("blueprints/{bp_uuid}/export_json"),
            &[("keep_secrets", "true")],
        )?
        .into_accepted_body(&format!("{bp_name} blueprint export"))?;

    let icon_uuids = marketplace::matching_icon_uuids(&catalog.icons, icon_name);
    if icon_uuids.is_empty() {
        tracing::warn!(%icon_name, "no icon with this name; publishing without an icon");
    }
    let meta = ItemMetadata {
        name: mp_name,
        author: &catalog.author,
        version: version.clone(),
        icon_uuids: &icon_uuids,
        app_group_uuid,
    };
    let payload = marketplace::into_marketplace_item(exported, &meta)
        .with_context(|| format!("failed to build marketplace item for {bp_name}"))?;

    if options.dry_run {
        println!("{}", serde_json::to_string_pretty(&payload)?);
        tracing::info!(%bp_name, %mp_name, "dry run; marketplace item not created");
    } else {
        let resp = client.v3_create(MARKETPLACE_ITEMS, &payload)?;
        if !resp.is_accepted() {
            bail!(
                "{bp_name} blueprint create failed with:\nError Code: {}\nError Message: {}",
                resp.code,
                resp.message
            );
        }
        tracing::info!(%bp_name, %mp_name, %version, "{mp_name} blueprint created successfully.");
    }

    Ok(PublishedItem {
        bp_name: bp_name.to_string(),
        mp_name: mp_name.to_string(),
        app_group_uuid,
    })
}

fn resolve_blueprint_uuid(client: &PrismClient, bp_name: &str) -> Result<String> {
    let listing = client
        .v3_list("blueprints", &ListQuery::by_name(bp_name))?
        .into_accepted_body(&format!("{bp_name} blueprint lookup"))?;
    let found = entities(&listing);
    let Some(first) = found.first() else {
        bail!("no blueprint named `{bp_name}` was found");
    };
    if found.len() > 1 {
        tracing::warn!(%bp_name, matches = found.len(), "several blueprints match; using the first");
    }
    let uuid = str_at(first, &["metadata", "uuid"])
        .with_context(|| format!("blueprint `{bp_name}` has no uuid"))?;
    tracing::debug!(%bp_name, %uuid, "resolved blueprint");
    Ok(uuid.to_string())
}

pub fn run(connection: &ConnectionArgs, args: &PublishArgs) -> Result<()> {
    let client = connection.connect()?;
    let spec: PublishSpec = spec_file::load(&args.spec)?;
    tracing::info!(spec = ?spec, "loaded blueprint publish spec");
    let report = publish(&client, &spec, PublishOptions { dry_run: args.dry_run })?;
    tracing::info!(published = report.items.len(), "blueprint publishing finished");
    Ok(())
}
