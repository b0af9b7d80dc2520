//! Reshapes an exported Calm blueprint into a marketplace item payload.
//!
//! The exported document keeps its `metadata`, loses `status`, and has its
//! `spec.resources` replaced by the marketplace item resources. The original
//! `spec`/`status` pair survives under `resources.app_blueprint_template`.

use anyhow::{Context, Result};
use serde_json::{Map, Value, json};
use uuid::Uuid;

use crate::util::json::entities;

pub const MARKETPLACE_ITEM_KIND: &str = "marketplace_item";
pub const FEATURED_ATTRIBUTE: &str = "FEATURED";

/// Values stamped onto the marketplace item.
#[derive(Debug, Clone)]
pub struct ItemMetadata<'a> {
    pub name: &'a str,
    pub author: &'a str,
    pub version: Value,
    pub icon_uuids: &'a [String],
    pub app_group_uuid: Uuid,
}

/// UUIDs of every icon in an `app_icons/list` response whose display name is
/// exactly `icon_name`.
pub fn matching_icon_uuids(catalog: &Value, icon_name: &str) -> Vec<String> {
    entities(catalog)
        .iter()
        .filter(|icon| icon.pointer("/status/name").and_then(Value::as_str) == Some(icon_name))
        .filter_map(|icon| icon.pointer("/metadata/uuid").and_then(Value::as_str))
        .map(str::to_string)
        .collect()
}

pub fn icon_reference(uuid: &str) -> Value {
    json!({
        "icon_reference": {
            "kind": "file_item",
            "uuid": uuid,
        }
    })
}

pub fn into_marketplace_item(mut document: Value, meta: &ItemMetadata<'_>) -> Result<Value> {
    let root = document
        .as_object_mut()
        .context("exported blueprint is not a JSON object")?;

    let spec = object_mut(root, "spec")?;
    spec.insert("name".into(), Value::from(meta.name));
    let template_spec = Value::Object(spec.clone());
    spec.remove("resources");

    let status = object_mut(root, "status")?;
    status.insert("name".into(), Value::from(meta.name));
    let template_status = root
        .remove("status")
        .context("exported blueprint is missing `status`")?;

    object_mut(root, "metadata")?.insert("kind".into(), Value::from(MARKETPLACE_ITEM_KIND));

    let icon_reference_list = meta
        .icon_uuids
        .iter()
        .map(String::as_str)
        .map(icon_reference)
        .collect::<Vec<_>>();
    let resources = json!({
        "app_attribute_list": [FEATURED_ATTRIBUTE],
        "app_group_uuid": meta.app_group_uuid.to_string(),
        "author": meta.author,
        "icon_reference_list": icon_reference_list,
        "version": meta.version,
        "app_blueprint_template": {
            "spec": template_spec,
            "status": template_status,
        },
    });
    object_mut(root, "spec")?.insert("resources".into(), resources);

    Ok(document)
}

fn object_mut<'a>(root: &'a mut Map<String, Value>, key: &str) -> Result<&'a mut Map<String, Value>> {
    root.get_mut(key)
        .and_then(Value::as_object_mut)
        .with_context(|| format!("exported blueprint is missing the `{key}` object"))
}
