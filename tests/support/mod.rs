#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use httpmock::{Mock, MockServer};
use prism_setup::prism::{PrismClient, PrismEndpoint};
use serde_json::{Value, json};
use tempfile::TempDir;

pub const V3: &str = "/api/nutanix/v3";
pub const V1: &str = "/PrismGateway/services/rest/v1";
pub const AUTHOR: &str = "Lab Admin";

pub fn can_bind_local_port() -> bool {
    if std::net::TcpListener::bind("127.0.0.1:0").is_err() {
        eprintln!("Skipping test; cannot bind local port in this environment");
        return false;
    }
    true
}

pub fn client_for(server: &MockServer) -> PrismClient {
    PrismClient::new(
        PrismEndpoint::from_origin(server.base_url(), false),
        "admin",
        "nx2Tech!",
    )
    .unwrap()
}

pub fn script_config(host: &str) -> String {
    json!({
        "tdaas_pc": {
            "ips": [[host, "10.0.0.2"]],
            "prism_password": "nx2Tech!"
        }
    })
    .to_string()
}

pub struct SpecDir {
    _temp: TempDir,
    pub path: PathBuf,
}

pub fn write_spec(name: &str, contents: &str) -> SpecDir {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join(name);
    fs::write(&path, contents).unwrap();
    SpecDir { _temp: temp, path }
}

pub fn exported_blueprint(name: &str, uuid: &str) -> Value {
    json!({
        "api_version": "3.0",
        "metadata": {"kind": "blueprint", "uuid": uuid, "name": name},
        "spec": {
            "name": name,
            "resources": {"service_definition_list": [{"name": format!("{name}-svc")}]}
        },
        "status": {
            "name": name,
            "state": "ACTIVE",
            "resources": {"app_profile_list": [{"name": "Default"}]}
        }
    })
}

pub fn mock_user_and_icons<'a>(server: &'a MockServer) -> (Mock<'a>, Mock<'a>) {
    let user = server.mock(|when, then| {
        when.method("GET").path(format!("{V3}/users/me"));
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({"status": {"name": AUTHOR}, "metadata": {"kind": "user"}}));
    });
    let icons = server.mock(|when, then| {
        when.method("POST").path(format!("{V3}/app_icons/list"));
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({
                "entities": [
                    {"status": {"name": "fiesta"}, "metadata": {"uuid": "icon-fiesta"}},
                    {"status": {"name": "era"}, "metadata": {"uuid": "icon-era"}}
                ]
            }));
    });
    (user, icons)
}

/// Registers the name lookup and export endpoints for one blueprint.
pub fn mock_blueprint<'a>(server: &'a MockServer, name: &str, uuid: &str) -> (Mock<'a>, Mock<'a>) {
    let lookup = server.mock(|when, then| {
        when.method("POST")
            .path(format!("{V3}/blueprints/list"))
            .json_body(json!({"filter": format!("name=={name}")}));
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({"entities": [{"metadata": {"uuid": uuid, "kind": "blueprint"}}]}));
    });
    let export = server.mock(|when, then| {
        when.method("GET")
            .path(format!("{V3}/blueprints/{uuid}/export_json"))
            .query_param("keep_secrets", "true");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(exported_blueprint(name, uuid));
    });
    (lookup, export)
}

/// The marketplace item expected on the wire for `exported_blueprint(bp_name, bp_uuid)`.
pub fn expected_item(
    bp_name: &str,
    bp_uuid: &str,
    mp_name: &str,
    group_uuid: &str,
    icon_uuids: &[&str],
    version: Value,
) -> Value {
    let exported = exported_blueprint(bp_name, bp_uuid);
    let mut template_spec = exported["spec"].clone();
    template_spec["name"] = json!(mp_name);
    let mut template_status = exported["status"].clone();
    template_status["name"] = json!(mp_name);
    let icons: Vec<Value> = icon_uuids
        .iter()
        .map(|uuid| json!({"icon_reference": {"kind": "file_item", "uuid": uuid}}))
        .collect();
    json!({
        "api_version": "3.0",
        "metadata": {"kind": "marketplace_item", "uuid": bp_uuid, "name": bp_name},
        "spec": {
            "name": mp_name,
            "resources": {
                "app_attribute_list": ["FEATURED"],
                "app_group_uuid": group_uuid,
                "author": AUTHOR,
                "icon_reference_list": icons,
                "version": version,
                "app_blueprint_template": {
                    "spec": template_spec,
                    "status": template_status
                }
            }
        }
    })
}
