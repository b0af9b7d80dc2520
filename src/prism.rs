use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::ACCEPT;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;

use crate::config::PcInfo;

const PRISM_PORT: u16 = 9440;
const V3_PREFIX: &str = "/api/nutanix/v3";
const V1_PREFIX: &str = "/PrismGateway/services/rest/v1";

#[derive(Debug)]
pub enum PrismError {
    Http(reqwest::Error),
    Status {
        what: String,
        code: u16,
        message: String,
    },
}

impl std::fmt::Display for PrismError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrismError::Http(_) => write!(f, "http request failed"),
            PrismError::Status {
                what,
                code,
                message,
            } => write!(
                f,
                "{what} failed with:\nError Code: {code}\nError Message: {message}"
            ),
        }
    }
}

impl std::error::Error for PrismError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PrismError::Http(err) => Some(err),
            PrismError::Status { .. } => None,
        }
    }
}

impl From<reqwest::Error> for PrismError {
    fn from(value: reqwest::Error) -> Self {
        PrismError::Http(value)
    }
}

/// Status, server message and parsed body of one Prism call.
#[derive(Debug, Clone)]
pub struct RestResponse {
    pub code: u16,
    pub message: String,
    pub body: Value,
}

impl RestResponse {
    /// Prism answers 200 for synchronous and 202 for task-backed requests.
    pub fn is_accepted(&self) -> bool {
        matches!(self.code, 200 | 202)
    }

    pub fn into_accepted_body(self, what: &str) -> Result<Value, PrismError> {
        if self.is_accepted() {
            Ok(self.body)
        } else {
            Err(PrismError::Status {
                what: what.to_string(),
                code: self.code,
                message: self.message,
            })
        }
    }

    fn from_parts(status: StatusCode, text: String) -> Self {
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        let message = server_message(&body)
            .map(str::to_string)
            .or_else(|| (!text.trim().is_empty()).then(|| text.trim().to_string()))
            .unwrap_or_else(|| status.canonical_reason().unwrap_or_default().to_string());
        Self {
            code: status.as_u16(),
            message,
            body,
        }
    }
}

fn server_message(body: &Value) -> Option<&str> {
    body.pointer("/message_list/0/message")
        .or_else(|| body.get("message"))
        .and_then(Value::as_str)
}

/// Body of a v3 `<kind>/list` request; empty fields are omitted.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

impl ListQuery {
    pub fn by_name(name: &str) -> Self {
        Self {
            filter: Some(format!("name=={name}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PrismEndpoint {
    pub origin: String,
    pub verify_tls: bool,
}

impl PrismEndpoint {
    pub fn for_host(host: &str, verify_tls: bool) -> Self {
        Self {
            origin: format!("https://{host}:{PRISM_PORT}"),
            verify_tls,
        }
    }

    pub fn from_origin(origin: impl Into<String>, verify_tls: bool) -> Self {
        Self {
            origin: origin.into().trim_end_matches('/').to_string(),
            verify_tls,
        }
    }
}

#[derive(Debug)]
pub struct PrismClient {
    origin: String,
    user: String,
    password: SecretString,
    http: Client,
}

impl PrismClient {
    pub fn new(endpoint: PrismEndpoint, user: &str, password: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .danger_accept_invalid_certs(!endpoint.verify_tls)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            origin: endpoint.origin,
            user: user.to_string(),
            password: SecretString::from(password.to_string()),
            http: client,
        })
    }

    pub fn from_pc_info(endpoint: PrismEndpoint, pc: &PcInfo) -> Result<Self> {
        Self::new(endpoint, &pc.user, pc.password())
    }

    /// `GET {v3}/{path}` with optional query parameters.
    pub fn v3_get(&self, path: &str, query: &[(&str, &str)]) -> Result<RestResponse, PrismError> {
        let url = self.url(V3_PREFIX, path);
        tracing::debug!(%url, "GET");
        self.send(self.http.get(url).query(query))
    }

    /// `POST {v3}/{kind}/list`.
    pub fn v3_list(&self, kind: &str, query: &ListQuery) -> Result<RestResponse, PrismError> {
        let url = self.url(V3_PREFIX, &format!("{kind}/list"));
        tracing::debug!(%url, ?query, "POST list");
        self.send(self.http.post(url).json(query))
    }

    /// `POST {v3}/{path}` creating an entity.
    pub fn v3_create(&self, path: &str, body: &Value) -> Result<RestResponse, PrismError> {
        let url = self.url(V3_PREFIX, path);
        tracing::debug!(%url, "POST create");
        self.send(self.http.post(url).json(body))
    }

    /// `POST {v1}/{path}` creating an entity through the PrismGateway API.
    pub fn v1_create(&self, path: &str, body: &Value) -> Result<RestResponse, PrismError> {
        let url = self.url(V1_PREFIX, path);
        tracing::debug!(%url, "POST create (v1)");
        self.send(self.http.post(url).json(body))
    }

    fn url(&self, prefix: &str, path: &str) -> String {
        format!("{}{prefix}/{}", self.origin, path.trim_start_matches('/'))
    }

    fn send(&self, builder: RequestBuilder) -> Result<RestResponse, PrismError> {
        let response = builder
            .header(ACCEPT, "application/json")
            .basic_auth(&self.user, Some(self.password.expose_secret()))
            .send()?;
        let status = response.status();
        let text = response.text()?;
        let response = RestResponse::from_parts(status, text);
        tracing::debug!(code = response.code, "response");
        Ok(response)
    }
}
