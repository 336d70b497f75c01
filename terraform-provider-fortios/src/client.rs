//! FortiOS REST API Client for Terraform Provider
//!
//! Thin wrapper over the CMDB API (`/api/v2/cmdb/<path>/<name>[/<mkey>]`).
//! Every call answers with the same envelope; this module unwraps it so
//! callers only deal with wire objects.

use fortios_common::FirmwareVersion;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

/// Number of times a request is re-sent after a transport failure.
pub const RETRIES: u32 = 1;

const RETRY_DELAY: Duration = Duration::from_millis(500);

/// Client errors
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error: HTTP {status}, {message}")]
    Api {
        status: u16,
        code: Option<i64>,
        message: String,
    },
    #[error("Authentication failed")]
    AuthFailed,
    #[error("Object not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Invalid client configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;

/// Description of a FortiOS CLI error code, where one is known.
pub fn error_description(code: i64) -> Option<&'static str> {
    match code {
        -1 => Some("Invalid length of value"),
        -2 => Some("Index out of range"),
        -3 => Some("Entry not found"),
        -4 => Some("Maximum number of entries has been reached"),
        -5 => Some("A duplicate entry already exists"),
        -7 => Some("Invalid value"),
        -8 => Some("Invalid IP address"),
        -9 => Some("Invalid IP netmask"),
        -15 => Some("Invalid value"),
        -23 => Some("Entry is used by other object"),
        -37 => Some("Permission denied"),
        -651 => Some("Input value is invalid"),
        _ => None,
    }
}

/// A CMDB table or global object, e.g. `ips/sensor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub path: &'static str,
    pub name: &'static str,
}

impl Endpoint {
    pub const fn new(path: &'static str, name: &'static str) -> Self {
        Self { path, name }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.path, self.name)
    }
}

/// Response envelope shared by every CMDB call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiResponse {
    #[serde(default)]
    pub http_method: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub http_status: Option<u16>,
    #[serde(default)]
    pub mkey: Option<Value>,
    #[serde(default)]
    pub results: Option<Value>,
    #[serde(default)]
    pub vdom: Option<String>,
    #[serde(default)]
    pub revision: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub error: Option<i64>,
    #[serde(default)]
    pub cli_error: Option<String>,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }

    fn error_message(&self) -> String {
        let mut message = match self.error {
            Some(code) => match error_description(code) {
                Some(desc) => format!("error {code}: {desc}"),
                None => format!("error {code}"),
            },
            None => format!("status {}", self.status),
        };
        if let Some(cli) = self.cli_error.as_deref().filter(|s| !s.is_empty()) {
            message.push_str(&format!(" ({})", cli.trim()));
        }
        message
    }

    /// Result rows. Tables answer with an array, global objects with a
    /// bare object.
    pub fn into_rows(self) -> Vec<Map<String, Value>> {
        match self.results {
            Some(Value::Array(rows)) => rows
                .into_iter()
                .filter_map(|row| match row {
                    Value::Object(obj) => Some(obj),
                    _ => None,
                })
                .collect(),
            Some(Value::Object(obj)) => vec![obj],
            _ => Vec::new(),
        }
    }
}

/// Connection settings for [`FortiClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub hostname: String,
    pub token: Option<String>,
    pub insecure: bool,
    pub ca_bundle: Option<PathBuf>,
    pub http_proxy: Option<String>,
    pub vdom: Option<String>,
    pub retries: u32,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(hostname: &str) -> Self {
        Self {
            hostname: hostname.to_string(),
            token: None,
            insecure: false,
            ca_bundle: None,
            http_proxy: None,
            vdom: None,
            retries: RETRIES,
            timeout: Duration::from_secs(250),
        }
    }

    /// Base URL; `https://` is assumed when the hostname carries no scheme.
    pub fn base_url(&self) -> String {
        let host = self.hostname.trim().trim_end_matches('/');
        if host.starts_with("http://") || host.starts_with("https://") {
            host.to_string()
        } else {
            format!("https://{host}")
        }
    }
}

/// FortiOS API Client
#[derive(Clone)]
pub struct FortiClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
    vdom: Option<String>,
    retries: u32,
    version: Arc<RwLock<Option<FirmwareVersion>>>,
    version_lookup: Arc<OnceCell<()>>,
}

impl FortiClient {
    /// Create a client with default transport settings.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::from_config(&ClientConfig::new(base_url))
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.insecure);

        if let Some(path) = &config.ca_bundle {
            let pem = std::fs::read(path).map_err(|e| {
                ClientError::InvalidConfig(format!("reading CA bundle {}: {e}", path.display()))
            })?;
            for cert in reqwest::Certificate::from_pem_bundle(&pem)? {
                builder = builder.add_root_certificate(cert);
            }
        }

        if let Some(proxy) = config.http_proxy.as_deref().filter(|p| !p.is_empty()) {
            builder = builder.proxy(reqwest::Proxy::all(proxy)?);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url(),
            token: config.token.clone(),
            vdom: config.vdom.clone().filter(|v| !v.is_empty()),
            retries: config.retries,
            version: Arc::new(RwLock::new(None)),
            version_lookup: Arc::new(OnceCell::new()),
        })
    }

    /// Set API token
    pub fn with_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    /// Set the default vdom
    pub fn with_vdom(mut self, vdom: &str) -> Self {
        self.vdom = Some(vdom.to_string());
        self
    }

    /// Provider-level vdom, used when a resource sets none.
    pub fn default_vdom(&self) -> Option<&str> {
        self.vdom.as_deref()
    }

    /// Firmware version reported by the device in its last response.
    pub fn firmware_version(&self) -> Option<FirmwareVersion> {
        *self.version.read().expect("version lock poisoned")
    }

    /// Firmware version of the device, asked for once per client when no
    /// response has reported it yet. `None` when the device will not say.
    pub async fn detect_firmware_version(&self) -> Option<FirmwareVersion> {
        if let Some(version) = self.firmware_version() {
            return Some(version);
        }
        self.version_lookup
            .get_or_init(|| async {
                let url = format!("{}/api/v2/monitor/system/status", self.base_url);
                let result = match self.send(Method::GET, &url, &self.query(None, &[]), None).await {
                    Ok(response) => self.handle_response(response).await.map(|_| ()),
                    Err(e) => Err(e),
                };
                if let Err(e) = result {
                    debug!("firmware version unavailable: {e}");
                }
            })
            .await;
        self.firmware_version()
    }

    fn record_version(&self, response: &ApiResponse) {
        let Some(raw) = response.version.as_deref() else {
            return;
        };
        match raw.parse::<FirmwareVersion>() {
            Ok(version) => *self.version.write().expect("version lock poisoned") = Some(version),
            Err(e) => debug!("ignoring firmware version {raw:?}: {e}"),
        }
    }

    /// Build headers for requests
    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(token) = &self.token {
            if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", token)) {
                headers.insert(AUTHORIZATION, value);
            }
        }

        headers
    }

    fn url(&self, endpoint: &Endpoint, mkey: Option<&str>) -> String {
        let mut url = format!("{}/api/v2/cmdb/{}/{}", self.base_url, endpoint.path, endpoint.name);
        if let Some(mkey) = mkey {
            url.push('/');
            url.push_str(&urlencoding::encode(mkey));
        }
        url
    }

    fn query<'a>(&'a self, vdom: Option<&'a str>, extra: &[(&'a str, &'a str)]) -> Vec<(&'a str, &'a str)> {
        let mut query = Vec::with_capacity(extra.len() + 1);
        if let Some(vdom) = vdom.or(self.vdom.as_deref()).filter(|v| !v.is_empty()) {
            query.push(("vdom", vdom));
        }
        query.extend_from_slice(extra);
        query
    }

    /// Send a request, re-sending on transport failure.
    async fn send(
        &self,
        method: Method,
        url: &str,
        query: &[(&str, &str)],
        body: Option<&Map<String, Value>>,
    ) -> Result<reqwest::Response> {
        let mut attempt = 0;
        loop {
            debug!("{} {}", method, url);
            let mut request = self
                .client
                .request(method.clone(), url)
                .headers(self.headers())
                .query(query);
            if let Some(body) = body {
                request = request.json(body);
            }

            match request.send().await {
                Ok(response) => return Ok(response),
                Err(e) if attempt < self.retries && (e.is_connect() || e.is_timeout()) => {
                    attempt += 1;
                    warn!("{} {} failed ({}), retrying", method, url, e);
                    tokio::time::sleep(RETRY_DELAY).await;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Handle API response
    async fn handle_response(&self, response: reqwest::Response) -> Result<ApiResponse> {
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ClientError::AuthFailed);
        }

        let body = response.text().await?;
        let envelope: ApiResponse = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(_) if body.trim().is_empty() && status.is_success() => ApiResponse {
                status: "success".to_string(),
                ..Default::default()
            },
            // Proxies and some firmware answer errors with plain text or HTML.
            Err(_) if !status.is_success() => ApiResponse {
                status: "error".to_string(),
                http_status: Some(status.as_u16()),
                cli_error: Some(body.chars().take(200).collect()),
                ..Default::default()
            },
            Err(e) => return Err(e.into()),
        };
        self.record_version(&envelope);

        if status == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(envelope.error_message()));
        }

        if !status.is_success() || !envelope.is_success() {
            return Err(ClientError::Api {
                status: envelope.http_status.unwrap_or(status.as_u16()),
                code: envelope.error,
                message: envelope.error_message(),
            });
        }

        Ok(envelope)
    }

    /// Create an object in a table (or set a global object).
    pub async fn create(
        &self,
        endpoint: &Endpoint,
        object: &Map<String, Value>,
        vdom: Option<&str>,
    ) -> Result<ApiResponse> {
        let url = self.url(endpoint, None);
        let response = self
            .send(Method::POST, &url, &self.query(vdom, &[]), Some(object))
            .await?;
        self.handle_response(response).await
    }

    /// Read one object. `Ok(None)` means it does not exist.
    pub async fn read(
        &self,
        endpoint: &Endpoint,
        mkey: Option<&str>,
        vdom: Option<&str>,
    ) -> Result<Option<Map<String, Value>>> {
        let url = self.url(endpoint, mkey);
        let response = self
            .send(Method::GET, &url, &self.query(vdom, &[]), None)
            .await?;

        match self.handle_response(response).await {
            Ok(envelope) => Ok(envelope.into_rows().into_iter().next()),
            Err(ClientError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Update an object; `mkey` is `None` for global objects.
    pub async fn update(
        &self,
        endpoint: &Endpoint,
        mkey: Option<&str>,
        object: &Map<String, Value>,
        vdom: Option<&str>,
    ) -> Result<ApiResponse> {
        let url = self.url(endpoint, mkey);
        let response = self
            .send(Method::PUT, &url, &self.query(vdom, &[]), Some(object))
            .await?;
        self.handle_response(response).await
    }

    /// Delete an object from a table.
    pub async fn delete(&self, endpoint: &Endpoint, mkey: &str, vdom: Option<&str>) -> Result<()> {
        let url = self.url(endpoint, Some(mkey));
        let response = self
            .send(Method::DELETE, &url, &self.query(vdom, &[]), None)
            .await?;
        self.handle_response(response).await.map(|_| ())
    }

    /// List the mkeys of a table, optionally filtered.
    pub async fn list(
        &self,
        endpoint: &Endpoint,
        key: &str,
        filter: Option<&str>,
        vdom: Option<&str>,
    ) -> Result<Vec<Value>> {
        let url = self.url(endpoint, None);
        let mut extra = vec![("format", key)];
        if let Some(filter) = filter.filter(|f| !f.is_empty()) {
            extra.push(("filter", filter));
        }
        let response = self
            .send(Method::GET, &url, &self.query(vdom, &extra), None)
            .await?;

        let rows = self.handle_response(response).await?.into_rows();
        Ok(rows
            .into_iter()
            .filter_map(|mut row| row.remove(key))
            .collect())
    }
}
