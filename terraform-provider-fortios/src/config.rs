//! Provider configuration
//!
//! Settings come from the Terraform `provider "fortios"` block. Anything the
//! block leaves unset falls back to the environment:
//! 1. Provider block (highest priority)
//! 2. `FORTIOS_*` environment variables
//! 3. Default values (lowest priority)

use crate::client::ClientConfig;
use crate::schema::{Diagnostic, SchemaAttribute, SchemaBlock};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const ENV_HOSTNAME: &str = "FORTIOS_ACCESS_HOSTNAME";
pub const ENV_TOKEN: &str = "FORTIOS_ACCESS_TOKEN";
pub const ENV_INSECURE: &str = "FORTIOS_INSECURE";
pub const ENV_CA_BUNDLE: &str = "FORTIOS_CA_CABUNDLE";
pub const ENV_VDOM: &str = "FORTIOS_VDOM";
pub const ENV_HTTP_PROXY: &str = "FORTIOS_HTTP_PROXY";

/// Provider block as sent by `ConfigureProvider`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// FortiGate address, with or without scheme
    #[serde(default)]
    pub hostname: Option<String>,
    /// REST API administrator token
    #[serde(default)]
    pub token: Option<String>,
    /// Skip TLS certificate verification
    #[serde(default)]
    pub insecure: Option<bool>,
    /// PEM bundle used to verify the FortiGate certificate
    #[serde(default)]
    pub cabundlefile: Option<String>,
    /// Default vdom for every resource
    #[serde(default)]
    pub vdom: Option<String>,
    #[serde(default)]
    pub http_proxy: Option<String>,
}

fn unset(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, str::is_empty)
}

impl ProviderConfig {
    /// Fill unset settings from the process environment.
    pub fn with_env_defaults(self) -> Self {
        self.with_defaults_from(|key| std::env::var(key).ok())
    }

    /// Fill unset settings from `lookup`.
    pub fn with_defaults_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let fill = |value: &mut Option<String>, key: &str| {
            if unset(value) {
                if let Some(found) = lookup(key).filter(|v| !v.is_empty()) {
                    *value = Some(found);
                }
            }
        };

        fill(&mut self.hostname, ENV_HOSTNAME);
        fill(&mut self.token, ENV_TOKEN);
        fill(&mut self.cabundlefile, ENV_CA_BUNDLE);
        fill(&mut self.vdom, ENV_VDOM);
        fill(&mut self.http_proxy, ENV_HTTP_PROXY);

        if self.insecure.is_none() {
            self.insecure = lookup(ENV_INSECURE).and_then(|v| v.parse().ok());
        }

        self
    }

    /// Check the settings and turn them into client settings.
    pub fn client_config(&self) -> Result<ClientConfig, Vec<Diagnostic>> {
        let mut diagnostics = Vec::new();

        if unset(&self.hostname) {
            diagnostics.push(
                Diagnostic::error("hostname is required")
                    .with_detail(&format!("Set it in the provider block or via {ENV_HOSTNAME}"))
                    .with_attribute_path("hostname"),
            );
        }
        if unset(&self.token) {
            diagnostics.push(
                Diagnostic::error("token is required")
                    .with_detail(&format!("Set it in the provider block or via {ENV_TOKEN}"))
                    .with_attribute_path("token"),
            );
        }
        if !diagnostics.is_empty() {
            return Err(diagnostics);
        }

        let mut config = ClientConfig::new(self.hostname.as_deref().unwrap_or_default());
        config.token = self.token.clone();
        config.insecure = self.insecure.unwrap_or(false);
        config.ca_bundle = self.cabundlefile.clone().filter(|p| !p.is_empty()).map(PathBuf::from);
        config.vdom = self.vdom.clone().filter(|v| !v.is_empty());
        config.http_proxy = self.http_proxy.clone().filter(|p| !p.is_empty());
        Ok(config)
    }

    /// Schema of the provider block
    pub fn schema() -> SchemaBlock {
        SchemaBlock::new()
            .with_attribute(
                "hostname",
                SchemaAttribute::string()
                    .with_description(&format!("FortiGate hostname or IP address. Defaults to ${ENV_HOSTNAME}"))
                    .optional(),
            )
            .with_attribute(
                "token",
                SchemaAttribute::string()
                    .with_description(&format!("REST API token. Defaults to ${ENV_TOKEN}"))
                    .optional()
                    .sensitive(),
            )
            .with_attribute(
                "insecure",
                SchemaAttribute::bool()
                    .with_description("Skip TLS verification")
                    .optional(),
            )
            .with_attribute(
                "cabundlefile",
                SchemaAttribute::string()
                    .with_description("CA bundle used to verify the FortiGate certificate")
                    .optional(),
            )
            .with_attribute(
                "vdom",
                SchemaAttribute::string()
                    .with_description("Default virtual domain for all resources")
                    .optional(),
            )
            .with_attribute(
                "http_proxy",
                SchemaAttribute::string()
                    .with_description("HTTP(S) proxy used to reach the FortiGate")
                    .optional(),
            )
            .with_description("FortiOS provider")
    }
}
