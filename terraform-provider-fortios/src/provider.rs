//! Terraform Provider Implementation
//!
//! Implements the Terraform plugin protocol for FortiOS: one JSON request per
//! line in, one JSON response per line out.

use crate::client::FortiClient;
use crate::config::ProviderConfig;
use crate::resources::{
    get_all_data_sources, get_all_resources, DataSource, Resource, ResourceState,
};
use crate::schema::{Diagnostic, ProviderSchema, RpcRequest, RpcResponse};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::io;
use std::sync::{Arc, RwLock};
use tokio::runtime::Runtime;
use tracing::{debug, info};

fn type_name(params: &Value) -> &str {
    params.get("type_name").and_then(Value::as_str).unwrap_or("")
}

/// State object from the request, `None` when absent or null.
fn state_param(params: &Value, key: &str) -> Option<ResourceState> {
    params.get(key).and_then(ResourceState::from_value)
}

/// FortiOS Terraform Provider
pub struct FortiosProvider {
    client: Arc<RwLock<Option<FortiClient>>>,
    resources: HashMap<String, Box<dyn Resource>>,
    data_sources: HashMap<String, Box<dyn DataSource>>,
    runtime: Runtime,
}

impl FortiosProvider {
    /// Create a new provider
    pub fn new() -> io::Result<Self> {
        let resources = get_all_resources()
            .into_iter()
            .map(|r| (r.type_name().to_string(), r))
            .collect();
        let data_sources = get_all_data_sources()
            .into_iter()
            .map(|d| (d.type_name().to_string(), d))
            .collect();

        Ok(Self {
            client: Arc::new(RwLock::new(None)),
            resources,
            data_sources,
            runtime: Runtime::new()?,
        })
    }

    /// Get provider schema
    fn get_schema(&self) -> ProviderSchema {
        let mut schema = ProviderSchema::new(ProviderConfig::schema());

        for (name, resource) in &self.resources {
            schema = schema.with_resource(name, resource.schema());
        }
        for (name, source) in &self.data_sources {
            schema = schema.with_data_source(name, source.schema());
        }

        schema
    }

    /// Configure the provider
    fn configure(&self, config: ProviderConfig) -> Vec<Diagnostic> {
        let config = config.with_env_defaults();

        let client_config = match config.client_config() {
            Ok(c) => c,
            Err(diagnostics) => return diagnostics,
        };

        let client = match FortiClient::from_config(&client_config) {
            Ok(c) => c,
            Err(e) => {
                return vec![Diagnostic::error("Error creating FortiOS client")
                    .with_detail(&e.to_string())]
            }
        };

        info!(
            "configured FortiOS provider for {} (vdom {:?})",
            client_config.base_url(),
            client_config.vdom
        );

        *self.client.write().expect("client lock poisoned") = Some(client);

        Vec::new()
    }

    /// Get the configured client
    fn get_client(&self) -> Result<FortiClient, Diagnostic> {
        self.client
            .read()
            .expect("client lock poisoned")
            .clone()
            .ok_or_else(|| Diagnostic::error("Provider not configured"))
    }

    fn resource(&self, type_name: &str) -> Result<&dyn Resource, Diagnostic> {
        self.resources
            .get(type_name)
            .map(|r| r.as_ref())
            .ok_or_else(|| Diagnostic::error(&format!("Unknown resource type: {}", type_name)))
    }

    fn data_source(&self, type_name: &str) -> Result<&dyn DataSource, Diagnostic> {
        self.data_sources
            .get(type_name)
            .map(|d| d.as_ref())
            .ok_or_else(|| Diagnostic::error(&format!("Unknown data source type: {}", type_name)))
    }

    /// Handle an RPC request
    pub fn handle_request(&self, input: &str) -> String {
        let request: RpcRequest = match serde_json::from_str(input) {
            Ok(r) => r,
            Err(e) => {
                return serde_json::to_string(&RpcResponse::error(
                    0,
                    -32700,
                    &format!("Parse error: {}", e),
                ))
                .unwrap_or_default();
            }
        };

        debug!("rpc {} (id {})", request.method, request.id);

        let params = &request.params;
        let response = match request.method.as_str() {
            "GetProviderSchema" => self.handle_get_schema(request.id),
            "ConfigureProvider" => self.handle_configure(request.id, params),
            "ValidateResourceConfig" => self.handle_validate_resource(request.id, params),
            "ValidateDataSourceConfig" => self.handle_validate_data_source(request.id, params),
            "PlanResourceChange" => self.handle_plan_resource(request.id, params),
            "ApplyResourceChange" => self.handle_apply_resource(request.id, params),
            "ReadResource" => self.handle_read_resource(request.id, params),
            "ReadDataSource" => self.handle_read_data_source(request.id, params),
            "ImportResourceState" => self.handle_import_resource(request.id, params),
            "StopProvider" => RpcResponse::success(request.id, json!({})),
            _ => RpcResponse::error(
                request.id,
                -32601,
                &format!("Method not found: {}", request.method),
            ),
        };

        serde_json::to_string(&response).unwrap_or_else(|e| {
            serde_json::to_string(&RpcResponse::error(
                request.id,
                -32603,
                &format!("Serialization error: {}", e),
            ))
            .unwrap_or_default()
        })
    }

    /// Handle GetProviderSchema
    fn handle_get_schema(&self, id: i64) -> RpcResponse {
        let schema = self.get_schema();
        RpcResponse::success(id, serde_json::to_value(schema).unwrap_or_default())
    }

    /// Handle ConfigureProvider
    fn handle_configure(&self, id: i64, params: &Value) -> RpcResponse {
        let config: ProviderConfig = match params.get("config").filter(|c| !c.is_null()) {
            Some(c) => match serde_json::from_value(c.clone()) {
                Ok(config) => config,
                Err(e) => {
                    return RpcResponse::diagnostics(
                        id,
                        &[Diagnostic::error("Invalid provider configuration")
                            .with_detail(&e.to_string())],
                    )
                }
            },
            None => ProviderConfig::default(),
        };

        RpcResponse::diagnostics(id, &self.configure(config))
    }

    /// Handle ValidateResourceConfig
    fn handle_validate_resource(&self, id: i64, params: &Value) -> RpcResponse {
        let resource = match self.resource(type_name(params)) {
            Ok(r) => r,
            Err(diag) => return RpcResponse::diagnostics(id, &[diag]),
        };

        let config = state_param(params, "config").unwrap_or_default();
        RpcResponse::diagnostics(id, &resource.validate(&config))
    }

    /// Handle ValidateDataSourceConfig
    fn handle_validate_data_source(&self, id: i64, params: &Value) -> RpcResponse {
        let source = match self.data_source(type_name(params)) {
            Ok(d) => d,
            Err(diag) => return RpcResponse::diagnostics(id, &[diag]),
        };

        let config = state_param(params, "config").unwrap_or_default();
        RpcResponse::diagnostics(id, &source.validate(&config))
    }

    /// Handle PlanResourceChange
    fn handle_plan_resource(&self, id: i64, params: &Value) -> RpcResponse {
        let resource = match self.resource(type_name(params)) {
            Ok(r) => r,
            Err(diag) => return RpcResponse::diagnostics(id, &[diag]),
        };

        // Destroy plans carry no proposed state.
        let Some(proposed) = state_param(params, "proposed_new_state") else {
            return RpcResponse::success(id, json!({ "planned_state": null, "diagnostics": [] }));
        };
        let prior = state_param(params, "prior_state").filter(|s| s.id().is_some());

        match resource.plan_change(prior.as_ref(), &proposed) {
            Ok(planned) => {
                let requires_replace = prior
                    .as_ref()
                    .map(|p| resource.requires_replace(p, &planned))
                    .unwrap_or_default();
                RpcResponse::success(
                    id,
                    json!({
                        "planned_state": planned.values,
                        "requires_replace": requires_replace,
                        "diagnostics": []
                    }),
                )
            }
            Err(diagnostics) => RpcResponse::diagnostics(id, &diagnostics),
        }
    }

    /// Handle ApplyResourceChange
    fn handle_apply_resource(&self, id: i64, params: &Value) -> RpcResponse {
        let resource = match self.resource(type_name(params)) {
            Ok(r) => r,
            Err(diag) => return RpcResponse::diagnostics(id, &[diag]),
        };
        let client = match self.get_client() {
            Ok(c) => c,
            Err(diag) => return RpcResponse::diagnostics(id, &[diag]),
        };

        let planned = state_param(params, "planned_state");
        let prior = state_param(params, "prior_state").filter(|s| s.id().is_some());

        let result = self.runtime.block_on(async {
            match (prior, planned) {
                (Some(prior), None) => resource.delete(&client, &prior).await.map(|_| None),
                (None, None) => Ok(None),
                (None, Some(planned)) => resource.create(&client, &planned).await.map(Some),
                (Some(prior), Some(planned)) => {
                    resource.update(&client, &prior, &planned).await.map(Some)
                }
            }
        });

        match result {
            Ok(new_state) => RpcResponse::success(
                id,
                json!({
                    "new_state": new_state.map(|s| s.values),
                    "diagnostics": []
                }),
            ),
            Err(diagnostics) => RpcResponse::diagnostics(id, &diagnostics),
        }
    }

    /// Handle ReadResource
    fn handle_read_resource(&self, id: i64, params: &Value) -> RpcResponse {
        let resource = match self.resource(type_name(params)) {
            Ok(r) => r,
            Err(diag) => return RpcResponse::diagnostics(id, &[diag]),
        };
        let client = match self.get_client() {
            Ok(c) => c,
            Err(diag) => return RpcResponse::diagnostics(id, &[diag]),
        };

        let current = state_param(params, "current_state").unwrap_or_default();
        let result = self.runtime.block_on(resource.read(&client, &current));

        match result {
            // Gone from the device: Terraform drops it from state.
            Ok(state) if state.id().is_none() => {
                RpcResponse::success(id, json!({ "new_state": null, "diagnostics": [] }))
            }
            Ok(state) => {
                RpcResponse::success(id, json!({ "new_state": state.values, "diagnostics": [] }))
            }
            Err(diagnostics) => RpcResponse::diagnostics(id, &diagnostics),
        }
    }

    /// Handle ReadDataSource
    fn handle_read_data_source(&self, id: i64, params: &Value) -> RpcResponse {
        let source = match self.data_source(type_name(params)) {
            Ok(d) => d,
            Err(diag) => return RpcResponse::diagnostics(id, &[diag]),
        };
        let client = match self.get_client() {
            Ok(c) => c,
            Err(diag) => return RpcResponse::diagnostics(id, &[diag]),
        };

        let config = state_param(params, "config").unwrap_or_default();
        match self.runtime.block_on(source.read(&client, &config)) {
            Ok(state) => {
                RpcResponse::success(id, json!({ "state": state.values, "diagnostics": [] }))
            }
            Err(diagnostics) => RpcResponse::diagnostics(id, &diagnostics),
        }
    }

    /// Handle ImportResourceState
    fn handle_import_resource(&self, id: i64, params: &Value) -> RpcResponse {
        let type_name = type_name(params);
        let resource = match self.resource(type_name) {
            Ok(r) => r,
            Err(diag) => return RpcResponse::diagnostics(id, &[diag]),
        };
        let client = match self.get_client() {
            Ok(c) => c,
            Err(diag) => return RpcResponse::diagnostics(id, &[diag]),
        };

        let resource_id = params.get("id").and_then(Value::as_str).unwrap_or("");
        let result = self.runtime.block_on(resource.import(&client, resource_id));

        match result {
            Ok(state) if state.id().is_none() => RpcResponse::diagnostics(
                id,
                &[Diagnostic::error("Cannot import non-existent remote object")
                    .with_detail(&format!("{} {} not found", type_name, resource_id))],
            ),
            Ok(state) => RpcResponse::success(
                id,
                json!({
                    "imported_resources": [{
                        "type_name": type_name,
                        "state": state.values
                    }],
                    "diagnostics": []
                }),
            ),
            Err(diagnostics) => RpcResponse::diagnostics(id, &diagnostics),
        }
    }
}
