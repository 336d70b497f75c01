//! Generic resource and data source implementations
//!
//! One implementation serves every FortiOS object type; the per-type modules
//! only supply an [`ObjectSpec`].

use super::{DataSource, Resource, ResourceResult, ResourceState};
use crate::client::{ApiResponse, ClientError, FortiClient};
use crate::marshal::{expand_object, flatten_object, ExpandMode, Expanded, FlattenOptions};
use crate::objects::{ObjectSpec, DYNAMIC_SORT_SUBTABLE, FILTER, GET_ALL_TABLES, VDOMPARAM};
use crate::schema::{Diagnostic, ResourceSchema};
use async_trait::async_trait;
use fortios_common::{is_import_table, mkey_to_string, object_wire_name};
use serde_json::Value;
use std::fmt::Display;
use tracing::{info, warn};

fn failure(verb: &str, label: &str, err: impl Display) -> Vec<Diagnostic> {
    let cause = err.to_string();
    vec![Diagnostic::error(&format!("Error {verb} {label} resource: {cause}")).with_detail(&cause)]
}

fn log_warnings(label: &str, expanded: &Expanded) {
    for w in &expanded.warnings {
        warn!("{}: {} {}", label, w.summary, w.detail.as_deref().unwrap_or_default());
    }
}

/// vdom of a call: the resource's `vdomparam`, else the provider default.
fn resolve_vdom(client: &FortiClient, state: &ResourceState) -> Option<String> {
    state
        .get_string(VDOMPARAM)
        .filter(|v| !v.is_empty())
        .or_else(|| client.default_vdom().map(String::from))
}

/// A FortiOS object managed as a Terraform resource.
pub struct ObjectResource {
    spec: ObjectSpec,
}

impl ObjectResource {
    pub fn new(spec: ObjectSpec) -> Self {
        Self { spec }
    }

    pub fn spec(&self) -> &ObjectSpec {
        &self.spec
    }

    /// Resolve the vdom and record it in state, as Terraform expects the
    /// computed `vdomparam` to be known after apply.
    fn vdom(&self, client: &FortiClient, state: &mut ResourceState) -> Option<String> {
        let vdom = resolve_vdom(client, state);
        if let Some(v) = &vdom {
            state.set(VDOMPARAM, Value::String(v.clone()));
        }
        vdom
    }

    fn mkey(&self, state: &ResourceState) -> ResourceResult<Option<String>> {
        if self.spec.is_singleton() {
            return Ok(None);
        }
        state
            .id()
            .map(Some)
            .ok_or_else(|| vec![Diagnostic::error(&format!("{} ID is required", self.spec.label))])
    }

    /// ID after a write: the mkey the device returned, else `fallback`.
    fn id_from(&self, response: &ApiResponse, fallback: Option<String>) -> String {
        if self.spec.is_singleton() {
            return fallback.unwrap_or_else(|| self.spec.label.to_string());
        }
        response
            .mkey
            .as_ref()
            .and_then(mkey_to_string)
            .or(fallback)
            .unwrap_or_else(|| self.spec.label.to_string())
    }

    fn flatten_options(
        &self,
        client: &FortiClient,
        state: &ResourceState,
        all_tables: bool,
    ) -> FlattenOptions {
        FlattenOptions {
            sort: state
                .get_string(DYNAMIC_SORT_SUBTABLE)
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
            all_tables: all_tables
                || state.get_string(GET_ALL_TABLES).as_deref() == Some("true")
                || is_import_table(),
            version: client.firmware_version(),
        }
    }

    async fn refresh(
        &self,
        client: &FortiClient,
        current: &ResourceState,
        all_tables: bool,
    ) -> ResourceResult<ResourceState> {
        let mut state = current.clone();
        let vdom = self.vdom(client, &mut state);
        let mkey = self.mkey(&state)?;

        let wire = client
            .read(&self.spec.endpoint, mkey.as_deref(), vdom.as_deref())
            .await
            .map_err(|e| failure("reading", self.spec.label, e))?;

        let Some(wire) = wire else {
            info!(
                "{} {} not found, removing from state",
                self.spec.label,
                mkey.as_deref().unwrap_or_default()
            );
            return Ok(ResourceState::new());
        };

        let options = self.flatten_options(client, &state, all_tables);
        let mut state = flatten_object(&self.spec, &wire, &state, &options);
        if state.id().is_none() {
            state.set_id(self.spec.label);
        }
        Ok(state)
    }

    async fn read_back(
        &self,
        client: &FortiClient,
        state: &ResourceState,
        verb: &str,
    ) -> ResourceResult<ResourceState> {
        let refreshed = self.refresh(client, state, false).await?;
        if refreshed.id().is_none() {
            return Err(failure(verb, self.spec.label, "object not found after write"));
        }
        Ok(refreshed)
    }
}

#[async_trait]
impl Resource for ObjectResource {
    fn type_name(&self) -> &str {
        self.spec.type_name
    }

    fn schema(&self) -> ResourceSchema {
        self.spec.resource_schema()
    }

    fn validate(&self, config: &ResourceState) -> Vec<Diagnostic> {
        self.spec.validate(config)
    }

    async fn create(
        &self,
        client: &FortiClient,
        planned: &ResourceState,
    ) -> ResourceResult<ResourceState> {
        let mut state = planned.clone();
        let vdom = self.vdom(client, &mut state);
        let version = client.detect_firmware_version().await;
        let expanded = expand_object(&self.spec, &state, ExpandMode::Values, version)?;
        log_warnings(self.spec.label, &expanded);

        info!("creating {} in vdom {:?}", self.spec.label, vdom);
        // Global objects always exist; creating one means setting it.
        let response = if self.spec.is_singleton() {
            client
                .update(&self.spec.endpoint, None, &expanded.object, vdom.as_deref())
                .await
        } else {
            client
                .create(&self.spec.endpoint, &expanded.object, vdom.as_deref())
                .await
        }
        .map_err(|e| failure("creating", self.spec.label, e))?;

        state.set_id(&self.id_from(&response, None));
        self.read_back(client, &state, "creating").await
    }

    async fn read(
        &self,
        client: &FortiClient,
        current: &ResourceState,
    ) -> ResourceResult<ResourceState> {
        self.refresh(client, current, false).await
    }

    async fn update(
        &self,
        client: &FortiClient,
        current: &ResourceState,
        planned: &ResourceState,
    ) -> ResourceResult<ResourceState> {
        let mut state = planned.clone();
        let vdom = self.vdom(client, &mut state);
        let mkey = self.mkey(current)?;
        let version = client.detect_firmware_version().await;
        let expanded = expand_object(&self.spec, &state, ExpandMode::Values, version)?;
        log_warnings(self.spec.label, &expanded);

        info!("updating {} {:?}", self.spec.label, mkey);
        let response = client
            .update(&self.spec.endpoint, mkey.as_deref(), &expanded.object, vdom.as_deref())
            .await
            .map_err(|e| failure("updating", self.spec.label, e))?;

        state.set_id(&self.id_from(&response, current.id()));
        self.read_back(client, &state, "updating").await
    }

    async fn delete(&self, client: &FortiClient, current: &ResourceState) -> ResourceResult<()> {
        let mut state = current.clone();
        let vdom = self.vdom(client, &mut state);

        if self.spec.is_singleton() {
            // Global objects cannot be removed, only reset field by field.
            let version = client.detect_firmware_version().await;
            let expanded = expand_object(&self.spec, &state, ExpandMode::Nil, version)?;
            log_warnings(self.spec.label, &expanded);
            info!("resetting {}", self.spec.label);
            return client
                .update(&self.spec.endpoint, None, &expanded.object, vdom.as_deref())
                .await
                .map(|_| ())
                .map_err(|e| failure("deleting", self.spec.label, e));
        }

        let Some(mkey) = self.mkey(current)? else {
            return Ok(());
        };
        info!("deleting {} {}", self.spec.label, mkey);
        match client.delete(&self.spec.endpoint, &mkey, vdom.as_deref()).await {
            Ok(()) => Ok(()),
            Err(ClientError::NotFound(_)) => Ok(()), // Already deleted
            Err(e) => Err(failure("deleting", self.spec.label, e)),
        }
    }

    async fn import(&self, client: &FortiClient, id: &str) -> ResourceResult<ResourceState> {
        let mut state = ResourceState::new();
        state.set_id(id);
        self.refresh(client, &state, true).await
    }

    fn requires_replace(&self, current: &ResourceState, proposed: &ResourceState) -> Vec<String> {
        self.spec
            .force_new_fields()
            .filter(|f| current.is_set(f.name) && current.get(f.name) != proposed.get(f.name))
            .map(|f| f.name.to_string())
            .collect()
    }
}

/// A FortiOS object read as a data source.
pub struct ObjectDataSource {
    spec: ObjectSpec,
}

impl ObjectDataSource {
    pub fn new(spec: ObjectSpec) -> Self {
        Self { spec }
    }
}

#[async_trait]
impl DataSource for ObjectDataSource {
    fn type_name(&self) -> &str {
        self.spec.type_name
    }

    fn schema(&self) -> ResourceSchema {
        self.spec.data_source_schema()
    }

    fn validate(&self, config: &ResourceState) -> Vec<Diagnostic> {
        match self.spec.mkey_field() {
            Some(field) if !config.is_set(field.name) => vec![Diagnostic::error(
                "Missing required argument",
            )
            .with_detail(&format!("The argument \"{}\" is required", field.name))
            .with_attribute_path(field.name)],
            _ => Vec::new(),
        }
    }

    async fn read(
        &self,
        client: &FortiClient,
        config: &ResourceState,
    ) -> ResourceResult<ResourceState> {
        let vdom = resolve_vdom(client, config);
        let mkey = match self.spec.mkey_field() {
            Some(field) => {
                let mkey = config.get(field.name).and_then(mkey_to_string).ok_or_else(|| {
                    vec![Diagnostic::error(&format!(
                        "Error describing {}: {} is required",
                        self.spec.label, field.name
                    ))]
                })?;
                Some(mkey)
            }
            None => None,
        };

        let wire = client
            .read(&self.spec.endpoint, mkey.as_deref(), vdom.as_deref())
            .await
            .map_err(|e| {
                vec![Diagnostic::error(&format!("Error describing {}: {e}", self.spec.label))]
            })?;

        let Some(wire) = wire else {
            let mut state = config.clone();
            state.set("id", Value::Null);
            return Ok(state);
        };

        let options = FlattenOptions {
            all_tables: true,
            version: client.firmware_version(),
            ..Default::default()
        };
        let mut state = flatten_object(&self.spec, &wire, config, &options);
        state.set_id(&mkey.unwrap_or_else(|| self.spec.label.to_string()));
        Ok(state)
    }
}

/// The mkeys of a FortiOS table, optionally filtered.
pub struct ObjectListDataSource {
    spec: ObjectSpec,
    type_name: String,
}

impl ObjectListDataSource {
    pub fn new(spec: ObjectSpec) -> Self {
        let type_name = spec.list_type_name();
        Self { spec, type_name }
    }
}

#[async_trait]
impl DataSource for ObjectListDataSource {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn schema(&self) -> ResourceSchema {
        self.spec.list_data_source_schema()
    }

    async fn read(
        &self,
        client: &FortiClient,
        config: &ResourceState,
    ) -> ResourceResult<ResourceState> {
        let (Some(field), Some(attribute)) = (self.spec.mkey_field(), self.spec.list_attribute())
        else {
            return Err(vec![Diagnostic::error(&format!(
                "{} is not a table",
                self.spec.label
            ))]);
        };

        let vdom = resolve_vdom(client, config);
        let filter = config.get_string(FILTER).unwrap_or_default();
        let key = object_wire_name(field.name);

        let keys = client
            .list(&self.spec.endpoint, &key, Some(filter.as_str()), vdom.as_deref())
            .await
            .map_err(|e| {
                vec![Diagnostic::error(&format!("Error describing {} List: {e}", self.spec.label))]
            })?;

        let mut state = config.clone();
        state.set(&attribute, Value::Array(keys));
        state.set_id(&format!("{}List{}", self.spec.label, filter));
        Ok(state)
    }
}
