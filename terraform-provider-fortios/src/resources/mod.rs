//! Terraform Resources for FortiOS
//!
//! Defines the resources and data sources that can be managed via Terraform.
//! Each FortiOS object type lives in its own module as an [`ObjectSpec`];
//! the generic implementations in [`object`] turn those into resources.

mod extendercontroller_extender;
mod firewall_policy6;
mod ips_sensor;
mod object;
mod router_rip;
mod system_ha;
mod system_linkmonitor;
mod system_replacemsggroup;

pub use object::{ObjectDataSource, ObjectListDataSource, ObjectResource};

use crate::client::FortiClient;
use crate::marshal::is_set;
use crate::objects::ObjectSpec;
use crate::schema::{Diagnostic, ResourceSchema};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Result type for resource operations
pub type ResourceResult<T> = Result<T, Vec<Diagnostic>>;

/// Resource state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceState {
    pub values: HashMap<String, Value>,
}

impl ResourceState {
    pub fn new() -> Self {
        Self::default()
    }

    /// State from a JSON object; anything else yields `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        value.as_object().map(|obj| Self {
            values: obj.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        })
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.values.get(key).and_then(|v| v.as_str()).map(String::from)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.values.get(key).and_then(|v| v.as_i64())
    }

    /// Present and non-empty.
    pub fn is_set(&self, key: &str) -> bool {
        self.values.get(key).is_some_and(is_set)
    }

    pub fn set(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_string(), value);
    }

    /// Terraform ID; `None` when the object does not exist.
    pub fn id(&self) -> Option<String> {
        self.get_string("id").filter(|id| !id.is_empty())
    }

    pub fn set_id(&mut self, id: &str) {
        self.set("id", Value::String(id.to_string()));
    }
}

/// Resource trait
#[async_trait]
pub trait Resource: Send + Sync {
    /// Resource type name
    fn type_name(&self) -> &str;

    /// Get the schema for this resource
    fn schema(&self) -> ResourceSchema;

    /// Check a configuration before planning
    fn validate(&self, config: &ResourceState) -> Vec<Diagnostic> {
        let _ = config;
        Vec::new()
    }

    /// Create a new resource
    async fn create(
        &self,
        client: &FortiClient,
        planned: &ResourceState,
    ) -> ResourceResult<ResourceState>;

    /// Read an existing resource. An empty state means it no longer exists.
    async fn read(
        &self,
        client: &FortiClient,
        current: &ResourceState,
    ) -> ResourceResult<ResourceState>;

    /// Update an existing resource
    async fn update(
        &self,
        client: &FortiClient,
        current: &ResourceState,
        planned: &ResourceState,
    ) -> ResourceResult<ResourceState>;

    /// Delete a resource
    async fn delete(&self, client: &FortiClient, current: &ResourceState) -> ResourceResult<()>;

    /// Import an existing object by ID
    async fn import(&self, client: &FortiClient, id: &str) -> ResourceResult<ResourceState> {
        let mut state = ResourceState::new();
        state.set_id(id);
        self.read(client, &state).await
    }

    /// Plan changes
    fn plan_change(
        &self,
        current: Option<&ResourceState>,
        proposed: &ResourceState,
    ) -> ResourceResult<ResourceState> {
        // Default implementation: return proposed state
        let _ = current;
        Ok(proposed.clone())
    }

    /// Attributes whose change requires replacing the object
    fn requires_replace(&self, current: &ResourceState, proposed: &ResourceState) -> Vec<String> {
        let _ = (current, proposed);
        Vec::new()
    }
}

/// Data source trait
#[async_trait]
pub trait DataSource: Send + Sync {
    fn type_name(&self) -> &str;

    fn schema(&self) -> ResourceSchema;

    fn validate(&self, config: &ResourceState) -> Vec<Diagnostic> {
        let _ = config;
        Vec::new()
    }

    async fn read(&self, client: &FortiClient, config: &ResourceState)
        -> ResourceResult<ResourceState>;
}

/// Every FortiOS object type exposed by the provider
pub fn all_specs() -> Vec<ObjectSpec> {
    vec![
        firewall_policy6::spec(),
        system_ha::spec(),
        system_replacemsggroup::spec(),
        ips_sensor::spec(),
        router_rip::spec(),
        system_linkmonitor::spec(),
        extendercontroller_extender::spec(),
    ]
}

/// Get all available resources
pub fn get_all_resources() -> Vec<Box<dyn Resource>> {
    all_specs()
        .into_iter()
        .map(|spec| Box::new(ObjectResource::new(spec)) as Box<dyn Resource>)
        .collect()
}

/// Get all available data sources: one per object type, plus a list data
/// source per table object.
pub fn get_all_data_sources() -> Vec<Box<dyn DataSource>> {
    let mut sources: Vec<Box<dyn DataSource>> = Vec::new();
    for spec in all_specs() {
        if !spec.is_singleton() {
            sources.push(Box::new(ObjectListDataSource::new(spec.clone())));
        }
        sources.push(Box::new(ObjectDataSource::new(spec)));
    }
    sources
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashSet;

    #[test]
    fn test_resource_state() {
        let mut state = ResourceState::new();
        state.set("name", json!("sensor1"));
        state.set("default_metric", json!(5));
        state.set("comment", json!(""));

        assert_eq!(state.get_string("name"), Some("sensor1".to_string()));
        assert_eq!(state.get_i64("default_metric"), Some(5));
        assert!(state.is_set("name"));
        assert!(!state.is_set("comment"));
        assert!(!state.is_set("missing"));
    }

    #[test]
    fn test_state_id() {
        let mut state = ResourceState::new();
        assert_eq!(state.id(), None);
        state.set_id("");
        assert_eq!(state.id(), None);
        state.set_id("IpsSensor");
        assert_eq!(state.id(), Some("IpsSensor".to_string()));
    }

    #[test]
    fn test_state_from_value() {
        let state = ResourceState::from_value(&json!({"id": "1", "action": "accept"})).unwrap();
        assert_eq!(state.get_string("action"), Some("accept".to_string()));
        assert!(ResourceState::from_value(&json!(null)).is_none());
    }

    #[test]
    fn test_type_names_unique() {
        let resources = get_all_resources();
        let names: HashSet<&str> = resources.iter().map(|r| r.type_name()).collect();
        assert_eq!(names.len(), resources.len());
        assert!(names.contains("fortios_system_ha"));
        assert!(names.contains("fortios_ips_sensor"));

        let sources = get_all_data_sources();
        let names: HashSet<&str> = sources.iter().map(|d| d.type_name()).collect();
        assert_eq!(names.len(), sources.len());
        assert!(names.contains("fortios_ips_sensorlist"));
        assert!(!names.contains("fortios_system_halist"));
    }

    #[test]
    fn test_every_spec_has_consistent_mkey() {
        for spec in all_specs() {
            if spec.is_singleton() {
                assert!(spec.mkey_field().is_none(), "{}", spec.type_name);
            } else {
                let mkey = spec.mkey_field().unwrap_or_else(|| panic!("{} mkey", spec.type_name));
                assert!(mkey.force_new || mkey.computed, "{}", spec.type_name);
            }
            assert!(spec.type_name.starts_with("fortios_"));
            for field in &spec.fields {
                assert_ne!(field.name, "id", "{} must use fosid", spec.type_name);
            }
        }
    }
}
