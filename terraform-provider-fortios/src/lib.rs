//! Terraform provider for FortiOS
//!
//! Manages FortiGate configuration objects through the FortiOS CMDB REST
//! API. Object types are described declaratively in [`resources`] and
//! marshalled by one generic engine in [`marshal`].

pub mod client;
pub mod config;
pub mod logging;
pub mod marshal;
pub mod objects;
pub mod provider;
pub mod resources;
pub mod schema;

pub use client::{ClientConfig, ClientError, Endpoint, FortiClient};
pub use config::ProviderConfig;
pub use provider::FortiosProvider;
pub use resources::{DataSource, Resource, ResourceState};
