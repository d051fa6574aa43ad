//! Azure Resource Manager provider
//!
//! This crate manages Azure resources declaratively. Each resource type is a
//! schema plus four operations (create, read, update, delete) that translate
//! between a flat JSON state document and the Resource Manager REST API.
//!
//! # Overview
//!
//! - **API client** ([`api`]): a typed client per service, resource ID
//!   parsing, open enums, pagination and polling of long-running operations
//! - **Resources** ([`services`]): one adapter per resource or data source type
//! - **Registry** ([`registry`]): resources grouped by service, looked up by type name
//! - **Provider** ([`provider`]): the [`ProviderService`] operations a host calls,
//!   with schema validation, planning and per-operation timeouts
//! - **Configuration** ([`config`]): provider block with `ARM_*` environment fallback
//! - **Logging** ([`logging`]): `tracing` to stderr, filtered by `RUST_LOG`
//!
//! # Quick Start
//!
//! ```no_run
//! use azurerm_provider::{AzureProvider, ProviderService};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     azurerm_provider::init_logging();
//!
//!     let provider = AzureProvider::new()?;
//!     // subscription_id and access_token fall back to ARM_SUBSCRIPTION_ID
//!     // and ARM_ACCESS_TOKEN.
//!     provider.configure(json!({})).await?;
//!
//!     let plan = provider
//!         .plan(
//!             "azurerm_kusto_cluster",
//!             None,
//!             json!({
//!                 "name": "kustoprod01",
//!                 "resource_group_name": "rg-data",
//!                 "location": "westeurope",
//!                 "sku": [{"name": "Standard_D13_v2", "capacity": 2}]
//!             }),
//!         )
//!         .await?;
//!     let state = provider.create("azurerm_kusto_cluster", plan.planned_state).await?;
//!     println!("{}", state["uri"]);
//!     Ok(())
//! }
//! ```
//!
//! # Resource types
//!
//! | Type | Resource | Data source |
//! |---|---|---|
//! | `azurerm_aadb2c_directory` | yes | yes |
//! | `azurerm_hybrid_compute_machine` | yes | yes |
//! | `azurerm_hybrid_compute_machines` | | yes |
//! | `azurerm_kusto_cluster` | yes | |
//! | `azurerm_device_registry_asset` | yes | |

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod api;
pub mod clients;
pub mod config;
pub mod error;
pub mod logging;
pub mod plan;
pub mod provider;
pub mod registry;
pub mod resource;
pub mod schema;
pub mod services;
pub mod testing;
pub mod types;
pub mod validation;

// Re-export main types at crate root
pub use clients::Clients;
pub use config::ProviderConfig;
pub use error::ProviderError;
pub use logging::{init_logging, init_logging_with_default, try_init_logging};
pub use provider::{AzureProvider, ProviderService};
pub use registry::{Registry, ServiceRegistration};
pub use resource::{DataSource, Resource, ResourceMetaData, Timeouts};
pub use schema::ProviderSchema;
pub use types::{AttributeChange, ImportedResource, PlanAction, PlanResult, ProviderMetadata};
pub use validation::{validate, validate_result};

// Re-export async_trait for convenience
pub use async_trait::async_trait;

// Re-export commonly used external types
pub use serde_json;
pub use tracing;
