//! Resource Manager API client layer.
//!
//! [`ResourceManagerClient`] handles transport, error decoding, long-running
//! operation polling and paging. Each service module on top of it declares the
//! typed IDs, open enums and request/response models of one API version plus a
//! thin typed client.

pub mod enums;
pub mod error;
pub mod pager;
pub(crate) mod poller;
pub mod resource_ids;

pub mod client;

pub mod aadb2c;
pub mod deviceregistry;
pub mod hybridcompute;
pub mod kusto;

pub use client::{ClientOptions, ResourceManagerClient, DEFAULT_ENDPOINT};
pub use enums::OperationStatus;
pub use error::ApiError;
pub use pager::Page;
pub use resource_ids::{CustomLocationId, IdParseError, ResourceGroupId, ResourceId};

use serde::{Deserialize, Serialize};

/// Where a resource lives when it is not in an Azure region.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendedLocation {
    /// The ID of the extended location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// The kind of extended location, e.g. `CustomLocation`.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// Metadata the service records about who created and last modified a resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemData {
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified_at: Option<String>,
}
