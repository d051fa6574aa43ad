//! Device Registry assets (`Microsoft.DeviceRegistry/assets`, 2024-11-01).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::enums::open_enum;
use super::resource_ids::resource_id;
use super::{ApiError, ExtendedLocation, ResourceId, ResourceManagerClient, SystemData};

/// API version of this package.
pub const API_VERSION: &str = "2024-11-01";

/// Extended location type assets deploy into.
pub const CUSTOM_LOCATION: &str = "CustomLocation";

resource_id! {
    /// A Device Registry asset.
    pub struct AssetId("Asset") {
        "subscriptions" => subscription_id,
        "resourceGroups" => resource_group_name,
        "providers/Microsoft.DeviceRegistry/assets" => asset_name,
    }
}

open_enum! {
    /// Provisioning state of an asset.
    pub enum ProvisioningState {
        Accepted => "Accepted",
        Deleting => "Deleting",
        Failed => "Failed",
        Succeeded => "Succeeded",
    }
}

/// Reference to an asset discovered on the edge.
pub type DiscoveredAssetRef = String;

/// Asset properties.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetProperties {
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_endpoint_profile_ref: Option<String>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_asset_id: Option<String>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documentation_uri: Option<String>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<HashMap<String, serde_json::Value>>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discovered_asset_refs: Option<Vec<DiscoveredAssetRef>>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<ProvisioningState>,
}

/// An asset resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[allow(missing_docs)]
    pub location: String,
    #[allow(missing_docs)]
    pub extended_location: ExtendedLocation,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<AssetProperties>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<HashMap<String, String>>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_data: Option<SystemData>,
}

/// Body of an update request. Unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetUpdate {
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<AssetProperties>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<HashMap<String, String>>,
}

/// Typed client for assets.
#[derive(Debug, Clone)]
pub struct AssetsClient {
    inner: ResourceManagerClient,
}

impl AssetsClient {
    #[allow(missing_docs)]
    pub fn new(inner: ResourceManagerClient) -> Self {
        Self { inner }
    }

    /// Retrieve an asset.
    pub async fn get(&self, id: &AssetId) -> Result<Asset, ApiError> {
        self.inner.get(&id.id(), API_VERSION).await
    }

    /// Create or replace an asset and wait for provisioning to finish.
    pub async fn create_or_replace_then_poll(
        &self,
        id: &AssetId,
        input: &Asset,
    ) -> Result<(), ApiError> {
        self.inner.put_then_poll(&id.id(), API_VERSION, input).await
    }

    /// Partially update an asset and wait for the update to finish.
    pub async fn update_then_poll(&self, id: &AssetId, input: &AssetUpdate) -> Result<(), ApiError> {
        self.inner.patch_then_poll(&id.id(), API_VERSION, input).await
    }

    /// Delete an asset and wait for the deletion to finish.
    pub async fn delete_then_poll(&self, id: &AssetId) -> Result<(), ApiError> {
        self.inner.delete_then_poll(&id.id(), API_VERSION).await
    }
}
