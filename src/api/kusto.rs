//! Azure Data Explorer clusters (`Microsoft.Kusto/clusters`, 2023-08-15).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::enums::open_enum;
use super::resource_ids::resource_id;
use super::{ApiError, ResourceId, ResourceManagerClient};

/// API version of this package.
pub const API_VERSION: &str = "2023-08-15";

resource_id! {
    /// A Kusto cluster.
    pub struct ClusterId("Kusto Cluster") {
        "subscriptions" => subscription_id,
        "resourceGroups" => resource_group_name,
        "providers/Microsoft.Kusto/clusters" => cluster_name,
    }
}

open_enum! {
    /// Compute SKU of a cluster.
    pub enum AzureSkuName {
        DevNoSlaStandardD11V2 => "Dev(No SLA)_Standard_D11_v2",
        DevNoSlaStandardE2aV4 => "Dev(No SLA)_Standard_E2a_v4",
        StandardD11V2 => "Standard_D11_v2",
        StandardD12V2 => "Standard_D12_v2",
        StandardD13V2 => "Standard_D13_v2",
        StandardD14V2 => "Standard_D14_v2",
        StandardD16dV5 => "Standard_D16d_v5",
        StandardD32dV4 => "Standard_D32d_v4",
        StandardD32dV5 => "Standard_D32d_v5",
        StandardDs13V2Plus1TbPs => "Standard_DS13_v2+1TB_PS",
        StandardDs13V2Plus2TbPs => "Standard_DS13_v2+2TB_PS",
        StandardDs14V2Plus3TbPs => "Standard_DS14_v2+3TB_PS",
        StandardDs14V2Plus4TbPs => "Standard_DS14_v2+4TB_PS",
        StandardE2aV4 => "Standard_E2a_v4",
        StandardE2adsV5 => "Standard_E2ads_v5",
        StandardE2dV4 => "Standard_E2d_v4",
        StandardE2dV5 => "Standard_E2d_v5",
        StandardE4aV4 => "Standard_E4a_v4",
        StandardE4adsV5 => "Standard_E4ads_v5",
        StandardE4dV4 => "Standard_E4d_v4",
        StandardE4dV5 => "Standard_E4d_v5",
        StandardE8aV4 => "Standard_E8a_v4",
        StandardE8adsV5 => "Standard_E8ads_v5",
        StandardE8dV4 => "Standard_E8d_v4",
        StandardE8dV5 => "Standard_E8d_v5",
        StandardE16aV4 => "Standard_E16a_v4",
        StandardE16adsV5 => "Standard_E16ads_v5",
        StandardE16dV4 => "Standard_E16d_v4",
        StandardE16dV5 => "Standard_E16d_v5",
        StandardE64iV3 => "Standard_E64i_v3",
        StandardE80idsV4 => "Standard_E80ids_v4",
        StandardL4s => "Standard_L4s",
        StandardL8s => "Standard_L8s",
        StandardL8sV2 => "Standard_L8s_v2",
        StandardL8sV3 => "Standard_L8s_v3",
        StandardL8asV3 => "Standard_L8as_v3",
        StandardL16s => "Standard_L16s",
        StandardL16sV2 => "Standard_L16s_v2",
        StandardL16sV3 => "Standard_L16s_v3",
        StandardL16asV3 => "Standard_L16as_v3",
        StandardL32sV3 => "Standard_L32s_v3",
        StandardL32asV3 => "Standard_L32as_v3",
    }
}

impl AzureSkuName {
    /// The tier a SKU belongs to: `Basic` for dev SKUs, `Standard` otherwise.
    pub fn tier(&self) -> AzureSkuTier {
        if self.as_str().starts_with("Dev(No SLA)_") {
            AzureSkuTier::Basic
        } else {
            AzureSkuTier::Standard
        }
    }
}

open_enum! {
    /// SLA tier of a cluster.
    pub enum AzureSkuTier {
        Basic => "Basic",
        Standard => "Standard",
    }
}

open_enum! {
    /// Whether the cluster accepts traffic from public networks.
    pub enum PublicNetworkAccess {
        Enabled => "Enabled",
        Disabled => "Disabled",
    }
}

open_enum! {
    /// Running state of a cluster.
    pub enum State {
        Creating => "Creating",
        Deleted => "Deleted",
        Deleting => "Deleting",
        Migrated => "Migrated",
        Running => "Running",
        Starting => "Starting",
        Stopped => "Stopped",
        Stopping => "Stopping",
        Unavailable => "Unavailable",
        Updating => "Updating",
    }
}

open_enum! {
    /// Provisioning state of a cluster.
    pub enum ProvisioningState {
        Canceled => "Canceled",
        Creating => "Creating",
        Deleting => "Deleting",
        Failed => "Failed",
        Moving => "Moving",
        Running => "Running",
        Succeeded => "Succeeded",
    }
}

/// SKU of a cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AzureSku {
    #[allow(missing_docs)]
    pub name: AzureSkuName,
    #[allow(missing_docs)]
    pub tier: AzureSkuTier,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<i64>,
}

/// Cluster properties.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterProperties {
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_auto_stop: Option<bool>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_disk_encryption: Option<bool>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_streaming_ingest: Option<bool>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_purge: Option<bool>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_network_access: Option<PublicNetworkAccess>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_ingestion_uri: Option<String>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<State>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<ProvisioningState>,
}

/// A cluster resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[allow(missing_docs)]
    pub location: String,
    #[allow(missing_docs)]
    pub sku: AzureSku,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<ClusterProperties>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<HashMap<String, String>>,
}

/// Body of an update request. Unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterUpdate {
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<AzureSku>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<ClusterProperties>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<HashMap<String, String>>,
}

/// Typed client for clusters.
#[derive(Debug, Clone)]
pub struct ClustersClient {
    inner: ResourceManagerClient,
}

impl ClustersClient {
    #[allow(missing_docs)]
    pub fn new(inner: ResourceManagerClient) -> Self {
        Self { inner }
    }

    /// Retrieve a cluster.
    pub async fn get(&self, id: &ClusterId) -> Result<Cluster, ApiError> {
        self.inner.get(&id.id(), API_VERSION).await
    }

    /// Create or replace a cluster and wait for provisioning to finish.
    pub async fn create_or_update_then_poll(
        &self,
        id: &ClusterId,
        input: &Cluster,
    ) -> Result<(), ApiError> {
        self.inner.put_then_poll(&id.id(), API_VERSION, input).await
    }

    /// Partially update a cluster and wait for the update to finish.
    pub async fn update_then_poll(
        &self,
        id: &ClusterId,
        input: &ClusterUpdate,
    ) -> Result<(), ApiError> {
        self.inner.patch_then_poll(&id.id(), API_VERSION, input).await
    }

    /// Delete a cluster and wait for the deletion to finish.
    pub async fn delete_then_poll(&self, id: &ClusterId) -> Result<(), ApiError> {
        self.inner.delete_then_poll(&id.id(), API_VERSION).await
    }
}
