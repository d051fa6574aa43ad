//! Azure AD B2C tenants (`Microsoft.AzureActiveDirectory/b2cDirectories`, 2021-04-01).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::enums::open_enum;
use super::resource_ids::resource_id;
use super::{ApiError, ResourceId, ResourceManagerClient};

/// API version of this package.
pub const API_VERSION: &str = "2021-04-01";

resource_id! {
    /// A B2C tenant, addressed by its domain name.
    pub struct B2CDirectoryId("B2C Directory") {
        "subscriptions" => subscription_id,
        "resourceGroups" => resource_group_name,
        "providers/Microsoft.AzureActiveDirectory/b2cDirectories" => directory_name,
    }
}

open_enum! {
    /// Billing SKU of a B2C tenant.
    pub enum SkuName {
        PremiumP1 => "PremiumP1",
        PremiumP2 => "PremiumP2",
        Standard => "Standard",
    }
}

open_enum! {
    /// The tier that goes with every SKU name.
    pub enum SkuTier {
        A0 => "A0",
    }
}

open_enum! {
    /// Where tenant data is stored.
    pub enum Location {
        AsiaPacific => "Asia Pacific",
        Australia => "Australia",
        Europe => "Europe",
        Global => "Global",
        UnitedStates => "United States",
    }
}

open_enum! {
    /// How the tenant is billed.
    pub enum BillingType {
        Auths => "auths",
        MonthlyActiveUsers => "mau",
    }
}

/// SKU of a tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sku {
    #[allow(missing_docs)]
    pub name: SkuName,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<SkuTier>,
}

impl Sku {
    /// A SKU with the tier every B2C SKU uses.
    pub fn new(name: SkuName) -> Self {
        Self {
            name,
            tier: Some(SkuTier::A0),
        }
    }
}

/// Billing details returned for a tenant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingConfig {
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_type: Option<BillingType>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_start_date_utc: Option<String>,
}

/// Properties of a tenant as returned by the service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantProperties {
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_config: Option<BillingConfig>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
}

/// A tenant resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct B2CTenantResource {
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Data residency location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[allow(missing_docs)]
    pub sku: Sku,
    #[allow(missing_docs)]
    #[serde(default)]
    pub properties: TenantProperties,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<HashMap<String, String>>,
}

/// Settings only accepted when the tenant is created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTenantProperties {
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// Body of a create request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTenant {
    #[allow(missing_docs)]
    pub location: Location,
    #[allow(missing_docs)]
    pub properties: CreateTenantRequestProperties,
    #[allow(missing_docs)]
    pub sku: Sku,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<HashMap<String, String>>,
}

/// Wrapper the create request nests its settings under.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTenantRequestProperties {
    #[allow(missing_docs)]
    pub create_tenant_properties: CreateTenantProperties,
}

/// Body of an update request. Unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateTenant {
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<Sku>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<HashMap<String, String>>,
}

/// Typed client for B2C tenants.
#[derive(Debug, Clone)]
pub struct TenantsClient {
    inner: ResourceManagerClient,
}

impl TenantsClient {
    #[allow(missing_docs)]
    pub fn new(inner: ResourceManagerClient) -> Self {
        Self { inner }
    }

    /// Retrieve a tenant.
    pub async fn get(&self, id: &B2CDirectoryId) -> Result<B2CTenantResource, ApiError> {
        self.inner.get(&id.id(), API_VERSION).await
    }

    /// Create a tenant and wait for provisioning to finish.
    pub async fn create_then_poll(
        &self,
        id: &B2CDirectoryId,
        input: &CreateTenant,
    ) -> Result<(), ApiError> {
        self.inner.put_then_poll(&id.id(), API_VERSION, input).await
    }

    /// Change the SKU or tags of a tenant.
    pub async fn update(&self, id: &B2CDirectoryId, input: &UpdateTenant) -> Result<(), ApiError> {
        self.inner.patch_then_poll(&id.id(), API_VERSION, input).await
    }

    /// Delete a tenant and wait for the deletion to finish.
    pub async fn delete_then_poll(&self, id: &B2CDirectoryId) -> Result<(), ApiError> {
        self.inner.delete_then_poll(&id.id(), API_VERSION).await
    }
}
