//! Configured API clients shared by every resource.

use crate::api::aadb2c::TenantsClient;
use crate::api::deviceregistry::AssetsClient;
use crate::api::hybridcompute::MachinesClient;
use crate::api::kusto::ClustersClient;
use crate::api::ResourceManagerClient;
use crate::config::ProviderConfig;
use crate::error::ProviderError;

/// Subscription and tenant the provider operates in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountContext {
    /// Subscription resources are created in.
    pub subscription_id: String,
    /// Tenant of the subscription, when known.
    pub tenant_id: Option<String>,
}

/// Every service client, built once by `configure`.
#[derive(Debug, Clone)]
pub struct Clients {
    /// Subscription and tenant context.
    pub account: AccountContext,
    /// B2C tenants.
    pub aadb2c: TenantsClient,
    /// Arc-enabled machines.
    pub hybrid_compute: MachinesClient,
    /// Kusto clusters.
    pub kusto: ClustersClient,
    /// Device Registry assets.
    pub device_registry: AssetsClient,
}

impl Clients {
    /// Build the clients from a validated configuration.
    pub fn build(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let subscription_id = config
            .subscription_id
            .clone()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ProviderError::Configuration("subscription_id is not set".to_string()))?;

        let inner = ResourceManagerClient::new(config.client_options())
            .map_err(|e| ProviderError::Configuration(format!("building API client: {e}")))?;

        Ok(Self {
            account: AccountContext {
                subscription_id,
                tenant_id: config.tenant_id.clone(),
            },
            aadb2c: TenantsClient::new(inner.clone()),
            hybrid_compute: MachinesClient::new(inner.clone()),
            kusto: ClustersClient::new(inner.clone()),
            device_registry: AssetsClient::new(inner),
        })
    }
}
