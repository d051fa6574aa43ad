//! Registration of services, resources and data sources.
//!
//! Each service package implements [`ServiceRegistration`]. [`Registry::build`]
//! collects them once at startup into lookup tables keyed by type name.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::ProviderError;
use crate::resource::{DataSource, Resource};
use crate::schema::ProviderSchema;
use crate::services;
use crate::types::ServiceMetadata;

/// A service package's contribution to the provider.
pub trait ServiceRegistration: Send + Sync {
    /// Display name of the service.
    fn name(&self) -> &'static str;

    /// Documentation categories the service is listed under.
    fn website_categories(&self) -> Vec<&'static str>;

    /// Issue tracker label for the service.
    fn associated_github_label(&self) -> &'static str;

    /// Resources the service provides.
    fn resources(&self) -> Vec<Arc<dyn Resource>>;

    /// Data sources the service provides.
    fn data_sources(&self) -> Vec<Arc<dyn DataSource>> {
        Vec::new()
    }
}

/// Every resource and data source known to the provider.
#[derive(Default, Clone)]
pub struct Registry {
    resources: BTreeMap<&'static str, Arc<dyn Resource>>,
    data_sources: BTreeMap<&'static str, Arc<dyn DataSource>>,
    services: Vec<ServiceMetadata>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("resources", &self.resources.keys().collect::<Vec<_>>())
            .field("data_sources", &self.data_sources.keys().collect::<Vec<_>>())
            .field("services", &self.services)
            .finish()
    }
}

impl Registry {
    /// Collect the registrations, rejecting type names registered twice.
    pub fn build(
        registrations: Vec<Box<dyn ServiceRegistration>>,
    ) -> Result<Self, ProviderError> {
        let mut registry = Self::default();

        for registration in registrations {
            for resource in registration.resources() {
                let name = resource.resource_type();
                if registry.resources.insert(name, resource).is_some() {
                    return Err(ProviderError::Sdk(format!(
                        "resource {name:?} is registered more than once (service {:?})",
                        registration.name()
                    )));
                }
            }

            for data_source in registration.data_sources() {
                let name = data_source.data_source_type();
                if registry.data_sources.insert(name, data_source).is_some() {
                    return Err(ProviderError::Sdk(format!(
                        "data source {name:?} is registered more than once (service {:?})",
                        registration.name()
                    )));
                }
            }

            registry.services.push(ServiceMetadata {
                name: registration.name().to_string(),
                website_categories: registration
                    .website_categories()
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
                github_label: registration.associated_github_label().to_string(),
            });
        }

        Ok(registry)
    }

    /// Registry of every service this crate ships.
    pub fn default_services() -> Result<Self, ProviderError> {
        Self::build(services::registrations())
    }

    /// Look up a resource by type name.
    pub fn resource(&self, name: &str) -> Result<&Arc<dyn Resource>, ProviderError> {
        self.resources
            .get(name)
            .ok_or_else(|| ProviderError::UnknownResource(name.to_string()))
    }

    /// Look up a data source by type name.
    pub fn data_source(&self, name: &str) -> Result<&Arc<dyn DataSource>, ProviderError> {
        self.data_sources
            .get(name)
            .ok_or_else(|| ProviderError::UnknownResource(name.to_string()))
    }

    /// Resource type names, sorted.
    pub fn resource_types(&self) -> Vec<String> {
        self.resources.keys().map(|k| (*k).to_string()).collect()
    }

    /// Data source type names, sorted.
    pub fn data_source_types(&self) -> Vec<String> {
        self.data_sources.keys().map(|k| (*k).to_string()).collect()
    }

    /// Metadata of the registered services, in registration order.
    pub fn services(&self) -> &[ServiceMetadata] {
        &self.services
    }

    /// Schemas of every resource and data source.
    pub fn provider_schema(&self) -> ProviderSchema {
        let mut schema = ProviderSchema::new();
        for (name, resource) in &self.resources {
            schema = schema.with_resource(*name, resource.schema());
        }
        for (name, data_source) in &self.data_sources {
            schema = schema.with_data_source(*name, data_source.schema());
        }
        schema
    }
}
