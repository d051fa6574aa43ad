//! The provider service: the operations a host calls to manage resources.
//!
//! [`ProviderService`] is the host-facing API, expressed with plain Rust and
//! JSON types. [`AzureProvider`] implements it on top of the [`Registry`]:
//! it validates input against each type's schema, computes plans, and runs
//! the resource adapters under their timeouts.

use std::future::Future;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use crate::clients::Clients;
use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::plan::plan_resource;
use crate::registry::Registry;
use crate::resource::ResourceMetaData;
use crate::schema::{has_errors, Diagnostic, ProviderSchema};
use crate::types::{ImportedResource, PlanResult, ProviderMetadata};
use crate::validation::validate;

/// Operations a host calls on a provider.
///
/// # Example
///
/// ```no_run
/// use azurerm_provider::{AzureProvider, ProviderService};
/// use serde_json::json;
///
/// # async fn run() -> Result<(), azurerm_provider::ProviderError> {
/// let provider = AzureProvider::new()?;
/// provider
///     .configure(json!({"subscription_id": "00000000-0000-0000-0000-000000000000"}))
///     .await?;
///
/// let config = json!({
///     "domain_name": "acctest123.onmicrosoft.com",
///     "resource_group_name": "acctestRG-b2c",
///     "data_residency_location": "United States",
///     "sku_name": "PremiumP1"
/// });
/// let plan = provider.plan("azurerm_aadb2c_directory", None, config).await?;
/// let state = provider.create("azurerm_aadb2c_directory", plan.planned_state).await?;
/// # Ok(())
/// # }
/// ```
#[async_trait::async_trait]
pub trait ProviderService: Send + Sync + 'static {
    // =========================================================================
    // Schema & Metadata
    // =========================================================================

    /// Return the provider's schema including all resources and data sources.
    fn schema(&self) -> ProviderSchema;

    /// Return provider metadata. By default, this is derived from the schema.
    fn metadata(&self) -> ProviderMetadata {
        let schema = self.schema();
        let mut resources: Vec<String> = schema.resources.keys().cloned().collect();
        let mut data_sources: Vec<String> = schema.data_sources.keys().cloned().collect();
        resources.sort();
        data_sources.sort();
        ProviderMetadata {
            resources,
            data_sources,
            services: Vec::new(),
        }
    }

    // =========================================================================
    // Provider Lifecycle
    // =========================================================================

    /// Validate the provider configuration before configuring.
    async fn validate_provider_config(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError>;

    /// Configure the provider. Returns diagnostics (errors and warnings).
    async fn configure(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError>;

    /// Stop the provider gracefully.
    async fn stop(&self) -> Result<(), ProviderError> {
        Ok(())
    }

    // =========================================================================
    // Resource Operations
    // =========================================================================

    /// Validate a resource's configuration before planning.
    async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError>;

    /// Plan changes for a resource. `config` is `null` when the resource is
    /// being removed.
    async fn plan(
        &self,
        resource_type: &str,
        prior_state: Option<Value>,
        config: Value,
    ) -> Result<PlanResult, ProviderError>;

    /// Create a new resource from its planned state.
    async fn create(&self, resource_type: &str, planned_state: Value) -> Result<Value, ProviderError>;

    /// Read the current state of a resource. `None` means it no longer exists.
    async fn read(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<Option<Value>, ProviderError>;

    /// Update an existing resource.
    async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError>;

    /// Delete a resource.
    async fn delete(&self, resource_type: &str, current_state: Value) -> Result<(), ProviderError>;

    /// Bring an existing resource under management.
    async fn import_resource(
        &self,
        resource_type: &str,
        id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError>;

    // =========================================================================
    // Data Source Operations
    // =========================================================================

    /// Validate a data source's configuration.
    async fn validate_data_source_config(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError>;

    /// Read data from an external source.
    async fn read_data_source(&self, data_source_type: &str, config: Value) -> Result<Value, ProviderError>;
}

/// The Azure Resource Manager provider.
#[derive(Debug)]
pub struct AzureProvider {
    registry: Registry,
    clients: RwLock<Option<Arc<Clients>>>,
}

impl AzureProvider {
    /// A provider with every built-in service registered.
    pub fn new() -> Result<Self, ProviderError> {
        Ok(Self::with_registry(Registry::default_services()?))
    }

    /// A provider serving the given registry.
    pub fn with_registry(registry: Registry) -> Self {
        Self {
            registry,
            clients: RwLock::new(None),
        }
    }

    /// The registered resources and data sources.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Whether `configure` has succeeded.
    pub fn is_configured(&self) -> bool {
        self.clients.read().map(|c| c.is_some()).unwrap_or(false)
    }

    fn clients(&self) -> Result<Arc<Clients>, ProviderError> {
        let guard = self
            .clients
            .read()
            .map_err(|_| ProviderError::Sdk("client lock poisoned".to_string()))?;
        guard.clone().ok_or(ProviderError::NotConfigured)
    }

    fn set_clients(&self, clients: Option<Arc<Clients>>) -> Result<(), ProviderError> {
        let mut guard = self
            .clients
            .write()
            .map_err(|_| ProviderError::Sdk("client lock poisoned".to_string()))?;
        *guard = clients;
        Ok(())
    }
}

async fn with_timeout<T, F>(
    operation: &str,
    resource_type: &str,
    limit: Duration,
    future: F,
) -> Result<T, ProviderError>
where
    F: Future<Output = Result<T, ProviderError>>,
{
    match tokio::time::timeout(limit, future).await {
        Ok(result) => result,
        Err(_) => {
            warn!(resource_type, operation, timeout_secs = limit.as_secs(), "operation timed out");
            Err(ProviderError::DeadlineExceeded(format!(
                "{operation} of {resource_type} did not finish within {limit:?}"
            )))
        },
    }
}

fn validation_error(diagnostics: &[Diagnostic]) -> ProviderError {
    let details: Vec<String> = diagnostics
        .iter()
        .map(|d| {
            let mut line = match &d.attribute {
                Some(attr) => format!("{attr}: {}", d.summary),
                None => d.summary.clone(),
            };
            if let Some(detail) = &d.detail {
                line.push_str(": ");
                line.push_str(detail);
            }
            line
        })
        .collect();
    ProviderError::Validation(details.join("; "))
}

fn log_diagnostics(kind: &str, name: &str, diagnostics: &[Diagnostic]) {
    if has_errors(diagnostics) {
        warn!(kind, name, diagnostics = diagnostics.len(), "validation completed with errors");
    } else {
        debug!(kind, name, "validation completed successfully");
    }
}

#[async_trait::async_trait]
impl ProviderService for AzureProvider {
    fn schema(&self) -> ProviderSchema {
        self.registry
            .provider_schema()
            .with_provider_config(ProviderConfig::schema())
    }

    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            resources: self.registry.resource_types(),
            data_sources: self.registry.data_source_types(),
            services: self.registry.services().to_vec(),
        }
    }

    #[instrument(skip(self, config), name = "provider.validate_provider_config")]
    async fn validate_provider_config(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
        let mut diagnostics = validate(&ProviderConfig::schema(), &config);
        if has_errors(&diagnostics) {
            log_diagnostics("provider", "azurerm", &diagnostics);
            return Ok(diagnostics);
        }

        match ProviderConfig::from_value(&config) {
            Ok(parsed) => diagnostics.extend(parsed.validate()),
            Err(e) => diagnostics.push(Diagnostic::error("Invalid provider configuration").with_detail(e.message())),
        }
        log_diagnostics("provider", "azurerm", &diagnostics);
        Ok(diagnostics)
    }

    #[instrument(skip(self, config), name = "provider.configure")]
    async fn configure(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
        let config = ProviderConfig::from_value(&config)?;
        let diagnostics = config.validate();
        if has_errors(&diagnostics) {
            warn!(diagnostics = diagnostics.len(), "configure completed with errors");
            return Ok(diagnostics);
        }

        let clients = Clients::build(&config)?;
        info!(
            subscription_id = %clients.account.subscription_id,
            endpoint = %config.client_options().endpoint,
            "provider configured"
        );
        self.set_clients(Some(Arc::new(clients)))?;
        Ok(diagnostics)
    }

    #[instrument(skip(self), name = "provider.stop")]
    async fn stop(&self) -> Result<(), ProviderError> {
        self.set_clients(None)?;
        info!("provider stopped");
        Ok(())
    }

    #[instrument(skip(self, config), name = "provider.validate_resource_config")]
    async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        let resource = self.registry.resource(resource_type)?;
        let diagnostics = validate(&resource.schema(), &config);
        log_diagnostics("resource", resource_type, &diagnostics);
        Ok(diagnostics)
    }

    #[instrument(skip(self, prior_state, config), name = "provider.plan")]
    async fn plan(
        &self,
        resource_type: &str,
        prior_state: Option<Value>,
        config: Value,
    ) -> Result<PlanResult, ProviderError> {
        let resource = self.registry.resource(resource_type)?;
        let schema = resource.schema();

        if !config.is_null() {
            let diagnostics = validate(&schema, &config);
            if has_errors(&diagnostics) {
                return Err(validation_error(&diagnostics));
            }
        }

        let result = plan_resource(&schema, prior_state.as_ref(), &config);
        info!(
            resource_type,
            action = ?result.action(),
            changes = result.changes.len(),
            requires_replace = result.requires_replace,
            "plan completed"
        );
        Ok(result)
    }

    #[instrument(skip(self, planned_state), name = "provider.create")]
    async fn create(&self, resource_type: &str, planned_state: Value) -> Result<Value, ProviderError> {
        let resource = self.registry.resource(resource_type)?;
        let clients = self.clients()?;
        let timeouts = resource.timeouts();
        let mut metadata = ResourceMetaData::new(clients, resource_type, planned_state);

        with_timeout("create", resource_type, timeouts.create, async {
            resource.create(&mut metadata).await?;
            resource.read(&mut metadata).await
        })
        .await
        .inspect_err(|e| error!(resource_type, error = %e, "create failed"))?;

        let id = metadata.raw_id().unwrap_or_default().to_string();
        let state = metadata.into_state().ok_or_else(|| {
            ProviderError::NotFound(format!("{resource_type} {id} disappeared after it was created"))
        })?;
        info!(resource_type, id = %id, "create completed");
        Ok(state)
    }

    #[instrument(skip(self, current_state), name = "provider.read")]
    async fn read(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<Option<Value>, ProviderError> {
        let resource = self.registry.resource(resource_type)?;
        let clients = self.clients()?;
        let mut metadata = ResourceMetaData::new(clients, resource_type, current_state);

        with_timeout("read", resource_type, resource.timeouts().read, resource.read(&mut metadata))
            .await
            .inspect_err(|e| error!(resource_type, error = %e, "read failed"))?;

        Ok(metadata.into_state())
    }

    #[instrument(skip(self, prior_state, planned_state), name = "provider.update")]
    async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        let resource = self.registry.resource(resource_type)?;
        let clients = self.clients()?;
        let timeouts = resource.timeouts();
        let mut metadata =
            ResourceMetaData::new(clients, resource_type, planned_state).with_prior(prior_state);

        with_timeout("update", resource_type, timeouts.update, async {
            resource.update(&mut metadata).await?;
            resource.read(&mut metadata).await
        })
        .await
        .inspect_err(|e| error!(resource_type, error = %e, "update failed"))?;

        let id = metadata.raw_id().unwrap_or_default().to_string();
        let state = metadata.into_state().ok_or_else(|| {
            ProviderError::NotFound(format!("{resource_type} {id} disappeared during update"))
        })?;
        info!(resource_type, id = %id, "update completed");
        Ok(state)
    }

    #[instrument(skip(self, current_state), name = "provider.delete")]
    async fn delete(&self, resource_type: &str, current_state: Value) -> Result<(), ProviderError> {
        let resource = self.registry.resource(resource_type)?;
        let clients = self.clients()?;
        let mut metadata = ResourceMetaData::new(clients, resource_type, current_state);

        with_timeout("delete", resource_type, resource.timeouts().delete, resource.delete(&mut metadata))
            .await
            .inspect_err(|e| error!(resource_type, error = %e, "delete failed"))?;

        info!(resource_type, id = metadata.raw_id().unwrap_or_default(), "delete completed");
        Ok(())
    }

    #[instrument(skip(self), name = "provider.import_resource")]
    async fn import_resource(
        &self,
        resource_type: &str,
        id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError> {
        let resource = self.registry.resource(resource_type)?;
        resource.validate_id(id)?;
        let clients = self.clients()?;
        let mut metadata = ResourceMetaData::new(clients, resource_type, serde_json::json!({ "id": id }));

        with_timeout("import", resource_type, resource.timeouts().read, resource.read(&mut metadata)).await?;

        let state = metadata
            .into_state()
            .ok_or_else(|| ProviderError::NotFound(format!("{resource_type} {id} was not found")))?;
        info!(resource_type, id, "import completed");
        Ok(vec![ImportedResource::new(resource_type, state)])
    }

    #[instrument(skip(self, config), name = "provider.validate_data_source_config")]
    async fn validate_data_source_config(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        let data_source = self.registry.data_source(data_source_type)?;
        let diagnostics = validate(&data_source.schema(), &config);
        log_diagnostics("data_source", data_source_type, &diagnostics);
        Ok(diagnostics)
    }

    #[instrument(skip(self, config), name = "provider.read_data_source")]
    async fn read_data_source(&self, data_source_type: &str, config: Value) -> Result<Value, ProviderError> {
        let data_source = self.registry.data_source(data_source_type)?;
        let diagnostics = validate(&data_source.schema(), &config);
        if has_errors(&diagnostics) {
            return Err(validation_error(&diagnostics));
        }

        let clients = self.clients()?;
        let mut metadata = ResourceMetaData::new(clients, data_source_type, config);

        with_timeout("read", data_source_type, data_source.timeout(), data_source.read(&mut metadata))
            .await
            .inspect_err(|e| error!(data_source_type, error = %e, "read data source failed"))?;

        metadata.into_state().ok_or_else(|| {
            ProviderError::NotFound(format!("{data_source_type} returned no data"))
        })
    }
}
