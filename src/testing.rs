//! In-process harness for exercising resources end to end.
//!
//! [`ProviderTester`] drives a [`ProviderService`] the way a host would:
//! validate, plan, apply, read back. Combined with a mock Resource Manager
//! endpoint (see `tests/`) it exercises resources end to end in process.
//!
//! # Example
//!
//! ```no_run
//! use azurerm_provider::testing::ProviderTester;
//! use azurerm_provider::AzureProvider;
//! use serde_json::json;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let tester = ProviderTester::new(AzureProvider::new()?);
//! tester
//!     .configure(json!({
//!         "subscription_id": "00000000-0000-0000-0000-000000000000",
//!         "access_token": "token",
//!         "resource_manager_endpoint": "http://127.0.0.1:8080/"
//!     }))
//!     .await?;
//!
//! let state = tester
//!     .lifecycle_create(
//!         "azurerm_aadb2c_directory",
//!         json!({
//!             "domain_name": "acctest123.onmicrosoft.com",
//!             "resource_group_name": "acctestRG-b2c",
//!             "data_residency_location": "United States",
//!             "sku_name": "PremiumP1"
//!         }),
//!     )
//!     .await?;
//! assert_eq!(state["sku_name"], "PremiumP1");
//! # Ok(())
//! # }
//! ```

use serde_json::Value;

use crate::error::ProviderError;
use crate::provider::ProviderService;
use crate::schema::{Diagnostic, DiagnosticSeverity, ProviderSchema};
use crate::types::{ImportedResource, PlanResult};

/// Drives a [`ProviderService`] through validate, plan, apply and read.
pub struct ProviderTester<P: ProviderService> {
    provider: P,
}

impl<P: ProviderService> ProviderTester<P> {
    #[allow(missing_docs)]
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// The provider under test.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    // =========================================================================
    // Schema & Metadata
    // =========================================================================

    #[allow(missing_docs)]
    pub fn schema(&self) -> ProviderSchema {
        self.provider.schema()
    }

    /// Every registered resource type, sorted.
    pub fn resource_types(&self) -> Vec<String> {
        self.provider.metadata().resources
    }

    /// Every registered data source type, sorted.
    pub fn data_source_types(&self) -> Vec<String> {
        self.provider.metadata().data_sources
    }

    // =========================================================================
    // Provider Lifecycle
    // =========================================================================

    /// Validate provider configuration, failing on error diagnostics.
    pub async fn validate_provider_config(&self, config: Value) -> Result<(), TestError> {
        let diagnostics = self.provider.validate_provider_config(config).await?;
        check_diagnostics(diagnostics)
    }

    /// Configure the provider, failing on error diagnostics.
    pub async fn configure(&self, config: Value) -> Result<(), TestError> {
        let diagnostics = self.provider.configure(config).await?;
        check_diagnostics(diagnostics)
    }

    /// Stop the provider.
    pub async fn stop(&self) -> Result<(), ProviderError> {
        self.provider.stop().await
    }

    // =========================================================================
    // Resource Operations
    // =========================================================================

    /// Validate a resource configuration, failing on error diagnostics.
    pub async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<(), TestError> {
        let diagnostics = self
            .provider
            .validate_resource_config(resource_type, config)
            .await?;
        check_diagnostics(diagnostics)
    }

    /// Plan a resource that does not exist yet.
    pub async fn plan_create(&self, resource_type: &str, config: Value) -> Result<PlanResult, ProviderError> {
        self.provider.plan(resource_type, None, config).await
    }

    /// Plan a change to an existing resource.
    pub async fn plan_update(
        &self,
        resource_type: &str,
        prior_state: Value,
        config: Value,
    ) -> Result<PlanResult, ProviderError> {
        self.provider.plan(resource_type, Some(prior_state), config).await
    }

    /// Plan removing a resource from configuration.
    pub async fn plan_delete(&self, resource_type: &str, prior_state: Value) -> Result<PlanResult, ProviderError> {
        self.provider.plan(resource_type, Some(prior_state), Value::Null).await
    }

    /// Apply a create plan.
    pub async fn create(&self, resource_type: &str, planned_state: Value) -> Result<Value, ProviderError> {
        self.provider.create(resource_type, planned_state).await
    }

    /// Refresh state. `None` when the resource is gone.
    pub async fn read(&self, resource_type: &str, current_state: Value) -> Result<Option<Value>, ProviderError> {
        self.provider.read(resource_type, current_state).await
    }

    /// Apply an update plan.
    pub async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        self.provider.update(resource_type, prior_state, planned_state).await
    }

    /// Delete a resource.
    pub async fn delete(&self, resource_type: &str, current_state: Value) -> Result<(), ProviderError> {
        self.provider.delete(resource_type, current_state).await
    }

    /// Import by resource ID.
    pub async fn import_resource(
        &self,
        resource_type: &str,
        id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError> {
        self.provider.import_resource(resource_type, id).await
    }

    // =========================================================================
    // Data Source Operations
    // =========================================================================

    /// Validate a data source configuration, failing on error diagnostics.
    pub async fn validate_data_source_config(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<(), TestError> {
        let diagnostics = self
            .provider
            .validate_data_source_config(data_source_type, config)
            .await?;
        check_diagnostics(diagnostics)
    }

    /// Read a data source; invalid configuration is an error.
    pub async fn read_data_source(&self, data_source_type: &str, config: Value) -> Result<Value, ProviderError> {
        self.provider.read_data_source(data_source_type, config).await
    }

    // =========================================================================
    // Lifecycle Helpers
    // =========================================================================

    /// Plan, create and read back. Returns the refreshed state.
    pub async fn lifecycle_create(&self, resource_type: &str, config: Value) -> Result<Value, ProviderError> {
        let plan = self.plan_create(resource_type, config).await?;
        let created = self.create(resource_type, plan.planned_state).await?;
        self.read_existing(resource_type, created).await
    }

    /// Plan, update and read back. An empty plan skips the update; a plan
    /// that needs replacement is an error.
    pub async fn lifecycle_update(
        &self,
        resource_type: &str,
        prior_state: Value,
        config: Value,
    ) -> Result<Value, ProviderError> {
        let plan = self
            .plan_update(resource_type, prior_state.clone(), config)
            .await?;
        if plan.requires_replace {
            return Err(ProviderError::InvalidRequest(format!(
                "plan for {resource_type} requires replacement: {:?}",
                plan.replace_paths
            )));
        }
        if plan.changes.is_empty() {
            return self.read_existing(resource_type, prior_state).await;
        }

        let updated = self
            .update(resource_type, prior_state, plan.planned_state)
            .await?;
        self.read_existing(resource_type, updated).await
    }

    /// Plan, delete, then check that a read finds nothing.
    pub async fn lifecycle_delete(&self, resource_type: &str, current_state: Value) -> Result<(), ProviderError> {
        let _ = self.plan_delete(resource_type, current_state.clone()).await?;
        self.delete(resource_type, current_state.clone()).await?;

        match self.read(resource_type, current_state).await? {
            None => Ok(()),
            Some(_) => Err(ProviderError::Sdk(format!(
                "{resource_type} still exists after delete"
            ))),
        }
    }

    /// Create, update, delete. Returns the state after the update.
    pub async fn lifecycle_crud(
        &self,
        resource_type: &str,
        initial_config: Value,
        updated_config: Value,
    ) -> Result<Value, ProviderError> {
        let created = self.lifecycle_create(resource_type, initial_config).await?;
        let updated = self
            .lifecycle_update(resource_type, created, updated_config)
            .await?;
        self.lifecycle_delete(resource_type, updated.clone()).await?;
        Ok(updated)
    }

    async fn read_existing(&self, resource_type: &str, state: Value) -> Result<Value, ProviderError> {
        self.read(resource_type, state)
            .await?
            .ok_or_else(|| ProviderError::NotFound(format!("{resource_type} disappeared")))
    }
}

/// Why a tester call failed.
#[derive(Debug, thiserror::Error)]
pub enum TestError {
    /// Error diagnostics were returned.
    #[error("{} diagnostic(s): {}", .0.len(), describe(.0))]
    Diagnostics(Vec<Diagnostic>),
    /// The call itself failed.
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

fn describe(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(|d| {
            let mut line = d.summary.clone();
            if let Some(detail) = &d.detail {
                line = format!("{line}: {detail}");
            }
            match &d.attribute {
                Some(attr) => format!("{line} (at {attr})"),
                None => line,
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

fn check_diagnostics(diagnostics: Vec<Diagnostic>) -> Result<(), TestError> {
    let errors: Vec<_> = diagnostics.into_iter().filter(Diagnostic::is_error).collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(TestError::Diagnostics(errors))
    }
}

// =========================================================================
// Assertions
// =========================================================================

fn changed_paths(plan: &PlanResult) -> Vec<&str> {
    plan.changes.iter().map(|c| c.path.as_str()).collect()
}

/// Panics unless `plan` creates something new without replacing anything.
pub fn assert_plan_creates(plan: &PlanResult) {
    assert!(!plan.changes.is_empty(), "create plan is empty");
    assert!(!plan.requires_replace, "create plan replaces {:?}", plan.replace_paths);
}

/// Panics if `plan` changes anything.
pub fn assert_plan_no_changes(plan: &PlanResult) {
    assert!(plan.changes.is_empty(), "plan changes {:?}", changed_paths(plan));
}

/// Panics unless `plan` replaces the resource.
pub fn assert_plan_replaces(plan: &PlanResult) {
    assert!(
        plan.requires_replace,
        "plan updates {:?} in place instead of replacing",
        changed_paths(plan)
    );
}

/// Panics unless `plan` changes the resource without replacing it.
pub fn assert_plan_updates_in_place(plan: &PlanResult) {
    assert!(!plan.changes.is_empty(), "plan is empty");
    assert!(!plan.requires_replace, "plan replaces {:?}", plan.replace_paths);
}

/// Panics unless `plan` changes `path` (dotted, e.g. `sku.0.capacity`).
pub fn assert_plan_changes_attribute(plan: &PlanResult, path: &str) {
    let paths = changed_paths(plan);
    assert!(paths.contains(&path), "{path} unchanged; plan changes {paths:?}");
}

/// Panics if `plan` changes `path`.
pub fn assert_plan_does_not_change_attribute(plan: &PlanResult, path: &str) {
    assert!(!changed_paths(plan).contains(&path), "{path} changed unexpectedly");
}

fn errors(diagnostics: &[Diagnostic]) -> impl Iterator<Item = &Diagnostic> {
    diagnostics.iter().filter(|d| d.severity == DiagnosticSeverity::Error)
}

/// Panics on any error diagnostic. Warnings are fine.
pub fn assert_no_errors(diagnostics: &[Diagnostic]) {
    let summaries: Vec<&str> = errors(diagnostics).map(|d| d.summary.as_str()).collect();
    assert!(summaries.is_empty(), "unexpected errors: {summaries:?}");
}

/// Panics unless there is at least one error diagnostic.
pub fn assert_has_errors(diagnostics: &[Diagnostic]) {
    assert!(errors(diagnostics).next().is_some(), "no error diagnostics");
}

/// Panics unless an error diagnostic points at `attribute`.
pub fn assert_error_for_attribute(diagnostics: &[Diagnostic], attribute: &str) {
    let attributes: Vec<&str> = errors(diagnostics)
        .map(|d| d.attribute.as_deref().unwrap_or("<provider>"))
        .collect();
    assert!(
        attributes.contains(&attribute),
        "no error for {attribute}; errors are for {attributes:?}"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AttributeChange;
    use crate::AzureProvider;
    use serde_json::json;

    fn tester() -> ProviderTester<AzureProvider> {
        ProviderTester::new(AzureProvider::new().unwrap())
    }

    #[tokio::test]
    async fn test_tester_schema_and_types() {
        let tester = tester();
        assert!(tester.schema().resources.contains_key("azurerm_kusto_cluster"));
        assert_eq!(tester.resource_types().len(), 4);
        assert_eq!(tester.data_source_types().len(), 3);
    }

    #[tokio::test]
    async fn test_tester_validate_resource_config() {
        let tester = tester();
        tester
            .validate_resource_config(
                "azurerm_aadb2c_directory",
                json!({
                    "domain_name": "acctest123.onmicrosoft.com",
                    "resource_group_name": "acctestRG-b2c",
                    "data_residency_location": "United States",
                    "sku_name": "PremiumP1"
                }),
            )
            .await
            .unwrap();

        let err = tester
            .validate_resource_config("azurerm_aadb2c_directory", json!({"sku_name": "PremiumP1"}))
            .await
            .unwrap_err();
        match err {
            TestError::Diagnostics(diags) => {
                assert_error_for_attribute(&diags, "domain_name");
                assert_error_for_attribute(&diags, "data_residency_location");
            },
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_tester_plan_create() {
        let plan = tester()
            .plan_create(
                "azurerm_kusto_cluster",
                json!({
                    "name": "kustoprod01",
                    "resource_group_name": "rg-data",
                    "location": "westeurope",
                    "sku": [{"name": "Standard_D13_v2", "capacity": 2}]
                }),
            )
            .await
            .unwrap();
        assert_plan_creates(&plan);
        assert_plan_changes_attribute(&plan, "sku.0.name");
        assert_eq!(plan.planned_state["auto_stop_enabled"], json!(true));
    }

    #[test]
    fn test_assert_no_errors() {
        assert_no_errors(&[Diagnostic::warning("just a warning")]);
    }

    #[test]
    #[should_panic(expected = "unexpected errors")]
    fn test_assert_no_errors_fails() {
        assert_no_errors(&[Diagnostic::error("boom")]);
    }

    #[test]
    fn test_plan_assertions() {
        let plan = PlanResult::with_changes(
            json!({"sku_name": "PremiumP2"}),
            vec![AttributeChange::modified("sku_name", json!("PremiumP1"), json!("PremiumP2"))],
            false,
        );
        assert_plan_updates_in_place(&plan);
        assert_plan_changes_attribute(&plan, "sku_name");
        assert_plan_does_not_change_attribute(&plan, "tags");

        let replace = plan.with_replace_paths(vec!["domain_name".to_string()]);
        assert_plan_replaces(&replace);
    }

    #[test]
    fn test_test_error_display() {
        let err = TestError::Diagnostics(vec![Diagnostic::error("Invalid value")
            .with_detail("must be one of [\"PremiumP1\"]")
            .with_attribute("sku_name")]);
        let message = err.to_string();
        assert!(message.starts_with("1 diagnostic(s)"), "{message}");
        assert!(message.contains("(at sku_name)"));
        assert_has_errors(match &err {
            TestError::Diagnostics(d) => d,
            TestError::Provider(_) => unreachable!(),
        });
    }
}
