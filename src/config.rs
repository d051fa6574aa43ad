//! Provider configuration.
//!
//! Values come from the host's provider block. Anything left unset falls back
//! to the matching `ARM_*` environment variable.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::api::{ClientOptions, DEFAULT_ENDPOINT};
use crate::error::ProviderError;
use crate::schema::{Attribute, Diagnostic, Schema, Validator};

/// Environment variable holding the subscription ID.
pub const ENV_SUBSCRIPTION_ID: &str = "ARM_SUBSCRIPTION_ID";
/// Environment variable holding the tenant ID.
pub const ENV_TENANT_ID: &str = "ARM_TENANT_ID";
/// Environment variable holding the bearer token.
pub const ENV_ACCESS_TOKEN: &str = "ARM_ACCESS_TOKEN";
/// Environment variable overriding the Resource Manager endpoint.
pub const ENV_RESOURCE_MANAGER_ENDPOINT: &str = "ARM_RESOURCE_MANAGER_ENDPOINT";

/// Poll interval used when neither the service nor the configuration sets one.
pub const DEFAULT_POLL_INTERVAL_SECONDS: u64 = 10;

/// Configuration of the provider block.
#[derive(Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderConfig {
    /// Subscription resources are managed in.
    pub subscription_id: Option<String>,
    /// Tenant the subscription belongs to.
    pub tenant_id: Option<String>,
    /// Bearer token for the Resource Manager API.
    pub access_token: Option<String>,
    /// Resource Manager endpoint, for sovereign clouds or tests.
    pub resource_manager_endpoint: Option<String>,
    /// Seconds between polls of long-running operations.
    pub default_poll_interval_seconds: Option<u64>,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("subscription_id", &self.subscription_id)
            .field("tenant_id", &self.tenant_id)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("resource_manager_endpoint", &self.resource_manager_endpoint)
            .field(
                "default_poll_interval_seconds",
                &self.default_poll_interval_seconds,
            )
            .finish()
    }
}

impl ProviderConfig {
    /// Schema of the provider block.
    pub fn schema() -> Schema {
        Schema::v0()
            .with_attribute(
                "subscription_id",
                Attribute::optional_string()
                    .with_description(format!("Subscription ID. Defaults to {ENV_SUBSCRIPTION_ID}."))
                    .with_validator(Validator::NotEmpty),
            )
            .with_attribute(
                "tenant_id",
                Attribute::optional_string()
                    .with_description(format!("Tenant ID. Defaults to {ENV_TENANT_ID}.")),
            )
            .with_attribute(
                "access_token",
                Attribute::optional_string()
                    .sensitive()
                    .with_description(format!("Bearer token. Defaults to {ENV_ACCESS_TOKEN}.")),
            )
            .with_attribute(
                "resource_manager_endpoint",
                Attribute::optional_string().with_description(format!(
                    "Resource Manager endpoint. Defaults to {ENV_RESOURCE_MANAGER_ENDPOINT} or {DEFAULT_ENDPOINT}."
                )),
            )
            .with_attribute(
                "default_poll_interval_seconds",
                Attribute::optional_int64()
                    .with_default(Value::from(DEFAULT_POLL_INTERVAL_SECONDS))
                    .with_validator(Validator::IntBetween { min: 0, max: 3600 }),
            )
    }

    /// Decode the provider block and fill unset values from the environment.
    pub fn from_value(value: &Value) -> Result<Self, ProviderError> {
        let config: Self = match value {
            Value::Null => Self::default(),
            other => serde_json::from_value(other.clone())
                .map_err(|e| ProviderError::Configuration(e.to_string()))?,
        };
        Ok(config.with_env_fallback())
    }

    /// Fill unset values from the `ARM_*` environment variables.
    pub fn with_env_fallback(mut self) -> Self {
        fn env(name: &str) -> Option<String> {
            std::env::var(name).ok().filter(|v| !v.is_empty())
        }

        self.subscription_id = self.subscription_id.or_else(|| env(ENV_SUBSCRIPTION_ID));
        self.tenant_id = self.tenant_id.or_else(|| env(ENV_TENANT_ID));
        self.access_token = self.access_token.or_else(|| env(ENV_ACCESS_TOKEN));
        self.resource_manager_endpoint = self
            .resource_manager_endpoint
            .or_else(|| env(ENV_RESOURCE_MANAGER_ENDPOINT));
        self
    }

    /// Check that the configuration is complete.
    pub fn validate(&self) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();

        if self.subscription_id.as_deref().map_or(true, str::is_empty) {
            diagnostics.push(
                Diagnostic::error("Missing subscription ID")
                    .with_detail(format!(
                        "Set subscription_id in the provider block or the {ENV_SUBSCRIPTION_ID} environment variable"
                    ))
                    .with_attribute("subscription_id"),
            );
        }

        if self.access_token.as_deref().map_or(true, str::is_empty) {
            diagnostics.push(
                Diagnostic::error("Missing access token")
                    .with_detail(format!(
                        "Set access_token in the provider block or the {ENV_ACCESS_TOKEN} environment variable"
                    ))
                    .with_attribute("access_token"),
            );
        }

        if let Some(endpoint) = &self.resource_manager_endpoint {
            if let Err(err) = Url::parse(endpoint) {
                diagnostics.push(
                    Diagnostic::error("Invalid Resource Manager endpoint")
                        .with_detail(format!("{endpoint:?}: {err}"))
                        .with_attribute("resource_manager_endpoint"),
                );
            }
        }

        if self.tenant_id.is_none() {
            diagnostics.push(
                Diagnostic::warning("No tenant ID configured")
                    .with_detail("Computed tenant attributes will only be populated from API responses")
                    .with_attribute("tenant_id"),
            );
        }

        diagnostics
    }

    /// Interval between polls of long-running operations.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(
            self.default_poll_interval_seconds
                .unwrap_or(DEFAULT_POLL_INTERVAL_SECONDS),
        )
    }

    /// Options for the API client.
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            endpoint: self
                .resource_manager_endpoint
                .clone()
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            access_token: self.access_token.clone().unwrap_or_default(),
            default_poll_interval: self.poll_interval(),
            ..ClientOptions::default()
        }
    }
}
