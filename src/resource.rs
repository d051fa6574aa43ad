//! Typed resource and data source adapters.
//!
//! A [`Resource`] implements create, read, update and delete for one remote
//! resource type against a [`ResourceMetaData`], which carries the configured
//! clients, the input document, the prior state and the output state. The
//! provider dispatches to these traits; adapters never see raw host requests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::api::{IdParseError, ResourceId};
use crate::clients::Clients;
use crate::error::ProviderError;
use crate::plan::is_empty_value;
use crate::schema::{Attribute, Schema};

/// Upper bounds on how long each operation may take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    #[allow(missing_docs)]
    pub create: Duration,
    #[allow(missing_docs)]
    pub read: Duration,
    #[allow(missing_docs)]
    pub update: Duration,
    #[allow(missing_docs)]
    pub delete: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            create: Duration::from_secs(30 * 60),
            read: Duration::from_secs(5 * 60),
            update: Duration::from_secs(30 * 60),
            delete: Duration::from_secs(30 * 60),
        }
    }
}

/// Default timeout of a data source read.
pub const DATA_SOURCE_READ_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// A managed resource type.
#[async_trait]
pub trait Resource: Send + Sync {
    /// Type name, e.g. `azurerm_kusto_cluster`.
    fn resource_type(&self) -> &'static str;

    /// Attributes the user can set.
    fn arguments(&self) -> Schema;

    /// Attributes only the service sets.
    fn attributes(&self) -> Schema;

    /// Full schema: arguments, attributes and `id`.
    fn schema(&self) -> Schema {
        self.arguments()
            .merge(self.attributes())
            .with_attribute("id", Attribute::computed_string())
    }

    /// Operation timeouts.
    fn timeouts(&self) -> Timeouts {
        Timeouts::default()
    }

    /// Check that `id` is an ID of this resource type, for import.
    fn validate_id(&self, id: &str) -> Result<(), IdParseError>;

    /// Create the remote resource and set its ID.
    async fn create(&self, metadata: &mut ResourceMetaData) -> Result<(), ProviderError>;

    /// Refresh state from the remote resource, or mark it gone.
    async fn read(&self, metadata: &mut ResourceMetaData) -> Result<(), ProviderError>;

    /// Apply changed arguments in place.
    ///
    /// Resources whose every argument forces replacement keep this default.
    async fn update(&self, _metadata: &mut ResourceMetaData) -> Result<(), ProviderError> {
        Err(ProviderError::Unimplemented(format!(
            "{} does not support in-place updates",
            self.resource_type()
        )))
    }

    /// Delete the remote resource.
    async fn delete(&self, metadata: &mut ResourceMetaData) -> Result<(), ProviderError>;
}

/// A read-only data source type.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Type name, e.g. `azurerm_hybrid_compute_machines`.
    fn data_source_type(&self) -> &'static str;

    /// Attributes the user sets to select the object.
    fn arguments(&self) -> Schema;

    /// Attributes read from the service.
    fn attributes(&self) -> Schema;

    /// Full schema: arguments, attributes and `id`.
    fn schema(&self) -> Schema {
        self.arguments()
            .merge(self.attributes())
            .with_attribute("id", Attribute::computed_string())
    }

    /// Read timeout.
    fn timeout(&self) -> Duration {
        DATA_SOURCE_READ_TIMEOUT
    }

    /// Look the object up and encode it.
    async fn read(&self, metadata: &mut ResourceMetaData) -> Result<(), ProviderError>;
}

/// Everything an adapter needs for one operation.
#[derive(Debug)]
pub struct ResourceMetaData {
    clients: Arc<Clients>,
    resource_type: String,
    config: Value,
    prior: Option<Value>,
    id: Option<String>,
    state: Option<Value>,
    gone: bool,
}

impl ResourceMetaData {
    /// Start an operation on `config`, the planned or current document.
    pub fn new(clients: Arc<Clients>, resource_type: impl Into<String>, config: Value) -> Self {
        let id = config
            .get("id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .map(str::to_string);

        Self {
            clients,
            resource_type: resource_type.into(),
            config,
            prior: None,
            id,
            state: None,
            gone: false,
        }
    }

    /// Attach the prior state, used by [`has_change`](Self::has_change).
    pub fn with_prior(mut self, prior: Value) -> Self {
        if self.id.is_none() {
            self.id = prior
                .get("id")
                .and_then(Value::as_str)
                .filter(|id| !id.is_empty())
                .map(str::to_string);
        }
        self.prior = Some(prior);
        self
    }

    /// The configured service clients.
    pub fn client(&self) -> &Clients {
        &self.clients
    }

    /// The configured subscription.
    pub fn subscription_id(&self) -> &str {
        &self.clients.account.subscription_id
    }

    /// The resource type this operation is for.
    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    /// Decode the input document into a typed model.
    ///
    /// Null values are treated as absent so that models can rely on
    /// `#[serde(default)]` for unset arguments.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, ProviderError> {
        serde_json::from_value(strip_nulls(self.config.clone()))
            .map_err(|e| ProviderError::Decode(e.to_string()))
    }

    /// Write a typed model as the output state, adding the resource ID.
    pub fn encode<T: Serialize>(&mut self, model: &T) -> Result<(), ProviderError> {
        let mut state = serde_json::to_value(model)?;
        if let (Value::Object(map), Some(id)) = (&mut state, &self.id) {
            map.insert("id".to_string(), Value::String(id.clone()));
        }
        self.state = Some(state);
        self.gone = false;
        Ok(())
    }

    /// Record the ID of the remote resource.
    pub fn set_id<I: ResourceId>(&mut self, id: &I) {
        self.id = Some(id.id());
    }

    /// The stored resource ID.
    pub fn id(&self) -> Result<&str, ProviderError> {
        self.id
            .as_deref()
            .ok_or(ProviderError::InvalidId(IdParseError::Empty))
    }

    /// Whether the argument at `path` differs between the prior state and the input.
    ///
    /// `path` is dot separated, with list indexes as numbers (`sku.0.capacity`).
    /// Empty strings, lists and maps count as unset. Without a prior state
    /// every argument counts as changed.
    pub fn has_change(&self, path: &str) -> bool {
        let Some(prior) = &self.prior else {
            return true;
        };
        let before = lookup(prior, path).filter(|v| !is_empty_value(v));
        let after = lookup(&self.config, path).filter(|v| !is_empty_value(v));
        before != after
    }

    /// Signal that the remote resource no longer exists.
    pub fn mark_as_gone<I: ResourceId>(&mut self, id: &I) -> Result<(), ProviderError> {
        info!(resource_type = %self.resource_type, "{} was not found - removing from state", id);
        self.gone = true;
        self.state = None;
        Ok(())
    }

    /// Whether the last read found the resource missing.
    pub fn is_gone(&self) -> bool {
        self.gone
    }

    /// The output state: `None` when the resource is gone or nothing was encoded.
    pub fn into_state(self) -> Option<Value> {
        if self.gone {
            debug!(resource_type = %self.resource_type, "no state: resource gone");
            return None;
        }
        self.state
    }

    /// The stored ID, if any, without treating absence as an error.
    pub fn raw_id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(value, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

fn strip_nulls(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, strip_nulls(v)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(strip_nulls).collect()),
        other => other,
    }
}
