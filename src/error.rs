//! Error types for the Azure provider.

use thiserror::Error;

use crate::api::{ApiError, IdParseError};

/// Errors that can occur while serving a provider operation.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The requested resource was not found.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// A validation error occurred.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The configuration could not be decoded into the resource model.
    #[error("decoding: {0}")]
    Decode(String),

    /// An internal SDK error occurred.
    #[error("SDK error: {0}")]
    Sdk(String),

    /// A configuration error occurred.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An operation was requested before `configure` succeeded.
    #[error("provider is not configured: call configure before managing resources")]
    NotConfigured,

    /// The requested resource type is unknown.
    #[error("Unknown resource type: {0}")]
    UnknownResource(String),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored resource ID could not be parsed.
    #[error("parsing resource ID: {0}")]
    InvalidId(#[from] IdParseError),

    /// A call against the Resource Manager API failed.
    #[error("{context}: {source}")]
    Api {
        /// What was being attempted, including the resource ID.
        context: String,
        /// The underlying API error.
        #[source]
        source: ApiError,
    },

    /// The resource already exists remotely and must be imported first.
    #[error(
        "A resource with the ID {id:?} already exists - to be managed via this provider \
         this resource needs to be imported into the state. Please see the resource \
         documentation for {resource_type:?} for more information."
    )]
    RequiresImport {
        /// The resource type being created.
        resource_type: String,
        /// The ID of the existing remote resource.
        id: String,
    },

    /// Operation timed out.
    #[error("Deadline exceeded: {0}")]
    DeadlineExceeded(String),

    /// Operation not implemented.
    #[error("Unimplemented: {0}")]
    Unimplemented(String),

    /// Invalid request from client.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ProviderError {
    /// Wrap an API error with the operation and resource it concerns.
    pub fn api(context: impl Into<String>, source: ApiError) -> Self {
        Self::Api {
            context: context.into(),
            source,
        }
    }

    /// Build the error returned when create finds an existing remote resource.
    pub fn requires_import(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::RequiresImport {
            resource_type: resource_type.into(),
            id: id.into(),
        }
    }

    /// Whether this error is the "already exists, import it" error.
    pub fn is_requires_import(&self) -> bool {
        matches!(self, Self::RequiresImport { .. })
    }

    /// Whether this error wraps an HTTP 404 from the API.
    pub fn was_not_found(&self) -> bool {
        match self {
            Self::NotFound(_) => true,
            Self::Api { source, .. } => source.was_not_found(),
            _ => false,
        }
    }

    /// Get the error message as a string.
    pub fn message(&self) -> String {
        match self {
            Self::NotFound(msg)
            | Self::Validation(msg)
            | Self::Decode(msg)
            | Self::Sdk(msg)
            | Self::Configuration(msg)
            | Self::UnknownResource(msg)
            | Self::DeadlineExceeded(msg)
            | Self::Unimplemented(msg)
            | Self::InvalidRequest(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}
