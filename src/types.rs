//! Value types exchanged with the host: plans, imports and provider metadata.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A change to a single attribute during a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeChange {
    /// The path to the attribute that changed.
    pub path: String,
    /// The value before the change (None if creating).
    pub before: Option<Value>,
    /// The value after the change (None if removing).
    pub after: Option<Value>,
}

impl AttributeChange {
    /// Create a new attribute change.
    pub fn new(path: impl Into<String>, before: Option<Value>, after: Option<Value>) -> Self {
        Self {
            path: path.into(),
            before,
            after,
        }
    }

    /// A change for a new attribute.
    pub fn added(path: impl Into<String>, value: Value) -> Self {
        Self::new(path, None, Some(value))
    }

    /// A change for a removed attribute.
    pub fn removed(path: impl Into<String>, value: Value) -> Self {
        Self::new(path, Some(value), None)
    }

    /// A change for a modified attribute.
    pub fn modified(path: impl Into<String>, before: Value, after: Value) -> Self {
        Self::new(path, Some(before), Some(after))
    }
}

/// What applying a plan will do to the remote resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanAction {
    /// Nothing changes.
    NoOp,
    /// The resource is created.
    Create,
    /// The resource is updated in place.
    Update,
    /// The resource is deleted and created again.
    Replace,
    /// The resource is deleted.
    Delete,
}

/// The result of a plan operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanResult {
    /// The planned state after the operation.
    pub planned_state: Value,
    /// The list of attribute changes.
    pub changes: Vec<AttributeChange>,
    /// Whether the resource requires replacement.
    pub requires_replace: bool,
    /// Paths of the changed attributes that force replacement.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub replace_paths: Vec<String>,
}

impl PlanResult {
    /// A plan result with no changes.
    pub fn no_change(state: Value) -> Self {
        Self {
            planned_state: state,
            changes: Vec::new(),
            requires_replace: false,
            replace_paths: Vec::new(),
        }
    }

    /// A plan result with changes.
    pub fn with_changes(
        planned_state: Value,
        changes: Vec<AttributeChange>,
        requires_replace: bool,
    ) -> Self {
        Self {
            planned_state,
            changes,
            requires_replace,
            replace_paths: Vec::new(),
        }
    }

    /// Record the attributes that force replacement, marking the plan as a replace.
    pub fn with_replace_paths(mut self, paths: Vec<String>) -> Self {
        self.requires_replace = self.requires_replace || !paths.is_empty();
        self.replace_paths = paths;
        self
    }

    /// The action this plan implies.
    pub fn action(&self) -> PlanAction {
        if self.planned_state.is_null() {
            PlanAction::Delete
        } else if self.requires_replace {
            PlanAction::Replace
        } else if self.changes.is_empty() {
            PlanAction::NoOp
        } else if self.changes.iter().any(|c| c.path == "id" && c.before.is_none()) {
            PlanAction::Create
        } else {
            PlanAction::Update
        }
    }
}

/// A resource brought under management by import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportedResource {
    /// The resource type.
    pub resource_type: String,
    /// The imported state.
    pub state: Value,
}

impl ImportedResource {
    /// Create a new imported resource.
    pub fn new(resource_type: impl Into<String>, state: Value) -> Self {
        Self {
            resource_type: resource_type.into(),
            state,
        }
    }
}

/// Documentation metadata for one registered service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceMetadata {
    /// Display name of the service.
    pub name: String,
    /// Documentation categories the service's pages are listed under.
    pub website_categories: Vec<String>,
    /// Issue tracker label for the service.
    pub github_label: String,
}

/// Provider metadata returned by `metadata`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProviderMetadata {
    /// Resource type names, sorted.
    pub resources: Vec<String>,
    /// Data source type names, sorted.
    pub data_sources: Vec<String>,
    /// Registered services.
    pub services: Vec<ServiceMetadata>,
}
