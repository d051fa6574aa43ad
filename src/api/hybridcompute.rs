//! Arc-enabled servers (`Microsoft.HybridCompute/machines`, 2024-07-10).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::enums::open_enum;
use super::resource_ids::resource_id;
use super::{ApiError, ResourceGroupId, ResourceId, ResourceManagerClient};

/// API version of this package.
pub const API_VERSION: &str = "2024-07-10";

resource_id! {
    /// An Arc-enabled machine.
    pub struct MachineId("Machine") {
        "subscriptions" => subscription_id,
        "resourceGroups" => resource_group_name,
        "providers/Microsoft.HybridCompute/machines" => machine_name,
    }
}

open_enum! {
    /// The platform hosting the machine.
    pub enum ArcKindEnum {
        Avs => "AVS",
        Aws => "AWS",
        Eps => "EPS",
        Gcp => "GCP",
        Hci => "HCI",
        Scvmm => "SCVMM",
        VMware => "VMware",
    }
}

open_enum! {
    /// Connection status of the machine's agent.
    pub enum StatusTypes {
        Connected => "Connected",
        Disconnected => "Disconnected",
        Error => "Error",
    }
}

open_enum! {
    /// Whether every agent extension and feature is enabled.
    pub enum AgentConfigurationMode {
        Full => "full",
        Monitor => "monitor",
    }
}

open_enum! {
    /// Managed identity type of the machine.
    pub enum ResourceIdentityType {
        SystemAssigned => "SystemAssigned",
    }
}

/// System-assigned identity of a machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    #[serde(rename = "type")]
    #[allow(missing_docs)]
    pub kind: ResourceIdentityType,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal_id: Option<String>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
}

impl Identity {
    /// A system-assigned identity request.
    pub fn system_assigned() -> Self {
        Self {
            kind: ResourceIdentityType::SystemAssigned,
            principal_id: None,
            tenant_id: None,
        }
    }
}

/// Agent settings reported by the machine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentConfiguration {
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_mode: Option<AgentConfigurationMode>,
}

/// Machine properties. Everything here is reported by the agent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineProperties {
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<StatusTypes>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_version: Option<String>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os_name: Option<String>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os_type: Option<String>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_configuration: Option<AgentConfiguration>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
}

/// A machine resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Machine {
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[allow(missing_docs)]
    pub location: String,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ArcKindEnum>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<Identity>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<MachineProperties>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<HashMap<String, String>>,
}

/// Body of an update request. Unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineUpdate {
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<Identity>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<HashMap<String, String>>,
}

/// Filters a machine list on the client side.
#[derive(Debug, Clone, Default)]
pub struct MachineOperationPredicate {
    /// Keep machines of this kind only.
    pub kind: Option<ArcKindEnum>,
    /// Keep machines in this location only.
    pub location: Option<String>,
}

impl MachineOperationPredicate {
    /// Whether `machine` passes every filter that is set.
    pub fn matches(&self, machine: &Machine) -> bool {
        if let Some(kind) = &self.kind {
            if machine.kind.as_ref() != Some(kind) {
                return false;
            }
        }
        if let Some(location) = &self.location {
            if !machine.location.eq_ignore_ascii_case(location) {
                return false;
            }
        }
        true
    }
}

/// Typed client for machines.
#[derive(Debug, Clone)]
pub struct MachinesClient {
    inner: ResourceManagerClient,
}

impl MachinesClient {
    #[allow(missing_docs)]
    pub fn new(inner: ResourceManagerClient) -> Self {
        Self { inner }
    }

    /// Retrieve a machine.
    pub async fn get(&self, id: &MachineId) -> Result<Machine, ApiError> {
        self.inner.get(&id.id(), API_VERSION).await
    }

    /// Create or replace a machine.
    pub async fn create_or_update(&self, id: &MachineId, input: &Machine) -> Result<(), ApiError> {
        self.inner.put_then_poll(&id.id(), API_VERSION, input).await
    }

    /// Change the identity or tags of a machine.
    pub async fn update(&self, id: &MachineId, input: &MachineUpdate) -> Result<(), ApiError> {
        self.inner.patch_then_poll(&id.id(), API_VERSION, input).await
    }

    /// Delete a machine.
    pub async fn delete(&self, id: &MachineId) -> Result<(), ApiError> {
        self.inner.delete_then_poll(&id.id(), API_VERSION).await
    }

    /// List every machine in a resource group that matches `predicate`.
    pub async fn list_by_resource_group_complete_matching_predicate(
        &self,
        id: &ResourceGroupId,
        predicate: MachineOperationPredicate,
    ) -> Result<Vec<Machine>, ApiError> {
        let path = format!("{}/providers/Microsoft.HybridCompute/machines", id.id());
        self.inner
            .list_complete_matching_predicate(&path, API_VERSION, move |m: &Machine| {
                predicate.matches(m)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine(kind: Option<&str>, location: &str) -> Machine {
        Machine {
            location: location.to_string(),
            kind: kind.map(ArcKindEnum::parse),
            ..Default::default()
        }
    }

    #[test]
    fn test_predicate() {
        let any = MachineOperationPredicate::default();
        assert!(any.matches(&machine(None, "westeurope")));

        let aws = MachineOperationPredicate {
            kind: Some(ArcKindEnum::Aws),
            location: None,
        };
        assert!(aws.matches(&machine(Some("aws"), "westeurope")));
        assert!(!aws.matches(&machine(Some("GCP"), "westeurope")));
        assert!(!aws.matches(&machine(None, "westeurope")));

        let located = MachineOperationPredicate {
            kind: None,
            location: Some("WestEurope".to_string()),
        };
        assert!(located.matches(&machine(None, "westeurope")));
        assert!(!located.matches(&machine(None, "eastus")));
    }

    #[test]
    fn test_machine_decodes_agent_fields() {
        let machine: Machine = serde_json::from_value(serde_json::json!({
            "id": "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.HybridCompute/machines/m1",
            "name": "m1",
            "location": "westeurope",
            "kind": "HCI",
            "identity": {"type": "SystemAssigned", "principalId": "p", "tenantId": "t"},
            "properties": {
                "status": "Connected",
                "agentVersion": "1.40",
                "osName": "linux",
                "osType": "linux",
                "agentConfiguration": {"configMode": "full"}
            }
        }))
        .unwrap();
        assert_eq!(machine.kind, Some(ArcKindEnum::Hci));
        let properties = machine.properties.unwrap();
        assert_eq!(properties.status, Some(StatusTypes::Connected));
        assert_eq!(
            properties.agent_configuration.unwrap().config_mode,
            Some(AgentConfigurationMode::Full)
        );
    }
}
