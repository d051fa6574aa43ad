use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::hybridcompute::{ArcKindEnum, Machine, MachineOperationPredicate};
use crate::api::ResourceGroupId;
use crate::error::ProviderError;
use crate::resource::{DataSource, ResourceMetaData};
use crate::schema::{Attribute, AttributeFlags, AttributeType, Schema, Validator};
use crate::services::{commonschema, normalize_location};

/// State of the `azurerm_hybrid_compute_machines` data source.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HybridComputeMachinesModel {
    pub resource_group_name: String,
    pub kind: String,
    pub machines: Vec<MachineSummary>,
}

/// One entry of `machines`.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineSummary {
    pub name: String,
    pub id: String,
    pub location: String,
    pub kind: String,
    pub status: String,
}

impl From<Machine> for MachineSummary {
    fn from(machine: Machine) -> Self {
        Self {
            name: machine.name.unwrap_or_default(),
            id: machine.id.unwrap_or_default(),
            location: normalize_location(&machine.location),
            kind: machine.kind.map(|k| k.to_string()).unwrap_or_default(),
            status: machine
                .properties
                .and_then(|p| p.status)
                .map(|s| s.to_string())
                .unwrap_or_default(),
        }
    }
}

/// Lists the Arc-enabled servers in a resource group.
pub struct HybridComputeMachinesDataSource;

#[async_trait]
impl DataSource for HybridComputeMachinesDataSource {
    fn data_source_type(&self) -> &'static str {
        "azurerm_hybrid_compute_machines"
    }

    fn arguments(&self) -> Schema {
        Schema::v0()
            .with_attribute(
                "resource_group_name",
                commonschema::resource_group_name_for_data_source(),
            )
            .with_attribute(
                "kind",
                Attribute::optional_string()
                    .with_validator(Validator::one_of_ignore_case(ArcKindEnum::possible_values())),
            )
    }

    fn attributes(&self) -> Schema {
        Schema::v0().with_attribute(
            "machines",
            Attribute::new(
                AttributeType::list(AttributeType::object([
                    ("name", AttributeType::String),
                    ("id", AttributeType::String),
                    ("location", AttributeType::String),
                    ("kind", AttributeType::String),
                    ("status", AttributeType::String),
                ])),
                AttributeFlags::computed(),
            ),
        )
    }

    async fn read(&self, metadata: &mut ResourceMetaData) -> Result<(), ProviderError> {
        let model: HybridComputeMachinesModel = metadata.decode()?;
        let id = ResourceGroupId::new(metadata.subscription_id(), &model.resource_group_name);

        let predicate = MachineOperationPredicate {
            kind: Some(model.kind.as_str())
                .filter(|k| !k.is_empty())
                .map(ArcKindEnum::parse),
            location: None,
        };

        let machines = metadata
            .client()
            .hybrid_compute
            .list_by_resource_group_complete_matching_predicate(&id, predicate)
            .await
            .map_err(|e| ProviderError::api(format!("listing machines in {id}"), e))?;
        debug!(count = machines.len(), "listed machines");

        let state = HybridComputeMachinesModel {
            machines: machines.into_iter().map(MachineSummary::from).collect(),
            ..model
        };

        metadata.set_id(&id);
        metadata.encode(&state)
    }
}
