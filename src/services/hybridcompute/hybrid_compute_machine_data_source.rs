use async_trait::async_trait;

use crate::api::hybridcompute::MachineId;
use crate::error::ProviderError;
use crate::resource::{DataSource, ResourceMetaData};
use crate::schema::{Attribute, AttributeFlags, AttributeType, Schema};
use crate::services::commonschema;

use super::hybrid_compute_machine_resource::{flatten_machine, machine_name, HybridComputeMachineModel};

/// Looks up an existing Arc-enabled server.
pub struct HybridComputeMachineDataSource;

#[async_trait]
impl DataSource for HybridComputeMachineDataSource {
    fn data_source_type(&self) -> &'static str {
        "azurerm_hybrid_compute_machine"
    }

    fn arguments(&self) -> Schema {
        Schema::v0()
            .with_attribute("name", machine_name())
            .with_attribute(
                "resource_group_name",
                commonschema::resource_group_name_for_data_source(),
            )
    }

    fn attributes(&self) -> Schema {
        Schema::v0()
            .with_attribute("location", commonschema::location_computed())
            .with_attribute("kind", Attribute::computed_string())
            .with_attribute("tags", commonschema::tags_computed())
            .with_attribute(
                "identity",
                Attribute::new(
                    AttributeType::list(AttributeType::object([
                        ("type", AttributeType::String),
                        ("principal_id", AttributeType::String),
                        ("tenant_id", AttributeType::String),
                    ])),
                    AttributeFlags::computed(),
                ),
            )
            .with_attribute("status", Attribute::computed_string())
            .with_attribute("agent_version", Attribute::computed_string())
            .with_attribute("os_name", Attribute::computed_string())
            .with_attribute("os_type", Attribute::computed_string())
            .with_attribute("agent_configuration_mode", Attribute::computed_string())
    }

    async fn read(&self, metadata: &mut ResourceMetaData) -> Result<(), ProviderError> {
        let model: HybridComputeMachineModel = metadata.decode()?;
        let id = MachineId::new(metadata.subscription_id(), &model.resource_group_name, &model.name);

        let machine = match metadata.client().hybrid_compute.get(&id).await {
            Ok(machine) => machine,
            Err(err) if err.was_not_found() => {
                return Err(ProviderError::NotFound(format!("{id} was not found")))
            },
            Err(err) => return Err(ProviderError::api(format!("retrieving {id}"), err)),
        };

        metadata.set_id(&id);
        metadata.encode(&flatten_machine(&id, machine))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema() {
        let schema = HybridComputeMachineDataSource.schema();
        assert!(schema.block.blocks.is_empty());
        assert!(schema.block.attributes["name"].flags.required);
        assert!(schema.block.attributes["identity"].flags.computed);
    }
}
