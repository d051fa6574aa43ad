use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::api::hybridcompute::{
    ArcKindEnum, Identity, Machine, MachineId, MachineUpdate, ResourceIdentityType,
};
use crate::api::{IdParseError, ResourceId};
use crate::error::ProviderError;
use crate::resource::{Resource, ResourceMetaData};
use crate::schema::{Attribute, Block, NestedBlock, Schema, Validator};
use crate::services::{commonschema, expand_tags, flatten_tags, normalize_location};

/// State of an `azurerm_hybrid_compute_machine`.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HybridComputeMachineModel {
    pub name: String,
    pub resource_group_name: String,
    pub location: String,
    pub kind: String,
    pub identity: Vec<IdentityModel>,
    pub tags: HashMap<String, String>,

    pub status: String,
    pub agent_version: String,
    pub os_name: String,
    pub os_type: String,
    pub agent_configuration_mode: String,
}

/// The `identity` block.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityModel {
    #[serde(rename = "type")]
    pub identity_type: String,
    pub principal_id: String,
    pub tenant_id: String,
}

/// Machine names: letters, digits, `-`, `_` and `.`.
pub(crate) fn machine_name() -> Attribute {
    Attribute::required_string()
        .with_validator(Validator::LengthBetween { min: 1, max: 54 })
        .with_validator(Validator::Charset {
            extra: "-_.".to_string(),
            lowercase: false,
            leading_letter: false,
        })
}

fn expand_identity(input: &[IdentityModel]) -> Option<Identity> {
    input.first().map(|i| Identity {
        kind: ResourceIdentityType::parse(&i.identity_type),
        principal_id: None,
        tenant_id: None,
    })
}

fn flatten_identity(input: Option<Identity>) -> Vec<IdentityModel> {
    input
        .filter(|i| !i.kind.as_str().eq_ignore_ascii_case("None"))
        .map(|i| IdentityModel {
            identity_type: i.kind.to_string(),
            principal_id: i.principal_id.unwrap_or_default(),
            tenant_id: i.tenant_id.unwrap_or_default(),
        })
        .into_iter()
        .collect()
}

/// Flatten an API machine into state.
pub(crate) fn flatten_machine(id: &MachineId, machine: Machine) -> HybridComputeMachineModel {
    let properties = machine.properties.unwrap_or_default();
    HybridComputeMachineModel {
        name: id.machine_name.clone(),
        resource_group_name: id.resource_group_name.clone(),
        location: normalize_location(&machine.location),
        kind: machine.kind.map(|k| k.to_string()).unwrap_or_default(),
        identity: flatten_identity(machine.identity),
        tags: flatten_tags(machine.tags),
        status: properties
            .status
            .map(|s| s.to_string())
            .unwrap_or_default(),
        agent_version: properties.agent_version.unwrap_or_default(),
        os_name: properties.os_name.unwrap_or_default(),
        os_type: properties.os_type.unwrap_or_default(),
        agent_configuration_mode: properties
            .agent_configuration
            .and_then(|c| c.config_mode)
            .map(|m| m.to_string())
            .unwrap_or_default(),
    }
}

/// An Arc-enabled server.
pub struct HybridComputeMachineResource;

#[async_trait]
impl Resource for HybridComputeMachineResource {
    fn resource_type(&self) -> &'static str {
        "azurerm_hybrid_compute_machine"
    }

    fn arguments(&self) -> Schema {
        Schema::v0()
            .with_attribute("name", machine_name().with_force_new())
            .with_attribute("resource_group_name", commonschema::resource_group_name())
            .with_attribute("location", commonschema::location())
            .with_attribute(
                "kind",
                Attribute::optional_string()
                    .with_force_new()
                    .with_validator(Validator::one_of(ArcKindEnum::possible_values())),
            )
            .with_block(
                "identity",
                NestedBlock::single(
                    Block::new()
                        .with_attribute(
                            "type",
                            Attribute::required_string().with_validator(Validator::one_of(
                                ResourceIdentityType::possible_values(),
                            )),
                        )
                        .with_attribute("principal_id", Attribute::computed_string())
                        .with_attribute("tenant_id", Attribute::computed_string()),
                ),
            )
            .with_attribute("tags", commonschema::tags())
    }

    fn attributes(&self) -> Schema {
        Schema::v0()
            .with_attribute("status", Attribute::computed_string())
            .with_attribute("agent_version", Attribute::computed_string())
            .with_attribute("os_name", Attribute::computed_string())
            .with_attribute("os_type", Attribute::computed_string())
            .with_attribute("agent_configuration_mode", Attribute::computed_string())
    }

    fn validate_id(&self, id: &str) -> Result<(), IdParseError> {
        MachineId::validate(id)
    }

    #[instrument(skip_all, fields(resource_type = self.resource_type()))]
    async fn create(&self, metadata: &mut ResourceMetaData) -> Result<(), ProviderError> {
        let model: HybridComputeMachineModel = metadata.decode()?;
        let client = metadata.client().hybrid_compute.clone();
        let id = MachineId::new(metadata.subscription_id(), &model.resource_group_name, &model.name);

        match client.get(&id).await {
            Ok(_) => return Err(ProviderError::requires_import(self.resource_type(), id.id())),
            Err(err) if err.was_not_found() => {},
            Err(err) => {
                return Err(ProviderError::api(
                    format!("checking for presence of existing {id}"),
                    err,
                ))
            },
        }

        let input = Machine {
            location: normalize_location(&model.location),
            kind: Some(model.kind)
                .filter(|k| !k.is_empty())
                .map(|k| ArcKindEnum::parse(&k)),
            identity: expand_identity(&model.identity),
            tags: expand_tags(&model.tags),
            ..Default::default()
        };

        client
            .create_or_update(&id, &input)
            .await
            .map_err(|e| ProviderError::api(format!("creating {id}"), e))?;

        metadata.set_id(&id);
        Ok(())
    }

    #[instrument(skip_all, fields(resource_type = self.resource_type()))]
    async fn read(&self, metadata: &mut ResourceMetaData) -> Result<(), ProviderError> {
        let id = MachineId::parse(metadata.id()?)?;

        let machine = match metadata.client().hybrid_compute.get(&id).await {
            Ok(machine) => machine,
            Err(err) if err.was_not_found() => return metadata.mark_as_gone(&id),
            Err(err) => return Err(ProviderError::api(format!("retrieving {id}"), err)),
        };

        let state = flatten_machine(&id, machine);
        metadata.encode(&state)
    }

    #[instrument(skip_all, fields(resource_type = self.resource_type()))]
    async fn update(&self, metadata: &mut ResourceMetaData) -> Result<(), ProviderError> {
        let id = MachineId::parse(metadata.id()?)?;
        let model: HybridComputeMachineModel = metadata.decode()?;

        let mut input = MachineUpdate::default();
        if metadata.has_change("identity.0.type") {
            // Removing the block disables the identity.
            input.identity = Some(
                expand_identity(&model.identity).unwrap_or_else(|| Identity {
                    kind: ResourceIdentityType::parse("None"),
                    principal_id: None,
                    tenant_id: None,
                }),
            );
        }
        if metadata.has_change("tags") {
            input.tags = Some(model.tags);
        }

        if input == MachineUpdate::default() {
            return Ok(());
        }

        metadata
            .client()
            .hybrid_compute
            .update(&id, &input)
            .await
            .map_err(|e| ProviderError::api(format!("updating {id}"), e))
    }

    #[instrument(skip_all, fields(resource_type = self.resource_type()))]
    async fn delete(&self, metadata: &mut ResourceMetaData) -> Result<(), ProviderError> {
        let id = MachineId::parse(metadata.id()?)?;

        metadata
            .client()
            .hybrid_compute
            .delete(&id)
            .await
            .map_err(|e| ProviderError::api(format!("deleting {id}"), e))
    }
}
