use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::instrument;

use crate::api::deviceregistry::{Asset, AssetId, AssetProperties, AssetUpdate, CUSTOM_LOCATION};
use crate::api::{ExtendedLocation, IdParseError, ResourceId};
use crate::error::ProviderError;
use crate::resource::{Resource, ResourceMetaData};
use crate::schema::{Attribute, AttributeFlags, AttributeType, IdKind, Schema, Validator};
use crate::services::{commonschema, expand_tags, flatten_tags, normalize_location};

/// State of an `azurerm_device_registry_asset`.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceRegistryAssetModel {
    pub name: String,
    pub resource_group_name: String,
    pub location: String,
    pub extended_location_id: String,
    pub asset_endpoint_profile_ref: String,
    pub display_name: String,
    pub description: String,
    pub enabled: bool,
    pub external_asset_id: String,
    pub manufacturer: String,
    pub model: String,
    pub serial_number: String,
    pub documentation_uri: String,
    pub attributes: HashMap<String, String>,
    pub discovered_asset_refs: Vec<String>,
    pub tags: HashMap<String, String>,

    pub uuid: String,
    pub version: i64,
    pub provisioning_state: String,
}

impl Default for DeviceRegistryAssetModel {
    fn default() -> Self {
        Self {
            name: String::new(),
            resource_group_name: String::new(),
            location: String::new(),
            extended_location_id: String::new(),
            asset_endpoint_profile_ref: String::new(),
            display_name: String::new(),
            description: String::new(),
            enabled: true,
            external_asset_id: String::new(),
            manufacturer: String::new(),
            model: String::new(),
            serial_number: String::new(),
            documentation_uri: String::new(),
            attributes: HashMap::new(),
            discovered_asset_refs: Vec::new(),
            tags: HashMap::new(),
            uuid: String::new(),
            version: 0,
            provisioning_state: String::new(),
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    Some(value.to_string()).filter(|v| !v.is_empty())
}

fn expand_attributes(input: &HashMap<String, String>) -> Option<HashMap<String, Value>> {
    if input.is_empty() {
        return None;
    }
    Some(
        input
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect(),
    )
}

// Non-string values set outside this provider are kept as their JSON text.
fn flatten_attributes(input: Option<HashMap<String, Value>>) -> HashMap<String, String> {
    input
        .unwrap_or_default()
        .into_iter()
        .map(|(k, v)| match v {
            Value::String(s) => (k, s),
            other => (k, other.to_string()),
        })
        .collect()
}

fn expand_properties(model: &DeviceRegistryAssetModel) -> AssetProperties {
    AssetProperties {
        asset_endpoint_profile_ref: non_empty(&model.asset_endpoint_profile_ref),
        display_name: non_empty(&model.display_name),
        description: non_empty(&model.description),
        enabled: Some(model.enabled),
        external_asset_id: non_empty(&model.external_asset_id),
        manufacturer: non_empty(&model.manufacturer),
        model: non_empty(&model.model),
        serial_number: non_empty(&model.serial_number),
        documentation_uri: non_empty(&model.documentation_uri),
        attributes: expand_attributes(&model.attributes),
        discovered_asset_refs: Some(model.discovered_asset_refs.clone()).filter(|r| !r.is_empty()),
        ..Default::default()
    }
}

/// An industrial asset registered against a custom location.
pub struct DeviceRegistryAssetResource;

#[async_trait]
impl Resource for DeviceRegistryAssetResource {
    fn resource_type(&self) -> &'static str {
        "azurerm_device_registry_asset"
    }

    fn arguments(&self) -> Schema {
        Schema::v0()
            .with_attribute(
                "name",
                Attribute::required_string()
                    .with_force_new()
                    .with_validator(Validator::NotEmpty),
            )
            .with_attribute("resource_group_name", commonschema::resource_group_name())
            .with_attribute("location", commonschema::location())
            .with_attribute(
                "extended_location_id",
                Attribute::required_string()
                    .with_force_new()
                    .with_validator(Validator::ResourceId {
                        id_kind: IdKind::CustomLocation,
                    }),
            )
            .with_attribute(
                "asset_endpoint_profile_ref",
                Attribute::required_string()
                    .with_force_new()
                    .with_validator(Validator::NotEmpty),
            )
            .with_attribute("display_name", Attribute::optional_string())
            .with_attribute("description", Attribute::optional_string())
            .with_attribute("enabled", Attribute::optional_bool().with_default(json!(true)))
            .with_attribute(
                "external_asset_id",
                Attribute::optional_string()
                    .computed()
                    .with_force_new(),
            )
            .with_attribute("manufacturer", Attribute::optional_string())
            .with_attribute("model", Attribute::optional_string())
            .with_attribute("serial_number", Attribute::optional_string())
            .with_attribute("documentation_uri", Attribute::optional_string())
            .with_attribute(
                "attributes",
                Attribute::new(
                    AttributeType::map(AttributeType::String),
                    AttributeFlags::optional(),
                ),
            )
            .with_attribute(
                "discovered_asset_refs",
                Attribute::new(
                    AttributeType::list(AttributeType::String),
                    AttributeFlags::optional(),
                ),
            )
            .with_attribute("tags", commonschema::tags())
    }

    fn attributes(&self) -> Schema {
        Schema::v0()
            .with_attribute("uuid", Attribute::computed_string())
            .with_attribute("version", Attribute::computed_int64())
            .with_attribute("provisioning_state", Attribute::computed_string())
    }

    fn validate_id(&self, id: &str) -> Result<(), IdParseError> {
        AssetId::validate(id)
    }

    #[instrument(skip_all, fields(resource_type = self.resource_type()))]
    async fn create(&self, metadata: &mut ResourceMetaData) -> Result<(), ProviderError> {
        let model: DeviceRegistryAssetModel = metadata.decode()?;
        let client = metadata.client().device_registry.clone();
        let id = AssetId::new(metadata.subscription_id(), &model.resource_group_name, &model.name);

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

        let input = Asset {
            location: normalize_location(&model.location),
            extended_location: ExtendedLocation {
                name: Some(model.extended_location_id.clone()),
                kind: Some(CUSTOM_LOCATION.to_string()),
            },
            properties: Some(expand_properties(&model)),
            tags: expand_tags(&model.tags),
            ..Default::default()
        };

        client
            .create_or_replace_then_poll(&id, &input)
            .await
            .map_err(|e| ProviderError::api(format!("creating {id}"), e))?;

        metadata.set_id(&id);
        Ok(())
    }

    #[instrument(skip_all, fields(resource_type = self.resource_type()))]
    async fn read(&self, metadata: &mut ResourceMetaData) -> Result<(), ProviderError> {
        let id = AssetId::parse(metadata.id()?)?;

        let asset = match metadata.client().device_registry.get(&id).await {
            Ok(asset) => asset,
            Err(err) if err.was_not_found() => return metadata.mark_as_gone(&id),
            Err(err) => return Err(ProviderError::api(format!("retrieving {id}"), err)),
        };

        let props = asset.properties.unwrap_or_default();
        let state = DeviceRegistryAssetModel {
            name: id.asset_name.clone(),
            resource_group_name: id.resource_group_name.clone(),
            location: normalize_location(&asset.location),
            extended_location_id: asset.extended_location.name.unwrap_or_default(),
            asset_endpoint_profile_ref: props.asset_endpoint_profile_ref.unwrap_or_default(),
            display_name: props.display_name.unwrap_or_default(),
            description: props.description.unwrap_or_default(),
            enabled: props.enabled.unwrap_or(true),
            external_asset_id: props.external_asset_id.unwrap_or_default(),
            manufacturer: props.manufacturer.unwrap_or_default(),
            model: props.model.unwrap_or_default(),
            serial_number: props.serial_number.unwrap_or_default(),
            documentation_uri: props.documentation_uri.unwrap_or_default(),
            attributes: flatten_attributes(props.attributes),
            discovered_asset_refs: props.discovered_asset_refs.unwrap_or_default(),
            tags: flatten_tags(asset.tags),
            uuid: props.uuid.unwrap_or_default(),
            version: props.version.unwrap_or_default(),
            provisioning_state: props
                .provisioning_state
                .map(|s| s.to_string())
                .unwrap_or_default(),
        };

        metadata.encode(&state)
    }

    #[instrument(skip_all, fields(resource_type = self.resource_type()))]
    async fn update(&self, metadata: &mut ResourceMetaData) -> Result<(), ProviderError> {
        let id = AssetId::parse(metadata.id()?)?;
        let model: DeviceRegistryAssetModel = metadata.decode()?;

        let mut props = AssetProperties::default();
        if metadata.has_change("display_name") {
            props.display_name = Some(model.display_name.clone());
        }
        if metadata.has_change("description") {
            props.description = Some(model.description.clone());
        }
        if metadata.has_change("enabled") {
            props.enabled = Some(model.enabled);
        }
        if metadata.has_change("manufacturer") {
            props.manufacturer = Some(model.manufacturer.clone());
        }
        if metadata.has_change("model") {
            props.model = Some(model.model.clone());
        }
        if metadata.has_change("serial_number") {
            props.serial_number = Some(model.serial_number.clone());
        }
        if metadata.has_change("documentation_uri") {
            props.documentation_uri = Some(model.documentation_uri.clone());
        }
        if metadata.has_change("attributes") {
            props.attributes = Some(expand_attributes(&model.attributes).unwrap_or_default());
        }
        if metadata.has_change("discovered_asset_refs") {
            props.discovered_asset_refs = Some(model.discovered_asset_refs.clone());
        }

        let mut input = AssetUpdate::default();
        if props != AssetProperties::default() {
            input.properties = Some(props);
        }
        if metadata.has_change("tags") {
            input.tags = Some(model.tags);
        }

        if input == AssetUpdate::default() {
            return Ok(());
        }

        metadata
            .client()
            .device_registry
            .update_then_poll(&id, &input)
            .await
            .map_err(|e| ProviderError::api(format!("updating {id}"), e))
    }

    #[instrument(skip_all, fields(resource_type = self.resource_type()))]
    async fn delete(&self, metadata: &mut ResourceMetaData) -> Result<(), ProviderError> {
        let id = AssetId::parse(metadata.id()?)?;

        metadata
            .client()
            .device_registry
            .delete_then_poll(&id)
            .await
            .map_err(|e| ProviderError::api(format!("deleting {id}"), e))
    }
}
