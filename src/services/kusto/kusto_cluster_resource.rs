use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::instrument;

use crate::api::kusto::{
    AzureSku, AzureSkuName, Cluster, ClusterId, ClusterProperties, ClusterUpdate,
    PublicNetworkAccess,
};
use crate::api::{IdParseError, ResourceId};
use crate::error::ProviderError;
use crate::resource::{Resource, ResourceMetaData};
use crate::schema::{Attribute, AttributeFlags, AttributeType, Block, NestedBlock, Schema, Validator};
use crate::services::{commonschema, expand_tags, flatten_tags, normalize_location};

/// State of an `azurerm_kusto_cluster`.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KustoClusterModel {
    pub name: String,
    pub resource_group_name: String,
    pub location: String,
    pub sku: Vec<SkuModel>,
    pub public_network_access_enabled: bool,
    pub auto_stop_enabled: bool,
    pub disk_encryption_enabled: bool,
    pub streaming_ingestion_enabled: bool,
    pub purge_enabled: bool,
    pub tags: HashMap<String, String>,

    pub uri: String,
    pub data_ingestion_uri: String,
}

impl Default for KustoClusterModel {
    fn default() -> Self {
        Self {
            name: String::new(),
            resource_group_name: String::new(),
            location: String::new(),
            sku: Vec::new(),
            public_network_access_enabled: true,
            auto_stop_enabled: true,
            disk_encryption_enabled: false,
            streaming_ingestion_enabled: false,
            purge_enabled: false,
            tags: HashMap::new(),
            uri: String::new(),
            data_ingestion_uri: String::new(),
        }
    }
}

/// The `sku` block.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkuModel {
    pub name: String,
    pub capacity: i64,
}

fn expand_sku(input: &[SkuModel]) -> Result<AzureSku, ProviderError> {
    let sku = input
        .first()
        .ok_or_else(|| ProviderError::Validation("exactly one `sku` block is required".to_string()))?;
    let name = AzureSkuName::parse(&sku.name);
    Ok(AzureSku {
        tier: name.tier(),
        name,
        capacity: Some(sku.capacity).filter(|c| *c > 0),
    })
}

fn flatten_sku(sku: AzureSku) -> Vec<SkuModel> {
    vec![SkuModel {
        name: sku.name.to_string(),
        capacity: sku.capacity.unwrap_or_default(),
    }]
}

fn public_network_access(enabled: bool) -> PublicNetworkAccess {
    if enabled {
        PublicNetworkAccess::Enabled
    } else {
        PublicNetworkAccess::Disabled
    }
}

fn expand_properties(model: &KustoClusterModel) -> ClusterProperties {
    ClusterProperties {
        enable_auto_stop: Some(model.auto_stop_enabled),
        enable_disk_encryption: Some(model.disk_encryption_enabled),
        enable_streaming_ingest: Some(model.streaming_ingestion_enabled),
        enable_purge: Some(model.purge_enabled),
        public_network_access: Some(public_network_access(model.public_network_access_enabled)),
        ..Default::default()
    }
}

/// An Azure Data Explorer cluster.
pub struct KustoClusterResource;

#[async_trait]
impl Resource for KustoClusterResource {
    fn resource_type(&self) -> &'static str {
        "azurerm_kusto_cluster"
    }

    fn arguments(&self) -> Schema {
        Schema::v0()
            .with_attribute(
                "name",
                Attribute::required_string()
                    .with_force_new()
                    .with_validator(Validator::LengthBetween { min: 4, max: 22 })
                    .with_validator(Validator::Charset {
                        extra: String::new(),
                        lowercase: true,
                        leading_letter: true,
                    }),
            )
            .with_attribute("resource_group_name", commonschema::resource_group_name())
            .with_attribute("location", commonschema::location())
            .with_block(
                "sku",
                NestedBlock::single(
                    Block::new()
                        .with_attribute(
                            "name",
                            Attribute::required_string()
                                .with_validator(Validator::one_of(AzureSkuName::possible_values())),
                        )
                        .with_attribute(
                            "capacity",
                            Attribute::new(AttributeType::Int64, AttributeFlags::optional_computed())
                                .with_validator(Validator::IntBetween { min: 2, max: 1000 }),
                        ),
                )
                .required(),
            )
            .with_attribute(
                "public_network_access_enabled",
                Attribute::optional_bool().with_default(json!(true)),
            )
            .with_attribute(
                "auto_stop_enabled",
                Attribute::optional_bool().with_default(json!(true)),
            )
            .with_attribute(
                "disk_encryption_enabled",
                Attribute::optional_bool().with_default(json!(false)),
            )
            .with_attribute(
                "streaming_ingestion_enabled",
                Attribute::optional_bool().with_default(json!(false)),
            )
            .with_attribute(
                "purge_enabled",
                Attribute::optional_bool().with_default(json!(false)),
            )
            .with_attribute("tags", commonschema::tags())
    }

    fn attributes(&self) -> Schema {
        Schema::v0()
            .with_attribute("uri", Attribute::computed_string())
            .with_attribute("data_ingestion_uri", Attribute::computed_string())
    }

    fn validate_id(&self, id: &str) -> Result<(), IdParseError> {
        ClusterId::validate(id)
    }

    #[instrument(skip_all, fields(resource_type = self.resource_type()))]
    async fn create(&self, metadata: &mut ResourceMetaData) -> Result<(), ProviderError> {
        let model: KustoClusterModel = metadata.decode()?;
        let client = metadata.client().kusto.clone();
        let id = ClusterId::new(metadata.subscription_id(), &model.resource_group_name, &model.name);

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

        let input = Cluster {
            id: None,
            name: None,
            location: normalize_location(&model.location),
            sku: expand_sku(&model.sku)?,
            properties: Some(expand_properties(&model)),
            tags: expand_tags(&model.tags),
        };

        client
            .create_or_update_then_poll(&id, &input)
            .await
            .map_err(|e| ProviderError::api(format!("creating {id}"), e))?;

        metadata.set_id(&id);
        Ok(())
    }

    #[instrument(skip_all, fields(resource_type = self.resource_type()))]
    async fn read(&self, metadata: &mut ResourceMetaData) -> Result<(), ProviderError> {
        let id = ClusterId::parse(metadata.id()?)?;

        let cluster = match metadata.client().kusto.get(&id).await {
            Ok(cluster) => cluster,
            Err(err) if err.was_not_found() => return metadata.mark_as_gone(&id),
            Err(err) => return Err(ProviderError::api(format!("retrieving {id}"), err)),
        };

        let props = cluster.properties.unwrap_or_default();
        let defaults = KustoClusterModel::default();
        let state = KustoClusterModel {
            name: id.cluster_name.clone(),
            resource_group_name: id.resource_group_name.clone(),
            location: normalize_location(&cluster.location),
            sku: flatten_sku(cluster.sku),
            public_network_access_enabled: props
                .public_network_access
                .map(|p| p == PublicNetworkAccess::Enabled)
                .unwrap_or(defaults.public_network_access_enabled),
            auto_stop_enabled: props.enable_auto_stop.unwrap_or(defaults.auto_stop_enabled),
            disk_encryption_enabled: props.enable_disk_encryption.unwrap_or_default(),
            streaming_ingestion_enabled: props.enable_streaming_ingest.unwrap_or_default(),
            purge_enabled: props.enable_purge.unwrap_or_default(),
            tags: flatten_tags(cluster.tags),
            uri: props.uri.unwrap_or_default(),
            data_ingestion_uri: props.data_ingestion_uri.unwrap_or_default(),
        };

        metadata.encode(&state)
    }

    #[instrument(skip_all, fields(resource_type = self.resource_type()))]
    async fn update(&self, metadata: &mut ResourceMetaData) -> Result<(), ProviderError> {
        let id = ClusterId::parse(metadata.id()?)?;
        let model: KustoClusterModel = metadata.decode()?;

        let mut input = ClusterUpdate::default();
        if metadata.has_change("sku") {
            input.sku = Some(expand_sku(&model.sku)?);
        }

        let mut props = ClusterProperties::default();
        if metadata.has_change("public_network_access_enabled") {
            props.public_network_access = Some(public_network_access(model.public_network_access_enabled));
        }
        if metadata.has_change("auto_stop_enabled") {
            props.enable_auto_stop = Some(model.auto_stop_enabled);
        }
        if metadata.has_change("disk_encryption_enabled") {
            props.enable_disk_encryption = Some(model.disk_encryption_enabled);
        }
        if metadata.has_change("streaming_ingestion_enabled") {
            props.enable_streaming_ingest = Some(model.streaming_ingestion_enabled);
        }
        if metadata.has_change("purge_enabled") {
            props.enable_purge = Some(model.purge_enabled);
        }
        if props != ClusterProperties::default() {
            input.properties = Some(props);
        }

        if metadata.has_change("tags") {
            input.tags = Some(model.tags);
        }

        if input == ClusterUpdate::default() {
            return Ok(());
        }

        metadata
            .client()
            .kusto
            .update_then_poll(&id, &input)
            .await
            .map_err(|e| ProviderError::api(format!("updating {id}"), e))
    }

    #[instrument(skip_all, fields(resource_type = self.resource_type()))]
    async fn delete(&self, metadata: &mut ResourceMetaData) -> Result<(), ProviderError> {
        let id = ClusterId::parse(metadata.id()?)?;

        metadata
            .client()
            .kusto
            .delete_then_poll(&id)
            .await
            .map_err(|e| ProviderError::api(format!("deleting {id}"), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::kusto::AzureSkuTier;
    use crate::validation::validate;

    fn config() -> serde_json::Value {
        json!({
            "name": "kustoprod01",
            "resource_group_name": "rg-data",
            "location": "westeurope",
            "sku": [{"name": "Standard_D13_v2", "capacity": 2}]
        })
    }

    #[test]
    fn test_schema() {
        let schema = KustoClusterResource.schema();
        assert!(validate(&schema, &config()).is_empty());

        let mut bad = config();
        bad["name"] = json!("Kusto-Prod");
        bad["sku"] = json!([{"name": "Standard_D13_v2", "capacity": 1}]);
        let diagnostics = validate(&schema, &bad);
        assert_eq!(diagnostics.len(), 2, "{diagnostics:?}");

        let mut missing_sku = config();
        if let Some(map) = missing_sku.as_object_mut() {
            map.remove("sku");
        }
        assert_eq!(validate(&schema, &missing_sku).len(), 1);
    }

    #[test]
    fn test_defaults() {
        let schema = KustoClusterResource.schema();
        assert_eq!(
            schema.block.attributes["public_network_access_enabled"].default,
            Some(json!(true))
        );
        assert_eq!(schema.block.attributes["purge_enabled"].default, Some(json!(false)));

        let model = KustoClusterModel::default();
        assert!(model.auto_stop_enabled);
        assert!(!model.streaming_ingestion_enabled);
    }

    #[test]
    fn test_expand_sku_derives_tier() {
        let dev = expand_sku(&[SkuModel {
            name: "Dev(No SLA)_Standard_E2a_v4".to_string(),
            capacity: 0,
        }])
        .unwrap();
        assert_eq!(dev.tier, AzureSkuTier::Basic);
        assert_eq!(dev.capacity, None);

        let standard = expand_sku(&[SkuModel {
            name: "Standard_E8ads_v5".to_string(),
            capacity: 4,
        }])
        .unwrap();
        assert_eq!(standard.tier, AzureSkuTier::Standard);
        assert_eq!(standard.capacity, Some(4));

        assert!(expand_sku(&[]).is_err());
    }

    #[test]
    fn test_expand_properties() {
        let model = KustoClusterModel {
            public_network_access_enabled: false,
            purge_enabled: true,
            ..Default::default()
        };
        let props = expand_properties(&model);
        assert_eq!(props.public_network_access, Some(PublicNetworkAccess::Disabled));
        assert_eq!(props.enable_purge, Some(true));
        assert_eq!(props.enable_auto_stop, Some(true));
    }
}
