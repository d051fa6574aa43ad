use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::api::aadb2c::B2CDirectoryId;
use crate::error::ProviderError;
use crate::resource::{DataSource, ResourceMetaData};
use crate::schema::{Attribute, Schema, Validator};
use crate::services::{commonschema, flatten_tags};

/// State of the `azurerm_aadb2c_directory` data source.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AadB2cDirectoryDataSourceModel {
    pub domain_name: String,
    pub resource_group_name: String,

    pub billing_type: String,
    pub data_residency_location: String,
    pub effective_start_date: String,
    pub sku_name: String,
    pub tags: HashMap<String, String>,
    pub tenant_id: String,
}

/// Looks up an existing B2C tenant.
pub struct AadB2cDirectoryDataSource;

#[async_trait]
impl DataSource for AadB2cDirectoryDataSource {
    fn data_source_type(&self) -> &'static str {
        "azurerm_aadb2c_directory"
    }

    fn arguments(&self) -> Schema {
        Schema::v0()
            .with_attribute(
                "domain_name",
                Attribute::required_string().with_validator(Validator::NotEmpty),
            )
            .with_attribute(
                "resource_group_name",
                commonschema::resource_group_name_for_data_source(),
            )
    }

    fn attributes(&self) -> Schema {
        Schema::v0()
            .with_attribute("billing_type", Attribute::computed_string())
            .with_attribute("data_residency_location", Attribute::computed_string())
            .with_attribute("effective_start_date", Attribute::computed_string())
            .with_attribute("sku_name", Attribute::computed_string())
            .with_attribute("tags", commonschema::tags_computed())
            .with_attribute("tenant_id", Attribute::computed_string())
    }

    async fn read(&self, metadata: &mut ResourceMetaData) -> Result<(), ProviderError> {
        let model: AadB2cDirectoryDataSourceModel = metadata.decode()?;
        let id = B2CDirectoryId::new(
            metadata.subscription_id(),
            &model.resource_group_name,
            &model.domain_name,
        );

        let tenant = match metadata.client().aadb2c.get(&id).await {
            Ok(tenant) => tenant,
            Err(err) if err.was_not_found() => {
                return Err(ProviderError::NotFound(format!("{id} was not found")))
            },
            Err(err) => return Err(ProviderError::api(format!("retrieving {id}"), err)),
        };

        let billing = tenant.properties.billing_config.unwrap_or_default();
        let state = AadB2cDirectoryDataSourceModel {
            domain_name: id.directory_name.clone(),
            resource_group_name: id.resource_group_name.clone(),
            billing_type: billing
                .billing_type
                .map(|b| b.to_string())
                .unwrap_or_default(),
            data_residency_location: tenant
                .location
                .map(|l| l.to_string())
                .unwrap_or_default(),
            effective_start_date: billing.effective_start_date_utc.unwrap_or_default(),
            sku_name: tenant.sku.name.to_string(),
            tags: flatten_tags(tenant.tags),
            tenant_id: tenant.properties.tenant_id.unwrap_or_default(),
        };

        metadata.set_id(&id);
        metadata.encode(&state)
    }
}
