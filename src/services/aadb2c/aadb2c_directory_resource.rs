use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::api::aadb2c::{
    B2CDirectoryId, CreateTenant, CreateTenantProperties, CreateTenantRequestProperties, Location,
    Sku, SkuName, UpdateTenant,
};
use crate::api::{IdParseError, ResourceId};
use crate::error::ProviderError;
use crate::resource::{Resource, ResourceMetaData, Timeouts};
use crate::schema::{Attribute, Schema, Validator};
use crate::services::{commonschema, expand_tags, flatten_tags};

/// State of an `azurerm_aadb2c_directory`.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AadB2cDirectoryModel {
    pub domain_name: String,
    pub resource_group_name: String,
    pub data_residency_location: String,
    pub sku_name: String,
    pub country_code: String,
    pub display_name: String,
    pub tags: HashMap<String, String>,

    pub billing_type: String,
    pub effective_start_date: String,
    pub tenant_id: String,
}

/// An Azure AD B2C tenant.
pub struct AadB2cDirectoryResource;

#[async_trait]
impl Resource for AadB2cDirectoryResource {
    fn resource_type(&self) -> &'static str {
        "azurerm_aadb2c_directory"
    }

    fn arguments(&self) -> Schema {
        Schema::v0()
            .with_attribute(
                "domain_name",
                Attribute::required_string()
                    .with_force_new()
                    .with_validator(Validator::NotEmpty)
                    .with_description("Domain name of the B2C tenant, including the .onmicrosoft.com suffix."),
            )
            .with_attribute("resource_group_name", commonschema::resource_group_name())
            .with_attribute(
                "data_residency_location",
                Attribute::required_string()
                    .with_force_new()
                    .with_validator(Validator::one_of(Location::possible_values())),
            )
            .with_attribute(
                "sku_name",
                Attribute::required_string().with_validator(Validator::one_of(SkuName::possible_values())),
            )
            .with_attribute(
                "country_code",
                Attribute::optional_string()
                    .computed()
                    .with_force_new()
                    .with_validator(Validator::NotEmpty),
            )
            .with_attribute(
                "display_name",
                Attribute::optional_string()
                    .computed()
                    .with_force_new()
                    .with_validator(Validator::NotEmpty),
            )
            .with_attribute("tags", commonschema::tags())
    }

    fn attributes(&self) -> Schema {
        Schema::v0()
            .with_attribute("billing_type", Attribute::computed_string())
            .with_attribute("effective_start_date", Attribute::computed_string())
            .with_attribute("tenant_id", Attribute::computed_string())
    }

    fn timeouts(&self) -> Timeouts {
        Timeouts {
            create: Duration::from_secs(60 * 60),
            update: Duration::from_secs(60 * 60),
            delete: Duration::from_secs(60 * 60),
            ..Timeouts::default()
        }
    }

    fn validate_id(&self, id: &str) -> Result<(), IdParseError> {
        B2CDirectoryId::validate(id)
    }

    #[instrument(skip_all, fields(resource_type = self.resource_type()))]
    async fn create(&self, metadata: &mut ResourceMetaData) -> Result<(), ProviderError> {
        let model: AadB2cDirectoryModel = metadata.decode()?;
        let client = metadata.client().aadb2c.clone();
        let id = B2CDirectoryId::new(
            metadata.subscription_id(),
            &model.resource_group_name,
            &model.domain_name,
        );

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

        let input = CreateTenant {
            location: Location::parse(&model.data_residency_location),
            properties: CreateTenantRequestProperties {
                create_tenant_properties: CreateTenantProperties {
                    country_code: Some(model.country_code).filter(|v| !v.is_empty()),
                    display_name: Some(model.display_name).filter(|v| !v.is_empty()),
                },
            },
            sku: Sku::new(SkuName::parse(&model.sku_name)),
            tags: expand_tags(&model.tags),
        };

        client
            .create_then_poll(&id, &input)
            .await
            .map_err(|e| ProviderError::api(format!("creating {id}"), e))?;

        metadata.set_id(&id);
        Ok(())
    }

    #[instrument(skip_all, fields(resource_type = self.resource_type()))]
    async fn read(&self, metadata: &mut ResourceMetaData) -> Result<(), ProviderError> {
        let id = B2CDirectoryId::parse(metadata.id()?)?;
        let client = metadata.client().aadb2c.clone();

        let tenant = match client.get(&id).await {
            Ok(tenant) => tenant,
            Err(err) if err.was_not_found() => return metadata.mark_as_gone(&id),
            Err(err) => return Err(ProviderError::api(format!("retrieving {id}"), err)),
        };

        // The API never returns these; keep what the user configured.
        let existing: AadB2cDirectoryModel = metadata.decode()?;

        let mut state = AadB2cDirectoryModel {
            domain_name: id.directory_name.clone(),
            resource_group_name: id.resource_group_name.clone(),
            country_code: existing.country_code,
            display_name: existing.display_name,
            sku_name: tenant.sku.name.to_string(),
            data_residency_location: tenant
                .location
                .map(|l| l.to_string())
                .unwrap_or_default(),
            tags: flatten_tags(tenant.tags),
            ..Default::default()
        };

        if let Some(billing) = tenant.properties.billing_config {
            state.billing_type = billing
                .billing_type
                .map(|b| b.to_string())
                .unwrap_or_default();
            state.effective_start_date = billing.effective_start_date_utc.unwrap_or_default();
        }
        state.tenant_id = tenant.properties.tenant_id.unwrap_or_default();

        metadata.encode(&state)
    }

    #[instrument(skip_all, fields(resource_type = self.resource_type()))]
    async fn update(&self, metadata: &mut ResourceMetaData) -> Result<(), ProviderError> {
        let id = B2CDirectoryId::parse(metadata.id()?)?;
        let model: AadB2cDirectoryModel = metadata.decode()?;

        let mut input = UpdateTenant::default();
        if metadata.has_change("sku_name") {
            input.sku = Some(Sku::new(SkuName::parse(&model.sku_name)));
        }
        if metadata.has_change("tags") {
            input.tags = Some(model.tags);
        }

        if input == UpdateTenant::default() {
            return Ok(());
        }

        metadata
            .client()
            .aadb2c
            .update(&id, &input)
            .await
            .map_err(|e| ProviderError::api(format!("updating {id}"), e))
    }

    #[instrument(skip_all, fields(resource_type = self.resource_type()))]
    async fn delete(&self, metadata: &mut ResourceMetaData) -> Result<(), ProviderError> {
        let id = B2CDirectoryId::parse(metadata.id()?)?;

        metadata
            .client()
            .aadb2c
            .delete_then_poll(&id)
            .await
            .map_err(|e| ProviderError::api(format!("deleting {id}"), e))
    }
}
