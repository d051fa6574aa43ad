//! Azure Device Registry.

mod device_registry_asset_resource;

use std::sync::Arc;

pub use device_registry_asset_resource::{DeviceRegistryAssetModel, DeviceRegistryAssetResource};

use crate::registry::ServiceRegistration;
use crate::resource::Resource;

/// Registration of the device registry service.
pub struct Registration;

impl ServiceRegistration for Registration {
    fn name(&self) -> &'static str {
        "DeviceRegistry"
    }

    fn website_categories(&self) -> Vec<&'static str> {
        vec!["Device Registry"]
    }

    fn associated_github_label(&self) -> &'static str {
        "service/device-registry"
    }

    fn resources(&self) -> Vec<Arc<dyn Resource>> {
        vec![Arc::new(DeviceRegistryAssetResource)]
    }
}
