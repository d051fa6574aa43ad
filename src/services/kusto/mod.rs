//! Azure Data Explorer.

mod kusto_cluster_resource;

use std::sync::Arc;

pub use kusto_cluster_resource::{KustoClusterModel, KustoClusterResource, SkuModel};

use crate::registry::ServiceRegistration;
use crate::resource::Resource;

/// Registration of the Kusto service.
pub struct Registration;

impl ServiceRegistration for Registration {
    fn name(&self) -> &'static str {
        "Kusto"
    }

    fn website_categories(&self) -> Vec<&'static str> {
        vec!["Data Explorer"]
    }

    fn associated_github_label(&self) -> &'static str {
        "service/kusto"
    }

    fn resources(&self) -> Vec<Arc<dyn Resource>> {
        vec![Arc::new(KustoClusterResource)]
    }
}
