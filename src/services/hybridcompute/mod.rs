//! Azure Arc-enabled servers.

mod hybrid_compute_machine_data_source;
mod hybrid_compute_machine_resource;
mod hybrid_compute_machines_data_source;

use std::sync::Arc;

pub use hybrid_compute_machine_data_source::HybridComputeMachineDataSource;
pub use hybrid_compute_machine_resource::{
    HybridComputeMachineModel, HybridComputeMachineResource, IdentityModel,
};
pub use hybrid_compute_machines_data_source::{
    HybridComputeMachinesDataSource, HybridComputeMachinesModel, MachineSummary,
};

use crate::registry::ServiceRegistration;
use crate::resource::{DataSource, Resource};

/// Registration of the hybrid compute service.
pub struct Registration;

impl ServiceRegistration for Registration {
    fn name(&self) -> &'static str {
        "HybridCompute"
    }

    fn website_categories(&self) -> Vec<&'static str> {
        vec!["Hybrid Compute"]
    }

    fn associated_github_label(&self) -> &'static str {
        "service/hybrid-compute"
    }

    fn resources(&self) -> Vec<Arc<dyn Resource>> {
        vec![Arc::new(HybridComputeMachineResource)]
    }

    fn data_sources(&self) -> Vec<Arc<dyn DataSource>> {
        vec![
            Arc::new(HybridComputeMachineDataSource),
            Arc::new(HybridComputeMachinesDataSource),
        ]
    }
}
