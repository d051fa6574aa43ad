//! Azure AD B2C.

mod aadb2c_directory_data_source;
mod aadb2c_directory_resource;

use std::sync::Arc;

pub use aadb2c_directory_data_source::{AadB2cDirectoryDataSource, AadB2cDirectoryDataSourceModel};
pub use aadb2c_directory_resource::{AadB2cDirectoryModel, AadB2cDirectoryResource};

use crate::registry::ServiceRegistration;
use crate::resource::{DataSource, Resource};

/// Registration of the B2C service.
pub struct Registration;

impl ServiceRegistration for Registration {
    fn name(&self) -> &'static str {
        "AadB2c"
    }

    fn website_categories(&self) -> Vec<&'static str> {
        vec!["Azure Active Directory B2C"]
    }

    fn associated_github_label(&self) -> &'static str {
        "service/aadb2c"
    }

    fn resources(&self) -> Vec<Arc<dyn Resource>> {
        vec![Arc::new(AadB2cDirectoryResource)]
    }

    fn data_sources(&self) -> Vec<Arc<dyn DataSource>> {
        vec![Arc::new(AadB2cDirectoryDataSource)]
    }
}
