//! Resource and data source adapters, grouped by service.

use std::collections::HashMap;

use crate::registry::ServiceRegistration;
use crate::schema::{Attribute, AttributeFlags, AttributeType, Normalize, Validator};

pub mod aadb2c;
pub mod deviceregistry;
pub mod hybridcompute;
pub mod kusto;

/// Every service this crate ships.
pub fn registrations() -> Vec<Box<dyn ServiceRegistration>> {
    vec![
        Box::new(aadb2c::Registration),
        Box::new(hybridcompute::Registration),
        Box::new(kusto::Registration),
        Box::new(deviceregistry::Registration),
    ]
}

/// Schema pieces shared by every service.
pub(crate) mod commonschema {
    use super::*;

    /// Required resource group name argument.
    pub fn resource_group_name() -> Attribute {
        Attribute::required_string()
            .with_force_new()
            .with_validator(Validator::ResourceGroupName)
    }

    /// Resource group name argument of a data source.
    pub fn resource_group_name_for_data_source() -> Attribute {
        Attribute::required_string().with_validator(Validator::ResourceGroupName)
    }

    /// Required Azure region argument.
    pub fn location() -> Attribute {
        Attribute::required_string()
            .with_force_new()
            .with_validator(Validator::NotEmpty)
            .with_normalize(Normalize::Location)
    }

    /// Azure region returned by a data source.
    pub fn location_computed() -> Attribute {
        Attribute::computed_string()
    }

    /// Optional tags argument.
    pub fn tags() -> Attribute {
        Attribute::new(
            AttributeType::map(AttributeType::String),
            AttributeFlags::optional(),
        )
    }

    /// Tags returned by a data source.
    pub fn tags_computed() -> Attribute {
        Attribute::new(
            AttributeType::map(AttributeType::String),
            AttributeFlags::computed(),
        )
    }
}

/// Normalize an Azure region so `West Europe` and `westeurope` compare equal.
pub(crate) fn normalize_location(location: &str) -> String {
    Normalize::Location
        .apply(&serde_json::Value::String(location.to_string()))
        .as_str()
        .unwrap_or_default()
        .to_string()
}

/// Tags as sent to the API: absent when empty.
pub(crate) fn expand_tags(tags: &HashMap<String, String>) -> Option<HashMap<String, String>> {
    if tags.is_empty() {
        None
    } else {
        Some(tags.clone())
    }
}

/// Tags as stored in state: empty when the API returned none.
pub(crate) fn flatten_tags(tags: Option<HashMap<String, String>>) -> HashMap<String, String> {
    tags.unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_location() {
        assert_eq!(normalize_location("West Europe"), "westeurope");
        assert_eq!(normalize_location("eastus2"), "eastus2");
    }

    #[test]
    fn test_tags() {
        assert_eq!(expand_tags(&HashMap::new()), None);
        let tags = HashMap::from([("env".to_string(), "test".to_string())]);
        assert_eq!(expand_tags(&tags), Some(tags.clone()));
        assert_eq!(flatten_tags(Some(tags.clone())), tags);
        assert!(flatten_tags(None).is_empty());
    }
}
