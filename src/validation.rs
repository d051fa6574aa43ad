//! Validation of configuration values against a [`Schema`].
//!
//! Checks presence of required arguments, value types, nested block item
//! counts and every [`Validator`] attached to an attribute, returning one
//! [`Diagnostic`] per problem.
//!
//! # Example
//!
//! ```
//! use azurerm_provider::schema::{Attribute, Schema, Validator};
//! use azurerm_provider::validation::validate;
//! use serde_json::json;
//!
//! let schema = Schema::v0().with_attribute(
//!     "sku_name",
//!     Attribute::required_string().with_validator(Validator::one_of(&["PremiumP1", "PremiumP2"])),
//! );
//!
//! assert!(validate(&schema, &json!({"sku_name": "PremiumP1"})).is_empty());
//!
//! let diagnostics = validate(&schema, &json!({"sku_name": "Free"}));
//! assert_eq!(diagnostics.len(), 1);
//! assert_eq!(diagnostics[0].attribute, Some("sku_name".to_string()));
//! ```

use serde_json::Value;

use crate::api::{CustomLocationId, ResourceGroupId};
use crate::schema::{Attribute, AttributeType, Block, Diagnostic, IdKind, NestedBlock, Schema, Validator};

/// Validate a JSON value against a schema.
///
/// Returns an empty list when the value is valid. Computed-only attributes
/// are skipped since the provider sets them.
pub fn validate(schema: &Schema, value: &Value) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    validate_block(&schema.block, value, "", &mut diagnostics);
    diagnostics
}

/// Validate a JSON value against a schema, returning the diagnostics as an error.
pub fn validate_result(schema: &Schema, value: &Value) -> Result<(), Vec<Diagnostic>> {
    let diagnostics = validate(schema, value);
    if diagnostics.is_empty() {
        Ok(())
    } else {
        Err(diagnostics)
    }
}

impl Validator {
    /// Check a single value, returning a description of the problem on failure.
    pub fn check(&self, value: &Value) -> Result<(), String> {
        match self {
            Self::NotEmpty => {
                let s = expect_string(value)?;
                if s.trim().is_empty() {
                    return Err("must not be empty".to_string());
                }
            },
            Self::LengthBetween { min, max } => {
                let len = expect_string(value)?.chars().count();
                if len < *min || len > *max {
                    return Err(format!(
                        "must be between {min} and {max} characters long, got {len}"
                    ));
                }
            },
            Self::OneOf {
                values,
                ignore_case,
            } => {
                let s = expect_string(value)?;
                let found = values.iter().any(|v| {
                    if *ignore_case {
                        v.eq_ignore_ascii_case(s)
                    } else {
                        v == s
                    }
                });
                if !found {
                    return Err(format!("must be one of {values:?}, got {s:?}"));
                }
            },
            Self::IntBetween { min, max } => {
                let n = value
                    .as_i64()
                    .ok_or_else(|| "expected an integer".to_string())?;
                if n < *min || n > *max {
                    return Err(format!("must be between {min} and {max}, got {n}"));
                }
            },
            Self::ResourceGroupName => check_resource_group_name(expect_string(value)?)?,
            Self::Charset {
                extra,
                lowercase,
                leading_letter,
            } => {
                let s = expect_string(value)?;
                if *leading_letter && !s.chars().next().is_some_and(|c| c.is_ascii_alphabetic()) {
                    return Err("must start with a letter".to_string());
                }
                let bad = s.chars().find(|c| {
                    let allowed = c.is_ascii_digit()
                        || extra.contains(*c)
                        || if *lowercase {
                            c.is_ascii_lowercase()
                        } else {
                            c.is_ascii_alphabetic()
                        };
                    !allowed
                });
                if let Some(c) = bad {
                    return Err(format!("contains invalid character {c:?}"));
                }
            },
            Self::ResourceId { id_kind } => {
                let s = expect_string(value)?;
                let parsed = match id_kind {
                    IdKind::ResourceGroup => ResourceGroupId::validate(s),
                    IdKind::CustomLocation => CustomLocationId::validate(s),
                };
                parsed.map_err(|e| e.to_string())?;
            },
        }
        Ok(())
    }
}

fn expect_string(value: &Value) -> Result<&str, String> {
    value
        .as_str()
        .ok_or_else(|| format!("expected a string, got {}", value_type_name(value)))
}

fn check_resource_group_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("must not be empty".to_string());
    }
    if name.chars().count() > 90 {
        return Err("may not exceed 90 characters in length".to_string());
    }
    if name.ends_with('.') {
        return Err("may not end with a period".to_string());
    }
    if let Some(c) = name
        .chars()
        .find(|c| !(c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | '(' | ')')))
    {
        return Err(format!(
            "may only contain alphanumeric characters, dash, underscores, parentheses and periods, got {c:?}"
        ));
    }
    Ok(())
}

fn validate_block(block: &Block, value: &Value, path: &str, diagnostics: &mut Vec<Diagnostic>) {
    let obj = match value {
        Value::Object(map) => map,
        Value::Null => return,
        _ => {
            let mut diag =
                Diagnostic::error("Expected object").with_detail(format!("Got {}", value_type_name(value)));
            if !path.is_empty() {
                diag = diag.with_attribute(path);
            }
            diagnostics.push(diag);
            return;
        },
    };

    for (name, attr) in &block.attributes {
        let attr_path = join_path(path, name);
        validate_attribute(attr, obj.get(name), &attr_path, diagnostics);
    }

    for (name, nested) in &block.blocks {
        let block_path = join_path(path, name);
        validate_nested_block(nested, obj.get(name), &block_path, diagnostics);
    }
}

fn validate_attribute(
    attr: &Attribute,
    value: Option<&Value>,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    if !attr.is_argument() {
        return;
    }

    let Some(value) = value.filter(|v| !v.is_null()) else {
        if attr.flags.required {
            diagnostics.push(
                Diagnostic::error(format!("Missing required attribute '{}'", path))
                    .with_detail("This attribute is required and must be provided")
                    .with_attribute(path),
            );
        }
        return;
    };

    let before = diagnostics.len();
    validate_attribute_type(&attr.attr_type, value, path, diagnostics);
    if diagnostics.len() > before {
        return;
    }

    for validator in &attr.validators {
        if let Err(detail) = validator.check(value) {
            diagnostics.push(
                Diagnostic::error(format!("Invalid value for attribute '{}'", path))
                    .with_detail(detail)
                    .with_attribute(path),
            );
        }
    }
}

fn validate_attribute_type(
    attr_type: &AttributeType,
    value: &Value,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    match attr_type {
        AttributeType::String if !value.is_string() => {
            diagnostics.push(type_error(path, "string", value));
        },
        AttributeType::Int64 if !value.is_i64() => {
            diagnostics.push(type_error(path, "int64", value));
        },
        AttributeType::Bool if !value.is_boolean() => {
            diagnostics.push(type_error(path, "bool", value));
        },
        AttributeType::List(element_type) => match value.as_array() {
            Some(items) => {
                for (i, item) in items.iter().enumerate() {
                    validate_attribute_type(element_type, item, &format!("{}.{}", path, i), diagnostics);
                }
            },
            None => diagnostics.push(type_error(path, "list", value)),
        },
        AttributeType::Map(value_type) => match value.as_object() {
            Some(entries) => {
                for (key, item) in entries {
                    validate_attribute_type(value_type, item, &format!("{}.{}", path, key), diagnostics);
                }
            },
            None => diagnostics.push(type_error(path, "map", value)),
        },
        AttributeType::Object(fields) => match value.as_object() {
            Some(entries) => {
                for (name, field_type) in fields {
                    if let Some(item) = entries.get(name).filter(|v| !v.is_null()) {
                        validate_attribute_type(field_type, item, &join_path(path, name), diagnostics);
                    }
                }
            },
            None => diagnostics.push(type_error(path, "object", value)),
        },
        _ => {},
    }
}

// Single and list blocks are both written as arrays.
fn validate_nested_block(
    nested: &NestedBlock,
    value: Option<&Value>,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let items: &[Value] = match value {
        None | Some(Value::Null) => &[],
        Some(Value::Array(items)) => items,
        Some(other) => {
            diagnostics.push(
                Diagnostic::error(format!("Expected list for block '{}'", path))
                    .with_detail(format!("Got {}", value_type_name(other)))
                    .with_attribute(path),
            );
            return;
        },
    };

    let len = items.len() as u32;
    if len < nested.min_items {
        diagnostics.push(
            Diagnostic::error(format!(
                "Block '{}' requires at least {} item(s), got {}",
                path, nested.min_items, len
            ))
            .with_attribute(path),
        );
    }
    if nested.max_items > 0 && len > nested.max_items {
        diagnostics.push(
            Diagnostic::error(format!(
                "Block '{}' allows at most {} item(s), got {}",
                path, nested.max_items, len
            ))
            .with_attribute(path),
        );
    }

    for (i, item) in items.iter().enumerate() {
        validate_block(&nested.block, item, &format!("{}.{}", path, i), diagnostics);
    }
}

fn join_path(base: &str, name: &str) -> String {
    if base.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", base, name)
    }
}

fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn type_error(path: &str, expected: &str, got: &Value) -> Diagnostic {
    Diagnostic::error(format!("Invalid type for attribute '{}'", path))
        .with_detail(format!("Expected {}, got {}", expected, value_type_name(got)))
        .with_attribute(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Block, NestedBlock};
    use serde_json::json;

    #[test]
    fn test_validate_required_string() {
        let schema = Schema::v0().with_attribute("name", Attribute::required_string());

        assert!(validate(&schema, &json!({"name": "test"})).is_empty());

        let diagnostics = validate(&schema, &json!({}));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].attribute, Some("name".to_string()));

        assert_eq!(validate(&schema, &json!({"name": null})).len(), 1);

        let diagnostics = validate(&schema, &json!({"name": 123}));
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].summary.contains("Invalid type"));
    }

    #[test]
    fn test_computed_attribute_skipped() {
        let schema = Schema::v0().with_attribute("uri", Attribute::computed_string());
        assert!(validate(&schema, &json!({"uri": 123})).is_empty());
    }

    #[test]
    fn test_validators_run_after_type_check() {
        let schema = Schema::v0().with_attribute(
            "domain_name",
            Attribute::required_string().with_validator(Validator::NotEmpty),
        );

        let diagnostics = validate(&schema, &json!({"domain_name": "  "}));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].detail.as_deref(), Some("must not be empty"));

        // A type error is reported once, without the validator piling on.
        let diagnostics = validate(&schema, &json!({"domain_name": 1}));
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].summary.contains("Invalid type"));
    }

    #[test]
    fn test_nested_block_items() {
        let schema = Schema::v0().with_block(
            "sku",
            NestedBlock::single(
                Block::new().with_attribute(
                    "capacity",
                    Attribute::optional_int64().with_validator(Validator::IntBetween { min: 2, max: 1000 }),
                ),
            )
            .required(),
        );

        let diagnostics = validate(&schema, &json!({}));
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].summary.contains("at least 1"));

        let diagnostics = validate(&schema, &json!({"sku": [{}, {}]}));
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].summary.contains("at most 1"));

        let diagnostics = validate(&schema, &json!({"sku": [{"capacity": 1}]}));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].attribute, Some("sku.0.capacity".to_string()));

        assert!(validate(&schema, &json!({"sku": [{"capacity": 2}]})).is_empty());
    }

    #[test]
    fn test_map_values_are_typed() {
        let schema = Schema::v0().with_attribute(
            "tags",
            Attribute::new(
                AttributeType::map(AttributeType::String),
                crate::schema::AttributeFlags::optional(),
            ),
        );
        assert!(validate(&schema, &json!({"tags": {"env": "test"}})).is_empty());

        let diagnostics = validate(&schema, &json!({"tags": {"count": 3}}));
        assert_eq!(diagnostics[0].attribute, Some("tags.count".to_string()));
    }

    #[test]
    fn test_one_of() {
        let exact = Validator::one_of(&["Basic", "Standard"]);
        assert!(exact.check(&json!("Basic")).is_ok());
        assert!(exact.check(&json!("basic")).is_err());

        let relaxed = Validator::one_of_ignore_case(&["Basic", "Standard"]);
        assert!(relaxed.check(&json!("basic")).is_ok());
        assert!(relaxed.check(&json!("Premium")).is_err());
    }

    #[test]
    fn test_resource_group_name() {
        let v = Validator::ResourceGroupName;
        assert!(v.check(&json!("example-resources")).is_ok());
        assert!(v.check(&json!("rg_(1).test")).is_ok());
        assert!(v.check(&json!("trailing.")).is_err());
        assert!(v.check(&json!("has space")).is_err());
        assert!(v.check(&json!("a".repeat(91))).is_err());
    }

    #[test]
    fn test_charset() {
        let cluster_name = Validator::Charset {
            extra: String::new(),
            lowercase: true,
            leading_letter: true,
        };
        assert!(cluster_name.check(&json!("acctestkc1")).is_ok());
        assert!(cluster_name.check(&json!("1cluster")).is_err());
        assert!(cluster_name.check(&json!("Cluster")).is_err());

        let machine_name = Validator::Charset {
            extra: "-_.".to_string(),
            lowercase: false,
            leading_letter: false,
        };
        assert!(machine_name.check(&json!("Arc-Machine_01.local")).is_ok());
        assert!(machine_name.check(&json!("bad/name")).is_err());
    }

    #[test]
    fn test_resource_id() {
        let v = Validator::ResourceId {
            id_kind: IdKind::CustomLocation,
        };
        assert!(v
            .check(&json!("/subscriptions/sub/resourceGroups/rg/providers/Microsoft.ExtendedLocation/customLocations/edge"))
            .is_ok());
        assert!(v.check(&json!("/subscriptions/sub/resourceGroups/rg")).is_err());
    }

    #[test]
    fn test_validate_result() {
        let schema = Schema::v0().with_attribute("name", Attribute::required_string());
        assert!(validate_result(&schema, &json!({"name": "x"})).is_ok());
        assert_eq!(validate_result(&schema, &json!({})).unwrap_err().len(), 1);
    }
}
