//! Computing planned state and attribute changes from a schema.
//!
//! The planned state is the configuration with schema defaults filled in and
//! computed values carried over from the prior state. Comparing it with the
//! prior state yields the [`AttributeChange`]s, and any change to a
//! `force_new` attribute turns the plan into a replacement.
//!
//! Empty strings, lists and maps are treated the same as absent values, since
//! read operations write empty values for fields the service did not return.

use serde_json::{Map, Value};

use crate::schema::{Block, Schema};
use crate::types::{AttributeChange, PlanResult};

/// Plan a resource.
///
/// `prior` is `None` when the resource does not exist yet. A `config` of
/// `null` plans its deletion.
pub fn plan_resource(schema: &Schema, prior: Option<&Value>, config: &Value) -> PlanResult {
    if config.is_null() {
        let changes = prior
            .filter(|p| !p.is_null())
            .map(|p| vec![AttributeChange::removed("id", p.get("id").cloned().unwrap_or(Value::Null))])
            .unwrap_or_default();
        return PlanResult::with_changes(Value::Null, changes, false);
    }

    let Some(prior) = prior.filter(|p| !p.is_null()) else {
        let planned = fill_block(&schema.block, config, None);
        let mut changes = Vec::new();
        let mut replace = Vec::new();
        diff_block(&schema.block, &Value::Null, &planned, "", &mut changes, &mut replace);
        changes.push(AttributeChange::added("id", Value::Null));
        return PlanResult::with_changes(planned, changes, false);
    };

    let planned = fill_block(&schema.block, config, Some(prior));
    let mut changes = Vec::new();
    let mut replace = Vec::new();
    diff_block(&schema.block, prior, &planned, "", &mut changes, &mut replace);

    if changes.is_empty() {
        return PlanResult::no_change(planned);
    }

    if replace.is_empty() {
        return PlanResult::with_changes(planned, changes, false);
    }

    // A replacement gets a new ID and fresh computed values.
    let planned = fill_block(&schema.block, config, None);
    PlanResult::with_changes(planned, changes, false).with_replace_paths(replace)
}

/// Whether a value counts as unset.
pub(crate) fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

fn present<'a>(value: &'a Value, name: &str) -> Option<&'a Value> {
    value.get(name).filter(|v| !is_empty_value(v))
}

fn fill_block(block: &Block, config: &Value, prior: Option<&Value>) -> Value {
    let mut planned = Map::new();

    for (name, attr) in &block.attributes {
        let configured = if attr.is_argument() {
            present(config, name).map(|v| match &attr.normalize {
                Some(normalize) => normalize.apply(v),
                None => v.clone(),
            })
        } else {
            None
        };
        let value = configured
            .or_else(|| attr.default.clone())
            .or_else(|| {
                if attr.flags.computed {
                    prior.and_then(|p| present(p, name)).cloned()
                } else {
                    None
                }
            });
        if let Some(value) = value {
            planned.insert(name.clone(), value);
        }
    }

    for (name, nested) in &block.blocks {
        let items: Vec<Value> = config
            .get(name)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| {
                        let prior_item = prior
                            .and_then(|p| p.get(name))
                            .and_then(|p| p.get(i));
                        fill_block(&nested.block, item, prior_item)
                    })
                    .collect()
            })
            .unwrap_or_default();
        if !items.is_empty() {
            planned.insert(name.clone(), Value::Array(items));
        }
    }

    Value::Object(planned)
}

fn join(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{path}.{name}")
    }
}

fn diff_block(
    block: &Block,
    before: &Value,
    after: &Value,
    path: &str,
    changes: &mut Vec<AttributeChange>,
    replace: &mut Vec<String>,
) {
    let mut names: Vec<&String> = block.attributes.keys().collect();
    names.sort();

    for name in names {
        let attr = &block.attributes[name];
        if !attr.is_argument() {
            continue;
        }
        let old = present(before, name);
        let new = present(after, name);
        if old == new {
            continue;
        }
        let attr_path = join(path, name);
        changes.push(AttributeChange::new(&attr_path, old.cloned(), new.cloned()));
        if attr.force_new {
            replace.push(attr_path);
        }
    }

    let mut block_names: Vec<&String> = block.blocks.keys().collect();
    block_names.sort();

    for name in block_names {
        let nested = &block.blocks[name];
        let empty = Vec::new();
        let old = before.get(name).and_then(Value::as_array).unwrap_or(&empty);
        let new = after.get(name).and_then(Value::as_array).unwrap_or(&empty);
        let block_path = join(path, name);

        for i in 0..old.len().max(new.len()) {
            diff_block(
                &nested.block,
                old.get(i).unwrap_or(&Value::Null),
                new.get(i).unwrap_or(&Value::Null),
                &format!("{block_path}.{i}"),
                changes,
                replace,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Attribute, NestedBlock, Normalize};
    use crate::types::PlanAction;
    use serde_json::json;

    fn schema() -> Schema {
        Schema::v0()
            .with_attribute("name", Attribute::required_string().with_force_new())
            .with_attribute(
                "location",
                Attribute::optional_string()
                    .with_force_new()
                    .with_normalize(Normalize::Location),
            )
            .with_attribute("sku_name", Attribute::required_string())
            .with_attribute("enabled", Attribute::optional_bool().with_default(json!(true)))
            .with_attribute("country_code", Attribute::optional_string().computed().with_force_new())
            .with_attribute("tenant_id", Attribute::computed_string())
            .with_block(
                "sku",
                NestedBlock::single(
                    Block::new()
                        .with_attribute("tier", Attribute::required_string())
                        .with_attribute("capacity", Attribute::optional_int64().computed()),
                ),
            )
            .with_attribute("id", Attribute::computed_string())
    }

    fn prior() -> Value {
        json!({
            "id": "/subscriptions/sub/resourceGroups/rg/providers/Test/things/one",
            "name": "one",
            "sku_name": "PremiumP1",
            "enabled": true,
            "country_code": "US",
            "tenant_id": "t-1",
            "tags": {},
            "sku": [{"tier": "Standard", "capacity": 2}]
        })
    }

    #[test]
    fn test_plan_create_fills_defaults() {
        let plan = plan_resource(&schema(), None, &json!({"name": "one", "sku_name": "PremiumP1"}));
        assert_eq!(plan.action(), PlanAction::Create);
        assert_eq!(plan.planned_state["enabled"], json!(true));
        assert!(plan.planned_state.get("tenant_id").is_none());
        assert!(plan.changes.iter().any(|c| c.path == "name"));
    }

    #[test]
    fn test_plan_without_changes_keeps_computed_values() {
        let config = json!({
            "name": "one",
            "sku_name": "PremiumP1",
            "sku": [{"tier": "Standard"}]
        });
        let plan = plan_resource(&schema(), Some(&prior()), &config);
        assert_eq!(plan.action(), PlanAction::NoOp, "{:?}", plan.changes);
        assert_eq!(plan.planned_state["country_code"], json!("US"));
        assert_eq!(plan.planned_state["tenant_id"], json!("t-1"));
        assert_eq!(plan.planned_state["sku"][0]["capacity"], json!(2));
    }

    #[test]
    fn test_plan_update_in_place() {
        let config = json!({"name": "one", "sku_name": "PremiumP2", "sku": [{"tier": "Standard"}]});
        let plan = plan_resource(&schema(), Some(&prior()), &config);
        assert_eq!(plan.action(), PlanAction::Update);
        assert_eq!(plan.changes.len(), 1);
        assert_eq!(plan.changes[0].path, "sku_name");
        assert_eq!(plan.planned_state["id"], prior()["id"]);
    }

    #[test]
    fn test_plan_force_new_change_replaces() {
        let config = json!({"name": "two", "sku_name": "PremiumP1", "sku": [{"tier": "Standard"}]});
        let plan = plan_resource(&schema(), Some(&prior()), &config);
        assert_eq!(plan.action(), PlanAction::Replace);
        assert_eq!(plan.replace_paths, vec!["name".to_string()]);
        assert!(plan.planned_state.get("id").is_none());
        assert!(plan.planned_state.get("tenant_id").is_none());
    }

    #[test]
    fn test_plan_nested_block_change() {
        let config = json!({"name": "one", "sku_name": "PremiumP1", "sku": [{"tier": "Premium"}]});
        let plan = plan_resource(&schema(), Some(&prior()), &config);
        assert_eq!(plan.action(), PlanAction::Update);
        assert_eq!(plan.changes[0].path, "sku.0.tier");
    }

    #[test]
    fn test_plan_normalizes_location() {
        let config = json!({
            "name": "one",
            "location": "West Europe",
            "sku_name": "PremiumP1",
            "sku": [{"tier": "Standard"}]
        });
        let mut prior = prior();
        prior["location"] = json!("westeurope");
        let plan = plan_resource(&schema(), Some(&prior), &config);
        assert_eq!(plan.action(), PlanAction::NoOp, "{:?}", plan.changes);
        assert_eq!(plan.planned_state["location"], json!("westeurope"));
    }

    #[test]
    fn test_plan_delete() {
        let plan = plan_resource(&schema(), Some(&prior()), &Value::Null);
        assert_eq!(plan.action(), PlanAction::Delete);
    }
}
