//! Planning: defaults, plan modifiers and attribute changes.
//!
//! Planning works on the JSON form of a resource so it applies uniformly to
//! every schema. Unknown values are carried as the host's unknown placeholder.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::schema::{Attribute, AttributeType, Block, BlockNestingMode, PlanModifier, Schema};
use crate::validation::{is_unknown, join_path};
use crate::value::UNKNOWN_PLACEHOLDER;

/// A change to a single attribute during a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeChange {
    /// Dotted path of the attribute.
    pub path: String,
    /// Value in the prior state, `None` when the attribute was null.
    pub before: Option<Value>,
    /// Planned value, `None` when the attribute becomes null.
    pub after: Option<Value>,
}

impl AttributeChange {
    /// Create a new attribute change.
    pub fn new(path: impl Into<String>, before: Option<Value>, after: Option<Value>) -> Self {
        Self {
            path: path.into(),
            before,
            after,
        }
    }

    /// An attribute that was null and now has a value.
    pub fn added(path: impl Into<String>, value: Value) -> Self {
        Self::new(path, None, Some(value))
    }

    /// An attribute that had a value and becomes null.
    pub fn removed(path: impl Into<String>, value: Value) -> Self {
        Self::new(path, Some(value), None)
    }

    /// An attribute whose value changes.
    pub fn modified(path: impl Into<String>, before: Value, after: Value) -> Self {
        Self::new(path, Some(before), Some(after))
    }

    fn between(path: String, before: &Value, after: &Value) -> Self {
        match (before.is_null(), after.is_null()) {
            (true, _) => Self::added(path, after.clone()),
            (false, true) => Self::removed(path, before.clone()),
            (false, false) => Self::modified(path, before.clone(), after.clone()),
        }
    }
}

/// The result of a plan operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanResult {
    /// The planned state.
    pub planned_state: Value,
    /// Attribute changes against the prior state.
    pub changes: Vec<AttributeChange>,
    /// Whether the change can only be applied by destroy-then-create.
    pub requires_replace: bool,
}

impl PlanResult {
    /// A plan that changes nothing.
    pub fn no_change(state: Value) -> Self {
        Self {
            planned_state: state,
            changes: Vec::new(),
            requires_replace: false,
        }
    }

    /// A plan with changes.
    pub fn with_changes(
        planned_state: Value,
        changes: Vec<AttributeChange>,
        requires_replace: bool,
    ) -> Self {
        Self {
            planned_state,
            changes,
            requires_replace,
        }
    }

    /// Whether the plan changes anything.
    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }
}

/// Plan a resource against its prior state.
///
/// Fills schema defaults for null optional attributes, keeps prior values of
/// computed attributes the configuration leaves null, copies prior values
/// into unknown `UseStateForUnknown` attributes and applies the normalizing
/// modifiers. Every top-level or single-nested attribute that still differs
/// from the prior state is recorded; sets compare without regard to order.
/// A changed `RequiresReplace` attribute marks the plan as a replacement when
/// a prior state exists.
pub fn plan_resource(schema: &Schema, prior_state: Option<&Value>, proposed: Value) -> PlanResult {
    let mut planned = proposed;
    let prior_state = prior_state.filter(|prior| !prior.is_null());
    let mut planner = Planner {
        changes: Vec::new(),
        requires_replace: false,
        has_prior: prior_state.is_some(),
    };

    if let Some(object) = planned.as_object_mut() {
        planner.plan_block(&schema.block, prior_state, object, "");
    }

    if planner.changes.is_empty() {
        PlanResult::no_change(planned)
    } else {
        PlanResult::with_changes(planned, planner.changes, planner.requires_replace)
    }
}

struct Planner {
    changes: Vec<AttributeChange>,
    requires_replace: bool,
    has_prior: bool,
}

impl Planner {
    fn plan_block(
        &mut self,
        block: &Block,
        prior: Option<&Value>,
        planned: &mut Map<String, Value>,
        path: &str,
    ) {
        for (name, attr) in &block.attributes {
            let attr_path = join_path(path, name);
            let before = prior.and_then(|p| p.get(name)).cloned().unwrap_or(Value::Null);
            let entry = planned.entry(name.clone()).or_insert(Value::Null);

            settle_attribute(attr, entry, &before);

            if equivalent(attr, entry, &before) {
                *entry = before;
                continue;
            }
            if attr.has_plan_modifier(PlanModifier::RequiresReplace) && self.has_prior {
                self.requires_replace = true;
            }
            self.changes
                .push(AttributeChange::between(attr_path, &before, entry));
        }

        for (name, nested) in &block.blocks {
            let block_path = join_path(path, name);
            let before = prior.and_then(|p| p.get(name)).cloned().unwrap_or(Value::Null);
            let Some(entry) = planned.get_mut(name) else {
                if !is_empty_block(&before) {
                    self.changes
                        .push(AttributeChange::between(block_path, &before, &Value::Null));
                }
                continue;
            };

            if let (BlockNestingMode::Single, Some(object)) = (&nested.nesting_mode, entry.as_object_mut()) {
                let prior_block = (!before.is_null()).then_some(&before);
                self.plan_block(&nested.block, prior_block, object, &block_path);
                continue;
            }

            if let Some(items) = entry.as_array_mut() {
                items
                    .iter_mut()
                    .filter_map(Value::as_object_mut)
                    .for_each(|item| normalize_block(&nested.block, item));
            }

            let unchanged = *entry == before
                || (is_empty_block(entry) && is_empty_block(&before))
                || (matches!(nested.nesting_mode, BlockNestingMode::Set) && same_elements(entry, &before));
            if unchanged {
                *entry = before;
            } else {
                self.changes
                    .push(AttributeChange::between(block_path, &before, entry));
            }
        }
    }
}

/// Resolve the planned value of one attribute before it is compared.
fn settle_attribute(attr: &Attribute, entry: &mut Value, before: &Value) {
    if entry.is_null() && !attr.flags.required {
        if let Some(default) = &attr.default {
            *entry = default.clone();
        }
    }

    if entry.is_null() && attr.flags.computed && !before.is_null() {
        *entry = before.clone();
    }

    if is_unknown(entry) && attr.has_plan_modifier(PlanModifier::UseStateForUnknown) && !before.is_null() {
        *entry = before.clone();
    }

    if attr.has_plan_modifier(PlanModifier::Lowercase) {
        lowercase_strings(entry);
    }
}

/// Fill and normalize one item of a list or set block, which has no prior of its own.
fn normalize_block(block: &Block, object: &mut Map<String, Value>) {
    for (name, attr) in &block.attributes {
        settle_attribute(attr, object.entry(name.clone()).or_insert(Value::Null), &Value::Null);
    }
    for (name, nested) in &block.blocks {
        match object.get_mut(name) {
            Some(Value::Object(inner)) => normalize_block(&nested.block, inner),
            Some(Value::Array(items)) => items
                .iter_mut()
                .filter_map(Value::as_object_mut)
                .for_each(|item| normalize_block(&nested.block, item)),
            _ => {},
        }
    }
}

fn equivalent(attr: &Attribute, planned: &Value, before: &Value) -> bool {
    if planned == before {
        return true;
    }
    match &attr.attr_type {
        AttributeType::Set(_) => same_elements(planned, before),
        AttributeType::Float64 => planned.as_f64().is_some_and(|n| before.as_f64() == Some(n)),
        _ if attr.has_plan_modifier(PlanModifier::SemanticJson) => same_json_document(planned, before),
        _ => false,
    }
}

/// Two arrays holding the same elements, in any order.
fn same_elements(left: &Value, right: &Value) -> bool {
    let (Some(left), Some(right)) = (left.as_array(), right.as_array()) else {
        return false;
    };
    if left.len() != right.len() {
        return false;
    }
    sorted_keys(left) == sorted_keys(right)
}

fn sorted_keys(items: &[Value]) -> Vec<String> {
    let mut keys: Vec<String> = items.iter().map(Value::to_string).collect();
    keys.sort();
    keys
}

/// Two strings encoding the same JSON document.
fn same_json_document(left: &Value, right: &Value) -> bool {
    let (Some(left), Some(right)) = (left.as_str(), right.as_str()) else {
        return false;
    };
    match (
        serde_json::from_str::<Value>(left),
        serde_json::from_str::<Value>(right),
    ) {
        (Ok(left), Ok(right)) => left == right,
        _ => false,
    }
}

fn is_empty_block(value: &Value) -> bool {
    value.is_null() || value.as_array().is_some_and(|items| items.is_empty())
}

fn lowercase_strings(value: &mut Value) {
    match value {
        Value::String(text) if text.as_str() != UNKNOWN_PLACEHOLDER => *text = text.to_lowercase(),
        Value::Array(items) => items.iter_mut().for_each(lowercase_strings),
        _ => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::NestedBlock;
    use serde_json::json;

    fn schema() -> Schema {
        Schema::new(1)
            .with_attribute("id", Attribute::computed_string().use_state_for_unknown())
            .with_attribute("name", Attribute::required_string())
            .with_attribute(
                "scope",
                Attribute::optional_computed_string().with_default(json!("INCLUDE_NO_DOWNSTREAM")),
            )
            .with_attribute(
                "event_types",
                Attribute::optional_string_set().requires_replace(),
            )
            .with_block(
                "window",
                NestedBlock::single(
                    crate::schema::Block::new()
                        .with_attribute("duration", Attribute::optional_int64())
                        .with_attribute("timezone", Attribute::optional_string().requires_replace()),
                ),
            )
            .with_attribute("rule_ids", Attribute::optional_string_set().requires_replace())
            .with_attribute("severities", Attribute::optional_string_set().lowercase())
            .with_attribute("layout", Attribute::optional_string().semantic_json())
            .with_block(
                "member",
                NestedBlock::set(
                    crate::schema::Block::new()
                        .with_attribute("user_id", Attribute::required_string())
                        .with_attribute("email", Attribute::optional_computed_string()),
                ),
            )
    }

    #[test]
    fn test_attribute_change_constructors() {
        let added = AttributeChange::added("name", json!("test"));
        assert!(added.before.is_none());
        assert_eq!(added.after, Some(json!("test")));

        let removed = AttributeChange::removed("name", json!("old"));
        assert_eq!(removed.before, Some(json!("old")));
        assert!(removed.after.is_none());

        let modified = AttributeChange::modified("count", json!(1), json!(2));
        assert_eq!(modified.before, Some(json!(1)));
        assert_eq!(modified.after, Some(json!(2)));
    }

    #[test]
    fn test_create_plan_fills_defaults() {
        let result = plan_resource(
            &schema(),
            None,
            json!({"id": UNKNOWN_PLACEHOLDER, "name": "shop"}),
        );

        assert_eq!(result.planned_state["scope"], "INCLUDE_NO_DOWNSTREAM");
        assert_eq!(result.planned_state["id"], UNKNOWN_PLACEHOLDER);
        assert!(!result.requires_replace);
        assert!(result
            .changes
            .iter()
            .any(|c| c.path == "scope" && c.before.is_none()));
    }

    #[test]
    fn test_use_state_for_unknown_copies_prior_id() {
        let prior = json!({"id": "abc", "name": "shop", "scope": "INCLUDE_NO_DOWNSTREAM"});
        let result = plan_resource(
            &schema(),
            Some(&prior),
            json!({"id": UNKNOWN_PLACEHOLDER, "name": "shop"}),
        );

        assert_eq!(result.planned_state["id"], "abc");
        assert!(!result.has_changes());
    }

    #[test]
    fn test_requires_replace_on_changed_event_types() {
        let prior = json!({"id": "abc", "name": "a", "scope": "ALL", "event_types": ["critical"]});
        let proposed = json!({"id": "abc", "name": "a", "scope": "ALL", "event_types": ["warning"]});
        let result = plan_resource(&schema(), Some(&prior), proposed);

        assert!(result.requires_replace);
        assert_eq!(result.changes.len(), 1);
        assert_eq!(result.changes[0].path, "event_types");
    }

    #[test]
    fn test_in_place_change_does_not_replace() {
        let prior = json!({"id": "abc", "name": "a", "scope": "ALL"});
        let proposed = json!({"id": "abc", "name": "b", "scope": "ALL"});
        let result = plan_resource(&schema(), Some(&prior), proposed);

        assert!(!result.requires_replace);
        assert_eq!(
            result.changes,
            vec![AttributeChange::modified("name", json!("a"), json!("b"))]
        );
    }

    #[test]
    fn test_single_nested_block_paths() {
        let prior = json!({
            "id": "abc", "name": "a", "scope": "ALL",
            "window": {"duration": 7, "timezone": "UTC"}
        });
        let proposed = json!({
            "id": "abc", "name": "a", "scope": "ALL",
            "window": {"duration": 7, "timezone": "Europe/Berlin"}
        });
        let result = plan_resource(&schema(), Some(&prior), proposed);

        assert!(result.requires_replace);
        assert_eq!(result.changes[0].path, "window.timezone");
    }

    #[test]
    fn test_removed_attribute() {
        let prior = json!({"id": "abc", "name": "a", "scope": "ALL", "event_types": ["critical"]});
        let proposed = json!({"id": "abc", "name": "a", "scope": "ALL", "event_types": null});
        let result = plan_resource(&schema(), Some(&prior), proposed);

        assert_eq!(
            result.changes,
            vec![AttributeChange::removed("event_types", json!(["critical"]))]
        );
    }

    #[test]
    fn test_reordered_sets_are_unchanged() {
        let prior = json!({
            "id": "abc", "name": "a", "scope": "ALL",
            "event_types": ["warning", "critical"], "rule_ids": ["r2", "r1"]
        });
        let proposed = json!({
            "name": "a", "scope": "ALL",
            "event_types": ["critical", "warning"], "rule_ids": ["r1", "r2"]
        });
        let result = plan_resource(&schema(), Some(&prior), proposed);

        assert!(!result.has_changes());
        assert!(!result.requires_replace);
        assert_eq!(result.planned_state["rule_ids"], json!(["r2", "r1"]));
    }

    #[test]
    fn test_set_with_other_elements_still_replaces() {
        let prior = json!({"id": "abc", "name": "a", "scope": "ALL", "rule_ids": ["r1", "r2"]});
        let proposed = json!({"name": "a", "scope": "ALL", "rule_ids": ["r1", "r3"]});
        let result = plan_resource(&schema(), Some(&prior), proposed);

        assert!(result.requires_replace);
        assert_eq!(result.changes[0].path, "rule_ids");
    }

    #[test]
    fn test_lowercase_modifier_folds_configured_case() {
        let prior = json!({"id": "abc", "name": "a", "scope": "ALL", "severities": ["critical", "warning"]});
        let proposed = json!({"name": "a", "scope": "ALL", "severities": ["Critical", "WARNING"]});
        let result = plan_resource(&schema(), Some(&prior), proposed);

        assert!(!result.has_changes());
        assert_eq!(result.planned_state["severities"], json!(["critical", "warning"]));

        let created = plan_resource(&schema(), None, json!({"name": "a", "severities": ["Critical"]}));
        assert_eq!(created.planned_state["severities"], json!(["critical"]));
    }

    #[test]
    fn test_lowercase_keeps_unknown_placeholder() {
        let result = plan_resource(
            &schema(),
            None,
            json!({"name": "a", "severities": UNKNOWN_PLACEHOLDER}),
        );
        assert_eq!(result.planned_state["severities"], UNKNOWN_PLACEHOLDER);
    }

    #[test]
    fn test_semantic_json_keeps_prior_text() {
        let prior = json!({"id": "abc", "name": "a", "scope": "ALL", "layout": r#"[{"a":1,"b":2}]"#});
        let proposed = json!({"name": "a", "scope": "ALL", "layout": r#"[ {"b": 2, "a": 1} ]"#});
        let result = plan_resource(&schema(), Some(&prior), proposed);

        assert!(!result.has_changes());
        assert_eq!(result.planned_state["layout"], r#"[{"a":1,"b":2}]"#);

        let changed = plan_resource(
            &schema(),
            Some(&prior),
            json!({"name": "a", "scope": "ALL", "layout": r#"[{"a":2}]"#}),
        );
        assert_eq!(changed.changes[0].path, "layout");
    }

    #[test]
    fn test_integral_float_matches_prior() {
        let schema = Schema::new(1).with_attribute("target", Attribute::required_float64());
        let result = plan_resource(&schema, Some(&json!({"target": 1.0})), json!({"target": 1}));
        assert!(!result.has_changes());

        let result = plan_resource(&schema, Some(&json!({"target": 1.0})), json!({"target": 0.99}));
        assert_eq!(result.changes[0].path, "target");
    }

    #[test]
    fn test_computed_attributes_keep_prior_values() {
        let prior = json!({"id": "abc", "name": "a", "scope": "ALL"});
        let result = plan_resource(&schema(), Some(&prior), json!({"name": "a", "scope": "ALL"}));

        assert_eq!(result.planned_state["id"], "abc");
        assert!(!result.has_changes());
    }

    #[test]
    fn test_set_block_items_are_filled_before_comparing() {
        let prior = json!({
            "id": "abc", "name": "a", "scope": "ALL",
            "member": [{"user_id": "u2", "email": null}, {"user_id": "u1", "email": "u1@example.com"}]
        });
        let proposed = json!({
            "name": "a", "scope": "ALL",
            "member": [{"user_id": "u1", "email": "u1@example.com"}, {"user_id": "u2"}]
        });
        let result = plan_resource(&schema(), Some(&prior), proposed);
        assert!(!result.has_changes());

        let removed = plan_resource(
            &schema(),
            Some(&prior),
            json!({"name": "a", "scope": "ALL", "member": [{"user_id": "u1"}]}),
        );
        assert_eq!(removed.changes[0].path, "member");
    }
}
