//! `instana_alerting_config`: alert names, integrations and event filters.
//!
//! Event types are lower-cased in both directions so that the case the API
//! echoes never shows up as drift.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::custom_payload::{
    custom_payload_field_block, custom_payload_fields_from_wire, custom_payload_fields_to_wire,
    CustomPayloadFieldModel, CUSTOM_PAYLOAD_FIELD,
};
use super::id_attribute;
use crate::error::ProviderError;
use crate::handle::{resolve_input, ResourceHandle, ResourceMetaData, StateUpgrader};
use crate::restapi::{
    AlertingConfiguration, EventFilteringConfiguration, InstanaApi, RestResource,
    SUPPORTED_ALERT_EVENT_TYPES,
};
use crate::schema::{Attribute, Diagnostic, Schema, Validator};
use crate::value::{
    model_to_wire_string, model_to_wire_string_list, model_to_wire_string_or_empty,
    wire_to_model_string, wire_to_model_string_list, StringListValue, StringValue,
};

/// Host type name.
pub const RESOURCE_NAME: &str = "instana_alerting_config";

/// Current schema version.
pub const SCHEMA_VERSION: u64 = 2;

const FIELD_APPLICATION_ALERT_IDS: &str = "event_filter_application_alert_ids";

/// Model of an alerting configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertingConfigModel {
    /// Server-assigned id.
    pub id: StringValue,
    /// Alert name.
    pub alert_name: StringValue,
    /// Alerting channel ids.
    pub integration_ids: StringListValue,
    /// Dynamic focus query.
    pub event_filter_query: StringValue,
    /// Lower-case event types.
    pub event_filter_event_types: StringListValue,
    /// Rule ids.
    pub event_filter_rule_ids: StringListValue,
    /// Custom payload fields.
    #[serde(deserialize_with = "crate::value::null_as_empty")]
    pub custom_payload_field: Vec<CustomPayloadFieldModel>,
}

super::impl_resource_model!(AlertingConfigModel);

/// Lower-case event types, the form stored in state and sent on the wire.
pub fn normalize_event_types(event_types: &[String]) -> Vec<String> {
    event_types.iter().map(|t| t.to_lowercase()).collect()
}

fn base_schema(version: u64) -> Schema {
    Schema::new(version)
        .with_description("This resource manages alerting configurations in Instana.")
        .with_attribute("id", id_attribute("The ID of the alerting configuration."))
        .with_attribute(
            "alert_name",
            Attribute::required_string()
                .with_description("Configures the alert name of the alerting configuration")
                .with_validator(Validator::length_between(1, 256)),
        )
        .with_attribute(
            "integration_ids",
            Attribute::required_string_set()
                .with_description("Configures the list of Integration IDs (Alerting Channels).")
                .with_validator(Validator::size_between(0, 1024)),
        )
        .with_attribute(
            "event_filter_query",
            Attribute::optional_string()
                .with_description(
                    "Configures a filter query to to filter rules or event types for a limited set of entities",
                )
                .with_validator(Validator::length_between(0, 2048)),
        )
        .with_attribute(
            "event_filter_event_types",
            Attribute::optional_string_set()
                .with_description("Configures the list of Event Types IDs which should trigger an alert.")
                .with_validator(Validator::one_of_case_insensitive(&SUPPORTED_ALERT_EVENT_TYPES))
                .lowercase()
                .requires_replace(),
        )
        .with_attribute(
            "event_filter_rule_ids",
            Attribute::optional_string_set()
                .with_description("Configures the list of Rule IDs which should trigger an alert.")
                .with_validator(Validator::size_between(0, 1024))
                .requires_replace(),
        )
        .with_block(CUSTOM_PAYLOAD_FIELD, custom_payload_field_block())
}

/// The current schema.
pub fn schema() -> Schema {
    base_schema(SCHEMA_VERSION)
}

/// The version 1 schema, which also filtered on application alert ids.
pub fn schema_v1() -> Schema {
    base_schema(1).with_attribute(
        FIELD_APPLICATION_ALERT_IDS,
        Attribute::optional_string_set()
            .with_description("Configures the list of Application Alert IDs which should trigger an alert.")
            .with_validator(Validator::size_between(0, 1024))
            .use_state_for_unknown(),
    )
}

/// Drop the application alert filter that version 2 no longer declares.
fn upgrade_v1_to_v2(mut state: serde_json::Value) -> Result<serde_json::Value, ProviderError> {
    match state.as_object_mut() {
        Some(object) => {
            object.remove(FIELD_APPLICATION_ALERT_IDS);
            Ok(state)
        },
        None => Err(ProviderError::StateUpgrade(
            "alerting config state is not an object".to_string(),
        )),
    }
}

/// Handle of `instana_alerting_config`.
pub struct AlertingConfigHandle {
    metadata: ResourceMetaData,
}

impl AlertingConfigHandle {
    /// Create the handle.
    pub fn new() -> Self {
        Self {
            metadata: ResourceMetaData::new(RESOURCE_NAME, schema()),
        }
    }
}

impl Default for AlertingConfigHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceHandle for AlertingConfigHandle {
    type Model = AlertingConfigModel;
    type Wire = AlertingConfiguration;

    fn metadata(&self) -> &ResourceMetaData {
        &self.metadata
    }

    fn map_state_to_data_object(
        &self,
        plan: Option<&AlertingConfigModel>,
        state: Option<&AlertingConfigModel>,
    ) -> Result<AlertingConfiguration, Vec<Diagnostic>> {
        let model = resolve_input(plan, state).map_err(|e| vec![Diagnostic::from(e)])?;
        let custom_payload_fields = custom_payload_fields_to_wire(&model.custom_payload_field)?;

        Ok(AlertingConfiguration {
            id: model_to_wire_string_or_empty(&model.id),
            alert_name: model_to_wire_string_or_empty(&model.alert_name),
            integration_ids: model_to_wire_string_list(&model.integration_ids),
            event_filtering_configuration: EventFilteringConfiguration {
                query: model_to_wire_string(&model.event_filter_query),
                rule_ids: model_to_wire_string_list(&model.event_filter_rule_ids),
                event_types: normalize_event_types(&model_to_wire_string_list(
                    &model.event_filter_event_types,
                )),
                application_alert_config_ids: Vec::new(),
            },
            custom_payload_fields,
        })
    }

    fn update_state(
        &self,
        _state: Option<&AlertingConfigModel>,
        _plan: Option<&AlertingConfigModel>,
        wire: &AlertingConfiguration,
    ) -> Result<AlertingConfigModel, Vec<Diagnostic>> {
        let filter = &wire.event_filtering_configuration;

        Ok(AlertingConfigModel {
            id: wire_to_model_string(Some(&wire.id)),
            alert_name: wire_to_model_string(Some(&wire.alert_name)),
            integration_ids: StringListValue::Known(wire.integration_ids.clone()),
            event_filter_query: wire_to_model_string(filter.query.as_deref()),
            event_filter_event_types: wire_to_model_string_list(&normalize_event_types(
                &filter.event_types,
            )),
            event_filter_rule_ids: wire_to_model_string_list(&filter.rule_ids),
            custom_payload_field: custom_payload_fields_from_wire(&wire.custom_payload_fields),
        })
    }

    fn get_rest_resource(&self, api: &dyn InstanaApi) -> Arc<dyn RestResource<AlertingConfiguration>> {
        api.alerting_configurations()
    }

    fn state_upgraders(&self) -> BTreeMap<u64, StateUpgrader> {
        let mut upgraders: BTreeMap<u64, StateUpgrader> = BTreeMap::new();
        upgraders.insert(1, upgrade_v1_to_v2);
        upgraders
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::upgrade_state;
    use crate::plan::plan_resource;
    use crate::schema::PlanModifier;
    use crate::validation::validate;
    use proptest::prelude::*;
    use serde_json::json;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn model() -> AlertingConfigModel {
        AlertingConfigModel {
            id: StringValue::known("alert-1"),
            alert_name: StringValue::known("alert-x"),
            integration_ids: StringListValue::Known(strings(&["i1", "i2"])),
            event_filter_event_types: StringListValue::Known(strings(&["Critical", "WARNING"])),
            event_filter_rule_ids: StringListValue::Known(strings(&["r1"])),
            ..Default::default()
        }
    }

    #[test]
    fn test_event_types_lowercased_round_trip() {
        let handle = AlertingConfigHandle::new();
        let wire = handle.map_state_to_data_object(Some(&model()), None).unwrap();

        assert_eq!(wire.alert_name, "alert-x");
        assert_eq!(wire.integration_ids, strings(&["i1", "i2"]));
        assert_eq!(wire.event_filtering_configuration.event_types, strings(&["critical", "warning"]));
        assert_eq!(wire.event_filtering_configuration.rule_ids, strings(&["r1"]));
        assert_eq!(wire.event_filtering_configuration.query, None);

        let refreshed = handle.update_state(None, None, &wire).unwrap();
        assert_eq!(
            refreshed.event_filter_event_types,
            StringListValue::Known(strings(&["critical", "warning"]))
        );
        assert_eq!(refreshed.event_filter_rule_ids, StringListValue::Known(strings(&["r1"])));
        assert_eq!(refreshed.alert_name, StringValue::known("alert-x"));
        assert_eq!(refreshed.event_filter_query, StringValue::Null);

        let again = handle.map_state_to_data_object(Some(&refreshed), None).unwrap();
        assert_eq!(again, wire);
    }

    #[test]
    fn test_refreshed_state_replans_without_changes() {
        let handle = AlertingConfigHandle::new();
        let wire = handle.map_state_to_data_object(Some(&model()), None).unwrap();
        let refreshed = handle.update_state(None, None, &wire).unwrap();
        let state = serde_json::to_value(&refreshed).unwrap();

        let config = json!({
            "alert_name": "alert-x",
            "integration_ids": ["i2", "i1"],
            "event_filter_event_types": ["WARNING", "Critical"],
            "event_filter_rule_ids": ["r1"]
        });
        let plan = plan_resource(&schema(), Some(&state), config);

        assert!(!plan.has_changes(), "unexpected changes: {:?}", plan.changes);
        assert!(!plan.requires_replace);
        assert_eq!(plan.planned_state["event_filter_event_types"], json!(["critical", "warning"]));
    }

    #[test]
    fn test_empty_filters_read_as_null() {
        let handle = AlertingConfigHandle::new();
        let wire = AlertingConfiguration {
            id: "a1".to_string(),
            alert_name: "name".to_string(),
            integration_ids: Vec::new(),
            event_filtering_configuration: EventFilteringConfiguration {
                query: Some(String::new()),
                ..Default::default()
            },
            custom_payload_fields: Vec::new(),
        };

        let model = handle.update_state(None, None, &wire).unwrap();
        assert_eq!(model.integration_ids, StringListValue::Known(Vec::new()));
        assert_eq!(model.event_filter_query, StringValue::Null);
        assert_eq!(model.event_filter_event_types, StringListValue::Null);
        assert_eq!(model.event_filter_rule_ids, StringListValue::Null);
        assert!(model.custom_payload_field.is_empty());
    }

    #[test]
    fn test_state_fallback_and_missing_input() {
        let handle = AlertingConfigHandle::new();
        let wire = handle.map_state_to_data_object(None, Some(&model())).unwrap();
        assert_eq!(wire.id, "alert-1");

        let diagnostics = handle.map_state_to_data_object(None, None).unwrap_err();
        assert_eq!(diagnostics[0].summary, "Both plan and state are nil");
    }

    #[test]
    fn test_null_id_is_sent_empty() {
        let handle = AlertingConfigHandle::new();
        let mut model = model();
        model.id = StringValue::Null;
        assert_eq!(handle.map_state_to_data_object(Some(&model), None).unwrap().id, "");
    }

    #[test]
    fn test_custom_payload_errors_surface() {
        let handle = AlertingConfigHandle::new();
        let mut model = model();
        model.custom_payload_field = vec![CustomPayloadFieldModel {
            key: StringValue::known("k"),
            ..Default::default()
        }];

        let diagnostics = handle.map_state_to_data_object(Some(&model), None).unwrap_err();
        assert_eq!(diagnostics[0].summary, "custom_payload_field missing value");
    }

    #[test]
    fn test_schema_declarations() {
        let schema = schema();
        assert_eq!(schema.version, 2);
        assert!(schema.block.attributes["event_filter_event_types"]
            .has_plan_modifier(PlanModifier::RequiresReplace));
        assert!(schema.block.attributes["event_filter_event_types"]
            .has_plan_modifier(PlanModifier::Lowercase));
        assert!(schema.block.attributes["event_filter_rule_ids"]
            .has_plan_modifier(PlanModifier::RequiresReplace));
        assert!(!schema.block.attributes.contains_key(FIELD_APPLICATION_ALERT_IDS));

        let v1 = schema_v1();
        assert_eq!(v1.version, 1);
        assert!(v1.block.attributes.contains_key(FIELD_APPLICATION_ALERT_IDS));
    }

    #[test]
    fn test_schema_validation() {
        let schema = schema();
        let valid = json!({
            "alert_name": "cpu",
            "integration_ids": ["i1"],
            "event_filter_event_types": ["CRITICAL", "warning"]
        });
        assert!(validate(&schema, &valid).is_empty());

        let invalid = json!({
            "alert_name": "",
            "integration_ids": ["i1"],
            "event_filter_event_types": ["bogus"]
        });
        let diagnostics = validate(&schema, &invalid);
        assert_eq!(diagnostics.len(), 2);
    }

    #[test]
    fn test_upgrade_from_v1_drops_application_alert_ids() {
        let handle = AlertingConfigHandle::new();
        let v1_state = json!({
            "id": "a1",
            "alert_name": "cpu",
            "integration_ids": ["i1"],
            "event_filter_application_alert_ids": ["app-alert"],
            "event_filter_rule_ids": ["r1"]
        });

        let upgraded = upgrade_state(&handle.state_upgraders(), 1, SCHEMA_VERSION, v1_state).unwrap();
        assert!(upgraded.get(FIELD_APPLICATION_ALERT_IDS).is_none());

        let model: AlertingConfigModel = serde_json::from_value(upgraded).unwrap();
        assert_eq!(model.event_filter_rule_ids, StringListValue::Known(strings(&["r1"])));
        assert_eq!(model.alert_name, StringValue::known("cpu"));
    }

    #[test]
    fn test_upgrade_rejects_non_object() {
        assert!(upgrade_v1_to_v2(json!([1, 2])).is_err());
    }

    proptest! {
        #[test]
        fn normalize_event_types_is_idempotent(types in prop::collection::vec("[A-Za-z_]{1,12}", 0..6)) {
            let once = normalize_event_types(&types);
            prop_assert_eq!(normalize_event_types(&once), once);
        }
    }
}
