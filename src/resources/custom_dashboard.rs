//! `instana_custom_dashboard`: dashboards with an opaque widget document.
//!
//! Widgets are stored as a JSON string in canonical form, so key order and
//! whitespace chosen by the author or the server never produce a diff.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::access_rule::{access_rule_block, access_rules_from_wire, access_rules_to_wire, AccessRuleModel};
use super::id_attribute;
use crate::handle::{resolve_input, ResourceHandle, ResourceMetaData};
use crate::restapi::{CustomDashboard, InstanaApi, RestResource};
use crate::schema::{Attribute, Diagnostic, Schema, Validator};
use crate::value::{model_to_wire_string_or_empty, normalize_json, wire_to_model_string, StringValue};

/// Host type name.
pub const RESOURCE_NAME: &str = "instana_custom_dashboard";

/// Current schema version.
pub const SCHEMA_VERSION: u64 = 1;

const FIELD_WIDGETS: &str = "widgets";

/// Model of a custom dashboard.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomDashboardModel {
    /// Server-assigned id.
    pub id: StringValue,
    /// Title.
    pub title: StringValue,
    /// Widgets as a JSON array.
    pub widgets: StringValue,
    /// Access rules.
    #[serde(deserialize_with = "crate::value::null_as_empty")]
    pub access_rule: Vec<AccessRuleModel>,
}

super::impl_resource_model!(CustomDashboardModel);

/// The current schema.
pub fn schema() -> Schema {
    Schema::new(SCHEMA_VERSION)
        .with_description("This resource manages custom dashboards in Instana.")
        .with_attribute("id", id_attribute("The ID of the custom dashboard."))
        .with_attribute(
            "title",
            Attribute::required_string()
                .with_description("The title of the custom dashboard.")
                .with_validator(Validator::length_between(1, 256)),
        )
        .with_attribute(
            FIELD_WIDGETS,
            Attribute::required_string()
                .with_description("The json array containing the widgets configured for the custom dashboard.")
                .semantic_json(),
        )
        .with_block(
            "access_rule",
            access_rule_block("The access rules applied to the custom dashboard."),
        )
}

fn widgets_to_wire(widgets: &StringValue) -> Result<serde_json::Value, Diagnostic> {
    match widgets.as_known().filter(|w| !w.trim().is_empty()) {
        Some(text) => serde_json::from_str(&normalize_json(text)).map_err(|err| {
            Diagnostic::error("Error parsing widgets")
                .with_detail(format!("Widgets are not valid JSON: {}", err))
                .with_attribute(FIELD_WIDGETS)
        }),
        None => Ok(serde_json::Value::Null),
    }
}

fn widgets_from_wire(widgets: &serde_json::Value) -> Result<StringValue, Diagnostic> {
    if widgets.is_null() {
        return Ok(StringValue::Null);
    }
    serde_json::to_string(widgets)
        .map(|text| StringValue::Known(normalize_json(&text)))
        .map_err(|err| {
            Diagnostic::error("Error marshaling widgets")
                .with_detail(format!("Failed to marshal widgets: {}", err))
                .with_attribute(FIELD_WIDGETS)
        })
}

/// Handle of `instana_custom_dashboard`.
pub struct CustomDashboardHandle {
    metadata: ResourceMetaData,
}

impl CustomDashboardHandle {
    /// Create the handle.
    pub fn new() -> Self {
        Self {
            metadata: ResourceMetaData::new(RESOURCE_NAME, schema()),
        }
    }
}

impl Default for CustomDashboardHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceHandle for CustomDashboardHandle {
    type Model = CustomDashboardModel;
    type Wire = CustomDashboard;

    fn metadata(&self) -> &ResourceMetaData {
        &self.metadata
    }

    fn map_state_to_data_object(
        &self,
        plan: Option<&CustomDashboardModel>,
        state: Option<&CustomDashboardModel>,
    ) -> Result<CustomDashboard, Vec<Diagnostic>> {
        let model = resolve_input(plan, state).map_err(|e| vec![Diagnostic::from(e)])?;
        let widgets = widgets_to_wire(&model.widgets).map_err(|d| vec![d])?;

        Ok(CustomDashboard {
            id: model_to_wire_string_or_empty(&model.id),
            title: model_to_wire_string_or_empty(&model.title),
            access_rules: access_rules_to_wire(&model.access_rule),
            widgets,
        })
    }

    fn update_state(
        &self,
        _state: Option<&CustomDashboardModel>,
        plan: Option<&CustomDashboardModel>,
        wire: &CustomDashboard,
    ) -> Result<CustomDashboardModel, Vec<Diagnostic>> {
        // The server may reorder widgets and rules; keep what was applied.
        if let Some(plan) = plan {
            let mut model = plan.clone();
            model.id = wire_to_model_string(Some(&wire.id));
            model.title = wire_to_model_string(Some(&wire.title));
            return Ok(model);
        }

        Ok(CustomDashboardModel {
            id: wire_to_model_string(Some(&wire.id)),
            title: wire_to_model_string(Some(&wire.title)),
            widgets: widgets_from_wire(&wire.widgets).map_err(|d| vec![d])?,
            access_rule: access_rules_from_wire(&wire.access_rules),
        })
    }

    fn get_rest_resource(&self, api: &dyn InstanaApi) -> Arc<dyn RestResource<CustomDashboard>> {
        api.custom_dashboards()
    }
}
