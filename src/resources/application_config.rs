//! `instana_application_config`: application perspectives.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::access_rule::{access_rule_block, access_rules_from_wire, access_rules_to_wire, AccessRuleModel};
use super::id_attribute;
use crate::handle::{resolve_input, ResourceHandle, ResourceMetaData};
use crate::restapi::{
    ApplicationConfig, InstanaApi, RestResource, SUPPORTED_APPLICATION_CONFIG_SCOPES,
    SUPPORTED_BOUNDARY_SCOPES,
};
use crate::schema::{Attribute, Diagnostic, Schema, Validator};
use crate::tagfilter::{tag_filter_from_model, tag_filter_to_model};
use crate::value::{model_to_wire_string_or_empty, wire_to_model_string, StringValue};

/// Host type name.
pub const RESOURCE_NAME: &str = "instana_application_config";

/// Current schema version.
pub const SCHEMA_VERSION: u64 = 4;

/// Scope used when none is configured.
pub const DEFAULT_SCOPE: &str = "INCLUDE_NO_DOWNSTREAM";

/// Boundary scope used when none is configured.
pub const DEFAULT_BOUNDARY_SCOPE: &str = "DEFAULT";

const FIELD_TAG_FILTER: &str = "tag_filter";

/// Model of an application perspective.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationConfigModel {
    /// Server-assigned id.
    pub id: StringValue,
    /// Display label.
    pub label: StringValue,
    /// Downstream scope.
    pub scope: StringValue,
    /// Boundary scope.
    pub boundary_scope: StringValue,
    /// Canonical tag filter expression.
    pub tag_filter: StringValue,
    /// Access rules in configuration order.
    #[serde(deserialize_with = "crate::value::null_as_empty")]
    pub access_rules: Vec<AccessRuleModel>,
}

super::impl_resource_model!(ApplicationConfigModel);

/// The current schema.
pub fn schema() -> Schema {
    Schema::new(SCHEMA_VERSION)
        .with_description("This resource manages application configurations in Instana.")
        .with_attribute("id", id_attribute("The ID of the application configuration."))
        .with_attribute(
            "label",
            Attribute::required_string()
                .with_description("The label of the application config")
                .with_validator(Validator::length_between(1, 256)),
        )
        .with_attribute(
            "scope",
            Attribute::optional_computed_string()
                .with_description("The scope of the application config")
                .with_validator(Validator::one_of(&SUPPORTED_APPLICATION_CONFIG_SCOPES))
                .with_default(serde_json::Value::from(DEFAULT_SCOPE)),
        )
        .with_attribute(
            "boundary_scope",
            Attribute::optional_computed_string()
                .with_description("The boundary scope of the application config")
                .with_validator(Validator::one_of(&SUPPORTED_BOUNDARY_SCOPES))
                .with_default(serde_json::Value::from(DEFAULT_BOUNDARY_SCOPE)),
        )
        .with_attribute(
            FIELD_TAG_FILTER,
            Attribute::optional_computed_string()
                .with_description("The tag filter expression")
                .use_state_for_unknown(),
        )
        .with_block(
            "access_rules",
            access_rule_block("The access rules applied to the application config"),
        )
}

fn string_or(value: &StringValue, default: &str) -> String {
    value
        .as_known()
        .filter(|v| !v.is_empty())
        .cloned()
        .unwrap_or_else(|| default.to_string())
}

/// Handle of `instana_application_config`.
pub struct ApplicationConfigHandle {
    metadata: ResourceMetaData,
}

impl ApplicationConfigHandle {
    /// Create the handle.
    pub fn new() -> Self {
        Self {
            metadata: ResourceMetaData::new(RESOURCE_NAME, schema()),
        }
    }
}

impl Default for ApplicationConfigHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceHandle for ApplicationConfigHandle {
    type Model = ApplicationConfigModel;
    type Wire = ApplicationConfig;

    fn metadata(&self) -> &ResourceMetaData {
        &self.metadata
    }

    fn map_state_to_data_object(
        &self,
        plan: Option<&ApplicationConfigModel>,
        state: Option<&ApplicationConfigModel>,
    ) -> Result<ApplicationConfig, Vec<Diagnostic>> {
        let model = resolve_input(plan, state).map_err(|e| vec![Diagnostic::from(e)])?;

        let tag_filter = tag_filter_from_model(&model.tag_filter)
            .map_err(|e| vec![e.into_diagnostic_at(FIELD_TAG_FILTER)])?;

        Ok(ApplicationConfig {
            id: model_to_wire_string_or_empty(&model.id),
            label: model_to_wire_string_or_empty(&model.label),
            scope: string_or(&model.scope, DEFAULT_SCOPE),
            boundary_scope: string_or(&model.boundary_scope, DEFAULT_BOUNDARY_SCOPE),
            tag_filter_expression: Some(tag_filter),
            access_rules: access_rules_to_wire(&model.access_rules),
        })
    }

    fn update_state(
        &self,
        _state: Option<&ApplicationConfigModel>,
        _plan: Option<&ApplicationConfigModel>,
        wire: &ApplicationConfig,
    ) -> Result<ApplicationConfigModel, Vec<Diagnostic>> {
        let tag_filter = tag_filter_to_model(wire.tag_filter_expression.as_ref()).map_err(|e| {
            vec![Diagnostic::error("Error converting tag filter")
                .with_detail(e.to_string())
                .with_attribute(FIELD_TAG_FILTER)]
        })?;

        Ok(ApplicationConfigModel {
            id: wire_to_model_string(Some(&wire.id)),
            label: wire_to_model_string(Some(&wire.label)),
            scope: wire_to_model_string(Some(&wire.scope)),
            boundary_scope: wire_to_model_string(Some(&wire.boundary_scope)),
            tag_filter,
            access_rules: access_rules_from_wire(&wire.access_rules),
        })
    }

    fn get_rest_resource(&self, api: &dyn InstanaApi) -> Arc<dyn RestResource<ApplicationConfig>> {
        api.application_configs()
    }
}
