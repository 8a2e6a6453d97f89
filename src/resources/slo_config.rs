//! `instana_slo_config`: service level objectives.
//!
//! The entity, indicator and time window are discriminated unions. The model
//! holds one optional block per variant and exactly one of them must be set;
//! the wire record is flat and tagged by `type` (and `blueprint` for
//! indicators). SLO ids are minted by the client with the `SLOTF` prefix.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::id_attribute;
use crate::error::ProviderError;
use crate::handle::{collect, exactly_one, resolve_input, ResourceHandle, ResourceMetaData};
use crate::restapi::slo_config::{
    blueprint, entity_type, measurement_type, time_window_type, DEFAULT_AGGREGATION,
    SUPPORTED_OPERATORS, SUPPORTED_TRAFFIC_TYPES,
};
use crate::restapi::{
    InstanaApi, RbacTag, RestResource, SloConfig, SloEntity, SloIndicator, SloTimeWindow, TagFilter,
};
use crate::schema::{Attribute, Block, Diagnostic, NestedBlock, Schema, Validator};
use crate::tagfilter::{tag_filter_from_model, tag_filter_to_model};
use crate::value::{
    generate_id, model_to_wire_bool, model_to_wire_float64, model_to_wire_int64,
    model_to_wire_string, model_to_wire_string_list, model_to_wire_string_or_empty,
    wire_to_model_bool, wire_to_model_float64, wire_to_model_int64, wire_to_model_string,
    wire_to_model_string_list, BoolValue, Float64Value, Int64Value, StringListValue, StringValue,
};

/// Host type name.
pub const RESOURCE_NAME: &str = "instana_slo_config";

/// Current schema version.
pub const SCHEMA_VERSION: u64 = 1;

/// Prefix of client-minted SLO ids.
pub const ID_PREFIX: &str = "SLOTF";

/// Operator used by traffic indicators when none is configured.
pub const DEFAULT_TRAFFIC_OPERATOR: &str = ">=";

const FIELD_ENTITY: &str = "entity";
const FIELD_INDICATOR: &str = "indicator";
const FIELD_TIME_WINDOW: &str = "time_window";
const FIELD_FILTER_EXPRESSION: &str = "filter_expression";

const ERR_APPLICATION_REQUIRED: &str = "application_id and boundary_scope are required for application entity";
const ERR_WEBSITE_REQUIRED: &str = "website_id and beacon_type are required for website entity";
const ERR_SYNTHETIC_REQUIRED: &str = "synthetic_test_ids is required for synthetic entity";
const ERR_INFRASTRUCTURE_REQUIRED: &str = "infra_type is required for infrastructure entity";
const ERR_TIME_BASED_LATENCY_REQUIRED: &str =
    "threshold and aggregation are required for time_based_latency indicator";
const ERR_EVENT_BASED_LATENCY_REQUIRED: &str = "threshold is required for event_based_latency indicator";
const ERR_TIME_BASED_AVAILABILITY_REQUIRED: &str =
    "threshold and aggregation are required for time_based_availability indicator";
const ERR_TRAFFIC_REQUIRED: &str = "threshold is required for traffic indicator";
const ERR_CUSTOM_REQUIRED: &str = "good_event_filter_expression is required for custom indicator";
const ERR_SATURATION_REQUIRED: &str = "threshold and operator are required for saturation indicator";
const ERR_ROLLING_REQUIRED: &str = "duration and duration_unit are required for rolling time window";
const ERR_FIXED_REQUIRED: &str =
    "duration, duration_unit and start_timestamp are required for fixed time window";

// =========================================================================
// Model
// =========================================================================

/// Model of an SLO configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SloConfigModel {
    /// Client-minted id.
    pub id: StringValue,
    /// Name.
    pub name: StringValue,
    /// Target ratio.
    pub target: Float64Value,
    /// Free-form tags.
    pub tags: StringListValue,
    /// RBAC tags.
    #[serde(deserialize_with = "crate::value::null_as_empty")]
    pub rbac_tags: Vec<RbacTagModel>,
    /// Measured entity.
    pub entity: Option<EntityModel>,
    /// Indicator.
    pub indicator: Option<IndicatorModel>,
    /// Evaluation window.
    pub time_window: Option<TimeWindowModel>,
}

super::impl_resource_model!(SloConfigModel);

/// RBAC tag of an SLO.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RbacTagModel {
    /// Display name.
    pub display_name: StringValue,
    /// Tag id.
    pub id: StringValue,
}

/// Entity union.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct EntityModel {
    pub application: Option<ApplicationEntityModel>,
    pub website: Option<WebsiteEntityModel>,
    pub synthetic: Option<SyntheticEntityModel>,
    pub infrastructure: Option<InfrastructureEntityModel>,
}

/// Application, service or endpoint.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct ApplicationEntityModel {
    pub application_id: StringValue,
    pub service_id: StringValue,
    pub endpoint_id: StringValue,
    pub boundary_scope: StringValue,
    pub include_synthetic: BoolValue,
    pub include_internal: BoolValue,
    pub filter_expression: StringValue,
}

/// Website monitored by EUM.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct WebsiteEntityModel {
    pub website_id: StringValue,
    pub beacon_type: StringValue,
    pub filter_expression: StringValue,
}

/// Synthetic tests.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct SyntheticEntityModel {
    pub synthetic_test_ids: StringListValue,
    pub filter_expression: StringValue,
}

/// Infrastructure entities of one type.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct InfrastructureEntityModel {
    pub infra_type: StringValue,
    pub filter_expression: StringValue,
}

/// Indicator union.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct IndicatorModel {
    pub time_based_latency: Option<TimeBasedIndicatorModel>,
    pub event_based_latency: Option<EventBasedLatencyIndicatorModel>,
    pub time_based_availability: Option<TimeBasedIndicatorModel>,
    pub event_based_availability: Option<EventBasedAvailabilityIndicatorModel>,
    pub traffic: Option<TrafficIndicatorModel>,
    pub custom: Option<CustomIndicatorModel>,
    pub saturation: Option<SaturationIndicatorModel>,
}

/// Threshold and aggregation of a time based latency or availability indicator.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct TimeBasedIndicatorModel {
    pub threshold: Float64Value,
    pub aggregation: StringValue,
}

/// Event based latency.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct EventBasedLatencyIndicatorModel {
    pub threshold: Float64Value,
}

/// Event based availability; it has no settings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EventBasedAvailabilityIndicatorModel {}

/// Traffic.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct TrafficIndicatorModel {
    pub traffic_type: StringValue,
    pub threshold: Float64Value,
    pub operator: StringValue,
}

/// Ratio of good to bad events selected by tag filters.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct CustomIndicatorModel {
    pub good_event_filter_expression: StringValue,
    pub bad_event_filter_expression: StringValue,
}

/// Saturation of an infrastructure metric.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct SaturationIndicatorModel {
    pub metric_name: StringValue,
    pub threshold: Float64Value,
    pub aggregation: StringValue,
    pub operator: StringValue,
}

/// Time window union.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct TimeWindowModel {
    pub rolling: Option<RollingTimeWindowModel>,
    pub fixed: Option<FixedTimeWindowModel>,
}

/// Window that moves with the current time.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct RollingTimeWindowModel {
    pub duration: Int64Value,
    pub duration_unit: StringValue,
    pub timezone: StringValue,
}

/// Window anchored at a start time.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct FixedTimeWindowModel {
    pub duration: Int64Value,
    pub duration_unit: StringValue,
    pub timezone: StringValue,
    pub start_timestamp: Float64Value,
}

// =========================================================================
// Schema
// =========================================================================

fn threshold() -> Attribute {
    Attribute::optional_float64().with_description("The threshold for the metric configuration")
}

fn aggregation() -> Attribute {
    Attribute::optional_string().with_description("The aggregation type for the metric configuration")
}

fn operator() -> Attribute {
    Attribute::optional_string()
        .with_description("The comparison operator for the metric configuration")
        .with_validator(Validator::one_of(&SUPPORTED_OPERATORS))
}

fn filter_expression() -> Attribute {
    Attribute::optional_string().with_description("Entity filter")
}

fn variant(description: &str, block: Block) -> NestedBlock {
    NestedBlock::single(block.with_description(description))
}

fn entity_block() -> NestedBlock {
    variant(
        "The entity to use for the SLO configuration",
        Block::new()
            .with_block(
                "application",
                variant(
                    "Application entity of SLO",
                    Block::new()
                        .with_attribute(
                            "application_id",
                            Attribute::optional_string().with_description("The application ID of the entity"),
                        )
                        .with_attribute(
                            "service_id",
                            Attribute::optional_string().with_description("The service ID of the entity"),
                        )
                        .with_attribute(
                            "endpoint_id",
                            Attribute::optional_string().with_description("The endpoint ID of the entity"),
                        )
                        .with_attribute(
                            "boundary_scope",
                            Attribute::optional_string()
                                .with_description("The boundary scope for the entity configuration (ALL, INBOUND)")
                                .with_validator(Validator::one_of(&["ALL", "INBOUND"])),
                        )
                        .with_attribute(
                            "include_synthetic",
                            Attribute::optional_bool()
                                .with_description("Whether synthetic calls are included")
                                .with_default(serde_json::Value::Bool(false)),
                        )
                        .with_attribute(
                            "include_internal",
                            Attribute::optional_bool()
                                .with_description("Whether internal calls are included")
                                .with_default(serde_json::Value::Bool(false)),
                        )
                        .with_attribute(FIELD_FILTER_EXPRESSION, filter_expression()),
                ),
            )
            .with_block(
                "website",
                variant(
                    "Website entity of SLO",
                    Block::new()
                        .with_attribute(
                            "website_id",
                            Attribute::optional_string().with_description("The website ID of the entity"),
                        )
                        .with_attribute(
                            "beacon_type",
                            Attribute::optional_string().with_description("The beacon type for the entity configuration"),
                        )
                        .with_attribute(FIELD_FILTER_EXPRESSION, filter_expression()),
                ),
            )
            .with_block(
                "synthetic",
                variant(
                    "Synthetic entity of SLO",
                    Block::new()
                        .with_attribute(
                            "synthetic_test_ids",
                            Attribute::optional_string_set().with_description("The synthetic test IDs of the entity"),
                        )
                        .with_attribute(FIELD_FILTER_EXPRESSION, filter_expression()),
                ),
            )
            .with_block(
                "infrastructure",
                variant(
                    "Infrastructure entity of SLO",
                    Block::new()
                        .with_attribute(
                            "infra_type",
                            Attribute::optional_string()
                                .with_description("The infrastructure type (e.g., kubernetesCluster)"),
                        )
                        .with_attribute(FIELD_FILTER_EXPRESSION, filter_expression()),
                ),
            ),
    )
}

fn indicator_block() -> NestedBlock {
    let time_based = || {
        Block::new()
            .with_attribute("threshold", threshold())
            .with_attribute("aggregation", aggregation())
    };

    variant(
        "The indicator to use for the SLO configuration",
        Block::new()
            .with_block("time_based_latency", variant("Time based latency indicator", time_based()))
            .with_block(
                "event_based_latency",
                variant(
                    "Event based latency indicator",
                    Block::new().with_attribute("threshold", threshold()),
                ),
            )
            .with_block(
                "time_based_availability",
                variant("Time based availability indicator", time_based()),
            )
            .with_block(
                "event_based_availability",
                variant("Event based availability indicator", Block::new()),
            )
            .with_block(
                "traffic",
                variant(
                    "Traffic indicator",
                    Block::new()
                        .with_attribute(
                            "traffic_type",
                            Attribute::optional_string()
                                .with_description("The traffic type for the indicator")
                                .with_validator(Validator::one_of(&SUPPORTED_TRAFFIC_TYPES)),
                        )
                        .with_attribute("threshold", threshold())
                        .with_attribute(
                            "operator",
                            operator().with_default(serde_json::Value::from(DEFAULT_TRAFFIC_OPERATOR)),
                        ),
                ),
            )
            .with_block(
                "custom",
                variant(
                    "Custom indicator",
                    Block::new()
                        .with_attribute(
                            "good_event_filter_expression",
                            Attribute::optional_string().with_description("Good event filter expression"),
                        )
                        .with_attribute(
                            "bad_event_filter_expression",
                            Attribute::optional_string().with_description("Bad event filter expression"),
                        ),
                ),
            )
            .with_block(
                "saturation",
                variant(
                    "Saturation indicator",
                    Block::new()
                        .with_attribute(
                            "metric_name",
                            Attribute::optional_string().with_description("The metric name for saturation indicator"),
                        )
                        .with_attribute("threshold", threshold())
                        .with_attribute("aggregation", aggregation())
                        .with_attribute("operator", operator()),
                ),
            ),
    )
}

fn time_window_block() -> NestedBlock {
    let window = || {
        Block::new()
            .with_attribute(
                "duration",
                Attribute::optional_int64().with_description("The duration of the time window"),
            )
            .with_attribute(
                "duration_unit",
                Attribute::optional_string().with_description("The duration unit of the time window (day, week)"),
            )
            .with_attribute(
                "timezone",
                Attribute::optional_string().with_description("The timezone for the SLO configuration"),
            )
    };

    variant(
        "The time window to use for the SLO configuration",
        Block::new()
            .with_block("rolling", variant("Rolling time window", window()))
            .with_block(
                "fixed",
                variant(
                    "Fixed time window",
                    window().with_attribute(
                        "start_timestamp",
                        Attribute::optional_float64().with_description("Time window start time"),
                    ),
                ),
            ),
    )
}

/// The current schema.
pub fn schema() -> Schema {
    Schema::new(SCHEMA_VERSION)
        .with_description("This resource manages SLO Configurations in Instana.")
        .with_attribute("id", id_attribute("The ID of the SLO configuration"))
        .with_attribute(
            "name",
            Attribute::required_string()
                .with_description("The name of the SLO configuration")
                .with_validator(Validator::length_between(1, 256)),
        )
        .with_attribute(
            "target",
            Attribute::required_float64().with_description("The target of the SLO configuration"),
        )
        .with_attribute(
            "tags",
            Attribute::optional_string_list().with_description("The tags of the SLO configuration"),
        )
        .with_block(
            "rbac_tags",
            NestedBlock::list(
                Block::new()
                    .with_description("RBAC tags for the SLO configuration")
                    .with_attribute(
                        "display_name",
                        Attribute::required_string().with_description("Display name of the RBAC tag"),
                    )
                    .with_attribute("id", Attribute::required_string().with_description("ID of the RBAC tag")),
            ),
        )
        .with_block(FIELD_ENTITY, entity_block())
        .with_block(FIELD_INDICATOR, indicator_block())
        .with_block(FIELD_TIME_WINDOW, time_window_block())
}

// =========================================================================
// Model -> wire
// =========================================================================

fn mandatory(path: &str, message: &str) -> ProviderError {
    ProviderError::MissingMandatoryField {
        path: path.to_string(),
        message: message.to_string(),
    }
}

fn filter_at(path: &str, expression: &StringValue) -> Result<TagFilter, Diagnostic> {
    tag_filter_from_model(expression).map_err(|e| e.into_diagnostic_at(path))
}

enum EntityVariant<'a> {
    Application(&'a ApplicationEntityModel),
    Website(&'a WebsiteEntityModel),
    Synthetic(&'a SyntheticEntityModel),
    Infrastructure(&'a InfrastructureEntityModel),
}

fn entity_to_wire(entity: Option<&EntityModel>) -> Result<SloEntity, Diagnostic> {
    let entity = entity.cloned().unwrap_or_default();
    let chosen = exactly_one(
        FIELD_ENTITY,
        [
            (entity_type::APPLICATION, entity.application.as_ref().map(EntityVariant::Application)),
            (entity_type::WEBSITE, entity.website.as_ref().map(EntityVariant::Website)),
            (entity_type::SYNTHETIC, entity.synthetic.as_ref().map(EntityVariant::Synthetic)),
            (
                entity_type::INFRASTRUCTURE,
                entity.infrastructure.as_ref().map(EntityVariant::Infrastructure),
            ),
        ],
    )?;

    match chosen {
        EntityVariant::Application(app) => {
            let path = "entity.application";
            let (Some(application_id), Some(boundary_scope)) =
                (app.application_id.as_known(), app.boundary_scope.as_known())
            else {
                return Err(mandatory(path, ERR_APPLICATION_REQUIRED).into());
            };
            Ok(SloEntity {
                entity_type: entity_type::APPLICATION.to_string(),
                application_id: Some(application_id.clone()),
                service_id: model_to_wire_string(&app.service_id),
                endpoint_id: model_to_wire_string(&app.endpoint_id),
                boundary_scope: Some(boundary_scope.clone()),
                include_synthetic: Some(model_to_wire_bool(&app.include_synthetic).unwrap_or(false)),
                include_internal: Some(model_to_wire_bool(&app.include_internal).unwrap_or(false)),
                tag_filter_expression: Some(filter_at(
                    "entity.application.filter_expression",
                    &app.filter_expression,
                )?),
                ..Default::default()
            })
        },
        EntityVariant::Website(website) => {
            let path = "entity.website";
            let (Some(website_id), Some(beacon_type)) =
                (website.website_id.as_known(), website.beacon_type.as_known())
            else {
                return Err(mandatory(path, ERR_WEBSITE_REQUIRED).into());
            };
            Ok(SloEntity {
                entity_type: entity_type::WEBSITE.to_string(),
                website_id: Some(website_id.clone()),
                beacon_type: Some(beacon_type.clone()),
                tag_filter_expression: Some(filter_at(
                    "entity.website.filter_expression",
                    &website.filter_expression,
                )?),
                ..Default::default()
            })
        },
        EntityVariant::Synthetic(synthetic) => {
            let path = "entity.synthetic";
            let Some(test_ids) = synthetic.synthetic_test_ids.as_known().filter(|ids| !ids.is_empty())
            else {
                return Err(mandatory(path, ERR_SYNTHETIC_REQUIRED).into());
            };
            Ok(SloEntity {
                entity_type: entity_type::SYNTHETIC.to_string(),
                synthetic_test_ids: Some(test_ids.clone()),
                tag_filter_expression: Some(filter_at(
                    "entity.synthetic.filter_expression",
                    &synthetic.filter_expression,
                )?),
                ..Default::default()
            })
        },
        EntityVariant::Infrastructure(infra) => {
            let path = "entity.infrastructure";
            let Some(infra_type) = infra.infra_type.as_known() else {
                return Err(mandatory(path, ERR_INFRASTRUCTURE_REQUIRED).into());
            };
            Ok(SloEntity {
                entity_type: entity_type::INFRASTRUCTURE.to_string(),
                infra_type: Some(infra_type.clone()),
                tag_filter_expression: Some(filter_at(
                    "entity.infrastructure.filter_expression",
                    &infra.filter_expression,
                )?),
                ..Default::default()
            })
        },
    }
}

enum IndicatorVariant<'a> {
    TimeBasedLatency(&'a TimeBasedIndicatorModel),
    EventBasedLatency(&'a EventBasedLatencyIndicatorModel),
    TimeBasedAvailability(&'a TimeBasedIndicatorModel),
    EventBasedAvailability,
    Traffic(&'a TrafficIndicatorModel),
    Custom(&'a CustomIndicatorModel),
    Saturation(&'a SaturationIndicatorModel),
}

fn time_based(
    blueprint: &str,
    model: &TimeBasedIndicatorModel,
    path: &str,
    message: &str,
) -> Result<SloIndicator, ProviderError> {
    let (Some(threshold), Some(aggregation)) = (model.threshold.as_known(), model.aggregation.as_known())
    else {
        return Err(mandatory(path, message));
    };
    let mut indicator = SloIndicator::new(blueprint, measurement_type::TIME_BASED);
    indicator.threshold = *threshold;
    indicator.aggregation = Some(aggregation.clone());
    Ok(indicator)
}

fn event_based(blueprint: &str) -> SloIndicator {
    let mut indicator = SloIndicator::new(blueprint, measurement_type::EVENT_BASED);
    indicator.aggregation = Some(DEFAULT_AGGREGATION.to_string());
    indicator
}

fn indicator_to_wire(indicator: Option<&IndicatorModel>) -> Result<SloIndicator, Diagnostic> {
    let indicator = indicator.cloned().unwrap_or_default();
    let chosen = exactly_one(
        FIELD_INDICATOR,
        [
            (
                "time_based_latency",
                indicator.time_based_latency.as_ref().map(IndicatorVariant::TimeBasedLatency),
            ),
            (
                "event_based_latency",
                indicator.event_based_latency.as_ref().map(IndicatorVariant::EventBasedLatency),
            ),
            (
                "time_based_availability",
                indicator
                    .time_based_availability
                    .as_ref()
                    .map(IndicatorVariant::TimeBasedAvailability),
            ),
            (
                "event_based_availability",
                indicator
                    .event_based_availability
                    .as_ref()
                    .map(|_| IndicatorVariant::EventBasedAvailability),
            ),
            ("traffic", indicator.traffic.as_ref().map(IndicatorVariant::Traffic)),
            ("custom", indicator.custom.as_ref().map(IndicatorVariant::Custom)),
            ("saturation", indicator.saturation.as_ref().map(IndicatorVariant::Saturation)),
        ],
    )?;

    let wire = match chosen {
        IndicatorVariant::TimeBasedLatency(model) => time_based(
            blueprint::LATENCY,
            model,
            "indicator.time_based_latency",
            ERR_TIME_BASED_LATENCY_REQUIRED,
        )?,
        IndicatorVariant::TimeBasedAvailability(model) => time_based(
            blueprint::AVAILABILITY,
            model,
            "indicator.time_based_availability",
            ERR_TIME_BASED_AVAILABILITY_REQUIRED,
        )?,
        IndicatorVariant::EventBasedLatency(model) => {
            let Some(threshold) = model.threshold.as_known() else {
                return Err(mandatory("indicator.event_based_latency", ERR_EVENT_BASED_LATENCY_REQUIRED).into());
            };
            let mut wire = event_based(blueprint::LATENCY);
            wire.threshold = *threshold;
            wire
        },
        IndicatorVariant::EventBasedAvailability => event_based(blueprint::AVAILABILITY),
        IndicatorVariant::Traffic(model) => {
            let Some(threshold) = model.threshold.as_known() else {
                return Err(mandatory("indicator.traffic", ERR_TRAFFIC_REQUIRED).into());
            };
            let mut wire = SloIndicator::new(blueprint::TRAFFIC, measurement_type::TIME_BASED);
            wire.threshold = *threshold;
            wire.traffic_type = model_to_wire_string(&model.traffic_type);
            wire.operator = Some(
                model_to_wire_string(&model.operator)
                    .unwrap_or_else(|| DEFAULT_TRAFFIC_OPERATOR.to_string()),
            );
            wire.aggregation = Some(DEFAULT_AGGREGATION.to_string());
            wire
        },
        IndicatorVariant::Custom(model) => {
            if !model.good_event_filter_expression.is_known() {
                return Err(mandatory("indicator.custom", ERR_CUSTOM_REQUIRED).into());
            }
            let mut wire = event_based(blueprint::CUSTOM);
            wire.good_events_filter = Some(filter_at(
                "indicator.custom.good_event_filter_expression",
                &model.good_event_filter_expression,
            )?);
            wire.bad_events_filter = Some(filter_at(
                "indicator.custom.bad_event_filter_expression",
                &model.bad_event_filter_expression,
            )?);
            wire
        },
        IndicatorVariant::Saturation(model) => {
            let (Some(threshold), Some(operator)) = (model.threshold.as_known(), model.operator.as_known())
            else {
                return Err(mandatory("indicator.saturation", ERR_SATURATION_REQUIRED).into());
            };
            let mut wire = SloIndicator::new(blueprint::SATURATION, measurement_type::TIME_BASED);
            wire.threshold = *threshold;
            wire.operator = Some(operator.clone());
            wire.aggregation = model_to_wire_string(&model.aggregation);
            wire.metric_name = model_to_wire_string(&model.metric_name);
            wire
        },
    };

    Ok(wire)
}

fn time_window_to_wire(window: Option<&TimeWindowModel>) -> Result<SloTimeWindow, Diagnostic> {
    let window = window.cloned().unwrap_or_default();
    let chosen = exactly_one(
        FIELD_TIME_WINDOW,
        [
            (time_window_type::ROLLING, window.rolling.as_ref().map(Ok)),
            (time_window_type::FIXED, window.fixed.as_ref().map(Err)),
        ],
    )?;

    match chosen {
        Ok(rolling) => {
            let (Some(duration), Some(unit)) =
                (model_to_wire_int64(&rolling.duration), rolling.duration_unit.as_known())
            else {
                return Err(mandatory("time_window.rolling", ERR_ROLLING_REQUIRED).into());
            };
            Ok(SloTimeWindow {
                window_type: time_window_type::ROLLING.to_string(),
                duration,
                duration_unit: unit.clone(),
                timezone: model_to_wire_string_or_empty(&rolling.timezone),
                start_timestamp: 0.0,
            })
        },
        Err(fixed) => {
            let (Some(duration), Some(unit), Some(start)) = (
                model_to_wire_int64(&fixed.duration),
                fixed.duration_unit.as_known(),
                model_to_wire_float64(&fixed.start_timestamp),
            ) else {
                return Err(mandatory("time_window.fixed", ERR_FIXED_REQUIRED).into());
            };
            Ok(SloTimeWindow {
                window_type: time_window_type::FIXED.to_string(),
                duration,
                duration_unit: unit.clone(),
                timezone: model_to_wire_string_or_empty(&fixed.timezone),
                start_timestamp: start,
            })
        },
    }
}

// =========================================================================
// Wire -> model
// =========================================================================

fn filter_from_wire(path: &str, filter: Option<&TagFilter>) -> Result<StringValue, Diagnostic> {
    tag_filter_to_model(filter).map_err(|e| {
        Diagnostic::error("Error normalizing filter expression")
            .with_detail(e.to_string())
            .with_attribute(path)
    })
}

fn entity_from_wire(entity: &SloEntity) -> Result<EntityModel, Diagnostic> {
    let filter = |variant: &str| {
        filter_from_wire(
            &format!("entity.{}.filter_expression", variant),
            entity.tag_filter_expression.as_ref(),
        )
    };

    let mut model = EntityModel::default();
    match entity.entity_type.as_str() {
        entity_type::APPLICATION => {
            model.application = Some(ApplicationEntityModel {
                application_id: wire_to_model_string(entity.application_id.as_deref()),
                service_id: wire_to_model_string(entity.service_id.as_deref()),
                endpoint_id: wire_to_model_string(entity.endpoint_id.as_deref()),
                boundary_scope: wire_to_model_string(entity.boundary_scope.as_deref()),
                include_synthetic: wire_to_model_bool(entity.include_synthetic),
                include_internal: wire_to_model_bool(entity.include_internal),
                filter_expression: filter(entity_type::APPLICATION)?,
            })
        },
        entity_type::WEBSITE => {
            model.website = Some(WebsiteEntityModel {
                website_id: wire_to_model_string(entity.website_id.as_deref()),
                beacon_type: wire_to_model_string(entity.beacon_type.as_deref()),
                filter_expression: filter(entity_type::WEBSITE)?,
            })
        },
        entity_type::SYNTHETIC => {
            model.synthetic = Some(SyntheticEntityModel {
                synthetic_test_ids: wire_to_model_string_list(
                    entity.synthetic_test_ids.as_deref().unwrap_or_default(),
                ),
                filter_expression: filter(entity_type::SYNTHETIC)?,
            })
        },
        entity_type::INFRASTRUCTURE => {
            model.infrastructure = Some(InfrastructureEntityModel {
                infra_type: wire_to_model_string(entity.infra_type.as_deref()),
                filter_expression: filter(entity_type::INFRASTRUCTURE)?,
            })
        },
        other => {
            return Err(ProviderError::UnsupportedVariant(format!("Unsupported entity type: {}", other))
                .into_diagnostic_at(FIELD_ENTITY))
        },
    }
    Ok(model)
}

fn indicator_from_wire(indicator: &SloIndicator) -> Result<IndicatorModel, Diagnostic> {
    let threshold = wire_to_model_float64(Some(indicator.threshold));
    let mut model = IndicatorModel::default();

    match (indicator.blueprint.as_str(), indicator.measurement_type.as_str()) {
        (blueprint::LATENCY, measurement_type::TIME_BASED) => {
            model.time_based_latency = Some(TimeBasedIndicatorModel {
                threshold,
                aggregation: wire_to_model_string(indicator.aggregation.as_deref()),
            })
        },
        (blueprint::LATENCY, measurement_type::EVENT_BASED) => {
            model.event_based_latency = Some(EventBasedLatencyIndicatorModel { threshold })
        },
        (blueprint::AVAILABILITY, measurement_type::TIME_BASED) => {
            model.time_based_availability = Some(TimeBasedIndicatorModel {
                threshold,
                aggregation: wire_to_model_string(indicator.aggregation.as_deref()),
            })
        },
        (blueprint::AVAILABILITY, measurement_type::EVENT_BASED) => {
            model.event_based_availability = Some(EventBasedAvailabilityIndicatorModel {})
        },
        (blueprint::TRAFFIC, _) => {
            model.traffic = Some(TrafficIndicatorModel {
                traffic_type: wire_to_model_string(indicator.traffic_type.as_deref()),
                threshold,
                operator: wire_to_model_string(indicator.operator.as_deref()),
            })
        },
        (blueprint::CUSTOM, measurement_type::EVENT_BASED) => {
            model.custom = Some(CustomIndicatorModel {
                good_event_filter_expression: filter_from_wire(
                    "indicator.custom.good_event_filter_expression",
                    indicator.good_events_filter.as_ref(),
                )?,
                bad_event_filter_expression: filter_from_wire(
                    "indicator.custom.bad_event_filter_expression",
                    indicator.bad_events_filter.as_ref(),
                )?,
            })
        },
        (blueprint::SATURATION, measurement_type::TIME_BASED) => {
            model.saturation = Some(SaturationIndicatorModel {
                metric_name: wire_to_model_string(indicator.metric_name.as_deref()),
                threshold,
                aggregation: wire_to_model_string(indicator.aggregation.as_deref()),
                operator: wire_to_model_string(indicator.operator.as_deref()),
            })
        },
        (blueprint, mtype) => {
            return Err(ProviderError::UnsupportedVariant(format!(
                "Unsupported indicator type: {}, blueprint: {}",
                mtype, blueprint
            ))
            .into_diagnostic_at(FIELD_INDICATOR))
        },
    }
    Ok(model)
}

fn time_window_from_wire(window: &SloTimeWindow) -> Result<TimeWindowModel, Diagnostic> {
    let duration = wire_to_model_int64(Some(window.duration));
    let duration_unit = wire_to_model_string(Some(&window.duration_unit));
    let timezone = wire_to_model_string(Some(&window.timezone));

    match window.window_type.as_str() {
        time_window_type::ROLLING => Ok(TimeWindowModel {
            rolling: Some(RollingTimeWindowModel {
                duration,
                duration_unit,
                timezone,
            }),
            fixed: None,
        }),
        time_window_type::FIXED => Ok(TimeWindowModel {
            rolling: None,
            fixed: Some(FixedTimeWindowModel {
                duration,
                duration_unit,
                timezone,
                start_timestamp: wire_to_model_float64(Some(window.start_timestamp)),
            }),
        }),
        other => Err(ProviderError::UnsupportedVariant(format!(
            "Unsupported time window type: {}",
            other
        ))
        .into_diagnostic_at(FIELD_TIME_WINDOW)),
    }
}

// =========================================================================
// Handle
// =========================================================================

/// Handle of `instana_slo_config`.
pub struct SloConfigHandle {
    metadata: ResourceMetaData,
}

impl SloConfigHandle {
    /// Create the handle.
    pub fn new() -> Self {
        Self {
            metadata: ResourceMetaData::new(RESOURCE_NAME, schema()).with_skip_id_generation(),
        }
    }
}

impl Default for SloConfigHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceHandle for SloConfigHandle {
    type Model = SloConfigModel;
    type Wire = SloConfig;

    fn metadata(&self) -> &ResourceMetaData {
        &self.metadata
    }

    fn set_computed_fields(&self, plan: &mut SloConfigModel) -> Vec<Diagnostic> {
        if !plan.id.as_known().is_some_and(|id| !id.is_empty()) {
            plan.id = StringValue::Known(generate_id(ID_PREFIX));
        }
        Vec::new()
    }

    fn map_state_to_data_object(
        &self,
        plan: Option<&SloConfigModel>,
        state: Option<&SloConfigModel>,
    ) -> Result<SloConfig, Vec<Diagnostic>> {
        let model = resolve_input(plan, state).map_err(|e| vec![Diagnostic::from(e)])?;

        let mut diagnostics = Vec::new();
        let entity = collect(&mut diagnostics, entity_to_wire(model.entity.as_ref()));
        let indicator = collect(&mut diagnostics, indicator_to_wire(model.indicator.as_ref()));
        let time_window = collect(&mut diagnostics, time_window_to_wire(model.time_window.as_ref()));

        let (Some(entity), Some(indicator), Some(time_window)) = (entity, indicator, time_window) else {
            return Err(diagnostics);
        };

        let rbac_tags: Vec<RbacTag> = model
            .rbac_tags
            .iter()
            .map(|tag| RbacTag {
                display_name: model_to_wire_string_or_empty(&tag.display_name),
                id: model_to_wire_string_or_empty(&tag.id),
            })
            .collect();

        Ok(SloConfig {
            id: model_to_wire_string_or_empty(&model.id),
            name: model_to_wire_string_or_empty(&model.name),
            target: model_to_wire_float64(&model.target).unwrap_or_default(),
            tags: model_to_wire_string_list(&model.tags),
            entity,
            indicator,
            time_window,
            rbac_tags: (!rbac_tags.is_empty()).then_some(rbac_tags),
        })
    }

    fn update_state(
        &self,
        state: Option<&SloConfigModel>,
        plan: Option<&SloConfigModel>,
        wire: &SloConfig,
    ) -> Result<SloConfigModel, Vec<Diagnostic>> {
        let prior = plan.or(state);

        let mut diagnostics = Vec::new();
        let entity = collect(&mut diagnostics, entity_from_wire(&wire.entity));
        let indicator = collect(&mut diagnostics, indicator_from_wire(&wire.indicator));
        let time_window = collect(&mut diagnostics, time_window_from_wire(&wire.time_window));
        if !diagnostics.is_empty() {
            return Err(diagnostics);
        }

        // Empty tag lists on the wire keep what the configuration said.
        let tags = if wire.tags.is_empty() {
            prior.map(|p| p.tags.clone()).unwrap_or_default()
        } else {
            StringListValue::Known(wire.tags.clone())
        };
        let rbac_tags = match wire.rbac_tags.as_deref() {
            Some(tags) if !tags.is_empty() => tags
                .iter()
                .map(|tag| RbacTagModel {
                    display_name: wire_to_model_string(Some(&tag.display_name)),
                    id: wire_to_model_string(Some(&tag.id)),
                })
                .collect(),
            _ => prior.map(|p| p.rbac_tags.clone()).unwrap_or_default(),
        };

        Ok(SloConfigModel {
            id: wire_to_model_string(Some(&wire.id)),
            name: wire_to_model_string(Some(&wire.name)),
            target: wire_to_model_float64(Some(wire.target)),
            tags,
            rbac_tags,
            entity,
            indicator,
            time_window,
        })
    }

    fn get_rest_resource(&self, api: &dyn InstanaApi) -> Arc<dyn RestResource<SloConfig>> {
        api.slo_configs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::plan_resource;
    use crate::value::UNKNOWN_PLACEHOLDER;
    use serde_json::json;

    fn application_entity() -> EntityModel {
        EntityModel {
            application: Some(ApplicationEntityModel {
                application_id: StringValue::known("app-1"),
                boundary_scope: StringValue::known("ALL"),
                include_synthetic: BoolValue::Known(false),
                include_internal: BoolValue::Known(true),
                filter_expression: StringValue::known("service.name EQUALS 'checkout'"),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn latency_indicator() -> IndicatorModel {
        IndicatorModel {
            time_based_latency: Some(TimeBasedIndicatorModel {
                threshold: Float64Value::Known(250.0),
                aggregation: StringValue::known("P90"),
            }),
            ..Default::default()
        }
    }

    fn rolling_window() -> TimeWindowModel {
        TimeWindowModel {
            rolling: Some(RollingTimeWindowModel {
                duration: Int64Value::Known(7),
                duration_unit: StringValue::known("day"),
                timezone: StringValue::Null,
            }),
            fixed: None,
        }
    }

    fn model() -> SloConfigModel {
        SloConfigModel {
            id: StringValue::known("SLOTF0123456789abcdefghij"),
            name: StringValue::known("checkout latency"),
            target: Float64Value::Known(0.99),
            tags: StringListValue::Known(vec!["team:shop".to_string()]),
            rbac_tags: vec![RbacTagModel {
                display_name: StringValue::known("Shop"),
                id: StringValue::known("rbac-1"),
            }],
            entity: Some(application_entity()),
            indicator: Some(latency_indicator()),
            time_window: Some(rolling_window()),
        }
    }

    #[test]
    fn test_set_computed_fields_mints_id() {
        let handle = SloConfigHandle::new();
        assert!(handle.metadata().skip_id_generation);

        let mut plan = model();
        plan.id = StringValue::Null;
        assert!(handle.set_computed_fields(&mut plan).is_empty());

        let id = plan.id.as_known().unwrap().clone();
        assert!(id.starts_with("SLOTF"));
        assert_eq!(id.len(), 25);

        let wire = handle.map_state_to_data_object(Some(&plan), None).unwrap();
        assert_eq!(wire.id, id);
    }

    #[test]
    fn test_set_computed_fields_keeps_existing_id() {
        let handle = SloConfigHandle::new();
        let mut plan = model();
        handle.set_computed_fields(&mut plan);
        assert_eq!(plan.id, StringValue::known("SLOTF0123456789abcdefghij"));
    }

    #[test]
    fn test_ambiguous_and_missing_indicator() {
        let handle = SloConfigHandle::new();

        let mut both = model();
        both.indicator = Some(IndicatorModel {
            traffic: Some(TrafficIndicatorModel {
                threshold: Float64Value::Known(10.0),
                ..Default::default()
            }),
            ..latency_indicator()
        });
        let diagnostics = handle.map_state_to_data_object(Some(&both), None).unwrap_err();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].attribute.as_deref(), Some("indicator"));
        assert!(diagnostics[0].summary.starts_with("Ambiguous indicator configuration"));

        let mut none = model();
        none.indicator = Some(IndicatorModel::default());
        let diagnostics = handle.map_state_to_data_object(Some(&none), None).unwrap_err();
        assert!(diagnostics[0].summary.starts_with("Missing indicator configuration"));

        none.indicator = None;
        let diagnostics = handle.map_state_to_data_object(Some(&none), None).unwrap_err();
        assert_eq!(diagnostics[0].attribute.as_deref(), Some("indicator"));
    }

    #[test]
    fn test_errors_are_collected_across_unions() {
        let handle = SloConfigHandle::new();
        let mut model = model();
        model.entity = Some(EntityModel {
            website: Some(WebsiteEntityModel {
                website_id: StringValue::known("w1"),
                ..Default::default()
            }),
            ..Default::default()
        });
        model.time_window = Some(TimeWindowModel {
            fixed: Some(FixedTimeWindowModel {
                duration: Int64Value::Known(1),
                duration_unit: StringValue::known("week"),
                ..Default::default()
            }),
            rolling: None,
        });

        let diagnostics = handle.map_state_to_data_object(Some(&model), None).unwrap_err();
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics[0].summary, ERR_WEBSITE_REQUIRED);
        assert_eq!(diagnostics[0].attribute.as_deref(), Some("entity.website"));
        assert_eq!(diagnostics[1].summary, ERR_FIXED_REQUIRED);
    }

    #[test]
    fn test_mandatory_fields_per_variant() {
        let handle = SloConfigHandle::new();
        let cases: Vec<(IndicatorModel, &str)> = vec![
            (
                IndicatorModel {
                    time_based_latency: Some(TimeBasedIndicatorModel {
                        threshold: Float64Value::Known(1.0),
                        aggregation: StringValue::Unknown,
                    }),
                    ..Default::default()
                },
                ERR_TIME_BASED_LATENCY_REQUIRED,
            ),
            (
                IndicatorModel {
                    event_based_latency: Some(EventBasedLatencyIndicatorModel::default()),
                    ..Default::default()
                },
                ERR_EVENT_BASED_LATENCY_REQUIRED,
            ),
            (
                IndicatorModel {
                    traffic: Some(TrafficIndicatorModel::default()),
                    ..Default::default()
                },
                ERR_TRAFFIC_REQUIRED,
            ),
            (
                IndicatorModel {
                    custom: Some(CustomIndicatorModel::default()),
                    ..Default::default()
                },
                ERR_CUSTOM_REQUIRED,
            ),
            (
                IndicatorModel {
                    saturation: Some(SaturationIndicatorModel {
                        threshold: Float64Value::Known(0.8),
                        ..Default::default()
                    }),
                    ..Default::default()
                },
                ERR_SATURATION_REQUIRED,
            ),
        ];

        for (indicator, message) in cases {
            let mut model = model();
            model.indicator = Some(indicator);
            let diagnostics = handle.map_state_to_data_object(Some(&model), None).unwrap_err();
            assert_eq!(diagnostics[0].summary, message);
        }
    }

    #[test]
    fn test_round_trip_application_latency() {
        let handle = SloConfigHandle::new();
        let wire = handle.map_state_to_data_object(Some(&model()), None).unwrap();

        assert_eq!(wire.entity.entity_type, "application");
        assert_eq!(wire.indicator.blueprint, "latency");
        assert_eq!(wire.indicator.measurement_type, "timeBased");
        assert_eq!(wire.time_window.window_type, "rolling");
        assert_eq!(wire.rbac_tags.as_ref().map(Vec::len), Some(1));

        let refreshed = handle.update_state(None, None, &wire).unwrap();
        assert_eq!(refreshed, model());
    }

    #[test]
    fn test_event_based_default_aggregation_is_not_surfaced() {
        let handle = SloConfigHandle::new();
        let mut model = model();
        model.indicator = Some(IndicatorModel {
            event_based_availability: Some(EventBasedAvailabilityIndicatorModel {}),
            ..Default::default()
        });

        let wire = handle.map_state_to_data_object(Some(&model), None).unwrap();
        assert_eq!(wire.indicator.aggregation.as_deref(), Some(DEFAULT_AGGREGATION));
        assert_eq!(wire.indicator.measurement_type, "eventBased");

        let refreshed = handle.update_state(None, Some(&model), &wire).unwrap();
        assert_eq!(refreshed.indicator, model.indicator);
    }

    #[test]
    fn test_traffic_indicator_defaults_operator() {
        let handle = SloConfigHandle::new();
        let mut model = model();
        model.indicator = Some(IndicatorModel {
            traffic: Some(TrafficIndicatorModel {
                traffic_type: StringValue::known("erroneous"),
                threshold: Float64Value::Known(100.0),
                operator: StringValue::Null,
            }),
            ..Default::default()
        });

        let wire = handle.map_state_to_data_object(Some(&model), None).unwrap();
        assert_eq!(wire.indicator.operator.as_deref(), Some(">="));
        assert_eq!(wire.indicator.blueprint, "traffic");

        let mut echoed = wire.clone();
        echoed.indicator.measurement_type = "eventBased".to_string();
        let refreshed = handle.update_state(None, None, &echoed).unwrap();
        let traffic = refreshed.indicator.unwrap().traffic.unwrap();
        assert_eq!(traffic.operator, StringValue::known(">="));
    }

    #[test]
    fn test_custom_indicator_filters() {
        let handle = SloConfigHandle::new();
        let mut model = model();
        model.indicator = Some(IndicatorModel {
            custom: Some(CustomIndicatorModel {
                good_event_filter_expression: StringValue::known("call.erroneous EQUALS false"),
                bad_event_filter_expression: StringValue::Null,
            }),
            ..Default::default()
        });

        let wire = handle.map_state_to_data_object(Some(&model), None).unwrap();
        assert!(wire.indicator.bad_events_filter.as_ref().unwrap().is_empty_expression());

        let refreshed = handle.update_state(None, None, &wire).unwrap();
        assert_eq!(refreshed.indicator, model.indicator);
    }

    #[test]
    fn test_invalid_entity_filter_reports_path() {
        let handle = SloConfigHandle::new();
        let mut model = model();
        if let Some(app) = model.entity.as_mut().and_then(|e| e.application.as_mut()) {
            app.filter_expression = StringValue::known("service.name EQUALS");
        }

        let diagnostics = handle.map_state_to_data_object(Some(&model), None).unwrap_err();
        assert_eq!(
            diagnostics[0].attribute.as_deref(),
            Some("entity.application.filter_expression")
        );
    }

    #[test]
    fn test_fixed_window_and_timezone() {
        let handle = SloConfigHandle::new();
        let mut model = model();
        model.time_window = Some(TimeWindowModel {
            rolling: None,
            fixed: Some(FixedTimeWindowModel {
                duration: Int64Value::Known(1),
                duration_unit: StringValue::known("week"),
                timezone: StringValue::known("Europe/Berlin"),
                start_timestamp: Float64Value::Known(1_700_000_000_000.0),
            }),
        });

        let wire = handle.map_state_to_data_object(Some(&model), None).unwrap();
        assert_eq!(wire.time_window.timezone, "Europe/Berlin");

        let refreshed = handle.update_state(None, None, &wire).unwrap();
        assert_eq!(refreshed.time_window, model.time_window);
    }

    #[test]
    fn test_unsupported_wire_variants() {
        let handle = SloConfigHandle::new();
        let mut wire = handle.map_state_to_data_object(Some(&model()), None).unwrap();
        wire.entity.entity_type = "mobile".to_string();
        wire.indicator.blueprint = "throughput".to_string();
        wire.time_window.window_type = "calendar".to_string();

        let diagnostics = handle.update_state(None, None, &wire).unwrap_err();
        assert_eq!(diagnostics.len(), 3);
        assert_eq!(diagnostics[0].summary, "Unsupported entity type: mobile");
        assert_eq!(
            diagnostics[1].summary,
            "Unsupported indicator type: timeBased, blueprint: throughput"
        );
        assert_eq!(diagnostics[2].summary, "Unsupported time window type: calendar");
    }

    #[test]
    fn test_empty_wire_tags_keep_prior() {
        let handle = SloConfigHandle::new();
        let mut wire = handle.map_state_to_data_object(Some(&model()), None).unwrap();
        wire.tags.clear();
        wire.rbac_tags = None;

        let refreshed = handle.update_state(Some(&model()), None, &wire).unwrap();
        assert_eq!(refreshed.tags, model().tags);
        assert_eq!(refreshed.rbac_tags, model().rbac_tags);

        let imported = handle.update_state(None, None, &wire).unwrap();
        assert_eq!(imported.tags, StringListValue::Null);
        assert!(imported.rbac_tags.is_empty());
    }

    #[test]
    fn test_empty_wire_strings_read_as_null() {
        let handle = SloConfigHandle::new();
        let mut wire = handle.map_state_to_data_object(Some(&model()), None).unwrap();
        wire.name.clear();
        wire.rbac_tags = Some(vec![RbacTag {
            display_name: String::new(),
            id: "rbac-1".to_string(),
        }]);

        let refreshed = handle.update_state(None, None, &wire).unwrap();
        assert_eq!(refreshed.name, StringValue::Null);
        assert_eq!(refreshed.id, model().id);
        assert_eq!(refreshed.rbac_tags[0].display_name, StringValue::Null);
        assert_eq!(refreshed.rbac_tags[0].id, StringValue::known("rbac-1"));

        wire.id.clear();
        assert_eq!(handle.update_state(None, None, &wire).unwrap().id, StringValue::Null);
    }

    #[test]
    fn test_plan_fills_nested_defaults() {
        let proposed = json!({
            "id": UNKNOWN_PLACEHOLDER,
            "name": "traffic",
            "target": 0.95,
            "indicator": {"traffic": {"threshold": 10.0}}
        });
        let result = plan_resource(&schema(), None, proposed);

        assert_eq!(result.planned_state["indicator"]["traffic"]["operator"], ">=");
        let model: SloConfigModel = serde_json::from_value(result.planned_state).unwrap();
        assert!(model.id.is_unknown());
        assert_eq!(
            model.indicator.and_then(|i| i.traffic).map(|t| t.operator),
            Some(StringValue::known(">="))
        );
    }
}
