//! Wire types of SLO configurations.
//!
//! Entities, indicators and time windows are flat records on the wire,
//! discriminated by `type` (and by `blueprint` for indicators). Optional
//! fields are serialized as `null` when absent, matching what the API echoes.

use serde::{Deserialize, Serialize};

use super::tag_filter::TagFilter;
use super::RestObject;

/// Entity type tags.
pub mod entity_type {
    /// Application perspective, service or endpoint.
    pub const APPLICATION: &str = "application";
    /// Website monitored by EUM.
    pub const WEBSITE: &str = "website";
    /// Synthetic tests.
    pub const SYNTHETIC: &str = "synthetic";
    /// Infrastructure entities.
    pub const INFRASTRUCTURE: &str = "infrastructure";
}

/// Indicator blueprints.
pub mod blueprint {
    #![allow(missing_docs)]
    pub const LATENCY: &str = "latency";
    pub const AVAILABILITY: &str = "availability";
    pub const TRAFFIC: &str = "traffic";
    pub const CUSTOM: &str = "custom";
    pub const SATURATION: &str = "saturation";
}

/// Indicator measurement types.
pub mod measurement_type {
    #![allow(missing_docs)]
    pub const TIME_BASED: &str = "timeBased";
    pub const EVENT_BASED: &str = "eventBased";
}

/// Time window type tags.
pub mod time_window_type {
    #![allow(missing_docs)]
    pub const ROLLING: &str = "rolling";
    pub const FIXED: &str = "fixed";
}

/// Accepted traffic types.
pub const SUPPORTED_TRAFFIC_TYPES: [&str; 2] = ["all", "erroneous"];

/// Accepted comparison operators of traffic and saturation indicators.
pub const SUPPORTED_OPERATORS: [&str; 4] = [">", ">=", "<", "<="];

/// Aggregation sent when the configuration leaves it open.
pub const DEFAULT_AGGREGATION: &str = "MEAN";

/// An SLO configuration as stored by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SloConfig {
    /// Identifier, minted by the client.
    pub id: String,
    /// Name.
    pub name: String,
    /// Target ratio.
    pub target: f64,
    /// Free-form tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Measured entity.
    pub entity: SloEntity,
    /// Indicator.
    pub indicator: SloIndicator,
    /// Evaluation window.
    pub time_window: SloTimeWindow,
    /// RBAC tags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rbac_tags: Option<Vec<RbacTag>>,
}

impl RestObject for SloConfig {
    fn get_id_for_path(&self) -> &str {
        &self.id
    }
}

/// RBAC tag attached to an SLO.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RbacTag {
    /// Display name.
    pub display_name: String,
    /// Tag id.
    pub id: String,
}

/// The measured entity. Which fields apply depends on `type`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct SloEntity {
    #[serde(rename = "type")]
    pub entity_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boundary_scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_synthetic: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_internal: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_filter_expression: Option<TagFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beacon_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synthetic_test_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub infra_type: Option<String>,
}

/// The indicator, discriminated by `(blueprint, type)`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct SloIndicator {
    pub blueprint: String,
    #[serde(rename = "type")]
    pub measurement_type: String,
    #[serde(default)]
    pub threshold: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traffic_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric_name: Option<String>,
    #[serde(
        rename = "goodEventsFilter",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub good_events_filter: Option<TagFilter>,
    #[serde(
        rename = "badEventsFilter",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub bad_events_filter: Option<TagFilter>,
}

impl SloIndicator {
    /// An indicator with only its discriminator set.
    pub fn new(blueprint: &str, measurement_type: &str) -> Self {
        Self {
            blueprint: blueprint.to_string(),
            measurement_type: measurement_type.to_string(),
            ..Default::default()
        }
    }
}

/// The evaluation window.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct SloTimeWindow {
    #[serde(rename = "type")]
    pub window_type: String,
    pub duration: i64,
    pub duration_unit: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub timezone: String,
    #[serde(default)]
    pub start_timestamp: f64,
}
