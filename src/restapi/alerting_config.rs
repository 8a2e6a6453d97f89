//! Wire types of alerting configurations.

use serde::{Deserialize, Serialize};

use super::RestObject;

/// Event types an alerting configuration can subscribe to.
pub const SUPPORTED_ALERT_EVENT_TYPES: [&str; 8] = [
    "incident",
    "critical",
    "warning",
    "change",
    "online",
    "offline",
    "none",
    "agent_monitoring_issue",
];

/// An alerting configuration as stored by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertingConfiguration {
    /// Identifier.
    pub id: String,
    /// Name of the alert.
    pub alert_name: String,
    /// Alerting channel ids.
    #[serde(default)]
    pub integration_ids: Vec<String>,
    /// Which events trigger the alert.
    #[serde(default)]
    pub event_filtering_configuration: EventFilteringConfiguration,
    /// Extra fields appended to the alert payload.
    #[serde(default)]
    pub custom_payload_fields: Vec<CustomPayloadField>,
}

impl RestObject for AlertingConfiguration {
    fn get_id_for_path(&self) -> &str {
        &self.id
    }
}

/// Event filter of an alerting configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventFilteringConfiguration {
    /// Dynamic focus query limiting the entities.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    /// Rule ids that trigger the alert.
    #[serde(default)]
    pub rule_ids: Vec<String>,
    /// Event types that trigger the alert.
    #[serde(default)]
    pub event_types: Vec<String>,
    /// Application alert ids, only written by schema version 1.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub application_alert_config_ids: Vec<String>,
}

/// A custom payload field, tagged by `type` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CustomPayloadField {
    /// A fixed string value.
    StaticString {
        /// Field key.
        key: String,
        /// Field value.
        value: String,
    },
    /// A value resolved from a tag at alert time.
    Dynamic {
        /// Field key.
        key: String,
        /// Tag reference.
        value: DynamicCustomPayloadFieldValue,
    },
}

impl CustomPayloadField {
    /// The field key.
    pub fn key(&self) -> &str {
        match self {
            Self::StaticString { key, .. } | Self::Dynamic { key, .. } => key,
        }
    }
}

/// Tag reference of a dynamic custom payload field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicCustomPayloadFieldValue {
    /// Optional key within the tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Tag name.
    pub tag_name: String,
}
