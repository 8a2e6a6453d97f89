//! Wire types of application perspectives and their access rules.

use serde::{Deserialize, Serialize};

use super::tag_filter::TagFilter;
use super::RestObject;

/// Accepted `scope` values.
pub const SUPPORTED_APPLICATION_CONFIG_SCOPES: [&str; 3] = [
    "INCLUDE_NO_DOWNSTREAM",
    "INCLUDE_IMMEDIATE_DOWNSTREAM_DATABASE_AND_MESSAGING",
    "INCLUDE_ALL_DOWNSTREAM",
];

/// Accepted `boundaryScope` values.
pub const SUPPORTED_BOUNDARY_SCOPES: [&str; 3] = ["ALL", "INBOUND", "DEFAULT"];

/// Accepted access types of an access rule.
pub const SUPPORTED_ACCESS_TYPES: [&str; 2] = ["READ", "READ_WRITE"];

/// Accepted relation types of an access rule.
pub const SUPPORTED_RELATION_TYPES: [&str; 5] = ["USER", "API_TOKEN", "ROLE", "TEAM", "GLOBAL"];

/// An application perspective as stored by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationConfig {
    /// Identifier.
    pub id: String,
    /// Display label.
    pub label: String,
    /// Which downstream calls belong to the application.
    pub scope: String,
    /// Which calls enter the application.
    pub boundary_scope: String,
    /// Entity filter of the application.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_filter_expression: Option<TagFilter>,
    /// Who may read or change the application.
    #[serde(default)]
    pub access_rules: Vec<AccessRule>,
}

impl RestObject for ApplicationConfig {
    fn get_id_for_path(&self) -> &str {
        &self.id
    }
}

/// An access grant shared by application perspectives and custom dashboards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessRule {
    /// `READ` or `READ_WRITE`.
    pub access_type: String,
    /// Id of the user, token, role or team.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_id: Option<String>,
    /// Kind of the related entity.
    pub relation_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_access_rule_without_related_id() {
        let rule = AccessRule {
            access_type: "READ_WRITE".to_string(),
            related_id: None,
            relation_type: "GLOBAL".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&rule).unwrap(),
            json!({"accessType": "READ_WRITE", "relationType": "GLOBAL"})
        );
    }

    #[test]
    fn test_deserialize_without_filter() {
        let config: ApplicationConfig = serde_json::from_value(json!({
            "id": "app-1",
            "label": "shop",
            "scope": "INCLUDE_NO_DOWNSTREAM",
            "boundaryScope": "DEFAULT"
        }))
        .unwrap();
        assert!(config.tag_filter_expression.is_none());
        assert!(config.access_rules.is_empty());
    }
}
