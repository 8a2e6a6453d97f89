//! Wire type of custom dashboards.

use serde::{Deserialize, Serialize};

use super::application_config::AccessRule;
use super::RestObject;

/// A custom dashboard as stored by the API.
///
/// `widgets` is kept as an opaque JSON document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomDashboard {
    /// Identifier.
    pub id: String,
    /// Title.
    pub title: String,
    /// Who may see or edit the dashboard.
    #[serde(default)]
    pub access_rules: Vec<AccessRule>,
    /// Widget definitions.
    #[serde(default)]
    pub widgets: serde_json::Value,
}

impl RestObject for CustomDashboard {
    fn get_id_for_path(&self) -> &str {
        &self.id
    }
}
