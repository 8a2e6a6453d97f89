//! Wire types of RBAC groups.

use serde::{Deserialize, Serialize};

use super::RestObject;

/// Permissions grantable to an RBAC group.
pub const SUPPORTED_INSTANA_PERMISSIONS: [&str; 58] = [
    "CAN_CONFIGURE_APPLICATIONS",
    "CAN_CONFIGURE_EUM_APPLICATIONS",
    "CAN_CONFIGURE_AGENTS",
    "CAN_VIEW_TRACE_DETAILS",
    "CAN_VIEW_LOGS",
    "CAN_CONFIGURE_SESSION_SETTINGS",
    "CAN_CONFIGURE_INTEGRATIONS",
    "CAN_CONFIGURE_GLOBAL_APPLICATION_SMART_ALERTS",
    "CAN_CONFIGURE_GLOBAL_SYNTHETIC_SMART_ALERTS",
    "CAN_CONFIGURE_GLOBAL_INFRA_SMART_ALERTS",
    "CAN_CONFIGURE_GLOBAL_LOG_SMART_ALERTS",
    "CAN_CONFIGURE_GLOBAL_ALERT_PAYLOAD",
    "CAN_CONFIGURE_MOBILE_APP_MONITORING",
    "CAN_CONFIGURE_API_TOKENS",
    "CAN_CONFIGURE_SERVICE_LEVEL_INDICATORS",
    "CAN_CONFIGURE_AUTHENTICATION_METHODS",
    "CAN_CONFIGURE_RELEASES",
    "CAN_VIEW_AUDIT_LOG",
    "CAN_CONFIGURE_EVENTS_AND_ALERTS",
    "CAN_CONFIGURE_MAINTENANCE_WINDOWS",
    "CAN_CONFIGURE_APPLICATION_SMART_ALERTS",
    "CAN_CONFIGURE_WEBSITE_SMART_ALERTS",
    "CAN_CONFIGURE_MOBILE_APP_SMART_ALERTS",
    "CAN_CONFIGURE_AGENT_RUN_MODE",
    "CAN_CONFIGURE_SERVICE_MAPPING",
    "CAN_EDIT_ALL_ACCESSIBLE_CUSTOM_DASHBOARDS",
    "CAN_CONFIGURE_USERS",
    "CAN_INSTALL_NEW_AGENTS",
    "CAN_CONFIGURE_TEAMS",
    "CAN_CREATE_PUBLIC_CUSTOM_DASHBOARDS",
    "CAN_CONFIGURE_LOG_MANAGEMENT",
    "CAN_VIEW_ACCOUNT_AND_BILLING_INFORMATION",
    "CAN_VIEW_SYNTHETIC_TESTS",
    "CAN_VIEW_SYNTHETIC_LOCATIONS",
    "CAN_CREATE_THREAD_DUMP",
    "CAN_CREATE_HEAP_DUMP",
    "CAN_CONFIGURE_DATABASE_MANAGEMENT",
    "CAN_CONFIGURE_LOG_RETENTION_PERIOD",
    "CAN_CONFIGURE_PERSONAL_API_TOKENS",
    "ACCESS_INFRASTRUCTURE_ANALYZE",
    "CAN_VIEW_LOG_VOLUME",
    "CAN_RUN_AUTOMATION_ACTIONS",
    "CAN_VIEW_SYNTHETIC_TEST_RESULTS",
    "CAN_INVOKE_ALERT_CHANNEL",
    "CAN_MANUALLY_CLOSE_ISSUE",
    "CAN_DELETE_LOGS",
    "CAN_CONFIGURE_SYNTHETIC_TESTS",
    "CAN_VIEW_BUSINESS_PROCESS_DETAILS",
    "CAN_VIEW_BIZOPS_ALERTS",
    "CAN_USE_SYNTHETIC_CREDENTIALS",
    "CAN_DELETE_AUTOMATION_ACTION_HISTORY",
    "CAN_CONFIGURE_SYNTHETIC_LOCATIONS",
    "CAN_CONFIGURE_SYNTHETIC_CREDENTIALS",
    "CAN_CONFIGURE_SUBTRACES",
    "CAN_CONFIGURE_LLM",
    "CAN_CONFIGURE_BIZOPS",
    "CAN_CONFIGURE_AUTOMATION_POLICIES",
    "CAN_CONFIGURE_AUTOMATION_ACTIONS",
];

/// Role id the API expects on a disabled infrastructure filter.
pub const DISABLED_SCOPE_ROLE_ID: &str = "-1";

/// An RBAC group as stored by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    /// Identifier.
    pub id: String,
    /// Group name.
    pub name: String,
    /// Users in the group.
    #[serde(default)]
    pub members: Vec<ApiMember>,
    /// Scopes and permissions granted to the members.
    #[serde(default)]
    pub permission_set: ApiPermissionSetWithRoles,
}

impl RestObject for Group {
    fn get_id_for_path(&self) -> &str {
        &self.id
    }
}

/// A group member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMember {
    /// User id.
    pub user_id: String,
    /// E-mail address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Grants access to a single scope.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeBinding {
    /// Scope id.
    pub scope_id: String,
    /// Role bound to the scope.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope_role_id: Option<String>,
}

impl ScopeBinding {
    /// A binding without a role.
    pub fn new(scope_id: impl Into<String>) -> Self {
        Self {
            scope_id: scope_id.into(),
            scope_role_id: None,
        }
    }

    /// The binding sent for an infrastructure filter that is switched off.
    pub fn disabled() -> Self {
        Self {
            scope_id: String::new(),
            scope_role_id: Some(DISABLED_SCOPE_ROLE_ID.to_string()),
        }
    }
}

/// Permission set of a group.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ApiPermissionSetWithRoles {
    /// Application perspectives.
    #[serde(rename = "applicationIds", default)]
    pub application_ids: Vec<ScopeBinding>,
    /// Dynamic focus query on infrastructure.
    #[serde(rename = "infraDfqFilter", default)]
    pub infra_dfq_filter: Option<ScopeBinding>,
    /// Kubernetes clusters.
    #[serde(rename = "kubernetesClusterUUIDs", default)]
    pub kubernetes_cluster_uuids: Vec<ScopeBinding>,
    /// Kubernetes namespaces.
    #[serde(rename = "kubernetesNamespaceUIDs", default)]
    pub kubernetes_namespace_uids: Vec<ScopeBinding>,
    /// Mobile apps.
    #[serde(rename = "mobileAppIds", default)]
    pub mobile_app_ids: Vec<ScopeBinding>,
    /// Websites.
    #[serde(rename = "websiteIds", default)]
    pub website_ids: Vec<ScopeBinding>,
    /// Granted permissions.
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl ApiPermissionSetWithRoles {
    /// True when no scope or permission is granted.
    ///
    /// An infrastructure filter with an empty scope id counts as absent.
    pub fn is_empty(&self) -> bool {
        self.application_ids.is_empty()
            && self.kubernetes_cluster_uuids.is_empty()
            && self.kubernetes_namespace_uids.is_empty()
            && self.mobile_app_ids.is_empty()
            && self.website_ids.is_empty()
            && self.permissions.is_empty()
            && self
                .infra_dfq_filter
                .as_ref()
                .map_or(true, |f| f.scope_id.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_permission_set_is_empty() {
        let mut set = ApiPermissionSetWithRoles {
            infra_dfq_filter: Some(ScopeBinding::disabled()),
            ..Default::default()
        };
        assert!(set.is_empty());

        set.infra_dfq_filter = Some(ScopeBinding::new("entity.zone:eu"));
        assert!(!set.is_empty());

        let set = ApiPermissionSetWithRoles {
            permissions: vec!["CAN_VIEW_LOGS".to_string()],
            ..Default::default()
        };
        assert!(!set.is_empty());
    }

    #[test]
    fn test_disabled_binding_wire_shape() {
        assert_eq!(
            serde_json::to_value(ScopeBinding::disabled()).unwrap(),
            json!({"scopeId": "", "scopeRoleId": "-1"})
        );
    }

    #[test]
    fn test_permission_names_are_unique() {
        let mut names = SUPPORTED_INSTANA_PERMISSIONS.to_vec();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), SUPPORTED_INSTANA_PERMISSIONS.len());
    }
}
