//! REST API collaborators and wire types.
//!
//! The transport itself (HTTP, authentication, retries) lives outside this
//! crate. Handles only see the [`RestResource`] trait and the strongly typed
//! wire records defined in the submodules.

pub mod alerting_config;
pub mod application_config;
pub mod custom_dashboard;
pub mod group;
pub mod slo_config;
pub mod tag_filter;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ProviderError;

pub use alerting_config::{
    AlertingConfiguration, CustomPayloadField, DynamicCustomPayloadFieldValue,
    EventFilteringConfiguration, SUPPORTED_ALERT_EVENT_TYPES,
};
pub use application_config::{
    AccessRule, ApplicationConfig, SUPPORTED_ACCESS_TYPES, SUPPORTED_APPLICATION_CONFIG_SCOPES,
    SUPPORTED_BOUNDARY_SCOPES, SUPPORTED_RELATION_TYPES,
};
pub use custom_dashboard::CustomDashboard;
pub use group::{
    ApiMember, ApiPermissionSetWithRoles, Group, ScopeBinding, SUPPORTED_INSTANA_PERMISSIONS,
};
pub use slo_config::{RbacTag, SloConfig, SloEntity, SloIndicator, SloTimeWindow};
pub use tag_filter::TagFilter;

/// A record exchanged with the REST API.
pub trait RestObject: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// The identifier used in the resource path.
    fn get_id_for_path(&self) -> &str;
}

/// CRUD collaborator for one REST resource.
///
/// Implementations report a missing object with [`ProviderError::NotFound`].
#[async_trait::async_trait]
pub trait RestResource<T: RestObject>: Send + Sync {
    /// Fetch one object by id.
    async fn get_one(&self, id: &str) -> Result<T, ProviderError>;

    /// Fetch every object.
    async fn get_all(&self) -> Result<Vec<T>, ProviderError>;

    /// Create an object and return what the server stored.
    async fn create(&self, data: &T) -> Result<T, ProviderError>;

    /// Update an object and return what the server stored.
    async fn update(&self, data: &T) -> Result<T, ProviderError>;

    /// Delete an object by id.
    async fn delete(&self, id: &str) -> Result<(), ProviderError>;
}

/// Entry point to the REST resources of an Instana tenant.
pub trait InstanaApi: Send + Sync {
    /// Alerting configurations (`/events/settings/alerts`).
    fn alerting_configurations(&self) -> Arc<dyn RestResource<AlertingConfiguration>>;

    /// Application perspectives (`/application-monitoring/settings/application`).
    fn application_configs(&self) -> Arc<dyn RestResource<ApplicationConfig>>;

    /// Custom dashboards (`/custom-dashboard`).
    fn custom_dashboards(&self) -> Arc<dyn RestResource<CustomDashboard>>;

    /// RBAC groups (`/settings/rbac/groups`).
    fn groups(&self) -> Arc<dyn RestResource<Group>>;

    /// SLO configurations (`/settings/slo`).
    fn slo_configs(&self) -> Arc<dyn RestResource<SloConfig>>;
}
