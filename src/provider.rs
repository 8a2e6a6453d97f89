//! The provider: every resource handle behind one dispatch table.
//!
//! The host addresses resources by type name and exchanges JSON states.
//! [`InstanaProvider`] routes each call to the [`DynResource`] registered for
//! that name.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::adapter::{DynResource, ResourceAdapter};
use crate::handle::ResourceHandle;
use crate::plan::PlanResult;
use crate::resources::{
    AlertingConfigHandle, ApplicationConfigHandle, CustomDashboardHandle, GroupHandle, SloConfigHandle,
};
use crate::restapi::InstanaApi;
use crate::schema::{has_errors, Diagnostic, ProviderSchema, Schema};

fn schema_entry<H: ResourceHandle>(handle: H) -> (&'static str, Schema) {
    let metadata = handle.metadata();
    (metadata.resource_name, metadata.schema.clone())
}

/// Schemas of all resources, keyed by host type name.
pub fn provider_schema() -> ProviderSchema {
    [
        schema_entry(AlertingConfigHandle::new()),
        schema_entry(ApplicationConfigHandle::new()),
        schema_entry(CustomDashboardHandle::new()),
        schema_entry(GroupHandle::new()),
        schema_entry(SloConfigHandle::new()),
    ]
    .into_iter()
    .fold(ProviderSchema::new(), |schema, (name, resource)| schema.with_resource(name, resource))
}

/// Routes host calls to the resource registered under the requested type name.
pub struct InstanaProvider {
    resources: BTreeMap<&'static str, Box<dyn DynResource>>,
}

impl InstanaProvider {
    /// Register every resource against `api`.
    pub fn new(api: Arc<dyn InstanaApi>) -> Self {
        Self::empty()
            .with_resource(ResourceAdapter::new(AlertingConfigHandle::new(), api.clone()))
            .with_resource(ResourceAdapter::new(ApplicationConfigHandle::new(), api.clone()))
            .with_resource(ResourceAdapter::new(CustomDashboardHandle::new(), api.clone()))
            .with_resource(ResourceAdapter::new(GroupHandle::new(), api.clone()))
            .with_resource(ResourceAdapter::new(SloConfigHandle::new(), api))
    }

    /// A provider without resources.
    pub fn empty() -> Self {
        Self {
            resources: BTreeMap::new(),
        }
    }

    /// Register a resource under its metadata name.
    pub fn with_resource(mut self, resource: impl DynResource + 'static) -> Self {
        self.resources
            .insert(resource.metadata().resource_name, Box::new(resource));
        self
    }

    /// The registered type names.
    pub fn resource_types(&self) -> Vec<&'static str> {
        self.resources.keys().copied().collect()
    }

    /// Schemas of the registered resources.
    pub fn schema(&self) -> ProviderSchema {
        self.resources
            .iter()
            .fold(ProviderSchema::new(), |schema, (name, resource)| {
                schema.with_resource(*name, resource.metadata().schema.clone())
            })
    }

    fn resource(&self, resource_type: &str) -> Result<&dyn DynResource, Vec<Diagnostic>> {
        self.resources
            .get(resource_type)
            .map(|resource| resource.as_ref())
            .ok_or_else(|| {
                warn!(resource_type = %resource_type, "Unknown resource type");
                vec![Diagnostic::error(format!("Unknown resource type: {}", resource_type))]
            })
    }

    /// Validate a resource configuration.
    pub fn validate_resource_config(&self, resource_type: &str, config: &Value) -> Vec<Diagnostic> {
        match self.resource(resource_type) {
            Ok(resource) => {
                let diagnostics = resource.validate_config(config);
                if has_errors(&diagnostics) {
                    warn!(
                        resource_type = %resource_type,
                        diagnostics = diagnostics.len(),
                        "ValidateResourceConfig completed with errors"
                    );
                }
                diagnostics
            },
            Err(diagnostics) => diagnostics,
        }
    }

    /// Plan changes for a resource.
    #[instrument(skip(self, prior_state, proposed_state))]
    pub fn plan(
        &self,
        resource_type: &str,
        prior_state: Option<&Value>,
        proposed_state: Value,
    ) -> Result<PlanResult, Vec<Diagnostic>> {
        debug!(is_create = prior_state.is_none(), "Plan called");
        let result = self.resource(resource_type)?.plan(prior_state, proposed_state)?;
        info!(
            changes = result.changes.len(),
            requires_replace = result.requires_replace,
            "Plan completed"
        );
        Ok(result)
    }

    /// Create a new resource.
    pub async fn create(&self, resource_type: &str, planned_state: Value) -> Result<Value, Vec<Diagnostic>> {
        self.resource(resource_type)?.create_value(planned_state).await
    }

    /// Read the current state of a resource; `None` when it is gone.
    pub async fn read(&self, resource_type: &str, current_state: Value) -> Result<Option<Value>, Vec<Diagnostic>> {
        self.resource(resource_type)?.read_value(current_state).await
    }

    /// Update an existing resource.
    pub async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, Vec<Diagnostic>> {
        self.resource(resource_type)?
            .update_value(prior_state, planned_state)
            .await
    }

    /// Delete a resource.
    pub async fn delete(&self, resource_type: &str, current_state: Value) -> Result<(), Vec<Diagnostic>> {
        self.resource(resource_type)?.delete_value(current_state).await
    }

    /// Import an existing object by id and read its full state.
    pub async fn import_resource(&self, resource_type: &str, id: &str) -> Result<Value, Vec<Diagnostic>> {
        let resource = self.resource(resource_type)?;
        let imported = resource.import_value(id)?;
        resource.read_value(imported).await?.ok_or_else(|| {
            vec![Diagnostic::error(format!("Cannot import non-existent remote object {}", id))]
        })
    }

    /// Upgrade resource state from an older schema version.
    pub fn upgrade_resource_state(
        &self,
        resource_type: &str,
        version: u64,
        state: Value,
    ) -> Result<Value, Vec<Diagnostic>> {
        self.resource(resource_type)?.upgrade_value(version, state)
    }
}
