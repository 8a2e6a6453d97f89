//! Drives a [`ResourceHandle`] through the host's create/read/update/delete order.
//!
//! The adapter owns the only I/O in the crate: it resolves the handle's
//! [`RestResource`](crate::restapi::RestResource) collaborator and calls it
//! between the two translation steps. Handles stay pure.
//!
//! [`DynResource`] erases the model type so a provider can dispatch on the
//! host type name with JSON states.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use crate::handle::{upgrade_state, ResourceHandle, ResourceMetaData, ResourceModel};
use crate::plan::{plan_resource, PlanResult};
use crate::restapi::{InstanaApi, RestObject, RestResource};
use crate::schema::{has_errors, Diagnostic};
use crate::validation::validate;
use crate::value::{random_id, StringValue};

/// Runs one resource handle against the REST API.
pub struct ResourceAdapter<H: ResourceHandle> {
    handle: H,
    api: Arc<dyn InstanaApi>,
}

impl<H: ResourceHandle> ResourceAdapter<H> {
    /// Create an adapter for `handle` talking to `api`.
    pub fn new(handle: H, api: Arc<dyn InstanaApi>) -> Self {
        Self { handle, api }
    }

    /// The wrapped handle.
    pub fn handle(&self) -> &H {
        &self.handle
    }

    /// Host type name of the resource.
    pub fn resource_name(&self) -> &'static str {
        self.handle.metadata().resource_name
    }

    fn rest_resource(&self) -> Arc<dyn RestResource<H::Wire>> {
        self.handle.get_rest_resource(self.api.as_ref())
    }

    /// Create the remote object described by `plan` and return the new state.
    #[instrument(skip_all, fields(resource_type = %self.resource_name()))]
    pub async fn create(&self, mut plan: H::Model) -> Result<H::Model, Vec<Diagnostic>> {
        debug!("Create called");

        if !self.handle.metadata().skip_id_generation {
            plan.set_id(StringValue::Known(random_id()));
        }
        let diagnostics = self.handle.set_computed_fields(&mut plan);
        if has_errors(&diagnostics) {
            warn!(diagnostics = diagnostics.len(), "Create rejected while computing fields");
            return Err(diagnostics);
        }

        let wire = self.handle.map_state_to_data_object(Some(&plan), None)?;
        let created = self.rest_resource().create(&wire).await.map_err(|e| {
            error!(error = %e, "Create failed");
            vec![Diagnostic::error(format!("Error creating {}", self.resource_name())).with_detail(e.to_string())]
        })?;

        let state = self.handle.update_state(None, Some(&plan), &created)?;
        info!(id = created.get_id_for_path(), "Create completed successfully");
        Ok(state)
    }

    /// Refresh `state` from the remote object.
    ///
    /// Returns `Ok(None)` when the object no longer exists, so the host can
    /// drop it from its state.
    #[instrument(skip_all, fields(resource_type = %self.resource_name()))]
    pub async fn read(&self, state: &H::Model) -> Result<Option<H::Model>, Vec<Diagnostic>> {
        let id = match state.id().as_known() {
            Some(id) if !id.is_empty() => id.clone(),
            _ => {
                warn!("Read called without an id");
                return Err(vec![Diagnostic::error("Error reading resource")
                    .with_detail("ID of the resource is missing")
                    .with_attribute("id")]);
            },
        };
        debug!(id = %id, "Read called");

        let wire = match self.rest_resource().get_one(&id).await {
            Ok(wire) => wire,
            Err(e) if e.is_not_found() => {
                info!(id = %id, "Remote object is gone, removing it from state");
                return Ok(None);
            },
            Err(e) => {
                error!(id = %id, error = %e, "Read failed");
                return Err(vec![Diagnostic::error(format!("Error reading {}", self.resource_name()))
                    .with_detail(e.to_string())]);
            },
        };

        let refreshed = self.handle.update_state(Some(state), None, &wire)?;
        debug!(id = %id, "Read completed successfully");
        Ok(Some(refreshed))
    }

    /// Push `plan` over the object currently described by `state`.
    #[instrument(skip_all, fields(resource_type = %self.resource_name()))]
    pub async fn update(&self, plan: &H::Model, state: &H::Model) -> Result<H::Model, Vec<Diagnostic>> {
        debug!("Update called");

        let mut plan = plan.clone();
        if !plan.id().is_known() {
            plan.set_id(state.id().clone());
        }

        let wire = self.handle.map_state_to_data_object(Some(&plan), Some(state))?;
        let updated = self.rest_resource().update(&wire).await.map_err(|e| {
            error!(error = %e, "Update failed");
            vec![Diagnostic::error(format!("Error updating {}", self.resource_name())).with_detail(e.to_string())]
        })?;

        let refreshed = self.handle.update_state(Some(state), Some(&plan), &updated)?;
        info!(id = updated.get_id_for_path(), "Update completed successfully");
        Ok(refreshed)
    }

    /// Delete the object described by `state`.
    #[instrument(skip_all, fields(resource_type = %self.resource_name()))]
    pub async fn delete(&self, state: &H::Model) -> Result<(), Vec<Diagnostic>> {
        debug!("Delete called");

        let wire = self.handle.map_state_to_data_object(None, Some(state))?;
        let id = wire.get_id_for_path().to_string();
        match self.rest_resource().delete(&id).await {
            Ok(()) => {
                info!(id = %id, "Delete completed successfully");
                Ok(())
            },
            Err(e) if e.is_not_found() => {
                info!(id = %id, "Remote object already deleted");
                Ok(())
            },
            Err(e) => {
                error!(id = %id, error = %e, "Delete failed");
                Err(vec![Diagnostic::error(format!("Error deleting {}", self.resource_name()))
                    .with_detail(e.to_string())])
            },
        }
    }

    /// A state holding only `id`, to be completed by a following read.
    pub fn import_state(&self, id: &str) -> H::Model {
        debug!(resource_type = %self.resource_name(), id = %id, "Import called");
        let mut model = H::Model::default();
        model.set_id(StringValue::known(id));
        model
    }

    /// Migrate a raw state document written with schema `version`.
    pub fn upgrade_state(&self, version: u64, state: Value) -> Result<Value, Vec<Diagnostic>> {
        let current = self.handle.metadata().schema_version();
        debug!(
            resource_type = %self.resource_name(),
            from_version = version,
            to_version = current,
            "UpgradeResourceState called"
        );
        upgrade_state(&self.handle.state_upgraders(), version, current, state).map_err(|e| {
            error!(resource_type = %self.resource_name(), error = %e, "UpgradeResourceState failed");
            vec![Diagnostic::from(e)]
        })
    }
}

fn decode<M: ResourceModel>(state: Value) -> Result<M, Vec<Diagnostic>> {
    serde_json::from_value(state).map_err(|e| {
        vec![Diagnostic::error("Error decoding resource state").with_detail(e.to_string())]
    })
}

fn encode<M: ResourceModel>(model: &M) -> Result<Value, Vec<Diagnostic>> {
    serde_json::to_value(model).map_err(|e| {
        vec![Diagnostic::error("Error encoding resource state").with_detail(e.to_string())]
    })
}

/// A resource operated on with JSON states.
#[async_trait::async_trait]
pub trait DynResource: Send + Sync {
    /// Name, schema and id policy.
    fn metadata(&self) -> &ResourceMetaData;

    /// Validate a configuration against the schema.
    fn validate_config(&self, config: &Value) -> Vec<Diagnostic> {
        validate(&self.metadata().schema, config)
    }

    /// Validate `proposed` and plan it against `prior`.
    fn plan(&self, prior: Option<&Value>, proposed: Value) -> Result<PlanResult, Vec<Diagnostic>> {
        let diagnostics = self.validate_config(&proposed);
        if has_errors(&diagnostics) {
            return Err(diagnostics);
        }
        Ok(plan_resource(&self.metadata().schema, prior, proposed))
    }

    /// See [`ResourceAdapter::create`].
    async fn create_value(&self, planned_state: Value) -> Result<Value, Vec<Diagnostic>>;

    /// See [`ResourceAdapter::read`].
    async fn read_value(&self, current_state: Value) -> Result<Option<Value>, Vec<Diagnostic>>;

    /// See [`ResourceAdapter::update`].
    async fn update_value(&self, prior_state: Value, planned_state: Value) -> Result<Value, Vec<Diagnostic>>;

    /// See [`ResourceAdapter::delete`].
    async fn delete_value(&self, current_state: Value) -> Result<(), Vec<Diagnostic>>;

    /// See [`ResourceAdapter::import_state`].
    fn import_value(&self, id: &str) -> Result<Value, Vec<Diagnostic>>;

    /// See [`ResourceAdapter::upgrade_state`].
    fn upgrade_value(&self, version: u64, state: Value) -> Result<Value, Vec<Diagnostic>>;
}

#[async_trait::async_trait]
impl<H: ResourceHandle> DynResource for ResourceAdapter<H> {
    fn metadata(&self) -> &ResourceMetaData {
        self.handle.metadata()
    }

    async fn create_value(&self, planned_state: Value) -> Result<Value, Vec<Diagnostic>> {
        let plan: H::Model = decode(planned_state)?;
        encode(&self.create(plan).await?)
    }

    async fn read_value(&self, current_state: Value) -> Result<Option<Value>, Vec<Diagnostic>> {
        let state: H::Model = decode(current_state)?;
        match self.read(&state).await? {
            Some(refreshed) => encode(&refreshed).map(Some),
            None => Ok(None),
        }
    }

    async fn update_value(&self, prior_state: Value, planned_state: Value) -> Result<Value, Vec<Diagnostic>> {
        let state: H::Model = decode(prior_state)?;
        let plan: H::Model = decode(planned_state)?;
        encode(&self.update(&plan, &state).await?)
    }

    async fn delete_value(&self, current_state: Value) -> Result<(), Vec<Diagnostic>> {
        let state: H::Model = decode(current_state)?;
        self.delete(&state).await
    }

    fn import_value(&self, id: &str) -> Result<Value, Vec<Diagnostic>> {
        encode(&self.import_state(id))
    }

    fn upgrade_value(&self, version: u64, state: Value) -> Result<Value, Vec<Diagnostic>> {
        self.upgrade_state(version, state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::application_config::{ApplicationConfigHandle, ApplicationConfigModel};
    use crate::resources::slo_config::SloConfigHandle;
    use crate::restapi::{ApplicationConfig, RestObject};
    use crate::testing::{assert_error_contains, InMemoryInstanaApi};
    use serde_json::json;

    fn adapter(api: &Arc<InMemoryInstanaApi>) -> ResourceAdapter<ApplicationConfigHandle> {
        ResourceAdapter::new(ApplicationConfigHandle::new(), api.clone())
    }

    fn plan() -> ApplicationConfigModel {
        serde_json::from_value(json!({
            "label": "shop",
            "scope": "INCLUDE_NO_DOWNSTREAM",
            "boundary_scope": "DEFAULT",
            "tag_filter": "entity.type EQUALS 'service'",
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_mints_id_and_stores_wire() {
        let api = Arc::new(InMemoryInstanaApi::new());
        let adapter = adapter(&api);

        let state = adapter.create(plan()).await.unwrap();
        let id = state.id.as_known().unwrap().clone();
        assert_eq!(id.len(), 20);

        let stored = api.application_configs.get(&id).await.unwrap();
        assert_eq!(stored.get_id_for_path(), id);
        assert_eq!(stored.label, "shop");
        assert_eq!(state.tag_filter, plan().tag_filter);
    }

    #[tokio::test]
    async fn test_read_reports_gone_object() {
        let api = Arc::new(InMemoryInstanaApi::new());
        let adapter = adapter(&api);

        let mut state = plan();
        state.id = StringValue::known("missing");
        assert!(adapter.read(&state).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_read_requires_id() {
        let api = Arc::new(InMemoryInstanaApi::new());
        let diagnostics = adapter(&api).read(&plan()).await.unwrap_err();
        assert_error_contains(&diagnostics, "Error reading resource");
        assert_eq!(diagnostics[0].attribute.as_deref(), Some("id"));
    }

    #[tokio::test]
    async fn test_read_picks_up_remote_changes() {
        let api = Arc::new(InMemoryInstanaApi::new());
        let adapter = adapter(&api);
        let state = adapter.create(plan()).await.unwrap();
        let id = state.id.as_known().unwrap().clone();

        let mut remote: ApplicationConfig = api.application_configs.get(&id).await.unwrap();
        remote.label = "renamed".to_string();
        api.application_configs.insert(remote).await;

        let refreshed = adapter.read(&state).await.unwrap().unwrap();
        assert_eq!(refreshed.label, StringValue::known("renamed"));
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let api = Arc::new(InMemoryInstanaApi::new());
        let adapter = adapter(&api);
        let state = adapter.create(plan()).await.unwrap();

        let mut next = plan();
        next.id = StringValue::Unknown;
        next.label = StringValue::known("shop-v2");
        let updated = adapter.update(&next, &state).await.unwrap();
        assert_eq!(updated.id, state.id);
        assert_eq!(updated.label, StringValue::known("shop-v2"));

        adapter.delete(&updated).await.unwrap();
        assert!(api.application_configs.is_empty().await);
        adapter.delete(&updated).await.unwrap();
    }

    #[tokio::test]
    async fn test_update_of_missing_object_fails() {
        let api = Arc::new(InMemoryInstanaApi::new());
        let adapter = adapter(&api);
        let mut state = plan();
        state.id = StringValue::known("gone");

        let diagnostics = adapter.update(&state, &state).await.unwrap_err();
        assert_error_contains(&diagnostics, "Error updating instana_application_config");
    }

    #[tokio::test]
    async fn test_slo_ids_come_from_handle() {
        let api = Arc::new(InMemoryInstanaApi::new());
        let adapter = ResourceAdapter::new(SloConfigHandle::new(), api.clone());

        let planned = json!({
            "name": "latency",
            "target": 0.99,
            "entity": {"infrastructure": {"infra_type": "kubernetesCluster"}},
            "indicator": {"event_based_availability": {}},
            "time_window": {"rolling": {"duration": 7, "duration_unit": "day"}}
        });
        let state = adapter.create_value(planned).await.unwrap();
        let id = state["id"].as_str().unwrap();
        assert!(id.starts_with("SLOTF"));
        assert!(api.slo_configs.get(id).await.is_some());
    }

    #[tokio::test]
    async fn test_dyn_plan_validates_first() {
        let api = Arc::new(InMemoryInstanaApi::new());
        let adapter: Box<dyn DynResource> = Box::new(adapter(&api));

        let diagnostics = adapter.plan(None, json!({"label": ""})).unwrap_err();
        assert_eq!(diagnostics[0].attribute.as_deref(), Some("label"));

        let plan = adapter.plan(None, json!({"label": "shop"})).unwrap();
        assert_eq!(plan.planned_state["scope"], "INCLUDE_NO_DOWNSTREAM");
    }

    #[tokio::test]
    async fn test_import_then_read() {
        let api = Arc::new(InMemoryInstanaApi::new());
        let adapter = adapter(&api);
        let created = adapter.create(plan()).await.unwrap();
        let id = created.id.as_known().unwrap();

        let imported = adapter.import_state(id);
        assert_eq!(imported.label, StringValue::Null);
        let refreshed = adapter.read(&imported).await.unwrap().unwrap();
        assert_eq!(refreshed, created);
    }

    #[test]
    fn test_upgrade_passes_through_current_version() {
        let api = Arc::new(InMemoryInstanaApi::new());
        let upgraded = adapter(&api).upgrade_state(4, json!({"label": "x"})).unwrap();
        assert_eq!(upgraded, json!({"label": "x"}));

        let diagnostics = adapter(&api).upgrade_state(5, json!({})).unwrap_err();
        assert_error_contains(&diagnostics, "cannot downgrade");
    }
}
