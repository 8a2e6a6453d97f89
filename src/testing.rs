//! Testing utilities for resource handles.
//!
//! This module provides an in-memory stand-in for the Instana REST API and a
//! tester that drives a handle through the host lifecycle without a network.
//!
//! # Example
//!
//! ```ignore
//! use instana_provider_core::resources::GroupHandle;
//! use instana_provider_core::testing::HandleTester;
//! use serde_json::json;
//!
//! #[tokio::test]
//! async fn test_create_group() {
//!     let tester = HandleTester::new(GroupHandle::new());
//!
//!     let state = tester
//!         .lifecycle_create(json!({"name": "operators"}))
//!         .await
//!         .unwrap();
//!
//!     assert_eq!(state.name.as_known().map(String::as_str), Some("operators"));
//! }
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;

use crate::adapter::ResourceAdapter;
use crate::error::ProviderError;
use crate::handle::ResourceHandle;
use crate::plan::{plan_resource, PlanResult};
use crate::restapi::{
    AlertingConfiguration, ApplicationConfig, CustomDashboard, Group, InstanaApi, RestObject,
    RestResource, SloConfig,
};
use crate::schema::Diagnostic;
use crate::validation::validate;

// =========================================================================
// In-memory REST API
// =========================================================================

/// A [`RestResource`] keeping objects in a map keyed by id.
///
/// `get_one`, `update` and `delete` report [`ProviderError::NotFound`] for
/// unknown ids, the way the REST transport reports a 404.
pub struct InMemoryRestResource<T: RestObject> {
    objects: RwLock<BTreeMap<String, T>>,
}

impl<T: RestObject> InMemoryRestResource<T> {
    /// Create an empty resource.
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(BTreeMap::new()),
        }
    }

    /// Store an object as if the server had changed it.
    pub async fn insert(&self, object: T) {
        self.objects
            .write()
            .await
            .insert(object.get_id_for_path().to_string(), object);
    }

    /// The stored object with `id`.
    pub async fn get(&self, id: &str) -> Option<T> {
        self.objects.read().await.get(id).cloned()
    }

    /// Number of stored objects.
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    /// Whether nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

impl<T: RestObject> Default for InMemoryRestResource<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl<T: RestObject> RestResource<T> for InMemoryRestResource<T> {
    async fn get_one(&self, id: &str) -> Result<T, ProviderError> {
        self.get(id)
            .await
            .ok_or_else(|| ProviderError::NotFound(id.to_string()))
    }

    async fn get_all(&self) -> Result<Vec<T>, ProviderError> {
        Ok(self.objects.read().await.values().cloned().collect())
    }

    async fn create(&self, data: &T) -> Result<T, ProviderError> {
        if data.get_id_for_path().is_empty() {
            return Err(ProviderError::Api("object has no id".to_string()));
        }
        self.insert(data.clone()).await;
        Ok(data.clone())
    }

    async fn update(&self, data: &T) -> Result<T, ProviderError> {
        let mut objects = self.objects.write().await;
        match objects.get_mut(data.get_id_for_path()) {
            Some(existing) => {
                *existing = data.clone();
                Ok(data.clone())
            },
            None => Err(ProviderError::NotFound(data.get_id_for_path().to_string())),
        }
    }

    async fn delete(&self, id: &str) -> Result<(), ProviderError> {
        self.objects
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| ProviderError::NotFound(id.to_string()))
    }
}

/// An [`InstanaApi`] backed by [`InMemoryRestResource`]s.
#[derive(Default)]
#[allow(missing_docs)]
pub struct InMemoryInstanaApi {
    pub alerting_configurations: Arc<InMemoryRestResource<AlertingConfiguration>>,
    pub application_configs: Arc<InMemoryRestResource<ApplicationConfig>>,
    pub custom_dashboards: Arc<InMemoryRestResource<CustomDashboard>>,
    pub groups: Arc<InMemoryRestResource<Group>>,
    pub slo_configs: Arc<InMemoryRestResource<SloConfig>>,
}

impl InMemoryInstanaApi {
    /// Create an API with no objects.
    pub fn new() -> Self {
        Self::default()
    }
}

impl InstanaApi for InMemoryInstanaApi {
    fn alerting_configurations(&self) -> Arc<dyn RestResource<AlertingConfiguration>> {
        self.alerting_configurations.clone()
    }

    fn application_configs(&self) -> Arc<dyn RestResource<ApplicationConfig>> {
        self.application_configs.clone()
    }

    fn custom_dashboards(&self) -> Arc<dyn RestResource<CustomDashboard>> {
        self.custom_dashboards.clone()
    }

    fn groups(&self) -> Arc<dyn RestResource<Group>> {
        self.groups.clone()
    }

    fn slo_configs(&self) -> Arc<dyn RestResource<SloConfig>> {
        self.slo_configs.clone()
    }
}

// =========================================================================
// Handle tester
// =========================================================================

/// A test harness running a handle against an [`InMemoryInstanaApi`].
pub struct HandleTester<H: ResourceHandle> {
    api: Arc<InMemoryInstanaApi>,
    adapter: ResourceAdapter<H>,
}

impl<H: ResourceHandle> HandleTester<H> {
    /// Create a new tester for the given handle.
    pub fn new(handle: H) -> Self {
        let api = Arc::new(InMemoryInstanaApi::new());
        let adapter = ResourceAdapter::new(handle, api.clone());
        Self { api, adapter }
    }

    /// The in-memory API, to inspect or tamper with remote objects.
    pub fn api(&self) -> &InMemoryInstanaApi {
        &self.api
    }

    /// The adapter under test.
    pub fn adapter(&self) -> &ResourceAdapter<H> {
        &self.adapter
    }

    /// Validate a configuration against the handle's schema.
    pub fn validate(&self, config: &Value) -> Result<(), TestError> {
        check_diagnostics(validate(&self.adapter.handle().metadata().schema, config))
    }

    /// Plan a resource creation (no prior state).
    pub fn plan_create(&self, config: Value) -> Result<PlanResult, TestError> {
        self.validate(&config)?;
        Ok(plan_resource(&self.adapter.handle().metadata().schema, None, config))
    }

    /// Plan a resource update.
    pub fn plan_update(&self, prior_state: &H::Model, config: Value) -> Result<PlanResult, TestError> {
        self.validate(&config)?;
        let prior = serde_json::to_value(prior_state)?;
        Ok(plan_resource(&self.adapter.handle().metadata().schema, Some(&prior), config))
    }

    /// Create a resource from a planned state.
    pub async fn create(&self, plan: H::Model) -> Result<H::Model, TestError> {
        Ok(self.adapter.create(plan).await?)
    }

    /// Read the current state of a resource.
    pub async fn read(&self, state: &H::Model) -> Result<Option<H::Model>, TestError> {
        Ok(self.adapter.read(state).await?)
    }

    /// Update an existing resource.
    pub async fn update(&self, plan: &H::Model, state: &H::Model) -> Result<H::Model, TestError> {
        Ok(self.adapter.update(plan, state).await?)
    }

    /// Delete a resource.
    pub async fn delete(&self, state: &H::Model) -> Result<(), TestError> {
        Ok(self.adapter.delete(state).await?)
    }

    /// Plan, create and read back a new resource.
    pub async fn lifecycle_create(&self, config: Value) -> Result<H::Model, TestError> {
        let planned: H::Model = serde_json::from_value(self.plan_create(config)?.planned_state)?;
        let created = self.create(planned).await?;
        self.read(&created).await?.ok_or(TestError::Vanished("create"))
    }

    /// Plan an update of `prior_state`, apply it and read the result back.
    pub async fn lifecycle_update(&self, prior_state: &H::Model, config: Value) -> Result<H::Model, TestError> {
        let planned: H::Model = serde_json::from_value(self.plan_update(prior_state, config)?.planned_state)?;
        let updated = self.update(&planned, prior_state).await?;
        self.read(&updated).await?.ok_or(TestError::Vanished("update"))
    }

    /// Create from `config`, read the resource back and plan `config` again.
    ///
    /// A plan without changes means the refreshed state agrees with the
    /// configuration that produced it.
    pub async fn lifecycle_replan(&self, config: Value) -> Result<(H::Model, PlanResult), TestError> {
        let state = self.lifecycle_create(config.clone()).await?;
        let plan = self.plan_update(&state, config)?;
        Ok((state, plan))
    }

    /// Create from `initial_config`, update to `updated_config`, then delete.
    ///
    /// Returns the state read back after the update.
    pub async fn lifecycle_crud(&self, initial_config: Value, updated_config: Value) -> Result<H::Model, TestError> {
        let created = self.lifecycle_create(initial_config).await?;
        let updated = self.lifecycle_update(&created, updated_config).await?;
        self.delete(&updated).await?;
        Ok(updated)
    }
}

/// Why a [`HandleTester`] step failed.
#[derive(Debug, thiserror::Error)]
pub enum TestError {
    /// The step returned error diagnostics.
    #[error("{}", render_diagnostics(.0))]
    Diagnostics(Vec<Diagnostic>),
    /// A state document could not be converted.
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
    /// The object was gone when read back after the named step.
    #[error("Resource vanished after {0}")]
    Vanished(&'static str),
}

impl From<serde_json::Error> for TestError {
    fn from(e: serde_json::Error) -> Self {
        TestError::Provider(e.into())
    }
}

impl From<Vec<Diagnostic>> for TestError {
    fn from(diagnostics: Vec<Diagnostic>) -> Self {
        TestError::Diagnostics(diagnostics)
    }
}

fn render_diagnostics(diagnostics: &[Diagnostic]) -> String {
    let mut out = format!("{} diagnostic(s):", diagnostics.len());
    for d in diagnostics {
        out.push_str(&format!("\n  [{:?}] {}", d.severity, d.summary));
        if let Some(detail) = &d.detail {
            out.push_str(&format!(": {}", detail));
        }
        if let Some(attribute) = &d.attribute {
            out.push_str(&format!(" (at {})", attribute));
        }
    }
    out
}

fn check_diagnostics(diagnostics: Vec<Diagnostic>) -> Result<(), TestError> {
    let errors: Vec<Diagnostic> = diagnostics.into_iter().filter(Diagnostic::is_error).collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(TestError::Diagnostics(errors))
    }
}

fn errors(diagnostics: &[Diagnostic]) -> impl Iterator<Item = &Diagnostic> {
    diagnostics.iter().filter(|d| d.is_error())
}

fn changed_paths(plan: &PlanResult) -> Vec<&str> {
    plan.changes.iter().map(|c| c.path.as_str()).collect()
}

/// Panics unless `plan` is a fresh creation: some changes, no replacement.
pub fn assert_plan_creates(plan: &PlanResult) {
    assert!(!plan.changes.is_empty(), "create plan has no changes");
    assert!(!plan.requires_replace, "create plan asks for replacement");
}

/// Panics if `plan` changes anything.
pub fn assert_plan_no_changes(plan: &PlanResult) {
    assert!(
        plan.changes.is_empty(),
        "Expected no changes, planned changes at {:?}",
        changed_paths(plan)
    );
}

/// Panics unless `plan` forces destroy-then-create.
pub fn assert_plan_replaces(plan: &PlanResult) {
    assert!(plan.requires_replace, "Expected a replacement, plan updates in place");
}

/// Panics if `plan` forces destroy-then-create.
pub fn assert_plan_updates_in_place(plan: &PlanResult) {
    assert!(!plan.requires_replace, "Expected an in-place update, plan replaces");
}

/// Panics unless `plan` changes the attribute at `path`.
pub fn assert_plan_changes_attribute(plan: &PlanResult, path: &str) {
    let paths = changed_paths(plan);
    assert!(paths.contains(&path), "'{}' is not among the planned changes {:?}", path, paths);
}

/// Panics on any error diagnostic; warnings pass.
pub fn assert_no_errors(diagnostics: &[Diagnostic]) {
    let summaries: Vec<&str> = errors(diagnostics).map(|d| d.summary.as_str()).collect();
    assert!(summaries.is_empty(), "Expected no errors, got {:?}", summaries);
}

/// Panics unless at least one diagnostic is an error.
pub fn assert_has_errors(diagnostics: &[Diagnostic]) {
    assert!(errors(diagnostics).next().is_some(), "Expected at least one error, got none");
}

/// Panics unless an error summary contains `substring`.
pub fn assert_error_contains(diagnostics: &[Diagnostic], substring: &str) {
    assert!(
        errors(diagnostics).any(|d| d.summary.contains(substring)),
        "No error mentions '{}': {:?}",
        substring,
        errors(diagnostics).map(|d| d.summary.as_str()).collect::<Vec<_>>()
    );
}

/// Panics unless an error is attached to the attribute at `path`.
pub fn assert_error_at(diagnostics: &[Diagnostic], path: &str) {
    assert!(
        errors(diagnostics).any(|d| d.attribute.as_deref() == Some(path)),
        "No error at '{}', errors were at {:?}",
        path,
        errors(diagnostics).map(|d| d.attribute.as_deref()).collect::<Vec<_>>()
    );
}
