//! The contract every resource handle implements.
//!
//! A handle is a stateless translator between the host model of one resource
//! and its REST wire record. The [`adapter`](crate::adapter) drives handles in
//! host order; handles never perform I/O themselves.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ProviderError;
use crate::restapi::{InstanaApi, RestObject, RestResource};
use crate::schema::{Diagnostic, Schema};
use crate::value::StringValue;

/// Migrates a raw state document from one schema version to the next.
pub type StateUpgrader = fn(serde_json::Value) -> Result<serde_json::Value, ProviderError>;

/// The host-side model of a resource.
///
/// Models serialize to the state document persisted by the host.
pub trait ResourceModel: Serialize + DeserializeOwned + Clone + Default + Send + Sync + 'static {
    /// The resource id.
    fn id(&self) -> &StringValue;

    /// Replace the resource id.
    fn set_id(&mut self, id: StringValue);
}

/// Static description of a resource.
#[derive(Debug, Clone)]
pub struct ResourceMetaData {
    /// Host type name, e.g. `instana_slo_config`.
    pub resource_name: &'static str,
    /// Declared schema; its version is the current state version.
    pub schema: Schema,
    /// Whether the handle mints ids itself in [`ResourceHandle::set_computed_fields`].
    pub skip_id_generation: bool,
}

impl ResourceMetaData {
    /// Metadata for a resource whose ids are assigned by the adapter or the server.
    pub fn new(resource_name: &'static str, schema: Schema) -> Self {
        Self {
            resource_name,
            schema,
            skip_id_generation: false,
        }
    }

    /// Leave id generation to the handle.
    pub fn with_skip_id_generation(mut self) -> Self {
        self.skip_id_generation = true;
        self
    }

    /// The current schema version.
    pub fn schema_version(&self) -> u64 {
        self.schema.version
    }
}

/// Translates one resource between its model and its wire record.
pub trait ResourceHandle: Send + Sync + 'static {
    /// Host-side model.
    type Model: ResourceModel;
    /// REST wire record.
    type Wire: RestObject;

    /// Name, schema and id policy of the resource.
    fn metadata(&self) -> &ResourceMetaData;

    /// Fill computed fields of a plan before it is sent on create.
    fn set_computed_fields(&self, plan: &mut Self::Model) -> Vec<Diagnostic> {
        let _ = plan;
        Vec::new()
    }

    /// Build the wire record from the plan, falling back to the state.
    fn map_state_to_data_object(
        &self,
        plan: Option<&Self::Model>,
        state: Option<&Self::Model>,
    ) -> Result<Self::Wire, Vec<Diagnostic>>;

    /// Build the new state from the wire record the server returned.
    fn update_state(
        &self,
        state: Option<&Self::Model>,
        plan: Option<&Self::Model>,
        wire: &Self::Wire,
    ) -> Result<Self::Model, Vec<Diagnostic>>;

    /// The REST collaborator for this resource.
    fn get_rest_resource(&self, api: &dyn InstanaApi) -> Arc<dyn RestResource<Self::Wire>>;

    /// Upgraders keyed by the version they migrate from.
    fn state_upgraders(&self) -> BTreeMap<u64, StateUpgrader> {
        BTreeMap::new()
    }
}

/// Pick the plan if present, otherwise the state.
pub fn resolve_input<'a, M>(
    plan: Option<&'a M>,
    state: Option<&'a M>,
) -> Result<&'a M, ProviderError> {
    plan.or(state).ok_or(ProviderError::BothPlanAndStateAbsent)
}

/// Resolve a discriminated union given as sibling optional variants.
///
/// Exactly one variant must be present. Returns
/// [`ProviderError::MissingVariant`] when none is and
/// [`ProviderError::AmbiguousVariant`] when several are.
///
/// ```
/// use instana_provider_core::handle::exactly_one;
///
/// let window = exactly_one("time_window", [("rolling", Some(7)), ("fixed", None)]).unwrap();
/// assert_eq!(window, 7);
///
/// let err = exactly_one::<i32, 2>("time_window", [("rolling", None), ("fixed", None)]);
/// assert!(err.is_err());
/// ```
pub fn exactly_one<T, const N: usize>(
    path: &str,
    variants: [(&'static str, Option<T>); N],
) -> Result<T, ProviderError> {
    let names: Vec<&'static str> = variants.iter().map(|(name, _)| *name).collect();
    let mut present = Vec::new();
    let mut chosen = None;

    for (name, value) in variants {
        if let Some(value) = value {
            present.push(name);
            if chosen.is_none() {
                chosen = Some(value);
            }
        }
    }

    match chosen {
        Some(value) if present.len() == 1 => Ok(value),
        Some(_) => Err(ProviderError::AmbiguousVariant {
            path: path.to_string(),
            present,
        }),
        None => Err(ProviderError::MissingVariant {
            path: path.to_string(),
            variants: names,
        }),
    }
}

/// Record the error of `result` and continue with `None`.
pub fn collect<T, E: Into<Diagnostic>>(diagnostics: &mut Vec<Diagnostic>, result: Result<T, E>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            diagnostics.push(err.into());
            None
        },
    }
}

/// Like [`collect`], attaching `path` when the error has none of its own.
pub fn collect_at<T>(
    diagnostics: &mut Vec<Diagnostic>,
    path: &str,
    result: Result<T, ProviderError>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) if err.attribute_path().is_some() => {
            diagnostics.push(err.into());
            None
        },
        Err(err) => {
            diagnostics.push(err.into_diagnostic_at(path));
            None
        },
    }
}

/// Migrate a raw state document from `from` to `to`.
///
/// Upgraders run in version order; versions without an upgrader pass the
/// document through unchanged.
pub fn upgrade_state(
    upgraders: &BTreeMap<u64, StateUpgrader>,
    from: u64,
    to: u64,
    state: serde_json::Value,
) -> Result<serde_json::Value, ProviderError> {
    if from > to {
        return Err(ProviderError::StateUpgrade(format!(
            "cannot downgrade state from version {} to {}",
            from, to
        )));
    }

    upgraders
        .range(from..to)
        .try_fold(state, |state, (version, upgrader)| {
            tracing::debug!(from_version = version, "Applying state upgrader");
            upgrader(state)
        })
}
