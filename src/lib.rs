//! Instana Provider Core
//!
//! State translation and validation for the Instana infrastructure-as-code
//! provider. The crate turns declarative host configuration into Instana REST
//! payloads and back, without ever producing spurious drift.
//!
//! # Overview
//!
//! - **Three-state values**: [`value::AttrValue`] keeps known, null and unknown apart
//! - **Tag filters**: a parser and canonical renderer for the textual filter language
//! - **Schemas**: declarative resource schemas with validators and plan modifiers
//! - **Handles**: one [`ResourceHandle`] per resource translating model ⇄ wire
//! - **Adapter**: drives a handle through create/read/update/delete against a [`restapi::RestResource`]
//! - **Logging**: integration with `tracing` for structured logging
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use instana_provider_core::{init_logging, InstanaProvider};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() {
//!     init_logging();
//!
//!     let provider = InstanaProvider::new(Arc::new(MyRestClient::new()));
//!     let plan = provider
//!         .plan("instana_rbac_group", None, json!({"name": "operators"}))
//!         .unwrap();
//!     let state = provider
//!         .create("instana_rbac_group", plan.planned_state)
//!         .await
//!         .unwrap();
//!     tracing::info!(id = %state["id"], "group created");
//! }
//! ```
//!
//! # Resources
//!
//! | Type name | Handle |
//! |---|---|
//! | `instana_alerting_config` | [`resources::AlertingConfigHandle`] |
//! | `instana_application_config` | [`resources::ApplicationConfigHandle`] |
//! | `instana_custom_dashboard` | [`resources::CustomDashboardHandle`] |
//! | `instana_rbac_group` | [`resources::GroupHandle`] |
//! | `instana_slo_config` | [`resources::SloConfigHandle`] |

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapter;
pub mod error;
pub mod handle;
pub mod logging;
pub mod plan;
pub mod provider;
pub mod resources;
pub mod restapi;
pub mod schema;
pub mod tagfilter;
pub mod testing;
pub mod validation;
pub mod value;

// Re-export main types at crate root
pub use adapter::{DynResource, ResourceAdapter};
pub use error::ProviderError;
pub use handle::{ResourceHandle, ResourceMetaData, ResourceModel};
pub use logging::{init_logging, init_logging_with_default, try_init_logging};
pub use plan::{plan_resource, AttributeChange, PlanResult};
pub use provider::{provider_schema, InstanaProvider};
pub use schema::{Diagnostic, ProviderSchema};
pub use validation::{is_valid, validate, validate_result};
pub use value::{AttrValue, StringValue};

// Re-export async_trait for convenience
pub use async_trait::async_trait;

// Re-export commonly used external types
pub use serde_json;
pub use tracing;
