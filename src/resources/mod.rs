//! Resource handles for the Instana REST resources.

/// Implement [`ResourceModel`](crate::handle::ResourceModel) for a model with an `id` field.
macro_rules! impl_resource_model {
    ($model:ty) => {
        impl $crate::handle::ResourceModel for $model {
            fn id(&self) -> &$crate::value::StringValue {
                &self.id
            }

            fn set_id(&mut self, id: $crate::value::StringValue) {
                self.id = id;
            }
        }
    };
}

pub(crate) use impl_resource_model;

pub mod access_rule;
pub mod alerting_config;
pub mod application_config;
pub mod custom_payload;
pub mod custom_dashboard;
pub mod group;
pub mod slo_config;

pub use alerting_config::{AlertingConfigHandle, AlertingConfigModel};
pub use application_config::{ApplicationConfigHandle, ApplicationConfigModel};
pub use custom_dashboard::{CustomDashboardHandle, CustomDashboardModel};
pub use group::{GroupHandle, GroupModel};
pub use slo_config::{SloConfigHandle, SloConfigModel};

use crate::schema::Attribute;

/// The computed `id` attribute shared by every resource.
pub(crate) fn id_attribute(description: &str) -> Attribute {
    Attribute::computed_string()
        .use_state_for_unknown()
        .with_description(description)
}
