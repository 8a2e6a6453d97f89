//! `instana_rbac_group`: RBAC groups, their members and permission set.
//!
//! Scope ids are plain strings in the model and `{scopeId, scopeRoleId}`
//! bindings on the wire. An unset infrastructure filter is sent as the
//! disabled binding and a binding with an empty scope reads back as null.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::id_attribute;
use crate::handle::{resolve_input, ResourceHandle, ResourceMetaData};
use crate::restapi::{
    ApiMember, ApiPermissionSetWithRoles, Group, InstanaApi, RestResource, ScopeBinding,
    SUPPORTED_INSTANA_PERMISSIONS,
};
use crate::schema::{Attribute, Block, Diagnostic, NestedBlock, Schema, Validator};
use crate::value::{
    model_to_wire_string, model_to_wire_string_list, model_to_wire_string_or_empty,
    wire_to_model_string, wire_to_model_string_list, StringListValue, StringValue,
};

/// Host type name.
pub const RESOURCE_NAME: &str = "instana_rbac_group";

/// Current schema version.
pub const SCHEMA_VERSION: u64 = 1;

/// Model of an RBAC group.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupModel {
    /// Server-assigned id.
    pub id: StringValue,
    /// Group name.
    pub name: StringValue,
    /// Members.
    #[serde(deserialize_with = "crate::value::null_as_empty")]
    pub member: Vec<GroupMemberModel>,
    /// Granted scopes and permissions.
    pub permission_set: Option<PermissionSetModel>,
}

super::impl_resource_model!(GroupModel);

/// A member of a group.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupMemberModel {
    /// User id.
    pub user_id: StringValue,
    /// Email address.
    pub email: StringValue,
}

impl GroupMemberModel {
    /// A member with the given user id and optional email.
    pub fn new(user_id: &str, email: Option<&str>) -> Self {
        Self {
            user_id: StringValue::known(user_id),
            email: email.map(str::to_string).into(),
        }
    }
}

/// Permission set of a group.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PermissionSetModel {
    /// Application perspective ids.
    pub application_ids: StringListValue,
    /// Dynamic focus query restricting infrastructure.
    pub infra_dfq_filter: StringValue,
    /// Kubernetes cluster ids.
    pub kubernetes_cluster_uuids: StringListValue,
    /// Kubernetes namespace ids.
    pub kubernetes_namespaces_uuids: StringListValue,
    /// Mobile app ids.
    pub mobile_app_ids: StringListValue,
    /// Website ids.
    pub website_ids: StringListValue,
    /// Permission names.
    pub permissions: StringListValue,
}

fn scope_set(description: &str) -> Attribute {
    Attribute::optional_string_set().with_description(description)
}

/// The current schema.
pub fn schema() -> Schema {
    Schema::new(SCHEMA_VERSION)
        .with_description("This resource manages RBAC groups in Instana.")
        .with_attribute("id", id_attribute("The ID of the group."))
        .with_attribute(
            "name",
            Attribute::required_string()
                .with_description("The name of the Group")
                .with_validator(Validator::length_between(1, 256)),
        )
        .with_block(
            "member",
            NestedBlock::set(
                Block::new()
                    .with_description("The members of the group")
                    .with_attribute(
                        "user_id",
                        Attribute::required_string()
                            .with_description("The user id of the group member"),
                    )
                    .with_attribute(
                        "email",
                        Attribute::optional_computed_string()
                            .with_description("The email address of the group member"),
                    ),
            ),
        )
        .with_block(
            "permission_set",
            NestedBlock::single(
                Block::new()
                    .with_description("The permission set of the group")
                    .with_attribute(
                        "application_ids",
                        scope_set("The scope bindings to restrict access to applications"),
                    )
                    .with_attribute(
                        "infra_dfq_filter",
                        Attribute::optional_string().with_description(
                            "The scope binding for the dynamic filter query to restrict access to infrastructure assets",
                        ),
                    )
                    .with_attribute(
                        "kubernetes_cluster_uuids",
                        scope_set("The scope bindings to restrict access to Kubernetes Clusters"),
                    )
                    .with_attribute(
                        "kubernetes_namespaces_uuids",
                        scope_set("The scope bindings to restrict access to Kubernetes namespaces"),
                    )
                    .with_attribute(
                        "mobile_app_ids",
                        scope_set("The scope bindings to restrict access to mobile apps"),
                    )
                    .with_attribute(
                        "website_ids",
                        scope_set("The scope bindings to restrict access to websites"),
                    )
                    .with_attribute(
                        "permissions",
                        Attribute::optional_string_set()
                            .with_description(
                                "The permissions assigned which should be assigned to the users of the group",
                            )
                            .with_validator(Validator::one_of(&SUPPORTED_INSTANA_PERMISSIONS)),
                    ),
            ),
        )
}

fn bindings_to_wire(ids: &StringListValue) -> Vec<ScopeBinding> {
    model_to_wire_string_list(ids)
        .into_iter()
        .map(ScopeBinding::new)
        .collect()
}

fn bindings_from_wire(bindings: &[ScopeBinding]) -> StringListValue {
    let ids: Vec<String> = bindings.iter().map(|b| b.scope_id.clone()).collect();
    wire_to_model_string_list(&ids)
}

fn permission_set_to_wire(set: &PermissionSetModel) -> ApiPermissionSetWithRoles {
    let infra_dfq_filter = match model_to_wire_string(&set.infra_dfq_filter) {
        Some(query) if !query.is_empty() => ScopeBinding::new(query),
        _ => ScopeBinding::disabled(),
    };

    ApiPermissionSetWithRoles {
        application_ids: bindings_to_wire(&set.application_ids),
        infra_dfq_filter: Some(infra_dfq_filter),
        kubernetes_cluster_uuids: bindings_to_wire(&set.kubernetes_cluster_uuids),
        kubernetes_namespace_uids: bindings_to_wire(&set.kubernetes_namespaces_uuids),
        mobile_app_ids: bindings_to_wire(&set.mobile_app_ids),
        website_ids: bindings_to_wire(&set.website_ids),
        permissions: model_to_wire_string_list(&set.permissions),
    }
}

fn permission_set_from_wire(set: &ApiPermissionSetWithRoles) -> Option<PermissionSetModel> {
    if set.is_empty() {
        return None;
    }

    Some(PermissionSetModel {
        application_ids: bindings_from_wire(&set.application_ids),
        infra_dfq_filter: wire_to_model_string(set.infra_dfq_filter.as_ref().map(|f| &f.scope_id)),
        kubernetes_cluster_uuids: bindings_from_wire(&set.kubernetes_cluster_uuids),
        kubernetes_namespaces_uuids: bindings_from_wire(&set.kubernetes_namespace_uids),
        mobile_app_ids: bindings_from_wire(&set.mobile_app_ids),
        website_ids: bindings_from_wire(&set.website_ids),
        permissions: wire_to_model_string_list(&set.permissions),
    })
}

/// Handle of `instana_rbac_group`.
pub struct GroupHandle {
    metadata: ResourceMetaData,
}

impl GroupHandle {
    /// Create the handle.
    pub fn new() -> Self {
        Self {
            metadata: ResourceMetaData::new(RESOURCE_NAME, schema()),
        }
    }
}

impl Default for GroupHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceHandle for GroupHandle {
    type Model = GroupModel;
    type Wire = Group;

    fn metadata(&self) -> &ResourceMetaData {
        &self.metadata
    }

    fn map_state_to_data_object(
        &self,
        plan: Option<&GroupModel>,
        state: Option<&GroupModel>,
    ) -> Result<Group, Vec<Diagnostic>> {
        let model = resolve_input(plan, state).map_err(|e| vec![Diagnostic::from(e)])?;

        let members = model
            .member
            .iter()
            .map(|m| ApiMember {
                user_id: model_to_wire_string_or_empty(&m.user_id),
                email: model_to_wire_string(&m.email),
            })
            .collect();

        Ok(Group {
            id: model_to_wire_string_or_empty(&model.id),
            name: model_to_wire_string_or_empty(&model.name),
            members,
            permission_set: model
                .permission_set
                .as_ref()
                .map(permission_set_to_wire)
                .unwrap_or_default(),
        })
    }

    fn update_state(
        &self,
        state: Option<&GroupModel>,
        plan: Option<&GroupModel>,
        wire: &Group,
    ) -> Result<GroupModel, Vec<Diagnostic>> {
        let prior_members = [plan, state]
            .into_iter()
            .flatten()
            .map(|m| &m.member)
            .find(|members| !members.is_empty());

        let member = match prior_members {
            Some(members) => members.clone(),
            None => wire
                .members
                .iter()
                .map(|m| GroupMemberModel {
                    user_id: wire_to_model_string(Some(&m.user_id)),
                    email: wire_to_model_string(m.email.as_deref()),
                })
                .collect(),
        };

        Ok(GroupModel {
            id: wire_to_model_string(Some(&wire.id)),
            name: wire_to_model_string(Some(&wire.name)),
            member,
            permission_set: permission_set_from_wire(&wire.permission_set),
        })
    }

    fn get_rest_resource(&self, api: &dyn InstanaApi) -> Arc<dyn RestResource<Group>> {
        api.groups()
    }
}
