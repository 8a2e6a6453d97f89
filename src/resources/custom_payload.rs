//! Custom payload fields appended to alert notifications.

use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::restapi::{CustomPayloadField, DynamicCustomPayloadFieldValue};
use crate::schema::{Attribute, Block, Diagnostic, NestedBlock};
use crate::value::{model_to_wire_string, model_to_wire_string_or_empty, wire_to_model_string, StringValue};

/// Attribute name of the custom payload field list.
pub const CUSTOM_PAYLOAD_FIELD: &str = "custom_payload_field";

/// One custom payload field. Exactly one of `value` and `dynamic_value` is set.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomPayloadFieldModel {
    /// Field key.
    pub key: StringValue,
    /// Static value.
    pub value: StringValue,
    /// Value resolved from a tag.
    pub dynamic_value: Option<DynamicValueModel>,
}

/// Tag reference of a dynamic field.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DynamicValueModel {
    /// Optional key within the tag.
    pub key: StringValue,
    /// Tag name.
    pub tag_name: StringValue,
}

impl CustomPayloadFieldModel {
    /// A static field.
    pub fn static_value(key: &str, value: &str) -> Self {
        Self {
            key: StringValue::known(key),
            value: StringValue::known(value),
            dynamic_value: None,
        }
    }

    /// A dynamic field.
    pub fn dynamic(key: &str, tag_name: &str, tag_key: Option<&str>) -> Self {
        Self {
            key: StringValue::known(key),
            value: StringValue::Null,
            dynamic_value: Some(DynamicValueModel {
                key: tag_key.map(str::to_string).into(),
                tag_name: StringValue::known(tag_name),
            }),
        }
    }
}

/// Schema of the custom payload field list.
pub fn custom_payload_field_block() -> NestedBlock {
    NestedBlock::list(
        Block::new()
            .with_description("A list of custom payload fields (static key/value pairs added to the event)")
            .with_attribute(
                "key",
                Attribute::required_string().with_description("The key of the custom payload field"),
            )
            .with_attribute(
                "value",
                Attribute::optional_string()
                    .with_description("The value of a static string custom payload field"),
            )
            .with_block(
                "dynamic_value",
                NestedBlock::single(
                    Block::new()
                        .with_description("The value of a dynamic custom payload field")
                        .with_attribute(
                            "key",
                            Attribute::optional_string()
                                .with_description("The key of the tag which should be added to the payload"),
                        )
                        .with_attribute(
                            "tag_name",
                            Attribute::required_string()
                                .with_description("The name of the tag which should be added to the payload"),
                        ),
                ),
            ),
    )
}

/// Model fields to wire fields, reporting every malformed element.
pub fn custom_payload_fields_to_wire(
    fields: &[CustomPayloadFieldModel],
) -> Result<Vec<CustomPayloadField>, Vec<Diagnostic>> {
    let mut diagnostics = Vec::new();
    let mut result = Vec::with_capacity(fields.len());

    for (index, field) in fields.iter().enumerate() {
        match field_to_wire(index, field) {
            Ok(wire) => result.push(wire),
            Err(diagnostic) => diagnostics.push(diagnostic),
        }
    }

    if diagnostics.is_empty() {
        Ok(result)
    } else {
        Err(diagnostics)
    }
}

fn field_to_wire(index: usize, field: &CustomPayloadFieldModel) -> Result<CustomPayloadField, Diagnostic> {
    let path = format!("{}.{}", CUSTOM_PAYLOAD_FIELD, index);
    let key = model_to_wire_string_or_empty(&field.key);

    match (field.value.as_known(), &field.dynamic_value) {
        (Some(_), Some(_)) => Err(ProviderError::AmbiguousVariant {
            path,
            present: vec!["value", "dynamic_value"],
        }
        .into()),
        (Some(value), None) => Ok(CustomPayloadField::StaticString {
            key,
            value: value.clone(),
        }),
        (None, Some(dynamic)) => match dynamic.tag_name.as_known() {
            Some(tag_name) => Ok(CustomPayloadField::Dynamic {
                key,
                value: DynamicCustomPayloadFieldValue {
                    key: model_to_wire_string(&dynamic.key).filter(|k| !k.is_empty()),
                    tag_name: tag_name.clone(),
                },
            }),
            None => Err(Diagnostic::error("custom_payload_field.dynamic_value missing tag_name")
                .with_detail(format!(
                    "element index {}: dynamic_value object requires a 'tag_name' attribute",
                    index
                ))
                .with_attribute(format!("{}.dynamic_value.tag_name", path))),
        },
        (None, None) => Err(Diagnostic::error("custom_payload_field missing value")
            .with_detail(format!(
                "element index {}: either value or dynamic_value is required",
                index
            ))
            .with_attribute(path)),
    }
}

/// Wire fields to model fields.
pub fn custom_payload_fields_from_wire(fields: &[CustomPayloadField]) -> Vec<CustomPayloadFieldModel> {
    fields
        .iter()
        .map(|field| match field {
            CustomPayloadField::StaticString { key, value } => CustomPayloadFieldModel {
                key: StringValue::known(key.as_str()),
                value: StringValue::known(value.as_str()),
                dynamic_value: None,
            },
            CustomPayloadField::Dynamic { key, value } => CustomPayloadFieldModel {
                key: StringValue::known(key.as_str()),
                value: StringValue::Null,
                dynamic_value: Some(DynamicValueModel {
                    key: wire_to_model_string(value.key.as_deref()),
                    tag_name: StringValue::known(value.tag_name.as_str()),
                }),
            },
        })
        .collect()
}
