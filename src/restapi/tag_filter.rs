//! Wire representation of tag filter expressions.

use serde::{Deserialize, Serialize};

/// `type` of a composite node.
pub const TAG_FILTER_EXPRESSION_TYPE: &str = "EXPRESSION";
/// `type` of a leaf node.
pub const TAG_FILTER_TYPE: &str = "TAG_FILTER";

/// A node of the tag filter tree as exchanged with the REST API.
///
/// Composite nodes carry `logicalOperator` and `elements`; leaves carry
/// `name`, `entity`, `operator` and one of the typed value fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagFilter {
    /// `EXPRESSION` or `TAG_FILTER`.
    #[serde(rename = "type")]
    pub element_type: String,
    /// `AND` or `OR` for composite nodes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logical_operator: Option<String>,
    /// Child nodes of a composite.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elements: Option<Vec<TagFilter>>,
    /// Tag name of a leaf.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Tag key of a leaf.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// `DESTINATION`, `SOURCE` or `NOT_APPLICABLE`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
    /// Comparison operator of a leaf.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    /// String operand.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub string_value: Option<String>,
    /// Numeric operand.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_value: Option<i64>,
    /// Boolean operand.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boolean_value: Option<bool>,
    /// Untyped operand as echoed by the API.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
}

impl TagFilter {
    fn blank(element_type: &str) -> Self {
        Self {
            element_type: element_type.to_string(),
            logical_operator: None,
            elements: None,
            name: None,
            key: None,
            entity: None,
            operator: None,
            string_value: None,
            number_value: None,
            boolean_value: None,
            value: None,
        }
    }

    /// A composite node.
    pub fn expression(logical_operator: &str, elements: Vec<TagFilter>) -> Self {
        Self {
            logical_operator: Some(logical_operator.to_string()),
            elements: Some(elements),
            ..Self::blank(TAG_FILTER_EXPRESSION_TYPE)
        }
    }

    /// The match-all node: an `AND` composite without elements.
    pub fn empty_expression() -> Self {
        Self::expression("AND", Vec::new())
    }

    /// A leaf node without operand.
    pub fn leaf(
        entity: &str,
        name: impl Into<String>,
        key: Option<String>,
        operator: &str,
    ) -> Self {
        Self {
            name: Some(name.into()),
            key,
            entity: Some(entity.to_string()),
            operator: Some(operator.to_string()),
            ..Self::blank(TAG_FILTER_TYPE)
        }
    }

    /// A leaf node comparing against a string.
    pub fn string_tag_filter(entity: &str, name: &str, operator: &str, value: &str) -> Self {
        Self {
            string_value: Some(value.to_string()),
            value: Some(serde_json::Value::String(value.to_string())),
            ..Self::leaf(entity, name, None, operator)
        }
    }

    /// A leaf node comparing against a number.
    pub fn number_tag_filter(entity: &str, name: &str, operator: &str, value: i64) -> Self {
        Self {
            number_value: Some(value),
            value: Some(serde_json::Value::from(value)),
            ..Self::leaf(entity, name, None, operator)
        }
    }

    /// Whether this is a composite node with no elements.
    pub fn is_empty_expression(&self) -> bool {
        self.element_type == TAG_FILTER_EXPRESSION_TYPE
            && self.elements.as_ref().map_or(true, Vec::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_expression_wire_shape() {
        let value = serde_json::to_value(TagFilter::empty_expression()).unwrap();
        assert_eq!(
            value,
            json!({"type": "EXPRESSION", "logicalOperator": "AND", "elements": []})
        );
    }

    #[test]
    fn test_leaf_wire_shape() {
        let node = TagFilter::string_tag_filter("NOT_APPLICABLE", "entity.type", "EQUALS", "host");
        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "TAG_FILTER",
                "name": "entity.type",
                "entity": "NOT_APPLICABLE",
                "operator": "EQUALS",
                "stringValue": "host",
                "value": "host"
            })
        );
    }

    #[test]
    fn test_deserialize_without_elements() {
        let node: TagFilter =
            serde_json::from_value(json!({"type": "EXPRESSION", "logicalOperator": "OR"})).unwrap();
        assert!(node.is_empty_expression());
    }
}
