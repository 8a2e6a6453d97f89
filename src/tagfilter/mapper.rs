//! Conversion between expression trees and wire [`TagFilter`] nodes.

use super::ast::{Comparison, EntityOrigin, Expression, Literal, LogicalOperator, Operator};
use crate::error::ProviderError;
use crate::restapi::tag_filter::{TagFilter, TAG_FILTER_EXPRESSION_TYPE, TAG_FILTER_TYPE};

/// Convert an expression into its wire tree.
pub fn to_wire_model(expression: &Expression) -> TagFilter {
    match expression {
        Expression::Comparison(comparison) => comparison_to_wire(comparison),
        Expression::Composite { operator, elements } => TagFilter::expression(
            operator.as_str(),
            elements.iter().map(to_wire_model).collect(),
        ),
    }
}

fn comparison_to_wire(comparison: &Comparison) -> TagFilter {
    let mut node = TagFilter::leaf(
        comparison.origin.wire_value(),
        comparison.name.clone(),
        comparison.key.clone(),
        comparison.operator.as_str(),
    );
    match &comparison.value {
        Some(Literal::String(s)) => {
            node.string_value = Some(s.clone());
            node.value = Some(serde_json::Value::String(s.clone()));
        },
        Some(Literal::Number(n)) => {
            node.number_value = Some(*n);
            node.value = Some(serde_json::Value::from(*n));
        },
        Some(Literal::Boolean(b)) => {
            node.boolean_value = Some(*b);
            node.value = Some(serde_json::Value::Bool(*b));
        },
        None => {},
    }
    node
}

/// Convert a wire tree back into an expression.
///
/// Returns `Ok(None)` for a composite without any (non-empty) elements.
pub fn from_wire_model(node: &TagFilter) -> Result<Option<Expression>, ProviderError> {
    match node.element_type.as_str() {
        TAG_FILTER_EXPRESSION_TYPE => composite_from_wire(node),
        TAG_FILTER_TYPE => comparison_from_wire(node).map(|c| Some(Expression::Comparison(c))),
        other => Err(ProviderError::Normalization(format!(
            "unsupported tag filter expression of type {}",
            other
        ))),
    }
}

fn composite_from_wire(node: &TagFilter) -> Result<Option<Expression>, ProviderError> {
    let elements = match &node.elements {
        Some(elements) if !elements.is_empty() => elements,
        _ => return Ok(None),
    };

    let raw_operator = node.logical_operator.as_deref().unwrap_or("AND");
    let operator = LogicalOperator::from_keyword(raw_operator).ok_or_else(|| {
        ProviderError::Normalization(format!(
            "unsupported logical operator {}",
            raw_operator
        ))
    })?;

    let mut children = Vec::with_capacity(elements.len());
    for element in elements {
        if let Some(child) = from_wire_model(element)? {
            children.push(child);
        }
    }

    if children.is_empty() {
        Ok(None)
    } else {
        Ok(Some(Expression::composite(operator, children)))
    }
}

fn comparison_from_wire(node: &TagFilter) -> Result<Comparison, ProviderError> {
    let name = node
        .name
        .as_deref()
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ProviderError::Normalization("tag filter without name".to_string()))?;

    let raw_operator = node.operator.as_deref().unwrap_or_default();
    let operator = Operator::from_keyword(raw_operator).ok_or_else(|| {
        ProviderError::Normalization(format!(
            "unsupported tag filter operator {} for tag {}",
            raw_operator, name
        ))
    })?;

    let origin = match node.entity.as_deref() {
        None | Some("") => EntityOrigin::NotApplicable,
        Some(entity) => EntityOrigin::from_wire(entity).ok_or_else(|| {
            ProviderError::Normalization(format!(
                "unsupported tag filter entity {} for tag {}",
                entity, name
            ))
        })?,
    };

    let value = if operator.is_unary() {
        None
    } else {
        Some(literal_from_wire(node).ok_or_else(|| {
            ProviderError::Normalization(format!("tag filter {} is missing a value", name))
        })?)
    };

    Ok(Comparison {
        name: name.to_string(),
        key: node.key.clone().filter(|k| !k.is_empty()),
        origin,
        operator,
        value,
    })
}

fn literal_from_wire(node: &TagFilter) -> Option<Literal> {
    if let Some(s) = &node.string_value {
        return Some(Literal::String(s.clone()));
    }
    if let Some(n) = node.number_value {
        return Some(Literal::Number(n));
    }
    if let Some(b) = node.boolean_value {
        return Some(Literal::Boolean(b));
    }
    match node.value.as_ref()? {
        serde_json::Value::String(s) => Some(Literal::String(s.clone())),
        serde_json::Value::Number(n) => n.as_i64().map(Literal::Number),
        serde_json::Value::Bool(b) => Some(Literal::Boolean(*b)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tagfilter::parse;

    #[test]
    fn test_and_expression_to_wire() {
        let expr = parse("entity.type EQUALS 'service' AND entity.label STARTS_WITH 'prod'").unwrap();
        let wire = to_wire_model(&expr);

        assert_eq!(wire.element_type, "EXPRESSION");
        assert_eq!(wire.logical_operator.as_deref(), Some("AND"));
        let elements = wire.elements.as_ref().unwrap();
        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0].element_type, "TAG_FILTER");
        assert_eq!(elements[0].entity.as_deref(), Some("NOT_APPLICABLE"));
        assert_eq!(elements[1].operator.as_deref(), Some("STARTS_WITH"));
        assert_eq!(elements[1].string_value.as_deref(), Some("prod"));
    }

    #[test]
    fn test_wire_round_trip_preserves_expression() {
        let expr = parse("a@dest EQUALS 5 OR (b:k@src NOT_EMPTY AND c EQUALS false)").unwrap();
        let back = from_wire_model(&to_wire_model(&expr)).unwrap();
        assert_eq!(back, Some(expr));
    }

    #[test]
    fn test_invalid_type_fails() {
        let mut node = TagFilter::empty_expression();
        node.element_type = "invalid".to_string();

        let err = from_wire_model(&node).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Could not normalize filter expression: unsupported tag filter expression of type invalid"
        );
    }

    #[test]
    fn test_empty_expression_maps_to_none() {
        assert_eq!(from_wire_model(&TagFilter::empty_expression()).unwrap(), None);

        let nested = TagFilter::expression("OR", vec![TagFilter::empty_expression()]);
        assert_eq!(from_wire_model(&nested).unwrap(), None);
    }

    #[test]
    fn test_untyped_value_fallback() {
        let mut node = TagFilter::leaf("DESTINATION", "name", None, "EQUALS");
        node.value = Some(serde_json::json!("abc"));
        let expr = from_wire_model(&node).unwrap().unwrap();
        let Expression::Comparison(c) = expr else {
            panic!("expected comparison");
        };
        assert_eq!(c.value, Some(Literal::String("abc".to_string())));
        assert_eq!(c.origin, EntityOrigin::Destination);
    }

    #[test]
    fn test_leaf_without_value_fails() {
        let node = TagFilter::leaf("DESTINATION", "name", None, "EQUALS");
        assert!(from_wire_model(&node).is_err());
    }
}
