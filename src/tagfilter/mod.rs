//! Tag filter expression engine.
//!
//! Tag filters are boolean expressions over `tag OPERATOR literal` comparisons.
//! They exist in three forms: the text a user writes, the [`TagFilter`] tree
//! sent to the REST API, and the canonical text stored in state. Rendering the
//! canonical text is idempotent, which keeps refreshes free of drift.
//!
//! # Example
//!
//! ```
//! use instana_provider_core::tagfilter::{normalize_expression, parse, to_wire_model};
//!
//! let expr = parse("entity.type equals 'service' and entity.label STARTS_WITH 'prod'").unwrap();
//! let wire = to_wire_model(&expr);
//! assert_eq!(wire.logical_operator.as_deref(), Some("AND"));
//!
//! let canonical = normalize_expression("entity.type   equals 'service'").unwrap();
//! assert_eq!(canonical, "entity.type EQUALS 'service'");
//! ```

pub mod ast;
pub mod mapper;
pub mod parser;
mod render;

pub use ast::{Comparison, EntityOrigin, Expression, Literal, LogicalOperator, Operator};
pub use mapper::{from_wire_model, to_wire_model};
pub use parser::{parse, ParseError};

use crate::error::ProviderError;
use crate::restapi::tag_filter::TagFilter;
use crate::value::StringValue;

/// Render a wire tree to canonical text; `None` when the tree has no elements.
pub fn render_canonical(node: &TagFilter) -> Result<Option<String>, ProviderError> {
    Ok(from_wire_model(node)?.map(|expr| expr.to_string()))
}

/// Alias of [`render_canonical`] named after its use on refresh.
pub fn map_tag_filter_to_normalized_string(
    node: &TagFilter,
) -> Result<Option<String>, ProviderError> {
    render_canonical(node)
}

/// Parse text and return its canonical form.
pub fn normalize_expression(text: &str) -> Result<String, ProviderError> {
    let expression = parse_expression(text)?;
    Ok(expression.to_string())
}

fn parse_expression(text: &str) -> Result<Expression, ProviderError> {
    parse(text).map_err(|source| ProviderError::Parse {
        expression: text.to_string(),
        source,
    })
}

/// Translate a model filter attribute into its wire tree.
///
/// Null, unknown and blank expressions become the match-all
/// [`TagFilter::empty_expression`], never an absent filter.
pub fn tag_filter_from_model(value: &StringValue) -> Result<TagFilter, ProviderError> {
    match value.as_known() {
        Some(text) if !text.trim().is_empty() => Ok(to_wire_model(&parse_expression(text)?)),
        _ => Ok(TagFilter::empty_expression()),
    }
}

/// Translate an optional wire tree into a model filter attribute.
pub fn tag_filter_to_model(node: Option<&TagFilter>) -> Result<StringValue, ProviderError> {
    match node {
        Some(node) => Ok(render_canonical(node)?.into()),
        None => Ok(StringValue::Null),
    }
}
