//! Configuration validation.
//!
//! Checks a configuration, given as `serde_json::Value`, against a resource
//! [`Schema`]: presence of required attributes, attribute types, nested block
//! cardinality and the attribute [`Validator`]s. Unknown values are skipped
//! because they are only known after apply.
//!
//! # Example
//!
//! ```
//! use instana_provider_core::schema::{Attribute, Schema, Validator};
//! use instana_provider_core::validation::validate;
//! use serde_json::json;
//!
//! let schema = Schema::new(2)
//!     .with_attribute(
//!         "alert_name",
//!         Attribute::required_string().with_validator(Validator::length_between(1, 256)),
//!     );
//!
//! let diagnostics = validate(&schema, &json!({"alert_name": "cpu-alert"}));
//! assert!(diagnostics.is_empty());
//!
//! let diagnostics = validate(&schema, &json!({"alert_name": ""}));
//! assert_eq!(diagnostics.len(), 1);
//! assert_eq!(diagnostics[0].attribute, Some("alert_name".to_string()));
//! ```

use crate::error::ProviderError;
use crate::schema::{
    Attribute, AttributeType, Block, BlockNestingMode, Diagnostic, NestedBlock, Schema, Validator,
};
use crate::value::UNKNOWN_PLACEHOLDER;
use serde_json::Value;

/// Check `config` against `schema` and collect every problem found.
///
/// An empty result means the configuration is acceptable. Required attributes
/// must be set, computed-only attributes and unknown values are ignored,
/// validators run only once the type matches, and nested blocks are checked
/// recursively against their item bounds.
pub fn validate(schema: &Schema, config: &Value) -> Vec<Diagnostic> {
    let mut checker = Checker::default();
    checker.block(&schema.block, config, "");
    checker.diagnostics
}

/// [`validate`] as a `Result`.
pub fn validate_result(schema: &Schema, config: &Value) -> Result<(), Vec<Diagnostic>> {
    match validate(schema, config) {
        diagnostics if diagnostics.is_empty() => Ok(()),
        diagnostics => Err(diagnostics),
    }
}

/// Whether `config` passes [`validate`] without diagnostics.
pub fn is_valid(schema: &Schema, config: &Value) -> bool {
    validate(schema, config).is_empty()
}

pub(crate) fn is_unknown(value: &Value) -> bool {
    value.as_str() == Some(UNKNOWN_PLACEHOLDER)
}

pub(crate) fn join_path(base: &str, name: &str) -> String {
    if base.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", base, name)
    }
}

fn item_path(base: &str, index: usize) -> String {
    format!("{}.{}", base, index)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn fits_int64(value: &Value) -> bool {
    let Value::Number(number) = value else {
        return false;
    };
    number.is_i64()
        || number
            .as_f64()
            .is_some_and(|f| f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64)
}

#[derive(Default)]
struct Checker {
    diagnostics: Vec<Diagnostic>,
}

impl Checker {
    fn report(&mut self, path: &str, summary: String, detail: Option<String>) {
        let mut diagnostic = Diagnostic::error(summary);
        if let Some(detail) = detail {
            diagnostic = diagnostic.with_detail(detail);
        }
        if !path.is_empty() {
            diagnostic = diagnostic.with_attribute(path);
        }
        self.diagnostics.push(diagnostic);
    }

    fn wrong_type(&mut self, path: &str, expected: &str, got: &Value) {
        self.report(
            path,
            format!("Invalid type for attribute '{}'", path),
            Some(format!("Expected {}, got {}", expected, json_kind(got))),
        );
    }

    fn block(&mut self, block: &Block, value: &Value, path: &str) {
        let fields = match value {
            Value::Object(fields) => fields,
            Value::Null => return,
            other if is_unknown(other) => return,
            other => {
                self.report(path, "Expected object".to_string(), Some(format!("Got {}", json_kind(other))));
                return;
            },
        };

        for (name, attr) in &block.attributes {
            self.attribute(attr, fields.get(name), &join_path(path, name));
        }
        for (name, nested) in &block.blocks {
            self.nested(nested, fields.get(name), &join_path(path, name));
        }
    }

    fn attribute(&mut self, attr: &Attribute, value: Option<&Value>, path: &str) {
        let flags = attr.flags;
        if flags.computed && !flags.optional && !flags.required {
            return;
        }

        let value = match value {
            None | Some(Value::Null) => {
                if flags.required {
                    self.report(
                        path,
                        format!("Missing required attribute '{}'", path),
                        Some("This attribute is required and must be provided".to_string()),
                    );
                }
                return;
            },
            Some(value) if is_unknown(value) => return,
            Some(value) => value,
        };

        let before = self.diagnostics.len();
        self.value_type(&attr.attr_type, value, path);
        if self.diagnostics.len() == before {
            for validator in &attr.validators {
                self.apply(validator, value, path);
            }
        }
    }

    fn value_type(&mut self, attr_type: &AttributeType, value: &Value, path: &str) {
        if is_unknown(value) {
            return;
        }
        let matches = match attr_type {
            AttributeType::String => value.is_string(),
            AttributeType::Int64 => fits_int64(value),
            AttributeType::Float64 => value.is_number(),
            AttributeType::Bool => value.is_boolean(),
            AttributeType::List(element) | AttributeType::Set(element) => {
                if let Some(items) = value.as_array() {
                    for (i, item) in items.iter().enumerate() {
                        self.value_type(element, item, &item_path(path, i));
                    }
                    true
                } else {
                    false
                }
            },
        };
        if !matches {
            let expected = match attr_type {
                AttributeType::String => "string",
                AttributeType::Int64 => "int64",
                AttributeType::Float64 => "float64",
                AttributeType::Bool => "bool",
                AttributeType::List(_) => "list",
                AttributeType::Set(_) => "set",
            };
            self.wrong_type(path, expected, value);
        }
    }

    fn apply(&mut self, validator: &Validator, value: &Value, path: &str) {
        match validator {
            Validator::LengthBetween { min, max } => {
                let Some(text) = value.as_str() else { return };
                let len = text.chars().count();
                if len < *min || len > *max {
                    self.report(
                        path,
                        format!("Invalid length for attribute '{}'", path),
                        Some(format!(
                            "Attribute {} string length must be between {} and {}, got: {}",
                            path, min, max, len
                        )),
                    );
                }
            },
            Validator::SizeBetween { min, max } => {
                let Some(items) = value.as_array() else { return };
                if items.len() < *min || items.len() > *max {
                    self.report(
                        path,
                        format!("Invalid size for attribute '{}'", path),
                        Some(format!(
                            "Attribute {} set must contain at least {} elements and at most {} elements, got: {}",
                            path,
                            min,
                            max,
                            items.len()
                        )),
                    );
                }
            },
            Validator::OneOf { values } => self.one_of(values, value, path, false),
            Validator::OneOfCaseInsensitive { values } => self.one_of(values, value, path, true),
        }
    }

    fn one_of(&mut self, allowed: &[String], value: &Value, path: &str, ignore_case: bool) {
        let accepted = |candidate: &str| {
            allowed.iter().any(|a| {
                if ignore_case {
                    a.eq_ignore_ascii_case(candidate)
                } else {
                    a == candidate
                }
            })
        };

        let candidates: Vec<(String, &Value)> = match value {
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| (item_path(path, i), item))
                .collect(),
            other => vec![(path.to_string(), other)],
        };

        for (candidate_path, candidate) in candidates {
            let Some(text) = candidate.as_str() else { continue };
            if text == UNKNOWN_PLACEHOLDER || accepted(text) {
                continue;
            }
            let err = ProviderError::InvalidEnumValue {
                path: candidate_path,
                value: text.to_string(),
                allowed: allowed.to_vec(),
            };
            self.diagnostics.push(err.into());
        }
    }

    fn nested(&mut self, nested: &NestedBlock, value: Option<&Value>, path: &str) {
        let value = match value {
            None | Some(Value::Null) => {
                if nested.min_items > 0 {
                    let summary = match nested.nesting_mode {
                        BlockNestingMode::Single => format!("Missing required block '{}'", path),
                        _ => format!("Block '{}' requires at least {} item(s)", path, nested.min_items),
                    };
                    let detail = (nested.nesting_mode == BlockNestingMode::Single)
                        .then(|| "At least one block is required".to_string());
                    self.report(path, summary, detail);
                }
                return;
            },
            Some(value) => value,
        };

        if nested.nesting_mode == BlockNestingMode::Single {
            self.block(&nested.block, value, path);
            return;
        }

        let Some(items) = value.as_array() else {
            self.report(
                path,
                format!("Expected list for block '{}'", path),
                Some(format!("Got {}", json_kind(value))),
            );
            return;
        };

        let count = items.len() as u32;
        if count < nested.min_items {
            self.report(
                path,
                format!("Block '{}' requires at least {} item(s), got {}", path, nested.min_items, count),
                None,
            );
        }
        if nested.max_items > 0 && count > nested.max_items {
            self.report(
                path,
                format!("Block '{}' allows at most {} item(s), got {}", path, nested.max_items, count),
                None,
            );
        }
        for (i, item) in items.iter().enumerate() {
            self.block(&nested.block, item, &item_path(path, i));
        }
    }
}
