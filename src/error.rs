//! Error types for the Instana provider core.

use thiserror::Error;

use crate::schema::Diagnostic;
use crate::tagfilter::ParseError;

/// Errors that can occur while translating between configuration, model and wire.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// A textual tag filter expression could not be parsed.
    #[error("Error parsing tag filter '{expression}'")]
    Parse {
        /// The expression as written in the configuration.
        expression: String,
        /// Position and expected tokens reported by the parser.
        #[source]
        source: ParseError,
    },

    /// A wire tag filter tree could not be rendered to canonical text.
    #[error("Could not normalize filter expression: {0}")]
    Normalization(String),

    /// None of the variants of a discriminated union is configured.
    #[error("Missing {path} configuration: exactly one of [{}] is required", variants.join(", "))]
    MissingVariant {
        /// Attribute path of the union.
        path: String,
        /// Names of all variants the union accepts.
        variants: Vec<&'static str>,
    },

    /// More than one variant of a discriminated union is configured.
    #[error("Ambiguous {path} configuration: only one of [{}] may be set", present.join(", "))]
    AmbiguousVariant {
        /// Attribute path of the union.
        path: String,
        /// Names of the variants that were found.
        present: Vec<&'static str>,
    },

    /// A variant is present but one of its mandatory fields is null or unknown.
    #[error("{message}")]
    MissingMandatoryField {
        /// Attribute path of the variant.
        path: String,
        /// Message naming the missing fields.
        message: String,
    },

    /// The wire value carries a tag this crate does not recognize.
    #[error("{0}")]
    UnsupportedVariant(String),

    /// A value lies outside its closed set.
    #[error("Invalid value '{value}' for {path}: expected one of [{}]", allowed.join(", "))]
    InvalidEnumValue {
        /// Attribute path of the value.
        path: String,
        /// The offending value.
        value: String,
        /// The accepted values.
        allowed: Vec<String>,
    },

    /// A handle was called with neither plan nor state.
    #[error("Both plan and state are nil")]
    BothPlanAndStateAbsent,

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A state document could not be migrated to the current schema version.
    #[error("State upgrade error: {0}")]
    StateUpgrade(String),

    /// A validation error occurred.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The requested remote object was not found.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// The remote API rejected the request.
    #[error("API error: {0}")]
    Api(String),
}

impl ProviderError {
    /// Get the error message as a string.
    ///
    /// Returns the payload for message-carrying variants and a fixed text otherwise.
    pub fn message(&self) -> &str {
        match self {
            Self::Parse { expression, .. } => expression,
            Self::Normalization(msg) => msg,
            Self::MissingVariant { .. } => "missing variant",
            Self::AmbiguousVariant { .. } => "ambiguous variant",
            Self::MissingMandatoryField { message, .. } => message,
            Self::UnsupportedVariant(msg) => msg,
            Self::InvalidEnumValue { value, .. } => value,
            Self::BothPlanAndStateAbsent => "Both plan and state are nil",
            Self::Serialization(_err) => "serialization error (see Debug output)",
            Self::StateUpgrade(msg) => msg,
            Self::Validation(msg) => msg,
            Self::NotFound(msg) => msg,
            Self::Api(msg) => msg,
        }
    }

    /// The attribute path this error is tied to, if the variant carries one.
    pub fn attribute_path(&self) -> Option<&str> {
        match self {
            Self::MissingVariant { path, .. }
            | Self::AmbiguousVariant { path, .. }
            | Self::MissingMandatoryField { path, .. }
            | Self::InvalidEnumValue { path, .. } => Some(path),
            _ => None,
        }
    }

    /// Whether this error reports a remote object that no longer exists.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Convert into a diagnostic attached to the given attribute path.
    pub fn into_diagnostic_at(self, path: impl Into<String>) -> Diagnostic {
        Diagnostic::from(self).with_attribute(path)
    }
}

impl From<ProviderError> for Diagnostic {
    fn from(err: ProviderError) -> Self {
        let summary = err.to_string();
        let diagnostic = match &err {
            ProviderError::Parse { source, .. } => {
                Diagnostic::error(summary).with_detail(source.to_string())
            },
            ProviderError::MissingMandatoryField { message, .. } => {
                Diagnostic::error(message.clone()).with_detail(message.clone())
            },
            ProviderError::InvalidEnumValue { path, value, allowed } => {
                Diagnostic::error(format!("Invalid value for attribute '{}'", path)).with_detail(format!(
                    "Value must be one of: [{}], got: \"{}\"",
                    allowed.join(", "),
                    value
                ))
            },
            _ => Diagnostic::error(summary),
        };
        match err.attribute_path() {
            Some(path) => diagnostic.with_attribute(path),
            None => diagnostic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::DiagnosticSeverity;
    use crate::tagfilter::parse;

    #[test]
    fn test_error_display() {
        let err = ProviderError::NotFound("dashboard-123".to_string());
        assert_eq!(format!("{}", err), "Resource not found: dashboard-123");

        let err = ProviderError::BothPlanAndStateAbsent;
        assert_eq!(format!("{}", err), "Both plan and state are nil");

        let err = ProviderError::Normalization("unsupported tag filter".to_string());
        assert_eq!(
            format!("{}", err),
            "Could not normalize filter expression: unsupported tag filter"
        );
    }

    #[test]
    fn test_variant_errors_display() {
        let err = ProviderError::MissingVariant {
            path: "time_window".to_string(),
            variants: vec!["rolling", "fixed"],
        };
        assert_eq!(
            format!("{}", err),
            "Missing time_window configuration: exactly one of [rolling, fixed] is required"
        );

        let err = ProviderError::AmbiguousVariant {
            path: "indicator".to_string(),
            present: vec!["time_based_latency", "traffic"],
        };
        assert_eq!(
            format!("{}", err),
            "Ambiguous indicator configuration: only one of [time_based_latency, traffic] may be set"
        );
    }

    #[test]
    fn test_into_diagnostic_keeps_path() {
        let err = ProviderError::AmbiguousVariant {
            path: "indicator".to_string(),
            present: vec!["time_based_latency", "traffic"],
        };
        let diag: Diagnostic = err.into();
        assert_eq!(diag.severity, DiagnosticSeverity::Error);
        assert_eq!(diag.attribute, Some("indicator".to_string()));
    }

    #[test]
    fn test_invalid_enum_value_diagnostic() {
        let err = ProviderError::InvalidEnumValue {
            path: "scope".to_string(),
            value: "NONE".to_string(),
            allowed: vec!["ALL".to_string(), "INBOUND".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Invalid value 'NONE' for scope: expected one of [ALL, INBOUND]"
        );

        let diag: Diagnostic = err.into();
        assert_eq!(diag.summary, "Invalid value for attribute 'scope'");
        assert_eq!(
            diag.detail.as_deref(),
            Some("Value must be one of: [ALL, INBOUND], got: \"NONE\"")
        );
        assert_eq!(diag.attribute.as_deref(), Some("scope"));
    }

    #[test]
    fn test_parse_error_diagnostic_quotes_expression() {
        let source = parse("entity.type EQUALS").unwrap_err();
        let err = ProviderError::Parse {
            expression: "entity.type EQUALS".to_string(),
            source,
        };
        let diag = err.into_diagnostic_at("tag_filter");

        assert_eq!(diag.summary, "Error parsing tag filter 'entity.type EQUALS'");
        assert!(diag.detail.unwrap().contains("position 18"));
        assert_eq!(diag.attribute, Some("tag_filter".to_string()));
    }

    #[test]
    fn test_message_method() {
        let err = ProviderError::Api("status 500".to_string());
        assert_eq!(err.message(), "status 500");

        let err = ProviderError::MissingMandatoryField {
            path: "entity.website".to_string(),
            message: "website_id and beacon_type are required for website entity".to_string(),
        };
        assert_eq!(
            err.message(),
            "website_id and beacon_type are required for website entity"
        );
        assert_eq!(err.attribute_path(), Some("entity.website"));
    }

    #[test]
    fn test_is_not_found() {
        assert!(ProviderError::NotFound("x".to_string()).is_not_found());
        assert!(!ProviderError::Api("x".to_string()).is_not_found());
    }
}
