//! Declarative resource schemas.
//!
//! Schemas declare the attributes of each Instana resource together with the
//! validators and plan modifiers the host applies. The schema version drives
//! state upgrades.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Semantic type of an attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    /// Text.
    String,
    /// Signed 64-bit integer, used for durations and timestamps.
    Int64,
    /// Double precision number, used for thresholds and targets.
    Float64,
    /// Boolean.
    Bool,
    /// Ordered collection.
    List(Box<AttributeType>),
    /// Unordered collection without duplicates.
    Set(Box<AttributeType>),
}

impl AttributeType {
    /// Ordered collection of `element_type`.
    pub fn list(element_type: AttributeType) -> Self {
        Self::List(Box::new(element_type))
    }

    /// Unordered collection of `element_type`.
    pub fn set(element_type: AttributeType) -> Self {
        Self::Set(Box::new(element_type))
    }

    fn string_collection(ordered: bool) -> Self {
        if ordered {
            Self::list(Self::String)
        } else {
            Self::set(Self::String)
        }
    }
}

/// Who supplies an attribute: the configuration, the provider, or both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AttributeFlags {
    /// Must be set in configuration.
    pub required: bool,
    /// May be set in configuration.
    pub optional: bool,
    /// Filled in by the provider or the remote API.
    pub computed: bool,
}

impl AttributeFlags {
    const fn of(required: bool, optional: bool, computed: bool) -> Self {
        Self {
            required,
            optional,
            computed,
        }
    }

    /// Configuration must set the attribute.
    pub fn required() -> Self {
        Self::of(true, false, false)
    }

    /// Configuration may set the attribute.
    pub fn optional() -> Self {
        Self::of(false, true, false)
    }

    /// Only the provider sets the attribute, e.g. server-assigned ids.
    pub fn computed() -> Self {
        Self::of(false, false, true)
    }

    /// Configuration may set the attribute; otherwise the provider fills it.
    pub fn optional_computed() -> Self {
        Self::of(false, true, true)
    }
}

/// A constraint checked against a configured attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Validator {
    /// String length (in characters) within `min..=max`.
    LengthBetween {
        /// Minimum length.
        min: usize,
        /// Maximum length.
        max: usize,
    },
    /// Number of list or set elements within `min..=max`.
    SizeBetween {
        /// Minimum size.
        min: usize,
        /// Maximum size.
        max: usize,
    },
    /// Value (or every element of a collection) drawn from a closed set.
    OneOf {
        /// Accepted values.
        values: Vec<String>,
    },
    /// Like [`Validator::OneOf`] but ignoring ASCII case.
    OneOfCaseInsensitive {
        /// Accepted values.
        values: Vec<String>,
    },
}

impl Validator {
    /// Create a length validator.
    pub fn length_between(min: usize, max: usize) -> Self {
        Self::LengthBetween { min, max }
    }

    /// Create a collection size validator.
    pub fn size_between(min: usize, max: usize) -> Self {
        Self::SizeBetween { min, max }
    }

    /// Create a closed-set validator.
    pub fn one_of<S: AsRef<str>>(values: &[S]) -> Self {
        Self::OneOf {
            values: values.iter().map(|v| v.as_ref().to_string()).collect(),
        }
    }

    /// Create a case-insensitive closed-set validator.
    pub fn one_of_case_insensitive<S: AsRef<str>>(values: &[S]) -> Self {
        Self::OneOfCaseInsensitive {
            values: values.iter().map(|v| v.as_ref().to_string()).collect(),
        }
    }
}

/// A rule applied while planning that changes how a value is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanModifier {
    /// Copy the prior state value into the plan when the planned value is unknown.
    UseStateForUnknown,
    /// Any change forces destroy-then-create.
    RequiresReplace,
    /// Plan strings in lower case, so configured case never shows up as drift.
    Lowercase,
    /// Keep the prior JSON text when the planned text encodes the same document.
    SemanticJson,
}

/// One attribute of a resource or nested block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    /// Semantic type.
    #[serde(rename = "type")]
    pub attr_type: AttributeType,
    /// Required, optional and computed flags.
    #[serde(flatten)]
    pub flags: AttributeFlags,
    /// Documentation shown by the host.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Value planned when configuration leaves an optional attribute null.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    /// Constraints checked during validation.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validators: Vec<Validator>,
    /// Rules applied during planning.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub plan_modifiers: Vec<PlanModifier>,
}

impl Attribute {
    /// An attribute of `attr_type` without description, default or rules.
    pub fn new(attr_type: AttributeType, flags: AttributeFlags) -> Self {
        Self {
            attr_type,
            flags,
            description: None,
            default: None,
            validators: Vec::new(),
            plan_modifiers: Vec::new(),
        }
    }

    /// Mandatory text.
    pub fn required_string() -> Self {
        Self::new(AttributeType::String, AttributeFlags::required())
    }

    /// Optional text.
    pub fn optional_string() -> Self {
        Self::new(AttributeType::String, AttributeFlags::optional())
    }

    /// Provider-assigned text, typically an id.
    pub fn computed_string() -> Self {
        Self::new(AttributeType::String, AttributeFlags::computed())
    }

    /// Text the configuration may set and the provider otherwise fills.
    pub fn optional_computed_string() -> Self {
        Self::new(AttributeType::String, AttributeFlags::optional_computed())
    }

    /// Optional integer.
    pub fn optional_int64() -> Self {
        Self::new(AttributeType::Int64, AttributeFlags::optional())
    }

    /// Mandatory number.
    pub fn required_float64() -> Self {
        Self::new(AttributeType::Float64, AttributeFlags::required())
    }

    /// Optional number.
    pub fn optional_float64() -> Self {
        Self::new(AttributeType::Float64, AttributeFlags::optional())
    }

    /// Optional flag.
    pub fn optional_bool() -> Self {
        Self::new(AttributeType::Bool, AttributeFlags::optional())
    }

    /// Mandatory set of strings.
    pub fn required_string_set() -> Self {
        Self::new(AttributeType::string_collection(false), AttributeFlags::required())
    }

    /// Optional set of strings.
    pub fn optional_string_set() -> Self {
        Self::new(AttributeType::string_collection(false), AttributeFlags::optional())
    }

    /// Optional list of strings, order preserved.
    pub fn optional_string_list() -> Self {
        Self::new(AttributeType::string_collection(true), AttributeFlags::optional())
    }

    /// Attach documentation.
    pub fn with_description(self, description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            ..self
        }
    }

    /// Add a validator.
    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    /// Add a plan modifier; adding the same modifier twice is a no-op.
    pub fn with_plan_modifier(mut self, modifier: PlanModifier) -> Self {
        if !self.has_plan_modifier(modifier) {
            self.plan_modifiers.push(modifier);
        }
        self
    }

    /// Shorthand for [`PlanModifier::UseStateForUnknown`].
    pub fn use_state_for_unknown(self) -> Self {
        self.with_plan_modifier(PlanModifier::UseStateForUnknown)
    }

    /// Shorthand for [`PlanModifier::RequiresReplace`].
    pub fn requires_replace(self) -> Self {
        self.with_plan_modifier(PlanModifier::RequiresReplace)
    }

    /// Shorthand for [`PlanModifier::Lowercase`].
    pub fn lowercase(self) -> Self {
        self.with_plan_modifier(PlanModifier::Lowercase)
    }

    /// Shorthand for [`PlanModifier::SemanticJson`].
    pub fn semantic_json(self) -> Self {
        self.with_plan_modifier(PlanModifier::SemanticJson)
    }

    /// Whether the attribute carries the given plan modifier.
    pub fn has_plan_modifier(&self, modifier: PlanModifier) -> bool {
        self.plan_modifiers.contains(&modifier)
    }

    /// Value planned for a null optional attribute.
    pub fn with_default(self, default: serde_json::Value) -> Self {
        Self {
            default: Some(default),
            ..self
        }
    }
}

/// How many instances of a nested block a resource holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BlockNestingMode {
    /// At most one instance, e.g. an SLO `entity`.
    #[default]
    Single,
    /// Ordered instances, e.g. `access_rules`.
    List,
    /// Unordered instances, e.g. group `member`.
    Set,
}

/// Attributes and nested blocks of a structured attribute.
///
/// Blocks hold structured attributes such as the `entity` of an SLO
/// configuration or the `access_rules` of an application configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Block {
    /// Attributes keyed by name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, Attribute>,
    /// Nested blocks keyed by name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub blocks: BTreeMap<String, NestedBlock>,
    /// Documentation shown by the host.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Block {
    /// A block without attributes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, attr: Attribute) -> Self {
        self.attributes.insert(name.into(), attr);
        self
    }

    /// Declare a nested block.
    pub fn with_block(mut self, name: impl Into<String>, block: NestedBlock) -> Self {
        self.blocks.insert(name.into(), block);
        self
    }

    /// Attach documentation.
    pub fn with_description(self, description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            ..self
        }
    }
}

/// A block together with its nesting mode and item bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NestedBlock {
    /// Contents of each instance.
    #[serde(flatten)]
    pub block: Block,
    /// Single, list or set.
    #[serde(default)]
    pub nesting_mode: BlockNestingMode,
    /// Fewest instances accepted.
    #[serde(default)]
    pub min_items: u32,
    /// Most instances accepted; zero means no bound.
    #[serde(default)]
    pub max_items: u32,
}

impl NestedBlock {
    fn with_mode(block: Block, nesting_mode: BlockNestingMode, max_items: u32) -> Self {
        Self {
            block,
            nesting_mode,
            min_items: 0,
            max_items,
        }
    }

    /// Zero or one instance.
    pub fn single(block: Block) -> Self {
        Self::with_mode(block, BlockNestingMode::Single, 1)
    }

    /// Any number of ordered instances.
    pub fn list(block: Block) -> Self {
        Self::with_mode(block, BlockNestingMode::List, 0)
    }

    /// Any number of unordered instances.
    pub fn set(block: Block) -> Self {
        Self::with_mode(block, BlockNestingMode::Set, 0)
    }

    /// Lower bound on instances.
    pub fn with_min_items(self, min_items: u32) -> Self {
        Self { min_items, ..self }
    }

    /// Upper bound on instances.
    pub fn with_max_items(self, max_items: u32) -> Self {
        Self { max_items, ..self }
    }
}

/// Versioned schema of one resource type.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Schema {
    /// Current state version; older states go through the upgraders.
    #[serde(default)]
    pub version: u64,
    /// Top-level attributes and blocks.
    #[serde(flatten)]
    pub block: Block,
}

impl Schema {
    /// An empty schema at `version`.
    pub fn new(version: u64) -> Self {
        Self {
            version,
            block: Block::new(),
        }
    }

    /// Attach documentation.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.block = self.block.with_description(description);
        self
    }

    /// Declare a top-level attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, attr: Attribute) -> Self {
        self.block = self.block.with_attribute(name, attr);
        self
    }

    /// Declare a top-level nested block.
    pub fn with_block(mut self, name: impl Into<String>, block: NestedBlock) -> Self {
        self.block = self.block.with_block(name, block);
        self
    }
}

/// Schemas of every resource a provider exposes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ProviderSchema {
    /// Schemas keyed by host type name.
    #[serde(default)]
    pub resources: BTreeMap<String, Schema>,
}

impl ProviderSchema {
    /// No resources.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the schema of `name`.
    pub fn with_resource(mut self, name: impl Into<String>, schema: Schema) -> Self {
        self.resources.insert(name.into(), schema);
        self
    }
}

/// Severity of a [`Diagnostic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    /// The operation failed.
    Error,
    /// The operation went through but the user should look.
    Warning,
}

/// A structured message returned to the host: severity, summary, detail and path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Error or warning.
    pub severity: DiagnosticSeverity,
    /// One-line description.
    pub summary: String,
    /// Longer explanation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Dotted attribute path, e.g. `indicator.traffic.threshold`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
}

impl Diagnostic {
    fn new(severity: DiagnosticSeverity, summary: impl Into<String>) -> Self {
        Self {
            severity,
            summary: summary.into(),
            detail: None,
            attribute: None,
        }
    }

    /// An error diagnostic.
    pub fn error(summary: impl Into<String>) -> Self {
        Self::new(DiagnosticSeverity::Error, summary)
    }

    /// A warning diagnostic.
    pub fn warning(summary: impl Into<String>) -> Self {
        Self::new(DiagnosticSeverity::Warning, summary)
    }

    /// Attach a detail text.
    pub fn with_detail(self, detail: impl Into<String>) -> Self {
        Self {
            detail: Some(detail.into()),
            ..self
        }
    }

    /// Attach an attribute path.
    pub fn with_attribute(self, attribute: impl Into<String>) -> Self {
        Self {
            attribute: Some(attribute.into()),
            ..self
        }
    }

    /// Whether this diagnostic is an error.
    pub fn is_error(&self) -> bool {
        self.severity == DiagnosticSeverity::Error
    }
}

/// Whether any of the diagnostics is an error.
pub fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(Diagnostic::is_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_string_collections() {
        assert_eq!(
            Attribute::optional_string_list().attr_type,
            AttributeType::List(Box::new(AttributeType::String))
        );
        assert_eq!(
            Attribute::required_string_set().attr_type,
            AttributeType::set(AttributeType::String)
        );
        assert!(Attribute::required_string_set().flags.required);
    }

    #[test]
    fn test_computed_id_flags() {
        let id = Attribute::computed_string().use_state_for_unknown();
        assert_eq!(id.flags, AttributeFlags { required: false, optional: false, computed: true });

        let tag_filter = Attribute::optional_computed_string();
        assert!(tag_filter.flags.optional && tag_filter.flags.computed);
        assert!(!tag_filter.flags.required);
    }

    #[test]
    fn test_plan_modifiers_are_not_duplicated() {
        let attr = Attribute::optional_string_set()
            .with_description("The event types")
            .with_validator(Validator::one_of(&["incident", "critical"]))
            .requires_replace()
            .requires_replace();

        assert_eq!(attr.description.as_deref(), Some("The event types"));
        assert_eq!(attr.plan_modifiers, vec![PlanModifier::RequiresReplace]);
        assert!(!attr.has_plan_modifier(PlanModifier::UseStateForUnknown));
    }

    #[test]
    fn test_schema_builder() {
        let schema = Schema::new(2)
            .with_description("Alerting channel configuration")
            .with_attribute("alert_name", Attribute::required_string())
            .with_attribute("id", Attribute::computed_string().use_state_for_unknown())
            .with_block(
                "entity",
                NestedBlock::single(
                    Block::new().with_attribute("include_internal", Attribute::optional_bool()),
                ),
            );

        assert_eq!(schema.version, 2);
        assert_eq!(
            schema.block.description.as_deref(),
            Some("Alerting channel configuration")
        );
        assert_eq!(
            schema.block.attributes.keys().collect::<Vec<_>>(),
            vec!["alert_name", "id"]
        );
        assert_eq!(schema.block.blocks["entity"].max_items, 1);
    }

    #[test]
    fn test_provider_schema_serializes_by_type_name() {
        let provider_schema = ProviderSchema::new().with_resource(
            "instana_custom_dashboard",
            Schema::new(1).with_attribute("title", Attribute::required_string()),
        );

        let json = serde_json::to_value(&provider_schema).unwrap();
        assert_eq!(json["resources"]["instana_custom_dashboard"]["version"], 1);
        assert_eq!(
            json["resources"]["instana_custom_dashboard"]["attributes"]["title"]["required"],
            true
        );
    }

    #[test]
    fn test_validator_serialization() {
        let json = serde_json::to_value(Validator::length_between(1, 256)).unwrap();
        assert_eq!(json, json!({"kind": "length_between", "min": 1, "max": 256}));
    }

    #[test]
    fn test_diagnostic_path_and_severity() {
        let err = Diagnostic::error("Missing entity configuration")
            .with_detail("exactly one entity is required")
            .with_attribute("entity");

        assert!(err.is_error());
        assert_eq!(err.attribute.as_deref(), Some("entity"));
        assert_eq!(
            serde_json::to_value(&err).unwrap()["severity"],
            json!("error")
        );
        assert!(has_errors(&[Diagnostic::warning("w"), err]));
        assert!(!has_errors(&[Diagnostic::warning("w")]));
    }

    #[test]
    fn test_list_block_bounds() {
        let rules = NestedBlock::list(Block::new()).with_min_items(1).with_max_items(5);
        assert_eq!(rules.nesting_mode, BlockNestingMode::List);
        assert_eq!((rules.min_items, rules.max_items), (1, 5));
        assert_eq!(NestedBlock::set(Block::new()).max_items, 0);
    }
}
