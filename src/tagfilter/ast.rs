//! Expression tree of the tag filter language.

use std::fmt;

/// Comparison operator of a tag filter leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `EQUALS`
    Equals,
    /// `NOT_EQUAL`
    NotEqual,
    /// `CONTAINS`
    Contains,
    /// `NOT_CONTAIN`
    NotContain,
    /// `STARTS_WITH`
    StartsWith,
    /// `ENDS_WITH`
    EndsWith,
    /// `NOT_STARTS_WITH`
    NotStartsWith,
    /// `NOT_ENDS_WITH`
    NotEndsWith,
    /// `GREATER_OR_EQUAL_THAN`
    GreaterOrEqualThan,
    /// `LESS_OR_EQUAL_THAN`
    LessOrEqualThan,
    /// `GREATER_THAN`
    GreaterThan,
    /// `LESS_THAN`
    LessThan,
    /// `IS_EMPTY`
    IsEmpty,
    /// `NOT_EMPTY`
    NotEmpty,
    /// `IS_BLANK`
    IsBlank,
    /// `NOT_BLANK`
    NotBlank,
}

impl Operator {
    /// Every supported operator.
    pub const ALL: [Operator; 16] = [
        Operator::Equals,
        Operator::NotEqual,
        Operator::Contains,
        Operator::NotContain,
        Operator::StartsWith,
        Operator::EndsWith,
        Operator::NotStartsWith,
        Operator::NotEndsWith,
        Operator::GreaterOrEqualThan,
        Operator::LessOrEqualThan,
        Operator::GreaterThan,
        Operator::LessThan,
        Operator::IsEmpty,
        Operator::NotEmpty,
        Operator::IsBlank,
        Operator::NotBlank,
    ];

    /// Canonical (wire) spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Equals => "EQUALS",
            Self::NotEqual => "NOT_EQUAL",
            Self::Contains => "CONTAINS",
            Self::NotContain => "NOT_CONTAIN",
            Self::StartsWith => "STARTS_WITH",
            Self::EndsWith => "ENDS_WITH",
            Self::NotStartsWith => "NOT_STARTS_WITH",
            Self::NotEndsWith => "NOT_ENDS_WITH",
            Self::GreaterOrEqualThan => "GREATER_OR_EQUAL_THAN",
            Self::LessOrEqualThan => "LESS_OR_EQUAL_THAN",
            Self::GreaterThan => "GREATER_THAN",
            Self::LessThan => "LESS_THAN",
            Self::IsEmpty => "IS_EMPTY",
            Self::NotEmpty => "NOT_EMPTY",
            Self::IsBlank => "IS_BLANK",
            Self::NotBlank => "NOT_BLANK",
        }
    }

    /// Look up an operator, ignoring case.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|op| op.as_str().eq_ignore_ascii_case(keyword))
    }

    /// Operators that take no literal.
    pub fn is_unary(&self) -> bool {
        matches!(
            self,
            Self::IsEmpty | Self::NotEmpty | Self::IsBlank | Self::NotBlank
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Side of a call a tag is evaluated on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EntityOrigin {
    /// `@dest`
    Destination,
    /// `@src`
    Source,
    /// `@na`, also used when no origin is written.
    #[default]
    NotApplicable,
}

impl EntityOrigin {
    /// Suffix keyword used in the textual form.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Destination => "dest",
            Self::Source => "src",
            Self::NotApplicable => "na",
        }
    }

    /// Value of the wire `entity` field.
    pub fn wire_value(&self) -> &'static str {
        match self {
            Self::Destination => "DESTINATION",
            Self::Source => "SOURCE",
            Self::NotApplicable => "NOT_APPLICABLE",
        }
    }

    /// Parse the textual suffix keyword.
    pub fn from_key(key: &str) -> Option<Self> {
        [Self::Destination, Self::Source, Self::NotApplicable]
            .into_iter()
            .find(|o| o.key().eq_ignore_ascii_case(key))
    }

    /// Parse the wire `entity` field.
    pub fn from_wire(value: &str) -> Option<Self> {
        [Self::Destination, Self::Source, Self::NotApplicable]
            .into_iter()
            .find(|o| o.wire_value() == value)
    }
}

/// Literal operand of a comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    /// Quoted string.
    String(String),
    /// Signed integer.
    Number(i64),
    /// `true` or `false`.
    Boolean(bool),
}

/// A single `tag[:key][@origin] OPERATOR [literal]` leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    /// Tag name, e.g. `entity.type`.
    pub name: String,
    /// Optional key for map-valued tags.
    pub key: Option<String>,
    /// Call side the tag applies to.
    pub origin: EntityOrigin,
    /// The comparison operator.
    pub operator: Operator,
    /// Operand; `None` for unary operators.
    pub value: Option<Literal>,
}

impl Comparison {
    /// Create a comparison without key and origin.
    pub fn new(name: impl Into<String>, operator: Operator, value: Option<Literal>) -> Self {
        Self {
            name: name.into(),
            key: None,
            origin: EntityOrigin::NotApplicable,
            operator,
            value,
        }
    }

    /// Set the call side.
    pub fn with_origin(mut self, origin: EntityOrigin) -> Self {
        self.origin = origin;
        self
    }

    /// Set the tag key.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }
}

/// Logical connective of a composite expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOperator {
    /// Conjunction; binds tighter than `OR`.
    And,
    /// Disjunction.
    Or,
}

impl LogicalOperator {
    /// Canonical (wire) spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }

    /// Parse the wire spelling, ignoring case.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        if keyword.eq_ignore_ascii_case("AND") {
            Some(Self::And)
        } else if keyword.eq_ignore_ascii_case("OR") {
            Some(Self::Or)
        } else {
            None
        }
    }
}

/// A tag filter expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    /// A leaf comparison.
    Comparison(Comparison),
    /// Elements joined by one logical operator, in source order.
    Composite {
        /// The connective.
        operator: LogicalOperator,
        /// Operands in the order they were written.
        elements: Vec<Expression>,
    },
}

impl Expression {
    /// Build a composite, collapsing a single element to itself.
    pub fn composite(operator: LogicalOperator, mut elements: Vec<Expression>) -> Self {
        if elements.len() == 1 {
            if let Some(only) = elements.pop() {
                return only;
            }
        }
        Self::Composite { operator, elements }
    }

    /// Whether this is an `OR` composite of two or more elements.
    pub fn is_disjunction(&self) -> bool {
        matches!(self, Self::Composite { operator: LogicalOperator::Or, elements } if elements.len() > 1)
    }
}

impl From<Comparison> for Expression {
    fn from(comparison: Comparison) -> Self {
        Self::Comparison(comparison)
    }
}
