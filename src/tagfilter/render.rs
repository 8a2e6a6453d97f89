//! Canonical text rendering.
//!
//! Operators upper case, one space between tokens, strings single-quoted with
//! doubled embedded quotes, elements in source order. A disjunction nested in
//! another composite keeps its parentheses; leaves and conjunctions do not get any.

use std::fmt;

use super::ast::{Comparison, EntityOrigin, Expression, Literal};

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Literal::Number(n) => write!(f, "{}", n),
            Literal::Boolean(b) => write!(f, "{}", b),
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if let Some(key) = &self.key {
            write!(f, ":{}", key)?;
        }
        if self.origin != EntityOrigin::NotApplicable {
            write!(f, "@{}", self.origin.key())?;
        }
        write!(f, " {}", self.operator)?;
        if let Some(value) = &self.value {
            write!(f, " {}", value)?;
        }
        Ok(())
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Comparison(c) => c.fmt(f),
            Expression::Composite { operator, elements } => {
                let mut first = true;
                for element in elements {
                    if let Expression::Composite { elements: inner, .. } = element {
                        if inner.is_empty() {
                            continue;
                        }
                    }
                    if !first {
                        write!(f, " {} ", operator.as_str())?;
                    }
                    first = false;
                    if element.is_disjunction() {
                        write!(f, "({})", element)?;
                    } else {
                        element.fmt(f)?;
                    }
                }
                Ok(())
            },
        }
    }
}
