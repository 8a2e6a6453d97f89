//! Tokenizer and recursive-descent parser for tag filter expressions.
//!
//! ```text
//! expression := or_expr EOF
//! or_expr    := and_expr ( "OR" and_expr )*
//! and_expr   := primary ( "AND" primary )*
//! primary    := "(" or_expr ")" | comparison
//! comparison := tag [ "@" origin ] OPERATOR [ literal ]
//! ```

use thiserror::Error;

use super::ast::{Comparison, EntityOrigin, Expression, Literal, LogicalOperator, Operator};

/// A tag filter expression could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unexpected {found} at position {position}, expected {}", expected.join(" or "))]
pub struct ParseError {
    /// Byte offset of the offending token.
    pub position: usize,
    /// Descriptions of the tokens that would have been accepted.
    pub expected: Vec<String>,
    /// Description of the token that was found.
    pub found: String,
}

impl ParseError {
    fn new(position: usize, expected: &[&str], found: impl Into<String>) -> Self {
        Self {
            position,
            expected: expected.iter().map(|e| e.to_string()).collect(),
            found: found.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum TokenKind {
    LParen,
    RParen,
    At,
    Word(String),
    Quoted(String),
    Eof,
}

#[derive(Debug, Clone)]
struct Token {
    kind: TokenKind,
    position: usize,
}

impl Token {
    fn describe(&self) -> String {
        match &self.kind {
            TokenKind::LParen => "'('".to_string(),
            TokenKind::RParen => "')'".to_string(),
            TokenKind::At => "'@'".to_string(),
            TokenKind::Word(w) => format!("'{}'", w),
            TokenKind::Quoted(s) => format!("string '{}'", s),
            TokenKind::Eof => "end of input".to_string(),
        }
    }

    fn is_keyword(&self, keyword: &str) -> bool {
        matches!(&self.kind, TokenKind::Word(w) if w.eq_ignore_ascii_case(keyword))
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '.' | '_' | '-' | '/' | ':')
}

fn tokenize(input: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(position, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            },
            '(' | ')' | '@' => {
                chars.next();
                let kind = match c {
                    '(' => TokenKind::LParen,
                    ')' => TokenKind::RParen,
                    _ => TokenKind::At,
                };
                tokens.push(Token { kind, position });
            },
            '\'' | '"' => {
                chars.next();
                let mut text = String::new();
                let mut closed = false;
                while let Some((_, ch)) = chars.next() {
                    if ch == c {
                        // a doubled quote is an escaped quote
                        if matches!(chars.peek(), Some(&(_, next)) if next == c) {
                            chars.next();
                            text.push(c);
                        } else {
                            closed = true;
                            break;
                        }
                    } else {
                        text.push(ch);
                    }
                }
                if !closed {
                    return Err(ParseError::new(
                        input.len(),
                        &["closing quote"],
                        "end of input",
                    ));
                }
                tokens.push(Token {
                    kind: TokenKind::Quoted(text),
                    position,
                });
            },
            c if is_word_char(c) => {
                let mut word = String::new();
                while let Some(&(_, ch)) = chars.peek() {
                    if !is_word_char(ch) {
                        break;
                    }
                    word.push(ch);
                    chars.next();
                }
                tokens.push(Token {
                    kind: TokenKind::Word(word),
                    position,
                });
            },
            other => {
                return Err(ParseError::new(
                    position,
                    &["tag name", "'('", "')'", "'@'", "literal"],
                    format!("character '{}'", other),
                ));
            },
        }
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        position: input.len(),
    });
    Ok(tokens)
}

/// Parse a textual tag filter expression.
pub fn parse(input: &str) -> Result<Expression, ParseError> {
    let tokens = tokenize(input)?;
    let mut parser = Parser { tokens, pos: 0 };
    let expression = parser.parse_or()?;
    let next = parser.peek();
    if next.kind != TokenKind::Eof {
        return Err(ParseError::new(
            next.position,
            &["AND", "OR", "end of input"],
            next.describe(),
        ));
    }
    Ok(expression)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        // the token list always ends with Eof and the cursor never moves past it
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn parse_or(&mut self) -> Result<Expression, ParseError> {
        let mut elements = vec![self.parse_and()?];
        while self.peek().is_keyword("OR") {
            self.advance();
            elements.push(self.parse_and()?);
        }
        Ok(Expression::composite(LogicalOperator::Or, elements))
    }

    fn parse_and(&mut self) -> Result<Expression, ParseError> {
        let mut elements = vec![self.parse_primary()?];
        while self.peek().is_keyword("AND") {
            self.advance();
            elements.push(self.parse_primary()?);
        }
        Ok(Expression::composite(LogicalOperator::And, elements))
    }

    fn parse_primary(&mut self) -> Result<Expression, ParseError> {
        let token = self.advance();
        match token.kind {
            TokenKind::LParen => {
                let inner = self.parse_or()?;
                let closing = self.advance();
                if closing.kind != TokenKind::RParen {
                    return Err(ParseError::new(
                        closing.position,
                        &["AND", "OR", "')'"],
                        closing.describe(),
                    ));
                }
                Ok(inner)
            },
            TokenKind::Word(ref word)
                if !token.is_keyword("AND") && !token.is_keyword("OR") =>
            {
                self.parse_comparison(word, token.position)
            },
            _ => Err(ParseError::new(
                token.position,
                &["tag name", "'('"],
                token.describe(),
            )),
        }
    }

    fn parse_comparison(&mut self, tag: &str, position: usize) -> Result<Expression, ParseError> {
        let (name, key) = match tag.split_once(':') {
            Some((name, key)) => (name, Some(key)),
            None => (tag, None),
        };
        if name.is_empty() || key.is_some_and(str::is_empty) {
            return Err(ParseError::new(
                position,
                &["tag name"],
                format!("'{}'", tag),
            ));
        }

        let mut origin = EntityOrigin::NotApplicable;
        if self.peek().kind == TokenKind::At {
            self.advance();
            let token = self.advance();
            origin = match &token.kind {
                TokenKind::Word(w) => EntityOrigin::from_key(w),
                _ => None,
            }
            .ok_or_else(|| {
                ParseError::new(token.position, &["dest", "src", "na"], token.describe())
            })?;
        }

        let token = self.advance();
        let operator = match &token.kind {
            TokenKind::Word(w) => Operator::from_keyword(w),
            _ => None,
        }
        .ok_or_else(|| ParseError::new(token.position, &["operator"], token.describe()))?;

        let value = if operator.is_unary() {
            None
        } else {
            Some(self.parse_literal()?)
        };

        Ok(Expression::Comparison(Comparison {
            name: name.to_string(),
            key: key.map(str::to_string),
            origin,
            operator,
            value,
        }))
    }

    fn parse_literal(&mut self) -> Result<Literal, ParseError> {
        let token = self.advance();
        let literal = match &token.kind {
            TokenKind::Quoted(s) => Some(Literal::String(s.clone())),
            TokenKind::Word(w) if w.eq_ignore_ascii_case("true") => Some(Literal::Boolean(true)),
            TokenKind::Word(w) if w.eq_ignore_ascii_case("false") => {
                Some(Literal::Boolean(false))
            },
            TokenKind::Word(w) => w.parse::<i64>().ok().map(Literal::Number),
            _ => None,
        };
        literal.ok_or_else(|| {
            ParseError::new(
                token.position,
                &["string literal", "number", "boolean"],
                token.describe(),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(name: &str, operator: Operator, value: Option<Literal>) -> Expression {
        Expression::Comparison(Comparison::new(name, operator, value))
    }

    #[test]
    fn test_parse_single_comparison() {
        let expr = parse("entity.type EQUALS 'service'").unwrap();
        assert_eq!(
            expr,
            leaf(
                "entity.type",
                Operator::Equals,
                Some(Literal::String("service".to_string()))
            )
        );
    }

    #[test]
    fn test_parse_origin_key_and_number() {
        let expr = parse("kubernetes.label:app@src GREATER_THAN -12").unwrap();
        let Expression::Comparison(c) = expr else {
            panic!("expected comparison");
        };
        assert_eq!(c.name, "kubernetes.label");
        assert_eq!(c.key, Some("app".to_string()));
        assert_eq!(c.origin, EntityOrigin::Source);
        assert_eq!(c.operator, Operator::GreaterThan);
        assert_eq!(c.value, Some(Literal::Number(-12)));
    }

    #[test]
    fn test_parse_unary_operator() {
        let expr = parse("call.error.message is_empty").unwrap();
        assert_eq!(expr, leaf("call.error.message", Operator::IsEmpty, None));
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        let expr = parse("a EQUALS 1 OR b EQUALS 2 AND c EQUALS true").unwrap();
        assert_eq!(
            expr,
            Expression::Composite {
                operator: LogicalOperator::Or,
                elements: vec![
                    leaf("a", Operator::Equals, Some(Literal::Number(1))),
                    Expression::Composite {
                        operator: LogicalOperator::And,
                        elements: vec![
                            leaf("b", Operator::Equals, Some(Literal::Number(2))),
                            leaf("c", Operator::Equals, Some(Literal::Boolean(true))),
                        ],
                    },
                ],
            }
        );
    }

    #[test]
    fn test_parentheses_override_precedence() {
        let expr = parse("(a EQUALS 1 or b EQUALS 2) and c NOT_EMPTY").unwrap();
        let Expression::Composite { operator, elements } = expr else {
            panic!("expected composite");
        };
        assert_eq!(operator, LogicalOperator::And);
        assert!(elements[0].is_disjunction());
    }

    #[test]
    fn test_escaped_quotes() {
        let expr = parse(r#"name EQUALS 'it''s' OR name EQUALS "say ""hi""""#).unwrap();
        let Expression::Composite { elements, .. } = expr else {
            panic!("expected composite");
        };
        assert_eq!(
            elements[0],
            leaf("name", Operator::Equals, Some(Literal::String("it's".to_string())))
        );
        assert_eq!(
            elements[1],
            leaf(
                "name",
                Operator::Equals,
                Some(Literal::String("say \"hi\"".to_string()))
            )
        );
    }

    #[test]
    fn test_missing_literal_reports_position() {
        let err = parse("entity.type EQUALS").unwrap_err();
        assert_eq!(err.position, 18);
        assert_eq!(err.found, "end of input");
        assert!(err.expected.contains(&"string literal".to_string()));
    }

    #[test]
    fn test_unknown_operator() {
        let err = parse("entity.type LIKE 'x'").unwrap_err();
        assert_eq!(err.position, 12);
        assert_eq!(err.expected, vec!["operator".to_string()]);
    }

    #[test]
    fn test_unbalanced_parenthesis() {
        let err = parse("(a EQUALS 1").unwrap_err();
        assert_eq!(err.found, "end of input");

        let err = parse("a EQUALS 1)").unwrap_err();
        assert_eq!(err.position, 10);
    }

    #[test]
    fn test_unterminated_string() {
        let err = parse("a EQUALS 'abc").unwrap_err();
        assert_eq!(err.expected, vec!["closing quote".to_string()]);
    }

    #[test]
    fn test_invalid_origin() {
        let err = parse("a@foo EQUALS 1").unwrap_err();
        assert_eq!(err.position, 2);
    }

    #[test]
    fn test_empty_input() {
        let err = parse("   ").unwrap_err();
        assert_eq!(err.position, 3);
        assert_eq!(err.found, "end of input");
    }

    #[test]
    fn test_error_display() {
        let err = parse("a EQUALS").unwrap_err();
        assert_eq!(
            err.to_string(),
            "unexpected end of input at position 8, expected string literal or number or boolean"
        );
    }
}
