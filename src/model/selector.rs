//! A small selector engine: shape-type names, `*`, and `:is(...)` unions.

use super::{Shape, ValidatedModel};
use crate::syntax::ShapeType;

#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    Any,
    Type(ShapeType),
    /// `simpleType`: any of the scalar shape types.
    Simple,
    /// `number`: numeric shape types.
    Number,
    Is(Vec<Selector>),
}

impl Selector {
    pub fn matches(&self, shape: &Shape) -> bool {
        match self {
            Selector::Any => true,
            Selector::Type(t) => shape.shape_type == *t,
            Selector::Simple => shape.shape_type.is_simple(),
            Selector::Number => matches!(
                shape.shape_type,
                ShapeType::Byte
                    | ShapeType::Short
                    | ShapeType::Integer
                    | ShapeType::Long
                    | ShapeType::Float
                    | ShapeType::Double
                    | ShapeType::BigInteger
                    | ShapeType::BigDecimal
            ),
            Selector::Is(inner) => inner.iter().any(|s| s.matches(shape)),
        }
    }
}

/// Parse a selector expression. Unknown constructs are errors: the caller
/// logs them and returns an empty result.
pub fn parse(expression: &str) -> Result<Selector, String> {
    let mut parser = SelectorParser {
        text: expression,
        pos: 0,
    };
    let selector = parser.parse_one()?;
    parser.skip_ws();
    if parser.pos != parser.text.len() {
        return Err(format!(
            "unexpected trailing input at offset {}",
            parser.pos
        ));
    }
    Ok(selector)
}

/// Evaluate a selector over every shape in the model that has a source
/// location, in model source order.
pub fn select<'a>(model: &'a ValidatedModel, selector: &Selector) -> Vec<&'a Shape> {
    model
        .shapes()
        .filter(|shape| shape.source.is_some())
        .filter(|shape| selector.matches(shape))
        .collect()
}

struct SelectorParser<'a> {
    text: &'a str,
    pos: usize,
}

impl SelectorParser<'_> {
    fn skip_ws(&mut self) {
        while self.text[self.pos..].starts_with([' ', '\t', '\n', '\r']) {
            self.pos += 1;
        }
    }

    fn parse_one(&mut self) -> Result<Selector, String> {
        self.skip_ws();
        let rest = &self.text[self.pos..];
        if rest.is_empty() {
            return Err("empty selector".to_string());
        }
        if let Some(stripped) = rest.strip_prefix('*') {
            self.pos = self.text.len() - stripped.len();
            return Ok(Selector::Any);
        }
        if rest.starts_with(":is(") {
            self.pos += ":is(".len();
            let mut inner = Vec::new();
            loop {
                inner.push(self.parse_one()?);
                self.skip_ws();
                if self.text[self.pos..].starts_with(',') {
                    self.pos += 1;
                } else {
                    break;
                }
            }
            if !self.text[self.pos..].starts_with(')') {
                return Err("expected ')' to close :is(...)".to_string());
            }
            self.pos += 1;
            return Ok(Selector::Is(inner));
        }

        let word_len = rest
            .find(|c: char| !c.is_ascii_alphanumeric())
            .unwrap_or(rest.len());
        if word_len == 0 {
            return Err(format!("unexpected character at offset {}", self.pos));
        }
        let word = &rest[..word_len];
        self.pos += word_len;
        match word {
            "simpleType" => Ok(Selector::Simple),
            "number" => Ok(Selector::Number),
            "member" => Ok(Selector::Type(ShapeType::Member)),
            _ => ShapeType::from_keyword(word)
                .map(Selector::Type)
                .ok_or_else(|| format!("unknown selector `{word}`")),
        }
    }
}
