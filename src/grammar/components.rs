//! Named leaf parsers used by `GrammarValue::Val`.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use super::syntax::SyntaxNode;
use crate::analyzer::core::{BoxedTokenParser, TokenParser};
use crate::analyzer::prelude::*;
use crate::analyzer::text;
use crate::diagnostic::Diagnostic;
use crate::tokenizer::token::Token;

pub type Factory<T> = Arc<dyn Fn() -> BoxedTokenParser<T> + Send + Sync>;

/// A registry entry. The tag decides how the parsed value is stored in the result tree.
#[derive(Clone)]
pub enum ValueParser {
    /// Stored as [`SyntaxNode::Atom`].
    Atom(Factory<String>),
    /// Stored as [`SyntaxNode::String`].
    Text(Factory<String>),
    Number(Factory<Decimal>),
    /// Stored as [`SyntaxNode::Number`].
    Integer(Factory<i64>),
    /// Stored as the atom `true` or `false`.
    Boolean(Factory<bool>),
    /// Already a result tree; passed through.
    Node(Factory<SyntaxNode>),
}

impl ValueParser {
    pub fn kind(&self) -> &'static str {
        match self {
            ValueParser::Atom(_) => "atom",
            ValueParser::Text(_) => "text",
            ValueParser::Number(_) => "number",
            ValueParser::Integer(_) => "integer",
            ValueParser::Boolean(_) => "boolean",
            ValueParser::Node(_) => "node",
        }
    }

    /// A fresh parser whose output is folded into a [`SyntaxNode`].
    pub fn build(&self) -> BoxedTokenParser<SyntaxNode> {
        match self {
            ValueParser::Atom(factory) => boxed(map(factory(), SyntaxNode::Atom)),
            ValueParser::Text(factory) => boxed(map(factory(), SyntaxNode::String)),
            ValueParser::Number(factory) => boxed(map(factory(), SyntaxNode::Number)),
            ValueParser::Integer(factory) => {
                boxed(map(factory(), |value: i64| SyntaxNode::Number(value.into())))
            }
            ValueParser::Boolean(factory) => boxed(map(factory(), |value: bool| {
                SyntaxNode::Atom(value.to_string())
            })),
            ValueParser::Node(factory) => factory(),
        }
    }
}

impl fmt::Debug for ValueParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ValueParser::{}", self.kind())
    }
}

fn factory<T, F>(make: F) -> Factory<T>
where
    F: Fn() -> BoxedTokenParser<T> + Send + Sync + 'static,
{
    Arc::new(make)
}

#[derive(Debug, Clone, Default)]
pub struct ParserComponents {
    entries: HashMap<String, ValueParser>,
}

impl ParserComponents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `parser` under `name`, replacing any earlier entry.
    pub fn register(&mut self, name: impl Into<String>, parser: ValueParser) -> &mut Self {
        let name = name.into();
        if self.entries.insert(name.clone(), parser).is_some() {
            tracing::debug!(target: "grammar", %name, "value parser replaced");
        }
        self
    }

    pub fn register_atom<F>(&mut self, name: &str, make: F) -> &mut Self
    where
        F: Fn() -> BoxedTokenParser<String> + Send + Sync + 'static,
    {
        self.register(name, ValueParser::Atom(factory(make)))
    }

    pub fn register_text<F>(&mut self, name: &str, make: F) -> &mut Self
    where
        F: Fn() -> BoxedTokenParser<String> + Send + Sync + 'static,
    {
        self.register(name, ValueParser::Text(factory(make)))
    }

    pub fn register_number<F>(&mut self, name: &str, make: F) -> &mut Self
    where
        F: Fn() -> BoxedTokenParser<Decimal> + Send + Sync + 'static,
    {
        self.register(name, ValueParser::Number(factory(make)))
    }

    pub fn register_integer<F>(&mut self, name: &str, make: F) -> &mut Self
    where
        F: Fn() -> BoxedTokenParser<i64> + Send + Sync + 'static,
    {
        self.register(name, ValueParser::Integer(factory(make)))
    }

    pub fn register_boolean<F>(&mut self, name: &str, make: F) -> &mut Self
    where
        F: Fn() -> BoxedTokenParser<bool> + Send + Sync + 'static,
    {
        self.register(name, ValueParser::Boolean(factory(make)))
    }

    pub fn register_node<F>(&mut self, name: &str, make: F) -> &mut Self
    where
        F: Fn() -> BoxedTokenParser<SyntaxNode> + Send + Sync + 'static,
    {
        self.register(name, ValueParser::Node(factory(make)))
    }

    pub fn get(&self, name: &str) -> Option<&ValueParser> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Builds the named parser with its output folded into a [`SyntaxNode`].
    pub fn make(&self, name: &str) -> Option<BoxedTokenParser<SyntaxNode>> {
        self.get(name).map(ValueParser::build)
    }

    /// Domain-agnostic entries: identifiers, strings, numbers, integers, booleans and loose
    /// decimals.
    pub fn basic() -> Self {
        let mut components = Self::new();
        for name in ["ident", "identifier"] {
            components.register_atom(name, || boxed(word()));
        }
        components.register_text("string", || boxed(string()));
        for name in ["number", "decimal"] {
            components.register_number(name, || boxed(number()));
        }
        for name in ["int", "integer"] {
            components.register_integer(name, integer_value);
        }
        for name in ["bool", "boolean"] {
            components.register_boolean(name, boolean_value);
        }
        components.register_number("decimal_loose", loose_decimal_value);
        components
    }
}

/// A number token without a fractional part that fits in `i64`.
pub fn integer_value() -> BoxedTokenParser<i64> {
    boxed(token_fn(|cursor| {
        let (next, value) = number().parse(cursor)?;
        match value.fract().is_zero().then(|| value.to_i64()).flatten() {
            Some(whole) => Ok((next, whole)),
            None => Err(Diagnostic::expected("integer number", cursor.index())),
        }
    }))
}

/// The keyword `true`/`false`, or an identifier spelling either in any case.
pub fn boolean_value() -> BoxedTokenParser<bool> {
    const WANT: &str = "boolean literal (true|false)";
    boxed(token_fn(|cursor| {
        let parsed = match cursor.peek() {
            Token::Keyword(word) => match word.as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            Token::Identifier(word) => match word.to_lowercase().as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => return Err(Diagnostic::expected(WANT, cursor.index())),
            },
            _ => None,
        };
        match parsed {
            Some(value) => Ok((cursor.advance(), value)),
            None => Err(Diagnostic::unexpected(cursor.peek(), WANT, cursor.index())),
        }
    }))
}

/// A number token, or string content such as `"12,50"` read as a decimal.
pub fn loose_decimal_value() -> BoxedTokenParser<Decimal> {
    let quoted = token_fn(|cursor| {
        let (next, content) = string().parse(cursor)?;
        match parse_loose_decimal(&content) {
            Some(value) => Ok((next, value)),
            None => Err(Diagnostic::expected("decimal-like string", cursor.index())),
        }
    });
    boxed(or_else(number(), quoted))
}

/// `[+-]digits[(.|,)digits]`, surrounding whitespace allowed.
fn parse_loose_decimal(content: &str) -> Option<Decimal> {
    let digits = || text::many(text::satisfy(|c| c.is_ascii_digit(), "digit"), 1);
    let sign = text::optional(text::or_else(text::literal("-"), text::literal("+")));
    let point = text::or_else(text::literal("."), text::literal(","));
    let fraction = text::optional(text::then(point, digits()));
    let shape = text::between(
        text::whitespace(),
        text::then(text::then(sign, digits()), fraction),
        text::whitespace(),
    );

    let ((sign, whole), fraction) = text::parse_all(&shape, content).ok()?;
    let mut normalized = sign.unwrap_or_default();
    normalized.extend(whole);
    if let Some((_, fraction)) = fraction {
        normalized.push('.');
        normalized.extend(fraction);
    }
    Decimal::from_str_exact(&normalized).ok()
}
