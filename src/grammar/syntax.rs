//! Generic result tree.

use std::collections::BTreeMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::analyzer::core::{BoxedTokenParser, TokenParser};
use crate::analyzer::prelude::*;
use crate::diagnostic::Diagnostic;
use crate::source::SourceRange;
use crate::tokenizer::token::TokenKind;

/// Key of the atom naming the node an object-shaped map was folded from.
pub const TYPE_KEY: &str = "_type";

/// Produces the parser used for nested values of unknown shape.
pub type ChildProvider = Arc<dyn Fn() -> BoxedTokenParser<SyntaxNode> + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyntaxNode {
    Atom(String),
    Number(Decimal),
    String(String),
    Map(BTreeMap<String, SyntaxNode>),
    List(Vec<SyntaxNode>),
    /// Tokens that no rule matched, as a token index range.
    Unrecognized(SourceRange),
}

impl SyntaxNode {
    pub fn atom(name: impl Into<String>) -> Self {
        SyntaxNode::Atom(name.into())
    }

    pub fn string(content: impl Into<String>) -> Self {
        SyntaxNode::String(content.into())
    }

    pub fn as_atom(&self) -> Option<&str> {
        match self {
            SyntaxNode::Atom(name) => Some(name),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SyntaxNode::String(content) => Some(content),
            _ => None,
        }
    }

    /// Atom or string content.
    pub fn as_text(&self) -> Option<&str> {
        self.as_atom().or_else(|| self.as_str())
    }

    pub fn as_number(&self) -> Option<Decimal> {
        match self {
            SyntaxNode::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.as_atom()? {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, SyntaxNode>> {
        match self {
            SyntaxNode::Map(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[SyntaxNode]> {
        match self {
            SyntaxNode::List(items) => Some(items),
            _ => None,
        }
    }

    /// Map entry by key; `None` for other shapes.
    pub fn get(&self, key: &str) -> Option<&SyntaxNode> {
        self.as_map()?.get(key)
    }

    /// Name of the node this map was folded from.
    pub fn type_name(&self) -> Option<&str> {
        self.get(TYPE_KEY)?.as_atom()
    }

    /// The tree as JSON, e.g. for snapshotting parse results.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    /// A list's elements, or the node itself as a single item.
    ///
    /// Folding collapses a repeated field with one occurrence to a scalar, so decoders read
    /// repeated fields through this.
    pub fn items(&self) -> Vec<&SyntaxNode> {
        match self {
            SyntaxNode::List(items) => items.iter().collect(),
            other => vec![other],
        }
    }
}

/// Builds a map from parsed pairs. A repeated key is a committed failure.
pub(crate) fn collect_pairs(
    pairs: Vec<(String, SyntaxNode)>,
) -> Result<BTreeMap<String, SyntaxNode>, Diagnostic> {
    let mut map = BTreeMap::new();
    for (key, value) in pairs {
        if map.contains_key(&key) {
            return Err(Diagnostic::error(format!("duplicate key '{}'", key)).commit());
        }
        map.insert(key, value);
    }
    Ok(map)
}

/// Open-ended value parser: an atom, a `{ k = v }` map, a `[a, b]` list, or an
/// [`SyntaxNode::Unrecognized`] span running to the next newline, `}` or `]`.
///
/// Map values and list items are parsed by `child`, which is invoked lazily so it may return
/// a parser built from this function again.
pub fn recursive_node<F>(child: F) -> BoxedTokenParser<SyntaxNode>
where
    F: Fn() -> BoxedTokenParser<SyntaxNode> + Send + Sync + 'static,
{
    let child = Arc::new(child);

    let atom = choice(vec![
        boxed(map(string(), SyntaxNode::String)),
        boxed(map(number(), SyntaxNode::Number)),
        boxed(map(word(), SyntaxNode::Atom)),
    ]);

    let value = {
        let child = child.clone();
        lazy(move || child())
    };
    let pair = then(skip(word(), expect(TokenKind::Equals)), value);
    let pairs = many(skip(pair, optional(expect(TokenKind::Semicolon))), 0);
    let map_body = token_fn(move |cursor| {
        let (next, pairs) = pairs.parse(cursor)?;
        let entries = collect_pairs(pairs)
            .map_err(|d| d.with_range(SourceRange::new(cursor.index(), next.index())))?;
        Ok((next, SyntaxNode::Map(entries)))
    });

    let item = lazy(move || child());
    let list_body = map(
        many(skip(item, optional(expect(TokenKind::Comma))), 0),
        SyntaxNode::List,
    );

    let unrecognized = token_fn(|cursor| {
        let mut current = cursor;
        while !current.is_eof()
            && !matches!(
                current.peek().kind(),
                TokenKind::Newline | TokenKind::RightBrace | TokenKind::RightBracket
            )
        {
            current = current.advance();
        }
        let range = SourceRange::new(cursor.index(), current.index());
        Ok((current, SyntaxNode::Unrecognized(range)))
    });

    boxed(choice(vec![
        boxed(atom),
        crate::analyzer::sugar::braces(map_body),
        crate::analyzer::sugar::brackets(list_body),
        boxed(unrecognized),
    ]))
}

/// [`recursive_node`] recursing into itself.
pub fn generic_node() -> BoxedTokenParser<SyntaxNode> {
    recursive_node(generic_node)
}
