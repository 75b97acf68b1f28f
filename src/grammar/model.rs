//! Data-only grammar description.
//!
//! A [`Grammar`] is a table of [`GrammarNode`]s keyed by name plus a [`ParserComponents`]
//! registry. Nodes refer to each other by name through [`GrammarValue::Node`], so recursive and
//! mutually recursive grammars need no cyclic ownership.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::components::ParserComponents;
use super::syntax::{generic_node, ChildProvider, SyntaxNode};
use crate::analyzer::core::BoxedTokenParser;
use crate::analyzer::prelude::*;
use crate::analyzer::sugar::newline_run;
use crate::diagnostic::Diagnostic;
use crate::tokenizer::token::{Token, TokenKind};

pub use crate::analyzer::sugar::DelimiterKind;

/// Separator between list items or map entries.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum GrammarSeparator {
    Comma,
    Semicolon,
    /// One or more newlines, counted as a single separator.
    Newline,
    #[default]
    CommaOrNewline,
    SemicolonOrNewline,
    /// Items follow each other directly; the parser always fails, so nothing is consumed.
    None,
}

impl GrammarSeparator {
    pub fn parser(&self) -> BoxedTokenParser<()> {
        let comma = || boxed(map(expect(TokenKind::Comma), |_: Token| ()));
        let semicolon = || boxed(map(expect(TokenKind::Semicolon), |_: Token| ()));
        match self {
            GrammarSeparator::Comma => comma(),
            GrammarSeparator::Semicolon => semicolon(),
            GrammarSeparator::Newline => newline_run(1),
            GrammarSeparator::CommaOrNewline => boxed(or_else(comma(), newline_run(1))),
            GrammarSeparator::SemicolonOrNewline => boxed(or_else(semicolon(), newline_run(1))),
            GrammarSeparator::None => boxed(fail("no separator")),
        }
    }
}

/// Shape of a field's value.
#[derive(Clone)]
pub enum GrammarValue {
    /// A registered leaf parser.
    Val(String),
    /// Another node, by name.
    Node(String),
    List {
        element: Box<GrammarValue>,
        separator: GrammarSeparator,
    },
    /// `{ key = value ... }` with identifier keys.
    Map {
        value: Box<GrammarValue>,
        separator: GrammarSeparator,
    },
    /// First alternative that matches.
    OneOf(Vec<GrammarValue>),
    Raw(BoxedTokenParser<SyntaxNode>),
    /// Whatever the grammar's child provider accepts.
    Any,
}

impl GrammarValue {
    pub fn val(name: impl Into<String>) -> Self {
        GrammarValue::Val(name.into())
    }

    pub fn node(name: impl Into<String>) -> Self {
        GrammarValue::Node(name.into())
    }

    pub fn list(element: GrammarValue) -> Self {
        Self::list_with(element, GrammarSeparator::CommaOrNewline)
    }

    pub fn list_with(element: GrammarValue, separator: GrammarSeparator) -> Self {
        GrammarValue::List {
            element: Box::new(element),
            separator,
        }
    }

    pub fn map(value: GrammarValue) -> Self {
        Self::map_with(value, GrammarSeparator::SemicolonOrNewline)
    }

    pub fn map_with(value: GrammarValue, separator: GrammarSeparator) -> Self {
        GrammarValue::Map {
            value: Box::new(value),
            separator,
        }
    }

    pub fn one_of(values: Vec<GrammarValue>) -> Self {
        GrammarValue::OneOf(values)
    }

    pub fn raw(parser: BoxedTokenParser<SyntaxNode>) -> Self {
        GrammarValue::Raw(parser)
    }

    /// `inner`, or `default` (an empty list when `None`) without consuming anything.
    pub fn optional(inner: GrammarValue, default: Option<SyntaxNode>) -> Self {
        let fallback = default.unwrap_or(SyntaxNode::List(Vec::new()));
        GrammarValue::OneOf(vec![inner, GrammarValue::Raw(boxed(success(fallback)))])
    }
}

impl fmt::Debug for GrammarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrammarValue::Val(name) => f.debug_tuple("Val").field(name).finish(),
            GrammarValue::Node(name) => f.debug_tuple("Node").field(name).finish(),
            GrammarValue::List { element, separator } => f
                .debug_struct("List")
                .field("element", element)
                .field("separator", separator)
                .finish(),
            GrammarValue::Map { value, separator } => f
                .debug_struct("Map")
                .field("value", value)
                .field("separator", separator)
                .finish(),
            GrammarValue::OneOf(values) => f.debug_tuple("OneOf").field(values).finish(),
            GrammarValue::Raw(_) => f.write_str("Raw(..)"),
            GrammarValue::Any => f.write_str("Any"),
        }
    }
}

/// How many times a field may appear.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Multiplicity {
    One,
    /// Absent fields take the default, if any.
    Optional(Option<SyntaxNode>),
    /// Every occurrence is kept; each occurrence may itself be a separated list.
    Many(GrammarSeparator),
}

#[derive(Debug, Clone)]
pub struct GrammarField {
    pub name: String,
    pub value: GrammarValue,
    pub multiplicity: Multiplicity,
}

impl GrammarField {
    pub fn new(name: impl Into<String>, value: GrammarValue) -> Self {
        Self {
            name: name.into(),
            value,
            multiplicity: Multiplicity::One,
        }
    }

    pub fn optional(name: impl Into<String>, value: GrammarValue) -> Self {
        Self::new(name, value).with_multiplicity(Multiplicity::Optional(None))
    }

    pub fn optional_or(name: impl Into<String>, value: GrammarValue, default: SyntaxNode) -> Self {
        Self::new(name, value).with_multiplicity(Multiplicity::Optional(Some(default)))
    }

    pub fn many(name: impl Into<String>, value: GrammarValue) -> Self {
        Self::new(name, value).with_multiplicity(Multiplicity::Many(GrammarSeparator::default()))
    }

    pub fn with_multiplicity(mut self, multiplicity: Multiplicity) -> Self {
        self.multiplicity = multiplicity;
        self
    }

    pub fn is_required(&self) -> bool {
        self.multiplicity == Multiplicity::One
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum GrammarOrder {
    Ordered,
    #[default]
    Unordered,
}

/// Field name to every value collected for it.
pub type FieldBucket = BTreeMap<String, Vec<SyntaxNode>>;

pub type Validator = Arc<dyn Fn(&FieldBucket) -> Vec<Diagnostic> + Send + Sync>;

#[derive(Clone)]
pub struct GrammarNode {
    pub name: String,
    /// Keyword that must precede the body, e.g. `entry` in `entry { ... }`.
    pub opener: Option<String>,
    pub delimiter: DelimiterKind,
    pub order: GrammarOrder,
    pub fields: Vec<GrammarField>,
    pub validator: Option<Validator>,
    /// Failures after the opener matched are committed.
    pub commit_after_opener: bool,
    /// A body holding a single map field may be empty.
    pub allow_empty_map: bool,
}

impl GrammarNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            opener: None,
            delimiter: DelimiterKind::default(),
            order: GrammarOrder::default(),
            fields: Vec::new(),
            validator: None,
            commit_after_opener: false,
            allow_empty_map: false,
        }
    }

    /// A node introduced by a keyword equal to its own name.
    pub fn keyword(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(name.clone()).with_opener(name)
    }

    pub fn with_opener(mut self, opener: impl Into<String>) -> Self {
        self.opener = Some(opener.into());
        self
    }

    pub fn with_delimiter(mut self, delimiter: DelimiterKind) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_order(mut self, order: GrammarOrder) -> Self {
        self.order = order;
        self
    }

    pub fn with_field(mut self, field: GrammarField) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_fields(mut self, fields: impl IntoIterator<Item = GrammarField>) -> Self {
        self.fields.extend(fields);
        self
    }

    pub fn with_validator(
        mut self,
        validator: impl Fn(&FieldBucket) -> Vec<Diagnostic> + Send + Sync + 'static,
    ) -> Self {
        self.validator = Some(Arc::new(validator));
        self
    }

    pub fn commit_after_opener(mut self) -> Self {
        self.commit_after_opener = true;
        self
    }

    pub fn allow_empty_map(mut self) -> Self {
        self.allow_empty_map = true;
        self
    }

    pub fn field(&self, name: &str) -> Option<&GrammarField> {
        self.fields.iter().find(|field| field.name == name)
    }
}

impl fmt::Debug for GrammarNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GrammarNode")
            .field("name", &self.name)
            .field("opener", &self.opener)
            .field("delimiter", &self.delimiter)
            .field("order", &self.order)
            .field("fields", &self.fields)
            .field("validator", &self.validator.is_some())
            .field("commit_after_opener", &self.commit_after_opener)
            .field("allow_empty_map", &self.allow_empty_map)
            .finish()
    }
}

/// Nodes, the value registry and the provider for [`GrammarValue::Any`].
///
/// Built once, then shared behind an `Arc` by every parser compiled from it.
#[derive(Clone)]
pub struct Grammar {
    nodes: HashMap<String, GrammarNode>,
    components: ParserComponents,
    child: Option<ChildProvider>,
}

impl Grammar {
    /// A node whose name was already taken replaces the earlier one.
    pub fn new(nodes: impl IntoIterator<Item = GrammarNode>, components: ParserComponents) -> Self {
        let mut table = HashMap::new();
        for node in nodes {
            if let Some(previous) = table.insert(node.name.clone(), node) {
                tracing::warn!(target: "grammar", name = %previous.name, "duplicate node definition replaced");
            }
        }
        Self {
            nodes: table,
            components,
            child: None,
        }
    }

    pub fn with_child(
        mut self,
        child: impl Fn() -> BoxedTokenParser<SyntaxNode> + Send + Sync + 'static,
    ) -> Self {
        self.child = Some(Arc::new(child));
        self
    }

    pub fn node(&self, name: &str) -> Option<&GrammarNode> {
        self.nodes.get(name)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &GrammarNode> {
        self.nodes.values()
    }

    pub fn components(&self) -> &ParserComponents {
        &self.components
    }

    /// The child provider's parser, or [`generic_node`] without one.
    pub fn child_parser(&self) -> BoxedTokenParser<SyntaxNode> {
        match &self.child {
            Some(child) => child(),
            None => generic_node(),
        }
    }

    /// Openers and field names: the words a lexer must read as keywords for this grammar.
    pub fn keywords(&self) -> BTreeSet<String> {
        self.nodes
            .values()
            .flat_map(|node| {
                node.opener
                    .iter()
                    .cloned()
                    .chain(node.fields.iter().map(|field| field.name.clone()))
            })
            .collect()
    }
}

impl fmt::Debug for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.nodes.keys().collect();
        names.sort();
        f.debug_struct("Grammar")
            .field("nodes", &names)
            .field("components", &self.components.names())
            .field("child", &self.child.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::core::TokenParser;
    use crate::tokenizer::token_cursor::TokenStream;

    #[test]
    fn test_separators() {
        let stream = TokenStream::from_tokens(vec![
            Token::Newline,
            Token::Newline,
            Token::Semicolon,
            Token::Comma,
        ]);
        let cursor = stream.cursor();
        let (after, ()) = GrammarSeparator::CommaOrNewline.parser().parse(cursor).unwrap();
        assert_eq!(after.index(), 2);
        let (after, ()) = GrammarSeparator::SemicolonOrNewline.parser().parse(after).unwrap();
        assert_eq!(after.index(), 3);
        assert!(GrammarSeparator::Semicolon.parser().parse(after).is_err());
        assert!(GrammarSeparator::None.parser().parse(after).is_err());
        assert_eq!("comma_or_newline".parse::<GrammarSeparator>(), Ok(GrammarSeparator::CommaOrNewline));
    }

    #[test]
    fn test_optional_value_falls_back() {
        let value = GrammarValue::optional(GrammarValue::val("number"), None);
        match value {
            GrammarValue::OneOf(alternatives) => assert_eq!(alternatives.len(), 2),
            other => panic!("unexpected shape {:?}", other),
        }
    }

    #[test]
    fn test_keywords_cover_openers_and_fields() {
        let grammar = Grammar::new(
            [
                GrammarNode::keyword("entry")
                    .with_field(GrammarField::optional("date", GrammarValue::val("string")))
                    .with_field(GrammarField::many("line", GrammarValue::node("line"))),
                GrammarNode::keyword("line")
                    .with_field(GrammarField::new("account", GrammarValue::val("ident"))),
            ],
            ParserComponents::basic(),
        );
        let keywords: Vec<String> = grammar.keywords().into_iter().collect();
        assert_eq!(keywords, vec!["account", "date", "entry", "line"]);
        assert!(grammar.node("entry").unwrap().field("line").is_some());
        assert!(!grammar.node("entry").unwrap().field("date").unwrap().is_required());
    }
}
