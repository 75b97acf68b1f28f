//! Turns a [`Grammar`] into a token parser.
//!
//! Compilation is lazy: [`GrammarCompiler::compile`] returns a reference to the root node that
//! builds the node's parser the first time it runs. Each [`GrammarValue::Node`] inside it is
//! another such reference, so self-referencing nodes compile in finite time and unknown node
//! names surface as parse failures.

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use super::model::{
    FieldBucket, Grammar, GrammarField, GrammarNode, GrammarOrder, GrammarValue, Multiplicity,
};
use super::syntax::{collect_pairs, SyntaxNode, TYPE_KEY};
use crate::analyzer::core::{BoxedTokenParser, TokenParseResult, TokenParser};
use crate::analyzer::prelude::*;
use crate::analyzer::sugar::{braces, delimited_by, newline_run, separated_list};
use crate::diagnostic::Diagnostic;
use crate::source::SourceRange;
use crate::tokenizer::token::TokenKind;
use crate::tokenizer::token_cursor::TokenCursor;

/// Output of a compiled node before folding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrammarResult {
    Object { name: String, fields: FieldBucket },
    List(Vec<SyntaxNode>),
    Map(BTreeMap<String, SyntaxNode>),
    Atom(SyntaxNode),
}

impl GrammarResult {
    /// Objects become maps with a `_type` atom; a field with one value holds it directly, a
    /// field with several holds a list.
    pub fn fold(self) -> SyntaxNode {
        match self {
            GrammarResult::Atom(node) => node,
            GrammarResult::List(items) => SyntaxNode::List(items),
            GrammarResult::Map(entries) => SyntaxNode::Map(entries),
            GrammarResult::Object { name, fields } => {
                let mut entries = BTreeMap::new();
                entries.insert(TYPE_KEY.to_string(), SyntaxNode::Atom(name));
                for (key, mut values) in fields {
                    let value = if values.len() == 1 {
                        values.remove(0)
                    } else {
                        SyntaxNode::List(values)
                    };
                    entries.insert(key, value);
                }
                SyntaxNode::Map(entries)
            }
        }
    }
}

pub struct GrammarCompiler;

impl GrammarCompiler {
    #[tracing::instrument(level = "debug", skip(grammar))]
    pub fn compile(grammar: &Arc<Grammar>, name: &str) -> BoxedTokenParser<GrammarResult> {
        boxed(NodeRef::new(grammar.clone(), name))
    }

    /// [`Self::compile`] followed by [`GrammarResult::fold`].
    pub fn compile_folded(grammar: &Arc<Grammar>, name: &str) -> BoxedTokenParser<SyntaxNode> {
        boxed(map(Self::compile(grammar, name), GrammarResult::fold))
    }
}

type FieldParser = BoxedTokenParser<(String, Vec<SyntaxNode>)>;
type BodyParser = BoxedTokenParser<Vec<(String, Vec<SyntaxNode>)>>;

/// Named node, resolved and built on first use.
struct NodeRef {
    grammar: Arc<Grammar>,
    name: String,
    parser: OnceLock<Option<BoxedTokenParser<GrammarResult>>>,
}

impl NodeRef {
    fn new(grammar: Arc<Grammar>, name: &str) -> Self {
        Self {
            grammar,
            name: name.to_string(),
            parser: OnceLock::new(),
        }
    }

    fn resolve(&self) -> Option<&BoxedTokenParser<GrammarResult>> {
        self.parser
            .get_or_init(|| {
                tracing::debug!(target: "grammar", node = %self.name, "resolving node");
                self.grammar
                    .node(&self.name)
                    .map(|node| build_node(&self.grammar, node))
            })
            .as_ref()
    }
}

impl TokenParser<GrammarResult> for NodeRef {
    fn parse<'a>(&self, cursor: TokenCursor<'a>) -> TokenParseResult<'a, GrammarResult> {
        match self.resolve() {
            Some(parser) => parser.parse(cursor),
            None => Err(Diagnostic::error(format!("unknown node: {}", self.name))
                .with_range(SourceRange::new(cursor.index(), cursor.index() + 1))),
        }
    }
}

fn unit<P, O>(parser: P) -> BoxedTokenParser<()>
where
    P: TokenParser<O> + Send + Sync + 'static,
    O: 'static,
{
    boxed(map(parser, |_: O| ()))
}

/// `;` or newline runs between fields, any number of them.
fn field_gap() -> BoxedTokenParser<()> {
    unit(many(
        or_else(unit(expect(TokenKind::Semicolon)), newline_run(1)),
        0,
    ))
}

fn compile_value(grammar: &Arc<Grammar>, value: &GrammarValue) -> BoxedTokenParser<SyntaxNode> {
    match value {
        GrammarValue::Val(name) => match grammar.components().make(name) {
            Some(parser) => parser,
            None => boxed(fail(&format!("no value parser named {}", name))),
        },
        GrammarValue::Node(name) => boxed(map(
            NodeRef::new(grammar.clone(), name),
            GrammarResult::fold,
        )),
        GrammarValue::List { element, separator } => boxed(map(
            separated_list(compile_value(grammar, element), separator.parser()),
            SyntaxNode::List,
        )),
        GrammarValue::Map { value, separator } => {
            let entries = map_entries(grammar, value, separator.parser(), 0);
            braces(keep(newline_run(0), entries))
        }
        GrammarValue::OneOf(values) => boxed(choice(
            values
                .iter()
                .map(|value| compile_value(grammar, value))
                .collect(),
        )),
        GrammarValue::Raw(parser) => parser.clone(),
        GrammarValue::Any => grammar.child_parser(),
    }
}

/// `(key '=' value sep*)*` with at least `min` pairs, as a map without repeated keys.
/// A key may be spelled like a keyword of the grammar.
fn map_entries(
    grammar: &Arc<Grammar>,
    value: &GrammarValue,
    separator: BoxedTokenParser<()>,
    min: usize,
) -> BoxedTokenParser<SyntaxNode> {
    let pair = then(
        skip(word(), expect(TokenKind::Equals)),
        compile_value(grammar, value),
    );
    let pairs = many(skip(pair, many(separator, 0)), min);
    boxed(token_fn(move |cursor| {
        let (next, pairs) = pairs.parse(cursor)?;
        let entries = collect_pairs(pairs)
            .map_err(|d| d.with_range(SourceRange::new(cursor.index(), next.index())))?;
        Ok((next, SyntaxNode::Map(entries)))
    }))
}

fn opens_itself(grammar: &Grammar, field: &GrammarField) -> bool {
    match &field.value {
        GrammarValue::Node(name) => grammar
            .node(name)
            .and_then(|node| node.opener.as_deref())
            .is_some_and(|opener| opener == field.name),
        _ => false,
    }
}

/// One occurrence of `field`: its keyword, an optional `=`, then the value.
fn field_parser(grammar: &Arc<Grammar>, field: &GrammarField) -> FieldParser {
    let value = compile_value(grammar, &field.value);
    let values: BoxedTokenParser<Vec<SyntaxNode>> = match &field.multiplicity {
        Multiplicity::Many(separator) => separated_list(value, separator.parser()),
        Multiplicity::One | Multiplicity::Optional(_) => boxed(map(value, |v| vec![v])),
    };
    let body = if opens_itself(grammar, field) {
        values
    } else {
        boxed(keep(
            then(keyword(&field.name), optional(expect(TokenKind::Equals))),
            values,
        ))
    };
    let name = field.name.clone();
    boxed(map(body, move |values| (name.clone(), values)))
}

fn unordered_body(fields: Vec<FieldParser>, min: usize) -> BodyParser {
    let field = keep(newline_run(0), skip(choice(fields), field_gap()));
    boxed(skip(many(require_progress(field), min), newline_run(0)))
}

fn ordered_body(node: &GrammarNode, fields: Vec<FieldParser>) -> BodyParser {
    let parts: Vec<BodyParser> = node
        .fields
        .iter()
        .zip(fields)
        .map(|(field, parser)| {
            let occurrence = keep(newline_run(0), skip(parser, field_gap()));
            match field.multiplicity {
                Multiplicity::One => boxed(map(occurrence, |found| vec![found])),
                _ => boxed(map(optional(occurrence), |found| {
                    found.into_iter().collect::<Vec<_>>()
                })),
            }
        })
        .collect();
    boxed(skip(
        token_fn(move |cursor| {
            let mut collected = Vec::new();
            let mut current = cursor;
            for part in &parts {
                let (next, found) = part.parse(current)?;
                collected.extend(found);
                current = next;
            }
            Ok((current, collected))
        }),
        newline_run(0),
    ))
}

/// A lone map field also accepts its pairs directly in the node body.
fn single_map_body(
    grammar: &Arc<Grammar>,
    node: &GrammarNode,
    field: &GrammarField,
    explicit: FieldParser,
) -> Option<BodyParser> {
    let GrammarValue::Map { value, separator } = &field.value else {
        return None;
    };
    let explicit = unordered_body(vec![explicit], 1);
    let name = field.name.clone();
    let anonymous = boxed(map(
        keep(
            newline_run(0),
            skip(map_entries(grammar, value, separator.parser(), 1), newline_run(0)),
        ),
        move |entries| vec![(name.clone(), vec![entries])],
    ));
    let mut forms = vec![explicit, anonymous];
    if node.allow_empty_map {
        forms.push(boxed(keep(newline_run(0), success(Vec::new()))));
    }
    Some(boxed(choice(forms)))
}

fn collect_fields(node: &GrammarNode, found: Vec<(String, Vec<SyntaxNode>)>) -> FieldBucket {
    let mut bucket = FieldBucket::new();
    for (name, values) in found {
        if !values.is_empty() {
            bucket.entry(name).or_default().extend(values);
        }
    }
    for field in &node.fields {
        if let Multiplicity::Optional(Some(default)) = &field.multiplicity {
            bucket
                .entry(field.name.clone())
                .or_insert_with(|| vec![default.clone()]);
        }
    }
    bucket
}

fn build_node(grammar: &Arc<Grammar>, node: &GrammarNode) -> BoxedTokenParser<GrammarResult> {
    let fields: Vec<FieldParser> = node
        .fields
        .iter()
        .map(|field| field_parser(grammar, field))
        .collect();

    let body = match (node.fields.as_slice(), node.order) {
        ([field], _) if matches!(field.value, GrammarValue::Map { .. }) => {
            let explicit = fields.into_iter().next();
            explicit
                .and_then(|explicit| single_map_body(grammar, node, field, explicit))
                .unwrap_or_else(|| boxed(success(Vec::new())))
        }
        (_, GrammarOrder::Unordered) => unordered_body(fields, 0),
        (_, GrammarOrder::Ordered) => ordered_body(node, fields),
    };

    let delimited = delimited_by(node.delimiter, body);
    let committed = node.opener.is_some() && node.commit_after_opener;
    let after_opener = if committed {
        boxed(cut(delimited, ""))
    } else {
        delimited
    };
    let opened: BodyParser = match &node.opener {
        Some(opener) => boxed(keep(keyword(opener), after_opener)),
        None => after_opener,
    };

    let node = node.clone();
    boxed(token_fn(move |cursor| {
        let (next, found) = opened.parse(cursor)?;
        let bucket = collect_fields(&node, found);
        if let Some(validator) = &node.validator {
            if let Some(diagnostic) = validator(&bucket).into_iter().next() {
                let range = SourceRange::new(cursor.index(), next.index());
                let diagnostic = diagnostic.with_range_if_absent(range);
                return Err(if committed {
                    diagnostic.commit()
                } else {
                    diagnostic
                });
            }
        }
        Ok((
            next,
            GrammarResult::Object {
                name: node.name.clone(),
                fields: bucket,
            },
        ))
    }))
}
