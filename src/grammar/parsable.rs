//! Typed models parsed through a grammar.

use std::sync::Arc;

use super::compiler::GrammarCompiler;
use super::components::ParserComponents;
use super::model::{Grammar, GrammarNode};
use super::syntax::SyntaxNode;
use crate::analyzer::core::{BoxedTokenParser, TokenParser};
use crate::analyzer::prelude::*;
use crate::analyzer::sugar::newline_run;
use crate::diagnostic::Diagnostic;
use crate::error::{DecodeError, Error};
use crate::source::SourceRange;
use crate::tokenizer::config::{LexerOptions, LexingSets};
use crate::tokenizer::lexer::Lexer;

/// A model described by a root [`GrammarNode`] and decoded from the folded result tree.
///
/// ```text
/// impl DynamicallyParsable for Transfer {
///     fn grammar_node() -> GrammarNode { GrammarNode::keyword("transfer").with_field(...) }
///     fn parser_components() -> ParserComponents { ParserComponents::basic() }
///     fn from_syntax(node: &SyntaxNode) -> Result<Self, DecodeError> { ... }
/// }
///
/// let transfer = Transfer::parse_str("transfer { amount = 10 }")?;
/// ```
pub trait DynamicallyParsable: Sized + Send + Sync + 'static {
    fn grammar_node() -> GrammarNode;

    fn parser_components() -> ParserComponents;

    fn from_syntax(node: &SyntaxNode) -> Result<Self, DecodeError>;

    /// Nodes the root refers to through `GrammarValue::Node`.
    fn supporting_nodes() -> Vec<GrammarNode> {
        Vec::new()
    }

    /// Every opener and field name of the grammar is lexed as a keyword.
    fn lexing_sets() -> LexingSets {
        LexingSets::new(Self::grammar().keywords())
    }

    fn lexer_options() -> LexerOptions {
        LexerOptions::default()
    }

    /// Supporting nodes plus the root. The root is added last, so it wins a name clash.
    fn grammar() -> Arc<Grammar> {
        let mut nodes = Self::supporting_nodes();
        nodes.push(Self::grammar_node());
        Arc::new(Grammar::new(nodes, Self::parser_components()))
    }

    /// Parses the root node and decodes it. Decode failures become diagnostics spanning the
    /// node.
    fn parser() -> BoxedTokenParser<Self> {
        let grammar = Self::grammar();
        let folded = GrammarCompiler::compile_folded(&grammar, &Self::grammar_node().name);
        boxed(token_fn(move |cursor| {
            let (next, node) = folded.parse(cursor)?;
            match Self::from_syntax(&node) {
                Ok(model) => Ok((next, model)),
                Err(error) => Err(Diagnostic::error(format!("model decode failed: {}", error))
                    .with_range(SourceRange::new(cursor.index(), next.index()))),
            }
        }))
    }

    /// Lexes `source` and parses one root node, allowing blank lines around it.
    fn parse_str(source: &str) -> crate::Result<Self> {
        let root = Self::grammar_node().name;
        let stream = Lexer::new(source, Self::lexing_sets())
            .with_options(Self::lexer_options())
            .collect_tokens_with_line_map()?
            .without_trivia(true);
        tracing::debug!(target: "grammar", %root, tokens = stream.len(), "parsing model");

        let grammar = Self::grammar();
        let (start, _) = newline_run(0).parse(stream.cursor())?;
        let (rest, node) = GrammarCompiler::compile_folded(&grammar, &root).parse(start)?;
        let (rest, _) = newline_run(0).parse(rest)?;
        if !rest.is_eof() {
            return Err(Error::TrailingInput {
                index: rest.index(),
                found: rest.peek().to_string(),
            });
        }
        Ok(Self::from_syntax(&node)?)
    }
}
