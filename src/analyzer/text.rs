//! Character-level parsing.
//!
//! Parsers here read a [`Cursor`] directly instead of lexer output. They are used for small
//! sub-languages inside token text, such as the loose decimal form accepted by the
//! `decimal_loose` value parser. Diagnostic ranges hold character offsets.

use super::combinators::*;
use super::core::{ParseResult, Parser};
use crate::cursor::Cursor;
use crate::diagnostic::Diagnostic;
use crate::source::SourceRange;

// CharSatisfy: one character accepted by `predicate`
#[derive(Clone)]
pub struct CharSatisfy<F> {
    predicate: F,
    want: String,
}

impl<F: Fn(char) -> bool> CharSatisfy<F> {
    pub fn new(predicate: F, want: impl Into<String>) -> Self {
        Self {
            predicate,
            want: want.into(),
        }
    }
}

impl<F: Fn(char) -> bool> Parser<char> for CharSatisfy<F> {
    fn parse<'a>(&self, cursor: Cursor<'a>) -> ParseResult<'a, char> {
        match cursor.peek() {
            Some(c) if (self.predicate)(c) => Ok((cursor.advance(), c)),
            _ => Err(Diagnostic::error(format!("expected {}", self.want))
                .with_range(SourceRange::at(cursor.offset()))),
        }
    }
}

// Literal: an exact string
#[derive(Debug, Clone)]
pub struct Literal {
    text: String,
}

impl Literal {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl Parser<String> for Literal {
    fn parse<'a>(&self, cursor: Cursor<'a>) -> ParseResult<'a, String> {
        let mut current = cursor;
        for want in self.text.chars() {
            if current.peek() != Some(want) {
                return Err(Diagnostic::error(format!("expected {:?}", self.text))
                    .with_range(current.range_from(&cursor)));
            }
            current = current.advance();
        }
        Ok((current, self.text.clone()))
    }
}

// Whitespace: any run of whitespace, possibly empty
#[derive(Debug, Clone, Copy, Default)]
pub struct Whitespace;

impl Parser<()> for Whitespace {
    fn parse<'a>(&self, cursor: Cursor<'a>) -> ParseResult<'a, ()> {
        Ok((cursor.skip_whitespace(), ()))
    }
}

// Word: a letter followed by letters, digits or '_'
#[derive(Debug, Clone, Copy, Default)]
pub struct Word;

impl Parser<String> for Word {
    fn parse<'a>(&self, cursor: Cursor<'a>) -> ParseResult<'a, String> {
        let (next, _) =
            CharSatisfy::new(char::is_alphabetic, "identifier head").parse(cursor)?;
        let end = next.advance_while(|c| c.is_alphanumeric() || c == '_');
        Ok((end, end.slice_from(&cursor).to_string()))
    }
}

pub fn satisfy<F: Fn(char) -> bool>(predicate: F, want: &str) -> CharSatisfy<F> {
    CharSatisfy::new(predicate, want)
}

pub fn literal(text: &str) -> Literal {
    Literal::new(text)
}

pub fn whitespace() -> Whitespace {
    Whitespace
}

pub fn identifier() -> Word {
    Word
}

pub fn map<P, F, A, B>(parser: P, f: F) -> Map<P, F, A>
where
    P: Parser<A>,
    F: Fn(A) -> B,
{
    Map::new(parser, f)
}

pub fn flat_map<P, F, A, Q, B>(parser: P, f: F) -> FlatMap<P, F, A>
where
    P: Parser<A>,
    F: Fn(A) -> Q,
    Q: Parser<B>,
{
    FlatMap::new(parser, f)
}

pub fn or_else<P1, P2, O>(first: P1, second: P2) -> OrElse<P1, P2>
where
    P1: Parser<O>,
    P2: Parser<O>,
{
    OrElse::new(first, second)
}

pub fn optional<P, O>(parser: P) -> Optional<P>
where
    P: Parser<O>,
{
    Optional::new(parser)
}

pub fn many<P, O>(parser: P, min: usize) -> Many<P>
where
    P: Parser<O>,
{
    Many::new(parser, min)
}

pub fn then<P1, P2, A, B>(first: P1, second: P2) -> Then<P1, P2>
where
    P1: Parser<A>,
    P2: Parser<B>,
{
    Then::new(first, second)
}

pub fn between<L, P, R, X, Y, O>(left: L, inner: P, right: R) -> Between<L, P, R, X, Y>
where
    L: Parser<X>,
    P: Parser<O>,
    R: Parser<Y>,
{
    Between::new(left, inner, right)
}

pub fn with_backtracking<P, O>(parser: P) -> WithBacktracking<P>
where
    P: Parser<O>,
{
    WithBacktracking::new(parser)
}

pub fn char_fn<F, O>(f: F) -> FromFn<F>
where
    F: for<'a> Fn(Cursor<'a>) -> ParseResult<'a, O>,
{
    FromFn::new(f)
}

/// Runs `parser` over all of `input`; leftover characters are an error.
pub fn parse_all<P, O>(parser: &P, input: &str) -> Result<O, Diagnostic>
where
    P: Parser<O> + ?Sized,
{
    let (rest, value) = parser.parse(Cursor::new(input))?;
    if rest.is_at_end() {
        Ok(value)
    } else {
        Err(Diagnostic::error(format!("unexpected {:?}", rest.rest()))
            .with_range(SourceRange::new(rest.offset(), input.chars().count())))
    }
}
