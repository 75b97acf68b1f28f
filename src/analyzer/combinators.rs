//! Combinator structs.
//!
//! Each combinator is a plain struct with a `new` constructor. Where the behavior does not depend
//! on what is being read, one struct implements both [`Parser`] (characters) and [`TokenParser`]
//! (tokens). The free functions in [`super::prelude`] and [`super::text`] are the usual way to
//! build them.

use std::marker::PhantomData;

use super::core::{ParseResult, Parser, TokenParseResult, TokenParser};
use crate::cursor::Cursor;
use crate::diagnostic::Diagnostic;
use crate::source::SourceRange;
use crate::tokenizer::token_cursor::TokenCursor;

fn token_range(cursor: &TokenCursor<'_>) -> SourceRange {
    SourceRange::new(cursor.index(), cursor.index() + 1)
}

fn char_range(cursor: &Cursor<'_>) -> SourceRange {
    SourceRange::new(cursor.offset(), cursor.offset() + 1)
}

// Success: always succeeds with `value` without consuming input
#[derive(Clone)]
pub struct Success<O> {
    value: O,
}

impl<O> Success<O> {
    pub fn new(value: O) -> Self {
        Self { value }
    }
}

impl<O: Clone> Parser<O> for Success<O> {
    fn parse<'a>(&self, cursor: Cursor<'a>) -> ParseResult<'a, O> {
        Ok((cursor, self.value.clone()))
    }
}

impl<O: Clone> TokenParser<O> for Success<O> {
    fn parse<'a>(&self, cursor: TokenCursor<'a>) -> TokenParseResult<'a, O> {
        Ok((cursor, self.value.clone()))
    }
}

// Fail: always fails with `message`
pub struct Fail<O> {
    message: String,
    _phantom: PhantomData<fn() -> O>,
}

impl<O> Fail<O> {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            _phantom: PhantomData,
        }
    }
}

impl<O> Parser<O> for Fail<O> {
    fn parse<'a>(&self, cursor: Cursor<'a>) -> ParseResult<'a, O> {
        Err(Diagnostic::error(&self.message).with_range(char_range(&cursor)))
    }
}

impl<O> TokenParser<O> for Fail<O> {
    fn parse<'a>(&self, cursor: TokenCursor<'a>) -> TokenParseResult<'a, O> {
        Err(Diagnostic::error(&self.message).with_range(token_range(&cursor)))
    }
}

/// Map: transforms the success value, failures pass through unchanged.
pub struct Map<P, F, A> {
    parser: P,
    f: F,
    _phantom: PhantomData<fn(A)>,
}

impl<P, F, A> Map<P, F, A> {
    pub fn new(parser: P, f: F) -> Self {
        Self {
            parser,
            f,
            _phantom: PhantomData,
        }
    }
}

impl<P, F, A, B> Parser<B> for Map<P, F, A>
where
    P: Parser<A>,
    F: Fn(A) -> B,
{
    fn parse<'a>(&self, cursor: Cursor<'a>) -> ParseResult<'a, B> {
        let (next, value) = self.parser.parse(cursor)?;
        Ok((next, (self.f)(value)))
    }
}

impl<P, F, A, B> TokenParser<B> for Map<P, F, A>
where
    P: TokenParser<A>,
    F: Fn(A) -> B,
{
    fn parse<'a>(&self, cursor: TokenCursor<'a>) -> TokenParseResult<'a, B> {
        let (next, value) = self.parser.parse(cursor)?;
        Ok((next, (self.f)(value)))
    }
}

/// FlatMap: the continuation parser is chosen from the first result.
pub struct FlatMap<P, F, A> {
    parser: P,
    f: F,
    _phantom: PhantomData<fn(A)>,
}

impl<P, F, A> FlatMap<P, F, A> {
    pub fn new(parser: P, f: F) -> Self {
        Self {
            parser,
            f,
            _phantom: PhantomData,
        }
    }
}

impl<P, F, A, Q, B> Parser<B> for FlatMap<P, F, A>
where
    P: Parser<A>,
    F: Fn(A) -> Q,
    Q: Parser<B>,
{
    fn parse<'a>(&self, cursor: Cursor<'a>) -> ParseResult<'a, B> {
        let (next, value) = self.parser.parse(cursor)?;
        (self.f)(value).parse(next)
    }
}

impl<P, F, A, Q, B> TokenParser<B> for FlatMap<P, F, A>
where
    P: TokenParser<A>,
    F: Fn(A) -> Q,
    Q: TokenParser<B>,
{
    fn parse<'a>(&self, cursor: TokenCursor<'a>) -> TokenParseResult<'a, B> {
        let (next, value) = self.parser.parse(cursor)?;
        (self.f)(value).parse(next)
    }
}

/// OrElse: tries `second` from the original cursor when `first` fails, unless the failure is
/// committed.
pub struct OrElse<P1, P2> {
    first: P1,
    second: P2,
}

impl<P1, P2> OrElse<P1, P2> {
    pub fn new(first: P1, second: P2) -> Self {
        Self { first, second }
    }
}

impl<P1, P2, O> Parser<O> for OrElse<P1, P2>
where
    P1: Parser<O>,
    P2: Parser<O>,
{
    fn parse<'a>(&self, cursor: Cursor<'a>) -> ParseResult<'a, O> {
        match self.first.parse(cursor) {
            Err(diagnostic) if !diagnostic.committed => self.second.parse(cursor),
            result => result,
        }
    }
}

impl<P1, P2, O> TokenParser<O> for OrElse<P1, P2>
where
    P1: TokenParser<O>,
    P2: TokenParser<O>,
{
    fn parse<'a>(&self, cursor: TokenCursor<'a>) -> TokenParseResult<'a, O> {
        match self.first.parse(cursor) {
            Err(diagnostic) if !diagnostic.committed => self.second.parse(cursor),
            result => result,
        }
    }
}

/// Choice: the first alternative that succeeds. A committed failure stops the search.
pub struct Choice<P> {
    parsers: Vec<P>,
}

impl<P> Choice<P> {
    pub fn new(parsers: Vec<P>) -> Self {
        Self { parsers }
    }

    fn exhausted(&self) -> Diagnostic {
        Diagnostic::error(format!(
            "none of {} alternatives matched",
            self.parsers.len()
        ))
    }
}

impl<P, O> Parser<O> for Choice<P>
where
    P: Parser<O>,
{
    fn parse<'a>(&self, cursor: Cursor<'a>) -> ParseResult<'a, O> {
        for parser in &self.parsers {
            match parser.parse(cursor) {
                Err(diagnostic) if !diagnostic.committed => continue,
                result => return result,
            }
        }
        Err(self.exhausted().with_range(char_range(&cursor)))
    }
}

impl<P, O> TokenParser<O> for Choice<P>
where
    P: TokenParser<O>,
{
    fn parse<'a>(&self, cursor: TokenCursor<'a>) -> TokenParseResult<'a, O> {
        for parser in &self.parsers {
            match parser.parse(cursor) {
                Err(diagnostic) if !diagnostic.committed => continue,
                result => return result,
            }
        }
        Err(self.exhausted().with_range(token_range(&cursor)))
    }
}

/// Optional: an uncommitted failure becomes `None` at the original cursor.
pub struct Optional<P> {
    parser: P,
}

impl<P> Optional<P> {
    pub fn new(parser: P) -> Self {
        Self { parser }
    }
}

impl<P, O> Parser<Option<O>> for Optional<P>
where
    P: Parser<O>,
{
    fn parse<'a>(&self, cursor: Cursor<'a>) -> ParseResult<'a, Option<O>> {
        match self.parser.parse(cursor) {
            Ok((next, value)) => Ok((next, Some(value))),
            Err(diagnostic) if diagnostic.committed => Err(diagnostic),
            Err(_) => Ok((cursor, None)),
        }
    }
}

impl<P, O> TokenParser<Option<O>> for Optional<P>
where
    P: TokenParser<O>,
{
    fn parse<'a>(&self, cursor: TokenCursor<'a>) -> TokenParseResult<'a, Option<O>> {
        match self.parser.parse(cursor) {
            Ok((next, value)) => Ok((next, Some(value))),
            Err(diagnostic) if diagnostic.committed => Err(diagnostic),
            Err(_) => Ok((cursor, None)),
        }
    }
}

/// Many: repeats until the parser fails and requires at least `min` matches.
///
/// A zero-width match ends the loop without being recorded, and a committed failure
/// propagates.
pub struct Many<P> {
    parser: P,
    min: usize,
}

impl<P> Many<P> {
    pub fn new(parser: P, min: usize) -> Self {
        Self { parser, min }
    }

    fn too_few(&self) -> Diagnostic {
        Diagnostic::error(format!("expected at least {} occurrence(s)", self.min))
    }
}

impl<P, O> Parser<Vec<O>> for Many<P>
where
    P: Parser<O>,
{
    fn parse<'a>(&self, cursor: Cursor<'a>) -> ParseResult<'a, Vec<O>> {
        let mut values = Vec::new();
        let mut current = cursor;
        loop {
            match self.parser.parse(current) {
                Ok((next, _)) if next.offset() == current.offset() => {
                    tracing::warn!(target: "parser::many", offset = current.offset(), "zero-width match ends repetition");
                    break;
                }
                Ok((next, value)) => {
                    values.push(value);
                    current = next;
                }
                Err(diagnostic) if diagnostic.committed => return Err(diagnostic),
                Err(_) => break,
            }
        }
        if values.len() < self.min {
            return Err(self.too_few().with_range(char_range(&current)));
        }
        Ok((current, values))
    }
}

impl<P, O> TokenParser<Vec<O>> for Many<P>
where
    P: TokenParser<O>,
{
    fn parse<'a>(&self, cursor: TokenCursor<'a>) -> TokenParseResult<'a, Vec<O>> {
        let mut values = Vec::new();
        let mut current = cursor;
        loop {
            match self.parser.parse(current) {
                Ok((next, _)) if next.index() == current.index() => {
                    tracing::warn!(target: "parser::many", index = current.index(), "zero-width match ends repetition");
                    break;
                }
                Ok((next, value)) => {
                    values.push(value);
                    current = next;
                }
                Err(diagnostic) if diagnostic.committed => return Err(diagnostic),
                Err(_) => break,
            }
        }
        if values.len() < self.min {
            return Err(self.too_few().with_range(token_range(&current)));
        }
        Ok((current, values))
    }
}

/// Then: both results as a pair.
pub struct Then<P1, P2> {
    first: P1,
    second: P2,
}

impl<P1, P2> Then<P1, P2> {
    pub fn new(first: P1, second: P2) -> Self {
        Self { first, second }
    }
}

impl<P1, P2, A, B> Parser<(A, B)> for Then<P1, P2>
where
    P1: Parser<A>,
    P2: Parser<B>,
{
    fn parse<'a>(&self, cursor: Cursor<'a>) -> ParseResult<'a, (A, B)> {
        let (next, a) = self.first.parse(cursor)?;
        let (next, b) = self.second.parse(next)?;
        Ok((next, (a, b)))
    }
}

impl<P1, P2, A, B> TokenParser<(A, B)> for Then<P1, P2>
where
    P1: TokenParser<A>,
    P2: TokenParser<B>,
{
    fn parse<'a>(&self, cursor: TokenCursor<'a>) -> TokenParseResult<'a, (A, B)> {
        let (next, a) = self.first.parse(cursor)?;
        let (next, b) = self.second.parse(next)?;
        Ok((next, (a, b)))
    }
}

/// Skip: keeps the left result.
pub struct Skip<P1, P2, B> {
    first: P1,
    second: P2,
    _phantom: PhantomData<fn() -> B>,
}

impl<P1, P2, B> Skip<P1, P2, B> {
    pub fn new(first: P1, second: P2) -> Self {
        Self {
            first,
            second,
            _phantom: PhantomData,
        }
    }
}

impl<P1, P2, A, B> Parser<A> for Skip<P1, P2, B>
where
    P1: Parser<A>,
    P2: Parser<B>,
{
    fn parse<'a>(&self, cursor: Cursor<'a>) -> ParseResult<'a, A> {
        let (next, a) = self.first.parse(cursor)?;
        let (next, _) = self.second.parse(next)?;
        Ok((next, a))
    }
}

impl<P1, P2, A, B> TokenParser<A> for Skip<P1, P2, B>
where
    P1: TokenParser<A>,
    P2: TokenParser<B>,
{
    fn parse<'a>(&self, cursor: TokenCursor<'a>) -> TokenParseResult<'a, A> {
        let (next, a) = self.first.parse(cursor)?;
        let (next, _) = self.second.parse(next)?;
        Ok((next, a))
    }
}

/// Keep: keeps the right result.
pub struct Keep<P1, P2, A> {
    first: P1,
    second: P2,
    _phantom: PhantomData<fn() -> A>,
}

impl<P1, P2, A> Keep<P1, P2, A> {
    pub fn new(first: P1, second: P2) -> Self {
        Self {
            first,
            second,
            _phantom: PhantomData,
        }
    }
}

impl<P1, P2, A, B> Parser<B> for Keep<P1, P2, A>
where
    P1: Parser<A>,
    P2: Parser<B>,
{
    fn parse<'a>(&self, cursor: Cursor<'a>) -> ParseResult<'a, B> {
        let (next, _) = self.first.parse(cursor)?;
        self.second.parse(next)
    }
}

impl<P1, P2, A, B> TokenParser<B> for Keep<P1, P2, A>
where
    P1: TokenParser<A>,
    P2: TokenParser<B>,
{
    fn parse<'a>(&self, cursor: TokenCursor<'a>) -> TokenParseResult<'a, B> {
        let (next, _) = self.first.parse(cursor)?;
        self.second.parse(next)
    }
}

/// Between: `left inner right`, keeping the inner result.
pub struct Between<L, P, R, X, Y> {
    left: L,
    inner: P,
    right: R,
    _phantom: PhantomData<fn() -> (X, Y)>,
}

impl<L, P, R, X, Y> Between<L, P, R, X, Y> {
    pub fn new(left: L, inner: P, right: R) -> Self {
        Self {
            left,
            inner,
            right,
            _phantom: PhantomData,
        }
    }
}

impl<L, P, R, X, Y, O> Parser<O> for Between<L, P, R, X, Y>
where
    L: Parser<X>,
    P: Parser<O>,
    R: Parser<Y>,
{
    fn parse<'a>(&self, cursor: Cursor<'a>) -> ParseResult<'a, O> {
        let (next, _) = self.left.parse(cursor)?;
        let (next, value) = self.inner.parse(next)?;
        let (next, _) = self.right.parse(next)?;
        Ok((next, value))
    }
}

impl<L, P, R, X, Y, O> TokenParser<O> for Between<L, P, R, X, Y>
where
    L: TokenParser<X>,
    P: TokenParser<O>,
    R: TokenParser<Y>,
{
    fn parse<'a>(&self, cursor: TokenCursor<'a>) -> TokenParseResult<'a, O> {
        let (next, _) = self.left.parse(cursor)?;
        let (next, value) = self.inner.parse(next)?;
        let (next, _) = self.right.parse(next)?;
        Ok((next, value))
    }
}

/// Cut: marks failures as committed so enclosing alternations stop searching.
///
/// A non-empty `message` replaces the inner message.
pub struct Cut<P> {
    parser: P,
    message: String,
}

impl<P> Cut<P> {
    pub fn new(parser: P, message: impl Into<String>) -> Self {
        Self {
            parser,
            message: message.into(),
        }
    }
}

impl<P, O> TokenParser<O> for Cut<P>
where
    P: TokenParser<O>,
{
    fn parse<'a>(&self, cursor: TokenCursor<'a>) -> TokenParseResult<'a, O> {
        self.parser.parse(cursor).map_err(|diagnostic| {
            let diagnostic = if self.message.is_empty() {
                diagnostic
            } else {
                diagnostic.with_message(&self.message)
            };
            diagnostic.commit()
        })
    }
}

/// Lookahead: the parser's result without advancing.
pub struct Lookahead<P> {
    parser: P,
}

impl<P> Lookahead<P> {
    pub fn new(parser: P) -> Self {
        Self { parser }
    }
}

impl<P, O> TokenParser<O> for Lookahead<P>
where
    P: TokenParser<O>,
{
    fn parse<'a>(&self, cursor: TokenCursor<'a>) -> TokenParseResult<'a, O> {
        let (_, value) = self.parser.parse(cursor)?;
        Ok((cursor, value))
    }
}

/// NotFollowedBy: succeeds, without advancing, exactly when the parser fails.
pub struct NotFollowedBy<P, A> {
    parser: P,
    _phantom: PhantomData<fn() -> A>,
}

impl<P, A> NotFollowedBy<P, A> {
    pub fn new(parser: P) -> Self {
        Self {
            parser,
            _phantom: PhantomData,
        }
    }
}

impl<P, A> TokenParser<()> for NotFollowedBy<P, A>
where
    P: TokenParser<A>,
{
    fn parse<'a>(&self, cursor: TokenCursor<'a>) -> TokenParseResult<'a, ()> {
        match self.parser.parse(cursor) {
            Ok(_) => Err(Diagnostic::error(format!("unexpected {}", cursor.peek()))
                .with_range(token_range(&cursor))),
            Err(_) => Ok((cursor, ())),
        }
    }
}

/// RequireProgress: rejects a success that did not consume anything.
pub struct RequireProgress<P> {
    parser: P,
}

impl<P> RequireProgress<P> {
    pub fn new(parser: P) -> Self {
        Self { parser }
    }
}

impl<P, O> TokenParser<O> for RequireProgress<P>
where
    P: TokenParser<O>,
{
    fn parse<'a>(&self, cursor: TokenCursor<'a>) -> TokenParseResult<'a, O> {
        let (next, value) = self.parser.parse(cursor)?;
        if next.index() == cursor.index() {
            return Err(
                Diagnostic::error("parser did not advance").with_range(token_range(&cursor))
            );
        }
        Ok((next, value))
    }
}

/// WithBacktracking: failures without a range are anchored at the pre-attempt position.
pub struct WithBacktracking<P> {
    parser: P,
}

impl<P> WithBacktracking<P> {
    pub fn new(parser: P) -> Self {
        Self { parser }
    }
}

impl<P, O> Parser<O> for WithBacktracking<P>
where
    P: Parser<O>,
{
    fn parse<'a>(&self, cursor: Cursor<'a>) -> ParseResult<'a, O> {
        let mark = cursor;
        self.parser
            .parse(cursor)
            .map_err(|diagnostic| diagnostic.with_range_if_absent(SourceRange::at(mark.offset())))
    }
}

impl<P, O> TokenParser<O> for WithBacktracking<P>
where
    P: TokenParser<O>,
{
    fn parse<'a>(&self, cursor: TokenCursor<'a>) -> TokenParseResult<'a, O> {
        let mark = cursor.mark();
        self.parser
            .parse(cursor.restore(mark))
            .map_err(|diagnostic| diagnostic.with_range_if_absent(SourceRange::at(mark)))
    }
}

/// Lazy: builds the parser on every use, which lets grammars refer to themselves.
pub struct Lazy<F> {
    factory: F,
}

impl<F> Lazy<F> {
    pub fn new(factory: F) -> Self {
        Self { factory }
    }
}

impl<F, P, O> Parser<O> for Lazy<F>
where
    F: Fn() -> P,
    P: Parser<O>,
{
    fn parse<'a>(&self, cursor: Cursor<'a>) -> ParseResult<'a, O> {
        (self.factory)().parse(cursor)
    }
}

impl<F, P, O> TokenParser<O> for Lazy<F>
where
    F: Fn() -> P,
    P: TokenParser<O>,
{
    fn parse<'a>(&self, cursor: TokenCursor<'a>) -> TokenParseResult<'a, O> {
        (self.factory)().parse(cursor)
    }
}

/// FromFn: a closure from cursor to result.
pub struct FromFn<F> {
    f: F,
}

impl<F> FromFn<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F, O> Parser<O> for FromFn<F>
where
    F: for<'a> Fn(Cursor<'a>) -> ParseResult<'a, O>,
{
    fn parse<'a>(&self, cursor: Cursor<'a>) -> ParseResult<'a, O> {
        (self.f)(cursor)
    }
}

impl<F, O> TokenParser<O> for FromFn<F>
where
    F: for<'a> Fn(TokenCursor<'a>) -> TokenParseResult<'a, O>,
{
    fn parse<'a>(&self, cursor: TokenCursor<'a>) -> TokenParseResult<'a, O> {
        (self.f)(cursor)
    }
}

#[cfg(test)]
mod tests {
    use super::{
        Between, Choice, Cut, Fail, FromFn, Keep, Lookahead, Many, Map, NotFollowedBy, Optional,
        OrElse, RequireProgress, Skip, Success, WithBacktracking,
    };
    use crate::analyzer::core::{TokenParseResult, TokenParser};
    use crate::analyzer::primitives::{Expect, Identifier, KeywordMatch};
    use crate::diagnostic::Diagnostic;
    use crate::source::SourceRange;
    use crate::tokenizer::token::{Token, TokenKind};
    use crate::tokenizer::token_cursor::TokenCursor;
    use pretty_assertions::assert_eq;

    fn bare(_: TokenCursor<'_>) -> TokenParseResult<'_, ()> {
        Err(Diagnostic::error("bare"))
    }

    fn tokens() -> Vec<Token> {
        vec![
            Token::keyword("let"),
            Token::identifier("x"),
            Token::Equals,
            Token::identifier("y"),
            Token::Eof,
        ]
    }

    #[test]
    fn test_map() {
        let input = tokens();
        let parser = Map::new(Identifier::new(), |name: String| name.len());
        let result = parser.parse(TokenCursor::new(&input).advance());
        assert_eq!(result.map(|(c, v)| (c.index(), v)), Ok((2, 1)));
    }

    #[test]
    fn test_or_else_retries_from_start() {
        let input = tokens();
        let cursor = TokenCursor::new(&input);
        let first = Keep::new(KeywordMatch::new("let"), Expect::new(TokenKind::Equals));
        let parser = OrElse::new(
            Map::new(first, |_: Token| "first"),
            Map::new(KeywordMatch::new("let"), |_: String| "second"),
        );
        let (next, value) = parser.parse(cursor).unwrap();
        assert_eq!(value, "second");
        assert_eq!(next.index(), 1);
    }

    #[test]
    fn test_or_else_respects_cut() {
        let input = tokens();
        let cursor = TokenCursor::new(&input);
        let committed = Keep::new(
            KeywordMatch::new("let"),
            Cut::new(Expect::new(TokenKind::Equals), "expected '=' after let"),
        );
        let parser = OrElse::new(
            Map::new(committed, |_: Token| "first"),
            Map::new(KeywordMatch::new("let"), |_: String| "second"),
        );
        let diagnostic = parser.parse(cursor).unwrap_err();
        assert!(diagnostic.committed);
        assert_eq!(diagnostic.message, "expected '=' after let");
    }

    #[test]
    fn test_choice_reports_exhaustion() {
        let input = tokens();
        let parser = Choice::new(vec![
            Expect::new(TokenKind::Comma),
            Expect::new(TokenKind::Semicolon),
        ]);
        let diagnostic = parser.parse(TokenCursor::new(&input)).unwrap_err();
        assert_eq!(diagnostic.message, "none of 2 alternatives matched");
        assert_eq!(diagnostic.range, Some(SourceRange::new(0, 1)));
    }

    #[test]
    fn test_many_minimum() {
        let input = vec![Token::Comma, Token::Comma, Token::Semicolon];
        let cursor = TokenCursor::new(&input);

        let (next, commas) = Many::new(Expect::new(TokenKind::Comma), 1).parse(cursor).unwrap();
        assert_eq!(commas.len(), 2);
        assert_eq!(next.index(), 2);

        let diagnostic = Many::new(Expect::new(TokenKind::Comma), 3)
            .parse(cursor)
            .unwrap_err();
        assert_eq!(diagnostic.message, "expected at least 3 occurrence(s)");
    }

    #[test]
    fn test_many_stops_on_zero_width() {
        let input = tokens();
        let parser = Many::new(Optional::new(Expect::new(TokenKind::Comma)), 0);
        let (next, values) = parser.parse(TokenCursor::new(&input)).unwrap();
        assert!(values.is_empty());
        assert_eq!(next.index(), 0);
    }

    #[test]
    fn test_optional_propagates_committed() {
        let input = tokens();
        let parser = Optional::new(Cut::new(Expect::new(TokenKind::Comma), ""));
        let diagnostic = parser.parse(TokenCursor::new(&input)).unwrap_err();
        assert!(diagnostic.committed);
        assert!(diagnostic.message.starts_with("unexpected keyword 'let'"));
    }

    #[test]
    fn test_lookahead_and_not_followed_by_never_advance() {
        let input = tokens();
        let cursor = TokenCursor::new(&input);

        let (next, _) = Lookahead::new(KeywordMatch::new("let")).parse(cursor).unwrap();
        assert_eq!(next, cursor);

        let (next, ()) = NotFollowedBy::new(Expect::new(TokenKind::Comma))
            .parse(cursor)
            .unwrap();
        assert_eq!(next, cursor);

        let diagnostic = NotFollowedBy::new(KeywordMatch::new("let"))
            .parse(cursor)
            .unwrap_err();
        assert_eq!(diagnostic.message, "unexpected keyword 'let'");
    }

    #[test]
    fn test_require_progress() {
        let input = tokens();
        let parser = RequireProgress::new(Success::new(()));
        let diagnostic = parser.parse(TokenCursor::new(&input)).unwrap_err();
        assert_eq!(diagnostic.message, "parser did not advance");
    }

    #[test]
    fn test_between_and_skip() {
        let input = vec![
            Token::LeftParen,
            Token::identifier("a"),
            Token::RightParen,
            Token::Semicolon,
        ];
        let parser = Skip::new(
            Between::new(
                Expect::new(TokenKind::LeftParen),
                Identifier::new(),
                Expect::new(TokenKind::RightParen),
            ),
            Expect::new(TokenKind::Semicolon),
        );
        let (next, name) = parser.parse(TokenCursor::new(&input)).unwrap();
        assert_eq!(name, "a");
        assert_eq!(next.index(), 4);
    }

    #[test]
    fn test_with_backtracking_anchors_range() {
        let input = tokens();
        let cursor = TokenCursor::new(&input).advance();
        let diagnostic = WithBacktracking::new(Fail::<()>::new("no"))
            .parse(cursor)
            .unwrap_err();
        assert_eq!(diagnostic.range, Some(SourceRange::new(1, 2)));

        let diagnostic = WithBacktracking::new(FromFn::new(bare)).parse(cursor).unwrap_err();
        assert_eq!(diagnostic.range, Some(SourceRange::at(1)));
    }
}
