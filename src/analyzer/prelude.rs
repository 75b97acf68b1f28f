//! Token-level constructors.
//!
//! Each function wraps one of the combinator or leaf structs, with `TokenParser` bounds so the
//! output types are inferred at the call site.

use std::sync::Arc;

use rust_decimal::Decimal;

use super::combinators::*;
use super::core::{BoxedTokenParser, TokenParseResult, TokenParser};
use super::primitives::*;
pub use super::sugar::{block, opt_token, opt_token_where, positioned, soft_identifier, BlockSpec};
use crate::tokenizer::token::{Token, TokenKind};
use crate::tokenizer::token_cursor::TokenCursor;

pub fn success<O: Clone>(value: O) -> Success<O> {
    Success::new(value)
}

pub fn fail<O>(message: &str) -> Fail<O> {
    Fail::new(message)
}

pub fn map<P, F, A, B>(parser: P, f: F) -> Map<P, F, A>
where
    P: TokenParser<A>,
    F: Fn(A) -> B,
{
    Map::new(parser, f)
}

pub fn flat_map<P, F, A, Q, B>(parser: P, f: F) -> FlatMap<P, F, A>
where
    P: TokenParser<A>,
    F: Fn(A) -> Q,
    Q: TokenParser<B>,
{
    FlatMap::new(parser, f)
}

pub fn or_else<P1, P2, O>(first: P1, second: P2) -> OrElse<P1, P2>
where
    P1: TokenParser<O>,
    P2: TokenParser<O>,
{
    OrElse::new(first, second)
}

pub fn choice<P, O>(parsers: Vec<P>) -> Choice<P>
where
    P: TokenParser<O>,
{
    Choice::new(parsers)
}

pub fn optional<P, O>(parser: P) -> Optional<P>
where
    P: TokenParser<O>,
{
    Optional::new(parser)
}

pub fn many<P, O>(parser: P, min: usize) -> Many<P>
where
    P: TokenParser<O>,
{
    Many::new(parser, min)
}

pub fn then<P1, P2, A, B>(first: P1, second: P2) -> Then<P1, P2>
where
    P1: TokenParser<A>,
    P2: TokenParser<B>,
{
    Then::new(first, second)
}

pub fn skip<P1, P2, A, B>(first: P1, second: P2) -> Skip<P1, P2, B>
where
    P1: TokenParser<A>,
    P2: TokenParser<B>,
{
    Skip::new(first, second)
}

pub fn keep<P1, P2, A, B>(first: P1, second: P2) -> Keep<P1, P2, A>
where
    P1: TokenParser<A>,
    P2: TokenParser<B>,
{
    Keep::new(first, second)
}

pub fn between<L, P, R, X, Y, O>(left: L, inner: P, right: R) -> Between<L, P, R, X, Y>
where
    L: TokenParser<X>,
    P: TokenParser<O>,
    R: TokenParser<Y>,
{
    Between::new(left, inner, right)
}

pub fn cut<P, O>(parser: P, message: &str) -> Cut<P>
where
    P: TokenParser<O>,
{
    Cut::new(parser, message)
}

pub fn lookahead<P, O>(parser: P) -> Lookahead<P>
where
    P: TokenParser<O>,
{
    Lookahead::new(parser)
}

pub fn not_followed_by<P, A>(parser: P) -> NotFollowedBy<P, A>
where
    P: TokenParser<A>,
{
    NotFollowedBy::new(parser)
}

pub fn require_progress<P, O>(parser: P) -> RequireProgress<P>
where
    P: TokenParser<O>,
{
    RequireProgress::new(parser)
}

pub fn with_backtracking<P, O>(parser: P) -> WithBacktracking<P>
where
    P: TokenParser<O>,
{
    WithBacktracking::new(parser)
}

pub fn lazy<F, P, O>(factory: F) -> Lazy<F>
where
    F: Fn() -> P,
    P: TokenParser<O>,
{
    Lazy::new(factory)
}

pub fn token_fn<F, O>(f: F) -> FromFn<F>
where
    F: for<'a> Fn(TokenCursor<'a>) -> TokenParseResult<'a, O>,
{
    FromFn::new(f)
}

/// Erases the parser's type so differently built parsers can share a `Vec` or a field.
pub fn boxed<P, O>(parser: P) -> BoxedTokenParser<O>
where
    P: TokenParser<O> + Send + Sync + 'static,
{
    Arc::new(parser)
}

pub fn satisfy<F, O>(f: F, what: &str) -> Satisfy<F, O>
where
    F: Fn(&Token) -> Option<O>,
{
    Satisfy::new(f, what)
}

pub fn expect(kind: TokenKind) -> Expect {
    Expect::new(kind)
}

pub fn identifier() -> Identifier {
    Identifier::new()
}

/// An identifier, or a keyword standing where a name is expected (map keys, atom values).
pub fn word() -> WordOrKeyword {
    WordOrKeyword::new()
}

pub fn keyword(name: &str) -> KeywordMatch {
    KeywordMatch::new(name)
}

pub fn number() -> NumberLiteral {
    NumberLiteral::new()
}

pub fn string() -> StringLiteral {
    StringLiteral::new()
}

pub fn date() -> DateLiteral {
    DateLiteral::new()
}

pub fn end_of_input() -> EndOfInput {
    EndOfInput::new()
}

/// `number()` as an integer; fractional values are rejected.
pub fn integer() -> Satisfy<fn(&Token) -> Option<Decimal>, Decimal> {
    fn whole(token: &Token) -> Option<Decimal> {
        match token {
            Token::Number { value, .. } if value.fract().is_zero() => Some(*value),
            _ => None,
        }
    }
    Satisfy::new(whole as fn(&Token) -> Option<Decimal>, "integer number")
}
