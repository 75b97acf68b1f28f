//! Shorthands built from the prelude.
//!
//! These return type-erased parsers since the composed types get long; they are meant for
//! grammar-building code, not inner loops.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::core::{BoxedTokenParser, TokenParser};
use super::prelude::*;
use crate::diagnostic::Diagnostic;
use crate::source::SourceRange;
use crate::tokenizer::token::{Token, TokenKind};

/// Bracket pair around a node body.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DelimiterKind {
    Parens,
    #[default]
    Braces,
    Brackets,
    None,
}

impl DelimiterKind {
    /// Opening and closing token kinds; `None` for an undelimited body.
    pub fn token_kinds(&self) -> Option<(TokenKind, TokenKind)> {
        match self {
            DelimiterKind::Parens => Some((TokenKind::LeftParen, TokenKind::RightParen)),
            DelimiterKind::Braces => Some((TokenKind::LeftBrace, TokenKind::RightBrace)),
            DelimiterKind::Brackets => Some((TokenKind::LeftBracket, TokenKind::RightBracket)),
            DelimiterKind::None => None,
        }
    }
}

fn enclosed<P, O>(open: TokenKind, inner: P, close: TokenKind) -> BoxedTokenParser<O>
where
    P: TokenParser<O> + Send + Sync + 'static,
    O: 'static,
{
    boxed(between(expect(open), inner, expect(close)))
}

pub fn parens<P, O>(inner: P) -> BoxedTokenParser<O>
where
    P: TokenParser<O> + Send + Sync + 'static,
    O: 'static,
{
    enclosed(TokenKind::LeftParen, inner, TokenKind::RightParen)
}

pub fn braces<P, O>(inner: P) -> BoxedTokenParser<O>
where
    P: TokenParser<O> + Send + Sync + 'static,
    O: 'static,
{
    enclosed(TokenKind::LeftBrace, inner, TokenKind::RightBrace)
}

pub fn brackets<P, O>(inner: P) -> BoxedTokenParser<O>
where
    P: TokenParser<O> + Send + Sync + 'static,
    O: 'static,
{
    enclosed(TokenKind::LeftBracket, inner, TokenKind::RightBracket)
}

pub fn angles<P, O>(inner: P) -> BoxedTokenParser<O>
where
    P: TokenParser<O> + Send + Sync + 'static,
    O: 'static,
{
    enclosed(TokenKind::LessThan, inner, TokenKind::GreaterThan)
}

pub fn delimited_by<P, O>(kind: DelimiterKind, inner: P) -> BoxedTokenParser<O>
where
    P: TokenParser<O> + Send + Sync + 'static,
    O: 'static,
{
    match kind.token_kinds() {
        Some((open, close)) => enclosed(open, inner, close),
        None => boxed(inner),
    }
}

/// At least `min` consecutive newline tokens, collapsed to one match.
pub fn newline_run(min: usize) -> BoxedTokenParser<()> {
    boxed(map(many(expect(TokenKind::Newline), min), |_| ()))
}

/// `(item sep?)*`
pub fn separated_list<P, S, O, X>(item: P, separator: S) -> BoxedTokenParser<Vec<O>>
where
    P: TokenParser<O> + Send + Sync + 'static,
    S: TokenParser<X> + Send + Sync + 'static,
    O: 'static,
    X: 'static,
{
    boxed(many(skip(item, optional(separator)), 0))
}

/// `item (sep item)*`
pub fn sep_by1<P, S, O, X>(item: P, separator: S) -> BoxedTokenParser<Vec<O>>
where
    P: TokenParser<O> + Send + Sync + 'static,
    S: TokenParser<X> + Send + Sync + 'static,
    O: 'static,
    X: 'static,
{
    let item = boxed(item);
    let rest = many(keep(separator, item.clone()), 0);
    boxed(map(then(item, rest), |(first, rest): (O, Vec<O>)| {
        std::iter::once(first).chain(rest).collect::<Vec<_>>()
    }))
}

/// `item (sep+ item)* sep*`: like [`sep_by1`] but tolerates repeated and trailing separators.
pub fn sep_end_by<P, S, O, X>(item: P, separator: S) -> BoxedTokenParser<Vec<O>>
where
    P: TokenParser<O> + Send + Sync + 'static,
    S: TokenParser<X> + Send + Sync + 'static,
    O: 'static,
    X: 'static,
{
    let item = boxed(item);
    let separator = boxed(separator);
    let rest = many(keep(many(separator.clone(), 1), item.clone()), 0);
    let parser = skip(then(item, rest), many(separator, 0));
    boxed(map(parser, |(first, rest): (O, Vec<O>)| {
        std::iter::once(first).chain(rest).collect::<Vec<_>>()
    }))
}

/// An optional token of `kind` before `inner`.
pub fn opt_token<P, O>(kind: TokenKind, inner: P) -> BoxedTokenParser<O>
where
    P: TokenParser<O> + Send + Sync + 'static,
    O: 'static,
{
    boxed(keep(optional(expect(kind)), inner))
}

/// An optional token matching `predicate` before `inner`, for tokens told apart by payload
/// such as one specific keyword.
pub fn opt_token_where<F, P, O>(predicate: F, inner: P) -> BoxedTokenParser<O>
where
    F: Fn(&Token) -> bool + Send + Sync + 'static,
    P: TokenParser<O> + Send + Sync + 'static,
    O: 'static,
{
    let token = satisfy(move |token: &Token| predicate(token).then_some(()), "optional token");
    boxed(keep(optional(token), inner))
}

/// An optional `=` before `inner`.
pub fn opt_equals<P, O>(inner: P) -> BoxedTokenParser<O>
where
    P: TokenParser<O> + Send + Sync + 'static,
    O: 'static,
{
    opt_token(TokenKind::Equals, inner)
}

/// `inner`'s value with the token range it consumed.
pub fn positioned<P, O>(inner: P) -> BoxedTokenParser<(O, SourceRange)>
where
    P: TokenParser<O> + Send + Sync + 'static,
    O: 'static,
{
    boxed(token_fn(move |cursor| {
        let start = cursor.mark();
        let (next, value) = inner.parse(cursor)?;
        Ok((next, (value, SourceRange::new(start, next.index()))))
    }))
}

/// An identifier that is not one of `reserved`.
///
/// Words the lexer does not know as keywords can still be kept out of name positions this way.
pub fn soft_identifier<I, S>(reserved: I) -> BoxedTokenParser<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let reserved: BTreeSet<String> = reserved.into_iter().map(Into::into).collect();
    boxed(token_fn(move |cursor| {
        let (next, name) = identifier().parse(cursor)?;
        if reserved.contains(&name) {
            return Err(Diagnostic::error(format!(
                "identifier may not be a reserved keyword: '{}'",
                name
            ))
            .with_range(SourceRange::new(cursor.index(), next.index())));
        }
        Ok((next, name))
    }))
}

/// `opener { head body }`, see [`block`].
#[derive(Clone)]
pub struct BlockSpec<H, B> {
    pub opener: String,
    pub head: BoxedTokenParser<H>,
    pub body: BoxedTokenParser<B>,
}

impl<H, B> BlockSpec<H, B> {
    pub fn new(
        opener: impl Into<String>,
        head: BoxedTokenParser<H>,
        body: BoxedTokenParser<B>,
    ) -> Self {
        Self {
            opener: opener.into(),
            head,
            body,
        }
    }
}

/// The opener keyword, then the head and body parsed inside braces.
pub fn block<H, B>(spec: BlockSpec<H, B>) -> BoxedTokenParser<(H, B)>
where
    H: 'static,
    B: 'static,
{
    boxed(keep(keyword(&spec.opener), braces(then(spec.head, spec.body))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::token_cursor::TokenStream;
    use rust_decimal::Decimal;
    use pretty_assertions::assert_eq;

    fn names(tokens: Vec<Token>, parser: BoxedTokenParser<Vec<String>>) -> (usize, Vec<String>) {
        let stream = TokenStream::from_tokens(tokens);
        let (cursor, values) = parser.parse(stream.cursor()).unwrap();
        (cursor.index(), values)
    }

    fn ident(name: &str) -> Token {
        Token::identifier(name)
    }

    #[test]
    fn test_delimited_by() {
        let stream = TokenStream::from_tokens(vec![Token::LeftBracket, ident("a"), Token::RightBracket]);
        let (_, name) = delimited_by(DelimiterKind::Brackets, identifier())
            .parse(stream.cursor())
            .unwrap();
        assert_eq!(name, "a");

        let diagnostic = delimited_by(DelimiterKind::Parens, identifier())
            .parse(stream.cursor())
            .unwrap_err();
        assert_eq!(diagnostic.message, "unexpected '['; expected '('");

        let stream = TokenStream::from_tokens(vec![ident("bare")]);
        assert!(delimited_by(DelimiterKind::None, identifier())
            .parse(stream.cursor())
            .is_ok());
    }

    #[test]
    fn test_separated_list_accepts_missing_separators() {
        let tokens = vec![ident("a"), Token::Comma, ident("b"), ident("c"), Token::Comma, Token::Eof];
        let (index, values) = names(tokens, separated_list(identifier(), expect(TokenKind::Comma)));
        assert_eq!(values, vec!["a", "b", "c"]);
        assert_eq!(index, 5);
    }

    #[test]
    fn test_sep_by1_leaves_trailing_separator() {
        let tokens = vec![ident("a"), Token::Comma, ident("b"), Token::Comma, Token::Eof];
        let (index, values) = names(tokens, sep_by1(identifier(), expect(TokenKind::Comma)));
        assert_eq!(values, vec!["a", "b"]);
        // the last comma has no item after it
        assert_eq!(index, 3);
    }

    #[test]
    fn test_sep_end_by_collapses_separators() {
        let tokens = vec![
            ident("a"),
            Token::Newline,
            Token::Newline,
            ident("b"),
            Token::Newline,
            Token::Eof,
        ];
        let (index, values) = names(tokens, sep_end_by(identifier(), expect(TokenKind::Newline)));
        assert_eq!(values, vec!["a", "b"]);
        assert_eq!(index, 5);
    }

    #[test]
    fn test_newline_run_and_opt_equals() {
        let stream = TokenStream::from_tokens(vec![
            Token::Newline,
            Token::Newline,
            Token::Equals,
            ident("x"),
        ]);
        let (cursor, ()) = newline_run(1).parse(stream.cursor()).unwrap();
        assert_eq!(cursor.index(), 2);
        let (cursor, name) = opt_equals(identifier()).parse(cursor).unwrap();
        assert_eq!((cursor.index(), name.as_str()), (4, "x"));
        assert!(newline_run(1).parse(cursor).is_err());
        assert!(newline_run(0).parse(cursor).is_ok());
    }

    #[test]
    fn test_opt_token_and_opt_token_where() {
        let stream = TokenStream::from_tokens(vec![Token::Colon, ident("a"), ident("b")]);
        let (cursor, name) = opt_token(TokenKind::Colon, identifier())
            .parse(stream.cursor())
            .unwrap();
        assert_eq!((cursor.index(), name.as_str()), (2, "a"));
        let (cursor, name) = opt_token(TokenKind::Colon, identifier()).parse(cursor).unwrap();
        assert_eq!((cursor.index(), name.as_str()), (3, "b"));

        let stream = TokenStream::from_tokens(vec![Token::keyword("as"), ident("alias")]);
        let is_as = |token: &Token| matches!(token, Token::Keyword(name) if name == "as");
        let (cursor, name) = opt_token_where(is_as, identifier())
            .parse(stream.cursor())
            .unwrap();
        assert_eq!((cursor.index(), name.as_str()), (2, "alias"));

        let is_to = |token: &Token| matches!(token, Token::Keyword(name) if name == "to");
        let diagnostic = opt_token_where(is_to, identifier())
            .parse(stream.cursor())
            .unwrap_err();
        assert_eq!(diagnostic.message, "unexpected keyword 'as'; expected identifier");
    }

    #[test]
    fn test_positioned_spans_consumed_tokens() {
        let stream = TokenStream::from_tokens(vec![
            Token::Comma,
            ident("total"),
            Token::Equals,
            Token::number(Decimal::new(7, 0)),
            Token::Eof,
        ]);
        let assignment = then(skip(identifier(), expect(TokenKind::Equals)), number());
        let (cursor, ((name, value), range)) = positioned(assignment)
            .parse(stream.cursor().advance())
            .unwrap();
        assert_eq!((name.as_str(), value), ("total", Decimal::new(7, 0)));
        assert_eq!(range, SourceRange::new(1, 4));
        assert_eq!(cursor.index(), 4);

        let (_, ((), range)) = positioned(end_of_input()).parse(cursor).unwrap();
        assert!(range.is_empty());
    }

    #[test]
    fn test_soft_identifier_rejects_reserved_names() {
        let stream = TokenStream::from_tokens(vec![ident("total"), ident("self")]);
        let name = soft_identifier(["self", "super"]);
        let (cursor, first) = name.parse(stream.cursor()).unwrap();
        assert_eq!(first, "total");

        let diagnostic = name.parse(cursor).unwrap_err();
        assert_eq!(
            diagnostic.message,
            "identifier may not be a reserved keyword: 'self'"
        );
        assert_eq!(diagnostic.range, Some(SourceRange::new(1, 2)));
        assert!(!diagnostic.committed);
    }

    #[test]
    fn test_block_reads_head_and_body() {
        let stream = TokenStream::from_tokens(vec![
            Token::keyword("account"),
            Token::LeftBrace,
            ident("cash"),
            Token::number(Decimal::new(100, 0)),
            Token::RightBrace,
            Token::Eof,
        ]);
        let spec = BlockSpec::new("account", boxed(identifier()), boxed(number()));
        let (cursor, (head, body)) = block(spec.clone()).parse(stream.cursor()).unwrap();
        assert_eq!(head, "cash");
        assert_eq!(body, Decimal::new(100, 0));
        assert!(cursor.is_eof());

        let other = BlockSpec::new("ledger", spec.head, spec.body);
        let diagnostic = block(other).parse(stream.cursor()).unwrap_err();
        assert_eq!(
            diagnostic.message,
            "unexpected keyword 'account'; expected keyword 'ledger'"
        );
    }
}
