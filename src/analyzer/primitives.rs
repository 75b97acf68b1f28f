//! Token leaf matchers.
//!
//! A leaf inspects exactly one token. On a mismatch it fails with
//! `unexpected {token}; expected {what}` anchored at the current token index.

use std::marker::PhantomData;

use rust_decimal::Decimal;

use super::core::{TokenParseResult, TokenParser};
use crate::diagnostic::Diagnostic;
use crate::tokenizer::token::{Token, TokenKind};
use crate::tokenizer::token_cursor::TokenCursor;

fn mismatch<'a, O>(cursor: TokenCursor<'a>, what: impl AsRef<str>) -> TokenParseResult<'a, O> {
    Err(Diagnostic::unexpected(cursor.peek(), what, cursor.index()))
}

// Satisfy: one token, converted by `f` when it matches
#[derive(Clone)]
pub struct Satisfy<F, O> {
    f: F,
    what: String,
    _phantom: PhantomData<fn() -> O>,
}

impl<F, O> Satisfy<F, O>
where
    F: Fn(&Token) -> Option<O>,
{
    pub fn new(f: F, what: impl Into<String>) -> Self {
        Self {
            f,
            what: what.into(),
            _phantom: PhantomData,
        }
    }
}

impl<F, O> TokenParser<O> for Satisfy<F, O>
where
    F: Fn(&Token) -> Option<O>,
{
    fn parse<'a>(&self, cursor: TokenCursor<'a>) -> TokenParseResult<'a, O> {
        match (self.f)(cursor.peek()) {
            Some(value) => Ok((cursor.advance(), value)),
            None => mismatch(cursor, &self.what),
        }
    }
}

// Expect: a token of the given kind, returned as is
#[derive(Debug, Clone, Copy)]
pub struct Expect {
    kind: TokenKind,
}

impl Expect {
    pub fn new(kind: TokenKind) -> Self {
        Self { kind }
    }
}

impl TokenParser<Token> for Expect {
    fn parse<'a>(&self, cursor: TokenCursor<'a>) -> TokenParseResult<'a, Token> {
        let token = cursor.peek();
        if token.kind() == self.kind {
            Ok((cursor.advance(), token.clone()))
        } else {
            mismatch(cursor, self.kind.to_string())
        }
    }
}

// Identifier: the identifier's name
#[derive(Debug, Clone, Copy, Default)]
pub struct Identifier;

impl Identifier {
    pub fn new() -> Self {
        Self
    }
}

impl TokenParser<String> for Identifier {
    fn parse<'a>(&self, cursor: TokenCursor<'a>) -> TokenParseResult<'a, String> {
        match cursor.peek() {
            Token::Identifier(name) => Ok((cursor.advance(), name.clone())),
            _ => mismatch(cursor, "identifier"),
        }
    }
}

// WordOrKeyword: identifier text, also taken from a keyword token
#[derive(Debug, Clone, Copy, Default)]
pub struct WordOrKeyword;

impl WordOrKeyword {
    pub fn new() -> Self {
        Self
    }
}

impl TokenParser<String> for WordOrKeyword {
    fn parse<'a>(&self, cursor: TokenCursor<'a>) -> TokenParseResult<'a, String> {
        match cursor.peek() {
            Token::Identifier(name) | Token::Keyword(name) => Ok((cursor.advance(), name.clone())),
            _ => mismatch(cursor, "identifier"),
        }
    }
}

// KeywordMatch: one specific keyword
#[derive(Debug, Clone)]
pub struct KeywordMatch {
    name: String,
}

impl KeywordMatch {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl TokenParser<String> for KeywordMatch {
    fn parse<'a>(&self, cursor: TokenCursor<'a>) -> TokenParseResult<'a, String> {
        match cursor.peek() {
            Token::Keyword(name) if *name == self.name => Ok((cursor.advance(), name.clone())),
            _ => mismatch(cursor, format!("keyword '{}'", self.name)),
        }
    }
}

// NumberLiteral: the exact decimal value
#[derive(Debug, Clone, Copy, Default)]
pub struct NumberLiteral;

impl NumberLiteral {
    pub fn new() -> Self {
        Self
    }
}

impl TokenParser<Decimal> for NumberLiteral {
    fn parse<'a>(&self, cursor: TokenCursor<'a>) -> TokenParseResult<'a, Decimal> {
        match cursor.peek() {
            Token::Number { value, .. } => Ok((cursor.advance(), *value)),
            _ => mismatch(cursor, "number"),
        }
    }
}

// StringLiteral: string content, quotes and escapes already resolved by the lexer
#[derive(Debug, Clone, Copy, Default)]
pub struct StringLiteral;

impl StringLiteral {
    pub fn new() -> Self {
        Self
    }
}

impl TokenParser<String> for StringLiteral {
    fn parse<'a>(&self, cursor: TokenCursor<'a>) -> TokenParseResult<'a, String> {
        match cursor.peek() {
            Token::String(content) => Ok((cursor.advance(), content.clone())),
            _ => mismatch(cursor, "string"),
        }
    }
}

// DateLiteral: the date text as written
#[derive(Debug, Clone, Copy, Default)]
pub struct DateLiteral;

impl DateLiteral {
    pub fn new() -> Self {
        Self
    }
}

impl TokenParser<String> for DateLiteral {
    fn parse<'a>(&self, cursor: TokenCursor<'a>) -> TokenParseResult<'a, String> {
        match cursor.peek() {
            Token::DateLiteral(text) => Ok((cursor.advance(), text.clone())),
            _ => mismatch(cursor, "date literal"),
        }
    }
}

// EndOfInput: succeeds only at the end token or past the slice
#[derive(Debug, Clone, Copy, Default)]
pub struct EndOfInput;

impl EndOfInput {
    pub fn new() -> Self {
        Self
    }
}

impl TokenParser<()> for EndOfInput {
    fn parse<'a>(&self, cursor: TokenCursor<'a>) -> TokenParseResult<'a, ()> {
        if cursor.is_eof() {
            Ok((cursor, ()))
        } else {
            mismatch(cursor, "end of input")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceRange;
    use pretty_assertions::assert_eq;

    fn dec(raw: &str) -> Decimal {
        Decimal::from_str_exact(raw).unwrap()
    }

    fn sample() -> Vec<Token> {
        vec![
            Token::keyword("amount"),
            Token::Number {
                value: dec("12.50"),
                raw: "12.50".into(),
            },
            Token::string("memo"),
            Token::DateLiteral("2025-01-20".into()),
            Token::Eof,
        ]
    }

    #[test]
    fn test_leaves_consume_one_token() {
        let input = sample();
        let cursor = TokenCursor::new(&input);

        let (cursor, name) = KeywordMatch::new("amount").parse(cursor).unwrap();
        assert_eq!(name, "amount");
        let (cursor, value) = NumberLiteral::new().parse(cursor).unwrap();
        assert_eq!(value, dec("12.50"));
        let (cursor, memo) = StringLiteral::new().parse(cursor).unwrap();
        assert_eq!(memo, "memo");
        let (cursor, date) = DateLiteral::new().parse(cursor).unwrap();
        assert_eq!(date, "2025-01-20");
        let (end, ()) = EndOfInput::new().parse(cursor).unwrap();
        assert_eq!(end.index(), 4);
    }

    #[test]
    fn test_mismatch_messages() {
        let input = sample();
        let cursor = TokenCursor::new(&input);

        let diagnostic = KeywordMatch::new("memo").parse(cursor).unwrap_err();
        assert_eq!(
            diagnostic.message,
            "unexpected keyword 'amount'; expected keyword 'memo'"
        );
        assert_eq!(diagnostic.range, Some(SourceRange::new(0, 1)));

        let diagnostic = Expect::new(TokenKind::LeftBrace).parse(cursor).unwrap_err();
        assert_eq!(diagnostic.message, "unexpected keyword 'amount'; expected '{'");

        let diagnostic = Identifier::new().parse(cursor.advance()).unwrap_err();
        assert_eq!(diagnostic.message, "unexpected number 12.50; expected identifier");

        let diagnostic = EndOfInput::new().parse(cursor).unwrap_err();
        assert_eq!(
            diagnostic.message,
            "unexpected keyword 'amount'; expected end of input"
        );
    }

    #[test]
    fn test_word_reads_keywords_as_names() {
        let input = sample();
        let cursor = TokenCursor::new(&input);
        assert!(Identifier::new().parse(cursor).is_err());
        let (next, name) = WordOrKeyword::new().parse(cursor).unwrap();
        assert_eq!((next.index(), name.as_str()), (1, "amount"));

        let input = vec![Token::identifier("cash"), Token::Comma];
        let (next, name) = WordOrKeyword::new().parse(TokenCursor::new(&input)).unwrap();
        assert_eq!(name, "cash");
        let diagnostic = WordOrKeyword::new().parse(next).unwrap_err();
        assert_eq!(diagnostic.message, "unexpected ','; expected identifier");
    }

    #[test]
    fn test_satisfy() {
        let input = sample();
        let cursor = TokenCursor::new(&input).advance().advance();
        let quoted = Satisfy::new(
            |token: &Token| match token {
                Token::String(s) => Some(s.len()),
                _ => None,
            },
            "quoted text",
        );
        assert_eq!(quoted.parse(cursor).map(|(_, len)| len), Ok(4));
        let diagnostic = quoted.parse(cursor.advance()).unwrap_err();
        assert_eq!(diagnostic.message, "unexpected date 2025-01-20; expected quoted text");
    }
}
