use std::sync::Arc;

use crate::cursor::Cursor;
use crate::diagnostic::Diagnostic;
use crate::tokenizer::token_cursor::TokenCursor;

/// Success carries the cursor after the match; failure leaves the caller's cursor untouched.
pub type ParseResult<'a, O> = Result<(Cursor<'a>, O), Diagnostic>;

pub type TokenParseResult<'a, O> = Result<(TokenCursor<'a>, O), Diagnostic>;

/// Parser over raw characters.
pub trait Parser<O> {
    fn parse<'a>(&self, cursor: Cursor<'a>) -> ParseResult<'a, O>;
}

/// Parser over a token stream.
pub trait TokenParser<O> {
    fn parse<'a>(&self, cursor: TokenCursor<'a>) -> TokenParseResult<'a, O>;
}

pub type BoxedParser<O> = Arc<dyn Parser<O> + Send + Sync>;

pub type BoxedTokenParser<O> = Arc<dyn TokenParser<O> + Send + Sync>;

impl<O, P: Parser<O> + ?Sized> Parser<O> for Arc<P> {
    fn parse<'a>(&self, cursor: Cursor<'a>) -> ParseResult<'a, O> {
        (**self).parse(cursor)
    }
}

impl<O, P: Parser<O> + ?Sized> Parser<O> for Box<P> {
    fn parse<'a>(&self, cursor: Cursor<'a>) -> ParseResult<'a, O> {
        (**self).parse(cursor)
    }
}

impl<O, P: TokenParser<O> + ?Sized> TokenParser<O> for Arc<P> {
    fn parse<'a>(&self, cursor: TokenCursor<'a>) -> TokenParseResult<'a, O> {
        (**self).parse(cursor)
    }
}

impl<O, P: TokenParser<O> + ?Sized> TokenParser<O> for Box<P> {
    fn parse<'a>(&self, cursor: TokenCursor<'a>) -> TokenParseResult<'a, O> {
        (**self).parse(cursor)
    }
}
