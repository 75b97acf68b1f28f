//! # Analyzer
//!
//! Parser combinators over two kinds of input:
//!
//! * token streams from the [`crate::tokenizer`], through [`TokenParser`] and the constructors in
//!   [`prelude`] and [`sugar`];
//! * raw characters, through [`Parser`] and [`text`].
//!
//! Both share the combinator structs in [`combinators`]. A parser takes a cursor by value and
//! returns the advanced cursor with its output, or a [`crate::Diagnostic`]:
//!
//! ```text
//! let assignment = then(skip(identifier(), expect(TokenKind::Equals)), number());
//! let (rest, (name, value)) = assignment.parse(stream.cursor())?;
//! ```
//!
//! Alternation retries from the original cursor unless the failure was marked committed by
//! [`prelude::cut`].

pub mod combinators;
pub mod core;
pub mod prelude;
pub mod primitives;
pub mod sugar;
pub mod text;

pub use core::{
    BoxedParser, BoxedTokenParser, ParseResult, Parser, TokenParseResult, TokenParser,
};
pub use sugar::DelimiterKind;
