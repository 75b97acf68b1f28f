//! # Tokenizer
//!
//! Turns source text into a [`Token`] stream.
//!
//! ## Normal scanning
//!
//! Outside block strings the [`Lexer`] recognizes, in order of precedence:
//!
//! * Trivia: whitespace, newlines (CRLF and CR normalized to LF) and comments. Each kind is
//!   emitted or skipped per [`LexerOptions`].
//! * Date literals shaped like `2025-01-20`, `2025/01/20` or `2025.01.20`.
//! * Double-quoted strings with `\n`, `\t`, `\"` and `\\` escapes.
//! * Punctuation, including `->`.
//! * Exact decimal numbers.
//! * Words, classified through [`LexingSets`] as keywords or identifiers.
//!
//! ## Block strings
//!
//! A word in the string-block keyword set switches the lexer into a three-step mode. It emits
//! the opening delimiter, then the whole body as one [`Token::String`], then the closing
//! delimiter. The [`BlockPolicyTable`] decides per keyword which delimiter is used and how the
//! body is post-processed:
//!
//! ```text
//! details { "Paid\nin full" }
//! => Keyword(details) LeftBrace String("Paid⏎in full") RightBrace
//! ```
//!
//! ## Errors
//!
//! Lexical errors are [`LexerError`] values. [`LexerConfig`] chooses whether they are returned,
//! emitted as [`Token::Error`], or reported to a callback.

pub mod config;
pub mod delimiter;
pub mod error;
pub mod lexer;
pub mod readers;
pub mod token;
pub mod token_cursor;

pub use config::{
    CommentSignature, LexerConfig, LexerErrorStrategy, LexerOptions, LexingSets, WordClass,
};
pub use delimiter::{BlockPolicyTable, BlockStringOptions, BlockStringPolicy, Delimiter};
pub use error::LexerError;
pub use lexer::{BlockState, Lexer};
pub use token::{Token, TokenKind, TokenSpan};
pub use token_cursor::{TokenCursor, TokenStream};
