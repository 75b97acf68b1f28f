//! # parsekit: lexing and parsing toolkit
//!
//! parsekit turns text into typed models through three layers.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Source Text → Lexer → Token Stream → Token Parsers → SyntaxNode → Model
//! ```
//!
//! ### Stage 1: Tokenization
//!
//! The [`tokenizer`] module turns raw text into [`Token`]s. Keywords, trivia emission, comment
//! signatures and block-string policies are configured per lexer; block strings such as
//! `details { ... }` are read verbatim by a small state machine.
//!
//! ### Stage 2: Parsing
//!
//! The [`analyzer`] module holds parser combinators over the token stream, and over raw
//! characters through [`cursor::Cursor`]. Failures are [`Diagnostic`] values; `cut` marks them
//! committed so alternations stop retrying.
//!
//! ### Stage 3: Grammars
//!
//! The [`grammar`] module compiles data-only node and field descriptions into token parsers
//! that produce a generic [`SyntaxNode`] tree. Types implementing [`DynamicallyParsable`] decode
//! themselves from that tree.
//!
//! ## Errors
//!
//! Each layer has its own error type ([`LexerError`], [`Diagnostic`], [`DecodeError`]);
//! [`Error`] wraps them for callers going from text to model in one step.

pub mod analyzer;
pub mod cursor;
pub mod diagnostic;
pub mod error;
pub mod grammar;
pub mod source;
pub mod tokenizer;

// Re-exports
pub use diagnostic::{Diagnostic, Severity};
pub use error::{DecodeError, Error, Result};
pub use grammar::{
    DynamicallyParsable, Grammar, GrammarCompiler, GrammarField, GrammarNode, GrammarResult,
    GrammarValue, ParserComponents, SyntaxNode,
};
pub use source::{SourceLocation, SourceRange};
pub use tokenizer::{Lexer, LexerError, LexerOptions, LexingSets, Token, TokenKind, TokenStream};

#[cfg(test)]
mod tests {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    #[ctor::ctor]
    fn init_tests() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .expect("Failed to set tracing subscriber");
    }
}
