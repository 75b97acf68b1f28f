use thiserror::Error;

use crate::source::SourceLocation;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexerError {
    #[error("unexpected end of input while reading {context} at {at}")]
    UnexpectedEof { context: String, at: SourceLocation },
    #[error("unterminated block: expected '{delimiter}' at {at}")]
    Unterminated {
        delimiter: String,
        at: SourceLocation,
    },
    #[error("invalid escape sequence '\\{sequence}' at {at}")]
    InvalidEscape { sequence: char, at: SourceLocation },
    #[error("invalid number '{raw}' at {at}")]
    InvalidNumber { raw: String, at: SourceLocation },
    #[error("invalid date literal '{raw}' at {at}")]
    InvalidDateLiteral { raw: String, at: SourceLocation },
    #[error("unexpected character '{found}' at {at}")]
    UnexpectedCharacter { found: char, at: SourceLocation },
    #[error("{message} at {at}")]
    Message { message: String, at: SourceLocation },
}

impl LexerError {
    pub fn location(&self) -> &SourceLocation {
        match self {
            LexerError::UnexpectedEof { at, .. }
            | LexerError::Unterminated { at, .. }
            | LexerError::InvalidEscape { at, .. }
            | LexerError::InvalidNumber { at, .. }
            | LexerError::InvalidDateLiteral { at, .. }
            | LexerError::UnexpectedCharacter { at, .. }
            | LexerError::Message { at, .. } => at,
        }
    }

    pub fn message(message: impl Into<String>, at: SourceLocation) -> Self {
        LexerError::Message {
            message: message.into(),
            at,
        }
    }
}
