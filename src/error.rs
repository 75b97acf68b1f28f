use thiserror::Error;

use crate::diagnostic::Diagnostic;
use crate::tokenizer::error::LexerError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Lex error: {0}")]
    Lex(#[from] LexerError),
    #[error("Parse error: {0}")]
    Parse(#[from] Diagnostic),
    #[error("model decode failed: {0}")]
    Decode(#[from] DecodeError),
    #[error("Trailing input: {found} at token {index}")]
    TrailingInput { index: usize, found: String },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Failure turning a folded [`crate::SyntaxNode`] into a typed model.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("missing field '{0}'")]
    MissingField(String),
    #[error("field '{field}' is not {expected}")]
    WrongShape { field: String, expected: String },
    #[error("field '{field}': {message}")]
    InvalidValue { field: String, message: String },
    #[error("{0}")]
    Custom(String),
}

impl DecodeError {
    pub fn missing(field: impl Into<String>) -> Self {
        DecodeError::MissingField(field.into())
    }

    pub fn wrong_shape(field: impl Into<String>, expected: impl Into<String>) -> Self {
        DecodeError::WrongShape {
            field: field.into(),
            expected: expected.into(),
        }
    }

    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        DecodeError::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn custom<S: Into<String>>(message: S) -> Self {
        DecodeError::Custom(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_display() {
        let error = Error::from(DecodeError::missing("amount"));
        assert_eq!(error.to_string(), "model decode failed: missing field 'amount'");

        let error = Error::from(DecodeError::wrong_shape("lines", "a list"));
        assert_eq!(
            error.to_string(),
            "model decode failed: field 'lines' is not a list"
        );
    }

    #[test]
    fn test_parse_error_wraps_diagnostic() {
        let error = Error::from(Diagnostic::expected("number", 3));
        assert_eq!(error.to_string(), "Parse error: error: expected number [3-4]");
    }
}
