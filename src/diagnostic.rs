//! Parser failures as values.
//!
//! Every combinator failure is a [`Diagnostic`]. The `committed` flag is how `cut` tells an
//! enclosing alternation to stop trying siblings; it is carried next to the message, never
//! encoded inside it.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;

use crate::source::SourceRange;
use crate::tokenizer::token::Token;
use crate::tokenizer::token_cursor::TokenCursor;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Error,
    Warning,
    Note,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{severity}: {message}{}", range_suffix(.range))]
pub struct Diagnostic {
    pub message: String,
    pub severity: Severity,
    pub range: Option<SourceRange>,
    /// Set by `cut`; alternations propagate committed failures instead of retrying.
    pub committed: bool,
}

fn range_suffix(range: &Option<SourceRange>) -> String {
    range.map(|r| format!(" [{}]", r)).unwrap_or_default()
}

impl Diagnostic {
    pub fn new(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            message: message.into(),
            severity,
            range: None,
            committed: false,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Error)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Warning)
    }

    pub fn note(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Note)
    }

    /// "expected {what}" anchored at the token (or character) at `index`.
    pub fn expected(what: impl AsRef<str>, index: usize) -> Self {
        Self::error(format!("expected {}", what.as_ref()))
            .with_range(SourceRange::new(index, index + 1))
    }

    /// "unexpected {found}; expected {what}" anchored at `index`.
    pub fn unexpected(found: &Token, what: impl AsRef<str>, index: usize) -> Self {
        Self::error(format!("unexpected {}; expected {}", found, what.as_ref()))
            .with_range(SourceRange::new(index, index + 1))
    }

    pub fn with_range(mut self, range: SourceRange) -> Self {
        self.range = Some(range);
        self
    }

    pub fn with_range_if_absent(mut self, range: SourceRange) -> Self {
        self.range.get_or_insert(range);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn commit(mut self) -> Self {
        self.committed = true;
        self
    }

    pub fn is_committed(&self) -> bool {
        self.committed
    }

    /// Formats the diagnostic with the source line of `range.start`, e.g.
    /// `error: expected number @ ledger.txt:4:1`.
    ///
    /// The start index is clamped into the cursor's line map. Without a range or a line map the
    /// location is omitted.
    pub fn render(&self, cursor: &TokenCursor<'_>) -> String {
        let location = self
            .range
            .and_then(|range| cursor.clamped_location(range.start, 1));
        match location {
            Some(location) => format!("{}: {} @ {}", self.severity, self.message, location),
            None => format!("{}: {}", self.severity, self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::token_cursor::TokenStream;

    #[test]
    fn test_display_with_and_without_range() {
        let plain = Diagnostic::warning("unused field");
        assert_eq!(plain.to_string(), "warning: unused field");

        let ranged = Diagnostic::error("expected number").with_range(SourceRange::new(3, 4));
        assert_eq!(ranged.to_string(), "error: expected number [3-4]");
    }

    #[test]
    fn test_commit_keeps_message() {
        let diagnostic = Diagnostic::expected("identifier", 2).commit();
        assert!(diagnostic.is_committed());
        assert_eq!(diagnostic.message, "expected identifier");
    }

    #[test]
    fn test_render_clamps_into_line_map() {
        let stream = TokenStream::new(
            vec![
                Token::Identifier("a".into()),
                Token::Newline,
                Token::Identifier("b".into()),
                Token::Eof,
            ],
            Some(vec![1, 1, 2, 2]),
            Some("input.dsl".into()),
        );
        let cursor = stream.cursor();

        let at_b = Diagnostic::expected("number", 2);
        assert_eq!(at_b.render(&cursor), "error: expected number @ input.dsl:2:1");

        let past_end = Diagnostic::error("trailing").with_range(SourceRange::at(40));
        assert_eq!(past_end.render(&cursor), "error: trailing @ input.dsl:2:1");

        let unranged = Diagnostic::note("no position");
        assert_eq!(unranged.render(&cursor), "note: no position");
    }
}
