use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::delimiter::BlockPolicyTable;
use super::error::LexerError;

/// How a comment starts (and, for blocks, ends).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CommentSignature {
    Line {
        prefix: String,
    },
    Block {
        start: String,
        end: String,
        #[serde(default)]
        nesting: bool,
    },
}

impl CommentSignature {
    pub fn line(prefix: impl Into<String>) -> Self {
        CommentSignature::Line {
            prefix: prefix.into(),
        }
    }

    pub fn block(start: impl Into<String>, end: impl Into<String>, nesting: bool) -> Self {
        CommentSignature::Block {
            start: start.into(),
            end: end.into(),
            nesting,
        }
    }

    /// `//`, `#` and non-nesting `/* */`.
    pub fn defaults() -> Vec<CommentSignature> {
        vec![
            CommentSignature::line("//"),
            CommentSignature::line("#"),
            CommentSignature::block("/*", "*/", false),
        ]
    }
}

/// Word classification tables.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LexingSets {
    #[serde(default)]
    pub keywords: HashSet<String>,
    /// Words that emit a keyword and then switch the lexer into block-string mode.
    #[serde(default)]
    pub string_block_keywords: HashSet<String>,
    /// Words always read as identifiers.
    #[serde(default)]
    pub identifiers: HashSet<String>,
}

/// How a word read during normal scanning is emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordClass {
    BlockKeyword,
    Keyword,
    Identifier,
}

impl LexingSets {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keywords: keywords.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_block_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.string_block_keywords
            .extend(keywords.into_iter().map(Into::into));
        self
    }

    pub fn with_identifiers<I, S>(mut self, identifiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.identifiers
            .extend(identifiers.into_iter().map(Into::into));
        self
    }

    /// Block keywords win over plain keywords so a word registered in both still opens a block.
    pub fn classify(&self, word: &str) -> WordClass {
        if self.string_block_keywords.contains(word) {
            WordClass::BlockKeyword
        } else if self.keywords.contains(word) && !self.identifiers.contains(word) {
            WordClass::Keyword
        } else {
            WordClass::Identifier
        }
    }
}

/// Serializable lexer options: trivia emission, comment signatures and block policies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexerOptions {
    #[serde(default)]
    pub emit_whitespace: bool,
    #[serde(default = "default_true")]
    pub emit_newlines: bool,
    #[serde(default)]
    pub emit_comments: bool,
    #[serde(default = "default_true")]
    pub normalize_newlines: bool,
    #[serde(default = "CommentSignature::defaults")]
    pub comments: Vec<CommentSignature>,
    #[serde(default)]
    pub block_policies: BlockPolicyTable,
}

impl Default for LexerOptions {
    fn default() -> Self {
        Self {
            emit_whitespace: false,
            emit_newlines: default_true(),
            emit_comments: false,
            normalize_newlines: default_true(),
            comments: CommentSignature::defaults(),
            block_policies: BlockPolicyTable::default(),
        }
    }
}

impl LexerOptions {
    /// Emits every kind of trivia.
    pub fn verbatim() -> Self {
        Self {
            emit_whitespace: true,
            emit_newlines: true,
            emit_comments: true,
            ..Self::default()
        }
    }

    /// Skips every kind of trivia.
    pub fn compact() -> Self {
        Self {
            emit_whitespace: false,
            emit_newlines: false,
            emit_comments: false,
            ..Self::default()
        }
    }
}

pub type DiagnosticCallback = Arc<dyn Fn(&LexerError) + Send + Sync>;

/// What the lexer does with an error.
#[derive(Clone, Default)]
pub enum LexerErrorStrategy {
    /// `next_token` returns the error.
    #[default]
    Raise,
    /// Emit [`super::token::Token::Error`] and keep scanning.
    ErrorToken,
    /// Report through the callback, then end the stream.
    Diagnose(DiagnosticCallback),
}

impl LexerErrorStrategy {
    pub fn diagnose(callback: impl Fn(&LexerError) + Send + Sync + 'static) -> Self {
        LexerErrorStrategy::Diagnose(Arc::new(callback))
    }
}

impl fmt::Debug for LexerErrorStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexerErrorStrategy::Raise => f.write_str("Raise"),
            LexerErrorStrategy::ErrorToken => f.write_str("ErrorToken"),
            LexerErrorStrategy::Diagnose(_) => f.write_str("Diagnose(..)"),
        }
    }
}

/// Runtime lexer behavior.
#[derive(Debug, Clone)]
pub struct LexerConfig {
    pub error_strategy: LexerErrorStrategy,
    /// Resolve escapes inside double-quoted strings; when off the raw text is kept.
    pub unescape_strings: bool,
    /// Report stray characters, unknown escapes and impossible dates instead of tolerating them.
    pub strict: bool,
}

impl Default for LexerConfig {
    fn default() -> Self {
        Self {
            error_strategy: LexerErrorStrategy::Raise,
            unescape_strings: true,
            strict: false,
        }
    }
}

impl LexerConfig {
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Self::default()
        }
    }

    pub fn with_error_strategy(mut self, strategy: LexerErrorStrategy) -> Self {
        self.error_strategy = strategy;
        self
    }
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_classify_priority() {
        let sets = LexingSets::new(["entry", "details", "amount"])
            .with_block_keywords(["details"])
            .with_identifiers(["amount"]);

        assert_eq!(sets.classify("details"), WordClass::BlockKeyword);
        assert_eq!(sets.classify("entry"), WordClass::Keyword);
        assert_eq!(sets.classify("amount"), WordClass::Identifier);
        assert_eq!(sets.classify("other"), WordClass::Identifier);
    }

    #[test]
    fn test_options_defaults_from_empty_json() {
        let options: LexerOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, LexerOptions::default());
        assert!(options.emit_newlines);
        assert!(!options.emit_comments);
        assert_eq!(options.comments.len(), 3);
    }

    #[test]
    fn test_comment_signature_json() {
        let signature: CommentSignature =
            serde_json::from_str(r#"{ "type": "block", "start": "(*", "end": "*)" }"#).unwrap();
        assert_eq!(signature, CommentSignature::block("(*", "*)", false));
    }
}
