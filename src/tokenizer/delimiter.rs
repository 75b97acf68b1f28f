//! Delimiter pairs and the block-string policy table.

use serde::{Deserialize, Serialize};

use super::token::Token;

/// A start/end literal pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Delimiter {
    pub start: String,
    pub end: String,
    #[serde(default = "default_true")]
    pub allows_nesting: bool,
}

impl Delimiter {
    pub fn new(start: impl Into<String>, end: impl Into<String>, allows_nesting: bool) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
            allows_nesting,
        }
    }

    pub fn braces() -> Self {
        Self::new("{", "}", true)
    }

    pub fn brackets() -> Self {
        Self::new("[", "]", true)
    }

    pub fn parens() -> Self {
        Self::new("(", ")", true)
    }

    pub fn angle() -> Self {
        Self::new("<", ">", true)
    }

    pub fn double_quotes() -> Self {
        Self::new("\"", "\"", false)
    }

    pub fn single_quotes() -> Self {
        Self::new("'", "'", false)
    }

    /// Punctuation token emitted for the opening literal; unknown openers map to `{`.
    pub fn open_token(&self) -> Token {
        match self.start.as_str() {
            "[" => Token::LeftBracket,
            "(" => Token::LeftParen,
            "<" => Token::LessThan,
            _ => Token::LeftBrace,
        }
    }

    /// Punctuation token emitted for the closing literal; unknown closers map to `}`.
    pub fn close_token(&self) -> Token {
        match self.end.as_str() {
            "]" => Token::RightBracket,
            ")" => Token::RightParen,
            ">" => Token::GreaterThan,
            _ => Token::RightBrace,
        }
    }
}

impl Default for Delimiter {
    fn default() -> Self {
        Self::braces()
    }
}

/// Post-processing applied to a block-string body, in field order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BlockStringOptions {
    #[serde(default)]
    pub normalize_newlines: bool,
    #[serde(default)]
    pub trim_whitespace: bool,
    #[serde(default)]
    pub unquote_if_quoted: bool,
    #[serde(default)]
    pub unescape_common: bool,
}

impl BlockStringOptions {
    /// Trim, unquote, unescape and normalize.
    pub fn details() -> Self {
        Self {
            normalize_newlines: true,
            trim_whitespace: true,
            unquote_if_quoted: true,
            unescape_common: true,
        }
    }

    /// Trim and normalize only.
    pub fn trimmed() -> Self {
        Self {
            normalize_newlines: true,
            trim_whitespace: true,
            ..Self::default()
        }
    }

    pub fn apply(&self, body: &str) -> String {
        let mut text = if self.normalize_newlines {
            normalize_newlines(body)
        } else {
            body.to_string()
        };
        if self.trim_whitespace {
            text = text.trim().to_string();
        }
        if self.unquote_if_quoted && text.len() >= 2 && text.starts_with('"') && text.ends_with('"')
        {
            text = text[1..text.len() - 1].to_string();
        }
        if self.unescape_common {
            text = unescape_common(&text);
        }
        text
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BlockStringPolicy {
    #[serde(default)]
    pub delimiter: Delimiter,
    #[serde(default)]
    pub options: BlockStringOptions,
}

impl BlockStringPolicy {
    pub fn new(delimiter: Delimiter, options: BlockStringOptions) -> Self {
        Self { delimiter, options }
    }
}

/// Keyword sets mapped to policies. The first entry whose set contains the keyword wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockPolicyTable {
    #[serde(default)]
    pub entries: Vec<(Vec<String>, BlockStringPolicy)>,
    #[serde(default = "default_fallback_policy")]
    pub fallback: BlockStringPolicy,
}

impl BlockPolicyTable {
    pub fn new(fallback: BlockStringPolicy) -> Self {
        Self {
            entries: Vec::new(),
            fallback,
        }
    }

    pub fn with_entry<I, S>(mut self, keywords: I, policy: BlockStringPolicy) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entries
            .push((keywords.into_iter().map(Into::into).collect(), policy));
        self
    }

    pub fn policy_for(&self, keyword: &str) -> &BlockStringPolicy {
        self.entries
            .iter()
            .find(|(keywords, _)| keywords.iter().any(|k| k == keyword))
            .map(|(_, policy)| policy)
            .unwrap_or(&self.fallback)
    }
}

impl Default for BlockPolicyTable {
    /// `details` gets the full treatment, `raw` gets none, anything else is trimmed.
    fn default() -> Self {
        Self::new(default_fallback_policy())
            .with_entry(
                ["details"],
                BlockStringPolicy::new(Delimiter::braces(), BlockStringOptions::details()),
            )
            .with_entry(
                ["raw"],
                BlockStringPolicy::new(Delimiter::braces(), BlockStringOptions::default()),
            )
    }
}

fn default_true() -> bool {
    true
}

fn default_fallback_policy() -> BlockStringPolicy {
    BlockStringPolicy::new(Delimiter::braces(), BlockStringOptions::trimmed())
}

/// CRLF and lone CR become LF.
pub fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Resolves `\n`, `\t`, `\"` and `\\`. Any other escaped character stands for itself.
pub fn unescape_common(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_policy_lookup_first_match_wins() {
        let special = BlockStringPolicy::new(Delimiter::brackets(), BlockStringOptions::default());
        let table = BlockPolicyTable::default()
            .with_entry(["details", "notes"], special.clone());

        assert_eq!(table.policy_for("details").options, BlockStringOptions::details());
        assert_eq!(table.policy_for("notes"), &special);
        assert_eq!(table.policy_for("memo").options, BlockStringOptions::trimmed());
    }

    #[test]
    fn test_apply_order() {
        let body = "  \"line\\none\"\r\n ";
        assert_eq!(BlockStringOptions::details().apply(body), "line\none");
        assert_eq!(BlockStringOptions::trimmed().apply(body), "\"line\\none\"");
        assert_eq!(BlockStringOptions::default().apply(body), body);
    }

    #[test]
    fn test_unquote_needs_two_chars() {
        let options = BlockStringOptions {
            unquote_if_quoted: true,
            ..Default::default()
        };
        assert_eq!(options.apply("\""), "\"");
        assert_eq!(options.apply("\"\""), "");
    }

    #[test]
    fn test_unescape_passthrough() {
        assert_eq!(unescape_common(r#"a\tb\"c\\d\qe\"#), "a\tb\"c\\dqe\\");
    }

    #[test]
    fn test_open_close_tokens() {
        assert_eq!(Delimiter::brackets().open_token(), Token::LeftBracket);
        assert_eq!(Delimiter::angle().close_token(), Token::GreaterThan);
        assert_eq!(Delimiter::double_quotes().open_token(), Token::LeftBrace);
    }

    #[test]
    fn test_policy_table_from_json() {
        let table: BlockPolicyTable = serde_json::from_str(
            r#"{ "entries": [[["sql"], { "options": { "trim_whitespace": true } }]] }"#,
        )
        .unwrap();
        assert!(table.policy_for("sql").options.trim_whitespace);
        assert_eq!(table.policy_for("sql").delimiter, Delimiter::braces());
        assert_eq!(table.fallback.options, BlockStringOptions::trimmed());
    }
}
