use std::fmt;

use rust_decimal::Decimal;
use strum_macros::EnumDiscriminants;

use crate::source::SourceLocation;

/// A lexed token.
///
/// [`TokenKind`] is the field-less twin of this enum, used wherever only the case matters
/// (`expect(TokenKind::Comma)`, [`Token::same_kind`]).
#[derive(Debug, Clone, PartialEq, Eq, EnumDiscriminants)]
#[strum_discriminants(name(TokenKind), derive(Hash))]
pub enum Token {
    // Words and literals
    Keyword(String),
    Identifier(String),
    /// Exact decimal value plus the text it was read from.
    Number {
        value: Decimal,
        raw: String,
    },
    String(String),
    DateLiteral(String),
    // Trivia
    Whitespace(String),
    Newline,
    LineComment(String),
    BlockComment(String),
    // Punctuation
    LeftBrace,
    RightBrace,
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    LessThan,
    GreaterThan,
    Arrow,
    Dot,
    Equals,
    Comma,
    Hash,
    Dollar,
    At,
    Percent,
    Asterisk,
    Ampersand,
    Plus,
    Dash,
    Underscore,
    Tilde,
    Colon,
    Semicolon,
    Pipe,
    Slash,
    Backslash,
    DoubleQuote,
    SingleQuote,
    // Control
    Eof,
    Error {
        message: String,
        at: SourceLocation,
    },
}

impl Token {
    pub fn keyword(name: impl Into<String>) -> Self {
        Token::Keyword(name.into())
    }

    pub fn identifier(name: impl Into<String>) -> Self {
        Token::Identifier(name.into())
    }

    pub fn string(content: impl Into<String>) -> Self {
        Token::String(content.into())
    }

    pub fn number(value: Decimal) -> Self {
        Token::Number {
            raw: value.to_string(),
            value,
        }
    }

    /// Single-character punctuation. `->` is produced by the lexer directly.
    pub fn punctuation(c: char) -> Option<Token> {
        let token = match c {
            '{' => Token::LeftBrace,
            '}' => Token::RightBrace,
            '(' => Token::LeftParen,
            ')' => Token::RightParen,
            '[' => Token::LeftBracket,
            ']' => Token::RightBracket,
            '<' => Token::LessThan,
            '>' => Token::GreaterThan,
            '.' => Token::Dot,
            '=' => Token::Equals,
            ',' => Token::Comma,
            '#' => Token::Hash,
            '$' => Token::Dollar,
            '@' => Token::At,
            '%' => Token::Percent,
            '*' => Token::Asterisk,
            '&' => Token::Ampersand,
            '+' => Token::Plus,
            '-' => Token::Dash,
            '_' => Token::Underscore,
            '~' => Token::Tilde,
            ':' => Token::Colon,
            ';' => Token::Semicolon,
            '|' => Token::Pipe,
            '/' => Token::Slash,
            '\\' => Token::Backslash,
            '"' => Token::DoubleQuote,
            '\'' => Token::SingleQuote,
            _ => return None,
        };
        Some(token)
    }

    pub fn kind(&self) -> TokenKind {
        TokenKind::from(self)
    }

    /// Compares cases only, ignoring payloads.
    pub fn same_kind(&self, other: &Token) -> bool {
        self.kind() == other.kind()
    }

    pub fn is_trivia(&self) -> bool {
        self.kind().is_trivia()
    }

    pub fn is_punctuation(&self) -> bool {
        self.kind().symbol().is_some()
    }

    pub fn is_eof(&self) -> bool {
        matches!(self, Token::Eof)
    }

    /// Text carried by the token: string content, raw number text, the punctuation symbol.
    pub fn text(&self) -> String {
        match self {
            Token::Keyword(s)
            | Token::Identifier(s)
            | Token::String(s)
            | Token::DateLiteral(s)
            | Token::Whitespace(s)
            | Token::LineComment(s)
            | Token::BlockComment(s) => s.clone(),
            Token::Number { raw, .. } => raw.clone(),
            Token::Newline => "\n".to_string(),
            Token::Eof => String::new(),
            Token::Error { message, .. } => message.clone(),
            other => other.kind().symbol().unwrap_or_default().to_string(),
        }
    }

    /// Source text that lexes back to this token.
    ///
    /// Strings are re-quoted and re-escaped; comments get `//` and `/* */` markers.
    pub fn lexeme(&self) -> String {
        match self {
            Token::String(content) => {
                let mut out = String::with_capacity(content.len() + 2);
                out.push('"');
                for c in content.chars() {
                    match c {
                        '"' => out.push_str("\\\""),
                        '\\' => out.push_str("\\\\"),
                        '\n' => out.push_str("\\n"),
                        '\t' => out.push_str("\\t"),
                        c => out.push(c),
                    }
                }
                out.push('"');
                out
            }
            Token::LineComment(content) => format!("//{}", content),
            Token::BlockComment(content) => format!("/*{}*/", content),
            other => other.text(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Keyword(s) => write!(f, "keyword '{}'", s),
            Token::Identifier(s) => write!(f, "identifier '{}'", s),
            Token::Number { raw, .. } => write!(f, "number {}", raw),
            Token::String(s) => write!(f, "string {:?}", s),
            Token::DateLiteral(s) => write!(f, "date {}", s),
            Token::Error { message, at } => write!(f, "error '{}' at {}", message, at),
            other => write!(f, "{}", other.kind()),
        }
    }
}

impl TokenKind {
    pub fn symbol(&self) -> Option<&'static str> {
        let symbol = match self {
            TokenKind::LeftBrace => "{",
            TokenKind::RightBrace => "}",
            TokenKind::LeftParen => "(",
            TokenKind::RightParen => ")",
            TokenKind::LeftBracket => "[",
            TokenKind::RightBracket => "]",
            TokenKind::LessThan => "<",
            TokenKind::GreaterThan => ">",
            TokenKind::Arrow => "->",
            TokenKind::Dot => ".",
            TokenKind::Equals => "=",
            TokenKind::Comma => ",",
            TokenKind::Hash => "#",
            TokenKind::Dollar => "$",
            TokenKind::At => "@",
            TokenKind::Percent => "%",
            TokenKind::Asterisk => "*",
            TokenKind::Ampersand => "&",
            TokenKind::Plus => "+",
            TokenKind::Dash => "-",
            TokenKind::Underscore => "_",
            TokenKind::Tilde => "~",
            TokenKind::Colon => ":",
            TokenKind::Semicolon => ";",
            TokenKind::Pipe => "|",
            TokenKind::Slash => "/",
            TokenKind::Backslash => "\\",
            TokenKind::DoubleQuote => "\"",
            TokenKind::SingleQuote => "'",
            _ => return None,
        };
        Some(symbol)
    }

    pub fn is_trivia(&self) -> bool {
        matches!(
            self,
            TokenKind::Whitespace
                | TokenKind::Newline
                | TokenKind::LineComment
                | TokenKind::BlockComment
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(symbol) = self.symbol() {
            return write!(f, "'{}'", symbol);
        }
        let name = match self {
            TokenKind::Keyword => "keyword",
            TokenKind::Identifier => "identifier",
            TokenKind::Number => "number",
            TokenKind::String => "string",
            TokenKind::DateLiteral => "date literal",
            TokenKind::Whitespace => "whitespace",
            TokenKind::Newline => "newline",
            TokenKind::LineComment => "line comment",
            TokenKind::BlockComment => "block comment",
            TokenKind::Eof => "end of input",
            _ => "error",
        };
        f.write_str(name)
    }
}

/// A token together with where it was read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSpan {
    pub token: Token,
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_kind_ignores_payload() {
        assert!(Token::identifier("a").same_kind(&Token::identifier("b")));
        assert!(!Token::identifier("a").same_kind(&Token::keyword("a")));
        assert!(!Token::LessThan.same_kind(&Token::GreaterThan));
    }

    #[test]
    fn test_punctuation_round_trip() {
        for c in "{}()[]<>.=,#$@%*&+-_~:;|/\\\"'".chars() {
            let token = Token::punctuation(c).unwrap();
            assert!(token.is_punctuation());
            assert_eq!(token.text(), c.to_string());
        }
        assert_eq!(Token::punctuation('?'), None);
        assert_eq!(Token::Arrow.text(), "->");
    }

    #[test]
    fn test_lexeme_requotes_strings() {
        let token = Token::string("say \"hi\"\n");
        assert_eq!(token.text(), "say \"hi\"\n");
        assert_eq!(token.lexeme(), r#""say \"hi\"\n""#);
        assert_eq!(Token::LineComment(" note".into()).lexeme(), "// note");
    }

    #[test]
    fn test_display_descriptions() {
        assert_eq!(Token::identifier("amount").to_string(), "identifier 'amount'");
        assert_eq!(Token::Comma.to_string(), "','");
        assert_eq!(Token::Eof.to_string(), "end of input");
        assert_eq!(TokenKind::Number.to_string(), "number");
    }

    #[test]
    fn test_trivia_classification() {
        assert!(Token::Newline.is_trivia());
        assert!(Token::Whitespace(" ".into()).is_trivia());
        assert!(!Token::Semicolon.is_trivia());
    }
}
