use crate::source::SourceLocation;

use super::token::{Token, TokenSpan};

static EOF: Token = Token::Eof;

/// Owned lexer output: tokens, the line each token starts on, and the source file name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TokenStream {
    tokens: Vec<Token>,
    line_map: Option<Vec<usize>>,
    file: Option<String>,
}

impl TokenStream {
    pub fn new(tokens: Vec<Token>, line_map: Option<Vec<usize>>, file: Option<String>) -> Self {
        Self {
            tokens,
            line_map,
            file,
        }
    }

    pub fn from_tokens(tokens: Vec<Token>) -> Self {
        Self::new(tokens, None, None)
    }

    pub fn from_spans(spans: Vec<TokenSpan>, file: Option<String>) -> Self {
        let (tokens, lines) = spans
            .into_iter()
            .map(|span| (span.token, span.line))
            .unzip();
        Self::new(tokens, Some(lines), file)
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn line_map(&self) -> Option<&[usize]> {
        self.line_map.as_deref()
    }

    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Drops trivia tokens, optionally keeping newlines, and keeps the line map aligned.
    pub fn without_trivia(self, keep_newlines: bool) -> Self {
        let keep = |token: &Token| !token.is_trivia() || (keep_newlines && *token == Token::Newline);
        match self.line_map {
            Some(lines) => {
                let (tokens, lines) = self
                    .tokens
                    .into_iter()
                    .zip(lines)
                    .filter(|(token, _)| keep(token))
                    .unzip();
                Self::new(tokens, Some(lines), self.file)
            }
            None => Self::new(
                self.tokens.into_iter().filter(|t| keep(t)).collect(),
                None,
                self.file,
            ),
        }
    }

    pub fn cursor(&self) -> TokenCursor<'_> {
        TokenCursor {
            tokens: &self.tokens,
            line_map: self.line_map.as_deref(),
            file: self.file.as_deref(),
            index: 0,
        }
    }
}

/// Read position over a token slice.
///
/// `Copy`; advancing returns a new cursor and never touches the one it came from, so any saved
/// copy is a backtracking point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenCursor<'a> {
    tokens: &'a [Token],
    line_map: Option<&'a [usize]>,
    file: Option<&'a str>,
    index: usize,
}

impl<'a> TokenCursor<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            line_map: None,
            file: None,
            index: 0,
        }
    }

    pub fn with_line_map(mut self, line_map: &'a [usize]) -> Self {
        self.line_map = Some(line_map);
        self
    }

    pub fn with_file(mut self, file: &'a str) -> Self {
        self.file = Some(file);
        self
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn file(&self) -> Option<&'a str> {
        self.file
    }

    /// Current token; [`Token::Eof`] once past the slice.
    pub fn peek(&self) -> &'a Token {
        self.peek_ahead(0)
    }

    pub fn peek_ahead(&self, n: usize) -> &'a Token {
        self.tokens.get(self.index + n).unwrap_or(&EOF)
    }

    pub fn advance(self) -> Self {
        Self {
            index: (self.index + 1).min(self.tokens.len()),
            ..self
        }
    }

    pub fn is_eof(&self) -> bool {
        self.peek().is_eof()
    }

    /// Tokens not yet consumed.
    pub fn remaining(&self) -> &'a [Token] {
        &self.tokens[self.index.min(self.tokens.len())..]
    }

    pub fn mark(&self) -> usize {
        self.index
    }

    pub fn restore(self, mark: usize) -> Self {
        Self {
            index: mark.min(self.tokens.len()),
            ..self
        }
    }

    /// Location of the current token at column 1.
    pub fn location(&self) -> Option<SourceLocation> {
        self.location_at(self.index, 1)
    }

    /// Location of the token at `index`; `None` without a line map or outside it.
    pub fn location_at(&self, index: usize, column: usize) -> Option<SourceLocation> {
        let line = *self.line_map?.get(index)?;
        Some(self.make_location(line, column))
    }

    /// Like [`Self::location_at`], but an index past the map resolves to its last line.
    pub(crate) fn clamped_location(&self, index: usize, column: usize) -> Option<SourceLocation> {
        let map = self.line_map?;
        let last = map.len().checked_sub(1)?;
        Some(self.make_location(map[index.min(last)], column))
    }

    fn make_location(&self, line: usize, column: usize) -> SourceLocation {
        SourceLocation {
            file: self.file.map(str::to_string),
            line,
            column,
        }
    }
}
