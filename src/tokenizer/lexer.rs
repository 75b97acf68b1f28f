use rust_decimal::Decimal;

use super::config::{
    CommentSignature, LexerConfig, LexerErrorStrategy, LexerOptions, LexingSets, WordClass,
};
use super::delimiter::{BlockStringPolicy, Delimiter};
use super::error::LexerError;
use super::readers::{
    read_block_comment, read_date_literal, read_identifier,
    read_line_comment, read_newline, read_number, read_quoted, read_whitespace, QuotedError,
};
use super::token::{Token, TokenSpan};
use super::token_cursor::TokenStream;
use crate::cursor::Cursor;
use crate::source::SourceLocation;

/// Where the lexer is inside a block string such as `details { ... }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockState {
    #[default]
    None,
    /// A block keyword was emitted; the opening delimiter comes next.
    AwaitingOpen,
    /// The opening delimiter was emitted; the body comes next.
    AwaitingContent,
    /// The body was emitted; the closing delimiter comes next.
    AwaitingClose,
}

/// Pull-based lexer producing one [`Token`] per call to [`Lexer::next_token`].
///
/// Trivia emission, comment syntax and block-string policies come from [`LexerOptions`]; error
/// handling and strictness come from [`LexerConfig`].
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    cursor: Cursor<'a>,
    token_start: Cursor<'a>,
    sets: LexingSets,
    options: LexerOptions,
    config: LexerConfig,
    file: Option<String>,
    state: BlockState,
    policy: Option<BlockStringPolicy>,
    finished: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, sets: LexingSets) -> Self {
        let cursor = Cursor::new(source);
        Self {
            cursor,
            token_start: cursor,
            sets,
            options: LexerOptions::default(),
            config: LexerConfig::default(),
            file: None,
            state: BlockState::None,
            policy: None,
            finished: false,
        }
    }

    pub fn with_options(mut self, options: LexerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_config(mut self, config: LexerConfig) -> Self {
        self.config = config;
        self
    }

    /// File name attached to error locations and to the drained [`TokenStream`].
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn state(&self) -> BlockState {
        self.state
    }

    pub fn location(&self) -> SourceLocation {
        self.location_of(&self.cursor)
    }

    /// Rewinds to the start of the source and leaves block mode.
    pub fn reset(&mut self) {
        self.cursor = Cursor::new(self.cursor.input());
        self.token_start = self.cursor;
        self.state = BlockState::None;
        self.policy = None;
        self.finished = false;
    }

    pub fn next_token(&mut self) -> Result<Token, LexerError> {
        let scanned = match self.state {
            BlockState::None => self.scan_normal(),
            BlockState::AwaitingOpen => self.scan_block_open(),
            BlockState::AwaitingContent => self.scan_block_content(),
            BlockState::AwaitingClose => self.scan_block_close(),
        };
        match scanned {
            Ok(token) => {
                tracing::trace!(token = %token, line = self.token_start.line(), "emit");
                Ok(token)
            }
            Err(error) => self.handle_error(error),
        }
    }

    /// Drains every remaining token with its position; the last span holds [`Token::Eof`].
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn tokenize(&mut self) -> Result<Vec<TokenSpan>, LexerError> {
        let mut spans = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.is_eof();
            spans.push(TokenSpan {
                token,
                start: self.token_start.byte_offset(),
                end: self.cursor.byte_offset(),
                line: self.token_start.line(),
                column: self.token_start.column(),
            });
            if done {
                return Ok(spans);
            }
        }
    }

    pub fn collect_tokens(&mut self) -> Result<Vec<Token>, LexerError> {
        Ok(self.tokenize()?.into_iter().map(|span| span.token).collect())
    }

    /// Lexes the whole source from the start, recording the line each token begins on.
    pub fn collect_tokens_with_line_map(&mut self) -> Result<TokenStream, LexerError> {
        self.reset();
        let spans = self.tokenize()?;
        Ok(TokenStream::from_spans(spans, self.file.clone()))
    }

    /// Reads a delimited body up to, not including, the closing literal at depth 1.
    ///
    /// The cursor must sit just past the opening literal. At end of input the text read so far is
    /// returned.
    pub fn read_until_closing(&mut self, delimiter: &Delimiter) -> &'a str {
        let start = self.cursor;
        let mut depth = 1usize;
        while !self.cursor.is_at_end() {
            if self.cursor.starts_with(&delimiter.end) {
                if depth == 1 {
                    break;
                }
                depth -= 1;
                self.cursor = self.cursor.advance_bytes(delimiter.end.len());
            } else if delimiter.allows_nesting && self.cursor.starts_with(&delimiter.start) {
                depth += 1;
                self.cursor = self.cursor.advance_bytes(delimiter.start.len());
            } else {
                self.cursor = self.cursor.advance();
            }
        }
        self.cursor.slice_from(&start)
    }

    fn scan_normal(&mut self) -> Result<Token, LexerError> {
        loop {
            if let Some(trivia) = self.skip_trivia()? {
                return Ok(trivia);
            }

            let start = self.cursor;
            let rest = start.rest();

            if let Ok((_, raw)) = read_date_literal(rest) {
                self.consume(raw.len());
                if self.config.strict && !is_calendar_date(raw) {
                    return Err(LexerError::InvalidDateLiteral {
                        raw: raw.to_string(),
                        at: self.location_of(&start),
                    });
                }
                return Ok(Token::DateLiteral(raw.to_string()));
            }

            let Some(c) = start.peek() else {
                return Ok(Token::Eof);
            };

            if c == '"' {
                return self.scan_quoted();
            }

            if c == '-' && start.peek_nth(1) == Some('>') {
                self.consume(2);
                return Ok(Token::Arrow);
            }

            let starts_identifier =
                c == '_' && start.peek_nth(1).is_some_and(|n| n.is_alphanumeric() || n == '_');
            if !starts_identifier {
                if let Some(token) = Token::punctuation(c) {
                    self.consume(c.len_utf8());
                    return Ok(token);
                }
            }

            if let Ok((_, raw)) = read_number(rest) {
                self.consume(raw.len());
                return Decimal::from_str_exact(raw)
                    .map(|value| Token::Number {
                        value,
                        raw: raw.to_string(),
                    })
                    .map_err(|_| LexerError::InvalidNumber {
                        raw: raw.to_string(),
                        at: self.location_of(&start),
                    });
            }

            if let Ok((_, word)) = read_identifier(rest) {
                self.consume(word.len());
                return Ok(self.classify_word(word));
            }

            self.cursor = start.advance();
            if self.config.strict {
                return Err(LexerError::UnexpectedCharacter {
                    found: c,
                    at: self.location_of(&start),
                });
            }
            tracing::trace!(skipped = %c.escape_debug(), "unrecognized character");
        }
    }

    fn classify_word(&mut self, word: &str) -> Token {
        match self.sets.classify(word) {
            WordClass::BlockKeyword => {
                let policy = self.options.block_policies.policy_for(word).clone();
                tracing::debug!(keyword = word, opener = %policy.delimiter.start, "entering block string");
                self.policy = Some(policy);
                self.state = BlockState::AwaitingOpen;
                Token::Keyword(word.to_string())
            }
            WordClass::Keyword => Token::Keyword(word.to_string()),
            WordClass::Identifier => Token::Identifier(word.to_string()),
        }
    }

    fn scan_quoted(&mut self) -> Result<Token, LexerError> {
        let start = self.cursor;
        let body = &start.rest()[1..];
        match read_quoted(body, self.config.unescape_strings, self.config.strict) {
            Ok((remaining, content)) => {
                self.consume(start.rest().len() - remaining.len());
                Ok(Token::String(content))
            }
            Err(QuotedError::Unterminated) => {
                self.consume(start.rest().len());
                Err(LexerError::UnexpectedEof {
                    context: "string literal".to_string(),
                    at: self.location_of(&start),
                })
            }
            Err(QuotedError::InvalidEscape(sequence)) => {
                // step over the whole literal so scanning resumes after it
                let consumed = match read_quoted(body, false, false) {
                    Ok((remaining, _)) => start.rest().len() - remaining.len(),
                    Err(_) => start.rest().len(),
                };
                self.consume(consumed);
                Err(LexerError::InvalidEscape {
                    sequence,
                    at: self.location_of(&start),
                })
            }
        }
    }

    fn scan_block_open(&mut self) -> Result<Token, LexerError> {
        let Some(policy) = self.policy.clone() else {
            self.state = BlockState::None;
            return self.scan_normal();
        };
        if let Some(trivia) = self.skip_trivia()? {
            return Ok(trivia);
        }
        let opener = &policy.delimiter.start;
        if self.cursor.starts_with(opener) {
            self.consume(opener.len());
            self.state = BlockState::AwaitingContent;
            tracing::debug!(opener = %opener, "block string opened");
            Ok(policy.delimiter.open_token())
        } else {
            tracing::debug!(expected = %opener, "block keyword without opening delimiter");
            self.leave_block();
            Ok(Token::Eof)
        }
    }

    fn scan_block_content(&mut self) -> Result<Token, LexerError> {
        let Some(policy) = self.policy.clone() else {
            self.state = BlockState::None;
            return self.scan_normal();
        };
        self.token_start = self.cursor;
        let body = self.read_until_closing(&policy.delimiter);
        self.state = BlockState::AwaitingClose;
        Ok(Token::String(policy.options.apply(body)))
    }

    fn scan_block_close(&mut self) -> Result<Token, LexerError> {
        let Some(policy) = self.policy.clone() else {
            self.state = BlockState::None;
            return self.scan_normal();
        };
        if let Some(trivia) = self.skip_trivia()? {
            return Ok(trivia);
        }
        let closer = &policy.delimiter.end;
        self.leave_block();
        if self.cursor.starts_with(closer) {
            self.consume(closer.len());
            tracing::debug!(closer = %closer, "block string closed");
            Ok(policy.delimiter.close_token())
        } else {
            Err(LexerError::Unterminated {
                delimiter: closer.clone(),
                at: self.location(),
            })
        }
    }

    fn leave_block(&mut self) {
        self.state = BlockState::None;
        self.policy = None;
    }

    /// Consumes trivia until something else comes up. Returns the first trivia token that is
    /// configured to be emitted.
    fn skip_trivia(&mut self) -> Result<Option<Token>, LexerError> {
        loop {
            self.token_start = self.cursor;
            let Some(trivia) = self.read_trivia()? else {
                return Ok(None);
            };
            if self.emits(&trivia) {
                return Ok(Some(trivia));
            }
        }
    }

    fn read_trivia(&mut self) -> Result<Option<Token>, LexerError> {
        let rest = self.cursor.rest();
        if let Ok((_, ws)) = read_whitespace(rest) {
            self.consume(ws.len());
            return Ok(Some(Token::Whitespace(ws.to_string())));
        }
        if let Ok((_, newline)) = read_newline(rest, self.options.normalize_newlines) {
            self.consume(newline.len());
            return Ok(Some(Token::Newline));
        }
        let matched = self.options.comments.iter().find_map(|signature| match signature {
            CommentSignature::Line { prefix } => read_line_comment(rest, prefix)
                .ok()
                .map(|(remaining, body)| Ok((remaining, Token::LineComment(body.to_string())))),
            CommentSignature::Block {
                start,
                end,
                nesting,
            } => match read_block_comment(rest, start, end, *nesting) {
                Ok((remaining, body)) => {
                    Some(Ok((remaining, Token::BlockComment(body.to_string()))))
                }
                Err(nom::Err::Failure(_)) => Some(Err(end.clone())),
                Err(_) => None,
            },
        });
        match matched {
            Some(Ok((remaining, token))) => {
                self.consume(rest.len() - remaining.len());
                Ok(Some(token))
            }
            Some(Err(delimiter)) => {
                let error = LexerError::Unterminated {
                    delimiter,
                    at: self.location(),
                };
                self.consume(rest.len());
                Err(error)
            }
            None => Ok(None),
        }
    }

    fn emits(&self, trivia: &Token) -> bool {
        match trivia {
            Token::Whitespace(_) => self.options.emit_whitespace,
            Token::Newline => self.options.emit_newlines,
            Token::LineComment(_) | Token::BlockComment(_) => self.options.emit_comments,
            _ => true,
        }
    }

    fn handle_error(&mut self, error: LexerError) -> Result<Token, LexerError> {
        let strategy = self.config.error_strategy.clone();
        match strategy {
            LexerErrorStrategy::Raise => Err(error),
            LexerErrorStrategy::ErrorToken => {
                tracing::warn!(%error, "lexer error emitted as token");
                Ok(Token::Error {
                    message: error.to_string(),
                    at: error.location().clone(),
                })
            }
            LexerErrorStrategy::Diagnose(callback) => {
                tracing::warn!(%error, "lexer error reported to callback");
                callback(&error);
                self.consume(self.cursor.rest().len());
                self.leave_block();
                Ok(Token::Eof)
            }
        }
    }

    fn consume(&mut self, len: usize) {
        self.cursor = self.cursor.advance_bytes(len);
    }

    fn location_of(&self, cursor: &Cursor<'a>) -> SourceLocation {
        SourceLocation {
            file: self.file.clone(),
            line: cursor.line(),
            column: cursor.column(),
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, LexerError>;

    /// Yields every token including the final [`Token::Eof`], or stops after the first error.
    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let result = self.next_token();
        if matches!(result, Ok(Token::Eof) | Err(_)) {
            self.finished = true;
        }
        Some(result)
    }
}

fn is_calendar_date(raw: &str) -> bool {
    let head: String = raw
        .chars()
        .take(10)
        .map(|c| if c == '/' || c == '.' { '-' } else { c })
        .collect();
    chrono::NaiveDate::parse_from_str(&head, "%Y-%m-%d").is_ok()
}
