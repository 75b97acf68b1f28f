//! Prefix readers used by the lexer in normal scanning mode.
//!
//! Each reader looks at the unread remainder of the input and returns what it consumed. The
//! lexer owns position tracking and token construction; readers only recognize text.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_till, take_while, take_while1, take_while_m_n},
    character::complete::{char, digit1, one_of, satisfy},
    combinator::{opt, recognize},
    error::{context, ErrorKind, ParseError, VerboseError},
    sequence::{pair, preceded, tuple},
    IResult,
};

pub type ParserResult<'a, T> = IResult<&'a str, T, VerboseError<&'a str>>;

fn is_line_break(c: char) -> bool {
    c == '\n' || c == '\r'
}

pub fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

pub fn is_identifier_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-' || c == '.'
}

/// Spaces, tabs and other non-line-breaking whitespace.
#[tracing::instrument(level = "trace", skip(input))]
pub fn read_whitespace(input: &str) -> ParserResult<&str> {
    context(
        "whitespace",
        take_while1(|c: char| c.is_whitespace() && !is_line_break(c)),
    )(input)
}

/// One line break. With `normalize`, CRLF is a single break; otherwise CR and LF are read
/// separately.
#[tracing::instrument(level = "trace", skip(input))]
pub fn read_newline(input: &str, normalize: bool) -> ParserResult<&str> {
    if normalize {
        context("newline", alt((tag("\r\n"), tag("\n"), tag("\r"))))(input)
    } else {
        context("newline", alt((tag("\n"), tag("\r"))))(input)
    }
}

/// Text after `prefix` up to, not including, the line break.
pub fn read_line_comment<'a>(input: &'a str, prefix: &str) -> ParserResult<'a, &'a str> {
    context("line comment", preceded(tag(prefix), take_till(is_line_break)))(input)
}

/// Body between `start` and `end`. A missing `end` is a `Failure`, not a recoverable `Error`.
pub fn read_block_comment<'a>(
    input: &'a str,
    start: &str,
    end: &str,
    nesting: bool,
) -> ParserResult<'a, &'a str> {
    let (body, _) = context("block comment", tag(start))(input)?;
    let mut depth = 1usize;
    let mut index = 0;
    while index < body.len() {
        let rest = &body[index..];
        if rest.starts_with(end) {
            depth -= 1;
            if depth == 0 {
                return Ok((&rest[end.len()..], &body[..index]));
            }
            index += end.len();
        } else if nesting && rest.starts_with(start) {
            depth += 1;
            index += start.len();
        } else {
            index += rest.chars().next().map_or(1, char::len_utf8);
        }
    }
    Err(nom::Err::Failure(VerboseError::from_error_kind(
        input,
        ErrorKind::TakeUntil,
    )))
}

fn digits<'a>(count: usize) -> impl FnMut(&'a str) -> ParserResult<'a, &'a str> {
    take_while_m_n(count, count, |c: char| c.is_ascii_digit())
}

/// `DDDD[-/.]DD[-/.]DD`, then greedily any further digits, `-`, `/` or `.`.
#[tracing::instrument(level = "trace", skip(input))]
pub fn read_date_literal(input: &str) -> ParserResult<&str> {
    context(
        "date literal",
        recognize(tuple((
            digits(4),
            one_of("-/."),
            digits(2),
            one_of("-/."),
            digits(2),
            take_while(|c: char| c.is_ascii_digit() || c == '-' || c == '/' || c == '.'),
        ))),
    )(input)
}

/// Digits with at most one `.`, which must be followed by a digit.
#[tracing::instrument(level = "trace", skip(input))]
pub fn read_number(input: &str) -> ParserResult<&str> {
    context(
        "number",
        recognize(pair(digit1, opt(pair(char('.'), digit1)))),
    )(input)
}

#[tracing::instrument(level = "trace", skip(input))]
pub fn read_identifier(input: &str) -> ParserResult<&str> {
    context(
        "identifier",
        recognize(pair(
            satisfy(is_identifier_start),
            take_while(is_identifier_continue),
        )),
    )(input)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotedError {
    /// Input ended before the closing quote.
    Unterminated,
    /// Only reported when strict escapes are requested.
    InvalidEscape(char),
}

/// Reads the body of a double-quoted string; `input` starts just after the opening quote.
///
/// With `unescape` off the body is returned as written, escapes included, but `\"` still does not
/// close the string.
pub fn read_quoted(
    input: &str,
    unescape: bool,
    strict: bool,
) -> Result<(&str, String), QuotedError> {
    let mut content = String::new();
    let mut chars = input.char_indices();
    while let Some((index, c)) = chars.next() {
        match c {
            '"' => return Ok((&input[index + 1..], content)),
            '\\' => {
                let (_, escaped) = chars.next().ok_or(QuotedError::Unterminated)?;
                if !unescape {
                    content.push('\\');
                    content.push(escaped);
                    continue;
                }
                match escaped {
                    'n' => content.push('\n'),
                    't' => content.push('\t'),
                    '"' | '\\' => content.push(escaped),
                    other if strict => return Err(QuotedError::InvalidEscape(other)),
                    other => content.push(other),
                }
            }
            c => content.push(c),
        }
    }
    Err(QuotedError::Unterminated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace_stops_at_newline() {
        let (rest, ws) = read_whitespace(" \t \nnext").unwrap();
        assert_eq!(ws, " \t ");
        assert_eq!(rest, "\nnext");
        assert!(read_whitespace("x").is_err());
    }

    #[test]
    fn test_newline_normalization() {
        assert_eq!(read_newline("\r\nx", true).unwrap(), ("x", "\r\n"));
        assert_eq!(read_newline("\r\nx", false).unwrap(), ("\nx", "\r"));
        assert_eq!(read_newline("\rx", true).unwrap(), ("x", "\r"));
    }

    #[test]
    fn test_line_comment() {
        let (rest, body) = read_line_comment("// total\nnext", "//").unwrap();
        assert_eq!(body, " total");
        assert_eq!(rest, "\nnext");
        assert!(read_line_comment("/ total", "//").is_err());
    }

    #[test]
    fn test_block_comment_nesting() {
        let input = "/* a /* b */ c */rest";
        let (rest, body) = read_block_comment(input, "/*", "*/", true).unwrap();
        assert_eq!(body, " a /* b */ c ");
        assert_eq!(rest, "rest");

        let (rest, body) = read_block_comment(input, "/*", "*/", false).unwrap();
        assert_eq!(body, " a /* b ");
        assert_eq!(rest, " c */rest");
    }

    #[test]
    fn test_block_comment_unterminated_is_failure() {
        assert!(matches!(
            read_block_comment("/* open", "/*", "*/", false),
            Err(nom::Err::Failure(_))
        ));
    }

    #[test]
    fn test_date_literal_shapes() {
        assert_eq!(read_date_literal("2025-01-20 x").unwrap(), (" x", "2025-01-20"));
        assert_eq!(read_date_literal("2025/01/20").unwrap().1, "2025/01/20");
        assert_eq!(read_date_literal("2025.01.20.5").unwrap().1, "2025.01.20.5");
        assert!(read_date_literal("2025-1-20").is_err());
        assert!(read_date_literal("1000.00").is_err());
    }

    #[test]
    fn test_number_single_dot() {
        assert_eq!(read_number("12.50.3").unwrap(), (".3", "12.50"));
        assert_eq!(read_number("12.").unwrap(), (".", "12"));
        assert!(read_number(".5").is_err());
    }

    #[test]
    fn test_identifier_continuation() {
        assert_eq!(read_identifier("acct.cash-1 = 2").unwrap(), (" = 2", "acct.cash-1"));
        assert_eq!(read_identifier("_tmp").unwrap().1, "_tmp");
        assert!(read_identifier("9lives").is_err());
    }

    #[test]
    fn test_quoted_escapes() {
        assert_eq!(
            read_quoted(r#"a\n\"b\q" tail"#, true, false).unwrap(),
            (" tail", "a\n\"bq".to_string())
        );
        assert_eq!(
            read_quoted(r#"a\n\"b" tail"#, false, false).unwrap(),
            (" tail", r#"a\n\"b"#.to_string())
        );
        assert_eq!(
            read_quoted(r#"a\q""#, true, true),
            Err(QuotedError::InvalidEscape('q'))
        );
        assert_eq!(read_quoted("open", true, false), Err(QuotedError::Unterminated));
    }
}
