use chrono::NaiveDate;
use parsekit::analyzer::prelude::*;
use parsekit::analyzer::TokenParser;
use parsekit::grammar::validators::require_keys;
use parsekit::tokenizer::CommentSignature;
use parsekit::{
    DecodeError, DynamicallyParsable, Error, GrammarField, GrammarNode, GrammarValue, Lexer,
    LexerOptions, ParserComponents, SyntaxNode,
};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[ctor::ctor]
fn init_tests() {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Debit,
    Credit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Line {
    account: String,
    side: Side,
    amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    date: NaiveDate,
    memo: Option<String>,
    lines: Vec<Line>,
}

impl Entry {
    fn is_balanced(&self) -> bool {
        let total = |side: Side| -> Decimal {
            self.lines
                .iter()
                .filter(|line| line.side == side)
                .map(|line| line.amount)
                .sum()
        };
        total(Side::Debit) == total(Side::Credit)
    }
}

fn field<'a>(node: &'a SyntaxNode, name: &str) -> Result<&'a SyntaxNode, DecodeError> {
    node.get(name).ok_or_else(|| DecodeError::missing(name))
}

fn decode_line(node: &SyntaxNode) -> Result<Line, DecodeError> {
    let account = field(node, "account")?
        .as_atom()
        .ok_or_else(|| DecodeError::wrong_shape("account", "an identifier"))?;
    let side = match field(node, "side")?.as_atom() {
        Some("debit") => Side::Debit,
        Some("credit") => Side::Credit,
        _ => return Err(DecodeError::invalid("side", "expected debit or credit")),
    };
    let amount = field(node, "amount")?
        .as_number()
        .ok_or_else(|| DecodeError::wrong_shape("amount", "a number"))?;
    Ok(Line {
        account: account.to_string(),
        side,
        amount,
    })
}

impl DynamicallyParsable for Entry {
    fn grammar_node() -> GrammarNode {
        GrammarNode::keyword("entry")
            .with_field(GrammarField::new("date", GrammarValue::val("date")))
            .with_field(GrammarField::optional("memo", GrammarValue::val("string")))
            .with_field(GrammarField::many("line", GrammarValue::node("line")))
            .with_validator(require_keys(["date", "line"]))
            .commit_after_opener()
    }

    fn supporting_nodes() -> Vec<GrammarNode> {
        vec![GrammarNode::keyword("line")
            .with_field(GrammarField::new("account", GrammarValue::val("ident")))
            .with_field(GrammarField::new("side", GrammarValue::val("ident")))
            .with_field(GrammarField::new("amount", GrammarValue::val("decimal_loose")))]
    }

    fn parser_components() -> ParserComponents {
        let mut components = ParserComponents::basic();
        components.register_text("date", || boxed(date()));
        components
    }

    fn lexer_options() -> LexerOptions {
        LexerOptions {
            comments: vec![CommentSignature::line("//")],
            ..LexerOptions::default()
        }
    }

    fn from_syntax(node: &SyntaxNode) -> Result<Self, DecodeError> {
        let raw = field(node, "date")?
            .as_str()
            .ok_or_else(|| DecodeError::wrong_shape("date", "a date literal"))?;
        let date = NaiveDate::parse_from_str(&raw.replace(['/', '.'], "-"), "%Y-%m-%d")
            .map_err(|e| DecodeError::invalid("date", e.to_string()))?;
        let memo = node.get("memo").and_then(SyntaxNode::as_str).map(str::to_string);
        let lines = field(node, "line")?
            .items()
            .into_iter()
            .map(decode_line)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Entry { date, memo, lines })
    }
}

const RENT: &str = r#"
// monthly rent
entry {
    date 2025/01/20
    memo "Rent"
    line { account = rent; side = debit; amount = "1200,50" }
    line { account = cash; side = credit; amount = 1200.50 }
}
"#;

#[test]
fn it_parses_a_model_from_text() {
    let entry = Entry::parse_str(RENT).unwrap();
    assert_eq!(entry.date, NaiveDate::from_ymd_opt(2025, 1, 20).unwrap());
    assert_eq!(entry.memo.as_deref(), Some("Rent"));
    assert_eq!(entry.lines.len(), 2);
    assert_eq!(entry.lines[0].amount, Decimal::new(120050, 2));
    assert!(entry.is_balanced());
}

#[test]
fn it_surfaces_each_error_layer() {
    let error = Entry::parse_str("entry { memo \"open").unwrap_err();
    assert!(matches!(error, Error::Lex(_)));

    let error = Entry::parse_str("entry { memo \"no lines\" }").unwrap_err();
    match error {
        Error::Parse(diagnostic) => {
            assert_eq!(diagnostic.message, "missing keys: date, line");
            assert!(diagnostic.committed);
        }
        other => panic!("unexpected error {:?}", other),
    }

    let error = Entry::parse_str(
        "entry { date 2025-02-30; line { account = cash; side = credit; amount = 1 } }",
    )
    .unwrap_err();
    assert!(matches!(error, Error::Decode(DecodeError::InvalidValue { .. })));

    let error = Entry::parse_str(
        "entry { date 2025-01-01; line { account = cash; side = up; amount = 1 } }",
    )
    .unwrap_err();
    assert_eq!(
        error.to_string(),
        "model decode failed: field 'side': expected debit or credit"
    );
}

#[test]
fn it_rejects_trailing_input() {
    let source = format!("{}\nentry", RENT);
    let error = Entry::parse_str(&source).unwrap_err();
    match error {
        Error::TrailingInput { found, .. } => assert_eq!(found, "keyword 'entry'"),
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn it_exposes_the_model_as_a_token_parser() {
    let source = format!("{}{}", RENT, RENT);
    let stream = Lexer::new(&source, Entry::lexing_sets())
        .collect_tokens_with_line_map()
        .unwrap()
        .without_trivia(true);
    let entries = many(
        keep(parsekit::analyzer::sugar::newline_run(0), Entry::parser()),
        1,
    );
    let (_, parsed) = entries.parse(stream.cursor()).unwrap();
    assert_eq!(parsed.len(), 2);
    assert_eq!(parsed[0], parsed[1]);
}
