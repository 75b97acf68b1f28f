use std::hint::black_box;
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion};
use parsekit::analyzer::prelude::*;
use parsekit::analyzer::sugar::newline_run;
use parsekit::analyzer::TokenParser;
use parsekit::{
    Grammar, GrammarCompiler, GrammarField, GrammarNode, GrammarValue, Lexer, LexingSets,
    ParserComponents,
};

fn ledger_document(entries: usize) -> String {
    (0..entries)
        .map(|i| {
            format!(
                "entry {{\n  date 2025-01-{:02}\n  memo \"entry {}\"\n  line {{ account = cash; amount = {}.50 }}\n  line {{ account = rent; amount = {}.50 }}\n}}\n",
                i % 28 + 1,
                i,
                i,
                i
            )
        })
        .collect()
}

fn ledger_grammar() -> Arc<Grammar> {
    let mut components = ParserComponents::basic();
    components.register_text("date", || boxed(date()));
    Arc::new(Grammar::new(
        [
            GrammarNode::keyword("entry")
                .with_field(GrammarField::new("date", GrammarValue::val("date")))
                .with_field(GrammarField::optional("memo", GrammarValue::val("string")))
                .with_field(GrammarField::many("line", GrammarValue::node("line"))),
            GrammarNode::keyword("line")
                .with_field(GrammarField::new("account", GrammarValue::val("ident")))
                .with_field(GrammarField::new("amount", GrammarValue::val("number"))),
        ],
        components,
    ))
}

fn bench_lexer(c: &mut Criterion) {
    let source = ledger_document(200);
    let grammar = ledger_grammar();
    c.bench_function("lex 200 entries", |b| {
        b.iter(|| {
            Lexer::new(black_box(&source), LexingSets::new(grammar.keywords()))
                .collect_tokens_with_line_map()
        })
    });
}

fn bench_grammar(c: &mut Criterion) {
    let source = ledger_document(200);
    let grammar = ledger_grammar();
    let stream = Lexer::new(&source, LexingSets::new(grammar.keywords()))
        .collect_tokens_with_line_map()
        .expect("benchmark document lexes");
    c.bench_function("compile and parse 200 entries", |b| {
        b.iter(|| {
            let entries = many(
                keep(newline_run(0), GrammarCompiler::compile_folded(&grammar, "entry")),
                1,
            );
            entries.parse(black_box(stream.cursor())).map(|(_, nodes)| nodes.len())
        })
    });
}

criterion_group!(benches, bench_lexer, bench_grammar);
criterion_main!(benches);
