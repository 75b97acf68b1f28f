//! # Grammar
//!
//! Declarative grammars compiled into token parsers.
//!
//! A [`Grammar`] is data: [`GrammarNode`]s made of [`GrammarField`]s, each field holding a
//! [`GrammarValue`] shape, plus a [`ParserComponents`] registry of named leaf parsers.
//! [`GrammarCompiler::compile`] interprets it at parse time and yields a [`GrammarResult`], which
//! [`GrammarResult::fold`] turns into the generic [`SyntaxNode`] tree:
//!
//! ```text
//! entry {
//!     date 2025-01-20        =>  { _type: entry, date: ..., memo: "Rent", line: [ ... ] }
//!     memo "Rent"
//!     line { account = rent; side = debit; amount = 900 }
//!     line { account = cash; side = credit; amount = 900 }
//! }
//! ```
//!
//! Models that decode themselves from that tree implement [`DynamicallyParsable`].

pub mod compiler;
pub mod components;
pub mod model;
pub mod parsable;
pub mod syntax;
pub mod validators;

pub use compiler::{GrammarCompiler, GrammarResult};
pub use components::{ParserComponents, ValueParser};
pub use model::{
    DelimiterKind, FieldBucket, Grammar, GrammarField, GrammarNode, GrammarOrder,
    GrammarSeparator, GrammarValue, Multiplicity, Validator,
};
pub use parsable::DynamicallyParsable;
pub use syntax::{generic_node, recursive_node, ChildProvider, SyntaxNode, TYPE_KEY};
