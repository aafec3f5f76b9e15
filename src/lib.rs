//! Table construction for an LR-style parser generator with embedded
//! lexical rules.
//!
//! Given two prepared grammars (a syntactic grammar whose rule leaves are
//! token symbols, and a lexical grammar whose rule leaves are byte sets),
//! [`build_tables`] produces the LR(1) parse table and the lexer DFA the
//! runtime parser is driven by. Rule-level precedence metadata arbitrates
//! shift/reduce and lex/lex conflicts; anything precedence cannot decide
//! is reported alongside the finished tables.

pub mod build_tables;
pub mod grammar;
pub mod lex_table;
pub mod parse_table;
pub mod rules;
pub mod types;

mod util;

pub use build_tables::build_tables;
