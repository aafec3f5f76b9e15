//! Parse and lex items.
//!
//! An item pairs a rule's left-hand symbol with the residual right-hand
//! side that is still to be recognized. Because residuals are canonical
//! rule trees, a `BTreeSet` of items has one representation per set and
//! can key the state-interning maps directly.

use crate::grammar::{symbol_name, PreparedGrammar};
use crate::rules::{Associativity, Rule, Symbol};
use crate::util::display_fn;
use std::collections::BTreeSet;
use std::fmt;

/// An LR(1) item: a position inside a syntactic rule plus one lookahead.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParseItem {
    pub lhs: Symbol,
    /// The remainder of the right-hand side.
    pub rule: Rule,
    /// How many symbols have been consumed while recognizing `lhs`.
    pub consumed_symbol_count: u32,
    pub lookahead: Symbol,
}

impl ParseItem {
    pub fn new(lhs: Symbol, rule: Rule, consumed_symbol_count: u32, lookahead: Symbol) -> Self {
        Self {
            lhs,
            rule,
            consumed_symbol_count,
            lookahead,
        }
    }

    /// Whether the rule can complete here: the remainder matches the
    /// empty string, so a reduction is possible under the lookahead.
    pub fn is_done(&self) -> bool {
        self.rule.is_nullable()
    }

    pub fn precedence(&self) -> i32 {
        self.rule.precedence()
    }

    pub fn associativity(&self) -> Option<Associativity> {
        self.rule.associativity()
    }

    pub fn display<'g>(
        &'g self,
        grammar: &'g PreparedGrammar,
        lex_grammar: &'g PreparedGrammar,
    ) -> impl fmt::Display + 'g {
        display_fn(move |f| {
            write!(
                f,
                "({} . {} consumed, lookahead {})",
                symbol_name(self.lhs, grammar, lex_grammar),
                self.consumed_symbol_count,
                symbol_name(self.lookahead, grammar, lex_grammar),
            )
        })
    }
}

/// A lexing item: a token symbol plus the residual character-level rule.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LexItem {
    pub lhs: Symbol,
    pub rule: Rule,
}

impl LexItem {
    pub fn new(lhs: Symbol, rule: Rule) -> Self {
        Self { lhs, rule }
    }

    /// Whether the token can be accepted here: nothing mandatory remains
    /// to be consumed.
    pub fn is_done(&self) -> bool {
        self.rule.is_nullable()
    }

    /// Whether the token body can begin here, the leading separator run
    /// having ended.
    pub fn is_token_start(&self) -> bool {
        self.rule.has_token_start()
    }
}

pub type ParseItemSet = BTreeSet<ParseItem>;
pub type LexItemSet = BTreeSet<LexItem>;
