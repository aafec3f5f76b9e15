//! The parse table emitted for the runtime parser.

use crate::grammar::{symbol_name, PreparedGrammar};
use crate::lex_table::LexStateId;
use crate::rules::{Associativity, Symbol};
use crate::types::{Map, Set};
use crate::util::display_fn;
use std::collections::BTreeSet;
use std::fmt;

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct ParseStateId {
    raw: usize,
}

impl ParseStateId {
    pub(crate) const fn new(raw: usize) -> Self {
        Self { raw }
    }

    pub const fn index(self) -> usize {
        self.raw
    }
}

impl fmt::Debug for ParseStateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.raw, f)
    }
}

impl fmt::Display for ParseStateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.raw, f)
    }
}

/// The action a parse state performs on a particular lookahead symbol.
///
/// A `Shift` keyed by a nonterminal symbol doubles as the goto entry for
/// that nonterminal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseAction {
    Error,
    Accept,
    Shift {
        state: ParseStateId,
        /// Precedences of every partially-consumed item merged into the
        /// target state. All of them compete when a reduce is compared
        /// against this shift later.
        precedence_values: BTreeSet<i32>,
    },
    Reduce {
        symbol: Symbol,
        consumed_symbol_count: u32,
        precedence: i32,
        associativity: Option<Associativity>,
    },
}

impl fmt::Display for ParseAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => f.write_str("error"),
            Self::Accept => f.write_str("accept"),
            Self::Shift { state, .. } => write!(f, "shift({})", state),
            Self::Reduce {
                symbol,
                consumed_symbol_count,
                ..
            } => write!(f, "reduce({}, {})", symbol, consumed_symbol_count),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ParseState {
    pub actions: Map<Symbol, ParseAction>,
    /// The lex state that recognizes the terminals this state expects.
    pub lex_state_id: LexStateId,
}

impl Default for ParseState {
    fn default() -> Self {
        Self {
            actions: Map::default(),
            lex_state_id: LexStateId::ERROR,
        }
    }
}

impl ParseState {
    pub fn expected_inputs(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.actions.keys().copied()
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct ParseTable {
    pub states: Vec<ParseState>,
    /// Every symbol an action was recorded for.
    pub symbols: Set<Symbol>,
}

impl ParseTable {
    pub(crate) fn add_state(&mut self) -> ParseStateId {
        self.states.push(ParseState::default());
        ParseStateId::new(self.states.len() - 1)
    }

    pub(crate) fn add_action(&mut self, id: ParseStateId, symbol: Symbol, action: ParseAction) {
        self.symbols.insert(symbol);
        self.states[id.index()].actions.insert(symbol, action);
    }

    pub fn state(&self, id: ParseStateId) -> &ParseState {
        &self.states[id.index()]
    }

    pub(crate) fn state_mut(&mut self, id: ParseStateId) -> &mut ParseState {
        &mut self.states[id.index()]
    }

    pub fn display<'g>(
        &'g self,
        grammar: &'g PreparedGrammar,
        lex_grammar: &'g PreparedGrammar,
    ) -> impl fmt::Display + 'g {
        display_fn(move |f| {
            for (id, state) in self.states.iter().enumerate() {
                writeln!(f, "#### State {:02} (lex {})", id, state.lex_state_id)?;
                for (symbol, action) in &state.actions {
                    writeln!(
                        f,
                        "- {} => {}",
                        symbol_name(*symbol, grammar, lex_grammar),
                        action
                    )?;
                }
            }
            Ok(())
        })
    }
}
