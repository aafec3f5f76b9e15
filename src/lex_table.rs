//! The lex table emitted for the runtime lexer.

use crate::grammar::PreparedGrammar;
use crate::rules::{CharacterSet, Symbol};
use crate::types::Map;
use crate::util::display_fn;
use std::fmt;

/// A lex state index. Non-negative values index [`LexTable::states`];
/// [`LexStateId::ERROR`] names the synthetic error-recovery state.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct LexStateId {
    raw: i32,
}

impl LexStateId {
    pub const ERROR: Self = Self { raw: -1 };

    pub(crate) const fn new(raw: i32) -> Self {
        Self { raw }
    }

    pub const fn raw(self) -> i32 {
        self.raw
    }
}

impl fmt::Debug for LexStateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for LexStateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::ERROR {
            f.write_str("error")
        } else {
            fmt::Display::fmt(&self.raw, f)
        }
    }
}

/// The action a lex state performs on a particular character.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum LexAction {
    #[default]
    Error,
    Advance {
        state: LexStateId,
    },
    Accept {
        symbol: Symbol,
    },
}

impl fmt::Display for LexAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => f.write_str("error"),
            Self::Advance { state } => write!(f, "advance({})", state),
            Self::Accept { symbol } => write!(f, "accept({})", symbol),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LexState {
    pub actions: Map<CharacterSet, LexAction>,
    /// Applied when no character transition matches.
    pub default_action: LexAction,
    /// Whether the token proper can begin at this state, as opposed to
    /// being inside the leading separator run.
    pub is_token_start: bool,
}

impl LexState {
    pub fn expected_inputs(&self) -> impl Iterator<Item = &CharacterSet> + '_ {
        self.actions.keys()
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct LexTable {
    pub states: Vec<LexState>,
    /// The state entered during error recovery, when any token may follow.
    pub error_state: LexState,
}

impl LexTable {
    pub const ERROR_STATE_ID: LexStateId = LexStateId::ERROR;

    pub(crate) fn add_state(&mut self) -> LexStateId {
        self.states.push(LexState::default());
        LexStateId::new(self.states.len() as i32 - 1)
    }

    pub fn state(&self, id: LexStateId) -> &LexState {
        if id.raw() < 0 {
            &self.error_state
        } else {
            &self.states[id.raw() as usize]
        }
    }

    pub(crate) fn state_mut(&mut self, id: LexStateId) -> &mut LexState {
        if id.raw() < 0 {
            &mut self.error_state
        } else {
            &mut self.states[id.raw() as usize]
        }
    }

    pub(crate) fn add_action(&mut self, id: LexStateId, characters: CharacterSet, action: LexAction) {
        self.state_mut(id).actions.insert(characters, action);
    }

    pub(crate) fn add_default_action(&mut self, id: LexStateId, action: LexAction) {
        self.state_mut(id).default_action = action;
    }

    pub fn display<'g>(&'g self, lex_grammar: &'g PreparedGrammar) -> impl fmt::Display + 'g {
        display_fn(move |f| {
            let error_id = Self::ERROR_STATE_ID;
            for (id, state) in std::iter::once((error_id.to_string(), &self.error_state)).chain(
                self.states
                    .iter()
                    .enumerate()
                    .map(|(id, state)| (id.to_string(), state)),
            ) {
                writeln!(f, "#### Lex state {}", id)?;
                if state.is_token_start {
                    writeln!(f, "(token start)")?;
                }
                for (characters, action) in &state.actions {
                    writeln!(f, "- {} => {}", characters, action)?;
                }
                match &state.default_action {
                    LexAction::Error => {}
                    LexAction::Accept { symbol } => {
                        writeln!(f, "- default => accept({})", lex_grammar.rule_name(*symbol))?
                    }
                    action => writeln!(f, "- default => {}", action)?,
                }
            }
            Ok(())
        })
    }
}
