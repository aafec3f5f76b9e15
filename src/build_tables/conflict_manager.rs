//! Precedence-aware arbitration between competing table actions.

use crate::grammar::{symbol_name, PreparedGrammar};
use crate::lex_table::LexAction;
use crate::parse_table::ParseAction;
use crate::rules::{Associativity, Symbol};
use std::cmp::Ordering;
use std::fmt;

/// A grammar ambiguity that precedence could not resolve.
///
/// The build still completes (an action is always chosen) and the caller
/// decides whether any accumulated conflicts are fatal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Conflict {
    description: String,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}

pub struct ConflictManager<'g> {
    grammar: &'g PreparedGrammar,
    lex_grammar: &'g PreparedGrammar,
    conflicts: Vec<Conflict>,
}

impl<'g> ConflictManager<'g> {
    pub fn new(grammar: &'g PreparedGrammar, lex_grammar: &'g PreparedGrammar) -> Self {
        Self {
            grammar,
            lex_grammar,
            conflicts: Vec::new(),
        }
    }

    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }

    pub fn into_conflicts(self) -> Vec<Conflict> {
        self.conflicts
    }

    /// Decide whether `new` should replace `current` as the action for
    /// `symbol`. Returns `true` iff the new action wins.
    pub fn resolve_parse_action(
        &mut self,
        symbol: Symbol,
        current: &ParseAction,
        new: &ParseAction,
    ) -> bool {
        use ParseAction::*;

        match (current, new) {
            (Error, _) => true,
            (_, Error) => false,
            (Accept, _) => false,
            (_, Accept) => true,

            // The new shift's target state has absorbed the merged item
            // set, so it supersedes the one recorded earlier.
            (Shift { .. }, Shift { .. }) => true,

            (
                Shift {
                    precedence_values, ..
                },
                Reduce {
                    symbol: reduced,
                    precedence,
                    associativity,
                    ..
                },
            ) => {
                let shift_precedence = precedence_values.iter().max().copied().unwrap_or(0);
                match precedence.cmp(&shift_precedence) {
                    Ordering::Greater => true,
                    Ordering::Less => false,
                    Ordering::Equal => match associativity {
                        Some(Associativity::Left) => true,
                        Some(Associativity::Right) => false,
                        None => {
                            self.record_shift_reduce(symbol, *reduced);
                            false
                        }
                    },
                }
            }

            (
                Reduce {
                    symbol: reduced,
                    precedence,
                    associativity,
                    ..
                },
                Shift {
                    precedence_values, ..
                },
            ) => {
                let shift_precedence = precedence_values.iter().max().copied().unwrap_or(0);
                match shift_precedence.cmp(precedence) {
                    Ordering::Greater => true,
                    Ordering::Less => false,
                    Ordering::Equal => match associativity {
                        Some(Associativity::Left) => false,
                        Some(Associativity::Right) => true,
                        None => {
                            self.record_shift_reduce(symbol, *reduced);
                            true
                        }
                    },
                }
            }

            (
                Reduce {
                    symbol: current_reduced,
                    precedence: current_precedence,
                    ..
                },
                Reduce {
                    symbol: new_reduced,
                    precedence: new_precedence,
                    ..
                },
            ) => match new_precedence.cmp(current_precedence) {
                Ordering::Greater => true,
                Ordering::Less => false,
                Ordering::Equal => {
                    self.record(format!(
                        "reduce/reduce conflict on lookahead `{}`: `{}` vs `{}`",
                        symbol_name(symbol, self.grammar, self.lex_grammar),
                        self.grammar.rule_name(*current_reduced),
                        self.grammar.rule_name(*new_reduced),
                    ));
                    false
                }
            },
        }
    }

    /// Decide whether the new accept action should replace the current
    /// default action of a lex state. Returns `true` iff it wins.
    pub fn resolve_lex_action(&mut self, current: &LexAction, new: &LexAction) -> bool {
        match (current, new) {
            (LexAction::Error, _) => true,
            (LexAction::Accept { symbol: current }, LexAction::Accept { symbol: new }) => {
                let current_precedence = self.token_precedence(*current);
                let new_precedence = self.token_precedence(*new);
                match new_precedence.cmp(&current_precedence) {
                    Ordering::Greater => true,
                    Ordering::Less => false,
                    Ordering::Equal => {
                        if is_user_token(*current) && is_user_token(*new) {
                            self.record(format!(
                                "lexical conflict: tokens `{}` and `{}` match the same input",
                                self.lex_grammar.rule_name(*current),
                                self.lex_grammar.rule_name(*new),
                            ));
                        }
                        // Declaration order breaks the tie, auxiliary
                        // tokens yielding to user-visible ones.
                        (new.is_auxiliary(), new.index) < (current.is_auxiliary(), current.index)
                    }
                }
            }
            _ => false,
        }
    }

    fn token_precedence(&self, symbol: Symbol) -> i32 {
        if symbol.is_built_in() {
            0
        } else {
            self.lex_grammar.rule(symbol).precedence()
        }
    }

    fn record_shift_reduce(&mut self, lookahead: Symbol, reduced: Symbol) {
        self.record(format!(
            "shift/reduce conflict on lookahead `{}` while reducing `{}`",
            symbol_name(lookahead, self.grammar, self.lex_grammar),
            self.grammar.rule_name(reduced),
        ));
    }

    fn record(&mut self, description: String) {
        let conflict = Conflict { description };
        if !self.conflicts.contains(&conflict) {
            tracing::trace!(%conflict, "recorded conflict");
            self.conflicts.push(conflict);
        }
    }
}

fn is_user_token(symbol: Symbol) -> bool {
    !symbol.is_auxiliary() && !symbol.is_built_in()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_table::ParseStateId;
    use crate::rules::{character, i_token, prec, seq};
    use std::collections::BTreeSet;

    fn grammars() -> (PreparedGrammar, PreparedGrammar) {
        let grammar = PreparedGrammar::new(
            vec![
                ("expr".into(), seq(vec![i_token(0), i_token(1)])),
                ("stmt".into(), i_token(0)),
            ],
            vec![],
        )
        .unwrap();
        let lex_grammar = PreparedGrammar::new(
            vec![
                ("plus".into(), character([b'+'])),
                ("ident".into(), prec(2, character([b'i']))),
            ],
            vec![("ws".into(), character([b' ']))],
        )
        .unwrap();
        (grammar, lex_grammar)
    }

    fn shift(precedences: impl IntoIterator<Item = i32>) -> ParseAction {
        ParseAction::Shift {
            state: ParseStateId::new(1),
            precedence_values: BTreeSet::from_iter(precedences),
        }
    }

    fn reduce(precedence: i32, associativity: Option<Associativity>) -> ParseAction {
        ParseAction::Reduce {
            symbol: Symbol::non_terminal(0),
            consumed_symbol_count: 2,
            precedence,
            associativity,
        }
    }

    #[test]
    fn anything_beats_error_and_accept_beats_anything() {
        let (grammar, lex_grammar) = grammars();
        let mut manager = ConflictManager::new(&grammar, &lex_grammar);

        assert!(manager.resolve_parse_action(Symbol::token(0), &ParseAction::Error, &shift([0])));
        assert!(manager.resolve_parse_action(Symbol::token(0), &shift([0]), &ParseAction::Accept));
        assert!(!manager.resolve_parse_action(
            Symbol::token(0),
            &ParseAction::Accept,
            &reduce(9, None)
        ));
        assert!(manager.conflicts().is_empty());
    }

    #[test]
    fn later_shifts_replace_earlier_ones_silently() {
        let (grammar, lex_grammar) = grammars();
        let mut manager = ConflictManager::new(&grammar, &lex_grammar);
        assert!(manager.resolve_parse_action(Symbol::token(0), &shift([1]), &shift([2])));
        assert!(manager.conflicts().is_empty());
    }

    #[test]
    fn precedence_decides_shift_versus_reduce() {
        let (grammar, lex_grammar) = grammars();
        let mut manager = ConflictManager::new(&grammar, &lex_grammar);

        assert!(manager.resolve_parse_action(Symbol::token(0), &shift([1]), &reduce(2, None)));
        assert!(!manager.resolve_parse_action(Symbol::token(0), &shift([1, 3]), &reduce(2, None)));
        assert!(manager.conflicts().is_empty());
    }

    #[test]
    fn associativity_breaks_precedence_ties() {
        let (grammar, lex_grammar) = grammars();
        let mut manager = ConflictManager::new(&grammar, &lex_grammar);

        assert!(manager.resolve_parse_action(
            Symbol::token(0),
            &shift([2]),
            &reduce(2, Some(Associativity::Left))
        ));
        assert!(!manager.resolve_parse_action(
            Symbol::token(0),
            &shift([2]),
            &reduce(2, Some(Associativity::Right))
        ));
        assert!(manager.conflicts().is_empty());
    }

    #[test]
    fn unresolved_shift_reduce_keeps_the_shift_and_records() {
        let (grammar, lex_grammar) = grammars();
        let mut manager = ConflictManager::new(&grammar, &lex_grammar);

        assert!(!manager.resolve_parse_action(Symbol::token(0), &shift([2]), &reduce(2, None)));
        assert_eq!(manager.conflicts().len(), 1);
        assert!(manager.conflicts()[0]
            .to_string()
            .contains("shift/reduce conflict"));
    }

    #[test]
    fn reduce_reduce_prefers_precedence_then_keeps_current() {
        let (grammar, lex_grammar) = grammars();
        let mut manager = ConflictManager::new(&grammar, &lex_grammar);

        assert!(manager.resolve_parse_action(Symbol::token(0), &reduce(1, None), &reduce(2, None)));
        assert!(!manager.resolve_parse_action(
            Symbol::token(0),
            &reduce(2, None),
            &reduce(1, None)
        ));
        assert!(manager.conflicts().is_empty());

        assert!(!manager.resolve_parse_action(
            Symbol::token(0),
            &reduce(1, None),
            &reduce(1, None)
        ));
        assert_eq!(manager.conflicts().len(), 1);
        assert!(manager.conflicts()[0]
            .to_string()
            .contains("reduce/reduce conflict"));
    }

    #[test]
    fn lex_accepts_prefer_higher_precedence() {
        let (grammar, lex_grammar) = grammars();
        let mut manager = ConflictManager::new(&grammar, &lex_grammar);

        let plus = LexAction::Accept {
            symbol: Symbol::token(0),
        };
        let ident = LexAction::Accept {
            symbol: Symbol::token(1),
        };
        assert!(manager.resolve_lex_action(&LexAction::Error, &plus));
        // `ident` carries precedence 2 in its rule metadata.
        assert!(manager.resolve_lex_action(&plus, &ident));
        assert!(!manager.resolve_lex_action(&ident, &plus));
        assert!(manager.conflicts().is_empty());
    }

    #[test]
    fn lex_ties_fall_back_to_declaration_order_and_record() {
        let lex_grammar = PreparedGrammar::new(
            vec![
                ("kw_if".into(), character([b'i'])),
                ("ident".into(), character([b'i'])),
            ],
            vec![],
        )
        .unwrap();
        let grammar = PreparedGrammar::new(vec![("s".into(), i_token(0))], vec![]).unwrap();
        let mut manager = ConflictManager::new(&grammar, &lex_grammar);

        let kw_if = LexAction::Accept {
            symbol: Symbol::token(0),
        };
        let ident = LexAction::Accept {
            symbol: Symbol::token(1),
        };
        assert!(!manager.resolve_lex_action(&kw_if, &ident));
        assert_eq!(manager.conflicts().len(), 1);
        assert!(manager.conflicts()[0].to_string().contains("lexical conflict"));
    }

    #[test]
    fn auxiliary_tokens_lose_lex_ties_without_conflicts() {
        let (grammar, lex_grammar) = grammars();
        let mut manager = ConflictManager::new(&grammar, &lex_grammar);

        let plus = LexAction::Accept {
            symbol: Symbol::token(0),
        };
        let ws = LexAction::Accept {
            symbol: Symbol::token(0).auxiliary(),
        };
        assert!(!manager.resolve_lex_action(&plus, &ws));
        assert!(manager.resolve_lex_action(&ws, &plus));
        assert!(manager.conflicts().is_empty());
    }
}
