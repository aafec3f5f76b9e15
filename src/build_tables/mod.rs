//! Construction of the parse and lex tables.
//!
//! [`build_tables`] seeds a single item on the start rule, closes it, and
//! discovers parse states depth-first through the item-set transitions.
//! Every parse state is then annotated with a lex state recognizing the
//! terminals it expects, and a synthetic error lex state is built over all
//! token rules for the runtime's error-recovery mode.

pub mod conflict_manager;
pub mod first_set;
pub mod item;
pub mod item_set_closure;
pub mod item_set_transitions;
pub mod rule_transitions;

pub use conflict_manager::{Conflict, ConflictManager};
pub use first_set::first_set;
pub use item::{LexItem, LexItemSet, ParseItem, ParseItemSet};
pub use item_set_closure::item_set_closure;
pub use rule_transitions::{char_transitions, sym_transitions};

use crate::grammar::PreparedGrammar;
use crate::lex_table::{LexAction, LexStateId, LexTable};
use crate::parse_table::{ParseAction, ParseStateId, ParseTable};
use crate::rules::{self, CharacterSet, Rule, Symbol};
use crate::types::Map;
use std::collections::BTreeSet;

/// Build the parse and lex tables for a prepared grammar pair, together
/// with every conflict that precedence could not resolve.
///
/// The build always completes; the caller decides whether a non-empty
/// conflict list is fatal.
pub fn build_tables(
    grammar: &PreparedGrammar,
    lex_grammar: &PreparedGrammar,
) -> ((ParseTable, LexTable), Vec<Conflict>) {
    let mut builder = TableBuilder {
        grammar,
        lex_grammar,
        conflict_manager: ConflictManager::new(grammar, lex_grammar),
        parse_state_ids: Map::default(),
        lex_state_ids: Map::default(),
        parse_table: ParseTable::default(),
        lex_table: LexTable::default(),
    };
    builder.build();
    (
        (builder.parse_table, builder.lex_table),
        builder.conflict_manager.into_conflicts(),
    )
}

struct TableBuilder<'g> {
    grammar: &'g PreparedGrammar,
    lex_grammar: &'g PreparedGrammar,
    conflict_manager: ConflictManager<'g>,
    parse_state_ids: Map<ParseItemSet, ParseStateId>,
    lex_state_ids: Map<LexItemSet, LexStateId>,
    parse_table: ParseTable,
    lex_table: LexTable,
}

impl TableBuilder<'_> {
    #[tracing::instrument(skip_all)]
    fn build(&mut self) {
        let start_item = ParseItem::new(
            Symbol::START,
            Rule::Symbol(Symbol::non_terminal(0)),
            0,
            Symbol::END_OF_INPUT,
        );
        let start_set = item_set_closure(ParseItemSet::from([start_item]), self.grammar);
        self.add_parse_state(start_set);
        self.add_error_lex_state();
        tracing::debug!(
            parse_states = self.parse_table.states.len(),
            lex_states = self.lex_table.states.len(),
            conflicts = self.conflict_manager.conflicts().len(),
            "table construction finished",
        );
    }

    fn add_parse_state(&mut self, item_set: ParseItemSet) -> ParseStateId {
        if let Some(&id) = self.parse_state_ids.get(&item_set) {
            return id;
        }
        let state_id = self.parse_table.add_state();
        // Recorded before successors are explored so transitions back into
        // this set resolve to the id being built.
        self.parse_state_ids.insert(item_set.clone(), state_id);
        self.add_shift_actions(&item_set, state_id);
        self.add_reduce_actions(&item_set, state_id);
        self.assign_lex_state(state_id);
        state_id
    }

    fn add_shift_actions(&mut self, item_set: &ParseItemSet, state_id: ParseStateId) {
        for (symbol, next_item_set) in item_set_transitions::sym_transitions(item_set, self.grammar)
        {
            let precedence_values = precedence_values_for_item_set(&next_item_set);
            let new_action = ParseAction::Shift {
                state: ParseStateId::new(0),
                precedence_values: precedence_values.clone(),
            };
            let install = match self.parse_table.state(state_id).actions.get(&symbol) {
                None => true,
                Some(current) => {
                    let current = current.clone();
                    self.conflict_manager
                        .resolve_parse_action(symbol, &current, &new_action)
                }
            };
            if install {
                let next_state_id = self.add_parse_state(next_item_set);
                self.parse_table.add_action(
                    state_id,
                    symbol,
                    ParseAction::Shift {
                        state: next_state_id,
                        precedence_values,
                    },
                );
            }
        }
    }

    fn add_reduce_actions(&mut self, item_set: &ParseItemSet, state_id: ParseStateId) {
        for item in item_set.iter().filter(|item| item.is_done()) {
            let new_action = if item.lhs == Symbol::START {
                ParseAction::Accept
            } else {
                ParseAction::Reduce {
                    symbol: item.lhs,
                    consumed_symbol_count: item.consumed_symbol_count,
                    precedence: item.precedence(),
                    associativity: item.associativity(),
                }
            };
            let install = match self.parse_table.state(state_id).actions.get(&item.lookahead) {
                None => true,
                Some(current) => {
                    let current = current.clone();
                    self.conflict_manager
                        .resolve_parse_action(item.lookahead, &current, &new_action)
                }
            };
            if install {
                self.parse_table
                    .add_action(state_id, item.lookahead, new_action);
            }
        }
    }

    fn assign_lex_state(&mut self, state_id: ParseStateId) {
        let item_set = self.lex_item_set_for_parse_state(state_id);
        let lex_state_id = self.add_lex_state(item_set);
        self.parse_table.state_mut(state_id).lex_state_id = lex_state_id;
    }

    fn lex_item_set_for_parse_state(&self, state_id: ParseStateId) -> LexItemSet {
        let mut result = LexItemSet::new();
        for symbol in self.parse_table.state(state_id).expected_inputs() {
            if symbol == Symbol::END_OF_INPUT {
                result.insert(LexItem::new(symbol, after_separators(end_of_input_rule())));
            } else if symbol.is_token() && !symbol.is_built_in() {
                result.insert(LexItem::new(
                    symbol,
                    after_separators(self.lex_grammar.rule(symbol).clone()),
                ));
            }
        }
        result
    }

    fn add_lex_state(&mut self, item_set: LexItemSet) -> LexStateId {
        if let Some(&id) = self.lex_state_ids.get(&item_set) {
            return id;
        }
        let state_id = self.lex_table.add_state();
        self.lex_state_ids.insert(item_set.clone(), state_id);
        self.add_token_start(&item_set, state_id);
        self.add_advance_actions(&item_set, state_id);
        self.add_accept_token_actions(&item_set, state_id);
        state_id
    }

    fn add_token_start(&mut self, item_set: &LexItemSet, state_id: LexStateId) {
        if item_set.iter().any(LexItem::is_token_start) {
            self.lex_table.state_mut(state_id).is_token_start = true;
        }
    }

    fn add_advance_actions(&mut self, item_set: &LexItemSet, state_id: LexStateId) {
        for (characters, next_item_set) in item_set_transitions::char_transitions(item_set) {
            let next_state_id = self.add_lex_state(next_item_set);
            self.lex_table.add_action(
                state_id,
                characters,
                LexAction::Advance {
                    state: next_state_id,
                },
            );
        }
    }

    fn add_accept_token_actions(&mut self, item_set: &LexItemSet, state_id: LexStateId) {
        for item in item_set.iter().filter(|item| item.is_done()) {
            let new_action = LexAction::Accept { symbol: item.lhs };
            let current = self.lex_table.state(state_id).default_action.clone();
            if self
                .conflict_manager
                .resolve_lex_action(&current, &new_action)
            {
                self.lex_table.add_default_action(state_id, new_action);
            }
        }
    }

    /// The error-recovery lex state tries every token of the lexical
    /// grammar, auxiliary ones included, plus the end-of-input sentinel.
    fn add_error_lex_state(&mut self) {
        let mut item_set = LexItemSet::new();
        for (index, (_, rule)) in self.lex_grammar.rules().iter().enumerate() {
            item_set.insert(LexItem::new(
                Symbol::token(index as u32),
                after_separators(rule.clone()),
            ));
        }
        for (index, (_, rule)) in self.lex_grammar.aux_rules().iter().enumerate() {
            item_set.insert(LexItem::new(
                Symbol::token(index as u32).auxiliary(),
                after_separators(rule.clone()),
            ));
        }
        item_set.insert(LexItem::new(
            Symbol::END_OF_INPUT,
            after_separators(end_of_input_rule()),
        ));
        self.add_advance_actions(&item_set, LexTable::ERROR_STATE_ID);
        self.add_accept_token_actions(&item_set, LexTable::ERROR_STATE_ID);
    }
}

/// Precedences of the partially-recognized items in a shift target.
/// Freshly-expanded items (nothing consumed yet) do not contribute.
fn precedence_values_for_item_set(item_set: &ParseItemSet) -> BTreeSet<i32> {
    item_set
        .iter()
        .filter(|item| item.consumed_symbol_count > 0)
        .map(ParseItem::precedence)
        .collect()
}

/// Prefix a token rule with the separator run it may follow: any amount of
/// whitespace, then the marker recording where the token proper begins.
fn after_separators(rule: Rule) -> Rule {
    rules::seq(vec![
        rules::repeat(rules::character([b' ', b'\t', b'\n', b'\r'])),
        rules::token_start(),
        rule,
    ])
}

fn end_of_input_rule() -> Rule {
    Rule::CharacterSet(CharacterSet::single(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{blank, character, i_token, prec};

    #[test]
    fn after_separators_marks_the_token_start() {
        let rule = after_separators(character([b'a']));
        assert!(rule.has_token_start());

        // Consuming a separator keeps the marker pending.
        let transitions = char_transitions(&rule);
        let after_space = &transitions[&CharacterSet::from_iter([b' ', b'\t', b'\n', b'\r'])];
        assert!(after_space.has_token_start());

        // Consuming the first token character discharges it.
        let after_token_char = &transitions[&CharacterSet::single(b'a')];
        assert!(!after_token_char.has_token_start());
        assert!(after_token_char.is_blank());
    }

    #[test]
    fn precedence_values_ignore_fresh_items() {
        let item_set = ParseItemSet::from([
            ParseItem::new(Symbol::non_terminal(0), prec(3, blank()), 1, Symbol::END_OF_INPUT),
            ParseItem::new(
                Symbol::non_terminal(1),
                prec(7, i_token(0)),
                0,
                Symbol::END_OF_INPUT,
            ),
        ]);
        assert_eq!(precedence_values_for_item_set(&item_set), BTreeSet::from([3]));
    }

    #[test]
    fn error_lex_state_covers_all_tokens() {
        let grammar =
            PreparedGrammar::new(vec![("s".into(), i_token(0))], vec![]).unwrap();
        let lex_grammar = PreparedGrammar::new(
            vec![("a".into(), character([b'a']))],
            vec![("ws".into(), character([b'_']))],
        )
        .unwrap();

        let ((_, lex_table), conflicts) = build_tables(&grammar, &lex_grammar);
        assert!(conflicts.is_empty());

        let error_state = &lex_table.error_state;
        let on_a = error_state
            .actions
            .iter()
            .find(|(characters, _)| characters.contains(b'a'))
            .map(|(_, action)| action)
            .unwrap();
        let LexAction::Advance { state } = on_a else {
            panic!("expected an advance action on 'a'");
        };
        assert_eq!(
            lex_table.state(*state).default_action,
            LexAction::Accept {
                symbol: Symbol::token(0)
            }
        );

        // The auxiliary token and the end sentinel are reachable too.
        assert!(error_state
            .actions
            .keys()
            .any(|characters| characters.contains(b'_')));
        assert!(error_state
            .actions
            .keys()
            .any(|characters| characters.contains(0)));
    }
}
