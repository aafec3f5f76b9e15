//! Closure of parse item sets over nonterminal expansions.

use super::first_set::first_set;
use super::item::{ParseItem, ParseItemSet};
use super::rule_transitions::sym_transitions;
use crate::grammar::PreparedGrammar;
use std::collections::VecDeque;

/// Expand an item set to a fixed point: whenever an item's remainder can
/// begin with a nonterminal `N`, the set also contains a fresh item for
/// `N`'s rule under every lookahead that can follow `N` there.
pub fn item_set_closure(item_set: ParseItemSet, grammar: &PreparedGrammar) -> ParseItemSet {
    let mut result = ParseItemSet::new();
    let mut queue: VecDeque<ParseItem> = item_set.into_iter().collect();

    while let Some(item) = queue.pop_front() {
        if !result.insert(item.clone()) {
            continue;
        }
        for (symbol, remainder) in sym_transitions(&item.rule) {
            if !symbol.is_non_terminal() {
                continue;
            }
            let mut lookaheads = first_set(&remainder, grammar);
            if remainder.is_nullable() {
                lookaheads.insert(item.lookahead);
            }
            let body = grammar.rule(symbol);
            for lookahead in lookaheads {
                queue.push_back(ParseItem::new(symbol, body.clone(), 0, lookahead));
            }
        }
    }

    result
}
