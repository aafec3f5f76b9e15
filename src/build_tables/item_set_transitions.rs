//! Lifting rule transitions to whole item sets.

use super::item::{LexItem, LexItemSet, ParseItem, ParseItemSet};
use super::item_set_closure::item_set_closure;
use super::rule_transitions::{self, add_char_transition};
use crate::grammar::PreparedGrammar;
use crate::rules::{CharacterSet, Symbol};
use crate::types::Map;

/// The successor item set for every symbol the given set can consume.
/// Each successor is returned closed.
pub fn sym_transitions(
    item_set: &ParseItemSet,
    grammar: &PreparedGrammar,
) -> Map<Symbol, ParseItemSet> {
    let mut buckets: Map<Symbol, ParseItemSet> = Map::default();
    for item in item_set {
        for (symbol, residual) in rule_transitions::sym_transitions(&item.rule) {
            buckets.entry(symbol).or_default().insert(ParseItem::new(
                item.lhs,
                residual,
                item.consumed_symbol_count + 1,
                item.lookahead,
            ));
        }
    }
    buckets
        .into_iter()
        .map(|(symbol, bucket)| (symbol, item_set_closure(bucket, grammar)))
        .collect()
}

/// The successor item set for every disjoint character set the given set
/// can consume. Overlapping sets contributed by different items are split
/// the same way as inside a single rule, with their buckets merged.
pub fn char_transitions(item_set: &LexItemSet) -> Map<CharacterSet, LexItemSet> {
    let mut result: Map<CharacterSet, LexItemSet> = Map::default();
    for item in item_set {
        for (characters, residual) in rule_transitions::char_transitions(&item.rule) {
            let bucket = LexItemSet::from([LexItem::new(item.lhs, residual)]);
            add_char_transition(&mut result, characters, bucket, |left, right| {
                left.union(right).cloned().collect()
            });
        }
    }
    result
}
