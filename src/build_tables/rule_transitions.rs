//! Symbol and character derivatives of rules.
//!
//! For a rule `r`, the transitions of `r` map each symbol (or disjoint
//! character set) that a match of `r` can begin with to the residual rule
//! left over after consuming it. Both table builders are driven by this
//! single-step derivative.

use crate::rules::{CharacterSet, Rule, Symbol};
use crate::types::Map;

/// The symbol derivative of a rule.
pub fn sym_transitions(rule: &Rule) -> Map<Symbol, Rule> {
    let mut result = Map::default();
    match rule {
        Rule::Symbol(symbol) => {
            result.insert(*symbol, Rule::Blank);
        }
        Rule::Choice(children) => {
            for child in children {
                for (symbol, residual) in sym_transitions(child) {
                    merge_sym_transition(&mut result, symbol, residual);
                }
            }
        }
        Rule::Seq(left, right) => {
            for (symbol, residual) in sym_transitions(left) {
                let residual = Rule::seq_build(residual, (**right).clone());
                merge_sym_transition(&mut result, symbol, residual);
            }
            if left.is_nullable() {
                for (symbol, residual) in sym_transitions(right) {
                    merge_sym_transition(&mut result, symbol, residual);
                }
            }
        }
        Rule::Repeat(inner) => {
            for (symbol, residual) in sym_transitions(inner) {
                // seq_build collapses a blank residual to the repeat node
                // itself, which keeps the set of reachable rules finite.
                let residual = Rule::seq_build(residual, rule.clone());
                merge_sym_transition(&mut result, symbol, residual);
            }
        }
        Rule::Metadata { rule: inner, params } => {
            for (symbol, residual) in sym_transitions(inner) {
                result.insert(
                    symbol,
                    Rule::Metadata {
                        rule: Box::new(residual),
                        params: params.clone(),
                    },
                );
            }
        }
        Rule::Blank | Rule::NamedSymbol(_) | Rule::CharacterSet(_) => {}
    }
    result
}

/// The character derivative of a rule. Keys are pairwise disjoint.
pub fn char_transitions(rule: &Rule) -> Map<CharacterSet, Rule> {
    let mut result = Map::default();
    match rule {
        Rule::CharacterSet(characters) => {
            if !characters.is_empty() {
                result.insert(characters.clone(), Rule::Blank);
            }
        }
        Rule::Choice(children) => {
            for child in children {
                for (characters, residual) in char_transitions(child) {
                    merge_char_transition(&mut result, characters, residual);
                }
            }
        }
        Rule::Seq(left, right) => {
            for (characters, residual) in char_transitions(left) {
                let residual = Rule::seq_build(residual, (**right).clone());
                merge_char_transition(&mut result, characters, residual);
            }
            if left.is_nullable() {
                for (characters, residual) in char_transitions(right) {
                    merge_char_transition(&mut result, characters, residual);
                }
            }
        }
        Rule::Repeat(inner) => {
            for (characters, residual) in char_transitions(inner) {
                let residual = Rule::seq_build(residual, rule.clone());
                merge_char_transition(&mut result, characters, residual);
            }
        }
        Rule::Metadata { rule: inner, params } => {
            for (characters, residual) in char_transitions(inner) {
                merge_char_transition(
                    &mut result,
                    characters,
                    Rule::Metadata {
                        rule: Box::new(residual),
                        params: params.clone(),
                    },
                );
            }
        }
        Rule::Blank | Rule::NamedSymbol(_) | Rule::Symbol(_) => {}
    }
    result
}

fn merge_sym_transition(map: &mut Map<Symbol, Rule>, symbol: Symbol, residual: Rule) {
    match map.entry(symbol) {
        indexmap::map::Entry::Occupied(mut entry) => {
            let merged = Rule::choice_build(vec![entry.get().clone(), residual]);
            entry.insert(merged);
        }
        indexmap::map::Entry::Vacant(entry) => {
            entry.insert(residual);
        }
    }
}

fn merge_char_transition(map: &mut Map<CharacterSet, Rule>, characters: CharacterSet, residual: Rule) {
    add_char_transition(map, characters, residual, |left, right| {
        Rule::choice_build(vec![left.clone(), right.clone()])
    });
}

/// Insert a character-keyed transition, splitting overlapping keys so the
/// result stays a partition: every byte maps to exactly one key, whose
/// value merges the values of all contributing transitions.
pub(crate) fn add_char_transition<T, F>(
    map: &mut Map<CharacterSet, T>,
    characters: CharacterSet,
    value: T,
    merge: F,
) where
    T: Clone,
    F: Fn(&T, &T) -> T,
{
    let mut remaining = characters;
    let mut result = Map::with_capacity_and_hasher(map.len() + 1, Default::default());
    for (existing, existing_value) in map.drain(..) {
        let common = existing.intersection(&remaining);
        if common.is_empty() {
            result.insert(existing, existing_value);
            continue;
        }
        let existing_only = existing.difference(&common);
        if !existing_only.is_empty() {
            result.insert(existing_only, existing_value.clone());
        }
        remaining = remaining.difference(&common);
        result.insert(common, merge(&existing_value, &value));
    }
    if !remaining.is_empty() {
        result.insert(remaining, value);
    }
    *map = result;
}
