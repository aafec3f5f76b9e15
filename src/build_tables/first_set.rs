//! Transitive first symbols of a rule.

use super::rule_transitions::sym_transitions;
use crate::grammar::PreparedGrammar;
use crate::rules::{Rule, Symbol};
use crate::types::Set;

/// The terminal symbols a match of `rule` can begin with.
///
/// Nonterminal first symbols are expanded through the grammar; cycles in
/// the nonterminal reference graph contribute nothing further.
pub fn first_set(rule: &Rule, grammar: &PreparedGrammar) -> Set<Symbol> {
    let mut result = Set::default();
    let mut visited = Set::default();
    collect_first_symbols(rule, grammar, &mut visited, &mut result);
    result
}

fn collect_first_symbols(
    rule: &Rule,
    grammar: &PreparedGrammar,
    visited: &mut Set<Symbol>,
    result: &mut Set<Symbol>,
) {
    for symbol in sym_transitions(rule).keys() {
        if symbol.is_non_terminal() {
            if visited.insert(*symbol) {
                collect_first_symbols(grammar.rule(*symbol), grammar, visited, result);
            }
        } else {
            result.insert(*symbol);
        }
    }
}
