//! Prepared grammar definitions.
//!
//! A [`PreparedGrammar`] is the output of the upstream preparation passes:
//! named references interned to [`Symbol`]s, string and regex shorthands
//! desugared into the core rule variants. The same type serves both the
//! syntactic grammar (rule leaves are token symbols) and the lexical
//! grammar (rule leaves are character sets, entry *i* defining token *i*).

use crate::rules::{Rule, Symbol};

#[derive(Debug, thiserror::Error)]
pub enum GrammarError {
    #[error("rule `{rule_name}` references undefined rule #{index} (auxiliary: {auxiliary})")]
    UndefinedSymbol {
        rule_name: String,
        index: u32,
        auxiliary: bool,
    },

    #[error("rule `{rule_name}` contains an unresolved reference to `{name}`")]
    UnresolvedSymbol { rule_name: String, name: String },
}

/// An ordered set of rules with a designated start rule at index 0.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreparedGrammar {
    rules: Vec<(String, Rule)>,
    aux_rules: Vec<(String, Rule)>,
}

impl PreparedGrammar {
    /// Build a grammar, checking that every nonterminal reference resolves
    /// to an entry of one of the rule lists and that no named reference
    /// survived preparation.
    ///
    /// Token references point into the companion lexical grammar and are
    /// outside what a single grammar can validate.
    pub fn new(
        rules: Vec<(String, Rule)>,
        aux_rules: Vec<(String, Rule)>,
    ) -> Result<Self, GrammarError> {
        let grammar = Self { rules, aux_rules };
        for (name, rule) in grammar.rules.iter().chain(&grammar.aux_rules) {
            grammar.check_references(name, rule)?;
        }
        Ok(grammar)
    }

    fn check_references(&self, rule_name: &str, rule: &Rule) -> Result<(), GrammarError> {
        match rule {
            Rule::NamedSymbol(name) => Err(GrammarError::UnresolvedSymbol {
                rule_name: rule_name.to_owned(),
                name: name.clone(),
            }),
            Rule::Symbol(symbol) if symbol.is_non_terminal() => {
                let list = if symbol.is_auxiliary() {
                    &self.aux_rules
                } else {
                    &self.rules
                };
                if symbol.index as usize >= list.len() {
                    return Err(GrammarError::UndefinedSymbol {
                        rule_name: rule_name.to_owned(),
                        index: symbol.index,
                        auxiliary: symbol.is_auxiliary(),
                    });
                }
                Ok(())
            }
            Rule::Choice(children) => {
                for child in children {
                    self.check_references(rule_name, child)?;
                }
                Ok(())
            }
            Rule::Seq(left, right) => {
                self.check_references(rule_name, left)?;
                self.check_references(rule_name, right)
            }
            Rule::Repeat(inner) | Rule::Metadata { rule: inner, .. } => {
                self.check_references(rule_name, inner)
            }
            _ => Ok(()),
        }
    }

    pub fn rules(&self) -> &[(String, Rule)] {
        &self.rules
    }

    pub fn aux_rules(&self) -> &[(String, Rule)] {
        &self.aux_rules
    }

    /// Resolve an interned symbol to its rule.
    ///
    /// Built-in symbols have no rule here; passing one is a programmer
    /// error, as is an out-of-range index on a validated grammar.
    pub fn rule(&self, symbol: Symbol) -> &Rule {
        assert!(
            !symbol.is_built_in(),
            "built-in symbol {} has no grammar rule",
            symbol
        );
        let list = if symbol.is_auxiliary() {
            &self.aux_rules
        } else {
            &self.rules
        };
        &list[symbol.index as usize].1
    }

    pub fn rule_name(&self, symbol: Symbol) -> &str {
        if symbol == Symbol::START {
            return "$start";
        }
        if symbol == Symbol::END_OF_INPUT {
            return "$end";
        }
        let list = if symbol.is_auxiliary() {
            &self.aux_rules
        } else {
            &self.rules
        };
        &list[symbol.index as usize].0
    }
}

/// The display name of a symbol, resolved against whichever of the two
/// grammars owns it.
pub(crate) fn symbol_name<'g>(
    symbol: Symbol,
    grammar: &'g PreparedGrammar,
    lex_grammar: &'g PreparedGrammar,
) -> &'g str {
    if symbol.is_token() {
        lex_grammar.rule_name(symbol)
    } else {
        grammar.rule_name(symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{blank, character, choice, i_sym, i_token, seq, sym};

    #[test]
    fn resolves_rules_by_symbol() {
        let grammar = PreparedGrammar::new(
            vec![
                ("expr".into(), seq(vec![i_token(0), i_sym(1)])),
                ("tail".into(), choice(vec![i_token(1), blank()])),
            ],
            vec![("rest".into(), i_token(0))],
        )
        .unwrap();

        assert_eq!(
            *grammar.rule(Symbol::non_terminal(1)),
            choice(vec![i_token(1), blank()])
        );
        assert_eq!(
            *grammar.rule(Symbol::non_terminal(0).auxiliary()),
            i_token(0)
        );
        assert_eq!(grammar.rule_name(Symbol::non_terminal(0)), "expr");
        assert_eq!(grammar.rule_name(Symbol::END_OF_INPUT), "$end");
    }

    #[test]
    fn rejects_out_of_range_nonterminals() {
        let result = PreparedGrammar::new(vec![("a".into(), i_sym(3))], vec![]);
        assert!(matches!(
            result,
            Err(GrammarError::UndefinedSymbol { index: 3, .. })
        ));
    }

    #[test]
    fn rejects_unresolved_named_symbols() {
        let result = PreparedGrammar::new(
            vec![("a".into(), seq(vec![character([b'x']), sym("other")]))],
            vec![],
        );
        assert!(matches!(
            result,
            Err(GrammarError::UnresolvedSymbol { name, .. }) if name == "other"
        ));
    }

    #[test]
    fn token_references_are_not_checked_here() {
        // Tokens resolve against the companion lexical grammar.
        assert!(PreparedGrammar::new(vec![("a".into(), i_token(9))], vec![]).is_ok());
    }
}
