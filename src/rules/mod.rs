//! The rule algebra that prepared grammars are written in.
//!
//! Rules are immutable trees with structural equality and hashing. The
//! smart constructors keep every tree in canonical form (sorted and
//! deduplicated `Choice` children, a right-skewed `Seq` spine, canonical
//! `CharacterSet` ranges), so equal rules are representationally identical
//! and can key the item-set interning maps directly.

mod character_set;
mod symbol;

pub use character_set::CharacterSet;
pub use symbol::{Symbol, SymbolOptions};

use std::collections::BTreeMap;

/// Keys of the metadata map that can wrap a rule.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MetadataKey {
    /// Conflict-resolution priority of the wrapped rule.
    Precedence,
    /// Declared associativity, encoded as [`ASSOC_LEFT`] / [`ASSOC_RIGHT`].
    Associativity,
    /// Zero-width marker separating leading whitespace from a token body.
    StartToken,
}

pub const ASSOC_LEFT: i32 = 1;
pub const ASSOC_RIGHT: i32 = 2;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Associativity {
    Left,
    Right,
}

pub type MetadataParams = BTreeMap<MetadataKey, i32>;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Rule {
    /// The empty string.
    Blank,
    /// A reference by name, resolved away during grammar preparation.
    NamedSymbol(String),
    /// An interned reference into a prepared grammar.
    Symbol(Symbol),
    CharacterSet(CharacterSet),
    /// Alternation. Children are canonical: flattened, sorted, distinct.
    Choice(Vec<Rule>),
    /// Concatenation, right-skewed.
    Seq(Box<Rule>, Box<Rule>),
    /// Zero-or-more repetition.
    Repeat(Box<Rule>),
    /// A rule carrying metadata. The wrapper survives every transition.
    Metadata {
        rule: Box<Rule>,
        params: MetadataParams,
    },
}

impl Rule {
    /// Build an alternation in canonical form.
    ///
    /// Nested choices are flattened, duplicates dropped, children sorted.
    /// A single distinct child collapses to itself, no children to `Blank`.
    pub fn choice_build(children: Vec<Rule>) -> Rule {
        let mut flat = Vec::with_capacity(children.len());
        for child in children {
            flatten_choice(child, &mut flat);
        }
        flat.sort();
        flat.dedup();
        match flat.len() {
            0 => Rule::Blank,
            1 => flat.pop().unwrap(),
            _ => Rule::Choice(flat),
        }
    }

    /// Build a concatenation in right-skewed form. `Blank` is the identity
    /// on both sides.
    pub fn seq_build(left: Rule, right: Rule) -> Rule {
        match (left, right) {
            (Rule::Blank, right) => right,
            (left, Rule::Blank) => left,
            (Rule::Seq(a, b), right) => Rule::Seq(a, Box::new(Rule::seq_build(*b, right))),
            (left, right) => Rule::Seq(Box::new(left), Box::new(right)),
        }
    }

    /// Whether the rule is the empty string, seen through metadata wrappers.
    pub fn is_blank(&self) -> bool {
        match self {
            Rule::Blank => true,
            Rule::Metadata { rule, .. } => rule.is_blank(),
            _ => false,
        }
    }

    /// Whether the rule can match the empty string.
    pub fn is_nullable(&self) -> bool {
        match self {
            Rule::Blank | Rule::Repeat(_) => true,
            Rule::Choice(children) => children.iter().any(Rule::is_nullable),
            Rule::Seq(left, right) => left.is_nullable() && right.is_nullable(),
            Rule::Metadata { rule, .. } => rule.is_nullable(),
            Rule::NamedSymbol(_) | Rule::Symbol(_) | Rule::CharacterSet(_) => false,
        }
    }

    /// The maximum `Precedence` value attached anywhere in the tree,
    /// 0 when absent.
    pub fn precedence(&self) -> i32 {
        fn walk(rule: &Rule, found: &mut Option<i32>) {
            match rule {
                Rule::Metadata { rule, params } => {
                    if let Some(&value) = params.get(&MetadataKey::Precedence) {
                        *found = Some(found.map_or(value, |prev| prev.max(value)));
                    }
                    walk(rule, found);
                }
                Rule::Choice(children) => {
                    for child in children {
                        walk(child, found);
                    }
                }
                Rule::Seq(left, right) => {
                    walk(left, found);
                    walk(right, found);
                }
                Rule::Repeat(inner) => walk(inner, found),
                _ => {}
            }
        }
        let mut found = None;
        walk(self, &mut found);
        found.unwrap_or(0)
    }

    /// The declared associativity on the outermost metadata spine.
    pub fn associativity(&self) -> Option<Associativity> {
        match self {
            Rule::Metadata { rule, params } => match params.get(&MetadataKey::Associativity) {
                Some(&ASSOC_LEFT) => Some(Associativity::Left),
                Some(&ASSOC_RIGHT) => Some(Associativity::Right),
                _ => rule.associativity(),
            },
            _ => None,
        }
    }

    /// Whether a `StartToken` marker remains unconsumed in the tree.
    pub fn has_token_start(&self) -> bool {
        match self {
            Rule::Metadata { rule, params } => {
                params.get(&MetadataKey::StartToken) == Some(&1) || rule.has_token_start()
            }
            Rule::Choice(children) => children.iter().any(Rule::has_token_start),
            Rule::Seq(left, right) => left.has_token_start() || right.has_token_start(),
            Rule::Repeat(inner) => inner.has_token_start(),
            _ => false,
        }
    }
}

fn flatten_choice(rule: Rule, out: &mut Vec<Rule>) {
    match rule {
        Rule::Choice(children) => {
            for child in children {
                flatten_choice(child, out);
            }
        }
        other => out.push(other),
    }
}

pub fn blank() -> Rule {
    Rule::Blank
}

/// An unresolved reference by name. Pre-preparation only.
pub fn sym(name: &str) -> Rule {
    Rule::NamedSymbol(name.to_owned())
}

/// An interned nonterminal reference.
pub fn i_sym(index: u32) -> Rule {
    Rule::Symbol(Symbol::non_terminal(index))
}

/// An interned token reference.
pub fn i_token(index: u32) -> Rule {
    Rule::Symbol(Symbol::token(index))
}

pub fn i_aux_sym(index: u32) -> Rule {
    Rule::Symbol(Symbol::non_terminal(index).auxiliary())
}

pub fn character<I>(bytes: I) -> Rule
where
    I: IntoIterator<Item = u8>,
{
    Rule::CharacterSet(bytes.into_iter().collect())
}

pub fn char_range(lo: u8, hi: u8) -> Rule {
    Rule::CharacterSet(CharacterSet::range(lo, hi))
}

pub fn negated_character<I>(bytes: I) -> Rule
where
    I: IntoIterator<Item = u8>,
{
    Rule::CharacterSet(CharacterSet::negated(bytes))
}

pub fn choice(children: Vec<Rule>) -> Rule {
    Rule::choice_build(children)
}

pub fn seq(children: Vec<Rule>) -> Rule {
    children
        .into_iter()
        .rev()
        .fold(Rule::Blank, |tail, head| Rule::seq_build(head, tail))
}

/// Zero-or-more repetitions of a rule.
pub fn repeat(rule: Rule) -> Rule {
    Rule::Repeat(Box::new(rule))
}

/// At least one repetition of a rule.
pub fn one_or_more(rule: Rule) -> Rule {
    Rule::seq_build(rule.clone(), repeat(rule))
}

/// A sequence of single-byte character sets matching `s` literally.
pub fn str_rule(s: &str) -> Rule {
    seq(s.bytes().map(|b| character([b])).collect())
}

pub fn metadata(rule: Rule, params: MetadataParams) -> Rule {
    Rule::Metadata {
        rule: Box::new(rule),
        params,
    }
}

pub fn prec(value: i32, rule: Rule) -> Rule {
    metadata(rule, BTreeMap::from([(MetadataKey::Precedence, value)]))
}

pub fn prec_left(value: i32, rule: Rule) -> Rule {
    metadata(
        rule,
        BTreeMap::from([
            (MetadataKey::Precedence, value),
            (MetadataKey::Associativity, ASSOC_LEFT),
        ]),
    )
}

pub fn prec_right(value: i32, rule: Rule) -> Rule {
    metadata(
        rule,
        BTreeMap::from([
            (MetadataKey::Precedence, value),
            (MetadataKey::Associativity, ASSOC_RIGHT),
        ]),
    )
}

/// The zero-width marker recording where leading whitespace ends and a
/// token body begins.
pub fn token_start() -> Rule {
    metadata(
        Rule::Blank,
        BTreeMap::from([(MetadataKey::StartToken, 1)]),
    )
}
