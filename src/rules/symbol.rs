//! Interned grammar symbols.

use std::fmt;

/// Bit flags attached to an interned symbol.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct SymbolOptions(u8);

impl SymbolOptions {
    pub const NONE: Self = Self(0);
    /// The symbol names a lexical rule rather than a syntactic one.
    pub const TOKEN: Self = Self(1 << 0);
    /// The symbol names an auxiliary rule, invisible in parse trees.
    pub const AUXILIARY: Self = Self(1 << 1);
    /// Reserved symbols that belong to no grammar.
    pub const BUILT_IN: Self = Self(1 << 2);

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl std::ops::BitOr for SymbolOptions {
    type Output = Self;

    fn bitor(self, other: Self) -> Self {
        self.union(other)
    }
}

impl fmt::Debug for SymbolOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut started = false;
        for (flag, name) in [
            (Self::TOKEN, "TOKEN"),
            (Self::AUXILIARY, "AUXILIARY"),
            (Self::BUILT_IN, "BUILT_IN"),
        ] {
            if self.contains(flag) {
                if started {
                    f.write_str("|")?;
                }
                f.write_str(name)?;
                started = true;
            }
        }
        if !started {
            f.write_str("NONE")?;
        }
        Ok(())
    }
}

/// A symbol interned by index into the rule list of its owning grammar.
///
/// The `AUXILIARY` flag selects the auxiliary rule list, the `TOKEN` flag
/// selects the lexical grammar over the syntactic one.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol {
    pub index: u32,
    pub options: SymbolOptions,
}

impl Symbol {
    /// Reserved nonterminal for the synthetic top-level rule.
    pub const START: Self = Self {
        index: 0,
        options: SymbolOptions::BUILT_IN,
    };

    /// Reserved token meaning the end of input.
    pub const END_OF_INPUT: Self = Self {
        index: 1,
        options: SymbolOptions::BUILT_IN.union(SymbolOptions::TOKEN),
    };

    pub const fn non_terminal(index: u32) -> Self {
        Self {
            index,
            options: SymbolOptions::NONE,
        }
    }

    pub const fn token(index: u32) -> Self {
        Self {
            index,
            options: SymbolOptions::TOKEN,
        }
    }

    /// The same symbol, resolved against the auxiliary rule list.
    pub const fn auxiliary(self) -> Self {
        Self {
            index: self.index,
            options: self.options.union(SymbolOptions::AUXILIARY),
        }
    }

    pub fn is_token(&self) -> bool {
        self.options.contains(SymbolOptions::TOKEN)
    }

    pub fn is_auxiliary(&self) -> bool {
        self.options.contains(SymbolOptions::AUXILIARY)
    }

    pub fn is_built_in(&self) -> bool {
        self.options.contains(SymbolOptions::BUILT_IN)
    }

    pub fn is_non_terminal(&self) -> bool {
        !self.is_token() && !self.is_built_in()
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::START {
            return f.write_str("$start");
        }
        if *self == Self::END_OF_INPUT {
            return f.write_str("$end");
        }
        if self.is_auxiliary() {
            f.write_str("aux_")?;
        }
        if self.is_token() {
            write!(f, "tok({})", self.index)
        } else {
            write!(f, "sym({})", self.index)
        }
    }
}
