//! Sets of bytes, kept as sorted lists of inclusive ranges.

use std::fmt;

/// A set of byte values.
///
/// The range list is always canonical: sorted, disjoint, and with touching
/// ranges merged. Equality and ordering are therefore semantic: two sets
/// containing the same bytes compare equal no matter how they were built.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CharacterSet {
    ranges: Vec<(u8, u8)>,
}

impl CharacterSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn single(byte: u8) -> Self {
        Self {
            ranges: vec![(byte, byte)],
        }
    }

    /// The inclusive range `lo..=hi`.
    pub fn range(lo: u8, hi: u8) -> Self {
        assert!(lo <= hi, "empty character range");
        Self {
            ranges: vec![(lo, hi)],
        }
    }

    /// All bytes except the given ones.
    pub fn negated<I>(bytes: I) -> Self
    where
        I: IntoIterator<Item = u8>,
    {
        bytes.into_iter().collect::<Self>().complement()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn contains(&self, byte: u8) -> bool {
        self.ranges.iter().any(|&(lo, hi)| lo <= byte && byte <= hi)
    }

    pub fn ranges(&self) -> &[(u8, u8)] {
        &self.ranges
    }

    fn size(&self) -> u32 {
        self.ranges
            .iter()
            .map(|&(lo, hi)| u32::from(hi) - u32::from(lo) + 1)
            .sum()
    }

    pub fn union(&self, other: &Self) -> Self {
        let mut ranges = self.ranges.clone();
        ranges.extend_from_slice(&other.ranges);
        Self::normalized(ranges)
    }

    pub fn intersection(&self, other: &Self) -> Self {
        let mut ranges = Vec::new();
        for &(a_lo, a_hi) in &self.ranges {
            for &(b_lo, b_hi) in &other.ranges {
                let lo = a_lo.max(b_lo);
                let hi = a_hi.min(b_hi);
                if lo <= hi {
                    ranges.push((lo, hi));
                }
            }
        }
        Self::normalized(ranges)
    }

    pub fn difference(&self, other: &Self) -> Self {
        self.intersection(&other.complement())
    }

    /// The complement relative to the full byte space `0..=255`.
    pub fn complement(&self) -> Self {
        let mut ranges = Vec::new();
        let mut next: u32 = 0;
        for &(lo, hi) in &self.ranges {
            if u32::from(lo) > next {
                ranges.push((next as u8, lo - 1));
            }
            next = u32::from(hi) + 1;
        }
        if next <= 255 {
            ranges.push((next as u8, 255));
        }
        Self { ranges }
    }

    fn normalized(mut ranges: Vec<(u8, u8)>) -> Self {
        ranges.sort_unstable();
        let mut merged: Vec<(u8, u8)> = Vec::with_capacity(ranges.len());
        for (lo, hi) in ranges {
            match merged.last_mut() {
                Some(last) if u32::from(lo) <= u32::from(last.1) + 1 => {
                    last.1 = last.1.max(hi);
                }
                _ => merged.push((lo, hi)),
            }
        }
        Self { ranges: merged }
    }
}

impl FromIterator<u8> for CharacterSet {
    fn from_iter<I: IntoIterator<Item = u8>>(iter: I) -> Self {
        Self::normalized(iter.into_iter().map(|b| (b, b)).collect())
    }
}

impl fmt::Debug for CharacterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for CharacterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Wide sets read better through their complement.
        if self.size() > 128 {
            let inverse = self.complement();
            if !inverse.is_empty() {
                f.write_str("[^")?;
                write_ranges(f, &inverse.ranges)?;
                return f.write_str("]");
            }
        }
        f.write_str("[")?;
        write_ranges(f, &self.ranges)?;
        f.write_str("]")
    }
}

fn write_ranges(f: &mut fmt::Formatter<'_>, ranges: &[(u8, u8)]) -> fmt::Result {
    for &(lo, hi) in ranges {
        write_byte(f, lo)?;
        if hi > lo {
            if hi > lo + 1 {
                f.write_str("-")?;
            }
            write_byte(f, hi)?;
        }
    }
    Ok(())
}

fn write_byte(f: &mut fmt::Formatter<'_>, byte: u8) -> fmt::Result {
    match byte {
        b'\n' => f.write_str("\\n"),
        b'\t' => f.write_str("\\t"),
        b'\r' => f.write_str("\\r"),
        0x21..=0x7e => write!(f, "{}", byte as char),
        _ => write!(f, "\\x{:02x}", byte),
    }
}
