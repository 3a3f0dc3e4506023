//! Ordered, coalesced sets of closed code-point intervals.
//!
//! Used by label transitions in lexer automatons and by their display
//! compaction: merged ranges print as single characters or `a..z`
//! ranges, non-printable or extended code points print as escaped hex,
//! and negative values print as `EOF`.

use std::fmt;

/// A set of closed `[low, high]` intervals over code points, kept
/// sorted and coalesced.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IntervalSet {
    intervals: Vec<(i32, i32)>,
}

impl IntervalSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn of(low: i32, high: i32) -> Self {
        let mut set = Self::new();
        set.add_range(low, high);
        set
    }

    pub fn single(value: i32) -> Self {
        Self::of(value, value)
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn intervals(&self) -> &[(i32, i32)] {
        &self.intervals
    }

    /// Insert a closed range, merging overlapping and adjacent entries.
    pub fn add_range(&mut self, low: i32, high: i32) {
        if low > high {
            return;
        }
        let mut merged = Vec::with_capacity(self.intervals.len() + 1);
        let mut new = (low, high);
        let mut placed = false;
        for &(a, b) in &self.intervals {
            if b + 1 < new.0 {
                merged.push((a, b));
            } else if new.1 + 1 < a {
                if !placed {
                    merged.push(new);
                    placed = true;
                }
                merged.push((a, b));
            } else {
                new = (new.0.min(a), new.1.max(b));
            }
        }
        if !placed {
            merged.push(new);
        }
        self.intervals = merged;
    }

    pub fn add(&mut self, value: i32) {
        self.add_range(value, value);
    }

    pub fn contains(&self, value: i32) -> bool {
        self.intervals
            .binary_search_by(|&(a, b)| {
                if value < a {
                    std::cmp::Ordering::Greater
                } else if value > b {
                    std::cmp::Ordering::Less
                } else {
                    std::cmp::Ordering::Equal
                }
            })
            .is_ok()
    }

    /// Number of contained code points
    pub fn len(&self) -> usize {
        self.intervals
            .iter()
            .map(|&(a, b)| (b - a + 1) as usize)
            .sum()
    }

    /// The n-th contained code point, in ascending order
    pub fn nth(&self, mut n: usize) -> Option<i32> {
        for &(a, b) in &self.intervals {
            let size = (b - a + 1) as usize;
            if n < size {
                return Some(a + n as i32);
            }
            n -= size;
        }
        None
    }

    /// Everything in `[0, max]` not contained in this set
    pub fn complement(&self, max: i32) -> IntervalSet {
        let mut out = IntervalSet::new();
        let mut next = 0;
        for &(a, b) in &self.intervals {
            if a > next {
                out.add_range(next, a - 1);
            }
            next = next.max(b + 1);
        }
        if next <= max {
            out.add_range(next, max);
        }
        out
    }
}

impl fmt::Display for IntervalSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for &(a, b) in &self.intervals {
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            if a == b {
                write!(f, "{}", display_code_point(a))?;
            } else {
                write!(f, "{}..{}", display_code_point(a), display_code_point(b))?;
            }
        }
        Ok(())
    }
}

/// Render one code point for edge labels: printable ASCII as the
/// glyph, negatives as EOF, everything else as escaped hex.
pub fn display_code_point(value: i32) -> String {
    if value < 0 {
        return "EOF".to_string();
    }
    match char::from_u32(value as u32) {
        Some(c) if (' '..='~').contains(&c) => format!("'{c}'"),
        _ => format!("\\u{{{value:X}}}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adjacent_ranges_coalesce() {
        let mut set = IntervalSet::new();
        set.add_range(97, 99);
        set.add_range(100, 122);
        assert_eq!(set.intervals(), &[(97, 122)]);
    }

    #[test]
    fn test_overlap_and_order() {
        let mut set = IntervalSet::new();
        set.add_range(50, 60);
        set.add_range(10, 20);
        set.add_range(15, 55);
        assert_eq!(set.intervals(), &[(10, 60)]);
    }

    #[test]
    fn test_disjoint_stays_split() {
        let mut set = IntervalSet::new();
        set.add(97);
        set.add(122);
        assert_eq!(set.intervals(), &[(97, 97), (122, 122)]);
        assert!(set.contains(97));
        assert!(!set.contains(98));
    }

    #[test]
    fn test_len_and_nth() {
        let mut set = IntervalSet::new();
        set.add_range(97, 99);
        set.add_range(48, 49);
        assert_eq!(set.len(), 5);
        assert_eq!(set.nth(0), Some(48));
        assert_eq!(set.nth(2), Some(97));
        assert_eq!(set.nth(4), Some(99));
        assert_eq!(set.nth(5), None);
    }

    #[test]
    fn test_complement() {
        let set = IntervalSet::of(97, 122);
        let complement = set.complement(0x10FFFF);
        assert!(complement.contains(96));
        assert!(complement.contains(123));
        assert!(!complement.contains(97));
        assert!(!complement.contains(122));
    }

    #[test]
    fn test_display_compaction() {
        let mut set = IntervalSet::new();
        set.add_range(97, 122);
        set.add(48);
        assert_eq!(set.to_string(), "'0', 'a'..'z'");
    }

    #[test]
    fn test_display_escapes_and_eof() {
        assert_eq!(display_code_point(-1), "EOF");
        assert_eq!(display_code_point(9), "\\u{9}");
        assert_eq!(display_code_point(0x1F600), "\\u{1F600}");
        assert_eq!(display_code_point(97), "'a'");
    }
}
