//! Half-open character ranges.
//!
//! A [`Span`] is `[start, end)` in character offsets. It owns no text; the
//! document it belongs to is tracked by whoever holds it.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// Immutable `[start, end)` character range with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "RawSpan")]
pub struct Span {
    start: usize,
    end: usize,
}

#[derive(Deserialize)]
struct RawSpan {
    start: usize,
    end: usize,
}

impl TryFrom<RawSpan> for Span {
    type Error = Error;

    fn try_from(raw: RawSpan) -> Result<Self> {
        Span::new(raw.start, raw.end)
    }
}

impl Span {
    /// Create a span, failing with [`Error::InvalidSpan`] if `start > end`.
    pub fn new(start: usize, end: usize) -> Result<Self> {
        if start > end {
            return Err(Error::InvalidSpan { start, end });
        }
        Ok(Self { start, end })
    }

    /// Empty span positioned at `at`.
    #[must_use]
    pub const fn empty_at(at: usize) -> Self {
        Self { start: at, end: at }
    }

    /// Span between two positions, in either order.
    #[must_use]
    pub const fn covering(a: usize, b: usize) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    /// Start offset (inclusive).
    #[must_use]
    pub const fn start(&self) -> usize {
        self.start
    }

    /// End offset (exclusive).
    #[must_use]
    pub const fn end(&self) -> usize {
        self.end
    }

    /// Number of characters covered.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    /// True if `start == end`.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// True if the two ranges share at least one character.
    ///
    /// Empty spans overlap nothing.
    #[must_use]
    pub const fn overlaps(&self, other: &Span) -> bool {
        self.start < self.end
            && other.start < other.end
            && self.start < other.end
            && other.start < self.end
    }

    /// True if `other` lies entirely within this span.
    #[must_use]
    pub const fn encloses(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// True if the character offset `pos` is covered.
    #[must_use]
    pub const fn contains(&self, pos: usize) -> bool {
        self.start <= pos && pos < self.end
    }

    /// Smallest span covering both.
    #[must_use]
    pub fn union(&self, other: &Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Shared part of both spans, if they overlap.
    #[must_use]
    pub fn intersection(&self, other: &Span) -> Option<Span> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start < end).then_some(Span { start, end })
    }

    /// Slice `[rel_start, rel_end)` relative to this span's start.
    pub fn relative(&self, rel_start: usize, rel_end: usize) -> Result<Span> {
        if rel_start > rel_end {
            return Err(Error::InvalidSpan {
                start: rel_start,
                end: rel_end,
            });
        }
        if rel_end > self.len() {
            return Err(Error::out_of_bounds(format!(
                "relative end {rel_end} exceeds length {}",
                self.len()
            )));
        }
        Ok(Span {
            start: self.start + rel_start,
            end: self.start + rel_end,
        })
    }

    /// Convert to a standard range.
    #[must_use]
    pub const fn as_range(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl TryFrom<Range<usize>> for Span {
    type Error = Error;

    fn try_from(range: Range<usize>) -> Result<Self> {
        Span::new(range.start, range.end)
    }
}

impl From<Span> for Range<usize> {
    fn from(span: Span) -> Self {
        span.as_range()
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_after_end_is_rejected() {
        let err = Span::new(5, 3).unwrap_err();
        assert!(matches!(err, Error::InvalidSpan { start: 5, end: 3 }));
    }

    #[test]
    fn test_overlap_is_half_open() {
        let a = Span::new(0, 3).unwrap();
        let b = Span::new(3, 6).unwrap();
        let c = Span::new(2, 4).unwrap();

        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert!(c.overlaps(&b));
        assert!(!Span::empty_at(1).overlaps(&a));
    }

    #[test]
    fn test_union_and_intersection() {
        let a = Span::new(0, 4).unwrap();
        let b = Span::new(2, 9).unwrap();

        assert_eq!(a.union(&b), Span::new(0, 9).unwrap());
        assert_eq!(a.intersection(&b), Some(Span::new(2, 4).unwrap()));
        assert_eq!(a.intersection(&Span::new(4, 5).unwrap()), None);
        assert_eq!(Span::covering(9, 2), b);
    }

    #[test]
    fn test_relative_slice_bounds() {
        let span = Span::new(10, 20).unwrap();
        assert_eq!(span.relative(2, 5).unwrap(), Span::new(12, 15).unwrap());
        assert!(matches!(span.relative(0, 11), Err(Error::OutOfBounds(_))));
        assert!(matches!(span.relative(4, 2), Err(Error::InvalidSpan { .. })));
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: Span = serde_json::from_str(r#"{"start":1,"end":4}"#).unwrap();
        assert_eq!(ok.len(), 3);
        assert!(serde_json::from_str::<Span>(r#"{"start":4,"end":1}"#).is_err());
    }
}
