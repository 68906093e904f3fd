//! Interval algebra over character spans.
//!
//! Recall and precision are ratios of covered characters, so the only
//! operations needed are intersection, union and measure.
//!
//! ## Why Merge Before Measuring?
//!
//! Retrieved chunks overlap (chunkers add overlap on purpose), and several
//! references can cover the same passage. Summing raw lengths would count
//! shared characters twice:
//!
//! ```text
//! Retrieved: [0..10) [5..15)        raw sum = 20
//! Union:     [0..15)                covered = 15
//! ```
//!
//! ## Adjacency Merges
//!
//! `[0..5)` and `[5..8)` touch without overlapping. They merge into `[0..8)`:
//! the rule is `next.start <= last.end`, so contiguous coverage collapses
//! into one range. The measured length is the same either way; merging keeps
//! the union minimal.

use crate::Span;

/// Overlap of two spans.
///
/// Returns `None` when the spans are disjoint. Spans that merely touch
/// (`a.end == b.start`) produce a zero-length intersection, which is kept:
/// it contributes nothing to any length but is still an overlap.
///
/// ```rust
/// use spanscore::{intersect, Span};
///
/// let a = Span::new(0, 5).unwrap();
/// let b = Span::new(3, 10).unwrap();
/// assert_eq!(intersect(a, b), Some(Span::new(3, 5).unwrap()));
///
/// let c = Span::new(5, 8).unwrap();
/// assert_eq!(intersect(Span::new(0, 2).unwrap(), c), None);
/// ```
#[must_use]
pub fn intersect(a: Span, b: Span) -> Option<Span> {
    let start = a.start.max(b.start);
    let end = a.end.min(b.end);
    (start <= end).then_some(Span { start, end })
}

/// Union of a set of spans as a minimal sorted sequence of disjoint,
/// non-adjacent ranges.
///
/// ```rust
/// use spanscore::{union_merge, Span};
///
/// let spans = [(0, 5), (3, 8), (10, 12)].map(|(s, e)| Span::new(s, e).unwrap());
/// let union = union_merge(spans);
/// assert_eq!(union.spans(), &[Span::new(0, 8).unwrap(), Span::new(10, 12).unwrap()]);
/// ```
#[must_use]
pub fn union_merge<I>(spans: I) -> IntervalUnion
where
    I: IntoIterator<Item = Span>,
{
    let mut sorted: Vec<Span> = spans.into_iter().collect();
    if sorted.is_empty() {
        return IntervalUnion::default();
    }
    sorted.sort_unstable_by_key(|s| s.start);

    let mut merged: Vec<Span> = Vec::with_capacity(sorted.len());
    for span in sorted {
        match merged.last_mut() {
            // Overlapping or contiguous
            Some(last) if span.start <= last.end => {
                last.end = last.end.max(span.end);
            }
            _ => merged.push(span),
        }
    }

    IntervalUnion { spans: merged }
}

/// Sum of span lengths.
///
/// Performs no deduplication. Pass an [`IntervalUnion`] (or its spans) to
/// measure covered characters.
#[must_use]
pub fn total_length(spans: &[Span]) -> usize {
    spans.iter().map(Span::len).sum()
}

/// The union of a set of spans.
///
/// Only [`union_merge`] builds one, so the sequence is always sorted by start
/// and no two ranges satisfy `r1.end >= r2.start`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntervalUnion {
    spans: Vec<Span>,
}

impl IntervalUnion {
    /// The merged ranges, sorted by start.
    #[must_use]
    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    /// Iterate over the merged ranges.
    pub fn iter(&self) -> std::slice::Iter<'_, Span> {
        self.spans.iter()
    }

    /// Number of merged ranges.
    #[must_use]
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// Whether the union covers no ranges.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Characters covered by the union.
    #[must_use]
    pub fn total_length(&self) -> usize {
        total_length(&self.spans)
    }

    /// Take the merged ranges.
    #[must_use]
    pub fn into_vec(self) -> Vec<Span> {
        self.spans
    }
}

impl<'a> IntoIterator for &'a IntervalUnion {
    type Item = &'a Span;
    type IntoIter = std::slice::Iter<'a, Span>;

    fn into_iter(self) -> Self::IntoIter {
        self.spans.iter()
    }
}
