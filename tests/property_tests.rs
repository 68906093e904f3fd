#![allow(clippy::float_cmp)]
//! Property-based tests for span resolution and interval metrics.
//!
//! These tests verify the invariants the metric relies on:
//! - Symmetry: intersection does not depend on argument order
//! - Minimality: unions are sorted, disjoint and non-adjacent
//! - Idempotence: merging a union changes nothing
//! - Bounds: recall and precision stay within [0, 1]
//! - Round trip: any substring of a document resolves back onto itself

use proptest::prelude::*;
use spanscore::similarity::{ratio, token_sort_ratio};
use spanscore::{intersect, measure_overlap, total_length, union_merge, Span, SpanResolver};

// =============================================================================
// Test Generators
// =============================================================================

fn arbitrary_span() -> impl Strategy<Value = Span> {
    (0usize..200, 0usize..50).prop_map(|(start, len)| Span::new(start, start + len).unwrap())
}

fn nonempty_span() -> impl Strategy<Value = Span> {
    (0usize..200, 1usize..50).prop_map(|(start, len)| Span::new(start, start + len).unwrap())
}

fn span_set() -> impl Strategy<Value = Vec<Span>> {
    prop::collection::vec(arbitrary_span(), 0..20)
}

/// Prose-like text with sentence structure
fn document_text() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::string::string_regex("[A-Za-z]{2,10}").unwrap(), 5..60).prop_map(
        |words| {
            let mut result = String::new();
            for (i, word) in words.iter().enumerate() {
                result.push_str(word);
                if i % 7 == 6 {
                    result.push_str(". ");
                } else {
                    result.push(' ');
                }
            }
            result
        },
    )
}

// =============================================================================
// Invariant Helpers
// =============================================================================

/// Sorted, and no two ranges overlap or touch
fn is_minimal_union(spans: &[Span]) -> bool {
    spans.windows(2).all(|w| w[0].end < w[1].start)
}

/// Whether any two spans share at least one character
fn any_positive_overlap(spans: &[Span]) -> bool {
    spans.iter().enumerate().any(|(i, a)| {
        spans[i + 1..]
            .iter()
            .any(|b| intersect(*a, *b).is_some_and(|s| !s.is_empty()))
    })
}

/// Characters covered, by brute force
fn covered_chars(spans: &[Span]) -> usize {
    let mut covered = vec![false; 300];
    for span in spans {
        for c in covered.iter_mut().take(span.end).skip(span.start) {
            *c = true;
        }
    }
    covered.iter().filter(|&&c| c).count()
}

// =============================================================================
// Interval Algebra
// =============================================================================

proptest! {
    #[test]
    fn intersection_symmetric(a in arbitrary_span(), b in arbitrary_span()) {
        prop_assert_eq!(intersect(a, b), intersect(b, a));
    }

    #[test]
    fn intersection_within_both(a in arbitrary_span(), b in arbitrary_span()) {
        if let Some(i) = intersect(a, b) {
            prop_assert!(i.start >= a.start && i.end <= a.end);
            prop_assert!(i.start >= b.start && i.end <= b.end);
        }
    }

    #[test]
    fn union_is_minimal(spans in span_set()) {
        let union = union_merge(spans.clone());
        prop_assert!(is_minimal_union(union.spans()));
    }

    #[test]
    fn union_idempotent(spans in span_set()) {
        let once = union_merge(spans);
        let twice = union_merge(once.spans().to_vec());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn union_measures_coverage(spans in span_set()) {
        let union = union_merge(spans.clone());
        prop_assert_eq!(union.total_length(), covered_chars(&spans));
    }

    #[test]
    fn union_never_exceeds_sum(spans in span_set()) {
        let union = union_merge(spans.clone());
        prop_assert!(union.total_length() <= total_length(&spans));
        for span in &spans {
            prop_assert!(union.total_length() >= span.len());
        }
    }

    #[test]
    fn union_equals_sum_iff_no_overlap(spans in prop::collection::vec(nonempty_span(), 0..12)) {
        let union = union_merge(spans.clone());
        let lossless = union.total_length() == total_length(&spans);
        prop_assert_eq!(lossless, !any_positive_overlap(&spans));
    }
}

// =============================================================================
// Metrics
// =============================================================================

proptest! {
    #[test]
    fn recall_precision_bounded(refs in span_set(), retrieved in span_set()) {
        let overlap = measure_overlap(&refs, &retrieved);
        prop_assert!((0.0..=1.0).contains(&overlap.recall()));
        prop_assert!((0.0..=1.0).contains(&overlap.precision()));
    }

    #[test]
    fn self_retrieval_is_perfect(spans in prop::collection::vec(nonempty_span(), 1..10)) {
        let overlap = measure_overlap(&spans, &spans);
        prop_assert_eq!(overlap.recall(), 1.0);
        prop_assert_eq!(overlap.precision(), 1.0);
    }

    #[test]
    fn disjoint_retrieval_scores_zero(
        refs in prop::collection::vec((0usize..100, 1usize..20), 1..5),
        retrieved in prop::collection::vec((200usize..300, 1usize..20), 1..5),
    ) {
        let refs: Vec<Span> = refs.into_iter().map(|(s, l)| Span::new(s, s + l).unwrap()).collect();
        let retrieved: Vec<Span> =
            retrieved.into_iter().map(|(s, l)| Span::new(s, s + l).unwrap()).collect();
        let overlap = measure_overlap(&refs, &retrieved);
        prop_assert_eq!(overlap.recall(), 0.0);
        prop_assert_eq!(overlap.precision(), 0.0);
    }
}

// =============================================================================
// Resolution
// =============================================================================

proptest! {
    #[test]
    fn substring_resolves_onto_itself(
        doc in document_text(),
        a in 0usize..1000,
        b in 0usize..1000,
    ) {
        let chars: Vec<char> = doc.chars().collect();
        let (lo, hi) = (a.min(b) % chars.len(), a.max(b) % chars.len());
        let (lo, hi) = (lo.min(hi), lo.max(hi) + 1);
        let chunk: String = chars[lo..hi].iter().collect();
        let stripped = chunk.strip_suffix('.').unwrap_or(&chunk);
        prop_assume!(!stripped.trim().is_empty());

        let span = SpanResolver::new().resolve(&chunk, &doc).unwrap();
        let found: String = chars[span.start..span.end].iter().collect();
        prop_assert_eq!(found, stripped);
    }

    #[test]
    fn resolution_is_deterministic(doc in document_text(), chunk in "[a-z ]{5,40}") {
        let resolver = SpanResolver::new();
        prop_assert_eq!(resolver.resolve(&chunk, &doc), resolver.resolve(&chunk, &doc));
    }

    #[test]
    fn ratio_symmetric_and_bounded(a in ".{0,120}", b in ".{0,120}") {
        let ab = ratio(&a, &b);
        prop_assert!((0.0..=100.0).contains(&ab));
        prop_assert!((ab - ratio(&b, &a)).abs() < 1e-9);
    }

    #[test]
    fn token_sort_ignores_word_order(words in prop::collection::vec("[a-z]{1,8}", 1..12)) {
        let forward = words.join(" ");
        let backward: Vec<&str> = words.iter().rev().map(String::as_str).collect();
        prop_assert_eq!(token_sort_ratio(&forward, &backward.join("  ")), 100.0);
    }
}
