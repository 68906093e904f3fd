//! Token-order-insensitive string similarity.
//!
//! Retrieved chunks and labeled references often differ in ways that do not
//! matter for alignment: case, punctuation, a reordered clause. The fuzzy
//! rung of the resolver needs a score that ignores those and still punishes
//! real wording changes.
//!
//! ## Token Sort Ratio
//!
//! ```text
//! "The Cat, sat!"  -> lowercase, words -> [the, cat, sat] -> sort -> "cat sat the"
//! "sat the cat"    ->                     [sat, the, cat] ->         "cat sat the"
//!                                                                    ratio = 100
//! ```
//!
//! Words come from Unicode word segmentation (UAX #29), so punctuation and
//! whitespace never reach the comparison.
//!
//! ## The Ratio
//!
//! Normalized Indel similarity over characters:
//!
//! ```text
//! ratio(a, b) = 100 * 2 * LCS(a, b) / (|a| + |b|)
//! ```
//!
//! One substituted character in a 100-char sentence costs one deletion plus
//! one insertion: `100 * 198 / 200 = 99`.
//!
//! ## LCS Cost
//!
//! The longest common subsequence is computed with the bit-parallel
//! algorithm of Hyyrö (2004): one pass over the candidate, `ceil(m / 64)`
//! word operations per character, where `m` is the pattern length. Scoring
//! every sentence of a document against one chunk is therefore linear in the
//! document length for chunks up to 64 characters and a small multiple of
//! that beyond.

use std::collections::HashMap;

use unicode_segmentation::UnicodeSegmentation;

/// Lowercase, split into words, sort, and join with single spaces.
///
/// ```rust
/// use spanscore::similarity::sort_tokens;
///
/// assert_eq!(sort_tokens("The Cat, sat!"), "cat sat the");
/// ```
#[must_use]
pub fn sort_tokens(text: &str) -> String {
    let lower = text.to_lowercase();
    let mut words: Vec<&str> = lower.unicode_words().collect();
    words.sort_unstable();
    words.join(" ")
}

/// Similarity in `0.0..=100.0` between two texts, ignoring case,
/// punctuation and word order.
///
/// Two texts with no words at all score `0.0`.
///
/// ```rust
/// use spanscore::similarity::token_sort_ratio;
///
/// assert_eq!(token_sort_ratio("sat the cat", "The cat sat."), 100.0);
/// assert!(token_sort_ratio("the cat sat", "a dog ran") < 50.0);
/// ```
#[must_use]
pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    TokenSortMatcher::new(a).score(b)
}

/// Normalized Indel similarity of two strings, without any preprocessing.
#[must_use]
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    indel_ratio(BitLcs::new(&a).lcs(&b), a.len(), b.len())
}

fn indel_ratio(lcs: usize, a_len: usize, b_len: usize) -> f64 {
    let total = a_len + b_len;
    if total == 0 {
        return 0.0;
    }
    200.0 * lcs as f64 / total as f64
}

/// A chunk prepared once for scoring against many candidates.
///
/// The resolver compares one chunk with every sentence of a document; this
/// keeps the sorted tokens and the LCS bit masks of the chunk around between
/// comparisons.
#[derive(Debug, Clone)]
pub struct TokenSortMatcher {
    pattern: BitLcs,
}

impl TokenSortMatcher {
    /// Prepare `text` for scoring.
    #[must_use]
    pub fn new(text: &str) -> Self {
        let sorted: Vec<char> = sort_tokens(text).chars().collect();
        Self {
            pattern: BitLcs::new(&sorted),
        }
    }

    /// Character length of the sorted-token form of the pattern.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pattern.len
    }

    /// Whether the pattern has no words.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pattern.len == 0
    }

    /// Token sort ratio between the pattern and `candidate`.
    #[must_use]
    pub fn score(&self, candidate: &str) -> f64 {
        let sorted: Vec<char> = sort_tokens(candidate).chars().collect();
        self.score_sorted(&sorted)
    }

    /// Score a candidate that has already been through [`sort_tokens`].
    #[must_use]
    pub fn score_sorted(&self, candidate: &[char]) -> f64 {
        indel_ratio(self.pattern.lcs(candidate), self.pattern.len, candidate.len())
    }

    /// Highest score any candidate of `candidate_len` characters could reach.
    ///
    /// LCS never exceeds the shorter string, so a candidate much shorter or
    /// longer than the pattern is bounded well below 100.
    #[must_use]
    pub fn upper_bound(&self, candidate_len: usize) -> f64 {
        indel_ratio(
            self.pattern.len.min(candidate_len),
            self.pattern.len,
            candidate_len,
        )
    }
}

/// Match masks for the bit-parallel LCS.
///
/// Bit `i` of `masks[c]` is set when `pattern[i] == c`.
#[derive(Debug, Clone)]
struct BitLcs {
    masks: HashMap<char, Vec<u64>>,
    words: usize,
    len: usize,
}

impl BitLcs {
    fn new(pattern: &[char]) -> Self {
        let words = pattern.len().div_ceil(64);
        let mut masks: HashMap<char, Vec<u64>> = HashMap::new();
        for (i, &c) in pattern.iter().enumerate() {
            masks.entry(c).or_insert_with(|| vec![0; words])[i / 64] |= 1u64 << (i % 64);
        }
        Self {
            masks,
            words,
            len: pattern.len(),
        }
    }

    /// Length of the longest common subsequence with `text`.
    fn lcs(&self, text: &[char]) -> usize {
        if self.len == 0 || text.is_empty() {
            return 0;
        }

        let mut v = vec![u64::MAX; self.words];
        for c in text {
            // A character absent from the pattern leaves V unchanged.
            let Some(mask) = self.masks.get(c) else {
                continue;
            };

            let mut carry = false;
            for (vw, &mw) in v.iter_mut().zip(mask) {
                let u = *vw & mw;
                let (sum, c1) = vw.overflowing_add(u);
                let (sum, c2) = sum.overflowing_add(u64::from(carry));
                carry = c1 || c2;
                *vw = sum | (*vw - u);
            }
        }

        // Zero bits within the pattern length are matched positions.
        let tail = self.len % 64;
        v.iter()
            .enumerate()
            .map(|(w, &vw)| {
                let mask = if w + 1 == self.words && tail != 0 {
                    (1u64 << tail) - 1
                } else {
                    u64::MAX
                };
                (!vw & mask).count_ones() as usize
            })
            .sum()
    }
}
