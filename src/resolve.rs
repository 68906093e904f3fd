//! Locating retrieved chunks in their source document.
//!
//! A retrieval backend returns chunk *text*. To score it by character
//! overlap we need to know where that text sits in the document, and the
//! text rarely round-trips perfectly: chunkers trim whitespace, splitters
//! re-join lines, references drop a final period.
//!
//! ## The Resolution Ladder
//!
//! Each rung is tried in order; the first hit wins.
//!
//! ```text
//! 1. Exact        "The cat sat."  -> strip one "." -> find("The cat sat")
//! 2. Whitespace   "the  cat\nsat" -> (?i)the\s+cat\s+sat
//! 3. Fuzzy        best sentence by token sort ratio, accepted if >= 98
//! ```
//!
//! Rungs 1 and 2 are exact. Rung 3 splits the document on `.`, `!`, `?` and
//! newlines, scores every sentence against the chunk with
//! [`token_sort_ratio`](crate::similarity::token_sort_ratio), and returns the
//! first occurrence of the best sentence if it clears the threshold.
//!
//! ## Offsets
//!
//! Matching runs on bytes; returned spans are converted to character
//! offsets so they line up with labeled reference data.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::similarity::{sort_tokens, TokenSortMatcher};
use crate::{ChunkRecord, Error, MatchMethod, ResolutionFailure, Result, Span};

/// Default acceptance threshold for the fuzzy rung.
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 98.0;

// Sentence terminator with trailing whitespace, or a bare newline.
static SEGMENT_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]\s*|\n").expect("Invalid segment boundary regex"));

/// A successful resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Alignment {
    /// Character span in the document.
    pub span: Span,
    /// Rung that produced it.
    pub method: MatchMethod,
    /// Token sort ratio of the match (`100.0` for exact rungs).
    pub score: f64,
}

/// Resolves chunk text to a character span in a document.
///
/// ## Example
///
/// ```rust
/// use spanscore::{MatchMethod, SpanResolver};
///
/// let resolver = SpanResolver::new();
/// let doc = "Intro.  The   cat\nsat on the mat.";
///
/// let alignment = resolver.align("the cat sat", doc).unwrap();
/// assert_eq!(alignment.method, MatchMethod::Whitespace);
/// assert_eq!((alignment.span.start, alignment.span.end), (8, 21));
/// ```
#[derive(Debug, Clone)]
pub struct SpanResolver {
    threshold: f64,
}

impl SpanResolver {
    /// Create a resolver with the default fuzzy threshold (98).
    #[must_use]
    pub fn new() -> Self {
        Self {
            threshold: DEFAULT_FUZZY_THRESHOLD,
        }
    }

    /// Create a resolver with a custom fuzzy acceptance threshold.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidThreshold`] unless `threshold` is within `0..=100`.
    pub fn with_threshold(threshold: f64) -> Result<Self> {
        if !(0.0..=100.0).contains(&threshold) {
            return Err(Error::InvalidThreshold(threshold));
        }
        Ok(Self { threshold })
    }

    /// The fuzzy acceptance threshold.
    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Locate `chunk` in `document`.
    ///
    /// # Errors
    ///
    /// Returns a [`ResolutionFailure`] when no rung finds a confident match.
    pub fn resolve(
        &self,
        chunk: &str,
        document: &str,
    ) -> std::result::Result<Span, ResolutionFailure> {
        self.align(chunk, document).map(|a| a.span)
    }

    /// Locate `chunk` in `document`, reporting which rung matched.
    ///
    /// # Errors
    ///
    /// Returns a [`ResolutionFailure`] when no rung finds a confident match.
    pub fn align(
        &self,
        chunk: &str,
        document: &str,
    ) -> std::result::Result<Alignment, ResolutionFailure> {
        let stripped = chunk.strip_suffix('.').unwrap_or(chunk);
        if stripped.trim().is_empty() {
            return Err(ResolutionFailure::EmptyChunk);
        }

        if let Some(byte_start) = document.find(stripped) {
            let span = char_span(document, byte_start, byte_start + stripped.len());
            debug!(%span, "exact match");
            return Ok(Alignment {
                span,
                method: MatchMethod::Exact,
                score: 100.0,
            });
        }

        if let Some(span) = whitespace_match(stripped, document) {
            debug!(%span, "whitespace-tolerant match");
            return Ok(Alignment {
                span,
                method: MatchMethod::Whitespace,
                score: 100.0,
            });
        }

        self.fuzzy_match(chunk, document)
    }

    /// Resolve a chunk into a [`ChunkRecord`], unresolved on failure.
    ///
    /// Failures are logged at `warn` with their reason.
    #[must_use]
    pub fn resolve_record(&self, chunk: &str, document: &str) -> ChunkRecord {
        match self.align(chunk, document) {
            Ok(alignment) => ChunkRecord::resolved(chunk, alignment.span, alignment.method),
            Err(reason) => {
                warn!(
                    %reason,
                    chunk_chars = chunk.chars().count(),
                    "unresolved retrieved chunk"
                );
                ChunkRecord::unresolved(chunk)
            }
        }
    }

    fn fuzzy_match(
        &self,
        chunk: &str,
        document: &str,
    ) -> std::result::Result<Alignment, ResolutionFailure> {
        let matcher = TokenSortMatcher::new(chunk);
        if matcher.is_empty() {
            return Err(ResolutionFailure::EmptyChunk);
        }

        // Earliest segment wins ties.
        let mut best: Option<(f64, &str)> = None;
        for segment in SEGMENT_BOUNDARY.split(document) {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }

            let sorted: Vec<char> = sort_tokens(segment).chars().collect();
            if let Some((best_score, _)) = best {
                if matcher.upper_bound(sorted.len()) <= best_score {
                    continue;
                }
            }

            let score = matcher.score_sorted(&sorted);
            if best.map_or(true, |(best_score, _)| score > best_score) {
                best = Some((score, segment));
            }
        }

        let Some((score, segment)) = best else {
            return Err(ResolutionFailure::NoCandidates);
        };

        if score < self.threshold {
            debug!(best_score = score, threshold = self.threshold, "fuzzy match rejected");
            return Err(ResolutionFailure::BelowThreshold {
                best_score: score,
                threshold: self.threshold,
            });
        }

        // The segment is a slice of the document, so it is always found.
        let byte_start = document
            .find(segment)
            .ok_or(ResolutionFailure::NoCandidates)?;
        let span = char_span(document, byte_start, byte_start + segment.len());
        debug!(%span, score, "fuzzy sentence match");

        Ok(Alignment {
            span,
            method: MatchMethod::Fuzzy,
            score,
        })
    }
}

impl Default for SpanResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Case-insensitive search treating any whitespace run between words as
/// one or more whitespace characters.
///
/// Very long chunks can exceed the regex size limit; the rung is then
/// skipped and the fuzzy rung decides.
fn whitespace_match(chunk: &str, document: &str) -> Option<Span> {
    let words: Vec<String> = chunk.split_whitespace().map(regex::escape).collect();
    if words.is_empty() {
        return None;
    }

    let pattern = format!("(?i){}", words.join(r"\s+"));
    let re = match Regex::new(&pattern) {
        Ok(re) => re,
        Err(e) => {
            debug!(error = %e, "whitespace rung skipped");
            return None;
        }
    };

    re.find(document)
        .map(|m| char_span(document, m.start(), m.end()))
}

/// Convert a byte range of `text` into a character span.
fn char_span(text: &str, byte_start: usize, byte_end: usize) -> Span {
    let start = text[..byte_start].chars().count();
    let end = start + text[byte_start..byte_end].chars().count();
    Span { start, end }
}
