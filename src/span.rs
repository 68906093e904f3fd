//! Spans and chunk records: text with position metadata.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A contiguous character range in one document.
///
/// ## Character Offsets
///
/// `start` and `end` count Unicode scalar values (`char`s), not bytes.
/// Labeled reference data is produced that way, so retrieved spans must use
/// the same unit to be comparable:
///
/// ```rust
/// use spanscore::Span;
///
/// let text = "naïve cat";
/// let span = Span::new(6, 9).unwrap();
///
/// let covered: String = text.chars().skip(span.start).take(span.len()).collect();
/// assert_eq!(covered, "cat");
/// ```
///
/// `start` is inclusive and `end` exclusive, so `len = end - start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    /// First covered character.
    pub start: usize,
    /// One past the last covered character.
    pub end: usize,
}

impl Span {
    /// Offsets reported for a chunk that could not be resolved.
    pub const SENTINEL_OFFSETS: (i64, i64) = (-1, -1);

    /// Create a span.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvertedSpan`] if `end < start`.
    pub fn new(start: usize, end: usize) -> Result<Self> {
        if end < start {
            return Err(Error::InvertedSpan { start, end });
        }
        Ok(Self { start, end })
    }

    /// Create a span from signed offsets, as found in labeled data.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NegativeOffset`] for negative input and
    /// [`Error::InvertedSpan`] if `end < start`.
    pub fn try_from_signed(start: i64, end: i64) -> Result<Self> {
        let start = usize::try_from(start).map_err(|_| Error::NegativeOffset(start))?;
        let end = usize::try_from(end).map_err(|_| Error::NegativeOffset(end))?;
        Self::new(start, end)
    }

    /// Number of characters covered.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether this span covers nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The span as a range of character offsets.
    #[must_use]
    pub fn range(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Which rung of the resolution ladder located a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    /// Verbatim substring (after stripping one trailing period).
    Exact,
    /// Same words, any whitespace between them, any case.
    Whitespace,
    /// Best-scoring sentence above the fuzzy threshold.
    Fuzzy,
}

impl MatchMethod {
    /// Short name for logs and reports.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Whitespace => "whitespace",
            Self::Fuzzy => "fuzzy",
        }
    }
}

/// A retrieved chunk together with where it was found.
///
/// `span` is `None` when resolution failed. Collaborators that expect the
/// numeric sentinel can read it through [`ChunkRecord::offsets`]:
///
/// ```rust
/// use spanscore::ChunkRecord;
///
/// let record = ChunkRecord::unresolved("text that is nowhere");
/// assert_eq!(record.offsets(), (-1, -1));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkRecord {
    /// The chunk text as retrieved.
    pub text: String,
    /// Location in the source document, if resolved.
    pub span: Option<Span>,
    /// How the span was found.
    pub method: Option<MatchMethod>,
}

impl ChunkRecord {
    /// A chunk located by `method`.
    #[must_use]
    pub fn resolved(text: impl Into<String>, span: Span, method: MatchMethod) -> Self {
        Self {
            text: text.into(),
            span: Some(span),
            method: Some(method),
        }
    }

    /// A chunk that could not be located.
    #[must_use]
    pub fn unresolved(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            span: None,
            method: None,
        }
    }

    /// Whether a span was found.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.span.is_some()
    }

    /// `(start, end)` offsets, or `(-1, -1)` if unresolved.
    #[must_use]
    pub fn offsets(&self) -> (i64, i64) {
        match self.span {
            Some(span) => (signed(span.start), signed(span.end)),
            None => Span::SENTINEL_OFFSETS,
        }
    }
}

// Character offsets of an in-memory `str` never exceed `isize::MAX`.
fn signed(offset: usize) -> i64 {
    i64::try_from(offset).unwrap_or(i64::MAX)
}

impl std::fmt::Display for ChunkRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.span, self.method) {
            (Some(span), Some(method)) => write!(
                f,
                "ChunkRecord {{ span: {}, via: {}, len: {} }}",
                span,
                method.name(),
                self.text.chars().count()
            ),
            _ => write!(
                f,
                "ChunkRecord {{ unresolved, len: {} }}",
                self.text.chars().count()
            ),
        }
    }
}
