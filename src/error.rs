//! Error types for spanscore.

/// Errors that can occur while building inputs or evaluating queries.
///
/// Resolution failures are not in this list: an unresolved chunk is an
/// expected outcome, see [`ResolutionFailure`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Span end lies before its start.
    #[error("inverted span: end {end} < start {start}")]
    InvertedSpan {
        /// The start offset.
        start: usize,
        /// The end offset that preceded it.
        end: usize,
    },

    /// Offset was negative.
    #[error("negative offset: {0}")]
    NegativeOffset(i64),

    /// A reference descriptor is missing one of its offsets.
    #[error("reference {index} is missing `{field}`")]
    MissingOffset {
        /// Position of the descriptor within its query.
        index: usize,
        /// The absent field name.
        field: &'static str,
    },

    /// Acceptance threshold outside `0..=100`.
    #[error("invalid fuzzy threshold: {0} (must be within 0..=100)")]
    InvalidThreshold(f64),

    /// A query could not be scored.
    #[error("query {index}: {source}")]
    InvalidQuery {
        /// Position of the query within the dataset.
        index: usize,
        /// What was wrong with it.
        #[source]
        source: Box<Error>,
    },

    /// The retrieval backend failed.
    #[error("retriever error: {0}")]
    Retriever(String),

    /// Malformed reference JSON.
    #[error("reference parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for spanscore operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Why a chunk could not be located in its document.
///
/// Recoverable per chunk. The evaluator records it and keeps scoring.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ResolutionFailure {
    /// Chunk has no content after normalization.
    #[error("chunk is empty after normalization")]
    EmptyChunk,

    /// Document yields no sentence segments to compare against.
    #[error("document has no candidate segments")]
    NoCandidates,

    /// Best fuzzy candidate scored under the acceptance threshold.
    #[error("best fuzzy score {best_score:.2} below threshold {threshold:.2}")]
    BelowThreshold {
        /// Highest token-sort ratio found.
        best_score: f64,
        /// Threshold that was in force.
        threshold: f64,
    },
}
