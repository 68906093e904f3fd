//! Character-overlap recall and precision.
//!
//! ## The Metric
//!
//! Chunk-level metrics ("was the right chunk retrieved?") depend on the
//! chunker: a 200-char chunk and a 2000-char chunk containing the same answer
//! count the same. Measuring by characters does not:
//!
//! ```text
//! Document:   |----------------------------------------------|
//! Reference:          [=======]                 [====]
//! Retrieved:       [-------------]     [-----]     [---]
//! Overlap:            [=======]                    [=]
//!
//! recall    = |overlap| / |reference|   how much of the answer was found
//! precision = |overlap| / |retrieved|   how much of what was read mattered
//! ```
//!
//! All three sets are union-merged before measuring, so overlapping chunks
//! and duplicate references are never counted twice.
//!
//! ## Unresolved Chunks
//!
//! A retrieved chunk that cannot be located contributes no characters. It is
//! kept in [`QueryScore::retrieved`] and counted in
//! [`QueryScore::unresolved`], so a low precision caused by resolution
//! failures can be told apart from genuinely irrelevant retrieval.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::interval::{intersect, union_merge};
use crate::reference::reference_spans;
use crate::stats::{mean, sample_std};
use crate::{
    ChunkRecord, EvalConfig, Error, ReferenceDescriptor, Result, Retriever, Span, SpanResolver,
};

/// One query to score: a document, its labeled references and what the
/// backend retrieved.
#[derive(Debug, Clone)]
pub struct Query<'a> {
    /// Full source text.
    pub document: &'a str,
    /// Labeled reference passages with offsets.
    pub references: Vec<ReferenceDescriptor>,
    /// Retrieved chunk texts, as returned by the backend.
    pub retrieved: Vec<String>,
}

impl<'a> Query<'a> {
    /// Create a query.
    #[must_use]
    pub fn new(
        document: &'a str,
        references: Vec<ReferenceDescriptor>,
        retrieved: Vec<String>,
    ) -> Self {
        Self {
            document,
            references,
            retrieved,
        }
    }
}

/// A dataset question with its labeled references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Question text sent to the retriever.
    pub question: String,
    /// Labeled reference passages.
    pub references: Vec<ReferenceDescriptor>,
}

impl Question {
    /// Build a question from the dataset's JSON reference column.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if `references_json` is not a descriptor array.
    pub fn from_json_references(
        question: impl Into<String>,
        references_json: &str,
    ) -> Result<Self> {
        Ok(Self {
            question: question.into(),
            references: ReferenceDescriptor::parse_list(references_json)?,
        })
    }
}

/// Character counts behind one recall/precision pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Overlap {
    /// Characters covered by both references and retrieved spans.
    pub intersection_len: usize,
    /// Characters covered by references.
    pub reference_len: usize,
    /// Characters covered by retrieved spans.
    pub retrieved_len: usize,
}

impl Overlap {
    /// Fraction of reference characters that were retrieved, `0.0` if there
    /// are no reference characters.
    #[must_use]
    pub fn recall(&self) -> f64 {
        ratio(self.intersection_len, self.reference_len)
    }

    /// Fraction of retrieved characters inside references, `0.0` if nothing
    /// was retrieved.
    #[must_use]
    pub fn precision(&self) -> f64 {
        ratio(self.intersection_len, self.retrieved_len)
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    numerator as f64 / denominator as f64
}

/// Measure the character overlap of reference and retrieved spans.
///
/// ```rust
/// use spanscore::{measure_overlap, Span};
///
/// let refs = [Span::new(0, 10).unwrap()];
/// let retrieved = [Span::new(5, 15).unwrap()];
///
/// let overlap = measure_overlap(&refs, &retrieved);
/// assert_eq!(overlap.recall(), 0.5);
/// assert_eq!(overlap.precision(), 0.5);
/// ```
#[must_use]
pub fn measure_overlap(references: &[Span], retrieved: &[Span]) -> Overlap {
    let intersections: Vec<Span> = retrieved
        .iter()
        .flat_map(|&ret| references.iter().filter_map(move |&r| intersect(r, ret)))
        .collect();

    // Three independent merges
    Overlap {
        intersection_len: union_merge(intersections).total_length(),
        reference_len: union_merge(references.iter().copied()).total_length(),
        retrieved_len: union_merge(retrieved.iter().copied()).total_length(),
    }
}

/// Scores for one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryScore {
    /// Character recall in `[0, 1]`.
    pub recall: f64,
    /// Character precision in `[0, 1]`.
    pub precision: f64,
    /// Character counts the scores were computed from.
    pub overlap: Overlap,
    /// Every retrieved chunk with its resolved span (if any).
    pub retrieved: Vec<ChunkRecord>,
    /// Retrieved chunks that could not be located.
    pub unresolved: usize,
}

/// Scores for a whole dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetScore {
    /// Mean recall over queries.
    pub recall: f64,
    /// Sample standard deviation of recall, if requested and defined.
    pub recall_std: Option<f64>,
    /// Mean precision over queries.
    pub precision: f64,
    /// Sample standard deviation of precision, if requested and defined.
    pub precision_std: Option<f64>,
    /// Per-query scores, in input order.
    pub per_query: Vec<QueryScore>,
    /// Unresolved retrieved chunks across all queries.
    pub unresolved_chunks: usize,
}

impl DatasetScore {
    /// Aggregate per-query scores.
    ///
    /// Call once all queries are scored. With no queries both means are
    /// `0.0`.
    #[must_use]
    pub fn from_scores(per_query: Vec<QueryScore>, with_std: bool) -> Self {
        let recalls: Vec<f64> = per_query.iter().map(|q| q.recall).collect();
        let precisions: Vec<f64> = per_query.iter().map(|q| q.precision).collect();

        let (recall_std, precision_std) = if with_std {
            (sample_std(&recalls), sample_std(&precisions))
        } else {
            (None, None)
        };

        Self {
            recall: mean(&recalls),
            recall_std,
            precision: mean(&precisions),
            precision_std,
            unresolved_chunks: per_query.iter().map(|q| q.unresolved).sum(),
            per_query,
        }
    }

    /// Per-query recall values.
    #[must_use]
    pub fn recall_scores(&self) -> Vec<f64> {
        self.per_query.iter().map(|q| q.recall).collect()
    }

    /// Per-query precision values.
    #[must_use]
    pub fn precision_scores(&self) -> Vec<f64> {
        self.per_query.iter().map(|q| q.precision).collect()
    }

    /// Retrieved chunks across all queries.
    #[must_use]
    pub fn retrieved_chunks(&self) -> usize {
        self.per_query.iter().map(|q| q.retrieved.len()).sum()
    }
}

/// Scores retrieval results by character overlap with labeled references.
///
/// ## Example
///
/// ```rust
/// use spanscore::{Evaluator, Query, ReferenceDescriptor};
///
/// let doc = "Cats sleep a lot. Dogs bark at night. Birds sing at dawn.";
/// let query = Query::new(
///     doc,
///     vec![ReferenceDescriptor::new("Dogs bark at night", 18, 36)],
///     vec!["Dogs bark at night.".to_string()],
/// );
///
/// let score = Evaluator::default().evaluate(&[query]).unwrap();
/// assert_eq!(score.recall, 1.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    resolver: SpanResolver,
    config: EvalConfig,
}

impl Evaluator {
    /// Create an evaluator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidThreshold`] if the configured threshold is
    /// out of range.
    pub fn new(config: EvalConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            resolver: SpanResolver::with_threshold(config.fuzzy_threshold)?,
            config,
        })
    }

    /// The configuration in force.
    #[must_use]
    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    /// The resolver used for retrieved chunks.
    #[must_use]
    pub fn resolver(&self) -> &SpanResolver {
        &self.resolver
    }

    /// Score a single query.
    ///
    /// # Errors
    ///
    /// Fails on malformed reference descriptors. Unresolvable retrieved
    /// chunks are not errors.
    pub fn score_query(&self, query: &Query<'_>) -> Result<QueryScore> {
        let references = reference_spans(&query.references)?;

        let retrieved: Vec<ChunkRecord> = query
            .retrieved
            .iter()
            .map(|text| self.resolver.resolve_record(text, query.document))
            .collect();

        let spans: Vec<Span> = retrieved.iter().filter_map(|r| r.span).collect();
        let overlap = measure_overlap(&references, &spans);
        let unresolved = retrieved.len() - spans.len();

        debug!(
            recall = overlap.recall(),
            precision = overlap.precision(),
            unresolved,
            "scored query"
        );

        Ok(QueryScore {
            recall: overlap.recall(),
            precision: overlap.precision(),
            overlap,
            retrieved,
            unresolved,
        })
    }

    /// Score every query and aggregate.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidQuery`] for the first query with malformed
    /// references.
    #[instrument(skip_all, fields(queries = queries.len()))]
    pub fn evaluate(&self, queries: &[Query<'_>]) -> Result<DatasetScore> {
        let per_query = queries
            .iter()
            .enumerate()
            .map(|(index, query)| {
                self.score_query(query).map_err(|e| Error::InvalidQuery {
                    index,
                    source: Box::new(e),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(self.aggregate(per_query))
    }

    /// Query `retriever` for every question and score the results against
    /// `document`.
    ///
    /// # Errors
    ///
    /// Propagates retriever errors, and returns [`Error::InvalidQuery`] for
    /// malformed references.
    #[instrument(skip_all, fields(questions = questions.len()))]
    pub fn evaluate_retriever<R>(
        &self,
        retriever: &R,
        document: &str,
        questions: &[Question],
    ) -> Result<DatasetScore>
    where
        R: Retriever + ?Sized,
    {
        let per_query = questions
            .iter()
            .enumerate()
            .map(|(index, question)| {
                let retrieved = retriever.query(&question.question)?;
                let query = Query::new(document, question.references.clone(), retrieved);
                self.score_query(&query).map_err(|e| Error::InvalidQuery {
                    index,
                    source: Box::new(e),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(self.aggregate(per_query))
    }

    fn aggregate(&self, per_query: Vec<QueryScore>) -> DatasetScore {
        let score = DatasetScore::from_scores(per_query, self.config.with_std);
        info!(
            recall = score.recall,
            precision = score.precision,
            unresolved = score.unresolved_chunks,
            retrieved = score.retrieved_chunks(),
            "evaluation complete"
        );
        score
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    fn span(start: usize, end: usize) -> Span {
        Span::new(start, end).unwrap()
    }

    #[test]
    fn test_half_overlap() {
        let overlap = measure_overlap(&[span(0, 10)], &[span(5, 15)]);
        assert_eq!(overlap.intersection_len, 5);
        assert_eq!(overlap.recall(), 0.5);
        assert_eq!(overlap.precision(), 0.5);
    }

    #[test]
    fn test_self_retrieval() {
        let spans = [span(3, 9), span(20, 31)];
        let overlap = measure_overlap(&spans, &spans);
        assert_eq!(overlap.recall(), 1.0);
        assert_eq!(overlap.precision(), 1.0);
    }

    #[test]
    fn test_disjoint() {
        let overlap = measure_overlap(&[span(0, 5)], &[span(10, 20)]);
        assert_eq!(overlap.recall(), 0.0);
        assert_eq!(overlap.precision(), 0.0);
    }

    #[test]
    fn test_overlapping_retrieved_not_double_counted() {
        // Two retrieved chunks overlapping each other and the reference
        let overlap = measure_overlap(&[span(0, 10)], &[span(0, 8), span(4, 12)]);
        assert_eq!(overlap.intersection_len, 10);
        assert_eq!(overlap.retrieved_len, 12);
        assert_eq!(overlap.recall(), 1.0);
    }

    #[test]
    fn test_empty_denominators_are_zero() {
        let overlap = measure_overlap(&[], &[span(0, 5)]);
        assert_eq!(overlap.recall(), 0.0);
        let overlap = measure_overlap(&[span(0, 5)], &[]);
        assert_eq!(overlap.precision(), 0.0);
        assert_eq!(overlap.recall(), 0.0);
    }

    #[test]
    fn test_zero_queries() {
        let score = Evaluator::default().evaluate(&[]).unwrap();
        assert_eq!(score.recall, 0.0);
        assert_eq!(score.precision, 0.0);
        assert_eq!(score.recall_std, None);
        assert!(score.per_query.is_empty());
    }

    #[test]
    fn test_unresolved_chunk_near_document_start() {
        let doc = "Alpha beta gamma. Delta epsilon.";
        let query = Query::new(
            doc,
            vec![ReferenceDescriptor::new("Alpha", 0, 5)],
            vec![
                "Alpha".to_string(),
                "completely unrelated words nowhere".to_string(),
            ],
        );

        let score = Evaluator::default().score_query(&query).unwrap();
        assert_eq!(score.unresolved, 1);
        assert_eq!(score.retrieved[1].offsets(), (-1, -1));
        // Unresolved chunk adds nothing to the retrieved union
        assert_eq!(score.overlap.retrieved_len, 5);
        assert_eq!(score.precision, 1.0);
        assert_eq!(score.recall, 1.0);
    }

    #[test]
    fn test_records_come_from_resolver() {
        let doc = "Alpha beta gamma. Delta epsilon.";
        let chunks = ["alpha  BETA", "Delta epsilon.", "nothing of the sort"];
        let query = Query::new(
            doc,
            vec![],
            chunks.iter().map(ToString::to_string).collect(),
        );

        let evaluator = Evaluator::default();
        let score = evaluator.score_query(&query).unwrap();
        let expected: Vec<ChunkRecord> = chunks
            .iter()
            .map(|c| evaluator.resolver().resolve_record(c, doc))
            .collect();
        assert_eq!(score.retrieved, expected);
    }

    #[test]
    fn test_evaluator_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Evaluator>();
        assert_send_sync::<SpanResolver>();
    }

    #[test]
    fn test_malformed_reference_fails_query() {
        let doc = "Some text.";
        let bad = ReferenceDescriptor {
            text: "Some".to_string(),
            start_index: Some(0),
            end_index: None,
        };
        let queries = [
            Query::new(doc, vec![ReferenceDescriptor::new("Some", 0, 4)], vec![]),
            Query::new(doc, vec![bad], vec!["Some".to_string()]),
        ];

        let err = Evaluator::default().evaluate(&queries).unwrap_err();
        assert!(matches!(err, Error::InvalidQuery { index: 1, .. }));
    }

    #[test]
    fn test_no_references_is_valid() {
        let query = Query::new("Some text.", vec![], vec!["Some".to_string()]);
        let score = Evaluator::default().score_query(&query).unwrap();
        assert_eq!(score.recall, 0.0);
        assert_eq!(score.precision, 0.0);
    }

    #[test]
    fn test_std_reported() {
        let doc = "0123456789";
        let queries = [
            Query::new(doc, vec![ReferenceDescriptor::new("", 0, 10)], vec![doc.into()]),
            Query::new(doc, vec![ReferenceDescriptor::new("", 0, 10)], vec!["01234".into()]),
        ];

        let score = Evaluator::default().evaluate(&queries).unwrap();
        assert_eq!(score.recall_scores(), vec![1.0, 0.5]);
        assert_eq!(score.precision_scores(), vec![1.0, 1.0]);
        assert!((score.recall - 0.75).abs() < 1e-12);
        let std = score.recall_std.unwrap();
        assert!((std - 0.125f64.sqrt()).abs() < 1e-12);
        assert_eq!(score.precision_std, Some(0.0));

        let no_std = Evaluator::new(EvalConfig::default().with_std(false))
            .unwrap()
            .evaluate(&queries)
            .unwrap();
        assert_eq!(no_std.recall_std, None);
    }
}
