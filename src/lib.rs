//! # spanscore
//!
//! Character-level recall and precision for retrieval-augmented generation
//! (RAG) pipelines.
//!
//! ## The Problem
//!
//! A retriever returns chunks of text. A labeled dataset says which passages
//! of the source document answer each question. How good was the retrieval?
//!
//! Counting "relevant chunks" ties the score to the chunker: change the
//! chunk size and the same retrieval quality scores differently. Measuring
//! by characters does not. Every retrieved chunk and every reference is a
//! character range in the same document, so:
//!
//! ```text
//! recall    = |retrieved ∩ reference| / |reference|
//! precision = |retrieved ∩ reference| / |retrieved|
//! ```
//!
//! Two things make this harder than it looks:
//!
//! - Retrieved chunks come back as text, not offsets, and the text drifts:
//!   whitespace is normalized, a final period is dropped, a word changes.
//! - Chunks overlap each other, and references can overlap too. Sums of
//!   lengths double-count.
//!
//! ## Resolving Chunks
//!
//! [`SpanResolver`] turns chunk text back into a [`Span`], trying three
//! rungs in order:
//!
//! ```text
//! 1. Exact        verbatim substring (one trailing "." stripped)
//! 2. Whitespace   same words, any whitespace between, any case
//! 3. Fuzzy        best sentence by token sort ratio, accepted at >= 98
//! ```
//!
//! A chunk that no rung can place is a [`ResolutionFailure`], not an error:
//! it is recorded, counted and excluded from the interval math.
//!
//! ## Interval Algebra
//!
//! [`intersect`], [`union_merge`] and [`total_length`] are all the metric
//! needs. Unions merge overlapping *and* touching ranges, so the measured
//! coverage is exact.
//!
//! ## Quick Start
//!
//! ```rust
//! use spanscore::{Evaluator, Query, ReferenceDescriptor};
//!
//! let doc = "The cat sat on the mat. The dog slept by the fire.";
//!
//! let query = Query::new(
//!     doc,
//!     vec![ReferenceDescriptor::new("The dog slept by the fire", 24, 49)],
//!     vec![
//!         "The dog slept by the fire.".to_string(), // exact after "." strip
//!         "the cat  sat".to_string(),               // whitespace + case
//!     ],
//! );
//!
//! let score = Evaluator::default().evaluate(&[query]).unwrap();
//! assert_eq!(score.recall, 1.0);
//! assert!((score.precision - 25.0 / 36.0).abs() < 1e-12);
//! ```
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events: `debug` for each resolution, `warn`
//! for each unresolved chunk, `info` for dataset summaries. Install any
//! subscriber to see them.

mod config;
mod error;
mod evaluate;
mod interval;
mod reference;
mod resolve;
mod retriever;
mod span;

pub mod report;
pub mod similarity;
pub mod stats;

pub use config::EvalConfig;
pub use error::{Error, ResolutionFailure, Result};
pub use evaluate::{
    measure_overlap, DatasetScore, Evaluator, Overlap, Query, QueryScore, Question,
};
pub use interval::{intersect, total_length, union_merge, IntervalUnion};
pub use reference::{reference_spans, ReferenceDescriptor};
pub use resolve::{Alignment, SpanResolver, DEFAULT_FUZZY_THRESHOLD};
pub use retriever::Retriever;
pub use span::{ChunkRecord, MatchMethod, Span};
