//! Experiment records for results logs.
//!
//! Sweeps over chunk size, overlap and top-k append one row per run to a
//! results file, which is later grouped and plotted. This module builds the
//! row; opening and appending to the file is left to the caller.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::DatasetScore;

/// Column order of [`ExperimentRecord::csv_row`].
pub const CSV_HEADER: &str =
    "exp_name,chunker,chunk_size,chunk_overlap,ret_type,k,recall,recall_std,precision,precision_std,unresolved";

/// The knobs of one retrieval experiment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperimentSetup {
    /// Free-form run name.
    pub exp_name: String,
    /// Chunking strategy name.
    pub chunker: String,
    /// Chunk size given to the chunker.
    pub chunk_size: usize,
    /// Overlap given to the chunker.
    pub chunk_overlap: usize,
    /// Retrieval backend name.
    pub ret_type: String,
    /// Number of chunks retrieved per question.
    pub k: usize,
}

/// A setup together with its scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentRecord {
    /// How the run was configured.
    #[serde(flatten)]
    pub setup: ExperimentSetup,
    /// Mean recall.
    pub recall: Option<f64>,
    /// Recall standard deviation.
    pub recall_std: Option<f64>,
    /// Mean precision.
    pub precision: Option<f64>,
    /// Precision standard deviation.
    pub precision_std: Option<f64>,
    /// Retrieved chunks that could not be located.
    pub unresolved: usize,
}

impl ExperimentRecord {
    /// Record the outcome of a run.
    #[must_use]
    pub fn new(setup: ExperimentSetup, score: &DatasetScore) -> Self {
        Self {
            setup,
            recall: Some(score.recall),
            recall_std: score.recall_std,
            precision: Some(score.precision),
            precision_std: score.precision_std,
            unresolved: score.unresolved_chunks,
        }
    }

    /// One CSV line (no trailing newline) in [`CSV_HEADER`] order.
    ///
    /// Missing values are written as `N/A`.
    ///
    /// ```rust
    /// use spanscore::report::{ExperimentRecord, ExperimentSetup};
    ///
    /// let setup = ExperimentSetup {
    ///     exp_name: "baseline".into(),
    ///     chunker: "fixed".into(),
    ///     chunk_size: 400,
    ///     chunk_overlap: 40,
    ///     ret_type: "cos_sim".into(),
    ///     k: 10,
    /// };
    /// let record = ExperimentRecord {
    ///     setup,
    ///     recall: Some(0.5),
    ///     recall_std: None,
    ///     precision: Some(0.125),
    ///     precision_std: None,
    ///     unresolved: 2,
    /// };
    /// assert_eq!(
    ///     record.csv_row(),
    ///     "baseline,fixed,400,40,cos_sim,10,0.5,N/A,0.125,N/A,2"
    /// );
    /// ```
    #[must_use]
    pub fn csv_row(&self) -> String {
        let s = &self.setup;
        [
            csv_field(&s.exp_name),
            csv_field(&s.chunker),
            s.chunk_size.to_string(),
            s.chunk_overlap.to_string(),
            csv_field(&s.ret_type),
            s.k.to_string(),
            metric_field(self.recall),
            metric_field(self.recall_std),
            metric_field(self.precision),
            metric_field(self.precision_std),
            self.unresolved.to_string(),
        ]
        .join(",")
    }
}

fn metric_field(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| v.to_string())
}

// RFC 4180 quoting
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

impl DatasetScore {
    /// Human-readable percentages, e.g. `Recall: 52.31 | Precision: 7.42`.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut out = String::new();
        // Writing to a String cannot fail.
        let _ = write!(out, "Recall: {:.2}", self.recall * 100.0);
        if let Some(std) = self.recall_std {
            let _ = write!(out, " ± {:.2}", std * 100.0);
        }
        let _ = write!(out, " | Precision: {:.2}", self.precision * 100.0);
        if let Some(std) = self.precision_std {
            let _ = write!(out, " ± {:.2}", std * 100.0);
        }
        if self.unresolved_chunks > 0 {
            let _ = write!(
                out,
                " | Unresolved: {}/{}",
                self.unresolved_chunks,
                self.retrieved_chunks()
            );
        }
        out
    }
}
