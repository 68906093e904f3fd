//! Evaluation configuration.
//!
//! Everything that tunes an evaluation run lives here and is passed to the
//! [`Evaluator`](crate::Evaluator) explicitly. There is no process-wide
//! state.

use serde::{Deserialize, Serialize};

use crate::resolve::DEFAULT_FUZZY_THRESHOLD;
use crate::{Error, Result};

/// Configuration for an evaluation run.
///
/// # Examples
///
/// ```rust
/// use spanscore::EvalConfig;
///
/// let config = EvalConfig::default();
/// assert_eq!(config.fuzzy_threshold, 98.0);
/// assert!(config.with_std);
///
/// let config = EvalConfig::default().with_fuzzy_threshold(95.0).unwrap();
/// assert_eq!(config.fuzzy_threshold, 95.0);
///
/// // Deserializes with defaults for missing fields
/// let config: EvalConfig = serde_json::from_str(r#"{"with_std": false}"#).unwrap();
/// assert_eq!(config.fuzzy_threshold, 98.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    /// Minimum token sort ratio (0–100) for the fuzzy resolution rung.
    pub fuzzy_threshold: f64,
    /// Report sample standard deviations alongside the means.
    pub with_std: bool,
}

impl EvalConfig {
    /// Set the fuzzy acceptance threshold.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidThreshold`] unless `threshold` is within `0..=100`.
    pub fn with_fuzzy_threshold(self, threshold: f64) -> Result<Self> {
        let config = Self {
            fuzzy_threshold: threshold,
            ..self
        };
        config.validate()?;
        Ok(config)
    }

    /// Enable or disable standard deviation reporting.
    #[must_use]
    pub fn with_std(self, with_std: bool) -> Self {
        Self { with_std, ..self }
    }

    /// Check that every field is in range.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidThreshold`] for an out-of-range threshold.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=100.0).contains(&self.fuzzy_threshold) {
            return Err(Error::InvalidThreshold(self.fuzzy_threshold));
        }
        Ok(())
    }
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            with_std: true,
        }
    }
}
