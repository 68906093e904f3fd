//! Labeled reference passages.
//!
//! References arrive from the question dataset with offsets already
//! attached. They are trusted: the evaluator never re-resolves them. They
//! are still validated, because a descriptor missing an offset is a broken
//! dataset row, not an empty reference set.
//!
//! The dataset stores each question's references as a JSON array:
//!
//! ```text
//! [{"content": "The cat sat.", "start_index": 42, "end_index": 54}, ...]
//! ```

use serde::{Deserialize, Serialize};

use crate::{Error, Result, Span};

/// A reference passage with its labeled offsets.
///
/// Offsets are optional at the type level so that a missing field is caught
/// by [`ReferenceDescriptor::to_span`] with a useful error instead of being
/// defaulted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceDescriptor {
    /// Passage text.
    #[serde(alias = "content", default)]
    pub text: String,
    /// First character of the passage.
    #[serde(default)]
    pub start_index: Option<i64>,
    /// One past the last character of the passage.
    #[serde(default)]
    pub end_index: Option<i64>,
}

impl ReferenceDescriptor {
    /// A descriptor with both offsets present.
    #[must_use]
    pub fn new(text: impl Into<String>, start_index: i64, end_index: i64) -> Self {
        Self {
            text: text.into(),
            start_index: Some(start_index),
            end_index: Some(end_index),
        }
    }

    /// Parse a JSON array of descriptors.
    ///
    /// ```rust
    /// use spanscore::ReferenceDescriptor;
    ///
    /// let refs = ReferenceDescriptor::parse_list(
    ///     r#"[{"content": "The cat sat.", "start_index": 42, "end_index": 54}]"#,
    /// ).unwrap();
    /// assert_eq!(refs[0].to_span(0).unwrap().len(), 12);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if the input is not an array of objects.
    pub fn parse_list(json: &str) -> Result<Vec<Self>> {
        Ok(serde_json::from_str(json)?)
    }

    /// Validate and convert to a span.
    ///
    /// `index` is the descriptor's position, used in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingOffset`], [`Error::NegativeOffset`] or
    /// [`Error::InvertedSpan`] for malformed descriptors.
    pub fn to_span(&self, index: usize) -> Result<Span> {
        let start = self.start_index.ok_or(Error::MissingOffset {
            index,
            field: "start_index",
        })?;
        let end = self.end_index.ok_or(Error::MissingOffset {
            index,
            field: "end_index",
        })?;
        Span::try_from_signed(start, end)
    }
}

/// Validate a list of descriptors into spans, failing on the first bad one.
///
/// # Errors
///
/// See [`ReferenceDescriptor::to_span`].
pub fn reference_spans(references: &[ReferenceDescriptor]) -> Result<Vec<Span>> {
    references
        .iter()
        .enumerate()
        .map(|(i, r)| r.to_span(i))
        .collect()
}
