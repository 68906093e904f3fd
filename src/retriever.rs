//! The retrieval backend seam.
//!
//! Evaluation only needs one thing from a backend: given a question, the
//! texts of the chunks it retrieved. Cosine search over an in-memory index,
//! an external vector store, BM25, all reduce to this.

use crate::Result;

/// A retrieval backend.
///
/// Backends are shared across threads when queries are scored in parallel.
///
/// Closures implement it directly, which is convenient for tests and for
/// adapting an existing client:
///
/// ```rust
/// use spanscore::Retriever;
///
/// let backend = |_question: &str| -> spanscore::Result<Vec<String>> {
///     Ok(vec!["The cat sat.".to_string()])
/// };
/// assert_eq!(backend.query("Where did the cat sit?").unwrap().len(), 1);
/// ```
pub trait Retriever: Send + Sync {
    /// Retrieve chunk texts for `question`, best first.
    ///
    /// # Errors
    ///
    /// Backend-specific; wrap failures in [`Error::Retriever`](crate::Error::Retriever).
    fn query(&self, question: &str) -> Result<Vec<String>>;
}

impl<F> Retriever for F
where
    F: Fn(&str) -> Result<Vec<String>> + Send + Sync,
{
    fn query(&self, question: &str) -> Result<Vec<String>> {
        self(question)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_retriever<R: Retriever>(_: &R) {}

    #[test]
    fn test_closure_is_retriever() {
        let corpus = vec!["alpha".to_string(), "beta".to_string()];
        let backend = move |q: &str| -> Result<Vec<String>> {
            Ok(corpus.iter().filter(|c| c.starts_with(q)).cloned().collect())
        };
        assert_retriever(&backend);
        assert_eq!(backend.query("al").unwrap(), vec!["alpha".to_string()]);
    }

    #[test]
    fn test_shared_across_threads() {
        let backend: Box<dyn Retriever> =
            Box::new(|q: &str| -> Result<Vec<String>> { Ok(vec![q.to_uppercase()]) });

        std::thread::scope(|scope| {
            let handles: Vec<_> = ["a", "b"]
                .into_iter()
                .map(|q| {
                    let backend = &backend;
                    scope.spawn(move || backend.query(q))
                })
                .collect();
            for (handle, expected) in handles.into_iter().zip(["A", "B"]) {
                assert_eq!(handle.join().unwrap().unwrap(), vec![expected.to_string()]);
            }
        });
    }
}
