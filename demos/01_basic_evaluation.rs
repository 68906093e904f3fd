//! Basic Retrieval Evaluation
//!
//! The minimal example: score retrieved chunks against a labeled reference.
//!
//! ```bash
//! cargo run --example 01_basic_evaluation
//! ```

use spanscore::{Evaluator, Query, ReferenceDescriptor};

fn main() -> spanscore::Result<()> {
    let document = "Machine learning models learn patterns from data. \
        They generalize these patterns to make predictions. \
        This is fundamentally different from traditional programming. \
        Deep learning extends this with multiple hidden layers.";

    // The labeled answer: the second sentence
    let answer = "They generalize these patterns to make predictions.";
    // ASCII text, so byte and character offsets agree
    let start = document.find(answer).unwrap_or(0);
    let reference = ReferenceDescriptor::new(
        answer,
        i64::try_from(start).unwrap_or_default(),
        i64::try_from(start + answer.len()).unwrap_or_default(),
    );

    // What a retriever might return for "How do models make predictions?"
    let retrieved = vec![
        "They generalize these patterns to make predictions".to_string(),
        "Deep learning extends this with multiple hidden layers.".to_string(),
    ];

    let query = Query::new(document, vec![reference], retrieved);
    let score = Evaluator::default().evaluate(&[query])?;

    println!("{}", score.summary());
    for chunk in &score.per_query[0].retrieved {
        println!("  {chunk}");
    }

    // Recall is high: nearly all of the answer was retrieved.
    // Precision is about half: the second chunk was irrelevant.
    Ok(())
}
