//! The Resolution Ladder
//!
//! Shows which rung locates each kind of drifted chunk, with logging on.
//!
//! ```bash
//! RUST_LOG=spanscore=debug cargo run --example resolution_ladder
//! ```

use spanscore::SpanResolver;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let document = "Dr. Geoffrey Hinton pioneered backpropagation in the 1980s.\n\
        His work at the University of Toronto laid the foundation for modern AI.\n\
        In 2024, he was recognized with the Nobel Prize.";

    let chunks = [
        // Verbatim
        "In 2024, he was recognized with the Nobel Prize.",
        // Re-wrapped and recased
        "his work at the University of Toronto   laid the foundation",
        // One word changed
        "His work at the University of Toronto laid the foundations for modern AI",
        // Not in the document
        "Transformers were introduced in 2017.",
    ];

    let resolver = SpanResolver::new();
    println!("Fuzzy threshold: {}\n", resolver.threshold());

    for chunk in chunks {
        match resolver.align(chunk, document) {
            Ok(alignment) => println!(
                "{:>10} {:>6.2}  {}  {:?}",
                alignment.method.name(),
                alignment.score,
                alignment.span,
                chunk
            ),
            Err(reason) => println!("{:>10} {:>6}  {reason}  {chunk:?}", "unresolved", "-"),
        }
    }
}
