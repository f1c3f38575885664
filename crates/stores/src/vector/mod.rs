//! Vector storage and similarity search
//!
//! - **VectorStore**: dimension-fixed product-vector store with brute-force
//!   cosine search
//! - **distance**: shared similarity functions
//!
//! Search is single-threaded over a `BTreeMap` snapshot, so results are
//! deterministic for a fixed set of vectors: same query, same results.

pub mod distance;
pub mod store;

pub use distance::{cosine_similarity, dot_product, l2_norm};
pub use store::VectorStore;
