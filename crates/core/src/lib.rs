//! Core types for the Reco recommendation engine
//!
//! This crate defines the foundational types used throughout the system:
//! - ProductId / UserId / TransactionId: opaque identifiers
//! - Timestamp: microseconds since the Unix epoch
//! - RecoKind: the supported recommendation kinds
//! - Candidate / RankedList: ranking output types
//! - ViewEvent / PurchaseEvent: ingest event shapes
//! - ProductCatalog: read-only boundary to the external product store
//! - RecoError: error type hierarchy

#![warn(clippy::all)]

pub mod catalog;
pub mod error;
pub mod events;
pub mod ranking;
pub mod types;

// Re-export commonly used types at the crate root
pub use catalog::{InMemoryCatalog, Product, ProductCatalog};
pub use error::{RecoError, RecoResult};
pub use events::{PurchaseEvent, PurchaseLine, ViewEvent};
pub use ranking::{Candidate, RankedList};
pub use types::{EmbeddingSpace, ProductId, RecoKind, Timestamp, TransactionId, UserId};
