//! Ingest event shapes
//!
//! Views and purchases arrive from an external event source (queue or direct
//! call); these are the shapes the engine consumes. Delivery semantics are
//! the caller's concern - the graph double-counts redelivered purchase
//! events by contract, so deduplicate upstream by [`TransactionId`] if the
//! source is at-least-once.

use crate::types::{ProductId, Timestamp, TransactionId, UserId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A user viewed a product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewEvent {
    /// Viewing user
    pub user: UserId,
    /// Viewed product
    pub product: ProductId,
    /// When the view happened
    pub at: Timestamp,
}

impl ViewEvent {
    /// Create a view event
    pub fn new(user: impl Into<UserId>, product: impl Into<ProductId>, at: Timestamp) -> Self {
        Self {
            user: user.into(),
            product: product.into(),
            at,
        }
    }
}

/// One line of a purchase transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseLine {
    /// Purchased product
    pub product: ProductId,
    /// Units purchased (never zero in a well-formed event)
    pub quantity: u32,
}

impl PurchaseLine {
    /// Create a purchase line
    pub fn new(product: impl Into<ProductId>, quantity: u32) -> Self {
        Self {
            product: product.into(),
            quantity,
        }
    }
}

/// A completed purchase transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseEvent {
    /// Transaction identifier (for upstream deduplication)
    pub transaction: TransactionId,
    /// Purchased lines; the same product may appear on several lines
    pub lines: Vec<PurchaseLine>,
    /// When the transaction completed
    pub at: Timestamp,
}

impl PurchaseEvent {
    /// Create a purchase event
    pub fn new(transaction: TransactionId, lines: Vec<PurchaseLine>, at: Timestamp) -> Self {
        Self {
            transaction,
            lines,
            at,
        }
    }

    /// Distinct products in this transaction
    ///
    /// The co-purchase graph operates on the set, not the lines: two lines
    /// of the same product contribute one set member.
    pub fn product_set(&self) -> BTreeSet<ProductId> {
        self.lines.iter().map(|l| l.product.clone()).collect()
    }
}
