//! Recommendation request shape

use reco_core::{RecoError, RecoKind, RecoResult};

/// One recommendation request
///
/// `subject` is a product id for product-subject kinds, a user id for
/// last-seen, and empty for top-sales. Everything that changes the result
/// participates in the cache key, including the filters and the rerank
/// flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoRequest {
    /// Which recommendation to compute
    pub kind: RecoKind,
    /// Product id, user id, or empty depending on kind
    pub subject: String,
    /// Maximum number of candidates returned
    pub limit: usize,
    /// Keep only candidates of this brand
    pub brand: Option<String>,
    /// Keep only candidates in this leaf category
    pub category_id: Option<String>,
    /// Apply the model reranker to the candidate list
    pub rerank: bool,
}

impl RecoRequest {
    fn new(kind: RecoKind, subject: impl Into<String>, limit: usize) -> Self {
        Self {
            kind,
            subject: subject.into(),
            limit,
            brand: None,
            category_id: None,
            rerank: false,
        }
    }

    /// Similar products for a product
    pub fn similar(product_id: impl Into<String>, limit: usize) -> Self {
        Self::new(RecoKind::Similar, product_id, limit)
    }

    /// Complementary products for a product
    pub fn complementary(product_id: impl Into<String>, limit: usize) -> Self {
        Self::new(RecoKind::Complementary, product_id, limit)
    }

    /// Frequently co-purchased products for a product
    pub fn cross_sell(product_id: impl Into<String>, limit: usize) -> Self {
        Self::new(RecoKind::CrossSell, product_id, limit)
    }

    /// Best sellers over the active sales windows
    pub fn top_sales(limit: usize) -> Self {
        Self::new(RecoKind::TopSales, "", limit)
    }

    /// Most recently viewed products for a user
    pub fn last_seen(user_id: impl Into<String>, limit: usize) -> Self {
        Self::new(RecoKind::LastSeen, user_id, limit)
    }

    /// Restrict candidates to one brand
    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    /// Restrict candidates to one leaf category
    pub fn with_category(mut self, category_id: impl Into<String>) -> Self {
        self.category_id = Some(category_id.into());
        self
    }

    /// Enable or disable model re-ranking for this request
    pub fn with_rerank(mut self, rerank: bool) -> Self {
        self.rerank = rerank;
        self
    }

    /// Check the request is well-formed for its kind
    pub(crate) fn validate(&self) -> RecoResult<()> {
        if self.limit == 0 {
            return Err(RecoError::InvalidInput("limit must be positive".to_string()));
        }
        match self.kind {
            RecoKind::TopSales => {
                if !self.subject.is_empty() {
                    return Err(RecoError::InvalidInput(
                        "top-sales takes no subject".to_string(),
                    ));
                }
            }
            _ => {
                if self.subject.is_empty() {
                    return Err(RecoError::InvalidInput(format!(
                        "{} requires a subject",
                        self.kind.as_str()
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_set_kind_and_subject() {
        let request = RecoRequest::similar("P1", 10);
        assert_eq!(request.kind, RecoKind::Similar);
        assert_eq!(request.subject, "P1");
        assert_eq!(request.limit, 10);
        assert!(!request.rerank);

        let request = RecoRequest::top_sales(20);
        assert_eq!(request.kind, RecoKind::TopSales);
        assert!(request.subject.is_empty());
    }

    #[test]
    fn test_zero_limit_is_invalid() {
        assert!(RecoRequest::similar("P1", 0).validate().is_err());
    }

    #[test]
    fn test_missing_subject_is_invalid() {
        assert!(RecoRequest::similar("", 10).validate().is_err());
        assert!(RecoRequest::last_seen("", 10).validate().is_err());
        assert!(RecoRequest::top_sales(10).validate().is_ok());
    }

    #[test]
    fn test_builder_style_filters() {
        let request = RecoRequest::cross_sell("P1", 5)
            .with_brand("acme")
            .with_category("c9")
            .with_rerank(true);
        assert_eq!(request.brand.as_deref(), Some("acme"));
        assert_eq!(request.category_id.as_deref(), Some("c9"));
        assert!(request.rerank);
    }
}
