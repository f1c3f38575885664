//! The recommendation engine
//!
//! [`RecommendationEngine`] owns every collaborator explicitly - stores,
//! gateways, cache, catalog - and dispatches each request kind to its
//! compute path. Read paths go through the single-flight cache (except
//! last-seen, which is a cheap read-through); write paths update the stores
//! and invalidate the affected cache prefixes.

use crate::config::{ComplementarySource, RecoConfig};
use crate::keys::{kind_prefix, reco_key, subject_prefix};
use crate::request::RecoRequest;
use crate::texts::embedding_text;
use reco_cache::RecoCache;
use reco_core::{
    Candidate, EmbeddingSpace, InMemoryCatalog, Product, ProductCatalog, ProductId, PurchaseEvent,
    RankedList, RecoError, RecoKind, RecoResult, Timestamp, UserId, ViewEvent,
};
use reco_intelligence::{ApiEmbedder, ApiReranker, Embedder, Reranker};
use reco_stores::{ActivityLedger, CoPurchaseGraph, SalesAggregator, VectorStore};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Builder for [`RecommendationEngine`]
///
/// Gateways left unset fall back to the config's `[model]` section when one
/// is present; an engine without any embedder still serves every read path
/// but rejects vectorization.
pub struct EngineBuilder {
    config: RecoConfig,
    embedder: Option<Arc<dyn Embedder>>,
    reranker: Option<Arc<dyn Reranker>>,
    catalog: Option<Arc<dyn ProductCatalog>>,
}

impl EngineBuilder {
    /// Start building an engine with the given configuration
    pub fn new(config: RecoConfig) -> Self {
        Self {
            config,
            embedder: None,
            reranker: None,
            catalog: None,
        }
    }

    /// Use this embedder instead of one built from the config's model
    pub fn embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Use this reranker instead of one built from the config's model
    pub fn reranker(mut self, reranker: Arc<dyn Reranker>) -> Self {
        self.reranker = Some(reranker);
        self
    }

    /// Use this product catalog (defaults to an empty in-memory catalog)
    pub fn catalog(mut self, catalog: Arc<dyn ProductCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Assemble the engine
    pub fn build(self) -> RecommendationEngine {
        let Self {
            config,
            mut embedder,
            mut reranker,
            catalog,
        } = self;

        if let Some(model) = &config.model {
            if embedder.is_none() {
                embedder = Some(Arc::new(ApiEmbedder::new(
                    &model.endpoint,
                    &model.model,
                    model.api_key.as_deref(),
                    model.timeout_ms,
                )));
            }
            if reranker.is_none() {
                reranker = Some(Arc::new(ApiReranker::new(
                    &model.endpoint,
                    &model.model,
                    model.api_key.as_deref(),
                    model.timeout_ms,
                )));
            }
        }

        info!(
            target: "reco::engine",
            version = %config.algo_version,
            has_embedder = embedder.is_some(),
            has_reranker = reranker.is_some(),
            "engine built"
        );

        RecommendationEngine {
            similar_vectors: VectorStore::new(),
            complementary_vectors: VectorStore::new(),
            graph: CoPurchaseGraph::new(),
            ledger: ActivityLedger::with_cap(config.history_cap),
            sales: SalesAggregator::with_window(
                config.sales_window(),
                config.sales_active_windows,
            ),
            cache: RecoCache::new(config.cache_wait_timeout()),
            catalog: catalog.unwrap_or_else(|| Arc::new(InMemoryCatalog::new())),
            embedder,
            reranker,
            config,
        }
    }
}

/// Product recommendation engine
///
/// Thread-safe; every method takes `&self`.
pub struct RecommendationEngine {
    config: RecoConfig,
    similar_vectors: VectorStore,
    complementary_vectors: VectorStore,
    graph: CoPurchaseGraph,
    ledger: ActivityLedger,
    sales: SalesAggregator,
    cache: RecoCache,
    catalog: Arc<dyn ProductCatalog>,
    embedder: Option<Arc<dyn Embedder>>,
    reranker: Option<Arc<dyn Reranker>>,
}

impl RecommendationEngine {
    /// Serve a recommendation request
    ///
    /// All kinds except last-seen go through the single-flight TTL cache.
    /// Last-seen reads the activity ledger directly: it is cheap, changes
    /// on every view, and its recency order must never be re-sorted.
    pub fn recommend(&self, request: &RecoRequest) -> RecoResult<RankedList> {
        request.validate()?;

        if request.kind == RecoKind::LastSeen {
            return Ok(self.last_seen(request));
        }

        let key = reco_key(&self.config.algo_version, request);
        let ttl = self.ttl_for(request.kind);
        self.cache
            .get_or_compute(&key, ttl, || self.compute(request))
    }

    /// Record one product view
    ///
    /// Last-seen lists are never cached, so no invalidation is needed.
    pub fn record_view(&self, event: ViewEvent) {
        self.ledger.record(&event.user, &event.product, event.at);
    }

    /// Record one purchase
    ///
    /// Updates the co-purchase graph and the sales windows, then drops the
    /// cached lists the purchase may have changed: cross-sell and
    /// complementary for every involved product (complementary lists may be
    /// graph-sourced under the fallback policies), and top-sales.
    pub fn record_purchase(&self, event: PurchaseEvent) {
        let products = event.product_set();
        self.graph.record(&products);
        for line in &event.lines {
            self.sales.record(&line.product, line.quantity, event.at);
        }

        let version = &self.config.algo_version;
        for product in &products {
            self.cache.invalidate_prefix(&subject_prefix(
                version,
                RecoKind::CrossSell,
                product.as_str(),
            ));
            self.cache.invalidate_prefix(&subject_prefix(
                version,
                RecoKind::Complementary,
                product.as_str(),
            ));
        }
        self.cache
            .invalidate_prefix(&kind_prefix(version, RecoKind::TopSales));

        debug!(
            target: "reco::engine",
            transaction = %event.transaction,
            products = products.len(),
            "purchase recorded"
        );
    }

    /// Embed `text` and store the vector for `product` in the given space
    pub fn vectorize(
        &self,
        space: EmbeddingSpace,
        product: ProductId,
        text: &str,
    ) -> RecoResult<()> {
        let embedder = self.embedder.as_ref().ok_or_else(|| {
            RecoError::InvalidInput("no embedder configured".to_string())
        })?;
        let mut vectors = embedder.embed(&[text.to_string()])?;
        let vector = vectors
            .pop()
            .ok_or_else(|| RecoError::Internal("embedder returned no vector".to_string()))?;
        self.vector_store(space).upsert(product, vector)
    }

    /// Embed a cataloged product using the space's text builder
    pub fn vectorize_product(&self, space: EmbeddingSpace, product_id: &ProductId) -> RecoResult<()> {
        let product = self
            .catalog
            .find_by_id(product_id)
            .ok_or_else(|| RecoError::NotFound(product_id.clone()))?;
        let text = embedding_text(space, &product);
        self.vectorize(space, product_id.clone(), &text)
    }

    /// The engine's configuration
    pub fn config(&self) -> &RecoConfig {
        &self.config
    }

    /// The vector store backing one embedding space
    pub fn vector_store(&self, space: EmbeddingSpace) -> &VectorStore {
        match space {
            EmbeddingSpace::Similar => &self.similar_vectors,
            EmbeddingSpace::Complementary => &self.complementary_vectors,
        }
    }

    fn ttl_for(&self, kind: RecoKind) -> Duration {
        match kind {
            RecoKind::TopSales => self.config.top_sales_ttl(),
            _ => self.config.product_ttl(),
        }
    }

    fn last_seen(&self, request: &RecoRequest) -> RankedList {
        let user = UserId::from(request.subject.as_str());
        let entries = self.ledger.last_seen(&user, self.retrieval_k(request.limit));
        let candidates: Vec<Candidate> = entries
            .into_iter()
            .map(|entry| Candidate::new(entry.product, entry.last_seen_at.as_secs() as f32))
            .collect();
        let candidates = self.apply_filters(candidates, request);
        RankedList::sequenced(candidates, request.limit)
    }

    /// Candidate head-room before filtering and reranking
    fn retrieval_k(&self, limit: usize) -> usize {
        limit.saturating_mul(4).max(limit)
    }

    fn compute(&self, request: &RecoRequest) -> RecoResult<RankedList> {
        let retrieval_k = self.retrieval_k(request.limit);
        let subject = ProductId::from(request.subject.as_str());

        let primary = match request.kind {
            RecoKind::Similar => self.similar_vectors.similar(&subject, retrieval_k)?,
            RecoKind::Complementary => self.complementary(&subject, retrieval_k)?,
            RecoKind::CrossSell => self.graph.cross_sell(&subject, retrieval_k),
            RecoKind::TopSales => self.sales.top_sales(retrieval_k, Timestamp::now()),
            // Handled in recommend(), never cached
            RecoKind::LastSeen => unreachable!("last-seen bypasses the cache"),
        };

        let filtered = self.apply_filters(primary.into_items(), request);
        let list = RankedList::ranked(filtered, retrieval_k);

        let list = if request.rerank {
            self.rerank(&subject, list)
        } else {
            list
        };

        Ok(RankedList::ranked(list.into_items(), request.limit))
    }

    fn complementary(&self, subject: &ProductId, k: usize) -> RecoResult<RankedList> {
        match self.config.complementary_source {
            ComplementarySource::VectorsOnly => self.complementary_vectors.similar(subject, k),
            ComplementarySource::CrossSellOnly => Ok(self.graph.cross_sell(subject, k)),
            ComplementarySource::VectorsThenCrossSell => {
                if self.complementary_vectors.contains(subject) {
                    self.complementary_vectors.similar(subject, k)
                } else {
                    debug!(
                        target: "reco::engine",
                        product = %subject,
                        "no complementary vector, falling back to co-purchase graph"
                    );
                    Ok(self.graph.cross_sell(subject, k))
                }
            }
        }
    }

    /// Keep only candidates matching the request's brand/category filters
    ///
    /// A candidate missing from the catalog cannot prove it matches, so an
    /// active filter drops it.
    fn apply_filters(&self, candidates: Vec<Candidate>, request: &RecoRequest) -> Vec<Candidate> {
        if request.brand.is_none() && request.category_id.is_none() {
            return candidates;
        }
        candidates
            .into_iter()
            .filter(|candidate| {
                match self.catalog.find_by_id(&candidate.product) {
                    Some(product) => {
                        let brand_ok = request
                            .brand
                            .as_ref()
                            .map_or(true, |b| product.brand.as_ref() == Some(b));
                        let category_ok = request
                            .category_id
                            .as_ref()
                            .map_or(true, |c| product.category_id.as_ref() == Some(c));
                        brand_ok && category_ok
                    }
                    None => false,
                }
            })
            .collect()
    }

    /// Re-rank a candidate list via the model, degrading to the original
    /// ordering on any failure
    fn rerank(&self, subject: &ProductId, list: RankedList) -> RankedList {
        let Some(reranker) = self.reranker.as_ref() else {
            return list;
        };
        if list.is_empty() {
            return list;
        }

        let subject_text = match self.catalog.find_by_id(subject) {
            Some(product) => product_summary(&product),
            None => subject.to_string(),
        };

        let summaries: Vec<(usize, String)> = list
            .items()
            .iter()
            .enumerate()
            .map(|(index, candidate)| {
                let text = match self.catalog.find_by_id(&candidate.product) {
                    Some(product) => product_summary(&product),
                    None => candidate.product.to_string(),
                };
                (index, text)
            })
            .collect();
        let borrowed: Vec<(usize, &str)> = summaries
            .iter()
            .map(|(index, text)| (*index, text.as_str()))
            .collect();

        match reranker.rerank(&subject_text, &borrowed) {
            Ok(scores) => {
                reco_intelligence::blend_candidates(list, &scores, self.config.rerank_alpha)
            }
            Err(err) => {
                warn!(
                    target: "reco::engine",
                    product = %subject,
                    error = %err,
                    "rerank failed, keeping primary ordering"
                );
                list
            }
        }
    }
}

/// One-line product rendering for rerank prompts
fn product_summary(product: &Product) -> String {
    let mut parts = vec![product.name.clone()];
    if let Some(brand) = &product.brand {
        parts.push(brand.clone());
    }
    if let Some(category) = &product.category_path {
        parts.push(category.clone());
    } else if let Some(category) = &product.category_id {
        parts.push(category.clone());
    }
    parts.join(" / ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use reco_core::{PurchaseLine, TransactionId};
    use reco_intelligence::MockEmbedder;

    fn engine() -> RecommendationEngine {
        EngineBuilder::new(RecoConfig::default())
            .embedder(Arc::new(MockEmbedder::new(8)))
            .build()
    }

    fn seed_vectors(engine: &RecommendationEngine, space: EmbeddingSpace) {
        let store = engine.vector_store(space);
        store.upsert(ProductId::from("P1"), vec![1.0, 0.0]).unwrap();
        store.upsert(ProductId::from("P2"), vec![1.0, 0.0]).unwrap();
        store.upsert(ProductId::from("P3"), vec![0.0, 1.0]).unwrap();
    }

    fn purchase(products: &[&str], at: Timestamp) -> PurchaseEvent {
        PurchaseEvent::new(
            TransactionId::new(),
            products.iter().map(|p| PurchaseLine::new(*p, 1)).collect(),
            at,
        )
    }

    #[test]
    fn test_similar_excludes_subject_and_orders_by_cosine() {
        let engine = engine();
        seed_vectors(&engine, EmbeddingSpace::Similar);

        let list = engine.recommend(&RecoRequest::similar("P1", 10)).unwrap();
        assert_eq!(
            list.product_ids(),
            vec![ProductId::from("P2"), ProductId::from("P3")]
        );
        assert!((list.items()[0].score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_similar_unknown_product_is_not_found() {
        let engine = engine();
        seed_vectors(&engine, EmbeddingSpace::Similar);
        assert!(matches!(
            engine.recommend(&RecoRequest::similar("missing", 10)),
            Err(RecoError::NotFound(_))
        ));
    }

    #[test]
    fn test_zero_limit_rejected_before_dispatch() {
        let engine = engine();
        assert!(matches!(
            engine.recommend(&RecoRequest::similar("P1", 0)),
            Err(RecoError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_complementary_falls_back_to_graph_without_vector() {
        let engine = engine();
        let now = Timestamp::now();
        engine.record_purchase(purchase(&["P1", "P9"], now));

        let list = engine
            .recommend(&RecoRequest::complementary("P1", 10))
            .unwrap();
        assert_eq!(list.product_ids(), vec![ProductId::from("P9")]);
    }

    #[test]
    fn test_complementary_prefers_vectors_when_present() {
        let engine = engine();
        seed_vectors(&engine, EmbeddingSpace::Complementary);
        let now = Timestamp::now();
        engine.record_purchase(purchase(&["P1", "P9"], now));

        let list = engine
            .recommend(&RecoRequest::complementary("P1", 10))
            .unwrap();
        // Vector path wins: P9 only co-purchased, not embedded
        assert!(list.contains(&ProductId::from("P2")));
        assert!(!list.contains(&ProductId::from("P9")));
    }

    #[test]
    fn test_cross_sell_counts_drive_order() {
        let engine = engine();
        let now = Timestamp::now();
        engine.record_purchase(purchase(&["P1", "P2"], now));
        engine.record_purchase(purchase(&["P1", "P2"], now));
        engine.record_purchase(purchase(&["P1", "P3"], now));

        let list = engine.recommend(&RecoRequest::cross_sell("P1", 10)).unwrap();
        assert_eq!(
            list.product_ids(),
            vec![ProductId::from("P2"), ProductId::from("P3")]
        );
    }

    #[test]
    fn test_top_sales_reflects_quantities() {
        let engine = engine();
        let now = Timestamp::now();
        engine.record_purchase(PurchaseEvent::new(
            TransactionId::new(),
            vec![PurchaseLine::new("P1", 5), PurchaseLine::new("P2", 2)],
            now,
        ));

        let list = engine.recommend(&RecoRequest::top_sales(10)).unwrap();
        assert_eq!(
            list.product_ids(),
            vec![ProductId::from("P1"), ProductId::from("P2")]
        );
        assert!((list.items()[0].score - 5.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_last_seen_preserves_recency_order() {
        let engine = engine();
        engine.record_view(ViewEvent::new("u1", "P1", Timestamp::from_secs(100)));
        engine.record_view(ViewEvent::new("u1", "P2", Timestamp::from_secs(200)));
        engine.record_view(ViewEvent::new("u1", "P1", Timestamp::from_secs(300)));

        let list = engine.recommend(&RecoRequest::last_seen("u1", 10)).unwrap();
        assert_eq!(
            list.product_ids(),
            vec![ProductId::from("P1"), ProductId::from("P2")]
        );
    }

    #[test]
    fn test_last_seen_is_uncached() {
        let engine = engine();
        engine.record_view(ViewEvent::new("u1", "P1", Timestamp::from_secs(100)));
        let first = engine.recommend(&RecoRequest::last_seen("u1", 10)).unwrap();
        assert_eq!(first.len(), 1);

        engine.record_view(ViewEvent::new("u1", "P2", Timestamp::from_secs(200)));
        let second = engine.recommend(&RecoRequest::last_seen("u1", 10)).unwrap();
        assert_eq!(second.len(), 2);
    }

    #[test]
    fn test_purchase_invalidates_cross_sell_cache() {
        let engine = engine();
        let now = Timestamp::now();
        engine.record_purchase(purchase(&["P1", "P2"], now));

        let before = engine.recommend(&RecoRequest::cross_sell("P1", 10)).unwrap();
        assert_eq!(before.len(), 1);

        engine.record_purchase(purchase(&["P1", "P3"], now));
        let after = engine.recommend(&RecoRequest::cross_sell("P1", 10)).unwrap();
        assert_eq!(after.len(), 2);
    }

    #[test]
    fn test_purchase_invalidates_graph_sourced_complementary_cache() {
        let mut config = RecoConfig::default();
        config.complementary_source = ComplementarySource::CrossSellOnly;
        let engine = EngineBuilder::new(config)
            .embedder(Arc::new(MockEmbedder::new(8)))
            .build();
        let now = Timestamp::now();

        engine.record_purchase(purchase(&["A", "B"], now));
        let before = engine
            .recommend(&RecoRequest::complementary("A", 10))
            .unwrap();
        assert_eq!(before.len(), 1);

        // The new edge must show up even though the old list was cached
        engine.record_purchase(purchase(&["A", "C"], now));
        let after = engine
            .recommend(&RecoRequest::complementary("A", 10))
            .unwrap();
        assert_eq!(after.len(), 2);
        assert!(after.contains(&ProductId::from("C")));
    }

    #[test]
    fn test_view_does_not_invalidate_product_caches() {
        let engine = engine();
        let now = Timestamp::now();
        engine.record_purchase(purchase(&["P1", "P2"], now));
        let before = engine.recommend(&RecoRequest::cross_sell("P1", 10)).unwrap();

        // Views touch only the ledger; cached cross-sell stays as-is
        engine.record_view(ViewEvent::new("u1", "P3", now));
        let after = engine.recommend(&RecoRequest::cross_sell("P1", 10)).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_brand_filter_drops_unknown_and_mismatched() {
        let catalog = Arc::new(InMemoryCatalog::new());
        catalog.upsert(Product::new("P2", "Two").with_brand("acme"));
        catalog.upsert(Product::new("P3", "Three").with_brand("other"));
        let engine = EngineBuilder::new(RecoConfig::default())
            .embedder(Arc::new(MockEmbedder::new(8)))
            .catalog(catalog)
            .build();
        seed_vectors(&engine, EmbeddingSpace::Similar);

        let list = engine
            .recommend(&RecoRequest::similar("P1", 10).with_brand("acme"))
            .unwrap();
        assert_eq!(list.product_ids(), vec![ProductId::from("P2")]);
    }

    #[test]
    fn test_vectorize_product_uses_catalog_text() {
        let catalog = Arc::new(InMemoryCatalog::new());
        catalog.upsert(Product::new("P1", "Trail Runner").with_brand("Acme"));
        let engine = EngineBuilder::new(RecoConfig::default())
            .embedder(Arc::new(MockEmbedder::new(8)))
            .catalog(catalog)
            .build();

        engine
            .vectorize_product(EmbeddingSpace::Similar, &ProductId::from("P1"))
            .unwrap();
        assert!(engine
            .vector_store(EmbeddingSpace::Similar)
            .contains(&ProductId::from("P1")));
        assert_eq!(engine.vector_store(EmbeddingSpace::Similar).dimension(), Some(8));
    }

    #[test]
    fn test_vectorize_unknown_product_is_not_found() {
        let engine = engine();
        assert!(matches!(
            engine.vectorize_product(EmbeddingSpace::Similar, &ProductId::from("ghost")),
            Err(RecoError::NotFound(_))
        ));
    }

    #[test]
    fn test_vectorize_without_embedder_is_rejected() {
        let engine = EngineBuilder::new(RecoConfig::default()).build();
        assert!(matches!(
            engine.vectorize(EmbeddingSpace::Similar, ProductId::from("P1"), "text"),
            Err(RecoError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_rerank_failure_keeps_primary_ordering() {
        use reco_intelligence::FailingReranker;

        let engine = EngineBuilder::new(RecoConfig::default())
            .embedder(Arc::new(MockEmbedder::new(8)))
            .reranker(Arc::new(FailingReranker::new()))
            .build();
        seed_vectors(&engine, EmbeddingSpace::Similar);

        let plain = engine.recommend(&RecoRequest::similar("P1", 10)).unwrap();
        let reranked = engine
            .recommend(&RecoRequest::similar("P1", 10).with_rerank(true))
            .unwrap();
        assert_eq!(plain.product_ids(), reranked.product_ids());
    }

    #[test]
    fn test_rerank_is_a_permutation_of_candidates() {
        use reco_intelligence::MockReranker;

        let engine = EngineBuilder::new(RecoConfig::default())
            .embedder(Arc::new(MockEmbedder::new(8)))
            .reranker(Arc::new(MockReranker::new()))
            .build();
        seed_vectors(&engine, EmbeddingSpace::Similar);

        let plain = engine.recommend(&RecoRequest::similar("P1", 10)).unwrap();
        let reranked = engine
            .recommend(&RecoRequest::similar("P1", 10).with_rerank(true))
            .unwrap();
        assert_eq!(plain.len(), reranked.len());
        for candidate in plain.items() {
            assert!(reranked.contains(&candidate.product));
        }
    }
}
