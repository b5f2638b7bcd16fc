use std::collections::HashSet;
use std::time::Instant;

use dashmap::DashMap;
use tracing::{debug, error, info, warn};

use crate::models::place::GeoPoint;
use crate::observability::metrics::Metrics;
use crate::providers::{GeocodeSource, ProviderError};

pub const DEFAULT_MIN_QUERY_LENGTH: usize = 3;
pub const DEFAULT_PAGE_SIZE: usize = 5;
pub const DEFAULT_MEMO_CAPACITY: usize = 512;

const OPERATION: &str = "place_search";

/// Turns free text into ranked candidate places by walking an ordered chain
/// of geocoding sources until one produces results.
pub struct GeoResolver {
    sources: Vec<Box<dyn GeocodeSource>>,
    min_length: usize,
    page_size: usize,
    memo: Option<DashMap<String, Vec<GeoPoint>>>,
    memo_capacity: usize,
    metrics: Metrics,
}

impl GeoResolver {
    pub fn new(sources: Vec<Box<dyn GeocodeSource>>, metrics: Metrics) -> Self {
        Self {
            sources,
            min_length: DEFAULT_MIN_QUERY_LENGTH,
            page_size: DEFAULT_PAGE_SIZE,
            memo: None,
            memo_capacity: DEFAULT_MEMO_CAPACITY,
            metrics,
        }
    }

    pub fn with_min_length(mut self, min_length: usize) -> Self {
        self.min_length = min_length;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Remembers successful searches by their literal query string. The
    /// memo is emptied whenever a new query would take it past `capacity`.
    pub fn with_memo(mut self, capacity: usize) -> Self {
        self.memo = Some(DashMap::new());
        self.memo_capacity = capacity.max(1);
        self
    }

    pub fn memo_enabled(&self) -> bool {
        self.memo.is_some()
    }

    /// Never fails: when every source fails the error is logged and the
    /// caller gets an empty list. Callers are expected to debounce.
    pub async fn search(&self, query: &str) -> Vec<GeoPoint> {
        if query.chars().count() < self.min_length {
            return Vec::new();
        }

        if let Some(cached) = self.memo.as_ref().and_then(|memo| memo.get(query)) {
            debug!(query, "place search served from memo");
            return cached.value().clone();
        }

        let mut last_error: Option<ProviderError> = None;

        for (stage, source) in self.sources.iter().enumerate() {
            if stage > 0 {
                self.metrics
                    .provider_fallbacks_total
                    .with_label_values(&[OPERATION])
                    .inc();
                info!(provider = source.name(), query, "falling back to next place provider");
            }

            let start = Instant::now();
            let outcome = match source.attempt(query).await {
                Ok(points) if points.is_empty() => Err(ProviderError::Empty),
                other => other,
            };
            let elapsed = start.elapsed().as_secs_f64();

            match outcome {
                Ok(points) => {
                    self.metrics
                        .observe_attempt(OPERATION, source.name(), "success", elapsed);
                    let candidates = self.rank(points);
                    self.remember(query, &candidates);
                    return candidates;
                }
                Err(err) => {
                    let outcome = if matches!(err, ProviderError::Empty) {
                        "empty"
                    } else {
                        "error"
                    };
                    self.metrics
                        .observe_attempt(OPERATION, source.name(), outcome, elapsed);
                    warn!(provider = source.name(), query, error = %err, "place provider failed");
                    last_error = Some(err);
                }
            }
        }

        if let Some(err) = last_error {
            error!(query, error = %err, "place search failed on every provider");
        }
        Vec::new()
    }

    fn remember(&self, query: &str, candidates: &[GeoPoint]) {
        let Some(memo) = &self.memo else {
            return;
        };
        if memo.len() >= self.memo_capacity && !memo.contains_key(query) {
            debug!(entries = memo.len(), "place memo full, clearing");
            memo.clear();
        }
        memo.insert(query.to_string(), candidates.to_vec());
    }

    fn rank(&self, points: Vec<GeoPoint>) -> Vec<GeoPoint> {
        let mut seen = HashSet::new();
        points
            .into_iter()
            .filter(|point| seen.insert(point.dedup_key()))
            .take(self.page_size)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::GeoResolver;
    use crate::models::place::GeoPoint;
    use crate::observability::metrics::Metrics;
    use crate::providers::{GeocodeSource, ProviderError};

    enum Script {
        Points(Vec<GeoPoint>),
        Empty,
        Down,
    }

    struct FakeSource {
        name: &'static str,
        script: Script,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl GeocodeSource for FakeSource {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn attempt(&self, _query: &str) -> Result<Vec<GeoPoint>, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.script {
                Script::Points(points) => Ok(points.clone()),
                Script::Empty => Ok(Vec::new()),
                Script::Down => Err(ProviderError::HttpStatus(503)),
            }
        }
    }

    fn source(name: &'static str, script: Script) -> (Box<dyn GeocodeSource>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let fake = FakeSource {
            name,
            script,
            calls: calls.clone(),
        };
        (Box::new(fake), calls)
    }

    fn point(id: &str, latitude: f64, longitude: f64) -> GeoPoint {
        GeoPoint {
            id: id.to_string(),
            name: id.to_string(),
            address: format!("{id}, Bengaluru"),
            latitude,
            longitude,
        }
    }

    #[tokio::test]
    async fn short_query_makes_no_calls() {
        let (primary, primary_calls) =
            source("primary", Script::Points(vec![point("a", 1.0, 1.0)]));
        let resolver = GeoResolver::new(vec![primary], Metrics::new());

        assert!(resolver.search("ab").await.is_empty());
        assert_eq!(primary_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn primary_results_skip_secondary() {
        let (primary, _) = source(
            "primary",
            Script::Points(vec![point("koramangala", 12.93, 77.62)]),
        );
        let (secondary, secondary_calls) =
            source("secondary", Script::Points(vec![point("x", 0.0, 0.0)]));
        let resolver = GeoResolver::new(vec![primary, secondary], Metrics::new());

        let results = resolver.search("kora").await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "koramangala");
        assert_eq!(secondary_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn zero_predictions_fall_back_then_return_empty() {
        let (primary, primary_calls) = source("primary", Script::Empty);
        let (secondary, secondary_calls) = source("secondary", Script::Empty);
        let resolver = GeoResolver::new(vec![primary, secondary], Metrics::new());

        let results = resolver.search("xyzabc").await;
        assert!(results.is_empty());
        assert_eq!(primary_calls.load(Ordering::SeqCst), 1);
        assert_eq!(secondary_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn transport_failure_uses_secondary() {
        let (primary, _) = source("primary", Script::Down);
        let (secondary, _) = source(
            "secondary",
            Script::Points(vec![point("hebbal", 13.03, 77.59)]),
        );
        let resolver = GeoResolver::new(vec![primary, secondary], Metrics::new());

        let results = resolver.search("hebbal").await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "hebbal");
    }

    #[tokio::test]
    async fn both_providers_down_is_not_an_error() {
        let (primary, _) = source("primary", Script::Down);
        let (secondary, _) = source("secondary", Script::Down);
        let resolver = GeoResolver::new(vec![primary, secondary], Metrics::new());

        assert!(resolver.search("indiranagar").await.is_empty());
    }

    #[tokio::test]
    async fn duplicates_collapse_and_page_is_capped() {
        let points = vec![
            point("a", 12.000001, 77.000001),
            point("a-dup", 12.000002, 77.000002),
            point("b", 12.1, 77.1),
            point("c", 12.2, 77.2),
            point("d", 12.3, 77.3),
        ];
        let (primary, _) = source("primary", Script::Points(points));
        let resolver = GeoResolver::new(vec![primary], Metrics::new()).with_page_size(3);

        let ids: Vec<String> = resolver
            .search("query")
            .await
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn repeated_queries_hit_providers_each_time_without_memo() {
        let (primary, calls) = source("primary", Script::Points(vec![point("a", 1.0, 1.0)]));
        let resolver = GeoResolver::new(vec![primary], Metrics::new());

        resolver.search("whitefield").await;
        resolver.search("whitefield").await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn memo_returns_identical_results_without_new_calls() {
        let (primary, calls) = source("primary", Script::Points(vec![point("a", 1.0, 1.0)]));
        let resolver = GeoResolver::new(vec![primary], Metrics::new()).with_memo(8);

        let first = resolver.search("whitefield").await;
        let second = resolver.search("whitefield").await;
        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn memo_does_not_keep_failures() {
        let (primary, calls) = source("primary", Script::Empty);
        let resolver = GeoResolver::new(vec![primary], Metrics::new()).with_memo(8);

        resolver.search("nowhere").await;
        resolver.search("nowhere").await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn memo_is_cleared_once_capacity_is_reached() {
        let (primary, calls) = source("primary", Script::Points(vec![point("a", 1.0, 1.0)]));
        let resolver = GeoResolver::new(vec![primary], Metrics::new()).with_memo(2);

        resolver.search("whitefield").await;
        resolver.search("hebbal").await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        resolver.search("hebbal").await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        resolver.search("yelahanka").await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(resolver.memo.as_ref().map(|memo| memo.len()), Some(1));

        resolver.search("whitefield").await;
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }
}
