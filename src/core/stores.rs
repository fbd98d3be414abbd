//! Store availability aggregation, filtering and grouping.
//!
//! Store sources are tried in order; the first one that answers (even with
//! an empty list) wins. A failed or timed-out source advances to the next.
//! The mock panel always sits last, so a search with zero configuration
//! still yields five presentable records.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use super::resolver::within;
use crate::adapters::{ProviderError, StoreSource};
use crate::domain::{ProductIdentity, StoreAvailabilityRecord, StoreProvenance, StoreType};

/// Retailers in the mock panel, nearest first
const MOCK_STORES: [&str; 5] = ["Target", "Walmart", "Whole Foods", "Safeway", "CVS"];
const MOCK_DISTANCE_STEP_MILES: f64 = 0.5;
const MOCK_IN_STOCK_RATE: f64 = 0.8;

/// Synthetic last-resort store source
#[derive(Debug, Clone, Default)]
pub struct MockStoreSource {
    seed: Option<u64>,
}

impl MockStoreSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reproducible panel for tests and demos
    pub fn with_seed(seed: u64) -> Self {
        Self { seed: Some(seed) }
    }
}

/// Build the mock panel: fixed names, increasing distance, random price/stock
pub fn mock_panel<R: Rng>(rng: &mut R) -> Vec<StoreAvailabilityRecord> {
    MOCK_STORES
        .iter()
        .enumerate()
        .map(|(index, name)| StoreAvailabilityRecord {
            distance: Some((index + 1) as f64 * MOCK_DISTANCE_STEP_MILES),
            price: Some(rng.gen_range(5.0..25.0)),
            in_stock: rng.gen_bool(MOCK_IN_STOCK_RATE),
            address: Some(format!("{} Main St", rng.gen_range(1000..10000))),
            ..StoreAvailabilityRecord::new(*name, true)
        })
        .collect()
}

#[async_trait]
impl StoreSource for MockStoreSource {
    fn name(&self) -> &str {
        "mock"
    }

    fn is_synthetic(&self) -> bool {
        true
    }

    async fn search(
        &self,
        _product: &ProductIdentity,
    ) -> Result<Vec<StoreAvailabilityRecord>, ProviderError> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(mock_panel(&mut rng))
    }
}

/// Store records with their provenance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreSearch {
    pub stores: Vec<StoreAvailabilityRecord>,
    pub provenance: StoreProvenance,
}

/// Ordered store sources ending in the mock fallback
#[derive(Clone)]
pub struct StoreAggregator {
    sources: Vec<Arc<dyn StoreSource>>,
    fallback: Arc<dyn StoreSource>,
    timeout: Duration,
}

impl StoreAggregator {
    pub fn new(timeout: Duration) -> Self {
        Self {
            sources: Vec::new(),
            fallback: Arc::new(MockStoreSource::new()),
            timeout,
        }
    }

    /// Append a live source
    pub fn with_source(mut self, source: Arc<dyn StoreSource>) -> Self {
        self.sources.push(source);
        self
    }

    /// Replace the last-resort source
    pub fn with_fallback(mut self, fallback: Arc<dyn StoreSource>) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn source_names(&self) -> Vec<&str> {
        self.sources
            .iter()
            .chain(std::iter::once(&self.fallback))
            .map(|s| s.name())
            .collect()
    }

    /// Records only; see [`StoreAggregator::search`]
    pub async fn find_stores(&self, product: &ProductIdentity) -> Vec<StoreAvailabilityRecord> {
        self.search(product).await.stores
    }

    /// Query sources in order and return the first answer
    #[instrument(skip(self, product), fields(query = %product.search_query()))]
    pub async fn search(&self, product: &ProductIdentity) -> StoreSearch {
        for source in self.sources.iter().chain(std::iter::once(&self.fallback)) {
            match within(self.timeout, source.search(product)).await {
                Ok(stores) => {
                    info!(source = source.name(), count = stores.len(), "Store search answered");
                    let provenance = if source.is_synthetic() {
                        StoreProvenance::Synthetic
                    } else {
                        StoreProvenance::Live {
                            source: source.name().to_string(),
                        }
                    };
                    return StoreSearch { stores, provenance };
                }
                Err(err) => {
                    warn!(source = source.name(), error = %err, "Store source failed");
                }
            }
        }

        debug!("Every store source failed, including the fallback");
        StoreSearch {
            stores: Vec::new(),
            provenance: StoreProvenance::Synthetic,
        }
    }
}

/// Constraints for [`filter_stores`]; unset fields do not filter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreFilter {
    /// Keep stores at most this many miles away (unknown distance is dropped)
    pub max_distance: Option<f64>,
    #[serde(default)]
    pub in_stock_only: bool,
    /// Keep stores of these types (empty keeps all)
    #[serde(default)]
    pub store_types: Vec<StoreType>,
    /// Keep stores rated at least this (unrated stores are dropped)
    pub min_rating: Option<f64>,
}

impl StoreFilter {
    pub fn accepts(&self, store: &StoreAvailabilityRecord) -> bool {
        if let Some(max) = self.max_distance {
            if !store.distance.is_some_and(|d| d <= max) {
                return false;
            }
        }
        if self.in_stock_only && !store.in_stock {
            return false;
        }
        if !self.store_types.is_empty() && !self.store_types.contains(&store.store_type) {
            return false;
        }
        if let Some(min) = self.min_rating {
            if !store.rating.is_some_and(|r| r >= min) {
                return false;
            }
        }
        true
    }
}

/// Stores satisfying every set constraint, in input order
pub fn filter_stores(
    stores: &[StoreAvailabilityRecord],
    filter: &StoreFilter,
) -> Vec<StoreAvailabilityRecord> {
    stores.iter().filter(|s| filter.accepts(s)).cloned().collect()
}

/// Partition stores by type, keeping input order within each group
pub fn group_stores_by_type(
    stores: &[StoreAvailabilityRecord],
) -> BTreeMap<StoreType, Vec<StoreAvailabilityRecord>> {
    let mut groups: BTreeMap<StoreType, Vec<StoreAvailabilityRecord>> = BTreeMap::new();
    for store in stores {
        groups.entry(store.store_type).or_default().push(store.clone());
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(name: &str, distance: Option<f64>, in_stock: bool, rating: Option<f64>) -> StoreAvailabilityRecord {
        StoreAvailabilityRecord {
            distance,
            rating,
            ..StoreAvailabilityRecord::new(name, in_stock)
        }
    }

    fn sample() -> Vec<StoreAvailabilityRecord> {
        vec![
            store("Target", Some(0.5), true, Some(4.1)),
            store("CVS", Some(1.0), false, Some(3.2)),
            store("Safeway", Some(2.0), true, None),
            store("Walmart", None, true, Some(4.8)),
            store("Whole Foods", Some(3.0), false, Some(4.5)),
        ]
    }

    #[test]
    fn test_mock_panel_shape() {
        let mut rng = StdRng::seed_from_u64(7);
        let panel = mock_panel(&mut rng);

        let names: Vec<_> = panel.iter().map(|s| s.store_name.as_str()).collect();
        assert_eq!(names, MOCK_STORES);

        let distances: Vec<f64> = panel.iter().map(|s| s.distance.unwrap()).collect();
        assert_eq!(distances, vec![0.5, 1.0, 1.5, 2.0, 2.5]);

        for record in &panel {
            let price = record.price.unwrap();
            assert!((5.0..25.0).contains(&price));
            assert!(record.address.as_ref().unwrap().ends_with(" Main St"));
        }
    }

    #[test]
    fn test_seeded_panel_is_reproducible() {
        let a = mock_panel(&mut StdRng::seed_from_u64(1));
        let b = mock_panel(&mut StdRng::seed_from_u64(1));
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_filter_is_identity() {
        let stores = sample();
        assert_eq!(filter_stores(&stores, &StoreFilter::default()), stores);
    }

    #[test]
    fn test_in_stock_only() {
        let filtered = filter_stores(
            &sample(),
            &StoreFilter {
                in_stock_only: true,
                ..Default::default()
            },
        );
        assert!(filtered.iter().all(|s| s.in_stock));
        let names: Vec<_> = filtered.iter().map(|s| s.store_name.as_str()).collect();
        assert_eq!(names, vec!["Target", "Safeway", "Walmart"]);
    }

    #[test]
    fn test_combined_constraints() {
        let filter = StoreFilter {
            max_distance: Some(2.5),
            min_rating: Some(4.0),
            ..Default::default()
        };
        let names: Vec<_> = filter_stores(&sample(), &filter)
            .into_iter()
            .map(|s| s.store_name)
            .collect();
        assert_eq!(names, vec!["Target"]);
    }

    #[test]
    fn test_store_type_constraint() {
        let filter = StoreFilter {
            store_types: vec![StoreType::Grocery, StoreType::Pharmacy],
            ..Default::default()
        };
        let names: Vec<_> = filter_stores(&sample(), &filter)
            .into_iter()
            .map(|s| s.store_name)
            .collect();
        assert_eq!(names, vec!["CVS", "Safeway", "Whole Foods"]);
    }

    #[test]
    fn test_grouping_preserves_order() {
        let groups = group_stores_by_type(&sample());
        assert_eq!(groups.len(), 3);

        let general: Vec<_> = groups[&StoreType::GeneralMerchandise]
            .iter()
            .map(|s| s.store_name.as_str())
            .collect();
        assert_eq!(general, vec!["Target", "Walmart"]);

        let grocery: Vec<_> = groups[&StoreType::Grocery]
            .iter()
            .map(|s| s.store_name.as_str())
            .collect();
        assert_eq!(grocery, vec!["Safeway", "Whole Foods"]);
        assert_eq!(groups[&StoreType::Pharmacy].len(), 1);
    }

    struct BrokenSource;

    #[async_trait]
    impl StoreSource for BrokenSource {
        fn name(&self) -> &str {
            "broken"
        }

        async fn search(
            &self,
            _product: &ProductIdentity,
        ) -> Result<Vec<StoreAvailabilityRecord>, ProviderError> {
            Err(ProviderError::Transport("dns failure".into()))
        }
    }

    #[tokio::test]
    async fn test_failed_source_falls_back_to_mock() {
        let aggregator = StoreAggregator::new(Duration::from_secs(1))
            .with_source(Arc::new(BrokenSource))
            .with_fallback(Arc::new(MockStoreSource::with_seed(3)));
        assert_eq!(aggregator.source_names(), vec!["broken", "mock"]);

        let search = aggregator.search(&ProductIdentity::named("Milk")).await;
        assert_eq!(search.stores.len(), 5);
        assert_eq!(search.provenance, StoreProvenance::Synthetic);
    }
}
