//! Ordered barcode resolver chain.
//!
//! Stages are tried in order until one reports `Found`. A stage that misses
//! or fails (transport error, timeout, malformed payload) advances the chain;
//! nothing escapes the chain as an error. Every attempt is recorded so chain
//! order and termination can be inspected.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use crate::adapters::{BarcodeSource, ProviderError};
use crate::domain::ProductIdentity;

/// Tri-state outcome of one strategy call
#[derive(Debug)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
    Unavailable(ProviderError),
}

impl<T> From<Result<Option<T>, ProviderError>> for Lookup<T> {
    fn from(result: Result<Option<T>, ProviderError>) -> Self {
        match result {
            Ok(Some(value)) => Lookup::Found(value),
            Ok(None) => Lookup::NotFound,
            Err(err) => Lookup::Unavailable(err),
        }
    }
}

/// Run a provider call under the per-call timeout
pub async fn within<T, F>(timeout: Duration, call: F) -> Result<T, ProviderError>
where
    F: Future<Output = Result<T, ProviderError>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(ProviderError::Timeout(timeout)),
    }
}

/// Recorded outcome of a stage attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    Found,
    NotFound,
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageAttempt {
    pub stage: String,
    pub outcome: StageOutcome,
}

/// Result of running the chain
#[derive(Debug, Clone, Default)]
pub struct ChainResolution {
    /// Product and the name of the stage that found it
    pub found: Option<(String, ProductIdentity)>,
    /// Attempts in the order they were made
    pub attempts: Vec<StageAttempt>,
}

impl ChainResolution {
    pub fn product(&self) -> Option<&ProductIdentity> {
        self.found.as_ref().map(|(_, p)| p)
    }
}

/// Ordered list of barcode strategies
#[derive(Clone)]
pub struct BarcodeChain {
    stages: Vec<Arc<dyn BarcodeSource>>,
    timeout: Duration,
}

impl BarcodeChain {
    pub fn new(timeout: Duration) -> Self {
        Self {
            stages: Vec::new(),
            timeout,
        }
    }

    /// Append a stage (tried after all stages added before it)
    pub fn with_stage(mut self, stage: Arc<dyn BarcodeSource>) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Resolve a barcode, stopping at the first stage that finds it
    #[instrument(skip(self))]
    pub async fn resolve(&self, barcode: &str) -> ChainResolution {
        let mut resolution = ChainResolution::default();

        let barcode = barcode.trim();
        if barcode.is_empty() {
            debug!("Empty barcode, nothing to resolve");
            return resolution;
        }

        for stage in &self.stages {
            let lookup: Lookup<ProductIdentity> =
                within(self.timeout, stage.lookup(barcode)).await.into();

            let outcome = match lookup {
                Lookup::Found(product) => {
                    info!(stage = stage.name(), product = %product.name, "Barcode resolved");
                    resolution.attempts.push(StageAttempt {
                        stage: stage.name().to_string(),
                        outcome: StageOutcome::Found,
                    });
                    resolution.found = Some((stage.name().to_string(), product));
                    return resolution;
                }
                Lookup::NotFound => {
                    debug!(stage = stage.name(), "Barcode not found");
                    StageOutcome::NotFound
                }
                Lookup::Unavailable(err) => {
                    warn!(
                        stage = stage.name(),
                        error = %err,
                        malformed = err.is_malformed(),
                        "Barcode stage failed"
                    );
                    StageOutcome::Unavailable(err.to_string())
                }
            };

            resolution.attempts.push(StageAttempt {
                stage: stage.name().to_string(),
                outcome,
            });
        }

        info!(attempts = resolution.attempts.len(), "Barcode not found by any stage");
        resolution
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    enum Behavior {
        Hit(&'static str),
        Miss,
        Fail,
        Hang,
    }

    struct FakeSource {
        name: &'static str,
        behavior: Behavior,
        calls: AtomicUsize,
    }

    impl FakeSource {
        fn new(name: &'static str, behavior: Behavior) -> Arc<Self> {
            Arc::new(Self {
                name,
                behavior,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl BarcodeSource for FakeSource {
        fn name(&self) -> &str {
            self.name
        }

        async fn lookup(&self, barcode: &str) -> Result<Option<ProductIdentity>, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.behavior {
                Behavior::Hit(name) => Ok(Some(ProductIdentity {
                    barcode: Some(barcode.to_string()),
                    ..ProductIdentity::named(name)
                })),
                Behavior::Miss => Ok(None),
                Behavior::Fail => Err(ProviderError::Transport("connection refused".into())),
                Behavior::Hang => {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    Ok(None)
                }
            }
        }
    }

    #[tokio::test]
    async fn test_first_hit_terminates_chain() {
        let primary = FakeSource::new("primary", Behavior::Hit("Milk"));
        let secondary = FakeSource::new("secondary", Behavior::Hit("Other"));
        let chain = BarcodeChain::new(Duration::from_secs(1))
            .with_stage(primary.clone())
            .with_stage(secondary.clone());

        let resolution = chain.resolve("123").await;
        let (stage, product) = resolution.found.unwrap();
        assert_eq!(stage, "primary");
        assert_eq!(product.name, "Milk");
        assert_eq!(product.barcode.as_deref(), Some("123"));
        assert_eq!(secondary.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_miss_and_failure_advance_chain() {
        let chain = BarcodeChain::new(Duration::from_secs(1))
            .with_stage(FakeSource::new("a", Behavior::Fail))
            .with_stage(FakeSource::new("b", Behavior::Miss))
            .with_stage(FakeSource::new("c", Behavior::Hit("Eggs")));

        let resolution = chain.resolve("42").await;
        assert_eq!(resolution.product().unwrap().name, "Eggs");

        let outcomes: Vec<_> = resolution.attempts.iter().map(|a| &a.outcome).collect();
        assert!(matches!(outcomes[0], StageOutcome::Unavailable(_)));
        assert_eq!(outcomes[1], &StageOutcome::NotFound);
        assert_eq!(outcomes[2], &StageOutcome::Found);
    }

    #[tokio::test]
    async fn test_all_miss_is_none() {
        let chain = BarcodeChain::new(Duration::from_secs(1))
            .with_stage(FakeSource::new("a", Behavior::Miss))
            .with_stage(FakeSource::new("b", Behavior::Fail));

        let resolution = chain.resolve("000").await;
        assert!(resolution.found.is_none());
        assert_eq!(resolution.attempts.len(), 2);
    }

    #[tokio::test]
    async fn test_timeout_counts_as_unavailable() {
        let chain = BarcodeChain::new(Duration::from_millis(20))
            .with_stage(FakeSource::new("slow", Behavior::Hang))
            .with_stage(FakeSource::new("fast", Behavior::Hit("Bread")));

        let resolution = chain.resolve("7").await;
        assert_eq!(resolution.product().unwrap().name, "Bread");
        assert!(matches!(
            &resolution.attempts[0].outcome,
            StageOutcome::Unavailable(msg) if msg.starts_with("Timed out")
        ));
    }

    #[tokio::test]
    async fn test_blank_barcode_skips_all_stages() {
        let stage = FakeSource::new("a", Behavior::Hit("X"));
        let chain = BarcodeChain::new(Duration::from_secs(1)).with_stage(stage.clone());

        let resolution = chain.resolve("   ").await;
        assert!(resolution.found.is_none());
        assert_eq!(stage.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_lookup_from_result() {
        assert!(matches!(Lookup::from(Ok::<_, ProviderError>(Some(1))), Lookup::Found(1)));
        assert!(matches!(Lookup::<i32>::from(Ok(None)), Lookup::NotFound));
        assert!(matches!(
            Lookup::<i32>::from(Err(ProviderError::Malformed("x".into()))),
            Lookup::Unavailable(_)
        ));
    }
}
