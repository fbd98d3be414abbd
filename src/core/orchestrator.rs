//! Pipeline orchestrator.
//!
//! Routes voice transcripts to the segmenter and barcode/image captures to
//! the resolver chain, then the store aggregator. Holds only read-only
//! wiring; no state is kept between calls.

use std::sync::Arc;

use tracing::{info, instrument};

use super::recognition::ImageResolver;
use super::resolver::BarcodeChain;
use super::stores::{StoreAggregator, StoreSearch};
use crate::adapters::{
    CloudVisionClient, OpenFoodFactsClient, PlacesClient, ProviderError, UpcItemDbClient,
};
use crate::config::ProviderSettings;
use crate::domain::{ParsedTaskList, ProductIdentity, ResolutionResult};
use crate::extract::parse_tasks;

/// An input captured by the UI
#[derive(Debug, Clone)]
pub enum Capture {
    /// Spoken transcript
    Voice(String),
    /// Scanned barcode digits
    Barcode(String),
    /// Raw image bytes from the camera
    Image(Vec<u8>),
}

/// Output for a capture
#[derive(Debug, Clone)]
pub enum PipelineOutput {
    Tasks(ParsedTaskList),
    /// `None` when no stage identified the product
    Product(Option<ResolutionResult>),
}

/// Main pipeline orchestrator
#[derive(Clone)]
pub struct Orchestrator {
    barcode_chain: BarcodeChain,
    image_resolver: ImageResolver,
    stores: StoreAggregator,
}

impl Orchestrator {
    /// Create an orchestrator from explicit parts
    pub fn new(
        barcode_chain: BarcodeChain,
        image_resolver: ImageResolver,
        stores: StoreAggregator,
    ) -> Self {
        Self {
            barcode_chain,
            image_resolver,
            stores,
        }
    }

    /// Wire real providers, gated by which credentials are present
    pub fn from_settings(settings: &ProviderSettings) -> Result<Self, ProviderError> {
        let timeout = settings.timeout;

        let barcode_chain = BarcodeChain::new(timeout)
            .with_stage(Arc::new(OpenFoodFactsClient::new(
                &settings.open_food_facts_url,
                timeout,
            )?))
            .with_stage(Arc::new(UpcItemDbClient::new(
                &settings.upc_item_db_url,
                timeout,
            )?));

        let image_resolver = match &settings.vision_api_key {
            Some(key) => ImageResolver::new(
                Some(Arc::new(CloudVisionClient::new(
                    &settings.vision_endpoint,
                    key,
                    timeout,
                )?)),
                timeout,
            ),
            None => ImageResolver::disabled(),
        };

        let mut stores = StoreAggregator::new(timeout);
        if let Some(key) = &settings.places_api_key {
            stores = stores.with_source(Arc::new(PlacesClient::new(
                &settings.places_endpoint,
                key,
                settings.search_area(),
                timeout,
            )?));
        }

        info!(
            barcode_stages = ?barcode_chain.stage_names(),
            image_recognition = image_resolver.is_enabled(),
            store_sources = ?stores.source_names(),
            "Pipeline wired"
        );

        Ok(Self::new(barcode_chain, image_resolver, stores))
    }

    /// Dispatch a capture to the matching path
    pub async fn handle(&self, capture: Capture) -> PipelineOutput {
        match capture {
            Capture::Voice(text) => PipelineOutput::Tasks(self.parse_transcript(&text)),
            Capture::Barcode(code) => PipelineOutput::Product(self.resolve_by_barcode(&code).await),
            Capture::Image(bytes) => PipelineOutput::Product(self.resolve_by_image(&bytes).await),
        }
    }

    pub fn parse_transcript(&self, text: &str) -> ParsedTaskList {
        parse_tasks(text)
    }

    #[instrument(skip(self))]
    pub async fn resolve_by_barcode(&self, barcode: &str) -> Option<ResolutionResult> {
        let (source, product) = self.barcode_chain.resolve(barcode).await.found?;
        Some(self.attach_stores(source, product).await)
    }

    #[instrument(skip(self, image), fields(bytes = image.len()))]
    pub async fn resolve_by_image(&self, image: &[u8]) -> Option<ResolutionResult> {
        let (source, product) = self.image_resolver.resolve(image).await?;
        Some(self.attach_stores(source, product).await)
    }

    pub async fn find_stores(&self, product: &ProductIdentity) -> StoreSearch {
        self.stores.search(product).await
    }

    async fn attach_stores(&self, source: String, product: ProductIdentity) -> ResolutionResult {
        let search = self.stores.search(&product).await;
        ResolutionResult {
            product,
            stores: search.stores,
            product_source: source,
            store_provenance: search.provenance,
        }
    }
}
