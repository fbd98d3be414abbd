//! Adapter interfaces for external providers.
//!
//! Each provider is a strategy behind one of three traits:
//! - [`BarcodeSource`]: product-by-barcode databases
//! - [`ImageLabeler`]: multi-feature image annotation
//! - [`StoreSource`]: nearby-store search
//!
//! Strategies report a miss as `Ok(None)` / `Ok(vec![])` and every
//! configuration, transport or payload problem as a [`ProviderError`].

pub mod cloud_vision;
pub mod open_food_facts;
pub mod places;
pub mod upc_item_db;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{ProductIdentity, StoreAvailabilityRecord};

pub use cloud_vision::CloudVisionClient;
pub use open_food_facts::OpenFoodFactsClient;
pub use places::PlacesClient;
pub use upc_item_db::UpcItemDbClient;

const USER_AGENT: &str = concat!("ellio/", env!("CARGO_PKG_VERSION"));

/// Provider failure. Every variant means "stage unavailable"
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    #[error("Network error: {0}")]
    Transport(String),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("API error {0}: {1}")]
    Status(u16, String),

    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl ProviderError {
    /// The provider answered, but with a payload we could not read
    pub fn is_malformed(&self) -> bool {
        matches!(self, ProviderError::Malformed(_))
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ProviderError::Malformed(err.to_string())
        } else {
            ProviderError::Transport(err.to_string())
        }
    }
}

/// Decoded image annotation payload
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageAnnotations {
    /// General labels, most confident first
    pub labels: Vec<String>,
    /// Detected brand logos
    pub logos: Vec<String>,
    /// Localized physical objects
    pub objects: Vec<String>,
    /// Full OCR text block
    pub text: String,
}

/// Product-by-barcode lookup strategy
#[async_trait]
pub trait BarcodeSource: Send + Sync {
    /// Stage name (used in logs and provenance)
    fn name(&self) -> &str;

    /// Look up a barcode; `Ok(None)` is a definitive miss
    async fn lookup(&self, barcode: &str) -> Result<Option<ProductIdentity>, ProviderError>;
}

/// Image recognition strategy
#[async_trait]
pub trait ImageLabeler: Send + Sync {
    fn name(&self) -> &str;

    /// Annotate raw image bytes; `Ok(None)` when the provider saw nothing
    async fn annotate(&self, image: &[u8]) -> Result<Option<ImageAnnotations>, ProviderError>;
}

/// Nearby-store search strategy
#[async_trait]
pub trait StoreSource: Send + Sync {
    fn name(&self) -> &str;

    /// Whether records from this source are synthetic
    fn is_synthetic(&self) -> bool {
        false
    }

    async fn search(
        &self,
        product: &ProductIdentity,
    ) -> Result<Vec<StoreAvailabilityRecord>, ProviderError>;
}

/// Build the shared HTTP client used by all adapters
pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(|e| ProviderError::Transport(e.to_string()))
}

/// Treat blank provider strings as missing
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
