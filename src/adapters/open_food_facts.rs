//! Open Food Facts product database (primary barcode source).
//!
//! Endpoint: GET /api/v0/product/{barcode}.json
//! No key required. A miss is reported in-band with `status: 0`.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::{http_client, non_blank, BarcodeSource, ProviderError};
use crate::domain::ProductIdentity;
use crate::extract::extract_quantity;

pub const DEFAULT_BASE_URL: &str = "https://world.openfoodfacts.org";

/// Open Food Facts client
pub struct OpenFoodFactsClient {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OffResponse {
    #[serde(default)]
    status: i64,
    product: Option<OffProduct>,
}

#[derive(Debug, Deserialize)]
struct OffProduct {
    product_name: Option<String>,
    brands: Option<String>,
    categories: Option<String>,
    generic_name: Option<String>,
    image_url: Option<String>,
    /// Package size as printed, e.g. "355 ml"
    quantity: Option<String>,
}

impl OpenFoodFactsClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ProviderError> {
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: http_client(timeout)?,
        })
    }

    fn product_url(&self, barcode: &str) -> String {
        format!("{}/api/v0/product/{}.json", self.base_url, barcode)
    }
}

/// Map a decoded response into a product identity (None on miss)
pub(crate) fn map_response(barcode: &str, response: OffResponse) -> Option<ProductIdentity> {
    if response.status != 1 {
        return None;
    }
    let product = response.product?;

    let size = non_blank(product.quantity);
    let quantity = size.as_deref().and_then(extract_quantity);

    Some(ProductIdentity {
        name: non_blank(product.product_name).unwrap_or_else(|| "Unknown Product".to_string()),
        brand: non_blank(product.brands),
        category: non_blank(product.categories),
        description: non_blank(product.generic_name),
        image_ref: non_blank(product.image_url),
        barcode: Some(barcode.to_string()),
        size,
        quantity,
    })
}

#[async_trait]
impl BarcodeSource for OpenFoodFactsClient {
    fn name(&self) -> &str {
        "open_food_facts"
    }

    async fn lookup(&self, barcode: &str) -> Result<Option<ProductIdentity>, ProviderError> {
        let url = self.product_url(barcode);
        debug!(%barcode, %url, "Querying Open Food Facts");

        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status(status.as_u16(), body));
        }

        let decoded: OffResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;

        Ok(map_response(barcode, decoded))
    }
}
