//! UPCitemdb lookup (secondary barcode source).
//!
//! Endpoint: GET /prod/trial/lookup?upc={barcode}
//! Reduced field set: title, brand, category, description, images.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::{http_client, non_blank, BarcodeSource, ProviderError};
use crate::domain::ProductIdentity;

pub const DEFAULT_BASE_URL: &str = "https://api.upcitemdb.com";

/// UPCitemdb client
pub struct UpcItemDbClient {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UpcResponse {
    #[serde(default)]
    items: Vec<UpcItem>,
}

#[derive(Debug, Deserialize)]
struct UpcItem {
    title: Option<String>,
    brand: Option<String>,
    category: Option<String>,
    description: Option<String>,
    #[serde(default)]
    images: Vec<String>,
}

impl UpcItemDbClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ProviderError> {
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: http_client(timeout)?,
        })
    }
}

pub(crate) fn map_response(barcode: &str, response: UpcResponse) -> Option<ProductIdentity> {
    let item = response.items.into_iter().next()?;

    Some(ProductIdentity {
        name: non_blank(item.title).unwrap_or_else(|| "Unknown Product".to_string()),
        brand: non_blank(item.brand),
        category: non_blank(item.category),
        description: non_blank(item.description),
        image_ref: item.images.into_iter().next(),
        barcode: Some(barcode.to_string()),
        size: None,
        quantity: None,
    })
}

#[async_trait]
impl BarcodeSource for UpcItemDbClient {
    fn name(&self) -> &str {
        "upcitemdb"
    }

    async fn lookup(&self, barcode: &str) -> Result<Option<ProductIdentity>, ProviderError> {
        let url = format!("{}/prod/trial/lookup", self.base_url);
        debug!(%barcode, %url, "Querying UPCitemdb");

        let response = self
            .client
            .get(&url)
            .query(&[("upc", barcode)])
            .send()
            .await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status(status.as_u16(), body));
        }

        let decoded: UpcResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;

        Ok(map_response(barcode, decoded))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_item_is_used() {
        let response: UpcResponse = serde_json::from_str(
            r#"{
                "code": "OK",
                "items": [
                    {
                        "title": "Heinz Tomato Ketchup 20oz",
                        "brand": "Heinz",
                        "category": "Food > Condiments",
                        "description": "Classic ketchup",
                        "images": ["https://img.test/a.jpg", "https://img.test/b.jpg"]
                    },
                    { "title": "Other" }
                ]
            }"#,
        )
        .unwrap();

        let product = map_response("013000006408", response).unwrap();
        assert_eq!(product.name, "Heinz Tomato Ketchup 20oz");
        assert_eq!(product.brand.as_deref(), Some("Heinz"));
        assert_eq!(product.image_ref.as_deref(), Some("https://img.test/a.jpg"));
        assert_eq!(product.size, None);
    }

    #[test]
    fn test_empty_items_is_a_miss() {
        let response: UpcResponse =
            serde_json::from_str(r#"{ "code": "OK", "total": 0, "items": [] }"#).unwrap();
        assert!(map_response("0", response).is_none());
    }
}
