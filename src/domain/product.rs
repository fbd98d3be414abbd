//! Product identities and resolution results.

use serde::{Deserialize, Serialize};

use super::store::StoreAvailabilityRecord;

/// Structured description of a scanned or photographed product
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductIdentity {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// URL of a product image
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,

    /// Size as printed, unit preserved (e.g. "12 fl oz")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,

    /// Pack count, always positive when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
}

impl ProductIdentity {
    /// Create an identity with only a name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Keyword used for nearby-store search: brand followed by name
    pub fn search_query(&self) -> String {
        format!("{} {}", self.brand.as_deref().unwrap_or(""), self.name)
            .trim()
            .to_string()
    }
}

/// Where a set of store records came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoreProvenance {
    /// Returned by a real nearby-store provider
    Live { source: String },

    /// Substituted mock panel
    Synthetic,
}

impl StoreProvenance {
    pub fn is_synthetic(&self) -> bool {
        matches!(self, StoreProvenance::Synthetic)
    }
}

/// A resolved product with its store availability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionResult {
    pub product: ProductIdentity,

    /// Ordered store records
    pub stores: Vec<StoreAvailabilityRecord>,

    /// Name of the resolver stage that identified the product
    pub product_source: String,

    pub store_provenance: StoreProvenance,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_query_with_brand() {
        let product = ProductIdentity {
            brand: Some("Coca-Cola".to_string()),
            ..ProductIdentity::named("Classic Soda")
        };
        assert_eq!(product.search_query(), "Coca-Cola Classic Soda");
    }

    #[test]
    fn test_search_query_without_brand() {
        assert_eq!(ProductIdentity::named("Oat Milk").search_query(), "Oat Milk");
    }

    #[test]
    fn test_unset_fields_are_omitted_from_json() {
        let json = serde_json::to_value(ProductIdentity::named("Bottle")).unwrap();
        assert_eq!(json, serde_json::json!({ "name": "Bottle" }));
    }
}
