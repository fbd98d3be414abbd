//! Store availability records and the store-type vocabulary.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One store's claimed stock, price and location for a product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreAvailabilityRecord {
    pub store_name: String,

    /// Distance from the search location in miles
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,

    /// Price in dollars
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,

    pub in_stock: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,

    pub store_type: StoreType,

    /// Provider rating (0.0 - 5.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
}

impl StoreAvailabilityRecord {
    /// Create a record with only a name; the type is classified from the name
    pub fn new(store_name: impl Into<String>, in_stock: bool) -> Self {
        let store_name = store_name.into();
        Self {
            store_type: StoreType::classify(&store_name, &[]),
            store_name,
            distance: None,
            price: None,
            in_stock,
            address: None,
            coordinates: None,
            rating: None,
        }
    }
}

/// Latitude/longitude pair in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance in miles
    pub fn distance_miles(&self, other: &Coordinates) -> f64 {
        const EARTH_RADIUS_MILES: f64 = 3958.8;

        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let d_lat = (other.latitude - self.latitude).to_radians();
        let d_lon = (other.longitude - self.longitude).to_radians();

        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_MILES * a.sqrt().asin()
    }
}

/// Closed vocabulary of store types used for grouping and filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreType {
    Grocery,
    Pharmacy,
    GeneralMerchandise,
    Warehouse,
    Convenience,
    Electronics,
    HomeImprovement,
    Other,
}

/// Name keywords per store type, checked in order
const NAME_KEYWORDS: &[(StoreType, &[&str])] = &[
    (
        StoreType::Pharmacy,
        &["cvs", "walgreens", "rite aid", "pharmacy", "drug"],
    ),
    (
        StoreType::Warehouse,
        &["costco", "sam's club", "bj's"],
    ),
    (
        StoreType::GeneralMerchandise,
        &["target", "walmart", "kmart", "dollar"],
    ),
    (
        StoreType::Grocery,
        &[
            "whole foods",
            "safeway",
            "kroger",
            "trader joe",
            "aldi",
            "publix",
            "market",
            "grocery",
            "foods",
        ],
    ),
    (
        StoreType::Convenience,
        &["7-eleven", "circle k", "convenience"],
    ),
    (StoreType::Electronics, &["best buy", "electronics"]),
    (
        StoreType::HomeImprovement,
        &["home depot", "lowe's", "ace hardware", "hardware"],
    ),
];

/// Place-type tags (as reported by places providers) per store type
const PLACE_TYPES: &[(StoreType, &[&str])] = &[
    (StoreType::Pharmacy, &["pharmacy", "drugstore"]),
    (StoreType::Grocery, &["supermarket", "grocery_or_supermarket"]),
    (StoreType::Convenience, &["convenience_store"]),
    (StoreType::Electronics, &["electronics_store"]),
    (StoreType::HomeImprovement, &["hardware_store", "home_goods_store"]),
    (StoreType::GeneralMerchandise, &["department_store"]),
];

impl StoreType {
    pub const ALL: [StoreType; 8] = [
        StoreType::Grocery,
        StoreType::Pharmacy,
        StoreType::GeneralMerchandise,
        StoreType::Warehouse,
        StoreType::Convenience,
        StoreType::Electronics,
        StoreType::HomeImprovement,
        StoreType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StoreType::Grocery => "grocery",
            StoreType::Pharmacy => "pharmacy",
            StoreType::GeneralMerchandise => "general_merchandise",
            StoreType::Warehouse => "warehouse",
            StoreType::Convenience => "convenience",
            StoreType::Electronics => "electronics",
            StoreType::HomeImprovement => "home_improvement",
            StoreType::Other => "other",
        }
    }

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            StoreType::Grocery => "Grocery Stores",
            StoreType::Pharmacy => "Pharmacies",
            StoreType::GeneralMerchandise => "General Merchandise",
            StoreType::Warehouse => "Warehouse Clubs",
            StoreType::Convenience => "Convenience Stores",
            StoreType::Electronics => "Electronics",
            StoreType::HomeImprovement => "Home Improvement",
            StoreType::Other => "Other Stores",
        }
    }

    /// Classify a store by well-known name first, then by provider place types
    pub fn classify(store_name: &str, place_types: &[String]) -> StoreType {
        let name = store_name.to_lowercase();

        for (store_type, keywords) in NAME_KEYWORDS {
            if keywords.iter().any(|k| name.contains(k)) {
                return *store_type;
            }
        }

        for (store_type, tags) in PLACE_TYPES {
            if place_types.iter().any(|t| tags.contains(&t.as_str())) {
                return *store_type;
            }
        }

        StoreType::Other
    }
}

impl std::fmt::Display for StoreType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown store type: {0}")]
pub struct UnknownStoreType(pub String);

impl std::str::FromStr for StoreType {
    type Err = UnknownStoreType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase().replace(['-', ' '], "_");
        StoreType::ALL
            .into_iter()
            .find(|t| t.as_str() == key)
            .ok_or_else(|| UnknownStoreType(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_by_name() {
        assert_eq!(StoreType::classify("Target", &[]), StoreType::GeneralMerchandise);
        assert_eq!(StoreType::classify("Whole Foods Market", &[]), StoreType::Grocery);
        assert_eq!(StoreType::classify("CVS", &[]), StoreType::Pharmacy);
        assert_eq!(StoreType::classify("Costco Wholesale", &[]), StoreType::Warehouse);
    }

    #[test]
    fn test_classify_falls_back_to_place_types() {
        let types = vec!["store".to_string(), "convenience_store".to_string()];
        assert_eq!(StoreType::classify("Corner Shop", &types), StoreType::Convenience);
        assert_eq!(StoreType::classify("Corner Shop", &[]), StoreType::Other);
    }

    #[test]
    fn test_store_type_parses_cli_spellings() {
        assert_eq!("grocery".parse::<StoreType>().unwrap(), StoreType::Grocery);
        assert_eq!(
            "home-improvement".parse::<StoreType>().unwrap(),
            StoreType::HomeImprovement
        );
        assert!("bakery".parse::<StoreType>().is_err());
    }

    #[test]
    fn test_distance_miles() {
        let sf = Coordinates::new(37.7749, -122.4194);
        let oakland = Coordinates::new(37.8044, -122.2712);
        let d = sf.distance_miles(&oakland);
        assert!(d > 8.0 && d < 9.0, "got {}", d);
        assert_eq!(sf.distance_miles(&sf), 0.0);
    }
}
