//! Google Places nearby search (live store source).
//!
//! Endpoint: GET /maps/api/place/nearbysearch/json
//! The provider exposes no inventory or pricing, so every record is
//! optimistically in stock with no price.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::{http_client, non_blank, ProviderError, StoreSource};
use crate::domain::{Coordinates, ProductIdentity, StoreAvailabilityRecord, StoreType};

pub const DEFAULT_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/place/nearbysearch/json";

/// Search parameters for nearby-store queries
#[derive(Debug, Clone)]
pub struct SearchArea {
    pub center: Coordinates,
    pub radius_meters: u32,
    pub max_results: usize,
}

/// Places client
pub struct PlacesClient {
    endpoint: String,
    api_key: String,
    area: SearchArea,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NearbyResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    results: Vec<Place>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Place {
    name: String,
    vicinity: Option<String>,
    geometry: Option<Geometry>,
    rating: Option<f64>,
    #[serde(default)]
    types: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

impl PlacesClient {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        area: SearchArea,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            area,
            client: http_client(timeout)?,
        })
    }
}

/// Map a nearby-search response into capped store records
pub(crate) fn map_response(
    response: NearbyResponse,
    area: &SearchArea,
) -> Result<Vec<StoreAvailabilityRecord>, ProviderError> {
    match response.status.as_str() {
        "OK" | "ZERO_RESULTS" => {}
        "" => {
            return Err(ProviderError::Malformed(
                "nearby search response has no status".to_string(),
            ))
        }
        other => {
            return Err(ProviderError::Status(
                200,
                format!("{}: {}", other, response.error_message.unwrap_or_default()),
            ))
        }
    }

    let records = response
        .results
        .into_iter()
        .take(area.max_results)
        .map(|place| {
            let coordinates = place
                .geometry
                .map(|g| Coordinates::new(g.location.lat, g.location.lng));
            StoreAvailabilityRecord {
                store_type: StoreType::classify(&place.name, &place.types),
                distance: coordinates.map(|c| area.center.distance_miles(&c)),
                price: None,
                in_stock: true,
                address: non_blank(place.vicinity),
                coordinates,
                rating: place.rating,
                store_name: place.name,
            }
        })
        .collect();

    Ok(records)
}

#[async_trait]
impl StoreSource for PlacesClient {
    fn name(&self) -> &str {
        "google_places"
    }

    async fn search(
        &self,
        product: &ProductIdentity,
    ) -> Result<Vec<StoreAvailabilityRecord>, ProviderError> {
        let keyword = product.search_query();
        let location = format!("{},{}", self.area.center.latitude, self.area.center.longitude);
        let radius = self.area.radius_meters.to_string();
        debug!(%keyword, %location, "Querying Places nearby search");

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("location", location.as_str()),
                ("radius", radius.as_str()),
                ("keyword", keyword.as_str()),
                ("type", "store"),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status(status.as_u16(), body));
        }

        let decoded: NearbyResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;

        map_response(decoded, &self.area)
    }
}
