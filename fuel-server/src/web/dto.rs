//! Data transfer objects for web requests and responses.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{FuelType, Station};
use crate::favorites::AnnotatedStation;
use crate::geo::RankedStation;

/// A station in API responses.
///
/// Carries the request-scoped annotations on top of the canonical fields:
/// `distance` only on nearby results, `is_favorite` resolved against the
/// requesting user (false without a user context).
#[derive(Debug, Serialize)]
pub struct StationDto {
    pub id: String,
    pub name: String,
    pub brand: String,
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    pub city: String,
    pub province: String,
    pub postal_code: String,
    pub schedule: String,
    pub prices: BTreeMap<FuelType, f64>,
    pub last_updated: DateTime<Utc>,

    /// Distance from the query point in km, rounded to 2 decimals.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,

    pub is_favorite: bool,
}

impl StationDto {
    /// Build from a canonical station.
    pub fn from_station(station: &Station, is_favorite: bool) -> Self {
        Self {
            id: station.id.clone(),
            name: station.name.clone(),
            brand: station.brand.clone(),
            latitude: station.latitude,
            longitude: station.longitude,
            address: station.address.clone(),
            city: station.city.clone(),
            province: station.province.clone(),
            postal_code: station.postal_code.clone(),
            schedule: station.schedule.clone(),
            prices: station.prices.clone(),
            last_updated: station.last_updated,
            distance: None,
            is_favorite,
        }
    }

    /// Build from a distance-ranked station.
    pub fn from_ranked(ranked: &RankedStation, is_favorite: bool) -> Self {
        let mut dto = Self::from_station(&ranked.station, is_favorite);
        dto.distance = Some(round2(ranked.distance_km));
        dto
    }

    /// Build from a favorites-annotated station.
    pub fn from_annotated(annotated: &AnnotatedStation) -> Self {
        Self::from_station(&annotated.station, annotated.is_favorite)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Response for station list endpoints.
#[derive(Debug, Serialize)]
pub struct StationListResponse {
    pub stations: Vec<StationDto>,
}

/// Response for the general prices endpoint.
#[derive(Debug, Serialize)]
pub struct PricesResponse {
    pub prices: BTreeMap<FuelType, f64>,
}

/// Query parameters for the nearby endpoint.
#[derive(Debug, Deserialize)]
pub struct NearbyParams {
    pub lat: f64,
    pub lng: f64,

    /// Search radius in km.
    #[serde(default = "default_radius")]
    pub radius: f64,

    /// Optional fuel type filter (API code, e.g. "gasolina95").
    pub fuel_type: Option<String>,
}

fn default_radius() -> f64 {
    5.0
}

/// Request body for adding a favorite.
#[derive(Debug, Deserialize)]
pub struct AddFavoriteRequest {
    pub station_id: String,
}

/// Generic message response.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
