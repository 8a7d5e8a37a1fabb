//! Canonical fuel station entity.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::FuelType;

/// A normalized fuel station.
///
/// Produced by the normalizer from a raw provider record and immutable
/// afterwards: query-time annotations (distance, favorite flag) are applied
/// to copies in the response layer, never here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    /// Stable identifier: the provider's native station id, or a generated
    /// one when the record carries none.
    pub id: String,
    /// Display name, derived as "{brand} {city}".
    pub name: String,
    pub brand: String,
    pub address: String,
    pub city: String,
    pub province: String,
    pub postal_code: String,
    /// Opening hours, free text from the provider.
    pub schedule: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Price per fuel type. Normalization guarantees at least one entry.
    pub prices: BTreeMap<FuelType, f64>,
    /// When this record was normalized.
    pub last_updated: DateTime<Utc>,
}

impl Station {
    /// Whether the station reports a price for the given fuel type.
    pub fn has_fuel(&self, fuel: FuelType) -> bool {
        self.prices.contains_key(&fuel)
    }

    /// Whether the coordinates are plausible.
    ///
    /// The normalizer rejects bad coordinates already; query code checks
    /// again so a malformed station can never enter distance math.
    /// A zero on either axis is the provider's "coordinates unknown"
    /// sentinel.
    pub fn has_valid_coordinates(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude.abs() <= 90.0
            && self.longitude.abs() <= 180.0
            && self.latitude != 0.0
            && self.longitude != 0.0
    }
}
