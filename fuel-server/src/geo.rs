//! Geospatial queries over the canonical station list.

use crate::domain::{FuelType, Station};

/// Mean Earth radius in kilometres.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Result-size cap for nearby and search queries.
const MAX_RESULTS: usize = 50;

/// A station annotated with its distance from the query point.
#[derive(Debug, Clone)]
pub struct RankedStation {
    pub station: Station,
    pub distance_km: f64,
}

/// Great-circle distance between two points, via the haversine formula.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();

    let a = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Stations within `radius_km` of the query point, nearest first.
///
/// When `fuel` is given, only stations reporting that fuel qualify. Ties in
/// distance keep their source order; results are capped at 50. Stations with
/// implausible coordinates are skipped even though the normalizer should not
/// have let them through.
pub fn nearby(
    stations: &[Station],
    lat: f64,
    lon: f64,
    radius_km: f64,
    fuel: Option<FuelType>,
) -> Vec<RankedStation> {
    let mut ranked: Vec<RankedStation> = stations
        .iter()
        .filter(|s| s.has_valid_coordinates())
        .filter(|s| fuel.is_none_or(|f| s.has_fuel(f)))
        .filter_map(|s| {
            let distance_km = haversine_km(lat, lon, s.latitude, s.longitude);
            (distance_km <= radius_km).then(|| RankedStation {
                station: s.clone(),
                distance_km,
            })
        })
        .collect();

    ranked.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    ranked.truncate(MAX_RESULTS);
    ranked
}

/// Case-insensitive substring search over name, brand, address and city.
///
/// No relevance ranking: matches keep their source order, capped at 50.
pub fn search(stations: &[Station], query: &str) -> Vec<Station> {
    let needle = query.to_lowercase();

    stations
        .iter()
        .filter(|s| {
            s.name.to_lowercase().contains(&needle)
                || s.brand.to_lowercase().contains(&needle)
                || s.address.to_lowercase().contains(&needle)
                || s.city.to_lowercase().contains(&needle)
        })
        .take(MAX_RESULTS)
        .cloned()
        .collect()
}
