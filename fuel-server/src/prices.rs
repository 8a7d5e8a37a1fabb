//! Network-wide average fuel prices.

use std::collections::BTreeMap;

use crate::domain::{FuelType, Station};

/// Average price per fuel type across the canonical station list.
///
/// The denominator for each fuel is the number of stations reporting it,
/// not the total station count. Fuel types no station reports are absent
/// from the result. Averages are rounded to 3 decimals, matching the
/// provider's price precision.
pub fn average_prices(stations: &[Station]) -> BTreeMap<FuelType, f64> {
    let mut sums: BTreeMap<FuelType, f64> = BTreeMap::new();
    let mut counts: BTreeMap<FuelType, u32> = BTreeMap::new();

    for station in stations {
        for (&fuel, &price) in &station.prices {
            *sums.entry(fuel).or_default() += price;
            *counts.entry(fuel).or_default() += 1;
        }
    }

    sums.into_iter()
        .map(|(fuel, sum)| {
            let count = f64::from(counts[&fuel]);
            (fuel, round3(sum / count))
        })
        .collect()
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
