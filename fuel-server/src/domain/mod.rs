//! Canonical domain types for the fuel station service.
//!
//! Everything downstream of the normalizer works with these strongly-typed
//! entities; raw provider shapes never leave the provider module.

mod fuel_type;
mod station;

pub use fuel_type::{FuelType, PROVIDER_PRICE_FIELDS, UnknownFuelType};
pub use station::Station;
