//! Fuel station data service.
//!
//! Ingests the public fuel-price dataset through a multi-tier fallback
//! chain, normalizes it into canonical stations, caches it with a staleness
//! policy, and answers nearby/search/price queries with per-user favorites
//! overlaid at read time.

pub mod cache;
pub mod domain;
pub mod favorites;
pub mod geo;
pub mod prices;
pub mod provider;
pub mod web;
