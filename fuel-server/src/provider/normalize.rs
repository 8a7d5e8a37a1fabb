//! Conversion from raw provider records to canonical stations.
//!
//! Bad records are a fact of life in this dataset: prices are
//! locale-formatted strings, coordinates use a zero sentinel for "unknown",
//! and text fields are frequently double-encoded. A record that cannot be
//! salvaged is counted and skipped; only a payload with no usable records at
//! all is the caller's problem.

use std::collections::BTreeMap;

use chrono::Utc;
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

use crate::domain::{PROVIDER_PRICE_FIELDS, Station};

use super::types::{RawPayload, RawRecord};

/// Counters for one normalization pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeStats {
    /// Records converted into canonical stations.
    pub processed: usize,
    /// Records dropped as unusable.
    pub rejected: usize,
}

/// Normalize a raw payload into canonical stations.
///
/// Output order is unspecified; the query layer imposes its own ordering.
/// Never fails on individual records.
pub fn normalize(payload: &RawPayload) -> (Vec<Station>, NormalizeStats) {
    let mut stations = Vec::with_capacity(payload.stations.len());
    let mut stats = NormalizeStats::default();

    for record in &payload.stations {
        match convert_record(record) {
            Some(station) => {
                stations.push(station);
                stats.processed += 1;
            }
            None => stats.rejected += 1,
        }
    }

    (stations, stats)
}

/// Convert one raw record, or reject it.
fn convert_record(record: &RawRecord) -> Option<Station> {
    // Prices first: a station with nothing to sell is useless to every query.
    let mut prices = BTreeMap::new();
    for (field, fuel) in PROVIDER_PRICE_FIELDS {
        if let Some(text) = field_str(record, field)
            && let Some(price) = parse_locale_decimal(text)
        {
            prices.insert(fuel, price);
        }
    }
    if prices.is_empty() {
        return None;
    }

    let latitude = field_str(record, "Latitud").and_then(parse_locale_decimal)?;
    // The longitude field name varies between payloads.
    let longitude = field_str(record, "Longitud (WGS84)")
        .or_else(|| field_str(record, "Longitud"))
        .and_then(parse_locale_decimal)?;

    // Zero on either axis is the provider's "coordinates unknown" sentinel.
    if latitude == 0.0 || longitude == 0.0 {
        return None;
    }
    if latitude.abs() > 90.0 || longitude.abs() > 180.0 {
        return None;
    }

    let address = normalize_text(field_str(record, "Dirección").unwrap_or_default());
    let city = normalize_text(field_str(record, "Localidad").unwrap_or_default());
    let province = normalize_text(field_str(record, "Provincia").unwrap_or_default());
    let postal_code = normalize_text(field_str(record, "C.P.").unwrap_or_default());
    let brand = normalize_text(field_str(record, "Rótulo").unwrap_or_default());
    let schedule = normalize_text(field_str(record, "Horario").unwrap_or_default());

    // A station nobody can locate by text or coordinates label is noise.
    if address.is_empty() && city.is_empty() {
        return None;
    }

    let id = match field_str(record, "IDEESS") {
        Some(native) if !native.is_empty() => native.to_string(),
        _ => Uuid::new_v4().to_string(),
    };

    let mut name = format!("{brand} {city}").trim().to_string();
    if name.is_empty() {
        name = format!("Station {id}");
    }

    Some(Station {
        id,
        name,
        brand,
        address,
        city,
        province,
        postal_code,
        schedule,
        latitude,
        longitude,
        prices,
        last_updated: Utc::now(),
    })
}

fn field_str<'a>(record: &'a RawRecord, key: &str) -> Option<&'a str> {
    record.get(key).and_then(|v| v.as_str())
}

/// Parse a locale decimal-comma number ("1,801" -> 1.801).
fn parse_locale_decimal(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.replace(',', ".").parse().ok()
}

/// Normalize a text field: repair double-encoded UTF-8, compose to NFC,
/// collapse internal whitespace.
fn normalize_text(text: &str) -> String {
    let repaired = repair_mojibake(text);
    let composed: String = repaired.nfc().collect();
    composed.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Undo the classic Latin-1/UTF-8 double encoding ("MÃ¡laga" -> "Málaga").
///
/// Reinterprets the string's code points as Latin-1 bytes and re-decodes as
/// UTF-8. Only applies when every code point fits a byte and the byte
/// sequence is valid UTF-8, so correctly-encoded text passes through
/// untouched.
fn repair_mojibake(text: &str) -> String {
    if text.is_empty() || text.chars().any(|c| (c as u32) > 0xFF) {
        return text.to_string();
    }
    let bytes: Vec<u8> = text.chars().map(|c| c as u8).collect();
    match String::from_utf8(bytes) {
        Ok(repaired) => repaired,
        Err(_) => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FuelType;

    fn record(fields: &[(&str, &str)]) -> RawRecord {
        fields
            .iter()
            .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string())))
            .collect()
    }

    fn full_record() -> RawRecord {
        record(&[
            ("IDEESS", "1111"),
            ("Latitud", "40,4269"),
            ("Longitud (WGS84)", "-3,6846"),
            ("Precio Gasolina 95 E5", "1,801"),
            ("Rótulo", "REPSOL"),
            ("Localidad", "MADRID"),
        ])
    }

    fn payload_of(records: Vec<RawRecord>) -> RawPayload {
        RawPayload {
            fecha: None,
            stations: records,
        }
    }

    #[test]
    fn converts_ministry_record() {
        let station = convert_record(&full_record()).expect("record should convert");

        assert_eq!(station.id, "1111");
        assert!((station.latitude - 40.4269).abs() < 1e-9);
        assert!((station.longitude + 3.6846).abs() < 1e-9);
        assert_eq!(station.prices.get(&FuelType::Gasolina95), Some(&1.801));
        assert_eq!(station.brand, "REPSOL");
        assert_eq!(station.name, "REPSOL MADRID");
    }

    #[test]
    fn rejects_record_without_prices() {
        let mut rec = full_record();
        rec.remove("Precio Gasolina 95 E5");
        assert!(convert_record(&rec).is_none());
    }

    #[test]
    fn non_numeric_price_is_skipped_not_fatal() {
        let mut rec = full_record();
        rec.insert(
            "Precio Gasoleo A".to_string(),
            serde_json::Value::String("N/D".to_string()),
        );

        let station = convert_record(&rec).unwrap();
        assert!(!station.has_fuel(FuelType::Diesel));
        assert!(station.has_fuel(FuelType::Gasolina95));
    }

    #[test]
    fn rejects_zero_sentinel_coordinates() {
        for (lat, lon) in [("0", "-3,6846"), ("40,4269", "0"), ("0,000", "0,000")] {
            let mut rec = full_record();
            rec.insert("Latitud".into(), serde_json::Value::String(lat.into()));
            rec.insert(
                "Longitud (WGS84)".into(),
                serde_json::Value::String(lon.into()),
            );
            assert!(convert_record(&rec).is_none(), "({lat}, {lon}) accepted");
        }
    }

    #[test]
    fn rejects_out_of_range_coordinates() {
        for (lat, lon) in [("90,5", "-3,6846"), ("40,4269", "-180,1")] {
            let mut rec = full_record();
            rec.insert("Latitud".into(), serde_json::Value::String(lat.into()));
            rec.insert(
                "Longitud (WGS84)".into(),
                serde_json::Value::String(lon.into()),
            );
            assert!(convert_record(&rec).is_none(), "({lat}, {lon}) accepted");
        }
    }

    #[test]
    fn rejects_missing_or_unparseable_coordinates() {
        let mut rec = full_record();
        rec.remove("Latitud");
        assert!(convert_record(&rec).is_none());

        let mut rec = full_record();
        rec.insert(
            "Latitud".into(),
            serde_json::Value::String("not a number".into()),
        );
        assert!(convert_record(&rec).is_none());
    }

    #[test]
    fn longitude_falls_back_to_plain_field_name() {
        let mut rec = full_record();
        rec.remove("Longitud (WGS84)");
        rec.insert(
            "Longitud".into(),
            serde_json::Value::String("-3,6846".into()),
        );

        let station = convert_record(&rec).unwrap();
        assert!((station.longitude + 3.6846).abs() < 1e-9);
    }

    #[test]
    fn rejects_record_with_no_address_and_no_city() {
        let rec = record(&[
            ("IDEESS", "2222"),
            ("Latitud", "40,4269"),
            ("Longitud (WGS84)", "-3,6846"),
            ("Precio Gasolina 95 E5", "1,801"),
        ]);
        assert!(convert_record(&rec).is_none());
    }

    #[test]
    fn name_falls_back_to_station_id() {
        let rec = record(&[
            ("IDEESS", "2222"),
            ("Latitud", "40,4269"),
            ("Longitud (WGS84)", "-3,6846"),
            ("Precio Gasolina 95 E5", "1,801"),
            ("Dirección", "CALLE MAYOR 1"),
        ]);

        let station = convert_record(&rec).unwrap();
        assert_eq!(station.name, "Station 2222");
    }

    #[test]
    fn generates_id_when_native_id_absent() {
        let rec = record(&[
            ("Latitud", "40,4269"),
            ("Longitud (WGS84)", "-3,6846"),
            ("Precio Gasolina 95 E5", "1,801"),
            ("Localidad", "MADRID"),
        ]);

        let a = convert_record(&rec).unwrap();
        let b = convert_record(&rec).unwrap();
        assert!(!a.id.is_empty());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn normalize_counts_processed_and_rejected() {
        let bad = record(&[("IDEESS", "9")]);
        let payload = payload_of(vec![full_record(), bad, full_record()]);

        let (stations, stats) = normalize(&payload);
        assert_eq!(stations.len(), 2);
        assert_eq!(stats.processed, 2);
        assert_eq!(stats.rejected, 1);
    }

    #[test]
    fn normalize_empty_payload() {
        let (stations, stats) = normalize(&payload_of(vec![]));
        assert!(stations.is_empty());
        assert_eq!(stats, NormalizeStats::default());
    }

    #[test]
    fn parse_locale_decimal_variants() {
        assert_eq!(parse_locale_decimal("1,801"), Some(1.801));
        assert_eq!(parse_locale_decimal("-3,6846"), Some(-3.6846));
        assert_eq!(parse_locale_decimal(" 1.5 "), Some(1.5));
        assert_eq!(parse_locale_decimal(""), None);
        assert_eq!(parse_locale_decimal("N/D"), None);
    }

    #[test]
    fn repairs_double_encoded_text() {
        // "Málaga" mis-decoded as Latin-1 becomes "MÃ¡laga".
        assert_eq!(normalize_text("MÃ¡laga"), "Málaga");
        assert_eq!(normalize_text("CASTELLÃ\u{93}N"), "CASTELLÓN");
    }

    #[test]
    fn leaves_correct_text_alone() {
        assert_eq!(normalize_text("Málaga"), "Málaga");
        assert_eq!(normalize_text("AVENIDA DE ANDALUCÍA"), "AVENIDA DE ANDALUCÍA");
    }

    #[test]
    fn composes_to_nfc() {
        // 'n' + combining tilde composes to 'ñ'.
        assert_eq!(normalize_text("Espa\u{6e}\u{303}a"), "España");
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(normalize_text("  CALLE   MAYOR  1 "), "CALLE MAYOR 1");
    }
}
