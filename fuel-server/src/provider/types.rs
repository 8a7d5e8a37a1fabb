//! Raw provider payload types and byte decoding.
//!
//! The provider's record shape is inconsistent across payloads (field names
//! vary, everything is a locale-formatted string), so records stay as loose
//! JSON objects here. The normalizer converts them to typed [`Station`]s
//! immediately; no other module touches a raw record.
//!
//! [`Station`]: crate::domain::Station

use serde::{Deserialize, Serialize};

use super::error::ProviderError;

/// One raw station record, exactly as the provider sent it.
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

/// The provider's top-level response document.
///
/// This same schema is what gets persisted to the on-disk backup file, so a
/// backup round-trips through the normal decode path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawPayload {
    /// Dataset timestamp, provider-formatted. Kept for the backup file.
    #[serde(rename = "Fecha", default, skip_serializing_if = "Option::is_none")]
    pub fecha: Option<String>,

    /// The raw station records.
    #[serde(rename = "ListaEESSPrecio", default)]
    pub stations: Vec<RawRecord>,
}

impl RawPayload {
    /// Whether the payload carries no records at all.
    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}

/// Decode raw bytes into a payload, trying candidate encodings in order.
///
/// The provider (and old backup files) sometimes serve Latin-1 rather than
/// UTF-8; strict UTF-8 is tried first so well-formed data never takes the
/// lossy path.
pub fn decode_payload(bytes: &[u8]) -> Result<RawPayload, ProviderError> {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return serde_json::from_str(text).map_err(|e| ProviderError::Json {
            message: e.to_string(),
        });
    }

    // Latin-1: every byte maps directly to the code point of the same value.
    let text: String = bytes.iter().map(|&b| b as char).collect();
    serde_json::from_str(&text).map_err(|e| ProviderError::Json {
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_utf8_payload() {
        let body = r#"{"Fecha":"01/06/2025 8:00:00","ListaEESSPrecio":[{"IDEESS":"1111"}]}"#;
        let payload = decode_payload(body.as_bytes()).unwrap();
        assert_eq!(payload.stations.len(), 1);
        assert_eq!(payload.fecha.as_deref(), Some("01/06/2025 8:00:00"));
        assert_eq!(
            payload.stations[0].get("IDEESS").and_then(|v| v.as_str()),
            Some("1111")
        );
    }

    #[test]
    fn decode_latin1_payload() {
        // "Móstoles" encoded as Latin-1: ó is the single byte 0xF3,
        // which is invalid UTF-8.
        let mut body = Vec::new();
        body.extend_from_slice(br#"{"ListaEESSPrecio":[{"Localidad":"M"#);
        body.push(0xF3);
        body.extend_from_slice(br#"stoles"}]}"#);
        assert!(std::str::from_utf8(&body).is_err());

        let payload = decode_payload(&body).unwrap();
        assert_eq!(
            payload.stations[0].get("Localidad").and_then(|v| v.as_str()),
            Some("Móstoles")
        );
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(matches!(
            decode_payload(b"not json"),
            Err(ProviderError::Json { .. })
        ));
    }

    #[test]
    fn missing_list_decodes_empty() {
        let payload = decode_payload(b"{}").unwrap();
        assert!(payload.is_empty());
    }

    #[test]
    fn payload_roundtrip() {
        let body = r#"{"Fecha":"x","ListaEESSPrecio":[{"IDEESS":"42"}]}"#;
        let payload = decode_payload(body.as_bytes()).unwrap();
        let serialized = serde_json::to_string(&payload).unwrap();
        let back = decode_payload(serialized.as_bytes()).unwrap();
        assert_eq!(back.stations.len(), 1);
        assert_eq!(back.fecha.as_deref(), Some("x"));
    }
}
