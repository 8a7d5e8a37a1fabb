//! Provider error types.

/// Errors from the raw data source chain.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider returned an error status
    #[error("provider returned status {status}")]
    Api { status: u16 },

    /// Payload failed to decode as JSON under any candidate encoding
    #[error("JSON parse error: {message}")]
    Json { message: String },

    /// External fetch process failed
    #[error("shell fetch failed: {message}")]
    Shell { message: String },

    /// Backup file operation failed
    #[error("backup error: {message}")]
    Backup { message: String },

    /// Payload decoded but contained no station records
    #[error("payload contained no station records")]
    EmptyPayload,

    /// Every fetch tier was exhausted
    #[error("no data source available")]
    NoSource,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        assert_eq!(ProviderError::NoSource.to_string(), "no data source available");
        assert_eq!(
            ProviderError::Api { status: 503 }.to_string(),
            "provider returned status 503"
        );
        assert!(
            ProviderError::Json {
                message: "expected value".into()
            }
            .to_string()
            .contains("JSON parse error")
        );
    }
}
