//! External-process fetch (tier 2).
//!
//! The provider occasionally fails TLS/HTTP2 negotiation with the in-process
//! client while a plain curl succeeds, so the second tier shells out: curl
//! writes the body to a temp file (insecure-TLS tolerated), which is then
//! read back and decoded with the candidate encodings.

use std::path::PathBuf;

use super::error::ProviderError;
use super::types::{RawPayload, decode_payload};

/// Configuration for the external-process fetch.
#[derive(Debug, Clone)]
pub struct ShellFetchConfig {
    /// Program to invoke. Anything with curl's CLI surface works; tests
    /// point this at a stub.
    pub program: String,
    /// URL to fetch.
    pub url: String,
    /// Passed to `--max-time`.
    pub timeout_secs: u64,
}

impl ShellFetchConfig {
    /// Create a config fetching the given URL with `curl`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            program: "curl".to_string(),
            url: url.into(),
            timeout_secs: 60,
        }
    }

    /// Use a different program (for testing).
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }
}

/// Fetcher that shells out to curl.
#[derive(Debug, Clone)]
pub struct ShellFetcher {
    config: ShellFetchConfig,
}

impl ShellFetcher {
    /// Create a new shell fetcher.
    pub fn new(config: ShellFetchConfig) -> Self {
        Self { config }
    }

    /// Run the external fetch and decode the result.
    pub async fn fetch(&self) -> Result<RawPayload, ProviderError> {
        let output_path = self.temp_path();

        let bytes = match self.run_command(&output_path).await {
            Ok(()) => std::fs::read(&output_path).map_err(|e| ProviderError::Shell {
                message: format!("failed to read fetched file: {e}"),
            }),
            Err(e) => Err(e),
        };

        // The temp file is removed whether or not decoding succeeds.
        let _ = std::fs::remove_file(&output_path);

        decode_payload(&bytes?)
    }

    async fn run_command(&self, output_path: &std::path::Path) -> Result<(), ProviderError> {
        let output = tokio::process::Command::new(&self.config.program)
            .arg("-k")
            .arg("-s")
            .arg("-f")
            .arg("--max-time")
            .arg(self.config.timeout_secs.to_string())
            .arg("-o")
            .arg(output_path)
            .arg(&self.config.url)
            .output()
            .await
            .map_err(|e| ProviderError::Shell {
                message: format!("failed to spawn {}: {e}", self.config.program),
            })?;

        if !output.status.success() {
            return Err(ProviderError::Shell {
                message: format!(
                    "{} exited with {}: {}",
                    self.config.program,
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        std::env::temp_dir().join(format!("fuel-stations-fetch-{}.json", std::process::id()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_to_curl() {
        let config = ShellFetchConfig::new("https://example.test/data");
        assert_eq!(config.program, "curl");
        assert_eq!(config.timeout_secs, 60);
    }

    #[tokio::test]
    async fn missing_program_is_shell_error() {
        let config = ShellFetchConfig::new("https://example.test/data")
            .with_program("definitely-not-a-real-program-xyz");
        let fetcher = ShellFetcher::new(config);

        match fetcher.fetch().await {
            Err(ProviderError::Shell { message }) => {
                assert!(message.contains("failed to spawn"), "{message}");
            }
            other => panic!("expected Shell error, got {other:?}"),
        }
    }
}
