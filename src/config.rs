//! Service configuration shared by the GUI and CLI front ends.

use clap::Args;
use reqwest::Url;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use crate::recognition::ANALYZE_PATH;

pub const DEFAULT_BASE_URL: &str = "https://localhost:7258";
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("unsupported URL scheme {scheme:?}, expected http or https")]
    UnsupportedScheme { scheme: String },
}

/// Command-line / environment options for reaching the recognition service.
#[derive(Args, Debug, Clone)]
pub struct ServiceArgs {
    /// Base address of the digit recognition service
    #[arg(long = "base-url", env = "DIGIT_PAD_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Request timeout in seconds (no timeout when omitted)
    #[arg(
        long = "timeout-secs",
        env = "DIGIT_PAD_TIMEOUT_SECS",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout_secs: Option<u64>,

    /// Trust self-signed certificates, e.g. a local development service
    #[arg(long = "accept-invalid-certs", env = "DIGIT_PAD_ACCEPT_INVALID_CERTS")]
    pub accept_invalid_certs: bool,

    /// Log filter used when RUST_LOG is not set
    #[arg(long = "log-level", default_value = DEFAULT_LOG_LEVEL)]
    pub log_level: String,
}

impl ServiceArgs {
    pub fn to_config(&self) -> Result<ServiceConfig, ConfigError> {
        let mut config = ServiceConfig::new(&self.base_url)?;
        config.timeout = self.timeout_secs.map(Duration::from_secs);
        config.accept_invalid_certs = self.accept_invalid_certs;
        Ok(config)
    }
}

/// Validated settings for [`crate::recognition::RecognitionClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub base_url: Url,
    pub timeout: Option<Duration>,
    pub accept_invalid_certs: bool,
}

impl ServiceConfig {
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        let trimmed = base_url.trim();
        let url = Url::parse(trimmed).map_err(|e| ConfigError::InvalidBaseUrl {
            url: trimmed.to_string(),
            reason: e.to_string(),
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::UnsupportedScheme {
                scheme: url.scheme().to_string(),
            });
        }

        Ok(Self {
            base_url: url,
            timeout: None,
            accept_invalid_certs: false,
        })
    }

    /// Full address of the analyze endpoint under the configured base.
    pub fn analyze_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            ANALYZE_PATH
        )
    }
}

/// Installs the global fmt subscriber. `RUST_LOG` wins over `default_level`.
pub fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // A second call keeps the subscriber that is already installed.
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
