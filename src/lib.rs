//! Rep-Harvest: a polite exercise-library scraper
//!
//! This crate walks the paginated category listings of an exercise library,
//! extracts one structured record per exercise detail page, and writes the
//! results out as importable TypeScript data modules.

pub mod config;
pub mod crawler;
pub mod model;
pub mod output;
pub mod state;

use thiserror::Error;

/// Main error type for Rep-Harvest operations
#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Gave up on {label} after {attempts} attempts: {source}")]
    Exhausted {
        label: String,
        attempts: u32,
        source: Box<ScraperError>,
    },

    #[error("Global failure ceiling exceeded ({failures} failed calls, ceiling {ceiling})")]
    FailureCeiling { failures: u32, ceiling: u32 },

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Unknown category '{0}'")]
    UnknownCategory(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScraperError {
    /// Returns true if the whole run must stop rather than move on to the next call
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::FailureCeiling { .. } | Self::Output(_))
    }

    /// Returns true if a failed call may succeed when issued again
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Http { .. } | Self::Timeout { .. } | Self::Status { .. } | Self::Extraction(_)
        )
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Failures while mapping a detail page into a record
///
/// Missing markup is never one of these; absent fields take their defaults.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Empty response body from {url}")]
    EmptyBody { url: String },
}

/// Result type alias for Rep-Harvest operations
pub type Result<T> = std::result::Result<T, ScraperError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::{CategoryConfig, Config};
pub use model::{ExerciseGroup, ExerciseRecord, Popularity};
pub use state::CrawlState;
