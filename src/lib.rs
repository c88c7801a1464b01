//! Listing-Harvester: a paced directory crawler
//!
//! This crate walks the paginated search results of a business directory,
//! extracts one structured record per listing, infers probable contact
//! emails, and hands a deduplicated result set to a sink. It is built to
//! survive rate-limited, bot-detecting targets: every fetch goes through a
//! human-paced browser session with a bounded block-recovery protocol.

pub mod block;
pub mod config;
pub mod crawler;
pub mod enrich;
pub mod extract;
pub mod fetch;
pub mod output;
pub mod pacing;
pub mod progress;
pub mod session;
pub mod text;
pub mod url;

use thiserror::Error;

/// Main error type for Listing-Harvester operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("Browser session error: {0}")]
    Session(#[from] session::SessionError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("Crawl worker failed: {0}")]
    Worker(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
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

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Unsupported directory site: {0}")]
    UnsupportedSite(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,

    #[error("No site profile for host '{0}'")]
    UnsupportedSite(String),
}

impl From<UrlError> for ConfigError {
    fn from(err: UrlError) -> Self {
        match err {
            UrlError::UnsupportedSite(host) => ConfigError::UnsupportedSite(host),
            other => ConfigError::InvalidUrl(other.to_string()),
        }
    }
}

/// Result type alias for Listing-Harvester operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{run_crawl, CrawlOutcome, CrawlReport, CrawlRequest};
pub use extract::{Field, ListingRecord, UNAVAILABLE};
pub use url::{build_page_url, extract_facets, filename_for, LocationFacets, SiteProfile};
