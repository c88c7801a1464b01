//! Configuration module for Listing-Harvester
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section has defaults, so an empty file (or no file at all) yields a
//! usable configuration.
//!
//! # Example
//!
//! ```no_run
//! use listing_harvester::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvester.toml")).unwrap();
//! println!("Pausing {:?}s between pages", config.crawler.page_delay_secs);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Backend, BlockingConfig, BrowserConfig, Config, CrawlerConfig, DelayRange, EnrichmentConfig,
    OutputConfig, RolePrefixes, SiteConfig, MAX_DELAY_SECS,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
