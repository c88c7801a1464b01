//! Output sink traits and types
//!
//! This module defines the trait interface for result sinks and the
//! run summary handed to the markdown report.

use crate::crawler::{CrawlOutcome, CrawlReport};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to serialize results: {0}")]
    Format(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Destination for the records of a finished crawl
///
/// Sinks receive the report of every terminal outcome, so partial results
/// are persisted the same way as complete ones.
pub trait ResultSink {
    /// Persists a crawl report
    ///
    /// # Arguments
    ///
    /// * `name` - File name stem derived from the crawl's facets
    /// * `report` - Records and metadata of the crawl
    ///
    /// # Returns
    ///
    /// The paths written, in order
    fn write_report(&self, name: &str, report: &CrawlReport) -> OutputResult<Vec<PathBuf>>;
}

/// Run metadata for the markdown summary
#[derive(Debug, Clone)]
pub struct CrawlSummary {
    // Run metadata
    pub base_url: String,
    pub profile: String,
    pub backend: String,
    pub started_at: String,
    pub finished_at: String,
    pub duration_seconds: u64,
    pub config_hash: Option<String>,

    pub outcome: CrawlOutcome,
    pub max_pages: u32,
    pub pages_visited: u32,
    pub details_processed: u64,

    /// Files written by the sink
    pub outputs: Vec<PathBuf>,
}

impl CrawlSummary {
    /// Returns the average pause-inclusive time per visited page
    pub fn seconds_per_page(&self) -> f64 {
        if self.pages_visited == 0 {
            return 0.0;
        }
        self.duration_seconds as f64 / f64::from(self.pages_visited)
    }
}
