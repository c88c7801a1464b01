//! Output module for persisting crawl results
//!
//! This module handles:
//! - Writing result envelopes as JSON documents
//! - Computing field coverage statistics
//! - Generating markdown summaries of a crawl run

mod json;
mod markdown;
pub mod stats;
mod traits;

pub use json::{JsonFileSink, ListingEnvelope};
pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use stats::{print_statistics, RecordStatistics};
pub use traits::{CrawlSummary, OutputError, OutputResult, ResultSink};
