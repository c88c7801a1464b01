//! Crawler module for paginated directory crawls
//!
//! This module contains the crawl orchestration:
//! - Validated crawl requests
//! - The crawl state machine and its outcomes
//! - Per-crawl session state (seen set, results, page batches)
//! - The coordinator driving fetch, extraction and enrichment

mod coordinator;
mod request;
mod session;
mod state;

pub use coordinator::{run_crawl, Coordinator};
pub use request::CrawlRequest;
pub use session::{Admission, CrawlReport, CrawlSession, PageBatch};
pub use state::{CrawlOutcome, CrawlState};
