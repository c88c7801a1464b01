//! Crawl state definitions
//!
//! The orchestrator moves through these states one transition at a time,
//! checking the cooperative stop flag in between.

use serde::Serialize;
use std::fmt;

/// Current position of the orchestrator in its state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlState {
    // ===== Active States =====
    /// Session initialized: page 1, nothing seen yet
    Start,

    /// Loading the current results page
    FetchingListPage,

    /// Turning the results page into detail links or inline listings
    ExtractingDetailLinks,

    /// Loading queued detail pages one at a time
    FetchingDetail,

    /// Page processed; pacing before the next one
    PageComplete,

    // ===== Terminal States =====
    /// Pagination ended naturally or the page bound was reached
    Finished,

    /// A list page could not be loaded or a block was not resolved
    Terminated,

    /// The stop flag was raised
    Stopped,
}

impl CrawlState {
    /// Returns true if no further transition is possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished | Self::Terminated | Self::Stopped)
    }

    /// Maps a terminal state to its crawl outcome
    pub fn outcome(&self) -> Option<CrawlOutcome> {
        match self {
            Self::Finished => Some(CrawlOutcome::Finished),
            Self::Terminated => Some(CrawlOutcome::Terminated),
            Self::Stopped => Some(CrawlOutcome::Stopped),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::FetchingListPage => "fetching_list_page",
            Self::ExtractingDetailLinks => "extracting_detail_links",
            Self::FetchingDetail => "fetching_detail",
            Self::PageComplete => "page_complete",
            Self::Finished => "finished",
            Self::Terminated => "terminated",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for CrawlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a crawl ended; every outcome still carries the records collected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CrawlOutcome {
    Finished,
    Terminated,
    Stopped,
}

impl CrawlOutcome {
    /// Returns true if the crawl ended before covering every page it could
    pub fn is_partial(&self) -> bool {
        !matches!(self, Self::Finished)
    }
}

impl fmt::Display for CrawlOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Finished => write!(f, "finished"),
            Self::Terminated => write!(f, "terminated"),
            Self::Stopped => write!(f, "stopped"),
        }
    }
}
