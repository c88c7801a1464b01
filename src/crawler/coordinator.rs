//! Crawl coordinator - the paginated crawl state machine
//!
//! One crawl runs strictly sequentially: a results page is fetched, turned
//! into detail links (or inline listings), every detail is fetched and
//! extracted, and pacing is applied before the next page. The stop flag is
//! checked between transitions; an in-flight fetch or sleep is never
//! interrupted.

use crate::block::BlockDetector;
use crate::config::Config;
use crate::crawler::session::{Admission, CrawlSession};
use crate::crawler::{CrawlOutcome, CrawlReport, CrawlRequest, CrawlState};
use crate::enrich::{enrich_record, WebsiteEmailLookup};
use crate::extract::{
    extract_detail_links, listing_name, DetailLink, Field, ListingExtractor, ListingRecord,
};
use crate::fetch::{FetchDriver, FetchStatus};
use crate::pacing::RateGovernor;
use crate::progress::Progress;
use crate::session::BrowserSession;
use crate::url::{build_page_url, Traversal};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Drives one crawl over a borrowed browser session
pub struct Coordinator<'a> {
    config: &'a Config,
    request: &'a CrawlRequest,
    driver: FetchDriver<'a>,
    governor: RateGovernor,
    extractor: ListingExtractor,
    lookup: Option<WebsiteEmailLookup>,
    progress: Progress,
    stop: Arc<AtomicBool>,
    session: CrawlSession,
    pending: VecDeque<DetailLink>,
}

impl<'a> Coordinator<'a> {
    /// Creates a coordinator for `request`
    ///
    /// # Arguments
    ///
    /// * `config` - Validated configuration
    /// * `request` - Validated crawl target
    /// * `browser` - Session used for every page fetch
    /// * `progress` - Receives human-readable progress lines
    /// * `stop` - Cooperative stop flag
    pub fn new(
        config: &'a Config,
        request: &'a CrawlRequest,
        browser: &'a mut dyn BrowserSession,
        progress: Progress,
        stop: Arc<AtomicBool>,
    ) -> Self {
        let detector = BlockDetector::new(&config.blocking);
        tracing::debug!(
            "Block detection {}",
            if detector.is_enabled() { "on" } else { "off" }
        );
        let driver = FetchDriver::new(browser, &config.browser, detector, progress.clone());

        let lookup = if config.enrichment.website_email_lookup {
            match WebsiteEmailLookup::new(&config.browser, &config.enrichment) {
                Ok(lookup) => Some(lookup),
                Err(e) => {
                    tracing::warn!("Website email lookup disabled: {}", e);
                    None
                }
            }
        } else {
            None
        };

        Self {
            config,
            request,
            driver,
            governor: RateGovernor::new(&config.crawler),
            extractor: ListingExtractor::for_base_url(&request.base_url)
                .with_default_locality(request.facets.locality.clone()),
            lookup,
            progress,
            stop,
            session: CrawlSession::new(),
            pending: VecDeque::new(),
        }
    }

    /// Runs the state machine until a terminal state is reached
    ///
    /// # Returns
    ///
    /// Every record accepted so far, whatever the outcome
    pub async fn run(mut self) -> CrawlReport {
        self.driver.hide().await;

        let mut state = CrawlState::Start;
        let mut page_content = String::new();

        while !state.is_terminal() {
            if self.stop.load(Ordering::SeqCst) {
                self.progress.warn(format!(
                    "Stop requested during {}; keeping {} records",
                    state,
                    self.session.total()
                ));
                state = CrawlState::Stopped;
                break;
            }

            tracing::trace!("Crawl state: {}", state);
            state = match state {
                CrawlState::Start => CrawlState::FetchingListPage,
                CrawlState::FetchingListPage => match self.fetch_list_page().await {
                    Some(content) => {
                        page_content = content;
                        CrawlState::ExtractingDetailLinks
                    }
                    None => CrawlState::Terminated,
                },
                CrawlState::ExtractingDetailLinks => {
                    let content = std::mem::take(&mut page_content);
                    self.extract_page(&content).await
                }
                CrawlState::FetchingDetail => self.fetch_next_detail().await,
                CrawlState::PageComplete => self.complete_page().await,
                terminal => terminal,
            };
        }

        let outcome = state.outcome().unwrap_or(CrawlOutcome::Terminated);
        self.progress.info(format!(
            "Crawl {} after {} pages: {} records",
            outcome,
            self.session.pages_visited,
            self.session.total()
        ));
        self.session.into_report(self.request.facets.clone(), outcome)
    }

    /// Fetches the current results page
    ///
    /// # Returns
    ///
    /// The page content, or `None` when the crawl must terminate
    async fn fetch_list_page(&mut self) -> Option<String> {
        let page = self.session.page;
        let url = build_page_url(&self.request.base_url, self.request.profile, page);

        self.progress
            .info(format!("Page {}/{}: {}", page, self.request.max_pages, url));
        self.session.begin_page();

        let fetched = self.driver.fetch(&url).await;
        match fetched.status {
            FetchStatus::Ready => Some(fetched.content),
            FetchStatus::Unavailable => {
                self.progress
                    .warn(format!("Could not load results page {}; stopping", page));
                None
            }
            FetchStatus::Blocked => None,
        }
    }

    /// Turns a results page into queued details or inline records
    async fn extract_page(&mut self, content: &str) -> CrawlState {
        let page_url =
            build_page_url(&self.request.base_url, self.request.profile, self.session.page);

        match self.request.profile.traversal() {
            Traversal::DetailPages => {
                let found =
                    extract_detail_links(content, &page_url, &self.config.site.excluded_pages);
                // Footer anchors alone do not make a results page
                if found.links.is_empty() {
                    self.progress.info(format!(
                        "No listings on page {}; end of results",
                        self.session.page
                    ));
                    return CrawlState::Finished;
                }

                self.progress.info(format!(
                    "Page {}: {} detail pages to visit",
                    self.session.page,
                    found.links.len()
                ));
                self.pending = found.links.into();
                CrawlState::FetchingDetail
            }
            Traversal::InlineListings => {
                let candidates = self
                    .extractor
                    .extract_listings(content, self.request.profile.listing_selector());
                if candidates.is_empty() {
                    self.progress.info(format!(
                        "No listings on page {}; end of results",
                        self.session.page
                    ));
                    return CrawlState::Finished;
                }

                for candidate in candidates {
                    self.accept(candidate).await;
                }
                CrawlState::PageComplete
            }
        }
    }

    /// Processes one queued detail page
    async fn fetch_next_detail(&mut self) -> CrawlState {
        let Some(link) = self.pending.pop_front() else {
            return CrawlState::PageComplete;
        };

        let fetched = self.driver.fetch(&link.url).await;
        if !fetched.ok() {
            self.pending.clear();
            return CrawlState::Terminated;
        }

        if fetched.status == FetchStatus::Ready {
            let mut record = self.extractor.extract_detail(&fetched.content);
            if !record.name.is_available() {
                record.name = listing_name(&link);
            }
            record.detail_url = Some(link.url.to_string());
            self.accept(record).await;
        } else {
            tracing::warn!("Skipping unavailable detail page {}", link.url);
        }

        self.session.details_processed += 1;
        self.governor.delay_after_detail().await;

        let processed = self.session.details_processed;
        if self.governor.cooldown_due(processed) {
            self.progress
                .info(format!("Cooling down after {} detail pages", processed));
            if let Some(slept) = self.governor.maybe_cooldown(processed).await {
                tracing::debug!("Cooldown lasted {:.1}s", slept.as_secs_f64());
            }
        }

        if self.pending.is_empty() {
            CrawlState::PageComplete
        } else {
            CrawlState::FetchingDetail
        }
    }

    /// Logs the page result and decides whether to continue
    async fn complete_page(&mut self) -> CrawlState {
        self.progress.info(format!(
            "Page {} done: {} new records ({} total)",
            self.session.page,
            self.session.current_page_total(),
            self.session.total()
        ));

        if self.session.page >= self.request.max_pages {
            return CrawlState::Finished;
        }

        self.governor.delay_after_page().await;
        self.session.page += 1;
        CrawlState::FetchingListPage
    }

    /// Enriches, validates and deduplicates a candidate record
    async fn accept(&mut self, mut record: ListingRecord) {
        if let Some(lookup) = &self.lookup {
            if !record.email.is_available() {
                if let Some(website) = record.website.value() {
                    if let Some(email) = lookup.find_email(website).await {
                        record.email = Field::from_raw(&email);
                    }
                }
            }
        }

        enrich_record(&mut record, &self.config.enrichment);

        match self.session.admit(record) {
            Admission::Accepted => {}
            Admission::Duplicate => tracing::debug!("Dropped duplicate listing"),
            Admission::Uninformative => tracing::debug!("Dropped listing without usable fields"),
        }
    }
}

/// Runs a complete crawl and releases the session
///
/// The session is owned for the whole crawl and shut down on every exit
/// path, including early termination and stop requests.
///
/// # Arguments
///
/// * `config` - Validated configuration
/// * `request` - Validated crawl target
/// * `session` - Browser session opened for this crawl
/// * `progress` - Receives human-readable progress lines
/// * `stop` - Raised to end the crawl at the next transition
pub async fn run_crawl(
    config: &Config,
    request: &CrawlRequest,
    mut session: Box<dyn BrowserSession>,
    progress: Progress,
    stop: Arc<AtomicBool>,
) -> CrawlReport {
    tracing::info!(
        "Crawling {} ({}, up to {} pages) via {}",
        request.base_url,
        request.profile,
        request.max_pages,
        session.name()
    );

    let report = Coordinator::new(config, request, session.as_mut(), progress, stop)
        .run()
        .await;

    if let Err(e) = session.shutdown().await {
        tracing::warn!("Failed to shut down browser session: {}", e);
    }
    report
}
