use crate::crawler::CrawlOutcome;
use crate::extract::{DedupKey, ListingRecord};
use crate::url::LocationFacets;
use std::collections::HashSet;

/// Records first accepted while processing one results page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageBatch {
    pub page: u32,
    pub records: Vec<ListingRecord>,
}

/// What happened to a candidate record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Accepted,
    /// Same name, phone, website and detail page as an earlier record
    Duplicate,
    /// None of name, phone, email or website was found
    Uninformative,
}

/// Mutable state of one crawl, owned by the orchestrator
#[derive(Debug, Default)]
pub struct CrawlSession {
    /// 1-based index of the results page being processed
    pub page: u32,
    pub pages_visited: u32,
    pub details_processed: u64,
    seen: HashSet<DedupKey>,
    results: Vec<ListingRecord>,
    batches: Vec<PageBatch>,
}

impl CrawlSession {
    pub fn new() -> Self {
        Self {
            page: 1,
            ..Self::default()
        }
    }

    /// Opens the batch for the current page
    pub fn begin_page(&mut self) {
        self.pages_visited += 1;
        self.batches.push(PageBatch {
            page: self.page,
            records: Vec::new(),
        });
    }

    /// Validates and deduplicates a candidate, keeping it if new
    pub fn admit(&mut self, record: ListingRecord) -> Admission {
        if !record.is_informative() {
            return Admission::Uninformative;
        }
        if !self.seen.insert(record.dedup_key()) {
            return Admission::Duplicate;
        }

        if let Some(batch) = self.batches.last_mut() {
            batch.records.push(record.clone());
        }
        self.results.push(record);
        Admission::Accepted
    }

    /// Number of records accepted so far
    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// Number of records accepted on the current page
    pub fn current_page_total(&self) -> usize {
        self.batches.last().map_or(0, |b| b.records.len())
    }

    /// Finalizes the session into a report
    pub fn into_report(self, facets: LocationFacets, outcome: CrawlOutcome) -> CrawlReport {
        CrawlReport {
            facets,
            records: self.results,
            page_batches: self.batches,
            outcome,
            pages_visited: self.pages_visited,
            details_processed: self.details_processed,
        }
    }
}

/// Everything a crawl produced, whatever state it ended in
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub facets: LocationFacets,

    /// Accepted records in first-seen order
    pub records: Vec<ListingRecord>,

    /// The same records grouped by the page that first produced them
    pub page_batches: Vec<PageBatch>,

    pub outcome: CrawlOutcome,
    pub pages_visited: u32,
    pub details_processed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::Field;

    fn record(name: &str, phone: &str) -> ListingRecord {
        ListingRecord {
            name: Field::from_raw(name),
            phone: Field::from_raw(phone),
            ..ListingRecord::default()
        }
    }

    #[test]
    fn test_first_record_wins() {
        let mut session = CrawlSession::new();
        session.begin_page();
        assert_eq!(session.admit(record("Acme", "+34911111111")), Admission::Accepted);

        let mut second = record("Acme", "+34911111111");
        second.street_address = Field::from_raw("Otra calle");
        assert_eq!(session.admit(second), Admission::Duplicate);

        assert_eq!(session.total(), 1);
        let report = session.into_report(LocationFacets::default(), CrawlOutcome::Finished);
        assert_eq!(report.records[0].street_address, Field::unavailable());
    }

    #[test]
    fn test_uninformative_rejected() {
        let mut session = CrawlSession::new();
        session.begin_page();
        let mut empty = ListingRecord::default();
        empty.street_address = Field::from_raw("Calle Mayor 1");
        assert_eq!(session.admit(empty), Admission::Uninformative);
        assert_eq!(session.total(), 0);
    }

    #[test]
    fn test_batches_track_pages() {
        let mut session = CrawlSession::new();
        session.begin_page();
        session.admit(record("A", ""));
        session.admit(record("B", ""));
        session.page += 1;
        session.begin_page();
        session.admit(record("A", ""));
        session.admit(record("C", ""));
        assert_eq!(session.current_page_total(), 1);

        let report = session.into_report(LocationFacets::default(), CrawlOutcome::Terminated);
        assert_eq!(report.pages_visited, 2);
        assert_eq!(report.page_batches.len(), 2);
        assert_eq!(report.page_batches[0].page, 1);
        assert_eq!(report.page_batches[0].records.len(), 2);
        assert_eq!(report.page_batches[1].page, 2);
        assert_eq!(report.page_batches[1].records[0].name.as_str(), "C");
        assert_eq!(report.records.len(), 3);
    }
}
