//! JSON result documents
//!
//! A crawl is written as one envelope `{locality, category, results}`, or
//! one envelope per results page in per-page mode. Non-ASCII text is kept
//! verbatim (UTF-8), never escaped.

use crate::config::OutputConfig;
use crate::crawler::CrawlReport;
use crate::extract::{Field, ListingRecord};
use crate::output::traits::{OutputResult, ResultSink};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// The document written for a crawl or a single page
#[derive(Debug, Serialize)]
pub struct ListingEnvelope<'a> {
    pub locality: &'a Field,
    pub category: &'a Field,
    pub results: &'a [ListingRecord],
}

impl<'a> ListingEnvelope<'a> {
    pub fn from_report(report: &'a CrawlReport, results: &'a [ListingRecord]) -> Self {
        Self {
            locality: &report.facets.locality,
            category: &report.facets.category,
            results,
        }
    }
}

/// Writes envelopes as JSON files into a directory
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    directory: PathBuf,
    pretty: bool,
    per_page: bool,
}

impl JsonFileSink {
    pub fn new(config: &OutputConfig) -> Self {
        Self {
            directory: PathBuf::from(&config.directory),
            pretty: config.pretty,
            per_page: config.per_page,
        }
    }

    /// Directory receiving the documents
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn write_envelope(&self, path: &Path, envelope: &ListingEnvelope<'_>) -> OutputResult<()> {
        let body = if self.pretty {
            serde_json::to_string_pretty(envelope)?
        } else {
            serde_json::to_string(envelope)?
        };
        fs::write(path, body)?;
        tracing::info!(
            "Wrote {} records to {}",
            envelope.results.len(),
            path.display()
        );
        Ok(())
    }
}

impl ResultSink for JsonFileSink {
    fn write_report(&self, name: &str, report: &CrawlReport) -> OutputResult<Vec<PathBuf>> {
        fs::create_dir_all(&self.directory)?;

        if !self.per_page {
            let path = self.directory.join(format!("{}.json", name));
            self.write_envelope(&path, &ListingEnvelope::from_report(report, &report.records))?;
            return Ok(vec![path]);
        }

        let mut written = Vec::new();
        for batch in &report.page_batches {
            let path = self
                .directory
                .join(format!("{}_page_{}.json", name, batch.page));
            self.write_envelope(&path, &ListingEnvelope::from_report(report, &batch.records))?;
            written.push(path);
        }
        Ok(written)
    }
}
