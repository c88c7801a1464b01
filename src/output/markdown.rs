//! Markdown summary generation
//!
//! This module generates a human-readable markdown report of a crawl run:
//! run metadata, how it ended, field coverage and the files written.

use crate::output::stats::RecordStatistics;
use crate::output::traits::{CrawlSummary, OutputResult};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes a markdown summary of a crawl
///
/// # Arguments
///
/// * `summary` - Run metadata
/// * `stats` - Field coverage of the accepted records
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote markdown summary
/// * `Err(OutputError)` - Failed to write summary
pub fn generate_markdown_summary(
    summary: &CrawlSummary,
    stats: &RecordStatistics,
    output_path: &Path,
) -> OutputResult<()> {
    let markdown = format_markdown_summary(summary, stats);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a crawl summary as markdown
pub fn format_markdown_summary(summary: &CrawlSummary, stats: &RecordStatistics) -> String {
    let mut md = String::new();

    md.push_str("# Listing Harvest Summary\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Base URL**: {}\n", summary.base_url));
    md.push_str(&format!("- **Site**: {}\n", summary.profile));
    md.push_str(&format!("- **Backend**: {}\n", summary.backend));
    md.push_str(&format!("- **Started**: {}\n", summary.started_at));
    md.push_str(&format!("- **Finished**: {}\n", summary.finished_at));
    md.push_str(&format!(
        "- **Duration**: {} seconds ({:.2} minutes)\n",
        summary.duration_seconds,
        summary.duration_seconds as f64 / 60.0
    ));
    if let Some(hash) = &summary.config_hash {
        md.push_str(&format!("- **Config Hash**: {}\n", hash));
    }
    md.push('\n');

    // Outcome
    md.push_str("## Outcome\n\n");
    md.push_str(&format!("- **Result**: {}\n", summary.outcome));
    if summary.outcome.is_partial() {
        md.push_str("- **Note**: the crawl ended early; the records below are partial\n");
    }
    md.push_str(&format!(
        "- **Pages Visited**: {} of {}\n",
        summary.pages_visited, summary.max_pages
    ));
    md.push_str(&format!(
        "- **Detail Pages Processed**: {}\n",
        summary.details_processed
    ));
    md.push_str(&format!(
        "- **Seconds per Page**: {:.1}\n\n",
        summary.seconds_per_page()
    ));

    // Field coverage
    md.push_str("## Field Coverage\n\n");
    md.push_str(&format!("Total records: {}\n\n", stats.total_records));
    md.push_str("| Field | Records | Share |\n");
    md.push_str("|-------|---------|-------|\n");
    for (label, count) in stats.rows() {
        md.push_str(&format!(
            "| {} | {} | {:.1}% |\n",
            label,
            count,
            stats.percentage(count)
        ));
    }
    md.push('\n');

    // Output files
    if !summary.outputs.is_empty() {
        md.push_str("## Output Files\n\n");
        for path in &summary.outputs {
            md.push_str(&format!("- `{}`\n", path.display()));
        }
        md.push('\n');
    }

    md
}
