//! Field coverage statistics over extracted records
//!
//! This module summarizes how many records carry each field, which is the
//! quickest way to spot a directory layout change after a crawl.

use crate::extract::ListingRecord;

/// Field coverage counts for a set of records
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordStatistics {
    /// Total number of records
    pub total_records: u64,

    pub with_phone: u64,

    /// Records with an email found on the directory or the website
    pub with_email: u64,

    /// Records with synthesized role addresses
    pub with_inferred_emails: u64,

    pub with_website: u64,
    pub with_address: u64,
    pub with_postal_code: u64,

    /// Records that have neither a real nor an inferred email
    pub unreachable: u64,
}

impl RecordStatistics {
    /// Counts field coverage over `records`
    pub fn from_records(records: &[ListingRecord]) -> Self {
        let count = |pred: &dyn Fn(&ListingRecord) -> bool| {
            records.iter().filter(|r| pred(r)).count() as u64
        };

        Self {
            total_records: records.len() as u64,
            with_phone: count(&|r| r.phone.is_available()),
            with_email: count(&|r| r.email.is_available()),
            with_inferred_emails: count(&|r| r.inferred_email_info.is_available()),
            with_website: count(&|r| r.website.is_available()),
            with_address: count(&|r| r.street_address.is_available()),
            with_postal_code: count(&|r| r.postal_code.is_available()),
            unreachable: count(&|r| {
                !r.email.is_available() && !r.inferred_email_info.is_available()
            }),
        }
    }

    /// Returns `count` as a percentage of all records
    pub fn percentage(&self, count: u64) -> f64 {
        if self.total_records == 0 {
            return 0.0;
        }
        (count as f64 / self.total_records as f64) * 100.0
    }

    /// Rows of (label, count) in display order
    pub fn rows(&self) -> [(&'static str, u64); 7] {
        [
            ("Phone", self.with_phone),
            ("Email", self.with_email),
            ("Inferred emails", self.with_inferred_emails),
            ("Website", self.with_website),
            ("Street address", self.with_address),
            ("Postal code", self.with_postal_code),
            ("No email at all", self.unreachable),
        ]
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &RecordStatistics) {
    println!("=== Record Statistics ===\n");
    println!("  Total records: {}", stats.total_records);

    for (label, count) in stats.rows() {
        println!(
            "  {}: {} ({:.1}%)",
            label,
            count,
            stats.percentage(count)
        );
    }
    println!();
}
