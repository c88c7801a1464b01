//! Field extraction
//!
//! This module turns directory HTML into candidate [`ListingRecord`]s:
//! - Listing fragments on results pages (inline directories)
//! - Detail pages and the links leading to them
//! - Phone, email and website normalization

mod links;
mod listing;
mod normalize;
mod record;

pub use links::{extract_detail_links, listing_name, name_from_detail_url, DetailLink, DetailLinks};
pub use listing::{scan_emails, ListingExtractor};
pub use normalize::{clean_email, email_from_mailto, normalize_phone, normalize_website};
pub use record::{DedupKey, Field, ListingRecord, UNAVAILABLE};
