//! URL handling for Listing-Harvester
//!
//! This module resolves the site profile of a seed URL, rewrites it into
//! per-page URLs, and derives the location facets and output file name.

mod domain;
mod facets;
mod matcher;
mod normalize;
mod pagination;
mod site;

pub use domain::{bare_domain, bare_domain_of};
pub use facets::{extract_facets, filename_for, LocationFacets};
pub use matcher::host_matches;
pub use normalize::parse_base_url;
pub use pagination::{apply_listing_filters, build_page_url};
pub use site::{SiteProfile, Traversal};
