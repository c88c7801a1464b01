use crate::url::{
    apply_listing_filters, extract_facets, filename_for, parse_base_url, LocationFacets,
    SiteProfile,
};
use crate::{ConfigError, ConfigResult};
use url::Url;

/// A validated crawl target
///
/// Built before any browser session exists, so bad input is reported
/// without launching anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlRequest {
    /// First results page, with listing filters applied
    pub base_url: Url,

    /// Upper bound on results pages, at least 1
    pub max_pages: u32,

    pub profile: SiteProfile,
    pub facets: LocationFacets,
}

impl CrawlRequest {
    /// Validates raw CLI input into a request
    ///
    /// # Arguments
    ///
    /// * `raw_url` - First results page as typed by the user
    /// * `max_pages` - Page bound, must be at least 1
    /// * `only_with_email` - Ask the directory for listings with an email only
    /// * `pinned` - Site profile from configuration, bypassing host resolution
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlRequest)` - Ready to crawl
    /// * `Err(ConfigError)` - Zero pages, bad URL or unsupported host
    pub fn new(
        raw_url: &str,
        max_pages: u32,
        only_with_email: bool,
        pinned: Option<SiteProfile>,
    ) -> ConfigResult<Self> {
        if max_pages == 0 {
            return Err(ConfigError::Validation(
                "the number of pages must be at least 1".to_string(),
            ));
        }

        let parsed = parse_base_url(raw_url)?;
        let profile = SiteProfile::resolve(&parsed, pinned)?;
        let base_url = apply_listing_filters(&parsed, profile, only_with_email);
        let facets = extract_facets(&base_url, profile);

        Ok(Self {
            base_url,
            max_pages,
            profile,
            facets,
        })
    }

    /// File name stem for this crawl's output documents
    pub fn output_name(&self) -> String {
        filename_for(&self.base_url, self.profile)
    }
}
