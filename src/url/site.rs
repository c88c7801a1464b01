use crate::url::matcher::host_matches;
use crate::{UrlError, UrlResult};
use serde::Deserialize;
use std::fmt;
use url::Url;

/// Per-directory rules for pagination, facets and traversal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SiteProfile {
    /// empresite.eleconomista.es: `/PgNum-N/` pages linking to per-company detail pages
    Empresite,
    /// paginasamarillas.es: `/all-nc/N` pages rendering every listing inline
    PaginasAmarillas,
}

/// How listings are reached from a results page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Traversal {
    /// Each listing links to a richer detail page that must be fetched
    DetailPages,
    /// Listings are complete fragments on the results page itself
    InlineListings,
}

impl SiteProfile {
    /// All supported profiles, in resolution order
    pub const ALL: [SiteProfile; 2] = [SiteProfile::Empresite, SiteProfile::PaginasAmarillas];

    /// Registrable domain served by this directory
    pub fn domain(&self) -> &'static str {
        match self {
            Self::Empresite => "empresite.eleconomista.es",
            Self::PaginasAmarillas => "paginasamarillas.es",
        }
    }

    pub fn traversal(&self) -> Traversal {
        match self {
            Self::Empresite => Traversal::DetailPages,
            Self::PaginasAmarillas => Traversal::InlineListings,
        }
    }

    /// CSS selector matching one listing fragment on a results page
    pub fn listing_selector(&self) -> &'static str {
        match self {
            Self::Empresite => "[itemtype*='Organization'], [itemtype*='LocalBusiness']",
            Self::PaginasAmarillas => "div.box",
        }
    }

    /// Finds the profile whose domain serves `host`
    pub fn from_host(host: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|profile| host_matches(profile.domain(), host))
    }

    /// Resolves the profile for a base URL
    ///
    /// A pinned profile (from configuration) wins and skips the host check,
    /// which allows mirrors and local test servers.
    ///
    /// # Returns
    ///
    /// * `Ok(SiteProfile)` - The profile to crawl with
    /// * `Err(UrlError::UnsupportedSite)` - No profile serves the URL's host
    pub fn resolve(url: &Url, pinned: Option<SiteProfile>) -> UrlResult<Self> {
        if let Some(profile) = pinned {
            return Ok(profile);
        }
        let host = url.host_str().ok_or(UrlError::MissingDomain)?;
        Self::from_host(host).ok_or_else(|| UrlError::UnsupportedSite(host.to_string()))
    }
}

impl fmt::Display for SiteProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empresite => write!(f, "empresite"),
            Self::PaginasAmarillas => write!(f, "paginas-amarillas"),
        }
    }
}
