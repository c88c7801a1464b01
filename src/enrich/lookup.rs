use crate::config::{BrowserConfig, EnrichmentConfig};
use crate::extract::scan_emails;
use crate::session::build_http_client;
use crate::url::bare_domain_of;
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Looks for a contact address on a listing's own website
///
/// Only addresses that mention the website's domain are trusted, which
/// filters out agency, hosting and tracker addresses that appear in
/// page footers.
#[derive(Debug, Clone)]
pub struct WebsiteEmailLookup {
    client: Client,
}

impl WebsiteEmailLookup {
    /// Builds a lookup client with the session's browser-like headers
    ///
    /// # Returns
    ///
    /// * `Ok(WebsiteEmailLookup)` - Ready to use
    /// * `Err(reqwest::Error)` - Failed to build the HTTP client
    pub fn new(browser: &BrowserConfig, config: &EnrichmentConfig) -> Result<Self, reqwest::Error> {
        let client = build_http_client(
            &browser.user_agent,
            &browser.accept_language,
            Duration::from_secs(config.lookup_timeout_secs),
        )?;
        Ok(Self { client })
    }

    /// Fetches `website` and returns the first address on its domain
    ///
    /// Every failure (bad URL, network error, non-200 status, no match) is
    /// logged at debug level and yields `None`.
    pub async fn find_email(&self, website: &str) -> Option<String> {
        let domain = bare_domain_of(website)?;

        let response = match self.client.get(website).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!("Website lookup failed for {}: {}", website, e);
                return None;
            }
        };

        if response.status() != StatusCode::OK {
            tracing::debug!(
                "Website lookup for {} returned HTTP {}",
                website,
                response.status()
            );
            return None;
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::debug!("Failed to read body of {}: {}", website, e);
                return None;
            }
        };

        let found = scan_emails(&body).find(|email| email.to_lowercase().contains(&domain));
        if let Some(email) = &found {
            tracing::debug!("Found {} on {}", email, website);
        }
        found
    }
}
