use crate::UrlError;
use url::Url;

/// Parses and validates a seed listing URL
///
/// # Rules
///
/// 1. Parse the URL; reject if malformed
/// 2. Only `http` and `https` schemes are accepted
/// 3. A host is required
/// 4. The fragment is dropped; path and query are kept verbatim since the
///    directory encodes facets in both
///
/// # Arguments
///
/// * `url_str` - The URL string entered by the user
///
/// # Returns
///
/// * `Ok(Url)` - The parsed base URL
/// * `Err(UrlError)` - The URL cannot be crawled
///
/// # Examples
///
/// ```
/// use listing_harvester::url::parse_base_url;
///
/// let url = parse_base_url("  https://empresite.eleconomista.es/a/b/#top ").unwrap();
/// assert_eq!(url.as_str(), "https://empresite.eleconomista.es/a/b/");
///
/// assert!(parse_base_url("ftp://example.com/").is_err());
/// ```
pub fn parse_base_url(url_str: &str) -> Result<Url, UrlError> {
    let trimmed = url_str.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Parse("URL is empty".to_string()));
    }

    let mut url = Url::parse(trimmed).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => {}
        _ => return Err(UrlError::MissingDomain),
    }

    url.set_fragment(None);
    Ok(url)
}
