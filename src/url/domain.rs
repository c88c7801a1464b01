use url::Url;

/// Extracts the bare domain of a URL
///
/// The host is lowercased and a leading `www.` is removed. Hosts without a
/// dot (`localhost`, bare labels) are not usable as email domains and yield
/// `None`.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use listing_harvester::url::bare_domain;
///
/// let url = Url::parse("https://WWW.Example.COM/path").unwrap();
/// assert_eq!(bare_domain(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("http://localhost:8080/").unwrap();
/// assert_eq!(bare_domain(&url), None);
/// ```
pub fn bare_domain(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    if host.contains('.') {
        Some(host.to_string())
    } else {
        None
    }
}

/// Parses a possibly relative-looking website string and returns its bare domain
pub fn bare_domain_of(raw: &str) -> Option<String> {
    Url::parse(raw.trim()).ok().as_ref().and_then(bare_domain)
}
