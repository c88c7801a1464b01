/// Checks if a host belongs to a directory domain
///
/// A host matches when it equals the domain or is any subdomain of it, so
/// `paginasamarillas.es` matches `www.paginasamarillas.es` but not
/// `paginasamarillas.es.evil.com`.
///
/// # Examples
///
/// ```
/// use listing_harvester::url::host_matches;
///
/// assert!(host_matches("paginasamarillas.es", "www.paginasamarillas.es"));
/// assert!(host_matches("paginasamarillas.es", "paginasamarillas.es"));
/// assert!(!host_matches("paginasamarillas.es", "paginasamarillas.es.evil.com"));
/// ```
pub fn host_matches(domain: &str, candidate: &str) -> bool {
    let candidate = candidate.trim_end_matches('.').to_ascii_lowercase();
    let domain = domain.to_ascii_lowercase();
    candidate == domain || candidate.ends_with(&format!(".{}", domain))
}
