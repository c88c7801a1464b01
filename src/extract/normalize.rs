use crate::extract::Field;

/// Canonicalizes a Spanish phone number
///
/// Spaces and dashes are removed. A number already starting with `+` is
/// kept, a bare 9-digit number gets the `+34` country code, and any other
/// shape is returned as-is.
///
/// # Examples
///
/// ```
/// use listing_harvester::extract::normalize_phone;
///
/// assert_eq!(normalize_phone("916 12 34 56"), "+34916123456");
/// assert_eq!(normalize_phone("+34 916-123-456"), "+34916123456");
/// assert_eq!(normalize_phone("916123456x"), "916123456x");
/// ```
pub fn normalize_phone(raw: &str) -> String {
    let compact: String = raw
        .trim()
        .chars()
        .filter(|c| *c != ' ' && *c != '-')
        .collect();

    if compact.starts_with('+') {
        return compact;
    }
    if compact.len() == 9 && compact.bytes().all(|b| b.is_ascii_digit()) {
        return format!("+34{}", compact);
    }
    compact
}

/// Trims an email candidate and strips trailing punctuation picked up by text scans
pub fn clean_email(raw: &str) -> String {
    raw.trim()
        .trim_end_matches(['.', ',', ';', ':'])
        .to_string()
}

/// Reads the address part of a `mailto:` link, dropping any query
pub fn email_from_mailto(href: &str) -> Option<String> {
    let rest = href.trim();
    let rest = rest
        .get(..7)
        .filter(|scheme| scheme.eq_ignore_ascii_case("mailto:"))
        .map(|_| &rest[7..])?;
    let address = clean_email(rest.split('?').next().unwrap_or_default());
    if address.is_empty() {
        None
    } else {
        Some(address)
    }
}

/// Normalizes a website link into an absolute http(s) URL without query
///
/// Protocol-relative (`//host`) and bare `www.` links get an `https:`
/// scheme; anything else that is not http(s) is rejected.
///
/// # Examples
///
/// ```
/// use listing_harvester::extract::normalize_website;
///
/// assert_eq!(normalize_website("www.acme.es/contacto?utm=1").as_str(), "https://www.acme.es/contacto");
/// assert!(!normalize_website("javascript:void(0)").is_available());
/// ```
pub fn normalize_website(raw: &str) -> Field {
    let trimmed = raw.trim();
    let web = if trimmed.starts_with("//") {
        format!("https:{}", trimmed)
    } else if trimmed
        .get(..4)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("www."))
    {
        format!("https://{}", trimmed)
    } else {
        trimmed.to_string()
    };

    let lower = web.to_ascii_lowercase();
    if !lower.starts_with("http://") && !lower.starts_with("https://") {
        return Field::unavailable();
    }

    Field::from_raw(web.split('?').next().unwrap_or_default())
}
