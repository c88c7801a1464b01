//! Detail-link discovery on results pages of directories that keep the
//! full listing on a separate page.

use crate::extract::listing::element_text;
use crate::extract::Field;
use crate::text::title_case;
use crate::url::{bare_domain, host_matches};
use percent_encoding::percent_decode_str;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;
use url::Url;

/// Anchors that may point at a detail page
const CANDIDATE_ANCHORS: &str =
    r#"a[onclick*="location.href"], a[href$=".html"], a[href*="/empresa/"], a[href*="/EMPRESA/"]"#;

/// Anchor text the directory uses for "open listing" buttons
const GENERIC_LABEL: &str = "ver ficha";

static ONCLICK_TARGET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)location\.href\s*=\s*['"]([^'"]+)['"]"#).expect("valid onclick regex")
});

/// A detail page found on a results page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailLink {
    pub url: Url,

    /// Anchor text, or its `title` attribute when the text is empty
    pub label: Option<String>,
}

/// Result of scanning a results page for detail links
#[derive(Debug, Clone, Default)]
pub struct DetailLinks {
    /// Number of candidate anchors on the page, before any filtering
    pub anchors_seen: usize,

    /// Accepted detail pages, unique and in document order
    pub links: Vec<DetailLink>,
}

/// Scans a results page for links to listing detail pages
///
/// A target is taken from `href`, or from a `location.href = '...'`
/// assignment in `onclick`, and resolved against `base`. It is accepted
/// when it stays on the directory host and is either a root-level `.html`
/// page or an `.html` page under `/empresa/`, and its file name is not in
/// `excluded_pages`.
///
/// # Arguments
///
/// * `html` - Results page content
/// * `base` - URL of the results page
/// * `excluded_pages` - Lowercase file names of informational pages to skip
pub fn extract_detail_links(html: &str, base: &Url, excluded_pages: &[String]) -> DetailLinks {
    let Ok(selector) = Selector::parse(CANDIDATE_ANCHORS) else {
        return DetailLinks::default();
    };

    let directory_domain = bare_domain(base)
        .or_else(|| base.host_str().map(str::to_string))
        .unwrap_or_default();

    let document = Html::parse_document(html);
    let mut result = DetailLinks::default();
    let mut seen = HashSet::new();

    for anchor in document.select(&selector) {
        result.anchors_seen += 1;

        let Some(url) = anchor_target(anchor, base) else {
            continue;
        };
        if !is_detail_page(&url, &directory_domain, excluded_pages) {
            continue;
        }
        if !seen.insert(url.to_string()) {
            continue;
        }

        result.links.push(DetailLink {
            url,
            label: anchor_label(anchor),
        });
    }

    tracing::debug!(
        "Found {} detail links among {} candidate anchors on {}",
        result.links.len(),
        result.anchors_seen,
        base
    );
    result
}

/// Chooses a record name for a detail page
///
/// The anchor label wins unless it is the generic "ver ficha" button text;
/// otherwise the name is rebuilt from the detail URL slug.
pub fn listing_name(link: &DetailLink) -> Field {
    match link.label.as_deref().map(str::trim) {
        Some(label) if !label.is_empty() && !label.eq_ignore_ascii_case(GENERIC_LABEL) => {
            Field::from_raw(label)
        }
        _ => name_from_detail_url(&link.url),
    }
}

/// Rebuilds a readable company name from a detail URL slug
///
/// # Examples
///
/// ```
/// use url::Url;
/// use listing_harvester::extract::name_from_detail_url;
///
/// let url = Url::parse("https://empresite.eleconomista.es/GESTORIA-LOPEZ-SL.html").unwrap();
/// assert_eq!(name_from_detail_url(&url).as_str(), "Gestoria Lopez Sl");
/// ```
pub fn name_from_detail_url(url: &Url) -> Field {
    let last = url
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .unwrap_or_default();
    let decoded = percent_decode_str(last).decode_utf8_lossy();

    let lower = decoded.to_ascii_lowercase();
    let stem_len = if lower.ends_with(".html") {
        decoded.len() - 5
    } else if lower.ends_with(".htm") {
        decoded.len() - 4
    } else {
        decoded.len()
    };

    let words = decoded[..stem_len].replace('-', " ");
    Field::from_raw(&title_case(words.trim()))
}

fn anchor_target(anchor: ElementRef<'_>, base: &Url) -> Option<Url> {
    let element = anchor.value();
    let href = element.attr("href").map(str::trim).filter(|h| !h.is_empty());
    let raw = match href {
        Some(href) => href.to_string(),
        None => {
            let onclick = element.attr("onclick")?;
            ONCLICK_TARGET.captures(onclick)?.get(1)?.as_str().trim().to_string()
        }
    };

    let mut url = base.join(&raw).ok()?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }
    url.set_fragment(None);
    Some(url)
}

fn is_detail_page(url: &Url, directory_domain: &str, excluded_pages: &[String]) -> bool {
    let on_directory = url
        .host_str()
        .is_some_and(|host| host_matches(directory_domain, host));
    if !on_directory {
        return false;
    }

    let path = url.path().to_lowercase();
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let Some(last) = segments.last() else {
        return false;
    };

    let is_html = last.ends_with(".html");
    let is_detail = is_html && (segments.len() == 1 || path.contains("/empresa/"));
    is_detail && !excluded_pages.iter().any(|page| page.eq_ignore_ascii_case(last))
}

fn anchor_label(anchor: ElementRef<'_>) -> Option<String> {
    let text = element_text(anchor);
    if !text.is_empty() {
        return Some(text);
    }
    anchor
        .value()
        .attr("title")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}
