use crate::url::SiteProfile;
use url::Url;

const EMPRESITE_FILTER_KEYS: [(&str, &str); 2] = [("testfiltros", "1"), ("emp_email", "true")];

/// Builds the URL of a results page
///
/// The rewrite only touches the pagination segment, so applying it to its
/// own output with the same page number yields the same URL.
///
/// * Empresite: any `/PgNum-<n>` segment is removed; page 1 (or lower) is the
///   bare path with a trailing `/`, later pages append `/PgNum-<page>/`.
/// * Páginas Amarillas: the segment after `all-nc` is replaced (or added).
///   Without an `all-nc` segment a trailing numeric segment is replaced, or
///   the page number is appended.
///
/// # Arguments
///
/// * `base` - The seed listing URL
/// * `profile` - Site profile that decides the pagination scheme
/// * `page_number` - 1-based page index
///
/// # Examples
///
/// ```
/// use url::Url;
/// use listing_harvester::url::{build_page_url, SiteProfile};
///
/// let base = Url::parse("https://empresite.eleconomista.es/Actividad/ASESORIAS/localidad/COSLADA-MADRID/").unwrap();
/// let page = build_page_url(&base, SiteProfile::Empresite, 3);
/// assert_eq!(page.path(), "/Actividad/ASESORIAS/localidad/COSLADA-MADRID/PgNum-3/");
/// ```
pub fn build_page_url(base: &Url, profile: SiteProfile, page_number: u32) -> Url {
    let mut segments: Vec<String> = base
        .path_segments()
        .map(|parts| {
            parts
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let path = match profile {
        SiteProfile::Empresite => {
            segments.retain(|segment| !is_pgnum_segment(segment));
            if page_number > 1 {
                segments.push(format!("PgNum-{}", page_number));
            }
            if segments.is_empty() {
                "/".to_string()
            } else {
                format!("/{}/", segments.join("/"))
            }
        }
        SiteProfile::PaginasAmarillas => {
            let page = page_number.max(1).to_string();
            match segments.iter().position(|s| s == "all-nc") {
                Some(idx) if idx + 1 < segments.len() => segments[idx + 1] = page,
                Some(_) => segments.push(page),
                None => match segments.last_mut() {
                    Some(last) if is_numeric(last) => *last = page,
                    _ => segments.push(page),
                },
            }
            format!("/{}", segments.join("/"))
        }
    };

    let mut url = base.clone();
    url.set_path(&path);
    url
}

/// Applies the directory's "only listings with email" filter
///
/// Empresite expresses the filter as `testfiltros=1&emp_email=true` in the
/// query string; existing values for those keys are replaced. Other
/// profiles have no such filter and get the URL back unchanged.
pub fn apply_listing_filters(base: &Url, profile: SiteProfile, only_with_email: bool) -> Url {
    if !only_with_email {
        return base.clone();
    }

    match profile {
        SiteProfile::Empresite => {
            let kept: Vec<(String, String)> = base
                .query_pairs()
                .filter(|(key, _)| !EMPRESITE_FILTER_KEYS.iter().any(|(k, _)| key == k))
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect();

            let mut url = base.clone();
            url.query_pairs_mut()
                .clear()
                .extend_pairs(kept)
                .extend_pairs(EMPRESITE_FILTER_KEYS);
            url
        }
        SiteProfile::PaginasAmarillas => {
            tracing::info!(
                "Profile {} has no email filter; crawling all listings",
                profile
            );
            base.clone()
        }
    }
}

fn is_pgnum_segment(segment: &str) -> bool {
    segment
        .strip_prefix("PgNum-")
        .is_some_and(is_numeric)
}

fn is_numeric(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit())
}
