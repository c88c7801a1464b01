use crate::extract::Field;
use crate::text::{capitalize, fold_diacritics, title_case};
use crate::url::SiteProfile;
use percent_encoding::percent_decode_str;
use serde::Serialize;
use url::Url;

/// Fallback output name when no facet is available
const FALLBACK_NAME: &str = "results";

/// Category and locality of a crawl, derived once from its base URL
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct LocationFacets {
    pub category: Field,
    pub locality: Field,
}

/// Extracts the category/locality facets from a base URL
///
/// Empresite encodes them as the first two path segments (dashes become
/// spaces, the locality is title-cased); Páginas Amarillas carries them in
/// the `what` and `where` query parameters. A missing token yields the
/// unavailable sentinel for that facet.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use listing_harvester::url::{extract_facets, SiteProfile};
///
/// let base = Url::parse("https://empresite.eleconomista.es/localidad/COSLADA-MADRID/").unwrap();
/// let facets = extract_facets(&base, SiteProfile::Empresite);
/// assert_eq!(facets.category.as_str(), "localidad");
/// assert_eq!(facets.locality.as_str(), "Coslada Madrid");
/// ```
pub fn extract_facets(base: &Url, profile: SiteProfile) -> LocationFacets {
    match profile {
        SiteProfile::Empresite => {
            let segments: Vec<String> = base
                .path_segments()
                .map(|parts| {
                    parts
                        .filter(|p| !p.is_empty())
                        .map(|p| percent_decode_str(p).decode_utf8_lossy().replace('-', " "))
                        .collect()
                })
                .unwrap_or_default();

            if segments.len() < 2 {
                return LocationFacets::default();
            }
            LocationFacets {
                category: Field::from_raw(&segments[0]),
                locality: Field::from_raw(&title_case(&segments[1])),
            }
        }
        SiteProfile::PaginasAmarillas => {
            let lookup = |name: &str| {
                base.query_pairs()
                    .find(|(key, _)| key == name)
                    .map(|(_, value)| Field::from_raw(&value))
                    .unwrap_or_default()
            };
            LocationFacets {
                category: lookup("what"),
                locality: lookup("where"),
            }
        }
    }
}

/// Derives a filesystem-safe output name (without extension) from the facets
///
/// Each available facet is stripped of accents and every non-alphanumeric
/// character, capitalized, and the results are concatenated (category
/// first). Falls back to `results` when nothing remains.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use listing_harvester::url::{filename_for, SiteProfile};
///
/// let base = Url::parse(
///     "https://www.paginasamarillas.es/search/a/all-nc/1?what=asesorias+y+gestorias&where=coslada",
/// ).unwrap();
/// assert_eq!(filename_for(&base, SiteProfile::PaginasAmarillas), "AsesoriasygestoriasCoslada");
/// ```
pub fn filename_for(base: &Url, profile: SiteProfile) -> String {
    let facets = extract_facets(base, profile);
    let name: String = [&facets.category, &facets.locality]
        .into_iter()
        .filter_map(|facet| facet.value())
        .map(|token| {
            let folded: String = fold_diacritics(token)
                .chars()
                .filter(|c| c.is_ascii_alphanumeric())
                .collect();
            capitalize(&folded)
        })
        .collect();

    if name.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        name
    }
}
