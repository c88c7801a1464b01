use crate::config::EnrichmentConfig;
use crate::extract::ListingRecord;
use crate::text::fold_diacritics;
use crate::url::bare_domain_of;

/// Legal-form suffixes removed from a company name before slugging,
/// written without trailing dots and longest first
const LEGAL_SUFFIXES: &[&str] = &[
    "sociedad limitada profesional",
    "sociedad limitada unipersonal",
    "sociedad limitada",
    "sociedad anonima",
    "sociedad cooperativa",
    "s.l.p",
    "s.l.u",
    "s.coop",
    "s.l",
    "s.a",
    "s.c",
    "c.b",
    "slp",
    "slu",
    "sl",
    "sa",
    "sc",
    "cb",
    "ltd",
    "inc",
    "llc",
];

/// Minimum length of a usable name slug
const MIN_SLUG_LEN: usize = 3;

/// Which tiers `infer_domain` may use
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainStrategy {
    /// Guess `<slug>.<tld>` from the company name as a last resort
    pub name_slug: bool,
    pub default_tld: String,
}

impl Default for DomainStrategy {
    fn default() -> Self {
        Self {
            name_slug: false,
            default_tld: "com".to_string(),
        }
    }
}

impl From<&EnrichmentConfig> for DomainStrategy {
    fn from(config: &EnrichmentConfig) -> Self {
        Self {
            name_slug: config.name_slug,
            default_tld: config.default_tld.clone(),
        }
    }
}

/// Derives the most trustworthy email domain for a record
///
/// # Precedence
///
/// 1. Host of `website`, lowercased and without `www.`, if it has a dot
/// 2. Domain half of `email`, if it has exactly one `@`
/// 3. A slug of `name` plus the default TLD, when the strategy allows it
///
/// The function is pure: calling it again on the same record gives the
/// same answer.
///
/// # Examples
///
/// ```
/// use listing_harvester::enrich::{infer_domain, DomainStrategy};
/// use listing_harvester::{Field, ListingRecord};
///
/// let record = ListingRecord {
///     website: Field::from_raw("http://www.Acme.example/"),
///     ..ListingRecord::default()
/// };
/// assert_eq!(infer_domain(&record, &DomainStrategy::default()), Some("acme.example".to_string()));
/// ```
pub fn infer_domain(record: &ListingRecord, strategy: &DomainStrategy) -> Option<String> {
    if let Some(domain) = record.website.value().and_then(bare_domain_of) {
        return Some(domain);
    }

    if let Some(domain) = record.email.value().and_then(email_domain) {
        return Some(domain);
    }

    if strategy.name_slug {
        return record
            .name
            .value()
            .and_then(name_slug)
            .map(|slug| format!("{}.{}", slug, strategy.default_tld));
    }

    None
}

fn email_domain(email: &str) -> Option<String> {
    let mut parts = email.split('@');
    let (_, domain) = (parts.next()?, parts.next()?);
    if parts.next().is_some() || domain.trim().is_empty() {
        return None;
    }
    Some(domain.trim().to_lowercase())
}

/// Turns a company name into a domain label
///
/// Accents are folded, legal-form suffixes dropped, and everything but
/// ASCII letters and digits removed. Returns `None` when fewer than three
/// characters survive.
///
/// # Examples
///
/// ```
/// use listing_harvester::enrich::name_slug;
///
/// assert_eq!(name_slug("Gestoría López, S.L."), Some("gestorialopez".to_string()));
/// assert_eq!(name_slug("A.B. S.A."), None);
/// ```
pub fn name_slug(name: &str) -> Option<String> {
    let mut folded = fold_diacritics(name).to_lowercase();

    loop {
        let trimmed = folded
            .trim_end_matches(|c: char| c.is_whitespace() || matches!(c, '.' | ',' | ';' | '-'))
            .to_string();
        let stripped = LEGAL_SUFFIXES.iter().find_map(|suffix| {
            let rest = trimmed.strip_suffix(suffix)?;
            let at_boundary = rest
                .chars()
                .next_back()
                .map_or(true, |c| !c.is_alphanumeric());
            at_boundary.then(|| rest.to_string())
        });
        match stripped {
            Some(rest) => folded = rest,
            None => {
                folded = trimmed;
                break;
            }
        }
    }

    let slug: String = folded.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
    if slug.len() < MIN_SLUG_LEN {
        None
    } else {
        Some(slug)
    }
}
