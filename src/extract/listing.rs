//! Field extraction from listing fragments and detail pages
//!
//! Every field is looked up independently with a fixed precedence; nothing
//! here fails. A missing field stays at the sentinel and the caller decides
//! whether the record carries enough information to keep.

use crate::extract::normalize::{clean_email, email_from_mailto, normalize_phone, normalize_website};
use crate::extract::{Field, ListingRecord};
use crate::url::{bare_domain, host_matches};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use url::Url;

static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\+34\s?\d{9}|\b\d{9}\b)").expect("valid phone regex"));

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9.-]+").expect("valid email regex")
});

/// Finds every email-shaped token in free text, trailing punctuation removed
pub fn scan_emails(text: &str) -> impl Iterator<Item = String> + '_ {
    EMAIL_PATTERN.find_iter(text).map(|m| clean_email(m.as_str()))
}

/// Links the directory marks explicitly as the business website
const WEBSITE_LINK_SELECTOR: &str = "a.web[href], a.url[href], a.website[href]";

/// The only email link trusted on a detail page
const DETAIL_EMAIL_SELECTOR: &str = "a.email[href^='mailto:']";

/// The only website link trusted on a detail page
const DETAIL_WEBSITE_SELECTOR: &str = "a.url[href]";

/// Elements whose text is never rendered
const HIDDEN_TEXT_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

/// Extracts candidate records from directory HTML
#[derive(Debug, Clone)]
pub struct ListingExtractor {
    /// Domain of the directory itself; links into it are never a website
    directory_domain: String,

    /// Locality used when a listing has no address locality of its own
    default_locality: Field,
}

impl ListingExtractor {
    /// Creates an extractor for listings served under `directory_domain`
    pub fn new(directory_domain: impl Into<String>) -> Self {
        Self {
            directory_domain: directory_domain.into(),
            default_locality: Field::unavailable(),
        }
    }

    /// Creates an extractor for the directory serving `base`
    pub fn for_base_url(base: &Url) -> Self {
        let domain = bare_domain(base)
            .or_else(|| base.host_str().map(str::to_string))
            .unwrap_or_default();
        Self::new(domain)
    }

    /// Sets the locality copied into records that lack one
    pub fn with_default_locality(mut self, locality: Field) -> Self {
        self.default_locality = locality;
        self
    }

    /// Splits a results page into listing fragments and extracts each one
    ///
    /// # Arguments
    ///
    /// * `html` - Full results page
    /// * `fragment_selector` - CSS selector matching one listing
    ///
    /// # Returns
    ///
    /// One candidate per fragment, in document order. An empty vector means
    /// the page has no listings at all.
    pub fn extract_listings(&self, html: &str, fragment_selector: &str) -> Vec<ListingRecord> {
        let selector = match Selector::parse(fragment_selector) {
            Ok(selector) => selector,
            Err(e) => {
                tracing::warn!("Invalid listing selector '{}': {:?}", fragment_selector, e);
                return Vec::new();
            }
        };

        let document = Html::parse_document(html);
        document
            .select(&selector)
            .map(|fragment| self.extract_fragment(fragment))
            .collect()
    }

    /// Extracts a record from a whole detail page
    ///
    /// A detail page carries the directory's own header and footer, so email
    /// and website come only from the links the page marks for the business.
    /// Nothing else on the page is scanned for them.
    pub fn extract_detail(&self, html: &str) -> ListingRecord {
        let document = Html::parse_document(html);
        let root = document.root_element();

        let mut record = self.extract_fragment(root);
        record.email = Field::from(
            first_match(root, DETAIL_EMAIL_SELECTOR)
                .and_then(|a| a.value().attr("href"))
                .and_then(email_from_mailto),
        );
        record.website = first_match(root, DETAIL_WEBSITE_SELECTOR)
            .and_then(|a| a.value().attr("href"))
            .map(normalize_website)
            .unwrap_or_else(Field::unavailable);
        record
    }

    /// Extracts a record from a single listing element
    pub fn extract_fragment(&self, fragment: ElementRef<'_>) -> ListingRecord {
        let text = visible_text(fragment);

        let mut record = ListingRecord::with_locality(self.default_locality.clone());
        record.name = microdata(fragment, "name");
        record.phone = self.extract_phone(fragment, &text);
        record.email = self.extract_email(fragment, &text);
        record.website = self.extract_website(fragment);
        record.street_address = microdata(fragment, "streetAddress");
        record.postal_code = microdata(fragment, "postalCode");

        let locality = microdata(fragment, "addressLocality");
        if locality.is_available() {
            record.locality = locality;
        }

        record
    }

    fn extract_phone(&self, fragment: ElementRef<'_>, text: &str) -> Field {
        let from_link = first_match(fragment, "a[href^='tel:']")
            .and_then(|a| a.value().attr("href"))
            .map(|href| href.trim_start_matches("tel:").trim())
            .filter(|number| !number.is_empty())
            .map(normalize_phone);

        let phone = from_link.or_else(|| {
            PHONE_PATTERN
                .find(text)
                .map(|m| normalize_phone(m.as_str()))
        });
        Field::from(phone)
    }

    fn extract_email(&self, fragment: ElementRef<'_>, text: &str) -> Field {
        let from_link = Selector::parse("a[href]").ok().and_then(|selector| {
            fragment
                .select(&selector)
                .filter_map(|a| a.value().attr("href"))
                .find_map(email_from_mailto)
        });

        let email = from_link.or_else(|| scan_emails(text).next());
        Field::from(email)
    }

    fn extract_website(&self, fragment: ElementRef<'_>) -> Field {
        if let Some(explicit) = first_match(fragment, WEBSITE_LINK_SELECTOR)
            .and_then(|a| a.value().attr("href"))
            .map(normalize_website)
            .filter(Field::is_available)
        {
            return explicit;
        }

        let Ok(selector) = Selector::parse("a[href]") else {
            return Field::unavailable();
        };

        for anchor in fragment.select(&selector) {
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            let lower = href.trim().to_ascii_lowercase();
            if lower.starts_with("tel:") || lower.starts_with("mailto:") {
                continue;
            }

            let website = normalize_website(href);
            let Some(value) = website.value() else {
                continue;
            };
            let outbound = Url::parse(value)
                .ok()
                .and_then(|url| url.host_str().map(str::to_string))
                .is_some_and(|host| !host_matches(&self.directory_domain, &host));
            if outbound {
                return website;
            }
        }

        Field::unavailable()
    }
}

/// Reads a microdata property from its `content` attribute or its text
fn microdata(scope: ElementRef<'_>, property: &str) -> Field {
    let css = format!("[itemprop='{}']", property);
    match first_match(scope, &css) {
        Some(element) => match element.value().attr("content") {
            Some(content) => Field::from_raw(content),
            None => Field::from_raw(&element_text(element)),
        },
        None => Field::unavailable(),
    }
}

fn first_match<'a>(scope: ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(css).ok()?;
    scope.select(&selector).next()
}

/// Collects an element's text nodes, trimmed and joined by single spaces
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text a reader would see, skipping script and style content
fn visible_text(scope: ElementRef<'_>) -> String {
    scope
        .descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let hidden = node
                .parent()
                .and_then(ElementRef::wrap)
                .is_some_and(|parent| HIDDEN_TEXT_ELEMENTS.contains(&parent.value().name()));
            if hidden {
                None
            } else {
                Some(text.trim())
            }
        })
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::UNAVAILABLE;

    const LISTING_PAGE: &str = r#"
        <html><body>
          <div class="box">
            <span itemprop="name"> Gestoría López </span>
            <a href="tel:916 12 34 56">Llamar</a>
            <a href="mailto:info@gestorialopez.es?subject=Hola">Email</a>
            <a class="web" href="https://www.gestorialopez.es/?utm_source=pa">Web</a>
            <span itemprop="streetAddress">Calle Mayor 1</span>
            <span itemprop="postalCode">28820</span>
            <span itemprop="addressLocality">Coslada</span>
          </div>
          <div class="box">
            <span itemprop="name">Asesores Norte</span>
            <p>Teléfono: 912345678. Escríbenos a contacto@asesoresnorte.com.</p>
            <a href="https://www.paginasamarillas.es/f/asesores-norte">Ficha</a>
            <a href="http://asesoresnorte.com/inicio?x=1">Visitar</a>
          </div>
          <div class="box"></div>
        </body></html>
    "#;

    fn extractor() -> ListingExtractor {
        ListingExtractor::new("paginasamarillas.es").with_default_locality(Field::from_raw("coslada"))
    }

    #[test]
    fn test_extract_listings_explicit_links() {
        let records = extractor().extract_listings(LISTING_PAGE, "div.box");
        assert_eq!(records.len(), 3);

        let first = &records[0];
        assert_eq!(first.name.as_str(), "Gestoría López");
        assert_eq!(first.phone.as_str(), "+34916123456");
        assert_eq!(first.email.as_str(), "info@gestorialopez.es");
        assert_eq!(first.website.as_str(), "https://www.gestorialopez.es/");
        assert_eq!(first.street_address.as_str(), "Calle Mayor 1");
        assert_eq!(first.postal_code.as_str(), "28820");
        assert_eq!(first.locality.as_str(), "Coslada");
    }

    #[test]
    fn test_extract_listings_text_fallbacks() {
        let records = extractor().extract_listings(LISTING_PAGE, "div.box");
        let second = &records[1];
        assert_eq!(second.phone.as_str(), "+34912345678");
        assert_eq!(second.email.as_str(), "contacto@asesoresnorte.com");
        assert_eq!(second.website.as_str(), "http://asesoresnorte.com/inicio");
        assert_eq!(second.locality.as_str(), "coslada");
    }

    #[test]
    fn test_empty_fragment_yields_uninformative_record() {
        let records = extractor().extract_listings(LISTING_PAGE, "div.box");
        let empty = &records[2];
        assert!(!empty.is_informative());
        assert_eq!(empty.name.as_str(), UNAVAILABLE);
        assert_eq!(empty.street_address.as_str(), UNAVAILABLE);
    }

    #[test]
    fn test_no_fragments() {
        let records = extractor().extract_listings("<html><body><p>Sin resultados</p></body></html>", "div.box");
        assert!(records.is_empty());
    }

    #[test]
    fn test_extract_detail_page() {
        let html = r#"
            <html><head><script>var tel = "600000000";</script></head><body>
              <h1>ACME SERVICIOS SL</h1>
              <a class="email" href="mailto:admin@acme.es">admin@acme.es</a>
              <a class="url" href="//acme.es">acme.es</a>
              <p>Tel. +34 911222333</p>
            </body></html>
        "#;
        let record = ListingExtractor::new("empresite.eleconomista.es").extract_detail(html);
        assert_eq!(record.name.as_str(), UNAVAILABLE);
        assert_eq!(record.email.as_str(), "admin@acme.es");
        assert_eq!(record.website.as_str(), "https://acme.es");
        assert_eq!(record.phone.as_str(), "+34911222333");
    }

    #[test]
    fn test_detail_ignores_directory_chrome() {
        let html = r#"
            <html><body>
              <header><a href="https://www.eleconomista.es/">elEconomista</a></header>
              <h1 itemprop="name">Talleres Ruiz SL</h1>
              <a href="tel:916000111">916000111</a>
              <a href="https://www.facebook.com/empresite">Facebook</a>
              <footer>
                <a href="mailto:atencion@eleconomista.es">Contacto</a>
                <p>Escríbenos a soporte@eleconomista.es</p>
              </footer>
            </body></html>
        "#;
        let record = ListingExtractor::new("empresite.eleconomista.es").extract_detail(html);
        assert_eq!(record.name.as_str(), "Talleres Ruiz SL");
        assert_eq!(record.phone.as_str(), "+34916000111");
        assert!(!record.website.is_available());
        assert!(!record.email.is_available());
    }

    #[test]
    fn test_internal_links_are_not_websites() {
        let html = r#"<div class="box">
            <a href="https://static.paginasamarillas.es/logo">Logo</a>
            <a href="tel:600111222">Tel</a>
        </div>"#;
        let records = extractor().extract_listings(html, "div.box");
        assert!(!records[0].website.is_available());
        assert_eq!(records[0].phone.as_str(), "+34600111222");
    }

    #[test]
    fn test_microdata_content_attribute() {
        let html = r#"<div class="box"><meta itemprop="name" content="Acme"></div>"#;
        let records = extractor().extract_listings(html, "div.box");
        assert_eq!(records[0].name.as_str(), "Acme");
    }

    #[test]
    fn test_for_base_url_strips_www() {
        let base = Url::parse("https://www.paginasamarillas.es/search/x/all-nc/1").unwrap();
        let html = r#"<div class="box"><a href="https://www.paginasamarillas.es/x">x</a></div>"#;
        let records = ListingExtractor::for_base_url(&base).extract_listings(html, "div.box");
        assert!(!records[0].website.is_available());
    }
}
