use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Listing-Harvester
///
/// Every section is optional in the TOML file; missing sections and keys
/// fall back to the defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub browser: BrowserConfig,
    pub blocking: BlockingConfig,
    pub site: SiteConfig,
    pub enrichment: EnrichmentConfig,
    pub output: OutputConfig,
}

/// Longest pause any delay range may ask for, one day
pub const MAX_DELAY_SECS: f64 = 86_400.0;

/// An inclusive range of seconds from which a pause is drawn at random
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct DelayRange(pub f64, pub f64);

impl DelayRange {
    pub fn min(&self) -> f64 {
        self.0
    }

    pub fn max(&self) -> f64 {
        self.1
    }

    /// Returns true if both bounds are ordered and within `0..=MAX_DELAY_SECS`
    pub fn is_valid(&self) -> bool {
        self.0.is_finite()
            && self.1.is_finite()
            && self.0 >= 0.0
            && self.0 <= self.1
            && self.1 <= MAX_DELAY_SECS
    }
}

/// Pacing policy for the crawl
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Pause after every detail page
    pub detail_delay_secs: DelayRange,

    /// Pause after every listing page
    pub page_delay_secs: DelayRange,

    /// Take a long cooldown every N processed details
    pub cooldown_every: u32,

    /// Length of the periodic cooldown
    pub cooldown_secs: DelayRange,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            detail_delay_secs: DelayRange(3.0, 7.0),
            page_delay_secs: DelayRange(6.0, 12.0),
            cooldown_every: 4,
            cooldown_secs: DelayRange(45.0, 120.0),
        }
    }
}

/// Which `BrowserSession` implementation drives the crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Backend {
    /// Headed Chrome over the DevTools protocol
    Chrome,
    /// Plain HTTP GETs, for server-rendered directories
    Http,
}

/// Browser session and fetch-driver behaviour
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BrowserConfig {
    pub backend: Backend,

    /// Reuse a persistent browser profile (keeps cookies between runs)
    pub use_profile: bool,
    pub profile_dir: String,

    pub user_agent: String,
    pub accept_language: String,

    /// Upper bound on waiting for the page root to appear
    pub ready_timeout_secs: u64,

    /// Upper bound on looking for a cookie-consent button
    pub consent_timeout_secs: u64,

    /// Random pause before reading page content
    pub settle_delay_secs: DelayRange,

    /// Interval between polls while a block is pending
    pub block_poll_secs: u64,

    /// Give up on a block after this long
    pub block_wait_ceiling_secs: u64,

    pub hidden_position: (i64, i64),
    pub visible_position: (i64, i64),
    pub visible_size: (u32, u32),

    /// Case- and accent-insensitive button texts that accept cookies
    pub consent_phrases: Vec<String>,
}

impl BrowserConfig {
    pub fn ready_timeout(&self) -> Duration {
        Duration::from_secs(self.ready_timeout_secs)
    }

    pub fn consent_timeout(&self) -> Duration {
        Duration::from_secs(self.consent_timeout_secs)
    }

    pub fn block_poll(&self) -> Duration {
        Duration::from_secs(self.block_poll_secs)
    }

    pub fn block_wait_ceiling(&self) -> Duration {
        Duration::from_secs(self.block_wait_ceiling_secs)
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Chrome,
            use_profile: true,
            profile_dir: "browser_profile".to_string(),
            user_agent: "Mozilla/5.0".to_string(),
            accept_language: "es-ES,es;q=0.9".to_string(),
            ready_timeout_secs: 25,
            consent_timeout_secs: 3,
            settle_delay_secs: DelayRange(1.0, 2.5),
            block_poll_secs: 4,
            block_wait_ceiling_secs: 240,
            hidden_position: (-32000, -32000),
            visible_position: (60, 60),
            visible_size: (1200, 900),
            consent_phrases: [
                "aceptar",
                "aceptar todo",
                "aceptar todas",
                "aceptar cookies",
                "estoy de acuerdo",
                "acepto",
                "allow all",
                "accept all",
                "i agree",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// Anti-bot challenge detection
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BlockingConfig {
    pub enabled: bool,
    pub keywords: Vec<String>,
}

impl Default for BlockingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            keywords: [
                "captcha",
                "g-recaptcha",
                "hcaptcha",
                "are you human",
                "unusual traffic",
                "cf-chl",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// Directory-site rules
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SiteConfig {
    /// Pin the site profile instead of resolving it from the host
    pub profile: Option<crate::url::SiteProfile>,

    /// Informational and legal pages that are never listings
    pub excluded_pages: Vec<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            profile: None,
            excluded_pages: [
                "faqs.html",
                "faq.html",
                "cookies.html",
                "politica-cookies.html",
                "politica-privacidad.html",
                "privacidad.html",
                "aviso-legal.html",
                "terminos.html",
                "terminos-condiciones.html",
                "contacto.html",
                "about.html",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// Local parts used for synthesized role addresses
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RolePrefixes {
    pub info: String,
    pub contact: String,
    pub admin: String,
}

impl Default for RolePrefixes {
    fn default() -> Self {
        Self {
            info: "info".to_string(),
            contact: "contacto".to_string(),
            admin: "administracion".to_string(),
        }
    }
}

/// Email inference settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct EnrichmentConfig {
    pub role_prefixes: RolePrefixes,

    /// Fall back to a domain guessed from the company name
    pub name_slug: bool,
    pub default_tld: String,

    /// Fetch the listing's own website looking for an address on its domain
    pub website_email_lookup: bool,
    pub lookup_timeout_secs: u64,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            role_prefixes: RolePrefixes::default(),
            name_slug: false,
            default_tld: "com".to_string(),
            website_email_lookup: false,
            lookup_timeout_secs: 10,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Directory receiving the JSON documents
    pub directory: String,

    pub pretty: bool,

    /// Write one document per listing page instead of one per crawl
    pub per_page: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: "resultados".to_string(),
            pretty: true,
            per_page: false,
        }
    }
}
