//! Anti-automation challenge detection

use crate::config::BlockingConfig;

/// Classifies page content as an anti-bot challenge
///
/// Content is lowercased and checked for any of the configured keywords.
/// A disabled detector never reports a block, for directories whose normal
/// pages embed captcha widgets.
#[derive(Debug, Clone)]
pub struct BlockDetector {
    enabled: bool,
    keywords: Vec<String>,
}

impl BlockDetector {
    pub fn new(config: &BlockingConfig) -> Self {
        Self {
            enabled: config.enabled,
            keywords: config
                .keywords
                .iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    /// A detector that never reports a block
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            keywords: Vec::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Returns true if `content` looks like a challenge page
    ///
    /// # Examples
    ///
    /// ```
    /// use listing_harvester::block::BlockDetector;
    /// use listing_harvester::config::BlockingConfig;
    ///
    /// let detector = BlockDetector::new(&BlockingConfig { enabled: true, ..BlockingConfig::default() });
    /// assert!(detector.is_blocked("<div class=\"g-recaptcha\"></div>"));
    /// assert!(!detector.is_blocked("<h1>Asesorías en Coslada</h1>"));
    /// ```
    pub fn is_blocked(&self, content: &str) -> bool {
        if !self.enabled {
            return false;
        }
        let lower = content.to_lowercase();
        self.keywords.iter().any(|keyword| lower.contains(keyword))
    }
}
