use crate::config::types::{
    BlockingConfig, BrowserConfig, Config, CrawlerConfig, DelayRange, EnrichmentConfig,
    OutputConfig, MAX_DELAY_SECS,
};
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_browser_config(&config.browser)?;
    validate_blocking_config(&config.blocking)?;
    validate_enrichment_config(&config.enrichment)?;
    validate_output_config(&config.output)?;
    Ok(())
}

fn validate_range(name: &str, range: &DelayRange) -> Result<(), ConfigError> {
    if !range.is_valid() {
        return Err(ConfigError::Validation(format!(
            "{} must be a [min, max] pair with 0 <= min <= max <= {}, got [{}, {}]",
            name,
            MAX_DELAY_SECS,
            range.min(),
            range.max()
        )));
    }
    Ok(())
}

/// Validates pacing configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    validate_range("detail-delay-secs", &config.detail_delay_secs)?;
    validate_range("page-delay-secs", &config.page_delay_secs)?;
    validate_range("cooldown-secs", &config.cooldown_secs)?;

    if config.cooldown_every < 1 {
        return Err(ConfigError::Validation(format!(
            "cooldown-every must be >= 1, got {}",
            config.cooldown_every
        )));
    }

    Ok(())
}

/// Validates browser session configuration
fn validate_browser_config(config: &BrowserConfig) -> Result<(), ConfigError> {
    validate_range("settle-delay-secs", &config.settle_delay_secs)?;

    if config.block_poll_secs == 0 {
        return Err(ConfigError::Validation(
            "block-poll-secs must be >= 1".to_string(),
        ));
    }

    if config.block_wait_ceiling_secs < config.block_poll_secs {
        return Err(ConfigError::Validation(format!(
            "block-wait-ceiling-secs ({}) must be >= block-poll-secs ({})",
            config.block_wait_ceiling_secs, config.block_poll_secs
        )));
    }

    if config.use_profile && config.profile_dir.trim().is_empty() {
        return Err(ConfigError::Validation(
            "profile-dir cannot be empty when use-profile is set".to_string(),
        ));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.consent_phrases.is_empty() {
        return Err(ConfigError::Validation(
            "consent-phrases must contain at least one phrase".to_string(),
        ));
    }
    if config.consent_phrases.iter().any(|p| p.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "consent-phrases cannot contain a blank phrase".to_string(),
        ));
    }

    if config.visible_size.0 == 0 || config.visible_size.1 == 0 {
        return Err(ConfigError::Validation(format!(
            "visible-size must be positive, got {:?}",
            config.visible_size
        )));
    }

    Ok(())
}

/// Validates block detection configuration
fn validate_blocking_config(config: &BlockingConfig) -> Result<(), ConfigError> {
    if config.enabled && config.keywords.is_empty() {
        return Err(ConfigError::Validation(
            "blocking.keywords cannot be empty when block detection is enabled".to_string(),
        ));
    }
    // A blank keyword would match every page
    if config.keywords.iter().any(|k| k.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "blocking.keywords cannot contain a blank keyword".to_string(),
        ));
    }
    Ok(())
}

/// Validates email inference configuration
fn validate_enrichment_config(config: &EnrichmentConfig) -> Result<(), ConfigError> {
    let prefixes = &config.role_prefixes;
    for (role, prefix) in [
        ("info", &prefixes.info),
        ("contact", &prefixes.contact),
        ("admin", &prefixes.admin),
    ] {
        validate_local_part(role, prefix)?;
    }

    if config.default_tld.is_empty()
        || !config
            .default_tld
            .chars()
            .all(|c| c.is_ascii_alphanumeric())
    {
        return Err(ConfigError::Validation(format!(
            "default-tld must be alphanumeric, got '{}'",
            config.default_tld
        )));
    }

    if config.website_email_lookup && config.lookup_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "lookup-timeout-secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.trim().is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Checks a role prefix is usable as the local part of an address
fn validate_local_part(role: &str, prefix: &str) -> Result<(), ConfigError> {
    if prefix.is_empty() {
        return Err(ConfigError::Validation(format!(
            "role prefix '{}' cannot be empty",
            role
        )));
    }

    if !prefix
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '_' | '-'))
    {
        return Err(ConfigError::Validation(format!(
            "role prefix '{}' may only contain [a-z0-9._-], got '{}'",
            role, prefix
        )));
    }

    if prefix.starts_with('.') || prefix.ends_with('.') {
        return Err(ConfigError::Validation(format!(
            "role prefix '{}' cannot start or end with '.'",
            role
        )));
    }

    Ok(())
}
