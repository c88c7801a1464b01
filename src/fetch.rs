//! Paced page retrieval with block recovery
//!
//! The fetch driver turns a URL into page content through the crawl's
//! [`BrowserSession`]. It never returns an error: navigation failures
//! become [`FetchStatus::Unavailable`] and an unresolved challenge becomes
//! [`FetchStatus::Blocked`].

use crate::block::BlockDetector;
use crate::config::{BrowserConfig, DelayRange};
use crate::pacing::pause;
use crate::progress::Progress;
use crate::session::{BrowserSession, Visibility};
use std::time::Duration;
use tokio::time::{sleep, Instant};
use url::Url;

/// Furthest the page is scrolled while "reading" it
const SCROLL_DEPTH_PX: u32 = 800;

const SCROLL_DOWN_PAUSE: DelayRange = DelayRange(0.3, 0.9);
const SCROLL_UP_PAUSE: DelayRange = DelayRange(0.2, 0.6);

/// Consent retries during block recovery are kept short
const RECOVERY_CONSENT_TIMEOUT: Duration = Duration::from_secs(1);

/// Outcome of a fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    /// Content was read and is not a challenge page
    Ready,
    /// Navigation or read failed; content is empty
    Unavailable,
    /// A challenge page was still shown when the wait ceiling was reached
    Blocked,
}

/// Page content together with how it was obtained
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub content: String,
    pub status: FetchStatus,
}

impl FetchedPage {
    fn unavailable() -> Self {
        Self {
            content: String::new(),
            status: FetchStatus::Unavailable,
        }
    }

    /// False only when the crawl must stop because of a block
    pub fn ok(&self) -> bool {
        self.status != FetchStatus::Blocked
    }
}

/// Retrieves pages through a borrowed browser session
pub struct FetchDriver<'a> {
    session: &'a mut dyn BrowserSession,
    config: &'a BrowserConfig,
    detector: BlockDetector,
    progress: Progress,
}

impl<'a> FetchDriver<'a> {
    pub fn new(
        session: &'a mut dyn BrowserSession,
        config: &'a BrowserConfig,
        detector: BlockDetector,
        progress: Progress,
    ) -> Self {
        Self {
            session,
            config,
            detector,
            progress,
        }
    }

    /// Moves the session window off screen
    pub async fn hide(&mut self) {
        self.set_visibility(Visibility::Hidden).await;
    }

    /// Fetches a page the way a person would load and glance at it
    ///
    /// # Steps
    ///
    /// 1. Navigate; a failure yields `Unavailable`
    /// 2. Wait (bounded) for the root element; a timeout is only logged
    /// 3. Try to dismiss a cookie-consent banner
    /// 4. Scroll down and back up with short random pauses
    /// 5. Wait a random settle delay and read the content
    /// 6. If the content is a challenge page, run the recovery protocol
    pub async fn fetch(&mut self, url: &Url) -> FetchedPage {
        tracing::debug!("Fetching {} via {}", url, self.session.name());

        if let Err(e) = self.session.navigate(url).await {
            tracing::warn!("Failed to load {}: {}", url, e);
            return FetchedPage::unavailable();
        }

        if let Err(e) = self.session.wait_for_root(self.config.ready_timeout()).await {
            tracing::debug!("Page {} not ready, reading anyway: {}", url, e);
        }

        self.dismiss_consent(self.config.consent_timeout()).await;
        self.humanize().await;
        pause(self.config.settle_delay_secs).await;

        let content = match self.session.content().await {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", url, e);
                return FetchedPage::unavailable();
            }
        };

        if !self.detector.is_blocked(&content) {
            return FetchedPage {
                content,
                status: FetchStatus::Ready,
            };
        }

        self.recover(url, content).await
    }

    /// Waits for an operator to clear a challenge shown on screen
    ///
    /// Polls every `block-poll-secs` up to `block-wait-ceiling-secs`,
    /// retrying consent dismissal and re-reading the page each cycle.
    async fn recover(&mut self, url: &Url, blocked_content: String) -> FetchedPage {
        let poll = self.config.block_poll();
        let ceiling = self.config.block_wait_ceiling();

        self.set_visibility(Visibility::Visible).await;
        self.progress.warn(format!(
            "Block detected on {} (captcha or wall). Resolve it in the browser window; waiting up to {}s",
            url,
            ceiling.as_secs()
        ));

        let mut last_content = blocked_content;
        let started = Instant::now();
        let mut polls = 0u32;

        while started.elapsed() < ceiling {
            sleep(poll).await;
            polls += 1;

            self.dismiss_consent(RECOVERY_CONSENT_TIMEOUT).await;
            match self.session.content().await {
                Ok(content) if !self.detector.is_blocked(&content) => {
                    self.progress
                        .info(format!("Block cleared after {} checks, continuing", polls));
                    self.set_visibility(Visibility::Hidden).await;
                    return FetchedPage {
                        content,
                        status: FetchStatus::Ready,
                    };
                }
                Ok(content) => last_content = content,
                Err(e) => tracing::debug!("Re-reading {} during block wait failed: {}", url, e),
            }
        }

        self.progress.warn(format!(
            "Block on {} not resolved within {}s; stopping",
            url,
            ceiling.as_secs()
        ));
        FetchedPage {
            content: last_content,
            status: FetchStatus::Blocked,
        }
    }

    async fn dismiss_consent(&mut self, timeout: Duration) {
        match self
            .session
            .dismiss_consent(&self.config.consent_phrases, timeout)
            .await
        {
            Ok(true) => self.progress.info("Cookie banner accepted automatically"),
            Ok(false) => {}
            Err(e) => tracing::debug!("Consent dismissal failed: {}", e),
        }
    }

    async fn humanize(&mut self) {
        if let Err(e) = self.session.scroll_to(SCROLL_DEPTH_PX).await {
            tracing::trace!("Scroll failed: {}", e);
            return;
        }
        pause(SCROLL_DOWN_PAUSE).await;
        if let Err(e) = self.session.scroll_to(0).await {
            tracing::trace!("Scroll failed: {}", e);
            return;
        }
        pause(SCROLL_UP_PAUSE).await;
    }

    async fn set_visibility(&mut self, visibility: Visibility) {
        if let Err(e) = self.session.set_visibility(visibility).await {
            tracing::debug!("Failed to set session visibility to {:?}: {}", visibility, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BlockingConfig;
    use crate::session::{SessionError, SessionResult};
    use async_trait::async_trait;
    use std::collections::VecDeque;

    /// Session returning queued contents on successive reads
    #[derive(Default)]
    struct QueuedSession {
        fail_navigation: bool,
        reads: VecDeque<String>,
        last: String,
        visibility: Vec<Visibility>,
        consent_calls: usize,
    }

    #[async_trait]
    impl BrowserSession for QueuedSession {
        fn name(&self) -> &'static str {
            "queued"
        }

        async fn navigate(&mut self, url: &Url) -> SessionResult<()> {
            if self.fail_navigation {
                return Err(SessionError::Navigation {
                    url: url.to_string(),
                    reason: "connection refused".to_string(),
                });
            }
            Ok(())
        }

        async fn wait_for_root(&mut self, _timeout: Duration) -> SessionResult<()> {
            Ok(())
        }

        async fn dismiss_consent(
            &mut self,
            _phrases: &[String],
            _timeout: Duration,
        ) -> SessionResult<bool> {
            self.consent_calls += 1;
            Ok(false)
        }

        async fn scroll_to(&mut self, _y: u32) -> SessionResult<()> {
            Ok(())
        }

        async fn content(&mut self) -> SessionResult<String> {
            if let Some(next) = self.reads.pop_front() {
                self.last = next;
            }
            Ok(self.last.clone())
        }

        async fn set_visibility(&mut self, visibility: Visibility) -> SessionResult<()> {
            self.visibility.push(visibility);
            Ok(())
        }

        async fn shutdown(&mut self) -> SessionResult<()> {
            Ok(())
        }
    }

    fn detector() -> BlockDetector {
        BlockDetector::new(&BlockingConfig {
            enabled: true,
            ..BlockingConfig::default()
        })
    }

    fn queued(reads: &[&str]) -> QueuedSession {
        QueuedSession {
            reads: reads.iter().map(|r| r.to_string()).collect(),
            ..QueuedSession::default()
        }
    }

    fn url() -> Url {
        Url::parse("https://empresite.eleconomista.es/localidad/COSLADA-MADRID/").unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_ready_page() {
        let config = BrowserConfig::default();
        let mut session = queued(&["<html>listado</html>"]);
        let mut driver = FetchDriver::new(&mut session, &config, detector(), Progress::silent());

        let page = driver.fetch(&url()).await;
        assert_eq!(page.status, FetchStatus::Ready);
        assert!(page.ok());
        assert_eq!(page.content, "<html>listado</html>");
        assert!(session.visibility.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_navigation_failure_is_unavailable() {
        let config = BrowserConfig::default();
        let mut session = QueuedSession {
            fail_navigation: true,
            ..QueuedSession::default()
        };
        let mut driver = FetchDriver::new(&mut session, &config, detector(), Progress::silent());

        let page = driver.fetch(&url()).await;
        assert_eq!(page.status, FetchStatus::Unavailable);
        assert!(page.ok());
        assert!(page.content.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_block_cleared_after_two_polls() {
        let config = BrowserConfig::default();
        let mut session = queued(&["captcha", "captcha", "<html>listado</html>"]);
        let (progress, mut rx) = Progress::channel();
        let mut driver = FetchDriver::new(&mut session, &config, detector(), progress);

        let started = Instant::now();
        let page = driver.fetch(&url()).await;
        assert_eq!(page.status, FetchStatus::Ready);
        assert_eq!(page.content, "<html>listado</html>");
        assert!(started.elapsed() >= Duration::from_secs(8));
        assert_eq!(
            session.visibility,
            vec![Visibility::Visible, Visibility::Hidden]
        );

        let mut lines = Vec::new();
        while let Ok(line) = rx.try_recv() {
            lines.push(line);
        }
        assert!(lines.iter().any(|l| l.starts_with("Block detected")));
        assert!(lines.iter().any(|l| l.contains("after 2 checks")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_block_never_cleared() {
        let config = BrowserConfig::default();
        let mut session = queued(&["<div class=\"g-recaptcha\"></div>"]);
        let mut driver = FetchDriver::new(&mut session, &config, detector(), Progress::silent());

        let started = Instant::now();
        let page = driver.fetch(&url()).await;
        assert_eq!(page.status, FetchStatus::Blocked);
        assert!(!page.ok());
        assert!(started.elapsed() >= config.block_wait_ceiling());
        assert_eq!(session.visibility, vec![Visibility::Visible]);
        // One dismissal during the fetch plus one per poll
        assert_eq!(session.consent_calls, 1 + 60);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_detector_ignores_challenge() {
        let config = BrowserConfig::default();
        let mut session = queued(&["captcha"]);
        let mut driver =
            FetchDriver::new(&mut session, &config, BlockDetector::disabled(), Progress::silent());

        assert_eq!(driver.fetch(&url()).await.status, FetchStatus::Ready);
    }
}
