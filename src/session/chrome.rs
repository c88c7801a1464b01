use crate::config::BrowserConfig;
use crate::session::{BrowserSession, SessionError, SessionResult, Visibility};
use crate::text::fold_for_match;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig as LaunchConfig};
use chromiumoxide::cdp::browser_protocol::browser::{
    Bounds, GetWindowForTargetParams, SetWindowBoundsParams, WindowState,
};
use chromiumoxide::Page;
use futures::StreamExt;
use std::path::PathBuf;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};
use url::Url;

/// Window size before the first visibility change
const INITIAL_WINDOW: (u32, u32) = (900, 700);

/// Interval between readiness and consent polls
const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Pause after a consent click so the banner can close
const CONSENT_SETTLE: Duration = Duration::from_millis(600);

/// Clicks the first visible, enabled button/link whose folded text contains
/// a phrase. `__PHRASES__` is replaced with a JSON array of folded phrases.
const CONSENT_SCRIPT: &str = r#"(() => {
  const phrases = __PHRASES__;
  const fold = (s) => (s || '')
    .normalize('NFKD')
    .replace(/[\u0300-\u036f]/g, '')
    .toLowerCase()
    .replace(/\s+/g, ' ')
    .trim();
  const candidates = Array.from(document.querySelectorAll('button, a'));
  for (const phrase of phrases) {
    for (const el of candidates) {
      if (!fold(el.innerText || el.textContent).includes(phrase)) continue;
      const style = window.getComputedStyle(el);
      const visible = el.getClientRects().length > 0
        && style.visibility !== 'hidden'
        && style.display !== 'none';
      if (!visible || el.disabled || el.getAttribute('aria-disabled') === 'true') continue;
      el.click();
      return true;
    }
  }
  return false;
})()"#;

/// Headed Chrome session driven over the DevTools protocol
///
/// The window starts off-screen so it does not flash in front of the
/// operator, and is only brought on screen while a block is being resolved.
pub struct ChromeSession {
    browser: Browser,
    handler: JoinHandle<()>,
    page: Page,
    hidden_position: (i64, i64),
    visible_position: (i64, i64),
    visible_size: (u32, u32),
    closed: bool,
}

impl ChromeSession {
    /// Starts Chrome and opens a blank page
    ///
    /// With `use-profile` enabled the profile directory is created if needed
    /// and reused, which keeps consent cookies between runs.
    pub async fn launch(config: &BrowserConfig) -> SessionResult<Self> {
        let (hidden_x, hidden_y) = config.hidden_position;
        let mut builder = LaunchConfig::builder()
            .with_head()
            .window_size(INITIAL_WINDOW.0, INITIAL_WINDOW.1)
            .arg(format!("--window-position={},{}", hidden_x, hidden_y))
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--log-level=3")
            .arg("--disable-logging");

        if config.use_profile {
            let profile_dir = PathBuf::from(&config.profile_dir);
            std::fs::create_dir_all(&profile_dir)?;
            tracing::debug!("Using persistent browser profile at {}", profile_dir.display());
            builder = builder.user_data_dir(profile_dir);
        }

        let launch_config = builder.build().map_err(SessionError::Launch)?;
        let (browser, mut handler) = Browser::launch(launch_config)
            .await
            .map_err(|e| SessionError::Launch(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("Browser handler stopped: {}", e);
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| SessionError::Launch(e.to_string()))?;

        tracing::info!("Chrome session started");

        Ok(Self {
            browser,
            handler,
            page,
            hidden_position: config.hidden_position,
            visible_position: config.visible_position,
            visible_size: config.visible_size,
            closed: false,
        })
    }

    async fn set_bounds(&self, bounds: Bounds) -> SessionResult<()> {
        let window = self
            .page
            .execute(GetWindowForTargetParams::default())
            .await
            .map_err(command_error)?;
        self.page
            .execute(SetWindowBoundsParams::new(window.result.window_id.clone(), bounds))
            .await
            .map_err(command_error)?;
        Ok(())
    }
}

fn command_error(err: chromiumoxide::error::CdpError) -> SessionError {
    SessionError::Command(err.to_string())
}

fn consent_script(phrases: &[String]) -> String {
    let folded: Vec<String> = phrases.iter().map(|p| fold_for_match(p)).collect();
    let json = serde_json::to_string(&folded).unwrap_or_else(|_| "[]".to_string());
    CONSENT_SCRIPT.replace("__PHRASES__", &json)
}

#[async_trait]
impl BrowserSession for ChromeSession {
    fn name(&self) -> &'static str {
        "chrome"
    }

    async fn navigate(&mut self, url: &Url) -> SessionResult<()> {
        self.page
            .goto(url.as_str())
            .await
            .map_err(|e| SessionError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        Ok(())
    }

    async fn wait_for_root(&mut self, timeout: Duration) -> SessionResult<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.page.find_element("body").await.is_ok() {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(SessionError::Timeout(timeout));
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    async fn dismiss_consent(
        &mut self,
        phrases: &[String],
        timeout: Duration,
    ) -> SessionResult<bool> {
        if phrases.is_empty() {
            return Ok(false);
        }

        let script = consent_script(phrases);
        let deadline = Instant::now() + timeout;
        loop {
            let clicked = match self.page.evaluate(script.as_str()).await {
                Ok(result) => result.into_value::<bool>().unwrap_or(false),
                Err(e) => {
                    tracing::trace!("Consent script failed: {}", e);
                    false
                }
            };
            if clicked {
                sleep(CONSENT_SETTLE).await;
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    async fn scroll_to(&mut self, y: u32) -> SessionResult<()> {
        let script = format!(
            "window.scrollTo(0, Math.min({}, document.body ? document.body.scrollHeight : 0))",
            y
        );
        self.page
            .evaluate(script.as_str())
            .await
            .map_err(command_error)?;
        Ok(())
    }

    async fn content(&mut self) -> SessionResult<String> {
        self.page.content().await.map_err(command_error)
    }

    async fn set_visibility(&mut self, visibility: Visibility) -> SessionResult<()> {
        // Position and size can only be changed on a window in normal state
        self.set_bounds(Bounds::builder().window_state(WindowState::Normal).build())
            .await?;

        match visibility {
            Visibility::Hidden => {
                let (left, top) = self.hidden_position;
                self.set_bounds(Bounds::builder().left(left).top(top).build())
                    .await?;
                self.set_bounds(Bounds::builder().window_state(WindowState::Minimized).build())
                    .await
            }
            Visibility::Visible => {
                let (left, top) = self.visible_position;
                let (width, height) = self.visible_size;
                self.set_bounds(
                    Bounds::builder()
                        .left(left)
                        .top(top)
                        .width(i64::from(width))
                        .height(i64::from(height))
                        .build(),
                )
                .await
            }
        }
    }

    async fn shutdown(&mut self) -> SessionResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        if let Err(e) = self.browser.close().await {
            tracing::warn!("Failed to close browser cleanly: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            tracing::warn!("Failed to wait for browser exit: {}", e);
        }
        self.handler.abort();
        tracing::info!("Chrome session closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consent_script_embeds_folded_phrases() {
        let script = consent_script(&["Aceptar TODO".to_string(), "Sí, acepto".to_string()]);
        assert!(script.contains(r#"["aceptar todo","si, acepto"]"#));
        assert!(!script.contains("__PHRASES__"));
    }

    #[test]
    fn test_consent_script_empty() {
        assert!(consent_script(&[]).contains("const phrases = [];"));
    }
}
