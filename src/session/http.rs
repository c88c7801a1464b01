use crate::config::BrowserConfig;
use crate::session::{BrowserSession, SessionError, SessionResult, Visibility};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE};
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Builds an HTTP client that presents itself like the configured browser
///
/// # Arguments
///
/// * `user_agent` - `User-Agent` header value
/// * `accept_language` - `Accept-Language` header value; skipped if invalid
/// * `timeout` - Whole-request timeout
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(
    user_agent: &str,
    accept_language: &str,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    match HeaderValue::from_str(accept_language) {
        Ok(value) => {
            headers.insert(ACCEPT_LANGUAGE, value);
        }
        Err(_) => tracing::warn!("Ignoring invalid Accept-Language '{}'", accept_language),
    }

    Client::builder()
        .user_agent(user_agent)
        .default_headers(headers)
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Session backend issuing one GET per navigation
///
/// There is no window and no script execution: consent dismissal, scrolling
/// and visibility are no-ops, and the content is the response body.
pub struct HttpSession {
    client: Client,
    current: Option<String>,
}

impl HttpSession {
    pub fn new(config: &BrowserConfig) -> SessionResult<Self> {
        let client = build_http_client(
            &config.user_agent,
            &config.accept_language,
            config.ready_timeout(),
        )?;
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            current: None,
        }
    }
}

#[async_trait]
impl BrowserSession for HttpSession {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn navigate(&mut self, url: &Url) -> SessionResult<()> {
        self.current = None;

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SessionError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        self.current = Some(response.text().await?);
        Ok(())
    }

    async fn wait_for_root(&mut self, _timeout: Duration) -> SessionResult<()> {
        match self.current {
            Some(_) => Ok(()),
            None => Err(SessionError::NoPage),
        }
    }

    async fn dismiss_consent(
        &mut self,
        _phrases: &[String],
        _timeout: Duration,
    ) -> SessionResult<bool> {
        Ok(false)
    }

    async fn scroll_to(&mut self, _y: u32) -> SessionResult<()> {
        Ok(())
    }

    async fn content(&mut self) -> SessionResult<String> {
        self.current.clone().ok_or(SessionError::NoPage)
    }

    async fn set_visibility(&mut self, _visibility: Visibility) -> SessionResult<()> {
        Ok(())
    }

    async fn shutdown(&mut self) -> SessionResult<()> {
        self.current = None;
        Ok(())
    }
}
