//! Browser sessions
//!
//! A [`BrowserSession`] is the single automation handle a crawl owns from
//! start to finish. Two backends exist:
//! - [`ChromeSession`]: headed Chrome driven over the DevTools protocol
//! - [`HttpSession`]: plain HTTP requests for server-rendered directories
//!
//! The fetch driver only talks to the trait, so tests can script a session
//! without a browser or network.

mod chrome;
mod http;

pub use chrome::ChromeSession;
pub use http::{build_http_client, HttpSession};

use crate::config::{Backend, BrowserConfig};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors raised by a browser session
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to launch browser: {0}")]
    Launch(String),

    #[error("Navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Browser command failed: {0}")]
    Command(String),

    #[error("No page has been loaded")]
    NoPage,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for session operations
pub type SessionResult<T> = std::result::Result<T, SessionError>;

/// Window state of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Off-screen and minimized
    Hidden,
    /// On screen at the configured position, for operator intervention
    Visible,
}

/// One browser-automation handle, used sequentially for a whole crawl
#[async_trait]
pub trait BrowserSession: Send {
    /// Short backend name for logs
    fn name(&self) -> &'static str;

    /// Loads `url` as the current page
    async fn navigate(&mut self, url: &Url) -> SessionResult<()>;

    /// Waits until the page has a root content element
    async fn wait_for_root(&mut self, timeout: Duration) -> SessionResult<()>;

    /// Clicks the first visible, enabled button or link whose folded text
    /// contains one of `phrases` (tried in order), retrying until `timeout`
    ///
    /// # Returns
    ///
    /// `true` if something was clicked
    async fn dismiss_consent(&mut self, phrases: &[String], timeout: Duration)
        -> SessionResult<bool>;

    /// Scrolls the page to vertical offset `y`, clamped to the page height
    async fn scroll_to(&mut self, y: u32) -> SessionResult<()>;

    /// Returns the current page's HTML
    async fn content(&mut self) -> SessionResult<String>;

    async fn set_visibility(&mut self, visibility: Visibility) -> SessionResult<()>;

    /// Releases the session; later calls may fail
    async fn shutdown(&mut self) -> SessionResult<()>;
}

/// Opens the session backend selected in the configuration
///
/// # Returns
///
/// * `Ok(Box<dyn BrowserSession>)` - A ready session, initially hidden
/// * `Err(SessionError)` - The backend could not be started
pub async fn open_session(config: &BrowserConfig) -> SessionResult<Box<dyn BrowserSession>> {
    match config.backend {
        Backend::Chrome => Ok(Box::new(ChromeSession::launch(config).await?)),
        Backend::Http => Ok(Box::new(HttpSession::new(config)?)),
    }
}
