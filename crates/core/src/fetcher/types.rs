//! Types for the page fetching system.

use async_trait::async_trait;
use thiserror::Error;

use crate::checker::is_available;

/// A page load that did not produce usable content. Always worth retrying.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("Timed out loading {url}")]
    Timeout { url: String },

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Page at {url} has no body")]
    PageNotReady { url: String },

    #[error("Browser session is closed")]
    SessionClosed,
}

/// The browser session could not be started.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to initialize browser session: {0}")]
    Init(String),
}

/// One open browser session. Reused for every page in a run.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Load `url` and return its content.
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;

    /// Load `url` and report whether `movie_name` is listed on it.
    ///
    /// The default fetches the page and runs the availability checker.
    /// Backends that can query the rendered page directly may override it.
    async fn is_listed(&self, url: &str, movie_name: &str) -> Result<bool, FetchError> {
        let page = self.fetch(url).await?;
        Ok(is_available(&page, movie_name))
    }

    /// Release the session. Must not fail and may be called more than once;
    /// later fetches return `SessionClosed`.
    async fn close(&mut self);
}

/// Opens browser sessions.
#[async_trait]
pub trait SessionFactory: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Start a new session.
    async fn open(&self, headless: bool) -> Result<Box<dyn PageFetcher>, SessionError>;
}
