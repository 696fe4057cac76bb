//! WebDriver page fetcher.
//!
//! Drives a real Chrome through a WebDriver server (chromedriver), so
//! listings rendered by JavaScript after load are visible. Listing checks
//! query the live DOM for link text instead of scanning the served HTML.

use async_trait::async_trait;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

use crate::checker::mentions;
use crate::config::BrowserConfig;

use super::{FetchError, PageFetcher, SessionError, SessionFactory};

/// Opens [`WebDriverSession`]s against `browser.webdriver_url`.
pub struct WebDriverSessionFactory {
    config: BrowserConfig,
}

impl WebDriverSessionFactory {
    pub fn new(config: BrowserConfig) -> Self {
        Self { config }
    }
}

/// Chrome command-line switches for one session.
pub fn chrome_args(config: &BrowserConfig, headless: bool) -> Vec<String> {
    let mut args = Vec::new();
    if headless {
        args.push("--headless=new".to_string());
    }
    args.push("--no-sandbox".to_string());
    args.push("--disable-blink-features=AutomationControlled".to_string());
    args.push(format!("--user-agent={}", config.user_agent));
    args
}

fn capabilities(config: &BrowserConfig, headless: bool) -> Map<String, Value> {
    let mut caps = Map::new();
    caps.insert("browserName".to_string(), json!("chrome"));
    caps.insert(
        "goog:chromeOptions".to_string(),
        json!({ "args": chrome_args(config, headless) }),
    );
    caps
}

#[async_trait]
impl SessionFactory for WebDriverSessionFactory {
    fn name(&self) -> &str {
        "webdriver"
    }

    async fn open(&self, headless: bool) -> Result<Box<dyn PageFetcher>, SessionError> {
        let client = ClientBuilder::native()
            .capabilities(capabilities(&self.config, headless))
            .connect(&self.config.webdriver_url)
            .await
            .map_err(|e| {
                SessionError::Init(format!(
                    "WebDriver at {}: {}",
                    self.config.webdriver_url, e
                ))
            })?;

        info!(
            driver = %self.config.webdriver_url,
            headless, "Browser session started"
        );
        Ok(Box::new(WebDriverSession {
            client: Some(client),
            page_timeout: self.config.page_timeout(),
        }))
    }
}

/// One Chrome session.
pub struct WebDriverSession {
    client: Option<Client>,
    page_timeout: std::time::Duration,
}

impl WebDriverSession {
    fn client(&self) -> Result<&Client, FetchError> {
        self.client.as_ref().ok_or(FetchError::SessionClosed)
    }

    /// Navigate and wait until the document has a `<body>`.
    async fn load(&self, url: &str) -> Result<&Client, FetchError> {
        let client = self.client()?;

        match tokio::time::timeout(self.page_timeout, client.goto(url)).await {
            Err(_) => {
                return Err(FetchError::Timeout {
                    url: url.to_string(),
                })
            }
            Ok(Err(e)) => {
                return Err(FetchError::Navigation {
                    url: url.to_string(),
                    message: e.to_string(),
                })
            }
            Ok(Ok(())) => {}
        }

        client
            .wait()
            .at_most(self.page_timeout)
            .for_element(Locator::Css("body"))
            .await
            .map_err(|_| FetchError::PageNotReady {
                url: url.to_string(),
            })?;

        Ok(client)
    }
}

fn dom_error(url: &str, e: fantoccini::error::CmdError) -> FetchError {
    FetchError::Navigation {
        url: url.to_string(),
        message: e.to_string(),
    }
}

#[async_trait]
impl PageFetcher for WebDriverSession {
    fn name(&self) -> &str {
        "webdriver"
    }

    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let client = self.load(url).await?;
        let page = client.source().await.map_err(|e| dom_error(url, e))?;
        debug!(url = url, bytes = page.len(), "Page rendered");
        Ok(page)
    }

    async fn is_listed(&self, url: &str, movie_name: &str) -> Result<bool, FetchError> {
        let client = self.load(url).await?;
        let links = client
            .find_all(Locator::Css("a"))
            .await
            .map_err(|e| dom_error(url, e))?;

        debug!(url = url, links = links.len(), "Scanning rendered links");
        for link in links {
            let text = link.text().await.map_err(|e| dom_error(url, e))?;
            if mentions(&text, movie_name) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn close(&mut self) {
        if let Some(client) = self.client.take() {
            if let Err(e) = client.close().await {
                warn!("Failed to end WebDriver session: {}", e);
            }
        }
    }
}

impl Drop for WebDriverSession {
    fn drop(&mut self) {
        // Dropped without close, e.g. while unwinding
        let Some(client) = self.client.take() else {
            return;
        };
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                let _ = client.close().await;
            });
        }
    }
}
