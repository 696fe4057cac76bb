//! HTTP page fetcher.
//!
//! A session is a cookie-keeping `reqwest` client, so the site sees one
//! continuous visitor across all theatres in a run. There is no script
//! execution; pages must list showtimes in their served markup. Use the
//! WebDriver backend for sites that render listings client-side.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::Client;
use tracing::{debug, info};

use crate::checker::has_body;
use crate::config::BrowserConfig;

use super::{FetchError, PageFetcher, SessionError, SessionFactory};

/// Opens [`HttpSession`]s.
pub struct HttpSessionFactory {
    config: BrowserConfig,
}

impl HttpSessionFactory {
    pub fn new(config: BrowserConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl SessionFactory for HttpSessionFactory {
    fn name(&self) -> &str {
        "http"
    }

    async fn open(&self, headless: bool) -> Result<Box<dyn PageFetcher>, SessionError> {
        if !headless {
            info!("Visible browser requested, but the HTTP backend always runs headless");
        }
        let session = HttpSession::new(&self.config)?;
        debug!(timeout_secs = self.config.page_timeout_secs, "HTTP session opened");
        Ok(Box::new(session))
    }
}

/// One HTTP browsing session.
pub struct HttpSession {
    client: Option<Client>,
}

impl HttpSession {
    pub fn new(config: &BrowserConfig) -> Result<Self, SessionError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        let client = Client::builder()
            .timeout(config.page_timeout())
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .cookie_store(true)
            .build()
            .map_err(|e| SessionError::Init(e.to_string()))?;

        Ok(Self {
            client: Some(client),
        })
    }
}

#[async_trait]
impl PageFetcher for HttpSession {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let client = self.client.as_ref().ok_or(FetchError::SessionClosed)?;

        let response = client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    url: url.to_string(),
                }
            } else {
                FetchError::Navigation {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let page = response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    url: url.to_string(),
                }
            } else {
                FetchError::Navigation {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            }
        })?;

        if !has_body(&page) {
            return Err(FetchError::PageNotReady {
                url: url.to_string(),
            });
        }

        debug!(url = url, bytes = page.len(), "Page loaded");
        Ok(page)
    }

    async fn close(&mut self) {
        self.client = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config() -> BrowserConfig {
        BrowserConfig {
            page_timeout_secs: 2,
            ..BrowserConfig::default()
        }
    }

    #[tokio::test]
    async fn test_fetch_returns_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cinemas/mumbai/pvr-a/buytickets/C1/20250601"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<html><body><a href='/m'>Dune</a></body></html>"),
            )
            .mount(&server)
            .await;

        let session = HttpSession::new(&config()).unwrap();
        let url = format!("{}/cinemas/mumbai/pvr-a/buytickets/C1/20250601", server.uri());
        let page = session.fetch(&url).await.unwrap();
        assert!(page.contains("Dune"));
        assert!(session.is_listed(&url, "dune").await.unwrap());
    }

    #[tokio::test]
    async fn test_error_status_is_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let session = HttpSession::new(&config()).unwrap();
        let url = format!("{}/cinemas/x", server.uri());
        let err = session.fetch(&url).await.unwrap_err();
        assert_eq!(err, FetchError::Status { url, status: 503 });
    }

    #[tokio::test]
    async fn test_page_without_body_is_not_ready() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html><head></head>"))
            .mount(&server)
            .await;

        let session = HttpSession::new(&config()).unwrap();
        let url = format!("{}/cinemas/x", server.uri());
        assert!(matches!(
            session.fetch(&url).await,
            Err(FetchError::PageNotReady { .. })
        ));
    }

    #[tokio::test]
    async fn test_slow_page_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<body></body>")
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let session = HttpSession::new(&BrowserConfig {
            page_timeout_secs: 1,
            ..BrowserConfig::default()
        })
        .unwrap();
        let url = format!("{}/slow", server.uri());
        assert!(matches!(
            session.fetch(&url).await,
            Err(FetchError::Timeout { .. })
        ));
    }

    #[tokio::test]
    async fn test_closed_session_refuses_fetch() {
        let mut session = HttpSession::new(&config()).unwrap();
        session.close().await;
        assert_eq!(
            session.fetch("http://127.0.0.1:1/").await.unwrap_err(),
            FetchError::SessionClosed
        );
    }

    #[tokio::test]
    async fn test_factory_opens_session() {
        let factory = HttpSessionFactory::new(config());
        let session = factory.open(false).await.unwrap();
        assert_eq!(session.name(), "http");
    }
}
