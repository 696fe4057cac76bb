//! Mock page fetcher and session factory for testing.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::fetcher::{FetchError, PageFetcher, SessionError, SessionFactory};

/// Scripted responses for URLs containing `pattern`.
struct Route {
    pattern: String,
    /// Served first, one per fetch.
    queued: VecDeque<Result<String, FetchError>>,
    /// Served once the queue is empty.
    fallback: Option<Result<String, FetchError>>,
}

/// Mock implementation of the PageFetcher trait.
///
/// Responses are routed by substring: the first route whose pattern occurs in
/// the requested URL answers. Clones share state, so a test can keep one
/// handle while the orchestrator owns another.
///
/// # Example
///
/// ```rust,ignore
/// let fetcher = MockFetcher::new();
/// fetcher.push_error("/C1/", FetchError::Timeout { url: "..".into() }).await;
/// fetcher.set_page("/C1/", fixtures::listing_page(&["Dune"])).await;
///
/// // First fetch of a C1 URL times out, every later one returns the page.
/// ```
#[derive(Clone)]
pub struct MockFetcher {
    routes: Arc<RwLock<Vec<Route>>>,
    fetched: Arc<RwLock<Vec<String>>>,
    closed: Arc<AtomicBool>,
    closes: Arc<AtomicUsize>,
}

impl std::fmt::Debug for MockFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockFetcher")
            .field("routes", &"<routes>")
            .field("fetched", &"<fetched>")
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl Default for MockFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl MockFetcher {
    /// Create a mock fetcher with no routes.
    pub fn new() -> Self {
        Self {
            routes: Arc::new(RwLock::new(Vec::new())),
            fetched: Arc::new(RwLock::new(Vec::new())),
            closed: Arc::new(AtomicBool::new(false)),
            closes: Arc::new(AtomicUsize::new(0)),
        }
    }

    async fn with_route<F>(&self, pattern: &str, update: F)
    where
        F: FnOnce(&mut Route),
    {
        let mut routes = self.routes.write().await;
        if let Some(route) = routes.iter_mut().find(|r| r.pattern == pattern) {
            update(route);
            return;
        }
        let mut route = Route {
            pattern: pattern.to_string(),
            queued: VecDeque::new(),
            fallback: None,
        };
        update(&mut route);
        routes.push(route);
    }

    /// Serve `page` for matching URLs once any queued responses are used up.
    pub async fn set_page(&self, pattern: &str, page: impl Into<String>) {
        let page = page.into();
        self.with_route(pattern, |r| r.fallback = Some(Ok(page))).await;
    }

    /// Fail every matching fetch (after queued responses) with `error`.
    pub async fn fail_always(&self, pattern: &str, error: FetchError) {
        self.with_route(pattern, |r| r.fallback = Some(Err(error)))
            .await;
    }

    /// Queue one page for the next matching fetch.
    pub async fn push_page(&self, pattern: &str, page: impl Into<String>) {
        let page = page.into();
        self.with_route(pattern, |r| r.queued.push_back(Ok(page)))
            .await;
    }

    /// Queue one failure for the next matching fetch.
    pub async fn push_error(&self, pattern: &str, error: FetchError) {
        self.with_route(pattern, |r| r.queued.push_back(Err(error)))
            .await;
    }

    /// URLs fetched so far, in order.
    pub async fn fetched_urls(&self) -> Vec<String> {
        self.fetched.read().await.clone()
    }

    /// Number of fetches performed.
    pub async fn fetch_count(&self) -> usize {
        self.fetched.read().await.len()
    }

    /// Number of fetches whose URL contains `pattern`.
    pub async fn fetch_count_for(&self, pattern: &str) -> usize {
        self.fetched
            .read()
            .await
            .iter()
            .filter(|u| u.contains(pattern))
            .count()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Total `close` calls across all sessions.
    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    /// Mark the session open again, as a fresh session would be.
    pub fn reopen(&self) {
        self.closed.store(false, Ordering::SeqCst);
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        if self.is_closed() {
            return Err(FetchError::SessionClosed);
        }
        self.fetched.write().await.push(url.to_string());

        let mut routes = self.routes.write().await;
        let route = routes.iter_mut().find(|r| url.contains(&r.pattern));
        match route {
            Some(route) => match route.queued.pop_front() {
                Some(response) => response,
                None => route.fallback.clone().unwrap_or_else(|| {
                    Err(FetchError::Navigation {
                        url: url.to_string(),
                        message: "mock route has no response".to_string(),
                    })
                }),
            },
            None => Err(FetchError::Navigation {
                url: url.to_string(),
                message: "no mock route".to_string(),
            }),
        }
    }

    async fn close(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Mock session factory handing out clones of one `MockFetcher`.
#[derive(Debug, Clone)]
pub struct MockSessionFactory {
    fetcher: MockFetcher,
    open_error: Arc<RwLock<Option<String>>>,
    opens: Arc<AtomicUsize>,
}

impl MockSessionFactory {
    pub fn new(fetcher: MockFetcher) -> Self {
        Self {
            fetcher,
            open_error: Arc::new(RwLock::new(None)),
            opens: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Make every subsequent `open` fail with `message`.
    pub async fn fail_open(&self, message: impl Into<String>) {
        *self.open_error.write().await = Some(message.into());
    }

    /// Number of sessions requested, including failed ones.
    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionFactory for MockSessionFactory {
    fn name(&self) -> &str {
        "mock"
    }

    async fn open(&self, _headless: bool) -> Result<Box<dyn PageFetcher>, SessionError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = self.open_error.read().await.clone() {
            return Err(SessionError::Init(message));
        }
        self.fetcher.reopen();
        Ok(Box::new(self.fetcher.clone()))
    }
}
