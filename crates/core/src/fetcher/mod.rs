//! Page fetching abstraction.
//!
//! A `SessionFactory` opens one `PageFetcher` session per run; the session is
//! reused for every theatre and closed once the run is over. Fetching a page
//! and checking it for the movie is exposed as a single capability,
//! `PageFetcher::is_listed`, so the browsing technology can be swapped
//! without touching the orchestrator.
//!
//! Two backends ship: `webdriver` drives Chrome and sees client-rendered
//! listings, `http` is a lightweight plain-HTTP session.

mod http;
mod types;
mod webdriver;

use std::sync::Arc;

use crate::config::{BrowserBackend, BrowserConfig};

pub use http::{HttpSession, HttpSessionFactory};
pub use types::*;
pub use webdriver::{chrome_args, WebDriverSession, WebDriverSessionFactory};

/// Session factory for the backend selected in `[browser]`.
pub fn session_factory(config: &BrowserConfig) -> Arc<dyn SessionFactory> {
    match config.backend {
        BrowserBackend::Webdriver => Arc::new(WebDriverSessionFactory::new(config.clone())),
        BrowserBackend::Http => Arc::new(HttpSessionFactory::new(config.clone())),
    }
}
