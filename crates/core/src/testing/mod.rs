//! Testing utilities and mock implementations.
//!
//! Mocks for the browser session and the notifier, so a whole polling run
//! can be exercised without network access.
//!
//! # Example
//!
//! ```rust,ignore
//! use showtime_core::testing::{fixtures, MockFetcher, MockNotifier, MockSessionFactory};
//!
//! let fetcher = MockFetcher::new();
//! fetcher.set_page("/C1/", fixtures::listing_page(&["Dune Part Two"])).await;
//! let sessions = MockSessionFactory::new(fetcher.clone());
//! let notifier = MockNotifier::new();
//! ```

mod mock_fetcher;
mod mock_notifier;

pub use mock_fetcher::{MockFetcher, MockSessionFactory};
pub use mock_notifier::{MockNotifier, SentAlert};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::config::TheatreSpec;
    use crate::orchestrator::RunContext;

    /// Base URL the fixtures build listing URLs against.
    pub const BASE_URL: &str = "https://tickets.example.test";

    /// A theatre in Mumbai.
    pub fn theatre(slug: &str, code: &str) -> TheatreSpec {
        TheatreSpec {
            city: "mumbai".to_string(),
            slug: slug.to_string(),
            code: code.to_string(),
            name: None,
        }
    }

    /// A headless run context.
    pub fn run_context(movie_name: &str, date: &str, theatres: Vec<TheatreSpec>) -> RunContext {
        RunContext::new(movie_name, date, theatres, true)
    }

    /// A rendered listing page linking to each of `titles`.
    pub fn listing_page(titles: &[&str]) -> String {
        let links: String = titles
            .iter()
            .enumerate()
            .map(|(i, title)| {
                format!(
                    "      <a href=\"/movies/{}\" class=\"movie-title\">{}</a>\n",
                    i, title
                )
            })
            .collect();
        format!(
            "<!DOCTYPE html>\n<html>\n  <body>\n    <a href=\"/\">Home</a>\n    <div class=\"showtimes\">\n{}    </div>\n  </body>\n</html>\n",
            links
        )
    }
}
