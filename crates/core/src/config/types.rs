use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Movie to look for, matched case-insensitively against listing links.
    pub movie_name: String,
    /// Show date, used verbatim in listing URLs and alert keys.
    pub date: String,
    /// Theatres to check, in order.
    pub theatres: Vec<TheatreSpec>,
    /// Run the browser without a visible window.
    #[serde(default)]
    pub headless: bool,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub notifier: NotifierConfig,
}

/// One venue on the ticketing site.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct TheatreSpec {
    pub city: String,
    pub slug: String,
    pub code: String,
    /// Optional display name, only used in logs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl TheatreSpec {
    /// Build the ticket-listing URL for this theatre on the given date.
    ///
    /// Theatre segments are percent-encoded. The date goes in as written, so
    /// the URL and the alert key always carry the same rendering.
    pub fn listing_url(&self, base_url: &str, date: &str) -> String {
        format!(
            "{}/cinemas/{}/{}/buytickets/{}/{}",
            base_url.trim_end_matches('/'),
            urlencoding::encode(&self.city),
            urlencoding::encode(&self.slug),
            urlencoding::encode(&self.code),
            date
        )
    }

    /// Label for log lines: the display name when set, the slug otherwise.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.slug)
    }
}

/// Which browsing technology opens sessions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserBackend {
    /// Chrome driven over WebDriver; sees client-rendered listings.
    #[default]
    Webdriver,
    /// Plain HTTP client; only sees listings present in the served markup.
    Http,
}

/// Page fetching configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BrowserConfig {
    #[serde(default)]
    pub backend: BrowserBackend,
    /// WebDriver server the `webdriver` backend talks to
    /// (default: http://localhost:9515, chromedriver's port).
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,
    /// Ticketing site root (default: https://in.bookmyshow.com).
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-page load timeout in seconds (default: 15).
    #[serde(default = "default_page_timeout")]
    pub page_timeout_secs: u64,
    /// User agent sent with every page request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            backend: BrowserBackend::default(),
            webdriver_url: default_webdriver_url(),
            base_url: default_base_url(),
            page_timeout_secs: default_page_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl BrowserConfig {
    pub fn page_timeout(&self) -> Duration {
        Duration::from_secs(self.page_timeout_secs)
    }
}

fn default_webdriver_url() -> String {
    "http://localhost:9515".to_string()
}

fn default_base_url() -> String {
    "https://in.bookmyshow.com".to_string()
}

fn default_page_timeout() -> u64 {
    15
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/124.0 Safari/537.36"
        .to_string()
}

/// Fetch retry policy
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetryConfig {
    /// Fetch attempts per theatre (default: 3).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Fixed wait between failed attempts, in seconds (default: 5).
    #[serde(default = "default_backoff")]
    pub backoff_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_secs: default_backoff(),
        }
    }
}

impl RetryConfig {
    pub fn backoff(&self) -> Duration {
        Duration::from_secs(self.backoff_secs)
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff() -> u64 {
    5
}

/// Alert ledger location
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LedgerConfig {
    #[serde(default = "default_ledger_path")]
    pub path: PathBuf,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            path: default_ledger_path(),
        }
    }
}

fn default_ledger_path() -> PathBuf {
    PathBuf::from("alerts_sent.json")
}

/// SMS provider endpoint settings. Credentials come from the environment.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotifierConfig {
    /// Twilio API root (default: https://api.twilio.com).
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Request timeout in seconds (default: 30).
    #[serde(default = "default_notifier_timeout")]
    pub timeout_secs: u64,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            timeout_secs: default_notifier_timeout(),
        }
    }
}

fn default_api_base() -> String {
    "https://api.twilio.com".to_string()
}

fn default_notifier_timeout() -> u64 {
    30
}
