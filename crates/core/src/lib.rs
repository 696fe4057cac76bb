pub mod checker;
pub mod config;
pub mod fetcher;
pub mod ledger;
pub mod notifier;
pub mod orchestrator;
pub mod testing;

pub use checker::{is_available, mentions};
pub use config::{
    credentials_from_lookup, env_lookup, load_config, load_config_from_str, load_dotenv,
    validate_config, BrowserBackend, BrowserConfig, Config, ConfigError, CredentialsError,
    LedgerConfig, NotifierConfig, RetryConfig, TheatreSpec, TwilioCredentials,
};
pub use fetcher::{
    session_factory, FetchError, HttpSessionFactory, PageFetcher, SessionError, SessionFactory,
    WebDriverSessionFactory,
};
pub use ledger::{AlertKey, AlertLedger, LedgerError};
pub use notifier::{NotificationError, Notifier, SendReceipt, SendResult, TwilioNotifier};
pub use orchestrator::{
    FatalRunError, PollOrchestrator, RunContext, RunReport, TheatreOutcome, TheatreReport,
};
