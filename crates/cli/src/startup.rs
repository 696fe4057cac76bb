//! Run wiring: credentials, ledger and notifier are settled before the
//! browser session is ever opened.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info};

use showtime_core::{
    credentials_from_lookup, AlertLedger, Config, Notifier, PollOrchestrator, RunContext,
    RunReport, SessionFactory, TwilioNotifier,
};

/// A run ready to start.
pub struct Prepared {
    pub orchestrator: PollOrchestrator,
    pub ledger: AlertLedger,
}

/// Build everything a run needs without touching the network.
pub fn prepare<F>(config: &Config, lookup: F, sessions: Arc<dyn SessionFactory>) -> Result<Prepared>
where
    F: Fn(&str) -> Option<String>,
{
    let credentials = credentials_from_lookup(lookup)?;

    let context = RunContext::from_config(config);
    info!(
        movie = %context.movie_name,
        date = %context.date,
        theatres = context.theatres.len(),
        headless = context.headless,
        backend = sessions.name(),
        "Configuration loaded successfully"
    );

    let ledger = AlertLedger::load(&config.ledger.path);

    let notifier: Arc<dyn Notifier> = Arc::new(
        TwilioNotifier::new(credentials, &config.notifier)
            .context("Failed to create SMS notifier")?,
    );

    let orchestrator = PollOrchestrator::new(
        context,
        config.browser.base_url.clone(),
        config.retry.clone(),
        sessions,
        notifier,
    );

    Ok(Prepared {
        orchestrator,
        ledger,
    })
}

/// Prepare and perform one polling run.
pub async fn execute<F>(
    config: &Config,
    lookup: F,
    sessions: Arc<dyn SessionFactory>,
) -> Result<RunReport>
where
    F: Fn(&str) -> Option<String>,
{
    let Prepared {
        orchestrator,
        mut ledger,
    } = prepare(config, lookup, sessions)?;

    let report = orchestrator
        .run(&mut ledger)
        .await
        .context("Driver initialization or unexpected error")?;

    info!(
        alerted = report.alerted(),
        ledger_size = ledger.len(),
        "Check finished"
    );
    Ok(report)
}

/// Process exit status for a finished run, logging the failure if any.
pub fn exit_code(result: Result<()>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            error!("Fatal error: {:#}", e);
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use showtime_core::testing::{fixtures, MockFetcher, MockSessionFactory};
    use showtime_core::{load_config_from_str, CredentialsError};
    use tempfile::TempDir;

    struct Setup {
        config: Config,
        fetcher: MockFetcher,
        sessions: Arc<MockSessionFactory>,
        _dir: TempDir,
    }

    async fn setup() -> Setup {
        let dir = TempDir::new().unwrap();
        let mut config = load_config_from_str(
            r#"
movie_name = "Dune"
date = "2025-06-01"

[[theatres]]
city = "mumbai"
slug = "pvr-a"
code = "C1"
"#,
        )
        .unwrap();
        config.browser.base_url = fixtures::BASE_URL.to_string();
        config.retry.backoff_secs = 0;
        config.ledger.path = dir.path().join("alerts_sent.json");

        let fetcher = MockFetcher::new();
        fetcher
            .set_page("/C1/", fixtures::listing_page(&["Oppenheimer"]))
            .await;

        Setup {
            config,
            sessions: Arc::new(MockSessionFactory::new(fetcher.clone())),
            fetcher,
            _dir: dir,
        }
    }

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn full_env() -> HashMap<String, String> {
        env(&[
            ("TWILIO_ACCOUNT_SID", "AC123"),
            ("TWILIO_AUTH_TOKEN", "token"),
            ("TWILIO_FROM", "+15550001"),
            ("TWILIO_TO", "+15550002"),
        ])
    }

    #[tokio::test]
    async fn test_missing_recipient_aborts_before_any_fetch() {
        let s = setup().await;
        let vars = env(&[
            ("TWILIO_ACCOUNT_SID", "AC123"),
            ("TWILIO_AUTH_TOKEN", "token"),
            ("TWILIO_FROM", "+15550001"),
        ]);

        let result = execute(
            &s.config,
            |k| vars.get(k).cloned(),
            Arc::clone(&s.sessions) as Arc<dyn SessionFactory>,
        )
        .await;

        let err = result.unwrap_err();
        assert_eq!(
            err.downcast_ref::<CredentialsError>(),
            Some(&CredentialsError::Missing(vec!["TWILIO_TO"]))
        );
        assert_eq!(s.sessions.open_count(), 0);
        assert_eq!(s.fetcher.fetch_count().await, 0);
        assert!(!s.config.ledger.path.exists());
        assert_eq!(exit_code(Err(err)), 1);
    }

    #[tokio::test]
    async fn test_successful_run_exits_zero() {
        let s = setup().await;
        let vars = full_env();

        let report = execute(
            &s.config,
            |k| vars.get(k).cloned(),
            Arc::clone(&s.sessions) as Arc<dyn SessionFactory>,
        )
        .await
        .unwrap();

        assert_eq!(report.not_found(), 1);
        assert_eq!(s.sessions.open_count(), 1);
        assert!(s.fetcher.is_closed());
        assert_eq!(exit_code(Ok(())), 0);
    }

    #[tokio::test]
    async fn test_session_failure_exits_nonzero() {
        let s = setup().await;
        s.sessions.fail_open("chromedriver not running").await;
        let vars = full_env();

        let result = execute(
            &s.config,
            |k| vars.get(k).cloned(),
            Arc::clone(&s.sessions) as Arc<dyn SessionFactory>,
        )
        .await;

        let err = result.unwrap_err();
        assert!(format!("{:#}", err).contains("Driver initialization"));
        assert_eq!(s.fetcher.fetch_count().await, 0);
        assert_eq!(exit_code(Err(err)), 1);
    }

    #[tokio::test]
    async fn test_prepare_does_not_open_a_session() {
        let s = setup().await;
        let vars = full_env();

        let prepared = prepare(
            &s.config,
            |k| vars.get(k).cloned(),
            Arc::clone(&s.sessions) as Arc<dyn SessionFactory>,
        )
        .unwrap();

        assert!(prepared.ledger.is_empty());
        assert_eq!(s.sessions.open_count(), 0);
    }
}
