//! Poll orchestrator implementation.
//!
//! One pass over the configured theatres:
//! - Skip theatres already in the ledger
//! - Load the listing page, retrying transient failures with a fixed backoff
//! - On a match, notify and record the key, whatever the notifier says

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::config::{RetryConfig, TheatreSpec};
use crate::fetcher::{FetchError, PageFetcher, SessionFactory};
use crate::ledger::AlertLedger;
use crate::notifier::Notifier;

use super::types::{FatalRunError, RunContext, RunReport, TheatreOutcome, TheatreReport};

/// Result of the fetch-and-check step for one theatre.
enum Probe {
    Listed(bool),
    Exhausted { attempts: u32, last_error: FetchError },
}

/// Drives one polling run.
pub struct PollOrchestrator {
    context: RunContext,
    base_url: String,
    retry: RetryConfig,
    sessions: Arc<dyn SessionFactory>,
    notifier: Arc<dyn Notifier>,
}

impl PollOrchestrator {
    /// Create a new orchestrator.
    pub fn new(
        context: RunContext,
        base_url: impl Into<String>,
        retry: RetryConfig,
        sessions: Arc<dyn SessionFactory>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            context,
            base_url: base_url.into(),
            retry,
            sessions,
            notifier,
        }
    }

    /// Visit every theatre once, in order.
    ///
    /// The session is closed on every return path. Errors returned here mean
    /// the remaining theatres were not visited.
    pub async fn run(&self, ledger: &mut AlertLedger) -> Result<RunReport, FatalRunError> {
        let started_at = Utc::now();

        let mut session = self
            .sessions
            .open(self.context.headless)
            .await
            .map_err(|e| {
                error!(backend = self.sessions.name(), "Driver initialization failed: {}", e);
                FatalRunError::from(e)
            })?;

        let visited = self.visit_all(session.as_ref(), ledger).await;
        session.close().await;
        info!(backend = session.name(), "Browser closed gracefully");
        let theatres = visited?;

        let report = RunReport {
            started_at,
            finished_at: Utc::now(),
            theatres,
        };
        info!(
            alerted = report.alerted(),
            skipped = report.skipped(),
            not_found = report.not_found(),
            failed = report.failed(),
            "Run complete"
        );
        Ok(report)
    }

    async fn visit_all(
        &self,
        fetcher: &dyn PageFetcher,
        ledger: &mut AlertLedger,
    ) -> Result<Vec<TheatreReport>, FatalRunError> {
        let mut theatres = Vec::with_capacity(self.context.theatres.len());
        for theatre in &self.context.theatres {
            let outcome = self
                .check_theatre(fetcher, theatre, ledger)
                .await
                .map_err(|e| {
                    error!(theatre = %theatre.code, "Aborting run: {}", e);
                    e
                })?;
            debug!(
                theatre = %theatre.code,
                outcome = outcome.as_str(),
                "Theatre checked"
            );

            theatres.push(TheatreReport {
                code: theatre.code.clone(),
                slug: theatre.slug.clone(),
                outcome,
            });
        }
        Ok(theatres)
    }

    async fn check_theatre(
        &self,
        fetcher: &dyn PageFetcher,
        theatre: &TheatreSpec,
        ledger: &mut AlertLedger,
    ) -> Result<TheatreOutcome, FatalRunError> {
        let ctx = &self.context;
        let key = ctx.alert_key(theatre);

        if ledger.contains(&key) {
            info!(key = %key, "Already alerted for {}, skipping", key);
            return Ok(TheatreOutcome::Skipped);
        }

        let url = theatre.listing_url(&self.base_url, &ctx.date);
        info!(theatre = theatre.label(), "Visiting: {}", url);

        let listed = match self.probe(fetcher, theatre, &url).await {
            Probe::Listed(listed) => listed,
            Probe::Exhausted {
                attempts,
                last_error,
            } => {
                info!(
                    theatre = theatre.label(),
                    attempts, "No tickets found for {} after retries", theatre.slug
                );
                return Ok(TheatreOutcome::FailedAfterRetries {
                    attempts,
                    last_error: last_error.to_string(),
                });
            }
        };

        if !listed {
            info!(
                "Movie '{}' not found at {} on {}",
                ctx.movie_name, theatre.slug, ctx.date
            );
            return Ok(TheatreOutcome::NotFound);
        }

        info!("Found '{}' at {}", ctx.movie_name, theatre.slug);
        let notified = match self
            .notifier
            .notify(&ctx.movie_name, &theatre.slug, &ctx.date)
            .await
        {
            Ok(_) => true,
            Err(e) => {
                error!(
                    notifier = self.notifier.name(),
                    theatre = theatre.label(),
                    "Failed to send SMS: {}",
                    e
                );
                false
            }
        };

        ledger
            .add(key.clone())
            .map_err(|source| FatalRunError::LedgerWrite { key, source })?;

        Ok(TheatreOutcome::Alerted { notified })
    }

    /// Fetch and check with up to `max_attempts` tries. A page that loads
    /// but lacks the movie is final, not retried.
    async fn probe(&self, fetcher: &dyn PageFetcher, theatre: &TheatreSpec, url: &str) -> Probe {
        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            match fetcher.is_listed(url, &self.context.movie_name).await {
                Ok(listed) => return Probe::Listed(listed),
                Err(e) => {
                    warn!(
                        theatre = theatre.label(),
                        attempt, "Attempt {} failed for {}: {}", attempt, url, e
                    );
                    if attempt >= max_attempts {
                        return Probe::Exhausted {
                            attempts: attempt,
                            last_error: e,
                        };
                    }
                    tokio::time::sleep(self.retry.backoff()).await;
                }
            }
        }
    }
}
