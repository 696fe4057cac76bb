//! Orchestrator types.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::config::{Config, TheatreSpec};
use crate::fetcher::SessionError;
use crate::ledger::{AlertKey, LedgerError};

/// Immutable inputs for one run.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub movie_name: String,
    pub date: String,
    pub theatres: Vec<TheatreSpec>,
    pub headless: bool,
}

impl RunContext {
    pub fn new(
        movie_name: impl Into<String>,
        date: impl Into<String>,
        theatres: Vec<TheatreSpec>,
        headless: bool,
    ) -> Self {
        Self {
            movie_name: movie_name.into().trim().to_string(),
            date: date.into().trim().to_string(),
            theatres,
            headless,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.movie_name.as_str(),
            config.date.as_str(),
            config.theatres.clone(),
            config.headless,
        )
    }

    pub fn alert_key(&self, theatre: &TheatreSpec) -> AlertKey {
        AlertKey::new(&self.date, &self.movie_name, &theatre.code)
    }
}

/// How a theatre ended up in one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TheatreOutcome {
    /// Already alerted in an earlier run.
    Skipped,
    /// Movie found; key recorded. `notified` is false if the send failed.
    Alerted { notified: bool },
    /// Page loaded but the movie is not listed.
    NotFound,
    /// Every fetch attempt failed.
    FailedAfterRetries { attempts: u32, last_error: String },
}

impl TheatreOutcome {
    /// Stable name for log fields, matching the serialized tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            TheatreOutcome::Skipped => "skipped",
            TheatreOutcome::Alerted { .. } => "alerted",
            TheatreOutcome::NotFound => "not_found",
            TheatreOutcome::FailedAfterRetries { .. } => "failed_after_retries",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TheatreReport {
    pub code: String,
    pub slug: String,
    #[serde(flatten)]
    pub outcome: TheatreOutcome,
}

/// Summary of a completed run, theatres in configured order.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub theatres: Vec<TheatreReport>,
}

impl RunReport {
    fn count(&self, pred: impl Fn(&TheatreOutcome) -> bool) -> usize {
        self.theatres.iter().filter(|t| pred(&t.outcome)).count()
    }

    pub fn alerted(&self) -> usize {
        self.count(|o| matches!(o, TheatreOutcome::Alerted { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, TheatreOutcome::Skipped))
    }

    pub fn not_found(&self) -> usize {
        self.count(|o| matches!(o, TheatreOutcome::NotFound))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, TheatreOutcome::FailedAfterRetries { .. }))
    }

    pub fn outcome(&self, code: &str) -> Option<&TheatreOutcome> {
        self.theatres
            .iter()
            .find(|t| t.code == code)
            .map(|t| &t.outcome)
    }
}

/// Errors that abort a run.
#[derive(Debug, Error)]
pub enum FatalRunError {
    #[error(transparent)]
    SessionInit(#[from] SessionError),

    #[error("Failed to record alert {key}: {source}")]
    LedgerWrite {
        key: AlertKey,
        #[source]
        source: LedgerError,
    },
}
