//! Poll orchestrator.
//!
//! Runs one sequential pass over the configured theatres using a single
//! browser session, alerting at most once per (date, movie, theatre).

mod runner;
mod types;

pub use runner::PollOrchestrator;
pub use types::{FatalRunError, RunContext, RunReport, TheatreOutcome, TheatreReport};
