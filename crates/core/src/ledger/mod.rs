//! Alert ledger.
//!
//! Durable record of which (date, movie, theatre) combinations have already
//! been alerted, so a run never sends the same alert twice. The whole set is
//! rewritten to disk after every addition.

mod key;
mod store;

pub use key::AlertKey;
pub use store::AlertLedger;

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Failed to write ledger {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize ledger: {0}")]
    Serialize(#[from] serde_json::Error),
}
