//! Types for the alert notification system.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// Receipt for a message the provider accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendReceipt {
    /// Provider message id.
    pub message_id: String,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NotificationError {
    #[error("Messaging provider rejected credentials (HTTP {status})")]
    Authentication { status: u16 },

    #[error("Messaging provider unreachable: {0}")]
    Network(String),

    #[error("Messaging provider rejected message (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Unexpected response from messaging provider: {0}")]
    InvalidResponse(String),
}

pub type SendResult = Result<SendReceipt, NotificationError>;

/// Sends availability alerts to a fixed recipient.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &str;

    /// Send one alert that `movie_name` is on sale at `theatre_label` on `date`.
    async fn notify(&self, movie_name: &str, theatre_label: &str, date: &str) -> SendResult;
}

/// Alert text sent for a newly listed movie.
pub fn alert_body(movie_name: &str, theatre_label: &str, date: &str) -> String {
    format!(
        "🎉 Tickets for '{}' are LIVE at {} on {}!",
        movie_name, theatre_label, date
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_body() {
        assert_eq!(
            alert_body("Dune", "pvr-a", "2025-06-01"),
            "🎉 Tickets for 'Dune' are LIVE at pvr-a on 2025-06-01!"
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            NotificationError::Rejected {
                status: 400,
                message: "invalid 'To' number".to_string()
            }
            .to_string(),
            "Messaging provider rejected message (HTTP 400): invalid 'To' number"
        );
        assert_eq!(
            NotificationError::Authentication { status: 401 }.to_string(),
            "Messaging provider rejected credentials (HTTP 401)"
        );
    }
}
