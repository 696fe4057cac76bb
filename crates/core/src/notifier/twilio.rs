//! Twilio SMS notifier.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::{NotifierConfig, TwilioCredentials};

use super::{alert_body, NotificationError, Notifier, SendReceipt, SendResult};

/// Sends alerts as SMS through the Twilio Messages API.
pub struct TwilioNotifier {
    client: Client,
    api_base: String,
    credentials: TwilioCredentials,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    sid: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    code: Option<u32>,
    message: String,
}

impl TwilioNotifier {
    /// Create a new Twilio notifier.
    pub fn new(
        credentials: TwilioCredentials,
        config: &NotifierConfig,
    ) -> Result<Self, NotificationError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| NotificationError::Network(e.to_string()))?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.api_base,
            urlencoding::encode(&self.credentials.account_sid)
        )
    }

    async fn send(&self, body: &str) -> SendResult {
        let url = self.messages_url();
        debug!(to = %self.credentials.to, "Sending SMS via Twilio");

        let response = self
            .client
            .post(&url)
            .basic_auth(
                &self.credentials.account_sid,
                Some(&self.credentials.auth_token),
            )
            .form(&[
                ("To", self.credentials.to.as_str()),
                ("From", self.credentials.from.as_str()),
                ("Body", body),
            ])
            .send()
            .await
            .map_err(|e| NotificationError::Network(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(NotificationError::Authentication {
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<ErrorResponse>(&text) {
                Ok(err) => match err.code {
                    Some(code) => format!("{} (code {})", err.message, code),
                    None => err.message,
                },
                Err(_) => text.chars().take(200).collect(),
            };
            return Err(NotificationError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let message: MessageResponse = response
            .json()
            .await
            .map_err(|e| NotificationError::InvalidResponse(e.to_string()))?;

        Ok(SendReceipt {
            message_id: message.sid,
        })
    }
}

#[async_trait]
impl Notifier for TwilioNotifier {
    fn name(&self) -> &str {
        "twilio"
    }

    async fn notify(&self, movie_name: &str, theatre_label: &str, date: &str) -> SendResult {
        let receipt = self
            .send(&alert_body(movie_name, theatre_label, date))
            .await?;
        info!("SMS sent: {}", receipt.message_id);
        Ok(receipt)
    }
}
