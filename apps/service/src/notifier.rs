//! Outbound alert delivery.
//!
//! Delivery failures are logged by callers and never retried; the next
//! state transition produces the next message.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::config;

/// Twilio caps message bodies at 1600 characters
const MAX_MESSAGE_LENGTH: usize = 1600;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("invalid notification parameter: {0}")]
    InvalidInput(&'static str),

    #[error("sms gateway request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("sms gateway rejected the message with status {0}")]
    Rejected(u16),
}

/// Delivers a human-readable message to a user
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, phone: &str, message: &str) -> Result<(), NotifyError>;
}

/// SMS delivery through the Twilio Messages API
pub struct TwilioNotifier {
    client: reqwest::Client,
    account_sid: String,
    auth_token: String,
    from_phone: String,
}

impl TwilioNotifier {
    pub fn new(config: &config::Twilio) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            account_sid: config.account_sid.clone(),
            auth_token: config.auth_token.clone(),
            from_phone: config.from_phone.clone(),
        })
    }
}

#[async_trait]
impl Notifier for TwilioNotifier {
    async fn notify(&self, phone: &str, message: &str) -> Result<(), NotifyError> {
        let phone = phone.trim();
        if phone.len() != 10 {
            return Err(NotifyError::InvalidInput("phone"));
        }
        let message = message.trim();
        if message.is_empty() || message.len() > MAX_MESSAGE_LENGTH {
            return Err(NotifyError::InvalidInput("message"));
        }

        let url = format!(
            "https://api.twilio.com/2010-04-01/Accounts/{}/Messages.json",
            self.account_sid
        );
        let to = format!("+1{phone}");
        let params = [("From", self.from_phone.as_str()), ("To", to.as_str()), ("Body", message)];

        let response = self
            .client
            .post(url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&params)
            .send()
            .await?;

        match response.status().as_u16() {
            200 | 201 => Ok(()),
            code => Err(NotifyError::Rejected(code)),
        }
    }
}
