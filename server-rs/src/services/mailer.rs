use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use crate::config::EmailConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("email provider returned {status}")]
    Provider { status: u16, body: String },

    #[error("email provider timed out")]
    Timeout,

    #[error("email request failed: {0}")]
    Transport(String),
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Sends one message, returning the provider's acknowledgement.
    async fn send(&self, message: &EmailMessage) -> Result<Value, EmailError>;
}

/// Resend HTTP API client.
#[derive(Clone)]
pub struct ResendClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl ResendClient {
    pub fn new(config: &EmailConfig, timeout: Duration) -> Option<Self> {
        let api_key = match config.api_key() {
            Ok(key) => key.to_string(),
            Err(err) => {
                tracing::warn!(error = %err, "email delivery disabled");
                return None;
            }
        };

        let client = match reqwest::Client::builder().timeout(timeout).build() {
            Ok(client) => client,
            Err(err) => {
                tracing::error!(error = %err, "failed to build Resend HTTP client");
                return None;
            }
        };

        Some(Self {
            api_key,
            base_url: config.base_url(),
            client,
        })
    }
}

#[async_trait]
impl EmailSender for ResendClient {
    async fn send(&self, message: &EmailMessage) -> Result<Value, EmailError> {
        let url = format!("{}/emails", self.base_url);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(message)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    EmailError::Timeout
                } else {
                    EmailError::Transport(e.to_string())
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(EmailError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        Ok(resp.json().await.unwrap_or(Value::Null))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_matches_resend_payload_shape() {
        let message = EmailMessage {
            from: "Herscape <contact@herscape.org>".into(),
            to: vec!["jane@x.com".into()],
            subject: "Hello".into(),
            html: "<p>Hi</p>".into(),
            reply_to: None,
        };
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["to"][0], "jane@x.com");
        assert!(value.get("reply_to").is_none());
    }

    #[test]
    fn client_needs_an_api_key() {
        let timeout = Duration::from_secs(5);
        assert!(ResendClient::new(&EmailConfig::default(), timeout).is_none());
        let config = EmailConfig {
            api_key: "re_test".into(),
            ..EmailConfig::default()
        };
        let client = ResendClient::new(&config, timeout).unwrap();
        assert_eq!(client.base_url, "https://api.resend.com");
    }
}
