use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;
use uuid::Uuid;

use crate::config::{ConfigError, DeploymentMode, PaymentConfig};
use crate::models::{Money, OrderDetails, Tier};

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("PayPal credentials not configured: {0}")]
    NotConfigured(#[from] ConfigError),

    #[error("Failed to get PayPal access token: {status}")]
    Auth { status: u16, body: String },

    #[error("PayPal request failed: {status}")]
    Provider { status: u16, body: String },

    #[error("PayPal request timed out")]
    Timeout,

    #[error("PayPal request failed: {0}")]
    Transport(String),

    #[error("Unexpected PayPal response: {0}")]
    Decode(String),

    #[error("Order {order_id} was not captured (status {status})")]
    NotCaptured { order_id: String, status: String },

    #[error("Order {order_id} amount does not match the {tier} tier")]
    AmountMismatch { order_id: String, tier: String },
}

impl PaymentError {
    fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// The order a payer is asked to approve: one purchase unit priced from the
/// tier catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderIntent {
    pub amount: Money,
    pub description: String,
    pub reference_id: String,
}

impl OrderIntent {
    pub fn for_tier(tier: &Tier, currency: &str) -> Self {
        Self {
            amount: Money::new(currency, tier.price),
            description: format!("Herscape Founding Circle - {} Membership", tier.name),
            reference_id: format!("{}-{}", tier.id, Uuid::new_v4().simple()),
        }
    }

    fn to_provider_body(&self) -> Value {
        json!({
            "intent": "CAPTURE",
            "purchase_units": [{
                "reference_id": self.reference_id,
                "description": self.description,
                "amount": {
                    "currency_code": self.amount.currency_code,
                    "value": self.amount.value,
                },
            }],
        })
    }
}

/// Operations the join workflow needs from a payment provider.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    fn currency(&self) -> &str;

    async fn create_order(&self, intent: &OrderIntent) -> Result<OrderDetails, PaymentError>;

    async fn verify_order(&self, order_id: &str) -> Result<OrderDetails, PaymentError>;

    async fn capture_order(&self, order_id: &str) -> Result<OrderDetails, PaymentError>;
}

/// Thin PayPal Orders v2 client over raw HTTP calls. Every call fetches a
/// fresh client-credentials token.
#[derive(Clone)]
pub struct PayPalClient {
    client_id: String,
    client_secret: String,
    currency: String,
    base_url: String,
    client: reqwest::Client,
}

impl PayPalClient {
    pub fn new(config: &PaymentConfig, mode: DeploymentMode, timeout: Duration) -> Option<Self> {
        let (client_id, client_secret) = match config.credentials() {
            Ok(creds) => creds,
            Err(err) => {
                tracing::warn!(error = %err, "PayPal gateway disabled");
                return None;
            }
        };

        let client = match reqwest::Client::builder().timeout(timeout).build() {
            Ok(client) => client,
            Err(err) => {
                tracing::error!(error = %err, "failed to build PayPal HTTP client");
                return None;
            }
        };

        Some(Self {
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            currency: config.currency.clone(),
            base_url: config.base_url(mode),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn access_token(&self) -> Result<String, PaymentError> {
        let url = format!("{}/v1/oauth2/token", self.base_url);
        let resp = self
            .client
            .post(&url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(PaymentError::from_transport)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), %body, "PayPal token error");
            return Err(PaymentError::Auth {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| PaymentError::Decode(e.to_string()))?;
        body["access_token"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| PaymentError::Decode("token response has no access_token".into()))
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<OrderDetails, PaymentError> {
        let token = self.access_token().await?;
        let resp = request
            .bearer_auth(token)
            .send()
            .await
            .map_err(PaymentError::from_transport)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), %body, "PayPal API error");
            return Err(PaymentError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| PaymentError::Decode(e.to_string()))?;
        OrderDetails::from_provider(body)
            .ok_or_else(|| PaymentError::Decode("order response has no id".into()))
    }

    fn order_url(&self, order_id: &str) -> String {
        format!("{}/v2/checkout/orders/{}", self.base_url, order_id)
    }
}

#[async_trait]
impl PaymentGateway for PayPalClient {
    fn currency(&self) -> &str {
        &self.currency
    }

    async fn create_order(&self, intent: &OrderIntent) -> Result<OrderDetails, PaymentError> {
        let url = format!("{}/v2/checkout/orders", self.base_url);
        tracing::info!(reference_id = %intent.reference_id, amount = %intent.amount.value, "creating PayPal order");
        self.send(self.client.post(&url).json(&intent.to_provider_body()))
            .await
    }

    async fn verify_order(&self, order_id: &str) -> Result<OrderDetails, PaymentError> {
        tracing::info!(order_id, "verifying PayPal order");
        let order = self.send(self.client.get(self.order_url(order_id))).await?;
        tracing::info!(order_id, status = %order.provider_status, "PayPal order verified");
        Ok(order)
    }

    async fn capture_order(&self, order_id: &str) -> Result<OrderDetails, PaymentError> {
        tracing::info!(order_id, "capturing PayPal order");
        let url = format!("{}/capture", self.order_url(order_id));
        let order = self.send(self.client.post(&url).json(&json!({}))).await?;
        tracing::info!(order_id, status = %order.provider_status, "PayPal order captured");
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TierCatalog;

    fn configured() -> PaymentConfig {
        PaymentConfig {
            client_id: "client".into(),
            client_secret: "secret".into(),
            ..PaymentConfig::default()
        }
    }

    #[test]
    fn client_requires_both_credentials() {
        let timeout = Duration::from_secs(5);
        assert!(PayPalClient::new(&PaymentConfig::default(), DeploymentMode::Sandbox, timeout)
            .is_none());
        let half = PaymentConfig {
            client_id: "client".into(),
            ..PaymentConfig::default()
        };
        assert!(PayPalClient::new(&half, DeploymentMode::Sandbox, timeout).is_none());
        assert!(PayPalClient::new(&configured(), DeploymentMode::Sandbox, timeout).is_some());
    }

    #[test]
    fn mode_is_injected_into_the_base_url() {
        let timeout = Duration::from_secs(5);
        let sandbox = PayPalClient::new(&configured(), DeploymentMode::Sandbox, timeout).unwrap();
        assert_eq!(sandbox.base_url(), "https://api-m.sandbox.paypal.com");
        let live = PayPalClient::new(&configured(), DeploymentMode::Live, timeout).unwrap();
        assert_eq!(live.base_url(), "https://api-m.paypal.com");
        assert_eq!(
            live.order_url("ABC"),
            "https://api-m.paypal.com/v2/checkout/orders/ABC"
        );
    }

    #[test]
    fn tier_intent_prices_from_catalog() {
        let angel = TierCatalog::standard().resolve("angel").unwrap();
        let intent = OrderIntent::for_tier(angel, "USD");
        assert!(intent.amount.matches("USD", 500));
        assert!(intent.reference_id.starts_with("angel-"));

        let body = intent.to_provider_body();
        assert_eq!(body["intent"], "CAPTURE");
        assert_eq!(body["purchase_units"][0]["amount"]["value"], "500.00");
        assert_eq!(body["purchase_units"][0]["amount"]["currency_code"], "USD");
    }

    #[test]
    fn provider_errors_keep_status_but_hide_body_in_message() {
        let err = PaymentError::Provider {
            status: 422,
            body: "{\"name\":\"UNPROCESSABLE_ENTITY\"}".into(),
        };
        assert_eq!(err.to_string(), "PayPal request failed: 422");
        let err = PaymentError::from(ConfigError::Missing("PAYPAL_CLIENT_SECRET"));
        assert!(err.to_string().contains("PAYPAL_CLIENT_SECRET"));
    }
}
