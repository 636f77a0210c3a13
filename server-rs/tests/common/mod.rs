#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

use herscape_api::config::Config;
use herscape_api::models::OrderDetails;
use herscape_api::services::mailer::EmailError;
use herscape_api::services::{
    EmailMessage, EmailSender, OrderIntent, PaymentError, PaymentGateway,
};
use herscape_api::{build_router, AppState};

/// Records every message; fails sends addressed to `fail_for`.
#[derive(Default)]
pub struct FakeMailer {
    pub sent: Mutex<Vec<EmailMessage>>,
    pub fail_for: Option<String>,
}

impl FakeMailer {
    pub fn failing_for(recipient: &str) -> Self {
        Self {
            fail_for: Some(recipient.to_string()),
            ..Self::default()
        }
    }

    pub fn messages(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailSender for FakeMailer {
    async fn send(&self, message: &EmailMessage) -> Result<Value, EmailError> {
        self.sent.lock().unwrap().push(message.clone());
        if self.fail_for.as_deref() == message.to.first().map(String::as_str) {
            return Err(EmailError::Provider {
                status: 500,
                body: "provider exploded".into(),
            });
        }
        Ok(json!({ "id": format!("email-{}", self.sent.lock().unwrap().len()) }))
    }
}

/// PayPal stand-in: orders report `order_status` until captured, and every
/// amount is `amount` USD.
pub struct FakeGateway {
    pub order_status: &'static str,
    pub amount: u32,
    pub fail_with: Option<u16>,
    pub verifies: AtomicUsize,
    pub captures: AtomicUsize,
    pub created: Mutex<Vec<OrderIntent>>,
}

impl FakeGateway {
    pub fn new(order_status: &'static str, amount: u32) -> Self {
        Self {
            order_status,
            amount,
            fail_with: None,
            verifies: AtomicUsize::new(0),
            captures: AtomicUsize::new(0),
            created: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(status: u16) -> Self {
        Self {
            fail_with: Some(status),
            ..Self::new("APPROVED", 0)
        }
    }

    fn order(&self, order_id: &str, status: &str) -> Result<OrderDetails, PaymentError> {
        if let Some(status) = self.fail_with {
            return Err(PaymentError::Provider {
                status,
                body: "{\"debug_id\":\"abc123\"}".into(),
            });
        }
        let amount = json!({ "currency_code": "USD", "value": format!("{}.00", self.amount) });
        Ok(OrderDetails::from_provider(json!({
            "id": order_id,
            "status": status,
            "purchase_units": [{ "amount": amount }],
        }))
        .expect("fake order has an id"))
    }

    pub fn verify_count(&self) -> usize {
        self.verifies.load(Ordering::SeqCst)
    }

    pub fn capture_count(&self) -> usize {
        self.captures.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    fn currency(&self) -> &str {
        "USD"
    }

    async fn create_order(&self, intent: &OrderIntent) -> Result<OrderDetails, PaymentError> {
        self.created.lock().unwrap().push(intent.clone());
        self.order("ORDER-NEW", "CREATED")
    }

    async fn verify_order(&self, order_id: &str) -> Result<OrderDetails, PaymentError> {
        self.verifies.fetch_add(1, Ordering::SeqCst);
        self.order(order_id, self.order_status)
    }

    async fn capture_order(&self, order_id: &str) -> Result<OrderDetails, PaymentError> {
        self.captures.fetch_add(1, Ordering::SeqCst);
        self.order(order_id, "COMPLETED")
    }
}

pub fn router(
    config: Config,
    gateway: Option<Arc<FakeGateway>>,
    mailer: Option<Arc<FakeMailer>>,
) -> Router {
    let payments = gateway.map(|g| g as Arc<dyn PaymentGateway>);
    let mailer = mailer.map(|m| m as Arc<dyn EmailSender>);
    build_router(AppState::new(config, payments, mailer))
}

pub async fn call(router: Router, method: &str, uri: &str, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

pub fn payment_required_config() -> Config {
    let mut config = Config::default();
    config.workflow.payment_required = true;
    config
}
