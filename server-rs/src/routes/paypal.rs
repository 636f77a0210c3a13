use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::error::{failure, AppError, AppResult};
use crate::models::TierCatalog;
use crate::routes::parse_json_body;
use crate::services::{OrderIntent, PaymentError, PaymentGateway};
use crate::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OrderAction {
    Verify,
    Capture,
}

impl OrderAction {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "verify" => Some(Self::Verify),
            "capture" => Some(Self::Capture),
            _ => None,
        }
    }
}

fn gateway(state: &AppState) -> Result<&Arc<dyn PaymentGateway>, PaymentError> {
    match &state.payments {
        Some(gateway) => Ok(gateway),
        None => Err(match state.config.payment.credentials() {
            Err(missing) => PaymentError::NotConfigured(missing),
            Ok(_) => PaymentError::Transport("payment gateway unavailable".into()),
        }),
    }
}

/// `POST /api/paypal`: verify or capture an order the payer approved.
/// Provider failures come back with their description, never the raw body.
pub async fn order_action(State(state): State<AppState>, body: Bytes) -> AppResult<Response> {
    let payload: Value = parse_json_body(&body)?;

    let order_id = payload
        .get("orderID")
        .or_else(|| payload.get("orderId"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|id| !id.is_empty());
    let Some(order_id) = order_id else {
        return Err(AppError::BadRequest("Order ID is required.".into()));
    };
    let Some(action) = payload["action"].as_str().and_then(OrderAction::parse) else {
        return Err(AppError::BadRequest("Invalid action.".into()));
    };

    let result = match gateway(&state) {
        Ok(gateway) => match action {
            OrderAction::Verify => gateway.verify_order(order_id).await,
            OrderAction::Capture => gateway.capture_order(order_id).await,
        },
        Err(err) => Err(err),
    };

    match result {
        Ok(order) => Ok(Json(json!({ "success": true, "data": order.raw })).into_response()),
        Err(err) => {
            tracing::error!(order_id, ?action, error = ?err, "PayPal order action failed");
            Ok(failure(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    #[serde(default, alias = "tierId")]
    pub tier: Option<String>,
}

/// `POST /api/paypal/orders`: opens an order priced from the tier catalog.
pub async fn create_order(State(state): State<AppState>, body: Bytes) -> AppResult<Json<Value>> {
    let request: CreateOrderRequest = parse_json_body(&body)?;
    let tier_id = request.tier.unwrap_or_default();
    let tier = TierCatalog::standard()
        .resolve_for(&tier_id, state.config.mode)
        .map_err(|_| AppError::InvalidTier)?;

    let gateway = gateway(&state).map_err(|err| match err {
        PaymentError::NotConfigured(missing) => AppError::Configuration(missing),
        other => AppError::Payment(other),
    })?;
    let intent = OrderIntent::for_tier(tier, gateway.currency());
    let order = gateway.create_order(&intent).await?;

    tracing::info!(order_id = %order.id, tier = tier.id, "PayPal order created");
    Ok(Json(json!({
        "success": true,
        "data": { "id": order.id, "status": order.provider_status },
    })))
}

/// `PUT /api/paypal`: asynchronous provider events. Acknowledged once the
/// body parses, whether or not the event type is known.
pub async fn webhook(body: Bytes) -> Response {
    let event: Value = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(err) => {
            tracing::error!(error = %err, "PayPal webhook body could not be parsed");
            return failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Webhook processing failed.",
            );
        }
    };

    let event_type = event["event_type"].as_str().unwrap_or("");
    let resource_id = event["resource"]["id"].as_str().unwrap_or("");
    match event_type {
        "PAYMENT.CAPTURE.COMPLETED" => {
            tracing::info!(resource_id, "PayPal capture completed");
        }
        "PAYMENT.CAPTURE.DENIED" => {
            tracing::warn!(resource_id, "PayPal capture denied");
        }
        other => {
            tracing::info!(event_type = other, "unhandled PayPal webhook event");
        }
    }

    Json(json!({ "success": true })).into_response()
}
