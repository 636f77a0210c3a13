use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::services::PaymentPolicy;
use crate::AppState;

/// Reports which providers are wired up. Presence only; no credential
/// values or lengths.
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let payment_ok = state.payments.is_some();
    let email_ok = state.workflow.notifications_configured();

    let payment_required = state.workflow.policy() == PaymentPolicy::RequiredBeforeActivation;

    let status = if email_ok && (payment_ok || !payment_required) {
        "healthy"
    } else {
        "degraded"
    };
    Json(json!({
        "status": status,
        "mode": state.config.mode.as_str(),
        "paymentRequired": payment_required,
        "payment": { "configured": payment_ok },
        "email": { "configured": email_ok },
        "timestamp": chrono::Utc::now(),
    }))
}
