use axum::{extract::State, Json};
use bytes::Bytes;
use serde_json::{json, Value};

use crate::error::AppResult;
use crate::models::JoinSubmission;
use crate::routes::parse_json_body;
use crate::AppState;

pub async fn submit_join(State(state): State<AppState>, body: Bytes) -> AppResult<Json<Value>> {
    let submission: JoinSubmission = parse_json_body(&body)?;
    let tier = submission.tier.clone();

    let confirmation = match state.workflow.submit(submission).await {
        Ok(confirmation) => confirmation,
        Err(err) => {
            tracing::warn!(tier = tier.as_deref(), state = err.state(), error = %err, "join application rejected");
            return Err(err.into());
        }
    };

    // Provider payloads stay server-side in live mode.
    let expose = state.config.expose_provider_details();
    let mut data = if expose {
        json!(confirmation.acknowledgements)
    } else {
        json!({})
    };
    if let Some(payment) = &confirmation.payment {
        data["payment"] = json!(payment);
        if expose {
            data["payment"]["provider"] = payment.raw_provider_payload.clone();
        }
    }

    Ok(Json(json!({
        "success": true,
        "message": confirmation.message,
        "tier": confirmation.tier,
        "paymentAmount": confirmation.payment_amount,
        "paid": confirmation.paid,
        "data": data,
    })))
}
