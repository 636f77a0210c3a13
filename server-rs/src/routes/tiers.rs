use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::models::TierCatalog;
use crate::AppState;

pub async fn list_tiers(State(state): State<AppState>) -> Json<Value> {
    let tiers: Vec<_> = TierCatalog::standard().listed(state.config.mode).collect();
    Json(json!({ "success": true, "data": tiers }))
}
