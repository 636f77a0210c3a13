pub mod health;
pub mod join;
pub mod paypal;
pub mod tiers;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde_json::error::Category;

use crate::error::AppError;
use crate::models::FieldErrors;

/// Bodies arrive as raw bytes so a shape mismatch (400) can be told apart
/// from JSON that does not parse at all (500).
pub(crate) fn parse_json_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, AppError> {
    serde_json::from_slice(body).map_err(|err| match err.classify() {
        Category::Data => AppError::InvalidForm(FieldErrors::new()),
        _ => AppError::Unexpected(format!("request body is not valid JSON: {err}")),
    })
}
