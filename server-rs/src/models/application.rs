use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Raw join form body as posted by the join page. Every field is optional
/// here; [`crate::services::validation`] decides what is required.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinSubmission {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default, alias = "tierId")]
    pub tier: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub linkedin: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default, rename = "orderID", alias = "orderId")]
    pub order_id: Option<String>,
}

/// A submission that passed validation. Required fields are trimmed and
/// non-blank; optional fields are `None` rather than empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinApplication {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub tier_id: String,
    pub company: Option<String>,
    pub linkedin: Option<String>,
    pub message: Option<String>,
    pub country: Option<String>,
    pub order_id: Option<String>,
}

impl JoinApplication {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// One message per invalid field, keyed by the form field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
