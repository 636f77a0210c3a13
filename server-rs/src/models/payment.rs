use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Created,
    Approved,
    /// The order completed but the capture has not settled yet.
    Pending,
    Captured,
    Failed,
}

impl PaymentStatus {
    /// Maps a PayPal order status, refined by the first capture's status when
    /// the provider reports one.
    pub fn from_provider(order_status: &str, capture_status: Option<&str>) -> Self {
        match order_status {
            "CREATED" | "SAVED" | "PAYER_ACTION_REQUIRED" => Self::Created,
            "APPROVED" => Self::Approved,
            "COMPLETED" => match capture_status {
                None | Some("COMPLETED") => Self::Captured,
                Some("DECLINED") | Some("FAILED") => Self::Failed,
                Some(_) => Self::Pending,
            },
            _ => Self::Failed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    pub currency_code: String,
    pub value: String,
}

impl Money {
    pub fn new(currency_code: &str, whole_units: u32) -> Self {
        Self {
            currency_code: currency_code.to_string(),
            value: format!("{whole_units}.00"),
        }
    }

    /// Whole units when the fractional part is zero ("250.00" -> 250).
    pub fn whole_units(&self) -> Option<u32> {
        let (whole, fraction) = match self.value.trim().split_once('.') {
            Some((w, f)) => (w, f),
            None => (self.value.trim(), ""),
        };
        if !fraction.chars().all(|c| c == '0') {
            return None;
        }
        whole.parse().ok()
    }

    pub fn matches(&self, currency_code: &str, whole_units: u32) -> bool {
        self.currency_code.eq_ignore_ascii_case(currency_code)
            && self.whole_units() == Some(whole_units)
    }
}

/// Order state as reported by the provider's own API.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderDetails {
    pub id: String,
    pub status: PaymentStatus,
    pub provider_status: String,
    pub amount: Option<Money>,
    pub raw: Value,
}

impl OrderDetails {
    /// Reads the fields the workflow relies on out of an Orders v2 payload.
    /// Capture responses carry the settled amount under
    /// `purchase_units[0].payments.captures[0]`; order lookups under
    /// `purchase_units[0].amount`.
    pub fn from_provider(raw: Value) -> Option<Self> {
        let id = raw["id"].as_str()?.to_string();
        let provider_status = raw["status"].as_str().unwrap_or("UNKNOWN").to_string();
        let unit = &raw["purchase_units"][0];
        let capture = &unit["payments"]["captures"][0];

        let capture_status = capture["status"].as_str();
        let amount = serde_json::from_value::<Money>(capture["amount"].clone())
            .or_else(|_| serde_json::from_value::<Money>(unit["amount"].clone()))
            .ok();

        Some(Self {
            id,
            status: PaymentStatus::from_provider(&provider_status, capture_status),
            provider_status,
            amount,
            raw,
        })
    }
}

/// Outcome of the server-side verify/capture round trip for one order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResult {
    pub order_id: String,
    pub status: PaymentStatus,
    pub amount: Option<Money>,
    #[serde(skip)]
    pub raw_provider_payload: Value,
}

impl PaymentResult {
    pub fn is_captured(&self) -> bool {
        self.status == PaymentStatus::Captured
    }
}

impl From<OrderDetails> for PaymentResult {
    fn from(order: OrderDetails) -> Self {
        Self {
            order_id: order.id,
            status: order.status,
            amount: order.amount,
            raw_provider_payload: order.raw,
        }
    }
}
