use std::sync::Arc;

use crate::config::{ConfigError, DeploymentMode};
use crate::models::{
    FieldErrors, JoinApplication, JoinSubmission, PaymentResult, PaymentStatus, Tier, TierCatalog,
    TierNotFound,
};
use crate::services::notifications::{DispatchResult, NotificationDispatcher, NotificationError};
use crate::services::paypal::{PaymentError, PaymentGateway};
use crate::services::validation::{FormValidator, ValidationError};

/// Whether a captured payment must accompany the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentPolicy {
    /// Bank-transfer instructions are sent when no order reference is given.
    Deferred,
    /// An order reference and country are mandatory; nothing is sent until
    /// the provider confirms capture.
    RequiredBeforeActivation,
}

impl PaymentPolicy {
    pub fn from_flag(payment_required: bool) -> Self {
        if payment_required {
            Self::RequiredBeforeActivation
        } else {
            Self::Deferred
        }
    }

    fn requires_payment(self) -> bool {
        self == Self::RequiredBeforeActivation
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JoinError {
    #[error("invalid form data")]
    Invalid(FieldErrors),

    #[error(transparent)]
    UnknownTier(#[from] TierNotFound),

    #[error("payment reference required")]
    PaymentRequired,

    #[error(transparent)]
    Configuration(#[from] ConfigError),

    #[error(transparent)]
    Payment(#[from] PaymentError),

    #[error(transparent)]
    Notification(#[from] NotificationError),
}

impl JoinError {
    /// Terminal state name, for logs.
    pub fn state(&self) -> &'static str {
        match self {
            Self::Invalid(_) | Self::UnknownTier(_) | Self::PaymentRequired => "rejected_invalid",
            Self::Configuration(_) => "rejected_configuration",
            Self::Payment(_) => "rejected_payment_failed",
            Self::Notification(_) => "rejected_notification_failed",
        }
    }
}

impl From<ValidationError> for JoinError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::Fields(errors) => Self::Invalid(errors),
            ValidationError::UnknownTier(err) => Self::UnknownTier(err),
        }
    }
}

/// Successful completion of one submission.
#[derive(Debug, Clone)]
pub struct JoinConfirmation {
    pub message: String,
    pub tier: String,
    pub payment_amount: String,
    pub paid: bool,
    pub payment: Option<PaymentResult>,
    pub acknowledgements: DispatchResult,
}

/// Validate, resolve tier, settle payment, notify. Single forward pass; every
/// failure ends the request.
pub struct JoinWorkflow {
    catalog: &'static TierCatalog,
    mode: DeploymentMode,
    policy: PaymentPolicy,
    gateway: Option<Arc<dyn PaymentGateway>>,
    notifier: NotificationDispatcher,
}

impl JoinWorkflow {
    pub fn new(
        catalog: &'static TierCatalog,
        mode: DeploymentMode,
        policy: PaymentPolicy,
        gateway: Option<Arc<dyn PaymentGateway>>,
        notifier: NotificationDispatcher,
    ) -> Self {
        Self {
            catalog,
            mode,
            policy,
            gateway,
            notifier,
        }
    }

    pub fn policy(&self) -> PaymentPolicy {
        self.policy
    }

    /// Whether an email sender was wired in.
    pub fn notifications_configured(&self) -> bool {
        self.notifier.is_configured()
    }

    pub async fn submit(&self, submission: JoinSubmission) -> Result<JoinConfirmation, JoinError> {
        let application = FormValidator::new(self.catalog, self.mode, self.policy.requires_payment())
            .validate(&submission)?;

        let tier = self.catalog.resolve_for(&application.tier_id, self.mode)?;

        // Check configuration before touching money so a capture is never
        // followed by an unsendable confirmation.
        self.notifier
            .ensure_configured()
            .map_err(JoinError::Notification)?;

        let payment = match application.order_id.as_deref() {
            Some(order_id) => Some(self.settle_payment(order_id, tier).await?),
            None if self.policy.requires_payment() => return Err(JoinError::PaymentRequired),
            None => None,
        };

        let acknowledgements = self
            .notifier
            .send(&application, tier, payment.as_ref())
            .await?;

        let paid = payment.as_ref().is_some_and(PaymentResult::is_captured);
        tracing::info!(
            tier = tier.id,
            paid,
            order_id = payment.as_ref().map(|p| p.order_id.as_str()),
            "join application completed"
        );

        Ok(JoinConfirmation {
            message: confirmation_message(&application, tier, paid),
            tier: tier.id.to_string(),
            payment_amount: tier.price_string.clone(),
            paid,
            payment,
            acknowledgements,
        })
    }

    /// Never trusts the client's claim: the order is re-read from the
    /// provider, captured if only approved, then checked against the tier.
    async fn settle_payment(&self, order_id: &str, tier: &Tier) -> Result<PaymentResult, JoinError> {
        let gateway = self
            .gateway
            .as_ref()
            .ok_or(ConfigError::NotConfigured("payment gateway"))?;

        let order = gateway.verify_order(order_id).await?;
        let order = match order.status {
            PaymentStatus::Captured => order,
            PaymentStatus::Approved => gateway.capture_order(order_id).await?,
            PaymentStatus::Pending => {
                // Already captured on the provider side; capturing again would
                // be refused, so an operator has to reconcile it.
                tracing::error!(
                    order_id,
                    tier = tier.id,
                    provider_status = %order.provider_status,
                    "PayPal capture pending; manual follow-up required"
                );
                return Err(PaymentError::NotCaptured {
                    order_id: order_id.to_string(),
                    status: order.provider_status,
                }
                .into());
            }
            _ => {
                return Err(PaymentError::NotCaptured {
                    order_id: order_id.to_string(),
                    status: order.provider_status,
                }
                .into())
            }
        };

        if order.status != PaymentStatus::Captured {
            tracing::error!(
                order_id,
                tier = tier.id,
                provider_status = %order.provider_status,
                "PayPal order not captured"
            );
            return Err(PaymentError::NotCaptured {
                order_id: order_id.to_string(),
                status: order.provider_status,
            }
            .into());
        }

        let amount_ok = order
            .amount
            .as_ref()
            .is_some_and(|amount| amount.matches(gateway.currency(), tier.price));
        if !amount_ok {
            tracing::error!(
                order_id,
                tier = tier.id,
                amount = ?order.amount,
                "captured amount does not match tier price"
            );
            return Err(PaymentError::AmountMismatch {
                order_id: order_id.to_string(),
                tier: tier.name.to_string(),
            }
            .into());
        }

        Ok(order.into())
    }
}

fn confirmation_message(app: &JoinApplication, tier: &Tier, paid: bool) -> String {
    if paid {
        format!(
            "Thank you, {}! Your payment of {} has been received and your {} membership is now active.",
            app.first_name, tier.price_string, tier.name
        )
    } else {
        format!(
            "Your application has been received! The required contribution is {price}. \
             To complete your membership, please send {price} via bank transfer using the \
             instructions in your confirmation email. We will confirm your membership once \
             payment is received.",
            price = tier.price_string
        )
    }
}
