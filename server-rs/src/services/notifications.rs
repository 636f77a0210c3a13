use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::config::{BankTransferConfig, ConfigError, EmailConfig};
use crate::models::{JoinApplication, PaymentResult, Tier};
use crate::services::mailer::{EmailError, EmailMessage, EmailSender};
use crate::services::templates::{self, PaymentCopy};

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("email delivery unavailable: {0}")]
    NotConfigured(ConfigError),

    #[error("confirmation email delivery failed (admin: {}, applicant: {})", leg(.admin), leg(.applicant))]
    Delivery {
        admin: Option<EmailError>,
        applicant: Option<EmailError>,
    },
}

fn leg(err: &Option<EmailError>) -> String {
    match err {
        Some(e) => e.to_string(),
        None => "sent".to_string(),
    }
}

/// The two rendered messages for one submission.
#[derive(Debug, Clone)]
pub struct Notifications {
    pub admin: EmailMessage,
    pub applicant: EmailMessage,
}

/// Provider acknowledgements for both sends.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchResult {
    pub admin_result: Value,
    pub applicant_result: Value,
}

pub struct NotificationDispatcher {
    mailer: Option<Arc<dyn EmailSender>>,
    from: String,
    admin_recipient: String,
    bank: BankTransferConfig,
}

impl NotificationDispatcher {
    pub fn new(
        mailer: Option<Arc<dyn EmailSender>>,
        email: &EmailConfig,
        bank: BankTransferConfig,
    ) -> Self {
        Self {
            mailer,
            from: email.from.clone(),
            admin_recipient: email.admin_recipient.clone(),
            bank,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.mailer.is_some()
    }

    pub fn ensure_configured(&self) -> Result<(), NotificationError> {
        match self.mailer {
            Some(_) => Ok(()),
            None => Err(NotificationError::NotConfigured(ConfigError::Missing(
                "RESEND_API_KEY",
            ))),
        }
    }

    /// Both messages come from the same submission and tier, so they always
    /// agree on tier name and amount. Only a captured payment switches the
    /// copy to "paid".
    pub fn render(
        &self,
        app: &JoinApplication,
        tier: &Tier,
        payment: Option<&PaymentResult>,
    ) -> Notifications {
        let copy = match payment.filter(|p| p.is_captured()) {
            Some(p) => PaymentCopy::Paid(p),
            None => PaymentCopy::Deferred(&self.bank),
        };

        Notifications {
            admin: EmailMessage {
                from: self.from.clone(),
                to: vec![self.admin_recipient.clone()],
                subject: templates::admin_subject(app, tier, copy),
                html: templates::admin_body(app, tier, copy),
                reply_to: Some(app.email.clone()),
            },
            applicant: EmailMessage {
                from: self.from.clone(),
                to: vec![app.email.clone()],
                subject: templates::applicant_subject(copy),
                html: templates::applicant_body(app, tier, copy),
                reply_to: None,
            },
        }
    }

    /// Sends both messages concurrently and succeeds only if both do.
    pub async fn send(
        &self,
        app: &JoinApplication,
        tier: &Tier,
        payment: Option<&PaymentResult>,
    ) -> Result<DispatchResult, NotificationError> {
        let Some(mailer) = self.mailer.as_ref() else {
            return Err(NotificationError::NotConfigured(ConfigError::Missing(
                "RESEND_API_KEY",
            )));
        };

        let notifications = self.render(app, tier, payment);
        let (admin, applicant) = tokio::join!(
            mailer.send(&notifications.admin),
            mailer.send(&notifications.applicant)
        );

        match (admin, applicant) {
            (Ok(admin_result), Ok(applicant_result)) => {
                tracing::info!(
                    tier = tier.id,
                    admin_id = %admin_result["id"],
                    applicant_id = %applicant_result["id"],
                    "confirmation emails sent"
                );
                Ok(DispatchResult {
                    admin_result,
                    applicant_result,
                })
            }
            (admin, applicant) => {
                let admin = admin.err();
                let applicant = applicant.err();
                // No record exists anywhere else, so an operator has to follow
                // up from this log line alone.
                tracing::error!(
                    applicant_email = %app.email,
                    applicant_name = %app.full_name(),
                    tier = tier.id,
                    admin_sent = admin.is_none(),
                    applicant_sent = applicant.is_none(),
                    admin_error = ?admin,
                    applicant_error = ?applicant,
                    "confirmation email delivery failed; manual follow-up required"
                );
                Err(NotificationError::Delivery { admin, applicant })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PaymentStatus, TierCatalog};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<EmailMessage>>,
        fail_for: Option<String>,
    }

    #[async_trait]
    impl EmailSender for RecordingMailer {
        async fn send(&self, message: &EmailMessage) -> Result<Value, EmailError> {
            self.sent.lock().unwrap().push(message.clone());
            if self.fail_for.as_deref() == message.to.first().map(String::as_str) {
                return Err(EmailError::Provider {
                    status: 422,
                    body: "invalid".into(),
                });
            }
            Ok(json!({ "id": format!("email-{}", message.to[0]) }))
        }
    }

    fn application() -> JoinApplication {
        JoinApplication {
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            email: "jane@x.com".into(),
            phone: "555".into(),
            tier_id: "pioneer".into(),
            company: None,
            linkedin: None,
            message: None,
            country: None,
            order_id: None,
        }
    }

    fn dispatcher(mailer: Arc<RecordingMailer>) -> NotificationDispatcher {
        NotificationDispatcher::new(
            Some(mailer),
            &EmailConfig::default(),
            BankTransferConfig::default(),
        )
    }

    #[test]
    fn both_messages_agree_on_tier_and_amount() {
        let tier = TierCatalog::standard().resolve("pioneer").unwrap();
        let rendered = dispatcher(Arc::default()).render(&application(), tier, None);

        assert_eq!(rendered.admin.to, ["contact@herscape.org"]);
        assert_eq!(rendered.admin.reply_to.as_deref(), Some("jane@x.com"));
        assert_eq!(rendered.applicant.to, ["jane@x.com"]);
        for message in [&rendered.admin, &rendered.applicant] {
            assert!(message.html.contains("Pioneer"));
            assert!(message.html.contains("$250"));
            assert!(message.html.contains("bank transfer"));
        }
    }

    #[test]
    fn uncaptured_payment_keeps_deferred_copy() {
        let tier = TierCatalog::standard().resolve("angel").unwrap();
        let approved = PaymentResult {
            order_id: "ORDER-1".into(),
            status: PaymentStatus::Approved,
            amount: None,
            raw_provider_payload: Value::Null,
        };
        let rendered = dispatcher(Arc::default()).render(&application(), tier, Some(&approved));
        assert!(rendered.applicant.html.contains("Payment Instructions"));
        assert!(!rendered.admin.subject.contains("paid"));
    }

    #[tokio::test]
    async fn sends_both_messages() {
        let mailer = Arc::new(RecordingMailer::default());
        let tier = TierCatalog::standard().resolve("pioneer").unwrap();
        let result = dispatcher(mailer.clone())
            .send(&application(), tier, None)
            .await
            .unwrap();

        assert_eq!(result.applicant_result["id"], "email-jane@x.com");
        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert!(sent.iter().any(|m| m.to[0] == "contact@herscape.org"));
        assert!(sent.iter().any(|m| m.to[0] == "jane@x.com"));
    }

    #[tokio::test]
    async fn one_failed_leg_fails_the_dispatch() {
        let mailer = Arc::new(RecordingMailer {
            fail_for: Some("contact@herscape.org".into()),
            ..RecordingMailer::default()
        });
        let tier = TierCatalog::standard().resolve("pioneer").unwrap();
        let err = dispatcher(mailer.clone())
            .send(&application(), tier, None)
            .await
            .unwrap_err();

        match err {
            NotificationError::Delivery { admin, applicant } => {
                assert!(admin.is_some());
                assert!(applicant.is_none());
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(mailer.sent.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn missing_mailer_is_a_configuration_error() {
        let dispatcher = NotificationDispatcher::new(
            None,
            &EmailConfig::default(),
            BankTransferConfig::default(),
        );
        let tier = TierCatalog::standard().resolve("pioneer").unwrap();
        let err = dispatcher
            .send(&application(), tier, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            NotificationError::NotConfigured(ConfigError::Missing("RESEND_API_KEY"))
        ));
    }
}
