pub mod join_workflow;
pub mod mailer;
pub mod notifications;
pub mod paypal;
pub mod templates;
pub mod validation;

pub use join_workflow::{JoinConfirmation, JoinError, JoinWorkflow, PaymentPolicy};
pub use mailer::{EmailMessage, EmailSender, ResendClient};
pub use notifications::{DispatchResult, NotificationDispatcher, NotificationError};
pub use paypal::{OrderIntent, PayPalClient, PaymentError, PaymentGateway};
