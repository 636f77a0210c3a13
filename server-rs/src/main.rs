use std::sync::Arc;

use herscape_api::config::Config;
use herscape_api::services::{EmailSender, PayPalClient, PaymentGateway, ResendClient};
use herscape_api::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    let config = Config::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .json()
        .init();

    let timeout = config.workflow.provider_timeout();
    let payments = PayPalClient::new(&config.payment, config.mode, timeout)
        .map(|client| Arc::new(client) as Arc<dyn PaymentGateway>);
    let mailer = ResendClient::new(&config.email, timeout)
        .map(|client| Arc::new(client) as Arc<dyn EmailSender>);

    tracing::info!(
        mode = config.mode.as_str(),
        payment_required = config.workflow.payment_required,
        paypal_configured = payments.is_some(),
        resend_configured = mailer.is_some(),
        bank_details_configured = config.bank.is_configured(),
        "Herscape API initialized"
    );

    let addr = format!("0.0.0.0:{}", config.port);
    let state = AppState::new(config, payments, mailer);
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, router).await?;
    Ok(())
}
