use axum::{
    routing::{get, post},
    Router,
};
use http::{header, HeaderValue, Method};
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use models::TierCatalog;
use services::{EmailSender, JoinWorkflow, NotificationDispatcher, PaymentGateway, PaymentPolicy};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub workflow: Arc<JoinWorkflow>,
    pub payments: Option<Arc<dyn PaymentGateway>>,
}

impl AppState {
    /// Wires the join workflow from configuration and whichever provider
    /// clients could be built.
    pub fn new(
        config: Config,
        payments: Option<Arc<dyn PaymentGateway>>,
        mailer: Option<Arc<dyn EmailSender>>,
    ) -> Self {
        let notifier = NotificationDispatcher::new(mailer, &config.email, config.bank.clone());
        let workflow = JoinWorkflow::new(
            TierCatalog::standard(),
            config.mode,
            PaymentPolicy::from_flag(config.workflow.payment_required),
            payments.clone(),
            notifier,
        );

        Self {
            config: Arc::new(config),
            workflow: Arc::new(workflow),
            payments,
        }
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);
    if allowed.is_empty() {
        cors.allow_origin(Any)
    } else {
        cors.allow_origin(AllowOrigin::list(allowed))
    }
}

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/join", post(routes::join::submit_join))
        .route(
            "/paypal",
            post(routes::paypal::order_action).put(routes::paypal::webhook),
        )
        .route("/paypal/orders", post(routes::paypal::create_order))
        .route("/tiers", get(routes::tiers::list_tiers));

    Router::new()
        .nest("/api", api)
        .route("/health", get(routes::health::health))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
