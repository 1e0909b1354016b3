//! Storefront Development Backend
//!
//! In-memory reference implementation of the REST surface the checkout flow
//! talks to: plan catalog, order creation, server-side payment verification,
//! and the tenant subscription record.

pub mod catalog;
pub mod handlers;
pub mod state;

pub use state::{AppState, ServerConfig};

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::handlers::{
    create_order, get_plans, get_storefront, get_user, health_check, simulate_payment,
    verify_payment,
};

/// The full route surface mounted on `state`
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/api/plans", get(get_plans))
        .route("/api/payment/order", post(create_order))
        .route("/api/payment/verify", post(verify_payment))
        .route("/api/payment/simulate", post(simulate_payment))
        .route("/api/storefront", get(get_storefront))
        .route("/api/user", get(get_user))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
