//! HTTP Handlers

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use storefront_core::{BusinessVertical, Subscription, UserProfile};
use storefront_payments::{
    verify_signature, CreateOrderRequest, CreateOrderResponse, OrderInfo, PaymentConfirmation,
    Plan, PlanResolver, VerifyOutcome,
};

use crate::catalog::PendingOrder;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub test_mode: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct PlansQuery {
    #[serde(default)]
    pub vertical: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulateRequest {
    pub order_id: String,
}

#[derive(Debug, Serialize)]
pub struct StorefrontResponse {
    pub subscription: Option<Subscription>,
}

type HandlerError = (StatusCode, Json<ErrorResponse>);

fn bad_request(error: impl Into<String>, code: &str) -> HandlerError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: error.into(),
            code: code.into(),
        }),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        test_mode: state.config.test_mode,
    })
}

/// Plans offered to a vertical
pub async fn get_plans(
    State(state): State<AppState>,
    Query(query): Query<PlansQuery>,
) -> Result<Json<Vec<Plan>>, HandlerError> {
    let vertical = match query.vertical {
        Some(label) => BusinessVertical::from_label(&label)
            .map_err(|e| bad_request(e.to_string(), "UNKNOWN_VERTICAL"))?,
        None => BusinessVertical::All,
    };

    let plans: Vec<Plan> = state
        .catalog
        .iter()
        .filter(|p| p.vertical.offers_to(vertical))
        .cloned()
        .collect();
    Ok(Json(plans))
}

/// Create a gateway order for a plan purchase
pub async fn create_order(
    State(state): State<AppState>,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<Json<CreateOrderResponse>, HandlerError> {
    let purchasable = PlanResolver::purchasable(&state.catalog, payload.vertical);
    let plan = PlanResolver::select(&purchasable, &payload.plan)
        .ok_or_else(|| bad_request("No purchasable plan available", "PLAN_UNAVAILABLE"))?;

    let amount = plan.amount_for(payload.cycle);
    let amount_minor = (amount * dec!(100)).to_i64().ok_or_else(|| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "Order amount out of range".into(),
                code: "AMOUNT_OVERFLOW".into(),
            }),
        )
    })?;

    let order = PendingOrder {
        id: format!("order_{}", uuid::Uuid::new_v4().simple()),
        plan_name: plan.name.clone(),
        monthly_price: plan.effective_monthly_price(),
        cycle: payload.cycle,
        amount,
        autopay: payload.autopay,
        paid: false,
    };
    let info = OrderInfo {
        id: order.id.clone(),
        amount_minor,
        currency: "INR".into(),
    };

    tracing::info!(
        order_id = %order.id,
        plan = %order.plan_name,
        cycle = %order.cycle,
        amount_minor,
        "order created"
    );
    state.orders.insert(order);

    Ok(Json(CreateOrderResponse {
        order: info,
        key_id: state.config.key_id.clone(),
        test_mode: state.config.test_mode,
    }))
}

/// Verify a gateway confirmation and activate the subscription
///
/// The signature is recomputed here from the server-side secret; a widget
/// callback that does not carry a valid signature settles nothing.
pub async fn verify_payment(
    State(state): State<AppState>,
    Json(payload): Json<VerifyRequest>,
) -> Json<VerifyOutcome> {
    let confirmation = PaymentConfirmation {
        order_id: payload.razorpay_order_id,
        payment_id: payload.razorpay_payment_id,
        signature: payload.razorpay_signature,
    };

    let Some(order) = state.orders.get(&confirmation.order_id) else {
        return Json(rejected("Order not found"));
    };

    if !verify_signature(&state.config.key_secret, &confirmation) {
        tracing::warn!(order_id = %confirmation.order_id, "invalid payment signature");
        return Json(rejected("Invalid payment signature"));
    }

    if !state.orders.mark_paid(&order.id) {
        return Json(rejected("Order already settled"));
    }

    let end = state.tenant.activate(&order, Utc::now());
    tracing::info!(
        order_id = %order.id,
        payment_id = %confirmation.payment_id,
        plan = %order.plan_name,
        "payment verified, subscription active until {end}"
    );

    Json(VerifyOutcome {
        success: true,
        paid_amount: Some(order.amount),
        subscription_end: Some(end),
        message: None,
    })
}

/// Settle a test-mode order without a gateway session
pub async fn simulate_payment(
    State(state): State<AppState>,
    Json(payload): Json<SimulateRequest>,
) -> Result<Json<VerifyOutcome>, HandlerError> {
    if !state.config.test_mode {
        return Err((
            StatusCode::FORBIDDEN,
            Json(ErrorResponse {
                error: "Test mode is not enabled".into(),
                code: "TEST_MODE_DISABLED".into(),
            }),
        ));
    }

    let Some(order) = state.orders.get(&payload.order_id) else {
        return Ok(Json(rejected("Order not found")));
    };
    if !state.orders.mark_paid(&order.id) {
        return Ok(Json(rejected("Order already settled")));
    }

    let end = state.tenant.activate(&order, Utc::now());
    tracing::info!(order_id = %order.id, plan = %order.plan_name, "test payment simulated");

    Ok(Json(VerifyOutcome {
        success: true,
        paid_amount: Some(order.amount),
        subscription_end: Some(end),
        message: None,
    }))
}

/// The tenant storefront record
pub async fn get_storefront(State(state): State<AppState>) -> Json<StorefrontResponse> {
    Json(StorefrontResponse {
        subscription: state.tenant.subscription(),
    })
}

/// The signed-in user
pub async fn get_user(State(state): State<AppState>) -> Json<UserProfile> {
    Json((*state.user).clone())
}

fn rejected(message: &str) -> VerifyOutcome {
    VerifyOutcome {
        success: false,
        paid_amount: None,
        subscription_end: None,
        message: Some(message.into()),
    }
}
