//! Backend API Seam
//!
//! Trait over the Storefront REST backend, as consumed by the checkout flow
//! and the subscription gate. The production implementation lives in
//! `storefront-api`; [`MockBackend`] covers tests.

mod mock;

pub use mock::MockBackend;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use storefront_core::{BusinessVertical, Subscription, UserProfile};

use crate::error::Result;
use crate::gateway::PaymentConfirmation;
use crate::plan::{BillingCycle, Plan};

/// Request to create a payment order
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    /// Plan name being purchased
    pub plan: String,

    pub vertical: BusinessVertical,
    pub cycle: BillingCycle,

    /// Enable autopay on the resulting subscription
    pub autopay: bool,

    /// GST registration number, for tax invoices
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gstin: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_legal_name: Option<String>,
}

/// The gateway order created by the backend
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderInfo {
    pub id: String,

    /// Amount in minor currency units (paise)
    pub amount_minor: i64,

    pub currency: String,
}

/// Response to order creation
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    pub order: OrderInfo,

    /// Publishable gateway key for the widget
    pub key_id: String,

    /// When set, the gateway widget is bypassed and the payment is simulated
    pub test_mode: bool,
}

/// Authoritative verification verdict from the backend
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOutcome {
    pub success: bool,

    /// Amount actually captured, in rupees
    #[serde(default)]
    pub paid_amount: Option<Decimal>,

    /// New subscription end date after this payment
    #[serde(default)]
    pub subscription_end: Option<DateTime<Utc>>,

    /// Rejection reason, when `success` is false
    #[serde(default)]
    pub message: Option<String>,
}

/// The Storefront REST backend, as seen by this crate
#[async_trait]
pub trait BackendApi: Send + Sync {
    /// Plans available to a tenant in `vertical`
    async fn fetch_plans(&self, vertical: BusinessVertical) -> Result<Vec<Plan>>;

    /// Create a payment order for the gateway
    async fn create_order(&self, request: &CreateOrderRequest) -> Result<CreateOrderResponse>;

    /// Verify a gateway confirmation server-side
    ///
    /// This is the source of truth: a widget success callback means nothing
    /// until this accepts it.
    async fn verify_payment(&self, confirmation: &PaymentConfirmation) -> Result<VerifyOutcome>;

    /// Settle a test-mode order without a gateway session
    async fn simulate_test_payment(&self, order_id: &str) -> Result<VerifyOutcome>;

    /// Current tenant subscription
    ///
    /// `Ok(None)` means the tenant exists without a subscription record;
    /// [`PaymentError::BackendNotFound`](crate::PaymentError::BackendNotFound)
    /// means there is no tenant record at all (admins commonly hit this).
    async fn fetch_subscription(&self) -> Result<Option<Subscription>>;

    /// The signed-in user
    async fn current_user(&self) -> Result<UserProfile>;
}
