//! Payment Gateway Integration
//!
//! Abstraction over the hosted payment widget. The orchestrator launches a
//! [`PaymentSession`] per attempt and owns it for the whole attempt; every
//! callback path closes it through the same idempotent `close()` rather than
//! a shared mutable handle.

mod mock;

pub use mock::MockGateway;

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use storefront_core::GatewayContact;

use crate::error::{PaymentError, Result};

/// How long to poll for the gateway widget before giving up
pub const GATEWAY_LOAD_TIMEOUT: Duration = Duration::from_secs(8);

const READY_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Prefilled contact shown in the gateway widget
pub type GatewayPrefill = GatewayContact;

/// Everything the widget needs to collect a payment
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GatewayOrder {
    /// Publishable gateway key
    pub key_id: String,

    /// Backend-created order identifier
    pub order_id: String,

    /// Amount in minor currency units (paise)
    pub amount_minor: i64,

    /// ISO currency code, e.g. "INR"
    pub currency: String,

    pub prefill: GatewayPrefill,

    /// Opaque metadata echoed back by the gateway
    pub notes: HashMap<String, String>,
}

/// Signed payment confirmation reported by the widget's success callback
///
/// Not trustworthy on its own; it is produced in the buyer's environment
/// and MUST be verified server-side before the payment is treated as real.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentConfirmation {
    pub order_id: String,
    pub payment_id: String,
    /// HMAC-SHA256 over `"{order_id}|{payment_id}"`, hex-encoded
    pub signature: String,
}

/// Outcome of a gateway session, as reported by the widget
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GatewayEvent {
    /// Success callback fired with a signed confirmation
    Completed(PaymentConfirmation),

    /// The widget's own failure event
    Failed { description: String },

    /// The buyer dismissed the widget
    Dismissed,
}

/// A hosted payment widget implementation
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Whether the widget is loaded and able to launch
    async fn is_ready(&self) -> bool;

    /// Launch the widget for an order
    async fn launch(&self, order: GatewayOrder) -> Result<Box<dyn PaymentSession>>;

    /// Gateway name, for logging
    fn name(&self) -> &str;
}

/// One live widget invocation
///
/// Owned by the orchestrator for the duration of the attempt. `close()` is
/// idempotent: success, failure, and dismiss paths may all call it.
#[async_trait]
pub trait PaymentSession: Send {
    /// Wait for the widget to report an outcome
    async fn wait(&mut self) -> Result<GatewayEvent>;

    /// Force-close the widget; safe to call multiple times
    async fn close(&mut self);
}

/// Poll the gateway until it is ready, or fail after `timeout`
pub async fn ensure_ready(gateway: &dyn PaymentGateway, timeout: Duration) -> Result<()> {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if gateway.is_ready().await {
            return Ok(());
        }
        if tokio::time::Instant::now() + READY_POLL_INTERVAL >= deadline {
            tracing::warn!(gateway = gateway.name(), "gateway never became ready");
            return Err(PaymentError::GatewayUnavailable);
        }
        tokio::time::sleep(READY_POLL_INTERVAL).await;
    }
}

type HmacSha256 = Hmac<Sha256>;

/// Sign a confirmation the way the gateway does
pub fn sign_confirmation(secret: &str, order_id: &str, payment_id: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(format!("{order_id}|{payment_id}").as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Verify a confirmation's signature (constant-time)
pub fn verify_signature(secret: &str, confirmation: &PaymentConfirmation) -> bool {
    let Ok(expected) = hex::decode(&confirmation.signature) else {
        return false;
    };
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(format!("{}|{}", confirmation.order_id, confirmation.payment_id).as_bytes());
    mac.verify_slice(&expected).is_ok()
}
