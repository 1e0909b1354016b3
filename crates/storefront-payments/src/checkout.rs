//! Order Orchestrator
//!
//! Drives a checkout attempt through
//! `Idle → CreatingOrder → AwaitingGateway → Settling → Done | Failed`.
//!
//! The opened draft is written to the [`DraftStore`] before the gateway
//! widget launches; it is the crash-recovery anchor. If the process dies
//! while a gateway session is live, the next load of the checkout entry
//! finds the leftover anchor and settles the attempt as failed instead of
//! leaving it ambiguous.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use storefront_core::{BusinessVertical, ContactDetails, format_inr};

use crate::backend::{BackendApi, CreateOrderRequest};
use crate::coupon::{Coupon, lookup_coupon};
use crate::draft::{DraftStore, OpenedDraft};
use crate::error::{PaymentError, Result};
use crate::gateway::{
    GATEWAY_LOAD_TIMEOUT, GatewayEvent, GatewayOrder, PaymentGateway, PaymentSession, ensure_ready,
};
use crate::plan::{BillingCycle, Plan, PlanResolver};
use crate::settlement::{SettlementContext, SettlementEngine};

/// Simulated gateway latency in test mode
const TEST_MODE_DELAY: Duration = Duration::from_millis(1500);

/// Reason recorded when a leftover gateway session is found on load
const INTERRUPTED_REASON: &str = "Payment was cancelled or interrupted";

/// Reason recorded when the buyer dismisses the widget
const DISMISSED_REASON: &str = "Payment was cancelled.";

/// Checkout state machine positions
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckoutState {
    Idle,
    CreatingOrder,
    AwaitingGateway,
    Settling,
    Done,
    Failed,
}

/// Where the flow navigates after a terminal transition
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Navigation {
    Success,
    Failure { reason: String },
}

impl Navigation {
    /// Route for the result page, reason percent-encoded
    pub fn route(&self) -> String {
        match self {
            Navigation::Success => "/checkout/success".into(),
            Navigation::Failure { reason } => format!(
                "/checkout/failed?reason={}",
                utf8_percent_encode(reason, NON_ALPHANUMERIC)
            ),
        }
    }
}

/// What the buyer confirmed on the checkout page
#[derive(Clone, Debug)]
pub struct CheckoutRequest {
    pub plan_name: String,
    pub vertical: BusinessVertical,
    pub cycle: BillingCycle,
    pub contact: ContactDetails,
    pub autopay: bool,
    pub coupon_code: Option<String>,
    pub gstin: Option<String>,
    pub billing_address: Option<String>,
    pub company_legal_name: Option<String>,
}

/// Price quote shown before the buyer confirms
#[derive(Clone, Debug)]
pub struct CheckoutQuote {
    pub plan: String,
    pub cycle: BillingCycle,
    /// Amount that will be charged, in rupees
    pub amount: Decimal,
    /// Formatted total, e.g. "₹10,789"
    pub display_total: String,
    /// Confirm button label carrying the formatted total
    pub button_label: String,
    /// Matched coupon, display only; the charge is NOT discounted
    pub coupon: Option<Coupon>,
}

/// The checkout orchestrator
pub struct CheckoutFlow {
    backend: Arc<dyn BackendApi>,
    gateway: Arc<dyn PaymentGateway>,
    drafts: Arc<dyn DraftStore>,
    settlement: SettlementEngine,
    state: Mutex<CheckoutState>,
    processing: AtomicBool,
}

impl CheckoutFlow {
    pub fn new(
        backend: Arc<dyn BackendApi>,
        gateway: Arc<dyn PaymentGateway>,
        drafts: Arc<dyn DraftStore>,
    ) -> Self {
        let settlement = SettlementEngine::new(backend.clone(), drafts.clone());
        Self {
            backend,
            gateway,
            drafts,
            settlement,
            state: Mutex::new(CheckoutState::Idle),
            processing: AtomicBool::new(false),
        }
    }

    /// Current state machine position
    pub fn state(&self) -> CheckoutState {
        *self.state.lock().unwrap()
    }

    /// Whether a confirm-and-pay is currently in flight
    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::SeqCst)
    }

    /// Load the purchasable plans for a vertical
    ///
    /// A fetch failure yields an empty list; the page renders "no plans
    /// available" rather than crashing.
    pub async fn load_plans(&self, vertical: BusinessVertical) -> Vec<Plan> {
        match self.backend.fetch_plans(vertical).await {
            Ok(plans) => PlanResolver::purchasable(&plans, vertical),
            Err(e) => {
                tracing::warn!(error = %e, "plan fetch failed; rendering empty plan list");
                Vec::new()
            }
        }
    }

    /// Quote the plan and total the confirm button will show
    pub fn quote(
        &self,
        purchasable: &[Plan],
        requested: &str,
        cycle: BillingCycle,
        coupon_code: Option<&str>,
    ) -> Result<CheckoutQuote> {
        let plan = PlanResolver::select(purchasable, requested)
            .ok_or_else(|| PaymentError::PlanUnavailable(requested.to_string()))?;
        let amount = plan.amount_for(cycle);
        let display_total = format_inr(amount);
        Ok(CheckoutQuote {
            plan: plan.name.clone(),
            cycle,
            amount,
            button_label: format!("Pay {display_total}"),
            display_total,
            coupon: coupon_code.and_then(lookup_coupon),
        })
    }

    /// Detect a gateway session that never settled
    ///
    /// Call on checkout entry load. A leftover opened draft means the
    /// process was reloaded while the widget was live; it is settled as a
    /// failure, and the caller must follow the returned navigation.
    pub fn recover_interrupted(&self) -> Result<Option<Navigation>> {
        let Some(opened) = self.drafts.take_opened()? else {
            return Ok(None);
        };
        tracing::warn!(plan = %opened.plan, "found interrupted gateway session");
        self.settlement
            .record_failure(Some(opened.plan), INTERRUPTED_REASON);
        Ok(Some(Navigation::Failure {
            reason: INTERRUPTED_REASON.into(),
        }))
    }

    /// Run one checkout attempt to a terminal state
    ///
    /// Validation problems (contact fields, no resolvable nonzero-price
    /// plan) are returned as errors with the flow still in `Idle`; they are
    /// inline form feedback, not terminal failures. Everything after order
    /// creation resolves to `Ok(Navigation)`: either the success route or
    /// the failure route with a human-readable reason, with the matching
    /// terminal draft written.
    pub async fn confirm_and_pay(
        &self,
        purchasable: &[Plan],
        request: CheckoutRequest,
    ) -> Result<Navigation> {
        if self
            .processing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(PaymentError::AlreadyProcessing);
        }
        let _guard = ProcessingGuard(&self.processing);

        // Preconditions: stay in Idle on violation
        let prefill = request.contact.gateway_contact()?;
        let plan = PlanResolver::select(purchasable, &request.plan_name)
            .ok_or_else(|| PaymentError::PlanUnavailable(request.plan_name.clone()))?;
        let amount = plan.amount_for(request.cycle);
        if amount <= Decimal::ZERO {
            return Err(PaymentError::PlanUnavailable(plan.name.clone()));
        }

        self.set_state(CheckoutState::CreatingOrder);
        let order_request = CreateOrderRequest {
            plan: plan.name.clone(),
            vertical: request.vertical,
            cycle: request.cycle,
            autopay: request.autopay,
            gstin: request.gstin.clone(),
            billing_address: request.billing_address.clone(),
            company_legal_name: request.company_legal_name.clone(),
        };
        let response = match self.backend.create_order(&order_request).await {
            Ok(response) => response,
            Err(e) => return Ok(self.fail(Some(plan.name.clone()), &reason_of(&e))),
        };

        let ctx = SettlementContext {
            plan: plan.name.clone(),
            cycle: request.cycle,
            amount,
            order_id: response.order.id.clone(),
        };

        if response.test_mode {
            // Widget bypassed entirely; simulate gateway latency, then
            // settle through the same transitions as a verified payment.
            self.set_state(CheckoutState::Settling);
            tracing::info!(order_id = %ctx.order_id, "test mode: simulating payment");
            tokio::time::sleep(TEST_MODE_DELAY).await;
            let outcome = match self.backend.simulate_test_payment(&ctx.order_id).await {
                Ok(outcome) => outcome,
                Err(e) => return Ok(self.fail(Some(ctx.plan), &reason_of(&e))),
            };
            let settled = self.settlement.apply(&ctx, outcome);
            return Ok(self.finish(&ctx, None, settled).await);
        }

        // Crash-recovery anchor goes down BEFORE the widget opens
        if let Err(e) = self.drafts.put_opened(&OpenedDraft {
            plan: ctx.plan.clone(),
            cycle: ctx.cycle,
            amount: ctx.amount,
        }) {
            return Ok(self.fail(Some(ctx.plan), &reason_of(&e)));
        }

        if let Err(e) = ensure_ready(self.gateway.as_ref(), GATEWAY_LOAD_TIMEOUT).await {
            return Ok(self.fail(Some(ctx.plan), &reason_of(&e)));
        }

        let order = GatewayOrder {
            key_id: response.key_id,
            order_id: ctx.order_id.clone(),
            amount_minor: response.order.amount_minor,
            currency: response.order.currency,
            prefill,
            notes: [
                ("plan".to_string(), ctx.plan.clone()),
                ("cycle".to_string(), ctx.cycle.to_string()),
                ("vertical".to_string(), request.vertical.to_string()),
            ]
            .into(),
        };
        let mut session = match self.gateway.launch(order).await {
            Ok(session) => session,
            Err(e) => return Ok(self.fail(Some(ctx.plan), &reason_of(&e))),
        };

        self.set_state(CheckoutState::AwaitingGateway);
        let event = match session.wait().await {
            Ok(event) => event,
            Err(e) => {
                session.close().await;
                return Ok(self.fail(Some(ctx.plan), &reason_of(&e)));
            }
        };

        match event {
            GatewayEvent::Completed(confirmation) => {
                self.set_state(CheckoutState::Settling);
                let settled = self.settlement.settle(&ctx, &confirmation).await;
                Ok(self.finish(&ctx, Some(&mut session), settled).await)
            }
            GatewayEvent::Failed { description } => {
                session.close().await;
                Ok(self.fail(Some(ctx.plan), &description))
            }
            GatewayEvent::Dismissed => {
                session.close().await;
                Ok(self.fail(Some(ctx.plan), DISMISSED_REASON))
            }
        }
    }

    /// Resolve a settlement result into a terminal state and navigation
    async fn finish(
        &self,
        ctx: &SettlementContext,
        session: Option<&mut Box<dyn PaymentSession>>,
        settled: Result<crate::draft::SucceededDraft>,
    ) -> Navigation {
        if let Some(session) = session {
            // close() is idempotent; success and failure both force it
            session.close().await;
        }
        match settled {
            Ok(draft) => {
                self.set_state(CheckoutState::Done);
                tracing::info!(order_id = %draft.order_id, "checkout done");
                Navigation::Success
            }
            Err(e) => self.fail(Some(ctx.plan.clone()), &reason_of(&e)),
        }
    }

    fn fail(&self, plan: Option<String>, reason: &str) -> Navigation {
        self.settlement.record_failure(plan, reason);
        self.set_state(CheckoutState::Failed);
        Navigation::Failure {
            reason: reason.to_string(),
        }
    }

    fn set_state(&self, state: CheckoutState) {
        *self.state.lock().unwrap() = state;
        tracing::debug!(state = ?state, "checkout state");
    }
}

/// Human-readable failure reason for an error
fn reason_of(error: &PaymentError) -> String {
    match error {
        // Backend rejections carry the server's own message through
        PaymentError::Backend(message) | PaymentError::Verification(message) => message.clone(),
        other => other.user_message(),
    }
}

struct ProcessingGuard<'a>(&'a AtomicBool);

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
