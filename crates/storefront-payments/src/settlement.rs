//! Payment Settlement
//!
//! Turns gateway callbacks into terminal checkout drafts. The widget's
//! success callback is never trusted directly: the signed confirmation is
//! forwarded to the backend, and only its verdict decides between the
//! succeeded and failed records.

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::backend::{BackendApi, VerifyOutcome};
use crate::draft::{DraftStore, FailedDraft, SucceededDraft};
use crate::error::{PaymentError, Result};
use crate::gateway::PaymentConfirmation;
use crate::plan::BillingCycle;

/// Shown when the backend rejects a payment without a reason
const GENERIC_REJECTION: &str =
    "Payment verification failed. If money was deducted, it will be refunded.";

/// What the orchestrator knew about the attempt being settled
#[derive(Clone, Debug)]
pub struct SettlementContext {
    pub plan: String,
    pub cycle: BillingCycle,
    /// Amount the buyer was quoted, in rupees
    pub amount: Decimal,
    pub order_id: String,
}

/// Writes the terminal draft for a checkout attempt
pub struct SettlementEngine {
    backend: Arc<dyn BackendApi>,
    drafts: Arc<dyn DraftStore>,
}

impl SettlementEngine {
    pub fn new(backend: Arc<dyn BackendApi>, drafts: Arc<dyn DraftStore>) -> Self {
        Self { backend, drafts }
    }

    /// Verify a gateway confirmation server-side and settle the attempt
    ///
    /// Returns the succeeded draft on acceptance. A rejected confirmation
    /// comes back as [`PaymentError::Verification`] carrying the server's
    /// reason; never a success.
    pub async fn settle(
        &self,
        ctx: &SettlementContext,
        confirmation: &PaymentConfirmation,
    ) -> Result<SucceededDraft> {
        let outcome = self.backend.verify_payment(confirmation).await?;
        self.apply(ctx, outcome)
    }

    /// Apply a backend verdict (from verification or test-mode simulation)
    pub fn apply(&self, ctx: &SettlementContext, outcome: VerifyOutcome) -> Result<SucceededDraft> {
        if !outcome.success {
            return Err(PaymentError::Verification(
                outcome.message.unwrap_or_else(|| GENERIC_REJECTION.into()),
            ));
        }

        self.clear_opened();
        let draft = SucceededDraft {
            plan: ctx.plan.clone(),
            cycle: ctx.cycle,
            // The server-reported captured amount wins over the local quote
            amount: outcome.paid_amount.unwrap_or(ctx.amount),
            order_id: ctx.order_id.clone(),
            subscription_end: outcome.subscription_end,
        };
        self.drafts.put_succeeded(&draft)?;
        tracing::info!(
            plan = %draft.plan,
            order_id = %draft.order_id,
            amount = %draft.amount,
            "payment settled"
        );
        Ok(draft)
    }

    /// Record a terminal failure: clear the opened anchor, write the failed
    /// draft
    ///
    /// Best-effort on storage: a draft write failure is logged, not
    /// propagated; the caller is already on the failure path.
    pub fn record_failure(&self, plan: Option<String>, reason: &str) -> FailedDraft {
        self.clear_opened();
        let draft = FailedDraft {
            plan,
            reason: reason.to_string(),
        };
        if let Err(e) = self.drafts.put_failed(&draft) {
            tracing::warn!(error = %e, "could not persist failed draft");
        }
        tracing::warn!(reason = %draft.reason, "payment failed");
        draft
    }

    fn clear_opened(&self) {
        if let Err(e) = self.drafts.take_opened() {
            tracing::warn!(error = %e, "could not clear opened draft");
        }
    }
}
