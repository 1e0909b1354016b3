//! Checkout Result Views
//!
//! The success and failure pages each read-and-delete their terminal draft.
//! A second visit (back button, direct URL) finds no draft and redirects
//! away; the record is consumed exactly once.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use storefront_core::format_inr;

use crate::draft::DraftStore;
use crate::error::Result;
use crate::plan::BillingCycle;

/// Outcome of loading a result page
#[derive(Clone, Debug, PartialEq)]
pub enum ResultPage<T> {
    /// Draft found and consumed: render this view
    View(T),
    /// No draft: redirect away from the result page
    Redirect,
}

/// View model for `/checkout/success`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuccessView {
    pub plan: String,
    pub cycle: BillingCycle,
    pub amount: Decimal,
    /// Formatted amount, e.g. "₹999"
    pub amount_display: String,
    pub order_id: String,
    pub subscription_end: Option<DateTime<Utc>>,
}

/// View model for `/checkout/failed`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureView {
    pub plan: Option<String>,
    pub reason: String,
}

/// Consume the succeeded draft for the success page
pub fn load_success(drafts: &dyn DraftStore) -> Result<ResultPage<SuccessView>> {
    let Some(draft) = drafts.take_succeeded()? else {
        tracing::debug!("success page visited without a draft; redirecting");
        return Ok(ResultPage::Redirect);
    };
    Ok(ResultPage::View(SuccessView {
        amount_display: format_inr(draft.amount),
        plan: draft.plan,
        cycle: draft.cycle,
        amount: draft.amount,
        order_id: draft.order_id,
        subscription_end: draft.subscription_end,
    }))
}

/// Consume the failed draft for the failure page
pub fn load_failure(drafts: &dyn DraftStore) -> Result<ResultPage<FailureView>> {
    let Some(draft) = drafts.take_failed()? else {
        tracing::debug!("failure page visited without a draft; redirecting");
        return Ok(ResultPage::Redirect);
    };
    Ok(ResultPage::View(FailureView {
        plan: draft.plan,
        reason: draft.reason,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::{FailedDraft, MemoryDraftStore, SucceededDraft};
    use rust_decimal_macros::dec;

    #[test]
    fn test_success_view_renders_then_deletes() {
        let drafts = MemoryDraftStore::new();
        drafts
            .put_succeeded(&SucceededDraft {
                plan: "Pro".into(),
                cycle: BillingCycle::Monthly,
                amount: dec!(999),
                order_id: "order_1".into(),
                subscription_end: None,
            })
            .unwrap();

        match load_success(&drafts).unwrap() {
            ResultPage::View(view) => {
                assert_eq!(view.amount_display, "₹999");
                assert_eq!(view.order_id, "order_1");
            }
            ResultPage::Redirect => panic!("expected a view"),
        }

        // Second load redirects; the record was consumed
        assert_eq!(load_success(&drafts).unwrap(), ResultPage::Redirect);
    }

    #[test]
    fn test_failure_view_consumed_once() {
        let drafts = MemoryDraftStore::new();
        drafts
            .put_failed(&FailedDraft {
                plan: Some("Pro".into()),
                reason: "Card declined".into(),
            })
            .unwrap();

        match load_failure(&drafts).unwrap() {
            ResultPage::View(view) => assert_eq!(view.reason, "Card declined"),
            ResultPage::Redirect => panic!("expected a view"),
        }
        assert_eq!(load_failure(&drafts).unwrap(), ResultPage::Redirect);
    }

    #[test]
    fn test_empty_store_redirects() {
        let drafts = MemoryDraftStore::new();
        assert_eq!(load_success(&drafts).unwrap(), ResultPage::Redirect);
        assert_eq!(load_failure(&drafts).unwrap(), ResultPage::Redirect);
    }
}
