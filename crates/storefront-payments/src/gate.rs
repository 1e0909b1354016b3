//! Subscription Gate
//!
//! Route-level guard for the protected dashboard area. Evaluated once per
//! protected-route mount, independent of checkout: it consults the
//! backend-reported subscription record only, and fails closed on anything
//! it cannot explain.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use storefront_core::Subscription;

use crate::backend::BackendApi;
use crate::error::PaymentError;

/// Why access was blocked
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockReason {
    /// No subscription record at all; treated as an expired free plan
    NoSubscription,
    /// The subscription has lapsed
    Expired { plan: String },
}

/// Gate verdict for a protected-route mount
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GateDecision {
    /// Platform admin; no gating at all
    Bypass,

    /// Render the page unmodified
    Allow,

    /// Render the page plus a persistent renew banner
    Warn { days_remaining: i64 },

    /// Hard gate: blocking modal offering plan selection, logout, or
    /// "view all plans"; page content is not rendered
    Block { reason: BlockReason },
}

impl GateDecision {
    /// Whether the underlying page content renders
    pub fn allows_content(&self) -> bool {
        !matches!(self, GateDecision::Block { .. })
    }
}

/// The guard itself
pub struct SubscriptionGate {
    backend: Arc<dyn BackendApi>,
}

impl SubscriptionGate {
    pub fn new(backend: Arc<dyn BackendApi>) -> Self {
        Self { backend }
    }

    /// Evaluate the gate for the current user and tenant
    ///
    /// Infallible by design: fetch errors collapse into a decision rather
    /// than an error, and the default is to block.
    pub async fn evaluate(&self) -> GateDecision {
        // Admins bypass entirely; they may not even have a tenant record.
        match self.backend.current_user().await {
            Ok(user) if user.role.is_admin() => {
                tracing::debug!("subscription gate: admin bypass");
                return GateDecision::Bypass;
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(error = %e, "subscription gate: user lookup failed");
            }
        }

        match self.backend.fetch_subscription().await {
            Ok(Some(subscription)) => Self::decide(&subscription),
            Ok(None) => GateDecision::Block {
                reason: BlockReason::NoSubscription,
            },
            Err(PaymentError::BackendNotFound(_)) => GateDecision::Block {
                reason: BlockReason::NoSubscription,
            },
            Err(e) => {
                // Fail closed, not open
                tracing::warn!(error = %e, "subscription gate: fetch failed, blocking");
                GateDecision::Block {
                    reason: BlockReason::NoSubscription,
                }
            }
        }
    }

    fn decide(subscription: &Subscription) -> GateDecision {
        // A free-tier record grants no paid access; same verdict as no
        // record at all, regardless of status or end date.
        if subscription.is_free_plan() {
            return GateDecision::Block {
                reason: BlockReason::NoSubscription,
            };
        }
        if subscription.is_expired() {
            return GateDecision::Block {
                reason: BlockReason::Expired {
                    plan: subscription.plan_name.clone(),
                },
            };
        }
        if subscription.is_expiring_soon() {
            return GateDecision::Warn {
                days_remaining: subscription.days_remaining(),
            };
        }
        GateDecision::Allow
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockBackend;
    use chrono::{Duration, Utc};
    use rust_decimal_macros::dec;
    use storefront_core::{SubscriptionStatus, UserRole};

    fn subscription(status: SubscriptionStatus, days: i64) -> Subscription {
        Subscription {
            plan_name: "Pro".into(),
            price: dec!(999),
            status,
            end_date: Some(Utc::now() + Duration::days(days)),
            autopay: false,
        }
    }

    async fn decision(backend: MockBackend) -> GateDecision {
        SubscriptionGate::new(Arc::new(backend)).evaluate().await
    }

    #[tokio::test]
    async fn test_healthy_subscription_allows() {
        let gate = decision(
            MockBackend::new(vec![]).with_subscription(subscription(SubscriptionStatus::Active, 30)),
        )
        .await;
        assert_eq!(gate, GateDecision::Allow);
        assert!(gate.allows_content());
    }

    #[tokio::test]
    async fn test_expiring_soon_warns_but_allows() {
        let gate = decision(
            MockBackend::new(vec![]).with_subscription(subscription(SubscriptionStatus::Active, 3)),
        )
        .await;
        assert_eq!(gate, GateDecision::Warn { days_remaining: 3 });
        assert!(gate.allows_content());
    }

    #[tokio::test]
    async fn test_four_days_left_does_not_warn() {
        let gate = decision(
            MockBackend::new(vec![]).with_subscription(subscription(SubscriptionStatus::Active, 4)),
        )
        .await;
        assert_eq!(gate, GateDecision::Allow);
    }

    #[tokio::test]
    async fn test_expired_blocks_content() {
        let gate = decision(
            MockBackend::new(vec![])
                .with_subscription(subscription(SubscriptionStatus::Expired, 10)),
        )
        .await;
        assert_eq!(
            gate,
            GateDecision::Block {
                reason: BlockReason::Expired { plan: "Pro".into() }
            }
        );
        assert!(!gate.allows_content());
    }

    #[tokio::test]
    async fn test_zero_days_active_still_blocks() {
        let gate = decision(
            MockBackend::new(vec![]).with_subscription(subscription(SubscriptionStatus::Active, 0)),
        )
        .await;
        assert!(matches!(gate, GateDecision::Block { .. }));
    }

    #[tokio::test]
    async fn test_free_plan_record_blocks_like_no_subscription() {
        let mut free = subscription(SubscriptionStatus::Active, 30);
        free.plan_name = "Free".into();
        free.price = dec!(0);
        let gate = decision(MockBackend::new(vec![]).with_subscription(free)).await;
        assert_eq!(
            gate,
            GateDecision::Block {
                reason: BlockReason::NoSubscription
            }
        );
    }

    #[tokio::test]
    async fn test_missing_record_blocks() {
        let gate = decision(MockBackend::new(vec![])).await;
        assert_eq!(
            gate,
            GateDecision::Block {
                reason: BlockReason::NoSubscription
            }
        );
    }

    #[tokio::test]
    async fn test_admin_bypasses_even_without_tenant() {
        let gate = decision(
            MockBackend::new(vec![])
                .with_role(UserRole::Admin)
                .tenant_not_found(),
        )
        .await;
        assert_eq!(gate, GateDecision::Bypass);
    }

    #[tokio::test]
    async fn test_non_admin_tenant_not_found_blocks() {
        let gate = decision(MockBackend::new(vec![]).tenant_not_found()).await;
        assert!(matches!(gate, GateDecision::Block { .. }));
    }

    #[tokio::test]
    async fn test_fetch_error_fails_closed() {
        let gate = decision(MockBackend::new(vec![]).failing_subscription()).await;
        assert!(matches!(gate, GateDecision::Block { .. }));
    }
}
