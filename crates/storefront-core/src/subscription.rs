//! Tenant Subscriptions
//!
//! Server-owned subscription records with the derived state the
//! subscription gate needs: days remaining, expired, expiring soon.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use rust_decimal::Decimal;

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Subscription lifecycle status as reported by the backend
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Active,
    Expired,
    Cancelled,
    None,
}

impl Default for SubscriptionStatus {
    fn default() -> Self {
        SubscriptionStatus::None
    }
}

/// A tenant's subscription record
///
/// Read-only to the checkout flow; it is mutated server-side when a payment
/// verifies. Derived fields are computed here, never stored.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    /// Plan name ("Free", "Basic", "Pro", ...)
    pub plan_name: String,

    /// Monthly price the tenant pays, in rupees
    pub price: Decimal,

    /// Lifecycle status
    pub status: SubscriptionStatus,

    /// When the current period ends
    pub end_date: Option<DateTime<Utc>>,

    /// Whether autopay is enabled for renewals
    pub autopay: bool,
}

impl Subscription {
    /// Whole days until the subscription ends, floored at zero
    ///
    /// Computed as `ceil((end - now) / 1 day)`, so a subscription ending in
    /// one hour still reports one day remaining. A missing end date reports
    /// zero.
    pub fn days_remaining_at(&self, now: DateTime<Utc>) -> i64 {
        let Some(end) = self.end_date else {
            return 0;
        };
        let millis = (end - now).num_milliseconds();
        if millis <= 0 {
            0
        } else {
            (millis + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY
        }
    }

    /// `days_remaining_at` evaluated now
    pub fn days_remaining(&self) -> i64 {
        self.days_remaining_at(Utc::now())
    }

    /// Whether access has lapsed
    ///
    /// Zero days remaining counts as expired even when the backend still
    /// reports the status as active; the boundary at zero is inclusive.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        if self.days_remaining_at(now) <= 0 {
            return true;
        }
        matches!(
            self.status,
            SubscriptionStatus::Expired | SubscriptionStatus::Cancelled
        )
    }

    /// `is_expired_at` evaluated now
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Within the renewal-reminder window (1 to 3 days remaining)
    pub fn is_expiring_soon_at(&self, now: DateTime<Utc>) -> bool {
        let days = self.days_remaining_at(now);
        days > 0 && days <= 3
    }

    /// `is_expiring_soon_at` evaluated now
    pub fn is_expiring_soon(&self) -> bool {
        self.is_expiring_soon_at(Utc::now())
    }

    /// Whether the tenant is on the free (or absent) tier
    pub fn is_free_plan(&self) -> bool {
        self.plan_name.is_empty() || self.plan_name.eq_ignore_ascii_case("free")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn sub(status: SubscriptionStatus, ends_in: Option<Duration>) -> (Subscription, DateTime<Utc>) {
        let now = Utc::now();
        let sub = Subscription {
            plan_name: "Pro".into(),
            price: dec!(999),
            status,
            end_date: ends_in.map(|d| now + d),
            autopay: false,
        };
        (sub, now)
    }

    #[test]
    fn test_partial_day_rounds_up() {
        let (sub, now) = sub(SubscriptionStatus::Active, Some(Duration::hours(1)));
        assert_eq!(sub.days_remaining_at(now), 1);
    }

    #[test]
    fn test_zero_days_is_expired_even_when_active() {
        let (sub, now) = sub(SubscriptionStatus::Active, Some(Duration::zero()));
        assert_eq!(sub.days_remaining_at(now), 0);
        assert!(sub.is_expired_at(now));
    }

    #[test]
    fn test_cancelled_with_time_left_is_expired() {
        let (sub, now) = sub(SubscriptionStatus::Cancelled, Some(Duration::days(10)));
        assert!(sub.is_expired_at(now));
    }

    #[test]
    fn test_expiring_soon_boundaries() {
        let (sub, now) = sub(SubscriptionStatus::Active, Some(Duration::days(3)));
        assert!(sub.is_expiring_soon_at(now));

        let (sub, now) = self::sub(SubscriptionStatus::Active, Some(Duration::days(4)));
        assert!(!sub.is_expiring_soon_at(now));

        let (sub, now) = self::sub(SubscriptionStatus::Active, Some(Duration::zero()));
        assert!(!sub.is_expiring_soon_at(now));
    }

    #[test]
    fn test_missing_end_date_counts_as_expired() {
        let (sub, now) = sub(SubscriptionStatus::Active, None);
        assert!(sub.is_expired_at(now));
    }
}
