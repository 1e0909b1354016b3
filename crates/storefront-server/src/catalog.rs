//! Seeded Plan Catalog & In-Memory Stores

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use storefront_core::{BusinessVertical, Subscription, SubscriptionStatus};
use storefront_payments::{BillingCycle, Plan, PlanFeatures};

/// The fixed plan catalog served by the dev backend
pub fn seed_plans() -> Vec<Plan> {
    vec![
        plan(
            "plan_free",
            "Free",
            BusinessVertical::All,
            dec!(0),
            PlanFeatures {
                item_limit: Some(10),
                scan_limit: Some(100),
                ..PlanFeatures::default()
            },
            false,
        ),
        plan(
            "plan_basic",
            "Basic",
            BusinessVertical::All,
            dec!(299),
            PlanFeatures {
                item_limit: Some(50),
                scan_limit: Some(2_000),
                custom_branding: true,
                ..PlanFeatures::default()
            },
            false,
        ),
        plan(
            "plan_pro",
            "Pro",
            BusinessVertical::All,
            dec!(999),
            PlanFeatures {
                item_limit: None,
                scan_limit: None,
                custom_branding: true,
                analytics: true,
                ..PlanFeatures::default()
            },
            true,
        ),
        plan(
            "plan_premium",
            "Premium",
            BusinessVertical::All,
            dec!(1999),
            PlanFeatures {
                item_limit: None,
                scan_limit: None,
                custom_branding: true,
                analytics: true,
                api_access: true,
            },
            false,
        ),
        plan(
            "plan_retail_plus",
            "Retail Plus",
            BusinessVertical::Retail,
            dec!(799),
            PlanFeatures {
                item_limit: None,
                scan_limit: Some(10_000),
                custom_branding: true,
                analytics: true,
                ..PlanFeatures::default()
            },
            false,
        ),
    ]
}

fn plan(
    id: &str,
    name: &str,
    vertical: BusinessVertical,
    monthly_price: Decimal,
    features: PlanFeatures,
    popular: bool,
) -> Plan {
    Plan {
        id: id.into(),
        name: name.into(),
        vertical,
        monthly_price,
        custom_pricing: None,
        features,
        popular,
    }
}

/// A gateway order created by `/api/payment/order`, awaiting verification
#[derive(Clone, Debug)]
pub struct PendingOrder {
    pub id: String,
    pub plan_name: String,
    pub monthly_price: Decimal,
    pub cycle: BillingCycle,
    /// Amount due, in rupees
    pub amount: Decimal,
    pub autopay: bool,
    pub paid: bool,
}

/// Pending orders keyed by order id
pub struct OrderBook {
    orders: RwLock<HashMap<String, PendingOrder>>,
}

impl OrderBook {
    pub fn new() -> Self {
        Self {
            orders: RwLock::new(HashMap::new()),
        }
    }

    pub fn insert(&self, order: PendingOrder) {
        if let Ok(mut orders) = self.orders.write() {
            orders.insert(order.id.clone(), order);
        }
    }

    pub fn get(&self, id: &str) -> Option<PendingOrder> {
        self.orders.read().ok()?.get(id).cloned()
    }

    /// Mark an order paid; false when already settled or unknown
    pub fn mark_paid(&self, id: &str) -> bool {
        let Ok(mut orders) = self.orders.write() else {
            return false;
        };
        match orders.get_mut(id) {
            Some(order) if !order.paid => {
                order.paid = true;
                true
            }
            _ => false,
        }
    }
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new()
    }
}

/// The dev tenant's subscription record
pub struct TenantStore {
    subscription: RwLock<Option<Subscription>>,
}

impl TenantStore {
    pub fn new() -> Self {
        Self {
            subscription: RwLock::new(None),
        }
    }

    pub fn subscription(&self) -> Option<Subscription> {
        self.subscription.read().ok()?.clone()
    }

    /// Activate a subscription for a settled order
    ///
    /// Monthly purchases run 30 days, yearly 365. Returns the new end date.
    pub fn activate(&self, order: &PendingOrder, now: DateTime<Utc>) -> DateTime<Utc> {
        let period = match order.cycle {
            BillingCycle::Monthly => Duration::days(30),
            BillingCycle::Yearly => Duration::days(365),
        };
        let end = now + period;
        if let Ok(mut slot) = self.subscription.write() {
            *slot = Some(Subscription {
                plan_name: order.plan_name.clone(),
                price: order.monthly_price,
                status: SubscriptionStatus::Active,
                end_date: Some(end),
                autopay: order.autopay,
            });
        }
        end
    }
}

impl Default for TenantStore {
    fn default() -> Self {
        Self::new()
    }
}
