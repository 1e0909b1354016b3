//! Subscription Plans & Pricing
//!
//! Plan records as served by the backend, the derived effective price
//! (override wins over percent-discount wins over base), and the resolver
//! that picks the purchasable plan set for a tenant's vertical.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use storefront_core::BusinessVertical;

/// Fixed discount applied to a year paid up front
const YEARLY_DISCOUNT: Decimal = dec!(0.10);

/// Billing cadence chosen at checkout
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingCycle {
    Monthly,
    Yearly,
}

impl BillingCycle {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingCycle::Monthly => "monthly",
            BillingCycle::Yearly => "yearly",
        }
    }
}

impl std::fmt::Display for BillingCycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Admin-set pricing override for a plan
///
/// A fixed override price wins over a percentage discount.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomPricing {
    /// Fixed monthly price replacing the base price entirely
    pub override_price: Option<Decimal>,

    /// Percentage off the base price (0–100)
    pub percent_off: Option<Decimal>,
}

/// Feature entitlements attached to a plan
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanFeatures {
    /// Maximum catalog items (None = unlimited)
    pub item_limit: Option<u32>,

    /// Maximum QR scans per month (None = unlimited)
    pub scan_limit: Option<u32>,

    /// Custom branding on the public storefront
    pub custom_branding: bool,

    /// Programmatic API access
    pub api_access: bool,

    /// Scan analytics dashboard
    pub analytics: bool,
}

/// A priced subscription tier scoped to a business vertical
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: String,
    pub name: String,
    pub vertical: BusinessVertical,

    /// Base monthly price in rupees, before any override
    pub monthly_price: Decimal,

    /// Optional admin pricing override
    #[serde(default)]
    pub custom_pricing: Option<CustomPricing>,

    #[serde(default)]
    pub features: PlanFeatures,

    /// "Most popular" marker for display
    #[serde(default)]
    pub popular: bool,
}

impl Plan {
    /// Effective monthly price, derived on every read
    ///
    /// Override price wins over percent-discount wins over base. Rounded to
    /// the nearest rupee, never negative.
    pub fn effective_monthly_price(&self) -> Decimal {
        let price = match &self.custom_pricing {
            Some(CustomPricing {
                override_price: Some(fixed),
                ..
            }) => *fixed,
            Some(CustomPricing {
                percent_off: Some(pct),
                ..
            }) => self.monthly_price * (dec!(100) - *pct) / dec!(100),
            _ => self.monthly_price,
        };
        round_rupees(price).max(Decimal::ZERO)
    }

    /// Total for a year paid up front: `round(monthly × 12 × 0.9)`
    pub fn yearly_total(&self) -> Decimal {
        round_rupees(self.effective_monthly_price() * dec!(12) * (Decimal::ONE - YEARLY_DISCOUNT))
    }

    /// Amount charged for the chosen billing cycle
    pub fn amount_for(&self, cycle: BillingCycle) -> Decimal {
        match cycle {
            BillingCycle::Monthly => self.effective_monthly_price(),
            BillingCycle::Yearly => self.yearly_total(),
        }
    }
}

fn round_rupees(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Resolves the purchasable plan set and the plan a checkout should use
pub struct PlanResolver;

impl PlanResolver {
    /// Plans a tenant in `vertical` can buy, cheapest first
    ///
    /// Keeps plans scoped to the tenant's vertical or to `All` with a
    /// non-negative price, and drops the zero-price free tier; it is not a
    /// purchasable option.
    pub fn purchasable(plans: &[Plan], vertical: BusinessVertical) -> Vec<Plan> {
        let mut candidates: Vec<Plan> = plans
            .iter()
            .filter(|p| {
                p.vertical.offers_to(vertical)
                    && p.monthly_price >= Decimal::ZERO
                    && p.effective_monthly_price() > Decimal::ZERO
            })
            .cloned()
            .collect();
        candidates.sort_by(|a, b| a.effective_monthly_price().cmp(&b.effective_monthly_price()));
        candidates
    }

    /// Pick the plan a checkout should use
    ///
    /// Falls back requested name → "Pro" → "Basic" → cheapest when the
    /// requested plan is not among the purchasable set.
    pub fn select<'a>(purchasable: &'a [Plan], requested: &str) -> Option<&'a Plan> {
        let by_name = |name: &str| {
            purchasable
                .iter()
                .find(|p| p.name.eq_ignore_ascii_case(name))
        };
        by_name(requested)
            .or_else(|| by_name("Pro"))
            .or_else(|| by_name("Basic"))
            .or_else(|| purchasable.first())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(name: &str, price: Decimal) -> Plan {
        Plan {
            id: format!("plan_{}", name.to_lowercase()),
            name: name.into(),
            vertical: BusinessVertical::All,
            monthly_price: price,
            custom_pricing: None,
            features: PlanFeatures::default(),
            popular: false,
        }
    }

    #[test]
    fn test_base_price_when_no_override() {
        assert_eq!(plan("Pro", dec!(999)).effective_monthly_price(), dec!(999));
    }

    #[test]
    fn test_override_wins_over_percent() {
        let mut p = plan("Pro", dec!(999));
        p.custom_pricing = Some(CustomPricing {
            override_price: Some(dec!(499)),
            percent_off: Some(dec!(20)),
        });
        assert_eq!(p.effective_monthly_price(), dec!(499));
    }

    #[test]
    fn test_percent_discount_rounds_to_rupee() {
        let mut p = plan("Pro", dec!(999));
        p.custom_pricing = Some(CustomPricing {
            override_price: None,
            percent_off: Some(dec!(15)),
        });
        // 999 * 0.85 = 849.15
        assert_eq!(p.effective_monthly_price(), dec!(849));
    }

    #[test]
    fn test_effective_price_never_negative() {
        let mut p = plan("Pro", dec!(100));
        p.custom_pricing = Some(CustomPricing {
            override_price: Some(dec!(-50)),
            percent_off: None,
        });
        assert_eq!(p.effective_monthly_price(), Decimal::ZERO);
    }

    #[test]
    fn test_yearly_total_invariant() {
        // 999 * 12 * 0.9 = 10789.2 -> 10789
        assert_eq!(plan("Pro", dec!(999)).yearly_total(), dec!(10789));
        // Holds for other positive prices too
        assert_eq!(plan("Basic", dec!(299)).yearly_total(), dec!(3229));
    }

    #[test]
    fn test_free_tier_excluded_from_purchasable() {
        let plans = vec![plan("Free", dec!(0)), plan("Basic", dec!(299)), plan("Pro", dec!(999))];
        let purchasable = PlanResolver::purchasable(&plans, BusinessVertical::Restaurant);
        assert_eq!(purchasable.len(), 2);
        assert!(purchasable.iter().all(|p| p.effective_monthly_price() > Decimal::ZERO));
        // Cheapest first
        assert_eq!(purchasable[0].name, "Basic");
    }

    #[test]
    fn test_other_vertical_plans_excluded() {
        let mut retail_only = plan("Retail Pro", dec!(799));
        retail_only.vertical = BusinessVertical::Retail;
        let plans = vec![retail_only, plan("Pro", dec!(999))];
        let purchasable = PlanResolver::purchasable(&plans, BusinessVertical::Restaurant);
        assert_eq!(purchasable.len(), 1);
        assert_eq!(purchasable[0].name, "Pro");
    }

    #[test]
    fn test_selection_fallback_chain() {
        let plans = vec![plan("Basic", dec!(299)), plan("Pro", dec!(999))];

        assert_eq!(PlanResolver::select(&plans, "Basic").unwrap().name, "Basic");
        // Unknown name falls back to Pro
        assert_eq!(PlanResolver::select(&plans, "Platinum").unwrap().name, "Pro");

        let no_pro = vec![plan("Basic", dec!(299)), plan("Premium", dec!(1999))];
        assert_eq!(PlanResolver::select(&no_pro, "Platinum").unwrap().name, "Basic");

        let neither = vec![plan("Premium", dec!(1999)), plan("Starter", dec!(199))];
        let sorted = PlanResolver::purchasable(&neither, BusinessVertical::Restaurant);
        // Cheapest plan wins when neither Pro nor Basic exists
        assert_eq!(PlanResolver::select(&sorted, "Platinum").unwrap().name, "Starter");
    }

    #[test]
    fn test_select_on_empty_list() {
        assert!(PlanResolver::select(&[], "Pro").is_none());
    }
}
