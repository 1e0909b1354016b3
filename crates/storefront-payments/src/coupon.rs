//! Coupon Codes
//!
//! Static client-side coupon table. Matching is case-insensitive and
//! trimmed. The discount is informational only: it is shown in the quote but
//! is NOT subtracted from the amount sent to the payment gateway; the
//! charged amount stays the plan price regardless of coupon.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// A matched coupon
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coupon {
    /// Canonical (uppercase) code
    pub code: String,

    /// Percentage off, for display
    pub percent_off: Decimal,

    /// Human-readable description, e.g. "20% off"
    pub description: String,
}

/// Look up a coupon code
///
/// Returns `None` for unknown codes.
pub fn lookup_coupon(code: &str) -> Option<Coupon> {
    let canonical = code.trim().to_uppercase();
    let percent_off = match canonical.as_str() {
        "SAVE20" => dec!(20),
        "WELCOME10" => dec!(10),
        "LAUNCH50" => dec!(50),
        _ => return None,
    };
    Some(Coupon {
        description: format!("{}% off", percent_off),
        code: canonical,
        percent_off,
    })
}
