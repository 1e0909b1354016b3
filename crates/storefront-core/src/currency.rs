//! Currency Formatting
//!
//! Rupee display formatting with Indian digit grouping (last three digits,
//! then groups of two): 10789 renders as "₹10,789", 123456 as "₹1,23,456".

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Format a whole-rupee amount for display
pub fn format_inr(amount: Decimal) -> String {
    let rupees = amount.round().to_i64().unwrap_or(0);
    let sign = if rupees < 0 { "-" } else { "" };
    format!("₹{}{}", sign, group_indian(rupees.unsigned_abs()))
}

fn group_indian(value: u64) -> String {
    let digits = value.to_string();
    if digits.len() <= 3 {
        return digits;
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups = Vec::new();
    let head_bytes = head.as_bytes();
    let mut end = head_bytes.len();
    while end > 2 {
        groups.push(&head[end - 2..end]);
        end -= 2;
    }
    groups.push(&head[..end]);
    groups.reverse();
    format!("{},{}", groups.join(","), tail)
}
