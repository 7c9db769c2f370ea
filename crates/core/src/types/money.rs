//! Rupee amount helpers.
//!
//! Amounts are carried as [`Decimal`] end to end. Rounding happens at the
//! points where a value is stored: line GST, the CGST half and totals.

use rust_decimal::{Decimal, RoundingStrategy};

/// Largest amount a money column (`NUMERIC(14,2)`) can hold.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0x107a_3fff, 0x5af3, 0, false, 2);

/// Round to paise (2 dp), midpoint away from zero.
///
/// ```
/// use rust_decimal::Decimal;
/// use seedmart_core::round_money;
///
/// assert_eq!(round_money(Decimal::new(12345, 3)), Decimal::new(1235, 2));
/// ```
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Format an amount as rupees with Indian digit grouping.
///
/// The last three integer digits form one group and the rest are grouped in
/// pairs: `1234567.5` renders as `₹12,34,567.50`.
#[must_use]
pub fn format_inr(amount: Decimal) -> String {
    let rounded = round_money(amount);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let text = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let grouped = group_indian(int_part);
    let sign = if negative { "-" } else { "" };
    format!("{sign}₹{grouped}.{frac_part}")
}

fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_owned();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);

    let mut pairs = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        pairs.push(&head[start..end]);
        end = start;
    }
    pairs.reverse();

    format!("{},{tail}", pairs.join(","))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_round_money_midpoint_away_from_zero() {
        assert_eq!(round_money(d("10.005")), d("10.01"));
        assert_eq!(round_money(d("10.004")), d("10.00"));
        assert_eq!(round_money(d("-2.345")), d("-2.35"));
    }

    #[test]
    fn test_format_inr_grouping() {
        assert_eq!(format_inr(d("0")), "₹0.00");
        assert_eq!(format_inr(d("999")), "₹999.00");
        assert_eq!(format_inr(d("1000")), "₹1,000.00");
        assert_eq!(format_inr(d("123456.5")), "₹1,23,456.50");
        assert_eq!(format_inr(d("12345678.999")), "₹1,23,45,679.00");
    }

    #[test]
    fn test_format_inr_negative() {
        assert_eq!(format_inr(d("-1500.25")), "-₹1,500.25");
    }

    #[test]
    fn test_max_amount_fits_numeric_14_2() {
        assert_eq!(MAX_AMOUNT, d("999999999999.99"));
    }
}
