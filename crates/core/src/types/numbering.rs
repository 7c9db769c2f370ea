//! Human-facing document numbers.
//!
//! Numbers are unique in practice through the random suffix; the database
//! still enforces uniqueness with a constraint.

use chrono::{DateTime, Datelike, Utc};
use uuid::Uuid;

/// Order number: `SC-<unix millis>-<6 uppercase hex>`.
#[must_use]
pub fn order_number(now: DateTime<Utc>) -> String {
    format!("SC-{}-{}", now.timestamp_millis(), random_hex(6))
}

/// Invoice number: `INV-<year>-<8 uppercase hex>`.
#[must_use]
pub fn invoice_number(now: DateTime<Utc>) -> String {
    format!("INV-{}-{}", now.year(), random_hex(8))
}

fn random_hex(len: usize) -> String {
    let mut hex = Uuid::new_v4().simple().to_string();
    hex.truncate(len);
    hex.make_ascii_uppercase();
    hex
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use regex::Regex;

    #[test]
    fn test_order_number_format() {
        let now = Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0).unwrap();
        let number = order_number(now);
        let pattern = Regex::new(r"^SC-1741944600000-[0-9A-F]{6}$").unwrap();
        assert!(pattern.is_match(&number), "{number}");
    }

    #[test]
    fn test_invoice_number_format() {
        let now = Utc.with_ymd_and_hms(2025, 12, 31, 23, 59, 59).unwrap();
        let number = invoice_number(now);
        let pattern = Regex::new(r"^INV-2025-[0-9A-F]{8}$").unwrap();
        assert!(pattern.is_match(&number), "{number}");
    }

    #[test]
    fn test_numbers_differ_between_calls() {
        let now = Utc::now();
        assert_ne!(invoice_number(now), invoice_number(now));
    }
}
