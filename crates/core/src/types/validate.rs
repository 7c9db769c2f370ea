//! Free-text sanitizing and field-level validation.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Maximum length of sanitized free text, in characters.
pub const MAX_TEXT_LEN: usize = 2000;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("Invalid regex"));

/// Trim, strip anything that looks like a markup tag, and cap the length.
///
/// ```
/// use seedmart_core::sanitize;
///
/// assert_eq!(sanitize("  <b>Urgent</b> delivery "), "Urgent delivery");
/// ```
#[must_use]
pub fn sanitize(text: &str) -> String {
    let stripped = TAG_RE.replace_all(text.trim(), "");
    stripped.chars().take(MAX_TEXT_LEN).collect()
}

/// Sanitize optional text, mapping blank results to `None`.
#[must_use]
pub fn sanitize_opt(text: Option<&str>) -> Option<String> {
    text.map(sanitize).filter(|s| !s.is_empty())
}

/// Password strength rule for buyer accounts.
///
/// # Errors
///
/// Returns a message naming the rule when the password is too weak.
pub fn check_password_strength(password: &str) -> Result<(), &'static str> {
    let long_enough = password.chars().count() >= 8;
    let upper = password.chars().any(|c| c.is_ascii_uppercase());
    let lower = password.chars().any(|c| c.is_ascii_lowercase());
    let digit = password.chars().any(|c| c.is_ascii_digit());

    if long_enough && upper && lower && digit {
        Ok(())
    } else {
        Err("Password must be at least 8 characters with uppercase, lowercase, and a number")
    }
}

/// Collected per-field validation failures.
///
/// Serializes as a JSON object from field name to message, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error for `field`. The first error per field wins.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_owned())
            .or_insert_with(|| message.into());
    }

    /// Record the error from `result`, if any, and pass the value through.
    pub fn check<T, E: std::fmt::Display>(&mut self, field: &str, result: Result<T, E>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.add(field, e.to_string());
                None
            }
        }
    }

    /// Require a non-blank value.
    pub fn require(&mut self, field: &str, value: Option<&str>, label: &str) -> Option<String> {
        match value.map(sanitize).filter(|v| !v.is_empty()) {
            Some(v) => Some(v),
            None => {
                self.add(field, format!("{label} is required"));
                None
            }
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// `Ok(())` when nothing was recorded.
    ///
    /// # Errors
    ///
    /// Returns `self` when at least one field failed.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{Gstin, Pan};

    #[test]
    fn test_sanitize_strips_tags_and_trims() {
        assert_eq!(sanitize("  <script>alert(1)</script>Rabi lot  "), "alert(1)Rabi lot");
        assert_eq!(sanitize("no markup"), "no markup");
    }

    #[test]
    fn test_sanitize_caps_length() {
        let long = "é".repeat(MAX_TEXT_LEN + 50);
        assert_eq!(sanitize(&long).chars().count(), MAX_TEXT_LEN);
    }

    #[test]
    fn test_sanitize_opt_drops_blank() {
        assert_eq!(sanitize_opt(Some("  <br> ")), None);
        assert_eq!(sanitize_opt(None), None);
        assert_eq!(sanitize_opt(Some("BlueDart")), Some("BlueDart".to_owned()));
    }

    #[test]
    fn test_password_strength() {
        assert!(check_password_strength("Seeds2024").is_ok());
        assert!(check_password_strength("seeds2024").is_err());
        assert!(check_password_strength("SEEDS2024").is_err());
        assert!(check_password_strength("SeedsSeeds").is_err());
        assert!(check_password_strength("Sd1").is_err());
    }

    #[test]
    fn test_field_errors_collects_all() {
        let mut errors = FieldErrors::new();
        assert!(errors.check("gst_number", Gstin::parse("bad")).is_none());
        assert!(errors.check("pan_number", Pan::parse("ABCDE1234F")).is_some());
        assert!(errors.require("company_name", Some("   "), "Company name").is_none());
        errors.add("gst_number", "second message is ignored");

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("company_name"), Some("Company name is required"));
        assert!(errors.get("gst_number").unwrap().starts_with("Invalid GST number"));

        let json = serde_json::to_value(&errors).unwrap();
        assert!(json.get("company_name").is_some());
        assert!(errors.into_result().is_err());
    }

    #[test]
    fn test_empty_field_errors_is_ok() {
        assert!(FieldErrors::new().into_result().is_ok());
    }
}
