//! Indian business identifiers: GSTIN, PAN, pincode and mobile number.
//!
//! GSTIN and PAN are normalized to uppercase before matching. All four types
//! store the normalized text and serialize transparently as strings.

use core::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static GSTIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{2}[A-Z]{5}[0-9]{4}[A-Z][1-9A-Z]Z[0-9A-Z]$").expect("Invalid regex")
});
static PAN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{5}[0-9]{4}[A-Z]$").expect("Invalid regex"));
static PINCODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[1-9][0-9]{5}$").expect("Invalid regex"));
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[6-9][0-9]{9}$").expect("Invalid regex"));

/// Errors produced when parsing an identifier.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TaxIdError {
    #[error("Invalid GST number format (e.g. 27AAPFU0939F1ZV)")]
    Gstin,
    #[error("Invalid PAN format (e.g. ABCDE1234F)")]
    Pan,
    #[error("Invalid pincode (6 digits, cannot start with 0)")]
    Pincode,
    #[error("Invalid mobile number (10 digits starting with 6-9)")]
    Phone,
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = TaxIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = TaxIdError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::parse(&value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id! {
    /// A 15-character GST identification number.
    ///
    /// Layout: 2-digit state code, the holder's PAN, entity number, `Z`,
    /// checksum character.
    ///
    /// ```
    /// use seedmart_core::Gstin;
    ///
    /// let gstin = Gstin::parse(" 27aapfu0939f1zv ").unwrap();
    /// assert_eq!(gstin.as_str(), "27AAPFU0939F1ZV");
    /// assert_eq!(gstin.state_code(), "27");
    /// assert_eq!(gstin.state_name(), Some("Maharashtra"));
    /// ```
    Gstin
}

impl Gstin {
    /// Parse a GSTIN after trimming and uppercasing.
    ///
    /// # Errors
    ///
    /// Returns [`TaxIdError::Gstin`] when the text does not match the GSTIN layout.
    pub fn parse(s: &str) -> Result<Self, TaxIdError> {
        let normalized = s.trim().to_ascii_uppercase();
        if GSTIN_RE.is_match(&normalized) {
            Ok(Self(normalized))
        } else {
            Err(TaxIdError::Gstin)
        }
    }

    /// Two-digit GST state code.
    #[must_use]
    pub fn state_code(&self) -> &str {
        self.0.get(..2).unwrap_or_default()
    }

    /// State registered under this GSTIN, if the code is known.
    #[must_use]
    pub fn state_name(&self) -> Option<&'static str> {
        state_name_for_code(self.state_code())
    }

    /// PAN embedded in characters 3 to 12.
    #[must_use]
    pub fn pan(&self) -> &str {
        self.0.get(2..12).unwrap_or_default()
    }
}

string_id! {
    /// A 10-character Permanent Account Number.
    Pan
}

impl Pan {
    /// Parse a PAN after trimming and uppercasing.
    ///
    /// # Errors
    ///
    /// Returns [`TaxIdError::Pan`] on a malformed value.
    pub fn parse(s: &str) -> Result<Self, TaxIdError> {
        let normalized = s.trim().to_ascii_uppercase();
        if PAN_RE.is_match(&normalized) {
            Ok(Self(normalized))
        } else {
            Err(TaxIdError::Pan)
        }
    }
}

string_id! {
    /// Six-digit postal index number.
    Pincode
}

impl Pincode {
    /// # Errors
    ///
    /// Returns [`TaxIdError::Pincode`] on a malformed value.
    pub fn parse(s: &str) -> Result<Self, TaxIdError> {
        let trimmed = s.trim();
        if PINCODE_RE.is_match(trimmed) {
            Ok(Self(trimmed.to_owned()))
        } else {
            Err(TaxIdError::Pincode)
        }
    }
}

string_id! {
    /// Ten-digit Indian mobile number without the country prefix.
    Phone
}

impl Phone {
    /// # Errors
    ///
    /// Returns [`TaxIdError::Phone`] on a malformed value.
    pub fn parse(s: &str) -> Result<Self, TaxIdError> {
        let trimmed = s.trim();
        if PHONE_RE.is_match(trimmed) {
            Ok(Self(trimmed.to_owned()))
        } else {
            Err(TaxIdError::Phone)
        }
    }
}

/// Map a GST state code to the state or union territory name.
#[must_use]
pub fn state_name_for_code(code: &str) -> Option<&'static str> {
    let name = match code {
        "01" => "Jammu and Kashmir",
        "02" => "Himachal Pradesh",
        "03" => "Punjab",
        "04" => "Chandigarh",
        "05" => "Uttarakhand",
        "06" => "Haryana",
        "07" => "Delhi",
        "08" => "Rajasthan",
        "09" => "Uttar Pradesh",
        "10" => "Bihar",
        "11" => "Sikkim",
        "12" => "Arunachal Pradesh",
        "13" => "Nagaland",
        "14" => "Manipur",
        "15" => "Mizoram",
        "16" => "Tripura",
        "17" => "Meghalaya",
        "18" => "Assam",
        "19" => "West Bengal",
        "20" => "Jharkhand",
        "21" => "Odisha",
        "22" => "Chhattisgarh",
        "23" => "Madhya Pradesh",
        "24" => "Gujarat",
        "26" => "Dadra and Nagar Haveli and Daman and Diu",
        "27" => "Maharashtra",
        "29" => "Karnataka",
        "30" => "Goa",
        "31" => "Lakshadweep",
        "32" => "Kerala",
        "33" => "Tamil Nadu",
        "34" => "Puducherry",
        "35" => "Andaman and Nicobar Islands",
        "36" => "Telangana",
        "37" => "Andhra Pradesh",
        "38" => "Ladakh",
        _ => return None,
    };
    Some(name)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_gstin_accepts_valid_and_normalizes() {
        let gstin = Gstin::parse("03aabcp1234q1z5").unwrap();
        assert_eq!(gstin.as_str(), "03AABCP1234Q1Z5");
        assert_eq!(gstin.state_name(), Some("Punjab"));
        assert_eq!(gstin.pan(), "AABCP1234Q");
    }

    #[test]
    fn test_gstin_rejects_malformed() {
        // entity number cannot be 0
        assert_eq!(Gstin::parse("27AAPFU0939F0ZV"), Err(TaxIdError::Gstin));
        // 14th character must be Z
        assert_eq!(Gstin::parse("27AAPFU0939F1XV"), Err(TaxIdError::Gstin));
        assert_eq!(Gstin::parse("27AAPFU0939F1Z"), Err(TaxIdError::Gstin));
        assert_eq!(Gstin::parse(""), Err(TaxIdError::Gstin));
    }

    #[test]
    fn test_pan() {
        assert_eq!(Pan::parse(" abcde1234f").unwrap().as_str(), "ABCDE1234F");
        assert_eq!(Pan::parse("ABCD1234F"), Err(TaxIdError::Pan));
        assert_eq!(Pan::parse("ABCDE12345"), Err(TaxIdError::Pan));
    }

    #[test]
    fn test_pincode() {
        assert!(Pincode::parse("411001").is_ok());
        assert_eq!(Pincode::parse("011001"), Err(TaxIdError::Pincode));
        assert_eq!(Pincode::parse("41100"), Err(TaxIdError::Pincode));
    }

    #[test]
    fn test_phone() {
        assert!(Phone::parse("9876543210").is_ok());
        assert_eq!(Phone::parse("5876543210"), Err(TaxIdError::Phone));
        assert_eq!(Phone::parse("+919876543210"), Err(TaxIdError::Phone));
    }

    #[test]
    fn test_state_codes() {
        assert_eq!(state_name_for_code("29"), Some("Karnataka"));
        assert_eq!(state_name_for_code("25"), None);
        assert_eq!(state_name_for_code("99"), None);
    }

    #[test]
    fn test_serde_validates() {
        assert!(serde_json::from_str::<Pan>("\"not-a-pan\"").is_err());
        let gstin: Gstin = serde_json::from_str("\"27AAPFU0939F1ZV\"").unwrap();
        assert_eq!(serde_json::to_string(&gstin).unwrap(), "\"27AAPFU0939F1ZV\"");
    }
}
