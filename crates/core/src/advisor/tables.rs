//! Static agronomy lookup tables.

use rust_decimal::Decimal;

/// Agro-climatic regions per state. Keys are canonical state names.
const STATE_REGIONS: &[(&str, &[&str])] = &[
    ("Punjab", &["North India", "Wheat Belt", "Indo-Gangetic Plain"]),
    ("Haryana", &["North India", "Wheat Belt", "Indo-Gangetic Plain"]),
    ("Uttar Pradesh", &["North India", "Indo-Gangetic Plain"]),
    ("Rajasthan", &["Western India", "Arid Zone"]),
    ("Maharashtra", &["Western India", "Deccan Plateau"]),
    ("Gujarat", &["Western India", "Cotton Belt"]),
    ("Madhya Pradesh", &["Central India", "Soybean Belt"]),
    ("Karnataka", &["South India", "Deccan Plateau"]),
    ("Tamil Nadu", &["South India", "Delta Region", "Coastal"]),
    ("Andhra Pradesh", &["South India", "Delta Region"]),
    ("Telangana", &["South India", "Deccan Plateau"]),
    ("West Bengal", &["East India", "Delta Region"]),
    ("Bihar", &["East India", "Indo-Gangetic Plain"]),
    ("Odisha", &["East India", "Coastal"]),
    ("Assam", &["North East India"]),
];

/// Crop categories that do well on each soil type. Keys are lowercase.
const SOIL_CROPS: &[(&str, &[&str])] = &[
    ("alluvial", &["Wheat", "Rice", "Pulses", "Vegetable"]),
    ("black", &["Cotton", "Wheat", "Soybean", "Pulses"]),
    ("red", &["Pulses", "Cotton", "Vegetable", "Wheat"]),
    ("laterite", &["Rice", "Vegetable", "Pulses"]),
    ("sandy", &["Pulses", "Vegetable", "Cotton"]),
    ("loam", &["Wheat", "Rice", "Vegetable", "Hybrid", "Cotton", "Pulses"]),
];

/// Regions for `state`, matched case-insensitively. Unknown states have none.
#[must_use]
pub fn regions_for_state(state: &str) -> &'static [&'static str] {
    let state = state.trim();
    STATE_REGIONS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(state))
        .map_or(&[][..], |&(_, regions)| regions)
}

/// Suitable crop categories for `soil`, matched case-insensitively.
#[must_use]
pub fn crops_for_soil(soil: &str) -> &'static [&'static str] {
    let soil = soil.trim().to_ascii_lowercase();
    SOIL_CROPS
        .iter()
        .find(|(name, _)| *name == soil)
        .map_or(&[][..], |&(_, crops)| crops)
}

/// Spending band for the per-kg entry price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Budget {
    Low,
    #[default]
    Medium,
    High,
}

impl Budget {
    /// Parse a budget label; anything unrecognized is treated as medium.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "low" => Self::Low,
            "high" => Self::High,
            _ => Self::Medium,
        }
    }

    /// Inclusive price range in rupees per kg. Bands overlap.
    #[must_use]
    pub fn range(self) -> (Decimal, Decimal) {
        match self {
            Self::Low => (Decimal::ZERO, Decimal::from(100)),
            Self::Medium => (Decimal::from(50), Decimal::from(500)),
            Self::High => (Decimal::from(200), Decimal::from(999_999)),
        }
    }

    #[must_use]
    pub fn contains(self, price: Decimal) -> bool {
        let (min, max) = self.range();
        price >= min && price <= max
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}
