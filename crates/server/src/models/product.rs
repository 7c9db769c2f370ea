//! Catalogue products.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;

use seedmart_core::{CatalogueItem, FieldErrors, ProductId, TierPricing, sanitize};

/// Highest GST slab that can apply to a product.
const MAX_GST_RATE: i64 = 28;

/// A product row.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Product {
    pub id: ProductId,
    pub crop_name: String,
    pub variety_name: String,
    pub category: String,
    pub description: String,
    pub germination_pct: Decimal,
    pub purity_pct: Decimal,
    pub lot_number: String,
    pub batch_id: String,
    pub manufacturing_date: String,
    pub expiry_date: String,
    pub date_of_testing: String,
    pub yield_per_acre: String,
    pub suitable_season: String,
    pub suitable_regions: String,
    pub hsn_code: String,
    pub gst_rate: Decimal,
    pub moq: i32,
    pub stock_quantity: i32,
    pub tier_pricing: Json<TierPricing>,
    pub is_featured: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CatalogueItem for Product {
    fn crop_name(&self) -> &str {
        &self.crop_name
    }

    fn variety_name(&self) -> &str {
        &self.variety_name
    }

    fn category(&self) -> &str {
        &self.category
    }

    fn moq(&self) -> i32 {
        self.moq
    }

    fn stock_quantity(&self) -> i32 {
        self.stock_quantity
    }

    fn gst_rate(&self) -> Decimal {
        self.gst_rate
    }

    fn hsn_code(&self) -> &str {
        &self.hsn_code
    }

    fn tier_pricing(&self) -> &TierPricing {
        &self.tier_pricing.0
    }

    fn germination_pct(&self) -> Decimal {
        self.germination_pct
    }

    fn suitable_season(&self) -> &str {
        &self.suitable_season
    }

    fn suitable_regions(&self) -> &str {
        &self.suitable_regions
    }

    fn yield_per_acre(&self) -> &str {
        &self.yield_per_acre
    }
}

/// Body of `POST /api/products` and `PUT /api/products/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductInput {
    pub crop_name: String,
    pub variety_name: String,
    pub category: String,
    #[serde(default)]
    pub description: String,
    pub germination_pct: Decimal,
    pub purity_pct: Decimal,
    pub lot_number: String,
    pub batch_id: String,
    pub manufacturing_date: String,
    pub expiry_date: String,
    pub date_of_testing: String,
    #[serde(default)]
    pub yield_per_acre: String,
    pub suitable_season: String,
    pub suitable_regions: String,
    pub hsn_code: String,
    #[serde(default)]
    pub gst_rate: Decimal,
    pub moq: i32,
    pub stock_quantity: i32,
    pub tier_pricing: TierPricing,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

const fn default_active() -> bool {
    true
}

impl ProductInput {
    /// Sanitize free text and check every field, collecting all failures.
    ///
    /// # Errors
    ///
    /// Returns the per-field errors when any check fails.
    pub fn validate(mut self) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();

        for (field, label, value) in [
            ("crop_name", "Crop name", &mut self.crop_name),
            ("variety_name", "Variety name", &mut self.variety_name),
            ("category", "Category", &mut self.category),
            ("lot_number", "Lot number", &mut self.lot_number),
            ("batch_id", "Batch ID", &mut self.batch_id),
            ("manufacturing_date", "Manufacturing date", &mut self.manufacturing_date),
            ("expiry_date", "Expiry date", &mut self.expiry_date),
            ("date_of_testing", "Date of testing", &mut self.date_of_testing),
            ("suitable_season", "Suitable season", &mut self.suitable_season),
            ("suitable_regions", "Suitable regions", &mut self.suitable_regions),
            ("hsn_code", "HSN code", &mut self.hsn_code),
        ] {
            *value = sanitize(value);
            if value.is_empty() {
                errors.add(field, format!("{label} is required"));
            }
        }
        self.description = sanitize(&self.description);
        self.yield_per_acre = sanitize(&self.yield_per_acre);

        let percent = Decimal::ZERO..=Decimal::ONE_HUNDRED;
        if !percent.contains(&self.germination_pct) {
            errors.add("germination_pct", "Germination must be between 0 and 100");
        }
        if !percent.contains(&self.purity_pct) {
            errors.add("purity_pct", "Purity must be between 0 and 100");
        }
        if !(Decimal::ZERO..=Decimal::from(MAX_GST_RATE)).contains(&self.gst_rate) {
            errors.add("gst_rate", "GST rate must be between 0 and 28");
        }
        if self.moq < 1 {
            errors.add("moq", "MOQ must be at least 1 kg");
        }
        if self.stock_quantity < 0 {
            errors.add("stock_quantity", "Stock cannot be negative");
        }
        errors.check("tier_pricing", self.tier_pricing.validate());

        errors.into_result().map(|()| self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_input() -> serde_json::Value {
        serde_json::json!({
            "crop_name": "Wheat",
            "variety_name": "RH-749 Wheat",
            "category": "Wheat",
            "description": "High-yielding <b>rabi</b> wheat",
            "germination_pct": "94",
            "purity_pct": "98",
            "lot_number": "TSL-WH-2024-001",
            "batch_id": "B-2024-WH-01",
            "manufacturing_date": "2024-08-15",
            "expiry_date": "2025-08-14",
            "date_of_testing": "2024-08-20",
            "yield_per_acre": "20-25 quintals",
            "suitable_season": "Rabi",
            "suitable_regions": "Punjab, Haryana",
            "hsn_code": "1001",
            "moq": 500,
            "stock_quantity": 5000,
            "tier_pricing": [
                {"min_qty": 500, "max_qty": 999, "price_per_unit": "85"},
                {"min_qty": 1000, "price_per_unit": "80"}
            ]
        })
    }

    #[test]
    fn test_valid_input_is_sanitized() {
        let input: ProductInput = serde_json::from_value(sample_input()).unwrap();
        let input = input.validate().unwrap();
        assert_eq!(input.description, "High-yielding rabi wheat");
        assert!(input.is_active);
        assert!(!input.is_featured);
        assert_eq!(input.gst_rate, Decimal::ZERO);
    }

    #[test]
    fn test_invalid_input_reports_every_field() {
        let mut value = sample_input();
        value["crop_name"] = "  <i></i> ".into();
        value["germination_pct"] = "101".into();
        value["moq"] = 0.into();
        value["tier_pricing"] = serde_json::json!([]);

        let input: ProductInput = serde_json::from_value(value).unwrap();
        let errors = input.validate().unwrap_err();
        assert_eq!(errors.len(), 4);
        assert_eq!(errors.get("crop_name"), Some("Crop name is required"));
        assert_eq!(
            errors.get("tier_pricing"),
            Some("At least one price tier is required")
        );
    }
}
