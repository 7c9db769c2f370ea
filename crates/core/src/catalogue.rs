//! The view of a catalogue product that pricing and the advisor work from.
//!
//! The server's database row implements [`CatalogueItem`]; tests use small
//! in-memory fixtures.

use rust_decimal::Decimal;

use crate::types::TierPricing;

/// Read-only attributes of a seed variety in the catalogue.
pub trait CatalogueItem {
    fn crop_name(&self) -> &str;
    fn variety_name(&self) -> &str;
    /// Catalogue category, e.g. `Wheat`, `Vegetable`, `Pulses`.
    fn category(&self) -> &str;
    /// Minimum order quantity in kg.
    fn moq(&self) -> i32;
    fn stock_quantity(&self) -> i32;
    /// GST rate in percent.
    fn gst_rate(&self) -> Decimal;
    fn hsn_code(&self) -> &str;
    fn tier_pricing(&self) -> &TierPricing;
    fn germination_pct(&self) -> Decimal;
    /// Free text such as `Kharif` or `Rabi, Zaid`.
    fn suitable_season(&self) -> &str;
    /// Free text list of states and agro-regions.
    fn suitable_regions(&self) -> &str;
    fn yield_per_acre(&self) -> &str;
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::types::PriceTier;

    #[derive(Debug, Clone)]
    pub struct Seed {
        pub crop: &'static str,
        pub variety: &'static str,
        pub category: &'static str,
        pub moq: i32,
        pub stock: i32,
        pub gst_rate: Decimal,
        pub hsn: &'static str,
        pub tiers: TierPricing,
        pub germination: Decimal,
        pub season: &'static str,
        pub regions: &'static str,
        pub yield_text: &'static str,
    }

    impl CatalogueItem for Seed {
        fn crop_name(&self) -> &str {
            self.crop
        }
        fn variety_name(&self) -> &str {
            self.variety
        }
        fn category(&self) -> &str {
            self.category
        }
        fn moq(&self) -> i32 {
            self.moq
        }
        fn stock_quantity(&self) -> i32 {
            self.stock
        }
        fn gst_rate(&self) -> Decimal {
            self.gst_rate
        }
        fn hsn_code(&self) -> &str {
            self.hsn
        }
        fn tier_pricing(&self) -> &TierPricing {
            &self.tiers
        }
        fn germination_pct(&self) -> Decimal {
            self.germination
        }
        fn suitable_season(&self) -> &str {
            self.season
        }
        fn suitable_regions(&self) -> &str {
            self.regions
        }
        fn yield_per_acre(&self) -> &str {
            self.yield_text
        }
    }

    fn tiers(rows: &[(i32, Option<i32>, i64)]) -> TierPricing {
        TierPricing::new(
            rows.iter()
                .map(|&(min_qty, max_qty, price)| PriceTier {
                    min_qty,
                    max_qty,
                    price_per_unit: Decimal::from(price),
                })
                .collect(),
        )
    }

    pub fn wheat() -> Seed {
        Seed {
            crop: "Wheat",
            variety: "RH-749 Wheat",
            category: "Wheat",
            moq: 500,
            stock: 5000,
            gst_rate: Decimal::ZERO,
            hsn: "1001",
            tiers: tiers(&[(500, Some(999), 85), (1000, Some(4999), 80), (5000, None, 74)]),
            germination: Decimal::from(94),
            season: "Rabi",
            regions: "Punjab, Haryana, UP, Wheat Belt, North India",
            yield_text: "20–25 quintals",
        }
    }

    pub fn tomato() -> Seed {
        Seed {
            crop: "Tomato",
            variety: "SVS-301 F1 Hybrid Tomato",
            category: "Vegetable",
            moq: 1,
            stock: 200,
            gst_rate: Decimal::from(5),
            hsn: "1209",
            tiers: tiers(&[(1, Some(4), 18000), (5, Some(19), 16500), (20, None, 15000)]),
            germination: Decimal::from(93),
            season: "All season",
            regions: "All India, Maharashtra, Karnataka, Tamil Nadu",
            yield_text: "25–35 tonnes",
        }
    }

    pub fn cotton() -> Seed {
        Seed {
            crop: "Cotton",
            variety: "BT Bollgard II Cotton",
            category: "Cotton",
            moq: 300,
            stock: 1500,
            gst_rate: Decimal::from(5),
            hsn: "5201",
            tiers: tiers(&[(300, Some(999), 750), (1000, Some(2999), 700), (3000, None, 650)]),
            germination: Decimal::from(90),
            season: "Kharif",
            regions: "Cotton Belt, Maharashtra, Gujarat, Telangana",
            yield_text: "12–18 quintals",
        }
    }

    pub fn chickpea() -> Seed {
        Seed {
            crop: "Chickpea (Gram)",
            variety: "JG-14 Chickpea",
            category: "Pulses",
            moq: 200,
            stock: 800,
            gst_rate: Decimal::ZERO,
            hsn: "0713",
            tiers: tiers(&[(200, Some(499), 95), (500, Some(1999), 88), (2000, None, 80)]),
            germination: Decimal::from(92),
            season: "Rabi",
            regions: "Central India, Madhya Pradesh, Rajasthan, Maharashtra",
            yield_text: "",
        }
    }
}
