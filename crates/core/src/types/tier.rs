//! Quantity-tiered price tables.
//!
//! A product carries a list of tiers such as
//!
//! | min kg | max kg | ₹/kg |
//! |-------:|-------:|-----:|
//! |    500 |    999 |   85 |
//! |   1000 |   4999 |   80 |
//! |   5000 |      - |   74 |
//!
//! and an order line is priced at the tier with the highest `min_qty` not
//! exceeding the ordered quantity.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One row of a tier table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceTier {
    pub min_qty: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_qty: Option<i32>,
    pub price_per_unit: Decimal,
}

/// Reasons a tier table is rejected.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TierError {
    #[error("At least one price tier is required")]
    Empty,
    #[error("Tier {index}: minimum quantity must be at least 1")]
    MinQty { index: usize },
    #[error("Tier {index}: minimum quantities must be strictly ascending")]
    NotAscending { index: usize },
    #[error("Tier {index}: maximum quantity is below the minimum")]
    MaxBelowMin { index: usize },
    #[error("Tier {index}: price per unit must be positive")]
    Price { index: usize },
    #[error("Tier {index}: price per unit can have at most 2 decimal places")]
    PricePrecision { index: usize },
    #[error("Tier {index}: price per unit cannot exceed {MAX_PRICE_PER_UNIT}")]
    PriceTooHigh { index: usize },
}

/// Upper bound on a tier's ₹/kg price.
pub const MAX_PRICE_PER_UNIT: Decimal = Decimal::from_parts(10_000_000, 0, 0, false, 0);

/// An ordered tier table.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TierPricing(Vec<PriceTier>);

impl TierPricing {
    #[must_use]
    pub const fn new(tiers: Vec<PriceTier>) -> Self {
        Self(tiers)
    }

    #[must_use]
    pub fn tiers(&self) -> &[PriceTier] {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check the table shape before it is stored.
    ///
    /// # Errors
    ///
    /// Returns the first [`TierError`] found, scanning tiers in order.
    pub fn validate(&self) -> Result<(), TierError> {
        if self.0.is_empty() {
            return Err(TierError::Empty);
        }

        let mut previous_min: Option<i32> = None;
        for (index, tier) in self.0.iter().enumerate() {
            if tier.min_qty < 1 {
                return Err(TierError::MinQty { index });
            }
            if previous_min.is_some_and(|prev| tier.min_qty <= prev) {
                return Err(TierError::NotAscending { index });
            }
            if tier.max_qty.is_some_and(|max| max < tier.min_qty) {
                return Err(TierError::MaxBelowMin { index });
            }
            if tier.price_per_unit <= Decimal::ZERO {
                return Err(TierError::Price { index });
            }
            if tier.price_per_unit.normalize().scale() > 2 {
                return Err(TierError::PricePrecision { index });
            }
            if tier.price_per_unit > MAX_PRICE_PER_UNIT {
                return Err(TierError::PriceTooHigh { index });
            }
            previous_min = Some(tier.min_qty);
        }
        Ok(())
    }

    /// Unit price for `quantity`.
    ///
    /// Picks the tier with the highest `min_qty <= quantity`. Quantities below
    /// every tier fall back to the first tier. `None` only for an empty table.
    ///
    /// ```
    /// use rust_decimal::Decimal;
    /// use seedmart_core::{PriceTier, TierPricing};
    ///
    /// let table = TierPricing::new(vec![
    ///     PriceTier { min_qty: 200, max_qty: Some(499), price_per_unit: Decimal::from(95) },
    ///     PriceTier { min_qty: 500, max_qty: None, price_per_unit: Decimal::from(88) },
    /// ]);
    /// assert_eq!(table.price_for_quantity(650), Some(Decimal::from(88)));
    /// assert_eq!(table.price_for_quantity(50), Some(Decimal::from(95)));
    /// ```
    #[must_use]
    pub fn price_for_quantity(&self, quantity: i32) -> Option<Decimal> {
        self.0
            .iter()
            .filter(|tier| tier.min_qty <= quantity)
            .max_by_key(|tier| tier.min_qty)
            .or_else(|| self.0.first())
            .map(|tier| tier.price_per_unit)
    }

    /// Price of the entry tier, used as the headline price.
    #[must_use]
    pub fn base_price(&self) -> Option<Decimal> {
        self.0.first().map(|tier| tier.price_per_unit)
    }
}

impl From<Vec<PriceTier>> for TierPricing {
    fn from(tiers: Vec<PriceTier>) -> Self {
        Self(tiers)
    }
}
