//! Order pricing, GST split and credit-limit enforcement.
//!
//! Everything here is pure. The server loads products and the buyer's credit
//! account, calls into this module, and persists the numbers it returns.
//!
//! # Rounding
//!
//! Line subtotals are exact (`price × quantity`). Line GST is rounded to
//! paise with [`round_money`]. Order totals are sums of those rounded values,
//! so `grand_total == subtotal + gst_total` holds exactly. When tax is split
//! intra-state, CGST takes the rounded half and SGST the remainder, so the
//! two always add back to the total.
//!
//! Every line amount and order total must fit [`MAX_AMOUNT`]; arithmetic is
//! checked and anything larger is rejected as [`PricingError::AmountTooLarge`].

use rust_decimal::Decimal;
use serde::Serialize;

use crate::catalogue::CatalogueItem;
use crate::types::{MAX_AMOUNT, format_inr, round_money};

/// Why an order line or order could not be priced.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PricingError {
    #[error("No items in order")]
    EmptyOrder,
    #[error("Quantity for {variety} must be at least 1 kg")]
    InvalidQuantity { variety: String },
    #[error("MOQ for {variety} is {moq} kg")]
    BelowMoq { variety: String, moq: i32 },
    #[error("Insufficient stock for {variety}. Available: {available} kg")]
    InsufficientStock { variety: String, available: i32 },
    #[error("No valid price for {variety}")]
    NoPrice { variety: String },
    #[error("Order amount is too large")]
    AmountTooLarge,
}

/// A priced order line with the price and tax terms locked in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PricedLine {
    pub quantity: i32,
    pub price_per_unit: Decimal,
    pub gst_rate: Decimal,
    pub hsn_code: String,
    pub subtotal: Decimal,
    pub gst_amount: Decimal,
}

/// Price `quantity` kg of `product`.
///
/// # Errors
///
/// Rejects quantities below the MOQ or above stock, products without a
/// positive tier price, and lines whose amount exceeds [`MAX_AMOUNT`].
pub fn price_line<P: CatalogueItem + ?Sized>(
    product: &P,
    quantity: i32,
) -> Result<PricedLine, PricingError> {
    let variety = || product.variety_name().to_owned();

    if quantity < 1 {
        return Err(PricingError::InvalidQuantity { variety: variety() });
    }
    if quantity < product.moq() {
        return Err(PricingError::BelowMoq {
            variety: variety(),
            moq: product.moq(),
        });
    }
    if quantity > product.stock_quantity() {
        return Err(PricingError::InsufficientStock {
            variety: variety(),
            available: product.stock_quantity(),
        });
    }

    let price = product
        .tier_pricing()
        .price_for_quantity(quantity)
        .filter(|p| *p > Decimal::ZERO)
        .ok_or_else(|| PricingError::NoPrice { variety: variety() })?;

    let subtotal = price
        .checked_mul(Decimal::from(quantity))
        .filter(|amount| *amount <= MAX_AMOUNT)
        .ok_or(PricingError::AmountTooLarge)?;
    let gst_amount = subtotal
        .checked_mul(product.gst_rate())
        .and_then(|tax| tax.checked_div(Decimal::ONE_HUNDRED))
        .map(round_money)
        .ok_or(PricingError::AmountTooLarge)?;

    Ok(PricedLine {
        quantity,
        price_per_unit: price,
        gst_rate: product.gst_rate(),
        hsn_code: product.hsn_code().to_owned(),
        subtotal,
        gst_amount,
    })
}

/// Totals for a whole order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderQuote {
    pub lines: Vec<PricedLine>,
    /// Pre-tax total.
    pub subtotal: Decimal,
    pub gst_total: Decimal,
    pub grand_total: Decimal,
}

/// Sum priced lines into an order quote.
///
/// # Errors
///
/// Returns [`PricingError::EmptyOrder`] when `lines` is empty and
/// [`PricingError::AmountTooLarge`] when a total exceeds [`MAX_AMOUNT`].
pub fn quote_order(lines: Vec<PricedLine>) -> Result<OrderQuote, PricingError> {
    if lines.is_empty() {
        return Err(PricingError::EmptyOrder);
    }

    let subtotal = checked_total(lines.iter().map(|l| l.subtotal))?;
    let gst_total = checked_total(lines.iter().map(|l| l.gst_amount))?;
    let grand_total = checked_total([subtotal, gst_total])?;

    Ok(OrderQuote {
        lines,
        subtotal,
        gst_total,
        grand_total,
    })
}

fn checked_total(amounts: impl IntoIterator<Item = Decimal>) -> Result<Decimal, PricingError> {
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, amount| acc.checked_add(amount))
        .filter(|total| *total <= MAX_AMOUNT)
        .ok_or(PricingError::AmountTooLarge)
}

/// GST components for an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TaxSplit {
    pub cgst: Decimal,
    pub sgst: Decimal,
    pub igst: Decimal,
    pub inter_state: bool,
}

impl TaxSplit {
    /// Split `total_tax` by place of supply.
    ///
    /// Supply within the seller's state is taxed as CGST + SGST; supply to
    /// another state as IGST. States are compared trimmed and
    /// case-insensitively.
    ///
    /// ```
    /// use rust_decimal::Decimal;
    /// use seedmart_core::pricing::TaxSplit;
    ///
    /// let split = TaxSplit::compute(Decimal::from(900), "maharashtra ", "Maharashtra");
    /// assert!(!split.inter_state);
    /// assert_eq!(split.cgst, Decimal::from(450));
    ///
    /// let split = TaxSplit::compute(Decimal::from(900), "Punjab", "Maharashtra");
    /// assert_eq!(split.igst, Decimal::from(900));
    /// ```
    #[must_use]
    pub fn compute(total_tax: Decimal, buyer_state: &str, seller_state: &str) -> Self {
        let inter_state = !buyer_state
            .trim()
            .eq_ignore_ascii_case(seller_state.trim());

        if inter_state {
            Self {
                cgst: Decimal::ZERO,
                sgst: Decimal::ZERO,
                igst: total_tax,
                inter_state,
            }
        } else {
            let cgst = round_money(total_tax / Decimal::TWO);
            Self {
                cgst,
                sgst: total_tax - cgst,
                igst: Decimal::ZERO,
                inter_state,
            }
        }
    }

    #[must_use]
    pub fn total(&self) -> Decimal {
        self.cgst + self.sgst + self.igst
    }
}

/// A buyer's credit position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CreditAccount {
    pub enabled: bool,
    pub limit: Decimal,
    pub used: Decimal,
}

impl CreditAccount {
    #[must_use]
    pub fn available(&self) -> Decimal {
        self.limit - self.used
    }
}

/// Order rejected by the credit check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreditError {
    pub total: Decimal,
    pub available: Decimal,
}

impl std::fmt::Display for CreditError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Order total ({}) exceeds available credit ({}). Contact admin.",
            format_inr(self.total),
            format_inr(self.available)
        )
    }
}

impl std::error::Error for CreditError {}

/// Check `grand_total` against the buyer's remaining credit.
///
/// Buyers without credit enabled pay upfront and are never blocked.
///
/// # Errors
///
/// Returns [`CreditError`] when the order exceeds the available credit.
pub fn check_credit(account: &CreditAccount, grand_total: Decimal) -> Result<(), CreditError> {
    if !account.enabled {
        return Ok(());
    }
    let available = account.available();
    if grand_total > available {
        return Err(CreditError {
            total: grand_total,
            available,
        });
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalogue::fixtures;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_price_line_uses_tier_for_quantity() {
        let line = price_line(&fixtures::wheat(), 1200).unwrap();
        assert_eq!(line.price_per_unit, d("80"));
        assert_eq!(line.subtotal, d("96000"));
        assert_eq!(line.gst_amount, Decimal::ZERO);
        assert_eq!(line.hsn_code, "1001");
    }

    #[test]
    fn test_price_line_computes_gst() {
        let line = price_line(&fixtures::tomato(), 7).unwrap();
        assert_eq!(line.price_per_unit, d("16500"));
        assert_eq!(line.subtotal, d("115500"));
        assert_eq!(line.gst_amount, d("5775"));
    }

    #[test]
    fn test_price_line_rounds_gst_to_paise() {
        let mut seed = fixtures::tomato();
        seed.gst_rate = d("18");
        seed.tiers = crate::types::TierPricing::new(vec![crate::types::PriceTier {
            min_qty: 1,
            max_qty: None,
            price_per_unit: d("10.05"),
        }]);
        // 10.05 * 3 = 30.15; 18% = 5.427
        let line = price_line(&seed, 3).unwrap();
        assert_eq!(line.gst_amount, d("5.43"));
    }

    #[test]
    fn test_price_line_rejects_below_moq() {
        let err = price_line(&fixtures::wheat(), 499).unwrap_err();
        assert_eq!(err.to_string(), "MOQ for RH-749 Wheat is 500 kg");
    }

    #[test]
    fn test_price_line_rejects_over_stock() {
        let err = price_line(&fixtures::cotton(), 1501).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Insufficient stock for BT Bollgard II Cotton. Available: 1500 kg"
        );
    }

    #[test]
    fn test_price_line_rejects_non_positive_quantity() {
        assert!(matches!(
            price_line(&fixtures::tomato(), 0),
            Err(PricingError::InvalidQuantity { .. })
        ));
    }

    #[test]
    fn test_price_line_without_tiers() {
        let mut seed = fixtures::tomato();
        seed.tiers = crate::types::TierPricing::default();
        assert_eq!(
            price_line(&seed, 2).unwrap_err().to_string(),
            "No valid price for SVS-301 F1 Hybrid Tomato"
        );
    }

    #[test]
    fn test_quote_order_sums_lines() {
        let lines = vec![
            price_line(&fixtures::wheat(), 600).unwrap(),
            price_line(&fixtures::cotton(), 1000).unwrap(),
        ];
        let quote = quote_order(lines).unwrap();
        assert_eq!(quote.subtotal, d("751000"));
        assert_eq!(quote.gst_total, d("35000"));
        assert_eq!(quote.grand_total, d("786000"));
    }

    #[test]
    fn test_price_line_rejects_amounts_past_max() {
        let mut seed = fixtures::tomato();
        seed.tiers = crate::types::TierPricing::new(vec![crate::types::PriceTier {
            min_qty: 1,
            max_qty: None,
            price_per_unit: d("70000000000000000000000000000"),
        }]);
        // Would overflow Decimal outright
        assert_eq!(price_line(&seed, 5), Err(PricingError::AmountTooLarge));

        seed.tiers = crate::types::TierPricing::new(vec![crate::types::PriceTier {
            min_qty: 1,
            max_qty: None,
            price_per_unit: d("10000000"),
        }]);
        seed.stock = 200_000;
        // Representable, but wider than the money columns
        let err = price_line(&seed, 100_000).unwrap_err();
        assert_eq!(err.to_string(), "Order amount is too large");
    }

    #[test]
    fn test_quote_order_rejects_total_past_max() {
        let line = PricedLine {
            quantity: 1,
            price_per_unit: d("600000000000"),
            gst_rate: d("5"),
            hsn_code: "1001".to_owned(),
            subtotal: d("600000000000"),
            gst_amount: d("30000000000"),
        };
        assert!(quote_order(vec![line.clone()]).is_ok());
        assert_eq!(
            quote_order(vec![line.clone(), line]),
            Err(PricingError::AmountTooLarge)
        );
    }

    #[test]
    fn test_quote_order_rejects_empty() {
        assert_eq!(quote_order(Vec::new()), Err(PricingError::EmptyOrder));
    }

    #[test]
    fn test_tax_split_intra_state_halves() {
        let split = TaxSplit::compute(d("5775"), "  MAHARASHTRA", "maharashtra");
        assert!(!split.inter_state);
        assert_eq!(split.cgst, d("2887.50"));
        assert_eq!(split.sgst, d("2887.50"));
        assert_eq!(split.igst, Decimal::ZERO);
    }

    #[test]
    fn test_tax_split_odd_paise_keeps_total() {
        let split = TaxSplit::compute(d("10.01"), "Karnataka", "Karnataka");
        assert_eq!(split.cgst, d("5.01"));
        assert_eq!(split.sgst, d("5.00"));
        assert_eq!(split.total(), d("10.01"));
    }

    #[test]
    fn test_tax_split_inter_state_igst() {
        let split = TaxSplit::compute(d("5775"), "Punjab", "Maharashtra");
        assert!(split.inter_state);
        assert_eq!(split.igst, d("5775"));
        assert_eq!(split.cgst + split.sgst, Decimal::ZERO);
    }

    #[test]
    fn test_tax_split_blank_buyer_state_is_inter_state() {
        assert!(TaxSplit::compute(d("100"), "", "Maharashtra").inter_state);
    }

    #[test]
    fn test_credit_check_blocks_over_limit() {
        let account = CreditAccount {
            enabled: true,
            limit: d("500000"),
            used: d("450000"),
        };
        assert!(check_credit(&account, d("50000")).is_ok());
        let err = check_credit(&account, d("50000.01")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Order total (₹50,000.01) exceeds available credit (₹50,000.00). Contact admin."
        );
    }

    #[test]
    fn test_credit_check_ignores_disabled_accounts() {
        let account = CreditAccount {
            enabled: false,
            limit: Decimal::ZERO,
            used: d("900"),
        };
        assert!(check_credit(&account, d("1000000")).is_ok());
    }
}
