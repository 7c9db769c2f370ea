//! Core types for SeedMart.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod money;
pub mod numbering;
pub mod status;
pub mod tax_id;
pub mod tier;
pub mod validate;

pub use email::{Email, EmailError};
pub use id::*;
pub use money::{MAX_AMOUNT, format_inr, round_money};
pub use numbering::{invoice_number, order_number};
pub use status::*;
pub use tax_id::{Gstin, Pan, Phone, Pincode, TaxIdError, state_name_for_code};
pub use tier::{MAX_PRICE_PER_UNIT, PriceTier, TierError, TierPricing};
pub use validate::{FieldErrors, MAX_TEXT_LEN, check_password_strength, sanitize, sanitize_opt};
