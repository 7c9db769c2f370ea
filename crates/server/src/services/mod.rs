//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Distributor registration and password login
//! - `catalogue` - Cached view of the active catalogue for the advisor
//! - `email` - KYC decision, order approval, and invoice emails
//! - `orders` - Order placement and approval (invoice + credit charge)

pub mod auth;
pub mod catalogue;
pub mod email;
pub mod orders;
