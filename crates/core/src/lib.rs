//! SeedMart Core - Shared types and business rules.
//!
//! This crate provides the domain types and pure computations used across
//! all SeedMart components:
//! - `server` - JSON API for distributors and administrators
//! - `cli` - Command-line tools for migrations, seeding, and management
//!
//! # Architecture
//!
//! The core crate contains only types, traits, and deterministic functions -
//! no I/O, no database access, no HTTP clients. Everything here can be unit
//! tested without a running database.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, emails, tax identifiers, statuses,
//!   tier tables, and money helpers
//! - [`pricing`] - Order line pricing, GST split, and credit-limit checks
//! - [`advisor`] - Rule-based seed recommendations and chat replies

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod advisor;
pub mod catalogue;
pub mod pricing;
pub mod types;

pub use catalogue::CatalogueItem;
pub use types::*;
