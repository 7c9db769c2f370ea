//! Domain models for the SeedMart API.
//!
//! Row types derive `sqlx::FromRow` and are loaded with runtime queries by
//! the repositories in [`crate::db`]. Types that go over the wire derive
//! `Serialize` with snake_case field names.

pub mod credit;
pub mod invoice;
pub mod order;
pub mod product;
pub mod session;
pub mod user;

pub use credit::CreditTransaction;
pub use invoice::{Invoice, InvoiceSummary};
pub use order::{Order, OrderDetail, OrderItem};
pub use product::{Product, ProductInput};
pub use session::CurrentUser;
pub use user::{BuyerSummary, NewBuyer, User};
