//! Rule-based seed advisor.
//!
//! Two deterministic helpers run over the active catalogue:
//!
//! - [`recommend`] scores products against a distributor's state, soil,
//!   season and budget.
//! - [`reply`] answers common questions by keyword.

mod chat;
mod recommend;
mod tables;

pub use chat::{ChatContext, reply};
pub use recommend::{Recommendation, RecommendationRequest, Suitability, recommend};
pub use tables::{Budget, crops_for_soil, regions_for_state};
