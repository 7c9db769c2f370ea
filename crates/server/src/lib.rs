//! SeedMart server library.
//!
//! The JSON API for distributors and administrators. Exposed as a library
//! so the CLI can reuse the repositories and the binary stays thin.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
