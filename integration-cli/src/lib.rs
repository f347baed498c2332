//! Client for integration platform packages, artifacts and message logs
//!
//! The [`api`] module is a thin typed layer over the tenant's OData API plus
//! the resilience primitives (bounded runner, rate-limit accounting,
//! diagnostics). [`services`] builds the batch operations on top of it:
//! aggregating every package with its artifacts, and analyzing a flow's
//! message processing logs.

pub mod api;
pub mod cli;
pub mod config;
pub mod services;

pub use config::Config;
