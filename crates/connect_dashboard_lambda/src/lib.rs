//! AWS-oriented adapters and handlers for the Connect dashboard API.
//!
//! This crate owns runtime integration details (the Lambda entry point, the
//! API Gateway event contract, the AWS SDK Connect client and identity token
//! decoding) and delegates domain behavior to `connect_dashboard_core`.

pub mod adapters;
pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
