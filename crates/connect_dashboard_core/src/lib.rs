//! Domain primitives for the Connect resiliency dashboard API.
//!
//! This crate owns the request/response contracts, the remote client seam,
//! the phone-number batch reassignment engine and the replica-awareness
//! policy. AWS SDK and Lambda runtime concerns live in
//! `connect_dashboard_lambda`.

pub mod batch;
pub mod client;
pub mod contract;
pub mod error;
pub mod replication;

#[cfg(any(test, feature = "test-helpers"))]
pub mod testing;
