//! HTTP middleware for request processing and protection.
//!
//! Provides per-client abuse prevention and observability middleware.

pub mod abuse;
pub mod tracing;
