//! Data Transfer Objects for API requests and responses.
//!
//! Request bodies are accepted as JSON or as URL-encoded forms through
//! [`crate::api::extract::Params`]; `validator` checks them before any
//! business logic runs.

pub mod health;
pub mod shorten;
