//! Domain layer: business entities and the storage contract.
//!
//! - [`entities`] - Core data structures
//! - [`repositories`] - Data access trait definitions
//!
//! The domain layer has no dependencies on infrastructure or HTTP concerns.

pub mod entities;
pub mod repositories;
