//! Application layer services implementing business logic.
//!
//! Services coordinate the codec and the storage contract and give HTTP
//! handlers a small API.
//!
//! - [`services::shorten_service::ShortenService`] - Encode and decode use cases

pub mod services;
