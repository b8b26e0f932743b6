//! Core domain entities.
//!
//! - [`UrlRecord`] - A stored origin URL
//! - [`NewUrl`] - Input for creating one

pub mod url;

pub use url::{NewUrl, UrlRecord};
