//! Tracing/logging setup shared by storefront binaries.

/// Subscriber initialization (filters, output format).
pub mod tracing;

pub use crate::tracing::{LogFormat, init, init_with};
