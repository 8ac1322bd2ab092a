//! `storefront-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no storage, no analytics sinks).

pub mod aggregate;
pub mod error;
pub mod id;
pub mod money;
pub mod navigation;

pub use aggregate::Aggregate;
pub use error::{DomainError, DomainResult};
pub use id::{OrderId, ProductId, UserId};
pub use money::Money;
pub use navigation::{Destination, Navigation};
